//! # 症状分析
//!
//! 外部の分析サービスとやり取りするリクエスト・レスポンスの型と、
//! 分析結果の正規化ルールを定義する。
//!
//! ## 正規化ルール
//!
//! 分析サービスのレスポンスはフィールドの欠落がありうるため、
//! 各フィールドごとに独立して既定値を補完する。
//!
//! | フィールド       | 既定値      |
//! |------------------|-------------|
//! | `conditions`     | 空リスト    |
//! | `severity`       | `"Unknown"` |
//! | `recommendation` | 空リスト    |
//!
//! ## 失敗時の振る舞い
//!
//! 分析サービスの呼び出しに失敗した場合、結果は
//! `{"error": "Failed to process request"}` という固定のエラーオブジェクト
//! として扱われる。呼び出し元はこの失敗を致命的エラーとせず、
//! 後続の処理（履歴保存・レポート生成）を継続する。

use serde::{Deserialize, Serialize, ser::SerializeMap};

/// `severity` が欠落していた場合の既定値
pub const DEFAULT_SEVERITY: &str = "Unknown";

/// 分析失敗時に結果として記録される固定メッセージ
pub const ANALYSIS_FAILURE_MESSAGE: &str = "Failed to process request";

/// カンマ区切りの生文字列を項目リストに変換する
///
/// 各項目の前後空白を除去し、空の項目は取り除く。
///
/// # 使用例
///
/// ```rust
/// use symptocare_domain::analysis::parse_comma_separated;
///
/// let items = parse_comma_separated(" fever , cough ,,");
/// assert_eq!(items, vec!["fever".to_string(), "cough".to_string()]);
/// ```
pub fn parse_comma_separated(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// 分析サービスへ渡す入力
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub symptoms:        Vec<String>,
    pub medical_history: Vec<String>,
}

/// 正規化済みの分析結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub conditions:     Vec<String>,
    pub severity:       String,
    pub recommendation: Vec<String>,
}

/// 分析サービスからの生レスポンス
///
/// フィールドはいずれも欠落しうる。[`AnalysisResponse::normalize`] で
/// 既定値を補完した [`AnalysisResult`] に変換する。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisResponse {
    pub conditions:     Option<Vec<String>>,
    pub severity:       Option<String>,
    pub recommendation: Option<Vec<String>>,
}

impl AnalysisResponse {
    /// 欠落フィールドに既定値を補完して正規化結果に変換する
    ///
    /// 各フィールドの補完は独立しており、一部のフィールドだけが
    /// 欠落していても他のフィールドの値はそのまま保持される。
    pub fn normalize(self) -> AnalysisResult {
        AnalysisResult {
            conditions:     self.conditions.unwrap_or_default(),
            severity:       self.severity.unwrap_or_else(|| DEFAULT_SEVERITY.to_string()),
            recommendation: self.recommendation.unwrap_or_default(),
        }
    }
}

/// 分析の最終的な成否
///
/// 失敗は例外ではなく値として扱う。シリアライズすると成功時は
/// 正規化結果のオブジェクト、失敗時は固定のエラーオブジェクトになる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// 分析が完了し、正規化済みの結果が得られた
    Completed(AnalysisResult),
    /// 分析サービスの呼び出しに失敗した
    Failed,
}

impl AnalysisOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// 推定された病名のリスト（失敗時は空リスト）
    pub fn conditions(&self) -> &[String] {
        match self {
            Self::Completed(result) => &result.conditions,
            Self::Failed => &[],
        }
    }

    /// 重症度（失敗時は `None`）
    pub fn severity_level(&self) -> Option<&str> {
        match self {
            Self::Completed(result) => Some(&result.severity),
            Self::Failed => None,
        }
    }

    /// 推奨対応のリスト（失敗時は `None`）
    pub fn recommendation(&self) -> Option<&[String]> {
        match self {
            Self::Completed(result) => Some(&result.recommendation),
            Self::Failed => None,
        }
    }

    /// レポート本文に出力する「項目名: 値」の組のリスト
    ///
    /// リスト値は `", "` 区切りで結合する。失敗時はエラー行 1 行のみ。
    pub fn report_lines(&self) -> Vec<(String, String)> {
        match self {
            Self::Completed(result) => vec![
                ("conditions".to_string(), result.conditions.join(", ")),
                ("severity".to_string(), result.severity.clone()),
                ("recommendation".to_string(), result.recommendation.join(", ")),
            ],
            Self::Failed => vec![(
                "error".to_string(),
                ANALYSIS_FAILURE_MESSAGE.to_string(),
            )],
        }
    }
}

impl Serialize for AnalysisOutcome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Completed(result) => result.serialize(serializer),
            Self::Failed => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", ANALYSIS_FAILURE_MESSAGE)?;
                map.end()
            }
        }
    }
}
