//! # 分析履歴
//!
//! 症状分析の実行記録を表すドメインモデル。
//!
//! ## 設計方針
//!
//! - **不変性**: 履歴は一度作成されたら変更されない
//! - **ユーザー分離**: すべての履歴は `username` をキーとして分離
//! - **TTL**: 作成から1年後に自動削除（DynamoDB TTL）
//!
//! 分析が失敗した場合も履歴は記録される。その場合 `result` には
//! 固定のエラーオブジェクトが入る（[`crate::analysis::ANALYSIS_FAILURE_MESSAGE`]）。

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// TTL 期間（1年）
const TTL_DURATION_DAYS: i64 = 365;

/// 分析履歴エンティティ
///
/// 1 回の症状送信とその分析結果を表現する不変のエンティティ。
/// DynamoDB に格納され、ダッシュボードで時系列表示される。
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub username: String,
    /// 送信された症状の生文字列（カンマ区切り）
    pub symptoms: String,
    /// 送信された既往歴の生文字列（カンマ区切り）
    pub medical_history: String,
    /// 分析結果（成功時は正規化済み結果、失敗時はエラーオブジェクト）
    pub result: serde_json::Value,
    pub report_filename: String,
    pub created_at: DateTime<Utc>,
    /// TTL（epoch seconds）。created_at + 1年。
    pub ttl: i64,
}

impl HistoryEntry {
    /// 新しい履歴を作成する
    ///
    /// `created_at` は現在時刻、`ttl` は `created_at + 1年` で自動計算される。
    pub fn new(
        username: impl Into<String>,
        symptoms: impl Into<String>,
        medical_history: impl Into<String>,
        result: serde_json::Value,
        report_filename: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        let ttl = (now + Duration::days(TTL_DURATION_DAYS)).timestamp();

        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            symptoms: symptoms.into(),
            medical_history: medical_history.into(),
            result,
            report_filename: report_filename.into(),
            created_at: now,
            ttl,
        }
    }

    /// DynamoDB の Sort Key を生成する
    ///
    /// 形式: `{ISO8601_timestamp}#{uuid}`
    ///
    /// ISO 8601 はレキシカル順でソート可能なため時系列クエリに使え、
    /// UUID サフィックスで同一ミリ秒のエントリも一意性を保証する。
    pub fn sort_key(&self) -> String {
        format!("{}#{}", self.created_at.to_rfc3339(), self.id)
    }

    /// Sort Key とデータからエンティティを復元する（リポジトリ用）
    pub fn from_stored(
        username: String,
        sk: &str,
        symptoms: String,
        medical_history: String,
        result: serde_json::Value,
        report_filename: String,
        ttl: i64,
    ) -> Result<Self, String> {
        // SK 形式: "{timestamp}#{uuid}"
        let (timestamp_str, id_str) = sk
            .rsplit_once('#')
            .ok_or_else(|| format!("不正な Sort Key 形式: {sk}"))?;

        let created_at = DateTime::parse_from_rfc3339(timestamp_str)
            .map_err(|e| format!("タイムスタンプのパースに失敗: {e}"))?
            .with_timezone(&Utc);

        let id = Uuid::parse_str(id_str).map_err(|e| format!("UUID のパースに失敗: {e}"))?;

        Ok(Self {
            id,
            username,
            symptoms,
            medical_history,
            result,
            report_filename,
            created_at,
            ttl,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_entry() -> HistoryEntry {
        HistoryEntry::new(
            "alice",
            "fever, cough",
            "diabetes",
            json!({"conditions": ["flu"], "severity": "Mild", "recommendation": ["rest"]}),
            "alice_report.pdf",
        )
    }

    #[test]
    fn test_ttlがcreated_atから1年後に設定される() {
        let entry = sample_entry();

        let expected_ttl = (entry.created_at + Duration::days(365)).timestamp();
        assert_eq!(entry.ttl, expected_ttl);
    }

    #[test]
    fn test_sort_keyがtimestamp_uuid形式で生成される() {
        let entry = sample_entry();

        let sk = entry.sort_key();
        assert!(sk.contains('#'), "Sort Key に '#' が含まれるべき");

        let parts: Vec<&str> = sk.rsplitn(2, '#').collect();
        assert_eq!(parts.len(), 2);

        // UUID 部分がパース可能
        Uuid::parse_str(parts[0]).expect("UUID 部分がパースできるべき");

        // タイムスタンプ部分がパース可能
        DateTime::parse_from_rfc3339(parts[1]).expect("タイムスタンプ部分がパースできるべき");
    }

    #[test]
    fn test_from_storedでsort_keyからエンティティを復元できる() {
        let original = sample_entry();
        let sk = original.sort_key();

        let restored = HistoryEntry::from_stored(
            original.username.clone(),
            &sk,
            original.symptoms.clone(),
            original.medical_history.clone(),
            original.result.clone(),
            original.report_filename.clone(),
            original.ttl,
        )
        .expect("復元に成功するべき");

        assert_eq!(restored.id, original.id);
        assert_eq!(restored.created_at, original.created_at);
        assert_eq!(restored.result, original.result);
    }

    #[test]
    fn test_不正なsort_keyはエラーになる() {
        let result = HistoryEntry::from_stored(
            "alice".to_string(),
            "no-separator",
            String::new(),
            String::new(),
            json!({}),
            String::new(),
            0,
        );

        assert!(result.is_err());
    }
}
