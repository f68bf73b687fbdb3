//! # ユーザープロファイル
//!
//! ユーザーごとに 1 行存在する、直近の症状入力の記録。
//!
//! ## 設計方針
//!
//! - **1 ユーザー 1 プロファイル**: `user_id` で一意
//! - **生テキスト保存**: 症状・既往歴はカンマ区切りの生文字列のまま保持し、
//!   正規化はリクエスト処理時に行う
//! - **欠損許容**: 登録時にはプロファイル行を作らない。ダッシュボードの
//!   送信フローは行が無ければ警告ログを出してスキップし、プロファイル API
//!   の更新時に初めて作成される
//!
//! ## 使用例
//!
//! ```rust
//! use symptocare_domain::{profile::UserProfile, user::UserId};
//!
//! let now = chrono::Utc::now();
//! let profile = UserProfile::new(UserId::new(), now);
//! assert_eq!(profile.symptoms(), "");
//! assert_eq!(profile.report_url(), None);
//! ```

use chrono::{DateTime, Utc};

use crate::user::UserId;

define_uuid_id! {
    /// プロファイル ID（一意識別子）
    pub struct ProfileId;
}

/// ユーザープロファイルエンティティ
///
/// 直近に送信された症状・既往歴の生文字列と、最後に生成された
/// レポートのアクセス URL を保持する。
///
/// # 不変条件
///
/// - `user_id` はシステム内で一意（1 ユーザー 1 プロファイル）
/// - `symptoms` / `medical_history` は未入力時は空文字列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    id: ProfileId,
    user_id: UserId,
    symptoms: String,
    medical_history: String,
    report_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// 空のプロファイルを作成する
    pub fn new(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: ProfileId::new(),
            user_id,
            symptoms: String::new(),
            medical_history: String::new(),
            report_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 既存のデータからプロファイルを復元する（データベースから取得時）
    pub fn from_db(
        id: ProfileId,
        user_id: UserId,
        symptoms: String,
        medical_history: String,
        report_url: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            symptoms,
            medical_history,
            report_url,
            created_at,
            updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &ProfileId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn symptoms(&self) -> &str {
        &self.symptoms
    }

    pub fn medical_history(&self) -> &str {
        &self.medical_history
    }

    pub fn report_url(&self) -> Option<&str> {
        self.report_url.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ビジネスロジックメソッド

    /// 症状・既往歴の生文字列を差し替えた新しいインスタンスを返す
    pub fn with_inputs(
        self,
        symptoms: impl Into<String>,
        medical_history: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            symptoms: symptoms.into(),
            medical_history: medical_history.into(),
            updated_at: now,
            ..self
        }
    }

    /// レポート URL を差し替えた新しいインスタンスを返す
    pub fn with_report_url(self, report_url: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            report_url: Some(report_url.into()),
            updated_at: now,
            ..self
        }
    }
}
