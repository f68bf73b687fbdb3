//! # ユーザー
//!
//! ユーザーエンティティとそれに関連する値オブジェクトを定義する。
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: UserId は UUID をラップし、型安全性を確保
//! - **不変性**: エンティティフィールドは基本的に不変、変更はメソッド経由
//! - **バリデーション**: 値オブジェクトの生成時に検証ロジックを実行
//! - **認証情報の分離**: パスワードハッシュはエンティティに含めず、
//!   リポジトリ層の認証用レコードで扱う
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use symptocare_domain::{
//!     user::{Email, User, UserId},
//!     value_objects::UserName,
//! };
//!
//! // 新規ユーザー作成
//! let user = User::new(
//!     UserId::new(),
//!     UserName::new("alice")?,
//!     Email::new("alice@example.com")?,
//!     chrono::Utc::now(),
//! );
//!
//! // ステータス確認
//! assert!(user.is_active());
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use uuid::Uuid;

use crate::{DomainError, value_objects::UserName};

/// ユーザー ID（一意識別子）
///
/// UUID v7 を使用し、生成順にソート可能。
/// Newtype パターンで型安全性を確保。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct UserId(Uuid);

impl UserId {
    /// 新しいユーザー ID を生成する
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// 既存の UUID からユーザー ID を作成する
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 内部の UUID 参照を取得する
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// メールアドレス（値オブジェクト）
///
/// 生成時にバリデーションを実行し、不正な値の作成を防ぐ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - `local@domain` の形式である
    /// - 最大 255 文字
    ///
    /// # エラー
    ///
    /// バリデーションに失敗した場合は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.is_empty() {
            return Err(DomainError::Validation("email is required".to_string()));
        }

        // 基本的な構造検証: local@domain の形式であること
        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::Validation(
                "email has an invalid format".to_string(),
            ));
        };

        if local.is_empty() || domain.is_empty() {
            return Err(DomainError::Validation(
                "email has an invalid format".to_string(),
            ));
        }

        if value.len() > 255 {
            return Err(DomainError::Validation(
                "email must be at most 255 characters".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 所有権を持つ文字列に変換する
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ユーザーステータス
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserStatus {
    /// アクティブ（ログイン可能）
    Active,
    /// 非アクティブ（一時停止）
    Inactive,
}

impl std::str::FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(DomainError::Validation(format!("invalid user status: {}", s))),
        }
    }
}

/// ユーザーエンティティ
///
/// ポータルの利用者を表現する。ユーザー名とパスワードでログインし、
/// セッション（画面系）またはベアラートークン（API 系）で認証される。
/// パスワードハッシュはリポジトリ層の認証用レコードで管理する。
///
/// # 不変条件
///
/// - `username` はシステム内で一意
/// - `email` はシステム内で一意
/// - `status` が `Inactive` の場合、ログイン不可
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: UserName,
    email: Email,
    status: UserStatus,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// 新しいユーザーを作成する
    ///
    /// # 不変条件
    ///
    /// - 作成時のステータスは `Active`
    /// - `last_login_at` は None
    pub fn new(id: UserId, username: UserName, email: Email, now: DateTime<Utc>) -> Self {
        Self {
            id,
            username,
            email,
            status: UserStatus::Active,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 既存のデータからユーザーを復元する（データベースから取得時）
    pub fn from_db(
        id: UserId,
        username: UserName,
        email: Email,
        status: UserStatus,
        last_login_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            email,
            status,
            last_login_at,
            created_at,
            updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &UserName {
        &self.username
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ビジネスロジックメソッド

    /// ユーザーがアクティブか判定する
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// ユーザーがログイン可能か判定する
    pub fn can_login(&self) -> bool {
        self.is_active()
    }

    /// 最終ログイン日時を更新した新しいインスタンスを返す
    pub fn with_last_login_updated(self, now: DateTime<Utc>) -> Self {
        Self {
            last_login_at: Some(now),
            updated_at: now,
            ..self
        }
    }

    /// ユーザーステータスを変更した新しいインスタンスを返す
    pub fn with_status(self, status: UserStatus, now: DateTime<Utc>) -> Self {
        Self {
            status,
            updated_at: now,
            ..self
        }
    }
}
