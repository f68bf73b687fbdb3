//! # API トークン
//!
//! プログラムからの API アクセスに使う長命トークン。
//! ユーザーごとに 1 つだけ発行され、再ログインしても同じトークンが返る。

use std::fmt;

use chrono::{DateTime, Utc};

use crate::{DomainError, user::UserId};

/// トークン文字列の固定長
pub const TOKEN_LENGTH: usize = 40;

/// API トークンの鍵文字列
///
/// 認証情報のため `Debug` 出力では `[REDACTED]` にマスクされる。
#[derive(Clone, PartialEq, Eq)]
pub struct TokenKey(String);

impl TokenKey {
    /// トークン鍵を生成する
    ///
    /// # エラー
    ///
    /// 長さが 40 文字ちょうどでない場合は `DomainError::Validation` を返す
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.len() != TOKEN_LENGTH {
            return Err(DomainError::Validation(format!(
                "token must be exactly {TOKEN_LENGTH} characters"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenKey(\"[REDACTED]\")")
    }
}

/// API トークンエンティティ
///
/// # 不変条件
///
/// - `user_id` はシステム内で一意（1 ユーザー 1 トークン）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiToken {
    token:      TokenKey,
    user_id:    UserId,
    created_at: DateTime<Utc>,
}

impl ApiToken {
    /// 新しい API トークンを作成する
    pub fn new(token: TokenKey, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            token,
            user_id,
            created_at: now,
        }
    }

    /// 既存のデータからトークンを復元する（データベースから取得時）
    pub fn from_db(token: TokenKey, user_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            token,
            user_id,
            created_at,
        }
    }

    // Getter メソッド

    pub fn token(&self) -> &TokenKey {
        &self.token
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
