//! # TokenRepository
//!
//! API トークンの永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **1 ユーザー 1 トークン**: `user_id` の UNIQUE 制約で担保する
//! - **get-or-create**: 既にトークンを持つユーザーには既存のトークンを返す。
//!   `ON CONFLICT DO UPDATE`（無変更更新）で単一クエリの原子的操作にする

use async_trait::async_trait;
use sqlx::PgPool;
use symptocare_domain::{
    token::{ApiToken, TokenKey},
    user::User,
};

use super::user_repository::UserRow;
use crate::error::InfraError;

/// API トークンリポジトリトレイト
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// トークンを取得または作成する
    ///
    /// ユーザーが既にトークンを持つ場合は候補を破棄して既存のトークンを
    /// 返す。持たない場合は候補を登録してそのまま返す。
    async fn get_or_create(&self, candidate: &ApiToken) -> Result<TokenKey, InfraError>;

    /// トークンでユーザーを検索する
    ///
    /// ベアラー認証ミドルウェアで使用する。
    async fn find_user_by_token(&self, token: &TokenKey) -> Result<Option<User>, InfraError>;
}

/// PostgreSQL 実装の TokenRepository
#[derive(Debug, Clone)]
pub struct PostgresTokenRepository {
    pool: PgPool,
}

impl PostgresTokenRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PostgresTokenRepository {
    async fn get_or_create(&self, candidate: &ApiToken) -> Result<TokenKey, InfraError> {
        // 既存行がある場合は無変更更新で既存トークンを RETURNING させる
        let token = sqlx::query_scalar::<_, String>(
            r#"
            INSERT INTO api_tokens (token, user_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET token = api_tokens.token
            RETURNING token
            "#,
        )
        .bind(candidate.token().as_str())
        .bind(candidate.user_id().as_uuid())
        .bind(candidate.created_at())
        .fetch_one(&self.pool)
        .await?;

        TokenKey::new(token).map_err(|e| InfraError::unexpected(e.to_string()))
    }

    async fn find_user_by_token(&self, token: &TokenKey) -> Result<Option<User>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                u.id,
                u.username,
                u.email,
                u.status,
                u.last_login_at,
                u.created_at,
                u.updated_at
            FROM api_tokens t
            INNER JOIN users u ON u.id = t.user_id
            WHERE t.token = $1
            "#,
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }
}
