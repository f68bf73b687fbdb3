//! # UserRepository
//!
//! ユーザー情報と認証情報の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **単一テーブル**: ユーザー属性とパスワードハッシュを `users` テーブルで
//!   一元管理する
//! - **一意制約はデータベースで担保**: ユーザー名・メールアドレスの重複は
//!   UNIQUE インデックス違反を検出して `Conflict` に変換する
//! - **認証用の取得は専用レコード**: ログイン検証にはエンティティではなく
//!   [`UserCredentials`] を返し、パスワードハッシュの取り回しを限定する

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use symptocare_domain::{
    password::PasswordHash,
    user::{Email, User, UserId, UserStatus},
    value_objects::UserName,
};
use uuid::Uuid;

use crate::error::InfraError;

/// ログイン検証用の認証情報レコード
///
/// エンティティ全体ではなく、パスワード検証に必要な最小限の情報のみを持つ。
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id:       UserId,
    pub username:      UserName,
    pub password_hash: PasswordHash,
    pub status:        UserStatus,
}

/// ユーザーリポジトリトレイト
///
/// ユーザー情報の永続化操作を定義する。
/// インフラ層で具体的な実装を提供し、ユースケース層から利用する。
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーとパスワードハッシュを登録する
    ///
    /// # 戻り値
    ///
    /// - `Err(Conflict)`: ユーザー名またはメールアドレスが既に存在する場合
    async fn insert(&self, user: &User, password_hash: &PasswordHash)
    -> Result<(), InfraError>;

    /// ID でユーザーを検索
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError>;

    /// ユーザー名でユーザーを検索
    async fn find_by_username(&self, username: &UserName) -> Result<Option<User>, InfraError>;

    /// ユーザー名で認証情報を検索
    ///
    /// ログイン検証で使用する。見つからない場合も呼び出し元でダミー検証を
    /// 行い、応答時間からユーザーの存在を推測できないようにする。
    async fn find_credentials_by_username(
        &self,
        username: &UserName,
    ) -> Result<Option<UserCredentials>, InfraError>;

    /// 最終ログイン日時を更新
    async fn update_last_login(&self, id: &UserId) -> Result<(), InfraError>;
}

/// ユーザーテーブルの行
#[derive(sqlx::FromRow)]
pub(crate) struct UserRow {
    id:            Uuid,
    username:      String,
    email:         String,
    status:        String,
    last_login_at: Option<DateTime<Utc>>,
    created_at:    DateTime<Utc>,
    updated_at:    DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_user(self) -> Result<User, InfraError> {
        Ok(User::from_db(
            UserId::from_uuid(self.id),
            UserName::new(&self.username).map_err(|e| InfraError::unexpected(e.to_string()))?,
            Email::new(&self.email).map_err(|e| InfraError::unexpected(e.to_string()))?,
            self.status
                .parse::<UserStatus>()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            self.last_login_at,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// PostgreSQL 実装の UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id,
                username,
                email,
                password_hash,
                status,
                last_login_at,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.username().as_str())
        .bind(user.email().as_str())
        .bind(password_hash.as_str())
        .bind(user.status().to_string())
        .bind(user.last_login_at())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                InfraError::conflict("User", user.username().as_str())
            }
            _ => InfraError::from(e),
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id,
                username,
                email,
                status,
                last_login_at,
                created_at,
                updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_username(&self, username: &UserName) -> Result<Option<User>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id,
                username,
                email,
                status,
                last_login_at,
                created_at,
                updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_credentials_by_username(
        &self,
        username: &UserName,
    ) -> Result<Option<UserCredentials>, InfraError> {
        let row = sqlx::query_as::<_, (Uuid, String, String, String)>(
            r#"
            SELECT
                id,
                username,
                password_hash,
                status
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, username, password_hash, status)) = row else {
            return Ok(None);
        };

        Ok(Some(UserCredentials {
            user_id:       UserId::from_uuid(id),
            username:      UserName::new(&username)
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            password_hash: PasswordHash::new(password_hash),
            status:        status
                .parse::<UserStatus>()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
        }))
    }

    async fn update_last_login(&self, id: &UserId) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
