//! # ProfileRepository
//!
//! ユーザープロフィールの永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **1 ユーザー 1 行**: `user_id` の UNIQUE 制約で担保する
//! - **行が無い状態は正常**: 登録時にはプロフィールを作成しない。
//!   存在しない場合の扱い（スキップ / 作成）は呼び出し元が決める
//! - **last-write-wins**: 楽観ロックは行わない

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use symptocare_domain::{
    profile::{ProfileId, UserProfile},
    user::UserId,
};
use uuid::Uuid;

use crate::error::InfraError;

/// プロフィールリポジトリトレイト
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// ユーザー ID でプロフィールを検索
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<UserProfile>, InfraError>;

    /// プロフィールを登録する
    ///
    /// # 戻り値
    ///
    /// - `Err(Conflict)`: 同じユーザーのプロフィールが既に存在する場合
    async fn insert(&self, profile: &UserProfile) -> Result<(), InfraError>;

    /// プロフィールを更新する
    async fn update(&self, profile: &UserProfile) -> Result<(), InfraError>;
}

/// プロフィールテーブルの行
#[derive(sqlx::FromRow)]
struct ProfileRow {
    id:              Uuid,
    user_id:         Uuid,
    symptoms:        String,
    medical_history: String,
    report_url:      Option<String>,
    created_at:      DateTime<Utc>,
    updated_at:      DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> UserProfile {
        UserProfile::from_db(
            ProfileId::from_uuid(self.id),
            UserId::from_uuid(self.user_id),
            self.symptoms,
            self.medical_history,
            self.report_url,
            self.created_at,
            self.updated_at,
        )
    }
}

/// PostgreSQL 実装の ProfileRepository
#[derive(Debug, Clone)]
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProfile>, InfraError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT
                id,
                user_id,
                symptoms,
                medical_history,
                report_url,
                created_at,
                updated_at
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ProfileRow::into_profile))
    }

    async fn insert(&self, profile: &UserProfile) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (
                id,
                user_id,
                symptoms,
                medical_history,
                report_url,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(profile.id().as_uuid())
        .bind(profile.user_id().as_uuid())
        .bind(profile.symptoms())
        .bind(profile.medical_history())
        .bind(profile.report_url())
        .bind(profile.created_at())
        .bind(profile.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                InfraError::conflict("UserProfile", profile.user_id().as_uuid().to_string())
            }
            _ => InfraError::from(e),
        })?;

        Ok(())
    }

    async fn update(&self, profile: &UserProfile) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE user_profiles
            SET
                symptoms = $2,
                medical_history = $3,
                report_url = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(profile.id().as_uuid())
        .bind(profile.symptoms())
        .bind(profile.medical_history())
        .bind(profile.report_url())
        .bind(profile.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
