//! # AllergyRepository
//!
//! アレルギー記録の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **フラットな参照データ**: ユーザーとの関連を持たない独立レコード
//! - **last-write-wins**: 楽観ロックは行わない
//! - **一覧は作成順**: `created_at` の昇順で返す

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use symptocare_domain::allergy::{Allergy, AllergyId, AllergyName};
use uuid::Uuid;

use crate::error::InfraError;

/// アレルギーリポジトリトレイト
#[async_trait]
pub trait AllergyRepository: Send + Sync {
    /// すべてのアレルギー記録を取得する（作成順）
    async fn find_all(&self) -> Result<Vec<Allergy>, InfraError>;

    /// ID でアレルギー記録を検索
    async fn find_by_id(&self, id: &AllergyId) -> Result<Option<Allergy>, InfraError>;

    /// アレルギー記録を登録する
    async fn insert(&self, allergy: &Allergy) -> Result<(), InfraError>;

    /// アレルギー記録を更新する
    async fn update(&self, allergy: &Allergy) -> Result<(), InfraError>;

    /// アレルギー記録を削除する
    ///
    /// # 戻り値
    ///
    /// 行が削除された場合は `true`、対象が存在しなかった場合は `false`
    async fn delete(&self, id: &AllergyId) -> Result<bool, InfraError>;
}

/// アレルギーテーブルの行
#[derive(sqlx::FromRow)]
struct AllergyRow {
    id:          Uuid,
    name:        String,
    description: String,
    created_at:  DateTime<Utc>,
    updated_at:  DateTime<Utc>,
}

impl AllergyRow {
    fn into_allergy(self) -> Result<Allergy, InfraError> {
        Ok(Allergy::from_db(
            AllergyId::from_uuid(self.id),
            AllergyName::new(&self.name).map_err(|e| InfraError::unexpected(e.to_string()))?,
            self.description,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// PostgreSQL 実装の AllergyRepository
#[derive(Debug, Clone)]
pub struct PostgresAllergyRepository {
    pool: PgPool,
}

impl PostgresAllergyRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AllergyRepository for PostgresAllergyRepository {
    async fn find_all(&self) -> Result<Vec<Allergy>, InfraError> {
        let rows = sqlx::query_as::<_, AllergyRow>(
            r#"
            SELECT
                id,
                name,
                description,
                created_at,
                updated_at
            FROM allergies
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AllergyRow::into_allergy).collect()
    }

    async fn find_by_id(&self, id: &AllergyId) -> Result<Option<Allergy>, InfraError> {
        let row = sqlx::query_as::<_, AllergyRow>(
            r#"
            SELECT
                id,
                name,
                description,
                created_at,
                updated_at
            FROM allergies
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AllergyRow::into_allergy).transpose()
    }

    async fn insert(&self, allergy: &Allergy) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO allergies (id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(allergy.id().as_uuid())
        .bind(allergy.name().as_str())
        .bind(allergy.description())
        .bind(allergy.created_at())
        .bind(allergy.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, allergy: &Allergy) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE allergies
            SET name = $2, description = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(allergy.id().as_uuid())
        .bind(allergy.name().as_str())
        .bind(allergy.description())
        .bind(allergy.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &AllergyId) -> Result<bool, InfraError> {
        let result = sqlx::query(
            r#"
            DELETE FROM allergies
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
