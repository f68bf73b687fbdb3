//! # DeficiencyRepository
//!
//! 栄養不足記録の永続化を担当するリポジトリ。
//!
//! 設計方針は [`super::allergy_repository`] と同じ。独立した参照データを
//! last-write-wins で CRUD する。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use symptocare_domain::deficiency::{Deficiency, DeficiencyId, DeficiencyName};
use uuid::Uuid;

use crate::error::InfraError;

/// 栄養不足リポジトリトレイト
#[async_trait]
pub trait DeficiencyRepository: Send + Sync {
    /// すべての栄養不足記録を取得する（作成順）
    async fn find_all(&self) -> Result<Vec<Deficiency>, InfraError>;

    /// ID で栄養不足記録を検索
    async fn find_by_id(&self, id: &DeficiencyId) -> Result<Option<Deficiency>, InfraError>;

    /// 栄養不足記録を登録する
    async fn insert(&self, deficiency: &Deficiency) -> Result<(), InfraError>;

    /// 栄養不足記録を更新する
    async fn update(&self, deficiency: &Deficiency) -> Result<(), InfraError>;

    /// 栄養不足記録を削除する
    ///
    /// # 戻り値
    ///
    /// 行が削除された場合は `true`、対象が存在しなかった場合は `false`
    async fn delete(&self, id: &DeficiencyId) -> Result<bool, InfraError>;
}

/// 栄養不足テーブルの行
#[derive(sqlx::FromRow)]
struct DeficiencyRow {
    id:          Uuid,
    name:        String,
    description: String,
    created_at:  DateTime<Utc>,
    updated_at:  DateTime<Utc>,
}

impl DeficiencyRow {
    fn into_deficiency(self) -> Result<Deficiency, InfraError> {
        Ok(Deficiency::from_db(
            DeficiencyId::from_uuid(self.id),
            DeficiencyName::new(&self.name)
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            self.description,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// PostgreSQL 実装の DeficiencyRepository
#[derive(Debug, Clone)]
pub struct PostgresDeficiencyRepository {
    pool: PgPool,
}

impl PostgresDeficiencyRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeficiencyRepository for PostgresDeficiencyRepository {
    async fn find_all(&self) -> Result<Vec<Deficiency>, InfraError> {
        let rows = sqlx::query_as::<_, DeficiencyRow>(
            r#"
            SELECT
                id,
                name,
                description,
                created_at,
                updated_at
            FROM deficiencies
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DeficiencyRow::into_deficiency).collect()
    }

    async fn find_by_id(&self, id: &DeficiencyId) -> Result<Option<Deficiency>, InfraError> {
        let row = sqlx::query_as::<_, DeficiencyRow>(
            r#"
            SELECT
                id,
                name,
                description,
                created_at,
                updated_at
            FROM deficiencies
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(DeficiencyRow::into_deficiency).transpose()
    }

    async fn insert(&self, deficiency: &Deficiency) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO deficiencies (id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(deficiency.id().as_uuid())
        .bind(deficiency.name().as_str())
        .bind(deficiency.description())
        .bind(deficiency.created_at())
        .bind(deficiency.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, deficiency: &Deficiency) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE deficiencies
            SET name = $2, description = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(deficiency.id().as_uuid())
        .bind(deficiency.name().as_str())
        .bind(deficiency.description())
        .bind(deficiency.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &DeficiencyId) -> Result<bool, InfraError> {
        let result = sqlx::query(
            r#"
            DELETE FROM deficiencies
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
