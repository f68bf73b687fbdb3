//! # ヘルスチェックハンドラ
//!
//! アプリケーションの稼働状態を確認するためのエンドポイント。
//!
//! - `/health` - Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready` - Readiness Check（PostgreSQL / Redis の接続状態を確認）
//!
//! レスポンス型は [`symptocare_shared::HealthResponse`] /
//! [`symptocare_shared::health::ReadinessResponse`] を参照。

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use symptocare_shared::{
    HealthResponse,
    health::{CheckStatus, ReadinessResponse, ReadinessStatus},
};

/// ヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness Check 用の State
pub struct ReadinessState {
    pub pool:       PgPool,
    pub redis_conn: ConnectionManager,
}

/// Readiness Check エンドポイント
///
/// PostgreSQL と Redis の接続状態を並行チェックする。
/// 全チェック OK → 200、1 つでも失敗 → 503。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    // PostgreSQL と Redis を並行チェック
    let (database_result, redis_result) = tokio::join!(
        check_database(&state.pool),
        check_redis(state.redis_conn.clone()),
    );

    let mut checks = HashMap::new();
    checks.insert("database".to_string(), database_result);
    checks.insert("redis".to_string(), redis_result);

    let all_ok = checks.values().all(|s| matches!(s, CheckStatus::Ok));
    let status = if all_ok {
        ReadinessStatus::Ready
    } else {
        ReadinessStatus::NotReady
    };
    let http_status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (http_status, Json(ReadinessResponse { status, checks }))
}

/// PostgreSQL への接続を `SELECT 1` で確認する（タイムアウト: 5 秒）
async fn check_database(pool: &PgPool) -> CheckStatus {
    match tokio::time::timeout(
        Duration::from_secs(5),
        sqlx::query("SELECT 1").execute(pool),
    )
    .await
    {
        Ok(Ok(_)) => CheckStatus::Ok,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check: database query failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!("readiness check: database check timed out");
            CheckStatus::Error
        }
    }
}

/// Redis への接続を PING で確認する（タイムアウト: 5 秒）
async fn check_redis(mut conn: ConnectionManager) -> CheckStatus {
    match tokio::time::timeout(
        Duration::from_secs(5),
        redis::cmd("PING").query_async::<String>(&mut conn),
    )
    .await
    {
        Ok(Ok(_)) => CheckStatus::Ok,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check: redis ping failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!("readiness check: redis check timed out");
            CheckStatus::Error
        }
    }
}
