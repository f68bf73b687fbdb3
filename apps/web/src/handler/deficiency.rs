//! # 栄養欠乏症記録ハンドラ
//!
//! アレルギー記録と同じ構成。セッション認証の画面系ルートと
//! トークン認証の `/api` ルートの両方から使う。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use symptocare_domain::deficiency::{Deficiency, DeficiencyId};
use symptocare_shared::ApiResponse;
use uuid::Uuid;

use crate::{error::WebError, usecase::DeficiencyUseCase};

/// 栄養欠乏症 API の共有状態
pub struct DeficiencyState {
    pub usecase: Arc<dyn DeficiencyUseCase>,
}

// --- リクエスト/レスポンス型 ---

/// 栄養欠乏症作成・更新リクエスト
#[derive(Debug, Deserialize)]
pub struct DeficiencyRequest {
    pub name:        String,
    #[serde(default)]
    pub description: String,
}

/// 栄養欠乏症 DTO
#[derive(Debug, Serialize)]
pub struct DeficiencyDto {
    pub id:          Uuid,
    pub name:        String,
    pub description: String,
    pub created_at:  String,
    pub updated_at:  String,
}

impl From<Deficiency> for DeficiencyDto {
    fn from(deficiency: Deficiency) -> Self {
        Self {
            id:          *deficiency.id().as_uuid(),
            name:        deficiency.name().as_str().to_string(),
            description: deficiency.description().to_string(),
            created_at:  deficiency.created_at().to_rfc3339(),
            updated_at:  deficiency.updated_at().to_rfc3339(),
        }
    }
}

// --- ハンドラ ---

/// GET /deficiencies
pub async fn list_deficiencies(
    State(state): State<Arc<DeficiencyState>>,
) -> Result<impl IntoResponse, WebError> {
    let deficiencies = state.usecase.list().await?;
    let items: Vec<DeficiencyDto> = deficiencies.into_iter().map(DeficiencyDto::from).collect();

    Ok(Json(ApiResponse::new(items)))
}

/// POST /deficiencies
#[tracing::instrument(skip_all)]
pub async fn create_deficiency(
    State(state): State<Arc<DeficiencyState>>,
    Json(req): Json<DeficiencyRequest>,
) -> Result<impl IntoResponse, WebError> {
    let deficiency = state.usecase.create(req.name, req.description).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(DeficiencyDto::from(deficiency))),
    ))
}

/// GET /deficiencies/{id}
pub async fn get_deficiency(
    State(state): State<Arc<DeficiencyState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    let deficiency = state.usecase.fetch(&DeficiencyId::from_uuid(id)).await?;

    Ok(Json(ApiResponse::new(DeficiencyDto::from(deficiency))))
}

/// PUT /deficiencies/{id}
#[tracing::instrument(skip_all)]
pub async fn update_deficiency(
    State(state): State<Arc<DeficiencyState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<DeficiencyRequest>,
) -> Result<impl IntoResponse, WebError> {
    let deficiency = state
        .usecase
        .update(&DeficiencyId::from_uuid(id), req.name, req.description)
        .await?;

    Ok(Json(ApiResponse::new(DeficiencyDto::from(deficiency))))
}

/// GET /deficiencies/{id}/delete
///
/// 削除確認のために記録を返す。削除は行わない。
pub async fn confirm_delete_deficiency(
    State(state): State<Arc<DeficiencyState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    let deficiency = state.usecase.fetch(&DeficiencyId::from_uuid(id)).await?;

    Ok(Json(ApiResponse::new(DeficiencyDto::from(deficiency))))
}

/// POST /deficiencies/{id}/delete
#[tracing::instrument(skip_all)]
pub async fn delete_deficiency(
    State(state): State<Arc<DeficiencyState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    state.usecase.delete(&DeficiencyId::from_uuid(id)).await?;

    Ok(StatusCode::NO_CONTENT)
}
