//! # アレルギー記録ハンドラ
//!
//! ## エンドポイント
//!
//! セッション認証の画面系ルートとトークン認証の `/api` ルートの
//! 両方から同じハンドラを使う。
//!
//! - `GET /allergies`（`GET /api/allergies`） - 一覧
//! - `POST /allergies`（`POST /api/allergies`） - 作成
//! - `GET /allergies/{id}` - 詳細
//! - `PUT /allergies/{id}` - 更新
//! - `GET /allergies/{id}/delete` - 削除確認（記録を返すのみ）
//! - `POST /allergies/{id}/delete` - 削除実行

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use symptocare_domain::allergy::{Allergy, AllergyId};
use symptocare_shared::ApiResponse;
use uuid::Uuid;

use crate::{error::WebError, usecase::AllergyUseCase};

/// アレルギー API の共有状態
pub struct AllergyState {
    pub usecase: Arc<dyn AllergyUseCase>,
}

// --- リクエスト/レスポンス型 ---

/// アレルギー作成・更新リクエスト
#[derive(Debug, Deserialize)]
pub struct AllergyRequest {
    pub name:        String,
    #[serde(default)]
    pub description: String,
}

/// アレルギー DTO
#[derive(Debug, Serialize)]
pub struct AllergyDto {
    pub id:          Uuid,
    pub name:        String,
    pub description: String,
    pub created_at:  String,
    pub updated_at:  String,
}

impl From<Allergy> for AllergyDto {
    fn from(allergy: Allergy) -> Self {
        Self {
            id:          *allergy.id().as_uuid(),
            name:        allergy.name().as_str().to_string(),
            description: allergy.description().to_string(),
            created_at:  allergy.created_at().to_rfc3339(),
            updated_at:  allergy.updated_at().to_rfc3339(),
        }
    }
}

// --- ハンドラ ---

/// GET /allergies
///
/// アレルギー記録の一覧を取得する。
pub async fn list_allergies(
    State(state): State<Arc<AllergyState>>,
) -> Result<impl IntoResponse, WebError> {
    let allergies = state.usecase.list().await?;
    let items: Vec<AllergyDto> = allergies.into_iter().map(AllergyDto::from).collect();

    Ok(Json(ApiResponse::new(items)))
}

/// POST /allergies
///
/// アレルギー記録を作成する。
///
/// ## レスポンス
///
/// - `201 Created`: 作成された記録
/// - `400 Bad Request`: 名称が空または長すぎる
#[tracing::instrument(skip_all)]
pub async fn create_allergy(
    State(state): State<Arc<AllergyState>>,
    Json(req): Json<AllergyRequest>,
) -> Result<impl IntoResponse, WebError> {
    let allergy = state.usecase.create(req.name, req.description).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(AllergyDto::from(allergy))),
    ))
}

/// GET /allergies/{id}
///
/// アレルギー記録を 1 件取得する。
pub async fn get_allergy(
    State(state): State<Arc<AllergyState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    let allergy = state.usecase.fetch(&AllergyId::from_uuid(id)).await?;

    Ok(Json(ApiResponse::new(AllergyDto::from(allergy))))
}

/// PUT /allergies/{id}
///
/// アレルギー記録を更新する（後勝ち）。
#[tracing::instrument(skip_all)]
pub async fn update_allergy(
    State(state): State<Arc<AllergyState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AllergyRequest>,
) -> Result<impl IntoResponse, WebError> {
    let allergy = state
        .usecase
        .update(&AllergyId::from_uuid(id), req.name, req.description)
        .await?;

    Ok(Json(ApiResponse::new(AllergyDto::from(allergy))))
}

/// GET /allergies/{id}/delete
///
/// 削除確認のために記録を返す。削除は行わない。
pub async fn confirm_delete_allergy(
    State(state): State<Arc<AllergyState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    let allergy = state.usecase.fetch(&AllergyId::from_uuid(id)).await?;

    Ok(Json(ApiResponse::new(AllergyDto::from(allergy))))
}

/// POST /allergies/{id}/delete
///
/// アレルギー記録を削除する。
///
/// ## レスポンス
///
/// - `204 No Content`: 削除成功
/// - `404 Not Found`: 記録が見つからない
#[tracing::instrument(skip_all)]
pub async fn delete_allergy(
    State(state): State<Arc<AllergyState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    state.usecase.delete(&AllergyId::from_uuid(id)).await?;

    Ok(StatusCode::NO_CONTENT)
}
