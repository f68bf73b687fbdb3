//! # プロファイルハンドラ
//!
//! トークン認証 API 向けのプロファイル取得・更新エンドポイント。
//!
//! ## エンドポイント
//!
//! - `GET /api/profile` - 認証ユーザーのプロファイル取得
//! - `POST /api/profile` - 症状・既往歴の更新と再分析

use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use symptocare_domain::{analysis::AnalysisOutcome, profile::UserProfile};
use symptocare_shared::ApiResponse;
use uuid::Uuid;

use crate::{error::WebError, middleware::CurrentUser, usecase::ProfileUseCase};

/// プロファイル API の共有状態
pub struct ProfileState {
    pub usecase: Arc<dyn ProfileUseCase>,
}

// --- リクエスト/レスポンス型 ---

/// プロファイル更新リクエスト
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub symptoms:        String,
    #[serde(default)]
    pub medical_history: String,
}

/// プロファイル DTO
#[derive(Debug, Serialize)]
pub struct ProfileDto {
    pub user_id:         Uuid,
    pub symptoms:        String,
    pub medical_history: String,
    pub report_url:      Option<String>,
    pub created_at:      String,
    pub updated_at:      String,
}

impl From<UserProfile> for ProfileDto {
    fn from(profile: UserProfile) -> Self {
        Self {
            user_id:         *profile.user_id().as_uuid(),
            symptoms:        profile.symptoms().to_string(),
            medical_history: profile.medical_history().to_string(),
            report_url:      profile.report_url().map(ToString::to_string),
            created_at:      profile.created_at().to_rfc3339(),
            updated_at:      profile.updated_at().to_rfc3339(),
        }
    }
}

/// プロファイル更新レスポンス
#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub message:  &'static str,
    pub analysis: AnalysisOutcome,
}

// --- ハンドラ ---

/// GET /api/profile
///
/// 認証ユーザーのプロファイルを取得する。
///
/// ## レスポンス
///
/// - `200 OK`: プロファイル
/// - `404 Not Found`: まだ症状を送信していないユーザー
pub async fn get_profile(
    State(state): State<Arc<ProfileState>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, WebError> {
    let profile = state.usecase.find_profile(&current_user.user_id).await?;

    Ok(Json(ApiResponse::new(ProfileDto::from(profile))))
}

/// POST /api/profile
///
/// 症状・既往歴を保存し、分析関数を再実行する。
/// 分析が失敗しても保存は成立し、失敗センチネルを返す。
#[tracing::instrument(skip_all)]
pub async fn update_profile(
    State(state): State<Arc<ProfileState>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, WebError> {
    let outcome = state
        .usecase
        .update_profile(&current_user.user_id, &req.symptoms, &req.medical_history)
        .await?;

    Ok(Json(UpdateProfileResponse {
        message:  "Symptoms updated successfully",
        analysis: outcome,
    }))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode},
        routing::get,
    };
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use symptocare_domain::{analysis::AnalysisResult, user::UserId};
    use tower::ServiceExt;

    use super::*;

    /// 記録付きスタブユースケース
    struct StubProfileUseCase {
        profile: Option<UserProfile>,
        updates: std::sync::Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ProfileUseCase for StubProfileUseCase {
        async fn find_profile(&self, _user_id: &UserId) -> Result<UserProfile, WebError> {
            self.profile.clone().ok_or(WebError::NotFound("Profile"))
        }

        async fn update_profile(
            &self,
            _user_id: &UserId,
            symptoms: &str,
            medical_history: &str,
        ) -> Result<AnalysisOutcome, WebError> {
            self.updates
                .lock()
                .unwrap()
                .push((symptoms.to_string(), medical_history.to_string()));
            Ok(AnalysisOutcome::Completed(AnalysisResult {
                conditions:     vec!["Flu".to_string()],
                severity:       "Moderate".to_string(),
                recommendation: vec!["Rest".to_string()],
            }))
        }
    }

    fn current_user() -> CurrentUser {
        CurrentUser {
            user_id:  UserId::new(),
            username: "hanako".to_string(),
        }
    }

    fn create_test_app(stub: Arc<StubProfileUseCase>) -> Router {
        let state = Arc::new(ProfileState { usecase: stub });
        Router::new()
            .route("/api/profile", get(get_profile).post(update_profile))
            .layer(Extension(current_user()))
            .with_state(state)
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_get_profile_保存済みプロファイルが返る() {
        // Given
        let now = Utc::now();
        let profile = UserProfile::new(UserId::new(), now).with_inputs("fever", "asthma", now);
        let stub = Arc::new(StubProfileUseCase {
            profile: Some(profile),
            updates: std::sync::Mutex::new(Vec::new()),
        });
        let sut = create_test_app(stub);
        let request = Request::builder()
            .uri("/api/profile")
            .body(Body::empty())
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["data"]["symptoms"], "fever");
        assert_eq!(json["data"]["medical_history"], "asthma");
        assert_eq!(json["data"]["report_url"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_get_profile_未作成で404() {
        // Given
        let stub = Arc::new(StubProfileUseCase {
            profile: None,
            updates: std::sync::Mutex::new(Vec::new()),
        });
        let sut = create_test_app(stub);
        let request = Request::builder()
            .uri("/api/profile")
            .body(Body::empty())
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = response_json(response).await;
        assert_eq!(json["detail"], "Profile not found");
    }

    #[tokio::test]
    async fn test_update_profile_固定メッセージと分析結果が返る() {
        // Given
        let stub = Arc::new(StubProfileUseCase {
            profile: None,
            updates: std::sync::Mutex::new(Vec::new()),
        });
        let sut = create_test_app(stub.clone());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/profile")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "symptoms": "fever, cough", "medical_history": "asthma" }).to_string(),
            ))
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["message"], "Symptoms updated successfully");
        assert_eq!(json["analysis"]["conditions"][0], "Flu");
        let updates = stub.updates.lock().unwrap();
        assert_eq!(
            *updates,
            vec![("fever, cough".to_string(), "asthma".to_string())]
        );
    }

    #[tokio::test]
    async fn test_update_profile_空ボディはデフォルト値で受ける() {
        // Given
        let stub = Arc::new(StubProfileUseCase {
            profile: None,
            updates: std::sync::Mutex::new(Vec::new()),
        });
        let sut = create_test_app(stub.clone());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/profile")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let updates = stub.updates.lock().unwrap();
        assert_eq!(*updates, vec![(String::new(), String::new())]);
    }
}
