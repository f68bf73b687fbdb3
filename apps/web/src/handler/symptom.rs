//! # 症状分析ハンドラ
//!
//! トークン認証 API 向けの単発分析エンドポイント。
//! プロファイルを変更せず、分析結果のみを返す。

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;

use crate::{error::WebError, usecase::SymptomUseCase};

/// 症状分析 API の共有状態
pub struct SymptomState {
    pub usecase: Arc<dyn SymptomUseCase>,
}

/// 症状分析リクエスト
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub symptoms:        Vec<String>,
    #[serde(default)]
    pub medical_history: Vec<String>,
}

/// POST /api/symptoms
///
/// 症状リストを分析関数に渡し、結果をそのまま返す。
///
/// ## レスポンス
///
/// - `200 OK`: 分析結果（失敗時は `{"error": ...}` のセンチネル結果）
/// - `400 Bad Request`: 症状リストが空
#[tracing::instrument(skip_all)]
pub async fn analyze_symptoms(
    State(state): State<Arc<SymptomState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<impl IntoResponse, WebError> {
    let outcome = state
        .usecase
        .analyze(req.symptoms, req.medical_history)
        .await?;

    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode},
        routing::post,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use symptocare_domain::analysis::{AnalysisOutcome, AnalysisResult};
    use tower::ServiceExt;

    use super::*;

    /// 記録付きスタブユースケース
    struct StubSymptomUseCase {
        requests: Mutex<Vec<(Vec<String>, Vec<String>)>>,
    }

    #[async_trait]
    impl SymptomUseCase for StubSymptomUseCase {
        async fn analyze(
            &self,
            symptoms: Vec<String>,
            medical_history: Vec<String>,
        ) -> Result<AnalysisOutcome, WebError> {
            if symptoms.is_empty() {
                return Err(WebError::Validation("Symptoms are required".to_string()));
            }
            self.requests
                .lock()
                .unwrap()
                .push((symptoms, medical_history));
            Ok(AnalysisOutcome::Completed(AnalysisResult {
                conditions:     vec!["Common Cold".to_string()],
                severity:       "Mild".to_string(),
                recommendation: vec!["Hydrate".to_string()],
            }))
        }
    }

    fn create_test_app(stub: Arc<StubSymptomUseCase>) -> Router {
        let state = Arc::new(SymptomState { usecase: stub });
        Router::new()
            .route("/api/symptoms", post(analyze_symptoms))
            .with_state(state)
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_分析結果がそのまま返る() {
        // Given
        let stub = Arc::new(StubSymptomUseCase {
            requests: Mutex::new(Vec::new()),
        });
        let sut = create_test_app(stub.clone());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/symptoms")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "symptoms": ["sneezing", "runny nose"],
                    "medical_history": ["hay fever"],
                })
                .to_string(),
            ))
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["conditions"][0], "Common Cold");
        assert_eq!(json["severity"], "Mild");
        assert_eq!(json["recommendation"][0], "Hydrate");
        let requests = stub.requests.lock().unwrap();
        assert_eq!(requests[0].0, vec!["sneezing", "runny nose"]);
    }

    #[tokio::test]
    async fn test_analyze_症状が空なら400() {
        // Given
        let stub = Arc::new(StubSymptomUseCase {
            requests: Mutex::new(Vec::new()),
        });
        let sut = create_test_app(stub);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/symptoms")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "medical_history": [] }).to_string()))
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["detail"], "Symptoms are required");
    }
}
