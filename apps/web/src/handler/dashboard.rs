//! # ダッシュボードハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /dashboard` - ダッシュボード表示（保留メッセージの排出を含む）
//! - `POST /dashboard` - 症状送信と分析パイプラインの実行
//! - `GET /api/history` - 分析履歴のページ取得
//!
//! レスポンスはダッシュボード表示内容（[`DashboardView`]）を
//! そのまま返す固定形状。履歴のみページネーションエンベロープを使う。

use std::sync::Arc;

use axum::{
    Extension,
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use symptocare_shared::PaginatedResponse;

use crate::{
    error::WebError,
    middleware::CurrentUser,
    usecase::{DashboardView, SubmissionUseCase},
};

/// ダッシュボード API の共有状態
pub struct DashboardState {
    pub usecase: Arc<dyn SubmissionUseCase>,
}

// --- リクエスト型 ---

/// 症状送信リクエスト
///
/// いずれのフィールドも省略可能で、省略時は空文字列として扱う。
#[derive(Debug, Deserialize)]
pub struct SubmitSymptomsRequest {
    #[serde(default)]
    pub symptoms:        String,
    #[serde(default)]
    pub medical_history: String,
}

/// 分析履歴のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub cursor: Option<String>,
    pub limit:  Option<i32>,
}

// --- ハンドラ ---

/// GET /dashboard
///
/// ダッシュボードの初期表示内容を取得する。
/// 保留キューのメッセージを排出する副作用を持つ。
pub async fn show_dashboard(
    State(state): State<Arc<DashboardState>>,
) -> Result<Json<DashboardView>, WebError> {
    let view = state.usecase.render_dashboard().await?;
    Ok(Json(view))
}

/// POST /dashboard
///
/// 症状を送信して分析パイプラインを実行する。
///
/// ## レスポンス
///
/// - `200 OK`: 分析結果を含むダッシュボード表示内容
/// - `500 Internal Server Error`: PDF レポート生成失敗
#[tracing::instrument(skip_all)]
pub async fn submit_symptoms(
    State(state): State<Arc<DashboardState>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<SubmitSymptomsRequest>,
) -> Result<Json<DashboardView>, WebError> {
    let view = state
        .usecase
        .submit_symptoms(
            &current_user.user_id,
            &current_user.username,
            &req.symptoms,
            &req.medical_history,
        )
        .await?;

    Ok(Json(view))
}

/// GET /api/history
///
/// 呼び出したユーザーの分析履歴を新しい順にページ取得する。
pub async fn get_history(
    State(state): State<Arc<DashboardState>>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, WebError> {
    let page = state
        .usecase
        .history_page(&current_user.username, query.cursor, query.limit)
        .await?;

    Ok(Json(PaginatedResponse {
        data:        page.entries,
        next_cursor: page.next_cursor,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

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
    use symptocare_domain::{
        analysis::{AnalysisOutcome, AnalysisResult},
        user::UserId,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::usecase::{HistoryEntryView, HistoryPageView};

    /// 呼び出し内容を記録するスタブ
    #[derive(Clone, Default)]
    struct StubSubmissionUseCase {
        submissions:     Arc<Mutex<Vec<(String, String, String)>>>,
        history_queries: Arc<Mutex<Vec<(String, Option<String>, Option<i32>)>>>,
    }

    fn completed_view(symptoms: &str) -> DashboardView {
        DashboardView {
            messages:         Vec::new(),
            symptoms:         symptoms.to_string(),
            conditions:       vec!["Flu".to_string()],
            result:           Some(AnalysisOutcome::Completed(AnalysisResult {
                conditions:     vec!["Flu".to_string()],
                severity:       "Mild".to_string(),
                recommendation: vec!["Rest".to_string()],
            })),
            severity_level:   Some("Mild".to_string()),
            recommendation:   Some(vec!["Rest".to_string()]),
            disclaimer:       "Kindly consult your doctor.".to_string(),
            analysis_history: Vec::new(),
            report_url:       None,
        }
    }

    #[async_trait]
    impl SubmissionUseCase for StubSubmissionUseCase {
        async fn render_dashboard(&self) -> Result<DashboardView, WebError> {
            let mut view = completed_view("");
            view.messages = vec![json!({"user": "taro"})];
            view.result = None;
            Ok(view)
        }

        async fn submit_symptoms(
            &self,
            _user_id: &UserId,
            username: &str,
            symptoms_raw: &str,
            medical_history_raw: &str,
        ) -> Result<DashboardView, WebError> {
            self.submissions.lock().unwrap().push((
                username.to_string(),
                symptoms_raw.to_string(),
                medical_history_raw.to_string(),
            ));
            Ok(completed_view(symptoms_raw))
        }

        async fn history_page(
            &self,
            username: &str,
            cursor: Option<String>,
            limit: Option<i32>,
        ) -> Result<HistoryPageView, WebError> {
            self.history_queries.lock().unwrap().push((
                username.to_string(),
                cursor,
                limit,
            ));
            Ok(HistoryPageView {
                entries:     vec![HistoryEntryView {
                    symptoms:        "fever".to_string(),
                    medical_history: String::new(),
                    result:          json!({"severity": "Mild"}),
                    report_filename: "hanako_report.pdf".to_string(),
                    created_at:      Utc::now(),
                }],
                next_cursor: Some("cursor-2".to_string()),
            })
        }
    }

    fn current_user() -> CurrentUser {
        CurrentUser {
            user_id:  UserId::new(),
            username: "hanako".to_string(),
        }
    }

    fn create_test_app(stub: StubSubmissionUseCase) -> Router {
        let state = Arc::new(DashboardState {
            usecase: Arc::new(stub),
        });
        Router::new()
            .route("/dashboard", get(show_dashboard).post(submit_symptoms))
            .route("/api/history", get(get_history))
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
    async fn test_show_dashboard_初期表示が返る() {
        // Given
        let sut = create_test_app(StubSubmissionUseCase::default());
        let request = Request::builder()
            .uri("/dashboard")
            .body(Body::empty())
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["messages"], json!([{"user": "taro"}]));
        assert!(json["result"].is_null());
    }

    #[tokio::test]
    async fn test_submit_認証ユーザーと入力がユースケースへ渡る() {
        // Given
        let stub = StubSubmissionUseCase::default();
        let sut = create_test_app(stub.clone());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/dashboard")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "symptoms": "fever, cough", "medical_history": "asthma" }).to_string(),
            ))
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            stub.submissions.lock().unwrap().clone(),
            vec![(
                "hanako".to_string(),
                "fever, cough".to_string(),
                "asthma".to_string()
            )]
        );
        let json = response_json(response).await;
        assert_eq!(json["symptoms"], "fever, cough");
        assert_eq!(json["severity_level"], "Mild");
    }

    #[tokio::test]
    async fn test_submit_フィールドは省略できる() {
        // Given
        let stub = StubSubmissionUseCase::default();
        let sut = create_test_app(stub.clone());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/dashboard")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            stub.submissions.lock().unwrap().clone(),
            vec![("hanako".to_string(), String::new(), String::new())]
        );
    }

    #[tokio::test]
    async fn test_get_history_ページネーション付きで返る() {
        // Given
        let stub = StubSubmissionUseCase::default();
        let sut = create_test_app(stub.clone());
        let request = Request::builder()
            .uri("/api/history?limit=1")
            .body(Body::empty())
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["data"][0]["symptoms"], "fever");
        assert_eq!(json["next_cursor"], "cursor-2");
        assert_eq!(
            stub.history_queries.lock().unwrap().clone(),
            vec![("hanako".to_string(), None, Some(1))]
        );
    }
}
