//! # Web アプリケーションエラー定義
//!
//! ハンドラ・ユースケースで発生するエラーと、HTTP レスポンス
//! （RFC 9457 Problem Details）への変換を定義する。
//!
//! ## ステータスコードの方針
//!
//! - セッションログインの認証失敗は 401、`/api/login` の認証失敗は
//!   互換性のため 400 を返す
//! - レポート PDF の生成失敗は分析パイプラインで唯一の致命的エラーで、
//!   固定メッセージ `Error creating PDF report.` の 500 を返す
//! - インフラ層の一意制約違反（ユーザー名・メールの重複など）は 409

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use symptocare_domain::DomainError;
use symptocare_infra::InfraError;
use symptocare_shared::ErrorResponse;
use thiserror::Error;

/// Web アプリケーションで発生するエラー
#[derive(Debug, Error)]
pub enum WebError {
    /// セッション・トークンが無い、または無効
    #[error("認証が必要です")]
    Unauthorized,

    /// ログイン認証失敗（セッションログイン）
    #[error("ユーザー名またはパスワードが正しくありません")]
    AuthenticationFailed,

    /// API ログインの認証失敗
    #[error("認証情報が不正です")]
    InvalidCredentials,

    /// 入力バリデーションエラー
    #[error("入力が不正です: {0}")]
    Validation(String),

    /// リソースが見つからない（"Profile", "Allergy" など）
    #[error("{0} が見つかりません")]
    NotFound(&'static str),

    /// 購読登録の失敗
    #[error("購読登録に失敗しました")]
    SubscriptionFailed,

    /// レポート PDF の生成失敗
    #[error("レポート生成に失敗しました: {0}")]
    ReportGeneration(#[source] InfraError),

    /// ドメイン層のエラー
    #[error("ドメインエラー: {0}")]
    Domain(#[from] DomainError),

    /// インフラ層のエラー
    #[error("インフラエラー: {0}")]
    Infra(#[from] InfraError),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let body = match &self {
            WebError::Unauthorized => ErrorResponse::unauthorized("Authentication required"),
            WebError::AuthenticationFailed => {
                ErrorResponse::unauthorized("Invalid username or password")
            }
            WebError::InvalidCredentials => ErrorResponse::bad_request("Invalid credentials"),
            WebError::Validation(detail) => ErrorResponse::validation_error(detail.clone()),
            WebError::NotFound(entity) => ErrorResponse::not_found(format!("{entity} not found")),
            WebError::SubscriptionFailed => {
                ErrorResponse::bad_request("Failed to subscribe. Please try again later.")
            }
            WebError::ReportGeneration(e) => {
                tracing::error!(error = %e, span_trace = %e.span_trace(), "レポート生成に失敗しました");
                ErrorResponse::new(
                    "report-generation",
                    "Report Generation Failed",
                    500,
                    "Error creating PDF report.",
                )
            }
            WebError::Domain(e) => match e {
                DomainError::Validation(detail) => ErrorResponse::validation_error(detail.clone()),
                DomainError::NotFound { entity_type, .. } => {
                    ErrorResponse::not_found(format!("{entity_type} not found"))
                }
            },
            WebError::Infra(e) => {
                if let Some((entity, _)) = e.as_conflict() {
                    ErrorResponse::conflict(format!("{entity} already exists"))
                } else {
                    tracing::error!(error = %e, span_trace = %e.span_trace(), "インフラエラーが発生しました");
                    ErrorResponse::internal_error()
                }
            }
        };

        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}
