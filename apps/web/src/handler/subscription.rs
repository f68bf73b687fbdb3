//! # アラート購読ハンドラ
//!
//! 通知トピックへのメール・SMS 購読を受け付ける。
//!
//! ## エンドポイント
//!
//! - `GET /subscribe` - 購読案内の取得
//! - `POST /subscribe` - 購読リクエストの送信

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::{error::WebError, usecase::SubscriptionUseCase};

/// 購読 API の共有状態
pub struct SubscriptionState {
    pub usecase: Arc<dyn SubscriptionUseCase>,
}

// --- リクエスト/レスポンス型 ---

/// 購読リクエスト
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// 固定メッセージレスポンス
#[derive(Debug, Serialize)]
pub struct SubscriptionMessageResponse {
    pub message: &'static str,
}

// --- ハンドラ ---

/// GET /subscribe
///
/// 購読フォームに相当する案内メッセージを返す。
pub async fn get_subscription_prompt() -> impl IntoResponse {
    Json(SubscriptionMessageResponse {
        message: "Provide an email address or phone number to receive health alerts.",
    })
}

/// POST /subscribe
///
/// 提供された連絡先を通知トピックに購読登録する。
///
/// ## レスポンス
///
/// - `200 OK`: 確認メール送信済みメッセージ
/// - `400 Bad Request`: 連絡先が無い、または購読 API の失敗
#[tracing::instrument(skip_all)]
pub async fn subscribe(
    State(state): State<Arc<SubscriptionState>>,
    Json(req): Json<SubscribeRequest>,
) -> Result<impl IntoResponse, WebError> {
    state.usecase.subscribe(req.email, req.phone).await?;

    Ok(Json(SubscriptionMessageResponse {
        message: "Subscription request sent. Please check your email to confirm.",
    }))
}
