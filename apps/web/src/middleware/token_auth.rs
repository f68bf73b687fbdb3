//! # トークン認証ミドルウェア
//!
//! `Authorization: Bearer <token>` ヘッダーを検証し、
//! 認証済みユーザーをリクエスト拡張に格納する。
//!
//! ## 使い方
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//!
//! let token_auth_state = TokenAuthState {
//!     token_repository: token_repository.clone(),
//! };
//!
//! Router::new()
//!     .route("/api/symptoms", post(submit_symptoms))
//!     .layer(from_fn_with_state(token_auth_state, require_token))
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use symptocare_domain::token::TokenKey;
use symptocare_infra::repository::TokenRepository;

use crate::{error::WebError, middleware::CurrentUser};

const BEARER_PREFIX: &str = "Bearer ";

/// トークン認証ミドルウェアの状態
#[derive(Clone)]
pub struct TokenAuthState {
    pub token_repository: Arc<dyn TokenRepository>,
}

/// トークン認証ミドルウェア
///
/// Authorization ヘッダーのベアラートークンでユーザーを検索し、
/// アクティブであれば [`CurrentUser`] をリクエスト拡張に格納する。
/// ヘッダーが無い・形式が不正・トークンが未登録・ユーザーが
/// 非アクティブの場合は 401 Unauthorized を返す。
pub async fn require_token(
    State(state): State<TokenAuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer_token(&request) else {
        return WebError::Unauthorized.into_response();
    };

    let Ok(token) = TokenKey::new(token) else {
        return WebError::Unauthorized.into_response();
    };

    let user = match state.token_repository.find_user_by_token(&token).await {
        Ok(Some(u)) => u,
        Ok(None) => return WebError::Unauthorized.into_response(),
        Err(e) => return WebError::Infra(e).into_response(),
    };

    if !user.can_login() {
        return WebError::Unauthorized.into_response();
    }

    request.extensions_mut().insert(CurrentUser {
        user_id:  user.id().clone(),
        username: user.username().as_str().to_string(),
    });

    next.run(request).await
}

/// Authorization ヘッダーからベアラートークンを取り出す
fn extract_bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
}
