//! # 認証ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /auth/register` - ユーザー登録
//! - `POST /auth/login` - セッションログイン（Cookie 設定）
//! - `POST /auth/logout` - ログアウト（Cookie クリア）
//! - `POST /api/login` - API トークン発行
//! - `GET /api/protected` - トークン認証の確認
//!
//! ## レスポンス形状
//!
//! 認証エンドポイントは歴史的に形状が固定されているため、
//! `ApiResponse` のエンベロープを使わず固定形状をそのまま返す。

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::WebError,
    usecase::{AuthUseCase, RegisterInput},
};

/// セッション ID を保持する Cookie 名
const SESSION_COOKIE_NAME: &str = "session_id";

/// セッション Cookie の有効期間（秒）。Redis 側の TTL と揃える
const SESSION_MAX_AGE_SECS: i64 = 28800;

/// 認証 API の共有状態
pub struct AuthState {
    pub usecase:        Arc<dyn AuthUseCase>,
    /// 本番環境では Cookie に Secure 属性を付与する
    pub secure_cookies: bool,
}

// --- リクエスト/レスポンス型 ---

/// ユーザー登録リクエスト
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email:    String,
    pub password: String,
}

/// ユーザー登録レスポンス
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id:       Uuid,
    pub username: String,
}

/// ログインリクエスト
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// ログインレスポンス
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: LoginUserResponse,
}

/// ログインレスポンスのユーザー情報
#[derive(Debug, Serialize)]
pub struct LoginUserResponse {
    pub id:       Uuid,
    pub username: String,
    pub email:    String,
}

/// API トークン発行レスポンス
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// トークン認証確認レスポンス
#[derive(Debug, Serialize)]
pub struct ProtectedResponse {
    pub message: String,
}

// --- ハンドラ ---

/// POST /auth/register
///
/// ユーザーを登録する。
///
/// ## レスポンス
///
/// - `201 Created`: 作成されたユーザーの ID とユーザー名
/// - `400 Bad Request`: ユーザー名・メール・パスワードの形式が不正
/// - `409 Conflict`: ユーザー名またはメールが重複
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<Arc<AuthState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, WebError> {
    let user = state
        .usecase
        .register(RegisterInput {
            username: req.username,
            email:    req.email,
            password: req.password,
        })
        .await?;

    let response = RegisterResponse {
        id:       *user.id().as_uuid(),
        username: user.username().as_str().to_string(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/login
///
/// ユーザー名とパスワードでログインし、セッション Cookie を設定する。
///
/// ## レスポンス
///
/// - `200 OK`: ユーザー情報 + `session_id` Cookie
/// - `401 Unauthorized`: 認証失敗
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, WebError> {
    let output = state.usecase.login(&req.username, &req.password).await?;

    let jar = jar.add(build_session_cookie(
        &output.session_id,
        state.secure_cookies,
    ));
    let response = LoginResponse {
        user: LoginUserResponse {
            id:       *output.user.id().as_uuid(),
            username: output.user.username().as_str().to_string(),
            email:    output.user.email().as_str().to_string(),
        },
    };

    Ok((jar, Json(response)))
}

/// POST /auth/logout
///
/// セッションを破棄し、Cookie をクリアする。
///
/// ## レスポンス
///
/// - `204 No Content`: ログアウト完了（セッションが無くても成功）
#[tracing::instrument(skip_all)]
pub async fn logout(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, WebError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        state.usecase.logout(cookie.value()).await?;
    }

    let jar = jar.add(build_clear_cookie());
    Ok((jar, StatusCode::NO_CONTENT))
}

/// POST /api/login
///
/// ユーザー名とパスワードを検証し、API トークンを返す。
/// 同じユーザーの再ログインは同じトークンを返す。
///
/// ## レスポンス
///
/// - `200 OK`: `{"token": "..."}`
/// - `400 Bad Request`: 認証失敗（`Invalid credentials`）
#[tracing::instrument(skip_all)]
pub async fn api_login(
    State(state): State<Arc<AuthState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, WebError> {
    let token = state
        .usecase
        .issue_token(&req.username, &req.password)
        .await?;

    Ok(Json(TokenResponse {
        token: token.into_string(),
    }))
}

/// GET /api/protected
///
/// ベアラートークン認証の確認用エンドポイント。
/// トークン認証ミドルウェアを通過した場合のみ到達する。
pub async fn protected_check() -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: "You are authenticated!".to_string(),
    })
}

// --- ヘルパー関数 ---

/// セッション Cookie を構築する
fn build_session_cookie(session_id: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, session_id.to_string()))
        .path("/")
        .max_age(time::Duration::seconds(SESSION_MAX_AGE_SECS))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Cookie をクリアするための Cookie を構築する
fn build_clear_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .max_age(time::Duration::seconds(0))
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
