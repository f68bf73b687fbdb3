//! # セッション認証ミドルウェア
//!
//! Cookie のセッション ID を Redis のセッションと照合し、
//! 認証済みユーザーをリクエスト拡張に格納する。
//!
//! ## 使い方
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//!
//! let session_auth_state = SessionAuthState {
//!     session_manager: session_manager.clone(),
//! };
//!
//! Router::new()
//!     .route("/dashboard", get(render_dashboard))
//!     .layer(from_fn_with_state(session_auth_state, require_session))
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use symptocare_infra::SessionManager;

use crate::{error::WebError, middleware::CurrentUser};

const SESSION_COOKIE_NAME: &str = "session_id";

/// セッション認証ミドルウェアの状態
#[derive(Clone)]
pub struct SessionAuthState {
    pub session_manager: Arc<dyn SessionManager>,
}

/// セッション認証ミドルウェア
///
/// Cookie のセッション ID からセッションを取得し、有効であれば
/// [`CurrentUser`] をリクエスト拡張に格納する。
/// セッションが存在しない場合は 401 Unauthorized を返す。
pub async fn require_session(
    State(state): State<SessionAuthState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(cookie) = jar.get(SESSION_COOKIE_NAME) else {
        return WebError::Unauthorized.into_response();
    };

    let session = match state.session_manager.get(cookie.value()).await {
        Ok(Some(s)) => s,
        Ok(None) => return WebError::Unauthorized.into_response(),
        Err(e) => return WebError::Infra(e).into_response(),
    };

    request.extensions_mut().insert(CurrentUser {
        user_id:  session.user_id().clone(),
        username: session.username().to_string(),
    });

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Extension, Router,
        http::{Method, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
    };
    use symptocare_domain::user::UserId;
    use symptocare_infra::{SessionData, mock::MockSessionManager};
    use tower::ServiceExt;

    use super::*;

    /// 認証済みユーザー名を返すテスト用ハンドラ
    async fn dummy_handler(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
        user.username
    }

    fn create_test_app(session_manager: Arc<MockSessionManager>) -> Router {
        let state = SessionAuthState {
            session_manager,
        };

        Router::new()
            .route("/test", get(dummy_handler))
            .layer(from_fn_with_state(state, require_session))
    }

    #[tokio::test]
    async fn test_有効なセッションはリクエストが通過する() {
        // Given
        let session_manager = Arc::new(MockSessionManager::new());
        let session_id = session_manager
            .create(&SessionData::new(UserId::new(), "hanako".to_string()))
            .await
            .unwrap();
        let sut = create_test_app(session_manager);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/test")
            .header("Cookie", format!("session_id={session_id}"))
            .body(Body::empty())
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"hanako");
    }

    #[tokio::test]
    async fn test_cookieなしは401を返す() {
        // Given
        let sut = create_test_app(Arc::new(MockSessionManager::new()));

        let request = Request::builder()
            .method(Method::GET)
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_存在しないセッションは401を返す() {
        // Given
        let sut = create_test_app(Arc::new(MockSessionManager::new()));

        let request = Request::builder()
            .method(Method::GET)
            .uri("/test")
            .header("Cookie", "session_id=nonexistent")
            .body(Body::empty())
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
