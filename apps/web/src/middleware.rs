//! # ミドルウェア
//!
//! Web アプリケーション用の認証ミドルウェアを提供する。

mod session_auth;
mod token_auth;

pub use session_auth::{SessionAuthState, require_session};
pub use token_auth::{TokenAuthState, require_token};
use symptocare_domain::user::UserId;

/// 認証済みユーザー情報
///
/// 認証ミドルウェアがリクエスト拡張に格納し、ハンドラが
/// `Extension<CurrentUser>` で取り出す。
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id:  UserId,
    pub username: String,
}
