//! # 認証ユースケース
//!
//! ユーザー登録・セッションログイン・ログアウト・API トークン発行を実装する。
//!
//! ## タイミング攻撃対策
//!
//! パスワード検証では、ユーザーが存在しない場合もダミーハッシュで
//! 検証を実行し、処理時間を均一化する。
//!
//! ## API トークン
//!
//! トークンはユーザーごとに 1 つの 40 文字 16 進文字列。`issue_token` は
//! 毎回新しい候補を生成するが、既にトークンを持つユーザーには既存の
//! トークンをそのまま返す（get-or-create）。

use std::sync::Arc;

use async_trait::async_trait;
use symptocare_domain::{
    DomainError,
    clock::Clock,
    password::{PasswordHash, PlainPassword},
    token::{ApiToken, TOKEN_LENGTH, TokenKey},
    user::{Email, User, UserId, UserStatus},
    value_objects::UserName,
};
use symptocare_infra::{
    PasswordHasher,
    SessionData,
    SessionManager,
    repository::{TokenRepository, UserRepository},
};
use symptocare_shared::{event_log::event, log_business_event};

use crate::error::WebError;

/// ユーザー登録の入力
#[derive(Debug)]
pub struct RegisterInput {
    pub username: String,
    pub email:    String,
    pub password: String,
}

/// セッションログインの結果
#[derive(Debug)]
pub struct LoginOutput {
    pub session_id: String,
    pub user:       User,
}

/// 認証ユースケーストレイト
#[async_trait]
pub trait AuthUseCase: Send + Sync {
    /// ユーザーを登録する
    ///
    /// # エラー
    ///
    /// - `WebError::Domain`: ユーザー名・メール・パスワードの形式が不正
    /// - `WebError::Infra`（409 に変換）: ユーザー名またはメールが重複
    async fn register(&self, input: RegisterInput) -> Result<User, WebError>;

    /// 認証情報を検証してセッションを作成する
    async fn login(&self, username: &str, password: &str) -> Result<LoginOutput, WebError>;

    /// セッションを破棄する
    ///
    /// 存在しないセッション ID を渡しても成功とする。
    async fn logout(&self, session_id: &str) -> Result<(), WebError>;

    /// 認証情報を検証して API トークンを返す
    ///
    /// 同じユーザーが再度呼び出しても同じトークンが返る。
    async fn issue_token(&self, username: &str, password: &str) -> Result<TokenKey, WebError>;
}

/// 認証ユースケースの実装
pub struct AuthUseCaseImpl {
    user_repository:  Arc<dyn UserRepository>,
    token_repository: Arc<dyn TokenRepository>,
    session_manager:  Arc<dyn SessionManager>,
    password_hasher:  Arc<dyn PasswordHasher>,
    clock:            Arc<dyn Clock>,
}

impl AuthUseCaseImpl {
    /// 新しいユースケースインスタンスを作成
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        token_repository: Arc<dyn TokenRepository>,
        session_manager: Arc<dyn SessionManager>,
        password_hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repository,
            token_repository,
            session_manager,
            password_hasher,
            clock,
        }
    }

    pub async fn register(&self, input: RegisterInput) -> Result<User, WebError> {
        let username = UserName::new(&input.username)?;
        let email = Email::new(&input.email)?;

        let password = PlainPassword::new(input.password);
        password.validate_strength()?;
        let password_hash = self.password_hasher.hash(&password)?;

        let user = User::new(UserId::new(), username, email, self.clock.now());
        self.user_repository.insert(&user, &password_hash).await?;

        log_business_event!(
            event.category = event::category::AUTH,
            event.action = event::action::USER_REGISTERED,
            event.entity_type = event::entity_type::USER,
            event.entity_id = %user.id(),
            event.username = user.username().as_str(),
            event.result = event::result::SUCCESS,
            "ユーザーを登録しました"
        );

        Ok(user)
    }

    /// 認証情報を検証してセッションを作成する
    ///
    /// ## タイミング攻撃対策
    ///
    /// ユーザーが見つからない場合もダミーハッシュで検証を実行し、
    /// 処理時間を均一化する。
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutput, WebError> {
        let user_id = self
            .verify_credentials(username, password)
            .await
            .map_err(|e| {
                if matches!(e, WebError::AuthenticationFailed) {
                    log_business_event!(
                        event.category = event::category::AUTH,
                        event.action = event::action::LOGIN_FAILURE,
                        event.username = username,
                        event.result = event::result::FAILURE,
                        "セッションログインに失敗しました"
                    );
                }
                e
            })?;

        let user = self
            .user_repository
            .find_by_id(&user_id)
            .await?
            .ok_or(WebError::AuthenticationFailed)?;

        let _ = self.user_repository.update_last_login(&user_id).await;

        let session_data =
            SessionData::new(user_id.clone(), user.username().as_str().to_string());
        let session_id = self.session_manager.create(&session_data).await?;

        log_business_event!(
            event.category = event::category::AUTH,
            event.action = event::action::LOGIN_SUCCESS,
            event.entity_type = event::entity_type::SESSION,
            event.username = user.username().as_str(),
            event.result = event::result::SUCCESS,
            "セッションログインに成功しました"
        );

        Ok(LoginOutput { session_id, user })
    }

    pub async fn logout(&self, session_id: &str) -> Result<(), WebError> {
        if let Err(e) = self.session_manager.delete(session_id).await {
            tracing::warn!(error = %e, "セッションの削除に失敗しました（ログアウトは継続）");
        }

        log_business_event!(
            event.category = event::category::AUTH,
            event.action = event::action::LOGOUT,
            event.entity_type = event::entity_type::SESSION,
            event.result = event::result::SUCCESS,
            "ログアウトしました"
        );

        Ok(())
    }

    /// 認証情報を検証して API トークンを返す
    ///
    /// 認証失敗は互換性のため 400 となる [`WebError::InvalidCredentials`]
    /// にまとめる。
    pub async fn issue_token(&self, username: &str, password: &str) -> Result<TokenKey, WebError> {
        let user_id = self
            .verify_credentials(username, password)
            .await
            .map_err(|e| match e {
                WebError::AuthenticationFailed => WebError::InvalidCredentials,
                other => other,
            })?;

        let candidate = ApiToken::new(generate_token_key()?, user_id.clone(), self.clock.now());
        let token = self.token_repository.get_or_create(&candidate).await?;

        log_business_event!(
            event.category = event::category::AUTH,
            event.action = event::action::TOKEN_ISSUED,
            event.entity_type = event::entity_type::USER,
            event.entity_id = %user_id,
            event.username = username,
            event.result = event::result::SUCCESS,
            "API トークンを発行しました"
        );

        Ok(token)
    }

    /// ユーザー名とパスワードを検証し、一致したユーザーの ID を返す
    ///
    /// ユーザーが見つからない・非アクティブ・パスワード不一致のいずれも
    /// [`WebError::AuthenticationFailed`] に正規化する。
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserId, WebError> {
        let plain_password = PlainPassword::new(password);

        let Ok(username) = UserName::new(username) else {
            self.dummy_verification(&plain_password);
            return Err(WebError::AuthenticationFailed);
        };

        let Some(credentials) = self
            .user_repository
            .find_credentials_by_username(&username)
            .await?
        else {
            // タイミング攻撃対策: ダミーハッシュで検証を実行
            self.dummy_verification(&plain_password);
            return Err(WebError::AuthenticationFailed);
        };

        if credentials.status != UserStatus::Active {
            self.dummy_verification(&plain_password);
            return Err(WebError::AuthenticationFailed);
        }

        let result = self
            .password_hasher
            .verify(&plain_password, &credentials.password_hash)?;
        if result.is_mismatch() {
            return Err(WebError::AuthenticationFailed);
        }

        Ok(credentials.user_id)
    }

    /// ダミーハッシュで検証を実行する（タイミング攻撃対策）
    ///
    /// ユーザーが存在しない場合も実際のパスワード検証と同等の時間を消費する。
    fn dummy_verification(&self, password: &PlainPassword) {
        // ダミーハッシュ（有効な Argon2id 形式）
        let dummy_hash = PasswordHash::new(
            "$argon2id$v=19$m=65536,t=1,p=1$AAAAAAAAAAAAAAAAAAAAAA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
        );
        // 結果は無視（エラーでも問題ない）
        let _ = self.password_hasher.verify(password, &dummy_hash);
    }
}

#[async_trait]
impl AuthUseCase for AuthUseCaseImpl {
    async fn register(&self, input: RegisterInput) -> Result<User, WebError> {
        self.register(input).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginOutput, WebError> {
        self.login(username, password).await
    }

    async fn logout(&self, session_id: &str) -> Result<(), WebError> {
        self.logout(session_id).await
    }

    async fn issue_token(&self, username: &str, password: &str) -> Result<TokenKey, WebError> {
        self.issue_token(username, password).await
    }
}

/// 40 文字の 16 進トークン鍵を生成する
fn generate_token_key() -> Result<TokenKey, DomainError> {
    use rand::Rng;
    const HEX_CHARS: &[u8] = b"0123456789abcdef";
    let mut rng = rand::rng();
    let key: String = (0..TOKEN_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..HEX_CHARS.len());
            HEX_CHARS[idx] as char
        })
        .collect();
    TokenKey::new(key)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use symptocare_domain::clock::FixedClock;
    use symptocare_infra::mock::{
        MockPasswordHasher,
        MockSessionManager,
        MockTokenRepository,
        MockUserRepository,
    };

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    struct TestEnv {
        user_repository:  Arc<MockUserRepository>,
        token_repository: Arc<MockTokenRepository>,
        session_manager:  Arc<MockSessionManager>,
    }

    impl TestEnv {
        fn new() -> Self {
            Self {
                user_repository:  Arc::new(MockUserRepository::new()),
                token_repository: Arc::new(MockTokenRepository::new()),
                session_manager:  Arc::new(MockSessionManager::new()),
            }
        }

        fn sut(&self) -> AuthUseCaseImpl {
            AuthUseCaseImpl::new(
                self.user_repository.clone(),
                self.token_repository.clone(),
                self.session_manager.clone(),
                Arc::new(MockPasswordHasher::new()),
                Arc::new(FixedClock::new(fixed_now())),
            )
        }

        /// アクティブなユーザーを事前登録する
        fn add_active_user(&self, username: &str, password: &str) -> User {
            let user = User::new(
                UserId::new(),
                UserName::new(username).unwrap(),
                Email::new(format!("{username}@example.com")).unwrap(),
                fixed_now(),
            );
            self.user_repository
                .add_user(user.clone(), MockPasswordHasher::hash_for(password));
            user
        }
    }

    fn register_input(username: &str) -> RegisterInput {
        RegisterInput {
            username: username.to_string(),
            email:    format!("{username}@example.com"),
            password: "password123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_成功() {
        // Given
        let env = TestEnv::new();
        let sut = env.sut();

        // When
        let user = sut.register(register_input("alice")).await.unwrap();

        // Then
        assert_eq!(user.username().as_str(), "alice");
        assert_eq!(user.email().as_str(), "alice@example.com");
        assert!(user.is_active());
    }

    #[tokio::test]
    async fn test_register_ユーザー名重複は409相当のエラー() {
        // Given
        let env = TestEnv::new();
        env.add_active_user("alice", "password123");
        let sut = env.sut();

        // When
        let result = sut.register(register_input("alice")).await;

        // Then
        let Err(WebError::Infra(e)) = result else {
            panic!("Infra エラーになるはず");
        };
        assert!(e.as_conflict().is_some());
    }

    #[tokio::test]
    async fn test_register_短すぎるパスワードは拒否される() {
        // Given
        let env = TestEnv::new();
        let sut = env.sut();
        let input = RegisterInput {
            username: "alice".to_string(),
            email:    "alice@example.com".to_string(),
            password: "short".to_string(),
        };

        // When
        let result = sut.register(input).await;

        // Then
        assert!(matches!(result, Err(WebError::Domain(_))));
    }

    #[tokio::test]
    async fn test_login_成功でセッションが作成される() {
        // Given
        let env = TestEnv::new();
        let registered = env.add_active_user("alice", "password123");
        let sut = env.sut();

        // When
        let output = sut.login("alice", "password123").await.unwrap();

        // Then
        assert_eq!(output.user.id(), registered.id());
        assert_eq!(env.session_manager.session_count(), 1);
        let session = env
            .session_manager
            .get(&output.session_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.username(), "alice");
    }

    #[tokio::test]
    async fn test_login_パスワード不一致() {
        // Given
        let env = TestEnv::new();
        env.add_active_user("alice", "password123");
        let sut = env.sut();

        // When
        let result = sut.login("alice", "wrongpassword").await;

        // Then
        assert!(matches!(result, Err(WebError::AuthenticationFailed)));
        assert_eq!(env.session_manager.session_count(), 0);
    }

    #[tokio::test]
    async fn test_login_ユーザーが存在しない() {
        // Given
        let env = TestEnv::new();
        let sut = env.sut();

        // When
        let result = sut.login("nobody", "password123").await;

        // Then
        assert!(matches!(result, Err(WebError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn test_login_非アクティブユーザーは拒否される() {
        // Given
        let env = TestEnv::new();
        let now = fixed_now();
        let user = User::from_db(
            UserId::new(),
            UserName::new("alice").unwrap(),
            Email::new("alice@example.com").unwrap(),
            UserStatus::Inactive,
            None,
            now,
            now,
        );
        env.user_repository
            .add_user(user, MockPasswordHasher::hash_for("password123"));
        let sut = env.sut();

        // When
        let result = sut.login("alice", "password123").await;

        // Then
        assert!(matches!(result, Err(WebError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn test_logout_セッションが削除される() {
        // Given
        let env = TestEnv::new();
        env.add_active_user("alice", "password123");
        let sut = env.sut();
        let output = sut.login("alice", "password123").await.unwrap();

        // When
        sut.logout(&output.session_id).await.unwrap();

        // Then
        assert_eq!(env.session_manager.session_count(), 0);
    }

    #[tokio::test]
    async fn test_logout_存在しないセッションでも成功する() {
        // Given
        let env = TestEnv::new();
        let sut = env.sut();

        // When / Then
        sut.logout("nonexistent").await.unwrap();
    }

    #[tokio::test]
    async fn test_issue_token_成功() {
        // Given
        let env = TestEnv::new();
        env.add_active_user("alice", "password123");
        let sut = env.sut();

        // When
        let token = sut.issue_token("alice", "password123").await.unwrap();

        // Then
        assert_eq!(token.as_str().len(), 40);
        assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_issue_token_再ログインは同じトークンを返す() {
        // Given
        let env = TestEnv::new();
        env.add_active_user("alice", "password123");
        let sut = env.sut();

        // When
        let first = sut.issue_token("alice", "password123").await.unwrap();
        let second = sut.issue_token("alice", "password123").await.unwrap();

        // Then
        assert_eq!(first.as_str(), second.as_str());
    }

    #[tokio::test]
    async fn test_issue_token_認証失敗はinvalid_credentials() {
        // Given
        let env = TestEnv::new();
        env.add_active_user("alice", "password123");
        let sut = env.sut();

        // When
        let result = sut.issue_token("alice", "wrongpassword").await;

        // Then
        assert!(matches!(result, Err(WebError::InvalidCredentials)));
    }

    #[test]
    fn test_生成されるトークン鍵は毎回異なる() {
        let first = generate_token_key().unwrap();
        let second = generate_token_key().unwrap();

        assert_ne!(first.as_str(), second.as_str());
    }
}
