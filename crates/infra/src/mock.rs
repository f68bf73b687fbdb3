//! # テスト用モック実装
//!
//! ユースケーステストで使用するインメモリのモックリポジトリと
//! モック外部サービスクライアント。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! symptocare-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! 外部サービスのモック（キュー、通知、ストレージなど）は `set_fail` で
//! 失敗を注入できる。分析パイプラインの「失敗しても応答は返る」という
//! 性質のテストに使用する。

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use symptocare_domain::{
    allergy::{Allergy, AllergyId},
    analysis::{AnalysisRequest, AnalysisResult, DEFAULT_SEVERITY},
    deficiency::{Deficiency, DeficiencyId},
    history::HistoryEntry,
    password::{PasswordHash, PasswordVerifyResult, PlainPassword},
    profile::UserProfile,
    token::{ApiToken, TokenKey},
    user::{User, UserId},
    value_objects::UserName,
};
use uuid::Uuid;

use crate::{
    error::InfraError,
    lambda::AnalysisInvoker,
    password::PasswordHasher,
    report::ReportRenderer,
    repository::{
        AllergyRepository,
        DeficiencyRepository,
        HistoryPage,
        HistoryRepository,
        ProfileRepository,
        TokenRepository,
        UserCredentials,
        UserRepository,
    },
    s3::ReportStorage,
    session::{SessionData, SessionManager},
    sns::NotificationPublisher,
    sqs::MessageQueue,
};

// ===== MockSessionManager =====

/// テスト用のインメモリ SessionManager
#[derive(Clone, Default)]
pub struct MockSessionManager {
    sessions: Arc<Mutex<Vec<(String, SessionData)>>>,
}

impl MockSessionManager {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 保持しているセッション数を返す
    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionManager for MockSessionManager {
    async fn create(&self, data: &SessionData) -> Result<String, InfraError> {
        let session_id = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .unwrap()
            .push((session_id.clone(), data.clone()));
        Ok(session_id)
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == session_id)
            .map(|(_, data)| data.clone()))
    }

    async fn delete(&self, session_id: &str) -> Result<(), InfraError> {
        self.sessions
            .lock()
            .unwrap()
            .retain(|(id, _)| id != session_id);
        Ok(())
    }

    async fn get_ttl(&self, session_id: &str) -> Result<Option<i64>, InfraError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .any(|(id, _)| id == session_id)
            .then_some(28800))
    }
}

// ===== MockPasswordHasher =====

/// テスト用のモック PasswordHasher
///
/// Argon2 の実計算は遅いため、`hashed:{平文}` 形式の決定的な疑似ハッシュを
/// 使用する。
#[derive(Clone, Default)]
pub struct MockPasswordHasher;

impl MockPasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// 平文に対応する疑似ハッシュを生成する（テストデータ準備用）
    pub fn hash_for(password: &str) -> PasswordHash {
        PasswordHash::new(format!("hashed:{password}"))
    }
}

impl PasswordHasher for MockPasswordHasher {
    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, InfraError> {
        Ok(Self::hash_for(password.as_str()))
    }

    fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<PasswordVerifyResult, InfraError> {
        Ok(PasswordVerifyResult::from(
            hash.as_str() == format!("hashed:{}", password.as_str()),
        ))
    }
}

// ===== MockUserRepository =====

/// テスト用のモック UserRepository
#[derive(Clone, Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<Vec<(User, PasswordHash)>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// ユーザーを事前登録する
    pub fn add_user(&self, user: User, password_hash: PasswordHash) {
        self.users.lock().unwrap().push((user, password_hash));
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), InfraError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|(u, _)| u.username() == user.username() || u.email() == user.email())
        {
            return Err(InfraError::conflict("User", user.username().as_str()));
        }
        users.push((user.clone(), password_hash.clone()));
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.id() == id)
            .map(|(u, _)| u.clone()))
    }

    async fn find_by_username(&self, username: &UserName) -> Result<Option<User>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.username() == username)
            .map(|(u, _)| u.clone()))
    }

    async fn find_credentials_by_username(
        &self,
        username: &UserName,
    ) -> Result<Option<UserCredentials>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.username() == username)
            .map(|(u, hash)| UserCredentials {
                user_id:       u.id().clone(),
                username:      u.username().clone(),
                password_hash: hash.clone(),
                status:        u.status(),
            }))
    }

    async fn update_last_login(&self, id: &UserId) -> Result<(), InfraError> {
        let mut users = self.users.lock().unwrap();
        if let Some(pos) = users.iter().position(|(u, _)| u.id() == id) {
            let (user, hash) = users[pos].clone();
            users[pos] = (user.with_last_login_updated(Utc::now()), hash);
        }
        Ok(())
    }
}

// ===== MockTokenRepository =====

/// テスト用のモック TokenRepository
///
/// `find_user_by_token` で返すユーザーは `add_user` で事前登録する。
#[derive(Clone, Default)]
pub struct MockTokenRepository {
    tokens: Arc<Mutex<Vec<ApiToken>>>,
    users:  Arc<Mutex<Vec<User>>>,
}

impl MockTokenRepository {
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(Mutex::new(Vec::new())),
            users:  Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// トークン解決用のユーザーを事前登録する
    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    /// トークンを事前登録する
    pub fn add_token(&self, token: ApiToken) {
        self.tokens.lock().unwrap().push(token);
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn get_or_create(&self, candidate: &ApiToken) -> Result<TokenKey, InfraError> {
        let mut tokens = self.tokens.lock().unwrap();
        if let Some(existing) = tokens.iter().find(|t| t.user_id() == candidate.user_id()) {
            return Ok(existing.token().clone());
        }
        tokens.push(candidate.clone());
        Ok(candidate.token().clone())
    }

    async fn find_user_by_token(&self, token: &TokenKey) -> Result<Option<User>, InfraError> {
        let tokens = self.tokens.lock().unwrap();
        let Some(api_token) = tokens.iter().find(|t| t.token() == token) else {
            return Ok(None);
        };
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id() == api_token.user_id())
            .cloned())
    }
}

// ===== MockProfileRepository =====

/// テスト用のモック ProfileRepository
#[derive(Clone, Default)]
pub struct MockProfileRepository {
    profiles: Arc<Mutex<Vec<UserProfile>>>,
}

impl MockProfileRepository {
    pub fn new() -> Self {
        Self {
            profiles: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// プロフィールを事前登録する
    pub fn add_profile(&self, profile: UserProfile) {
        self.profiles.lock().unwrap().push(profile);
    }
}

#[async_trait]
impl ProfileRepository for MockProfileRepository {
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProfile>, InfraError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id() == user_id)
            .cloned())
    }

    async fn insert(&self, profile: &UserProfile) -> Result<(), InfraError> {
        let mut profiles = self.profiles.lock().unwrap();
        if profiles.iter().any(|p| p.user_id() == profile.user_id()) {
            return Err(InfraError::conflict(
                "UserProfile",
                profile.user_id().as_uuid().to_string(),
            ));
        }
        profiles.push(profile.clone());
        Ok(())
    }

    async fn update(&self, profile: &UserProfile) -> Result<(), InfraError> {
        let mut profiles = self.profiles.lock().unwrap();
        if let Some(pos) = profiles.iter().position(|p| p.id() == profile.id()) {
            profiles[pos] = profile.clone();
        }
        Ok(())
    }
}

// ===== MockAllergyRepository =====

/// テスト用のモック AllergyRepository
#[derive(Clone, Default)]
pub struct MockAllergyRepository {
    allergies: Arc<Mutex<Vec<Allergy>>>,
}

impl MockAllergyRepository {
    pub fn new() -> Self {
        Self {
            allergies: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// アレルギー記録を事前登録する
    pub fn add_allergy(&self, allergy: Allergy) {
        self.allergies.lock().unwrap().push(allergy);
    }
}

#[async_trait]
impl AllergyRepository for MockAllergyRepository {
    async fn find_all(&self) -> Result<Vec<Allergy>, InfraError> {
        Ok(self.allergies.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: &AllergyId) -> Result<Option<Allergy>, InfraError> {
        Ok(self
            .allergies
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id() == id)
            .cloned())
    }

    async fn insert(&self, allergy: &Allergy) -> Result<(), InfraError> {
        self.allergies.lock().unwrap().push(allergy.clone());
        Ok(())
    }

    async fn update(&self, allergy: &Allergy) -> Result<(), InfraError> {
        let mut allergies = self.allergies.lock().unwrap();
        if let Some(pos) = allergies.iter().position(|a| a.id() == allergy.id()) {
            allergies[pos] = allergy.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &AllergyId) -> Result<bool, InfraError> {
        let mut allergies = self.allergies.lock().unwrap();
        let before = allergies.len();
        allergies.retain(|a| a.id() != id);
        Ok(allergies.len() < before)
    }
}

// ===== MockDeficiencyRepository =====

/// テスト用のモック DeficiencyRepository
#[derive(Clone, Default)]
pub struct MockDeficiencyRepository {
    deficiencies: Arc<Mutex<Vec<Deficiency>>>,
}

impl MockDeficiencyRepository {
    pub fn new() -> Self {
        Self {
            deficiencies: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 栄養不足記録を事前登録する
    pub fn add_deficiency(&self, deficiency: Deficiency) {
        self.deficiencies.lock().unwrap().push(deficiency);
    }
}

#[async_trait]
impl DeficiencyRepository for MockDeficiencyRepository {
    async fn find_all(&self) -> Result<Vec<Deficiency>, InfraError> {
        Ok(self.deficiencies.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: &DeficiencyId) -> Result<Option<Deficiency>, InfraError> {
        Ok(self
            .deficiencies
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id() == id)
            .cloned())
    }

    async fn insert(&self, deficiency: &Deficiency) -> Result<(), InfraError> {
        self.deficiencies.lock().unwrap().push(deficiency.clone());
        Ok(())
    }

    async fn update(&self, deficiency: &Deficiency) -> Result<(), InfraError> {
        let mut deficiencies = self.deficiencies.lock().unwrap();
        if let Some(pos) = deficiencies.iter().position(|d| d.id() == deficiency.id()) {
            deficiencies[pos] = deficiency.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &DeficiencyId) -> Result<bool, InfraError> {
        let mut deficiencies = self.deficiencies.lock().unwrap();
        let before = deficiencies.len();
        deficiencies.retain(|d| d.id() != id);
        Ok(deficiencies.len() < before)
    }
}

// ===== MockHistoryRepository =====

/// テスト用のモック HistoryRepository
#[derive(Clone, Default)]
pub struct MockHistoryRepository {
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
    fail:    Arc<Mutex<bool>>,
}

impl MockHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// `append` を失敗させるかを設定する
    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// 保持しているエントリを返す
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistoryRepository for MockHistoryRepository {
    async fn append(&self, entry: &HistoryEntry) -> Result<(), InfraError> {
        if *self.fail.lock().unwrap() {
            return Err(InfraError::dynamo_db("モック: 分析履歴の記録失敗"));
        }
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn find_by_username(
        &self,
        username: &str,
        cursor: Option<&str>,
        limit: i32,
    ) -> Result<HistoryPage, InfraError> {
        if *self.fail.lock().unwrap() {
            return Err(InfraError::dynamo_db("モック: 分析履歴の検索失敗"));
        }

        let mut items: Vec<HistoryEntry> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.username == username)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));

        if let Some(cursor) = cursor {
            items.retain(|e| e.sort_key().as_str() < cursor);
        }

        let has_more = items.len() > limit as usize;
        items.truncate(limit as usize);
        let next_cursor = if has_more {
            items.last().map(HistoryEntry::sort_key)
        } else {
            None
        };

        Ok(HistoryPage { items, next_cursor })
    }
}

// ===== MockAnalysisInvoker =====

/// テスト用のモック AnalysisInvoker
///
/// 返す結果を差し替え可能で、呼び出し内容を記録する。
#[derive(Clone, Default)]
pub struct MockAnalysisInvoker {
    result:      Arc<Mutex<Option<AnalysisResult>>>,
    fail:        Arc<Mutex<bool>>,
    invocations: Arc<Mutex<Vec<AnalysisRequest>>>,
}

impl MockAnalysisInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 固定の結果を返すモックを作成する
    pub fn with_result(result: AnalysisResult) -> Self {
        let mock = Self::default();
        *mock.result.lock().unwrap() = Some(result);
        mock
    }

    /// `invoke` を失敗させるかを設定する
    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// 記録された呼び出しを返す
    pub fn invocations(&self) -> Vec<AnalysisRequest> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisInvoker for MockAnalysisInvoker {
    async fn invoke(&self, request: &AnalysisRequest) -> Result<AnalysisResult, InfraError> {
        self.invocations.lock().unwrap().push(request.clone());
        if *self.fail.lock().unwrap() {
            return Err(InfraError::analysis("モック: 分析失敗"));
        }
        Ok(self
            .result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| AnalysisResult {
                conditions:     Vec::new(),
                severity:       DEFAULT_SEVERITY.to_string(),
                recommendation: Vec::new(),
            }))
    }
}

// ===== MockMessageQueue =====

/// テスト用のモック MessageQueue
///
/// 送信されたメッセージを記録し、`seed_pending` で受信キューに
/// メッセージを積める。
#[derive(Clone, Default)]
pub struct MockMessageQueue {
    sent:    Arc<Mutex<Vec<serde_json::Value>>>,
    pending: Arc<Mutex<Vec<serde_json::Value>>>,
    fail:    Arc<Mutex<bool>>,
}

impl MockMessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 送受信を失敗させるかを設定する
    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// 受信キューにメッセージを積む
    pub fn seed_pending(&self, message: serde_json::Value) {
        self.pending.lock().unwrap().push(message);
    }

    /// 送信されたメッセージを返す
    pub fn sent_messages(&self) -> Vec<serde_json::Value> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageQueue for MockMessageQueue {
    async fn send(&self, message: &serde_json::Value) -> Result<(), InfraError> {
        if *self.fail.lock().unwrap() {
            return Err(InfraError::queue("モック: メッセージ送信失敗"));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn receive(&self) -> Result<Vec<serde_json::Value>, InfraError> {
        if *self.fail.lock().unwrap() {
            return Err(InfraError::queue("モック: メッセージ受信失敗"));
        }
        let mut pending = self.pending.lock().unwrap();
        let count = pending.len().min(10);
        Ok(pending.drain(..count).collect())
    }
}

// ===== MockNotificationPublisher =====

/// テスト用のモック NotificationPublisher
#[derive(Clone, Default)]
pub struct MockNotificationPublisher {
    alerts:        Arc<Mutex<Vec<String>>>,
    subscriptions: Arc<Mutex<Vec<(Option<String>, Option<String>)>>>,
    fail:          Arc<Mutex<bool>>,
}

impl MockNotificationPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 発行と購読を失敗させるかを設定する
    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// 発行されたアラートを返す
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    /// 登録された購読を返す
    pub fn subscriptions(&self) -> Vec<(Option<String>, Option<String>)> {
        self.subscriptions.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationPublisher for MockNotificationPublisher {
    async fn publish_alert(&self, message: &str) -> Result<(), InfraError> {
        if *self.fail.lock().unwrap() {
            return Err(InfraError::notification("モック: アラート発行失敗"));
        }
        self.alerts.lock().unwrap().push(message.to_string());
        Ok(())
    }

    async fn subscribe(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<(), InfraError> {
        if *self.fail.lock().unwrap() {
            return Err(InfraError::notification("モック: 購読登録失敗"));
        }
        self.subscriptions
            .lock()
            .unwrap()
            .push((email.map(ToOwned::to_owned), phone.map(ToOwned::to_owned)));
        Ok(())
    }
}

// ===== MockReportStorage =====

/// テスト用のモック ReportStorage
#[derive(Clone, Default)]
pub struct MockReportStorage {
    uploads: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    fail:    Arc<Mutex<bool>>,
}

impl MockReportStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// アップロードと URL 生成を失敗させるかを設定する
    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// アップロードされたファイル名を返す
    pub fn uploaded_filenames(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl ReportStorage for MockReportStorage {
    async fn upload(&self, filename: &str, content: Vec<u8>) -> Result<(), InfraError> {
        if *self.fail.lock().unwrap() {
            return Err(InfraError::s3("モック: アップロード失敗"));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((filename.to_string(), content));
        Ok(())
    }

    async fn generate_presigned_get_url(
        &self,
        filename: &str,
        _expires_in: Duration,
    ) -> Result<String, InfraError> {
        if *self.fail.lock().unwrap() {
            return Err(InfraError::s3("モック: Presigned URL 生成失敗"));
        }
        Ok(format!("https://reports.example.test/{filename}?sig=mock"))
    }
}

// ===== MockReportRenderer =====

/// テスト用のモック ReportRenderer
///
/// `set_fail(true)` で PDF 生成失敗（パイプライン唯一の致命的エラー）を
/// 再現する。
#[derive(Clone, Default)]
pub struct MockReportRenderer {
    rendered: Arc<Mutex<Vec<(String, Vec<(String, String)>)>>>,
    fail:     Arc<Mutex<bool>>,
}

impl MockReportRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 生成を失敗させるかを設定する
    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// 生成されたレポートのタイトルと行を返す
    pub fn rendered(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.rendered.lock().unwrap().clone()
    }
}

impl ReportRenderer for MockReportRenderer {
    fn render(&self, title: &str, lines: &[(String, String)]) -> Result<Vec<u8>, InfraError> {
        if *self.fail.lock().unwrap() {
            return Err(InfraError::report("モック: PDF 生成失敗"));
        }
        self.rendered
            .lock()
            .unwrap()
            .push((title.to_string(), lines.to_vec()));
        Ok(b"%PDF-1.4 mock".to_vec())
    }
}
