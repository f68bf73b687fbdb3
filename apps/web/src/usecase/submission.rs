//! # 症状送信ユースケース
//!
//! ダッシュボードの中心となる症状分析パイプラインを実装する。
//!
//! ## パイプラインの失敗方針
//!
//! 分析本体（Lambda 呼び出し）と周辺の副作用は失敗しても応答をブロック
//! しない。例外は PDF 生成で、これだけは失敗時にリクエスト全体を
//! エラーにする。
//!
//! | ステップ | 失敗時の挙動 |
//! |----------|--------------|
//! | キュー排出 | warn ログ + 空リストで継続 |
//! | プロフィール保存 | 行が無ければ warn + スキップ、DB 障害は伝播 |
//! | アラート発行 | warn ログ + 継続 |
//! | 分析呼び出し | センチネル結果（`{"error": ...}`）で継続 |
//! | 結果キュー送信 | warn ログ + 継続 |
//! | PDF 生成 | **致命的エラー（500）** |
//! | アップロード / URL 発行 | warn ログ + URL 無しで継続 |
//! | 履歴追記・取得 | warn ログ + 継続（取得失敗は空リスト） |

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use symptocare_domain::{
    analysis::{AnalysisOutcome, AnalysisRequest, parse_comma_separated},
    clock::Clock,
    history::HistoryEntry,
    user::UserId,
};
use symptocare_infra::{
    InfraError,
    lambda::AnalysisInvoker,
    report::ReportRenderer,
    repository::{HistoryRepository, ProfileRepository},
    s3::ReportStorage,
    sns::NotificationPublisher,
    sqs::MessageQueue,
};
use symptocare_shared::{event_log::event, log_business_event};

use crate::error::WebError;

/// ダッシュボードに常に表示する注意書き
const DISCLAIMER: &str = "This is just a predicted analysis. Kindly consult your doctor for more info. The results can be inaccurate.";

/// 履歴の 1 ページあたりの最大件数
const HISTORY_PAGE_SIZE: i32 = 50;

/// レポートの署名付き URL の有効期間
const PRESIGNED_URL_EXPIRY: Duration = Duration::from_secs(3600);

/// ダッシュボードの表示内容
#[derive(Debug, Serialize)]
pub struct DashboardView {
    /// キューから排出した保留メッセージ
    pub messages:         Vec<serde_json::Value>,
    /// 送信された症状文字列（トリム済み）
    pub symptoms:         String,
    pub conditions:       Vec<String>,
    /// 分析結果（GET 表示や未送信時は `None`）
    pub result:           Option<AnalysisOutcome>,
    pub severity_level:   Option<String>,
    pub recommendation:   Option<Vec<String>>,
    pub disclaimer:       String,
    pub analysis_history: Vec<HistoryEntryView>,
    /// 生成されたレポートの署名付き URL
    pub report_url:       Option<String>,
}

impl DashboardView {
    /// 分析結果を含まない表示内容を作成する
    fn without_analysis(messages: Vec<serde_json::Value>) -> Self {
        Self {
            messages,
            symptoms: String::new(),
            conditions: Vec::new(),
            result: None,
            severity_level: None,
            recommendation: None,
            disclaimer: DISCLAIMER.to_string(),
            analysis_history: Vec::new(),
            report_url: None,
        }
    }
}

/// 分析履歴 1 件の表示内容
#[derive(Debug, Serialize)]
pub struct HistoryEntryView {
    pub symptoms:        String,
    pub medical_history: String,
    pub result:          serde_json::Value,
    pub report_filename: String,
    pub created_at:      DateTime<Utc>,
}

impl From<HistoryEntry> for HistoryEntryView {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            symptoms:        entry.symptoms,
            medical_history: entry.medical_history,
            result:          entry.result,
            report_filename: entry.report_filename,
            created_at:      entry.created_at,
        }
    }
}

/// 分析履歴のページ表示内容
#[derive(Debug, Serialize)]
pub struct HistoryPageView {
    pub entries:     Vec<HistoryEntryView>,
    pub next_cursor: Option<String>,
}

/// 症状送信ユースケーストレイト
#[async_trait]
pub trait SubmissionUseCase: Send + Sync {
    /// ダッシュボードの初期表示内容を取得する
    ///
    /// 保留キューのメッセージを排出する副作用を持つ。
    async fn render_dashboard(&self) -> Result<DashboardView, WebError>;

    /// 症状を送信して分析パイプラインを実行する
    ///
    /// トリム後の症状が空の場合はパイプライン全体をスキップし、
    /// 初期表示と同じ内容を返す。
    async fn submit_symptoms(
        &self,
        user_id: &UserId,
        username: &str,
        symptoms_raw: &str,
        medical_history_raw: &str,
    ) -> Result<DashboardView, WebError>;

    /// ユーザーの分析履歴を新しい順にページ取得する
    async fn history_page(
        &self,
        username: &str,
        cursor: Option<String>,
        limit: Option<i32>,
    ) -> Result<HistoryPageView, WebError>;
}

/// 症状送信ユースケースの実装
pub struct SubmissionUseCaseImpl {
    profile_repository:     Arc<dyn ProfileRepository>,
    history_repository:     Arc<dyn HistoryRepository>,
    analysis_invoker:       Arc<dyn AnalysisInvoker>,
    message_queue:          Arc<dyn MessageQueue>,
    notification_publisher: Arc<dyn NotificationPublisher>,
    report_storage:         Arc<dyn ReportStorage>,
    report_renderer:        Arc<dyn ReportRenderer>,
    clock:                  Arc<dyn Clock>,
    analysis_timeout:       Duration,
}

impl SubmissionUseCaseImpl {
    /// 新しいユースケースインスタンスを作成
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        profile_repository: Arc<dyn ProfileRepository>,
        history_repository: Arc<dyn HistoryRepository>,
        analysis_invoker: Arc<dyn AnalysisInvoker>,
        message_queue: Arc<dyn MessageQueue>,
        notification_publisher: Arc<dyn NotificationPublisher>,
        report_storage: Arc<dyn ReportStorage>,
        report_renderer: Arc<dyn ReportRenderer>,
        clock: Arc<dyn Clock>,
        analysis_timeout: Duration,
    ) -> Self {
        Self {
            profile_repository,
            history_repository,
            analysis_invoker,
            message_queue,
            notification_publisher,
            report_storage,
            report_renderer,
            clock,
            analysis_timeout,
        }
    }

    pub async fn render_dashboard(&self) -> Result<DashboardView, WebError> {
        Ok(DashboardView::without_analysis(self.drain_queue().await))
    }

    pub async fn submit_symptoms(
        &self,
        user_id: &UserId,
        username: &str,
        symptoms_raw: &str,
        medical_history_raw: &str,
    ) -> Result<DashboardView, WebError> {
        let messages = self.drain_queue().await;

        let symptoms = symptoms_raw.trim();
        if symptoms.is_empty() {
            return Ok(DashboardView::without_analysis(messages));
        }
        let medical_history = medical_history_raw.trim();

        let symptom_list = parse_comma_separated(symptoms);
        let medical_history_list = parse_comma_separated(medical_history);

        // 入力をプロフィールへ保存（行が無ければ保存せず続行）
        let now = self.clock.now();
        let profile = match self.profile_repository.find_by_user_id(user_id).await? {
            Some(profile) => {
                let updated = profile.with_inputs(symptoms, medical_history, now);
                self.profile_repository.update(&updated).await?;
                Some(updated)
            }
            None => {
                tracing::warn!(%user_id, "プロフィールが存在しないため入力の保存をスキップします");
                None
            }
        };

        // 管理者向けアラート（失敗しても分析は継続）
        let alert = format!(
            "User {username} reported symptoms: {}",
            symptom_list.join(", ")
        );
        if let Err(e) = self.notification_publisher.publish_alert(&alert).await {
            tracing::warn!(error = %e, "症状アラートの発行に失敗しました");
        }

        let outcome = self
            .analyze(username, &symptom_list, &medical_history_list)
            .await;
        let result_json = serde_json::to_value(&outcome).map_err(InfraError::from)?;

        // 分析結果を下流連携用キューへ送信（失敗しても継続）
        let queue_message = serde_json::json!({
            "user":     username,
            "symptoms": symptom_list,
            "result":   result_json,
        });
        if let Err(e) = self.message_queue.send(&queue_message).await {
            tracing::warn!(error = %e, "結果キューへの送信に失敗しました");
        }

        // PDF レポート生成。パイプラインで唯一の致命的エラー
        let pdf = self
            .report_renderer
            .render(&format!("Report for {username}"), &outcome.report_lines())
            .map_err(WebError::ReportGeneration)?;

        let report_filename = format!("{username}_report.pdf");
        let report_url = self.store_report(username, &report_filename, pdf).await;

        // 分析履歴へ追記（失敗しても継続）
        let entry = HistoryEntry::new(
            username,
            symptoms,
            medical_history,
            result_json,
            report_filename,
        );
        if let Err(e) = self.history_repository.append(&entry).await {
            tracing::warn!(error = %e, "分析履歴の追記に失敗しました");
        }

        let analysis_history = self.recent_history(username).await;

        // レポート URL をプロフィールへ反映
        if let (Some(profile), Some(url)) = (profile, &report_url) {
            let updated = profile.with_report_url(url.clone(), now);
            self.profile_repository.update(&updated).await?;
        }

        let conditions = outcome.conditions().to_vec();
        let severity_level = outcome.severity_level().map(ToOwned::to_owned);
        let recommendation = outcome.recommendation().map(<[String]>::to_vec);

        Ok(DashboardView {
            messages,
            symptoms: symptoms.to_string(),
            conditions,
            result: Some(outcome),
            severity_level,
            recommendation,
            disclaimer: DISCLAIMER.to_string(),
            analysis_history,
            report_url,
        })
    }

    pub async fn history_page(
        &self,
        username: &str,
        cursor: Option<String>,
        limit: Option<i32>,
    ) -> Result<HistoryPageView, WebError> {
        let limit = limit
            .unwrap_or(HISTORY_PAGE_SIZE)
            .clamp(1, HISTORY_PAGE_SIZE);
        let page = self
            .history_repository
            .find_by_username(username, cursor.as_deref(), limit)
            .await?;

        Ok(HistoryPageView {
            entries:     page.items.into_iter().map(HistoryEntryView::from).collect(),
            next_cursor: page.next_cursor,
        })
    }

    /// 保留キューのメッセージを排出する
    ///
    /// 失敗時は warn ログを出して空リストを返す。
    async fn drain_queue(&self) -> Vec<serde_json::Value> {
        match self.message_queue.receive().await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(error = %e, "キューからのメッセージ取得に失敗しました");
                Vec::new()
            }
        }
    }

    /// 分析関数を呼び出して結果を取得する
    ///
    /// 失敗時はエラーを伝播せず、センチネル結果
    /// [`AnalysisOutcome::Failed`] を返す。
    async fn analyze(
        &self,
        username: &str,
        symptoms: &[String],
        medical_history: &[String],
    ) -> AnalysisOutcome {
        let request = AnalysisRequest {
            symptoms:        symptoms.to_vec(),
            medical_history: medical_history.to_vec(),
        };

        match self
            .analysis_invoker
            .invoke_with_retry(&request, self.analysis_timeout)
            .await
        {
            Ok(result) => {
                log_business_event!(
                    event.category = event::category::ANALYSIS,
                    event.action = event::action::ANALYSIS_COMPLETED,
                    event.username = username,
                    event.result = event::result::SUCCESS,
                    "症状分析が完了しました"
                );
                AnalysisOutcome::Completed(result)
            }
            Err(e) => {
                tracing::warn!(error = %e, "症状分析に失敗したためエラー結果で継続します");
                log_business_event!(
                    event.category = event::category::ANALYSIS,
                    event.action = event::action::ANALYSIS_FAILED,
                    event.username = username,
                    event.result = event::result::FAILURE,
                    "症状分析に失敗しました"
                );
                AnalysisOutcome::Failed
            }
        }
    }

    /// レポートをアップロードして署名付き URL を発行する
    ///
    /// アップロード失敗時は URL 発行をスキップし、いずれの失敗も
    /// warn ログを出して `None` を返す。
    async fn store_report(
        &self,
        username: &str,
        filename: &str,
        content: Vec<u8>,
    ) -> Option<String> {
        if let Err(e) = self.report_storage.upload(filename, content).await {
            tracing::warn!(error = %e, filename, "レポートのアップロードに失敗しました");
            return None;
        }

        match self
            .report_storage
            .generate_presigned_get_url(filename, PRESIGNED_URL_EXPIRY)
            .await
        {
            Ok(url) => {
                log_business_event!(
                    event.category = event::category::ANALYSIS,
                    event.action = event::action::REPORT_GENERATED,
                    event.entity_type = event::entity_type::REPORT,
                    event.entity_id = filename,
                    event.username = username,
                    event.result = event::result::SUCCESS,
                    "分析レポートを生成しました"
                );
                Some(url)
            }
            Err(e) => {
                tracing::warn!(error = %e, filename, "署名付き URL の発行に失敗しました");
                None
            }
        }
    }

    /// ユーザーの直近の分析履歴を取得する
    ///
    /// 失敗時は warn ログを出して空リストを返す。
    async fn recent_history(&self, username: &str) -> Vec<HistoryEntryView> {
        match self
            .history_repository
            .find_by_username(username, None, HISTORY_PAGE_SIZE)
            .await
        {
            Ok(page) => page.items.into_iter().map(HistoryEntryView::from).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "分析履歴の取得に失敗しました");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl SubmissionUseCase for SubmissionUseCaseImpl {
    async fn render_dashboard(&self) -> Result<DashboardView, WebError> {
        self.render_dashboard().await
    }

    async fn submit_symptoms(
        &self,
        user_id: &UserId,
        username: &str,
        symptoms_raw: &str,
        medical_history_raw: &str,
    ) -> Result<DashboardView, WebError> {
        self.submit_symptoms(user_id, username, symptoms_raw, medical_history_raw)
            .await
    }

    async fn history_page(
        &self,
        username: &str,
        cursor: Option<String>,
        limit: Option<i32>,
    ) -> Result<HistoryPageView, WebError> {
        self.history_page(username, cursor, limit).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use symptocare_domain::{
        analysis::{ANALYSIS_FAILURE_MESSAGE, AnalysisResult},
        clock::FixedClock,
        profile::UserProfile,
    };
    use symptocare_infra::mock::{
        MockAnalysisInvoker,
        MockHistoryRepository,
        MockMessageQueue,
        MockNotificationPublisher,
        MockProfileRepository,
        MockReportRenderer,
        MockReportStorage,
    };

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn flu_result() -> AnalysisResult {
        AnalysisResult {
            conditions:     vec!["Flu".to_string(), "Common Cold".to_string()],
            severity:       "Moderate".to_string(),
            recommendation: vec!["Rest".to_string(), "Hydration".to_string()],
        }
    }

    struct TestEnv {
        profile_repository:     Arc<MockProfileRepository>,
        history_repository:     Arc<MockHistoryRepository>,
        analysis_invoker:       Arc<MockAnalysisInvoker>,
        message_queue:          Arc<MockMessageQueue>,
        notification_publisher: Arc<MockNotificationPublisher>,
        report_storage:         Arc<MockReportStorage>,
        report_renderer:        Arc<MockReportRenderer>,
    }

    impl TestEnv {
        fn new() -> Self {
            Self {
                profile_repository:     Arc::new(MockProfileRepository::new()),
                history_repository:     Arc::new(MockHistoryRepository::new()),
                analysis_invoker:       Arc::new(MockAnalysisInvoker::with_result(flu_result())),
                message_queue:          Arc::new(MockMessageQueue::new()),
                notification_publisher: Arc::new(MockNotificationPublisher::new()),
                report_storage:         Arc::new(MockReportStorage::new()),
                report_renderer:        Arc::new(MockReportRenderer::new()),
            }
        }

        fn sut(&self) -> SubmissionUseCaseImpl {
            SubmissionUseCaseImpl::new(
                self.profile_repository.clone(),
                self.history_repository.clone(),
                self.analysis_invoker.clone(),
                self.message_queue.clone(),
                self.notification_publisher.clone(),
                self.report_storage.clone(),
                self.report_renderer.clone(),
                Arc::new(FixedClock::new(fixed_now())),
                Duration::from_secs(5),
            )
        }

        /// 空のプロフィールを事前登録する
        fn add_profile(&self, user_id: &UserId) {
            self.profile_repository
                .add_profile(UserProfile::new(user_id.clone(), fixed_now()));
        }
    }

    #[tokio::test]
    async fn test_submit_成功時に全ての副作用が実行される() {
        // Given
        let env = TestEnv::new();
        let user_id = UserId::new();
        env.add_profile(&user_id);
        let sut = env.sut();

        // When
        let view = sut
            .submit_symptoms(&user_id, "hanako", "fever, cough", "asthma")
            .await
            .unwrap();

        // Then: 表示内容
        assert_eq!(view.symptoms, "fever, cough");
        assert_eq!(view.conditions, vec!["Flu", "Common Cold"]);
        assert_eq!(view.severity_level.as_deref(), Some("Moderate"));
        assert_eq!(
            view.recommendation,
            Some(vec!["Rest".to_string(), "Hydration".to_string()])
        );
        assert_eq!(view.disclaimer, DISCLAIMER);
        assert_eq!(
            view.report_url.as_deref(),
            Some("https://reports.example.test/hanako_report.pdf?sig=mock")
        );
        assert_eq!(view.analysis_history.len(), 1);

        // Then: 分析呼び出し
        assert_eq!(
            env.analysis_invoker.invocations(),
            vec![AnalysisRequest {
                symptoms:        vec!["fever".to_string(), "cough".to_string()],
                medical_history: vec!["asthma".to_string()],
            }]
        );

        // Then: アラートとキュー送信
        assert_eq!(
            env.notification_publisher.alerts(),
            vec!["User hanako reported symptoms: fever, cough"]
        );
        assert_eq!(
            env.message_queue.sent_messages(),
            vec![json!({
                "user":     "hanako",
                "symptoms": ["fever", "cough"],
                "result":   {
                    "conditions":     ["Flu", "Common Cold"],
                    "severity":       "Moderate",
                    "recommendation": ["Rest", "Hydration"],
                },
            })]
        );

        // Then: レポート生成とアップロード
        let rendered = env.report_renderer.rendered();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].0, "Report for hanako");
        assert_eq!(
            env.report_storage.uploaded_filenames(),
            vec!["hanako_report.pdf"]
        );

        // Then: プロフィールへの反映
        let profile = env
            .profile_repository
            .find_by_user_id(&user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.symptoms(), "fever, cough");
        assert_eq!(profile.medical_history(), "asthma");
        assert_eq!(
            profile.report_url(),
            Some("https://reports.example.test/hanako_report.pdf?sig=mock")
        );
    }

    #[tokio::test]
    async fn test_submit_空の症状はパイプラインをスキップする() {
        // Given
        let env = TestEnv::new();
        let user_id = UserId::new();
        env.add_profile(&user_id);
        let sut = env.sut();

        // When
        let view = sut
            .submit_symptoms(&user_id, "hanako", "   ", "asthma")
            .await
            .unwrap();

        // Then
        assert_eq!(view.symptoms, "");
        assert!(view.result.is_none());
        assert!(env.analysis_invoker.invocations().is_empty());
        assert!(env.notification_publisher.alerts().is_empty());
        assert!(env.report_storage.uploaded_filenames().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_分析失敗はセンチネル結果で継続する() {
        // Given
        let env = TestEnv::new();
        env.analysis_invoker.set_fail(true);
        let user_id = UserId::new();
        env.add_profile(&user_id);
        let sut = env.sut();

        // When
        let view = sut
            .submit_symptoms(&user_id, "hanako", "fever", "")
            .await
            .unwrap();

        // Then: リトライ上限まで試行した上でセンチネル結果になる
        assert_eq!(env.analysis_invoker.invocations().len(), 3);
        assert!(matches!(view.result, Some(AnalysisOutcome::Failed)));
        assert!(view.conditions.is_empty());
        assert!(view.severity_level.is_none());
        assert!(view.recommendation.is_none());

        // Then: キューとレポートにはエラー結果が載る
        let sent = env.message_queue.sent_messages();
        assert_eq!(sent[0]["result"], json!({ "error": ANALYSIS_FAILURE_MESSAGE }));
        let rendered = env.report_renderer.rendered();
        assert_eq!(
            rendered[0].1,
            vec![("error".to_string(), ANALYSIS_FAILURE_MESSAGE.to_string())]
        );
    }

    #[tokio::test]
    async fn test_submit_pdf生成失敗はエラーになる() {
        // Given
        let env = TestEnv::new();
        env.report_renderer.set_fail(true);
        let user_id = UserId::new();
        env.add_profile(&user_id);
        let sut = env.sut();

        // When
        let result = sut.submit_symptoms(&user_id, "hanako", "fever", "").await;

        // Then: 後続ステップは実行されない
        assert!(matches!(result, Err(WebError::ReportGeneration(_))));
        assert!(env.report_storage.uploaded_filenames().is_empty());
        assert!(env.history_repository.entries().is_empty());
    }

    #[tokio::test]
    async fn test_submit_アップロード失敗時はreport_urlが無い() {
        // Given
        let env = TestEnv::new();
        env.report_storage.set_fail(true);
        let user_id = UserId::new();
        env.add_profile(&user_id);
        let sut = env.sut();

        // When
        let view = sut
            .submit_symptoms(&user_id, "hanako", "fever", "")
            .await
            .unwrap();

        // Then: 応答は成功し、URL とプロフィール反映のみ欠ける
        assert!(view.report_url.is_none());
        assert!(view.result.is_some());
        assert_eq!(env.history_repository.entries().len(), 1);
        let profile = env
            .profile_repository
            .find_by_user_id(&user_id)
            .await
            .unwrap()
            .unwrap();
        assert!(profile.report_url().is_none());
    }

    #[tokio::test]
    async fn test_submit_プロフィール未作成でも分析は継続する() {
        // Given
        let env = TestEnv::new();
        let user_id = UserId::new();
        let sut = env.sut();

        // When
        let view = sut
            .submit_symptoms(&user_id, "hanako", "fever", "")
            .await
            .unwrap();

        // Then
        assert!(view.result.is_some());
        assert!(view.report_url.is_some());
        let profile = env
            .profile_repository
            .find_by_user_id(&user_id)
            .await
            .unwrap();
        assert!(profile.is_none());
    }

    #[tokio::test]
    async fn test_submit_アラート発行失敗でも分析は継続する() {
        // Given
        let env = TestEnv::new();
        env.notification_publisher.set_fail(true);
        let user_id = UserId::new();
        env.add_profile(&user_id);
        let sut = env.sut();

        // When
        let view = sut
            .submit_symptoms(&user_id, "hanako", "fever", "")
            .await
            .unwrap();

        // Then
        assert!(view.result.is_some());
        assert!(env.notification_publisher.alerts().is_empty());
        assert_eq!(env.analysis_invoker.invocations().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_履歴保存失敗でも応答は返る() {
        // Given
        let env = TestEnv::new();
        env.history_repository.set_fail(true);
        let user_id = UserId::new();
        env.add_profile(&user_id);
        let sut = env.sut();

        // When
        let view = sut
            .submit_symptoms(&user_id, "hanako", "fever", "")
            .await
            .unwrap();

        // Then: 履歴は取得も失敗するため空リストに縮退する
        assert!(view.result.is_some());
        assert!(view.analysis_history.is_empty());
    }

    #[tokio::test]
    async fn test_render_dashboard_キューのメッセージを排出する() {
        // Given
        let env = TestEnv::new();
        env.message_queue.seed_pending(json!({"user": "taro"}));
        env.message_queue.seed_pending(json!({"user": "hanako"}));
        let sut = env.sut();

        // When
        let first = sut.render_dashboard().await.unwrap();
        let second = sut.render_dashboard().await.unwrap();

        // Then: 一度排出したメッセージは次の表示に現れない
        assert_eq!(first.messages.len(), 2);
        assert!(first.result.is_none());
        assert_eq!(first.disclaimer, DISCLAIMER);
        assert!(second.messages.is_empty());
    }

    #[tokio::test]
    async fn test_render_dashboard_キュー障害時は空のメッセージで継続する() {
        // Given
        let env = TestEnv::new();
        env.message_queue.set_fail(true);
        let sut = env.sut();

        // When
        let view = sut.render_dashboard().await.unwrap();

        // Then
        assert!(view.messages.is_empty());
    }

    #[tokio::test]
    async fn test_history_page_カーソルでページングできる() {
        // Given
        let env = TestEnv::new();
        for i in 1..=3 {
            let entry = HistoryEntry::new(
                "hanako",
                format!("symptom-{i}"),
                "",
                json!({"severity": "Unknown"}),
                "hanako_report.pdf",
            );
            env.history_repository.append(&entry).await.unwrap();
        }
        let sut = env.sut();

        // When
        let first = sut
            .history_page("hanako", None, Some(2))
            .await
            .unwrap();
        let second = sut
            .history_page("hanako", first.next_cursor.clone(), Some(2))
            .await
            .unwrap();

        // Then: 新しい順に 2 件 + 1 件
        assert_eq!(first.entries.len(), 2);
        assert_eq!(first.entries[0].symptoms, "symptom-3");
        assert!(first.next_cursor.is_some());
        assert_eq!(second.entries.len(), 1);
        assert_eq!(second.entries[0].symptoms, "symptom-1");
    }

    #[tokio::test]
    async fn test_history_page_リミットは範囲内に丸められる() {
        // Given
        let env = TestEnv::new();
        for i in 1..=2 {
            let entry = HistoryEntry::new(
                "hanako",
                format!("symptom-{i}"),
                "",
                json!({}),
                "hanako_report.pdf",
            );
            env.history_repository.append(&entry).await.unwrap();
        }
        let sut = env.sut();

        // When: 0 以下のリミットは 1 件に丸める
        let page = sut.history_page("hanako", None, Some(0)).await.unwrap();

        // Then
        assert_eq!(page.entries.len(), 1);
    }
}
