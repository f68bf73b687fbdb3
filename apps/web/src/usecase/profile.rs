//! # プロフィールユースケース
//!
//! トークン認証 API 向けのプロフィール取得・更新を実装する。
//!
//! 更新はプロフィール行を get-or-create した上で必ず分析関数を
//! 呼び出す。ダッシュボードの送信パイプラインと違い、症状が空でも
//! 分析は実行される（入力リストが空になるだけ）。

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use symptocare_domain::{
    analysis::{AnalysisOutcome, AnalysisRequest, parse_comma_separated},
    clock::Clock,
    profile::UserProfile,
    user::UserId,
};
use symptocare_infra::{lambda::AnalysisInvoker, repository::ProfileRepository};
use symptocare_shared::{event_log::event, log_business_event};

use crate::error::WebError;

/// プロフィールユースケーストレイト
#[async_trait]
pub trait ProfileUseCase: Send + Sync {
    /// ユーザーのプロフィールを取得する
    ///
    /// 行が存在しない場合は 404 となる [`WebError::NotFound`] を返す。
    async fn find_profile(&self, user_id: &UserId) -> Result<UserProfile, WebError>;

    /// プロフィールを更新して分析を実行する
    ///
    /// 行が無ければ新規作成する。分析の失敗は伝播せず、センチネル結果
    /// [`AnalysisOutcome::Failed`] を返す。
    async fn update_profile(
        &self,
        user_id: &UserId,
        symptoms_raw: &str,
        medical_history_raw: &str,
    ) -> Result<AnalysisOutcome, WebError>;
}

/// プロフィールユースケースの実装
pub struct ProfileUseCaseImpl {
    profile_repository: Arc<dyn ProfileRepository>,
    analysis_invoker:   Arc<dyn AnalysisInvoker>,
    clock:              Arc<dyn Clock>,
    analysis_timeout:   Duration,
}

impl ProfileUseCaseImpl {
    /// 新しいユースケースインスタンスを作成
    pub fn new(
        profile_repository: Arc<dyn ProfileRepository>,
        analysis_invoker: Arc<dyn AnalysisInvoker>,
        clock: Arc<dyn Clock>,
        analysis_timeout: Duration,
    ) -> Self {
        Self {
            profile_repository,
            analysis_invoker,
            clock,
            analysis_timeout,
        }
    }

    pub async fn find_profile(&self, user_id: &UserId) -> Result<UserProfile, WebError> {
        self.profile_repository
            .find_by_user_id(user_id)
            .await?
            .ok_or(WebError::NotFound("Profile"))
    }

    pub async fn update_profile(
        &self,
        user_id: &UserId,
        symptoms_raw: &str,
        medical_history_raw: &str,
    ) -> Result<AnalysisOutcome, WebError> {
        let now = self.clock.now();
        match self.profile_repository.find_by_user_id(user_id).await? {
            Some(profile) => {
                let updated = profile.with_inputs(symptoms_raw, medical_history_raw, now);
                self.profile_repository.update(&updated).await?;
            }
            None => {
                let profile = UserProfile::new(user_id.clone(), now)
                    .with_inputs(symptoms_raw, medical_history_raw, now);
                self.profile_repository.insert(&profile).await?;
            }
        }

        let request = AnalysisRequest {
            symptoms:        parse_comma_separated(symptoms_raw),
            medical_history: parse_comma_separated(medical_history_raw),
        };

        let outcome = match self
            .analysis_invoker
            .invoke_with_retry(&request, self.analysis_timeout)
            .await
        {
            Ok(result) => {
                log_business_event!(
                    event.category = event::category::ANALYSIS,
                    event.action = event::action::ANALYSIS_COMPLETED,
                    event.entity_type = event::entity_type::PROFILE,
                    event.entity_id = %user_id,
                    event.result = event::result::SUCCESS,
                    "プロフィール更新に伴う症状分析が完了しました"
                );
                AnalysisOutcome::Completed(result)
            }
            Err(e) => {
                tracing::warn!(error = %e, "症状分析に失敗したためエラー結果で継続します");
                log_business_event!(
                    event.category = event::category::ANALYSIS,
                    event.action = event::action::ANALYSIS_FAILED,
                    event.entity_type = event::entity_type::PROFILE,
                    event.entity_id = %user_id,
                    event.result = event::result::FAILURE,
                    "プロフィール更新に伴う症状分析に失敗しました"
                );
                AnalysisOutcome::Failed
            }
        };

        Ok(outcome)
    }
}

#[async_trait]
impl ProfileUseCase for ProfileUseCaseImpl {
    async fn find_profile(&self, user_id: &UserId) -> Result<UserProfile, WebError> {
        self.find_profile(user_id).await
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        symptoms_raw: &str,
        medical_history_raw: &str,
    ) -> Result<AnalysisOutcome, WebError> {
        self.update_profile(user_id, symptoms_raw, medical_history_raw)
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use symptocare_domain::{analysis::AnalysisResult, clock::FixedClock};
    use symptocare_infra::mock::{MockAnalysisInvoker, MockProfileRepository};

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    struct TestEnv {
        profile_repository: Arc<MockProfileRepository>,
        analysis_invoker:   Arc<MockAnalysisInvoker>,
    }

    impl TestEnv {
        fn new() -> Self {
            Self {
                profile_repository: Arc::new(MockProfileRepository::new()),
                analysis_invoker:   Arc::new(MockAnalysisInvoker::with_result(AnalysisResult {
                    conditions:     vec!["Flu".to_string()],
                    severity:       "Mild".to_string(),
                    recommendation: vec!["Rest".to_string()],
                })),
            }
        }

        fn sut(&self) -> ProfileUseCaseImpl {
            ProfileUseCaseImpl::new(
                self.profile_repository.clone(),
                self.analysis_invoker.clone(),
                Arc::new(FixedClock::new(fixed_now())),
                Duration::from_secs(5),
            )
        }
    }

    #[tokio::test]
    async fn test_find_profile_存在しない場合はnot_found() {
        // Given
        let env = TestEnv::new();
        let sut = env.sut();

        // When
        let result = sut.find_profile(&UserId::new()).await;

        // Then
        assert!(matches!(result, Err(WebError::NotFound("Profile"))));
    }

    #[tokio::test]
    async fn test_update_profile_行が無ければ新規作成される() {
        // Given
        let env = TestEnv::new();
        let user_id = UserId::new();
        let sut = env.sut();

        // When
        let outcome = sut
            .update_profile(&user_id, "fever, cough", "asthma")
            .await
            .unwrap();

        // Then
        assert!(!outcome.is_failure());
        let profile = sut.find_profile(&user_id).await.unwrap();
        assert_eq!(profile.symptoms(), "fever, cough");
        assert_eq!(profile.medical_history(), "asthma");
    }

    #[tokio::test]
    async fn test_update_profile_既存の行は上書きされる() {
        // Given
        let env = TestEnv::new();
        let user_id = UserId::new();
        env.profile_repository.add_profile(
            UserProfile::new(user_id.clone(), fixed_now()).with_inputs(
                "headache",
                "",
                fixed_now(),
            ),
        );
        let sut = env.sut();

        // When
        sut.update_profile(&user_id, "fever", "diabetes")
            .await
            .unwrap();

        // Then
        let profile = sut.find_profile(&user_id).await.unwrap();
        assert_eq!(profile.symptoms(), "fever");
        assert_eq!(profile.medical_history(), "diabetes");
    }

    #[tokio::test]
    async fn test_update_profile_空の症状でも分析は実行される() {
        // Given
        let env = TestEnv::new();
        let user_id = UserId::new();
        let sut = env.sut();

        // When
        let outcome = sut.update_profile(&user_id, "", "").await.unwrap();

        // Then
        assert!(!outcome.is_failure());
        let invocations = env.analysis_invoker.invocations();
        assert_eq!(invocations.len(), 1);
        assert!(invocations[0].symptoms.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_profile_分析失敗はセンチネル結果になる() {
        // Given
        let env = TestEnv::new();
        env.analysis_invoker.set_fail(true);
        let user_id = UserId::new();
        let sut = env.sut();

        // When
        let outcome = sut.update_profile(&user_id, "fever", "").await.unwrap();

        // Then: プロフィールは保存された上でエラー結果が返る
        assert!(outcome.is_failure());
        let profile = sut.find_profile(&user_id).await.unwrap();
        assert_eq!(profile.symptoms(), "fever");
    }
}
