//! # 症状分析 API ユースケース
//!
//! トークン認証 API 向けの単発分析を実装する。副作用（プロフィール
//! 保存、レポート生成、履歴追記）は持たず、分析関数の呼び出しのみを
//! 行う。

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use symptocare_domain::analysis::{AnalysisOutcome, AnalysisRequest};
use symptocare_infra::lambda::AnalysisInvoker;
use symptocare_shared::{event_log::event, log_business_event};

use crate::error::WebError;

/// 症状分析 API ユースケーストレイト
#[async_trait]
pub trait SymptomUseCase: Send + Sync {
    /// 症状リストを分析する
    ///
    /// # エラー
    ///
    /// - `WebError::Validation`: 症状リストが空
    async fn analyze(
        &self,
        symptoms: Vec<String>,
        medical_history: Vec<String>,
    ) -> Result<AnalysisOutcome, WebError>;
}

/// 症状分析 API ユースケースの実装
pub struct SymptomUseCaseImpl {
    analysis_invoker: Arc<dyn AnalysisInvoker>,
    analysis_timeout: Duration,
}

impl SymptomUseCaseImpl {
    /// 新しいユースケースインスタンスを作成
    pub fn new(analysis_invoker: Arc<dyn AnalysisInvoker>, analysis_timeout: Duration) -> Self {
        Self {
            analysis_invoker,
            analysis_timeout,
        }
    }

    pub async fn analyze(
        &self,
        symptoms: Vec<String>,
        medical_history: Vec<String>,
    ) -> Result<AnalysisOutcome, WebError> {
        if symptoms.is_empty() {
            return Err(WebError::Validation("Symptoms are required".to_string()));
        }

        let request = AnalysisRequest {
            symptoms,
            medical_history,
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
                    event.result = event::result::SUCCESS,
                    "API 経由の症状分析が完了しました"
                );
                AnalysisOutcome::Completed(result)
            }
            Err(e) => {
                tracing::warn!(error = %e, "症状分析に失敗したためエラー結果で継続します");
                log_business_event!(
                    event.category = event::category::ANALYSIS,
                    event.action = event::action::ANALYSIS_FAILED,
                    event.result = event::result::FAILURE,
                    "API 経由の症状分析に失敗しました"
                );
                AnalysisOutcome::Failed
            }
        };

        Ok(outcome)
    }
}

#[async_trait]
impl SymptomUseCase for SymptomUseCaseImpl {
    async fn analyze(
        &self,
        symptoms: Vec<String>,
        medical_history: Vec<String>,
    ) -> Result<AnalysisOutcome, WebError> {
        self.analyze(symptoms, medical_history).await
    }
}
