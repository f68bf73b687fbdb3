//! # アラート購読ユースケース
//!
//! メールまたは SMS による症状アラートの購読申請を実装する。
//! 確認メールの送付と購読の確定は通知基盤側の責務で、ここでは
//! 購読申請の受け付けまでを行う。

use std::sync::Arc;

use async_trait::async_trait;
use symptocare_infra::sns::NotificationPublisher;
use symptocare_shared::{event_log::event, log_business_event};

use crate::error::WebError;

/// アラート購読ユースケーストレイト
#[async_trait]
pub trait SubscriptionUseCase: Send + Sync {
    /// 連絡先をアラートトピックへ購読申請する
    ///
    /// # エラー
    ///
    /// - `WebError::SubscriptionFailed`: 連絡先が 1 つも無い、または
    ///   購読申請が失敗した
    async fn subscribe(
        &self,
        email: Option<String>,
        phone: Option<String>,
    ) -> Result<(), WebError>;
}

/// アラート購読ユースケースの実装
pub struct SubscriptionUseCaseImpl {
    notification_publisher: Arc<dyn NotificationPublisher>,
}

impl SubscriptionUseCaseImpl {
    /// 新しいユースケースインスタンスを作成
    pub fn new(notification_publisher: Arc<dyn NotificationPublisher>) -> Self {
        Self {
            notification_publisher,
        }
    }

    pub async fn subscribe(
        &self,
        email: Option<String>,
        phone: Option<String>,
    ) -> Result<(), WebError> {
        let email = normalize_contact(email);
        let phone = normalize_contact(phone);

        if email.is_none() && phone.is_none() {
            return Err(WebError::SubscriptionFailed);
        }

        self.notification_publisher
            .subscribe(email.as_deref(), phone.as_deref())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "アラート購読の申請に失敗しました");
                WebError::SubscriptionFailed
            })?;

        log_business_event!(
            event.category = event::category::SUBSCRIPTION,
            event.action = event::action::SUBSCRIPTION_REQUESTED,
            event.result = event::result::SUCCESS,
            "アラート購読を申請しました"
        );

        Ok(())
    }
}

#[async_trait]
impl SubscriptionUseCase for SubscriptionUseCaseImpl {
    async fn subscribe(
        &self,
        email: Option<String>,
        phone: Option<String>,
    ) -> Result<(), WebError> {
        self.subscribe(email, phone).await
    }
}

/// 空白のみの連絡先を `None` に正規化する
fn normalize_contact(contact: Option<String>) -> Option<String> {
    contact
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
