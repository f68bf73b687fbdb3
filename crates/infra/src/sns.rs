//! # SNS 通知発行
//!
//! 症状報告アラートの発行と通知購読の登録を行う。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationPublisher` trait で通知を抽象化
//! - **2 つの実装**: SNS（本番・ローカル用）、Noop（トピック未設定時・テスト用）
//! - **fire-and-forget**: アラート発行の失敗は呼び出し元でログのみ記録し、
//!   リクエスト処理は継続する

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sns::Client;

use crate::InfraError;

/// SNS クライアントを作成する
pub fn create_client(config: &SdkConfig) -> Client {
    Client::new(config)
}

/// 通知発行のインターフェース
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// アラートメッセージをトピックに発行する
    async fn publish_alert(&self, message: &str) -> Result<(), InfraError>;

    /// 連絡先をトピックに購読登録する
    ///
    /// メールアドレスは `email` プロトコル、電話番号は `sms` プロトコルで
    /// それぞれ登録する。どちらも `None` の場合は何もしない。
    async fn subscribe(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<(), InfraError>;
}

/// SNS 通知発行
///
/// `aws-sdk-sns` を使用した [`NotificationPublisher`] の実装。
pub struct SnsNotificationPublisher {
    client:    Client,
    topic_arn: String,
}

impl SnsNotificationPublisher {
    /// 新しい SNS 通知発行を作成する
    pub fn new(client: Client, topic_arn: String) -> Self {
        Self { client, topic_arn }
    }
}

#[async_trait]
impl NotificationPublisher for SnsNotificationPublisher {
    async fn publish_alert(&self, message: &str) -> Result<(), InfraError> {
        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .message(message)
            .send()
            .await
            .map_err(|e| InfraError::notification(format!("アラートの発行に失敗: {e}")))?;

        Ok(())
    }

    async fn subscribe(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<(), InfraError> {
        if let Some(email) = email {
            self.client
                .subscribe()
                .topic_arn(&self.topic_arn)
                .protocol("email")
                .endpoint(email)
                .send()
                .await
                .map_err(|e| {
                    InfraError::notification(format!("メール購読の登録に失敗: {e}"))
                })?;
        }

        if let Some(phone) = phone {
            self.client
                .subscribe()
                .topic_arn(&self.topic_arn)
                .protocol("sms")
                .endpoint(phone)
                .send()
                .await
                .map_err(|e| {
                    InfraError::notification(format!("SMS 購読の登録に失敗: {e}"))
                })?;
        }

        Ok(())
    }
}

/// Noop 通知発行（ログ出力のみ）
///
/// トピック ARN が未設定の環境で使用する。通知を実際には発行しない。
#[derive(Debug, Clone)]
pub struct NoopNotificationPublisher;

#[async_trait]
impl NotificationPublisher for NoopNotificationPublisher {
    async fn publish_alert(&self, message: &str) -> Result<(), InfraError> {
        tracing::info!(message, "Noop: アラート発行をスキップ");
        Ok(())
    }

    async fn subscribe(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<(), InfraError> {
        tracing::info!(?email, ?phone, "Noop: 購読登録をスキップ");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noopのpublish_alertがエラーを返さない() {
        let publisher = NoopNotificationPublisher;

        let result = publisher.publish_alert("テストアラート").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn noopのsubscribeがエラーを返さない() {
        let publisher = NoopNotificationPublisher;

        let result = publisher
            .subscribe(Some("test@example.com"), Some("+819012345678"))
            .await;

        assert!(result.is_ok());
    }
}
