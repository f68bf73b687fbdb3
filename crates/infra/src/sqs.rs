//! # SQS メッセージキュー
//!
//! 分析結果メッセージの送受信を行う。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `MessageQueue` trait で送受信を抽象化
//! - **送信**: 分析パイプラインが実行結果を JSON で投入する
//! - **受信**: ダッシュボード表示時に最大 10 件を取得して表示する。
//!   受信したメッセージは削除せず、可視性タイムアウト経過後に再び取得可能になる

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sqs::Client;

use crate::InfraError;

/// SQS クライアントを作成する
pub fn create_client(config: &SdkConfig) -> Client {
    Client::new(config)
}

/// 1 回の受信で取得する最大メッセージ数
const MAX_MESSAGES_PER_RECEIVE: i32 = 10;

/// メッセージキューのインターフェース
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// メッセージを JSON で送信する
    async fn send(&self, message: &serde_json::Value) -> Result<(), InfraError>;

    /// メッセージを最大 10 件受信する
    ///
    /// JSON として解析できない本文は文字列値としてそのまま返す。
    async fn receive(&self) -> Result<Vec<serde_json::Value>, InfraError>;
}

/// SQS メッセージキュー
///
/// `aws-sdk-sqs` を使用した [`MessageQueue`] の実装。
pub struct SqsMessageQueue {
    client:    Client,
    queue_url: String,
}

impl SqsMessageQueue {
    /// 新しい SQS メッセージキューを作成する
    pub fn new(client: Client, queue_url: String) -> Self {
        Self { client, queue_url }
    }
}

#[async_trait]
impl MessageQueue for SqsMessageQueue {
    async fn send(&self, message: &serde_json::Value) -> Result<(), InfraError> {
        let body = serde_json::to_string(message)?;

        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| InfraError::queue(format!("メッセージの送信に失敗: {e}")))?;

        Ok(())
    }

    async fn receive(&self) -> Result<Vec<serde_json::Value>, InfraError> {
        let response = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(MAX_MESSAGES_PER_RECEIVE)
            .send()
            .await
            .map_err(|e| InfraError::queue(format!("メッセージの受信に失敗: {e}")))?;

        let messages = response
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|message| message.body)
            .map(|body| {
                serde_json::from_str(&body).unwrap_or_else(|_| serde_json::Value::String(body))
            })
            .collect();

        Ok(messages)
    }
}
