//! # Lambda 分析呼び出し
//!
//! 症状分析 Lambda 関数の同期呼び出しを行う。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `AnalysisInvoker` trait で分析呼び出しを抽象化
//! - **ペイロード形式**: API Gateway プロキシ互換（`{"body": "<JSON 文字列>"}`）
//! - **タイムアウトとリトライ**: `invoke_with_retry` が全呼び出し元に共通の
//!   ポリシーを適用する（最大 3 回試行、間隔 200 ミリ秒）
//!
//! ## 応答の解釈
//!
//! Lambda 応答の `body` は JSON 文字列で、`conditions` / `severity` /
//! `recommendation` の各キーは省略されうる。省略時は
//! [`AnalysisResponse::normalize`] が既定値を補う。

use std::time::Duration;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_lambda::{Client, primitives::Blob, types::InvocationType};
use symptocare_domain::analysis::{AnalysisRequest, AnalysisResponse, AnalysisResult};

use crate::InfraError;

/// Lambda クライアントを作成する
pub fn create_client(config: &SdkConfig) -> Client {
    Client::new(config)
}

/// リトライを含む最大試行回数
const MAX_ATTEMPTS: u32 = 3;

/// リトライ間隔の基準値（指数バックオフ: 200ms, 400ms, ...）
const RETRY_BACKOFF_BASE: Duration = Duration::from_millis(200);

/// 症状分析呼び出しのインターフェース
///
/// 分析バックエンドの具体的な呼び出し方法を抽象化する。
/// テスト時はモックに差し替え可能。
#[async_trait]
pub trait AnalysisInvoker: Send + Sync {
    /// 分析を 1 回呼び出す
    ///
    /// 呼び出し・応答解析のいずれかに失敗した場合はエラーを返す。
    /// 応答のキー欠落はエラーではなく、既定値で補完した結果を返す。
    async fn invoke(&self, request: &AnalysisRequest) -> Result<AnalysisResult, InfraError>;

    /// タイムアウトとリトライ付きで分析を呼び出す
    ///
    /// 各試行に `timeout` を適用し、失敗（エラーまたはタイムアウト）した
    /// 試行は指数バックオフ（[`RETRY_BACKOFF_BASE`] × 2^試行回数）で
    /// 再試行する。[`MAX_ATTEMPTS`] 回全て失敗した場合は最後のエラーを返す。
    async fn invoke_with_retry(
        &self,
        request: &AnalysisRequest,
        timeout: Duration,
    ) -> Result<AnalysisResult, InfraError> {
        let mut last_error = None;

        for attempt in 1..=MAX_ATTEMPTS {
            match tokio::time::timeout(timeout, self.invoke(request)).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(err)) => {
                    tracing::warn!(attempt, error = %err, "分析呼び出しに失敗しました");
                    last_error = Some(err);
                }
                Err(_) => {
                    tracing::warn!(
                        attempt,
                        timeout_secs = timeout.as_secs(),
                        "分析呼び出しがタイムアウトしました"
                    );
                    last_error = Some(InfraError::analysis(format!(
                        "分析呼び出しがタイムアウトしました（{} 秒）",
                        timeout.as_secs()
                    )));
                }
            }

            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(RETRY_BACKOFF_BASE * 2u32.pow(attempt - 1)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            InfraError::analysis("分析呼び出しが実行されませんでした".to_string())
        }))
    }
}

/// Lambda 分析クライアント
///
/// `aws-sdk-lambda` を使用した [`AnalysisInvoker`] の実装。
pub struct LambdaAnalysisClient {
    client:        Client,
    function_name: String,
}

impl LambdaAnalysisClient {
    /// 新しい Lambda 分析クライアントを作成する
    pub fn new(client: Client, function_name: String) -> Self {
        Self {
            client,
            function_name,
        }
    }
}

#[async_trait]
impl AnalysisInvoker for LambdaAnalysisClient {
    async fn invoke(&self, request: &AnalysisRequest) -> Result<AnalysisResult, InfraError> {
        // API Gateway プロキシ互換のエンベロープに包む
        let envelope = serde_json::json!({
            "body": serde_json::to_string(request)?,
        });
        let payload = Blob::new(serde_json::to_vec(&envelope)?);

        let response = self
            .client
            .invoke()
            .function_name(&self.function_name)
            .invocation_type(InvocationType::RequestResponse)
            .payload(payload)
            .send()
            .await
            .map_err(|e| InfraError::analysis(format!("Lambda 呼び出しに失敗: {e}")))?;

        if let Some(function_error) = response.function_error() {
            return Err(InfraError::analysis(format!(
                "Lambda 関数がエラーを返しました: {function_error}"
            )));
        }

        let payload = response.payload().ok_or_else(|| {
            InfraError::analysis("Lambda 応答にペイロードがありません".to_string())
        })?;
        let outer: serde_json::Value = serde_json::from_slice(payload.as_ref())
            .map_err(|e| InfraError::analysis(format!("Lambda 応答の解析に失敗: {e}")))?;

        // body キーが無い応答は空オブジェクトとして扱う（既定値で補完される）
        let body = match outer.get("body") {
            None => "{}",
            Some(serde_json::Value::String(s)) => s,
            Some(other) => {
                return Err(InfraError::analysis(format!(
                    "Lambda 応答の body が文字列ではありません: {other}"
                )));
            }
        };

        let parsed: AnalysisResponse = serde_json::from_str(body)
            .map_err(|e| InfraError::analysis(format!("分析応答の解析に失敗: {e}")))?;

        Ok(parsed.normalize())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use pretty_assertions::assert_eq;

    use super::*;

    /// 指定回数失敗した後に成功するスタブ
    struct FlakyInvoker {
        calls:    Arc<AtomicU32>,
        failures: u32,
    }

    #[async_trait]
    impl AnalysisInvoker for FlakyInvoker {
        async fn invoke(&self, _request: &AnalysisRequest) -> Result<AnalysisResult, InfraError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(InfraError::analysis("一時的な障害".to_string()))
            } else {
                Ok(AnalysisResult {
                    conditions:     vec!["Flu".to_string()],
                    severity:       "Mild".to_string(),
                    recommendation: vec!["Rest".to_string()],
                })
            }
        }
    }

    /// 応答を返さないスタブ
    struct HangingInvoker {
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl AnalysisInvoker for HangingInvoker {
        async fn invoke(&self, _request: &AnalysisRequest) -> Result<AnalysisResult, InfraError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(InfraError::analysis("到達しない".to_string()))
        }
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            symptoms:        vec!["headache".to_string()],
            medical_history: vec![],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn 初回成功時はリトライしない() {
        let calls = Arc::new(AtomicU32::new(0));
        let invoker = FlakyInvoker {
            calls:    Arc::clone(&calls),
            failures: 0,
        };

        let result = invoker
            .invoke_with_retry(&request(), Duration::from_secs(10))
            .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn 一時的な失敗後の試行で成功する() {
        let calls = Arc::new(AtomicU32::new(0));
        let invoker = FlakyInvoker {
            calls:    Arc::clone(&calls),
            failures: 2,
        };

        let result = invoker
            .invoke_with_retry(&request(), Duration::from_secs(10))
            .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn 全試行が失敗した場合はエラーを返す() {
        let calls = Arc::new(AtomicU32::new(0));
        let invoker = FlakyInvoker {
            calls:    Arc::clone(&calls),
            failures: 10,
        };

        let result = invoker
            .invoke_with_retry(&request(), Duration::from_secs(10))
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test(start_paused = true)]
    async fn タイムアウトした試行もリトライ対象になる() {
        let calls = Arc::new(AtomicU32::new(0));
        let invoker = HangingInvoker {
            calls: Arc::clone(&calls),
        };

        let result = invoker
            .invoke_with_retry(&request(), Duration::from_secs(10))
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }
}
