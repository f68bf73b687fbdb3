//! # AWS SDK 設定
//!
//! AWS SDK の共有設定（`SdkConfig`）を構築する。
//!
//! ## 設計方針
//!
//! - **ローカル開発**: LocalStack を使用（`AWS_ENDPOINT_URL` で切替）
//! - **本番環境**: IAM ロールによる認証（デフォルトプロバイダチェーン）
//! - **設定の一元化**: Lambda / SQS / SNS / S3 / DynamoDB の各クライアントは
//!   ここで構築した 1 つの `SdkConfig` から生成する
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use symptocare_infra::aws;
//!
//! async fn setup() {
//!     let config = aws::load_config(Some("http://localhost:4566")).await;
//!     let lambda = aws_sdk_lambda::Client::new(&config);
//!     let sqs = aws_sdk_sqs::Client::new(&config);
//! }
//! ```

use aws_config::SdkConfig;

/// AWS SDK の共有設定を読み込む
///
/// # 引数
///
/// * `endpoint_url` - エンドポイント URL。`Some` の場合は LocalStack 等の
///   ローカルエンドポイントに向け、ダミークレデンシャルを使用する。
///   `None` の場合はデフォルトプロバイダチェーン（IAM ロール等）を使用する。
pub async fn load_config(endpoint_url: Option<&str>) -> SdkConfig {
    match endpoint_url {
        Some(endpoint) => {
            aws_config::defaults(aws_config::BehaviorVersion::latest())
                .endpoint_url(endpoint)
                .region(aws_config::Region::new("ap-northeast-1"))
                // LocalStack はクレデンシャルを検証しないが、SDK はプロバイダが必要
                .credentials_provider(aws_sdk_dynamodb::config::Credentials::new(
                    "local", "local", None, None, "local",
                ))
                .load()
                .await
        }
        None => aws_config::defaults(aws_config::BehaviorVersion::latest()).load().await,
    }
}
