//! # S3 レポート保管
//!
//! Amazon S3 へのレポート PDF の保管と Presigned URL 生成を行う。
//!
//! ## 設計方針
//!
//! - **ローカル開発**: LocalStack を使用（`AWS_ENDPOINT_URL` で接続先を指定）
//! - **本番環境**: IAM ロールによる認証で Amazon S3 に接続
//! - **Presigned URL**: ブラウザが S3 から直接 GET する方式（サーバーは URL 発行のみ）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use std::time::Duration;
//!
//! use symptocare_infra::{aws, s3};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = aws::load_config(Some("http://localhost:4566")).await;
//!     let client = s3::create_client(&config, true);
//!     let storage = s3::S3ReportStorage::new(client, "symptocare-reports".to_string());
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::{Client, presigning::PresigningConfig, primitives::ByteStream};

use crate::InfraError;

/// レポート保管ストレージのインターフェース
///
/// レポート PDF の保管と Presigned GET URL の生成を提供する。
/// テスト時はモックに差し替え可能。
#[async_trait]
pub trait ReportStorage: Send + Sync {
    /// レポート PDF をアップロードする
    ///
    /// # 引数
    ///
    /// * `filename` - S3 オブジェクトキー（例: `alice_report.pdf`）
    /// * `content` - PDF のバイト列
    async fn upload(&self, filename: &str, content: Vec<u8>) -> Result<(), InfraError>;

    /// Presigned GET URL を生成する（ダウンロード用）
    ///
    /// ブラウザがこの URL に対して HTTP GET でレポートを直接ダウンロードする。
    ///
    /// # 引数
    ///
    /// * `filename` - S3 オブジェクトキー
    /// * `expires_in` - URL の有効期限
    async fn generate_presigned_get_url(
        &self,
        filename: &str,
        expires_in: Duration,
    ) -> Result<String, InfraError>;
}

/// AWS S3 レポートストレージ
///
/// `aws-sdk-s3` を使用した [`ReportStorage`] の実装。
/// LocalStack とも互換動作する。
pub struct S3ReportStorage {
    client:      Client,
    bucket_name: String,
}

impl S3ReportStorage {
    /// 新しい S3 レポートストレージを作成する
    pub fn new(client: Client, bucket_name: String) -> Self {
        Self {
            client,
            bucket_name,
        }
    }
}

#[async_trait]
impl ReportStorage for S3ReportStorage {
    async fn upload(&self, filename: &str, content: Vec<u8>) -> Result<(), InfraError> {
        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(filename)
            .content_type("application/pdf")
            .body(ByteStream::from(content))
            .send()
            .await
            .map_err(|e| InfraError::s3(format!("レポートのアップロードに失敗: {e}")))?;

        Ok(())
    }

    async fn generate_presigned_get_url(
        &self,
        filename: &str,
        expires_in: Duration,
    ) -> Result<String, InfraError> {
        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| InfraError::s3(format!("Presigned 設定の構築に失敗: {e}")))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(filename)
            .presigned(presign_config)
            .await
            .map_err(|e| InfraError::s3(format!("Presigned GET URL の生成に失敗: {e}")))?;

        Ok(presigned.uri().to_string())
    }
}

/// S3 クライアントを作成する
///
/// LocalStack はパススタイルが必要（バーチャルホスト型 URL を使わない）。
/// エンドポイントを上書きしている環境では `force_path_style` を `true` にする。
///
/// # 引数
///
/// * `config` - [`crate::aws::load_config`] で構築した共有設定
/// * `force_path_style` - パススタイルアクセスを強制するか
pub fn create_client(config: &SdkConfig, force_path_style: bool) -> Client {
    let s3_config_builder = aws_sdk_s3::config::Builder::from(config);
    let s3_config = if force_path_style {
        s3_config_builder.force_path_style(true).build()
    } else {
        s3_config_builder.build()
    };

    Client::from_conf(s3_config)
}
