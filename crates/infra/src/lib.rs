//! # SymptoCare インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! このクレートはリポジトリ・外部サービスのインターフェース（トレイト）と
//! その具体的な実装を提供する。外部システムの詳細をカプセル化し、
//! ユースケース層をインフラの変更から保護する。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理
//! - **セッション管理**: Redis へのセッション格納
//! - **リポジトリ実装**: ユーザー・プロフィール・アレルギー・栄養不足・
//!   API トークン（PostgreSQL）、分析履歴（DynamoDB）
//! - **外部サービスクライアント**: 分析関数（Lambda）、メッセージキュー
//!   （SQS）、通知（SNS）、レポート保管（S3）
//! - **レポート生成**: printpdf による PDF 生成
//!
//! ## 依存関係
//!
//! ```text
//! web → infra → domain
//! ```
//!
//! インフラ層は `domain` に依存する。
//! ドメイン層はインフラ層に依存しない（依存性逆転の原則）。
//!
//! ## モジュール構成
//!
//! - [`aws`] - AWS SDK 共有設定
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`dynamodb`] - DynamoDB 接続管理・テーブル初期化
//! - [`error`] - インフラ層エラー定義
//! - [`lambda`] - 分析関数呼び出し
//! - [`password`] - パスワードハッシュ
//! - [`report`] - PDF レポート生成
//! - [`repository`] - リポジトリ実装
//! - [`s3`] - レポート保管と Presigned URL
//! - [`session`] - Redis セッション管理
//! - [`sns`] - 通知発行
//! - [`sqs`] - メッセージキュー
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use symptocare_infra::{aws, db, session::RedisSessionManager};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     // データベース接続プールの作成
//!     let pool = db::create_pool("postgres://localhost/symptocare").await?;
//!
//!     // Redis セッションマネージャの作成
//!     let sessions = RedisSessionManager::new("redis://localhost").await?;
//!
//!     // AWS SDK 共有設定の読み込み
//!     let aws_config = aws::load_config(None).await;
//!
//!     Ok(())
//! }
//! ```

pub mod aws;
pub mod db;
pub mod dynamodb;
pub mod error;
pub mod lambda;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod password;
pub mod report;
pub mod repository;
pub mod s3;
pub mod session;
pub mod sns;
pub mod sqs;

pub use error::InfraError;
pub use password::{Argon2PasswordHasher, PasswordHasher};
pub use session::{RedisSessionManager, SessionData, SessionManager};
