//! # リポジトリ実装
//!
//! ドメインモデルの永続化操作をトレイトとして定義し、具体的な実装を提供する。
//!
//! ## 設計方針
//!
//! - **依存性逆転**: ユースケース層はトレイト経由でリポジトリを利用する
//! - **データベース抽象化**: sqlx を使用し、PostgreSQL 固有の処理をカプセル化
//! - **分析履歴は DynamoDB**: 追記専用の時系列データのため RDB ではなく
//!   DynamoDB に格納する
//! - **テスタビリティ**: トレイト経由でモック可能な設計

pub mod allergy_repository;
pub mod deficiency_repository;
pub mod history_repository;
pub mod profile_repository;
pub mod token_repository;
pub mod user_repository;

pub use allergy_repository::{AllergyRepository, PostgresAllergyRepository};
pub use deficiency_repository::{DeficiencyRepository, PostgresDeficiencyRepository};
pub use history_repository::{DynamoDbHistoryRepository, HistoryPage, HistoryRepository};
pub use profile_repository::{PostgresProfileRepository, ProfileRepository};
pub use token_repository::{PostgresTokenRepository, TokenRepository};
pub use user_repository::{PostgresUserRepository, UserCredentials, UserRepository};
