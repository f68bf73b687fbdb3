//! # SymptoCare ドメイン層
//!
//! 症状分析ポータルのドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! このクレートは以下を提供する:
//!
//! - **エンティティ**: 一意の識別子を持つオブジェクト（例: User,
//!   UserProfile, Allergy）
//! - **値オブジェクト**: 識別子を持たない不変オブジェクト（例: Email,
//!   TokenKey）
//! - **分析結果モデル**: 外部分析関数の応答を型付きで正規化する
//!   [`analysis`] モジュール
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! web → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、外部サービス）には一切依存しない。
//! これにより、ビジネスロジックの純粋性が保たれる。
//!
//! ## 使用例
//!
//! ```rust
//! use symptocare_domain::{DomainError, allergy::AllergyId};
//!
//! // ID の生成
//! let allergy_id = AllergyId::new();
//!
//! // ドメインエラーの生成
//! let error = DomainError::NotFound {
//!     entity_type: "Allergy",
//!     id:          "al-123".to_string(),
//! };
//! ```

#[macro_use]
mod macros;

pub mod allergy;
pub mod analysis;
pub mod clock;
pub mod deficiency;
pub mod error;
pub mod history;
pub mod password;
pub mod profile;
pub mod token;
pub mod user;
pub mod value_objects;

pub use error::DomainError;
