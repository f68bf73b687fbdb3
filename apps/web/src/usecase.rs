//! # ユースケース層
//!
//! Web アプリケーションのビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **トレイトベースの設計**: テスト可能性のためユースケースごとにトレイトを定義
//! - **依存性注入**: リポジトリ・外部サービスを `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約
//!
//! ## モジュール構成
//!
//! - `auth`: 登録・ログイン・ログアウト・API トークン発行
//! - `submission`: ダッシュボードの症状送信と分析パイプライン
//! - `profile`: プロファイルの取得と更新 + 再分析
//! - `symptom`: 症状リストの直接分析
//! - `allergy` / `deficiency`: アレルギー・栄養欠乏症レコードの CRUD
//! - `subscription`: アラート購読

pub mod allergy;
pub mod auth;
pub mod deficiency;
pub mod profile;
pub mod submission;
pub mod subscription;
pub mod symptom;

pub use allergy::{AllergyUseCase, AllergyUseCaseImpl};
pub use auth::{AuthUseCase, AuthUseCaseImpl, LoginOutput, RegisterInput};
pub use deficiency::{DeficiencyUseCase, DeficiencyUseCaseImpl};
pub use profile::{ProfileUseCase, ProfileUseCaseImpl};
pub use submission::{
    DashboardView,
    HistoryEntryView,
    HistoryPageView,
    SubmissionUseCase,
    SubmissionUseCaseImpl,
};
pub use subscription::{SubscriptionUseCase, SubscriptionUseCaseImpl};
pub use symptom::{SymptomUseCase, SymptomUseCaseImpl};
