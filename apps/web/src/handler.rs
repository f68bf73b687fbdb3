//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ビジネスロジックは usecase 層に委譲
//!
//! ## ハンドラ一覧
//!
//! - `auth`: 登録・ログイン・ログアウト・API トークン発行
//! - `dashboard`: ダッシュボード表示・症状送信・分析履歴
//! - `allergy` / `deficiency`: 記録の CRUD（画面系と API 系の両方で使用）
//! - `profile`: プロフィール API
//! - `symptom`: 症状分析 API
//! - `subscription`: アラート購読
//! - `health`: ヘルスチェック

pub mod allergy;
pub mod auth;
pub mod dashboard;
pub mod deficiency;
pub mod health;
pub mod profile;
pub mod subscription;
pub mod symptom;

pub use allergy::{
    AllergyState,
    confirm_delete_allergy,
    create_allergy,
    delete_allergy,
    get_allergy,
    list_allergies,
    update_allergy,
};
pub use auth::{AuthState, api_login, login, logout, protected_check, register};
pub use dashboard::{DashboardState, get_history, show_dashboard, submit_symptoms};
pub use deficiency::{
    DeficiencyState,
    confirm_delete_deficiency,
    create_deficiency,
    delete_deficiency,
    get_deficiency,
    list_deficiencies,
    update_deficiency,
};
pub use health::{ReadinessState, health_check, readiness_check};
pub use profile::{ProfileState, get_profile, update_profile};
pub use subscription::{SubscriptionState, get_subscription_prompt, subscribe};
pub use symptom::{SymptomState, analyze_symptoms};
