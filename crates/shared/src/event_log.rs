//! # ビジネスイベントログとエラーコンテキストの構造化ヘルパー
//!
//! ログを `jq` で効率的に調査できるよう、ログフィールドの命名規約と
//! ヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## エラーコンテキスト
//!
//! 既存の `tracing::error!` に `error.category` + `error.kind` フィールドを直接追加する。
//! 定数は [`error`] モジュールで提供。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
///
/// ## 推奨フィールド
///
/// - `event.entity_type`: エンティティ種別（[`event::entity_type`] の定数を使用）
/// - `event.entity_id`: エンティティ ID
/// - `event.username`: 操作したユーザー名
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const AUTH: &str = "auth";
        pub const ANALYSIS: &str = "analysis";
        pub const RECORD: &str = "record";
        pub const SUBSCRIPTION: &str = "subscription";
    }

    /// イベントアクション
    pub mod action {
        // 認証
        pub const USER_REGISTERED: &str = "auth.user_registered";
        pub const LOGIN_SUCCESS: &str = "auth.login_success";
        pub const LOGIN_FAILURE: &str = "auth.login_failure";
        pub const LOGOUT: &str = "auth.logout";
        pub const TOKEN_ISSUED: &str = "auth.token_issued";

        // 症状分析
        pub const ANALYSIS_COMPLETED: &str = "analysis.completed";
        pub const ANALYSIS_FAILED: &str = "analysis.failed";
        pub const REPORT_GENERATED: &str = "analysis.report_generated";

        // アレルギー・栄養欠乏症レコード
        pub const RECORD_CREATED: &str = "record.created";
        pub const RECORD_UPDATED: &str = "record.updated";
        pub const RECORD_DELETED: &str = "record.deleted";

        // アラート購読
        pub const SUBSCRIPTION_REQUESTED: &str = "subscription.requested";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const USER: &str = "user";
        pub const SESSION: &str = "session";
        pub const PROFILE: &str = "profile";
        pub const ALLERGY: &str = "allergy";
        pub const DEFICIENCY: &str = "deficiency";
        pub const HISTORY_ENTRY: &str = "history_entry";
        pub const REPORT: &str = "report";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// インフラストラクチャ（DB、Redis、セッションストア）
        pub const INFRASTRUCTURE: &str = "infrastructure";
        /// 外部サービス呼び出し（分析 Lambda、SQS、SNS、S3、DynamoDB）
        pub const EXTERNAL_SERVICE: &str = "external_service";
    }

    /// エラー種別
    pub mod kind {
        pub const DATABASE: &str = "database";
        pub const SESSION: &str = "session";
        pub const INTERNAL: &str = "internal";
        pub const USER_LOOKUP: &str = "user_lookup";
        pub const PASSWORD_VERIFICATION: &str = "password_verification";
        pub const ANALYSIS: &str = "analysis";
        pub const QUEUE: &str = "queue";
        pub const NOTIFICATION: &str = "notification";
        pub const STORAGE: &str = "storage";
        pub const REPORT: &str = "report";
        pub const HISTORY: &str = "history";
    }
}
