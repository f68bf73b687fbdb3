//! # Web サーバー設定
//!
//! 環境変数から Web サーバーの設定を読み込む。

use std::{env, time::Duration};

/// 分析呼び出しタイムアウトの既定値（秒）
const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 10;

/// Web サーバーの設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// バインドアドレス
    pub host:                   String,
    /// ポート番号
    pub port:                   u16,
    /// データベース接続 URL
    pub database_url:           String,
    /// Redis 接続 URL（セッションストア）
    pub redis_url:              String,
    /// AWS エンドポイント URL（LocalStack 用。未設定なら実 AWS）
    pub aws_endpoint_url:       Option<String>,
    /// レポート PDF を保存する S3 バケット名
    pub report_bucket_name:     String,
    /// 症状分析 Lambda 関数名
    pub analysis_function_name: String,
    /// 分析結果を中継する SQS キュー URL
    pub analysis_queue_url:     String,
    /// アラート通知用 SNS トピック ARN（未設定なら通知をスキップ）
    pub alert_topic_arn:        Option<String>,
    /// 分析履歴を保存する DynamoDB テーブル名
    pub analysis_history_table: String,
    /// 分析呼び出しの 1 試行あたりタイムアウト
    pub analysis_timeout:       Duration,
    /// 実行環境（`production` のとき Cookie に Secure を付与）
    pub environment:            String,
}

impl AppConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            host:                   env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port:                   env::var("WEB_PORT")
                .expect("WEB_PORT が設定されていません（.env を確認してください）")
                .parse()
                .expect("WEB_PORT は有効なポート番号である必要があります"),
            database_url:           env::var("DATABASE_URL")
                .expect("DATABASE_URL が設定されていません（.env を確認してください）"),
            redis_url:              env::var("REDIS_URL")
                .expect("REDIS_URL が設定されていません（.env を確認してください）"),
            aws_endpoint_url:       env::var("AWS_ENDPOINT_URL").ok(),
            report_bucket_name:     env::var("REPORT_BUCKET_NAME")
                .expect("REPORT_BUCKET_NAME が設定されていません（.env を確認してください）"),
            analysis_function_name: env::var("ANALYSIS_FUNCTION_NAME")
                .expect("ANALYSIS_FUNCTION_NAME が設定されていません（.env を確認してください）"),
            analysis_queue_url:     env::var("ANALYSIS_QUEUE_URL")
                .expect("ANALYSIS_QUEUE_URL が設定されていません（.env を確認してください）"),
            alert_topic_arn:        env::var("ALERT_TOPIC_ARN").ok(),
            analysis_history_table: env::var("ANALYSIS_HISTORY_TABLE")
                .unwrap_or_else(|_| "analysis_history".to_string()),
            analysis_timeout:       Duration::from_secs(
                env::var("ANALYSIS_TIMEOUT_SECS")
                    .ok()
                    .map_or(DEFAULT_ANALYSIS_TIMEOUT_SECS, |v| {
                        v.parse()
                            .expect("ANALYSIS_TIMEOUT_SECS は秒数である必要があります")
                    }),
            ),
            environment:            env::var("ENV").unwrap_or_else(|_| "development".to_string()),
        })
    }

    /// 本番環境かどうか
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
