//! # DynamoDB 接続管理
//!
//! Amazon DynamoDB への接続管理を行う。
//!
//! ## 設計方針
//!
//! - **ローカル開発**: LocalStack の DynamoDB を使用
//! - **本番環境**: IAM ロールによる認証で Amazon DynamoDB に接続
//! - **テーブル自動作成**: アプリケーション起動時にテーブルが存在しなければ作成（冪等）
//!
//! ## DynamoDB の用途
//!
//! SymptoCare では DynamoDB を以下の目的で使用する:
//!
//! - **分析履歴**: 症状分析の実行結果をユーザー別に記録・閲覧
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use symptocare_infra::{aws, dynamodb};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = aws::load_config(Some("http://localhost:4566")).await;
//!     let client = dynamodb::create_client(&config);
//!     dynamodb::ensure_history_table(&client, "analysis_history").await?;
//!     Ok(())
//! }
//! ```

use aws_config::SdkConfig;
use aws_sdk_dynamodb::{
    Client,
    types::{
        AttributeDefinition,
        BillingMode,
        KeySchemaElement,
        KeyType,
        ScalarAttributeType,
        TimeToLiveSpecification,
    },
};

use crate::InfraError;

/// DynamoDB クライアントを作成する
pub fn create_client(config: &SdkConfig) -> Client {
    Client::new(config)
}

/// 分析履歴テーブルが存在しなければ作成する（冪等）
///
/// テーブルスキーマ:
/// - PK: `username`（String、ユーザー名）
/// - SK: `sk`（String、`{ISO8601_timestamp}#{uuid}` 形式）
/// - TTL: `ttl` 属性で自動削除（created_at + 365 日）
///
/// # 引数
///
/// * `client` - DynamoDB クライアント
/// * `table_name` - テーブル名
pub async fn ensure_history_table(client: &Client, table_name: &str) -> Result<(), InfraError> {
    // テーブルの存在確認
    match client.describe_table().table_name(table_name).send().await {
        Ok(_) => {
            tracing::debug!("テーブル '{}' は既に存在します", table_name);
            return Ok(());
        }
        Err(err) => {
            // ResourceNotFoundException の場合のみテーブル作成に進む
            let service_err = err.as_service_error();
            if !service_err
                .map(|e| e.is_resource_not_found_exception())
                .unwrap_or(false)
            {
                return Err(InfraError::dynamo_db(format!(
                    "テーブル '{}' の確認に失敗: {}",
                    table_name, err
                )));
            }
        }
    }

    // テーブル作成
    tracing::info!("テーブル '{}' を作成します", table_name);

    let create_result = client
        .create_table()
        .table_name(table_name)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name("username")
                .key_type(KeyType::Hash)
                .build()
                .map_err(|e| InfraError::dynamo_db(format!("KeySchema 構築エラー: {}", e)))?,
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name("sk")
                .key_type(KeyType::Range)
                .build()
                .map_err(|e| InfraError::dynamo_db(format!("KeySchema 構築エラー: {}", e)))?,
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("username")
                .attribute_type(ScalarAttributeType::S)
                .build()
                .map_err(|e| {
                    InfraError::dynamo_db(format!("AttributeDefinition 構築エラー: {}", e))
                })?,
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("sk")
                .attribute_type(ScalarAttributeType::S)
                .build()
                .map_err(|e| {
                    InfraError::dynamo_db(format!("AttributeDefinition 構築エラー: {}", e))
                })?,
        )
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await;

    match create_result {
        Ok(_) => {}
        Err(err) => {
            // ResourceInUseException は並行呼び出し時に発生しうる（テーブルが作成中）
            // この場合は冪等として成功扱いにする
            let is_resource_in_use = err
                .as_service_error()
                .map(|e| e.is_resource_in_use_exception())
                .unwrap_or(false);
            if !is_resource_in_use {
                return Err(InfraError::dynamo_db(format!(
                    "テーブル '{}' の作成に失敗: {}",
                    table_name, err
                )));
            }
            tracing::debug!(
                "テーブル '{}' は既に作成中または存在します（ResourceInUseException）",
                table_name
            );
            return Ok(());
        }
    }

    // TTL 設定
    client
        .update_time_to_live()
        .table_name(table_name)
        .time_to_live_specification(
            TimeToLiveSpecification::builder()
                .enabled(true)
                .attribute_name("ttl")
                .build()
                .map_err(|e| InfraError::dynamo_db(format!("TTL 設定の構築に失敗: {}", e)))?,
        )
        .send()
        .await
        .map_err(|e| {
            InfraError::dynamo_db(format!(
                "テーブル '{}' の TTL 設定に失敗: {}",
                table_name, e
            ))
        })?;

    tracing::info!("テーブル '{}' を作成しました", table_name);

    Ok(())
}
