//! # HistoryRepository
//!
//! 分析履歴の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **DynamoDB**: 分析履歴は DynamoDB に格納（PostgreSQL ではない）
//! - **ユーザー分離**: PK = username で論理分離
//! - **時系列ソート**: SK = `{timestamp}#{uuid}` でレキシカル順ソート
//! - **カーソルページネーション**: DynamoDB の `LastEvaluatedKey` を base64
//!   でエンコード

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::{Client, types::AttributeValue};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use symptocare_domain::history::HistoryEntry;

use crate::InfraError;

/// 分析履歴のページ
#[derive(Debug)]
pub struct HistoryPage {
    pub items:       Vec<HistoryEntry>,
    pub next_cursor: Option<String>,
}

/// 分析履歴リポジトリトレイト
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// 分析履歴を追記する
    async fn append(&self, entry: &HistoryEntry) -> Result<(), InfraError>;

    /// ユーザーの分析履歴を検索する（新しい順）
    async fn find_by_username(
        &self,
        username: &str,
        cursor: Option<&str>,
        limit: i32,
    ) -> Result<HistoryPage, InfraError>;
}

/// DynamoDB 実装の HistoryRepository
pub struct DynamoDbHistoryRepository {
    client:     Client,
    table_name: String,
}

impl DynamoDbHistoryRepository {
    pub fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl HistoryRepository for DynamoDbHistoryRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn append(&self, entry: &HistoryEntry) -> Result<(), InfraError> {
        let sk = entry.sort_key();

        let mut item = HashMap::new();
        item.insert(
            "username".to_string(),
            AttributeValue::S(entry.username.clone()),
        );
        item.insert("sk".to_string(), AttributeValue::S(sk));
        item.insert(
            "symptoms".to_string(),
            AttributeValue::S(entry.symptoms.clone()),
        );
        item.insert(
            "medical_history".to_string(),
            AttributeValue::S(entry.medical_history.clone()),
        );
        item.insert(
            "result".to_string(),
            AttributeValue::S(serde_json::to_string(&entry.result)?),
        );
        item.insert(
            "report_filename".to_string(),
            AttributeValue::S(entry.report_filename.clone()),
        );
        item.insert(
            "created_at".to_string(),
            AttributeValue::S(entry.created_at.to_rfc3339()),
        );
        item.insert("ttl".to_string(), AttributeValue::N(entry.ttl.to_string()));

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| InfraError::dynamo_db(format!("分析履歴の記録に失敗: {e}")))?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%username))]
    async fn find_by_username(
        &self,
        username: &str,
        cursor: Option<&str>,
        limit: i32,
    ) -> Result<HistoryPage, InfraError> {
        let mut query = self
            .client
            .query()
            .table_name(&self.table_name)
            .scan_index_forward(false) // 新しい順
            .limit(limit)
            .key_condition_expression("username = :username")
            .expression_attribute_values(":username", AttributeValue::S(username.to_string()));

        // カーソル（前ページの LastEvaluatedKey を base64 デコード）
        // AttributeValue は Serialize/Deserialize 非対応のため、
        // HashMap<String, String> に変換してシリアライズする
        if let Some(cursor_str) = cursor {
            let decoded = BASE64
                .decode(cursor_str)
                .map_err(|e| InfraError::invalid_input(format!("カーソルのデコードに失敗: {e}")))?;
            let key_strings: HashMap<String, String> =
                serde_json::from_slice(&decoded).map_err(|e| {
                    InfraError::invalid_input(format!("カーソルのデシリアライズに失敗: {e}"))
                })?;
            let last_key: HashMap<String, AttributeValue> = key_strings
                .into_iter()
                .map(|(k, v)| (k, AttributeValue::S(v)))
                .collect();
            query = query.set_exclusive_start_key(Some(last_key));
        }

        let output = query
            .send()
            .await
            .map_err(|e| InfraError::dynamo_db(format!("分析履歴の検索に失敗: {e}")))?;

        // レスポンスをドメインモデルに変換
        let items = output
            .items()
            .iter()
            .filter_map(|item| convert_item_to_history_entry(item).ok())
            .collect();

        // 次ページのカーソル
        // AttributeValue → HashMap<String, String> に変換してからシリアライズ
        let next_cursor = output.last_evaluated_key().map(|key| {
            let key_strings: HashMap<String, String> = key
                .iter()
                .filter_map(|(k, v)| v.as_s().ok().map(|s| (k.clone(), s.clone())))
                .collect();
            let json = serde_json::to_vec(&key_strings).unwrap_or_default();
            BASE64.encode(json)
        });

        Ok(HistoryPage { items, next_cursor })
    }
}

/// DynamoDB アイテムを HistoryEntry に変換する
fn convert_item_to_history_entry(
    item: &HashMap<String, AttributeValue>,
) -> Result<HistoryEntry, InfraError> {
    let username = get_s(item, "username")?;
    let sk = get_s(item, "sk")?;
    let symptoms = get_s(item, "symptoms")?;
    let medical_history = get_s(item, "medical_history")?;
    let result_str = get_s(item, "result")?;
    let report_filename = get_s(item, "report_filename")?;
    let ttl_str = get_n(item, "ttl")?;

    let result: serde_json::Value = serde_json::from_str(&result_str)?;

    let ttl: i64 = ttl_str
        .parse()
        .map_err(|e| InfraError::dynamo_db(format!("ttl のパースに失敗: {e}")))?;

    HistoryEntry::from_stored(
        username,
        &sk,
        symptoms,
        medical_history,
        result,
        report_filename,
        ttl,
    )
    .map_err(InfraError::dynamo_db)
}

/// DynamoDB アイテムから文字列属性を取得する
fn get_s(item: &HashMap<String, AttributeValue>, key: &str) -> Result<String, InfraError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| InfraError::dynamo_db(format!("属性 '{key}' が見つかりません")))
}

/// DynamoDB アイテムから数値属性を取得する
fn get_n(item: &HashMap<String, AttributeValue>, key: &str) -> Result<String, InfraError> {
    item.get(key)
        .and_then(|v| v.as_n().ok())
        .cloned()
        .ok_or_else(|| InfraError::dynamo_db(format!("数値属性 '{key}' が見つかりません")))
}
