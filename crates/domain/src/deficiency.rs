//! # 栄養欠乏症記録
//!
//! ユーザーが管理画面から登録する栄養欠乏症の情報。アレルギーと同じく
//! 名称と説明のみを持ち、システム全体で共有される。

use chrono::{DateTime, Utc};

define_uuid_id! {
    /// 栄養欠乏症 ID（一意識別子）
    pub struct DeficiencyId;
}

define_validated_string! {
    /// 栄養欠乏症名
    ///
    /// # 制約
    ///
    /// - 空文字列不可
    /// - 最大 100 文字
    pub struct DeficiencyName {
        label: "deficiency name",
        max_length: 100,
    }
}

/// 栄養欠乏症エンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deficiency {
    id: DeficiencyId,
    name: DeficiencyName,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Deficiency {
    /// 新しい栄養欠乏症記録を作成する
    pub fn new(name: DeficiencyName, description: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: DeficiencyId::new(),
            name,
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 既存のデータから栄養欠乏症記録を復元する（データベースから取得時）
    pub fn from_db(
        id: DeficiencyId,
        name: DeficiencyName,
        description: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            created_at,
            updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &DeficiencyId {
        &self.id
    }

    pub fn name(&self) -> &DeficiencyName {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ビジネスロジックメソッド

    /// 名称と説明を差し替えた新しいインスタンスを返す
    pub fn with_details(
        self,
        name: DeficiencyName,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            description: description.into(),
            updated_at: now,
            ..self
        }
    }
}
