//! # アレルギー記録
//!
//! ユーザーが管理画面から登録するアレルギー情報。名称と説明のみを持つ
//! 単純なレコードで、所有者の概念は無くシステム全体で共有される。

use chrono::{DateTime, Utc};

define_uuid_id! {
    /// アレルギー ID（一意識別子）
    pub struct AllergyId;
}

define_validated_string! {
    /// アレルギー名
    ///
    /// # 制約
    ///
    /// - 空文字列不可
    /// - 最大 100 文字
    pub struct AllergyName {
        label: "allergy name",
        max_length: 100,
    }
}

/// アレルギーエンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allergy {
    id: AllergyId,
    name: AllergyName,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Allergy {
    /// 新しいアレルギー記録を作成する
    pub fn new(name: AllergyName, description: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: AllergyId::new(),
            name,
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 既存のデータからアレルギー記録を復元する（データベースから取得時）
    pub fn from_db(
        id: AllergyId,
        name: AllergyName,
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

    pub fn id(&self) -> &AllergyId {
        &self.id
    }

    pub fn name(&self) -> &AllergyName {
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
        name: AllergyName,
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

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[rstest]
    fn test_新規作成時の状態(now: DateTime<Utc>) {
        let name = AllergyName::new("Peanuts").unwrap();
        let sut = Allergy::new(name.clone(), "Severe reaction to peanuts", now);

        assert_eq!(sut.name(), &name);
        assert_eq!(sut.description(), "Severe reaction to peanuts");
        assert_eq!(sut.created_at(), now);
        assert_eq!(sut.updated_at(), now);
    }

    #[rstest]
    fn test_詳細差し替え後の状態(now: DateTime<Utc>) {
        let original = Allergy::new(AllergyName::new("Peanuts").unwrap(), "mild", now);
        let update_time = DateTime::from_timestamp(1_700_001_000, 0).unwrap();

        let sut = original.clone().with_details(
            AllergyName::new("Tree nuts").unwrap(),
            "Anaphylaxis risk",
            update_time,
        );

        assert_eq!(sut.id(), original.id());
        assert_eq!(sut.name().as_str(), "Tree nuts");
        assert_eq!(sut.description(), "Anaphylaxis risk");
        assert_eq!(sut.created_at(), now);
        assert_eq!(sut.updated_at(), update_time);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_空のアレルギー名はエラー(#[case] input: &str) {
        let result = AllergyName::new(input);
        assert!(result.is_err());
    }
}
