//! # アレルギー記録ユースケース
//!
//! アレルギー記録の CRUD を実装する。記録はシステム全体で共有され、
//! 所有者の概念は無い。更新は後勝ちで楽観ロックは行わない。

use std::sync::Arc;

use async_trait::async_trait;
use symptocare_domain::{
    allergy::{Allergy, AllergyId, AllergyName},
    clock::Clock,
};
use symptocare_infra::repository::AllergyRepository;
use symptocare_shared::{event_log::event, log_business_event};

use crate::error::WebError;

/// アレルギー記録ユースケーストレイト
#[async_trait]
pub trait AllergyUseCase: Send + Sync {
    /// アレルギー記録の一覧を取得する
    async fn list(&self) -> Result<Vec<Allergy>, WebError>;

    /// アレルギー記録を作成する
    async fn create(&self, name: String, description: String) -> Result<Allergy, WebError>;

    /// アレルギー記録を 1 件取得する
    async fn fetch(&self, id: &AllergyId) -> Result<Allergy, WebError>;

    /// アレルギー記録を更新する
    async fn update(
        &self,
        id: &AllergyId,
        name: String,
        description: String,
    ) -> Result<Allergy, WebError>;

    /// アレルギー記録を削除する
    async fn delete(&self, id: &AllergyId) -> Result<(), WebError>;
}

/// アレルギー記録ユースケースの実装
pub struct AllergyUseCaseImpl {
    allergy_repository: Arc<dyn AllergyRepository>,
    clock:              Arc<dyn Clock>,
}

impl AllergyUseCaseImpl {
    /// 新しいユースケースインスタンスを作成
    pub fn new(allergy_repository: Arc<dyn AllergyRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            allergy_repository,
            clock,
        }
    }

    pub async fn list(&self) -> Result<Vec<Allergy>, WebError> {
        Ok(self.allergy_repository.find_all().await?)
    }

    pub async fn create(&self, name: String, description: String) -> Result<Allergy, WebError> {
        let name = AllergyName::new(name)?;
        let allergy = Allergy::new(name, description, self.clock.now());
        self.allergy_repository.insert(&allergy).await?;

        log_business_event!(
            event.category = event::category::RECORD,
            event.action = event::action::RECORD_CREATED,
            event.entity_type = event::entity_type::ALLERGY,
            event.entity_id = %allergy.id(),
            event.result = event::result::SUCCESS,
            "アレルギー記録を作成しました"
        );

        Ok(allergy)
    }

    pub async fn fetch(&self, id: &AllergyId) -> Result<Allergy, WebError> {
        self.allergy_repository
            .find_by_id(id)
            .await?
            .ok_or(WebError::NotFound("Allergy"))
    }

    pub async fn update(
        &self,
        id: &AllergyId,
        name: String,
        description: String,
    ) -> Result<Allergy, WebError> {
        let name = AllergyName::new(name)?;
        let allergy = self.fetch(id).await?;
        let updated = allergy.with_details(name, description, self.clock.now());
        self.allergy_repository.update(&updated).await?;

        log_business_event!(
            event.category = event::category::RECORD,
            event.action = event::action::RECORD_UPDATED,
            event.entity_type = event::entity_type::ALLERGY,
            event.entity_id = %updated.id(),
            event.result = event::result::SUCCESS,
            "アレルギー記録を更新しました"
        );

        Ok(updated)
    }

    pub async fn delete(&self, id: &AllergyId) -> Result<(), WebError> {
        let deleted = self.allergy_repository.delete(id).await?;
        if !deleted {
            return Err(WebError::NotFound("Allergy"));
        }

        log_business_event!(
            event.category = event::category::RECORD,
            event.action = event::action::RECORD_DELETED,
            event.entity_type = event::entity_type::ALLERGY,
            event.entity_id = %id,
            event.result = event::result::SUCCESS,
            "アレルギー記録を削除しました"
        );

        Ok(())
    }
}

#[async_trait]
impl AllergyUseCase for AllergyUseCaseImpl {
    async fn list(&self) -> Result<Vec<Allergy>, WebError> {
        self.list().await
    }

    async fn create(&self, name: String, description: String) -> Result<Allergy, WebError> {
        self.create(name, description).await
    }

    async fn fetch(&self, id: &AllergyId) -> Result<Allergy, WebError> {
        self.fetch(id).await
    }

    async fn update(
        &self,
        id: &AllergyId,
        name: String,
        description: String,
    ) -> Result<Allergy, WebError> {
        self.update(id, name, description).await
    }

    async fn delete(&self, id: &AllergyId) -> Result<(), WebError> {
        self.delete(id).await
    }
}
