//! # 栄養欠乏症記録ユースケース
//!
//! 栄養欠乏症記録の CRUD を実装する。構造はアレルギー記録と同じで、
//! 名称と説明のみを持つ共有レコード。

use std::sync::Arc;

use async_trait::async_trait;
use symptocare_domain::{
    clock::Clock,
    deficiency::{Deficiency, DeficiencyId, DeficiencyName},
};
use symptocare_infra::repository::DeficiencyRepository;
use symptocare_shared::{event_log::event, log_business_event};

use crate::error::WebError;

/// 栄養欠乏症記録ユースケーストレイト
#[async_trait]
pub trait DeficiencyUseCase: Send + Sync {
    /// 栄養欠乏症記録の一覧を取得する
    async fn list(&self) -> Result<Vec<Deficiency>, WebError>;

    /// 栄養欠乏症記録を作成する
    async fn create(&self, name: String, description: String) -> Result<Deficiency, WebError>;

    /// 栄養欠乏症記録を 1 件取得する
    async fn fetch(&self, id: &DeficiencyId) -> Result<Deficiency, WebError>;

    /// 栄養欠乏症記録を更新する
    async fn update(
        &self,
        id: &DeficiencyId,
        name: String,
        description: String,
    ) -> Result<Deficiency, WebError>;

    /// 栄養欠乏症記録を削除する
    async fn delete(&self, id: &DeficiencyId) -> Result<(), WebError>;
}

/// 栄養欠乏症記録ユースケースの実装
pub struct DeficiencyUseCaseImpl {
    deficiency_repository: Arc<dyn DeficiencyRepository>,
    clock:                 Arc<dyn Clock>,
}

impl DeficiencyUseCaseImpl {
    /// 新しいユースケースインスタンスを作成
    pub fn new(
        deficiency_repository: Arc<dyn DeficiencyRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            deficiency_repository,
            clock,
        }
    }

    pub async fn list(&self) -> Result<Vec<Deficiency>, WebError> {
        Ok(self.deficiency_repository.find_all().await?)
    }

    pub async fn create(&self, name: String, description: String) -> Result<Deficiency, WebError> {
        let name = DeficiencyName::new(name)?;
        let deficiency = Deficiency::new(name, description, self.clock.now());
        self.deficiency_repository.insert(&deficiency).await?;

        log_business_event!(
            event.category = event::category::RECORD,
            event.action = event::action::RECORD_CREATED,
            event.entity_type = event::entity_type::DEFICIENCY,
            event.entity_id = %deficiency.id(),
            event.result = event::result::SUCCESS,
            "栄養欠乏症記録を作成しました"
        );

        Ok(deficiency)
    }

    pub async fn fetch(&self, id: &DeficiencyId) -> Result<Deficiency, WebError> {
        self.deficiency_repository
            .find_by_id(id)
            .await?
            .ok_or(WebError::NotFound("Deficiency"))
    }

    pub async fn update(
        &self,
        id: &DeficiencyId,
        name: String,
        description: String,
    ) -> Result<Deficiency, WebError> {
        let name = DeficiencyName::new(name)?;
        let deficiency = self.fetch(id).await?;
        let updated = deficiency.with_details(name, description, self.clock.now());
        self.deficiency_repository.update(&updated).await?;

        log_business_event!(
            event.category = event::category::RECORD,
            event.action = event::action::RECORD_UPDATED,
            event.entity_type = event::entity_type::DEFICIENCY,
            event.entity_id = %updated.id(),
            event.result = event::result::SUCCESS,
            "栄養欠乏症記録を更新しました"
        );

        Ok(updated)
    }

    pub async fn delete(&self, id: &DeficiencyId) -> Result<(), WebError> {
        let deleted = self.deficiency_repository.delete(id).await?;
        if !deleted {
            return Err(WebError::NotFound("Deficiency"));
        }

        log_business_event!(
            event.category = event::category::RECORD,
            event.action = event::action::RECORD_DELETED,
            event.entity_type = event::entity_type::DEFICIENCY,
            event.entity_id = %id,
            event.result = event::result::SUCCESS,
            "栄養欠乏症記録を削除しました"
        );

        Ok(())
    }
}

#[async_trait]
impl DeficiencyUseCase for DeficiencyUseCaseImpl {
    async fn list(&self) -> Result<Vec<Deficiency>, WebError> {
        self.list().await
    }

    async fn create(&self, name: String, description: String) -> Result<Deficiency, WebError> {
        self.create(name, description).await
    }

    async fn fetch(&self, id: &DeficiencyId) -> Result<Deficiency, WebError> {
        self.fetch(id).await
    }

    async fn update(
        &self,
        id: &DeficiencyId,
        name: String,
        description: String,
    ) -> Result<Deficiency, WebError> {
        self.update(id, name, description).await
    }

    async fn delete(&self, id: &DeficiencyId) -> Result<(), WebError> {
        self.delete(id).await
    }
}
