use async_trait::async_trait;
use tracing::info;

use super::{
    CreateEntity, DeleteAll, EntityService, ServiceContext, create_record, delete_all_records,
    delete_record, update_record,
};
use crate::config::ServiceProps;
use crate::dao::Dao;
use crate::error::ServiceError;
use crate::model::{CodedEntity, Entity, StaffCategory};
use crate::store::{Connector, ListQuery, ListResponse};
use crate::utils::document::Document;

/// Plain CRUD over one lookup collection (departments, shifts, holidays, ...).
pub struct ReferenceService<E: Entity> {
    ctx: ServiceContext,
    dao: Dao<E>,
}

impl<E: Entity> ReferenceService<E> {
    pub async fn new(connector: &dyn Connector, props: &ServiceProps) -> Result<Self, ServiceError> {
        let ctx = ServiceContext::open(connector, props, E::STAFF_SCOPED).await?;
        Ok(Self { dao: ctx.dao(), ctx })
    }
}

impl<E: CodedEntity> ReferenceService<E> {
    pub async fn get_by_code(&self, code: &str) -> Result<E, ServiceError> {
        self.dao.find_by_code(code).await
    }
}

#[async_trait]
impl<E: Entity> EntityService for ReferenceService<E> {
    type Record = E;

    async fn list(&self, query: &ListQuery) -> Result<ListResponse<E>, ServiceError> {
        self.dao.list(query).await
    }

    async fn get(&self, id: &str) -> Result<E, ServiceError> {
        self.dao.get(id).await
    }

    async fn find(&self, filter: &str) -> Result<E, ServiceError> {
        self.dao.find(filter).await
    }

    async fn update(&self, id: &str, data: Document) -> Result<E, ServiceError> {
        update_record(&self.dao, id, data).await
    }

    async fn delete(&self, id: &str, permanent: bool) -> Result<u64, ServiceError> {
        let deleted = delete_record(&self.dao, id, permanent).await?;
        info!(entity = E::NAME, id, permanent, "Record deleted");
        Ok(deleted)
    }

    async fn begin_transaction(&self) -> Result<(), ServiceError> {
        self.ctx.region.begin_transaction().await
    }

    async fn commit_transaction(&self) -> Result<(), ServiceError> {
        self.ctx.region.commit_transaction().await
    }

    async fn rollback_transaction(&self) -> Result<(), ServiceError> {
        self.ctx.region.rollback_transaction().await
    }

    async fn end_service(&self) {
        self.ctx.close().await;
    }
}

#[async_trait]
impl<E: Entity> CreateEntity for ReferenceService<E> {
    async fn create(&self, data: Document) -> Result<E, ServiceError> {
        let created = create_record(
            &self.dao,
            data,
            &self.ctx.business_id,
            self.ctx.staff_id.as_deref(),
        )
        .await?;
        info!(entity = E::NAME, id = created.id(), business_id = %self.ctx.business_id, "Record created");
        Ok(created)
    }
}

#[async_trait]
impl DeleteAll for ReferenceService<StaffCategory> {
    async fn delete_all(&self, permanent: bool) -> Result<u64, ServiceError> {
        let deleted = delete_all_records(&self.dao, permanent).await?;
        info!(business_id = %self.ctx.business_id, deleted, permanent, "Staff categories deleted");
        Ok(deleted)
    }
}
