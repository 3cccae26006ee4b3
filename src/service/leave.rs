use async_trait::async_trait;
use tracing::info;

use super::enrichment::Enricher;
use super::{
    CreateEntity, DeleteAll, EntityService, ServiceContext, create_record, delete_all_records,
    delete_record, update_record,
};
use crate::config::ServiceProps;
use crate::dao::Dao;
use crate::error::ServiceError;
use crate::model::{Entity, Leave};
use crate::store::{Connector, ListQuery, ListResponse};
use crate::utils::document::Document;

pub struct LeaveService {
    ctx: ServiceContext,
    dao: Dao<Leave>,
    enricher: Enricher,
}

impl LeaveService {
    pub async fn new(connector: &dyn Connector, props: &ServiceProps) -> Result<Self, ServiceError> {
        let ctx = ServiceContext::open(connector, props, Leave::STAFF_SCOPED).await?;
        Ok(Self {
            dao: ctx.dao(),
            enricher: Enricher::new(ctx.platform.clone()),
            ctx,
        })
    }
}

#[async_trait]
impl EntityService for LeaveService {
    type Record = Leave;

    async fn list(&self, query: &ListQuery) -> Result<ListResponse<Leave>, ServiceError> {
        let mut response = self.dao.list(query).await?;
        self.enricher.attach_all(&mut response.list).await;
        Ok(response)
    }

    async fn get(&self, id: &str) -> Result<Leave, ServiceError> {
        let mut record = self.dao.get(id).await?;
        self.enricher.attach(&mut record).await;
        Ok(record)
    }

    async fn find(&self, filter: &str) -> Result<Leave, ServiceError> {
        self.dao.find(filter).await
    }

    async fn update(&self, id: &str, data: Document) -> Result<Leave, ServiceError> {
        let mut record = update_record(&self.dao, id, data).await?;
        self.enricher.attach(&mut record).await;
        Ok(record)
    }

    async fn delete(&self, id: &str, permanent: bool) -> Result<u64, ServiceError> {
        let deleted = delete_record(&self.dao, id, permanent).await?;
        info!(leave_id = id, permanent, "Leave deleted");
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
impl CreateEntity for LeaveService {
    /// Leave is always filed for the bound staff member.
    async fn create(&self, data: Document) -> Result<Leave, ServiceError> {
        let staff_id = self.ctx.staff_id.as_deref().ok_or(ServiceError::StaffIdRequired)?;
        let created = create_record(&self.dao, data, &self.ctx.business_id, Some(staff_id)).await?;
        info!(leave_id = %created.leave_id, staff_id, "Leave created");
        Ok(created)
    }
}

#[async_trait]
impl DeleteAll for LeaveService {
    async fn delete_all(&self, permanent: bool) -> Result<u64, ServiceError> {
        let deleted = delete_all_records(&self.dao, permanent).await?;
        info!(business_id = %self.ctx.business_id, deleted, permanent, "Leave records deleted");
        Ok(deleted)
    }
}
