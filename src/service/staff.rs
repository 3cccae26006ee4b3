use async_trait::async_trait;
use tracing::info;

use super::enrichment::Enricher;
use super::{CreateEntity, EntityService, ServiceContext, create_record, delete_record, update_record};
use crate::config::ServiceProps;
use crate::dao::Dao;
use crate::error::ServiceError;
use crate::model::{Entity, Staff};
use crate::store::{Connector, ListQuery, ListResponse};
use crate::utils::document::Document;

/// Staff records, decorated with their own profile and their manager's.
pub struct StaffService {
    ctx: ServiceContext,
    dao: Dao<Staff>,
    enricher: Enricher,
}

impl StaffService {
    pub async fn new(connector: &dyn Connector, props: &ServiceProps) -> Result<Self, ServiceError> {
        let ctx = ServiceContext::open(connector, props, Staff::STAFF_SCOPED).await?;
        Ok(Self {
            dao: ctx.dao(),
            enricher: Enricher::new(ctx.platform.clone()),
            ctx,
        })
    }

    async fn decorate(&self, staff: &mut Staff) {
        staff.staff_info = self.enricher.lookup(&staff.staff_id).await;
        staff.reporting_staff_info = match staff.reporting_staff_id() {
            Some(manager) => self.enricher.lookup(manager).await,
            None => None,
        };
    }
}

#[async_trait]
impl EntityService for StaffService {
    type Record = Staff;

    async fn list(&self, query: &ListQuery) -> Result<ListResponse<Staff>, ServiceError> {
        let mut response = self.dao.list(query).await?;
        for staff in response.list.iter_mut() {
            self.decorate(staff).await;
        }
        Ok(response)
    }

    async fn get(&self, id: &str) -> Result<Staff, ServiceError> {
        let mut staff = self.dao.get(id).await?;
        self.decorate(&mut staff).await;
        Ok(staff)
    }

    async fn find(&self, filter: &str) -> Result<Staff, ServiceError> {
        self.dao.find(filter).await
    }

    async fn update(&self, id: &str, data: Document) -> Result<Staff, ServiceError> {
        update_record(&self.dao, id, data).await
    }

    async fn delete(&self, id: &str, permanent: bool) -> Result<u64, ServiceError> {
        let deleted = delete_record(&self.dao, id, permanent).await?;
        info!(staff_id = id, permanent, "Staff deleted");
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
impl CreateEntity for StaffService {
    async fn create(&self, data: Document) -> Result<Staff, ServiceError> {
        let created = create_record(&self.dao, data, &self.ctx.business_id, None).await?;
        info!(staff_id = %created.staff_id, business_id = %created.business_id, "Staff created");
        Ok(created)
    }
}
