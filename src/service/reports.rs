use tracing::debug;

use super::ServiceContext;
use super::enrichment::Enricher;
use crate::config::ServiceProps;
use crate::dao::Dao;
use crate::error::ServiceError;
use crate::model::{Attendance, Entity, fields};
use crate::store::{Connector, ListQuery, ListResponse};
use crate::utils::document::Document;

/// Attendance grouped per staff member (or any other field).
pub struct ReportsService {
    ctx: ServiceContext,
    attendance: Dao<Attendance>,
    enricher: Enricher,
}

impl ReportsService {
    pub async fn new(connector: &dyn Connector, props: &ServiceProps) -> Result<Self, ServiceError> {
        let ctx = ServiceContext::open(connector, props, Attendance::STAFF_SCOPED).await?;
        Ok(Self {
            attendance: ctx.dao(),
            enricher: Enricher::new(ctx.platform.clone()),
            ctx,
        })
    }

    /// Groups are `{ "_id": key, "count": n, "group_docs": [...] }`, grouped by
    /// `staff_id` unless `group_by` names another field.
    pub async fn attendance_summary(
        &self,
        query: &ListQuery,
        group_by: Option<&str>,
    ) -> Result<ListResponse<Document>, ServiceError> {
        let group_by = group_by.filter(|g| !g.is_empty()).unwrap_or(fields::STAFF_ID);
        let mut response = self.attendance.aggregate(query, group_by).await?;
        self.enricher.attach_to_groups(&mut response.list).await;
        debug!(
            business_id = %self.ctx.business_id,
            group_by,
            groups = response.summary.result_size,
            "Attendance summary built"
        );
        Ok(response)
    }

    pub async fn end_service(&self) {
        self.ctx.close().await;
    }
}
