use serde::Serialize;

use super::ServiceContext;
use crate::config::ServiceProps;
use crate::error::ServiceError;
use crate::model::{Attendance, Department, Designation, Entity, Leave, Staff};
use crate::store::Connector;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardData {
    pub total_staffs: u64,
    pub total_departments: u64,
    pub total_designations: u64,
    pub total_attendances: u64,
    pub total_leaves: u64,
}

pub struct DashboardService {
    ctx: ServiceContext,
}

impl DashboardService {
    pub async fn new(connector: &dyn Connector, props: &ServiceProps) -> Result<Self, ServiceError> {
        // attendance and leave counts narrow to the staff member when one is bound
        let ctx = ServiceContext::open(connector, props, Attendance::STAFF_SCOPED).await?;
        Ok(Self { ctx })
    }

    /// Non-deleted record counts for the tenant.
    pub async fn dashboard_data(&self) -> Result<DashboardData, ServiceError> {
        Ok(DashboardData {
            total_staffs: self.ctx.dao::<Staff>().count().await?,
            total_departments: self.ctx.dao::<Department>().count().await?,
            total_designations: self.ctx.dao::<Designation>().count().await?,
            total_attendances: self.ctx.dao::<Attendance>().count().await?,
            total_leaves: self.ctx.dao::<Leave>().count().await?,
        })
    }

    pub async fn end_service(&self) {
        self.ctx.close().await;
    }
}

