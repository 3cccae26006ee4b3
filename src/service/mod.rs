//! Entity services.
//!
//! A service is built per caller: it validates the tenant (and, for
//! staff-scoped entities, the staff member), holds one platform handle and one
//! region handle for its lifetime and releases both in `end_service`.

pub mod attendance;
pub mod dashboard;
pub mod enrichment;
pub mod leave;
pub mod reference;
pub mod reports;
pub mod staff;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

pub use attendance::AttendanceService;
pub use dashboard::{DashboardData, DashboardService};
pub use leave::LeaveService;
pub use reference::ReferenceService;
pub use reports::ReportsService;
pub use staff::StaffService;

use crate::config::ServiceProps;
use crate::dao::{BusinessDao, Dao};
use crate::error::ServiceError;
use crate::model::{Entity, Staff, fields};
use crate::store::{Connector, DocumentStore, ListQuery, ListResponse, Region};
use crate::utils::document::{Document, Patch, from_payload, to_document};
use crate::utils::ids::{generate_unique_id, normalize_id};

/* ===============================
 * Service contracts
 * =============================== */

#[async_trait]
pub trait EntityService: Send + Sync {
    type Record: Serialize + Send;

    async fn list(&self, query: &ListQuery) -> Result<ListResponse<Self::Record>, ServiceError>;
    async fn get(&self, id: &str) -> Result<Self::Record, ServiceError>;
    async fn find(&self, filter: &str) -> Result<Self::Record, ServiceError>;
    async fn update(&self, id: &str, data: Document) -> Result<Self::Record, ServiceError>;
    /// Soft delete unless `permanent`; returns the number of records touched.
    async fn delete(&self, id: &str, permanent: bool) -> Result<u64, ServiceError>;

    async fn begin_transaction(&self) -> Result<(), ServiceError>;
    async fn commit_transaction(&self) -> Result<(), ServiceError>;
    async fn rollback_transaction(&self) -> Result<(), ServiceError>;

    /// Release both store handles. Safe to call more than once.
    async fn end_service(&self);
}

#[async_trait]
pub trait CreateEntity: EntityService {
    async fn create(&self, data: Document) -> Result<Self::Record, ServiceError>;
}

#[async_trait]
pub trait DeleteAll: EntityService {
    async fn delete_all(&self, permanent: bool) -> Result<u64, ServiceError>;
}

/* ===============================
 * Connections held by a service
 * =============================== */

/// The tenant binding and the two handles a service owns.
pub struct ServiceContext {
    pub business_id: String,
    pub staff_id: Option<String>,
    pub platform: Arc<dyn DocumentStore>,
    pub region: Arc<dyn DocumentStore>,
}

impl ServiceContext {
    /// Open both handles and validate the tenant; `staff_scoped` services also
    /// validate the optional staff id. Every failure path closes what was opened.
    pub async fn open(
        connector: &dyn Connector,
        props: &ServiceProps,
        staff_scoped: bool,
    ) -> Result<Self, ServiceError> {
        let business_id = props.business_id()?.to_string();

        let platform = connector.open(Region::Platform, props).await?;
        let region = match connector.open(Region::Tenant, props).await {
            Ok(region) => region,
            Err(e) => {
                warn!(error = %e, business_id, "Failed to open region connection");
                platform.close().await;
                return Err(e);
            }
        };

        let staff_id = if staff_scoped { props.staff_id().map(str::to_string) } else { None };
        let ctx = Self { business_id, staff_id, platform, region };
        if let Err(e) = ctx.validate().await {
            ctx.close().await;
            return Err(e);
        }
        Ok(ctx)
    }

    async fn validate(&self) -> Result<(), ServiceError> {
        match BusinessDao::new(self.platform.clone()).get(&self.business_id).await {
            Ok(_) => {}
            Err(ServiceError::NotFound { .. }) => {
                debug!(business_id = %self.business_id, "Unknown business");
                return Err(ServiceError::TenantNotFound(self.business_id.clone()));
            }
            Err(e) => return Err(e),
        }

        if let Some(staff_id) = &self.staff_id {
            let staff = Dao::<Staff>::for_tenant(self.region.clone(), &self.business_id, None);
            if !staff.exists(staff_id).await? {
                debug!(business_id = %self.business_id, staff_id, "Unknown staff");
                return Err(ServiceError::StaffNotFound(staff_id.clone()));
            }
        }
        Ok(())
    }

    pub fn dao<E: Entity>(&self) -> Dao<E> {
        Dao::for_tenant(self.region.clone(), &self.business_id, self.staff_id.as_deref())
    }

    pub async fn close(&self) {
        self.platform.close().await;
        self.region.close().await;
    }
}

/* ===============================
 * Shared CRUD steps
 * =============================== */

/// Create with a caller-supplied (lower-cased) or generated id, forcing the tenant keys.
pub(crate) async fn create_record<E: Entity>(
    dao: &Dao<E>,
    data: Document,
    business_id: &str,
    staff_id: Option<&str>,
) -> Result<E, ServiceError> {
    let mut record: E = from_payload(data)?;
    let id = match record.id().trim() {
        "" => generate_unique_id(E::ID_PREFIX),
        given => normalize_id(given),
    };
    record.assign_keys(id.clone(), business_id, staff_id);
    record.validate()?;

    if dao.exists(&id).await? {
        return Err(ServiceError::duplicate(E::NAME, id));
    }
    dao.create(&record).await
}

pub(crate) async fn update_record<E: Entity>(
    dao: &Dao<E>,
    id: &str,
    data: Document,
) -> Result<E, ServiceError> {
    let current = dao.get(id).await?;
    let mut protected = E::key_fields();
    protected.extend_from_slice(fields::READ_ONLY);
    let patch = Patch::new(data, &protected);
    E::validate_patch(&patch)?;

    // the patched record must still read back as an `E`
    let mut merged = to_document(&current)?;
    patch.apply_to(&mut merged);
    from_payload::<E>(merged)?;

    dao.update(id, &patch).await
}

pub(crate) async fn delete_record<E: Entity>(
    dao: &Dao<E>,
    id: &str,
    permanent: bool,
) -> Result<u64, ServiceError> {
    dao.get(id).await?;
    if permanent {
        dao.delete(id).await
    } else {
        dao.soft_delete(id).await.map(|_| 1)
    }
}

pub(crate) async fn delete_all_records<E: Entity>(
    dao: &Dao<E>,
    permanent: bool,
) -> Result<u64, ServiceError> {
    if permanent {
        dao.delete_many().await
    } else {
        dao.soft_delete_many().await
    }
}
