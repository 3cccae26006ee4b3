use async_trait::async_trait;
use tracing::info;

use super::enrichment::Enricher;
use super::{DeleteAll, EntityService, ServiceContext, delete_all_records, delete_record, update_record};
use crate::config::ServiceProps;
use crate::dao::Dao;
use crate::error::ServiceError;
use crate::model::attendance::{ClockEventRequest, ClockInManyRequest, ClockOutManyRequest};
use crate::model::{Attendance, ClockEvent, Entity, Staff, fields};
use crate::store::{Connector, ListQuery, ListResponse};
use crate::utils::datetime::{now_in, parse_timezone, validate_datetime};
use crate::utils::document::{Document, Patch, to_document};
use crate::utils::ids::{generate_unique_id, normalize_id};

pub struct AttendanceService {
    ctx: ServiceContext,
    dao: Dao<Attendance>,
    staff: Dao<Staff>,
    enricher: Enricher,
}

/// Required explicit timestamp of the `*-many` operations.
fn explicit_date_time(date_time: Option<String>) -> Result<String, ServiceError> {
    let stamp = date_time.unwrap_or_default();
    validate_datetime(fields::DATE_TIME, &stamp)?;
    Ok(stamp)
}

impl AttendanceService {
    pub async fn new(connector: &dyn Connector, props: &ServiceProps) -> Result<Self, ServiceError> {
        let ctx = ServiceContext::open(connector, props, Attendance::STAFF_SCOPED).await?;
        Ok(Self {
            dao: ctx.dao(),
            staff: Dao::for_tenant(ctx.region.clone(), &ctx.business_id, None),
            enricher: Enricher::new(ctx.platform.clone()),
            ctx,
        })
    }

    async fn insert_clock_in(&self, staff_id: &str, event: ClockEvent) -> Result<Attendance, ServiceError> {
        let record = Attendance {
            attendance_id: generate_unique_id(Attendance::ID_PREFIX),
            business_id: self.ctx.business_id.clone(),
            staff_id: staff_id.to_string(),
            clock_in: event,
            ..Default::default()
        };
        let created = self.dao.create(&record).await?;
        info!(
            attendance_id = %created.attendance_id,
            business_id = %created.business_id,
            staff_id = %created.staff_id,
            "Clocked in"
        );
        Ok(created)
    }

    async fn write_clock_out(&self, mut record: Attendance, event: ClockEvent) -> Result<Attendance, ServiceError> {
        if record.is_clocked_out() {
            return Err(ServiceError::AlreadyClockedOut(record.attendance_id));
        }
        record.clock_out = Some(event);
        let id = record.attendance_id.clone();
        let updated = self.dao.update(&id, &Patch::replace_with(to_document(&record)?)).await?;
        info!(attendance_id = %id, staff_id = %updated.staff_id, "Clocked out");
        Ok(updated)
    }

    /// Clock the bound staff in, stamped with the current time in `business_timezone`.
    pub async fn clock_in(&self, mut req: ClockEventRequest) -> Result<Attendance, ServiceError> {
        let staff_id = self.ctx.staff_id.clone().ok_or(ServiceError::StaffIdRequired)?;
        let tz = parse_timezone(req.business_timezone.as_deref())?;
        req.fields.remove(fields::DATE_TIME);
        let event = ClockEvent { date_time: now_in(tz), fields: req.fields };
        self.insert_clock_in(&staff_id, event).await
    }

    /// Clock in on behalf of `staff_id` at an explicit `date_time`.
    pub async fn clock_in_many(&self, req: ClockInManyRequest) -> Result<Attendance, ServiceError> {
        let staff_id = normalize_id(&req.staff_id);
        if staff_id.is_empty() || !self.staff.exists(&staff_id).await? {
            return Err(ServiceError::InvalidStaffId(req.staff_id));
        }
        let date_time = explicit_date_time(req.date_time)?;
        let event = ClockEvent { date_time, fields: req.fields };
        self.insert_clock_in(&staff_id, event).await
    }

    pub async fn clock_out(&self, id: &str, mut req: ClockEventRequest) -> Result<Attendance, ServiceError> {
        let record = self.dao.get(id).await?;
        let tz = parse_timezone(req.business_timezone.as_deref())?;
        req.fields.remove(fields::DATE_TIME);
        let event = ClockEvent { date_time: now_in(tz), fields: req.fields };
        self.write_clock_out(record, event).await
    }

    pub async fn clock_out_many(&self, req: ClockOutManyRequest) -> Result<Attendance, ServiceError> {
        let record = match self.dao.get(&req.attendance_id).await {
            Ok(record) => record,
            Err(ServiceError::NotFound { .. }) => {
                return Err(ServiceError::InvalidAttendanceId(req.attendance_id));
            }
            Err(e) => return Err(e),
        };
        let date_time = explicit_date_time(req.date_time)?;
        let event = ClockEvent { date_time, fields: req.fields };
        self.write_clock_out(record, event).await
    }
}

#[async_trait]
impl EntityService for AttendanceService {
    type Record = Attendance;

    async fn list(&self, query: &ListQuery) -> Result<ListResponse<Attendance>, ServiceError> {
        let mut response = self.dao.list(query).await?;
        self.enricher.attach_all(&mut response.list).await;
        Ok(response)
    }

    async fn get(&self, id: &str) -> Result<Attendance, ServiceError> {
        let mut record = self.dao.get(id).await?;
        self.enricher.attach(&mut record).await;
        Ok(record)
    }

    async fn find(&self, filter: &str) -> Result<Attendance, ServiceError> {
        self.dao.find(filter).await
    }

    async fn update(&self, id: &str, data: Document) -> Result<Attendance, ServiceError> {
        let mut record = update_record(&self.dao, id, data).await?;
        self.enricher.attach(&mut record).await;
        Ok(record)
    }

    async fn delete(&self, id: &str, permanent: bool) -> Result<u64, ServiceError> {
        let deleted = delete_record(&self.dao, id, permanent).await?;
        info!(attendance_id = id, permanent, "Attendance deleted");
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
impl DeleteAll for AttendanceService {
    async fn delete_all(&self, permanent: bool) -> Result<u64, ServiceError> {
        let deleted = delete_all_records(&self.dao, permanent).await?;
        info!(business_id = %self.ctx.business_id, deleted, permanent, "Attendance records deleted");
        Ok(deleted)
    }
}
