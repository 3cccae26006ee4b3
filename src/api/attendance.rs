use actix_web::{HttpResponse, web};
use serde_json::json;

use super::context::TenantContext;
use super::{AppState, DeleteQuery, with_service};
use crate::error::ServiceError;
use crate::model::attendance::{ClockEventRequest, ClockInManyRequest, ClockOutManyRequest};
use crate::service::{AttendanceService, DeleteAll, EntityService};
use crate::store::ListQuery;
use crate::utils::document::Document;

/// Clock in the staff member bound by `X-Staff-Id`
#[utoipa::path(
    post,
    path = "/api/attendance/clock-in",
    responses(
        (status = 201, description = "Clocked in", body = Object, example = json!({
            "attendance_id": "atten4f1c2a9b0d7e6f5a4b3c",
            "business_id": "biz1",
            "staff_id": "stf1",
            "clock_in": { "date_time": "2024-03-01 09:00:02", "device": "web" },
            "is_deleted": false
        })),
        (status = 400, description = "Missing or invalid timezone, or no staff bound", body = Object, example = json!({
            "code": "S30103", "kind": "NoTimezone", "message": "no timezone information sent"
        })),
        (status = 403, description = "Unknown business or staff")
    ),
    params(
        ("X-Business-Id" = String, Header, description = "Tenant"),
        ("X-Staff-Id" = String, Header, description = "Staff member clocking in")
    ),
    tag = "Attendance"
)]
pub async fn clock_in(
    ctx: TenantContext,
    state: web::Data<AppState>,
    payload: web::Json<ClockEventRequest>,
) -> Result<HttpResponse, ServiceError> {
    let record = with_service!(
        AttendanceService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.clock_in(payload.into_inner())
    )?;
    Ok(HttpResponse::Created().json(record))
}

/// Clock in on behalf of a staff member at an explicit time
#[utoipa::path(
    post,
    path = "/api/attendance/clock-in-many",
    responses(
        (status = 201, description = "Clocked in", body = Object),
        (status = 400, description = "Unknown staff id or invalid date_time", body = Object, example = json!({
            "code": "S30105", "kind": "InvalidStaffId", "message": "no such staff id `stf9` found"
        }))
    ),
    tag = "Attendance"
)]
pub async fn clock_in_many(
    ctx: TenantContext,
    state: web::Data<AppState>,
    payload: web::Json<ClockInManyRequest>,
) -> Result<HttpResponse, ServiceError> {
    let record = with_service!(
        AttendanceService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.clock_in_many(payload.into_inner())
    )?;
    Ok(HttpResponse::Created().json(record))
}

/// Clock out an attendance at an explicit time
#[utoipa::path(
    post,
    path = "/api/attendance/clock-out-many",
    responses(
        (status = 200, description = "Clocked out", body = Object),
        (status = 400, description = "Unknown attendance id or invalid date_time", body = Object),
        (status = 409, description = "Already clocked out", body = Object)
    ),
    tag = "Attendance"
)]
pub async fn clock_out_many(
    ctx: TenantContext,
    state: web::Data<AppState>,
    payload: web::Json<ClockOutManyRequest>,
) -> Result<HttpResponse, ServiceError> {
    let record = with_service!(
        AttendanceService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.clock_out_many(payload.into_inner())
    )?;
    Ok(HttpResponse::Ok().json(record))
}

/// Clock out, stamped with the current time in `business_timezone`
#[utoipa::path(
    post,
    path = "/api/attendance/{id}/clock-out",
    responses(
        (status = 200, description = "Clocked out", body = Object),
        (status = 404, description = "Attendance not found", body = Object),
        (status = 409, description = "Already clocked out", body = Object, example = json!({
            "code": "S30203", "kind": "AlreadyClockedOut", "message": "attendance `atten1` is already clocked out"
        }))
    ),
    params(("id" = String, Path, description = "Attendance id")),
    tag = "Attendance"
)]
pub async fn clock_out(
    ctx: TenantContext,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<ClockEventRequest>,
) -> Result<HttpResponse, ServiceError> {
    let id = path.into_inner();
    let record = with_service!(
        AttendanceService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.clock_out(&id, payload.into_inner())
    )?;
    Ok(HttpResponse::Ok().json(record))
}

/// List attendance
#[utoipa::path(
    get,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Attendance page", body = Object, example = json!({
            "summary": { "total_size": 1, "filtered_size": 1, "result_size": 1, "skip": 0, "limit": 20 },
            "list": [{
                "attendance_id": "atten4f1c2a9b0d7e6f5a4b3c",
                "staff_id": "stf1",
                "clock_in": { "date_time": "2024-03-01 09:00:02" },
                "user_info": [{ "staff_id": "stf1", "name": "Asha" }]
            }]
        }))
    ),
    params(
        ("filter" = Option<String>, Query, description = "JSON equality filter"),
        ("sort" = Option<String>, Query, description = "JSON sort, e.g. {\"clock_in.date_time\":-1}"),
        ("skip" = Option<i64>, Query, description = "Records to skip"),
        ("limit" = Option<i64>, Query, description = "0 for all")
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    ctx: TenantContext,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let page = with_service!(
        AttendanceService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.list(&query)
    )?;
    Ok(HttpResponse::Ok().json(page))
}

pub async fn get_attendance(
    ctx: TenantContext,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let record = with_service!(
        AttendanceService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.get(&path)
    )?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn update_attendance(
    ctx: TenantContext,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<Document>,
) -> Result<HttpResponse, ServiceError> {
    let record = with_service!(
        AttendanceService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.update(&path, payload.into_inner())
    )?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn delete_attendance(
    ctx: TenantContext,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<DeleteQuery>,
) -> Result<HttpResponse, ServiceError> {
    let deleted = with_service!(
        AttendanceService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.delete(&path, query.permanent)
    )?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": deleted })))
}

pub async fn delete_all_attendance(
    ctx: TenantContext,
    state: web::Data<AppState>,
    query: web::Query<DeleteQuery>,
) -> Result<HttpResponse, ServiceError> {
    let deleted = with_service!(
        AttendanceService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.delete_all(query.permanent)
    )?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": deleted })))
}
