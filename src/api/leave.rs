use actix_web::{HttpResponse, web};
use serde_json::json;

use super::context::TenantContext;
use super::{AppState, DeleteQuery, with_service};
use crate::error::ServiceError;
use crate::service::{CreateEntity, DeleteAll, EntityService, LeaveService};
use crate::store::ListQuery;
use crate::utils::document::Document;

/// List leave
#[utoipa::path(
    get,
    path = "/api/leave",
    responses(
        (status = 200, description = "Leave page", body = Object, example = json!({
            "summary": { "total_size": 3, "filtered_size": 1, "result_size": 1, "skip": 0, "limit": 10 },
            "list": [{
                "leave_id": "leav0a1b2c3d4e5f60718293",
                "staff_id": "stf1",
                "leave_from": "2024-05-01 09:00:00",
                "leave_to": "2024-05-03 18:00:00",
                "user_info": [{ "staff_id": "stf1", "name": "Asha" }]
            }]
        }))
    ),
    params(
        ("filter" = Option<String>, Query, description = "JSON equality filter"),
        ("sort" = Option<String>, Query, description = "JSON sort, e.g. {\"leave_from\":1}"),
        ("skip" = Option<i64>, Query, description = "Records to skip"),
        ("limit" = Option<i64>, Query, description = "0 for all")
    ),
    tag = "Leave"
)]
pub async fn list_leave(
    ctx: TenantContext,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let page = with_service!(
        LeaveService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.list(&query)
    )?;
    Ok(HttpResponse::Ok().json(page))
}

/// Apply for leave as the staff member bound by `X-Staff-Id`
#[utoipa::path(
    post,
    path = "/api/leave",
    responses(
        (status = 201, description = "Leave created", body = Object),
        (status = 400, description = "Invalid leave_from / leave_to or no staff bound", body = Object, example = json!({
            "code": "S30101",
            "kind": "InvalidDateTime",
            "message": "invalid leave_from: `01/05/2024` is not a valid date time"
        })),
        (status = 409, description = "Leave id already exists", body = Object)
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    ctx: TenantContext,
    state: web::Data<AppState>,
    payload: web::Json<Document>,
) -> Result<HttpResponse, ServiceError> {
    let record = with_service!(
        LeaveService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.create(payload.into_inner())
    )?;
    Ok(HttpResponse::Created().json(record))
}

/// Get one leave
#[utoipa::path(
    get,
    path = "/api/leave/{id}",
    responses(
        (status = 200, description = "Leave", body = Object),
        (status = 404, description = "Leave not found", body = Object, example = json!({
            "code": "S30201", "kind": "NotFound", "message": "Leave `leav1` not found"
        }))
    ),
    params(("id" = String, Path, description = "Leave id")),
    tag = "Leave"
)]
pub async fn get_leave(
    ctx: TenantContext,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let record = with_service!(
        LeaveService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.get(&path)
    )?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn update_leave(
    ctx: TenantContext,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<Document>,
) -> Result<HttpResponse, ServiceError> {
    let record = with_service!(
        LeaveService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.update(&path, payload.into_inner())
    )?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn delete_leave(
    ctx: TenantContext,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<DeleteQuery>,
) -> Result<HttpResponse, ServiceError> {
    let deleted = with_service!(
        LeaveService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.delete(&path, query.permanent)
    )?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": deleted })))
}

pub async fn delete_all_leave(
    ctx: TenantContext,
    state: web::Data<AppState>,
    query: web::Query<DeleteQuery>,
) -> Result<HttpResponse, ServiceError> {
    let deleted = with_service!(
        LeaveService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.delete_all(query.permanent)
    )?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": deleted })))
}
