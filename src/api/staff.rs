use actix_web::{HttpResponse, web};
use serde_json::json;

use super::context::TenantContext;
use super::{AppState, DeleteQuery, with_service};
use crate::error::ServiceError;
use crate::service::{CreateEntity, EntityService, StaffService};
use crate::store::ListQuery;
use crate::utils::document::Document;

/// List staff with their profile and reporting manager
#[utoipa::path(
    get,
    path = "/api/staff",
    responses(
        (status = 200, description = "Staff page", body = Object, example = json!({
            "summary": { "total_size": 2, "filtered_size": 2, "result_size": 2, "skip": 0, "limit": 0 },
            "list": [{
                "staff_id": "stf1",
                "business_id": "biz1",
                "staff_data": { "reporting_staff_id": "stf0" },
                "staff_info": [{ "staff_id": "stf1", "name": "Asha" }],
                "reporting_staff_info": [{ "staff_id": "stf0", "name": "Ravi" }]
            }]
        }))
    ),
    params(
        ("filter" = Option<String>, Query, description = "JSON equality filter"),
        ("sort" = Option<String>, Query, description = "JSON sort, e.g. {\"staff_id\":1}"),
        ("skip" = Option<i64>, Query, description = "Records to skip"),
        ("limit" = Option<i64>, Query, description = "0 for all")
    ),
    tag = "Staff"
)]
pub async fn list_staff(
    ctx: TenantContext,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let page = with_service!(
        StaffService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.list(&query)
    )?;
    Ok(HttpResponse::Ok().json(page))
}

/// Create staff
#[utoipa::path(
    post,
    path = "/api/staff",
    responses(
        (status = 201, description = "Staff created", body = Object),
        (status = 409, description = "Staff id already exists", body = Object, example = json!({
            "code": "S30202", "kind": "DuplicateId", "message": "Staff id `stf1` is already in use"
        }))
    ),
    tag = "Staff"
)]
pub async fn create_staff(
    ctx: TenantContext,
    state: web::Data<AppState>,
    payload: web::Json<Document>,
) -> Result<HttpResponse, ServiceError> {
    let record = with_service!(
        StaffService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.create(payload.into_inner())
    )?;
    Ok(HttpResponse::Created().json(record))
}

pub async fn get_staff(
    ctx: TenantContext,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let record = with_service!(
        StaffService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.get(&path)
    )?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn update_staff(
    ctx: TenantContext,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<Document>,
) -> Result<HttpResponse, ServiceError> {
    let record = with_service!(
        StaffService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.update(&path, payload.into_inner())
    )?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn delete_staff(
    ctx: TenantContext,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<DeleteQuery>,
) -> Result<HttpResponse, ServiceError> {
    let deleted = with_service!(
        StaffService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.delete(&path, query.permanent)
    )?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": deleted })))
}
