//! One generic set of handlers, instantiated per lookup entity in `routes`.

use actix_web::{HttpResponse, web};
use serde_json::json;

use super::context::TenantContext;
use super::{AppState, DeleteQuery, with_service};
use crate::error::ServiceError;
use crate::model::{CodedEntity, Entity, StaffCategory};
use crate::service::{CreateEntity, DeleteAll, EntityService, ReferenceService};
use crate::store::ListQuery;
use crate::utils::document::Document;

pub async fn list<E: Entity>(
    ctx: TenantContext,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let page = with_service!(
        ReferenceService::<E>::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.list(&query)
    )?;
    Ok(HttpResponse::Ok().json(page))
}

pub async fn create<E: Entity>(
    ctx: TenantContext,
    state: web::Data<AppState>,
    payload: web::Json<Document>,
) -> Result<HttpResponse, ServiceError> {
    let record = with_service!(
        ReferenceService::<E>::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.create(payload.into_inner())
    )?;
    Ok(HttpResponse::Created().json(record))
}

pub async fn get<E: Entity>(
    ctx: TenantContext,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let record = with_service!(
        ReferenceService::<E>::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.get(&path)
    )?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn get_by_code<E: CodedEntity>(
    ctx: TenantContext,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let record = with_service!(
        ReferenceService::<E>::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.get_by_code(&path)
    )?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn update<E: Entity>(
    ctx: TenantContext,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<Document>,
) -> Result<HttpResponse, ServiceError> {
    let record = with_service!(
        ReferenceService::<E>::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.update(&path, payload.into_inner())
    )?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn delete<E: Entity>(
    ctx: TenantContext,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<DeleteQuery>,
) -> Result<HttpResponse, ServiceError> {
    let deleted = with_service!(
        ReferenceService::<E>::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.delete(&path, query.permanent)
    )?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": deleted })))
}

pub async fn delete_all_staff_categories(
    ctx: TenantContext,
    state: web::Data<AppState>,
    query: web::Query<DeleteQuery>,
) -> Result<HttpResponse, ServiceError> {
    let deleted = with_service!(
        ReferenceService::<StaffCategory>::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.delete_all(query.permanent)
    )?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": deleted })))
}

/// `GET, POST ""`: list and create.
pub fn collection_resource<E: Entity>() -> actix_web::Resource {
    web::resource("")
        .route(web::get().to(list::<E>))
        .route(web::post().to(create::<E>))
}

/// `GET, PUT, DELETE /{id}`.
pub fn item_resource<E: Entity>() -> actix_web::Resource {
    web::resource("/{id}")
        .route(web::get().to(get::<E>))
        .route(web::put().to(update::<E>))
        .route(web::delete().to(delete::<E>))
}

pub fn scope<E: Entity>(path: &str) -> actix_web::Scope {
    web::scope(path)
        .service(collection_resource::<E>())
        .service(item_resource::<E>())
}

/// [`scope`] plus `GET /code/{code}`.
pub fn coded_scope<E: CodedEntity>(path: &str) -> actix_web::Scope {
    scope::<E>(path).service(web::resource("/code/{code}").route(web::get().to(get_by_code::<E>)))
}

/// Staff categories also support `DELETE ""` for the whole (tenant, staff) scope.
pub fn staff_category_scope(path: &str) -> actix_web::Scope {
    web::scope(path)
        .service(
            collection_resource::<StaffCategory>()
                .route(web::delete().to(delete_all_staff_categories)),
        )
        .service(item_resource::<StaffCategory>())
}
