use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;

use super::context::TenantContext;
use super::{AppState, with_service};
use crate::error::ServiceError;
use crate::service::{DashboardService, ReportsService};
use crate::store::ListQuery;

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    #[serde(default)]
    pub filter: String,
    #[serde(default)]
    pub sort: String,
    #[serde(default)]
    pub skip: i64,
    #[serde(default)]
    pub limit: i64,
    pub group_by: Option<String>,
}

/// Attendance grouped per staff member
#[utoipa::path(
    get,
    path = "/api/reports/attendance-summary",
    responses(
        (status = 200, description = "Attendance groups", body = Object, example = json!({
            "summary": { "total_size": 2, "filtered_size": 1, "result_size": 1, "skip": 0, "limit": 0 },
            "list": [{
                "_id": "stf1",
                "count": 2,
                "group_docs": [{
                    "attendance_id": "atten4f1c2a9b0d7e6f5a4b3c",
                    "staff_id": "stf1",
                    "clock_in": { "date_time": "2024-03-01 09:00:02" },
                    "staff_info": [{ "staff_id": "stf1", "name": "Asha" }]
                }]
            }]
        }))
    ),
    params(
        ("filter" = Option<String>, Query, description = "JSON equality filter"),
        ("sort" = Option<String>, Query, description = "JSON sort applied before grouping"),
        ("skip" = Option<i64>, Query, description = "Groups to skip"),
        ("limit" = Option<i64>, Query, description = "Groups per page, 0 for all"),
        ("group_by" = Option<String>, Query, description = "Defaults to staff_id")
    ),
    tag = "Reports"
)]
pub async fn attendance_summary(
    ctx: TenantContext,
    state: web::Data<AppState>,
    query: web::Query<SummaryQuery>,
) -> Result<HttpResponse, ServiceError> {
    let query = query.into_inner();
    let list_query = ListQuery::new(&query.filter, &query.sort, query.skip, query.limit);
    let report = with_service!(
        ReportsService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.attendance_summary(&list_query, query.group_by.as_deref())
    )?;
    Ok(HttpResponse::Ok().json(report))
}

/// Record counts for the tenant
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Counts", body = Object, example = json!({
            "total_staffs": 12,
            "total_departments": 3,
            "total_designations": 5,
            "total_attendances": 240,
            "total_leaves": 9
        }))
    ),
    tag = "Reports"
)]
pub async fn dashboard(
    ctx: TenantContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServiceError> {
    let data = with_service!(
        DashboardService::new(state.connector.as_ref(), &ctx.props),
        |svc| svc.dashboard_data()
    )?;
    Ok(HttpResponse::Ok().json(data))
}
