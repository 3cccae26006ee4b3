use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Entity Service API",
        version = "1.0.0",
        description = r#"
## HR entity services

Multi-tenant CRUD over staff, attendance, leave and the lookup entities
(departments, designations, shifts, holidays, leave types, ...).

### Tenant context
Every request carries `X-Business-Id`; staff-scoped endpoints (attendance,
leave, staff categories) also take an optional `X-Staff-Id`.

### Lists
List endpoints accept `filter` (JSON equality object, dotted paths allowed),
`sort` (`{"field": 1 | -1}`), `skip` and `limit` (0 for all) and answer
`{ "summary": {...}, "list": [...] }`.

### Deletes
Deletes flag `is_deleted` unless `permanent=true` is passed.

### Errors
`{ "code": "S30201", "kind": "NotFound", "message": "..." }`
"#,
    ),
    paths(
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_in_many,
        crate::api::attendance::clock_out_many,
        crate::api::attendance::clock_out,
        crate::api::attendance::list_attendance,

        crate::api::leave::list_leave,
        crate::api::leave::create_leave,
        crate::api::leave::get_leave,

        crate::api::staff::list_staff,
        crate::api::staff::create_staff,

        crate::api::reports::attendance_summary,
        crate::api::reports::dashboard
    ),
    tags(
        (name = "Attendance", description = "Clock in / clock out and attendance records"),
        (name = "Leave", description = "Leave records"),
        (name = "Staff", description = "Staff records"),
        (name = "Reports", description = "Attendance summary and dashboard counts"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn list_parameters_are_documented() {
        let spec = serde_json::to_value(ApiDoc::openapi()).unwrap();
        for path in ["/api/attendance", "/api/leave", "/api/staff", "/api/reports/attendance-summary"] {
            let params = spec["paths"][path]["get"]["parameters"]
                .as_array()
                .unwrap_or_else(|| panic!("{path} has no parameters"));
            for name in ["filter", "sort", "limit"] {
                let param = params
                    .iter()
                    .find(|p| p["name"] == Value::from(name))
                    .unwrap_or_else(|| panic!("{path} lacks `{name}`"));
                assert_eq!(param["in"], Value::from("query"));
                assert!(param["description"].is_string(), "{path} `{name}` undocumented");
            }
        }
        let skip = spec["paths"]["/api/leave"]["get"]["parameters"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name"] == Value::from("skip"))
            .cloned()
            .unwrap();
        assert_eq!(skip["description"], Value::from("Records to skip"));
    }
}
