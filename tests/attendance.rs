mod common;

use common::{BUSINESS, MANAGER, STAFF, doc, setup, staff, tenant};
use hr_service::ServiceError;
use hr_service::config::ServiceProps;
use hr_service::model::attendance::{ClockEventRequest, ClockInManyRequest, ClockOutManyRequest};
use hr_service::service::{AttendanceService, DeleteAll, EntityService};
use hr_service::store::ListQuery;
use serde_json::{Value, json};

fn clock_request(value: Value) -> ClockEventRequest {
    serde_json::from_value(value).unwrap()
}

// -----------------------------------------------------------------------
// Clock events
// -----------------------------------------------------------------------

#[tokio::test]
async fn clock_in_then_clock_out_updates_one_document() -> anyhow::Result<()> {
    let connector = setup();
    let service = AttendanceService::new(&*connector, &staff(STAFF)).await?;

    let created = service
        .clock_in(clock_request(json!({
            "business_timezone": "Asia/Kolkata",
            "device": "web",
            "date_time": "1999-01-01 00:00:00"
        })))
        .await?;
    assert!(created.attendance_id.starts_with("atten"));
    assert_eq!(created.business_id, BUSINESS);
    assert_eq!(created.staff_id, STAFF);
    assert_eq!(created.clock_in.fields["device"], json!("web"));
    assert!(!created.clock_in.fields.contains_key("business_timezone"));
    assert_ne!(created.clock_in.date_time, "1999-01-01 00:00:00");

    let out = service
        .clock_out(
            &created.attendance_id,
            clock_request(json!({ "business_timezone": "Europe/London", "note": "done" })),
        )
        .await?;
    assert_eq!(out.attendance_id, created.attendance_id);
    assert!(out.is_clocked_out());

    assert_eq!(connector.region.len("attendance"), 1);
    let raw = connector
        .region
        .raw("attendance", "attendance_id", &created.attendance_id)
        .unwrap();
    assert!(raw.contains_key("clock_in"));
    assert_eq!(raw["clock_out"]["note"], json!("done"));

    service.end_service().await;
    Ok(())
}

#[tokio::test]
async fn clock_in_without_timezone_writes_nothing() -> anyhow::Result<()> {
    let connector = setup();
    let service = AttendanceService::new(&*connector, &staff(STAFF)).await?;

    let missing = service.clock_in(clock_request(json!({ "device": "web" }))).await;
    assert!(matches!(missing, Err(ServiceError::NoTimezone)));

    let invalid = service
        .clock_in(clock_request(json!({ "business_timezone": "Mars/Olympus" })))
        .await;
    assert!(matches!(invalid, Err(ServiceError::InvalidTimezone(_))));

    assert_eq!(connector.region.len("attendance"), 0);
    service.end_service().await;
    Ok(())
}

#[tokio::test]
async fn clock_in_needs_a_bound_staff() -> anyhow::Result<()> {
    let connector = setup();
    let service = AttendanceService::new(&*connector, &tenant()).await?;
    let result = service
        .clock_in(clock_request(json!({ "business_timezone": "UTC" })))
        .await;
    assert!(matches!(result, Err(ServiceError::StaffIdRequired)));
    service.end_service().await;
    Ok(())
}

#[tokio::test]
async fn second_clock_out_is_rejected() -> anyhow::Result<()> {
    let connector = setup();
    let service = AttendanceService::new(&*connector, &staff(STAFF)).await?;
    let created = service
        .clock_in(clock_request(json!({ "business_timezone": "UTC" })))
        .await?;
    let tz = || clock_request(json!({ "business_timezone": "UTC" }));

    service.clock_out(&created.attendance_id, tz()).await?;
    let again = service.clock_out(&created.attendance_id, tz()).await;
    assert!(matches!(again, Err(ServiceError::AlreadyClockedOut(id)) if id == created.attendance_id));

    let missing = service.clock_out("atten-missing", tz()).await;
    assert!(matches!(missing, Err(ServiceError::NotFound { .. })));
    service.end_service().await;
    Ok(())
}

#[tokio::test]
async fn clock_many_uses_explicit_times() -> anyhow::Result<()> {
    let connector = setup();
    let service = AttendanceService::new(&*connector, &tenant()).await?;

    let created = service
        .clock_in_many(serde_json::from_value::<ClockInManyRequest>(json!({
            "staff_id": MANAGER,
            "date_time": "2024-03-01 09:00:00",
            "device": "kiosk"
        }))?)
        .await?;
    assert_eq!(created.staff_id, MANAGER);
    assert_eq!(created.clock_in.date_time, "2024-03-01 09:00:00");
    assert!(!created.clock_in.fields.contains_key("staff_id"));

    let out = service
        .clock_out_many(serde_json::from_value::<ClockOutManyRequest>(json!({
            "attendance_id": created.attendance_id,
            "date_time": "2024-03-01 18:00:00"
        }))?)
        .await?;
    assert_eq!(out.clock_out.unwrap().date_time, "2024-03-01 18:00:00");

    service.end_service().await;
    Ok(())
}

#[tokio::test]
async fn clock_many_validates_input() -> anyhow::Result<()> {
    let connector = setup();
    let service = AttendanceService::new(&*connector, &tenant()).await?;

    let unknown_staff = service
        .clock_in_many(serde_json::from_value(json!({
            "staff_id": "stf-ghost",
            "date_time": "2024-03-01 09:00:00"
        }))?)
        .await;
    assert!(matches!(unknown_staff, Err(ServiceError::InvalidStaffId(_))));

    let no_time = service
        .clock_in_many(serde_json::from_value(json!({ "staff_id": STAFF }))?)
        .await;
    assert!(matches!(no_time, Err(ServiceError::InvalidDateTime { .. })));

    let unknown_attendance = service
        .clock_out_many(serde_json::from_value(json!({
            "attendance_id": "atten-ghost",
            "date_time": "2024-03-01 18:00:00"
        }))?)
        .await;
    assert!(matches!(unknown_attendance, Err(ServiceError::InvalidAttendanceId(_))));

    assert_eq!(connector.region.len("attendance"), 0);
    service.end_service().await;
    Ok(())
}

// -----------------------------------------------------------------------
// Reads, updates and deletes
// -----------------------------------------------------------------------

#[tokio::test]
async fn list_attaches_user_info_and_tolerates_missing_profiles() -> anyhow::Result<()> {
    let connector = setup();
    let service = AttendanceService::new(&*connector, &tenant()).await?;
    for staff_id in [STAFF, MANAGER] {
        service
            .clock_in_many(serde_json::from_value(json!({
                "staff_id": staff_id,
                "date_time": "2024-03-01 09:00:00"
            }))?)
            .await?;
    }

    let page = service
        .list(&ListQuery::new("", r#"{"staff_id":1}"#, 0, 0))
        .await?;
    assert_eq!(page.summary.total_size, 2);
    assert_eq!(page.list.len(), 2);

    let with_profile = &page.list[0];
    assert_eq!(with_profile.staff_id, STAFF);
    let info = with_profile.user_info.as_ref().unwrap();
    assert_eq!(info.len(), 1);
    assert_eq!(info[0]["name"], json!("Asha"));
    assert!(!info[0].contains_key("app_user_id"));
    assert!(!info[0].contains_key("created_at"));

    assert_eq!(page.list[1].staff_id, MANAGER);
    assert!(page.list[1].user_info.is_none());

    service.end_service().await;
    Ok(())
}

#[tokio::test]
async fn update_strips_identifiers_and_validates_clock_objects() -> anyhow::Result<()> {
    let connector = setup();
    let service = AttendanceService::new(&*connector, &staff(STAFF)).await?;
    let created = service
        .clock_in(clock_request(json!({ "business_timezone": "UTC" })))
        .await?;

    let updated = service
        .update(
            &created.attendance_id,
            doc(json!({
                "attendance_id": "atten-other",
                "business_id": "biz-other",
                "staff_id": "stf-other",
                "date_time": "2000-01-01 00:00:00",
                "remarks": "late"
            })),
        )
        .await?;
    assert_eq!(updated.attendance_id, created.attendance_id);
    assert_eq!(updated.business_id, BUSINESS);
    assert_eq!(updated.staff_id, STAFF);
    assert_eq!(updated.fields["remarks"], json!("late"));
    assert!(!updated.fields.contains_key("date_time"));

    let bad = service
        .update(&created.attendance_id, doc(json!({ "clock_out": { "note": "x" } })))
        .await;
    assert!(matches!(bad, Err(ServiceError::FieldMissing(_))));

    let missing = service.update("atten-missing", doc(json!({ "remarks": "x" }))).await;
    assert!(matches!(missing, Err(ServiceError::NotFound { .. })));

    service.end_service().await;
    Ok(())
}

#[tokio::test]
async fn soft_and_permanent_delete() -> anyhow::Result<()> {
    let connector = setup();
    let service = AttendanceService::new(&*connector, &staff(STAFF)).await?;
    let tz = || clock_request(json!({ "business_timezone": "UTC" }));
    let first = service.clock_in(tz()).await?;
    let second = service.clock_in(tz()).await?;

    assert_eq!(service.delete(&first.attendance_id, false).await?, 1);
    let raw = connector
        .region
        .raw("attendance", "attendance_id", &first.attendance_id)
        .unwrap();
    assert_eq!(raw["is_deleted"], json!(true));
    assert!(matches!(
        service.get(&first.attendance_id).await,
        Err(ServiceError::NotFound { .. })
    ));

    assert_eq!(service.delete(&second.attendance_id, true).await?, 1);
    assert!(connector.region.raw("attendance", "attendance_id", &second.attendance_id).is_none());

    assert!(matches!(
        service.delete("atten-missing", false).await,
        Err(ServiceError::NotFound { .. })
    ));
    assert!(matches!(
        service.delete("atten-missing", true).await,
        Err(ServiceError::NotFound { .. })
    ));

    service.end_service().await;
    Ok(())
}

#[tokio::test]
async fn delete_all_is_scoped_to_the_bound_staff() -> anyhow::Result<()> {
    let connector = setup();
    let admin = AttendanceService::new(&*connector, &tenant()).await?;
    for staff_id in [STAFF, STAFF, MANAGER] {
        admin
            .clock_in_many(serde_json::from_value(json!({
                "staff_id": staff_id,
                "date_time": "2024-03-01 09:00:00"
            }))?)
            .await?;
    }
    admin.end_service().await;

    let own = AttendanceService::new(&*connector, &staff(STAFF)).await?;
    assert_eq!(own.delete_all(false).await?, 2);
    assert_eq!(own.list(&ListQuery::default()).await?.summary.total_size, 0);
    own.end_service().await;

    let admin = AttendanceService::new(&*connector, &tenant()).await?;
    assert_eq!(admin.list(&ListQuery::default()).await?.summary.total_size, 1);
    assert_eq!(admin.delete_all(true).await?, 3);
    assert_eq!(connector.region.len("attendance"), 0);
    admin.end_service().await;
    Ok(())
}

#[tokio::test]
async fn rollback_discards_writes() -> anyhow::Result<()> {
    let connector = setup();
    let service = AttendanceService::new(&*connector, &staff(STAFF)).await?;
    service.begin_transaction().await?;
    service
        .clock_in(clock_request(json!({ "business_timezone": "UTC" })))
        .await?;
    service.rollback_transaction().await?;
    assert_eq!(connector.region.len("attendance"), 0);
    service.end_service().await;
    Ok(())
}

// -----------------------------------------------------------------------
// Construction and teardown
// -----------------------------------------------------------------------

#[tokio::test]
async fn unknown_business_or_staff_leaves_no_open_handles() {
    let connector = setup();

    let no_business = AttendanceService::new(&*connector, &ServiceProps::new("biz-ghost", None)).await;
    assert!(matches!(no_business, Err(ServiceError::TenantNotFound(_))));
    assert_eq!(connector.open_handles(), 0);

    let no_staff = AttendanceService::new(&*connector, &staff("stf-ghost")).await;
    assert!(matches!(no_staff, Err(ServiceError::StaffNotFound(_))));
    assert_eq!(connector.open_handles(), 0);

    let no_props = AttendanceService::new(&*connector, &ServiceProps::default()).await;
    assert!(matches!(no_props, Err(ServiceError::Config(_))));
    assert_eq!(connector.open_handles(), 0);
}

#[tokio::test]
async fn region_failure_closes_the_platform_handle() {
    let connector = setup();
    connector.set_region_available(false);
    let result = AttendanceService::new(&*connector, &staff(STAFF)).await;
    assert!(matches!(result, Err(ServiceError::Storage(_))));
    assert_eq!(connector.open_handles(), 0);
}

#[tokio::test]
async fn only_end_service_releases_handles() -> anyhow::Result<()> {
    let connector = setup();
    drop(AttendanceService::new(&*connector, &staff(STAFF)).await?);
    assert_eq!(connector.open_handles(), 2);
    Ok(())
}

#[tokio::test]
async fn end_service_is_idempotent() -> anyhow::Result<()> {
    let connector = setup();
    let service = AttendanceService::new(&*connector, &staff(STAFF)).await?;
    assert_eq!(connector.open_handles(), 2);

    service.end_service().await;
    service.end_service().await;
    assert_eq!(connector.open_handles(), 0);

    let after = service.list(&ListQuery::default()).await;
    assert!(matches!(after, Err(ServiceError::ConnectionClosed)));
    Ok(())
}
