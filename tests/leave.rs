mod common;

use common::{BUSINESS, MANAGER, STAFF, doc, setup, staff, tenant};
use hr_service::ServiceError;
use hr_service::service::{CreateEntity, DeleteAll, EntityService, LeaveService};
use hr_service::store::ListQuery;
use serde_json::json;

#[tokio::test]
async fn create_forces_tenant_and_staff() -> anyhow::Result<()> {
    let connector = setup();
    let service = LeaveService::new(&*connector, &staff(STAFF)).await?;

    let leave = service
        .create(doc(json!({
            "business_id": "biz-other",
            "staff_id": MANAGER,
            "leave_from": "2024-05-01 09:00:00",
            "leave_to": "2024-05-03 18:00:00",
            "reason": "travel"
        })))
        .await?;
    assert!(leave.leave_id.starts_with("leav"));
    assert_eq!(leave.business_id, BUSINESS);
    assert_eq!(leave.staff_id, STAFF);

    let fetched = service.get(&leave.leave_id).await?;
    assert_eq!(fetched.leave_from.as_deref(), Some("2024-05-01 09:00:00"));
    assert_eq!(fetched.leave_to.as_deref(), Some("2024-05-03 18:00:00"));
    assert_eq!(fetched.fields["reason"], json!("travel"));
    assert_eq!(fetched.user_info.as_ref().map(Vec::len), Some(1));

    service.end_service().await;
    Ok(())
}

#[tokio::test]
async fn duplicate_id_leaves_existing_record_untouched() -> anyhow::Result<()> {
    let connector = setup();
    let service = LeaveService::new(&*connector, &staff(STAFF)).await?;

    service
        .create(doc(json!({ "leave_id": "leav-annual", "reason": "first" })))
        .await?;
    let again = service
        .create(doc(json!({ "leave_id": "LEAV-ANNUAL", "reason": "second" })))
        .await;
    assert!(matches!(again, Err(ServiceError::DuplicateId { id, .. }) if id == "leav-annual"));

    let stored = service.get("leav-annual").await?;
    assert_eq!(stored.fields["reason"], json!("first"));
    assert_eq!(connector.region.len("leaves"), 1);

    service.end_service().await;
    Ok(())
}

#[tokio::test]
async fn invalid_dates_write_nothing() -> anyhow::Result<()> {
    let connector = setup();
    let service = LeaveService::new(&*connector, &staff(STAFF)).await?;

    let bad_from = service
        .create(doc(json!({ "leave_from": "01/05/2024", "leave_to": "2024-05-03 18:00:00" })))
        .await;
    assert!(matches!(
        bad_from,
        Err(ServiceError::InvalidDateTime { field, .. }) if field == "leave_from"
    ));
    assert_eq!(connector.region.len("leaves"), 0);

    let created = service
        .create(doc(json!({ "leave_from": "2024-05-01 09:00:00" })))
        .await?;
    let bad_patch = service
        .update(&created.leave_id, doc(json!({ "leave_to": "tomorrow" })))
        .await;
    assert!(matches!(bad_patch, Err(ServiceError::InvalidDateTime { .. })));
    assert!(service.get(&created.leave_id).await?.leave_to.is_none());

    service.end_service().await;
    Ok(())
}

#[tokio::test]
async fn create_needs_a_bound_staff() -> anyhow::Result<()> {
    let connector = setup();
    let service = LeaveService::new(&*connector, &tenant()).await?;
    let result = service.create(doc(json!({ "reason": "sick" }))).await;
    assert!(matches!(result, Err(ServiceError::StaffIdRequired)));
    assert_eq!(connector.region.len("leaves"), 0);
    service.end_service().await;
    Ok(())
}

#[tokio::test]
async fn malformed_payload_is_rejected() -> anyhow::Result<()> {
    let connector = setup();
    let service = LeaveService::new(&*connector, &staff(STAFF)).await?;
    let result = service.create(doc(json!({ "leave_from": 20240501 }))).await;
    assert!(matches!(result, Err(ServiceError::InvalidPayload(_))));
    service.end_service().await;
    Ok(())
}

#[tokio::test]
async fn staff_binding_narrows_reads() -> anyhow::Result<()> {
    let connector = setup();
    for staff_id in [STAFF, MANAGER] {
        let service = LeaveService::new(&*connector, &staff(staff_id)).await?;
        service.create(doc(json!({ "reason": staff_id }))).await?;
        service.end_service().await;
    }

    let own = LeaveService::new(&*connector, &staff(STAFF)).await?;
    let page = own.list(&ListQuery::default()).await?;
    assert_eq!(page.summary.total_size, 1);
    assert_eq!(page.list[0].staff_id, STAFF);
    own.end_service().await;

    let admin = LeaveService::new(&*connector, &tenant()).await?;
    let filtered = admin
        .list(&ListQuery::new(&format!(r#"{{"staff_id":"{MANAGER}"}}"#), "", 0, 0))
        .await?;
    assert_eq!(filtered.summary.total_size, 2);
    assert_eq!(filtered.summary.filtered_size, 1);
    assert!(filtered.list[0].user_info.is_none());

    assert_eq!(admin.delete_all(false).await?, 2);
    assert_eq!(admin.list(&ListQuery::default()).await?.summary.total_size, 0);
    assert_eq!(connector.region.len("leaves"), 2);
    admin.end_service().await;
    Ok(())
}
