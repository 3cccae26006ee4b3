//! Shared fixtures: an in-memory connector seeded with one business, two staff
//! members and an app user for the first of them.

#![allow(dead_code)]

use std::sync::Arc;

use hr_service::config::ServiceProps;
use hr_service::store::memory::MemoryConnector;
use hr_service::utils::document::Document;
use serde_json::{Value, json};

pub const BUSINESS: &str = "biz1";
/// Has an app user profile and reports to [`MANAGER`].
pub const STAFF: &str = "stf1";
/// Has no app user profile, so enrichment for it fails.
pub const MANAGER: &str = "stf2";

pub fn doc(value: Value) -> Document {
    value.as_object().cloned().expect("fixture must be an object")
}

pub fn setup() -> Arc<MemoryConnector> {
    let connector = MemoryConnector::new();

    connector
        .platform
        .insert_raw("businesses", doc(json!({ "business_id": BUSINESS, "name": "Acme" })))
        .unwrap();
    connector
        .platform
        .insert_raw(
            "app_users",
            doc(json!({
                "app_user_id": "usr1",
                "staff_id": STAFF,
                "name": "Asha",
                "email": "asha@acme.test",
                "created_at": "2024-01-01T00:00:00.000Z",
                "updated_at": "2024-01-01T00:00:00.000Z"
            })),
        )
        .unwrap();

    connector
        .region
        .insert_raw(
            "staff",
            doc(json!({
                "staff_id": STAFF,
                "business_id": BUSINESS,
                "is_deleted": false,
                "staff_data": { "reporting_staff_id": MANAGER }
            })),
        )
        .unwrap();
    connector
        .region
        .insert_raw(
            "staff",
            doc(json!({ "staff_id": MANAGER, "business_id": BUSINESS, "is_deleted": false })),
        )
        .unwrap();

    connector
}

pub fn tenant() -> ServiceProps {
    ServiceProps::new(BUSINESS, None)
}

pub fn staff(staff_id: &str) -> ServiceProps {
    ServiceProps::new(BUSINESS, Some(staff_id))
}
