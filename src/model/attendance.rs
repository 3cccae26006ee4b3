use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Entity, StaffLinked, fields};
use crate::error::ServiceError;
use crate::utils::datetime::validate_datetime;
use crate::utils::document::{Document, Patch};

/// A clock-in or clock-out: a free-form payload plus the moment it happened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClockEvent {
    pub date_time: String,
    #[serde(flatten)]
    pub fields: Document,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    #[serde(default)]
    pub attendance_id: String,
    #[serde(default)]
    pub business_id: String,
    #[serde(default)]
    pub staff_id: String,
    pub clock_in: ClockEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_out: Option<ClockEvent>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<Vec<Document>>,
    #[serde(flatten)]
    pub fields: Document,
}

impl Attendance {
    pub fn is_clocked_out(&self) -> bool {
        self.clock_out.is_some()
    }
}

/// A clock sub-object sent in an update must still carry a valid `date_time`.
fn validate_clock_value(field: &str, value: &Value) -> Result<(), ServiceError> {
    let event = value.as_object().ok_or_else(|| ServiceError::TypeMismatch {
        field: field.to_string(),
        expected: "an object",
    })?;
    let key = format!("{field}.{}", fields::DATE_TIME);
    match event.get(fields::DATE_TIME) {
        Some(Value::String(stamp)) => validate_datetime(&key, stamp).map(|_| ()),
        Some(_) => Err(ServiceError::TypeMismatch { field: key, expected: "a string" }),
        None => Err(ServiceError::FieldMissing(key)),
    }
}

impl Entity for Attendance {
    const NAME: &'static str = "Attendance";
    const COLLECTION: &'static str = "attendance";
    const ID_FIELD: &'static str = fields::ATTENDANCE_ID;
    const ID_PREFIX: &'static str = "atten";
    const STAFF_SCOPED: bool = true;

    fn id(&self) -> &str {
        &self.attendance_id
    }

    fn assign_keys(&mut self, id: String, business_id: &str, staff_id: Option<&str>) {
        self.attendance_id = id;
        self.business_id = business_id.to_string();
        if let Some(staff_id) = staff_id {
            self.staff_id = staff_id.to_string();
        }
    }

    fn validate(&self) -> Result<(), ServiceError> {
        validate_datetime("clock_in.date_time", &self.clock_in.date_time)?;
        if let Some(out) = &self.clock_out {
            validate_datetime("clock_out.date_time", &out.date_time)?;
        }
        Ok(())
    }

    fn validate_patch(patch: &Patch) -> Result<(), ServiceError> {
        for field in [fields::CLOCK_IN, fields::CLOCK_OUT] {
            if let Some(value) = patch.get(field) {
                validate_clock_value(field, value)?;
            }
        }
        Ok(())
    }

    fn key_fields() -> Vec<&'static str> {
        vec![
            fields::ATTENDANCE_ID,
            fields::BUSINESS_ID,
            fields::STAFF_ID,
            fields::CREATED_AT,
            fields::DATE_TIME,
        ]
    }
}

impl StaffLinked for Attendance {
    fn staff_id(&self) -> &str {
        &self.staff_id
    }

    fn set_user_info(&mut self, info: Option<Vec<Document>>) {
        self.user_info = info;
    }
}

/* ===============================
 * Clock event payloads
 * =============================== */

/// Clock in / out for the bound staff, stamped with the time in the caller's zone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClockEventRequest {
    #[serde(default)]
    pub business_timezone: Option<String>,
    #[serde(flatten)]
    pub fields: Document,
}

/// Clock in on behalf of `staff_id` at an explicit time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClockInManyRequest {
    #[serde(default)]
    pub staff_id: String,
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(flatten)]
    pub fields: Document,
}

/// Clock out an existing attendance at an explicit time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClockOutManyRequest {
    #[serde(default)]
    pub attendance_id: String,
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(flatten)]
    pub fields: Document,
}
