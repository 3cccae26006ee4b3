use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Entity, StaffLinked, fields};
use crate::error::ServiceError;
use crate::utils::datetime::validate_datetime;
use crate::utils::document::{Document, Patch};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leave {
    #[serde(default)]
    pub leave_id: String,
    #[serde(default)]
    pub business_id: String,
    #[serde(default)]
    pub staff_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_to: Option<String>,
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

impl Entity for Leave {
    const NAME: &'static str = "Leave";
    const COLLECTION: &'static str = "leaves";
    const ID_FIELD: &'static str = fields::LEAVE_ID;
    const ID_PREFIX: &'static str = "leav";
    const STAFF_SCOPED: bool = true;

    fn id(&self) -> &str {
        &self.leave_id
    }

    fn assign_keys(&mut self, id: String, business_id: &str, staff_id: Option<&str>) {
        self.leave_id = id;
        self.business_id = business_id.to_string();
        if let Some(staff_id) = staff_id {
            self.staff_id = staff_id.to_string();
        }
    }

    fn validate(&self) -> Result<(), ServiceError> {
        if let Some(from) = &self.leave_from {
            validate_datetime(fields::LEAVE_FROM, from)?;
        }
        if let Some(to) = &self.leave_to {
            validate_datetime(fields::LEAVE_TO, to)?;
        }
        Ok(())
    }

    fn validate_patch(patch: &Patch) -> Result<(), ServiceError> {
        for field in [fields::LEAVE_FROM, fields::LEAVE_TO] {
            match patch.get(field) {
                None | Some(Value::Null) => {}
                Some(Value::String(stamp)) => {
                    validate_datetime(field, stamp)?;
                }
                Some(other) => return Err(ServiceError::invalid_datetime(field, other.to_string())),
            }
        }
        Ok(())
    }
}

impl StaffLinked for Leave {
    fn staff_id(&self) -> &str {
        &self.staff_id
    }

    fn set_user_info(&mut self, info: Option<Vec<Document>>) {
        self.user_info = info;
    }
}
