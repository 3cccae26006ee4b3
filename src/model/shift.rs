use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Entity, fields};
use crate::error::ServiceError;
use crate::utils::datetime::validate_time;
use crate::utils::document::{Document, Patch};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    #[serde(default)]
    pub shift_id: String,
    #[serde(default)]
    pub business_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_to: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub fields: Document,
}

impl Entity for Shift {
    const NAME: &'static str = "Shift";
    const COLLECTION: &'static str = "shifts";
    const ID_FIELD: &'static str = "shift_id";
    const ID_PREFIX: &'static str = "shift";

    fn id(&self) -> &str {
        &self.shift_id
    }

    fn assign_keys(&mut self, id: String, business_id: &str, _staff_id: Option<&str>) {
        self.shift_id = id;
        self.business_id = business_id.to_string();
    }

    fn validate(&self) -> Result<(), ServiceError> {
        if let Some(from) = &self.shift_from {
            validate_time(fields::SHIFT_FROM, from)?;
        }
        if let Some(to) = &self.shift_to {
            validate_time(fields::SHIFT_TO, to)?;
        }
        Ok(())
    }

    fn validate_patch(patch: &Patch) -> Result<(), ServiceError> {
        for field in [fields::SHIFT_FROM, fields::SHIFT_TO] {
            match patch.get(field) {
                None | Some(Value::Null) => {}
                Some(Value::String(time)) => {
                    validate_time(field, time)?;
                }
                Some(other) => {
                    return Err(ServiceError::InvalidTime {
                        field: field.to_string(),
                        value: other.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
