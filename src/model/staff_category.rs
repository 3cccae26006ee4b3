use serde::{Deserialize, Serialize};

use super::Entity;
use crate::utils::document::Document;

/// Staff categories are kept per staff member when a staff id is bound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffCategory {
    #[serde(default)]
    pub staff_category_id: String,
    #[serde(default)]
    pub business_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub fields: Document,
}

impl Entity for StaffCategory {
    const NAME: &'static str = "StaffCategory";
    const COLLECTION: &'static str = "staff_categories";
    const ID_FIELD: &'static str = "staff_category_id";
    const ID_PREFIX: &'static str = "stfcat";
    const STAFF_SCOPED: bool = true;

    fn id(&self) -> &str {
        &self.staff_category_id
    }

    fn assign_keys(&mut self, id: String, business_id: &str, staff_id: Option<&str>) {
        self.staff_category_id = id;
        self.business_id = business_id.to_string();
        if let Some(staff_id) = staff_id {
            self.staff_id = Some(staff_id.to_string());
        }
    }
}
