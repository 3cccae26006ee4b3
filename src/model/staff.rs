use serde::{Deserialize, Serialize};

use super::{Entity, fields};
use crate::utils::document::Document;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    #[serde(default)]
    pub staff_id: String,
    #[serde(default)]
    pub business_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_data: Option<Document>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_info: Option<Vec<Document>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_staff_info: Option<Vec<Document>>,
    #[serde(flatten)]
    pub fields: Document,
}

impl Staff {
    /// `staff_data.reporting_staff_id`, when set.
    pub fn reporting_staff_id(&self) -> Option<&str> {
        self.staff_data
            .as_ref()?
            .get(fields::REPORTING_STAFF_ID)?
            .as_str()
            .filter(|id| !id.is_empty())
    }
}

impl Entity for Staff {
    const NAME: &'static str = "Staff";
    const COLLECTION: &'static str = "staff";
    const ID_FIELD: &'static str = fields::STAFF_ID;
    const ID_PREFIX: &'static str = "stf";

    fn id(&self) -> &str {
        &self.staff_id
    }

    fn assign_keys(&mut self, id: String, business_id: &str, _staff_id: Option<&str>) {
        self.staff_id = id;
        self.business_id = business_id.to_string();
    }
}
