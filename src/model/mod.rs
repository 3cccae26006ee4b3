pub mod attendance;
pub mod fields;
pub mod leave;
pub mod reference;
pub mod shift;
pub mod staff;
pub mod staff_category;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::ServiceError;
use crate::utils::document::Patch;

pub use attendance::{Attendance, ClockEvent};
pub use leave::Leave;
pub use reference::*;
pub use shift::Shift;
pub use staff::Staff;
pub use staff_category::StaffCategory;

/// A record stored in its own collection of the tenant region database.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Human readable name, used in error messages.
    const NAME: &'static str;
    const COLLECTION: &'static str;
    const ID_FIELD: &'static str;
    /// Prefix of generated ids.
    const ID_PREFIX: &'static str;
    /// Scoped to the bound staff as well as the tenant.
    const STAFF_SCOPED: bool = false;

    fn id(&self) -> &str;

    /// Force the identifying fields before insert.
    fn assign_keys(&mut self, id: String, business_id: &str, staff_id: Option<&str>);

    fn validate(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    fn validate_patch(_patch: &Patch) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Fields that can never be changed by an update.
    fn key_fields() -> Vec<&'static str> {
        let mut keys = vec![Self::ID_FIELD, fields::BUSINESS_ID, fields::CREATED_AT];
        if Self::STAFF_SCOPED {
            keys.push(fields::STAFF_ID);
        }
        keys
    }
}

/// Entities that can also be looked up by a human-assigned code.
pub trait CodedEntity: Entity {
    const CODE_FIELD: &'static str;
}

/// Entities that carry a `staff_id` and get the caller's profile attached on read.
pub trait StaffLinked {
    fn staff_id(&self) -> &str;
    fn set_user_info(&mut self, info: Option<Vec<crate::utils::document::Document>>);
}
