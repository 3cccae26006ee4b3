//! Tenant-scoped lookup records. Apart from the id and tenant they are
//! free-form; every one of them is plain CRUD.

use serde::{Deserialize, Serialize};

use super::{CodedEntity, Entity};
use crate::utils::document::Document;

macro_rules! reference_entity {
    (
        $(#[$meta:meta])*
        $name:ident {
            collection: $collection:literal,
            id: $id:ident,
            prefix: $prefix:literal $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            #[serde(default)]
            pub $id: String,
            #[serde(default)]
            pub business_id: String,
            #[serde(default)]
            pub is_deleted: bool,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub created_at: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub updated_at: Option<String>,
            #[serde(flatten)]
            pub fields: Document,
        }

        impl Entity for $name {
            const NAME: &'static str = stringify!($name);
            const COLLECTION: &'static str = $collection;
            const ID_FIELD: &'static str = stringify!($id);
            const ID_PREFIX: &'static str = $prefix;

            fn id(&self) -> &str {
                &self.$id
            }

            fn assign_keys(&mut self, id: String, business_id: &str, _staff_id: Option<&str>) {
                self.$id = id;
                self.business_id = business_id.to_string();
            }
        }
    };
}

reference_entity! {
    Department { collection: "departments", id: department_id, prefix: "dept" }
}

impl CodedEntity for Department {
    const CODE_FIELD: &'static str = "department_code";
}

reference_entity! {
    Designation { collection: "designations", id: designation_id, prefix: "desig" }
}

reference_entity! {
    Holiday { collection: "holidays", id: holiday_id, prefix: "holi" }
}

reference_entity! {
    LeaveType { collection: "leave_types", id: leave_type_id, prefix: "ltype" }
}

impl CodedEntity for LeaveType {
    const CODE_FIELD: &'static str = "leave_type_code";
}

reference_entity! {
    Client { collection: "clients", id: client_id, prefix: "clnt" }
}

reference_entity! {
    Project { collection: "projects", id: project_id, prefix: "projt" }
}

reference_entity! {
    Position { collection: "positions", id: position_id, prefix: "posi" }
}

reference_entity! {
    PositionType { collection: "position_types", id: position_type_id, prefix: "posityp" }
}

reference_entity! {
    WorkLocation { collection: "work_locations", id: work_location_id, prefix: "wrkloc" }
}

reference_entity! {
    VisaType { collection: "visa_types", id: visa_type_id, prefix: "vity" }
}

reference_entity! {
    StaffType { collection: "staff_types", id: staff_type_id, prefix: "stftyp" }
}

reference_entity! {
    Overtime { collection: "overtimes", id: overtime_id, prefix: "ot" }
}

reference_entity! {
    /// Feedback left by staff about the workplace.
    Feedback { collection: "feedbacks", id: feedback_id, prefix: "fedback" }
}

reference_entity! {
    /// A named bundle of shifts assigned to staff.
    ShiftProfile { collection: "shift_profiles", id: shift_profile_id, prefix: "sftprof" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_metadata() {
        assert_eq!(Department::ID_FIELD, "department_id");
        assert_eq!(Department::NAME, "Department");
        assert_eq!(ShiftProfile::COLLECTION, "shift_profiles");
        assert_eq!(
            WorkLocation::key_fields(),
            vec!["work_location_id", "business_id", "created_at"]
        );
        assert_eq!(LeaveType::CODE_FIELD, "leave_type_code");
    }
}
