use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::error::ServiceError;
use crate::model::fields;

/// A stored document: a JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// Typed accessors over a [`Document`].
///
/// Missing fields and wrong JSON types are reported as
/// [`ServiceError::FieldMissing`] / [`ServiceError::TypeMismatch`].
pub trait DocumentExt {
    fn str_field(&self, key: &str) -> Result<&str, ServiceError>;
    fn opt_str_field(&self, key: &str) -> Result<Option<&str>, ServiceError>;
    /// Resolve a dotted path such as `clock_in.date_time`.
    fn path(&self, dotted: &str) -> Option<&Value>;
}

impl DocumentExt for Document {
    fn str_field(&self, key: &str) -> Result<&str, ServiceError> {
        self.opt_str_field(key)?
            .ok_or_else(|| ServiceError::FieldMissing(key.to_string()))
    }

    fn opt_str_field(&self, key: &str) -> Result<Option<&str>, ServiceError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(ServiceError::TypeMismatch {
                field: key.to_string(),
                expected: "a string",
            }),
        }
    }

    fn path(&self, dotted: &str) -> Option<&Value> {
        let mut parts = dotted.split('.');
        let mut current = self.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Document, ServiceError> {
    match serde_json::to_value(value)? {
        Value::Object(doc) => Ok(doc),
        _ => Err(ServiceError::TypeMismatch {
            field: "record".to_string(),
            expected: "an object",
        }),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, ServiceError> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

/// Like [`from_document`] for caller input: shape errors are the caller's fault.
pub fn from_payload<T: DeserializeOwned>(doc: Document) -> Result<T, ServiceError> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| ServiceError::InvalidPayload(e.to_string()))
}

/// Field changes for an update.
///
/// A patch can only be built by stripping a caller document of the entity's
/// key fields, so identifiers and creation stamps never reach the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch(Document);

impl Patch {
    pub fn new(mut doc: Document, key_fields: &[&str]) -> Self {
        for key in key_fields {
            doc.remove(*key);
        }
        Self(doc)
    }

    pub fn soft_delete() -> Self {
        let mut doc = Document::new();
        doc.insert(fields::IS_DELETED.to_string(), Value::Bool(true));
        Self(doc)
    }

    /// Whole-record write back, used when a service rewrites a document it just read.
    pub(crate) fn replace_with(doc: Document) -> Self {
        Self(doc)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    /// Copy the patch fields onto `doc`.
    pub fn apply_to(&self, doc: &mut Document) {
        for (key, value) in &self.0 {
            doc.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn typed_accessors_report_missing_and_mismatch() {
        let d = doc(json!({ "name": "ops", "count": 3 }));
        assert_eq!(d.str_field("name").unwrap(), "ops");
        assert!(matches!(d.str_field("absent"), Err(ServiceError::FieldMissing(f)) if f == "absent"));
        assert!(matches!(
            d.str_field("count"),
            Err(ServiceError::TypeMismatch { expected: "a string", .. })
        ));
        assert_eq!(d.opt_str_field("absent").unwrap(), None);
    }

    #[test]
    fn dotted_path_walks_nested_objects() {
        let d = doc(json!({ "clock_in": { "date_time": "2024-03-01 09:00:00" } }));
        assert_eq!(d.path("clock_in.date_time"), Some(&json!("2024-03-01 09:00:00")));
        assert_eq!(d.path("clock_in.missing"), None);
        assert_eq!(d.path("clock_out.date_time"), None);
    }

    #[test]
    fn patch_drops_key_fields() {
        let patch = Patch::new(
            doc(json!({ "department_id": "other", "business_id": "b2", "name": "x" })),
            &["department_id", "business_id"],
        );
        assert_eq!(patch.as_document(), &doc(json!({ "name": "x" })));
        assert_eq!(Patch::soft_delete().get("is_deleted"), Some(&json!(true)));
    }

    #[test]
    fn patch_overwrites_only_its_fields() {
        let mut target = doc(json!({ "department_id": "dept1", "name": "old", "rank": 2 }));
        let patch = Patch::new(doc(json!({ "department_id": "x", "name": "new" })), &["department_id"]);
        patch.apply_to(&mut target);
        assert_eq!(target, doc(json!({ "department_id": "dept1", "name": "new", "rank": 2 })));
    }
}
