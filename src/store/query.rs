//! Filter / sort parsing and the in-process evaluation shared by the backends.

use std::cmp::Ordering;

use serde_json::Value;

use crate::error::ServiceError;
use crate::model::fields;
use crate::store::Scope;
use crate::utils::document::{Document, DocumentExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

pub(crate) fn check_field_name(name: &str) -> Result<(), ServiceError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.ends_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(ServiceError::InvalidFilter(format!("unsupported field name `{name}`")))
    }
}

fn parse_object(raw: &str, what: &str) -> Result<Document, ServiceError> {
    if raw.trim().is_empty() {
        return Ok(Document::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(obj)) => Ok(obj),
        Ok(_) => Err(ServiceError::InvalidFilter(format!("{what} must be a JSON object"))),
        Err(e) => Err(ServiceError::InvalidFilter(format!("{what} is not valid JSON: {e}"))),
    }
}

/// Parse an equality filter such as `{"staff_id":"stf1","clock_in.device":"web"}`.
pub fn parse_filter(raw: &str) -> Result<Document, ServiceError> {
    let filter = parse_object(raw, "filter")?;
    for key in filter.keys() {
        check_field_name(key)?;
    }
    Ok(filter)
}

/// Parse a sort object such as `{"staff_id":1, "clock_in.date_time":-1}`; key order is significant.
pub fn parse_sort(raw: &str) -> Result<Vec<SortKey>, ServiceError> {
    parse_object(raw, "sort")?
        .into_iter()
        .map(|(field, dir)| {
            check_field_name(&field)?;
            match dir.as_i64() {
                Some(1) => Ok(SortKey { field, descending: false }),
                Some(-1) => Ok(SortKey { field, descending: true }),
                _ => Err(ServiceError::InvalidFilter(format!(
                    "sort direction for `{field}` must be 1 or -1"
                ))),
            }
        })
        .collect()
}

pub fn is_deleted(doc: &Document) -> bool {
    matches!(doc.get(fields::IS_DELETED), Some(Value::Bool(true)))
}

pub fn in_scope(doc: &Document, scope: &Scope) -> bool {
    let field_is = |key: &str, expected: &Option<String>| match expected {
        Some(value) => doc.get(key).and_then(Value::as_str) == Some(value.as_str()),
        None => true,
    };
    field_is(fields::BUSINESS_ID, &scope.business_id) && field_is(fields::STAFF_ID, &scope.staff_id)
}

pub fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, expected)| match doc.path(key) {
        Some(actual) => actual == expected,
        None => expected.is_null(),
    })
}

fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

pub fn sort_documents(docs: &mut [Document], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    docs.sort_by(|a, b| {
        keys.iter()
            .map(|key| {
                let ord = compare_values(a.path(&key.field), b.path(&key.field));
                if key.descending { ord.reverse() } else { ord }
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

/// Apply skip / limit; non-positive limit keeps everything after `skip`.
pub fn page<T>(items: Vec<T>, skip: i64, limit: i64) -> Vec<T> {
    let skipped = items.into_iter().skip(skip.max(0) as usize);
    if limit > 0 {
        skipped.take(limit as usize).collect()
    } else {
        skipped.collect()
    }
}

/// Group documents by the value at `group_by`, keeping first-seen group order.
pub fn group_documents(docs: Vec<Document>, group_by: &str) -> Vec<Document> {
    let mut groups: Vec<(Value, Vec<Value>)> = Vec::new();
    for doc in docs {
        let key = doc.path(group_by).cloned().unwrap_or(Value::Null);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(Value::Object(doc)),
            None => groups.push((key, vec![Value::Object(doc)])),
        }
    }
    groups
        .into_iter()
        .map(|(key, members)| {
            let mut group = Document::new();
            group.insert("_id".to_string(), key);
            group.insert("count".to_string(), Value::from(members.len() as u64));
            group.insert(fields::GROUP_DOCS.to_string(), Value::Array(members));
            group
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn filter_parsing() {
        assert!(parse_filter("").unwrap().is_empty());
        assert_eq!(parse_filter(r#"{"role_scope":"admin"}"#).unwrap().len(), 1);
        assert!(matches!(parse_filter("[1,2]"), Err(ServiceError::InvalidFilter(_))));
        assert!(matches!(parse_filter("{oops"), Err(ServiceError::InvalidFilter(_))));
        assert!(matches!(
            parse_filter(r#"{"$where":"1"}"#),
            Err(ServiceError::InvalidFilter(_))
        ));
    }

    #[test]
    fn sort_keeps_key_order() {
        let keys = parse_sort(r#"{ "role_scope":1, "role_id":-1}"#).unwrap();
        assert_eq!(
            keys,
            vec![
                SortKey { field: "role_scope".into(), descending: false },
                SortKey { field: "role_id".into(), descending: true },
            ]
        );
        assert!(parse_sort(r#"{"a": 2}"#).is_err());
    }

    #[test]
    fn matching_and_scope() {
        let d = doc(json!({
            "business_id": "biz1", "staff_id": "stf1",
            "clock_in": { "device": "web" }, "is_deleted": false
        }));
        assert!(matches(&d, &parse_filter(r#"{"clock_in.device":"web"}"#).unwrap()));
        assert!(!matches(&d, &parse_filter(r#"{"clock_in.device":"app"}"#).unwrap()));
        assert!(matches(&d, &parse_filter(r#"{"missing":null}"#).unwrap()));
        assert!(in_scope(&d, &Scope::staff("biz1", Some("stf1"))));
        assert!(in_scope(&d, &Scope::business("biz1")));
        assert!(!in_scope(&d, &Scope::staff("biz1", Some("stf2"))));
        assert!(!is_deleted(&d));
    }

    #[test]
    fn sorting_paging_and_grouping() {
        let mut docs = vec![
            doc(json!({ "name": "b", "rank": 2, "staff_id": "s1" })),
            doc(json!({ "name": "a", "rank": 2, "staff_id": "s2" })),
            doc(json!({ "name": "c", "rank": 1, "staff_id": "s1" })),
        ];
        sort_documents(&mut docs, &parse_sort(r#"{"rank":-1,"name":1}"#).unwrap());
        let names: Vec<_> = docs.iter().map(|d| d["name"].clone()).collect();
        assert_eq!(names, vec![json!("a"), json!("b"), json!("c")]);

        assert_eq!(page(vec![1, 2, 3, 4], 1, 2), vec![2, 3]);
        assert_eq!(page(vec![1, 2, 3, 4], 2, 0), vec![3, 4]);

        let groups = group_documents(docs, "staff_id");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["_id"], json!("s2"));
        assert_eq!(groups[1]["count"], json!(2));
    }
}
