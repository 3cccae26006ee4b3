//! MySQL backend: every document is one row of `hr_documents` with a JSON body.
//!
//! `business_id`, `staff_id` and `is_deleted` are mirrored into columns so the
//! scope and soft-delete conditions are indexable; everything else is queried
//! through `JSON_EXTRACT` with bound paths and values.

use std::sync::Arc;

use async_trait::async_trait;
use futures::lock::Mutex;
use serde_json::Value;
use sqlx::mysql::{MySqlArguments, MySqlPool};
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::{Executor, MySql, Row};

use crate::config::ServiceProps;
use crate::error::ServiceError;
use crate::model::fields;
use crate::store::query::{check_field_name, group_documents, page, parse_filter, parse_sort};
use crate::store::{
    Collection, Connector, DocumentStore, ListQuery, ListResponse, ListSummary, Region,
};
use crate::utils::datetime::utc_timestamp;
use crate::utils::document::{Document, DocumentExt, Patch};

pub const DOCUMENTS_TABLE: &str = "hr_documents";

/* ===============================
 * SQL bindable values
 * =============================== */

#[derive(Debug, Clone)]
enum SqlValue {
    String(String),
    U64(u64),
    Bool(bool),
    Null,
}

impl From<Option<&str>> for SqlValue {
    fn from(value: Option<&str>) -> Self {
        value.map_or(SqlValue::Null, |v| SqlValue::String(v.to_string()))
    }
}

/// SQL text plus its positional values, built up clause by clause.
#[derive(Debug, Default)]
struct SqlQuery {
    sql: String,
    values: Vec<SqlValue>,
}

impl SqlQuery {
    fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into(), values: Vec::new() }
    }

    fn push(&mut self, fragment: &str) -> &mut Self {
        self.sql.push_str(fragment);
        self
    }

    fn bind(&mut self, value: SqlValue) -> &mut Self {
        self.values.push(value);
        self
    }

    fn append(&mut self, other: SqlQuery) -> &mut Self {
        self.sql.push_str(&other.sql);
        self.values.extend(other.values);
        self
    }

    fn build(&self) -> Query<'_, MySql, MySqlArguments> {
        let mut query = sqlx::query(&self.sql);
        for value in &self.values {
            query = match value {
                SqlValue::String(v) => query.bind(v.clone()),
                SqlValue::U64(v) => query.bind(*v),
                SqlValue::Bool(v) => query.bind(*v),
                SqlValue::Null => query.bind(None::<String>),
            };
        }
        query
    }
}

/// `clock_in.device` -> `$."clock_in"."device"`
fn json_path(dotted: &str) -> String {
    dotted.split('.').fold(String::from("$"), |mut path, part| {
        path.push_str(&format!(".\"{}\"", part.replace('"', "\\\"")));
        path
    })
}

/// Path of one top-level key, dots included.
fn top_level_path(key: &str) -> String {
    format!("$.\"{}\"", key.replace('"', "\\\""))
}

/// `WHERE` clause restricting to the collection and its scope.
fn scoped_where(coll: &Collection, include_deleted: bool) -> SqlQuery {
    let mut q = SqlQuery::new(" WHERE collection = ?");
    q.bind(SqlValue::String(coll.name.to_string()));
    if let Some(business_id) = &coll.scope.business_id {
        q.push(" AND business_id = ?").bind(SqlValue::String(business_id.clone()));
    }
    if let Some(staff_id) = &coll.scope.staff_id {
        q.push(" AND staff_id = ?").bind(SqlValue::String(staff_id.clone()));
    }
    if !include_deleted {
        q.push(" AND is_deleted = FALSE");
    }
    q
}

fn push_filter(q: &mut SqlQuery, filter: &Document) {
    for (field, expected) in filter {
        let path = json_path(field);
        if expected.is_null() {
            q.push(" AND (JSON_EXTRACT(body, ?) IS NULL OR JSON_TYPE(JSON_EXTRACT(body, ?)) = 'NULL')")
                .bind(SqlValue::String(path.clone()))
                .bind(SqlValue::String(path));
        } else {
            q.push(" AND JSON_EXTRACT(body, ?) = CAST(? AS JSON)")
                .bind(SqlValue::String(path))
                .bind(SqlValue::String(expected.to_string()));
        }
    }
}

fn push_order_and_page(q: &mut SqlQuery, sort: &str, skip: i64, limit: i64) -> Result<(), ServiceError> {
    let keys = parse_sort(sort)?;
    if !keys.is_empty() {
        let order = keys
            .iter()
            .map(|key| if key.descending { "JSON_EXTRACT(body, ?) DESC" } else { "JSON_EXTRACT(body, ?) ASC" })
            .collect::<Vec<_>>()
            .join(", ");
        q.push(" ORDER BY ").push(&order);
        for key in &keys {
            q.bind(SqlValue::String(json_path(&key.field)));
        }
    }
    // MySQL has no OFFSET without LIMIT
    let limit = if limit > 0 { limit as u64 } else { u64::MAX };
    q.push(" LIMIT ? OFFSET ?")
        .bind(SqlValue::U64(limit))
        .bind(SqlValue::U64(skip.max(0) as u64));
    Ok(())
}

fn parse_body(raw: &str) -> Result<Document, ServiceError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(doc) => Ok(doc),
        _ => Err(ServiceError::Storage("stored body is not a JSON object".to_string())),
    }
}

fn is_duplicate(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000"))
}

/// One handle: a pooled connection held for the lifetime of a service.
pub struct MySqlStore {
    conn: Mutex<Option<PoolConnection<MySql>>>,
}

impl MySqlStore {
    pub async fn open(pool: &MySqlPool) -> Result<Self, ServiceError> {
        let conn = pool.acquire().await?;
        Ok(Self { conn: Mutex::new(Some(conn)) })
    }

    async fn execute(&self, q: &SqlQuery) -> Result<u64, ServiceError> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(ServiceError::ConnectionClosed)?;
        let result = q.build().execute(&mut **conn).await?;
        Ok(result.rows_affected())
    }

    async fn fetch_bodies(&self, q: &SqlQuery) -> Result<Vec<Document>, ServiceError> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(ServiceError::ConnectionClosed)?;
        let rows = q.build().fetch_all(&mut **conn).await?;
        rows.iter()
            .map(|row| parse_body(&row.try_get::<String, _>("body")?))
            .collect()
    }

    async fn fetch_count(&self, q: &SqlQuery) -> Result<u64, ServiceError> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(ServiceError::ConnectionClosed)?;
        let row = q.build().fetch_one(&mut **conn).await?;
        let total: i64 = row.try_get("total")?;
        Ok(total.max(0) as u64)
    }

    async fn run_statement(&self, statement: &str) -> Result<(), ServiceError> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(ServiceError::ConnectionClosed)?;
        // plain text protocol; transaction statements cannot be prepared
        (&mut **conn).execute(statement).await?;
        Ok(())
    }

    async fn fetch_one(
        &self,
        coll: &Collection,
        id: &str,
        include_deleted: bool,
    ) -> Result<Document, ServiceError> {
        let mut q = SqlQuery::new(format!("SELECT CAST(body AS CHAR) AS body FROM {DOCUMENTS_TABLE}"));
        q.append(scoped_where(coll, include_deleted));
        q.push(" AND doc_id = ? LIMIT 1").bind(SqlValue::String(id.to_string()));
        self.fetch_bodies(&q)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::not_found(coll.name, id))
    }

    async fn scoped_count(&self, coll: &Collection, filter: Option<&Document>) -> Result<u64, ServiceError> {
        let mut q = SqlQuery::new(format!("SELECT COUNT(*) AS total FROM {DOCUMENTS_TABLE}"));
        q.append(scoped_where(coll, false));
        if let Some(filter) = filter {
            push_filter(&mut q, filter);
        }
        self.fetch_count(&q).await
    }

    fn select_filtered(coll: &Collection, filter: &Document) -> SqlQuery {
        let mut q = SqlQuery::new(format!("SELECT CAST(body AS CHAR) AS body FROM {DOCUMENTS_TABLE}"));
        q.append(scoped_where(coll, false));
        push_filter(&mut q, filter);
        q
    }

    /// `UPDATE ... SET body = JSON_SET(body, ?, CAST(? AS JSON), ...)` for every patch field.
    fn build_update(coll: &Collection, patch: &Patch, id: Option<&str>) -> Result<SqlQuery, ServiceError> {
        let mut q = SqlQuery::new(format!("UPDATE {DOCUMENTS_TABLE} SET body = JSON_SET(body"));
        let changes = patch
            .as_document()
            .iter()
            .filter(|(key, _)| key.as_str() != fields::UPDATED_AT);
        for (key, value) in changes {
            q.push(", ?, CAST(? AS JSON)")
                .bind(SqlValue::String(top_level_path(key)))
                .bind(SqlValue::String(value.to_string()));
        }
        q.push(", ?, CAST(? AS JSON)")
            .bind(SqlValue::String(top_level_path(fields::UPDATED_AT)))
            .bind(SqlValue::String(Value::String(utc_timestamp()).to_string()));
        q.push(")");
        if let Some(deleted) = patch.get(fields::IS_DELETED) {
            let flag = deleted.as_bool().ok_or_else(|| ServiceError::TypeMismatch {
                field: fields::IS_DELETED.to_string(),
                expected: "a boolean",
            })?;
            q.push(", is_deleted = ?").bind(SqlValue::Bool(flag));
        }
        q.append(scoped_where(coll, true));
        if let Some(id) = id {
            q.push(" AND doc_id = ?").bind(SqlValue::String(id.to_string()));
        }
        Ok(q)
    }
}

#[async_trait]
impl DocumentStore for MySqlStore {
    async fn get(&self, coll: &Collection, id: &str) -> Result<Document, ServiceError> {
        self.fetch_one(coll, id, false).await
    }

    async fn create(&self, coll: &Collection, mut doc: Document) -> Result<Document, ServiceError> {
        let id = doc.str_field(coll.id_field)?.to_string();

        let now = utc_timestamp();
        doc.insert(fields::CREATED_AT.to_string(), Value::String(now.clone()));
        doc.insert(fields::UPDATED_AT.to_string(), Value::String(now));
        let deleted = doc
            .entry(fields::IS_DELETED)
            .or_insert(Value::Bool(false))
            .as_bool()
            .unwrap_or(false);

        let mut q = SqlQuery::new(format!(
            "INSERT INTO {DOCUMENTS_TABLE} (collection, doc_id, business_id, staff_id, is_deleted, body) \
             VALUES (?, ?, ?, ?, ?, CAST(? AS JSON))"
        ));
        q.bind(SqlValue::String(coll.name.to_string()))
            .bind(SqlValue::String(id.clone()))
            .bind(SqlValue::String(doc.opt_str_field(fields::BUSINESS_ID)?.unwrap_or_default().to_string()))
            .bind(doc.opt_str_field(fields::STAFF_ID)?.into())
            .bind(SqlValue::Bool(deleted))
            .bind(SqlValue::String(Value::Object(doc.clone()).to_string()));

        match self.execute(&q).await {
            Ok(_) => Ok(doc),
            Err(ServiceError::Database(e)) if is_duplicate(&e) => {
                Err(ServiceError::duplicate(coll.name, id))
            }
            Err(e) => {
                tracing::error!(error = %e, collection = coll.name, id, "Insert failed");
                Err(e)
            }
        }
    }

    async fn update(
        &self,
        coll: &Collection,
        id: &str,
        patch: &Patch,
    ) -> Result<Document, ServiceError> {
        let q = Self::build_update(coll, patch, Some(id))?;
        self.execute(&q).await?;
        self.fetch_one(coll, id, true).await
    }

    async fn delete(&self, coll: &Collection, id: &str) -> Result<u64, ServiceError> {
        let mut q = SqlQuery::new(format!("DELETE FROM {DOCUMENTS_TABLE}"));
        q.append(scoped_where(coll, true));
        q.push(" AND doc_id = ?").bind(SqlValue::String(id.to_string()));
        self.execute(&q).await
    }

    async fn delete_many(&self, coll: &Collection) -> Result<u64, ServiceError> {
        let mut q = SqlQuery::new(format!("DELETE FROM {DOCUMENTS_TABLE}"));
        q.append(scoped_where(coll, true));
        self.execute(&q).await
    }

    async fn update_many(&self, coll: &Collection, patch: &Patch) -> Result<u64, ServiceError> {
        let q = Self::build_update(coll, patch, None)?;
        self.execute(&q).await
    }

    async fn list(
        &self,
        coll: &Collection,
        query: &ListQuery,
    ) -> Result<ListResponse<Document>, ServiceError> {
        let filter = parse_filter(&query.filter)?;
        let total_size = self.scoped_count(coll, None).await?;
        let filtered_size = self.scoped_count(coll, Some(&filter)).await?;

        let mut q = Self::select_filtered(coll, &filter);
        push_order_and_page(&mut q, &query.sort, query.skip, query.limit)?;
        let list = self.fetch_bodies(&q).await?;

        Ok(ListResponse {
            summary: ListSummary {
                total_size,
                filtered_size,
                result_size: list.len() as u64,
                skip: query.skip,
                limit: query.limit,
            },
            list,
        })
    }

    async fn find(&self, coll: &Collection, filter: &str) -> Result<Document, ServiceError> {
        let parsed = parse_filter(filter)?;
        let mut q = Self::select_filtered(coll, &parsed);
        q.push(" LIMIT 1");
        self.fetch_bodies(&q)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::not_found(coll.name, filter))
    }

    async fn aggregate(
        &self,
        coll: &Collection,
        query: &ListQuery,
        group_by: &str,
    ) -> Result<ListResponse<Document>, ServiceError> {
        check_field_name(group_by)?;
        let filter = parse_filter(&query.filter)?;
        let total_size = self.scoped_count(coll, None).await?;

        // grouping happens in process; paging applies to groups, not rows
        let mut q = Self::select_filtered(coll, &filter);
        push_order_and_page(&mut q, &query.sort, 0, 0)?;
        let groups = group_documents(self.fetch_bodies(&q).await?, group_by);
        let filtered_size = groups.len() as u64;
        let list = page(groups, query.skip, query.limit);

        Ok(ListResponse {
            summary: ListSummary {
                total_size,
                filtered_size,
                result_size: list.len() as u64,
                skip: query.skip,
                limit: query.limit,
            },
            list,
        })
    }

    async fn count(&self, coll: &Collection) -> Result<u64, ServiceError> {
        self.scoped_count(coll, None).await
    }

    async fn begin_transaction(&self) -> Result<(), ServiceError> {
        self.run_statement("START TRANSACTION").await
    }

    async fn commit_transaction(&self) -> Result<(), ServiceError> {
        self.run_statement("COMMIT").await
    }

    async fn rollback_transaction(&self) -> Result<(), ServiceError> {
        self.run_statement("ROLLBACK").await
    }

    async fn close(&self) {
        // dropping the PoolConnection returns it to the pool
        self.conn.lock().await.take();
    }
}

/// Opens handles on the platform pool or the region pool.
pub struct MySqlConnector {
    platform: MySqlPool,
    region: MySqlPool,
}

impl MySqlConnector {
    pub fn new(platform: MySqlPool, region: MySqlPool) -> Self {
        Self { platform, region }
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    async fn open(
        &self,
        region: Region,
        props: &ServiceProps,
    ) -> Result<Arc<dyn DocumentStore>, ServiceError> {
        let pool = match region {
            Region::Platform => &self.platform,
            Region::Tenant => &self.region,
        };
        let store = MySqlStore::open(pool).await.map_err(|e| {
            tracing::error!(
                error = %e,
                region = region.as_ref(),
                business_id = props.business_id.as_deref().unwrap_or_default(),
                "Failed to open store connection"
            );
            e
        })?;
        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Scope;

    #[test]
    fn dotted_fields_become_quoted_json_paths() {
        assert_eq!(json_path("role_scope"), "$.\"role_scope\"");
        assert_eq!(json_path("clock_in.device"), "$.\"clock_in\".\"device\"");
        assert_eq!(top_level_path("a.b"), "$.\"a.b\"");
    }

    #[test]
    fn scope_and_filter_bind_in_order() {
        let coll = Collection::new("attendance", "attendance_id", Scope::staff("biz1", Some("stf1")));
        let filter = parse_filter(r#"{"clock_in.device":"web"}"#).unwrap();
        let q = MySqlStore::select_filtered(&coll, &filter);
        assert_eq!(
            q.sql,
            "SELECT CAST(body AS CHAR) AS body FROM hr_documents WHERE collection = ? \
             AND business_id = ? AND staff_id = ? AND is_deleted = FALSE \
             AND JSON_EXTRACT(body, ?) = CAST(? AS JSON)"
        );
        assert_eq!(q.values.len(), 5);
        assert!(matches!(&q.values[4], SqlValue::String(v) if v == "\"web\""));
    }

    #[test]
    fn soft_delete_patch_updates_the_flag_column() {
        let coll = Collection::new("leaves", "leave_id", Scope::business("biz1"));
        let q = MySqlStore::build_update(&coll, &Patch::soft_delete(), Some("leav1")).unwrap();
        assert!(q.sql.starts_with("UPDATE hr_documents SET body = JSON_SET(body, ?, CAST(? AS JSON), ?, CAST(? AS JSON)), is_deleted = ?"));
        assert!(q.sql.ends_with(" WHERE collection = ? AND business_id = ? AND doc_id = ?"));
    }

    #[test]
    fn unbounded_limit_still_pages() {
        let mut q = SqlQuery::new("SELECT 1");
        push_order_and_page(&mut q, r#"{"name":-1}"#, 5, 0).unwrap();
        assert_eq!(q.sql, "SELECT 1 ORDER BY JSON_EXTRACT(body, ?) DESC LIMIT ? OFFSET ?");
        assert!(matches!(q.values[1], SqlValue::U64(u64::MAX)));
        assert!(matches!(q.values[2], SqlValue::U64(5)));
    }
}
