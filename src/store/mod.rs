//! Document store gateway.
//!
//! Services never talk to a backend directly: they open two handles through a
//! [`Connector`] (one on the platform database holding businesses and app
//! users, one on the tenant's region database holding HR collections) and use
//! the [`DocumentStore`] operations on those.

pub mod memory;
pub mod mysql;
pub mod query;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::config::ServiceProps;
use crate::error::ServiceError;
use crate::utils::document::{Document, Patch};

/// Which database a handle points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Region {
    Platform,
    Tenant,
}

/// Tenant / staff restriction applied to every operation on a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub business_id: Option<String>,
    pub staff_id: Option<String>,
}

impl Scope {
    /// Platform collections are not tenant scoped.
    pub fn platform() -> Self {
        Self::default()
    }

    pub fn business(business_id: &str) -> Self {
        Self {
            business_id: Some(business_id.to_string()),
            staff_id: None,
        }
    }

    pub fn staff(business_id: &str, staff_id: Option<&str>) -> Self {
        Self {
            business_id: Some(business_id.to_string()),
            staff_id: staff_id.map(str::to_string),
        }
    }
}

/// A named collection, the field its documents are keyed by, and the scope.
#[derive(Debug, Clone)]
pub struct Collection {
    pub name: &'static str,
    pub id_field: &'static str,
    pub scope: Scope,
}

impl Collection {
    pub fn new(name: &'static str, id_field: &'static str, scope: Scope) -> Self {
        Self { name, id_field, scope }
    }
}

/// Opaque list parameters, passed to the backend as given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// JSON object of equality conditions, empty for all.
    #[serde(default)]
    pub filter: String,
    /// JSON object of `field: 1 | -1`, empty for storage order.
    #[serde(default)]
    pub sort: String,
    #[serde(default)]
    pub skip: i64,
    /// 0 means unbounded.
    #[serde(default)]
    pub limit: i64,
}

impl ListQuery {
    pub fn new(filter: &str, sort: &str, skip: i64, limit: i64) -> Self {
        Self {
            filter: filter.to_string(),
            sort: sort.to_string(),
            skip,
            limit,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListSummary {
    /// Documents in scope before filtering.
    pub total_size: u64,
    /// Documents matching the filter.
    pub filtered_size: u64,
    /// Documents in this page.
    pub result_size: u64,
    pub skip: i64,
    pub limit: i64,
}

/// List envelope returned by the store and passed through by services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub summary: ListSummary,
    pub list: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn try_map<U, F>(self, f: F) -> Result<ListResponse<U>, ServiceError>
    where
        F: FnMut(T) -> Result<U, ServiceError>,
    {
        Ok(ListResponse {
            summary: self.summary,
            list: self.list.into_iter().map(f).collect::<Result<_, _>>()?,
        })
    }
}

/// Backend operations. Reads skip soft-deleted documents; writes do not.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, coll: &Collection, id: &str) -> Result<Document, ServiceError>;
    /// Insert a document; fails `DuplicateId` when the id is already stored.
    async fn create(&self, coll: &Collection, doc: Document) -> Result<Document, ServiceError>;
    /// Set the patch fields on one document and return the updated document.
    async fn update(&self, coll: &Collection, id: &str, patch: &Patch)
    -> Result<Document, ServiceError>;
    async fn delete(&self, coll: &Collection, id: &str) -> Result<u64, ServiceError>;
    async fn delete_many(&self, coll: &Collection) -> Result<u64, ServiceError>;
    async fn update_many(&self, coll: &Collection, patch: &Patch) -> Result<u64, ServiceError>;
    async fn list(
        &self,
        coll: &Collection,
        query: &ListQuery,
    ) -> Result<ListResponse<Document>, ServiceError>;
    /// First document matching `filter`.
    async fn find(&self, coll: &Collection, filter: &str) -> Result<Document, ServiceError>;
    /// Group matching documents by `group_by`; each item is
    /// `{ "_id": key, "count": n, "group_docs": [...] }`.
    async fn aggregate(
        &self,
        coll: &Collection,
        query: &ListQuery,
        group_by: &str,
    ) -> Result<ListResponse<Document>, ServiceError>;
    async fn count(&self, coll: &Collection) -> Result<u64, ServiceError>;

    async fn begin_transaction(&self) -> Result<(), ServiceError>;
    async fn commit_transaction(&self) -> Result<(), ServiceError>;
    async fn rollback_transaction(&self) -> Result<(), ServiceError>;

    /// Release the handle. Safe to call more than once.
    async fn close(&self);
}

/// Opens store handles for a service.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(
        &self,
        region: Region,
        props: &ServiceProps,
    ) -> Result<Arc<dyn DocumentStore>, ServiceError>;
}

pub type SharedConnector = Arc<dyn Connector>;
