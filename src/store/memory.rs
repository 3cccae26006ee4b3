//! In-process backend, used by the test suites and `STORAGE_BACKEND=memory`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ServiceProps;
use crate::error::ServiceError;
use crate::model::fields;
use crate::store::query::{
    group_documents, in_scope, is_deleted, matches, page, parse_filter, parse_sort, sort_documents,
};
use crate::store::{
    Collection, Connector, DocumentStore, ListQuery, ListResponse, ListSummary, Region, Scope,
};
use crate::utils::datetime::utc_timestamp;
use crate::utils::document::{Document, DocumentExt, Patch};

type Collections = HashMap<String, Vec<Document>>;

fn id_matches(doc: &Document, id_field: &str, id: &str) -> bool {
    doc.get(id_field).and_then(Value::as_str) == Some(id)
}

/// One database worth of collections.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    open_handles: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, ServiceError> {
        self.collections
            .read()
            .map_err(|_| ServiceError::Storage("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, ServiceError> {
        self.collections
            .write()
            .map_err(|_| ServiceError::Storage("memory store lock poisoned".to_string()))
    }

    /// Open a handle on this store.
    pub fn handle(self: &Arc<Self>) -> MemoryHandle {
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        MemoryHandle {
            store: Arc::clone(self),
            closed: AtomicBool::new(false),
            snapshot: Mutex::new(None),
        }
    }

    /// Handles opened and not yet closed. Dropping a handle does not close it.
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    /// Store a document as-is, bypassing scope and stamping.
    pub fn insert_raw(&self, collection: &str, doc: Document) -> Result<(), ServiceError> {
        self.write()?
            .entry(collection.to_string())
            .or_default()
            .push(doc);
        Ok(())
    }

    /// Fetch a document as stored, including soft-deleted ones.
    pub fn raw(&self, collection: &str, id_field: &str, id: &str) -> Option<Document> {
        let guard = self.collections.read().ok()?;
        guard
            .get(collection)?
            .iter()
            .find(|doc| id_matches(doc, id_field, id))
            .cloned()
    }

    /// Physical document count of a collection, soft-deleted ones included.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|guard| guard.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

/// A [`DocumentStore`] handle over a shared [`MemoryStore`].
pub struct MemoryHandle {
    store: Arc<MemoryStore>,
    closed: AtomicBool,
    snapshot: Mutex<Option<Collections>>,
}

impl MemoryHandle {
    fn ensure_open(&self) -> Result<(), ServiceError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(ServiceError::ConnectionClosed)
        } else {
            Ok(())
        }
    }

    fn snapshot_slot(&self) -> Result<std::sync::MutexGuard<'_, Option<Collections>>, ServiceError> {
        self.snapshot
            .lock()
            .map_err(|_| ServiceError::Storage("transaction lock poisoned".to_string()))
    }

    /// Visible documents in scope, cloned.
    fn visible(&self, coll: &Collection) -> Result<Vec<Document>, ServiceError> {
        let guard = self.store.read()?;
        Ok(guard
            .get(coll.name)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| in_scope(doc, &coll.scope) && !is_deleted(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

fn apply_patch(doc: &mut Document, patch: &Patch) {
    patch.apply_to(doc);
    doc.insert(fields::UPDATED_AT.to_string(), Value::String(utc_timestamp()));
}

#[async_trait]
impl DocumentStore for MemoryHandle {
    async fn get(&self, coll: &Collection, id: &str) -> Result<Document, ServiceError> {
        self.ensure_open()?;
        self.visible(coll)?
            .into_iter()
            .find(|doc| id_matches(doc, coll.id_field, id))
            .ok_or_else(|| ServiceError::not_found(coll.name, id))
    }

    async fn create(&self, coll: &Collection, mut doc: Document) -> Result<Document, ServiceError> {
        self.ensure_open()?;
        let id = doc.str_field(coll.id_field)?.to_string();

        let now = utc_timestamp();
        doc.insert(fields::CREATED_AT.to_string(), Value::String(now.clone()));
        doc.insert(fields::UPDATED_AT.to_string(), Value::String(now));
        doc.entry(fields::IS_DELETED).or_insert(Value::Bool(false));

        // ids are unique per tenant, soft-deleted records included
        let tenant = Scope { staff_id: None, ..coll.scope.clone() };
        let mut guard = self.store.write()?;
        let docs = guard.entry(coll.name.to_string()).or_default();
        if docs
            .iter()
            .any(|existing| id_matches(existing, coll.id_field, &id) && in_scope(existing, &tenant))
        {
            return Err(ServiceError::duplicate(coll.name, id));
        }
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn update(
        &self,
        coll: &Collection,
        id: &str,
        patch: &Patch,
    ) -> Result<Document, ServiceError> {
        self.ensure_open()?;
        let mut guard = self.store.write()?;
        let doc = guard
            .get_mut(coll.name)
            .and_then(|docs| {
                docs.iter_mut()
                    .find(|doc| id_matches(doc, coll.id_field, id) && in_scope(doc, &coll.scope))
            })
            .ok_or_else(|| ServiceError::not_found(coll.name, id))?;
        apply_patch(doc, patch);
        Ok(doc.clone())
    }

    async fn delete(&self, coll: &Collection, id: &str) -> Result<u64, ServiceError> {
        self.ensure_open()?;
        let mut guard = self.store.write()?;
        let Some(docs) = guard.get_mut(coll.name) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|doc| !(id_matches(doc, coll.id_field, id) && in_scope(doc, &coll.scope)));
        Ok((before - docs.len()) as u64)
    }

    async fn delete_many(&self, coll: &Collection) -> Result<u64, ServiceError> {
        self.ensure_open()?;
        let mut guard = self.store.write()?;
        let Some(docs) = guard.get_mut(coll.name) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|doc| !in_scope(doc, &coll.scope));
        Ok((before - docs.len()) as u64)
    }

    async fn update_many(&self, coll: &Collection, patch: &Patch) -> Result<u64, ServiceError> {
        self.ensure_open()?;
        let mut guard = self.store.write()?;
        let Some(docs) = guard.get_mut(coll.name) else {
            return Ok(0);
        };
        let mut touched = 0;
        for doc in docs.iter_mut().filter(|doc| in_scope(doc, &coll.scope)) {
            apply_patch(doc, patch);
            touched += 1;
        }
        Ok(touched)
    }

    async fn list(
        &self,
        coll: &Collection,
        query: &ListQuery,
    ) -> Result<ListResponse<Document>, ServiceError> {
        self.ensure_open()?;
        let filter = parse_filter(&query.filter)?;
        let sort = parse_sort(&query.sort)?;

        let scoped = self.visible(coll)?;
        let total_size = scoped.len() as u64;
        let mut filtered: Vec<Document> =
            scoped.into_iter().filter(|doc| matches(doc, &filter)).collect();
        let filtered_size = filtered.len() as u64;
        sort_documents(&mut filtered, &sort);
        let list = page(filtered, query.skip, query.limit);

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
        self.ensure_open()?;
        let parsed = parse_filter(filter)?;
        self.visible(coll)?
            .into_iter()
            .find(|doc| matches(doc, &parsed))
            .ok_or_else(|| ServiceError::not_found(coll.name, filter))
    }

    async fn aggregate(
        &self,
        coll: &Collection,
        query: &ListQuery,
        group_by: &str,
    ) -> Result<ListResponse<Document>, ServiceError> {
        self.ensure_open()?;
        let filter = parse_filter(&query.filter)?;
        let sort = parse_sort(&query.sort)?;

        let scoped = self.visible(coll)?;
        let total_size = scoped.len() as u64;
        let mut filtered: Vec<Document> =
            scoped.into_iter().filter(|doc| matches(doc, &filter)).collect();
        sort_documents(&mut filtered, &sort);
        let groups = group_documents(filtered, group_by);
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
        self.ensure_open()?;
        Ok(self.visible(coll)?.len() as u64)
    }

    async fn begin_transaction(&self) -> Result<(), ServiceError> {
        self.ensure_open()?;
        let copy = self.store.read()?.clone();
        *self.snapshot_slot()? = Some(copy);
        Ok(())
    }

    async fn commit_transaction(&self) -> Result<(), ServiceError> {
        self.ensure_open()?;
        self.snapshot_slot()?.take();
        Ok(())
    }

    async fn rollback_transaction(&self) -> Result<(), ServiceError> {
        self.ensure_open()?;
        if let Some(saved) = self.snapshot_slot()?.take() {
            *self.store.write()? = saved;
        }
        Ok(())
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.store.open_handles.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Hands out handles on a platform store and a region store.
pub struct MemoryConnector {
    pub platform: Arc<MemoryStore>,
    pub region: Arc<MemoryStore>,
    region_available: AtomicBool,
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self {
            platform: MemoryStore::new(),
            region: MemoryStore::new(),
            region_available: AtomicBool::new(true),
        }
    }
}

impl MemoryConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make region opens fail, to exercise constructor teardown.
    pub fn set_region_available(&self, available: bool) {
        self.region_available.store(available, Ordering::SeqCst);
    }

    pub fn open_handles(&self) -> usize {
        self.platform.open_handles() + self.region.open_handles()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn open(
        &self,
        region: Region,
        _props: &ServiceProps,
    ) -> Result<Arc<dyn DocumentStore>, ServiceError> {
        match region {
            Region::Platform => Ok(Arc::new(self.platform.handle())),
            Region::Tenant if self.region_available.load(Ordering::SeqCst) => {
                Ok(Arc::new(self.region.handle()))
            }
            Region::Tenant => Err(ServiceError::Storage("region database unavailable".to_string())),
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

    fn departments(business_id: &str) -> Collection {
        Collection::new("departments", "department_id", Scope::business(business_id))
    }

    #[tokio::test]
    async fn create_stamps_and_rejects_duplicates() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let handle = store.handle();
        let coll = departments("biz1");

        let created = handle
            .create(&coll, doc(json!({ "department_id": "dept1", "business_id": "biz1" })))
            .await?;
        assert_eq!(created["is_deleted"], json!(false));
        assert!(created.contains_key("created_at"));

        let again = handle
            .create(&coll, doc(json!({ "department_id": "dept1", "business_id": "biz1" })))
            .await;
        assert!(matches!(again, Err(ServiceError::DuplicateId { .. })));
        assert_eq!(store.len("departments"), 1);
        Ok(())
    }

    #[tokio::test]
    async fn reads_respect_scope_and_soft_delete() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let handle = store.handle();
        for (id, biz, deleted) in [("d1", "biz1", false), ("d2", "biz1", true), ("d3", "biz2", false)] {
            store.insert_raw(
                "departments",
                doc(json!({ "department_id": id, "business_id": biz, "is_deleted": deleted })),
            )?;
        }
        let coll = departments("biz1");
        assert_eq!(handle.count(&coll).await?, 1);
        assert!(handle.get(&coll, "d2").await.is_err());
        assert!(handle.get(&coll, "d3").await.is_err());

        let listed = handle.list(&coll, &ListQuery::default()).await?;
        assert_eq!(listed.summary.total_size, 1);
        assert_eq!(listed.list[0]["department_id"], json!("d1"));
        Ok(())
    }

    #[tokio::test]
    async fn rollback_restores_snapshot() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let handle = store.handle();
        let coll = departments("biz1");
        handle.begin_transaction().await?;
        handle
            .create(&coll, doc(json!({ "department_id": "d1", "business_id": "biz1" })))
            .await?;
        handle.rollback_transaction().await?;
        assert_eq!(store.len("departments"), 0);
        Ok(())
    }

    #[tokio::test]
    async fn closed_handles_are_counted_and_refuse_work() {
        let store = MemoryStore::new();
        let handle = store.handle();
        assert_eq!(store.open_handles(), 1);
        handle.close().await;
        handle.close().await;
        assert_eq!(store.open_handles(), 0);
        assert!(matches!(
            handle.count(&departments("biz1")).await,
            Err(ServiceError::ConnectionClosed)
        ));
        drop(handle);
        assert_eq!(store.open_handles(), 0);
    }

    #[tokio::test]
    async fn dropped_handles_stay_open_until_closed() {
        let store = MemoryStore::new();
        drop(store.handle());
        assert_eq!(store.open_handles(), 1);
    }

    #[tokio::test]
    async fn ids_are_unique_per_tenant() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let handle = store.handle();
        let record = |biz: &str| doc(json!({ "department_id": "dept1", "business_id": biz }));

        handle.create(&departments("biz1"), record("biz1")).await?;
        handle.create(&departments("biz2"), record("biz2")).await?;
        assert_eq!(store.len("departments"), 2);

        handle.update(&departments("biz1"), "dept1", &Patch::soft_delete()).await?;
        let again = handle.create(&departments("biz1"), record("biz1")).await;
        assert!(matches!(again, Err(ServiceError::DuplicateId { .. })));
        Ok(())
    }
}
