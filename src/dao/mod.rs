//! Typed access to one collection.

pub mod platform;

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{Value, json};

pub use platform::{AppUserDao, BusinessDao};

use crate::error::ServiceError;
use crate::model::{CodedEntity, Entity};
use crate::store::{Collection, DocumentStore, ListQuery, ListResponse, Scope};
use crate::utils::document::{Document, Patch, from_document, to_document};

pub struct Dao<E> {
    store: Arc<dyn DocumentStore>,
    collection: Collection,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Dao<E> {
    pub fn new(store: Arc<dyn DocumentStore>, scope: Scope) -> Self {
        Self {
            store,
            collection: Collection::new(E::COLLECTION, E::ID_FIELD, scope),
            _entity: PhantomData,
        }
    }

    /// Scope an entity for a tenant: staff-scoped entities also take the bound staff.
    pub fn for_tenant(store: Arc<dyn DocumentStore>, business_id: &str, staff_id: Option<&str>) -> Self {
        let scope = if E::STAFF_SCOPED {
            Scope::staff(business_id, staff_id)
        } else {
            Scope::business(business_id)
        };
        Self::new(store, scope)
    }

    fn not_found(&self, id: &str, e: ServiceError) -> ServiceError {
        match e {
            ServiceError::NotFound { .. } => ServiceError::not_found(E::NAME, id),
            other => other,
        }
    }

    pub async fn get(&self, id: &str) -> Result<E, ServiceError> {
        let doc = self
            .store
            .get(&self.collection, id)
            .await
            .map_err(|e| self.not_found(id, e))?;
        from_document(doc)
    }

    /// `Ok(false)` when absent; other failures are passed through.
    pub async fn exists(&self, id: &str) -> Result<bool, ServiceError> {
        match self.store.get(&self.collection, id).await {
            Ok(_) => Ok(true),
            Err(ServiceError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn create(&self, record: &E) -> Result<E, ServiceError> {
        let doc = self
            .store
            .create(&self.collection, to_document(record)?)
            .await
            .map_err(|e| match e {
                ServiceError::DuplicateId { id, .. } => ServiceError::duplicate(E::NAME, id),
                other => other,
            })?;
        from_document(doc)
    }

    pub async fn update(&self, id: &str, patch: &Patch) -> Result<E, ServiceError> {
        let doc = self
            .store
            .update(&self.collection, id, patch)
            .await
            .map_err(|e| self.not_found(id, e))?;
        from_document(doc)
    }

    pub async fn soft_delete(&self, id: &str) -> Result<E, ServiceError> {
        self.update(id, &Patch::soft_delete()).await
    }

    pub async fn delete(&self, id: &str) -> Result<u64, ServiceError> {
        self.store.delete(&self.collection, id).await
    }

    pub async fn delete_many(&self) -> Result<u64, ServiceError> {
        self.store.delete_many(&self.collection).await
    }

    pub async fn soft_delete_many(&self) -> Result<u64, ServiceError> {
        self.store.update_many(&self.collection, &Patch::soft_delete()).await
    }

    pub async fn list(&self, query: &ListQuery) -> Result<ListResponse<E>, ServiceError> {
        self.store
            .list(&self.collection, query)
            .await?
            .try_map(from_document)
    }

    pub async fn find(&self, filter: &str) -> Result<E, ServiceError> {
        from_document(self.store.find(&self.collection, filter).await?)
    }

    pub async fn aggregate(
        &self,
        query: &ListQuery,
        group_by: &str,
    ) -> Result<ListResponse<Document>, ServiceError> {
        self.store.aggregate(&self.collection, query, group_by).await
    }

    pub async fn count(&self) -> Result<u64, ServiceError> {
        self.store.count(&self.collection).await
    }
}

impl<E: CodedEntity> Dao<E> {
    pub async fn find_by_code(&self, code: &str) -> Result<E, ServiceError> {
        let filter = json!({ E::CODE_FIELD: Value::String(code.to_string()) }).to_string();
        self.find(&filter).await.map_err(|e| match e {
            ServiceError::NotFound { .. } => ServiceError::not_found(E::NAME, code),
            other => other,
        })
    }
}
