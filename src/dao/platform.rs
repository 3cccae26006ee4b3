//! Read-only lookups on the platform database.

use std::sync::Arc;

use serde_json::json;

use crate::error::ServiceError;
use crate::model::fields;
use crate::store::{Collection, DocumentStore, Scope};
use crate::utils::document::Document;

pub const BUSINESSES: &str = "businesses";
pub const APP_USERS: &str = "app_users";

pub struct BusinessDao {
    store: Arc<dyn DocumentStore>,
    collection: Collection,
}

impl BusinessDao {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            collection: Collection::new(BUSINESSES, fields::BUSINESS_ID, Scope::platform()),
        }
    }

    pub async fn get(&self, business_id: &str) -> Result<Document, ServiceError> {
        self.store.get(&self.collection, business_id).await
    }
}

pub struct AppUserDao {
    store: Arc<dyn DocumentStore>,
    collection: Collection,
}

impl AppUserDao {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            collection: Collection::new(APP_USERS, fields::APP_USER_ID, Scope::platform()),
        }
    }

    /// The app user linked to a staff member.
    pub async fn get(&self, staff_id: &str) -> Result<Document, ServiceError> {
        let filter = json!({ fields::STAFF_ID: staff_id }).to_string();
        self.store.find(&self.collection, &filter).await
    }

    /// Profile without its bookkeeping fields, ready to embed in another record.
    pub async fn projection(&self, staff_id: &str) -> Result<Document, ServiceError> {
        let mut user = self.get(staff_id).await?;
        for key in [fields::CREATED_AT, fields::UPDATED_AT, fields::APP_USER_ID] {
            user.remove(key);
        }
        Ok(user)
    }
}
