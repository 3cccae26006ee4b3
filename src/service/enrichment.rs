//! Denormalized user-info lookups. A failed lookup leaves the field absent and
//! never fails the read it decorates.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::dao::AppUserDao;
use crate::model::{StaffLinked, fields};
use crate::store::DocumentStore;
use crate::utils::document::Document;

pub struct Enricher {
    app_users: AppUserDao,
}

impl Enricher {
    pub fn new(platform: Arc<dyn DocumentStore>) -> Self {
        Self { app_users: AppUserDao::new(platform) }
    }

    /// The staff member's profile as a one-element list, or `None`.
    pub async fn lookup(&self, staff_id: &str) -> Option<Vec<Document>> {
        if staff_id.is_empty() {
            return None;
        }
        match self.app_users.projection(staff_id).await {
            Ok(user) => Some(vec![user]),
            Err(e) => {
                debug!(error = %e, staff_id, "User info lookup failed");
                None
            }
        }
    }

    pub async fn attach<R: StaffLinked + Send>(&self, record: &mut R) {
        let info = self.lookup(record.staff_id()).await;
        record.set_user_info(info);
    }

    pub async fn attach_all<R: StaffLinked + Send>(&self, records: &mut [R]) {
        for record in records.iter_mut() {
            self.attach(record).await;
        }
    }

    /// Attach `staff_info` to every document inside each group's `group_docs`.
    pub async fn attach_to_groups(&self, groups: &mut [Document]) {
        for group in groups.iter_mut() {
            let Some(Value::Array(docs)) = group.get_mut(fields::GROUP_DOCS) else {
                continue;
            };
            for doc in docs.iter_mut().filter_map(Value::as_object_mut) {
                let staff_id = doc
                    .get(fields::STAFF_ID)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                match self.lookup(&staff_id).await {
                    Some(info) => {
                        let info = info.into_iter().map(Value::Object).collect();
                        doc.insert(fields::STAFF_INFO.to_string(), Value::Array(info));
                    }
                    None => {
                        doc.remove(fields::STAFF_INFO);
                    }
                }
            }
        }
    }
}
