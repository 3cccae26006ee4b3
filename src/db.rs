use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

use crate::store::mysql::DOCUMENTS_TABLE;

pub async fn init_db(database_url: &str, max_connections: u32) -> Result<MySqlPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Document table; ids are unique per (collection, tenant). Platform
/// documents without a tenant are stored under an empty `business_id`.
fn documents_ddl() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {DOCUMENTS_TABLE} (
            collection VARCHAR(64) NOT NULL,
            business_id VARCHAR(128) NOT NULL DEFAULT '',
            doc_id VARCHAR(128) NOT NULL,
            staff_id VARCHAR(128) NULL,
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
            body JSON NOT NULL,
            PRIMARY KEY (collection, business_id, doc_id),
            KEY idx_scope (collection, business_id, staff_id, is_deleted)
        )"
    )
}

/// Create the document table when missing.
pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    sqlx::query(&documents_ddl()).execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_ids_are_keyed_per_tenant() {
        let ddl = documents_ddl();
        assert!(ddl.contains("PRIMARY KEY (collection, business_id, doc_id)"));
        assert!(ddl.contains("business_id VARCHAR(128) NOT NULL DEFAULT ''"));
    }
}
