use std::collections::HashMap;
use std::env;

use anyhow::Context;
use dotenvy::dotenv;
use strum::{AsRefStr, Display, EnumString};

use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageBackend {
    Mysql,
    Memory,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub storage_backend: StorageBackend,
    /// Platform database (businesses, app users).
    pub database_url: String,
    /// Tenant region database; defaults to `database_url`.
    pub region_database_url: String,
    pub db_max_connections: u32,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
    pub log_level: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_var<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var_or(key, default)
        .parse()
        .with_context(|| format!("{key} must be a number"))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();

        let storage_backend: StorageBackend = var_or("STORAGE_BACKEND", "mysql")
            .parse()
            .context("STORAGE_BACKEND must be `mysql` or `memory`")?;

        let database_url = match storage_backend {
            StorageBackend::Mysql => env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            StorageBackend::Memory => var_or("DATABASE_URL", ""),
        };
        let region_database_url = env::var("REGION_DATABASE_URL").unwrap_or_else(|_| database_url.clone());

        Ok(Self {
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:8080"),
            storage_backend,
            database_url,
            region_database_url,
            db_max_connections: parsed_var("DB_MAX_CONNECTIONS", "10")?,
            rate_protected_per_min: parsed_var("RATE_PROTECTED_PER_MIN", "1000")?,
            api_prefix: var_or("API_PREFIX", "/api"),
            log_dir: var_or("LOG_DIR", "logs"),
            log_level: var_or("LOG_LEVEL", "info"),
        })
    }
}

/// Storage credentials carried in [`ServiceProps`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DbCredentials {
    pub db_type: String,
    pub db_server: String,
    pub db_name: String,
    pub db_user: String,
    pub db_secret: String,
}

/// Per-service configuration: tenant, optional staff binding and storage credentials.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceProps {
    pub business_id: Option<String>,
    pub staff_id: Option<String>,
    pub credentials: DbCredentials,
}

impl ServiceProps {
    pub fn new(business_id: &str, staff_id: Option<&str>) -> Self {
        Self {
            business_id: Some(business_id.to_string()),
            staff_id: staff_id.map(str::to_string),
            credentials: DbCredentials::default(),
        }
    }

    /// Build from the key/value form (`business_id`, `staff_id`, `db_type`,
    /// `db_server`, `db_name`, `db_user`, `db_secret`). Blank values count as absent.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            business_id: get("business_id"),
            staff_id: get("staff_id"),
            credentials: DbCredentials {
                db_type: get("db_type").unwrap_or_default(),
                db_server: get("db_server").unwrap_or_default(),
                db_name: get("db_name").unwrap_or_default(),
                db_user: get("db_user").unwrap_or_default(),
                db_secret: get("db_secret").unwrap_or_default(),
            },
        }
    }

    pub fn business_id(&self) -> Result<&str, ServiceError> {
        self.business_id
            .as_deref()
            .ok_or_else(|| ServiceError::Config("business_id is required".to_string()))
    }

    pub fn staff_id(&self) -> Option<&str> {
        self.staff_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn props_from_map_ignores_blank_values() {
        let map: HashMap<String, String> = [
            ("business_id", "biz1"),
            ("staff_id", " "),
            ("db_type", "mysql"),
            ("db_name", "hr_region_eu"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let props = ServiceProps::from_map(&map);
        assert_eq!(props.business_id().unwrap(), "biz1");
        assert_eq!(props.staff_id(), None);
        assert_eq!(props.credentials.db_name, "hr_region_eu");
    }

    #[test]
    fn missing_business_id_is_a_config_error() {
        let props = ServiceProps::from_map(&HashMap::new());
        assert!(matches!(props.business_id(), Err(ServiceError::Config(_))));
    }

    #[test]
    fn storage_backend_parses_case_insensitively() {
        assert_eq!("Memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("postgres".parse::<StorageBackend>().is_err());
    }
}
