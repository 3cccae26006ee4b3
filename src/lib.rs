pub mod api;
pub mod config;
pub mod dao;
pub mod db;
pub mod docs;
pub mod error;
pub mod model;
pub mod routes;
pub mod service;
pub mod store;
pub mod utils;

pub use error::{ErrorKind, ServiceError};
