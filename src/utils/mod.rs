pub mod datetime;
pub mod document;
pub mod ids;
pub mod logging;
