use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use strum::{AsRefStr, Display};
use thiserror::Error;

/// Coarse classification of a [`ServiceError`], exposed to callers alongside the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum ErrorKind {
    ConfigError,
    TenantNotFound,
    StaffNotFound,
    NotFound,
    DuplicateId,
    InvalidDateTime,
    InvalidTime,
    NoTimezone,
    InvalidTimezone,
    InvalidStaffId,
    InvalidAttendanceId,
    StaffIdRequired,
    AlreadyClockedOut,
    FieldMissing,
    TypeMismatch,
    InvalidFilter,
    InvalidPayload,
    ConnectionClosed,
    Storage,
    Serialization,
}

/// Errors raised by the entity services and the storage gateway.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid business id: business `{0}` does not exist")]
    TenantNotFound(String),
    #[error("invalid staff id: staff `{0}` does not exist")]
    StaffNotFound(String),
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: String },
    /// Also raised for ids held by soft-deleted records of the tenant.
    #[error("{entity} id `{id}` is already in use")]
    DuplicateId { entity: &'static str, id: String },
    #[error("invalid {field}: `{value}` is not a valid date time")]
    InvalidDateTime { field: String, value: String },
    #[error("invalid {field}: `{value}` is not a valid time")]
    InvalidTime { field: String, value: String },
    #[error("no timezone information sent")]
    NoTimezone,
    #[error("timezone `{0}` is invalid")]
    InvalidTimezone(String),
    #[error("no such staff id `{0}` found")]
    InvalidStaffId(String),
    #[error("no such attendance id `{0}` found")]
    InvalidAttendanceId(String),
    #[error("operation requires a staff id")]
    StaffIdRequired,
    #[error("attendance `{0}` is already clocked out")]
    AlreadyClockedOut(String),
    #[error("field `{0}` is missing")]
    FieldMissing(String),
    #[error("field `{field}` should be {expected}")]
    TypeMismatch { field: String, expected: &'static str },
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("storage connection is closed")]
    ConnectionClosed,
    #[error("storage error: {0}")]
    Storage(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }

    pub fn duplicate(entity: &'static str, id: impl Into<String>) -> Self {
        Self::DuplicateId { entity, id: id.into() }
    }

    pub fn invalid_datetime(field: &str, value: impl Into<String>) -> Self {
        Self::InvalidDateTime { field: field.to_string(), value: value.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Config(_) => ErrorKind::ConfigError,
            ServiceError::TenantNotFound(_) => ErrorKind::TenantNotFound,
            ServiceError::StaffNotFound(_) => ErrorKind::StaffNotFound,
            ServiceError::NotFound { .. } => ErrorKind::NotFound,
            ServiceError::DuplicateId { .. } => ErrorKind::DuplicateId,
            ServiceError::InvalidDateTime { .. } => ErrorKind::InvalidDateTime,
            ServiceError::InvalidTime { .. } => ErrorKind::InvalidTime,
            ServiceError::NoTimezone => ErrorKind::NoTimezone,
            ServiceError::InvalidTimezone(_) => ErrorKind::InvalidTimezone,
            ServiceError::InvalidStaffId(_) => ErrorKind::InvalidStaffId,
            ServiceError::InvalidAttendanceId(_) => ErrorKind::InvalidAttendanceId,
            ServiceError::StaffIdRequired => ErrorKind::StaffIdRequired,
            ServiceError::AlreadyClockedOut(_) => ErrorKind::AlreadyClockedOut,
            ServiceError::FieldMissing(_) => ErrorKind::FieldMissing,
            ServiceError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            ServiceError::InvalidFilter(_) => ErrorKind::InvalidFilter,
            ServiceError::InvalidPayload(_) => ErrorKind::InvalidPayload,
            ServiceError::ConnectionClosed => ErrorKind::ConnectionClosed,
            ServiceError::Storage(_) | ServiceError::Database(_) => ErrorKind::Storage,
            ServiceError::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Stable caller-facing code, grouped by module: `M01xx` construction,
    /// `S301xx` validation, `S302xx` lookups, `S309xx` storage.
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::ConfigError => "M0100",
            ErrorKind::TenantNotFound => "M0101",
            ErrorKind::StaffNotFound => "M0102",
            ErrorKind::InvalidDateTime => "S30101",
            ErrorKind::InvalidTime => "S30102",
            ErrorKind::NoTimezone => "S30103",
            ErrorKind::InvalidTimezone => "S30104",
            ErrorKind::InvalidStaffId => "S30105",
            ErrorKind::InvalidAttendanceId => "S30106",
            ErrorKind::StaffIdRequired => "S30107",
            ErrorKind::FieldMissing => "S30108",
            ErrorKind::TypeMismatch => "S30109",
            ErrorKind::InvalidFilter => "S30110",
            ErrorKind::InvalidPayload => "S30111",
            ErrorKind::NotFound => "S30201",
            ErrorKind::DuplicateId => "S30202",
            ErrorKind::AlreadyClockedOut => "S30203",
            ErrorKind::ConnectionClosed => "S30901",
            ErrorKind::Storage => "S30902",
            ErrorKind::Serialization => "S30903",
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::DuplicateId | ErrorKind::AlreadyClockedOut => StatusCode::CONFLICT,
            ErrorKind::TenantNotFound | ErrorKind::StaffNotFound => StatusCode::FORBIDDEN,
            ErrorKind::ConnectionClosed | ErrorKind::Storage | ErrorKind::Serialization => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self.kind() {
            // storage internals stay in the logs
            ErrorKind::Storage | ErrorKind::Serialization => {
                tracing::error!(error = %self, "Storage failure");
                "Internal Server Error".to_string()
            }
            _ => self.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({
            "code": self.code(),
            "kind": self.kind().as_ref(),
            "message": message,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_http_status() {
        assert_eq!(
            ServiceError::not_found("Leave", "leav1").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::duplicate("Department", "dept1").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ServiceError::NoTimezone.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServiceError::TenantNotFound("biz".into()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn kind_renders_as_its_name() {
        assert_eq!(ServiceError::NoTimezone.kind().as_ref(), "NoTimezone");
        assert_eq!(ServiceError::Storage("x".into()).kind().to_string(), "Storage");
        assert_eq!(ServiceError::InvalidTimezone("Mars/Base".into()).code(), "S30104");
    }
}
