use chrono::{NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use chrono_tz::Tz;

use crate::error::ServiceError;

/// `YYYY-MM-DD HH:MM:SS`, the format of every stored `date_time`, `leave_from` and `leave_to`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// `HH:MM:SS`, used by shift boundaries.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Resolve an IANA zone name sent by the caller.
pub fn parse_timezone(name: Option<&str>) -> Result<Tz, ServiceError> {
    let name = match name.map(str::trim) {
        Some(n) if !n.is_empty() => n,
        _ => return Err(ServiceError::NoTimezone),
    };
    name.parse::<Tz>()
        .map_err(|_| ServiceError::InvalidTimezone(name.to_string()))
}

/// Current wall-clock time in `tz`, formatted with [`DATETIME_FORMAT`].
pub fn now_in(tz: Tz) -> String {
    Utc::now().with_timezone(&tz).format(DATETIME_FORMAT).to_string()
}

pub fn validate_datetime(field: &str, value: &str) -> Result<NaiveDateTime, ServiceError> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .map_err(|_| ServiceError::invalid_datetime(field, value))
}

pub fn validate_time(field: &str, value: &str) -> Result<NaiveTime, ServiceError> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|_| ServiceError::InvalidTime {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Audit stamp for `created_at` / `updated_at`.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timezone_resolution() {
        assert!(matches!(parse_timezone(None), Err(ServiceError::NoTimezone)));
        assert!(matches!(parse_timezone(Some("  ")), Err(ServiceError::NoTimezone)));
        assert!(matches!(
            parse_timezone(Some("Mars/Olympus")),
            Err(ServiceError::InvalidTimezone(name)) if name == "Mars/Olympus"
        ));
        assert_eq!(parse_timezone(Some("Asia/Kolkata")).unwrap(), chrono_tz::Asia::Kolkata);
    }

    #[test]
    fn now_in_zone_parses_back() {
        let stamp = now_in(chrono_tz::Europe::Berlin);
        assert!(validate_datetime("date_time", &stamp).is_ok());
    }

    #[test]
    fn datetime_and_time_validation() {
        assert!(validate_datetime("leave_from", "2024-02-29 08:30:00").is_ok());
        assert!(validate_datetime("leave_from", "2024-02-30 08:30:00").is_err());
        assert!(validate_datetime("leave_from", "2024-02-01").is_err());
        assert!(validate_time("shift_from", "21:00:00").is_ok());
        assert!(matches!(
            validate_time("shift_to", "9pm"),
            Err(ServiceError::InvalidTime { field, .. }) if field == "shift_to"
        ));
    }
}
