//! Document field names shared by every collection.

pub const BUSINESS_ID: &str = "business_id";
pub const STAFF_ID: &str = "staff_id";
pub const ATTENDANCE_ID: &str = "attendance_id";
pub const LEAVE_ID: &str = "leave_id";
pub const APP_USER_ID: &str = "app_user_id";

pub const IS_DELETED: &str = "is_deleted";
pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

pub const DATE_TIME: &str = "date_time";
pub const CLOCK_IN: &str = "clock_in";
pub const CLOCK_OUT: &str = "clock_out";
pub const BUSINESS_TIMEZONE: &str = "business_timezone";
pub const LEAVE_FROM: &str = "leave_from";
pub const LEAVE_TO: &str = "leave_to";
pub const SHIFT_FROM: &str = "shift_from";
pub const SHIFT_TO: &str = "shift_to";

pub const STAFF_DATA: &str = "staff_data";
pub const REPORTING_STAFF_ID: &str = "reporting_staff_id";

// denormalized lookups
pub const USER_INFO: &str = "user_info";
pub const STAFF_INFO: &str = "staff_info";
pub const REPORTING_STAFF_INFO: &str = "reporting_staff_info";
pub const GROUP_DOCS: &str = "group_docs";

/// Maintained by the services and the store, never taken from an update.
pub const READ_ONLY: &[&str] = &[IS_DELETED, UPDATED_AT, USER_INFO, STAFF_INFO, REPORTING_STAFF_INFO];
