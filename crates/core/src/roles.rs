//! Role names as stored in the `roles` lookup table.

/// Administrators manage staff accounts and publish broadcasts.
pub const ROLE_ADMIN: &str = "admin";

/// Student heads manage the shared events calendar.
pub const ROLE_STUDENT_HEAD: &str = "student_head";

/// Regular students consume notifications and the calendar.
pub const ROLE_STUDENT: &str = "student";
