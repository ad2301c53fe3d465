use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single scheduled class instance. Recurring creation expands into
/// independent rows; there is no series entity linking siblings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSession {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub capacity: i32,
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_cancelled: bool,
    pub instructor_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceLog {
    pub id: Uuid,
    pub class_session_id: Uuid,
    pub client_id: Uuid,
    pub checked_in_at: DateTime<Utc>,
    pub checked_in_by_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassWithRoster {
    #[serde(flatten)]
    pub session: ClassSession,
    pub attendees: Vec<AttendanceLog>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateClassRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub capacity: i32,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub instructor_id: Uuid,
    #[serde(default)]
    pub is_cancelled: bool,
}

/// Weekday-pattern template expanded into one session per matching date
/// in `[start_date, end_date]`. Day tokens are "Sun" through "Sat".
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecurringClassRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub capacity: i32,
    pub instructor_id: Uuid,
    pub days: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub is_cancelled: bool,
}

/// Partial field patch; `attendee_ids`, when present, is the complete
/// desired roster and triggers reconciliation.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateClassRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub is_cancelled: Option<bool>,
    pub instructor_id: Option<Uuid>,
    pub attendee_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct RosterChange {
    pub added_count: usize,
    pub removed_count: usize,
    pub kept_count: usize,
}
