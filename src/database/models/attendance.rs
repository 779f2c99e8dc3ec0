use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserInfo;

/// One work session. Created open on check-in; `check_out_time` and
/// `total_hours` are set exactly once on check-out.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub user_id: String,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub total_hours: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.check_out_time.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BreakInterval {
    pub id: String,
    pub attendance_record_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl BreakInterval {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// A record together with its breaks, as loaded from storage.
#[derive(Debug, Clone)]
pub struct AttendanceRecordWithBreaks {
    pub record: AttendanceRecord,
    pub breaks: Vec<BreakInterval>,
}

/// History row returned to clients: the raw record, its breaks, the owning
/// user, and the three derived hour metrics (2-decimal display rounding).
/// `total_hours`/`effective_hours` are null while the record is still open.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceHistoryEntry {
    pub record: AttendanceRecord,
    pub breaks: Vec<BreakInterval>,
    pub user: Option<UserInfo>,
    pub total_hours: Option<f64>,
    pub break_hours: f64,
    pub effective_hours: Option<f64>,
}
