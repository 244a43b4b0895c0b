use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Durable proof that a worker redeemed a shift's token. At most one row per
/// shift; `check_in` is always server-assigned.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: i64,
    pub shift_id: i64,
    pub worker_id: i64,
    #[schema(example = "2024-06-01T08:12:00", value_type = String, format = "date-time")]
    pub check_in: NaiveDateTime,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out: Option<NaiveDateTime>,
}

/// Attendance row enriched with worker and shift summaries, as returned by
/// check-in, history and the daily/monthly listings.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceDetail {
    pub id: i64,
    pub shift_id: i64,
    pub worker_id: i64,
    #[schema(value_type = String, format = "date-time")]
    pub check_in: NaiveDateTime,
    #[schema(example = "Jane Doe")]
    pub worker_name: String,
    #[schema(example = "jane@company.com")]
    pub worker_email: String,
    #[schema(value_type = String, format = "date")]
    pub shift_date: NaiveDate,
    #[schema(value_type = String, format = "date-time")]
    pub shift_start: NaiveDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub shift_end: NaiveDateTime,
}
