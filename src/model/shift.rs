use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A scheduled work period for exactly one worker. The token is minted once
/// at creation, never regenerated, and doubles as the QR payload the worker
/// presents to check in.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "worker_id": 7,
        "date": "2024-06-01",
        "shift_start": "2024-06-01T08:00:00",
        "shift_end": "2024-06-01T16:00:00",
        "token": "9f2c4a...64 hex chars",
        "is_active": true
    })
)]
pub struct Shift {
    pub id: i64,
    pub worker_id: i64,
    #[schema(example = "2024-06-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "2024-06-01T08:00:00", value_type = String, format = "date-time")]
    pub shift_start: NaiveDateTime,
    #[schema(example = "2024-06-01T16:00:00", value_type = String, format = "date-time")]
    pub shift_end: NaiveDateTime,
    pub token: String,
    /// Inactive shifts keep their history but reject new check-ins.
    pub is_active: bool,
}

/// Shift joined with its worker, as listed to administrators.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct ShiftWithWorker {
    pub id: i64,
    pub worker_id: i64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = String, format = "date-time")]
    pub shift_start: NaiveDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub shift_end: NaiveDateTime,
    pub token: String,
    pub is_active: bool,
    #[schema(example = "Jane Doe")]
    pub worker_name: String,
    #[schema(example = "jane@company.com")]
    pub worker_email: String,
}
