//! Shift lifecycle: creation with a freshly minted token, typed partial
//! updates, deactivation, and the history-preserving delete policy.

use crate::error::{Error, Result};
use crate::model::shift::{Shift, ShiftWithWorker};
use crate::service::{directory, token};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

const SHIFT_COLUMNS: &str = "id, worker_id, date, shift_start, shift_end, token, is_active";

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateShift {
    #[schema(example = 7)]
    pub worker_id: i64,
    #[schema(example = "2024-06-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "2024-06-01T08:00:00", value_type = String, format = "date-time")]
    pub shift_start: NaiveDateTime,
    #[schema(example = "2024-06-01T16:00:00", value_type = String, format = "date-time")]
    pub shift_end: NaiveDateTime,
}

/// Partial update; unset fields keep their current values. The token is not
/// representable here, which is what keeps it immutable.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateShift {
    pub worker_id: Option<i64>,
    #[schema(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub shift_start: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub shift_end: Option<NaiveDateTime>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ShiftFilter {
    /// Matches the shift's calendar date, irrespective of time of day.
    #[param(example = "2024-06-01")]
    pub date: Option<NaiveDate>,
    pub worker_id: Option<i64>,
}

// Bindable values for the dynamically built UPDATE statement.
enum Bind {
    I64(i64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Bool(bool),
}

pub async fn get_shift(pool: &SqlitePool, shift_id: i64) -> Result<Shift> {
    let sql = format!("SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?");
    sqlx::query_as::<_, Shift>(&sql)
        .bind(shift_id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::NotFound("Shift"))
}

pub async fn create_shift(pool: &SqlitePool, req: &CreateShift) -> Result<Shift> {
    if req.shift_start >= req.shift_end {
        return Err(Error::InvalidRange(
            "shift_start must be before shift_end".into(),
        ));
    }

    let worker = directory::require_active_worker(pool, req.worker_id).await?;
    let token = token::mint();

    let res = sqlx::query(
        "INSERT INTO shifts (worker_id, date, shift_start, shift_end, token) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(worker.id)
    .bind(req.date)
    .bind(req.shift_start)
    .bind(req.shift_end)
    .bind(&token)
    .execute(pool)
    .await?;

    let shift_id = res.last_insert_rowid();
    info!(shift_id, worker_id = worker.id, date = %req.date, "shift created");

    get_shift(pool, shift_id).await
}

pub async fn update_shift(pool: &SqlitePool, shift_id: i64, upd: &UpdateShift) -> Result<Shift> {
    let current = get_shift(pool, shift_id).await?;

    // The start < end invariant must hold for the merged result, not just
    // for whichever fields the caller happened to send.
    let effective_start = upd.shift_start.unwrap_or(current.shift_start);
    let effective_end = upd.shift_end.unwrap_or(current.shift_end);
    if effective_start >= effective_end {
        return Err(Error::InvalidRange(
            "shift_start must be before shift_end".into(),
        ));
    }

    let mut sets: Vec<&str> = Vec::new();
    let mut binds: Vec<Bind> = Vec::new();

    if let Some(worker_id) = upd.worker_id {
        directory::require_active_worker(pool, worker_id).await?;
        sets.push("worker_id = ?");
        binds.push(Bind::I64(worker_id));
    }
    if let Some(date) = upd.date {
        sets.push("date = ?");
        binds.push(Bind::Date(date));
    }
    if let Some(start) = upd.shift_start {
        sets.push("shift_start = ?");
        binds.push(Bind::DateTime(start));
    }
    if let Some(end) = upd.shift_end {
        sets.push("shift_end = ?");
        binds.push(Bind::DateTime(end));
    }
    if let Some(active) = upd.is_active {
        sets.push("is_active = ?");
        binds.push(Bind::Bool(active));
    }

    if sets.is_empty() {
        return Err(Error::InvalidInput("No fields provided for update".into()));
    }

    let sql = format!("UPDATE shifts SET {} WHERE id = ?", sets.join(", "));
    let mut query = sqlx::query(&sql);
    for bind in binds {
        query = match bind {
            Bind::I64(v) => query.bind(v),
            Bind::Date(v) => query.bind(v),
            Bind::DateTime(v) => query.bind(v),
            Bind::Bool(v) => query.bind(v),
        };
    }
    query.bind(shift_id).execute(pool).await?;

    get_shift(pool, shift_id).await
}

/// The safe default for shifts with history: keeps every attendance record,
/// rejects new check-ins immediately.
pub async fn deactivate_shift(pool: &SqlitePool, shift_id: i64) -> Result<Shift> {
    let res = sqlx::query("UPDATE shifts SET is_active = 0 WHERE id = ?")
        .bind(shift_id)
        .execute(pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(Error::NotFound("Shift"));
    }
    info!(shift_id, "shift deactivated");
    get_shift(pool, shift_id).await
}

/// Hard delete, permitted only while no attendance record references the
/// shift. History-bearing shifts must be deactivated instead.
pub async fn delete_shift(pool: &SqlitePool, shift_id: i64) -> Result<()> {
    let has_history: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM attendance WHERE shift_id = ?)")
            .bind(shift_id)
            .fetch_one(pool)
            .await?;
    if has_history {
        return Err(Error::Conflict(
            "Shift has attendance records; deactivate it instead of deleting".into(),
        ));
    }

    let res = sqlx::query("DELETE FROM shifts WHERE id = ?")
        .bind(shift_id)
        .execute(pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(Error::NotFound("Shift"));
    }
    info!(shift_id, "shift deleted");
    Ok(())
}

pub async fn list_shifts(pool: &SqlitePool, filter: &ShiftFilter) -> Result<Vec<ShiftWithWorker>> {
    let mut conditions: Vec<&str> = Vec::new();
    let mut binds: Vec<Bind> = Vec::new();

    if let Some(date) = filter.date {
        conditions.push("s.date = ?");
        binds.push(Bind::Date(date));
    }
    if let Some(worker_id) = filter.worker_id {
        conditions.push("s.worker_id = ?");
        binds.push(Bind::I64(worker_id));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT s.id, s.worker_id, s.date, s.shift_start, s.shift_end, s.token, s.is_active, \
                u.name AS worker_name, u.email AS worker_email \
         FROM shifts s \
         JOIN users u ON u.id = s.worker_id \
         {where_clause} \
         ORDER BY s.id"
    );

    let mut query = sqlx::query_as::<_, ShiftWithWorker>(&sql);
    for bind in binds {
        query = match bind {
            Bind::I64(v) => query.bind(v),
            Bind::Date(v) => query.bind(v),
            Bind::DateTime(v) => query.bind(v),
            Bind::Bool(v) => query.bind(v),
        };
    }

    Ok(query.fetch_all(pool).await?)
}

/// Active shifts scheduled for `date`, with worker contact details; feeds the
/// daily reminder job.
pub async fn active_shifts_on(pool: &SqlitePool, date: NaiveDate) -> Result<Vec<ShiftWithWorker>> {
    Ok(sqlx::query_as::<_, ShiftWithWorker>(
        "SELECT s.id, s.worker_id, s.date, s.shift_start, s.shift_end, s.token, s.is_active, \
                u.name AS worker_name, u.email AS worker_email \
         FROM shifts s \
         JOIN users u ON u.id = s.worker_id \
         WHERE s.date = ? AND s.is_active = 1 \
         ORDER BY s.shift_start, s.id",
    )
    .bind(date)
    .fetch_all(pool)
    .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{self, d, dt};

    #[actix_web::test]
    async fn create_shift_mints_unique_token() {
        let pool = test_util::pool().await;
        let worker = test_util::seed_worker(&pool, "W1", "w1@co").await;

        let shift = create_shift(
            &pool,
            &CreateShift {
                worker_id: worker,
                date: d("2024-06-01"),
                shift_start: dt("2024-06-01 08:00:00"),
                shift_end: dt("2024-06-01 16:00:00"),
            },
        )
        .await
        .unwrap();

        assert_eq!(shift.worker_id, worker);
        assert_eq!(shift.token.len(), 64);
        assert!(shift.is_active);

        let other = create_shift(
            &pool,
            &CreateShift {
                worker_id: worker,
                date: d("2024-06-02"),
                shift_start: dt("2024-06-02 08:00:00"),
                shift_end: dt("2024-06-02 16:00:00"),
            },
        )
        .await
        .unwrap();
        assert_ne!(shift.token, other.token);
    }

    #[actix_web::test]
    async fn create_shift_rejects_bad_range_and_bad_worker() {
        let pool = test_util::pool().await;
        let worker = test_util::seed_worker(&pool, "W1", "w1@co").await;
        let admin = test_util::seed_admin(&pool, "A", "a@co").await;

        let err = create_shift(
            &pool,
            &CreateShift {
                worker_id: worker,
                date: d("2024-06-01"),
                shift_start: dt("2024-06-01 16:00:00"),
                shift_end: dt("2024-06-01 08:00:00"),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidRange(_)));

        let err = create_shift(
            &pool,
            &CreateShift {
                worker_id: admin,
                date: d("2024-06-01"),
                shift_start: dt("2024-06-01 08:00:00"),
                shift_end: dt("2024-06-01 16:00:00"),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidReference(_)));
    }

    #[actix_web::test]
    async fn update_changing_date_keeps_token_and_worker() {
        let pool = test_util::pool().await;
        let worker = test_util::seed_worker(&pool, "W1", "w1@co").await;
        let shift = test_util::seed_shift(&pool, worker, "2024-06-01").await;

        let updated = update_shift(
            &pool,
            shift.id,
            &UpdateShift {
                date: Some(d("2024-06-03")),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.date, d("2024-06-03"));
        assert_eq!(updated.token, shift.token);
        assert_eq!(updated.worker_id, shift.worker_id);
    }

    #[actix_web::test]
    async fn update_validates_merged_range() {
        let pool = test_util::pool().await;
        let worker = test_util::seed_worker(&pool, "W1", "w1@co").await;
        let shift = test_util::seed_shift(&pool, worker, "2024-06-01").await;

        // moving only the start past the current end must fail
        let err = update_shift(
            &pool,
            shift.id,
            &UpdateShift {
                shift_start: Some(dt("2024-06-01 17:00:00")),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidRange(_)));

        let err = update_shift(&pool, shift.id, &UpdateShift::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        assert!(matches!(
            update_shift(
                &pool,
                9999,
                &UpdateShift {
                    date: Some(d("2024-06-03")),
                    ..Default::default()
                }
            )
            .await,
            Err(Error::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn delete_refuses_shifts_with_history() {
        let pool = test_util::pool().await;
        let worker = test_util::seed_worker(&pool, "W1", "w1@co").await;
        let bare = test_util::seed_shift(&pool, worker, "2024-06-01").await;
        let attended = test_util::seed_shift(&pool, worker, "2024-06-02").await;
        test_util::seed_attendance(&pool, attended.id, worker, "2024-06-02 08:05:00").await;

        delete_shift(&pool, bare.id).await.unwrap();
        assert!(matches!(get_shift(&pool, bare.id).await, Err(Error::NotFound(_))));

        let err = delete_shift(&pool, attended.id).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert!(get_shift(&pool, attended.id).await.is_ok());

        let off = deactivate_shift(&pool, attended.id).await.unwrap();
        assert!(!off.is_active);
    }

    #[actix_web::test]
    async fn list_filters_by_date_and_worker() {
        let pool = test_util::pool().await;
        let w1 = test_util::seed_worker(&pool, "W1", "w1@co").await;
        let w2 = test_util::seed_worker(&pool, "W2", "w2@co").await;
        test_util::seed_shift(&pool, w1, "2024-06-01").await;
        test_util::seed_shift(&pool, w1, "2024-06-02").await;
        test_util::seed_shift(&pool, w2, "2024-06-01").await;

        let all = list_shifts(&pool, &ShiftFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let on_first = list_shifts(
            &pool,
            &ShiftFilter {
                date: Some(d("2024-06-01")),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(on_first.len(), 2);

        let w2_only = list_shifts(
            &pool,
            &ShiftFilter {
                worker_id: Some(w2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(w2_only.len(), 1);
        assert_eq!(w2_only[0].worker_name, "W2");
    }
}
