//! Attendance ledger: validates token redemption and records the single
//! check-in a shift may ever receive.
//!
//! The duplicate check here is only a fast path for a friendly error. Two
//! requests racing on the same shift both pass it; the UNIQUE constraint on
//! `attendance.shift_id` decides the winner, and the loser surfaces as a
//! Conflict rather than a second record.

use crate::clock;
use crate::error::{Error, Result};
use crate::model::attendance::AttendanceDetail;
use crate::model::user::WorkerSummary;
use crate::service::directory;
use crate::service::notify::{Note, Notifier};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};
use utoipa::ToSchema;

#[derive(Debug, sqlx::FromRow)]
struct ShiftRow {
    id: i64,
    worker_id: i64,
    date: NaiveDate,
    is_active: bool,
}

const DETAIL_SELECT: &str =
    "SELECT a.id, a.shift_id, a.worker_id, a.check_in, \
            u.name AS worker_name, u.email AS worker_email, \
            s.date AS shift_date, s.shift_start, s.shift_end \
     FROM attendance a \
     JOIN users u ON u.id = a.worker_id \
     JOIN shifts s ON s.id = a.shift_id";

/// Redeems `token` for `worker_id` at server time `now`.
///
/// Validation order: token resolves, token belongs to the caller, shift still
/// active, `now` falls on the shift's calendar day. The whole scheduled day
/// is accepted, deliberately wider than the shift's clock hours, so early
/// arrivals and late-running shifts can still check in.
pub async fn check_in(
    pool: &SqlitePool,
    notifier: &dyn Notifier,
    worker_id: i64,
    token: &str,
    now: NaiveDateTime,
) -> Result<AttendanceDetail> {
    let shift = sqlx::query_as::<_, ShiftRow>(
        "SELECT id, worker_id, date, is_active FROM shifts WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?
    .ok_or(Error::InvalidToken)?;

    if shift.worker_id != worker_id {
        warn!(
            worker_id,
            shift_id = shift.id,
            "check-in token presented by a different worker"
        );
        return Err(Error::Forbidden(
            "This check-in token belongs to another worker".into(),
        ));
    }

    if !shift.is_active {
        return Err(Error::InvalidToken);
    }

    if now.date() != shift.date {
        return Err(Error::OutsideShiftDay);
    }

    // Fast path only; see module docs.
    let already: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM attendance WHERE shift_id = ?)")
        .bind(shift.id)
        .fetch_one(pool)
        .await?;
    if already {
        return Err(Error::Conflict("Already checked in for this shift".into()));
    }

    let insert = sqlx::query("INSERT INTO attendance (shift_id, worker_id, check_in) VALUES (?, ?, ?)")
        .bind(shift.id)
        .bind(worker_id)
        .bind(now)
        .execute(pool)
        .await;

    let record_id = match insert {
        Ok(res) => res.last_insert_rowid(),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(Error::Conflict("Already checked in for this shift".into()));
        }
        Err(e) => return Err(e.into()),
    };

    info!(record_id, shift_id = shift.id, worker_id, "check-in recorded");

    let detail = get_detail(pool, record_id).await?;

    // Best-effort fan-out; a notification failure never unwinds the check-in.
    notify_admins(pool, notifier, &detail.worker_name).await;

    Ok(detail)
}

async fn get_detail(pool: &SqlitePool, record_id: i64) -> Result<AttendanceDetail> {
    let sql = format!("{DETAIL_SELECT} WHERE a.id = ?");
    sqlx::query_as::<_, AttendanceDetail>(&sql)
        .bind(record_id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::NotFound("Attendance record"))
}

async fn notify_admins(pool: &SqlitePool, notifier: &dyn Notifier, worker_name: &str) {
    let admins = match directory::list_active_admins(pool).await {
        Ok(admins) => admins,
        Err(e) => {
            warn!(error = %e, "could not list admins for check-in notification");
            return;
        }
    };

    for admin in admins {
        let note = Note {
            title: "Worker Check-In".into(),
            body: format!("{worker_name} has checked in"),
        };
        if let Err(e) = notifier.deliver(admin.id, &note).await {
            warn!(admin_id = admin.id, error = %e, "failed to notify admin of check-in");
        }
    }
}

/// One worker's records, newest check-in first, optionally bounded by an
/// inclusive date range.
pub async fn history(
    pool: &SqlitePool,
    worker_id: i64,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<Vec<AttendanceDetail>> {
    let mut sql = format!("{DETAIL_SELECT} WHERE a.worker_id = ?");
    if start_date.is_some() {
        sql.push_str(" AND a.check_in >= ?");
    }
    if end_date.is_some() {
        sql.push_str(" AND a.check_in < ?");
    }
    sql.push_str(" ORDER BY a.check_in DESC");

    let mut query = sqlx::query_as::<_, AttendanceDetail>(&sql).bind(worker_id);
    if let Some(start) = start_date {
        query = query.bind(clock::day_bounds(start).0);
    }
    if let Some(end) = end_date {
        query = query.bind(clock::day_bounds(end).1);
    }

    Ok(query.fetch_all(pool).await?)
}

/// All check-ins whose timestamp falls on `date`, oldest first.
pub async fn daily(pool: &SqlitePool, date: NaiveDate) -> Result<Vec<AttendanceDetail>> {
    let (start, end) = clock::day_bounds(date);
    let sql = format!("{DETAIL_SELECT} WHERE a.check_in >= ? AND a.check_in < ? ORDER BY a.check_in ASC");
    Ok(sqlx::query_as::<_, AttendanceDetail>(&sql)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkerMonthly {
    pub worker: WorkerSummary,
    pub records: Vec<AttendanceDetail>,
}

/// The month's records grouped by worker. Workers without a check-in in the
/// month simply do not appear; reconstructing their scheduled days is the
/// aggregation engine's job, not the ledger's.
pub async fn monthly(pool: &SqlitePool, year: i32, month: u32) -> Result<Vec<WorkerMonthly>> {
    let (first, next) =
        clock::month_bounds(year, month).ok_or_else(|| Error::InvalidInput("Invalid month".into()))?;
    let (start, _) = clock::day_bounds(first);
    let (end, _) = clock::day_bounds(next);

    let sql = format!("{DETAIL_SELECT} WHERE a.check_in >= ? AND a.check_in < ? ORDER BY a.worker_id, a.check_in");
    let rows = sqlx::query_as::<_, AttendanceDetail>(&sql)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

    let mut grouped: Vec<WorkerMonthly> = Vec::new();
    for row in rows {
        match grouped.last_mut() {
            Some(group) if group.worker.id == row.worker_id => group.records.push(row),
            _ => grouped.push(WorkerMonthly {
                worker: WorkerSummary {
                    id: row.worker_id,
                    name: row.worker_name.clone(),
                    email: row.worker_email.clone(),
                },
                records: vec![row],
            }),
        }
    }
    Ok(grouped)
}
