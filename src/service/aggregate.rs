//! Attendance classification and the report/dashboard views built from the
//! registry and the ledger together. Computational edge cases (no shifts, no
//! records) come back as defined zero/empty results, never as errors.

use crate::clock;
use crate::error::{Error, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Grace period after shift start before a check-in counts as late.
pub const LATE_GRACE_MINUTES: i64 = 15;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Present,
    Late,
    Absent,
}

/// Exactly one status per shift: no check-in is absent, a check-in more than
/// the grace period past shift start is late, anything else (including a
/// shift with no defined start) is present.
pub fn classify(check_in: Option<NaiveDateTime>, shift_start: Option<NaiveDateTime>) -> Status {
    match (check_in, shift_start) {
        (None, _) => Status::Absent,
        (Some(_), None) => Status::Present,
        (Some(at), Some(start)) => {
            if at - start > Duration::minutes(LATE_GRACE_MINUTES) {
                Status::Late
            } else {
                Status::Present
            }
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatusRow {
    shift_id: i64,
    worker_id: i64,
    worker_name: String,
    shift_start: Option<NaiveDateTime>,
    check_in: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyStatus {
    pub shift_id: i64,
    pub worker_id: i64,
    pub worker_name: String,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub shift_start: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_in: Option<NaiveDateTime>,
    pub status: Status,
}

/// Per-shift status for every shift scheduled on `date`. Built from the shift
/// side so shifts nobody redeemed show up as absent.
pub async fn daily_status(pool: &SqlitePool, date: NaiveDate) -> Result<Vec<DailyStatus>> {
    let rows = sqlx::query_as::<_, StatusRow>(
        "SELECT s.id AS shift_id, s.worker_id, u.name AS worker_name, \
                s.shift_start, a.check_in \
         FROM shifts s \
         JOIN users u ON u.id = s.worker_id \
         LEFT JOIN attendance a ON a.shift_id = s.id \
         WHERE s.date = ? \
         ORDER BY s.shift_start, s.id",
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| DailyStatus {
            status: classify(row.check_in, row.shift_start),
            shift_id: row.shift_id,
            worker_id: row.worker_id,
            worker_name: row.worker_name,
            shift_start: row.shift_start,
            check_in: row.check_in,
        })
        .collect())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkerMonthlySummary {
    pub worker_id: i64,
    pub worker_name: String,
    pub scheduled_days: u32,
    pub present: u32,
    pub late: u32,
    pub absent: u32,
    /// Percentage of scheduled shifts attended on time, rounded; 0 when
    /// nothing was scheduled.
    #[schema(example = 87)]
    pub attendance_rate: u32,
}

/// Per-worker roll-up for one month. Every active worker appears, including
/// those with nothing scheduled (rate 0), since admins read this as a roster.
pub async fn monthly_summary(
    pool: &SqlitePool,
    year: i32,
    month: u32,
) -> Result<Vec<WorkerMonthlySummary>> {
    let (first, next) =
        clock::month_bounds(year, month).ok_or_else(|| Error::InvalidInput("Invalid month".into()))?;

    let workers = sqlx::query_as::<_, (i64, String)>(
        "SELECT id, name FROM users WHERE role = 'worker' AND is_active = 1 ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    let rows = sqlx::query_as::<_, StatusRow>(
        "SELECT s.id AS shift_id, s.worker_id, u.name AS worker_name, \
                s.shift_start, a.check_in \
         FROM shifts s \
         JOIN users u ON u.id = s.worker_id \
         LEFT JOIN attendance a ON a.shift_id = s.id \
         WHERE s.date >= ? AND s.date < ?",
    )
    .bind(first)
    .bind(next)
    .fetch_all(pool)
    .await?;

    #[derive(Default)]
    struct Acc {
        scheduled: u32,
        present: u32,
        late: u32,
        absent: u32,
    }

    let mut per_worker: BTreeMap<i64, Acc> = BTreeMap::new();
    for row in &rows {
        let acc = per_worker.entry(row.worker_id).or_default();
        acc.scheduled += 1;
        match classify(row.check_in, row.shift_start) {
            Status::Present => acc.present += 1,
            Status::Late => acc.late += 1,
            Status::Absent => acc.absent += 1,
        }
    }

    Ok(workers
        .into_iter()
        .map(|(worker_id, worker_name)| {
            let acc = per_worker.remove(&worker_id).unwrap_or_default();
            let rate = if acc.scheduled == 0 {
                0
            } else {
                (acc.present as f64 / acc.scheduled as f64 * 100.0).round() as u32
            };
            WorkerMonthlySummary {
                worker_id,
                worker_name,
                scheduled_days: acc.scheduled,
                present: acc.present,
                late: acc.late,
                absent: acc.absent,
                attendance_rate: rate,
            }
        })
        .collect())
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct Activity {
    pub worker_name: String,
    #[schema(value_type = String, format = "date-time")]
    pub check_in: NaiveDateTime,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSnapshot {
    pub total_active_workers: i64,
    pub today_scheduled: i64,
    pub today_checked_in: i64,
    /// Active shifts today that still have no attendance record.
    pub pending: i64,
    /// The three most recent check-ins system-wide, newest first.
    pub recent_activity: Vec<Activity>,
}

pub async fn dashboard_snapshot(pool: &SqlitePool, now: NaiveDateTime) -> Result<DashboardSnapshot> {
    let today = now.date();
    let (day_start, day_end) = clock::day_bounds(today);

    let total_active_workers: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'worker' AND is_active = 1")
            .fetch_one(pool)
            .await?;

    let today_scheduled: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM shifts WHERE date = ? AND is_active = 1")
            .bind(today)
            .fetch_one(pool)
            .await?;

    let today_checked_in: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE check_in >= ? AND check_in < ?")
            .bind(day_start)
            .bind(day_end)
            .fetch_one(pool)
            .await?;

    let pending: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM shifts s \
         WHERE s.date = ? AND s.is_active = 1 \
           AND NOT EXISTS (SELECT 1 FROM attendance a WHERE a.shift_id = s.id)",
    )
    .bind(today)
    .fetch_one(pool)
    .await?;

    let recent_activity = sqlx::query_as::<_, Activity>(
        "SELECT u.name AS worker_name, a.check_in \
         FROM attendance a \
         JOIN users u ON u.id = a.worker_id \
         ORDER BY a.id DESC LIMIT 3",
    )
    .fetch_all(pool)
    .await?;

    Ok(DashboardSnapshot {
        total_active_workers,
        today_scheduled,
        today_checked_in,
        pending,
        recent_activity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{self, d, dt};

    #[test]
    fn classify_boundaries() {
        let start = Some(dt("2024-06-01 08:00:00"));

        assert_eq!(classify(Some(dt("2024-06-01 08:10:00")), start), Status::Present);
        // exactly on the grace boundary is still present
        assert_eq!(classify(Some(dt("2024-06-01 08:15:00")), start), Status::Present);
        assert_eq!(classify(Some(dt("2024-06-01 08:16:00")), start), Status::Late);
        // early arrival
        assert_eq!(classify(Some(dt("2024-06-01 07:00:00")), start), Status::Present);
        assert_eq!(classify(None, start), Status::Absent);
        assert_eq!(classify(Some(dt("2024-06-01 08:16:00")), None), Status::Present);
    }

    #[actix_web::test]
    async fn daily_status_includes_unredeemed_shifts_as_absent() {
        let pool = test_util::pool().await;
        let w1 = test_util::seed_worker(&pool, "W1", "w1@co").await;
        let w2 = test_util::seed_worker(&pool, "W2", "w2@co").await;
        let s1 = test_util::seed_shift(&pool, w1, "2024-06-01").await;
        test_util::seed_shift(&pool, w2, "2024-06-01").await;
        test_util::seed_attendance(&pool, s1.id, w1, "2024-06-01 08:20:00").await;

        let statuses = daily_status(&pool, d("2024-06-01")).await.unwrap();
        assert_eq!(statuses.len(), 2);
        let of = |id: i64| statuses.iter().find(|s| s.worker_id == id).unwrap();
        assert_eq!(of(w1).status, Status::Late);
        assert_eq!(of(w2).status, Status::Absent);
    }

    #[actix_web::test]
    async fn monthly_summary_counts_and_rate() {
        let pool = test_util::pool().await;
        let w1 = test_util::seed_worker(&pool, "W1", "w1@co").await;
        let w2 = test_util::seed_worker(&pool, "W2", "w2@co").await;

        // w1: 3 scheduled — one on time, one late, one missed
        let s = test_util::seed_shift(&pool, w1, "2024-06-03").await;
        test_util::seed_attendance(&pool, s.id, w1, "2024-06-03 08:05:00").await;
        let s = test_util::seed_shift(&pool, w1, "2024-06-04").await;
        test_util::seed_attendance(&pool, s.id, w1, "2024-06-04 08:30:00").await;
        test_util::seed_shift(&pool, w1, "2024-06-05").await;

        let summary = monthly_summary(&pool, 2024, 6).await.unwrap();
        assert_eq!(summary.len(), 2);

        let row1 = summary.iter().find(|r| r.worker_id == w1).unwrap();
        assert_eq!(row1.scheduled_days, 3);
        assert_eq!(row1.present, 1);
        assert_eq!(row1.late, 1);
        assert_eq!(row1.absent, 1);
        assert_eq!(row1.attendance_rate, 33);

        // w2 has nothing scheduled: defined zeros, no division error
        let row2 = summary.iter().find(|r| r.worker_id == w2).unwrap();
        assert_eq!(row2.scheduled_days, 0);
        assert_eq!(row2.attendance_rate, 0);
    }

    #[actix_web::test]
    async fn dashboard_counts_scheduled_checked_in_and_pending() {
        let pool = test_util::pool().await;
        let now = dt("2024-06-01 12:00:00");

        let mut shifts = Vec::new();
        for i in 0..5 {
            let w = test_util::seed_worker(&pool, &format!("W{i}"), &format!("w{i}@co")).await;
            shifts.push((w, test_util::seed_shift(&pool, w, "2024-06-01").await));
        }
        for (w, s) in shifts.iter().take(3) {
            test_util::seed_attendance(&pool, s.id, *w, "2024-06-01 08:10:00").await;
        }

        let snap = dashboard_snapshot(&pool, now).await.unwrap();
        assert_eq!(snap.total_active_workers, 5);
        assert_eq!(snap.today_scheduled, 5);
        assert_eq!(snap.today_checked_in, 3);
        assert_eq!(snap.pending, 2);
        assert_eq!(snap.recent_activity.len(), 3);
        // newest insert first
        assert_eq!(snap.recent_activity[0].worker_name, "W2");
    }
}
