//! Two timer-driven jobs: the morning check-in reminder and the monthly
//! attendance report. Job bodies take an explicit date so tests (and manual
//! replays) can run them for any day without touching the timers. Delivery
//! failures are isolated per recipient and never escape the job.

use crate::clock::{self, Clock};
use crate::error::Result;
use crate::service::notify::{Note, Notifier};
use crate::service::registry;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use sqlx::SqlitePool;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Reminds every worker with an active shift today to check in. Returns how
/// many workers were reached by at least the push leg.
pub async fn send_daily_reminders(
    pool: &SqlitePool,
    notifier: &dyn Notifier,
    today: NaiveDate,
) -> Result<u32> {
    let shifts = registry::active_shifts_on(pool, today).await?;

    let mut sent = 0;
    for shift in &shifts {
        let start = shift.shift_start.format("%H:%M");
        let note = Note {
            title: "Reminder: Check-In Today".into(),
            body: format!("Don't forget to check in for your shift at {start}"),
        };

        match notifier.deliver(shift.worker_id, &note).await {
            Ok(()) => sent += 1,
            Err(e) => {
                warn!(worker_id = shift.worker_id, error = %e, "reminder push failed");
            }
        }

        let html = format!(
            "Hi {},<br><br>Don't forget to check in for your shift at {start}.<br><br>Thank you!",
            shift.worker_name
        );
        if let Err(e) = notifier
            .send_email(&shift.worker_email, "Reminder: Check-In Today", &html)
            .await
        {
            warn!(worker_id = shift.worker_id, error = %e, "reminder email failed");
        }
    }

    info!(shifts = shifts.len(), sent, %today, "check-in reminders processed");
    Ok(sent)
}

#[derive(Debug, sqlx::FromRow)]
pub struct ReportRow {
    pub worker_name: String,
    pub worker_email: String,
    pub check_ins: i64,
}

/// Compiles last month's per-worker check-in counts and emails the table to
/// every active administrator. Intentionally a raw count, not the
/// present/late/absent roll-up the dashboard uses; the two views answer
/// different questions. Returns how many admins received it.
pub async fn send_monthly_report(
    pool: &SqlitePool,
    notifier: &dyn Notifier,
    today: NaiveDate,
) -> Result<u32> {
    let admins = crate::service::directory::list_active_admins(pool).await?;
    if admins.is_empty() {
        info!("monthly report skipped: no active admins");
        return Ok(0);
    }

    let first_this_month = clock::first_of_month(today);
    let first_last_month = clock::first_of_month(first_this_month - Duration::days(1));
    let (window_start, _) = clock::day_bounds(first_last_month);
    let (window_end, _) = clock::day_bounds(first_this_month);

    let rows = sqlx::query_as::<_, ReportRow>(
        "SELECT u.name AS worker_name, u.email AS worker_email, COUNT(a.id) AS check_ins \
         FROM attendance a \
         JOIN users u ON u.id = a.worker_id \
         WHERE a.check_in >= ? AND a.check_in < ? \
         GROUP BY u.id, u.name, u.email \
         ORDER BY check_ins DESC, u.name",
    )
    .bind(window_start)
    .bind(window_end)
    .fetch_all(pool)
    .await?;

    let html = render_report(first_last_month, first_this_month, &rows);

    let mut sent = 0;
    for admin in &admins {
        match notifier
            .send_email(&admin.email, "Monthly Attendance Report", &html)
            .await
        {
            Ok(()) => sent += 1,
            Err(e) => {
                warn!(admin_id = admin.id, error = %e, "monthly report email failed");
            }
        }
    }

    info!(workers = rows.len(), sent, "monthly attendance report processed");
    Ok(sent)
}

/// HTML table covering `[period_start, period_end)`.
pub fn render_report(period_start: NaiveDate, period_end: NaiveDate, rows: &[ReportRow]) -> String {
    let last_day = period_end - Duration::days(1);
    let mut html = format!(
        "<h1>Monthly Attendance Report</h1>\
         <p>Period: {period_start} to {last_day}</p>\
         <table border=\"1\" cellpadding=\"5\" cellspacing=\"0\">\
         <thead><tr><th>Worker</th><th>Email</th><th>Days Attended</th></tr></thead>\
         <tbody>"
    );
    for row in rows {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.worker_name, row.worker_email, row.check_ins
        );
    }
    html.push_str("</tbody></table>");
    html
}

/// Next daily fire time strictly after `now`.
pub fn next_daily(now: NaiveDateTime, hour: u32) -> NaiveDateTime {
    let today_target = now.date().and_hms_opt(hour, 0, 0).unwrap();
    if now < today_target {
        today_target
    } else {
        today_target + Duration::days(1)
    }
}

/// Next monthly fire time strictly after `now` for the given day-of-month.
pub fn next_monthly(now: NaiveDateTime, day: u32, hour: u32) -> NaiveDateTime {
    let mut year = now.year();
    let mut month = now.month();
    loop {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            let target = date.and_hms_opt(hour, 0, 0).unwrap();
            if target > now {
                return target;
            }
        }
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
}

/// Spawns both jobs on the arbiter. Each loop sleeps until its next local
/// fire time, runs once, and recomputes; a failed run is logged and the loop
/// keeps going.
pub fn spawn(
    pool: SqlitePool,
    notifier: Arc<dyn Notifier>,
    clock: Clock,
    reminder_hour: u32,
    report_day: u32,
    report_hour: u32,
) {
    info!(reminder_hour, report_day, report_hour, "starting scheduled jobs");

    {
        let pool = pool.clone();
        let notifier = notifier.clone();
        actix_web::rt::spawn(async move {
            loop {
                sleep_until(clock, next_daily(clock.now(), reminder_hour)).await;
                let today = clock.today();
                if let Err(e) = send_daily_reminders(&pool, notifier.as_ref(), today).await {
                    error!(error = %e, "daily reminder job failed");
                }
            }
        });
    }

    actix_web::rt::spawn(async move {
        loop {
            sleep_until(clock, next_monthly(clock.now(), report_day, report_hour)).await;
            let today = clock.today();
            if let Err(e) = send_monthly_report(&pool, notifier.as_ref(), today).await {
                error!(error = %e, "monthly report job failed");
            }
        }
    });
}

async fn sleep_until(clock: Clock, target: NaiveDateTime) {
    let wait = (target - clock.now()).to_std().unwrap_or_default();
    actix_web::rt::time::sleep(wait).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{self, RecordingNotifier, d, dt};

    #[test]
    fn next_daily_rolls_past_todays_trigger() {
        assert_eq!(
            next_daily(dt("2024-06-01 07:59:00"), 8),
            dt("2024-06-01 08:00:00")
        );
        assert_eq!(
            next_daily(dt("2024-06-01 08:00:00"), 8),
            dt("2024-06-02 08:00:00")
        );
    }

    #[test]
    fn next_monthly_picks_the_coming_first() {
        assert_eq!(
            next_monthly(dt("2024-06-15 10:00:00"), 1, 9),
            dt("2024-07-01 09:00:00")
        );
        assert_eq!(
            next_monthly(dt("2024-12-15 10:00:00"), 1, 9),
            dt("2025-01-01 09:00:00")
        );
        assert_eq!(
            next_monthly(dt("2024-06-01 08:00:00"), 1, 9),
            dt("2024-06-01 09:00:00")
        );
    }

    #[actix_web::test]
    async fn reminders_cover_todays_active_shifts_only() {
        let pool = test_util::pool().await;
        let notifier = RecordingNotifier::default();
        let w1 = test_util::seed_worker(&pool, "W1", "w1@co").await;
        let w2 = test_util::seed_worker(&pool, "W2", "w2@co").await;
        let w3 = test_util::seed_worker(&pool, "W3", "w3@co").await;

        test_util::seed_shift(&pool, w1, "2024-06-01").await;
        test_util::seed_shift(&pool, w2, "2024-06-01").await;
        test_util::seed_shift(&pool, w3, "2024-06-02").await; // not today
        let off = test_util::seed_shift(&pool, w3, "2024-06-01").await;
        sqlx::query("UPDATE shifts SET is_active = 0 WHERE id = ?")
            .bind(off.id)
            .execute(&pool)
            .await
            .unwrap();

        let sent = send_daily_reminders(&pool, &notifier, d("2024-06-01"))
            .await
            .unwrap();
        assert_eq!(sent, 2);

        let pushes = notifier.pushes.lock().unwrap();
        assert_eq!(pushes.len(), 2);
        assert!(pushes[0].1.body.contains("08:00"));

        let emails = notifier.emails.lock().unwrap();
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].0, "w1@co");
    }

    #[actix_web::test]
    async fn reminder_failure_for_one_worker_does_not_block_the_next() {
        let pool = test_util::pool().await;
        let w1 = test_util::seed_worker(&pool, "W1", "w1@co").await;
        let w2 = test_util::seed_worker(&pool, "W2", "w2@co").await;
        test_util::seed_shift(&pool, w1, "2024-06-01").await;
        test_util::seed_shift(&pool, w2, "2024-06-01").await;

        let notifier = RecordingNotifier::failing_for_user(w1);
        let sent = send_daily_reminders(&pool, &notifier, d("2024-06-01"))
            .await
            .unwrap();
        assert_eq!(sent, 1);
        assert_eq!(notifier.pushes.lock().unwrap()[0].0, w2);
        // both email legs still went out
        assert_eq!(notifier.emails.lock().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn monthly_report_counts_last_month_and_reaches_every_admin() {
        let pool = test_util::pool().await;
        let notifier = RecordingNotifier::default();
        let worker = test_util::seed_worker(&pool, "W1", "w1@co").await;
        test_util::seed_admin(&pool, "A1", "a1@co").await;
        test_util::seed_admin(&pool, "A2", "a2@co").await;

        // two check-ins in May, one in June; report run in June covers May
        for (date, at) in [
            ("2024-05-10", "2024-05-10 08:00:00"),
            ("2024-05-11", "2024-05-11 08:00:00"),
            ("2024-06-01", "2024-06-01 08:00:00"),
        ] {
            let shift = test_util::seed_shift(&pool, worker, date).await;
            test_util::seed_attendance(&pool, shift.id, worker, at).await;
        }

        let sent = send_monthly_report(&pool, &notifier, d("2024-06-01"))
            .await
            .unwrap();
        assert_eq!(sent, 2);

        let emails = notifier.emails.lock().unwrap();
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].1, "Monthly Attendance Report");
        assert!(emails[0].2.contains("<td>W1</td>"));
        assert!(emails[0].2.contains("<td>2</td>"));
        assert!(emails[0].2.contains("2024-05-01"));
        assert!(emails[0].2.contains("2024-05-31"));
    }

    #[actix_web::test]
    async fn monthly_report_without_admins_sends_nothing() {
        let pool = test_util::pool().await;
        let notifier = RecordingNotifier::default();
        test_util::seed_worker(&pool, "W1", "w1@co").await;

        let sent = send_monthly_report(&pool, &notifier, d("2024-06-01"))
            .await
            .unwrap();
        assert_eq!(sent, 0);
        assert!(notifier.emails.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn monthly_report_failure_for_one_admin_does_not_block_the_next() {
        let pool = test_util::pool().await;
        let worker = test_util::seed_worker(&pool, "W1", "w1@co").await;
        test_util::seed_admin(&pool, "A1", "a1@co").await;
        test_util::seed_admin(&pool, "A2", "a2@co").await;
        let shift = test_util::seed_shift(&pool, worker, "2024-05-10").await;
        test_util::seed_attendance(&pool, shift.id, worker, "2024-05-10 08:00:00").await;

        let notifier = RecordingNotifier::failing_for_email("a1@co");
        let sent = send_monthly_report(&pool, &notifier, d("2024-06-01"))
            .await
            .unwrap();
        assert_eq!(sent, 1);
        assert_eq!(notifier.emails.lock().unwrap()[0].0, "a2@co");
    }
}
