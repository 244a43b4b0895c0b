//! Shared fixtures for the service tests: in-memory database, seeded
//! accounts/shifts, and a notifier that records instead of delivering.

use crate::db;
use crate::model::shift::Shift;
use crate::service::notify::{DeliveryError, Note, Notifier};
use crate::service::token;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::sync::Mutex;

/// Fresh in-memory database. A single connection keeps every query in the
/// test on the same database file.
pub async fn pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::migrate(&pool).await.unwrap();
    pool
}

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

async fn seed_user(pool: &SqlitePool, name: &str, email: &str, role: &str) -> i64 {
    sqlx::query("INSERT INTO users (name, email, password, role) VALUES (?, ?, 'x', ?)")
        .bind(name)
        .bind(email)
        .bind(role)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

pub async fn seed_worker(pool: &SqlitePool, name: &str, email: &str) -> i64 {
    seed_user(pool, name, email, "worker").await
}

pub async fn seed_admin(pool: &SqlitePool, name: &str, email: &str) -> i64 {
    seed_user(pool, name, email, "admin").await
}

/// Active 08:00-16:00 shift on `date` with a freshly minted token.
pub async fn seed_shift(pool: &SqlitePool, worker_id: i64, date: &str) -> Shift {
    let day = d(date);
    let tok = token::mint();
    let id = sqlx::query(
        "INSERT INTO shifts (worker_id, date, shift_start, shift_end, token) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(worker_id)
    .bind(day)
    .bind(dt(&format!("{date} 08:00:00")))
    .bind(dt(&format!("{date} 16:00:00")))
    .bind(&tok)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid();

    sqlx::query_as::<_, Shift>(
        "SELECT id, worker_id, date, shift_start, shift_end, token, is_active FROM shifts WHERE id = ?",
    )
    .bind(id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn seed_attendance(pool: &SqlitePool, shift_id: i64, worker_id: i64, at: &str) -> i64 {
    sqlx::query("INSERT INTO attendance (shift_id, worker_id, check_in) VALUES (?, ?, ?)")
        .bind(shift_id)
        .bind(worker_id)
        .bind(dt(at))
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

/// Notifier test double: records every push and email, and can be told to
/// fail for one recipient to exercise per-recipient isolation.
#[derive(Default)]
pub struct RecordingNotifier {
    pub pushes: Mutex<Vec<(i64, Note)>>,
    pub emails: Mutex<Vec<(String, String, String)>>,
    fail_user: Option<i64>,
    fail_email: Option<String>,
}

impl RecordingNotifier {
    pub fn failing_for_user(user_id: i64) -> Self {
        Self {
            fail_user: Some(user_id),
            ..Default::default()
        }
    }

    pub fn failing_for_email(email: &str) -> Self {
        Self {
            fail_email: Some(email.to_string()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, user_id: i64, note: &Note) -> Result<(), DeliveryError> {
        if self.fail_user == Some(user_id) {
            return Err(DeliveryError::Transport("push rejected".into()));
        }
        self.pushes.lock().unwrap().push((user_id, note.clone()));
        Ok(())
    }

    async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<(), DeliveryError> {
        if self.fail_email.as_deref() == Some(to) {
            return Err(DeliveryError::Transport("smtp rejected".into()));
        }
        self.emails
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), html.to_string()));
        Ok(())
    }
}
