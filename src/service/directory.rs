//! Account lookups consumed by the core components. The users table is
//! treated as directory data; nothing here mutates it.

use crate::error::{Error, Result};
use crate::model::user::User;
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, name, email, password, role, is_active, fcm_token";

/// Resolves `id` to an active worker account, the only kind a shift may be
/// assigned to.
pub async fn require_active_worker(pool: &SqlitePool, id: i64) -> Result<User> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ? AND role = 'worker' AND is_active = 1");
    sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::InvalidReference("Invalid worker ID".into()))
}

pub async fn list_active_admins(pool: &SqlitePool) -> Result<Vec<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE role = 'admin' AND is_active = 1 ORDER BY id");
    Ok(sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util;

    #[actix_web::test]
    async fn require_active_worker_rejects_admins_and_inactive() {
        let pool = test_util::pool().await;
        let admin = test_util::seed_admin(&pool, "Boss", "boss@co").await;
        let worker = test_util::seed_worker(&pool, "W", "w@co").await;
        let idle = test_util::seed_worker(&pool, "Idle", "idle@co").await;
        sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
            .bind(idle)
            .execute(&pool)
            .await
            .unwrap();

        assert!(require_active_worker(&pool, worker).await.is_ok());
        assert!(matches!(
            require_active_worker(&pool, admin).await,
            Err(Error::InvalidReference(_))
        ));
        assert!(matches!(
            require_active_worker(&pool, idle).await,
            Err(Error::InvalidReference(_))
        ));
        assert!(matches!(
            require_active_worker(&pool, 9999).await,
            Err(Error::InvalidReference(_))
        ));
    }

    #[actix_web::test]
    async fn list_active_admins_skips_workers() {
        let pool = test_util::pool().await;
        test_util::seed_worker(&pool, "W", "w@co").await;
        let a1 = test_util::seed_admin(&pool, "A1", "a1@co").await;
        let a2 = test_util::seed_admin(&pool, "A2", "a2@co").await;

        let admins = list_active_admins(&pool).await.unwrap();
        let ids: Vec<i64> = admins.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![a1, a2]);
    }
}
