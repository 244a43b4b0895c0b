use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Schema applied at startup. The UNIQUE constraints on `shifts.token` and
/// `attendance.shift_id` are correctness requirements, not optimizations:
/// the token is the check-in credential, and the shift_id uniqueness is the
/// final arbiter for concurrent check-in attempts against the same shift.
const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        email       TEXT NOT NULL UNIQUE,
        password    TEXT NOT NULL,
        role        TEXT NOT NULL DEFAULT 'worker' CHECK (role IN ('admin', 'worker')),
        is_active   INTEGER NOT NULL DEFAULT 1,
        fcm_token   TEXT,
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS shifts (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        worker_id   INTEGER NOT NULL REFERENCES users(id),
        date        TEXT NOT NULL,
        shift_start TEXT NOT NULL,
        shift_end   TEXT NOT NULL,
        token       TEXT NOT NULL UNIQUE,
        is_active   INTEGER NOT NULL DEFAULT 1,
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendance (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        shift_id    INTEGER NOT NULL UNIQUE REFERENCES shifts(id),
        worker_id   INTEGER NOT NULL REFERENCES users(id),
        check_in    TEXT NOT NULL,
        check_out   TEXT,
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS notifications (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id     INTEGER NOT NULL REFERENCES users(id),
        title       TEXT NOT NULL,
        body        TEXT NOT NULL,
        is_read     INTEGER NOT NULL DEFAULT 0,
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS refresh_tokens (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id     INTEGER NOT NULL REFERENCES users(id),
        jti         TEXT NOT NULL UNIQUE,
        expires_at  INTEGER NOT NULL,
        revoked     INTEGER NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_shifts_date ON shifts(date)",
    "CREATE INDEX IF NOT EXISTS idx_shifts_worker ON shifts(worker_id)",
    "CREATE INDEX IF NOT EXISTS idx_attendance_check_in ON attendance(check_in)",
    "CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id)",
];

pub async fn init_db(database_url: &str, max_connections: u32) -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .expect("Failed to connect to database");

    migrate(&pool).await.expect("Failed to run migrations");
    pool
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for stmt in MIGRATIONS {
        sqlx::query(stmt).execute(pool).await?;
    }
    Ok(())
}
