use crate::auth::auth::AuthUser;
use crate::clock::Clock;
use crate::error::Error;
use crate::service::notify::Notifier;
use crate::service::{aggregate, ledger};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CheckInReq {
    /// Token scanned from the shift's QR code.
    #[schema(example = "9f2c4a...64 hex chars")]
    pub token: String,
}

#[derive(Deserialize, IntoParams)]
pub struct HistoryQuery {
    #[param(example = "2024-06-01")]
    pub start_date: Option<NaiveDate>,
    #[param(example = "2024-06-30")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams)]
pub struct DailyQuery {
    #[param(example = "2024-06-01")]
    pub date: NaiveDate,
}

#[derive(Deserialize, IntoParams)]
pub struct MonthQuery {
    #[param(example = 2024)]
    pub year: i32,
    #[param(example = 6)]
    pub month: u32,
}

/// Redeem a shift token as the calling worker
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    request_body = CheckInReq,
    responses(
        (status = 200, description = "Check-in recorded", body = crate::model::attendance::AttendanceDetail),
        (status = 400, description = "Unknown/inactive token, or outside the scheduled day"),
        (status = 403, description = "Token belongs to another worker"),
        (status = 409, description = "Already checked in for this shift")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    notifier: web::Data<dyn Notifier>,
    clock: web::Data<Clock>,
    payload: web::Json<CheckInReq>,
) -> Result<HttpResponse, Error> {
    auth.require_worker()?;

    let token = payload.token.trim();
    if token.is_empty() {
        return Err(Error::InvalidInput("Token is required".into()));
    }

    // server clock, never caller-supplied time
    let now = clock.now();
    let record = ledger::check_in(pool.get_ref(), notifier.as_ref(), auth.user_id, token, now).await?;

    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": record })))
}

/// The calling worker's own check-in history, newest first
#[utoipa::path(
    get,
    path = "/api/v1/attendance/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Attendance records with shift summaries"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn history(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, Error> {
    let records =
        ledger::history(pool.get_ref(), auth.user_id, query.start_date, query.end_date).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": records })))
}

/// All check-ins on a given date, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/attendance/daily",
    params(DailyQuery),
    responses(
        (status = 200, description = "The day's check-ins across all workers"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn daily(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<DailyQuery>,
) -> Result<HttpResponse, Error> {
    auth.require_admin()?;

    let records = ledger::daily(pool.get_ref(), query.date).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": records })))
}

/// Per-shift present/late/absent status for a given date
#[utoipa::path(
    get,
    path = "/api/v1/attendance/status",
    params(DailyQuery),
    responses(
        (status = 200, description = "Status of every shift scheduled that day"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn daily_status(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<DailyQuery>,
) -> Result<HttpResponse, Error> {
    auth.require_admin()?;

    let statuses = aggregate::daily_status(pool.get_ref(), query.date).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": statuses })))
}

/// A month's records grouped by worker
#[utoipa::path(
    get,
    path = "/api/v1/attendance/monthly",
    params(MonthQuery),
    responses(
        (status = 200, description = "Records grouped by worker"),
        (status = 400, description = "Invalid month"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn monthly(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse, Error> {
    auth.require_admin()?;

    let groups = ledger::monthly(pool.get_ref(), query.year, query.month).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": groups })))
}

/// Per-worker monthly roll-up: scheduled days, present/late/absent, rate
#[utoipa::path(
    get,
    path = "/api/v1/attendance/summary",
    params(MonthQuery),
    responses(
        (status = 200, description = "Roll-up for every active worker"),
        (status = 400, description = "Invalid month"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn monthly_summary(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse, Error> {
    auth.require_admin()?;

    let summary = aggregate::monthly_summary(pool.get_ref(), query.year, query.month).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": summary })))
}
