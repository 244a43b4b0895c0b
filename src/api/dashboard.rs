use crate::auth::auth::AuthUser;
use crate::clock::Clock;
use crate::error::Error;
use crate::service::aggregate;
use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::SqlitePool;

/// Live admin dashboard: headcounts, today's progress, recent check-ins
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats",
    responses(
        (status = 200, description = "Dashboard snapshot", body = crate::service::aggregate::DashboardSnapshot),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn stats(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    clock: web::Data<Clock>,
) -> Result<HttpResponse, Error> {
    auth.require_admin()?;

    let snapshot = aggregate::dashboard_snapshot(pool.get_ref(), clock.now()).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": snapshot })))
}
