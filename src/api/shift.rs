use crate::auth::auth::AuthUser;
use crate::error::Error;
use crate::service::registry::{self, CreateShift, ShiftFilter, UpdateShift};
use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::SqlitePool;

/// Create a shift with a freshly minted check-in token
#[utoipa::path(
    post,
    path = "/api/v1/shifts",
    request_body = CreateShift,
    responses(
        (status = 200, description = "Shift created, token included", body = crate::model::shift::Shift),
        (status = 400, description = "Invalid worker or shift_start >= shift_end"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn create_shift(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateShift>,
) -> Result<HttpResponse, Error> {
    auth.require_admin()?;

    let shift = registry::create_shift(pool.get_ref(), &payload).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": shift })))
}

/// List shifts, optionally filtered by date and/or worker
#[utoipa::path(
    get,
    path = "/api/v1/shifts",
    params(ShiftFilter),
    responses(
        (status = 200, description = "Matching shifts with worker summaries"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn list_shifts(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<ShiftFilter>,
) -> Result<HttpResponse, Error> {
    auth.require_admin()?;

    let shifts = registry::list_shifts(pool.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": shifts })))
}

/// Partially update a shift; the token is never regenerated
#[utoipa::path(
    put,
    path = "/api/v1/shifts/{id}",
    params(("id", Path, description = "Shift ID")),
    request_body = UpdateShift,
    responses(
        (status = 200, description = "Updated shift"),
        (status = 400, description = "Empty update or invalid range"),
        (status = 404, description = "Shift not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn update_shift(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<UpdateShift>,
) -> Result<HttpResponse, Error> {
    auth.require_admin()?;

    let shift = registry::update_shift(pool.get_ref(), path.into_inner(), &payload).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": shift })))
}

/// Deactivate a shift, keeping its attendance history
#[utoipa::path(
    put,
    path = "/api/v1/shifts/{id}/deactivate",
    params(("id", Path, description = "Shift ID")),
    responses(
        (status = 200, description = "Shift deactivated"),
        (status = 404, description = "Shift not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn deactivate_shift(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, Error> {
    auth.require_admin()?;

    let shift = registry::deactivate_shift(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": shift })))
}

/// Delete a shift that has no attendance history
#[utoipa::path(
    delete,
    path = "/api/v1/shifts/{id}",
    params(("id", Path, description = "Shift ID")),
    responses(
        (status = 200, description = "Shift deleted"),
        (status = 404, description = "Shift not found"),
        (status = 409, description = "Shift has attendance records")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn delete_shift(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, Error> {
    auth.require_admin()?;

    registry::delete_shift(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Shift deleted successfully"
    })))
}
