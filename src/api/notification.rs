use crate::auth::auth::AuthUser;
use crate::error::Error;
use crate::service::notify;
use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::SqlitePool;

/// The caller's in-app notification feed, newest first
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses(
        (status = 200, description = "Notifications for the calling account"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn list(auth: AuthUser, pool: web::Data<SqlitePool>) -> Result<HttpResponse, Error> {
    let feed = notify::list_notifications(pool.get_ref(), auth.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": feed })))
}

/// Mark one of the caller's notifications as read
#[utoipa::path(
    put,
    path = "/api/v1/notifications/{id}/read",
    params(("id", Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked read"),
        (status = 404, description = "Not found or not yours")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn mark_read(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, Error> {
    notify::mark_read(pool.get_ref(), auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Notification marked as read"
    })))
}
