use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Service-level error taxonomy. Handlers return these directly; the
/// `ResponseError` impl below maps them onto the JSON envelope
/// (`status: "fail"` for caller mistakes, `status: "error"` for ours).
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing request fields.
    #[error("{0}")]
    InvalidInput(String),

    /// A supplied id does not resolve to a usable account or row.
    #[error("{0}")]
    InvalidReference(String),

    /// shift_start must come strictly before shift_end.
    #[error("{0}")]
    InvalidRange(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unknown token, or a token whose shift was deactivated. Both cases
    /// intentionally share one message so callers cannot probe for live tokens.
    #[error("Invalid check-in token or schedule not found")]
    InvalidToken,

    /// Token presented outside the calendar day of its shift.
    #[error("Check-in is only accepted on the scheduled day")]
    OutsideShiftDay,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl actix_web::ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_)
            | Error::InvalidReference(_)
            | Error::InvalidRange(_)
            | Error::InvalidToken
            | Error::OutsideShiftDay => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            // Full detail stays in the log; the caller gets a generic message.
            tracing::error!(error = %self, "request failed");
            return HttpResponse::build(status).json(json!({
                "status": "error",
                "message": "Internal Server Error"
            }));
        }
        if matches!(self, Error::Forbidden(_)) {
            tracing::warn!(error = %self, "forbidden request");
        }
        HttpResponse::build(status).json(json!({
            "status": "fail",
            "message": self.to_string()
        }))
    }
}
