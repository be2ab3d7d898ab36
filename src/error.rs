use rocket::http::Status;
use rocket::serde::json::Json;
use thiserror::Error;

/// Engine-wide error type. Mirrors the error kinds in spec §7: transport
/// errors are recovered locally and never reach here; what does reach here
/// is store failures and ingest validation failures that the HTTP layer
/// must turn into a structured response.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("store unavailable: {0}")]
    StoreTransient(String),

    #[error("store rejected record: {0}")]
    StoreFatal(String),

    #[error("unknown agent location: {0}")]
    UnauthorizedLocation(String),

    #[error("malformed report: {0}")]
    MalformedReport(String),

    #[error("subdomain not found: {0}")]
    NotFound(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::StoreTransient(_) => "STORE_UNAVAILABLE",
            AppError::StoreFatal(_) => "STORE_ERROR",
            AppError::UnauthorizedLocation(_) => "UNAUTHORIZED_LOCATION",
            AppError::MalformedReport(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
        }
    }

    pub fn status(&self) -> Status {
        match self {
            AppError::StoreTransient(_) => Status::ServiceUnavailable,
            AppError::StoreFatal(_) => Status::InternalServerError,
            AppError::UnauthorizedLocation(_) => Status::Forbidden,
            AppError::MalformedReport(_) => Status::BadRequest,
            AppError::NotFound(_) => Status::NotFound,
        }
    }

    /// Render as the `{"error": ..., "code": ...}` shape every handler in
    /// this crate returns on failure.
    pub fn into_response(self) -> (Status, Json<serde_json::Value>) {
        let status = self.status();
        let code = self.code();
        (status, Json(serde_json::json!({
            "error": self.to_string(),
            "code": code,
        })))
    }
}

pub type AppResult<T> = Result<T, AppError>;
