use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

/// Error taxonomy shared by the HTTP and socket facades.
///
/// Every core component returns one of these kinds; controllers and the
/// socket command dispatcher translate them into the wire format without
/// knowing which component produced them.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("unauthenticated")]
    Unauthenticated(String),

    #[error("forbidden")]
    Forbidden(String),

    #[error("not found")]
    NotFound(String),

    #[error("conflict")]
    Conflict(String),

    #[error("validation failed")]
    Validation {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("storage unavailable")]
    StorageUnavailable(String),

    #[error("internal error")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn validation_with_details(message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Validation {
            message: message.into(),
            details: Some(details),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::StorageUnavailable(msg)
            | AppError::Internal(msg) => msg.clone(),
            AppError::Validation { message, .. } => message.clone(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, AppError::Internal(_) | AppError::StorageUnavailable(_)) {
            tracing::error!(error = %self, "request failed with a server-side error");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }

        let status = self.status();
        let details = match &self {
            AppError::Validation { details, .. } => details.clone(),
            _ => None,
        };

        (status, Json(ErrorBody { error: self.message(), details })).into_response()
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        match &err {
            sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_) => {
                AppError::StorageUnavailable(err.to_string())
            }
            sea_orm::DbErr::RecordNotFound(msg) => AppError::NotFound(msg.clone()),
            sea_orm::DbErr::Exec(runtime_err) | sea_orm::DbErr::Query(runtime_err) => {
                let text = runtime_err.to_string();
                if text.contains("unique") || text.contains("duplicate") {
                    AppError::Conflict(text)
                } else {
                    AppError::Internal(text)
                }
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Unauthenticated(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("password hashing failed: {err}"))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::validation_with_details("invalid request payload", json!(err.into_errors()))
    }
}

pub type AppResult<T> = Result<T, AppError>;
