use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use transit_booking::ReserveError;
use transit_core::IdentityError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    /// Map reservation outcomes onto the HTTP contract. The conflict stays a
    /// distinct variant from validation even though both answer 400.
    pub fn reserve(err: ReserveError) -> Self {
        match err {
            ReserveError::SeatNotFound(_) => {
                AppError::NotFoundError("Seat does not exist".to_string())
            }
            ReserveError::SeatAlreadyBooked(_) => {
                AppError::ConflictError("Seat already booked".to_string())
            }
            ReserveError::Store(err) => AppError::InternalServerError(err.to_string()),
        }
    }

    pub fn identity(err: IdentityError) -> Self {
        match err {
            IdentityError::Validation(msg) => AppError::ValidationError(msg),
            IdentityError::InvalidCredentials => {
                AppError::AuthenticationError("Invalid Credentials".to_string())
            }
            IdentityError::Store(err) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            // The external contract answers identity mismatch with 401.
            AppError::AuthorizationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            // Booking conflicts answer 400, not 409, per the same contract.
            AppError::ConflictError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for AppError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Anyhow(anyhow::Error::from_boxed(err))
    }
}
