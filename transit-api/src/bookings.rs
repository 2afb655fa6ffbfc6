use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use transit_booking::BookingDetail;
use uuid::Uuid;

use crate::buses::SeatResponse;
use crate::error::AppError;
use crate::middleware::auth::{bearer_auth_middleware, resolve_caller, Claims};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub seat_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub user: String,
    pub bus: String,
    pub seat: SeatResponse,
    pub booking_time: DateTime<Utc>,
}

impl From<BookingDetail> for BookingResponse {
    fn from(detail: BookingDetail) -> Self {
        BookingResponse {
            id: detail.id,
            user: detail.user,
            bus: detail.bus,
            seat: SeatResponse::from(detail.seat),
            booking_time: detail.booking_time,
        }
    }
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/booking/", post(create_booking))
        .route("/user/{user_id}/bookings/", get(user_bookings))
        .layer(axum::middleware::from_fn_with_state(
            state,
            bearer_auth_middleware,
        ))
}

// ============================================================================
// Handlers
// ============================================================================

async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let caller = resolve_caller(&state, &claims).await?;

    let detail = state
        .reservations
        .reserve(&caller, req.seat_id)
        .await
        .map_err(AppError::reserve)?;

    Ok((StatusCode::CREATED, Json(BookingResponse::from(detail))))
}

async fn user_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let caller = resolve_caller(&state, &claims).await?;
    if caller.id != user_id {
        return Err(AppError::AuthorizationError("Unauthorized".to_string()));
    }

    let bookings = state.reservations.bookings_for_user(user_id).await?;

    Ok(Json(
        bookings.into_iter().map(BookingResponse::from).collect(),
    ))
}
