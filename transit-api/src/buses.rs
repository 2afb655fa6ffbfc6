use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use transit_fleet::{Bus, BusUpdate, NewBus, Seat};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateBusRequest {
    pub bus_name: String,
    pub bus_number: String,
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub features: String,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub no_of_seats: i32,
    pub price_amount: i32,
    #[serde(default = "default_currency")]
    pub price_currency: String,
}

/// Full replacement of a bus's editable fields. Seat count is fixed at
/// creation and therefore absent here.
#[derive(Debug, Deserialize)]
pub struct ReplaceBusRequest {
    pub bus_name: String,
    pub bus_number: String,
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub features: String,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub price_amount: i32,
    #[serde(default = "default_currency")]
    pub price_currency: String,
}

fn default_currency() -> String {
    "INR".to_string()
}

#[derive(Debug, Serialize)]
pub struct SeatResponse {
    pub id: Uuid,
    pub seat_number: String,
    pub is_booked: bool,
}

impl From<Seat> for SeatResponse {
    fn from(seat: Seat) -> Self {
        SeatResponse {
            id: seat.id,
            seat_number: seat.seat_number,
            is_booked: seat.is_booked,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BusResponse {
    pub id: Uuid,
    pub bus_name: String,
    pub bus_number: String,
    pub origin: String,
    pub destination: String,
    pub features: String,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub no_of_seats: i32,
    pub price_amount: i32,
    pub price_currency: String,
    pub seats: Vec<SeatResponse>,
}

fn bus_response(bus: Bus, seats: Vec<Seat>) -> BusResponse {
    BusResponse {
        id: bus.id,
        bus_name: bus.bus_name,
        bus_number: bus.bus_number,
        origin: bus.origin,
        destination: bus.destination,
        features: bus.features,
        departure_time: bus.departure_time,
        arrival_time: bus.arrival_time,
        no_of_seats: bus.no_of_seats,
        price_amount: bus.price_amount,
        price_currency: bus.price_currency,
        seats: seats.into_iter().map(SeatResponse::from).collect(),
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/buses/", get(list_buses).post(create_bus))
        .route(
            "/buses/{id}/",
            get(get_bus)
                .put(replace_bus)
                .patch(patch_bus)
                .delete(delete_bus),
        )
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_buses(State(state): State<AppState>) -> Result<Json<Vec<BusResponse>>, AppError> {
    let buses = state.inventory.list_buses().await?;

    let mut out = Vec::with_capacity(buses.len());
    for bus in buses {
        let seats = state.inventory.seats_for_bus(bus.id).await?;
        out.push(bus_response(bus, seats));
    }

    Ok(Json(out))
}

async fn create_bus(
    State(state): State<AppState>,
    Json(req): Json<CreateBusRequest>,
) -> Result<(StatusCode, Json<BusResponse>), AppError> {
    let new_bus = NewBus {
        bus_name: req.bus_name,
        bus_number: req.bus_number,
        origin: req.origin,
        destination: req.destination,
        features: req.features,
        departure_time: req.departure_time,
        arrival_time: req.arrival_time,
        no_of_seats: req.no_of_seats,
        price_amount: req.price_amount,
        price_currency: req.price_currency,
    };
    new_bus
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    if state
        .inventory
        .list_buses()
        .await?
        .iter()
        .any(|b| b.bus_number == new_bus.bus_number)
    {
        return Err(AppError::ValidationError(format!(
            "bus_number '{}' already exists",
            new_bus.bus_number
        )));
    }

    let bus = state.inventory.create_bus(&new_bus).await?;
    let seats = state.inventory.seats_for_bus(bus.id).await?;

    Ok((StatusCode::CREATED, Json(bus_response(bus, seats))))
}

async fn get_bus(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BusResponse>, AppError> {
    let bus = state
        .inventory
        .get_bus(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Bus does not exist".to_string()))?;
    let seats = state.inventory.seats_for_bus(bus.id).await?;

    Ok(Json(bus_response(bus, seats)))
}

async fn replace_bus(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReplaceBusRequest>,
) -> Result<Json<BusResponse>, AppError> {
    let update = BusUpdate {
        bus_name: Some(req.bus_name),
        bus_number: Some(req.bus_number),
        origin: Some(req.origin),
        destination: Some(req.destination),
        features: Some(req.features),
        departure_time: Some(req.departure_time),
        arrival_time: Some(req.arrival_time),
        price_amount: Some(req.price_amount),
        price_currency: Some(req.price_currency),
    };

    apply_update(&state, id, &update).await
}

async fn patch_bus(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<BusUpdate>,
) -> Result<Json<BusResponse>, AppError> {
    apply_update(&state, id, &update).await
}

async fn apply_update(
    state: &AppState,
    id: Uuid,
    update: &BusUpdate,
) -> Result<Json<BusResponse>, AppError> {
    let bus = state
        .inventory
        .update_bus(id, update)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Bus does not exist".to_string()))?;
    let seats = state.inventory.seats_for_bus(bus.id).await?;

    Ok(Json(bus_response(bus, seats)))
}

async fn delete_bus(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.inventory.delete_bus(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFoundError("Bus does not exist".to_string()))
    }
}
