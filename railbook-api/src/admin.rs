use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveTime;
use serde::Deserialize;
use uuid::Uuid;

use railbook_catalog::train::{ClassPrices, SeatAllocation, Station, Train};
use railbook_core::booking::StateTransition;
use railbook_core::EngineError;

use crate::bookings::BookingResponse;
use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateStationRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTrainRequest {
    pub train_number: String,
    pub name: String,
    pub departure_station_id: Uuid,
    pub arrival_station_id: Uuid,
    /// "HH:MM" or "HH:MM:SS".
    pub departure_time: String,
    pub arrival_time: String,
    pub train_type: String,
    pub base_price_cents: i64,
    #[serde(default)]
    pub class_prices: ClassPrices,
    pub seat_capacity: SeatAllocation,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

// ============================================================================
// Routes & Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/stations", post(create_station))
        .route("/v1/admin/trains", post(create_train).get(list_trains))
        .route("/v1/admin/bookings", get(list_bookings))
        .route("/v1/admin/bookings/{id}/history", get(booking_history))
}

/// POST /v1/admin/stations
async fn create_station(
    State(state): State<AppState>,
    Json(req): Json<CreateStationRequest>,
) -> Result<(StatusCode, Json<Station>), AppError> {
    if req.name.trim().is_empty() {
        return Err(EngineError::InvalidInput("station name is required".to_string()).into());
    }
    let station = Station { id: Uuid::new_v4(), name: req.name.trim().to_string() };
    state.catalog.upsert_station(station.clone()).await.map_err(AppError::storage)?;
    Ok((StatusCode::CREATED, Json(station)))
}

/// POST /v1/admin/trains
async fn create_train(
    State(state): State<AppState>,
    Json(req): Json<CreateTrainRequest>,
) -> Result<(StatusCode, Json<Train>), AppError> {
    if req.train_number.trim().is_empty() {
        return Err(EngineError::InvalidInput("train number is required".to_string()).into());
    }
    if req.base_price_cents < 0 {
        return Err(EngineError::InvalidInput("base price must not be negative".to_string()).into());
    }

    let train = Train {
        id: Uuid::new_v4(),
        train_number: req.train_number.trim().to_string(),
        name: req.name,
        departure_station_id: req.departure_station_id,
        arrival_station_id: req.arrival_station_id,
        departure_time: parse_time(&req.departure_time)?,
        arrival_time: parse_time(&req.arrival_time)?,
        train_type: req.train_type,
        base_price_cents: req.base_price_cents,
        class_prices: req.class_prices,
        seat_capacity: req.seat_capacity,
        is_active: req.is_active,
    };
    state.catalog.upsert_train(train.clone()).await.map_err(AppError::storage)?;
    Ok((StatusCode::CREATED, Json(train)))
}

/// GET /v1/admin/trains
async fn list_trains(State(state): State<AppState>) -> Result<Json<Vec<Train>>, AppError> {
    let trains = state.catalog.list_trains().await.map_err(AppError::storage)?;
    Ok(Json(trains))
}

/// GET /v1/admin/bookings
/// Every booking the store has seen, newest first. Raw feed for the
/// back-office report screens.
async fn list_bookings(State(state): State<AppState>) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let bookings = state.store.list_bookings().await.map_err(AppError::storage)?;
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

/// GET /v1/admin/bookings/{id}/history
async fn booking_history(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Vec<StateTransition>>, AppError> {
    let history = state.store.transitions_for(booking_id).await.map_err(AppError::storage)?;
    if history.is_empty() {
        return Err(EngineError::NotFound(format!("booking {booking_id}")).into());
    }
    Ok(Json(history))
}

fn parse_time(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| EngineError::InvalidInput(format!("invalid time of day: {value}")).into())
}
