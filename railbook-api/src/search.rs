use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use railbook_catalog::fares;
use railbook_catalog::train::Station;
use railbook_core::booking::TicketClass;
use railbook_core::search::{TrainOption, TrainSearchRequest, TrainSearchResult};
use railbook_core::CURRENCY;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/stations", get(list_stations))
        .route("/v1/trains/search", get(search_trains))
        .route("/v1/trains/{id}/availability", get(train_availability))
        .route("/v1/trains/{id}/quote", get(quote_fare))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    #[serde(default)]
    pub class: TicketClass,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub train_id: Uuid,
    pub travel_date: NaiveDate,
    pub ticket_class: TicketClass,
    pub available_seats: u32,
}

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    #[serde(default)]
    pub class: TicketClass,
    #[serde(default = "one_passenger")]
    pub passengers: u32,
}

fn one_passenger() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub train_id: Uuid,
    pub ticket_class: TicketClass,
    pub passenger_count: u32,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
    pub currency: String,
}

/// GET /v1/stations
async fn list_stations(State(state): State<AppState>) -> Result<Json<Vec<Station>>, AppError> {
    let stations = state.catalog.list_stations().await.map_err(AppError::storage)?;
    Ok(Json(stations))
}

/// GET /v1/trains/search?from=&to=&date=&class=&passengers=
/// Candidate trains with a quote and an approximate availability
/// snapshot for the requested class.
async fn search_trains(
    State(state): State<AppState>,
    Query(req): Query<TrainSearchRequest>,
) -> Result<Json<TrainSearchResult>, AppError> {
    let trains = state
        .engine
        .find_trains(req.departure_station_id, req.arrival_station_id)
        .await?;

    let mut options = Vec::with_capacity(trains.len());
    for train in trains {
        let available_seats = state
            .engine
            .available_seats(train.id, req.date, req.class)
            .await?;
        let unit_price_cents = fares::unit_price_cents(&train, req.class);
        let total_price_cents = fares::quote(&train, req.class, req.passengers)?;
        options.push(TrainOption {
            train_id: train.id,
            train_number: train.train_number.clone(),
            name: train.name.clone(),
            train_type: train.train_type.clone(),
            departure_time: train.departure_time,
            arrival_time: train.arrival_time,
            duration_minutes: train.duration_minutes(),
            available_seats,
            unit_price_cents,
            total_price_cents,
            currency: CURRENCY.to_string(),
        });
    }

    Ok(Json(TrainSearchResult { options }))
}

/// GET /v1/trains/{id}/availability?date=&class=
async fn train_availability(
    State(state): State<AppState>,
    Path(train_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let available_seats = state
        .engine
        .available_seats(train_id, query.date, query.class)
        .await?;
    Ok(Json(AvailabilityResponse {
        train_id,
        travel_date: query.date,
        ticket_class: query.class,
        available_seats,
    }))
}

/// GET /v1/trains/{id}/quote?class=&passengers=
/// Fare only; the booking fee is added at checkout, not here.
async fn quote_fare(
    State(state): State<AppState>,
    Path(train_id): Path<Uuid>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<QuoteResponse>, AppError> {
    let total_price_cents = state.engine.quote(train_id, query.class, query.passengers).await?;
    Ok(Json(QuoteResponse {
        train_id,
        ticket_class: query.class,
        passenger_count: query.passengers,
        unit_price_cents: total_price_cents / i64::from(query.passengers),
        total_price_cents,
        currency: CURRENCY.to_string(),
    }))
}
