use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use railbook_core::booking::{Booking, BookingStatus, ContactInfo, Passenger, TicketClass};
use railbook_core::payment::PaymentDetails;
use railbook_core::EngineError;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub user_id: Uuid,
    pub train_id: Uuid,
    pub travel_date: NaiveDate,
    pub ticket_class: TicketClass,
    pub passenger_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct AttachPassengersRequest {
    pub contact: ContactInfo,
    pub passengers: Vec<Passenger>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub train_id: Uuid,
    pub travel_date: NaiveDate,
    pub ticket_class: TicketClass,
    pub passenger_count: u32,
    pub total_price_cents: i64,
    pub currency: String,
    pub status: BookingStatus,
    pub ticket_number: Option<String>,
    pub contact: Option<ContactInfo>,
    pub passengers: Vec<Passenger>,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            user_id: booking.user_id,
            train_id: booking.train_id,
            travel_date: booking.travel_date,
            ticket_class: booking.ticket_class,
            passenger_count: booking.passenger_count,
            total_price_cents: booking.total_price_cents,
            currency: booking.currency,
            status: booking.status,
            ticket_number: booking.ticket_number,
            contact: booking.contact,
            passengers: booking.passengers,
            created_at: booking.created_at,
        }
    }
}

// ============================================================================
// Routes & Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/{id}", get(get_booking))
        .route("/v1/bookings/{id}/passengers", post(attach_passengers))
        .route("/v1/bookings/{id}/pay", post(submit_payment))
        .route("/v1/bookings/{id}/cancel", post(cancel_booking))
}

/// POST /v1/bookings
/// Reserve seats and open a Draft booking.
async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let booking = state
        .engine
        .create_booking(req.user_id, req.train_id, req.travel_date, req.ticket_class, req.passenger_count)
        .await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// POST /v1/bookings/{id}/passengers
/// Attach contact + passenger details; prices the booking.
async fn attach_passengers(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<AttachPassengersRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .engine
        .attach_passengers(booking_id, req.contact, req.passengers)
        .await?;
    Ok(Json(booking.into()))
}

/// POST /v1/bookings/{id}/pay
/// Simulated payment. A declined charge returns 402 with the Failed
/// booking so the client can show the outcome.
async fn submit_payment(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(details): Json<PaymentDetails>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    match state.engine.submit_payment(booking_id, details).await {
        Ok(booking) => Ok((StatusCode::OK, Json(booking.into()))),
        Err(EngineError::PaymentDeclined(reason)) => {
            tracing::warn!(%booking_id, %reason, "payment declined");
            let booking = state.engine.get_booking(booking_id).await?;
            Ok((StatusCode::PAYMENT_REQUIRED, Json(booking.into())))
        }
        Err(other) => Err(other.into()),
    }
}

/// POST /v1/bookings/{id}/cancel
async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.engine.cancel_booking(booking_id).await?;
    Ok(Json(booking.into()))
}

/// GET /v1/bookings/{id}
/// Snapshot for confirmation/ticket display.
async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.engine.get_booking(booking_id).await?;
    Ok(Json(booking.into()))
}
