use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{Booking, StateTransition};
use crate::BoxError;

/// Durable record of bookings and their transition history, implemented
/// by the booking store collaborator. The engine writes through it on
/// every state change; admin and report UIs read from it.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Upsert the latest snapshot of a booking.
    async fn save_booking(&self, booking: &Booking) -> Result<(), BoxError>;

    /// Append one transition to the audit log.
    async fn record_transition(&self, transition: &StateTransition) -> Result<(), BoxError>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, BoxError>;

    async fn list_bookings(&self) -> Result<Vec<Booking>, BoxError>;

    async fn transitions_for(&self, booking_id: Uuid) -> Result<Vec<StateTransition>, BoxError>;
}
