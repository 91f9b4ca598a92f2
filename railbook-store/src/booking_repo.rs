use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use railbook_core::booking::{Booking, StateTransition};
use railbook_core::repository::BookingRepository;
use railbook_core::BoxError;

/// Durable-record stand-in for the booking store collaborator: booking
/// snapshots plus the append-only transition log the admin reports
/// read.
pub struct BookingLedger {
    bookings: RwLock<HashMap<Uuid, Booking>>,
    transitions: RwLock<Vec<StateTransition>>,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self {
            bookings: RwLock::new(HashMap::new()),
            transitions: RwLock::new(Vec::new()),
        }
    }
}

impl Default for BookingLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingRepository for BookingLedger {
    async fn save_booking(&self, booking: &Booking) -> Result<(), BoxError> {
        self.bookings.write().await.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn record_transition(&self, transition: &StateTransition) -> Result<(), BoxError> {
        debug!(
            booking_id = %transition.booking_id,
            to = %transition.to,
            actor = %transition.actor,
            "recording booking transition"
        );
        self.transitions.write().await.push(transition.clone());
        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, BoxError> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn list_bookings(&self) -> Result<Vec<Booking>, BoxError> {
        let mut bookings: Vec<Booking> = self.bookings.read().await.values().cloned().collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn transitions_for(&self, booking_id: Uuid) -> Result<Vec<StateTransition>, BoxError> {
        let mut history: Vec<StateTransition> = self
            .transitions
            .read()
            .await
            .iter()
            .filter(|t| t.booking_id == booking_id)
            .cloned()
            .collect();
        history.sort_by_key(|t| t.occurred_at);
        Ok(history)
    }
}
