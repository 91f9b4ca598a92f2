use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use railbook_catalog::fares;
use railbook_catalog::inventory::{
    InventoryError, InventoryKey, ReservationToken, SeatInventoryManager,
};
use railbook_catalog::repository::CatalogRepository;
use railbook_catalog::train::Train;
use railbook_core::booking::{
    Booking, BookingStatus, ContactInfo, Passenger, StateTransition, TicketClass,
};
use railbook_core::payment::{PaymentDetails, PaymentMethod, PaymentStatus};
use railbook_core::repository::BookingRepository;
use railbook_core::{BoxError, EngineError, EngineResult, MAX_PASSENGERS, MIN_PASSENGERS};
use railbook_shared::models::events::{
    BookingCancelledEvent, BookingConfirmedEvent, BookingCreatedEvent, BookingEvent,
    PaymentFailedEvent,
};
use railbook_store::app_config::BusinessRules;

use crate::orchestrator::PaymentOrchestrator;
use crate::ticketing::TicketIssuer;

const ACTOR_CUSTOMER: &str = "CUSTOMER";
const ACTOR_SYSTEM: &str = "SYSTEM";

struct ActiveBooking {
    booking: Booking,
    token: ReservationToken,
}

/// Orchestrates a booking's lifecycle from Draft to a terminal status.
///
/// Each active booking sits behind its own async mutex, so at most one
/// transition is in flight per booking; the per-booking lock is held
/// across the payment await, the seat-inventory locks never are. Once
/// terminal, a booking is handed off to the booking store and leaves
/// the active map.
pub struct BookingEngine {
    catalog: Arc<dyn CatalogRepository>,
    store: Arc<dyn BookingRepository>,
    inventory: Arc<SeatInventoryManager>,
    payments: PaymentOrchestrator,
    issuer: TicketIssuer,
    rules: BusinessRules,
    active: RwLock<HashMap<Uuid, Arc<Mutex<ActiveBooking>>>>,
    events: broadcast::Sender<BookingEvent>,
}

impl BookingEngine {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        store: Arc<dyn BookingRepository>,
        inventory: Arc<SeatInventoryManager>,
        payments: PaymentOrchestrator,
        rules: BusinessRules,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            catalog,
            store,
            inventory,
            payments,
            issuer: TicketIssuer,
            rules,
            active: RwLock::new(HashMap::new()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.events.subscribe()
    }

    /// Candidate trains for a route; routing itself belongs to the
    /// catalog collaborator.
    pub async fn find_trains(
        &self,
        departure_station_id: Uuid,
        arrival_station_id: Uuid,
    ) -> EngineResult<Vec<Train>> {
        self.catalog
            .search_trains(departure_station_id, arrival_station_id)
            .await
            .map_err(Self::storage)
    }

    /// Fare for the selection, without the booking fee.
    pub async fn quote(
        &self,
        train_id: Uuid,
        ticket_class: TicketClass,
        passenger_count: u32,
    ) -> EngineResult<i64> {
        let train = self.train(train_id).await?;
        fares::quote(&train, ticket_class, passenger_count)
    }

    /// Approximate availability snapshot for display; a following
    /// reserve may still lose the race.
    pub async fn available_seats(
        &self,
        train_id: Uuid,
        travel_date: NaiveDate,
        ticket_class: TicketClass,
    ) -> EngineResult<u32> {
        let train = self.train(train_id).await?;
        let key = InventoryKey { train_id, travel_date, ticket_class };
        Ok(self
            .inventory
            .available_seats(&key, train.seat_capacity.capacity_for(ticket_class)))
    }

    /// Reserve seats and open a Draft booking. A failed reservation
    /// creates nothing.
    pub async fn create_booking(
        &self,
        user_id: Uuid,
        train_id: Uuid,
        travel_date: NaiveDate,
        ticket_class: TicketClass,
        passenger_count: u32,
    ) -> EngineResult<Booking> {
        if !(MIN_PASSENGERS..=MAX_PASSENGERS).contains(&passenger_count) {
            return Err(EngineError::InvalidInput(format!(
                "passenger count must be between {MIN_PASSENGERS} and {MAX_PASSENGERS}, got {passenger_count}"
            )));
        }
        if travel_date < Utc::now().date_naive() {
            return Err(EngineError::InvalidInput("travel date is in the past".to_string()));
        }

        let train = self.train(train_id).await?;
        let key = InventoryKey { train_id, travel_date, ticket_class };
        let capacity = train.seat_capacity.capacity_for(ticket_class);
        let token = self.inventory.reserve(key, passenger_count, capacity)?;

        let booking = Booking::new(user_id, train_id, travel_date, ticket_class, passenger_count);
        if let Err(err) = self
            .persist(&booking, None, ACTOR_CUSTOMER, Some("seats reserved"))
            .await
        {
            // Keep reserve-then-store transactional: no record, no hold.
            self.release_seats(&token);
            return Err(err);
        }

        let slot = Arc::new(Mutex::new(ActiveBooking { booking: booking.clone(), token }));
        self.active.write().await.insert(booking.id, slot);

        info!(booking_id = %booking.id, %train_id, %ticket_class, passenger_count, "booking drafted");
        self.emit(BookingEvent::Created(BookingCreatedEvent {
            booking_id: booking.id,
            train_id,
            travel_date,
            ticket_class: ticket_class.to_string(),
            passenger_count,
            created_at: booking.created_at.timestamp(),
        }));
        Ok(booking)
    }

    /// Attach contact and passenger details, then price the booking:
    /// Draft → AwaitingPassengers → AwaitingPayment. Validation happens
    /// before any mutation.
    pub async fn attach_passengers(
        &self,
        booking_id: Uuid,
        contact: ContactInfo,
        mut passengers: Vec<Passenger>,
    ) -> EngineResult<Booking> {
        let slot = self.require_active(booking_id, BookingStatus::AwaitingPayment).await?;
        let mut active = slot.lock().await;

        match active.booking.status {
            BookingStatus::Draft | BookingStatus::AwaitingPassengers => {}
            other => {
                return Err(EngineError::InvalidState {
                    from: other.to_string(),
                    to: BookingStatus::AwaitingPayment.to_string(),
                })
            }
        }
        validate_contact(&contact)?;
        validate_passengers(&passengers, active.booking.passenger_count)?;
        let train = self.train(active.booking.train_id).await?;

        // Seat labels are assigned at confirmation only.
        for passenger in &mut passengers {
            passenger.seat_label = None;
        }

        let from = active.booking.status;
        active.booking.contact = Some(contact);
        active.booking.passengers = passengers;
        active.booking.update_status(BookingStatus::AwaitingPassengers);
        self.persist(&active.booking, Some(from), ACTOR_CUSTOMER, Some("contact and passengers attached"))
            .await?;

        let fare = fares::quote(&train, active.booking.ticket_class, active.booking.passenger_count)?;
        active.booking.total_price_cents = fare + self.rules.booking_fee_cents;
        active.booking.update_status(BookingStatus::AwaitingPayment);
        self.persist(
            &active.booking,
            Some(BookingStatus::AwaitingPassengers),
            ACTOR_CUSTOMER,
            Some("fare computed, awaiting payment"),
        )
        .await?;

        Ok(active.booking.clone())
    }

    /// Resolve the payment: AwaitingPayment → Confirmed on success,
    /// AwaitingPayment → Failed (with seats released) otherwise. A
    /// declined or errored charge surfaces as `PaymentDeclined`; the
    /// Failed booking remains queryable.
    pub async fn submit_payment(
        &self,
        booking_id: Uuid,
        details: PaymentDetails,
    ) -> EngineResult<Booking> {
        let slot = self.require_active(booking_id, BookingStatus::Confirmed).await?;
        let mut active = slot.lock().await;

        if active.booking.status != BookingStatus::AwaitingPayment {
            return Err(EngineError::InvalidState {
                from: active.booking.status.to_string(),
                to: BookingStatus::Confirmed.to_string(),
            });
        }
        if details.method == PaymentMethod::Card && details.card_number.is_none() {
            return Err(EngineError::InvalidInput("card payments require a card number".to_string()));
        }

        let train = self.train(active.booking.train_id).await?;
        let amount = active.booking.total_price_cents;

        // The per-booking lock stays held across this await; the seat
        // counters are only touched once the outcome is known.
        let outcome = self.payments.charge(booking_id, amount, &details).await;

        match outcome {
            Ok(PaymentStatus::Succeeded) => {
                let ticket = self.issuer.issue(&train.train_number, active.booking.passenger_count);
                for (index, passenger) in active.booking.passengers.iter_mut().enumerate() {
                    passenger.seat_label = ticket.seat_labels.get(index).cloned();
                }
                active.booking.ticket_number = Some(ticket.ticket_number.clone());
                if let Err(err) = self.inventory.commit(&active.token) {
                    warn!(%booking_id, error = %err, "failed to commit reservation");
                }
                active.booking.update_status(BookingStatus::Confirmed);
                self.persist(
                    &active.booking,
                    Some(BookingStatus::AwaitingPayment),
                    ACTOR_CUSTOMER,
                    Some("payment succeeded, ticket issued"),
                )
                .await?;

                let confirmed = active.booking.clone();
                drop(active);
                self.retire(booking_id).await;

                info!(%booking_id, ticket_number = %ticket.ticket_number, "booking confirmed");
                self.emit(BookingEvent::Confirmed(BookingConfirmedEvent {
                    booking_id,
                    ticket_number: ticket.ticket_number,
                    total_price_cents: confirmed.total_price_cents,
                    confirmed_at: confirmed.updated_at.timestamp(),
                }));
                Ok(confirmed)
            }
            other => {
                let reason = match other {
                    Ok(status) => format!("payment not approved: {status:?}"),
                    Err(err) => format!("payment provider error: {err}"),
                };
                self.release_seats(&active.token);
                active.booking.update_status(BookingStatus::Failed);
                self.persist(
                    &active.booking,
                    Some(BookingStatus::AwaitingPayment),
                    ACTOR_SYSTEM,
                    Some(&reason),
                )
                .await?;
                drop(active);
                self.retire(booking_id).await;

                warn!(%booking_id, %reason, "payment failed, seats released");
                self.emit(BookingEvent::PaymentFailed(PaymentFailedEvent {
                    booking_id,
                    reason: reason.clone(),
                    failed_at: Utc::now().timestamp(),
                }));
                Err(EngineError::PaymentDeclined(reason))
            }
        }
    }

    /// Explicit cancellation of any pre-terminal booking.
    pub async fn cancel_booking(&self, booking_id: Uuid) -> EngineResult<Booking> {
        let slot = self.require_active(booking_id, BookingStatus::Cancelled).await?;
        let mut active = slot.lock().await;

        if active.booking.is_terminal() {
            return Err(EngineError::InvalidState {
                from: active.booking.status.to_string(),
                to: BookingStatus::Cancelled.to_string(),
            });
        }

        let from = active.booking.status;
        self.release_seats(&active.token);
        active.booking.update_status(BookingStatus::Cancelled);
        self.persist(&active.booking, Some(from), ACTOR_CUSTOMER, Some("cancelled by user"))
            .await?;

        let cancelled = active.booking.clone();
        drop(active);
        self.retire(booking_id).await;

        info!(%booking_id, "booking cancelled");
        self.emit(BookingEvent::Cancelled(BookingCancelledEvent {
            booking_id,
            reason: "cancelled by user".to_string(),
            cancelled_at: Utc::now().timestamp(),
        }));
        Ok(cancelled)
    }

    /// Cancel bookings whose hold window has elapsed and release their
    /// seats. Safe to run concurrently with customer transitions: the
    /// per-booking lock serializes them and whichever side observes a
    /// terminal status first wins; the other becomes a no-op.
    pub async fn expire_stale(&self, now: DateTime<Utc>) -> usize {
        let hold_window = chrono::Duration::seconds(self.rules.hold_window_seconds as i64);
        let slots: Vec<(Uuid, Arc<Mutex<ActiveBooking>>)> = self
            .active
            .read()
            .await
            .iter()
            .map(|(id, slot)| (*id, Arc::clone(slot)))
            .collect();

        let mut swept = 0;
        for (booking_id, slot) in slots {
            let mut active = slot.lock().await;
            if active.booking.is_terminal() {
                continue;
            }
            if now - active.booking.created_at < hold_window {
                continue;
            }

            let from = active.booking.status;
            self.release_seats(&active.token);
            active.booking.update_status(BookingStatus::Cancelled);
            if let Err(err) = self
                .persist(&active.booking, Some(from), ACTOR_SYSTEM, Some("hold window expired"))
                .await
            {
                warn!(%booking_id, error = %err, "failed to persist expiry");
            }
            drop(active);
            self.retire(booking_id).await;

            self.emit(BookingEvent::Cancelled(BookingCancelledEvent {
                booking_id,
                reason: "hold window expired".to_string(),
                cancelled_at: now.timestamp(),
            }));
            swept += 1;
        }
        if swept > 0 {
            info!(swept, "expired stale bookings");
        }
        swept
    }

    /// Current snapshot, active or historical.
    pub async fn get_booking(&self, booking_id: Uuid) -> EngineResult<Booking> {
        let slot = self.active.read().await.get(&booking_id).cloned();
        if let Some(slot) = slot {
            return Ok(slot.lock().await.booking.clone());
        }
        self.store
            .get_booking(booking_id)
            .await
            .map_err(Self::storage)?
            .ok_or_else(|| EngineError::NotFound(format!("booking {booking_id}")))
    }

    async fn train(&self, train_id: Uuid) -> EngineResult<Train> {
        self.catalog
            .get_train(train_id)
            .await
            .map_err(Self::storage)?
            .ok_or_else(|| EngineError::NotFound(format!("train {train_id}")))
    }

    async fn require_active(
        &self,
        booking_id: Uuid,
        attempted: BookingStatus,
    ) -> EngineResult<Arc<Mutex<ActiveBooking>>> {
        let slot = self.active.read().await.get(&booking_id).cloned();
        if let Some(slot) = slot {
            return Ok(slot);
        }
        // Not active any more: either terminal in the store, or unknown.
        match self.store.get_booking(booking_id).await.map_err(Self::storage)? {
            Some(stored) => Err(EngineError::InvalidState {
                from: stored.status.to_string(),
                to: attempted.to_string(),
            }),
            None => Err(EngineError::NotFound(format!("booking {booking_id}"))),
        }
    }

    async fn persist(
        &self,
        booking: &Booking,
        from: Option<BookingStatus>,
        actor: &str,
        note: Option<&str>,
    ) -> EngineResult<()> {
        self.store.save_booking(booking).await.map_err(Self::storage)?;
        self.store
            .record_transition(&StateTransition::new(booking.id, from, booking.status, actor, note))
            .await
            .map_err(Self::storage)
    }

    fn release_seats(&self, token: &ReservationToken) {
        match self.inventory.release(token) {
            Ok(()) => {}
            // The counter was already restored exactly once; nothing
            // left to undo.
            Err(InventoryError::AlreadyReleased) => {
                warn!(token_id = %token.id, "reservation already released");
            }
            Err(err) => {
                warn!(token_id = %token.id, error = %err, "failed to release reservation");
            }
        }
    }

    async fn retire(&self, booking_id: Uuid) {
        self.active.write().await.remove(&booking_id);
    }

    fn emit(&self, event: BookingEvent) {
        let _ = self.events.send(event);
    }

    fn storage(err: BoxError) -> EngineError {
        EngineError::Storage(err.to_string())
    }
}

fn validate_contact(contact: &ContactInfo) -> EngineResult<()> {
    let email = contact.email.as_inner();
    if !email.contains('@') || email.len() < 3 {
        return Err(EngineError::InvalidInput("contact email is invalid".to_string()));
    }
    if contact.phone.as_inner().trim().len() < 10 {
        return Err(EngineError::InvalidInput(
            "contact phone must have at least 10 digits".to_string(),
        ));
    }
    Ok(())
}

fn validate_passengers(passengers: &[Passenger], expected: u32) -> EngineResult<()> {
    if passengers.len() != expected as usize {
        return Err(EngineError::InvalidInput(format!(
            "expected {expected} passengers, got {}",
            passengers.len()
        )));
    }
    for passenger in passengers {
        if passenger.first_name.trim().len() < 2 || passenger.last_name.trim().len() < 2 {
            return Err(EngineError::InvalidInput(
                "passenger names must have at least 2 characters".to_string(),
            ));
        }
        if passenger.id_number.trim().len() < 5 {
            return Err(EngineError::InvalidInput(
                "passenger id number must have at least 5 characters".to_string(),
            ));
        }
    }
    Ok(())
}
