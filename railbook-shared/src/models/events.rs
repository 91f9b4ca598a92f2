use chrono::NaiveDate;
use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingCreatedEvent {
    pub booking_id: Uuid,
    pub train_id: Uuid,
    pub travel_date: NaiveDate,
    pub ticket_class: String,
    pub passenger_count: u32,
    pub created_at: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingConfirmedEvent {
    pub booking_id: Uuid,
    pub ticket_number: String,
    pub total_price_cents: i64,
    pub confirmed_at: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct PaymentFailedEvent {
    pub booking_id: Uuid,
    pub reason: String,
    pub failed_at: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingCancelledEvent {
    pub booking_id: Uuid,
    pub reason: String,
    pub cancelled_at: i64,
}

/// Fan-out envelope published on the engine's broadcast channel after
/// each lifecycle change. Receivers are display/telemetry only; the
/// transition log in the booking store is the durable record.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingEvent {
    Created(BookingCreatedEvent),
    Confirmed(BookingConfirmedEvent),
    PaymentFailed(PaymentFailedEvent),
    Cancelled(BookingCancelledEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_envelope_is_tagged() {
        let event = BookingEvent::Confirmed(BookingConfirmedEvent {
            booking_id: Uuid::new_v4(),
            ticket_number: "RB-1700000000-AB12CD34".to_string(),
            total_price_cents: 305_000,
            confirmed_at: 1_700_000_000,
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "CONFIRMED");
        assert_eq!(json["ticket_number"], "RB-1700000000-AB12CD34");
    }
}
