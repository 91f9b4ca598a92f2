use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::EngineError;
use railbook_shared::pii::Masked;

/// Fare/service tier with independent seat capacity and price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketClass {
    First,
    Second,
    Third,
}

impl TicketClass {
    pub const ALL: [TicketClass; 3] = [TicketClass::First, TicketClass::Second, TicketClass::Third];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketClass::First => "first",
            TicketClass::Second => "second",
            TicketClass::Third => "third",
        }
    }
}

impl Default for TicketClass {
    fn default() -> Self {
        TicketClass::Second
    }
}

impl fmt::Display for TicketClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketClass {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(TicketClass::First),
            "second" => Ok(TicketClass::Second),
            "third" => Ok(TicketClass::Third),
            other => Err(EngineError::InvalidInput(format!("unknown ticket class: {other}"))),
        }
    }
}

/// Booking status in the lifecycle. The status field is the single
/// source of truth for progress; nothing is inferred from where the
/// client happens to be in its flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Draft,
    AwaitingPassengers,
    AwaitingPayment,
    Confirmed,
    Failed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Draft => "DRAFT",
            BookingStatus::AwaitingPassengers => "AWAITING_PASSENGERS",
            BookingStatus::AwaitingPayment => "AWAITING_PAYMENT",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Failed => "FAILED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    /// Terminal bookings are read-only and owned by the booking store.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Confirmed | BookingStatus::Failed | BookingStatus::Cancelled
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// One traveller on a booking. The seat label is assigned by the ticket
/// issuer at confirmation and stays `None` before that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub first_name: String,
    pub last_name: String,
    /// NIC or passport number.
    pub id_number: String,
    pub gender: Gender,
    #[serde(default)]
    pub seat_label: Option<String>,
}

/// Contact channels for the booking, attached before payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Masked<String>,
    pub phone: Masked<String>,
}

/// A customer's purchase in flight. Owned exclusively by the booking
/// engine until it reaches a terminal status, then handed to the
/// booking store for historical query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub train_id: Uuid,
    pub travel_date: NaiveDate,
    pub ticket_class: TicketClass,
    pub passenger_count: u32,
    pub total_price_cents: i64,
    pub currency: String,
    pub status: BookingStatus,
    /// Assigned only at confirmation.
    pub ticket_number: Option<String>,
    pub contact: Option<ContactInfo>,
    pub passengers: Vec<Passenger>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        user_id: Uuid,
        train_id: Uuid,
        travel_date: NaiveDate,
        ticket_class: TicketClass,
        passenger_count: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            train_id,
            travel_date,
            ticket_class,
            passenger_count,
            total_price_cents: 0,
            currency: crate::CURRENCY.to_string(),
            status: BookingStatus::Draft,
            ticket_number: None,
            contact: None,
            passengers: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, new_status: BookingStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Append-only audit record written for every status change; the raw
/// feed behind the admin booking reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub from: Option<BookingStatus>,
    pub to: BookingStatus,
    /// Who drove the transition: "CUSTOMER" or "SYSTEM".
    pub actor: String,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl StateTransition {
    pub fn new(
        booking_id: Uuid,
        from: Option<BookingStatus>,
        to: BookingStatus,
        actor: &str,
        note: Option<&str>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id,
            from,
            to,
            actor: actor.to_string(),
            note: note.map(|n| n.to_string()),
            occurred_at: Utc::now(),
        }
    }
}
