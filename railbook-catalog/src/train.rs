use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use railbook_core::booking::TicketClass;

/// Immutable station reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: Uuid,
    pub name: String,
}

/// Per-class seat capacity, configured by an administrator. The engine
/// treats these as read-only inputs per search/reservation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeatAllocation {
    pub first: u32,
    pub second: u32,
    pub third: u32,
}

impl SeatAllocation {
    pub fn capacity_for(&self, class: TicketClass) -> u32 {
        match class {
            TicketClass::First => self.first,
            TicketClass::Second => self.second,
            TicketClass::Third => self.third,
        }
    }
}

/// Explicit per-class prices in cents. Absent entries fall back to the
/// multiplier formula over the second-class base price.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ClassPrices {
    #[serde(default)]
    pub first_cents: Option<i64>,
    #[serde(default)]
    pub second_cents: Option<i64>,
    #[serde(default)]
    pub third_cents: Option<i64>,
}

impl ClassPrices {
    pub fn price_for(&self, class: TicketClass) -> Option<i64> {
        match class {
            TicketClass::First => self.first_cents,
            TicketClass::Second => self.second_cents,
            TicketClass::Third => self.third_cents,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Train {
    pub id: Uuid,
    pub train_number: String,
    pub name: String,
    pub departure_station_id: Uuid,
    pub arrival_station_id: Uuid,
    /// Local times; an arrival earlier than the departure wraps past
    /// midnight.
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub train_type: String,
    /// Second-class seat price in cents.
    pub base_price_cents: i64,
    pub class_prices: ClassPrices,
    pub seat_capacity: SeatAllocation,
    pub is_active: bool,
}

impl Train {
    pub fn duration_minutes(&self) -> i64 {
        let minutes = (self.arrival_time - self.departure_time).num_minutes();
        if minutes < 0 {
            minutes + 24 * 60
        } else {
            minutes
        }
    }
}
