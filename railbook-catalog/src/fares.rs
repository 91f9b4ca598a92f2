//! Pure fare computation. No side effects; all arithmetic in integer
//! cents so multi-passenger totals never drift.

use railbook_core::booking::TicketClass;
use railbook_core::{EngineError, EngineResult, MAX_PASSENGERS, MIN_PASSENGERS};

use crate::train::Train;

/// Per-seat price in cents for a class on a train. An explicit catalog
/// price wins; otherwise the class multiplier is applied to the
/// second-class base (first 3/2, second 1, third 3/4).
pub fn unit_price_cents(train: &Train, class: TicketClass) -> i64 {
    if let Some(explicit) = train.class_prices.price_for(class) {
        return explicit;
    }
    match class {
        TicketClass::First => train.base_price_cents * 3 / 2,
        TicketClass::Second => train.base_price_cents,
        TicketClass::Third => train.base_price_cents * 3 / 4,
    }
}

/// Total fare for `passenger_count` seats. The flat booking fee is not
/// part of the per-seat fare; the state machine adds it once per
/// booking at checkout.
pub fn quote(train: &Train, class: TicketClass, passenger_count: u32) -> EngineResult<i64> {
    if !(MIN_PASSENGERS..=MAX_PASSENGERS).contains(&passenger_count) {
        return Err(EngineError::InvalidInput(format!(
            "passenger count must be between {MIN_PASSENGERS} and {MAX_PASSENGERS}, got {passenger_count}"
        )));
    }
    Ok(unit_price_cents(train, class) * i64::from(passenger_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::{ClassPrices, SeatAllocation};
    use uuid::Uuid;

    fn train_with_base(base_price_cents: i64) -> Train {
        Train {
            id: Uuid::new_v4(),
            train_number: "1015".to_string(),
            name: "Udarata Menike".to_string(),
            departure_station_id: Uuid::new_v4(),
            arrival_station_id: Uuid::new_v4(),
            departure_time: "06:00:00".parse().unwrap(),
            arrival_time: "12:30:00".parse().unwrap(),
            train_type: "Express".to_string(),
            base_price_cents,
            class_prices: ClassPrices::default(),
            seat_capacity: SeatAllocation { first: 5, second: 10, third: 8 },
            is_active: true,
        }
    }

    #[test]
    fn class_multipliers_over_base() {
        // Base second-class price 1000.00
        let train = train_with_base(100_000);
        assert_eq!(quote(&train, TicketClass::First, 1).unwrap(), 150_000);
        assert_eq!(quote(&train, TicketClass::Second, 1).unwrap(), 100_000);
        assert_eq!(quote(&train, TicketClass::Third, 1).unwrap(), 75_000);
    }

    #[test]
    fn total_scales_with_passenger_count() {
        let train = train_with_base(100_000);
        assert_eq!(quote(&train, TicketClass::Second, 3).unwrap(), 300_000);
    }

    #[test]
    fn explicit_class_price_beats_multiplier() {
        let mut train = train_with_base(100_000);
        train.class_prices.first_cents = Some(180_000);
        assert_eq!(unit_price_cents(&train, TicketClass::First), 180_000);
        // Classes without an explicit price still use the fallback.
        assert_eq!(unit_price_cents(&train, TicketClass::Third), 75_000);
    }

    #[test]
    fn passenger_count_bounds() {
        let train = train_with_base(100_000);
        assert!(matches!(
            quote(&train, TicketClass::Second, 0),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            quote(&train, TicketClass::Second, 11),
            Err(EngineError::InvalidInput(_))
        ));
    }
}
