use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::booking::TicketClass;

/// Search parameters as submitted by the storefront: stations, date,
/// the class being shopped and how many travellers.
#[derive(Debug, Deserialize)]
pub struct TrainSearchRequest {
    #[serde(rename = "from")]
    pub departure_station_id: Uuid,
    #[serde(rename = "to")]
    pub arrival_station_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub class: TicketClass,
    #[serde(default = "default_passenger_count")]
    pub passengers: u32,
}

fn default_passenger_count() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct TrainSearchResult {
    pub options: Vec<TrainOption>,
}

/// One candidate train with the quote and an approximate availability
/// snapshot for the requested class. The snapshot reserves nothing; a
/// later reserve may still lose the race.
#[derive(Debug, Serialize)]
pub struct TrainOption {
    pub train_id: Uuid,
    pub train_number: String,
    pub name: String,
    pub train_type: String,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub duration_minutes: i64,
    pub available_seats: u32,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_request_deserialization() {
        let json = r#"
            {
                "from": "6a2f41a3-c54c-fce8-32d2-0324e1c32e22",
                "to": "8b7c6a9e-1234-4f5a-9c3d-2e1f0a9b8c7d",
                "date": "2026-12-24",
                "class": "first",
                "passengers": 3
            }
        "#;
        let req: TrainSearchRequest = serde_json::from_str(json).expect("failed to deserialize");
        assert_eq!(req.date, NaiveDate::from_ymd_opt(2026, 12, 24).unwrap());
        assert_eq!(req.class, TicketClass::First);
        assert_eq!(req.passengers, 3);
    }

    #[test]
    fn search_request_defaults() {
        let json = r#"
            {
                "from": "6a2f41a3-c54c-fce8-32d2-0324e1c32e22",
                "to": "8b7c6a9e-1234-4f5a-9c3d-2e1f0a9b8c7d",
                "date": "2026-12-24"
            }
        "#;
        let req: TrainSearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.class, TicketClass::Second);
        assert_eq!(req.passengers, 1);
    }
}
