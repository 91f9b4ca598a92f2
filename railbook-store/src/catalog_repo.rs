use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use railbook_catalog::repository::CatalogRepository;
use railbook_catalog::train::{Station, Train};
use railbook_core::BoxError;

/// In-memory reference implementation of the catalog collaborator: the
/// station/train directory administrators maintain. Durable storage is
/// a collaborator concern; this keeps the trait seam honest for the
/// engine and the tests.
pub struct StationDirectory {
    stations: RwLock<HashMap<Uuid, Station>>,
    trains: RwLock<HashMap<Uuid, Train>>,
}

impl StationDirectory {
    pub fn new() -> Self {
        Self {
            stations: RwLock::new(HashMap::new()),
            trains: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for StationDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogRepository for StationDirectory {
    async fn upsert_station(&self, station: Station) -> Result<(), BoxError> {
        self.stations.write().await.insert(station.id, station);
        Ok(())
    }

    async fn get_station(&self, id: Uuid) -> Result<Option<Station>, BoxError> {
        Ok(self.stations.read().await.get(&id).cloned())
    }

    async fn list_stations(&self) -> Result<Vec<Station>, BoxError> {
        let mut stations: Vec<Station> = self.stations.read().await.values().cloned().collect();
        stations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stations)
    }

    async fn upsert_train(&self, train: Train) -> Result<(), BoxError> {
        self.trains.write().await.insert(train.id, train);
        Ok(())
    }

    async fn get_train(&self, id: Uuid) -> Result<Option<Train>, BoxError> {
        Ok(self.trains.read().await.get(&id).cloned())
    }

    async fn list_trains(&self) -> Result<Vec<Train>, BoxError> {
        let mut trains: Vec<Train> = self.trains.read().await.values().cloned().collect();
        trains.sort_by(|a, b| a.train_number.cmp(&b.train_number));
        Ok(trains)
    }

    async fn search_trains(
        &self,
        departure_station_id: Uuid,
        arrival_station_id: Uuid,
    ) -> Result<Vec<Train>, BoxError> {
        let mut matches: Vec<Train> = self
            .trains
            .read()
            .await
            .values()
            .filter(|train| {
                train.is_active
                    && train.departure_station_id == departure_station_id
                    && train.arrival_station_id == arrival_station_id
            })
            .cloned()
            .collect();
        matches.sort_by_key(|train| train.departure_time);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use railbook_catalog::train::{ClassPrices, SeatAllocation};

    fn train(departure: Uuid, arrival: Uuid, number: &str, time: &str) -> Train {
        Train {
            id: Uuid::new_v4(),
            train_number: number.to_string(),
            name: format!("Train {number}"),
            departure_station_id: departure,
            arrival_station_id: arrival,
            departure_time: time.parse().unwrap(),
            arrival_time: "23:00:00".parse().unwrap(),
            train_type: "Express".to_string(),
            base_price_cents: 100_000,
            class_prices: ClassPrices::default(),
            seat_capacity: SeatAllocation { first: 5, second: 10, third: 8 },
            is_active: true,
        }
    }

    #[tokio::test]
    async fn search_filters_by_route_and_sorts_by_departure() {
        let directory = StationDirectory::new();
        let colombo = Uuid::new_v4();
        let kandy = Uuid::new_v4();
        let galle = Uuid::new_v4();

        directory.upsert_train(train(colombo, kandy, "1015", "15:30:00")).await.unwrap();
        directory.upsert_train(train(colombo, kandy, "1005", "05:55:00")).await.unwrap();
        directory.upsert_train(train(colombo, galle, "8050", "06:50:00")).await.unwrap();

        let results = directory.search_trains(colombo, kandy).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].train_number, "1005");
        assert_eq!(results[1].train_number, "1015");
    }

    #[tokio::test]
    async fn inactive_trains_are_hidden_from_search() {
        let directory = StationDirectory::new();
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();

        let mut retired = train(from, to, "9000", "09:00:00");
        retired.is_active = false;
        directory.upsert_train(retired).await.unwrap();

        assert!(directory.search_trains(from, to).await.unwrap().is_empty());
    }
}
