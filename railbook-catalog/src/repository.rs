use async_trait::async_trait;
use uuid::Uuid;

use railbook_core::BoxError;

use crate::train::{Station, Train};

/// Read-mostly directory of stations and trains, owned by the admin
/// back-office. The engine only ever reads capacity and fares from it.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn upsert_station(&self, station: Station) -> Result<(), BoxError>;

    async fn get_station(&self, id: Uuid) -> Result<Option<Station>, BoxError>;

    async fn list_stations(&self) -> Result<Vec<Station>, BoxError>;

    async fn upsert_train(&self, train: Train) -> Result<(), BoxError>;

    async fn get_train(&self, id: Uuid) -> Result<Option<Train>, BoxError>;

    async fn list_trains(&self) -> Result<Vec<Train>, BoxError>;

    /// Candidate trains for a departure/arrival station pair. Routing
    /// beyond direct matches is a collaborator concern.
    async fn search_trains(
        &self,
        departure_station_id: Uuid,
        arrival_station_id: Uuid,
    ) -> Result<Vec<Train>, BoxError>;
}
