use std::sync::Arc;

use railbook_catalog::repository::CatalogRepository;
use railbook_core::repository::BookingRepository;
use railbook_order::BookingEngine;

/// Shared handler state: the engine plus direct handles on the
/// collaborators the read-only endpoints query.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BookingEngine>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub store: Arc<dyn BookingRepository>,
}
