pub mod fares;
pub mod inventory;
pub mod repository;
pub mod train;

pub use inventory::{InventoryKey, ReservationToken, SeatInventoryManager};
pub use repository::CatalogRepository;
pub use train::{ClassPrices, SeatAllocation, Station, Train};
