pub mod app_config;
pub mod booking_repo;
pub mod catalog_repo;

pub use app_config::{BusinessRules, Config};
pub use booking_repo::BookingLedger;
pub use catalog_repo::StationDirectory;
