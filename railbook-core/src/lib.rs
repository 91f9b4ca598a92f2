pub mod booking;
pub mod payment;
pub mod repository;
pub mod search;

/// Boxed error type used across collaborator trait boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Currency every price in the engine is denominated in, as fixed-point
/// cents.
pub const CURRENCY: &str = "LKR";

/// Bounds on passengers per booking.
pub const MIN_PASSENGERS: u32 = 1;
pub const MAX_PASSENGERS: u32 = 10;

/// Error taxonomy shared by every engine component. Collaborator
/// failures are flattened into `Storage`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient seats: requested {requested}, available {available}")]
    InsufficientSeats { requested: u32, available: u32 },

    #[error("invalid state transition from {from} to {to}")]
    InvalidState { from: String, to: String },

    #[error("reservation already released")]
    AlreadyReleased,

    #[error("payment declined: {0}")]
    PaymentDeclined(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
