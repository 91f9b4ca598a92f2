pub mod engine;
pub mod orchestrator;
pub mod ticketing;

pub use engine::BookingEngine;
pub use orchestrator::{PaymentOrchestrator, SimulatedGateway};
pub use ticketing::{IssuedTicket, TicketIssuer};
