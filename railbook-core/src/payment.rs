use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::BoxError;
use railbook_shared::pii::Masked;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Mobile,
    Counter,
}

/// Payment instrument details captured at the checkout boundary.
/// Validated before the state machine is invoked.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    #[serde(default)]
    pub card_number: Option<Masked<String>>,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntent {
    /// Provider's identifier (e.g. sim_pi_...).
    pub id: String,
    pub booking_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    /// Register a payment intent with the provider.
    async fn create_intent(
        &self,
        booking_id: Uuid,
        amount_cents: i64,
        currency: &str,
    ) -> Result<PaymentIntent, BoxError>;

    /// Resolve the intent against the given instrument.
    async fn process_payment(
        &self,
        intent: &PaymentIntent,
        details: &PaymentDetails,
    ) -> Result<PaymentStatus, BoxError>;
}
