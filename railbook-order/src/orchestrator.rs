use std::sync::Arc;
use uuid::Uuid;

use railbook_core::payment::{PaymentAdapter, PaymentDetails, PaymentIntent, PaymentStatus};
use railbook_core::{BoxError, CURRENCY};

/// Routes payment attempts through the configured adapter. A real
/// deployment would select adapters per currency/market here.
pub struct PaymentOrchestrator {
    adapter: Arc<dyn PaymentAdapter>,
}

impl PaymentOrchestrator {
    pub fn new(adapter: Arc<dyn PaymentAdapter>) -> Self {
        Self { adapter }
    }

    pub async fn charge(
        &self,
        booking_id: Uuid,
        amount_cents: i64,
        details: &PaymentDetails,
    ) -> Result<PaymentStatus, BoxError> {
        let intent = self.adapter.create_intent(booking_id, amount_cents, CURRENCY).await?;
        self.adapter.process_payment(&intent, details).await
    }
}

/// Simulated gateway with deterministic outcomes for the storefront
/// demo and the tests. Card numbers ending 0002 and the reference
/// "declined" decline; the reference "gateway-offline" fails the
/// provider call outright.
pub struct SimulatedGateway;

#[async_trait::async_trait]
impl PaymentAdapter for SimulatedGateway {
    async fn create_intent(
        &self,
        booking_id: Uuid,
        amount_cents: i64,
        currency: &str,
    ) -> Result<PaymentIntent, BoxError> {
        Ok(PaymentIntent {
            id: format!("sim_pi_{}", booking_id.simple()),
            booking_id,
            amount_cents,
            currency: currency.to_string(),
            status: PaymentStatus::Pending,
            created_at: chrono::Utc::now(),
        })
    }

    async fn process_payment(
        &self,
        _intent: &PaymentIntent,
        details: &PaymentDetails,
    ) -> Result<PaymentStatus, BoxError> {
        if details.reference.as_deref() == Some("gateway-offline") {
            return Err("simulated payment gateway outage".into());
        }
        if details.reference.as_deref() == Some("declined") {
            return Ok(PaymentStatus::Declined);
        }
        if let Some(card) = &details.card_number {
            if card.as_inner().ends_with("0002") {
                return Ok(PaymentStatus::Declined);
            }
        }
        Ok(PaymentStatus::Succeeded)
    }
}
