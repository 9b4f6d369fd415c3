//! # Checkout Gateway Trait
//!
//! Seam between the service and the payment provider. The production
//! implementation lives in `reg-stripe`; tests substitute mocks.

use crate::error::RegistrationResult;
use crate::event::WebhookEvent;
use crate::session::{CheckoutSession, RegistrationIntent};
use async_trait::async_trait;
use std::sync::Arc;

/// Everything the gateway needs to create one hosted checkout session
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub intent: RegistrationIntent,
    /// Charge amount in the smallest currency unit, already resolved from
    /// the price table
    pub amount: i64,
    /// ISO currency code, lowercase
    pub currency: String,
    /// Redirect target after successful payment
    pub success_url: String,
    /// Redirect target if the registrant cancels
    pub cancel_url: String,
}

/// Provider interface consumed by the two components.
///
/// `create_session` is the Session Initiator's one side effect;
/// `verify_webhook` is the Webhook Reconciler's trust boundary and MUST
/// operate on the untouched raw payload bytes.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Create a hosted checkout session and return its redirect URL
    async fn create_session(&self, request: &CheckoutRequest)
        -> RegistrationResult<CheckoutSession>;

    /// Verify a webhook signature against the raw body and parse the event
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> RegistrationResult<WebhookEvent>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type SharedGateway = Arc<dyn CheckoutGateway>;
