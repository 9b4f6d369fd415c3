//! # Stripe Checkout Sessions
//!
//! Checkout Sessions API integration: one hosted session per registration
//! intent, with the registrant's user id embedded as `client_reference_id`
//! and the category metadata stringified into the session's metadata map.

use crate::config::StripeConfig;
use crate::webhook;
use async_trait::async_trait;
use chrono::Utc;
use reg_core::{
    CheckoutGateway, CheckoutRequest, CheckoutSession, RegistrationError, RegistrationResult,
    SessionMetadata, WebhookEvent,
};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

/// Stripe implementation of the checkout gateway
pub struct StripeGateway {
    config: StripeConfig,
    client: Client,
}

impl StripeGateway {
    /// Create a new Stripe gateway
    pub fn new(config: StripeConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> RegistrationResult<Self> {
        let config = StripeConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Build the form body for the Checkout Sessions API
    fn build_form_params(request: &CheckoutRequest) -> Vec<(String, String)> {
        let intent = &request.intent;

        let mut form_params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
            // Correlation field echoed back in the completion event
            (
                "client_reference_id".to_string(),
                intent.user_id.clone(),
            ),
            ("customer_email".to_string(), intent.email.clone()),
        ];

        // Single line item: the registration fee
        form_params.push((
            "line_items[0][price_data][currency]".to_string(),
            request.currency.clone(),
        ));
        form_params.push((
            "line_items[0][price_data][unit_amount]".to_string(),
            request.amount.to_string(),
        ));
        form_params.push((
            "line_items[0][price_data][product_data][name]".to_string(),
            intent.category.product_name().to_string(),
        ));
        form_params.push((
            "line_items[0][price_data][product_data][description]".to_string(),
            intent.product_description(),
        ));
        form_params.push(("line_items[0][quantity]".to_string(), "1".to_string()));

        // Category metadata, stringified through the one codec
        for (key, value) in SessionMetadata::from_intent(intent).encode() {
            form_params.push((format!("metadata[{}]", key), value));
        }

        form_params
    }
}

#[async_trait]
impl CheckoutGateway for StripeGateway {
    #[instrument(skip(self, request), fields(user_id = %request.intent.user_id, category = %request.intent.category))]
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> RegistrationResult<CheckoutSession> {
        request.intent.validate()?;

        let form_params = Self::build_form_params(request);

        debug!(
            amount = request.amount,
            currency = %request.currency,
            "Creating Stripe checkout session"
        );

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| RegistrationError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RegistrationError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(RegistrationError::Provider {
                    provider: "stripe".to_string(),
                    message: error_response.error.message,
                });
            }

            return Err(RegistrationError::Provider {
                provider: "stripe".to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let session_response: StripeCheckoutSessionResponse = serde_json::from_str(&body)
            .map_err(|e| {
                RegistrationError::Serialization(format!("Failed to parse Stripe response: {}", e))
            })?;

        info!(
            session_id = %session_response.id,
            "Created Stripe checkout session"
        );

        Ok(CheckoutSession {
            session_id: session_response.id,
            user_id: request.intent.user_id.clone(),
            provider: "stripe".to_string(),
            checkout_url: session_response.url,
            created_at: Utc::now(),
        })
    }

    #[instrument(skip(self, payload, signature))]
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> RegistrationResult<WebhookEvent> {
        webhook::verify_and_parse(payload, signature, &self.config.webhook_secret)
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
