//! # Request Handlers
//!
//! Axum request handlers for the registration payment API: session
//! creation, webhook reconciliation, and the health check.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use reg_core::{
    Category, CheckoutRequest, RegistrationError, RegistrationIntent, TicketTier,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create checkout session request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    /// Registrant's stable identifier (correlation id)
    #[serde(default)]
    pub user_id: String,
    /// Customer email
    #[serde(default)]
    pub email: String,
    /// Company name (display metadata)
    #[serde(default)]
    pub company_name: String,
    /// Registrant category wire name
    #[serde(rename = "type", default)]
    pub category: String,
    /// Gala dinner add-on (founders only)
    #[serde(default)]
    pub is_gala: bool,
    /// Ticket tier (visitors only)
    #[serde(default)]
    pub ticket_type: String,
}

/// Create checkout session response
#[derive(Debug, Serialize)]
pub struct CreateCheckoutSessionResponse {
    /// Hosted checkout URL (redirect the registrant here)
    pub url: String,
}

/// Webhook acknowledgement
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

fn error_to_response(err: RegistrationError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "regdesk-pay ok")
}

/// Create a hosted checkout session for a registrant
#[instrument(skip(state, request), fields(category = %request.category))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(request): Json<CreateCheckoutSessionRequest>,
) -> Result<Json<CreateCheckoutSessionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let category = Category::parse(&request.category).map_err(error_to_response)?;

    let intent = RegistrationIntent {
        user_id: request.user_id,
        email: request.email,
        company_name: request.company_name,
        category,
        gala: request.is_gala,
        ticket_tier: TicketTier::decode(&request.ticket_type),
    };
    intent.validate().map_err(error_to_response)?;

    let amount = state.prices.resolve(category, intent.gala, intent.ticket_tier);

    let checkout = CheckoutRequest {
        intent,
        amount,
        currency: state.prices.currency.clone(),
        success_url: state.urls.success_url(),
        cancel_url: state.urls.cancel_url(),
    };

    info!(
        user_id = %checkout.intent.user_id,
        category = %category,
        amount,
        "Creating checkout session"
    );

    let session = state
        .gateway
        .create_session(&checkout)
        .await
        .map_err(|e| {
            error!(category = %category, "Failed to create checkout session: {}", e);
            error_to_response(e)
        })?;

    Ok(Json(CreateCheckoutSessionResponse {
        url: session.checkout_url,
    }))
}

/// Handle a provider webhook delivery.
///
/// The body is taken as raw bytes: signature verification must see exactly
/// what the provider signed.
#[instrument(skip(state, headers, body))]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, (StatusCode, Json<ErrorResponse>)> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Missing Stripe-Signature header", 400)),
            )
        })?;

    let event = state
        .gateway
        .verify_webhook(&body, signature)
        .await
        .map_err(|e| {
            error!("Webhook verification failed: {}", e);
            error_to_response(e)
        })?;

    let outcome = state.reconciler.process(&event).await.map_err(|e| {
        // 5xx responses signal the provider to redeliver; that redelivery
        // is the only retry mechanism this service has.
        error!(event_id = %event.event_id, "Webhook reconciliation failed: {}", e);
        error_to_response(e)
    })?;

    info!(event_id = %event.event_id, outcome = ?outcome, "Webhook acknowledged");

    Ok(Json(WebhookAck { received: true }))
}
