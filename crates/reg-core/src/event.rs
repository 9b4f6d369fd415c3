//! # Webhook Event Types
//!
//! Provider-agnostic view of a verified webhook delivery. The gateway
//! verifies raw bytes and hands the reconciler one of these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Webhook event kinds the reconciler distinguishes.
///
/// Only `CheckoutCompleted` triggers a profile write; everything else is
/// acknowledged and discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventKind {
    /// Checkout session completed (payment settled)
    CheckoutCompleted,
    /// Checkout session expired unpaid
    CheckoutExpired,
    /// Payment attempt failed
    PaymentFailed,
    /// Anything else the provider is configured to deliver
    Unknown(String),
}

/// A signature-verified webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from the provider
    pub event_id: String,

    /// Event kind
    pub kind: WebhookEventKind,

    /// Provider's checkout session ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Correlation id embedded at session creation and echoed back here
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_reference_id: Option<String>,

    /// Flat string metadata written at session creation
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Provider-side event timestamp
    pub timestamp: DateTime<Utc>,
}
