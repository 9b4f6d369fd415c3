//! # Registration Intent & Checkout Session Types
//!
//! The registration intent is ephemeral: it is built from one client
//! request, consumed by session creation, and discarded. Nothing in this
//! service persists it.

use crate::category::{Category, TicketTier};
use crate::error::{RegistrationError, RegistrationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One registrant's request to pay for their registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationIntent {
    /// Stable registrant identifier; the join key echoed back by the
    /// provider in the completion event
    pub user_id: String,

    /// Customer email, prefilled on the hosted checkout page
    pub email: String,

    /// Company name, carried as display metadata only
    #[serde(default)]
    pub company_name: String,

    /// Registrant category
    pub category: Category,

    /// Gala dinner add-on (founders only)
    #[serde(default)]
    pub gala: bool,

    /// Ticket tier (visitors only)
    #[serde(default)]
    pub ticket_tier: Option<TicketTier>,
}

impl RegistrationIntent {
    /// Validate required fields before any provider call
    pub fn validate(&self) -> RegistrationResult<()> {
        if self.user_id.trim().is_empty() {
            return Err(RegistrationError::Validation(
                "userId is required".to_string(),
            ));
        }
        if self.email.trim().is_empty() {
            return Err(RegistrationError::Validation(
                "email is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Description line shown on the hosted checkout page
    pub fn product_description(&self) -> String {
        match self.category {
            Category::Founder if self.gala => {
                format!("{} (incl. gala dinner)", self.category.product_name())
            }
            Category::Visitor => {
                let tier = self.ticket_tier.unwrap_or(TicketTier::Standard);
                format!("{} ({} ticket)", self.category.product_name(), tier)
            }
            _ => self.category.product_name().to_string(),
        }
    }
}

/// A checkout session created by the payment provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID
    pub session_id: String,

    /// Registrant the session was created for
    pub user_id: String,

    /// Provider name (e.g. "stripe")
    pub provider: String,

    /// URL to redirect the registrant to for payment
    pub checkout_url: String,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}
