//! # reg-stripe
//!
//! Stripe checkout gateway for the regdesk-pay registration payment service.
//!
//! This crate implements `reg_core::CheckoutGateway` on top of the Stripe
//! Checkout Sessions API:
//!
//! - **Session creation** — one hosted session per registration intent,
//!   carrying the registrant's user id as `client_reference_id` and the
//!   category metadata as stringified key-value pairs.
//! - **Webhook verification** — HMAC-SHA256 signature check against the
//!   raw request body, then parsing into a provider-agnostic event.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reg_stripe::StripeGateway;
//!
//! // Create gateway from environment
//! let gateway = StripeGateway::from_env()?;
//!
//! // Create a checkout session
//! let session = gateway.create_session(&request).await?;
//! // Redirect the registrant to session.checkout_url
//!
//! // In the webhook endpoint (raw body bytes, untouched):
//! let event = gateway.verify_webhook(&body, signature).await?;
//! ```

pub mod checkout;
pub mod config;
pub mod webhook;

// Re-exports
pub use checkout::StripeGateway;
pub use config::StripeConfig;
pub use webhook::verify_and_parse;
