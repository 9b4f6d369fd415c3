//! # reg-core
//!
//! Core types and traits for the regdesk-pay registration payment service.
//!
//! This crate provides:
//! - `Category`, `TicketTier`, and `PriceTable` for category-dependent pricing
//! - `RegistrationIntent` and `CheckoutSession` for the session initiation flow
//! - `SessionMetadata` codec for the stringified provider metadata boundary
//! - `CheckoutGateway` trait for payment provider implementations
//! - `ProfileStore` trait for the per-category profile tables
//! - `Reconciler` for idempotent webhook-driven payment reconciliation
//! - `RegistrationError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use reg_core::{Category, PriceTable, Reconciler, RegistrationIntent};
//!
//! // Resolve the charge for a registrant
//! let prices = PriceTable::default();
//! let amount = prices.resolve(Category::Founder, /* gala */ true, None);
//!
//! // Create the checkout session through a gateway (see reg-stripe)
//! let session = gateway.create_session(&request).await?;
//!
//! // Later, reconcile the completion webhook
//! let event = gateway.verify_webhook(&raw_body, &signature).await?;
//! let outcome = Reconciler::new(store).process(&event).await?;
//! ```

pub mod category;
pub mod error;
pub mod event;
pub mod gateway;
pub mod metadata;
pub mod reconcile;
pub mod session;
pub mod store;

// Re-exports for convenience
pub use category::{Category, PriceTable, TicketTier};
pub use error::{RegistrationError, RegistrationResult};
pub use event::{WebhookEvent, WebhookEventKind};
pub use gateway::{CheckoutGateway, CheckoutRequest, SharedGateway};
pub use metadata::SessionMetadata;
pub use reconcile::{ReconcileOutcome, Reconciler};
pub use session::{CheckoutSession, RegistrationIntent};
pub use store::{PaidUpdate, PaymentStatus, ProfileStore, SharedStore};
