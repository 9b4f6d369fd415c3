//! # reg-api
//!
//! HTTP API layer for the regdesk-pay registration payment service.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Session creation endpoint for the four registrant categories
//! - Signature-verified webhook endpoint feeding the reconciler
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Health check |
//! | POST | `/create-checkout-session` | Create a hosted checkout session |
//! | POST | `/webhook` | Provider webhook (raw body) |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
