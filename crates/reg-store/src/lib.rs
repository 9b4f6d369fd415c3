//! # reg-store
//!
//! Postgres profile store for the regdesk-pay registration payment service.
//!
//! Implements `reg_core::ProfileStore` over the four per-category profile
//! tables (`founder_profiles`, `exhibitor_profiles`, `pitching_profiles`,
//! `visitor_profiles`). Rows are created by the registration flow before
//! checkout; this crate only ever reads their payment status and applies
//! the mark-paid update.
//!
//! Table schemas live in `migrations/` for local development; production
//! tables are owned by the registration service.

pub mod postgres;

pub use postgres::PostgresProfileStore;
