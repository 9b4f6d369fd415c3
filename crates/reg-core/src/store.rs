//! # Profile Store Trait
//!
//! Seam between the reconciler and the per-category profile tables. The
//! production implementation lives in `reg-store`; tests substitute mocks.

use crate::category::Category;
use crate::error::{RegistrationError, RegistrationResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Payment state of a profile row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> RegistrationResult<Self> {
        match s {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "paid" => Ok(PaymentStatus::Paid),
            other => Err(RegistrationError::Store(format!(
                "Unexpected payment_status value: {}",
                other
            ))),
        }
    }
}

/// Fields written by the mark-paid transition.
///
/// `is_gala` is populated only for founder events, `ticket_type` only for
/// visitor events with a non-empty tier; the store writes side columns iff
/// they are `Some`. Repeated application is a convergent overwrite, which
/// is what makes the reconciler's check-then-act race benign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaidUpdate {
    pub stripe_session_id: String,
    pub paid_at: DateTime<Utc>,
    pub is_gala: Option<bool>,
    pub ticket_type: Option<String>,
}

/// Store interface consumed by the reconciler.
///
/// Implementations must surface a missing row as `ProfileNotFound`: profile
/// rows pre-exist checkout, so a completed payment without one is a
/// data-integrity problem, not a row to create.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Read the current payment status for a user in the category's table
    async fn payment_status(
        &self,
        category: Category,
        user_id: &str,
    ) -> RegistrationResult<PaymentStatus>;

    /// Apply the mark-paid update to a user's row in the category's table
    async fn mark_paid(
        &self,
        category: Category,
        user_id: &str,
        update: &PaidUpdate,
    ) -> RegistrationResult<()>;
}

/// Type alias for a shared store (dynamic dispatch)
pub type SharedStore = Arc<dyn ProfileStore>;
