//! # Registrant Categories & Pricing
//!
//! Category is the pivot of the whole service: it selects the price of a
//! checkout session, the profile table a completion event is reconciled
//! into, and which side fields (gala flag, ticket tier) apply.

use crate::error::{RegistrationError, RegistrationResult};
use serde::{Deserialize, Serialize};

/// Registrant category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Founder,
    Exhibitor,
    Pitching,
    Visitor,
}

impl Category {
    /// All categories, in table order. Keeps dispatch tests exhaustive.
    pub const ALL: [Category; 4] = [
        Category::Founder,
        Category::Exhibitor,
        Category::Pitching,
        Category::Visitor,
    ];

    /// Wire name, as carried in request bodies and session metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Founder => "founder",
            Category::Exhibitor => "exhibitor",
            Category::Pitching => "pitching",
            Category::Visitor => "visitor",
        }
    }

    /// Parse a wire name. Unknown values are a client error, not a fallback.
    pub fn parse(s: &str) -> RegistrationResult<Self> {
        match s {
            "founder" => Ok(Category::Founder),
            "exhibitor" => Ok(Category::Exhibitor),
            "pitching" => Ok(Category::Pitching),
            "visitor" => Ok(Category::Visitor),
            other => Err(RegistrationError::Validation(format!(
                "Unknown registrant category: {}",
                other
            ))),
        }
    }

    /// Profile table addressed by completion events for this category
    pub fn table(&self) -> &'static str {
        match self {
            Category::Founder => "founder_profiles",
            Category::Exhibitor => "exhibitor_profiles",
            Category::Pitching => "pitching_profiles",
            Category::Visitor => "visitor_profiles",
        }
    }

    /// Display name for the checkout line item
    pub fn product_name(&self) -> &'static str {
        match self {
            Category::Founder => "Founder Registration",
            Category::Exhibitor => "Exhibitor Registration",
            Category::Pitching => "Pitching Registration",
            Category::Visitor => "Visitor Registration",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visitor ticket tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketTier {
    Standard,
    Premium,
}

impl TicketTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketTier::Standard => "standard",
            TicketTier::Premium => "premium",
        }
    }

    /// Decode a stringified tier. Empty or unrecognized values decode to
    /// `None` so a later reconcile never overwrites a stored tier with junk.
    pub fn decode(s: &str) -> Option<Self> {
        match s {
            "standard" => Some(TicketTier::Standard),
            "premium" => Some(TicketTier::Premium),
            _ => None,
        }
    }
}

impl std::fmt::Display for TicketTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment-configurable price table, amounts in the smallest currency
/// unit. The *resolution rule* (category + gala + tier → amount) is the
/// contract; the amounts themselves are loaded from `config/prices.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceTable {
    /// ISO currency code, lowercase (Stripe convention)
    pub currency: String,
    pub founder: i64,
    pub founder_gala: i64,
    pub exhibitor: i64,
    pub pitching: i64,
    pub visitor_standard: i64,
    pub visitor_premium: i64,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            currency: "usd".to_string(),
            founder: 50_000,
            founder_gala: 100_000,
            exhibitor: 272_500,
            pitching: 250_000,
            visitor_standard: 25_000,
            visitor_premium: 50_000,
        }
    }
}

impl PriceTable {
    /// Resolve the charge amount for a registrant.
    ///
    /// Pure function of `(category, gala, tier)`. The gala flag only
    /// matters for founders; the tier only for visitors (absent tier
    /// defaults to standard).
    pub fn resolve(&self, category: Category, gala: bool, tier: Option<TicketTier>) -> i64 {
        match category {
            Category::Founder if gala => self.founder_gala,
            Category::Founder => self.founder,
            Category::Exhibitor => self.exhibitor,
            Category::Pitching => self.pitching,
            Category::Visitor => match tier.unwrap_or(TicketTier::Standard) {
                TicketTier::Standard => self.visitor_standard,
                TicketTier::Premium => self.visitor_premium,
            },
        }
    }
}
