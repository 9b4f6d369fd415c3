//! # Session Metadata Codec
//!
//! The provider carries session metadata as flat string key-value pairs,
//! so booleans and enums cross that boundary stringified. This module is
//! the single encode/decode pair for those fields; nothing else in the
//! service is allowed an ad hoc truthiness check on metadata strings.

use crate::category::{Category, TicketTier};
use crate::session::RegistrationIntent;
use std::collections::HashMap;
use tracing::warn;

pub const KEY_CATEGORY: &str = "type";
pub const KEY_COMPANY: &str = "companyName";
pub const KEY_GALA: &str = "isGala";
pub const KEY_TICKET: &str = "ticketType";

/// Category/side-field metadata embedded at session creation and echoed
/// back in the completion event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMetadata {
    pub category: Category,
    pub company_name: String,
    pub gala: bool,
    pub ticket_tier: Option<TicketTier>,
}

impl SessionMetadata {
    pub fn from_intent(intent: &RegistrationIntent) -> Self {
        Self {
            category: intent.category,
            company_name: intent.company_name.clone(),
            gala: intent.gala,
            ticket_tier: intent.ticket_tier,
        }
    }

    /// Stringify for the provider's flat metadata map
    pub fn encode(&self) -> Vec<(&'static str, String)> {
        vec![
            (KEY_CATEGORY, self.category.as_str().to_string()),
            (KEY_COMPANY, self.company_name.clone()),
            (KEY_GALA, encode_bool(self.gala)),
            (
                KEY_TICKET,
                self.ticket_tier.map(|t| t.to_string()).unwrap_or_default(),
            ),
        ]
    }

    /// Decode from the provider's echoed metadata map.
    ///
    /// Every field has an explicit default on absence: category falls back
    /// to founder (sessions created before the category field existed carry
    /// none), gala to false, tier to none.
    pub fn decode(map: &HashMap<String, String>) -> Self {
        let category = match map.get(KEY_CATEGORY) {
            None => Category::Founder,
            Some(s) => Category::parse(s).unwrap_or_else(|_| {
                warn!(category = %s, "Unknown category in session metadata, defaulting to founder");
                Category::Founder
            }),
        };

        Self {
            category,
            company_name: map.get(KEY_COMPANY).cloned().unwrap_or_default(),
            gala: map.get(KEY_GALA).map(|s| decode_bool(s)).unwrap_or(false),
            ticket_tier: map
                .get(KEY_TICKET)
                .and_then(|s| TicketTier::decode(s)),
        }
    }
}

fn encode_bool(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

fn decode_bool(s: &str) -> bool {
    s == "true"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let meta = SessionMetadata {
            category: Category::Visitor,
            company_name: "Acme".to_string(),
            gala: false,
            ticket_tier: Some(TicketTier::Premium),
        };

        let encoded: HashMap<String, String> = meta
            .encode()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        assert_eq!(encoded[KEY_CATEGORY], "visitor");
        assert_eq!(encoded[KEY_GALA], "false");
        assert_eq!(encoded[KEY_TICKET], "premium");
        assert_eq!(SessionMetadata::decode(&encoded), meta);
    }

    #[test]
    fn test_missing_category_defaults_to_founder() {
        let meta = SessionMetadata::decode(&map(&[(KEY_COMPANY, "Acme")]));
        assert_eq!(meta.category, Category::Founder);
        assert!(!meta.gala);
        assert_eq!(meta.ticket_tier, None);
    }

    #[test]
    fn test_unknown_category_defaults_to_founder() {
        let meta = SessionMetadata::decode(&map(&[(KEY_CATEGORY, "sponsor")]));
        assert_eq!(meta.category, Category::Founder);
    }

    #[test]
    fn test_gala_flag_decoding() {
        assert!(SessionMetadata::decode(&map(&[(KEY_GALA, "true")])).gala);
        assert!(!SessionMetadata::decode(&map(&[(KEY_GALA, "false")])).gala);
        assert!(!SessionMetadata::decode(&map(&[(KEY_GALA, "yes")])).gala);
    }

    #[test]
    fn test_empty_ticket_tier_decodes_to_none() {
        let meta = SessionMetadata::decode(&map(&[
            (KEY_CATEGORY, "visitor"),
            (KEY_TICKET, ""),
        ]));
        assert_eq!(meta.ticket_tier, None);
    }
}
