//! # Stripe Webhook Verification
//!
//! Signature verification and event parsing for Stripe webhook deliveries.
//! Verification runs against the untouched raw payload bytes: the signed
//! message is `"{timestamp}.{raw_body}"`, so any re-serialization before
//! this point invalidates the signature.

use chrono::{DateTime, Utc};
use reg_core::{RegistrationError, RegistrationResult, WebhookEvent, WebhookEventKind};
use serde::Deserialize;
use tracing::debug;

/// Signature timestamp tolerance in seconds
const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

/// Verify a `Stripe-Signature` header against the raw payload and parse
/// the contained event.
pub fn verify_and_parse(
    payload: &[u8],
    signature: &str,
    webhook_secret: &str,
) -> RegistrationResult<WebhookEvent> {
    let sig_parts = parse_signature_header(signature)?;

    // Reject replayed deliveries outside the tolerance window
    let now = Utc::now().timestamp();
    if (now - sig_parts.timestamp).abs() > TIMESTAMP_TOLERANCE_SECS {
        return Err(RegistrationError::Authentication(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    let signed_payload = format!(
        "{}.{}",
        sig_parts.timestamp,
        String::from_utf8_lossy(payload)
    );
    let expected_sig = compute_hmac_sha256(webhook_secret, &signed_payload);

    let valid = sig_parts
        .signatures
        .iter()
        .any(|sig| constant_time_compare(sig, &expected_sig));

    if !valid {
        return Err(RegistrationError::Authentication(
            "Signature mismatch".to_string(),
        ));
    }

    parse_event(payload)
}

/// Parse a verified payload into a provider-agnostic event
fn parse_event(payload: &[u8]) -> RegistrationResult<WebhookEvent> {
    let event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
        RegistrationError::WebhookParse(format!("Failed to parse webhook: {}", e))
    })?;

    debug!(event_type = %event.event_type, "Verified Stripe webhook");

    let kind = match event.event_type.as_str() {
        "checkout.session.completed" => WebhookEventKind::CheckoutCompleted,
        "checkout.session.expired" => WebhookEventKind::CheckoutExpired,
        "payment_intent.payment_failed" => WebhookEventKind::PaymentFailed,
        other => WebhookEventKind::Unknown(other.to_string()),
    };

    let session_id = event
        .data
        .object
        .get("id")
        .and_then(|v| v.as_str())
        .map(String::from);

    let client_reference_id = event
        .data
        .object
        .get("client_reference_id")
        .and_then(|v| v.as_str())
        .map(String::from);

    let metadata = event
        .data
        .object
        .get("metadata")
        .and_then(|m| m.as_object())
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();

    Ok(WebhookEvent {
        event_id: event.id,
        kind,
        session_id,
        client_reference_id,
        metadata,
        timestamp: DateTime::from_timestamp(event.created, 0).unwrap_or_else(Utc::now),
    })
}

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    created: i64,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> RegistrationResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let kv: Vec<&str> = part.split('=').collect();
        if kv.len() != 2 {
            continue;
        }
        match kv[0] {
            "t" => {
                timestamp = kv[1].parse().ok();
            }
            "v1" => {
                signatures.push(kv[1].to_string());
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        RegistrationError::Authentication("Missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(RegistrationError::Authentication(
            "No v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn compute_hmac_sha256(secret: &str, message: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    let result = mac.finalize();
    hex::encode(result.into_bytes())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "whsec_test_secret";

    /// Build a valid Stripe-Signature header for a payload, the way the
    /// provider would
    fn sign(payload: &str, timestamp: i64, secret: &str) -> String {
        let sig = compute_hmac_sha256(secret, &format!("{}.{}", timestamp, payload));
        format!("t={},v1={}", timestamp, sig)
    }

    fn completed_payload() -> String {
        json!({
            "id": "evt_test_1",
            "type": "checkout.session.completed",
            "created": Utc::now().timestamp(),
            "data": {
                "object": {
                    "id": "cs_test_123",
                    "client_reference_id": "usr_42",
                    "metadata": {
                        "type": "visitor",
                        "companyName": "Acme",
                        "isGala": "false",
                        "ticketType": "premium"
                    }
                }
            }
        })
        .to_string()
    }

    #[test]
    fn test_valid_signature_accepted() {
        let payload = completed_payload();
        let header = sign(&payload, Utc::now().timestamp(), SECRET);

        let event = verify_and_parse(payload.as_bytes(), &header, SECRET).unwrap();
        assert_eq!(event.kind, WebhookEventKind::CheckoutCompleted);
        assert_eq!(event.session_id.as_deref(), Some("cs_test_123"));
        assert_eq!(event.client_reference_id.as_deref(), Some("usr_42"));
        assert_eq!(event.metadata["ticketType"], "premium");
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let payload = completed_payload();
        let header = sign(&payload, Utc::now().timestamp(), SECRET);
        let tampered = payload.replace("usr_42", "usr_evil");

        let err = verify_and_parse(tampered.as_bytes(), &header, SECRET).unwrap_err();
        assert!(matches!(err, RegistrationError::Authentication(_)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = completed_payload();
        let header = sign(&payload, Utc::now().timestamp(), "whsec_other");

        let err = verify_and_parse(payload.as_bytes(), &header, SECRET).unwrap_err();
        assert!(matches!(err, RegistrationError::Authentication(_)));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let payload = completed_payload();
        let stale = Utc::now().timestamp() - TIMESTAMP_TOLERANCE_SECS - 60;
        let header = sign(&payload, stale, SECRET);

        let err = verify_and_parse(payload.as_bytes(), &header, SECRET).unwrap_err();
        assert!(matches!(err, RegistrationError::Authentication(_)));
    }

    #[test]
    fn test_unknown_event_kind_passthrough() {
        let payload = json!({
            "id": "evt_test_2",
            "type": "invoice.paid",
            "created": Utc::now().timestamp(),
            "data": { "object": { "id": "in_test" } }
        })
        .to_string();
        let header = sign(&payload, Utc::now().timestamp(), SECRET);

        let event = verify_and_parse(payload.as_bytes(), &header, SECRET).unwrap();
        assert_eq!(
            event.kind,
            WebhookEventKind::Unknown("invoice.paid".to_string())
        );
    }

    #[test]
    fn test_parse_signature_header() {
        let header = "t=1234567890,v1=abc123,v1=def456";
        let parsed = parse_signature_header(header).unwrap();

        assert_eq!(parsed.timestamp, 1234567890);
        assert_eq!(parsed.signatures.len(), 2);
        assert_eq!(parsed.signatures[0], "abc123");
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc123", "abc123"));
        assert!(!constant_time_compare("abc123", "abc124"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
