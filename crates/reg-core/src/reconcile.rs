//! # Webhook Reconciler
//!
//! Drives a verified webhook event through filter → resolve → idempotency
//! check → apply. This is the part of the service with real invariants: a
//! profile's `payment_status` goes `unpaid → paid` at most once no matter
//! how many times the provider delivers the completion event.
//!
//! The check-then-act between the status read and the update is not atomic
//! against concurrent deliveries of the same event. That race is benign:
//! the update is a convergent overwrite, so two racing deliveries produce
//! the same final row. No lock or transaction is taken.

use crate::category::Category;
use crate::error::{RegistrationError, RegistrationResult};
use crate::event::{WebhookEvent, WebhookEventKind};
use crate::metadata::SessionMetadata;
use crate::store::{PaidUpdate, PaymentStatus, SharedStore};
use chrono::Utc;
use tracing::{debug, info, instrument};

/// Terminal outcome of one webhook delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Event kind is not a checkout completion; acknowledged and discarded
    Ignored,
    /// Profile was already paid; zero writes performed
    AlreadyPaid,
    /// Profile marked paid
    Updated,
}

/// Applies completion events to the profile store, exactly once in effect
#[derive(Clone)]
pub struct Reconciler {
    store: SharedStore,
}

impl Reconciler {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Process one verified webhook event.
    ///
    /// Errors signal the HTTP layer to respond 5xx so the provider
    /// redelivers; `Ok` outcomes are all acknowledged with success.
    #[instrument(skip(self, event), fields(event_id = %event.event_id))]
    pub async fn process(&self, event: &WebhookEvent) -> RegistrationResult<ReconcileOutcome> {
        if event.kind != WebhookEventKind::CheckoutCompleted {
            debug!(kind = ?event.kind, "Ignoring webhook event kind");
            return Ok(ReconcileOutcome::Ignored);
        }

        let user_id = event
            .client_reference_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                RegistrationError::WebhookParse(
                    "Completed session carries no client reference id".to_string(),
                )
            })?;

        let session_id = event.session_id.as_deref().ok_or_else(|| {
            RegistrationError::WebhookParse("Completed session carries no session id".to_string())
        })?;

        let meta = SessionMetadata::decode(&event.metadata);
        let category = meta.category;

        match self.store.payment_status(category, user_id).await? {
            PaymentStatus::Paid => {
                // At-most-once guarantee: redelivery of an already-settled
                // payment is acknowledged without touching the row.
                info!(
                    user_id,
                    category = %category,
                    table = category.table(),
                    "Profile already paid, skipping update"
                );
                return Ok(ReconcileOutcome::AlreadyPaid);
            }
            PaymentStatus::Unpaid => {}
        }

        let update = PaidUpdate {
            stripe_session_id: session_id.to_string(),
            paid_at: Utc::now(),
            is_gala: matches!(category, Category::Founder).then_some(meta.gala),
            ticket_type: match category {
                Category::Visitor => meta.ticket_tier.map(|t| t.to_string()),
                _ => None,
            },
        };

        self.store.mark_paid(category, user_id, &update).await?;

        info!(
            user_id,
            category = %category,
            table = category.table(),
            session_id,
            "Profile marked paid"
        );

        Ok(ReconcileOutcome::Updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::TicketTier;
    use crate::metadata::{KEY_CATEGORY, KEY_GALA, KEY_TICKET};
    use crate::store::ProfileStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory row mirroring the columns the reconciler touches
    #[derive(Debug, Clone, Default)]
    struct Row {
        paid: bool,
        stripe_session_id: Option<String>,
        is_gala: Option<bool>,
        ticket_type: Option<String>,
    }

    #[derive(Default)]
    struct MockStore {
        rows: Mutex<HashMap<(Category, String), Row>>,
        reads: AtomicUsize,
        writes: AtomicUsize,
    }

    impl MockStore {
        fn with_row(self, category: Category, user_id: &str, row: Row) -> Self {
            self.rows
                .lock()
                .unwrap()
                .insert((category, user_id.to_string()), row);
            self
        }

        fn row(&self, category: Category, user_id: &str) -> Option<Row> {
            self.rows
                .lock()
                .unwrap()
                .get(&(category, user_id.to_string()))
                .cloned()
        }
    }

    #[async_trait]
    impl ProfileStore for MockStore {
        async fn payment_status(
            &self,
            category: Category,
            user_id: &str,
        ) -> RegistrationResult<PaymentStatus> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            match self.row(category, user_id) {
                Some(row) if row.paid => Ok(PaymentStatus::Paid),
                Some(_) => Ok(PaymentStatus::Unpaid),
                None => Err(RegistrationError::ProfileNotFound {
                    table: category.table().to_string(),
                    user_id: user_id.to_string(),
                }),
            }
        }

        async fn mark_paid(
            &self,
            category: Category,
            user_id: &str,
            update: &PaidUpdate,
        ) -> RegistrationResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .get_mut(&(category, user_id.to_string()))
                .ok_or_else(|| RegistrationError::ProfileNotFound {
                    table: category.table().to_string(),
                    user_id: user_id.to_string(),
                })?;
            row.paid = true;
            row.stripe_session_id = Some(update.stripe_session_id.clone());
            if let Some(gala) = update.is_gala {
                row.is_gala = Some(gala);
            }
            if let Some(ref tier) = update.ticket_type {
                row.ticket_type = Some(tier.clone());
            }
            Ok(())
        }
    }

    fn completed_event(user_id: &str, metadata: &[(&str, &str)]) -> WebhookEvent {
        WebhookEvent {
            event_id: "evt_test".to_string(),
            kind: WebhookEventKind::CheckoutCompleted,
            session_id: Some("cs_test_123".to_string()),
            client_reference_id: Some(user_id.to_string()),
            metadata: metadata
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            timestamp: Utc::now(),
        }
    }

    fn reconciler(store: MockStore) -> (Reconciler, Arc<MockStore>) {
        let store = Arc::new(store);
        (Reconciler::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_second_delivery_performs_zero_writes() {
        let (reconciler, store) = reconciler(MockStore::default().with_row(
            Category::Founder,
            "usr_1",
            Row::default(),
        ));
        let event = completed_event("usr_1", &[(KEY_CATEGORY, "founder")]);

        assert_eq!(
            reconciler.process(&event).await.unwrap(),
            ReconcileOutcome::Updated
        );
        assert_eq!(
            reconciler.process(&event).await.unwrap(),
            ReconcileOutcome::AlreadyPaid
        );
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert!(store.row(Category::Founder, "usr_1").unwrap().paid);
    }

    #[tokio::test]
    async fn test_category_routes_to_matching_table_only() {
        for category in Category::ALL {
            let mut mock = MockStore::default();
            for c in Category::ALL {
                mock = mock.with_row(c, "usr_1", Row::default());
            }
            let (reconciler, store) = reconciler(mock);

            let event = completed_event("usr_1", &[(KEY_CATEGORY, category.as_str())]);
            reconciler.process(&event).await.unwrap();

            for c in Category::ALL {
                let row = store.row(c, "usr_1").unwrap();
                assert_eq!(row.paid, c == category, "category {} wrote to {}", category, c);
            }
        }
    }

    #[tokio::test]
    async fn test_missing_category_falls_back_to_founder() {
        let (reconciler, store) = reconciler(MockStore::default().with_row(
            Category::Founder,
            "usr_legacy",
            Row::default(),
        ));
        let event = completed_event("usr_legacy", &[]);

        assert_eq!(
            reconciler.process(&event).await.unwrap(),
            ReconcileOutcome::Updated
        );
        assert!(store.row(Category::Founder, "usr_legacy").unwrap().paid);
    }

    #[tokio::test]
    async fn test_gala_written_only_for_founders() {
        let (reconciler, store) = reconciler(
            MockStore::default()
                .with_row(Category::Founder, "usr_f", Row::default())
                .with_row(Category::Exhibitor, "usr_e", Row::default()),
        );

        let event = completed_event("usr_f", &[(KEY_CATEGORY, "founder"), (KEY_GALA, "true")]);
        reconciler.process(&event).await.unwrap();
        assert_eq!(
            store.row(Category::Founder, "usr_f").unwrap().is_gala,
            Some(true)
        );

        let event = completed_event("usr_e", &[(KEY_CATEGORY, "exhibitor"), (KEY_GALA, "true")]);
        reconciler.process(&event).await.unwrap();
        assert_eq!(store.row(Category::Exhibitor, "usr_e").unwrap().is_gala, None);
    }

    #[tokio::test]
    async fn test_visitor_ticket_tier_gating() {
        let (reconciler, store) = reconciler(MockStore::default().with_row(
            Category::Visitor,
            "usr_v",
            Row {
                ticket_type: Some(TicketTier::Premium.to_string()),
                ..Row::default()
            },
        ));

        // Empty tier must not overwrite the stored one
        let event = completed_event("usr_v", &[(KEY_CATEGORY, "visitor"), (KEY_TICKET, "")]);
        reconciler.process(&event).await.unwrap();
        assert_eq!(
            store.row(Category::Visitor, "usr_v").unwrap().ticket_type,
            Some("premium".to_string())
        );
    }

    #[tokio::test]
    async fn test_visitor_premium_tier_persisted() {
        let (reconciler, store) = reconciler(MockStore::default().with_row(
            Category::Visitor,
            "usr_v",
            Row::default(),
        ));

        let event = completed_event(
            "usr_v",
            &[(KEY_CATEGORY, "visitor"), (KEY_TICKET, "premium")],
        );
        reconciler.process(&event).await.unwrap();
        assert_eq!(
            store.row(Category::Visitor, "usr_v").unwrap().ticket_type,
            Some("premium".to_string())
        );
    }

    #[tokio::test]
    async fn test_already_paid_row_left_untouched() {
        let paid_row = Row {
            paid: true,
            stripe_session_id: Some("cs_original".to_string()),
            is_gala: Some(false),
            ticket_type: None,
        };
        let (reconciler, store) = reconciler(MockStore::default().with_row(
            Category::Founder,
            "usr_paid",
            paid_row.clone(),
        ));

        let event = completed_event("usr_paid", &[(KEY_CATEGORY, "founder"), (KEY_GALA, "true")]);
        assert_eq!(
            reconciler.process(&event).await.unwrap(),
            ReconcileOutcome::AlreadyPaid
        );

        let row = store.row(Category::Founder, "usr_paid").unwrap();
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        assert_eq!(row.stripe_session_id, paid_row.stripe_session_id);
        assert_eq!(row.is_gala, paid_row.is_gala);
    }

    #[tokio::test]
    async fn test_irrelevant_kind_causes_zero_store_interaction() {
        let (reconciler, store) = reconciler(MockStore::default());
        let event = WebhookEvent {
            kind: WebhookEventKind::CheckoutExpired,
            ..completed_event("usr_1", &[])
        };

        assert_eq!(
            reconciler.process(&event).await.unwrap(),
            ReconcileOutcome::Ignored
        );
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_profile_row_surfaces_not_found() {
        let (reconciler, _store) = reconciler(MockStore::default());
        let event = completed_event("usr_ghost", &[(KEY_CATEGORY, "pitching")]);

        let err = reconciler.process(&event).await.unwrap_err();
        assert!(matches!(err, RegistrationError::ProfileNotFound { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_missing_client_reference_is_a_parse_error() {
        let (reconciler, store) = reconciler(MockStore::default());
        let mut event = completed_event("usr_1", &[]);
        event.client_reference_id = None;

        let err = reconciler.process(&event).await.unwrap_err();
        assert!(matches!(err, RegistrationError::WebhookParse(_)));
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
    }
}
