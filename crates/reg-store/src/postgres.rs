//! # Postgres Profile Store
//!
//! sqlx-backed implementation of `ProfileStore` over the four per-category
//! profile tables. Table selection comes from the `Category` enum, never
//! from user input, so interpolating the table name into SQL is safe.

use async_trait::async_trait;
use reg_core::{Category, PaidUpdate, PaymentStatus, ProfileStore, RegistrationError,
    RegistrationResult};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, instrument};

/// PostgreSQL implementation of the profile store
pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    /// Create a store over an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the store with bounded timeouts.
    ///
    /// A timed-out acquire surfaces as a retryable `Store` error; the
    /// provider's webhook redelivery is the retry path.
    pub async fn connect(database_url: &str) -> RegistrationResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(std::time::Duration::from_secs(10))
            .connect(database_url)
            .await
            .map_err(|e| {
                RegistrationError::Configuration(format!("Failed to connect to store: {}", e))
            })?;

        Ok(Self::new(pool))
    }
}

/// Build the mark-paid UPDATE statement for a category's table.
///
/// `$1` = user_id, `$2` = stripe_session_id, `$3` = paid_at; side columns
/// take the next placeholders in is_gala, ticket_type order.
fn mark_paid_sql(category: Category, has_gala: bool, has_ticket: bool) -> String {
    let mut sets = vec![
        "payment_status = 'paid'".to_string(),
        "stripe_session_id = $2".to_string(),
        "paid_at = $3".to_string(),
    ];
    let mut next_placeholder = 4;
    if has_gala {
        sets.push(format!("is_gala = ${}", next_placeholder));
        next_placeholder += 1;
    }
    if has_ticket {
        sets.push(format!("ticket_type = ${}", next_placeholder));
    }

    format!(
        "UPDATE {} SET {} WHERE user_id = $1",
        category.table(),
        sets.join(", ")
    )
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    #[instrument(skip(self), fields(table = category.table()))]
    async fn payment_status(
        &self,
        category: Category,
        user_id: &str,
    ) -> RegistrationResult<PaymentStatus> {
        let sql = format!(
            "SELECT payment_status FROM {} WHERE user_id = $1",
            category.table()
        );

        let status: Option<String> = sqlx::query_scalar(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RegistrationError::Store(e.to_string()))?;

        match status {
            Some(s) => PaymentStatus::parse(&s),
            None => Err(RegistrationError::ProfileNotFound {
                table: category.table().to_string(),
                user_id: user_id.to_string(),
            }),
        }
    }

    #[instrument(skip(self, update), fields(table = category.table()))]
    async fn mark_paid(
        &self,
        category: Category,
        user_id: &str,
        update: &PaidUpdate,
    ) -> RegistrationResult<()> {
        let sql = mark_paid_sql(
            category,
            update.is_gala.is_some(),
            update.ticket_type.is_some(),
        );

        let mut query = sqlx::query(&sql)
            .bind(user_id)
            .bind(&update.stripe_session_id)
            .bind(update.paid_at);
        if let Some(gala) = update.is_gala {
            query = query.bind(gala);
        }
        if let Some(ref tier) = update.ticket_type {
            query = query.bind(tier);
        }

        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| RegistrationError::Store(e.to_string()))?;

        // The status read guarantees the row existed moments ago; a zero
        // row count here means it vanished in between.
        if result.rows_affected() == 0 {
            return Err(RegistrationError::ProfileNotFound {
                table: category.table().to_string(),
                user_id: user_id.to_string(),
            });
        }

        debug!(user_id, "Applied mark-paid update");
        Ok(())
    }
}
