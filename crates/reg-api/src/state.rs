//! # Application State
//!
//! Shared state for the Axum application: the checkout gateway, the
//! profile store, the reconciler, and the price table. Both collaborators
//! are constructed once at startup after configuration validation and
//! injected here; nothing reaches for ambient globals.

use reg_core::{PriceTable, Reconciler, RegistrationError, SharedGateway, SharedStore};
use reg_store::PostgresProfileStore;
use reg_stripe::StripeGateway;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Base URL the registrant is redirected back to after checkout
    pub base_url: String,
    /// Profile store connection string
    pub database_url: String,
    /// CORS origin allow-list
    pub allowed_origins: Vec<String>,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables, refusing to start when a required
    /// variable is absent.
    ///
    /// Required: `DATABASE_URL`, `ALLOWED_ORIGINS` (comma-separated).
    /// Optional: `HOST`, `PORT`, `BASE_URL`, `ENVIRONMENT`.
    pub fn from_env() -> Result<Self, RegistrationError> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL").map_err(|_| {
            RegistrationError::Configuration("DATABASE_URL not set".to_string())
        })?;

        let allowed_origins: Vec<String> = std::env::var("ALLOWED_ORIGINS")
            .map_err(|_| {
                RegistrationError::Configuration("ALLOWED_ORIGINS not set".to_string())
            })?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if allowed_origins.is_empty() {
            return Err(RegistrationError::Configuration(
                "ALLOWED_ORIGINS must list at least one origin".to_string(),
            ));
        }

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            database_url,
            allowed_origins,
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, RegistrationError> {
        format!("{}:{}", self.host, self.port).parse().map_err(|_| {
            RegistrationError::Configuration(format!(
                "Invalid bind address {}:{}",
                self.host, self.port
            ))
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Redirect targets handed to the provider at session creation
#[derive(Debug, Clone)]
pub struct RedirectUrls {
    pub base_url: String,
}

impl RedirectUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn success_url(&self) -> String {
        format!(
            "{}/payment/success?session_id={{CHECKOUT_SESSION_ID}}",
            self.base_url
        )
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/payment/cancel", self.base_url)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment provider gateway
    pub gateway: SharedGateway,
    /// Profile store
    pub store: SharedStore,
    /// Webhook reconciler over the same store
    pub reconciler: Reconciler,
    /// Deployment price table
    pub prices: PriceTable,
    /// Checkout redirect URLs
    pub urls: RedirectUrls,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create the production state: validate configuration, then wire the
    /// Stripe gateway and Postgres store for the process lifetime.
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let gateway = StripeGateway::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        let store = PostgresProfileStore::connect(&config.database_url)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize profile store: {}", e))?;

        let prices = load_price_table();
        let urls = RedirectUrls::new(&config.base_url);

        Ok(Self::from_parts(
            Arc::new(gateway),
            Arc::new(store),
            prices,
            urls,
            config,
        ))
    }

    /// Assemble state from explicit collaborators (used by tests)
    pub fn from_parts(
        gateway: SharedGateway,
        store: SharedStore,
        prices: PriceTable,
        urls: RedirectUrls,
        config: AppConfig,
    ) -> Self {
        let reconciler = Reconciler::new(store.clone());
        Self {
            gateway,
            store,
            reconciler,
            prices,
            urls,
            config,
        }
    }
}

/// Load the price table from config file, falling back to defaults
fn load_price_table() -> PriceTable {
    let config_paths = [
        "config/prices.toml",
        "../config/prices.toml",
        "../../config/prices.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            match toml::from_str::<PriceTable>(&content) {
                Ok(prices) => {
                    tracing::info!("Loaded price table from {}", path);
                    return prices;
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path, e);
                }
            }
        }
    }

    tracing::warn!("No price config found, using default price table");
    PriceTable::default()
}
