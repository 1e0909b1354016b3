//! Application State

use std::sync::Arc;

use storefront_core::{UserProfile, UserRole};

use crate::catalog::{seed_plans, OrderBook, TenantStore};

/// Server configuration, read from the environment
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Publishable gateway key handed to clients
    pub key_id: String,

    /// Gateway signing secret used to verify confirmations
    pub key_secret: String,

    /// When set, orders settle via `/api/payment/simulate` without a widget
    pub test_mode: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            key_id: std::env::var("STOREFRONT_KEY_ID").unwrap_or_else(|_| "key_dev".into()),
            key_secret: std::env::var("STOREFRONT_KEY_SECRET")
                .unwrap_or_else(|_| "whsec_dev".into()),
            test_mode: std::env::var("STOREFRONT_TEST_MODE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Seeded plan catalog
    pub catalog: Arc<Vec<storefront_payments::Plan>>,

    /// Pending gateway orders awaiting verification
    pub orders: Arc<OrderBook>,

    /// The single dev tenant's subscription record
    pub tenant: Arc<TenantStore>,

    /// The signed-in user reported by `/api/user`
    pub user: Arc<UserProfile>,

    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// State with the seeded catalog and a fresh tenant
    pub fn new(config: ServerConfig) -> Self {
        Self {
            catalog: Arc::new(seed_plans()),
            orders: Arc::new(OrderBook::new()),
            tenant: Arc::new(TenantStore::new()),
            user: Arc::new(UserProfile {
                id: "user_dev".into(),
                name: "Dev Owner".into(),
                email: "owner@example.com".into(),
                role: UserRole::Owner,
            }),
            config: Arc::new(config),
        }
    }

    /// Same state with a different signed-in user
    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.user = Arc::new(user);
        self
    }
}
