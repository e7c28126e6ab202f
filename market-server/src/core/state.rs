use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::{Config, Result};
use crate::db::{MarketStore, MemoryStore, PgStore};

/// Server state shared by every handler
///
/// Cheap to clone: the store and JWT service sit behind `Arc`.
///
/// | Field | Meaning |
/// |-------|---------|
/// | config | immutable configuration |
/// | store | persistence behind the [`MarketStore`] interface |
/// | jwt_service | token verification |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Arc<dyn MarketStore>,
    pub jwt_service: Arc<JwtService>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("store", &self.store.kind())
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// Build state around an existing store
    pub fn new(config: Config, store: Arc<dyn MarketStore>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            store,
            jwt_service,
        }
    }

    /// Initialize state from configuration
    ///
    /// Connects to PostgreSQL and applies migrations when `DATABASE_URL` is
    /// set, otherwise falls back to an empty in-memory store.
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.validate()?;

        let store: Arc<dyn MarketStore> = match &config.database_url {
            Some(url) => {
                let store = PgStore::connect(url, config.database_max_connections).await?;
                tracing::info!("Connected to PostgreSQL");
                Arc::new(store)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory store (data is not persisted)");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::new(config.clone(), store))
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    pub fn store(&self) -> &dyn MarketStore {
        self.store.as_ref()
    }
}
