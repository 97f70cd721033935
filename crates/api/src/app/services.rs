use std::sync::Arc;

use orderdesk_infra::config::StoreConfig;
use orderdesk_infra::placement::PlacementService;
use orderdesk_infra::store::{InMemoryStore, PostgresStore, ShopStore};

/// The services handlers talk to: a store handle plus the placement
/// service built on top of it.
pub struct AppServices {
    store: Arc<dyn ShopStore>,
    placement: PlacementService,
}

impl AppServices {
    pub fn new(store: Arc<dyn ShopStore>) -> Self {
        let placement = PlacementService::new(store.clone());
        Self { store, placement }
    }

    pub fn store(&self) -> &Arc<dyn ShopStore> {
        &self.store
    }

    pub fn placement(&self) -> &PlacementService {
        &self.placement
    }
}

/// Pick the store from the environment: Postgres when `DATABASE_URL` is
/// set, the demo-seeded in-memory store otherwise (dev/test).
pub async fn build_services() -> AppServices {
    match StoreConfig::from_env() {
        Some(config) => {
            let store = PostgresStore::connect(&config)
                .await
                .expect("failed to connect to Postgres");
            store
                .run_migrations()
                .await
                .expect("failed to run migrations");
            tracing::info!("using Postgres store");
            AppServices::new(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store with demo data");
            AppServices::new(Arc::new(InMemoryStore::with_demo_data()))
        }
    }
}
