//! Shared application state.
//!
//! Built once per process and cloned into every route. Holds the scheduling
//! client and the profile store; the store backend is chosen by configuration.

use std::sync::Arc;

use anyhow::Result;
use appointsync_core::storage::ItemStore;

use crate::config::{Config, StoreBackend};
use crate::profiles::ProfileStore;
use crate::scheduling::{AcuityClient, AcuitySettings, SchedulingApi};
use crate::storage::inmemory::InMemoryStore;
use crate::storage::Repository;

#[derive(Clone)]
pub struct AppState {
    pub scheduling: Arc<dyn SchedulingApi>,
    pub profiles: ProfileStore,
}

impl AppState {
    pub fn new(scheduling: Arc<dyn SchedulingApi>, profiles: ProfileStore) -> Self {
        Self {
            scheduling,
            profiles,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let store = item_store(config)?;
        let repository = Repository::new(
            store,
            config.user_links_table.clone(),
            ProfileStore::key_schema(),
        );
        let profiles = ProfileStore::new(Arc::new(repository), config.storefront_profile.clone());

        let scheduling = AcuityClient::new(AcuitySettings {
            base_url: config.acuity_base_url.clone(),
            user_id: config.acuity_user_id.clone(),
            api_key: config.acuity_api_key.clone(),
            timeout: config.upstream_timeout(),
        })?;

        tracing::info!(
            backend = ?config.store_backend,
            table = %config.user_links_table,
            profile = %config.storefront_profile,
            "Application state initialized"
        );

        Ok(Self::new(Arc::new(scheduling), profiles))
    }
}

fn item_store(config: &Config) -> Result<Arc<dyn ItemStore>> {
    match config.store_backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryStore::with_tables([(
            config.user_links_table.clone(),
            ProfileStore::key_schema(),
        )]))),
        #[cfg(feature = "dynamodb")]
        StoreBackend::DynamoDb => {
            use crate::storage::dynamodb::{DynamoDbSettings, DynamoDbStore};

            Ok(Arc::new(DynamoDbStore::new(DynamoDbSettings {
                region: config.aws_region.clone(),
                endpoint_url: config.aws_endpoint_url.clone(),
            })))
        }
        #[cfg(not(feature = "dynamodb"))]
        StoreBackend::DynamoDb => anyhow::bail!(
            "STORE_BACKEND=dynamodb requires the 'dynamodb' feature. \
            Rebuild with: cargo build -p appointsync --features dynamodb"
        ),
    }
}
