//! Fixtures shared by handler and routing tests.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use appointsync_core::storage::ItemStore;

use crate::pipeline::{InboundEvent, RequestContext, Validated};
use crate::profiles::ProfileStore;
use crate::scheduling::testing::FakeScheduling;
use crate::state::AppState;
use crate::storage::inmemory::InMemoryStore;
use crate::storage::Repository;

pub const TABLE: &str = "user-links";
pub const PROFILE: &str = "les-aimants";

pub fn memory_store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::with_tables([(TABLE, ProfileStore::key_schema())]))
}

pub fn profiles(store: Arc<dyn ItemStore>) -> ProfileStore {
    let repository = Repository::new(store, TABLE, ProfileStore::key_schema());
    ProfileStore::new(Arc::new(repository), PROFILE)
}

pub fn app_state(scheduling: Arc<FakeScheduling>, store: Arc<dyn ItemStore>) -> AppState {
    AppState::new(scheduling, profiles(store))
}

pub fn authorizer() -> Value {
    json!({
        "shopifyCustomerId": "7001",
        "email": "ada@example.com",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "phone": "+59899111222",
        "shopDomain": "shop.example.com"
    })
}

pub fn event(method: &str, resource: &str, authorizer: Value, body: Option<Value>) -> InboundEvent {
    InboundEvent {
        resource: Some(resource.to_string()),
        path: Some(resource.to_string()),
        http_method: method.to_string(),
        body: body.map(|body| body.to_string()),
        request_context: Some(RequestContext {
            authorizer: authorizer.as_object().cloned().or_else(|| Some(Map::new())),
            request_id: Some("req-1".to_string()),
        }),
        ..InboundEvent::default()
    }
}

pub fn validated<T>(body: T, authorizer: Value) -> Validated<T> {
    Validated {
        event: event("POST", "/", authorizer, None),
        body,
    }
}
