//! Customer profiles kept in the user-links table.

use std::sync::Arc;

use appointsync_core::appointments::Customer;
use appointsync_core::item::{AttributeValue, Item, Key, KeySchema};
use appointsync_core::storage::Result;

use crate::storage::Repository;

pub const PARTITION_KEY: &str = "customerId";
pub const SORT_KEY: &str = "profile";

/// One profile per customer and storefront.
#[derive(Clone)]
pub struct ProfileStore {
    repository: Arc<Repository>,
    profile: String,
}

impl ProfileStore {
    pub fn new(repository: Arc<Repository>, profile: impl Into<String>) -> Self {
        Self {
            repository,
            profile: profile.into(),
        }
    }

    pub fn key_schema() -> KeySchema {
        KeySchema::new(PARTITION_KEY).with_sort_key(SORT_KEY)
    }

    pub fn key(&self, customer_id: &str) -> Key {
        Key::partition(PARTITION_KEY, customer_id).with_sort(SORT_KEY, &self.profile)
    }

    pub async fn get(&self, customer_id: &str) -> Result<Option<Item>> {
        self.repository.get(&self.key(customer_id)).await
    }

    pub async fn exists(&self, customer_id: &str) -> Result<bool> {
        self.repository.exist(&self.key(customer_id)).await
    }

    /// Writes the profile of `customer_id`, replacing its attributes with the
    /// non-null entries of `attributes`.
    ///
    /// `createdAt` keeps its stored value unless given; `updatedAt` is always set.
    /// Both are epoch milliseconds.
    pub async fn upsert_profile(&self, customer_id: &str, attributes: &Item) -> Result<Item> {
        let key = self.key(customer_id);
        let existing = self.repository.get(&key).await?;
        let now = AttributeValue::from(chrono::Utc::now().timestamp_millis());

        let mut item = key.to_item();
        for (name, value) in attributes {
            if !value.is_null() && !item.contains_key(name) {
                item.insert(name.clone(), value.clone());
            }
        }

        if !item.contains_key("createdAt") {
            let created_at = existing
                .as_ref()
                .and_then(|stored| stored.get("createdAt"))
                .filter(|value| !value.is_null())
                .cloned()
                .unwrap_or_else(|| now.clone());
            item.insert("createdAt".to_string(), created_at);
        }
        item.insert("updatedAt".to_string(), now);

        self.repository.save(&item).await?;
        tracing::info!(customer_id, profile = %self.profile, created = existing.is_none(), "Profile saved");
        Ok(item)
    }

    /// Stores the authorizer attributes of `customer`. Customers without an id are
    /// skipped.
    pub async fn upsert_customer(&self, customer: &Customer) -> Result<Option<Item>> {
        match &customer.customer_id {
            Some(customer_id) => self
                .upsert_profile(customer_id, &customer.profile_attributes())
                .await
                .map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::inmemory::InMemoryStore;

    fn profiles() -> ProfileStore {
        let store = InMemoryStore::with_tables([("user-links", ProfileStore::key_schema())]);
        let repository = Repository::new(Arc::new(store), "user-links", ProfileStore::key_schema());
        ProfileStore::new(Arc::new(repository), "les-aimants")
    }

    fn customer() -> Customer {
        Customer {
            customer_id: Some("7001".to_string()),
            email: Some("ada@example.com".to_string()),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: "+59899111222".to_string(),
            shop_domain: "shop.example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_creates_profile_with_timestamps() {
        let profiles = profiles();

        let item = profiles.upsert_customer(&customer()).await.unwrap().unwrap();

        assert_eq!(item["customerId"].as_str(), Some("7001"));
        assert_eq!(item["profile"].as_str(), Some("les-aimants"));
        assert_eq!(item["email"].as_str(), Some("ada@example.com"));
        assert!(item["createdAt"].as_number().is_some());
        assert_eq!(item["createdAt"], item["updatedAt"]);
        assert!(profiles.exists("7001").await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_preserves_created_at() {
        let profiles = profiles();
        let mut seeded = profiles.key("7001").to_item();
        seeded.insert("createdAt".to_string(), 1_000_i64.into());
        seeded.insert("nickname".to_string(), "old".into());
        profiles.repository.save(&seeded).await.unwrap();

        let item = profiles.upsert_customer(&customer()).await.unwrap().unwrap();

        assert_eq!(item["createdAt"], AttributeValue::from(1_000_i64));
        assert_ne!(item["updatedAt"], AttributeValue::from(1_000_i64));
        assert!(!item.contains_key("nickname"));
        assert_eq!(profiles.get("7001").await.unwrap(), Some(item));
    }

    #[tokio::test]
    async fn test_upsert_drops_null_attributes_and_keeps_keys() {
        let profiles = profiles();
        let mut attributes = Item::new();
        attributes.insert("email".to_string(), AttributeValue::Null);
        attributes.insert("profile".to_string(), "other".into());
        attributes.insert("phone".to_string(), "+598".into());

        let item = profiles.upsert_profile("7001", &attributes).await.unwrap();

        assert!(!item.contains_key("email"));
        assert_eq!(item["profile"].as_str(), Some("les-aimants"));
        assert_eq!(item["phone"].as_str(), Some("+598"));
    }

    #[tokio::test]
    async fn test_customer_without_id_is_skipped() {
        let profiles = profiles();
        let customer = Customer {
            customer_id: None,
            ..customer()
        };

        assert!(profiles.upsert_customer(&customer).await.unwrap().is_none());
        assert!(!profiles.exists("7001").await.unwrap());
    }
}
