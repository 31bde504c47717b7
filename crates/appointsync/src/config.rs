use std::{env, time::Duration};

use anyhow::{bail, Result};

/// Which [`appointsync_core::storage::ItemStore`] backs the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    DynamoDb,
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "dynamodb" => Ok(Self::DynamoDb),
            "memory" | "inmemory" => Ok(Self::Memory),
            other => bail!("Unknown STORE_BACKEND '{other}', expected 'dynamodb' or 'memory'"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Table holding customer profiles (default: "user-links")
    pub user_links_table: String,
    /// Sort key value of the storefront profile (default: "les-aimants")
    pub storefront_profile: String,
    /// Store backend (default: dynamodb)
    pub store_backend: StoreBackend,
    /// Custom DynamoDB endpoint, e.g. a local emulator
    pub aws_endpoint_url: Option<String>,
    /// AWS region override; the SDK default chain applies otherwise
    pub aws_region: Option<String>,
    /// Scheduling API base URL (default: "https://acuityscheduling.com/api/v1")
    pub acuity_base_url: String,
    pub acuity_user_id: String,
    pub acuity_api_key: String,
    /// Scheduling API request timeout in seconds (default: 10)
    pub upstream_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `USER_LINKS_TABLE` - Profile table name (default: "user-links")
    /// - `STOREFRONT_PROFILE` - Profile sort key value (default: "les-aimants")
    /// - `STORE_BACKEND` - `dynamodb` or `memory` (default: "dynamodb")
    /// - `AWS_ENDPOINT_URL` - DynamoDB endpoint override (optional)
    /// - `AWS_REGION` - AWS region override (optional)
    /// - `ACUITY_BASE_URL` - Scheduling API base URL
    /// - `ACUITY_USER_ID` / `ACUITY_API_KEY` - Scheduling API credentials (default: empty)
    /// - `UPSTREAM_TIMEOUT_SECONDS` - Scheduling API timeout (default: 10)
    pub fn from_env() -> Result<Self> {
        let store_backend = match env::var("STORE_BACKEND") {
            Ok(value) => StoreBackend::parse(&value)?,
            Err(_) => StoreBackend::DynamoDb,
        };

        Ok(Self {
            user_links_table: env::var("USER_LINKS_TABLE")
                .unwrap_or_else(|_| "user-links".to_string()),
            storefront_profile: env::var("STOREFRONT_PROFILE")
                .unwrap_or_else(|_| "les-aimants".to_string()),
            store_backend,
            aws_endpoint_url: env::var("AWS_ENDPOINT_URL").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            acuity_base_url: env::var("ACUITY_BASE_URL")
                .unwrap_or_else(|_| "https://acuityscheduling.com/api/v1".to_string()),
            acuity_user_id: env::var("ACUITY_USER_ID").unwrap_or_default(),
            acuity_api_key: env::var("ACUITY_API_KEY").unwrap_or_default(),
            upstream_timeout_seconds: env::var("UPSTREAM_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        })
    }

    /// Get the upstream timeout as a Duration.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_timeout_conversion() {
        let config = Config {
            user_links_table: "links".to_string(),
            storefront_profile: "main".to_string(),
            store_backend: StoreBackend::Memory,
            aws_endpoint_url: None,
            aws_region: None,
            acuity_base_url: "http://localhost".to_string(),
            acuity_user_id: String::new(),
            acuity_api_key: String::new(),
            upstream_timeout_seconds: 3,
        };

        assert_eq!(config.upstream_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!(StoreBackend::parse("DynamoDB").unwrap(), StoreBackend::DynamoDb);
        assert_eq!(StoreBackend::parse("memory").unwrap(), StoreBackend::Memory);
        assert!(StoreBackend::parse("sqlite").is_err());
    }

    // The only test touching the process environment.
    #[test]
    fn test_default_values() {
        for name in [
            "USER_LINKS_TABLE",
            "STOREFRONT_PROFILE",
            "STORE_BACKEND",
            "ACUITY_BASE_URL",
            "UPSTREAM_TIMEOUT_SECONDS",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env().unwrap();

        assert_eq!(config.user_links_table, "user-links");
        assert_eq!(config.storefront_profile, "les-aimants");
        assert_eq!(config.store_backend, StoreBackend::DynamoDb);
        assert_eq!(config.acuity_base_url, "https://acuityscheduling.com/api/v1");
        assert_eq!(config.upstream_timeout_seconds, 10);
    }
}
