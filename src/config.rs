//! Startup configuration from environment variables.
//!
//! | Variable | Default | |
//! |---|---|---|
//! | `BIND_ADDR` | `0.0.0.0` | listen address |
//! | `PORT` | `8080` | listen port |
//! | `ARTICLES_COLLECTION` | `articles` | collection holding the articles |
//! | `ARTICLES_STORE` | `firestore` | `firestore` or `memory` |
//! | `FIRESTORE_PROJECT_ID` | `GOOGLE_CLOUD_PROJECT` | required for `firestore` |
//! | `FIRESTORE_DATABASE` | `(default)` | |
//! | `FIRESTORE_EMULATOR_HOST` | unset | `host:port` of a local emulator |
//! | `FIRESTORE_ACCESS_TOKEN` | unset | static bearer token; else metadata server |
//! | `FIRESTORE_TIMEOUT_SECS` | `30` | per-request timeout, at least 1 |

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;
use crate::store::{DocumentStore, FirestoreConfig, FirestoreStore, MemoryStore, SharedStore};

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub addr: SocketAddr,
    pub collection: String,
    pub store: StoreConfig,
}

/// Which [`DocumentStore`] backs the endpoint.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreConfig {
    Firestore(FirestoreConfig),
    Memory,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any variable source. Blank values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let ip: IpAddr = parse(&var, "BIND_ADDR")?.unwrap_or(IpAddr::from([0, 0, 0, 0]));
        let port: u16 = parse(&var, "PORT")?.unwrap_or(8080);
        let collection = var("ARTICLES_COLLECTION").unwrap_or_else(|| "articles".to_owned());

        let store = match var("ARTICLES_STORE").as_deref() {
            None | Some("firestore") => {
                let project_id = var("FIRESTORE_PROJECT_ID")
                    .or_else(|| var("GOOGLE_CLOUD_PROJECT"))
                    .ok_or_else(|| {
                        Error::Config("FIRESTORE_PROJECT_ID is required for the firestore store".to_owned())
                    })?;
                let timeout_secs: u64 = parse(&var, "FIRESTORE_TIMEOUT_SECS")?.unwrap_or(30);

                let mut firestore = FirestoreConfig::new(project_id);
                if let Some(database) = var("FIRESTORE_DATABASE") {
                    firestore.database = database;
                }
                firestore.emulator_host = var("FIRESTORE_EMULATOR_HOST");
                firestore.access_token = var("FIRESTORE_ACCESS_TOKEN");
                firestore.timeout = Duration::from_secs(timeout_secs.max(1));
                StoreConfig::Firestore(firestore)
            }
            Some("memory") => StoreConfig::Memory,
            Some(other) => {
                return Err(Error::Config(format!(
                    "ARTICLES_STORE must be `firestore` or `memory`, got `{other}`"
                )));
            }
        };

        Ok(Self { addr: SocketAddr::new(ip, port), collection, store })
    }
}

impl StoreConfig {
    /// The process-wide store handle. Nothing connects until first use.
    pub fn shared_store(&self) -> SharedStore {
        match self {
            Self::Memory => SharedStore::ready(Arc::new(MemoryStore::new())),
            Self::Firestore(config) => {
                let config = config.clone();
                SharedStore::lazy(move || {
                    let connected = FirestoreStore::connect(&config)
                        .map(|store| Arc::new(store) as Arc<dyn DocumentStore>);
                    async move { connected }
                })
            }
        }
    }
}

fn parse<T>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    var(key)
        .map(|value| {
            value
                .parse()
                .map_err(|e| Error::Config(format!("{key}=`{value}`: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::{Config, StoreConfig};
    use crate::error::Error;
    use crate::store::FirestoreConfig;

    fn config(vars: &[(&str, &str)]) -> Result<Config, Error> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_project() {
        let config = config(&[("FIRESTORE_PROJECT_ID", "shop-prod")]).unwrap();

        assert_eq!(config.addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.collection, "articles");
        assert_eq!(config.store, StoreConfig::Firestore(FirestoreConfig::new("shop-prod")));
    }

    #[test]
    fn test_firestore_overrides() {
        let config = config(&[
            ("GOOGLE_CLOUD_PROJECT", "shop-dev"),
            ("FIRESTORE_DATABASE", "catalog"),
            ("FIRESTORE_EMULATOR_HOST", "localhost:8085"),
            ("FIRESTORE_TIMEOUT_SECS", "0"),
        ])
        .unwrap();

        let StoreConfig::Firestore(firestore) = config.store else {
            panic!("expected firestore store");
        };
        assert_eq!(firestore.project_id, "shop-dev");
        assert_eq!(firestore.database, "catalog");
        assert_eq!(firestore.emulator_host.as_deref(), Some("localhost:8085"));
        assert_eq!(firestore.access_token, None);
        assert_eq!(firestore.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_memory_store_needs_no_project() {
        let config = config(&[
            ("ARTICLES_STORE", "memory"),
            ("BIND_ADDR", "127.0.0.1"),
            ("PORT", "3000"),
            ("ARTICLES_COLLECTION", "products"),
        ])
        .unwrap();

        assert_eq!(config.addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.collection, "products");
        assert_eq!(config.store, StoreConfig::Memory);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(config(&[]), Err(Error::Config(_))));
        assert!(matches!(config(&[("ARTICLES_STORE", "redis")]), Err(Error::Config(_))));
        assert!(matches!(
            config(&[("ARTICLES_STORE", "memory"), ("PORT", "http")]),
            Err(Error::Config(msg)) if msg.starts_with("PORT=`http`")
        ));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = config(&[("ARTICLES_STORE", "memory"), ("PORT", "  ")]).unwrap();

        assert_eq!(config.addr.port(), 8080);
    }
}
