//! Configuration loading (SPEC_FULL.md §4.9).
//!
//! Grounded on `config.py`'s field set (`inbox_storage_alias`,
//! `interrogation_storage_alias`, `data_hub_private_key`, the S3 object-storages
//! map, the central client's `central_api_public_key`/`central_api_url`, logging
//! level) and `adapters/outbound/http.py`'s transport settings. Loaded from a YAML
//! file with `DHFS_`-prefixed environment overrides, matching `hexkit`'s
//! `config_from_yaml` layering as closely as `figment` allows.

use std::collections::HashMap;
use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use secrecy::Secret;
use serde::Deserialize;
use thiserror::Error;

fn default_inbox_storage_alias() -> String {
    "inbox".to_string()
}

fn default_interrogation_storage_alias() -> String {
    "interrogation".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_http_max_retries() -> u32 {
    5
}

fn default_http_timeout_secs() -> u64 {
    30
}

/// One entry of the `object_storages` alias map: which bucket an alias resolves
/// to, and the S3-compatible endpoint credentials used to reach it.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectStorageEntry {
    pub bucket_id: String,
    pub endpoint_url: String,
    pub access_key_id: String,
    pub secret_access_key: Secret<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_inbox_storage_alias")]
    pub inbox_storage_alias: String,
    #[serde(default = "default_interrogation_storage_alias")]
    pub interrogation_storage_alias: String,

    pub object_storages: HashMap<String, ObjectStorageEntry>,

    /// Crypt4GH private key material specific to the data hub running this
    /// worker. Doubles as the HKDF input for JWT signing (DESIGN.md Open
    /// Question 3).
    pub data_hub_private_key: Secret<String>,

    pub central_api_url: String,
    /// Crypt4GH public key the central API publishes for secret wrapping.
    pub central_api_public_key: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_http_max_retries")]
    pub http_max_retries: u32,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),
    #[error("object storage alias {alias:?} is not present in object_storages")]
    MissingStorageAlias { alias: String },
}

impl Config {
    /// Load from `path` (YAML), then apply `DHFS_`-prefixed environment
    /// overrides, matching the precedence `hexkit`'s `config_from_yaml` gives
    /// the original service.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Config = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("DHFS_").split("__"))
            .extract()?;

        for alias in [&config.inbox_storage_alias, &config.interrogation_storage_alias] {
            if !config.object_storages.contains_key(alias) {
                return Err(ConfigError::MissingStorageAlias { alias: alias.clone() });
            }
        }

        Ok(config)
    }

    pub fn bucket_id_for_alias(&self, alias: &str) -> Option<String> {
        self.object_storages.get(alias).map(|e| e.bucket_id.clone())
    }
}
