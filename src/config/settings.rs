use crate::core::{NanoAccount, DEFAULT_PREFIX};
use crate::error::{NanoError, Result};
use crate::network::retry::DEFAULT_MAX_ATTEMPTS;
use crate::wallet::DEFAULT_RECEIVE_BATCH_SIZE;
use serde::{Deserialize, Deserializer};
use std::env;
use std::fs;
use std::path::Path;

const ADDRESS_PREFIX_KEY: &str = "NANO_ADDRESS_PREFIX";
const DEFAULT_REPRESENTATIVE_KEY: &str = "NANO_DEFAULT_REPRESENTATIVE";
const MAX_PUBLISH_ATTEMPTS_KEY: &str = "NANO_MAX_PUBLISH_ATTEMPTS";
const RECEIVE_BATCH_SIZE_KEY: &str = "NANO_RECEIVE_BATCH_SIZE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub address_prefix: String,
    /// Address used as representative when an account is opened
    pub default_representative: Option<String>,
    pub max_publish_attempts: u32,
    pub receive_batch_size: usize,
    /// Smallest pending amount, in raw, that `receive_pending` picks up
    #[serde(deserialize_with = "deserialize_raw")]
    pub receive_threshold_raw: u128,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            address_prefix: DEFAULT_PREFIX.to_string(),
            default_representative: None,
            max_publish_attempts: DEFAULT_MAX_ATTEMPTS,
            receive_batch_size: DEFAULT_RECEIVE_BATCH_SIZE,
            receive_threshold_raw: 0,
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Settings> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Settings> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Defaults overlaid with whatever `NANO_*` variables are set
    pub fn from_env() -> Result<Settings> {
        Settings::default().overlay_env()
    }

    pub fn overlay_env(self) -> Result<Settings> {
        self.overlay_with(|key| env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by environment variable name
    pub fn overlay_with<F>(mut self, lookup: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prefix) = lookup(ADDRESS_PREFIX_KEY) {
            self.address_prefix = prefix;
        }
        if let Some(representative) = lookup(DEFAULT_REPRESENTATIVE_KEY) {
            self.default_representative = Some(representative);
        }
        if let Some(attempts) = lookup(MAX_PUBLISH_ATTEMPTS_KEY) {
            self.max_publish_attempts = parse_number(MAX_PUBLISH_ATTEMPTS_KEY, &attempts)?;
        }
        if let Some(size) = lookup(RECEIVE_BATCH_SIZE_KEY) {
            self.receive_batch_size = parse_number(RECEIVE_BATCH_SIZE_KEY, &size)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.address_prefix.is_empty()
            || !self.address_prefix.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(NanoError::Config(format!(
                "invalid address prefix '{}'",
                self.address_prefix
            )));
        }
        if self.max_publish_attempts == 0 {
            return Err(NanoError::Config(
                "max_publish_attempts must be at least 1".to_string(),
            ));
        }
        if self.receive_batch_size == 0 {
            return Err(NanoError::Config(
                "receive_batch_size must be at least 1".to_string(),
            ));
        }
        self.representative_account()?;
        Ok(())
    }

    /// The default representative re-addressed with this prefix
    pub fn representative_account(&self) -> Result<Option<NanoAccount>> {
        let Some(text) = &self.default_representative else {
            return Ok(None);
        };
        let account = NanoAccount::parse(text).map_err(|e| {
            NanoError::Config(format!("invalid default representative '{text}': {e}"))
        })?;
        account
            .with_prefix(&self.address_prefix)
            .map(Some)
            .map_err(|e| NanoError::Config(e.to_string()))
    }
}

/// Raw amounts overflow TOML integers, so a decimal string is accepted too
fn deserialize_raw<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u128, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Integer(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Integer(value) => Ok(u128::from(value)),
        Raw::Text(text) => text
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid raw amount '{text}'"))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, text: &str) -> Result<T> {
    text.trim()
        .parse()
        .map_err(|_| NanoError::Config(format!("{key} must be a non-negative integer, got '{text}'")))
}
