use std::collections::HashMap;
use std::time::Duration;

use rdkafka::error::KafkaError;
use rdkafka::ClientConfig;
use reqwest::Url;

use crate::error::ConfigError;
use crate::serdes::config as serdes_config;

/// A non-fatal diagnostic returned by a successful `add`.
pub type Advisory = String;

/// Default timeout for a single schema registry request.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Key/value options handed to the broker client.
///
/// Every option is checked against librdkafka's own property table before it
/// is stored, so a config that was built successfully only holds options the
/// client accepts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConsumerConfig {
    options: HashMap<String, String>,
}

impl ConsumerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores an option. Last write wins.
    pub fn add(&mut self, name: &str, value: &str) -> Result<Option<Advisory>, ConfigError> {
        ClientConfig::new()
            .set(name, value)
            .create_native_config()
            .map_err(|e| invalid(name, value, native_reason(e)))?;

        Ok(store(&mut self.options, name, value))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        for (k, v) in self.iter() {
            config.set(k, v);
        }
        config
    }
}

/// Settings for the schema registry binding. Always holds a registry URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerdesConfig {
    options: HashMap<String, String>,
}

impl SerdesConfig {
    pub fn new(registry_url: &str) -> Result<Self, ConfigError> {
        let mut config = Self {
            options: HashMap::new(),
        };
        config.add(serdes_config::SCHEMA_REGISTRY_URL, registry_url)?;
        Ok(config)
    }

    /// Validates and stores an option. Last write wins.
    pub fn add(&mut self, name: &str, value: &str) -> Result<Option<Advisory>, ConfigError> {
        match name {
            serdes_config::SCHEMA_REGISTRY_URL => {
                let url = Url::parse(value).map_err(|e| invalid(name, value, e.to_string()))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(invalid(name, value, "expected an http or https URL".into()));
                }
            }
            serdes_config::DEBUG => {
                if !matches!(value, "" | "all" | "none") {
                    return Err(invalid(name, value, "expected one of: all, none".into()));
                }
            }
            serdes_config::REQUEST_TIMEOUT_MS => match value.parse::<u64>() {
                Ok(ms) if ms > 0 => {}
                _ => return Err(invalid(name, value, "expected a positive integer".into())),
            },
            _ => return Err(invalid(name, value, "no such serdes property".into())),
        }

        Ok(store(&mut self.options, name, value))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    pub fn registry_url(&self) -> &str {
        self.get(serdes_config::SCHEMA_REGISTRY_URL)
            .unwrap_or_default()
    }

    pub fn debug(&self) -> bool {
        self.get(serdes_config::DEBUG) == Some("all")
    }

    pub fn request_timeout(&self) -> Duration {
        let ms = self
            .get(serdes_config::REQUEST_TIMEOUT_MS)
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);
        Duration::from_millis(ms)
    }
}

fn store(options: &mut HashMap<String, String>, name: &str, value: &str) -> Option<Advisory> {
    match options.insert(name.to_owned(), value.to_owned()) {
        Some(prev) if prev != value => Some(format!(
            "{} was {:?}, overridden with {:?}",
            name, prev, value
        )),
        _ => None,
    }
}

fn invalid(name: &str, value: &str, reason: String) -> ConfigError {
    ConfigError::InvalidOption {
        name: name.to_owned(),
        value: value.to_owned(),
        reason,
    }
}

fn native_reason(e: KafkaError) -> String {
    match e {
        KafkaError::ClientConfig(_, desc, _, _) => desc,
        e => e.to_string(),
    }
}
