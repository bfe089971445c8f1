use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;

use crate::config::SerdesConfig;
use crate::error::RegistryError;

const SCHEMA_REGISTRY_MEDIA_TYPE: &str = "application/vnd.schemaregistry.v1+json";

/// Resolves schema ids embedded in payloads to schema definitions.
pub trait RegistryClient {
    /// Fetches the schema definition (JSON text) registered under `id`.
    fn fetch_schema(&self, id: u32) -> Result<String, RegistryError>;
}

/// Builds registry clients from a validated serdes config.
pub trait RegistryConnector {
    type Client: RegistryClient;

    fn connect(&self, config: &SerdesConfig) -> Result<Self::Client, RegistryError>;
}

#[derive(Debug, Deserialize)]
struct SchemaResponse {
    schema: String,
}

/// Blocking HTTP client for a Confluent-compatible schema registry.
pub struct HttpRegistryClient {
    base_url: String,
    http_client: Client,
}

impl HttpRegistryClient {
    pub fn new(config: &SerdesConfig) -> Result<Self, RegistryError> {
        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| RegistryError::Client(e.to_string()))?;

        Ok(Self {
            base_url: config.registry_url().trim_end_matches('/').to_owned(),
            http_client,
        })
    }
}

impl RegistryClient for HttpRegistryClient {
    fn fetch_schema(&self, id: u32) -> Result<String, RegistryError> {
        let url = format!("{}/schemas/ids/{}", self.base_url, id);
        debug!("Fetching schema {} from {}", id, url);

        let response = self
            .http_client
            .get(&url)
            .header(ACCEPT, SCHEMA_REGISTRY_MEDIA_TYPE)
            .send()
            .map_err(|e| RegistryError::Request {
                id,
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RegistryError::Status {
                id,
                status: response.status().as_u16(),
            });
        }

        let body: SchemaResponse = response.json().map_err(|e| RegistryError::Request {
            id,
            reason: e.to_string(),
        })?;

        Ok(body.schema)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HttpRegistryConnector;

impl RegistryConnector for HttpRegistryConnector {
    type Client = HttpRegistryClient;

    fn connect(&self, config: &SerdesConfig) -> Result<Self::Client, RegistryError> {
        HttpRegistryClient::new(config)
    }
}
