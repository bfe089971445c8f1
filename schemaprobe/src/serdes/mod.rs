use std::collections::hash_map::Entry;
use std::collections::HashMap;

use apache_avro::types::Value;
use apache_avro::{from_avro_datum, Schema};

use crate::config::SerdesConfig;
use crate::error::{ExtractError, RegistryError};

pub mod extractor;
pub mod registry;
pub mod wire;

pub use extractor::{DecodedRecord, MessageExtractor};
pub use registry::{HttpRegistryClient, HttpRegistryConnector, RegistryClient, RegistryConnector};

pub mod config {
    pub const SCHEMA_REGISTRY_URL: &str = "schema.registry.url";
    pub const DEBUG: &str = "debug";
    pub const REQUEST_TIMEOUT_MS: &str = "request.timeout.ms";
}

/// The schema registry binding: a registry client plus the schemas it has
/// already resolved.
pub struct Serdes<R: RegistryClient> {
    client: R,
    debug: bool,
    schemas: HashMap<u32, Schema>,
}

impl<R: RegistryClient> Serdes<R> {
    pub fn create<C>(config: &SerdesConfig, connector: &C) -> Result<Self, RegistryError>
    where
        C: RegistryConnector<Client = R>,
    {
        let client = connector.connect(config)?;
        Ok(Self::new(client, config.debug()))
    }

    pub fn new(client: R, debug: bool) -> Self {
        Self {
            client,
            debug,
            schemas: HashMap::new(),
        }
    }

    /// Decodes a framed payload. `part` names the message part in errors.
    pub fn deserialize(
        &mut self,
        part: &'static str,
        data: &[u8],
    ) -> Result<(u32, Value), ExtractError> {
        let (schema_id, mut datum) = wire::split_framed(data)?;
        let schema = self.schema(schema_id)?;

        let value =
            from_avro_datum(schema, &mut datum, None).map_err(|e| ExtractError::Decode {
                part,
                schema_id,
                reason: e.to_string(),
            })?;

        if self.debug {
            debug!("Decoded {} with schema {}: {:?}", part, schema_id, value);
        }
        Ok((schema_id, value))
    }

    pub fn cached_schemas(&self) -> usize {
        self.schemas.len()
    }

    pub fn destroy(self) {
        debug!("Dropping {} cached schemas", self.schemas.len());
    }

    fn schema(&mut self, id: u32) -> Result<&Schema, RegistryError> {
        match self.schemas.entry(id) {
            Entry::Occupied(e) => Ok(&*e.into_mut()),
            Entry::Vacant(e) => {
                let definition = self.client.fetch_schema(id)?;
                let schema = Schema::parse_str(&definition).map_err(|err| {
                    RegistryError::InvalidSchema {
                        id,
                        reason: err.to_string(),
                    }
                })?;

                if self.debug {
                    debug!("Resolved schema {}: {}", id, definition);
                }
                Ok(&*e.insert(schema))
            }
        }
    }
}
