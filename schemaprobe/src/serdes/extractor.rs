use std::collections::HashMap;

use apache_avro::types::Value;

use crate::error::{ExtractError, FieldError};
use crate::kafka::RawMessage;

use super::registry::RegistryClient;
use super::{wire, Serdes};

/// Decoded state of one message. Never outlives the message it came from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedRecord {
    pub key: String,
    pub fields: HashMap<String, Value>,
}

/// Decodes message keys and values through the schema registry binding and
/// holds the result until `clear_values`.
pub struct MessageExtractor<R: RegistryClient> {
    serdes: Serdes<R>,
    decoded: Option<DecodedRecord>,
}

impl<R: RegistryClient> MessageExtractor<R> {
    pub fn new(serdes: Serdes<R>) -> Self {
        Self {
            serdes,
            decoded: None,
        }
    }

    /// Decodes the key and value of `m`. Any earlier decoded state is dropped
    /// first, so a failure always leaves the extractor empty.
    pub fn extract_key_and_value(&mut self, m: &RawMessage) -> Result<(), ExtractError> {
        self.decoded = None;

        let key = self.decode_key(m.key.as_deref())?;

        let payload = m.payload.as_deref().ok_or(ExtractError::NullValue)?;
        let (schema_id, value) = self.serdes.deserialize("value", payload)?;
        let fields = match value {
            Value::Record(fields) => fields.into_iter().collect(),
            _ => return Err(ExtractError::NotARecord(schema_id)),
        };

        self.decoded = Some(DecodedRecord { key, fields });
        Ok(())
    }

    /// The decoded key, or an empty string when nothing is decoded.
    pub fn key(&self) -> String {
        self.decoded
            .as_ref()
            .map(|d| d.key.clone())
            .unwrap_or_default()
    }

    pub fn value_field(&self, name: &str) -> Result<String, FieldError> {
        let value = self
            .decoded
            .as_ref()
            .and_then(|d| d.fields.get(name))
            .ok_or_else(|| FieldError::FieldNotFound(name.to_owned()))?;

        as_string(value).ok_or_else(|| FieldError::FieldNotString(name.to_owned()))
    }

    pub fn decoded(&self) -> Option<&DecodedRecord> {
        self.decoded.as_ref()
    }

    pub fn clear_values(&mut self) {
        self.decoded = None;
    }

    /// Tears down the registry binding.
    pub fn destroy(self) {
        self.serdes.destroy();
    }

    fn decode_key(&mut self, key: Option<&[u8]>) -> Result<String, ExtractError> {
        let Some(bytes) = key else {
            return Ok(String::new());
        };

        if !wire::is_framed(bytes) {
            return String::from_utf8(bytes.to_vec()).map_err(|_| ExtractError::KeyNotUtf8);
        }

        let (_, value) = self.serdes.deserialize("key", bytes)?;
        Ok(render(value))
    }
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) | Value::Enum(_, s) => Some(s.clone()),
        Value::Uuid(u) => Some(u.to_string()),
        Value::Union(_, inner) => as_string(inner),
        _ => None,
    }
}

/// Renders a decoded key. Non-string keys are shown as JSON.
fn render(value: Value) -> String {
    if let Some(s) = as_string(&value) {
        return s;
    }

    match serde_json::Value::try_from(value) {
        Ok(json) => json.to_string(),
        Err(e) => format!("<unrenderable key: {}>", e),
    }
}
