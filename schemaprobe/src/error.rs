use thiserror::Error;

use crate::kafka::session::SessionState;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The option name or value was rejected by validation
    #[error("invalid option {name}={value:?}: {reason}")]
    InvalidOption {
        name: String,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The broker client could not be instantiated
    #[error("consumer could not be created: {0}")]
    CreateFailed(String),

    /// The topic was invalid or the broker rejected the subscription
    #[error("subscription was rejected: {0}")]
    SubscribeFailed(String),

    #[error("consumer session is {actual}, expected {expected}")]
    InvalidState {
        expected: SessionState,
        actual: SessionState,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("schema registry client could not be built: {0}")]
    Client(String),

    #[error("schema registry request for id {id} failed: {reason}")]
    Request { id: u32, reason: String },

    #[error("schema registry returned status {status} for id {id}")]
    Status { id: u32, status: u16 },

    #[error("schema {id} could not be parsed: {reason}")]
    InvalidSchema { id: u32, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("message has no value")]
    NullValue,

    #[error("invalid framing: {0}")]
    Framing(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to decode {part} with schema {schema_id}: {reason}")]
    Decode {
        part: &'static str,
        schema_id: u32,
        reason: String,
    },

    #[error("value with schema {0} is not a record")]
    NotARecord(u32),

    #[error("unframed message key is not valid UTF-8")]
    KeyNotUtf8,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("field {0} not found")]
    FieldNotFound(String),

    #[error("field {0} is not a string")]
    FieldNotString(String),
}

/// A fatal failure before the run loop is entered.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Failed to set consumer config: {0}")]
    ConsumerConfig(#[source] ConfigError),

    #[error("Failed to create consumer: {0}")]
    CreateConsumer(#[source] SessionError),

    #[error("Failed to subscribe to topic: {0}")]
    Subscribe(#[source] SessionError),

    #[error("Failed to set serdes config: {0}")]
    SerdesConfig(#[source] ConfigError),

    #[error("Failed to create serdes: {0}")]
    CreateSerdes(#[source] RegistryError),
}

impl SetupError {
    /// Process exit code for the failed setup stage.
    pub fn exit_code(&self) -> i32 {
        match self {
            SetupError::ConsumerConfig(_) => -1,
            SetupError::CreateConsumer(_) => -4,
            SetupError::Subscribe(_) => -5,
            SetupError::SerdesConfig(_) => -6,
            SetupError::CreateSerdes(_) => -7,
        }
    }
}

impl From<SetupError> for String {
    fn from(e: SetupError) -> String {
        e.to_string()
    }
}
