use std::sync::Mutex;
use std::time::Duration;

use rdkafka::consumer::{BaseConsumer, Consumer, ConsumerContext};
use rdkafka::error::KafkaError;
use rdkafka::ClientContext;

use crate::config::ConsumerConfig;

use super::RawMessage;

/// The broker capability the consumer session drives.
pub trait BrokerClient {
    fn subscribe(&mut self, topic: &str) -> Result<(), String>;

    /// Blocks for at most `timeout`. `None` means no message arrived.
    fn poll(&mut self, timeout: Duration) -> Option<RawMessage>;

    /// Returns the pending client error and clears it. Empty when none.
    fn last_error(&mut self) -> String;

    fn close(&mut self);
}

/// Instantiates broker clients from a validated consumer config.
pub trait BrokerConnector {
    type Client: BrokerClient;

    fn connect(&self, config: &ConsumerConfig) -> Result<Self::Client, String>;
}

/// Client context that keeps the most recent asynchronous client error so
/// it can be reported after a poll.
#[derive(Default)]
pub struct ProbeContext {
    last_error: Mutex<Option<String>>,
}

impl ProbeContext {
    fn take_error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|mut e| e.take())
    }
}

impl ClientContext for ProbeContext {
    fn error(&self, error: KafkaError, reason: &str) {
        debug!("librdkafka error: {}: {}", error, reason);

        if let Ok(mut last) = self.last_error.lock() {
            *last = Some(format!("{}: {}", error, reason));
        }
    }
}

impl ConsumerContext for ProbeContext {}

pub struct KafkaBrokerClient {
    inner: BaseConsumer<ProbeContext>,
}

impl KafkaBrokerClient {
    pub fn create(config: &ConsumerConfig) -> Result<Self, String> {
        debug!("consumer config: {:?}", config);

        let inner = config
            .to_client_config()
            .create_with_context::<_, BaseConsumer<ProbeContext>>(ProbeContext::default())
            .map_err(|e| e.to_string())?;

        Ok(Self { inner })
    }
}

impl BrokerClient for KafkaBrokerClient {
    fn subscribe(&mut self, topic: &str) -> Result<(), String> {
        self.inner.subscribe(&[topic]).map_err(|e| e.to_string())
    }

    fn poll(&mut self, timeout: Duration) -> Option<RawMessage> {
        match self.inner.poll(timeout)? {
            Ok(m) => Some(RawMessage::from_kafka(&m)),
            Err(e) => {
                warn!("Kafka error: {}", e);
                Some(RawMessage::failed(e.to_string()))
            }
        }
    }

    fn last_error(&mut self) -> String {
        self.inner.context().take_error().unwrap_or_default()
    }

    fn close(&mut self) {
        self.inner.unsubscribe();
    }
}

/// Connects to a real broker through librdkafka.
#[derive(Clone, Copy, Debug, Default)]
pub struct KafkaConnector;

impl BrokerConnector for KafkaConnector {
    type Client = KafkaBrokerClient;

    fn connect(&self, config: &ConsumerConfig) -> Result<Self::Client, String> {
        KafkaBrokerClient::create(config)
    }
}
