use std::thread;
use std::time::Duration;

use crate::config::{Advisory, ConsumerConfig, SerdesConfig};
use crate::error::{ConfigError, SetupError};
use crate::kafka::{config as kafka_config, BrokerClient, BrokerConnector, ConsumerSession};
use crate::logger;
use crate::serdes::{
    config as serdes_config, MessageExtractor, RegistryClient, RegistryConnector, Serdes,
};
use crate::shutdown::Shutdown;

pub const DEFAULT_BROKERS: &str = "host.docker.internal:9092";
pub const DEFAULT_GROUP_ID: &str = "rdkafka-consumer-group-1";
pub const DEFAULT_TOPIC: &str = "test-topic-1";
pub const DEFAULT_OFFSET_RESET: &str = "earliest";
pub const DEFAULT_REGISTRY_URL: &str = "http://localhost:8081";
pub const DEFAULT_SERDES_DEBUG: &str = "all";
pub const DEFAULT_VALUE_FIELD: &str = "EventPayloadJson";

/// Maximum time a single poll blocks.
pub const POLL_TIMEOUT_MS: u64 = 1_000;

/// Fixed pause before every poll, independent of the poll timeout.
pub const POLL_DELAY_MS: u64 = 1_000;

#[derive(Clone, Debug)]
pub struct ProbeConfig {
    pub log: logger::Level,
    pub brokers: String,
    pub group_id: String,
    pub topic: String,
    pub offset_reset: String,
    /// librdkafka debug contexts, only applied when non-empty.
    pub debug: String,
    pub timeout: Duration,
    pub delay: Duration,
    pub registry_url: String,
    pub serdes_debug: String,
    /// Name of the value field printed for every decoded message.
    pub field: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            log: logger::Level::Info,
            brokers: DEFAULT_BROKERS.to_owned(),
            group_id: DEFAULT_GROUP_ID.to_owned(),
            topic: DEFAULT_TOPIC.to_owned(),
            offset_reset: DEFAULT_OFFSET_RESET.to_owned(),
            debug: String::new(),
            timeout: Duration::from_millis(POLL_TIMEOUT_MS),
            delay: Duration::from_millis(POLL_DELAY_MS),
            registry_url: DEFAULT_REGISTRY_URL.to_owned(),
            serdes_debug: DEFAULT_SERDES_DEBUG.to_owned(),
            field: DEFAULT_VALUE_FIELD.to_owned(),
        }
    }
}

/// Per-run counters, logged at shutdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub iterations: u64,
    pub empty_polls: u64,
    pub errored: u64,
    pub decoded: u64,
    pub skipped: u64,
}

/// Sets up the consumer and serdes, polls until `sd` is triggered, then
/// tears everything down.
///
/// Teardown runs exactly once on every path: serdes first, then the consumer
/// session. Setup failures are returned after teardown; per-message failures
/// only show up in the logs and the summary.
pub fn run<BC, RC>(
    config: &ProbeConfig,
    sd: &Shutdown,
    brokers: &BC,
    registries: &RC,
) -> Result<RunSummary, SetupError>
where
    BC: BrokerConnector,
    RC: RegistryConnector,
{
    let (mut session, mut extractor) = match setup(config, brokers, registries) {
        Ok(resources) => resources,
        Err((e, session)) => {
            error!("{}", e);
            teardown::<BC::Client, RC::Client>(None, session);
            return Err(e);
        }
    };

    let summary = poll_loop(config, sd, &mut session, &mut extractor);
    info!(
        "Stopped after {} polls: {} decoded, {} skipped, {} errored, {} empty",
        summary.iterations, summary.decoded, summary.skipped, summary.errored, summary.empty_polls
    );

    teardown(Some(extractor), Some(session));
    Ok(summary)
}

type SetupFailure<B> = (SetupError, Option<ConsumerSession<B>>);

fn setup<BC, RC>(
    config: &ProbeConfig,
    brokers: &BC,
    registries: &RC,
) -> Result<(ConsumerSession<BC::Client>, MessageExtractor<RC::Client>), SetupFailure<BC::Client>>
where
    BC: BrokerConnector,
    RC: RegistryConnector,
{
    info!("Setting config options...");
    let consumer_config =
        build_consumer_config(config).map_err(|e| (SetupError::ConsumerConfig(e), None))?;

    info!("Creating consumer...");
    let mut session = ConsumerSession::create(consumer_config, brokers)
        .map_err(|e| (SetupError::CreateConsumer(e), None))?;
    warn_advisory("create consumer", session.last_error());

    info!("Subscribing to topic {}...", config.topic);
    if let Err(e) = session.subscribe(&config.topic) {
        return Err((SetupError::Subscribe(e), Some(session)));
    }
    warn_advisory("subscribe to topic", session.last_error());

    let serdes_config = match build_serdes_config(config) {
        Ok(c) => c,
        Err(e) => return Err((SetupError::SerdesConfig(e), Some(session))),
    };

    info!("Creating serdes...");
    let serdes = match Serdes::create(&serdes_config, registries) {
        Ok(s) => s,
        Err(e) => return Err((SetupError::CreateSerdes(e), Some(session))),
    };

    Ok((session, MessageExtractor::new(serdes)))
}

fn build_consumer_config(config: &ProbeConfig) -> Result<ConsumerConfig, ConfigError> {
    let mut c = ConsumerConfig::new();

    if !config.debug.is_empty() {
        set_option(kafka_config::DEBUG, c.add(kafka_config::DEBUG, &config.debug))?;
    }
    set_option(
        kafka_config::BOOTSTRAP_SERVERS,
        c.add(kafka_config::BOOTSTRAP_SERVERS, &config.brokers),
    )?;
    set_option(kafka_config::GROUP_ID, c.add(kafka_config::GROUP_ID, &config.group_id))?;
    set_option(
        kafka_config::AUTO_OFFSET_RESET,
        c.add(kafka_config::AUTO_OFFSET_RESET, &config.offset_reset),
    )?;

    Ok(c)
}

fn build_serdes_config(config: &ProbeConfig) -> Result<SerdesConfig, ConfigError> {
    let mut c = SerdesConfig::new(&config.registry_url)?;
    set_option(serdes_config::DEBUG, c.add(serdes_config::DEBUG, &config.serdes_debug))?;
    Ok(c)
}

fn set_option(
    name: &str,
    result: Result<Option<Advisory>, ConfigError>,
) -> Result<(), ConfigError> {
    if let Some(advisory) = result? {
        warn!("{} returned: {}", name, advisory);
    }
    Ok(())
}

fn warn_advisory(op: &str, advisory: String) {
    if !advisory.is_empty() {
        warn!("{} returned: {}", op, advisory);
    }
}

fn poll_loop<B, R>(
    config: &ProbeConfig,
    sd: &Shutdown,
    session: &mut ConsumerSession<B>,
    extractor: &mut MessageExtractor<R>,
) -> RunSummary
where
    B: BrokerClient,
    R: RegistryClient,
{
    let mut summary = RunSummary::default();

    while !sd.is_shutdown() {
        thread::sleep(config.delay);
        summary.iterations += 1;

        info!("{}", attempt_line(summary.iterations, config.timeout));
        let Some(m) = session.poll(config.timeout) else {
            summary.empty_polls += 1;
            info!("No message.");
            let advisory = session.last_error();
            if !advisory.is_empty() {
                error!("Error getting message: {}", advisory);
            }
            continue;
        };

        info!("Got message.");
        if let Some(e) = m.error.as_deref() {
            summary.errored += 1;
            error!("Error message: {}", e);
            m.release();
            continue;
        }
        warn_advisory("get message", session.last_error());

        info!(
            "Got a valid message key_len={} len={}",
            m.key_len(),
            m.len()
        );

        match extractor.extract_key_and_value(&m) {
            Ok(()) => {
                summary.decoded += 1;
                info!("KEY IS [{}]", extractor.key());
                match extractor.value_field(&config.field) {
                    Ok(value) => info!("VALUE IS [{}]", value),
                    Err(e) => warn!("Failed to read value field: {}", e),
                }
            }
            Err(e) => {
                summary.skipped += 1;
                error!("Failed to extract key and value: {}", e);
            }
        }

        extractor.clear_values();
        m.release();
    }

    debug!("Run state is {}, leaving poll loop", sd.state());
    summary
}

fn attempt_line(attempt: u64, timeout: Duration) -> String {
    format!(
        "Getting next message (attempt {}) with {}ms timeout...",
        attempt,
        timeout.as_millis()
    )
}

fn teardown<B, R>(extractor: Option<MessageExtractor<R>>, session: Option<ConsumerSession<B>>)
where
    B: BrokerClient,
    R: RegistryClient,
{
    if let Some(extractor) = extractor {
        info!("Destroying serdes...");
        extractor.destroy();
    }

    if let Some(mut session) = session {
        info!("Closing and destroying consumer...");
        session.close();
    }
}
