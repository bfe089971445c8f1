use std::time::Duration;

use clap::Args;

use schemaprobe::logger::Level;
use schemaprobe::runner;

#[derive(Args, Debug)]
pub struct ProbeOptions {
    #[clap(
        short,
        long,
        env = "SCHEMAPROBE_LOG",
        default_value = "info",
        forbid_empty_values = true,
        help = "The logging level",
        value_enum
    )]
    /// The logging level
    pub log: Level,

    #[clap(
        long = "brokers",
        env = "SCHEMAPROBE_BROKERS",
        default_value = runner::DEFAULT_BROKERS,
        forbid_empty_values = true,
        help = "Kafka bootstrap servers"
    )]
    pub brokers: String,

    #[clap(
        long = "group",
        env = "SCHEMAPROBE_GROUP_ID",
        default_value = runner::DEFAULT_GROUP_ID,
        forbid_empty_values = true,
        help = "Consumer group id"
    )]
    pub group_id: String,

    #[clap(
        long = "topic",
        env = "SCHEMAPROBE_TOPIC",
        default_value = runner::DEFAULT_TOPIC,
        forbid_empty_values = true,
        help = "Topic to subscribe to"
    )]
    pub topic: String,

    #[clap(
        long = "offset-reset",
        env = "SCHEMAPROBE_OFFSET_RESET",
        default_value = runner::DEFAULT_OFFSET_RESET,
        forbid_empty_values = true,
        help = "Where to start when the group has no committed offset"
    )]
    pub offset_reset: String,

    #[clap(
        long = "debug",
        env = "SCHEMAPROBE_DEBUG",
        default_value = "",
        help = "librdkafka debug contexts, e.g. consumer,cgrp"
    )]
    pub debug: String,

    #[clap(
        long = "timeout-ms",
        env = "SCHEMAPROBE_TIMEOUT_MS",
        default_value_t = runner::POLL_TIMEOUT_MS,
        help = "Maximum time a single poll blocks"
    )]
    pub timeout_ms: u64,

    #[clap(
        long = "delay-ms",
        env = "SCHEMAPROBE_DELAY_MS",
        default_value_t = runner::POLL_DELAY_MS,
        help = "Pause before every poll"
    )]
    pub delay_ms: u64,

    #[clap(
        long = "registry",
        env = "SCHEMAPROBE_REGISTRY_URL",
        default_value = runner::DEFAULT_REGISTRY_URL,
        forbid_empty_values = true,
        help = "Schema registry URL"
    )]
    pub registry_url: String,

    #[clap(
        long = "serdes-debug",
        env = "SCHEMAPROBE_SERDES_DEBUG",
        default_value = runner::DEFAULT_SERDES_DEBUG,
        help = "Serdes debug setting (all, none)"
    )]
    pub serdes_debug: String,

    #[clap(
        long = "field",
        env = "SCHEMAPROBE_FIELD",
        default_value = runner::DEFAULT_VALUE_FIELD,
        forbid_empty_values = true,
        help = "Value field printed for every message"
    )]
    pub field: String,
}

impl From<ProbeOptions> for runner::ProbeConfig {
    fn from(c: ProbeOptions) -> Self {
        Self {
            log: c.log,
            brokers: c.brokers,
            group_id: c.group_id,
            topic: c.topic,
            offset_reset: c.offset_reset,
            debug: c.debug,
            timeout: Duration::from_millis(c.timeout_ms),
            delay: Duration::from_millis(c.delay_ms),
            registry_url: c.registry_url,
            serdes_debug: c.serdes_debug,
            field: c.field,
        }
    }
}
