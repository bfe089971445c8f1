pub mod client;
pub mod message;
pub mod session;

pub mod config {
    pub const BOOTSTRAP_SERVERS: &str = "bootstrap.servers";
    pub const GROUP_ID: &str = "group.id";
    pub const AUTO_OFFSET_RESET: &str = "auto.offset.reset";
    pub const DEBUG: &str = "debug";
}

pub use client::{BrokerClient, BrokerConnector, KafkaBrokerClient, KafkaConnector};
pub use message::RawMessage;
pub use session::{ConsumerSession, SessionState};
