use std::time::{Duration, Instant};

use schemaprobe::config::ConsumerConfig;
use schemaprobe::kafka::{config, ConsumerSession, KafkaConnector, SessionState};

const POLL_TIMEOUT: Duration = Duration::from_millis(300);
const POLL_SLACK: Duration = Duration::from_millis(700);

fn unreachable_broker_config() -> ConsumerConfig {
    let mut c = ConsumerConfig::new();
    // nothing listens on port 1
    c.add(config::BOOTSTRAP_SERVERS, "127.0.0.1:1").unwrap();
    c.add(config::GROUP_ID, "schemaprobe-unreachable").unwrap();
    c.add(config::AUTO_OFFSET_RESET, "earliest").unwrap();
    c
}

#[test]
fn test_unreachable_broker_times_out_and_reports_error() {
    let mut session = ConsumerSession::create(unreachable_broker_config(), &KafkaConnector)
        .expect("client creation does not contact the broker");
    session.subscribe("test-topic-1").unwrap();
    assert_eq!(session.state(), SessionState::Subscribed);

    let mut errors = Vec::new();
    for _ in 0..4 {
        let started = Instant::now();
        let m = session.poll(POLL_TIMEOUT);
        let elapsed = started.elapsed();

        assert!(
            elapsed < POLL_TIMEOUT + POLL_SLACK,
            "poll blocked for {:?}",
            elapsed
        );
        if let Some(m) = m {
            assert!(m.error.is_some(), "unexpected message from {}", m.topic);
        }

        let e = session.last_error();
        if !e.is_empty() {
            errors.push(e);
        }
    }

    assert!(!errors.is_empty(), "no client error was reported");

    session.close();
    assert_eq!(session.state(), SessionState::Closed);
    session.close();
    assert_eq!(session.state(), SessionState::Closed);
}
