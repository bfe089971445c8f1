use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use apache_avro::types::Value;
use apache_avro::{to_avro_datum, Schema};
use mockall::mock;

use schemaprobe::config::{ConsumerConfig, SerdesConfig};
use schemaprobe::error::{RegistryError, SetupError};
use schemaprobe::kafka::{BrokerClient, BrokerConnector, RawMessage};
use schemaprobe::runner::{self, ProbeConfig, RunSummary};
use schemaprobe::serdes::{wire, RegistryClient, RegistryConnector};
use schemaprobe::shutdown::{RunState, Shutdown};

mock! {
    pub Registry {}

    impl RegistryClient for Registry {
        fn fetch_schema(&self, id: u32) -> Result<String, RegistryError>;
    }
}

const VALUE_SCHEMA: &str = r#"{
    "type": "record",
    "name": "Event",
    "fields": [{"name": "EventPayloadJson", "type": "string"}]
}"#;
const VALUE_ID: u32 = 1;

type Events = Rc<RefCell<Vec<String>>>;

fn count(events: &Events, name: &str) -> usize {
    events.borrow().iter().filter(|e| e.as_str() == name).count()
}

enum Step {
    Empty,
    EmptyWithError(&'static str),
    Message(RawMessage),
}

struct FakeBroker {
    events: Events,
    steps: VecDeque<Step>,
    pending_error: String,
    sd: Shutdown,
    interrupt_on_poll: usize,
    polls: usize,
}

impl BrokerClient for FakeBroker {
    fn subscribe(&mut self, topic: &str) -> Result<(), String> {
        self.events.borrow_mut().push(format!("subscribe {}", topic));
        if topic == "rejected" {
            return Err("Broker: Topic authorization failed".into());
        }
        Ok(())
    }

    fn poll(&mut self, timeout: Duration) -> Option<RawMessage> {
        self.polls += 1;
        self.events.borrow_mut().push("poll".into());
        if self.polls == self.interrupt_on_poll {
            self.sd.begin();
        }

        match self.steps.pop_front() {
            Some(Step::Message(m)) => Some(m),
            Some(Step::EmptyWithError(e)) => {
                self.pending_error = e.to_owned();
                None
            }
            Some(Step::Empty) | None => {
                std::thread::sleep(timeout);
                None
            }
        }
    }

    fn last_error(&mut self) -> String {
        std::mem::take(&mut self.pending_error)
    }

    fn close(&mut self) {
        self.events.borrow_mut().push("close".into());
    }
}

struct FakeBrokers {
    events: Events,
    steps: RefCell<VecDeque<Step>>,
    sd: Shutdown,
    interrupt_on_poll: usize,
    fail: bool,
}

impl BrokerConnector for FakeBrokers {
    type Client = FakeBroker;

    fn connect(&self, config: &ConsumerConfig) -> Result<FakeBroker, String> {
        self.events.borrow_mut().push("connect".into());
        if self.fail {
            return Err(format!(
                "failed to resolve {}",
                config.get("bootstrap.servers").unwrap_or_default()
            ));
        }

        Ok(FakeBroker {
            events: self.events.clone(),
            steps: self.steps.take(),
            pending_error: String::new(),
            sd: self.sd.clone(),
            interrupt_on_poll: self.interrupt_on_poll,
            polls: 0,
        })
    }
}

/// Records its own destruction so teardown order can be asserted.
struct RecordingRegistry {
    inner: MockRegistry,
    events: Events,
}

impl RegistryClient for RecordingRegistry {
    fn fetch_schema(&self, id: u32) -> Result<String, RegistryError> {
        self.inner.fetch_schema(id)
    }
}

impl Drop for RecordingRegistry {
    fn drop(&mut self) {
        self.events.borrow_mut().push("serdes destroyed".into());
    }
}

struct FakeRegistries {
    events: Events,
    fail: bool,
}

impl RegistryConnector for FakeRegistries {
    type Client = RecordingRegistry;

    fn connect(&self, config: &SerdesConfig) -> Result<RecordingRegistry, RegistryError> {
        if self.fail {
            return Err(RegistryError::Client(format!(
                "cannot reach {}",
                config.registry_url()
            )));
        }

        let mut inner = MockRegistry::new();
        inner
            .expect_fetch_schema()
            .returning(|_| Ok(VALUE_SCHEMA.to_owned()));

        Ok(RecordingRegistry {
            inner,
            events: self.events.clone(),
        })
    }
}

struct Harness {
    events: Events,
    sd: Shutdown,
    config: ProbeConfig,
    brokers: FakeBrokers,
    registries: FakeRegistries,
}

impl Harness {
    fn new(steps: Vec<Step>, interrupt_on_poll: usize) -> Self {
        let events: Events = Rc::new(RefCell::new(Vec::new()));
        let sd = Shutdown::new();
        let config = ProbeConfig {
            timeout: Duration::from_millis(10),
            delay: Duration::ZERO,
            ..Default::default()
        };

        Self {
            brokers: FakeBrokers {
                events: events.clone(),
                steps: RefCell::new(steps.into()),
                sd: sd.clone(),
                interrupt_on_poll,
                fail: false,
            },
            registries: FakeRegistries {
                events: events.clone(),
                fail: false,
            },
            events,
            sd,
            config,
        }
    }

    fn run(&self) -> Result<RunSummary, SetupError> {
        runner::run(&self.config, &self.sd, &self.brokers, &self.registries)
    }
}

fn event_message(payload: &str) -> RawMessage {
    let schema = Schema::parse_str(VALUE_SCHEMA).unwrap();
    let record = Value::Record(vec![(
        "EventPayloadJson".into(),
        Value::String(payload.into()),
    )]);
    let datum = to_avro_datum(&schema, record).unwrap();
    RawMessage::new(
        Some(b"key-1".to_vec()),
        Some(wire::frame(VALUE_ID, &datum).to_vec()),
    )
}

#[test]
fn test_interrupt_finishes_iteration_then_tears_down() {
    let h = Harness::new(
        vec![
            Step::Empty,
            Step::EmptyWithError("Local: Broker transport failure"),
            Step::Message(event_message("abc")),
            Step::Message(RawMessage::failed("Broker: Unknown topic or partition")),
            Step::Message(RawMessage::new(None, Some(b"not framed".to_vec()))),
            Step::Message(event_message("never polled")),
        ],
        5,
    );

    let summary = h.run().unwrap();
    assert_eq!(
        summary,
        RunSummary {
            iterations: 5,
            empty_polls: 2,
            errored: 1,
            decoded: 1,
            skipped: 1,
        }
    );
    assert_eq!(h.sd.state(), RunState::Stopping);

    let events = h.events.borrow();
    assert_eq!(count(&h.events, "poll"), 5);
    assert_eq!(
        &events[events.len() - 2..],
        &["serdes destroyed".to_owned(), "close".to_owned()]
    );
    assert_eq!(count(&h.events, "close"), 1);
    assert_eq!(count(&h.events, "serdes destroyed"), 1);
}

#[test]
fn test_no_traffic_keeps_polling() {
    let h = Harness::new(vec![Step::Empty, Step::Empty, Step::Empty], 3);

    let summary = h.run().unwrap();
    assert_eq!(summary.iterations, 3);
    assert_eq!(summary.empty_polls, 3);
    assert_eq!(summary.decoded, 0);
}

#[test]
fn test_stop_before_first_poll() {
    let h = Harness::new(vec![Step::Message(event_message("abc"))], 0);
    h.sd.begin();

    let summary = h.run().unwrap();
    assert_eq!(summary, RunSummary::default());
    assert_eq!(count(&h.events, "poll"), 0);
    assert_eq!(
        *h.events.borrow(),
        vec![
            "connect".to_owned(),
            "subscribe test-topic-1".to_owned(),
            "serdes destroyed".to_owned(),
            "close".to_owned(),
        ]
    );
}

#[test]
fn test_consumer_config_failure() {
    let mut h = Harness::new(vec![], 0);
    h.config.offset_reset = "sideways".into();

    let err = h.run().unwrap_err();
    assert!(matches!(err, SetupError::ConsumerConfig(_)));
    assert_eq!(err.exit_code(), -1);
    assert!(h.events.borrow().is_empty());
}

#[test]
fn test_create_failure() {
    let mut h = Harness::new(vec![], 0);
    h.brokers.fail = true;

    let err = h.run().unwrap_err();
    assert!(matches!(err, SetupError::CreateConsumer(_)));
    assert_eq!(err.exit_code(), -4);
    assert!(err.to_string().contains("host.docker.internal:9092"));
    assert_eq!(*h.events.borrow(), vec!["connect".to_owned()]);
}

#[test]
fn test_subscribe_failure_closes_session() {
    let mut h = Harness::new(vec![], 0);
    h.config.topic = "rejected".into();

    let err = h.run().unwrap_err();
    assert!(matches!(err, SetupError::Subscribe(_)));
    assert_eq!(err.exit_code(), -5);
    assert_eq!(count(&h.events, "close"), 1);
    assert_eq!(count(&h.events, "serdes destroyed"), 0);
}

#[test]
fn test_serdes_config_failure_closes_session() {
    let mut h = Harness::new(vec![], 0);
    h.config.registry_url = "not a url".into();

    let err = h.run().unwrap_err();
    assert!(matches!(err, SetupError::SerdesConfig(_)));
    assert_eq!(err.exit_code(), -6);
    assert_eq!(count(&h.events, "close"), 1);
}

#[test]
fn test_serdes_create_failure_closes_session() {
    let mut h = Harness::new(vec![], 0);
    h.registries.fail = true;

    let err = h.run().unwrap_err();
    assert!(matches!(err, SetupError::CreateSerdes(_)));
    assert_eq!(err.exit_code(), -7);
    assert_eq!(count(&h.events, "close"), 1);
    assert_eq!(count(&h.events, "poll"), 0);
}
