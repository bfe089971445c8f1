use rdkafka::Message;

/// A single unit read from the broker by one poll.
///
/// The run loop owns it for one iteration. `release` consumes it, so a
/// released message cannot be read again.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<Vec<u8>>,
    pub payload: Option<Vec<u8>>,
    /// Set when the broker delivered an error in place of a message.
    pub error: Option<String>,
}

impl RawMessage {
    pub fn new(key: Option<Vec<u8>>, payload: Option<Vec<u8>>) -> Self {
        Self {
            key,
            payload,
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Copies the parts of an rdkafka message the harness needs.
    pub fn from_kafka<M: Message>(m: &M) -> Self {
        Self {
            topic: m.topic().to_owned(),
            partition: m.partition(),
            offset: m.offset(),
            key: m.key().map(<[u8]>::to_vec),
            payload: m.payload().map(<[u8]>::to_vec),
            error: None,
        }
    }

    pub fn key_len(&self) -> usize {
        self.key.as_ref().map_or(0, Vec::len)
    }

    /// Length of the value payload.
    pub fn len(&self) -> usize {
        self.payload.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn release(self) {
        trace!(
            "Destroying message {}[{}]@{}...",
            self.topic,
            self.partition,
            self.offset
        );
    }
}
