use std::fmt;
use std::time::Duration;

use crate::config::ConsumerConfig;
use crate::error::SessionError;

use super::client::{BrokerClient, BrokerConnector};
use super::RawMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Lifecycle of a consumer session. A session that failed to create never
/// exists, so there is no value for it.
pub enum SessionState {
    Created,
    Subscribed,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionState::Created => write!(f, "Created"),
            SessionState::Subscribed => write!(f, "Subscribed"),
            SessionState::Closed => write!(f, "Closed"),
        }
    }
}

/// Owns the broker client and the config it was created from.
///
/// The config is moved in on `create` and only exposed by shared reference,
/// so it cannot change while the session is alive.
pub struct ConsumerSession<B: BrokerClient> {
    config: ConsumerConfig,
    client: Option<B>,
    state: SessionState,
    last_error: Option<String>,
}

impl<B: BrokerClient> ConsumerSession<B> {
    pub fn create<C>(config: ConsumerConfig, connector: &C) -> Result<Self, SessionError>
    where
        C: BrokerConnector<Client = B>,
    {
        let client = connector
            .connect(&config)
            .map_err(SessionError::CreateFailed)?;

        Ok(Self {
            config,
            client: Some(client),
            state: SessionState::Created,
            last_error: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    pub fn subscribe(&mut self, topic: &str) -> Result<(), SessionError> {
        self.expect_state(SessionState::Created)?;

        if topic.is_empty() {
            return Err(SessionError::SubscribeFailed("empty topic name".into()));
        }

        let client = self.client.as_mut().ok_or(SessionError::InvalidState {
            expected: SessionState::Created,
            actual: SessionState::Closed,
        })?;
        client
            .subscribe(topic)
            .map_err(SessionError::SubscribeFailed)?;

        self.state = SessionState::Subscribed;
        Ok(())
    }

    /// Waits up to `timeout` for the next message.
    ///
    /// `None` is returned both on timeout and when the session is not
    /// subscribed; in the latter case `last_error` explains why.
    pub fn poll(&mut self, timeout: Duration) -> Option<RawMessage> {
        if let Err(e) = self.expect_state(SessionState::Subscribed) {
            self.last_error = Some(e.to_string());
            return None;
        }

        self.client.as_mut()?.poll(timeout)
    }

    /// Returns the pending error, or an empty string. Reading clears it.
    pub fn last_error(&mut self) -> String {
        if let Some(e) = self.last_error.take() {
            return e;
        }

        self.client
            .as_mut()
            .map(|c| c.last_error())
            .unwrap_or_default()
    }

    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }

        if let Some(mut client) = self.client.take() {
            client.close();
        }
        self.state = SessionState::Closed;
    }

    fn expect_state(&self, expected: SessionState) -> Result<(), SessionError> {
        if self.state != expected {
            return Err(SessionError::InvalidState {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }
}

impl<B: BrokerClient> Drop for ConsumerSession<B> {
    fn drop(&mut self) {
        self.close();
    }
}
