use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Types of run states
pub enum RunState {
    Running,
    Stopping,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RunState::Running => write!(f, "Running"),
            RunState::Stopping => write!(f, "Stopping"),
        }
    }
}

/// Cancellation token for the run loop.
///
/// Clones share one flag. The flag is set at most once, by whoever observes
/// the interrupt, and never reset. The run loop reads it once per
/// iteration, so an in-flight poll always completes first.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    stopping: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Shutdown {
        Shutdown::default()
    }

    /// Returns `true` if the shutdown signal has been received.
    pub fn is_shutdown(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> RunState {
        if self.is_shutdown() {
            RunState::Stopping
        } else {
            RunState::Running
        }
    }

    /// Begin the shutdown. Returns `false` if it had already begun.
    pub fn begin(&self) -> bool {
        !self.stopping.swap(true, Ordering::SeqCst)
    }
}
