use std::sync::{Arc, Mutex};

use super::{ViewCommand, ViewHost};

/// Host that only records what it was asked to do. Clones share one log,
/// so a test can keep a handle while the bridge owns another.
#[derive(Clone, Default)]
pub struct RecordingViewHost {
    log: Arc<Mutex<Vec<ViewCommand>>>,
}

impl RecordingViewHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<ViewCommand> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Returns and forgets everything recorded so far.
    pub fn take(&self) -> Vec<ViewCommand> {
        self.log
            .lock()
            .map(|mut log| std::mem::take(&mut *log))
            .unwrap_or_default()
    }
}

impl ViewHost for RecordingViewHost {
    fn dispatch(&mut self, command: ViewCommand) {
        if let Ok(mut log) = self.log.lock() {
            log.push(command);
        }
    }
}
