//! Host for an external UI process: every command becomes one JSON line.

use serde_json::{json, Value};
use tokio::sync::mpsc;

use super::{ViewCommand, ViewHost};

pub struct JsonLineViewHost {
    tx: mpsc::UnboundedSender<Value>,
}

impl JsonLineViewHost {
    /// Returns the host and the receiver the writer task drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn encode(command: &ViewCommand) -> Value {
        json!({ "event": "view", "command": command })
    }
}

impl ViewHost for JsonLineViewHost {
    fn dispatch(&mut self, command: ViewCommand) {
        if self.tx.send(Self::encode(&command)).is_err() {
            tracing::debug!(?command, "view writer closed, command dropped");
        }
    }
}
