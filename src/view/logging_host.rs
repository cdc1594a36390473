use super::{ViewCommand, ViewHost};

/// Host with no surface at all; commands end up in the log.
#[derive(Default)]
pub struct LoggingViewHost;

impl ViewHost for LoggingViewHost {
    fn dispatch(&mut self, command: ViewCommand) {
        tracing::info!(?command, "view command");
    }
}
