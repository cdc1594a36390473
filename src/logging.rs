//! Log output for the binaries.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `tabshell=debug`.
pub const LOG_ENV: &str = "TABSHELL_LOG";

/// Installs a stderr subscriber filtered by `TABSHELL_LOG` (default `info`).
///
/// Stdout is left alone since the RPC server speaks on it.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
