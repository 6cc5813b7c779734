//! Log initialization shared by the workspace binaries.

use std::io::IsTerminal;
use std::sync::Once;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "OMS_LOG";

/// Installs a stderr `tracing` subscriber filtered by `OMS_LOG`.
///
/// Safe to call more than once; tests share the same global subscriber.
pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .try_init();
    });
}
