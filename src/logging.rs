//! Logging setup
//!
//! Logs go to stderr so that the console destination can own stdout.
//! The filter comes from `CONNECT_BACKUP_LOG`, then `RUST_LOG`, then the
//! verbosity flag.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "CONNECT_BACKUP_LOG";

/// Initialize the global tracing subscriber
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // a subscriber may already be installed when embedded; keep the existing one
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .try_init();
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "connect_backup=debug,info"
    } else {
        "info"
    }
}
