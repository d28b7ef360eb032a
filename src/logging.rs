//! Tracing setup for the homework-notes binary
//!
//! Usage:
//!   homework-notes --debug ...             # Debug logging to stderr
//!   RUST_LOG=homework_notes_lib=debug ...  # Fine-grained log control

use crate::error::{NotesError, Result};
use tracing_subscriber::EnvFilter;

/// Default filter when RUST_LOG is unset
fn default_filter(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Initialize console tracing. RUST_LOG wins over `debug` when set.
pub fn init_tracing(debug: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| NotesError::Config(format!("tracing already initialised: {}", err)))
}
