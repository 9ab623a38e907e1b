//! Signal handling for graceful shutdown.
//!
//! The first SIGINT/SIGTERM sets the shutdown flag; the run loop and the
//! static position source observe it between samples, so in-flight
//! evaluation always completes. A second signal terminates immediately in
//! case the stream source is blocked on a read.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::Result;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

use crate::constants::EXIT_FAILURE;

/// Install INT/TERM handlers and return the shared shutdown flag.
pub fn setup_signal_handler() -> Result<Arc<AtomicBool>> {
    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        // Registration order matters: the conditional shutdown fires only
        // when the flag is already set, i.e. on the second signal.
        flag::register_conditional_shutdown(signal, EXIT_FAILURE, Arc::clone(&shutdown))?;
        flag::register(signal, Arc::clone(&shutdown))?;
    }
    Ok(shutdown)
}
