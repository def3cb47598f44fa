//! Ctrl-C handling.
//!
//! The handler only raises a flag. The child process receives the same
//! signal and exits on its own; the pipeline then sees the flag and reports
//! the stage as stopped instead of failed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

/// Shared "the user pressed Ctrl-C" flag.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    /// A flag with no signal handler attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the process-wide Ctrl-C handler and return its flag.
    ///
    /// If a handler is already installed the flag is still returned, it just
    /// never gets raised.
    pub fn install() -> Self {
        let interrupt = Self::new();
        let flag = Arc::clone(&interrupt.flag);
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
            debug!("could not install Ctrl-C handler: {}", e);
        }
        interrupt
    }

    pub fn raise(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
