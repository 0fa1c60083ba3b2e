//! Signal handling for graceful shutdown.
//!
//! Centralized Ctrl+C handling. A shared `AtomicBool` flag signals worker
//! threads that shutdown has been requested; the classifier stops admitting
//! new entries but never leaves a partially-written index entry behind
//! (per-entry commits are atomic in the store).
//!
//! # Usage
//!
//! ```rust,no_run
//! use mediasift::signal::install_handler;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//!
//! if handler.is_shutdown_requested() {
//!     println!("Shutdown requested, cleaning up...");
//!     return;
//! }
//!
//! // Pass handler.get_flag() to the classifier config.
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Centralized shutdown handler for graceful application termination.
///
/// Wraps an `AtomicBool` flag that is set when a Ctrl+C signal is received.
/// The flag can be shared with worker threads for coordinated shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownHandler {
    /// The shared atomic flag indicating shutdown was requested.
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a new shutdown handler with the flag initially set to `false`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check if shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Manually request a shutdown.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Get a clone of the shutdown flag for passing to worker threads.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Reset the shutdown flag to `false`.
    ///
    /// Primarily useful for tests that reuse a handler.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl Default for ShutdownHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install a Ctrl+C handler that sets the shutdown flag on interrupt.
///
/// Call once, early in startup, before any long-running operations. A
/// process can only register the hook once; repeat calls (e.g. from tests
/// running in parallel) reuse the existing handler or fall back to an
/// unhooked one that still supports `request_shutdown()`.
///
/// # Errors
///
/// Currently always succeeds; the `Result` is kept for callers that want to
/// treat installation as fallible.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();

    match ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);

        let _ = writeln!(std::io::stderr(), "\nInterrupted. Cleaning up...");
        let _ = std::io::stderr().flush();

        log::info!("Shutdown signal received");
    }) {
        Ok(()) => {
            let _ = GLOBAL_HANDLER.set(handler.clone());
            Ok(handler)
        }
        Err(_) => {
            if let Some(handler) = GLOBAL_HANDLER.get() {
                handler.reset();
                Ok(handler.clone())
            } else {
                log::debug!("Ctrl+C handler already registered, using unhooked handler");
                let fallback = ShutdownHandler::new();
                let _ = GLOBAL_HANDLER.set(fallback.clone());
                Ok(fallback)
            }
        }
    }
}
