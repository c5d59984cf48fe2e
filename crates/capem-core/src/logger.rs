//! Logging capability handed to source and destination adapters.
//!
//! Adapters call [`Logger::log`] with the locator text right before each
//! fetch or delivery. The capability has no influence on control flow and
//! does not decide output format; the binary plugs in a `tracing` sink.

use std::sync::Arc;

/// Receives the locator text of each fetch or delivery about to start.
pub trait Logger: Send + Sync {
    /// Record that work on `locator_text` is starting.
    fn log(&self, locator_text: &str);
}

/// Shared, thread-safe logger handle.
pub type SharedLogger = Arc<dyn Logger>;

impl<F> Logger for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, locator_text: &str) {
        self(locator_text)
    }
}
