//! `tracing` sink for the per-locator progress lines.

use std::sync::Arc;

use capem_core::{Logger, SharedLogger};

/// Emits `<action>: <locator>` at info level.
#[derive(Debug, Clone, Copy)]
pub struct TracingLogger {
    action: &'static str,
}

impl TracingLogger {
    /// `Fetching: <uri>`, before every source fetch.
    pub fn fetching() -> SharedLogger {
        Arc::new(Self { action: "Fetching" })
    }

    /// `Ordering: <uri>`, before every destination delivery.
    pub fn ordering() -> SharedLogger {
        Arc::new(Self { action: "Ordering" })
    }
}

impl Logger for TracingLogger {
    fn log(&self, locator_text: &str) {
        tracing::info!("{}: {locator_text}", self.action);
    }
}
