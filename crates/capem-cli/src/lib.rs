//! # capem-cli — Command-Line Interface
//!
//! Library half of the `capem` binary: JSON job loading, the run
//! arguments, the `tracing` progress logger, and the deadline-bounded run
//! itself. Kept out of `main.rs` so integration tests can drive it.

pub mod config;
pub mod logger;
pub mod run;

pub use config::{load_job, JobInput};
pub use logger::TracingLogger;
pub use run::{run, RunArgs, Timeout};
