//! # capem-order — Destinations, Resolution, and Execution
//!
//! Takes the catalog/order declarations of a job and materializes every
//! destination:
//!
//! 1. [`Resolver::resolve`] checks the declarations and binds each order
//!    to its destination and ordered sources. Nothing is fetched yet.
//! 2. [`Coordinator::execute`] runs every [`ResolvedOrder`] concurrently
//!    under an admission limit, cancelling the rest on the first failure.
//!
//! `file://` destinations get the byte concatenation of their sources.
//! `env://` destinations each add one `export 'NAME'='VALUE'` line to a
//! single [`EnvFile`] shared by the whole job.
//!
//! ## Crate Policy
//!
//! - Resolution is all-or-nothing and performs no I/O.
//! - The env output file is the only state shared between deliveries.
//! - No `.unwrap()` outside tests.

pub mod coordinator;
pub mod destination;
pub mod env_file;
pub mod error;
pub mod resolve;

pub use coordinator::{Coordinator, ExecutionReport, DEFAULT_CONCURRENCY};
pub use destination::DestinationAdapter;
pub use env_file::{EnvFile, LINE_ENDING};
pub use error::{DeliveryError, EnvFileError, ExecutionError, ResolutionError};
pub use resolve::{ResolvedOrder, Resolver};
