//! # capem-source — Source Adapters
//!
//! Fetches CA asset bytes from where a catalog entry says they live, then
//! checks them against the entry's declared [`AssetCategory`].
//!
//! | Scheme      | Backend |
//! |-------------|---------|
//! | `file://`   | `tokio::fs::read` |
//! | `github://` | GitHub Get Repository Content API via `reqwest` |
//! | `s3://`     | `GetObject` via `aws-sdk-s3` |
//!
//! Every fetch races against a [`CancellationToken`] and reports the
//! source locator text in its error.
//!
//! ## Crate Policy
//!
//! - No retries. A failed fetch fails its destination.
//! - Backends are built once per job and shared through [`SourceBackends`].
//! - No `.unwrap()` outside tests.
//!
//! [`AssetCategory`]: capem_core::AssetCategory
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod adapter;
pub mod backends;
pub mod error;
pub mod github;
pub mod s3;

pub use adapter::{until_cancelled, SourceAdapter};
pub use backends::SourceBackends;
pub use error::{BackendError, FetchError, NotASource};
pub use github::{GitHubClient, GitHubConfig, TokenSource};
pub use s3::S3Backend;
