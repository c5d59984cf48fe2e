//! # capem-core — Foundational Types for capem
//!
//! capem materializes Certificate-Authority assets (certificates, private
//! keys, encrypted private keys, CRLs) from heterogeneous sources into
//! concrete destinations. This crate holds the types every other crate in
//! the workspace agrees on; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Locators exist only in valid form.** [`Locator`] is a closed enum
//!    with one variant per scheme. The only way to obtain one is a strict,
//!    whole-string grammar match. There is no partially-built locator.
//!
//! 2. **One validator per category.** [`AssetCategory::check_content`] is an
//!    exhaustive `match`; adding a category forces a validator.
//!
//! 3. **Declarations are plain data.** [`JobSpec`], [`CatalogEntry`] and
//!    [`OrderEntry`] are what a config loader produces. Turning them into
//!    an executable plan is the job of `capem-order`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `capem-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod asset;
pub mod error;
pub mod job;
pub mod locator;
pub mod logger;

pub use asset::AssetCategory;
pub use error::{ContentMismatch, LocatorError, UnknownCategory};
pub use job::{CatalogEntry, JobSpec, OrderEntry};
pub use locator::{EnvLocator, FileLocator, GitHubLocator, Locator, S3Locator, Scheme};
pub use logger::{Logger, SharedLogger};
