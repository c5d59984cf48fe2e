//! # Error Types
//!
//! Errors raised by the leaf types: locator parsing and content validation.
//! Both carry the offending input so the caller can report it verbatim.

use thiserror::Error;

use crate::asset::AssetCategory;
use crate::locator::Scheme;

/// A locator string failed to parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// The text does not match the grammar of the requested scheme.
    #[error("invalid {scheme} locator: \"{text}\"")]
    Invalid {
        /// The scheme whose grammar was applied.
        scheme: Scheme,
        /// The original locator text.
        text: String,
    },

    /// The text has no `scheme://` prefix, or names a scheme capem does not know.
    #[error("unknown locator scheme: \"{text}\" (expected file://, env://, github:// or s3://)")]
    UnknownScheme {
        /// The original locator text.
        text: String,
    },
}

impl LocatorError {
    /// The original text that failed to parse.
    pub fn text(&self) -> &str {
        match self {
            Self::Invalid { text, .. } | Self::UnknownScheme { text } => text,
        }
    }
}

/// Fetched bytes do not look like the declared asset category.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("content may not be {category} or is in an unsupported format: {reason}")]
pub struct ContentMismatch {
    /// The category whose validator rejected the content.
    pub category: AssetCategory,
    /// Which marker check failed.
    pub reason: String,
}

/// A category name that is not one of the four known asset categories.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("undefined asset category: \"{0}\" (expected certificate, privateKey, encPrivateKey or CRL)")]
pub struct UnknownCategory(pub String);
