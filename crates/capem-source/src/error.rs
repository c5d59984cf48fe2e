//! # Source Errors
//!
//! Every fetch failure names the source locator it came from, so a failed
//! destination can be traced back to the exact catalog entry.

use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStreamError;
use capem_core::{ContentMismatch, Scheme};

/// A source could not produce valid bytes.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The fetch observed cancellation before it completed.
    #[error("fetch of {locator} cancelled")]
    Cancelled { locator: String },

    /// Local filesystem read failed.
    #[error("failed to read {locator}: {source}")]
    Io {
        locator: String,
        #[source]
        source: std::io::Error,
    },

    /// No GitHub token in the environment at fetch time.
    #[error("cannot fetch {locator}: environment variable {var} is not set")]
    MissingToken { locator: String, var: String },

    /// HTTP transport error talking to the GitHub API.
    #[error("HTTP error fetching {locator}: {source}")]
    Http {
        locator: String,
        #[source]
        source: reqwest::Error,
    },

    /// The GitHub API returned a non-2xx status.
    #[error("GitHub API returned {status} for {locator}: {body}")]
    Api {
        locator: String,
        status: u16,
        body: String,
    },

    /// The GitHub API response was not a contents object.
    #[error("failed to deserialize GitHub response for {locator}: {source}")]
    Deserialization {
        locator: String,
        #[source]
        source: reqwest::Error,
    },

    /// The repository path names a directory, symlink or submodule.
    #[error("{locator} is a {kind}, not a file")]
    NotAFile { locator: String, kind: String },

    /// The file content came back in an encoding other than base64.
    #[error("{locator} has unsupported content encoding \"{encoding}\"")]
    UnsupportedEncoding { locator: String, encoding: String },

    /// The base64 body did not decode.
    #[error("failed to decode content of {locator}: {source}")]
    Decode {
        locator: String,
        #[source]
        source: base64::DecodeError,
    },

    /// The S3 `GetObject` request failed.
    #[error("S3 GetObject failed for {locator}")]
    S3 {
        locator: String,
        #[source]
        source: Box<SdkError<GetObjectError>>,
    },

    /// The S3 object body could not be read to the end.
    #[error("failed to read S3 object body for {locator}")]
    S3Body {
        locator: String,
        #[source]
        source: ByteStreamError,
    },

    /// Fetched bytes failed the category check.
    #[error("{locator}: {source}")]
    Content {
        locator: String,
        #[source]
        source: ContentMismatch,
    },
}

impl FetchError {
    /// Text of the source locator that failed.
    pub fn locator(&self) -> &str {
        match self {
            Self::Cancelled { locator }
            | Self::Io { locator, .. }
            | Self::MissingToken { locator, .. }
            | Self::Http { locator, .. }
            | Self::Api { locator, .. }
            | Self::Deserialization { locator, .. }
            | Self::NotAFile { locator, .. }
            | Self::UnsupportedEncoding { locator, .. }
            | Self::Decode { locator, .. }
            | Self::S3 { locator, .. }
            | Self::S3Body { locator, .. }
            | Self::Content { locator, .. } => locator,
        }
    }

    /// Whether this failure is only the echo of a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// A locator whose scheme cannot be fetched from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{scheme} locators cannot be used as sources: \"{text}\"")]
pub struct NotASource {
    pub scheme: Scheme,
    pub text: String,
}

/// Backend setup failures, raised before any fetch.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The configured GitHub API base URL is not a URL.
    #[error("invalid URL for {var}: {source}")]
    InvalidUrl {
        var: String,
        #[source]
        source: url::ParseError,
    },
}
