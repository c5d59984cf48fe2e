//! # Order Errors
//!
//! Three layers, one per phase of a job:
//!
//! - [`ResolutionError`]: structural problems found before any I/O.
//! - [`DeliveryError`]: one destination failed while executing.
//! - [`ExecutionError`]: what the coordinator reports for the whole job.
//!
//! [`EnvFileError`] says which step of an env output append failed.

use capem_core::LocatorError;
use capem_source::FetchError;

/// The declarations cannot be turned into an executable plan.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// Two catalog entries share an alias.
    #[error("catalog alias \"{alias}\" is defined more than once")]
    DuplicateAlias { alias: String },

    /// An order references an alias no catalog entry defines.
    #[error("order {destination} references undefined alias \"{alias}\"")]
    UndefinedAlias { alias: String, destination: String },

    /// Two orders target the same destination.
    #[error("destination {uri} is ordered more than once")]
    DuplicateDestination { uri: String },

    /// A catalog URI does not parse.
    #[error("catalog alias \"{alias}\" has an invalid URI")]
    InvalidSource {
        alias: String,
        #[source]
        source: LocatorError,
    },

    /// An order URI does not parse.
    #[error("order has an invalid URI")]
    InvalidDestination {
        #[source]
        source: LocatorError,
    },

    /// A catalog URI uses a scheme that cannot be fetched from.
    #[error("catalog alias \"{alias}\" uses unsupported source scheme: \"{uri}\" (expected file://, github:// or s3://)")]
    UnsupportedSourceScheme { alias: String, uri: String },

    /// An order URI uses a scheme that cannot be written to.
    #[error("unsupported destination scheme: \"{uri}\" (expected file:// or env://)")]
    UnsupportedDestinationScheme { uri: String },
}

/// An append to the shared env output file failed.
#[derive(Debug, thiserror::Error)]
pub enum EnvFileError {
    /// Creating or truncating the file failed.
    #[error("failed to open env output file: {0}")]
    Open(#[source] std::io::Error),

    /// The file was open but the line could not be written.
    #[error("failed to write env output file: {0}")]
    Write(#[source] std::io::Error),
}

/// One destination could not be delivered.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Cancellation was observed before any source was fetched.
    #[error("delivery to {destination} cancelled")]
    Cancelled { destination: String },

    /// A source failed to fetch or validate.
    #[error("delivery to {destination} failed")]
    Fetch {
        destination: String,
        #[source]
        source: FetchError,
    },

    /// The destination file could not be created.
    #[error("failed to create {destination}: {source}")]
    Create {
        destination: String,
        #[source]
        source: std::io::Error,
    },

    /// The shared environment output file could not be opened.
    #[error("failed to open env output file {path} for {destination}: {source}")]
    EnvFile {
        destination: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing to the destination failed.
    #[error("failed to write {destination}: {source}")]
    Write {
        destination: String,
        #[source]
        source: std::io::Error,
    },
}

impl DeliveryError {
    /// Text of the destination locator.
    pub fn destination(&self) -> &str {
        match self {
            Self::Cancelled { destination }
            | Self::Fetch { destination, .. }
            | Self::Create { destination, .. }
            | Self::EnvFile { destination, .. }
            | Self::Write { destination, .. } => destination,
        }
    }

    /// Whether the failure only reflects cancellation triggered elsewhere.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled { .. } => true,
            Self::Fetch { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

/// A job did not complete.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The first destination to fail.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// The caller cancelled (or the deadline expired) before every
    /// destination completed.
    #[error("execution cancelled with {completed} of {total} destinations delivered")]
    Cancelled { completed: usize, total: usize },

    /// A delivery task panicked.
    #[error("delivery task aborted: {0}")]
    Task(String),
}
