//! # Destination Adapter
//!
//! Fetches an ordered list of sources and writes their byte concatenation
//! to one place:
//!
//! - `file://` truncates the file, then appends each source as it arrives.
//!   A failure midway leaves whatever was already written.
//! - `env://` buffers the whole value, then appends one `export` line to
//!   the job's shared [`EnvFile`].

use capem_core::{EnvLocator, FileLocator, Locator, SharedLogger};
use capem_source::SourceAdapter;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::env_file::EnvFile;
use crate::error::{DeliveryError, EnvFileError};

#[derive(Debug, Clone)]
enum Target {
    File(FileLocator),
    Env(EnvLocator),
}

/// A writable destination.
#[derive(Clone)]
pub struct DestinationAdapter {
    target: Target,
    logger: Option<SharedLogger>,
}

impl std::fmt::Debug for DestinationAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestinationAdapter")
            .field("locator", &self.locator_text())
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl DestinationAdapter {
    /// Bind a destination locator. Returns the locator back if its scheme
    /// cannot be written to.
    pub fn new(locator: Locator) -> Result<Self, Locator> {
        let target = match locator {
            Locator::File(l) => Target::File(l),
            Locator::Env(l) => Target::Env(l),
            other => return Err(other),
        };
        Ok(Self {
            target,
            logger: None,
        })
    }

    /// Attach a logger notified before every delivery.
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Text of the destination locator.
    pub fn locator_text(&self) -> &str {
        match &self.target {
            Target::File(l) => l.text(),
            Target::Env(l) => l.text(),
        }
    }

    /// Fetch `sources` in order and write their concatenation.
    pub async fn deliver(
        &self,
        sources: &[SourceAdapter],
        env_file: &EnvFile,
        cancel: &CancellationToken,
    ) -> Result<(), DeliveryError> {
        let destination = self.locator_text();
        if let Some(logger) = &self.logger {
            logger.log(destination);
        }
        if cancel.is_cancelled() {
            return Err(DeliveryError::Cancelled {
                destination: destination.to_string(),
            });
        }

        match &self.target {
            Target::File(l) => deliver_file(l, sources, cancel).await,
            Target::Env(l) => deliver_env(l, sources, env_file, cancel).await,
        }
    }
}

async fn deliver_file(
    locator: &FileLocator,
    sources: &[SourceAdapter],
    cancel: &CancellationToken,
) -> Result<(), DeliveryError> {
    let destination = locator.text();
    let write_error = |source: std::io::Error| DeliveryError::Write {
        destination: destination.to_string(),
        source,
    };

    let mut file = tokio::fs::File::create(locator.path())
        .await
        .map_err(|source| DeliveryError::Create {
            destination: destination.to_string(),
            source,
        })?;

    let mut written = 0usize;
    for source in sources {
        let bytes = fetch(destination, source, cancel).await?;
        file.write_all(&bytes).await.map_err(write_error)?;
        file.flush().await.map_err(write_error)?;
        written += bytes.len();
    }

    tracing::debug!(destination = %destination, sources = sources.len(), bytes = written, "wrote file");
    Ok(())
}

async fn deliver_env(
    locator: &EnvLocator,
    sources: &[SourceAdapter],
    env_file: &EnvFile,
    cancel: &CancellationToken,
) -> Result<(), DeliveryError> {
    let destination = locator.text();

    let mut value = Vec::new();
    for source in sources {
        value.extend_from_slice(&fetch(destination, source, cancel).await?);
    }
    if cancel.is_cancelled() {
        return Err(DeliveryError::Cancelled {
            destination: destination.to_string(),
        });
    }

    env_file
        .append_export(locator.path(), &value)
        .await
        .map_err(|e| match e {
            EnvFileError::Open(source) => DeliveryError::EnvFile {
                destination: destination.to_string(),
                path: env_file.path().display().to_string(),
                source,
            },
            EnvFileError::Write(source) => DeliveryError::Write {
                destination: destination.to_string(),
                source,
            },
        })?;

    tracing::debug!(destination = %destination, bytes = value.len(), "exported variable");
    Ok(())
}

async fn fetch(
    destination: &str,
    source: &SourceAdapter,
    cancel: &CancellationToken,
) -> Result<Vec<u8>, DeliveryError> {
    source
        .fetch(cancel)
        .await
        .map_err(|source| DeliveryError::Fetch {
            destination: destination.to_string(),
            source,
        })
}
