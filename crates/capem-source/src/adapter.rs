//! # Source Adapter
//!
//! Fetch-then-validate, bound to one source locator and one asset
//! category. Exactly one variant per fetchable scheme; `env://` is a
//! destination-only scheme and has no variant here.

use std::future::Future;
use std::sync::Arc;

use capem_core::{
    AssetCategory, FileLocator, GitHubLocator, Locator, S3Locator, SharedLogger,
};
use tokio_util::sync::CancellationToken;

use crate::backends::SourceBackends;
use crate::error::{FetchError, NotASource};
use crate::github::GitHubClient;
use crate::s3::S3Backend;

/// Scheme-specific fetch target.
#[derive(Debug, Clone)]
enum Backend {
    File(FileLocator),
    GitHub(GitHubLocator, Arc<GitHubClient>),
    S3(S3Locator, Arc<S3Backend>),
}

/// A fetchable, validated source.
#[derive(Clone)]
pub struct SourceAdapter {
    backend: Backend,
    category: AssetCategory,
    logger: Option<SharedLogger>,
}

impl std::fmt::Debug for SourceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceAdapter")
            .field("locator", &self.locator_text())
            .field("category", &self.category)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl SourceAdapter {
    /// Bind `locator` to the matching backend.
    ///
    /// # Errors
    ///
    /// Returns [`NotASource`] for `env://` locators.
    pub fn new(
        locator: Locator,
        category: AssetCategory,
        backends: &SourceBackends,
    ) -> Result<Self, NotASource> {
        let backend = match locator {
            Locator::File(l) => Backend::File(l),
            Locator::GitHub(l) => Backend::GitHub(l, backends.github()),
            Locator::S3(l) => Backend::S3(l, backends.s3()),
            other => {
                return Err(NotASource {
                    scheme: other.scheme(),
                    text: other.text().to_string(),
                })
            }
        };
        Ok(Self {
            backend,
            category,
            logger: None,
        })
    }

    /// Attach a logger notified before every fetch.
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Text of the source locator.
    pub fn locator_text(&self) -> &str {
        match &self.backend {
            Backend::File(l) => l.text(),
            Backend::GitHub(l, _) => l.text(),
            Backend::S3(l, _) => l.text(),
        }
    }

    /// Category the fetched bytes are validated against.
    pub fn category(&self) -> AssetCategory {
        self.category
    }

    /// Fetch the bytes and check them against the category.
    ///
    /// Returns [`FetchError::Cancelled`] as soon as `cancel` fires, whether
    /// before the request is issued or while it is in flight.
    pub async fn fetch(&self, cancel: &CancellationToken) -> Result<Vec<u8>, FetchError> {
        let text = self.locator_text();
        if let Some(logger) = &self.logger {
            logger.log(text);
        }

        let bytes = until_cancelled(cancel, text, async {
            match &self.backend {
                Backend::File(l) => {
                    tokio::fs::read(l.path())
                        .await
                        .map_err(|source| FetchError::Io {
                            locator: text.to_string(),
                            source,
                        })
                }
                Backend::GitHub(l, client) => client.get_file(l).await,
                Backend::S3(l, s3) => s3.get_object(l).await,
            }
        })
        .await?;

        self.category
            .check_content(&bytes)
            .map_err(|source| FetchError::Content {
                locator: text.to_string(),
                source,
            })?;

        tracing::debug!(locator = %text, category = %self.category, bytes = bytes.len(), "fetched source");
        Ok(bytes)
    }
}

/// Race `fut` against cancellation. Cancellation wins ties.
pub async fn until_cancelled<T, F>(
    cancel: &CancellationToken,
    locator: &str,
    fut: F,
) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FetchError::Cancelled { locator: locator.to_string() }),
        result = fut => result,
    }
}
