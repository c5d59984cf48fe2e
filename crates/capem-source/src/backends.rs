//! Backend handles shared by every source adapter in one job.

use std::sync::Arc;

use crate::error::BackendError;
use crate::github::{GitHubClient, GitHubConfig};
use crate::s3::S3Backend;

/// One GitHub client and one lazily configured S3 client per job.
#[derive(Debug, Clone)]
pub struct SourceBackends {
    github: Arc<GitHubClient>,
    s3: Arc<S3Backend>,
}

impl SourceBackends {
    /// Combine explicitly built backends.
    pub fn new(github: GitHubClient, s3: S3Backend) -> Self {
        Self {
            github: Arc::new(github),
            s3: Arc::new(s3),
        }
    }

    /// GitHub settings from the environment; AWS settings deferred to first use.
    pub fn from_env() -> Result<Self, BackendError> {
        let github = GitHubClient::new(GitHubConfig::from_env()?)?;
        Ok(Self::new(github, S3Backend::new()))
    }

    pub(crate) fn github(&self) -> Arc<GitHubClient> {
        Arc::clone(&self.github)
    }

    pub(crate) fn s3(&self) -> Arc<S3Backend> {
        Arc::clone(&self.s3)
    }
}
