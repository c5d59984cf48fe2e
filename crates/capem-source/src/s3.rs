//! S3 backend: `GetObject` with the ambient AWS configuration.

use aws_config::BehaviorVersion;
use capem_core::S3Locator;
use tokio::sync::OnceCell;

use crate::error::FetchError;

/// Lazily-configured S3 client, shared by every S3 source in a job.
///
/// Credentials and region come from the standard AWS provider chain the
/// first time an S3 source is fetched. Jobs without S3 sources never
/// touch AWS configuration.
#[derive(Debug, Default)]
pub struct S3Backend {
    client: OnceCell<aws_sdk_s3::Client>,
}

impl S3Backend {
    /// A backend that loads the default AWS configuration on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend bound to an already configured client.
    pub fn with_client(client: aws_sdk_s3::Client) -> Self {
        Self {
            client: OnceCell::from(client),
        }
    }

    async fn client(&self) -> &aws_sdk_s3::Client {
        self.client
            .get_or_init(|| async {
                let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
                tracing::debug!(region = ?config.region(), "loaded AWS configuration");
                aws_sdk_s3::Client::new(&config)
            })
            .await
    }

    /// Download the whole object.
    pub async fn get_object(&self, locator: &S3Locator) -> Result<Vec<u8>, FetchError> {
        let output = self
            .client()
            .await
            .get_object()
            .bucket(locator.bucket())
            .key(locator.key())
            .send()
            .await
            .map_err(|source| FetchError::S3 {
                locator: locator.text().to_string(),
                source: Box::new(source),
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|source| FetchError::S3Body {
                locator: locator.text().to_string(),
                source,
            })?;

        Ok(body.into_bytes().to_vec())
    }
}
