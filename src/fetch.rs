use async_trait::async_trait;
use std::time::Duration;

use crate::error::Error;

/// Read-only access to the object store holding the source images.
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// Returns the full byte content of `bucket`/`key`.
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, Error>;
}

/// Object store client speaking plain `GET {endpoint}/{bucket}/{key}`,
/// the shape of an S3-compatible read.
pub struct HttpObjectFetcher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpObjectFetcher {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ObjectFetcher for HttpObjectFetcher {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, Error> {
        let url = format!("{}/{}/{}", self.endpoint, bucket, key);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Error::from_transport)?;

        if let Some(err) = Error::from_status(response.status(), bucket, key) {
            return Err(err);
        }

        let bytes = response.bytes().await.map_err(Error::from_transport)?;
        Ok(bytes.to_vec())
    }
}
