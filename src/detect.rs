use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Error;
use crate::models::{DetectParams, DetectionLabel};

/// Query interface of the object-detection service. Pure query: the
/// service reads the image from the store itself, keyed by bucket/key.
#[async_trait]
pub trait DetectionClient: Send + Sync {
    /// Returns at most `params.max_labels` labels with confidence at or
    /// above `params.min_confidence`, in the order the service ranked
    /// them.
    async fn detect(
        &self,
        bucket: &str,
        key: &str,
        params: &DetectParams,
    ) -> Result<Vec<DetectionLabel>, Error>;
}

// Wire types mirror the DetectLabels API: PascalCase fields, image
// addressed through an S3 object reference.

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DetectLabelsRequest<'a> {
    image: ImageSpec<'a>,
    max_labels: u32,
    min_confidence: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ImageSpec<'a> {
    s3_object: S3Object<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct S3Object<'a> {
    bucket: &'a str,
    name: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DetectLabelsResponse {
    #[serde(default)]
    labels: Vec<DetectionLabel>,
}

/// Detection service client posting `DetectLabels`-shaped JSON.
pub struct HttpDetectionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDetectionClient {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DetectionClient for HttpDetectionClient {
    async fn detect(
        &self,
        bucket: &str,
        key: &str,
        params: &DetectParams,
    ) -> Result<Vec<DetectionLabel>, Error> {
        let body = DetectLabelsRequest {
            image: ImageSpec {
                s3_object: S3Object { bucket, name: key },
            },
            max_labels: params.max_labels,
            min_confidence: params.min_confidence,
        };

        let url = format!("{}/detect-labels", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(Error::from_transport)?;

        if let Some(err) = Error::from_status(response.status(), bucket, key) {
            return Err(err);
        }

        let parsed: DetectLabelsResponse = response
            .json()
            .await
            .map_err(|e| Error::Transient(format!("malformed detection response: {}", e)))?;
        Ok(parsed.labels)
    }
}
