//! Filestack publish adapter.
//!
//! Implements [`PublishPort`] against the Filestack store endpoint:
//! `POST {endpoint}?key=…&mimetype=…` with the raw file as body. The
//! JSON reply carries the CDN `url` that becomes the session reference.
//! One attempt per call; retry policy belongs to the caller.

use std::fs;
use std::path::Path;
use std::time::Duration;

use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use crate::app::ports::PublishPort;
use crate::config::PublisherConfig;
use crate::error::PublishError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Subset of the store reply we rely on.
#[derive(Debug, Deserialize)]
struct StoreResponse {
    url: String,
    #[serde(default)]
    size: Option<u64>,
}

pub struct FilestackPublisher {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl FilestackPublisher {
    pub fn new(config: &PublisherConfig) -> Result<Self, PublishError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PublishError::Network(e.to_string()))?;
        info!("Publisher: Filestack store at {}", config.endpoint);
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

impl PublishPort for FilestackPublisher {
    fn publish(&mut self, artifact_path: &Path, content_type: &str) -> Result<String, PublishError> {
        let body = fs::read(artifact_path)
            .map_err(|e| PublishError::Io(format!("{}: {e}", artifact_path.display())))?;
        debug!("uploading {} bytes from {}", body.len(), artifact_path.display());

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str()), ("mimetype", content_type)])
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .map_err(|e: reqwest::Error| PublishError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Status(status.as_u16()));
        }
        let text = response
            .text()
            .map_err(|e: reqwest::Error| PublishError::Network(e.to_string()))?;
        parse_store_response(&text)
    }
}

/// Extract the CDN url from a store reply.
pub fn parse_store_response(text: &str) -> Result<String, PublishError> {
    let reply: StoreResponse =
        serde_json::from_str(text).map_err(|e| PublishError::MalformedResponse(e.to_string()))?;
    if reply.url.trim().is_empty() {
        return Err(PublishError::MalformedResponse("empty url".into()));
    }
    if let Some(size) = reply.size {
        debug!("stored {size} bytes");
    }
    Ok(reply.url)
}
