use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::debug;

use crate::error::AcquisitionError;

/// Retrieves caption documents.
#[async_trait]
pub trait CaptionFetcher: Send + Sync + 'static {
    /// Fetches the body at `url`. Anything but a 200 is an error.
    async fn fetch(&self, url: &str) -> Result<String, AcquisitionError>;
}

/// Same-origin caption fetcher backed by `reqwest`.
pub struct HttpCaptionFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpCaptionFetcher {
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self, AcquisitionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, max_bytes })
    }
}

#[async_trait]
impl CaptionFetcher for HttpCaptionFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AcquisitionError> {
        let mut response = self.client.get(url).send().await?;
        let status = response.status();
        debug!(%url, status = status.as_u16(), "Caption track response");
        if status != StatusCode::OK {
            return Err(AcquisitionError::Status(status.as_u16()));
        }
        if response
            .content_length()
            .is_some_and(|len| len as usize > self.max_bytes)
        {
            return Err(AcquisitionError::Parse("caption document too large".to_string()));
        }

        // No trustworthy length up front; stop reading once the cap is passed.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(AcquisitionError::Parse("caption document too large".to_string()));
            }
            body.extend_from_slice(&chunk);
        }
        String::from_utf8(body)
            .map_err(|e| AcquisitionError::Parse(format!("caption document is not UTF-8: {e}")))
    }
}

/// Resolves a caption URL that may be relative to the page location.
pub fn resolve_track_url(track_url: &str, page_location: &str) -> Result<String, AcquisitionError> {
    if let Ok(url) = Url::parse(track_url) {
        return Ok(url.to_string());
    }
    let base = Url::parse(page_location)
        .map_err(|e| AcquisitionError::Parse(format!("invalid page location '{page_location}': {e}")))?;
    base.join(track_url)
        .map(|u| u.to_string())
        .map_err(|e| AcquisitionError::Parse(format!("invalid caption url '{track_url}': {e}")))
}
