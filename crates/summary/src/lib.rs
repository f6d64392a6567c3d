use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use tubesum_config::{SummaryLength, SummarySettings, SummaryType};

#[derive(Debug, Error)]
pub enum SummaryError {
    /// Message from the summarization service, shown to the user as-is.
    #[error("{0}")]
    Service(String),
    #[error("Request to summarization service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Transcript is empty")]
    EmptyTranscript,
}

/// Body of `POST /summarize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub video_id: String,
    pub title: String,
    pub transcript: String,
    pub summary_type: SummaryType,
    pub summary_length: SummaryLength,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

/// Client for the external summarization service.
pub struct SummaryClient {
    settings: SummarySettings,
    client: reqwest::Client,
}

impl SummaryClient {
    pub fn new(settings: SummarySettings) -> Result<Self, SummaryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { settings, client })
    }

    /// Builds a request using the configured summary type and length.
    pub fn request(
        &self,
        video_id: impl Into<String>,
        title: impl Into<String>,
        transcript: impl Into<String>,
    ) -> SummaryRequest {
        SummaryRequest {
            video_id: video_id.into(),
            title: title.into(),
            transcript: transcript.into(),
            summary_type: self.settings.summary_type,
            summary_length: self.settings.summary_length,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/summarize", self.settings.base_url.trim_end_matches('/'))
    }

    /// Sends the transcript and returns the markdown summary.
    pub async fn summarize(&self, request: &SummaryRequest) -> Result<String, SummaryError> {
        if request.transcript.trim().is_empty() {
            return Err(SummaryError::EmptyTranscript);
        }

        let url = self.endpoint();
        info!(
            url = %url,
            video_id = %request.video_id,
            transcript_len = request.transcript.len(),
            summary_type = ?request.summary_type,
            summary_length = ?request.summary_length,
            "Requesting summary"
        );

        let resp = self.client.post(&url).json(request).send().await?;
        let status = resp.status();
        debug!(status = status.as_u16(), "Summarization service responded");

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("API error: {}", status.as_u16()));
            warn!(status = status.as_u16(), error = %message, "Summarization failed");
            return Err(SummaryError::Service(message));
        }

        let body: SummaryResponse = resp.json().await?;
        Ok(body.summary)
    }
}
