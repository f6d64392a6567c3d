use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{ExtractionStrategy, StrategyContext};
use crate::error::AcquisitionError;
use crate::{StrategyId, Transcript};

/// Opens the page's transcript panel, waits for it to render, scrapes the
/// segment text and closes the panel again.
pub struct TranscriptPanelStrategy;

#[async_trait]
impl ExtractionStrategy for TranscriptPanelStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::TranscriptPanel
    }

    async fn try_extract(&self, ctx: &StrategyContext<'_>) -> Result<Transcript, AcquisitionError> {
        let panel = ctx
            .page
            .transcript_panel()
            .ok_or_else(|| AcquisitionError::MissingAffordance("page has no transcript panel".to_string()))?;

        if !panel.open().await {
            return Err(AcquisitionError::MissingAffordance(
                "show transcript button not found".to_string(),
            ));
        }

        tokio::time::sleep(Duration::from_millis(ctx.settings.ui_settle_delay_ms)).await;
        let texts = panel.segment_texts().await;
        panel.close().await;

        let text = texts
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        debug!(segments = texts.len(), "Scraped transcript panel");

        if text.is_empty() {
            return Err(AcquisitionError::NotFound(
                "transcript panel opened but no text found".to_string(),
            ));
        }
        Ok(Transcript::Plain(text))
    }
}
