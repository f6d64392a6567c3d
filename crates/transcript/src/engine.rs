use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use tubesum_config::AcquisitionSettings;

use crate::error::{AcquisitionError, ErrorKind};
use crate::fetch::{CaptionFetcher, HttpCaptionFetcher};
use crate::memory::StrategyMemory;
use crate::page::PageInspector;
use crate::strategy::{self, ExtractionStrategy, StrategyContext};
use crate::tracks::CaptionTrack;
use crate::video::resolve_video_id;
use crate::{ExtractionResult, StrategyId, TranscriptSegment};

/// Runs transcript extraction strategies in priority order.
///
/// The pipeline itself holds no per-page state; the caller keeps the
/// [`StrategyMemory`] between calls.
pub struct TranscriptPipeline {
    /// Strategies in fixed priority order.
    strategies: Vec<Arc<dyn ExtractionStrategy>>,
    fetcher: Arc<dyn CaptionFetcher>,
    settings: AcquisitionSettings,
}

impl TranscriptPipeline {
    /// Creates the pipeline with the default strategy chain and an HTTP fetcher.
    pub fn new(settings: AcquisitionSettings) -> Result<Self, AcquisitionError> {
        let fetcher = HttpCaptionFetcher::new(
            Duration::from_secs(settings.fetch_timeout_secs),
            settings.max_caption_bytes,
        )?;
        Ok(Self::with_parts(strategy::default_strategies(), Arc::new(fetcher), settings))
    }

    /// Creates a pipeline from explicit parts, e.g. to disable or replace a
    /// strategy for a given host page version.
    pub fn with_parts(
        strategies: Vec<Arc<dyn ExtractionStrategy>>,
        fetcher: Arc<dyn CaptionFetcher>,
        settings: AcquisitionSettings,
    ) -> Self {
        let order: Vec<StrategyId> = strategies.iter().map(|s| s.id()).collect();
        info!(?order, "Transcript pipeline created");
        Self {
            strategies,
            fetcher,
            settings,
        }
    }

    pub fn strategy_order(&self) -> Vec<StrategyId> {
        self.strategies.iter().map(|s| s.id()).collect()
    }

    /// Produces a transcript for the page, never failing past this boundary.
    ///
    /// The memoized strategy runs first; on failure the full chain runs
    /// (skipping it). Returns the result together with the updated memory.
    pub async fn extract_transcript(
        &self,
        page: &dyn PageInspector,
        memory: StrategyMemory,
    ) -> (ExtractionResult, StrategyMemory) {
        let video_id = resolve_video_id(page.location());
        if video_id.is_none() {
            debug!(location = %page.location(), "No video id, only id-independent strategies will run");
        }

        let ctx = StrategyContext {
            page,
            video_id: video_id.as_deref(),
            fetcher: self.fetcher.as_ref(),
            settings: &self.settings,
        };

        let remembered = memory
            .last_success()
            .and_then(|id| self.strategies.iter().find(|s| s.id() == id));

        let ordered = remembered
            .into_iter()
            .chain(self.strategies.iter().filter(|s| Some(s.id()) != memory.last_success()));

        for strategy in ordered {
            let id = strategy.id();
            if strategy.requires_video_id() && ctx.video_id.is_none() {
                debug!(strategy = %id, "Skipping strategy, no video id");
                continue;
            }

            debug!(strategy = %id, "Trying extraction strategy");
            match strategy.try_extract(&ctx).await {
                Ok(transcript) => {
                    info!(strategy = %id, "Transcript extracted");
                    return (
                        ExtractionResult::Success {
                            transcript,
                            strategy_used: id,
                        },
                        memory.record(id),
                    );
                }
                Err(e) => {
                    debug!(strategy = %id, kind = ?e.kind(), "Strategy failed: {}", e);
                }
            }
        }

        warn!(location = %page.location(), "No transcript obtainable by any strategy");
        (
            ExtractionResult::Failure {
                error: ErrorKind::NotFound,
            },
            memory,
        )
    }

    /// Every caption track the page exposes.
    pub fn list_caption_tracks(&self, page: &dyn PageInspector) -> Vec<CaptionTrack> {
        strategy::list_caption_tracks(page)
    }

    /// Fetches and merges one explicitly chosen track.
    pub async fn fetch_track(
        &self,
        page: &dyn PageInspector,
        track: &CaptionTrack,
    ) -> Result<Vec<TranscriptSegment>, AcquisitionError> {
        let video_id = resolve_video_id(page.location());
        let ctx = StrategyContext {
            page,
            video_id: video_id.as_deref(),
            fetcher: self.fetcher.as_ref(),
            settings: &self.settings,
        };
        ctx.fetch_segments(track).await
    }
}
