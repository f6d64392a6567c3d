pub mod page_markup;
pub mod player_data;
pub mod script_tags;
pub mod transcript_panel;

pub use page_markup::PageMarkupSource;
pub use player_data::PlayerDataSource;
pub use script_tags::ScriptTagSource;
pub use transcript_panel::TranscriptPanelStrategy;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use tubesum_config::AcquisitionSettings;

use crate::error::AcquisitionError;
use crate::fetch::{CaptionFetcher, resolve_track_url};
use crate::page::PageInspector;
use crate::pipeline::segments_from_caption_xml;
use crate::tracks::{CaptionTrack, select_track};
use crate::{StrategyId, Transcript, TranscriptSegment};

/// Everything a strategy may read during one acquisition call.
pub struct StrategyContext<'a> {
    pub page: &'a dyn PageInspector,
    pub video_id: Option<&'a str>,
    pub fetcher: &'a dyn CaptionFetcher,
    pub settings: &'a AcquisitionSettings,
}

impl StrategyContext<'_> {
    /// Fetches one caption track and turns it into merged segments.
    pub async fn fetch_segments(&self, track: &CaptionTrack) -> Result<Vec<TranscriptSegment>, AcquisitionError> {
        let url = resolve_track_url(&track.url, self.page.location())?;
        debug!(language = %track.language_code, %url, "Fetching caption track");
        let body = self.fetcher.fetch(&url).await?;
        segments_from_caption_xml(&body, &self.settings.merge)
    }
}

/// Trait for pluggable transcript extraction techniques.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync + 'static {
    fn id(&self) -> StrategyId;

    /// Strategies that only make sense for an identified video are skipped
    /// when no identifier resolves.
    fn requires_video_id(&self) -> bool {
        false
    }

    async fn try_extract(&self, ctx: &StrategyContext<'_>) -> Result<Transcript, AcquisitionError>;
}

/// Finds caption-track lists in page state without any I/O.
pub trait TrackSource: Send + Sync + 'static {
    fn id(&self) -> StrategyId;

    fn requires_video_id(&self) -> bool {
        false
    }

    /// Returns the discovered tracks. An empty list is a failure.
    fn locate_tracks(&self, page: &dyn PageInspector) -> Result<Vec<CaptionTrack>, AcquisitionError>;
}

/// Adapts a [`TrackSource`] into a full strategy: locate, select, fetch, merge.
pub struct CaptionTrackStrategy<S> {
    source: S,
}

impl<S: TrackSource> CaptionTrackStrategy<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: TrackSource> ExtractionStrategy for CaptionTrackStrategy<S> {
    fn id(&self) -> StrategyId {
        self.source.id()
    }

    fn requires_video_id(&self) -> bool {
        self.source.requires_video_id()
    }

    async fn try_extract(&self, ctx: &StrategyContext<'_>) -> Result<Transcript, AcquisitionError> {
        let tracks = self.source.locate_tracks(ctx.page)?;
        let track = select_track(&tracks, &ctx.settings.preferred_language)
            .ok_or_else(|| AcquisitionError::NotFound("empty caption track list".to_string()))?;
        let segments = ctx.fetch_segments(track).await?;
        Ok(Transcript::Segments(segments))
    }
}

/// The fixed-priority strategy chain.
pub fn default_strategies() -> Vec<Arc<dyn ExtractionStrategy>> {
    vec![
        Arc::new(CaptionTrackStrategy::new(PlayerDataSource)),
        Arc::new(CaptionTrackStrategy::new(ScriptTagSource)),
        Arc::new(CaptionTrackStrategy::new(PageMarkupSource)),
        Arc::new(TranscriptPanelStrategy),
    ]
}

/// Lists every caption track the page exposes, from the first source that finds any.
pub fn list_caption_tracks(page: &dyn PageInspector) -> Vec<CaptionTrack> {
    let sources: [&dyn TrackSource; 3] = [&PlayerDataSource, &ScriptTagSource, &PageMarkupSource];
    for source in sources {
        match source.locate_tracks(page) {
            Ok(tracks) if !tracks.is_empty() => return tracks,
            Ok(_) => {}
            Err(e) => debug!(source = %source.id(), "No tracks: {}", e),
        }
    }
    Vec::new()
}

/// Parses the first JSON value at the start of `text`, ignoring whatever follows.
pub(crate) fn json_value_at(text: &str) -> Option<Value> {
    serde_json::Deserializer::from_str(text)
        .into_iter::<Value>()
        .next()?
        .ok()
}

pub(crate) fn non_empty(tracks: Vec<CaptionTrack>, what: &str) -> Result<Vec<CaptionTrack>, AcquisitionError> {
    if tracks.is_empty() {
        Err(AcquisitionError::NotFound(format!("no caption tracks in {what}")))
    } else {
        Ok(tracks)
    }
}
