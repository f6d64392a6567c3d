//! End-to-end acquisition tests against an in-process caption server.
//!
//! Run with:
//! ```
//! cargo test -p tubesum-transcript --test acquisition
//! ```

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use common::{CaptionServer, SLOW_DELAY, caption_xml, player_response};
use tubesum_config::AcquisitionSettings;
use tubesum_transcript::{
    ErrorKind, ExtractionResult, PageInspector, StaticPage, StrategyId, StrategyMemory, Transcript,
    TranscriptPanel, TranscriptPipeline,
};

const WATCH_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

fn pipeline() -> TranscriptPipeline {
    TranscriptPipeline::new(AcquisitionSettings::default()).unwrap()
}

#[tokio::test]
async fn player_data_fetches_and_merges_english_track() {
    let server = CaptionServer::spawn(vec![
        (
            "en",
            caption_xml(&[
                (0.0, "a".repeat(40).as_str()),
                (2.0, "b".repeat(600).as_str()),
                (4.5, "c".repeat(30).as_str()),
            ]),
        ),
        ("de", caption_xml(&[(0.0, "hallo")])),
    ])
    .await;
    let page = StaticPage::new(WATCH_URL).with_player_response(player_response(&[
        ("de", server.url("de").as_str()),
        ("en", server.url("en").as_str()),
    ]));

    let (result, memory) = pipeline().extract_transcript(&page, StrategyMemory::new()).await;

    assert_eq!(result.strategy_used(), Some(StrategyId::PlayerData));
    assert_eq!(memory.last_success(), Some(StrategyId::PlayerData));
    let segments = result.transcript().and_then(Transcript::segments).unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].start_offset_ms, 0);
    assert_eq!(segments[1].start_offset_ms, 4500);
    assert_eq!(segments[1].text, "c".repeat(30));
}

#[tokio::test]
async fn markup_only_page_falls_through_to_page_markup() {
    let server = CaptionServer::spawn(vec![(
        "en",
        caption_xml(&[(1.0, "Tom &amp; Jerry"), (2.0, "<i>chase</i> scene.")]),
    )])
    .await;
    let markup = format!(
        "<html><body><div id=\"player\"></div>var ytInitialPlayerResponse = {};</body></html>",
        player_response(&[("en", server.url("en").as_str())])
    );
    let page = StaticPage::new(WATCH_URL).with_markup(markup);

    let (result, _) = pipeline().extract_transcript(&page, StrategyMemory::new()).await;

    assert_eq!(result.strategy_used(), Some(StrategyId::PageMarkup));
    assert_eq!(
        result.transcript().map(Transcript::plain_text).as_deref(),
        Some("Tom & Jerry chase scene.")
    );
}

#[tokio::test]
async fn non_200_track_is_strategy_failure() {
    let server = CaptionServer::spawn(vec![("good", caption_xml(&[(0.0, "from the script tag")]))]).await;
    let script = format!(
        r#"var cfg = {{"captionTracks":[{{"baseUrl":"{}","languageCode":"en"}}]}};"#,
        server.url("good")
    );
    let page = StaticPage::new(WATCH_URL)
        .with_player_response(player_response(&[("en", server.url("missing").as_str())]))
        .with_script(script);

    let (result, _) = pipeline().extract_transcript(&page, StrategyMemory::new()).await;

    assert_eq!(result.strategy_used(), Some(StrategyId::ScriptTags));
    assert_eq!(
        result.transcript().map(Transcript::plain_text).as_deref(),
        Some("from the script tag")
    );
}

#[tokio::test]
async fn timed_out_track_is_strategy_failure() {
    let server = CaptionServer::spawn(vec![("en", caption_xml(&[(0.0, "fast enough")]))]).await;
    let script = format!(
        r#"var cfg = {{"captionTracks":[{{"baseUrl":"{}","languageCode":"en"}}]}};"#,
        server.url("en")
    );
    let page = StaticPage::new(WATCH_URL)
        .with_player_response(player_response(&[("en", server.slow_url("en").as_str())]))
        .with_script(script);
    let pipeline = TranscriptPipeline::new(AcquisitionSettings {
        fetch_timeout_secs: 1,
        ..Default::default()
    })
    .unwrap();

    let started = Instant::now();
    let (result, _) = pipeline.extract_transcript(&page, StrategyMemory::new()).await;

    assert!(started.elapsed() < SLOW_DELAY);
    assert_eq!(result.strategy_used(), Some(StrategyId::ScriptTags));
    assert_eq!(
        result.transcript().map(Transcript::plain_text).as_deref(),
        Some("fast enough")
    );

    let slow_track = &pipeline.list_caption_tracks(&page)[0];
    let err = pipeline.fetch_track(&page, slow_track).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkError);
}

#[tokio::test]
async fn malformed_xml_is_strategy_failure() {
    let server = CaptionServer::spawn(vec![(
        "broken",
        "<transcript><text start=\"0\">unterminated</p>".to_string(),
    )])
    .await;
    let page = StaticPage::new(WATCH_URL)
        .with_player_response(player_response(&[("en", server.url("broken").as_str())]));

    let (result, _) = pipeline().extract_transcript(&page, StrategyMemory::new()).await;

    assert_eq!(
        result,
        ExtractionResult::Failure {
            error: ErrorKind::NotFound
        }
    );
}

#[tokio::test]
async fn bare_page_reports_not_found() {
    let page = StaticPage::from_html(WATCH_URL, "<html><head><title>x</title></head><body></body></html>");

    let (result, memory) = pipeline().extract_transcript(&page, StrategyMemory::new()).await;

    assert_eq!(
        result,
        ExtractionResult::Failure {
            error: ErrorKind::NotFound
        }
    );
    assert_eq!(memory.last_success(), None);
}

#[tokio::test]
async fn list_and_fetch_explicit_track() {
    let server = CaptionServer::spawn(vec![("de", caption_xml(&[(0.25, "Guten Tag.")]))]).await;
    let page = StaticPage::new(WATCH_URL).with_player_response(player_response(&[
        ("en", server.url("en").as_str()),
        ("de", server.url("de").as_str()),
    ]));
    let pipeline = pipeline();

    let tracks = pipeline.list_caption_tracks(&page);
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[1].display_name, "DE");

    let segments = pipeline.fetch_track(&page, &tracks[1]).await.unwrap();
    assert_eq!(segments[0].start_offset_ms, 250);
    assert_eq!(segments[0].text, "Guten Tag.");

    assert!(pipeline.fetch_track(&page, &tracks[0]).await.is_err());
}

/// Fake transcript panel recording open/close calls.
#[derive(Default)]
struct FakePanel {
    present: bool,
    texts: Vec<String>,
    opened: AtomicUsize,
    closed: AtomicUsize,
    calls: Mutex<Vec<&'static str>>,
}

#[async_trait]
impl TranscriptPanel for FakePanel {
    async fn open(&self) -> bool {
        self.calls.lock().unwrap().push("open");
        if self.present {
            self.opened.fetch_add(1, Ordering::SeqCst);
        }
        self.present
    }

    async fn segment_texts(&self) -> Vec<String> {
        self.calls.lock().unwrap().push("scrape");
        self.texts.clone()
    }

    async fn close(&self) {
        self.calls.lock().unwrap().push("close");
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test(start_paused = true)]
async fn transcript_panel_is_opened_scraped_and_closed() {
    let panel = Arc::new(FakePanel {
        present: true,
        texts: vec!["  first line ".into(), "".into(), "second line".into()],
        ..Default::default()
    });
    // No video id: only the markup and panel strategies may run.
    let page = StaticPage::new("https://www.youtube.com/").with_panel(panel.clone());

    let (result, memory) = pipeline().extract_transcript(&page, StrategyMemory::new()).await;

    assert_eq!(result.strategy_used(), Some(StrategyId::TranscriptPanel));
    assert_eq!(
        result.transcript(),
        Some(&Transcript::Plain("first line second line".to_string()))
    );
    assert_eq!(memory.last_success(), Some(StrategyId::TranscriptPanel));
    assert_eq!(*panel.calls.lock().unwrap(), vec!["open", "scrape", "close"]);
}

#[tokio::test(start_paused = true)]
async fn missing_panel_affordance_is_not_found() {
    let panel = Arc::new(FakePanel::default());
    let page = StaticPage::new(WATCH_URL).with_panel(panel.clone());
    assert!(page.transcript_panel().is_some());

    let (result, _) = pipeline().extract_transcript(&page, StrategyMemory::new()).await;

    assert!(!result.is_success());
    assert_eq!(panel.opened.load(Ordering::SeqCst), 0);
    assert_eq!(panel.closed.load(Ordering::SeqCst), 0);
}
