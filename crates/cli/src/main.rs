use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;
use tubesum_config::Settings;
use tubesum_speech::{readable_text, word_index_at, words};
use tubesum_summary::SummaryClient;
use tubesum_transcript::{
    ExtractionResult, StaticPage, StrategyMemory, Transcript, TranscriptPipeline, VideoDetails,
};

const NO_TRANSCRIPT: &str = "No transcript available for this video.";

#[derive(Parser)]
#[command(name = "tubesum", version, about = "Video transcript extraction and summaries")]
struct Cli {
    /// Settings file (TOML). Environment variables prefixed TUBESUM__ override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log as JSON lines instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the transcript from a saved video page.
    Extract {
        /// Saved HTML of the video page.
        #[arg(long)]
        page: PathBuf,
        /// Address the page was saved from.
        #[arg(long)]
        url: String,
        /// Print timestamped segments as JSON instead of plain text.
        #[arg(long)]
        segments: bool,
        /// Fetch this caption language instead of running the strategy chain.
        #[arg(long)]
        lang: Option<String>,
    },
    /// Extract the transcript and request a summary of it.
    Summarize {
        #[arg(long)]
        page: PathBuf,
        #[arg(long)]
        url: String,
        /// Print the text that would be spoken instead of the markdown.
        #[arg(long)]
        readable: bool,
    },
    /// Show which word a speech host's character offset maps to.
    Words {
        #[arg(long)]
        text: String,
        #[arg(long)]
        offset: usize,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn load_page(path: &Path, url: &str) -> anyhow::Result<StaticPage> {
    let html = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read page '{}'", path.display()))?;
    Ok(StaticPage::from_html(url, html))
}

async fn extract(
    settings: &Settings,
    page: &Path,
    url: &str,
    segments: bool,
    lang: Option<String>,
) -> anyhow::Result<()> {
    let page = load_page(page, url).await?;
    let pipeline = TranscriptPipeline::new(settings.acquisition.clone())?;

    let transcript = match lang {
        Some(lang) => {
            let tracks = pipeline.list_caption_tracks(&page);
            let Some(track) = tracks.iter().find(|t| t.language_code == lang) else {
                let available: Vec<&str> = tracks.iter().map(|t| t.language_code.as_str()).collect();
                bail!("No '{}' captions on this page (available: {:?})", lang, available);
            };
            Transcript::Segments(pipeline.fetch_track(&page, track).await?)
        }
        None => match pipeline.extract_transcript(&page, StrategyMemory::new()).await.0 {
            ExtractionResult::Success {
                transcript,
                strategy_used,
            } => {
                info!(strategy = %strategy_used, "Extraction succeeded");
                transcript
            }
            ExtractionResult::Failure { .. } => bail!(NO_TRANSCRIPT),
        },
    };

    match (segments, transcript.segments()) {
        (true, Some(segments)) => println!("{}", serde_json::to_string_pretty(segments)?),
        _ => println!("{}", transcript.plain_text()),
    }
    Ok(())
}

async fn summarize(settings: &Settings, page: &Path, url: &str, readable: bool) -> anyhow::Result<()> {
    let page = load_page(page, url).await?;
    let pipeline = TranscriptPipeline::new(settings.acquisition.clone())?;

    let (result, _) = pipeline.extract_transcript(&page, StrategyMemory::new()).await;
    let Some(transcript) = result.transcript() else {
        bail!(NO_TRANSCRIPT);
    };

    let details = VideoDetails::from_page(&page);
    let client = SummaryClient::new(settings.summary.clone())?;
    let request = client.request(
        details.video_id.unwrap_or_default(),
        details.title,
        transcript.plain_text(),
    );
    let summary = client.summarize(&request).await?;

    if readable {
        println!("{}", readable_text(&summary));
    } else {
        println!("{summary}");
    }
    Ok(())
}

fn show_word(text: &str, offset: usize) {
    let all = words(text);
    match word_index_at(text, offset) {
        Some(index) => println!("{index}\t{}", all[index]),
        None => println!("-1"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Command::Extract {
            page,
            url,
            segments,
            lang,
        } => extract(&settings, &page, &url, segments, lang).await,
        Command::Summarize { page, url, readable } => summarize(&settings, &page, &url, readable).await,
        Command::Words { text, offset } => {
            show_word(&text, offset);
            Ok(())
        }
    }
}
