use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use tokio::net::TcpListener;

/// In-process caption server. `GET /captions/{name}` serves the registered
/// document, anything unregistered is a 404. `GET /slow/{name}` serves the
/// same document after [`SLOW_DELAY`].
pub struct CaptionServer {
    pub addr: SocketAddr,
}

impl CaptionServer {
    pub async fn spawn(documents: Vec<(&str, String)>) -> Self {
        let documents: Arc<HashMap<String, String>> = Arc::new(
            documents
                .into_iter()
                .map(|(name, body)| (name.to_string(), body))
                .collect(),
        );

        let app = Router::new()
            .route("/captions/{name}", get(serve_caption))
            .route("/slow/{name}", get(serve_slowly))
            .with_state(documents);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr }
    }

    pub fn url(&self, name: &str) -> String {
        format!("http://{}/captions/{}", self.addr, name)
    }

    pub fn slow_url(&self, name: &str) -> String {
        format!("http://{}/slow/{}", self.addr, name)
    }
}

async fn serve_caption(
    State(documents): State<Arc<HashMap<String, String>>>,
    Path(name): Path<String>,
) -> Result<String, StatusCode> {
    documents.get(&name).cloned().ok_or(StatusCode::NOT_FOUND)
}

pub const SLOW_DELAY: Duration = Duration::from_secs(5);

async fn serve_slowly(
    state: State<Arc<HashMap<String, String>>>,
    name: Path<String>,
) -> Result<String, StatusCode> {
    tokio::time::sleep(SLOW_DELAY).await;
    serve_caption(state, name).await
}

/// Builds a caption document from `(start_secs, text)` pairs, XML-escaping the text.
pub fn caption_xml(cues: &[(f64, &str)]) -> String {
    let body: String = cues
        .iter()
        .map(|(start, text)| {
            let escaped = text
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;");
            format!(r#"<text start="{start}" dur="1.5">{escaped}</text>"#)
        })
        .collect();
    format!(r#"<?xml version="1.0" encoding="utf-8" ?><transcript>{body}</transcript>"#)
}

/// A player response listing the given `(language, url)` tracks.
pub fn player_response(tracks: &[(&str, &str)]) -> serde_json::Value {
    let tracks: Vec<serde_json::Value> = tracks
        .iter()
        .map(|(lang, url)| {
            serde_json::json!({
                "baseUrl": url,
                "languageCode": lang,
                "name": {"simpleText": lang.to_uppercase()},
            })
        })
        .collect();
    serde_json::json!({
        "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": tracks}}
    })
}
