use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;

use crate::error::AcquisitionError;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// A single timed caption fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub start_ms: i64,
    pub duration_ms: Option<i64>,
    /// Cleaned text: entities decoded, markup stripped, whitespace collapsed.
    pub text: String,
}

struct PendingCue {
    start_ms: i64,
    duration_ms: Option<i64>,
    raw: String,
    /// Formatting elements opened inside the cue (`<font>`, `<s>`).
    depth: usize,
}

/// Parses a caption document into cues, in document order.
///
/// Accepts the `<text start="s" dur="s">` format and the `<p t="ms" d="ms">`
/// format. Malformed XML, or a cue left open at end of input, is an error.
pub fn parse_cues(xml: &str) -> Result<Vec<Cue>, AcquisitionError> {
    let mut reader = Reader::from_str(xml);
    let mut cues = Vec::new();
    let mut pending: Option<PendingCue> = None;
    let mut last_start_ms = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match pending.as_mut() {
                Some(cue) => cue.depth += 1,
                None => {
                    if let Some((start_ms, duration_ms)) = cue_timing(&e, last_start_ms)? {
                        last_start_ms = start_ms;
                        pending = Some(PendingCue {
                            start_ms,
                            duration_ms,
                            raw: String::new(),
                            depth: 0,
                        });
                    }
                }
            },
            Ok(Event::End(_)) => {
                if let Some(cue) = pending.as_mut() {
                    if cue.depth > 0 {
                        cue.depth -= 1;
                    } else if let Some(cue) = pending.take() {
                        let text = clean_cue_text(&cue.raw);
                        if !text.is_empty() {
                            cues.push(Cue {
                                start_ms: cue.start_ms,
                                duration_ms: cue.duration_ms,
                                text,
                            });
                        }
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(cue) = pending.as_mut() {
                    cue.raw.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Ok(Event::CData(t)) => {
                if let Some(cue) = pending.as_mut() {
                    cue.raw.push_str(&String::from_utf8_lossy(&t));
                }
            }
            // `<br/>` and other self-closing elements inside a cue separate words.
            Ok(Event::Empty(_)) => {
                if let Some(cue) = pending.as_mut() {
                    cue.raw.push(' ');
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(AcquisitionError::Parse(format!(
                    "malformed caption XML at byte {}: {e}",
                    reader.error_position()
                )));
            }
        }
    }

    if pending.is_some() {
        return Err(AcquisitionError::Parse("caption XML ended inside a cue".to_string()));
    }
    Ok(cues)
}

/// Returns `(start_ms, duration_ms)` when the element is a cue.
fn cue_timing(e: &BytesStart, last_start_ms: i64) -> Result<Option<(i64, Option<i64>)>, AcquisitionError> {
    let (start_attr, dur_attr, scale) = match e.name().as_ref() {
        b"text" => ("start", "dur", 1000.0),
        b"p" => ("t", "d", 1.0),
        _ => return Ok(None),
    };
    let start_ms = numeric_attr(e, start_attr, scale)?.unwrap_or(last_start_ms);
    let duration_ms = numeric_attr(e, dur_attr, scale)?;
    Ok(Some((start_ms, duration_ms)))
}

fn numeric_attr(e: &BytesStart, name: &str, scale: f64) -> Result<Option<i64>, AcquisitionError> {
    let attr = e
        .try_get_attribute(name)
        .map_err(|err| AcquisitionError::Parse(format!("bad attribute '{name}': {err}")))?;
    Ok(attr.and_then(|a| {
        std::str::from_utf8(&a.value)
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .map(|v| (v * scale).round().max(0.0) as i64)
    }))
}

/// Cue bodies are entity-encoded once by XML and often once more by the
/// caption service, so decoding runs twice before markup is stripped.
pub fn clean_cue_text(raw: &str) -> String {
    let decoded = decode_entities(&decode_entities(raw));
    TAG_RE
        .replace_all(&decoded, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decodes named XML/HTML entities and numeric character references.
/// Unknown entities are left as written.
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
