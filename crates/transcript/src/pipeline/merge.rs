use tubesum_config::MergeLimits;

use super::cue_parser::Cue;
use crate::TranscriptSegment;

/// Merges consecutive cues into coarser segments.
///
/// A segment stays open while it is under every limit; the cue that arrives
/// once any limit is reached opens the next segment. A segment therefore
/// exceeds a limit only by its final cue. Output is ordered by start offset.
pub fn merge_cues(cues: &[Cue], limits: &MergeLimits) -> Vec<TranscriptSegment> {
    let mut ordered: Vec<&Cue> = cues.iter().filter(|c| !c.text.is_empty()).collect();
    ordered.sort_by_key(|c| c.start_ms);

    let mut segments: Vec<TranscriptSegment> = Vec::new();
    let mut words = 0usize;
    let mut sentences = 0usize;

    for cue in ordered {
        let full = segments.last().is_none_or(|last| {
            last.text.chars().count() >= limits.max_chars
                || words >= limits.max_words
                || sentences >= limits.max_sentences
        });

        if full {
            segments.push(TranscriptSegment {
                start_offset_ms: cue.start_ms,
                text: cue.text.clone(),
            });
            words = 0;
            sentences = 0;
        } else if let Some(last) = segments.last_mut() {
            last.text.push(' ');
            last.text.push_str(&cue.text);
        }

        words += cue.text.split_whitespace().count();
        if cue.text.ends_with('.') {
            sentences += 1;
        }
    }

    segments
}
