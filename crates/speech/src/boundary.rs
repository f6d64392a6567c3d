//! Maps host character offsets to word indices.
//!
//! Offsets are counted in Unicode scalar values, and words are separated by
//! runs of [`char::is_whitespace`], the same split [`crate::readable::words`]
//! uses for the caller's anchors.

/// Number of words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Returns the 0-based index of the word the host is at when it reports
/// `char_offset`, or `None` when the text has no words.
///
/// Walks from the start of the text, alternately skipping a whitespace run
/// and a word, until the walked position reaches the offset. Each call is
/// independent of earlier ones, so reissued or out-of-order offsets are fine.
/// The result is clamped to the last word.
pub fn word_index_at(text: &str, char_offset: usize) -> Option<usize> {
    let count = word_count(text);
    if count == 0 {
        return None;
    }

    let mut chars = text.chars().peekable();
    let mut pos = 0usize;
    let mut walked = 0usize;

    while pos < char_offset {
        while chars.next_if(|c| c.is_whitespace()).is_some() {
            pos += 1;
        }
        let word_start = pos;
        while chars.next_if(|c| !c.is_whitespace()).is_some() {
            pos += 1;
        }
        if pos == word_start {
            // End of text
            break;
        }
        walked += 1;
    }

    Some(walked.saturating_sub(1).min(count - 1))
}
