pub mod cue_parser;
pub mod merge;

pub use cue_parser::{Cue, clean_cue_text, decode_entities, parse_cues};
pub use merge::merge_cues;

use tubesum_config::MergeLimits;

use crate::TranscriptSegment;
use crate::error::AcquisitionError;

/// Caption document → merged segments. A document without cues is an error.
pub fn segments_from_caption_xml(
    xml: &str,
    limits: &MergeLimits,
) -> Result<Vec<TranscriptSegment>, AcquisitionError> {
    let cues = parse_cues(xml)?;
    if cues.is_empty() {
        return Err(AcquisitionError::Parse("no cues in caption document".to_string()));
    }
    Ok(merge_cues(&cues, limits))
}
