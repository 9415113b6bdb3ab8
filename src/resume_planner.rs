/*!
 * Resume planning against a prior partial output.
 *
 * The checkpoint file is itself a subtitle document; its captions are taken
 * as the already-finalized translations of the source's first K captions,
 * by position. No content diffing is performed: the plan trusts that the
 * checkpoint was produced by a prior run against the same source file.
 *
 * With `validate_timecodes` enabled, that trust is bounded: the pipeline
 * never rewrites timecodes, so a checkpoint longer than the source or one
 * whose prefix timecodes disagree with it can only belong to a different
 * source. Such a checkpoint is discarded and the file starts fresh.
 */

use log::{info, warn};

use crate::subtitle_processor::SubtitleCollection;

/// Result of resume planning: the document to translate into and the index
/// of the first caption still to translate.
#[derive(Debug)]
pub struct ResumePlan {
    /// Source document with the checkpoint's captions spliced over its prefix
    pub working: SubtitleCollection,

    /// Index of the first not-yet-translated caption
    pub cursor: usize,
}

/// Build the working document and resume cursor for one file.
pub fn plan(
    source: &SubtitleCollection,
    checkpoint: Option<&SubtitleCollection>,
    validate_timecodes: bool,
) -> ResumePlan {
    let Some(checkpoint) = checkpoint else {
        return ResumePlan {
            working: source.clone(),
            cursor: 0,
        };
    };

    if checkpoint.entries.len() > source.entries.len() {
        warn!(
            "Ignoring stale checkpoint: it has {} captions but the source only {}",
            checkpoint.entries.len(),
            source.entries.len()
        );
        return ResumePlan {
            working: source.clone(),
            cursor: 0,
        };
    }

    if validate_timecodes && !timecodes_agree(source, checkpoint) {
        warn!("Ignoring stale checkpoint: its timecodes do not match the source file");
        return ResumePlan {
            working: source.clone(),
            cursor: 0,
        };
    }

    let cursor = checkpoint.entries.len();
    let mut working = source.clone();
    working.entries[..cursor].clone_from_slice(&checkpoint.entries);
    working.language = checkpoint.language.clone();

    info!(
        "Resuming: {} of {} captions already translated",
        cursor,
        source.entries.len()
    );

    ResumePlan { working, cursor }
}

/// Check that every checkpoint caption carries the same timecodes as the
/// source caption at the same position.
fn timecodes_agree(source: &SubtitleCollection, checkpoint: &SubtitleCollection) -> bool {
    checkpoint
        .entries
        .iter()
        .zip(source.entries.iter())
        .all(|(cp, src)| {
            cp.start_time_ms == src.start_time_ms && cp.end_time_ms == src.end_time_ms
        })
}
