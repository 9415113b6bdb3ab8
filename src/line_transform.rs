/*!
 * Line merge/split transform.
 *
 * Multi-line captions are joined into a single translation unit before being
 * sent to the provider, so the provider's line-level inconsistency cannot
 * fragment a sentence that happens to wrap mid-way. The join uses a separator
 * character the translation service passes through as ordinary punctuation;
 * after translation the separator is turned back into line breaks.
 *
 * Captions whose first line carries a dialogue marker (a leading hyphen) are
 * speaker turns and are never merged: each line is translated independently.
 */

use crate::subtitle_processor::SubtitleEntry;

/// Separator used to join caption lines into one translation unit.
/// Never expected to appear in genuine subtitle text.
pub const LINE_SEPARATOR: char = '¶';

/// The separator as it is sent and expected back: surrounded by spaces.
pub const SEPARATOR_RENDERING: &str = " ¶ ";

/// Derived per-caption translation input. The original caption is left
/// untouched; this unit exists only for the duration of one translate step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    /// Texts to send to the provider, one call each
    pub texts: Vec<String>,

    /// Whether `texts` holds a single separator-joined string
    pub merged: bool,
}

/// A line starting with a (possibly indented) hyphen is one speaker's turn
pub fn is_dialogue_line(line: &str) -> bool {
    line.trim_start().starts_with('-')
}

/// Plan the translation unit for a caption.
///
/// Multi-line captions merge into one separator-joined string unless the
/// first line is a dialogue marker; dialogue and single-line captions keep
/// one text per line.
pub fn plan_caption(entry: &SubtitleEntry) -> TranslationUnit {
    if entry.lines.len() > 1 && !is_dialogue_line(&entry.lines[0]) {
        TranslationUnit {
            texts: vec![entry.lines.join(SEPARATOR_RENDERING)],
            merged: true,
        }
    } else {
        TranslationUnit {
            texts: entry.lines.clone(),
            merged: false,
        }
    }
}

/// Split a translated merged string back into caption lines.
///
/// When the provider collapsed the separator the caption degrades to a
/// single line; lossy but safe.
pub fn split_translated(translated: &str) -> Vec<String> {
    let parts: Vec<String> = translated
        .split(SEPARATOR_RENDERING)
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        vec![translated.trim().to_string()]
    } else {
        parts
    }
}

/// Reassemble a caption's lines from the per-unit translation results
pub fn restore_caption(unit: &TranslationUnit, translated: Vec<String>) -> Vec<String> {
    if unit.merged {
        split_translated(translated.first().map(String::as_str).unwrap_or(""))
    } else {
        translated.into_iter().map(|t| t.trim().to_string()).collect()
    }
}

/// Replace any separator rendering still present in serialized text with
/// line breaks. Used by the codec as a last-chance restore.
pub fn restore_separators(text: &str) -> String {
    if !text.contains(LINE_SEPARATOR) {
        return text.to_string();
    }

    let restored = text.replace(SEPARATOR_RENDERING, "\n");
    if restored.contains(LINE_SEPARATOR) {
        restored
            .split(LINE_SEPARATOR)
            .map(|p| p.trim_matches(' '))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        restored
    }
}
