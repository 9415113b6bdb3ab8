use std::fmt;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};
use regex::Regex;
use once_cell::sync::Lazy;
use log::warn;

use crate::file_utils::FileManager;
use crate::line_transform;

// @module: Subtitle model and SRT codec

// @const: SRT timestamp regex, tolerates '.' as millisecond separator on input
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2}):(\d{2})[,.](\d{3}) --> (\d{2}):(\d{2}):(\d{2})[,.](\d{3})").unwrap()
});

// @const: Closing tags the translation round-trip tends to split ("</ i>")
static SPLIT_CLOSING_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<\s*/\s*([ibu])\s*>").unwrap()
});

// @struct: Single subtitle caption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number as parsed; canonical numbering is assigned when serializing
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Caption text lines, in display order
    pub lines: Vec<String>,
}

impl SubtitleEntry {
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, lines: Vec<String>) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            lines,
        }
    }

    // @creates: Validated subtitle entry
    // @validates: Time range and non-empty text
    pub fn new_validated(seq_num: usize, start_time_ms: u64, end_time_ms: u64, lines: Vec<String>) -> Result<Self> {
        if end_time_ms < start_time_ms {
            return Err(anyhow!(
                "Invalid time range: end time {} < start time {}",
                end_time_ms, start_time_ms
            ));
        }

        let trimmed: Vec<String> = lines
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if trimmed.is_empty() {
            return Err(anyhow!("Empty subtitle text for entry {}", seq_num));
        }

        Ok(SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            lines: trimmed,
        })
    }

    /// Parse an SRT timestamp in HH:MM:SS,mmm form to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let parts: Vec<&str> = timestamp.split(&[':', ',', '.'][..]).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse()?;
        let minutes: u64 = parts[1].parse()?;
        let seconds: u64 = parts[2].parse()?;
        let millis: u64 = parts[3].parse()?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.lines.join("\n"))?;
        writeln!(f)
    }
}

/// Ordered collection of subtitle entries; document order is display order
/// and translation order.
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,

    /// Language tag of the entries
    pub language: String,
}

impl SubtitleCollection {
    /// Create a new empty subtitle collection
    pub fn new(source_file: PathBuf, language: String) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
            language,
        }
    }

    /// Load and parse an SRT file
    pub fn load<P: AsRef<Path>>(path: P, language: &str) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)?;
        let entries = Self::parse_srt_string(&content)?;

        Ok(SubtitleCollection {
            source_file: path.to_path_buf(),
            entries,
            language: language.to_string(),
        })
    }

    /// Parse SRT format string into subtitle entries.
    ///
    /// The parser is tolerant: numeric index lines are recorded but never
    /// trusted (a caption's position in the document is authoritative), and
    /// malformed blocks are skipped with a warning. Entries are kept in
    /// document order.
    pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleEntry>> {
        let mut entries: Vec<SubtitleEntry> = Vec::new();

        let mut current_seq_num: Option<usize> = None;
        let mut current_start_time_ms: Option<u64> = None;
        let mut current_end_time_ms: Option<u64> = None;
        let mut current_lines: Vec<String> = Vec::new();
        let mut line_count = 0;

        let finalize = |seq: Option<usize>, start: Option<u64>, end: Option<u64>, lines: &mut Vec<String>, entries: &mut Vec<SubtitleEntry>| {
            if let (Some(start_ms), Some(end_ms)) = (start, end) {
                let seq_num = seq.unwrap_or(entries.len() + 1);
                if lines.is_empty() {
                    warn!("Skipping empty subtitle entry {}", seq_num);
                } else {
                    match SubtitleEntry::new_validated(seq_num, start_ms, end_ms, std::mem::take(lines)) {
                        Ok(entry) => entries.push(entry),
                        Err(e) => warn!("Skipping invalid subtitle entry {}: {}", seq_num, e),
                    }
                }
            }
            lines.clear();
        };

        for line in content.lines() {
            line_count += 1;
            let trimmed = line.trim();

            // Blank line terminates the current block
            if trimmed.is_empty() {
                finalize(current_seq_num, current_start_time_ms, current_end_time_ms, &mut current_lines, &mut entries);
                current_seq_num = None;
                current_start_time_ms = None;
                current_end_time_ms = None;
                continue;
            }

            if current_start_time_ms.is_none() {
                // Index line (optional, not trusted)
                if current_seq_num.is_none() && current_lines.is_empty() {
                    if let Ok(num) = trimmed.parse::<usize>() {
                        current_seq_num = Some(num);
                        continue;
                    }
                }

                // Timecode line
                if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                    match (Self::parse_timestamp_to_ms(&caps, 1), Self::parse_timestamp_to_ms(&caps, 5)) {
                        (Ok(start_ms), Ok(end_ms)) => {
                            current_start_time_ms = Some(start_ms);
                            current_end_time_ms = Some(end_ms);
                        },
                        _ => warn!("Invalid timestamp format at line {}: {}", line_count, trimmed),
                    }
                    continue;
                }

                warn!("Unexpected text at line {} before timecode line: {}", line_count, trimmed);
            } else {
                current_lines.push(trimmed.to_string());
            }
        }

        // Finalize the last block if the file does not end with a blank line
        finalize(current_seq_num, current_start_time_ms, current_end_time_ms, &mut current_lines, &mut entries);

        if entries.is_empty() {
            return Err(anyhow!("No valid subtitle entries were found in the SRT content"));
        }

        Ok(entries)
    }

    /// Render entries to SRT text, renumbering 1..N regardless of input numbering.
    ///
    /// Each text line goes through the repair pass: any merge separator the
    /// split step left behind becomes a line break again, and closing tags the
    /// translation round-trip pulled apart are rejoined.
    pub fn render_entries(entries: &[SubtitleEntry]) -> String {
        let mut out = String::new();
        for (idx, entry) in entries.iter().enumerate() {
            out.push_str(&format!(
                "{}\n{} --> {}\n{}\n\n",
                idx + 1,
                entry.format_start_time(),
                entry.format_end_time(),
                Self::repair_text(&entry.lines.join("\n")),
            ));
        }
        out
    }

    /// Serialize the whole collection to SRT text
    pub fn to_srt_string(&self) -> String {
        Self::render_entries(&self.entries)
    }

    /// Write the collection to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        FileManager::write_atomic(path, &self.to_srt_string())
    }

    /// Repair known markup artifacts of the translation round-trip
    fn repair_text(text: &str) -> String {
        // Leftover merge separators become line breaks
        let restored = line_transform::restore_separators(text);
        // "</ i>" and friends rejoined to their tag
        SPLIT_CLOSING_TAG.replace_all(&restored, "</$1>").into_owned()
    }

    /// Parse timestamp capture groups to milliseconds
    fn parse_timestamp_to_ms(caps: &regex::Captures, start_idx: usize) -> Result<u64> {
        let hours: u64 = caps.get(start_idx)
            .map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let minutes: u64 = caps.get(start_idx + 1)
            .map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let seconds: u64 = caps.get(start_idx + 2)
            .map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let millis: u64 = caps.get(start_idx + 3)
            .map_or(0, |m| m.as_str().parse().unwrap_or(0));

        Ok((hours * 3600 + minutes * 60 + seconds) * 1000 + millis)
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Language: {}", self.language)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
