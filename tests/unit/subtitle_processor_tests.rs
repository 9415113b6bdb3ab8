/*!
 * Tests for the subtitle model and SRT codec
 */

use std::fmt::Write;
use anyhow::Result;
use subtranslate::subtitle_processor::{SubtitleEntry, SubtitleCollection};
use crate::common;

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let ms = SubtitleEntry::parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5025678);

    let formatted = SubtitleEntry::format_timestamp(ms);
    assert_eq!(formatted, ts);
}

#[test]
fn test_timestamp_parsing_withDotSeparator_shouldParse() {
    let ms = SubtitleEntry::parse_timestamp("00:00:01.500").unwrap();
    assert_eq!(ms, 1500);
}

#[test]
fn test_timestamp_parsing_withInvalidComponents_shouldFail() {
    assert!(SubtitleEntry::parse_timestamp("00:61:00,000").is_err());
    assert!(SubtitleEntry::parse_timestamp("garbage").is_err());
}

/// Test subtitle entry display formatting
#[test]
fn test_subtitle_entry_display_withValidEntry_shouldFormatCorrectly() {
    let entry = SubtitleEntry::new(1, 5000, 10000, vec!["Test subtitle".to_string()]);
    let mut output = String::new();
    write!(output, "{}", entry).unwrap();

    assert!(output.contains("1"));
    assert!(output.contains("00:00:05,000"));
    assert!(output.contains("00:00:10,000"));
    assert!(output.contains("Test subtitle"));
}

#[test]
fn test_new_validated_withEqualTimes_shouldAccept() {
    // start == end is a degenerate but legal caption
    let entry = SubtitleEntry::new_validated(1, 5000, 5000, vec!["x".to_string()]);
    assert!(entry.is_ok());
}

#[test]
fn test_new_validated_withEndBeforeStart_shouldReject() {
    let entry = SubtitleEntry::new_validated(1, 5000, 4000, vec!["x".to_string()]);
    assert!(entry.is_err());
}

/// Test parsing a well-formed multi-entry document
#[test]
fn test_parse_srt_string_withWellFormedContent_shouldParseAllEntries() -> Result<()> {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n2\n00:00:02,500 --> 00:00:03,500\n- Hi\n- Bye\n\n";
    let entries = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].lines, vec!["Hello"]);
    assert_eq!(entries[0].start_time_ms, 1000);
    assert_eq!(entries[0].end_time_ms, 2000);
    assert_eq!(entries[1].lines, vec!["- Hi", "- Bye"]);

    Ok(())
}

#[test]
fn test_parse_srt_string_withCrlfLineEndings_shouldParse() -> Result<()> {
    let content = "1\r\n00:00:01,000 --> 00:00:02,000\r\nHello\r\nworld\r\n\r\n";
    let entries = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].lines, vec!["Hello", "world"]);

    Ok(())
}

/// The numeric index is recorded but never trusted
#[test]
fn test_parse_srt_string_withBogusIndices_shouldKeepDocumentOrder() -> Result<()> {
    let content = "7\n00:00:05,000 --> 00:00:06,000\nFirst in the file\n\n3\n00:00:01,000 --> 00:00:02,000\nSecond in the file\n\n";
    let entries = SubtitleCollection::parse_srt_string(content)?;

    // Document order wins, even though timestamps and indices disagree
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].lines, vec!["First in the file"]);
    assert_eq!(entries[1].lines, vec!["Second in the file"]);

    Ok(())
}

#[test]
fn test_parse_srt_string_withMissingIndexLine_shouldStillParse() -> Result<()> {
    let content = "00:00:01,000 --> 00:00:02,000\nNo index above me\n\n";
    let entries = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].lines, vec!["No index above me"]);

    Ok(())
}

#[test]
fn test_parse_srt_string_withInvalidEntry_shouldSkipIt() -> Result<()> {
    // Second block has end < start and is dropped with a warning
    let content = "1\n00:00:01,000 --> 00:00:02,000\nGood\n\n2\n00:00:05,000 --> 00:00:04,000\nBad\n\n3\n00:00:06,000 --> 00:00:07,000\nAlso good\n\n";
    let entries = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].lines, vec!["Good"]);
    assert_eq!(entries[1].lines, vec!["Also good"]);

    Ok(())
}

#[test]
fn test_parse_srt_string_withNoEntries_shouldError() {
    assert!(SubtitleCollection::parse_srt_string("").is_err());
    assert!(SubtitleCollection::parse_srt_string("just some text\n").is_err());
}

/// Serialization renumbers 1..N regardless of input numbering
#[test]
fn test_render_entries_shouldRenumberSequentially() -> Result<()> {
    let content = "12\n00:00:01,000 --> 00:00:02,000\nOne\n\n99\n00:00:03,000 --> 00:00:04,000\nTwo\n\n";
    let entries = SubtitleCollection::parse_srt_string(content)?;
    let rendered = SubtitleCollection::render_entries(&entries);

    assert!(rendered.starts_with("1\n00:00:01,000 --> 00:00:02,000\nOne\n\n"));
    assert!(rendered.contains("\n2\n00:00:03,000 --> 00:00:04,000\nTwo\n\n"));

    Ok(())
}

/// Round-trip: serialize(parse(serialize(d))) == serialize(d)
#[test]
fn test_round_trip_shouldBeStableModuloRenumbering() -> Result<()> {
    let content = "5\n00:00:01,000 --> 00:00:02,000\nHello\nworld\n\n9\n00:01:02,500 --> 00:01:03,750\n- Hi.\n- Bye.\n\n";
    let entries = SubtitleCollection::parse_srt_string(content)?;
    let first = SubtitleCollection::render_entries(&entries);

    let reparsed = SubtitleCollection::parse_srt_string(&first)?;
    let second = SubtitleCollection::render_entries(&reparsed);

    assert_eq!(first, second);

    Ok(())
}

/// The serializer repairs markup the translation round-trip broke
#[test]
fn test_render_entries_withSplitClosingTag_shouldRepairMarkup() {
    let entry = SubtitleEntry::new(1, 0, 1000, vec!["<i>Olá</ i>".to_string()]);
    let rendered = SubtitleCollection::render_entries(&[entry]);

    assert!(rendered.contains("<i>Olá</i>"));
    assert!(!rendered.contains("</ i>"));
}

#[test]
fn test_render_entries_withLeftoverSeparator_shouldRestoreLineBreaks() {
    let entry = SubtitleEntry::new(1, 0, 1000, vec!["primeira ¶ segunda".to_string()]);
    let rendered = SubtitleCollection::render_entries(&[entry]);

    assert!(rendered.contains("primeira\nsegunda"));
    assert!(!rendered.contains('¶'));
}

/// Test loading a subtitle file from disk
#[test]
fn test_load_withSampleFile_shouldParseEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file_path = common::create_test_subtitle(temp_dir.path(), "sample.srt")?;

    let collection = SubtitleCollection::load(&file_path, "en")?;

    assert_eq!(collection.entries.len(), 3);
    assert_eq!(collection.language, "en");
    assert_eq!(collection.source_file, file_path);

    Ok(())
}
