/*!
 * End-to-end tests for the translation pipeline
 *
 * These drive the orchestrator against scripted providers: resume planning,
 * retry exhaustion, checkpoint monotonicity, line merge/split behavior and
 * the candidate-selection policy, all observed through real files on disk.
 */

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use indicatif::MultiProgress;

use subtranslate::app_config::{Config, ParseErrorPolicy};
use subtranslate::app_controller::{Controller, ERROR_SENTINEL};
use subtranslate::errors::ProviderError;
use subtranslate::file_utils::FileManager;
use subtranslate::providers::mock::MockTranslator;
use subtranslate::providers::{TranslationProvider, TranslationRequest, TranslationResponse};
use subtranslate::subtitle_processor::SubtitleCollection;

use crate::common;

/// Test configuration: default pipeline with throttling disabled
fn test_config() -> Config {
    let mut config = Config::default();
    config.pipeline.throttle_pause_ms = 0;
    config
}

fn controller() -> Controller {
    Controller::with_config(test_config()).unwrap()
}

/// Checkpoint content matching the timing of `common::srt_with_captions`
fn checkpoint_with_captions(count: usize, text_prefix: &str) -> String {
    common::srt_with_captions(count, text_prefix)
}

#[tokio::test]
async fn test_endToEnd_withDialogueCaption_shouldPreserveStructure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "movie.srt",
        "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n2\n00:00:02,500 --> 00:00:03,500\n- Hi\n- Bye\n\n",
    )?;

    let provider = MockTranslator::identity()
        .with_custom_response(|req| format!("[{}] {}", req.target_language, req.text));

    let output = controller()
        .translate_file_with(&input, &provider, &MultiProgress::new(), false)
        .await?;

    assert_eq!(output, temp_dir.path().join("movie-pt.srt"));
    let written = std::fs::read_to_string(&output)?;

    // Renumbered captions, identical timecodes, dialogue lines kept separate
    assert_eq!(
        written,
        "1\n00:00:01,000 --> 00:00:02,000\n[pt] Hello\n\n\
         2\n00:00:02,500 --> 00:00:03,500\n[pt] - Hi\n[pt] - Bye\n\n"
    );

    // One call for the single line, one per dialogue line
    assert_eq!(provider.request_count(), 3);

    Ok(())
}

#[tokio::test]
async fn test_mergedCaption_withIdentityProvider_shouldRestoreLines() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "movie.srt",
        "1\n00:00:01,000 --> 00:00:02,000\nHello\nworld\n\n",
    )?;

    let provider = MockTranslator::identity();

    let output = controller()
        .translate_file_with(&input, &provider, &MultiProgress::new(), false)
        .await?;

    let written = std::fs::read_to_string(&output)?;
    assert!(written.contains("Hello\nworld"));
    assert!(!written.contains('¶'));

    // Both lines went to the provider as a single merged unit
    assert_eq!(provider.request_count(), 1);

    Ok(())
}

#[tokio::test]
async fn test_resume_withSevenOfTwentyDone_shouldTranslateOnlyTheRest() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "movie.srt",
        &common::srt_with_captions(20, "source line"),
    )?;

    // A prior run left the first 7 captions translated
    let checkpoint_path = temp_dir.path().join("movie-pt.srt");
    std::fs::write(&checkpoint_path, checkpoint_with_captions(7, "done line"))?;

    let provider = MockTranslator::identity();

    let output = controller()
        .translate_file_with(&input, &provider, &MultiProgress::new(), false)
        .await?;

    // Only captions 8..20 hit the provider
    assert_eq!(provider.request_count(), 13);

    let written = std::fs::read_to_string(&output)?;
    let entries = SubtitleCollection::parse_srt_string(&written)?;
    assert_eq!(entries.len(), 20);

    // The checkpointed prefix is carried over byte-identically
    let expected_prefix = checkpoint_with_captions(7, "done line");
    assert!(written.starts_with(&expected_prefix));
    assert_eq!(entries[7].lines, vec!["source line 8"]);
    assert_eq!(entries[19].lines, vec!["source line 20"]);

    Ok(())
}

#[tokio::test]
async fn test_retryExhaustion_shouldDegradeLineToSentinel() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "movie.srt",
        "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n",
    )?;

    let provider = MockTranslator::failing();

    let output = controller()
        .translate_file_with(&input, &provider, &MultiProgress::new(), false)
        .await?;

    // Exactly the retry budget, never fewer, never more
    assert_eq!(provider.request_count(), 5);

    // The file completes with the sentinel as the durable failure record
    let written = std::fs::read_to_string(&output)?;
    assert_eq!(
        written,
        format!("1\n00:00:01,000 --> 00:00:02,000\n{}\n\n", ERROR_SENTINEL)
    );

    Ok(())
}

/// Provider that snapshots the checkpoint file before each translation
#[derive(Debug)]
struct CheckpointProbe {
    output_path: PathBuf,
    observed_counts: Arc<Mutex<Vec<usize>>>,
}

#[async_trait]
impl TranslationProvider for CheckpointProbe {
    async fn translate(&self, request: TranslationRequest) -> Result<TranslationResponse, ProviderError> {
        // The checkpoint must be parseable at every step
        let count = match std::fs::read_to_string(&self.output_path) {
            Ok(content) => SubtitleCollection::parse_srt_string(&content)
                .expect("checkpoint file must always re-parse")
                .len(),
            Err(_) => 0,
        };
        self.observed_counts.lock().unwrap().push(count);

        Ok(TranslationResponse {
            candidates: vec![request.text],
            gender_variants: false,
        })
    }

    async fn close(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_checkpoint_afterEachCaption_shouldGrowMonotonically() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "movie.srt",
        &common::srt_with_captions(4, "line"),
    )?;

    let observed_counts = Arc::new(Mutex::new(Vec::new()));
    let provider = CheckpointProbe {
        output_path: temp_dir.path().join("movie-pt.srt"),
        observed_counts: Arc::clone(&observed_counts),
    };

    let output = controller()
        .translate_file_with(&input, &provider, &MultiProgress::new(), false)
        .await?;

    // Before caption i+1 is translated the file holds exactly i captions
    assert_eq!(*observed_counts.lock().unwrap(), vec![0, 1, 2, 3]);

    let written = std::fs::read_to_string(&output)?;
    assert_eq!(SubtitleCollection::parse_srt_string(&written)?.len(), 4);

    Ok(())
}

#[tokio::test]
async fn test_genderVariantPair_shouldPreferSecondCandidate() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "movie.srt",
        "1\n00:00:01,000 --> 00:00:02,000\nthey speak\n\n",
    )?;

    let provider = MockTranslator::gender_pair("ele fala", "ela fala");

    let output = controller()
        .translate_file_with(&input, &provider, &MultiProgress::new(), false)
        .await?;

    let written = std::fs::read_to_string(&output)?;
    assert!(written.contains("ela fala"));
    assert!(!written.contains("ele fala"));

    Ok(())
}

#[tokio::test]
async fn test_unflaggedCandidates_shouldBeConcatenated() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "movie.srt",
        "1\n00:00:01,000 --> 00:00:02,000\nhello\n\n",
    )?;

    let provider = MockTranslator::candidates(&["primeira", "segunda"]);

    let output = controller()
        .translate_file_with(&input, &provider, &MultiProgress::new(), false)
        .await?;

    let written = std::fs::read_to_string(&output)?;
    assert!(written.contains("primeira segunda"));

    Ok(())
}

#[tokio::test]
async fn test_completedOutput_shouldBeSkippedWithoutProviderCalls() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "movie.srt",
        &common::srt_with_captions(3, "line"),
    )?;
    let output_path = temp_dir.path().join("movie-pt.srt");
    let completed = checkpoint_with_captions(3, "done");
    std::fs::write(&output_path, &completed)?;

    let provider = MockTranslator::identity();

    controller()
        .translate_file_with(&input, &provider, &MultiProgress::new(), false)
        .await?;

    assert_eq!(provider.request_count(), 0);
    assert_eq!(std::fs::read_to_string(&output_path)?, completed);

    Ok(())
}

#[tokio::test]
async fn test_forceOverwrite_shouldRetranslateFromScratch() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "movie.srt",
        &common::srt_with_captions(5, "source line"),
    )?;
    std::fs::write(
        temp_dir.path().join("movie-pt.srt"),
        checkpoint_with_captions(2, "done line"),
    )?;

    let provider = MockTranslator::identity();

    let output = controller()
        .translate_file_with(&input, &provider, &MultiProgress::new(), true)
        .await?;

    // All five captions retranslated, the prior partial output discarded
    assert_eq!(provider.request_count(), 5);
    let written = std::fs::read_to_string(&output)?;
    assert!(!written.contains("done line"));

    Ok(())
}

#[tokio::test]
async fn test_staleCheckpoint_withForeignTimecodes_shouldStartFresh() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "movie.srt",
        &common::srt_with_captions(5, "source line"),
    )?;

    // Checkpoint from some other source: same count, different timecodes
    std::fs::write(
        temp_dir.path().join("movie-pt.srt"),
        "1\n00:10:00,000 --> 00:10:01,000\nforeign\n\n2\n00:10:02,000 --> 00:10:03,000\nforeign\n\n",
    )?;

    let provider = MockTranslator::identity();

    controller()
        .translate_file_with(&input, &provider, &MultiProgress::new(), false)
        .await?;

    // Timecode validation rejected the checkpoint; everything retranslated
    assert_eq!(provider.request_count(), 5);

    Ok(())
}

#[tokio::test]
async fn test_runFolder_withMalformedFileAndSkipPolicy_shouldContinue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "bad.srt", "this is not a subtitle file\n")?;

    let controller = Controller::with_config(test_config())?;
    let result = controller.run_folder(temp_dir.path().to_path_buf(), false).await;

    // Skip policy: the malformed file is reported but the batch finishes
    assert!(result.is_ok());
    assert!(!FileManager::file_exists(temp_dir.path().join("bad-pt.srt")));

    Ok(())
}

#[tokio::test]
async fn test_runFolder_withMalformedFileAndAbortPolicy_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "bad.srt", "this is not a subtitle file\n")?;

    let mut config = test_config();
    config.on_parse_error = ParseErrorPolicy::Abort;

    let controller = Controller::with_config(config)?;
    let result = controller.run_folder(temp_dir.path().to_path_buf(), false).await;

    assert!(result.is_err());

    Ok(())
}

#[tokio::test]
async fn test_runFolder_withEmptyDirectory_shouldError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let controller = Controller::with_config(test_config())?;
    let result = controller.run_folder(temp_dir.path().to_path_buf(), false).await;

    assert!(result.is_err());

    Ok(())
}
