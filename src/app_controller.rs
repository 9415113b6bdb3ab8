use anyhow::{Result, Context, anyhow};
use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use indicatif::{ProgressBar, ProgressStyle, MultiProgress};

use crate::app_config::{Config, ParseErrorPolicy};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::line_transform;
use crate::progress_estimator::ProgressEstimator;
use crate::providers::{TranslationProvider, TranslationRequest};
use crate::providers::webdriver::WebDriverTranslator;
use crate::resume_planner;
use crate::subtitle_processor::SubtitleCollection;

// @module: Translation orchestrator

/// Literal recorded for a line whose translation could not be obtained
/// after exhausting the retry budget.
pub const ERROR_SENTINEL: &str = "ERROR";

/// Typed outcome of the per-line retry loop
#[derive(Debug, PartialEq, Eq)]
enum LineOutcome {
    /// The provider returned a usable translation
    Translated(String),
    /// Every attempt failed; the line degrades to the sentinel
    Exhausted,
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Translate a single subtitle file, opening and closing one browser
    /// session around it.
    pub async fn run(&self, input_file: PathBuf, force_overwrite: bool) -> Result<()> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(&input_file, &multi_progress, force_overwrite)
            .await
            .map(|_| ())
    }

    /// Run the workflow in folder mode, translating every subtitle file in
    /// the directory independently. The resume cursor resets per file.
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        // Find subtitle files, leaving out our own translated outputs
        let subtitle_files: Vec<PathBuf> = FileManager::find_files(&input_dir, "srt")?
            .into_iter()
            .filter(|p| !FileManager::is_translated_output(p, &self.config.target_language))
            .collect();

        if subtitle_files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();

        // Progress bar for folder processing
        let folder_pb = multi_progress.add(ProgressBar::new(subtitle_files.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        let mut success_count = 0;
        let mut error_count = 0;

        for subtitle_file in subtitle_files.iter() {
            let file_name = subtitle_file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            folder_pb.set_message(format!("Processing: {}", file_name));

            match self.run_with_progress(subtitle_file, &multi_progress, force_overwrite).await {
                Ok(_) => {
                    success_count += 1;
                },
                Err(e) => {
                    error_count += 1;

                    let is_parse_error = matches!(e.downcast_ref::<AppError>(), Some(AppError::Parse(_)));
                    if is_parse_error && self.config.on_parse_error == ParseErrorPolicy::Abort {
                        folder_pb.finish_and_clear();
                        return Err(e.context(format!("Aborting batch on malformed file {}", file_name)));
                    }

                    error!("Error processing file {}: {}", file_name, e);
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        let duration = start_time.elapsed();
        info!(
            "Folder processing completed: {} translated, {} errors - Duration: {}",
            success_count, error_count, Self::format_duration(duration)
        );

        Ok(())
    }

    /// Open a provider session, translate one file, and release the session
    /// on every exit path. The source is parsed first so a malformed file
    /// never costs a browser session.
    async fn run_with_progress(&self, input_file: &Path, multi_progress: &MultiProgress, force_overwrite: bool) -> Result<PathBuf> {
        let source = self.load_source(input_file)?;

        let provider = WebDriverTranslator::connect(&self.config.provider)
            .await
            .context("Failed to open the browser translation session")?;

        let result = self
            .translate_source(source, &provider, multi_progress, force_overwrite)
            .await;

        if let Err(e) = provider.close().await {
            warn!("Failed to close the browser session: {}", e);
        }

        result
    }

    /// Load and parse one source subtitle file
    fn load_source(&self, input_file: &Path) -> Result<SubtitleCollection> {
        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let content = FileManager::read_to_string(input_file)?;
        let entries = SubtitleCollection::parse_srt_string(&content)
            .map_err(|e| anyhow::Error::new(AppError::Parse(format!("{}: {}", input_file.display(), e))))?;

        Ok(SubtitleCollection {
            source_file: input_file.to_path_buf(),
            entries,
            language: self.config.source_language.clone(),
        })
    }

    /// Translate one file with an injected provider session.
    pub async fn translate_file_with(
        &self,
        input_file: &Path,
        provider: &dyn TranslationProvider,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<PathBuf> {
        let source = self.load_source(input_file)?;
        self.translate_source(source, provider, multi_progress, force_overwrite).await
    }

    /// Translate a loaded source document.
    ///
    /// Plans resumption against any prior partial output, then walks the
    /// captions in document order: merge lines, translate each unit with
    /// the bounded retry budget, split back, and atomically rewrite the
    /// output file after every caption. At most one caption's work is lost
    /// on interruption.
    async fn translate_source(
        &self,
        source: SubtitleCollection,
        provider: &dyn TranslationProvider,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<PathBuf> {
        let start_time = Instant::now();
        let input_file = source.source_file.clone();

        let output_path = FileManager::translated_output_path(&input_file, &self.config.target_language);

        // Load any prior partial output as the checkpoint
        let checkpoint = if force_overwrite {
            if FileManager::file_exists(&output_path) {
                info!("Ignoring existing partial output (force overwrite)");
            }
            None
        } else {
            self.load_checkpoint(&output_path)
        };

        let plan = resume_planner::plan(&source, checkpoint.as_ref(), self.config.resume.validate_timecodes);
        let mut working = plan.working;
        let cursor = plan.cursor;
        let total = working.entries.len();

        if cursor >= total {
            info!("Skipping file, translation already complete: {}", output_path.display());
            return Ok(output_path);
        }

        let file_name = input_file.file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        info!(
            "Translating {} captions ({} -> {}): {}",
            total - cursor,
            language_utils::get_language_name(&self.config.source_language)
                .unwrap_or_else(|_| self.config.source_language.clone()),
            language_utils::get_language_name(&self.config.target_language)
                .unwrap_or_else(|_| self.config.target_language.clone()),
            file_name
        );

        // Progress bar for caption translation
        let progress_bar = multi_progress.add(ProgressBar::new(total as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} captions ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_position(cursor as u64);
        progress_bar.set_message("Please wait...");

        let mut estimator = ProgressEstimator::new();
        let mut last_mark = Instant::now();

        for i in cursor..total {
            // Derive this caption's translation unit; the entry itself is
            // only replaced once all its lines came back
            let unit = line_transform::plan_caption(&working.entries[i]);

            let mut translated_texts = Vec::with_capacity(unit.texts.len());
            for text in &unit.texts {
                let outcome = self.translate_line(provider, text).await;
                translated_texts.push(match outcome {
                    LineOutcome::Translated(translated) => translated,
                    LineOutcome::Exhausted => {
                        warn!("Caption {}: line degraded to \"{}\" after {} failed attempts",
                            i + 1, ERROR_SENTINEL, self.config.pipeline.max_attempts);
                        ERROR_SENTINEL.to_string()
                    }
                });
            }

            working.entries[i].lines = line_transform::restore_caption(&unit, translated_texts);

            // Checkpoint: atomically rewrite the translated prefix
            let rendered = SubtitleCollection::render_entries(&working.entries[..=i]);
            FileManager::write_atomic(&output_path, &rendered)
                .with_context(|| format!("Failed to write checkpoint file: {}", output_path.display()))?;

            estimator.record(last_mark.elapsed());
            last_mark = Instant::now();

            let remaining = total - (i + 1);
            let estimate = estimator.estimate(remaining);
            progress_bar.set_position((i + 1) as u64);
            progress_bar.set_message(estimate.to_string());
            debug!("Translated caption {}/{}. Estimated time to complete: {}", i + 1, total, estimate);

            // Unconditional throttle, counted from the resume cursor
            let completed_since_resume = i - cursor + 1;
            if remaining > 0 && completed_since_resume % self.config.pipeline.throttle_every == 0 {
                debug!("Throttling for {} ms", self.config.pipeline.throttle_pause_ms);
                tokio::time::sleep(Duration::from_millis(self.config.pipeline.throttle_pause_ms)).await;
            }
        }

        progress_bar.finish_and_clear();

        info!(
            "Success: {} ({} captions in {})",
            output_path.display(),
            total,
            Self::format_duration(start_time.elapsed())
        );

        Ok(output_path)
    }

    /// Parse a prior partial output, if one exists. An unreadable or
    /// unparseable checkpoint is discarded; its content would be
    /// overwritten anyway once translation restarts.
    fn load_checkpoint(&self, output_path: &Path) -> Option<SubtitleCollection> {
        if !FileManager::file_exists(output_path) {
            return None;
        }

        let content = match FileManager::read_to_string(output_path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Ignoring unreadable checkpoint {}: {}", output_path.display(), e);
                return None;
            }
        };

        match SubtitleCollection::parse_srt_string(&content) {
            Ok(entries) => Some(SubtitleCollection {
                source_file: output_path.to_path_buf(),
                entries,
                language: self.config.target_language.clone(),
            }),
            Err(e) => {
                warn!("Ignoring unparseable checkpoint {}: {}", output_path.display(), e);
                None
            }
        }
    }

    /// Translate one line with a bounded retry budget.
    ///
    /// Every provider failure counts as one attempt; after the budget is
    /// spent the line resolves to `Exhausted` and processing continues;
    /// a failed line never aborts the file.
    async fn translate_line(&self, provider: &dyn TranslationProvider, text: &str) -> LineOutcome {
        let max_attempts = self.config.pipeline.max_attempts;

        for attempt in 1..=max_attempts {
            let request = TranslationRequest::new(
                text,
                &self.config.source_language,
                &self.config.target_language,
            );

            match provider.translate(request).await {
                Ok(response) => return LineOutcome::Translated(response.canonical_text()),
                Err(e) => {
                    warn!("Translation attempt {}/{} failed: {}", attempt, max_attempts, e);
                }
            }
        }

        LineOutcome::Exhausted
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
