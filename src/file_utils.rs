use anyhow::{Result, Context};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use tempfile::NamedTempFile;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @generates: Output path for a translated subtitle
    // @params: input file, target language code
    // The base name is suffixed with "-{target}" and the original extension kept.
    pub fn translated_output_path<P: AsRef<Path>>(input_file: P, target_language: &str) -> PathBuf {
        let input_file = input_file.as_ref();

        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();
        let extension = input_file
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "srt".to_string());

        let output_filename = format!("{}-{}.{}", stem, target_language, extension);

        match input_file.parent() {
            Some(parent) => parent.join(output_filename),
            None => PathBuf::from(output_filename),
        }
    }

    // @checks: Whether a file already is a translated output for the target language
    pub fn is_translated_output<P: AsRef<Path>>(path: P, target_language: &str) -> bool {
        path.as_ref()
            .file_stem()
            .map(|stem| stem.to_string_lossy().ends_with(&format!("-{}", target_language)))
            .unwrap_or(false)
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        // Deterministic processing order
        result.sort();

        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Atomically replace the content of a file.
    ///
    /// The content is written to a temporary file in the same directory and
    /// renamed over the target, so an interrupted write can never leave a
    /// half-written file behind.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));

        if !dir.exists() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }

        let mut temp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in: {}", dir.display()))?;
        temp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write temporary file for: {}", path.display()))?;
        temp.persist(path)
            .with_context(|| format!("Failed to replace file: {}", path.display()))?;

        Ok(())
    }
}
