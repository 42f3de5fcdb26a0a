use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::markup::ExtractOptions;
use crate::session::{BookSession, ProgressSnapshot, SessionControl, SessionSettings, SessionState};
use crate::translation::{LanguagePairAvailability, PairStatus, TranslationService, Translator};

// @module: Application controller for book translation

/// Extension of the books handled in folder mode
const BOOK_EXTENSION: &str = "epub";

/// Which text the progress bar shows next to the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewMode {
    #[default]
    Off,
    /// Text of the unit about to be translated
    Source,
    /// Most recent translation
    Target,
}

/// What happened to one book
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookOutcome {
    Translated(PathBuf),
    /// A translation already exists and overwriting was not requested
    Skipped,
    /// Stopped before completion; nothing was written
    Interrupted { completed: usize, total: usize },
}

impl BookOutcome {
    /// Written archive, if any
    pub fn output(&self) -> Option<&Path> {
        match self {
            Self::Translated(path) => Some(path),
            _ => None,
        }
    }
}

/// Counters for a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
    /// The run stopped early on an interrupt; remaining books were not started
    pub interrupted: bool,
}

/// Main application controller for book translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Progress bar preview text
    preview: PreviewMode,
    // @field: Stop switch for the whole run, parent of every session's control
    interrupt: SessionControl,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            preview: PreviewMode::Off,
            interrupt: SessionControl::new(),
        })
    }

    pub fn with_preview(mut self, preview: PreviewMode) -> Self {
        self.preview = preview;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stop switch for the current run. A stop lets the book in progress
    /// pause at its next unit boundary and no further books are started.
    /// It stays set until cleared.
    pub fn interrupt_handle(&self) -> SessionControl {
        self.interrupt.clone()
    }

    /// Expected output path for a book
    pub fn output_path_for(&self, input_file: &Path, output_dir: &Path) -> PathBuf {
        FileManager::generate_output_path(input_file, output_dir, &self.config.target_language, BOOK_EXTENSION)
    }

    /// Session settings derived from the configuration
    pub fn session_settings(&self, output_path: PathBuf) -> SessionSettings {
        let book = &self.config.book;
        let batch_size = book.batch_paragraphs.then_some(book.batch_size);

        SessionSettings::new(
            self.config.source_language.clone(),
            self.config.target_language.clone(),
            output_path,
        )
        .with_extract_options(ExtractOptions::new(book.paragraph_tags.clone(), batch_size))
        .with_workspace_root(book.workspace_root.clone())
    }

    /// Translate one book into `output_dir` with the configured provider
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        let multi_progress = MultiProgress::new();
        let service = TranslationService::new(self.config.translation.clone())
            .context("Failed to create translation service")?;

        info!(
            "epubtr: {} - {}",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model()
        );

        let interrupt = Self::stop_on_ctrl_c(self.interrupt.clone());
        let outcome = self
            .run_with_progress(&input_file, &output_dir, force_overwrite, &service, &service, &multi_progress)
            .await;
        interrupt.abort();

        match outcome? {
            BookOutcome::Interrupted { completed, total } => Err(anyhow!(
                "Translation interrupted after {}/{} units, nothing written",
                completed,
                total
            )),
            BookOutcome::Translated(_) | BookOutcome::Skipped => Ok(()),
        }
    }

    /// Translate one book using the given backend
    pub async fn translate_book(
        &self,
        input_file: &Path,
        output_dir: &Path,
        force_overwrite: bool,
        translator: &dyn Translator,
        availability: &dyn LanguagePairAvailability,
    ) -> Result<BookOutcome> {
        let multi_progress = MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden());
        self.run_with_progress(input_file, output_dir, force_overwrite, translator, availability, &multi_progress)
            .await
    }

    async fn run_with_progress(
        &self,
        input_file: &Path,
        output_dir: &Path,
        force_overwrite: bool,
        translator: &dyn Translator,
        availability: &dyn LanguagePairAvailability,
        multi_progress: &MultiProgress,
    ) -> Result<BookOutcome> {
        let start_time = Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        FileManager::ensure_dir(output_dir)?;

        let output_path = self.output_path_for(input_file, output_dir);
        if output_path == input_file {
            return Err(anyhow!("Output would overwrite the input book: {:?}", output_path));
        }
        if output_path.exists() && !force_overwrite {
            warn!("Skipping {:?}, translation already exists (use -f to force overwrite)", input_file);
            return Ok(BookOutcome::Skipped);
        }

        let mut session = BookSession::new(self.session_settings(output_path)).with_control(self.interrupt.child());
        session
            .prepare(input_file)
            .with_context(|| format!("Failed to open book {:?}", input_file))?;

        let status = if self.config.book.check_language_pair {
            availability
                .status(&self.config.source_language, &self.config.target_language)
                .await
        } else {
            info!("Language pair check skipped");
            PairStatus::Supported
        };
        session.start(status)?;

        let progress_bar = multi_progress.add(ProgressBar::new(session.stats().total as u64));
        progress_bar.set_style(Self::progress_style("units"));

        let watcher = Self::watch_progress(session.subscribe(), progress_bar.clone(), self.preview);

        let outcome = session.run(translator).await;

        watcher.abort();
        progress_bar.finish_and_clear();

        match outcome? {
            SessionState::Completed { output } => {
                info!(
                    "Success: {} ({} units in {})",
                    output.display(),
                    session.stats().total,
                    Self::format_duration(start_time.elapsed())
                );
                Ok(BookOutcome::Translated(output))
            }
            SessionState::Paused => {
                let stats = session.stats();
                warn!(
                    "Translation of {:?} interrupted after {}/{} units, nothing written",
                    input_file, stats.completed, stats.total
                );
                Ok(BookOutcome::Interrupted {
                    completed: stats.completed,
                    total: stats.total,
                })
            }
            other => Err(anyhow!("Session ended in unexpected state: {}", other.name())),
        }
    }

    fn progress_style(unit: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
                unit
            ))
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    /// Mirror session snapshots onto a progress bar until aborted
    fn watch_progress(
        mut receiver: watch::Receiver<ProgressSnapshot>,
        progress_bar: ProgressBar,
        preview: PreviewMode,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while receiver.changed().await.is_ok() {
                let snapshot = receiver.borrow_and_update().clone();
                progress_bar.set_length(snapshot.total as u64);
                progress_bar.set_position(snapshot.completed as u64);
                progress_bar.set_message(Self::progress_message(&snapshot, preview));
            }
        })
    }

    /// Bar message: ETA plus the preview text, on one line
    pub fn progress_message(snapshot: &ProgressSnapshot, preview: PreviewMode) -> String {
        let text = match preview {
            PreviewMode::Off => None,
            PreviewMode::Source => snapshot.current_source.as_deref(),
            PreviewMode::Target => snapshot.last_result.as_deref(),
        };

        let mut message = snapshot.eta.as_ref().map(|eta| format!("ETA {}", eta)).unwrap_or_default();
        if let Some(text) = text {
            let line: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
            let preview: String = line.chars().take(60).collect();
            if !message.is_empty() {
                message.push_str(" | ");
            }
            message.push_str(&preview);
            if line.chars().count() > 60 {
                message.push('…');
            }
        }
        message
    }

    fn stop_on_ctrl_c(control: SessionControl) -> JoinHandle<()> {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping after the current unit");
                control.request_stop();
            }
        })
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

    /// Books under `input_dir`, excluding translations produced for the current target
    pub fn find_books(&self, input_dir: &Path) -> Result<Vec<PathBuf>> {
        let suffix = format!(".{}", self.config.target_language);
        let books = FileManager::find_files(input_dir, BOOK_EXTENSION)?
            .into_iter()
            .filter(|path| {
                path.file_stem()
                    .map(|stem| !stem.to_string_lossy().ends_with(&suffix))
                    .unwrap_or(true)
            })
            .collect();
        Ok(books)
    }

    /// Run the workflow in folder mode, translating every book in a directory.
    /// Books that already have a translation are skipped.
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        let service = TranslationService::new(self.config.translation.clone())
            .context("Failed to create translation service")?;
        let multi_progress = MultiProgress::new();

        let interrupt = Self::stop_on_ctrl_c(self.interrupt.clone());
        let summary = self
            .folder_with_progress(&input_dir, force_overwrite, &service, &service, &multi_progress)
            .await;
        interrupt.abort();

        let summary = summary?;
        if summary.interrupted {
            return Err(anyhow!(
                "Folder processing interrupted after {} translated books",
                summary.translated
            ));
        }
        Ok(())
    }

    /// Translate every book in `input_dir` using the given backend
    pub async fn translate_folder(
        &self,
        input_dir: &Path,
        force_overwrite: bool,
        translator: &dyn Translator,
        availability: &dyn LanguagePairAvailability,
    ) -> Result<FolderSummary> {
        let multi_progress = MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden());
        self.folder_with_progress(input_dir, force_overwrite, translator, availability, &multi_progress)
            .await
    }

    async fn folder_with_progress(
        &self,
        input_dir: &Path,
        force_overwrite: bool,
        translator: &dyn Translator,
        availability: &dyn LanguagePairAvailability,
        multi_progress: &MultiProgress,
    ) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let books = self.find_books(input_dir)?;
        if books.is_empty() {
            return Err(anyhow!("No .{} files found in directory: {:?}", BOOK_EXTENSION, input_dir));
        }

        let folder_pb = multi_progress.add(ProgressBar::new(books.len() as u64));
        folder_pb.set_style(Self::progress_style("books"));
        folder_pb.set_message("Processing books");

        let mut summary = FolderSummary::default();

        for book in &books {
            if self.interrupt.is_stop_requested() {
                summary.interrupted = true;
                break;
            }

            let file_name = book
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let output_dir = book.parent().unwrap_or(input_dir);

            match self
                .run_with_progress(book, output_dir, force_overwrite, translator, availability, multi_progress)
                .await
            {
                Ok(BookOutcome::Translated(_)) => summary.translated += 1,
                Ok(BookOutcome::Skipped) => summary.skipped += 1,
                Ok(BookOutcome::Interrupted { .. }) => {
                    summary.interrupted = true;
                    break;
                }
                Err(e) => {
                    error!("Error processing book {}: {:#}", file_name, e);
                    summary.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        if summary.interrupted {
            folder_pb.abandon_with_message("Folder processing interrupted");
        } else {
            folder_pb.finish_with_message("Folder processing complete");
        }

        info!(
            "Folder processing finished in {}: {} translated, {} skipped, {} errors{}",
            Self::format_duration(start_time.elapsed()),
            summary.translated,
            summary.skipped,
            summary.failed,
            if summary.interrupted { ", stopped early" } else { "" }
        );

        Ok(summary)
    }
}
