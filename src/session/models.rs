/*!
 * Session data types: text units, state, progress accounting and the
 * workspace a session unpacks its book into.
 */

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

use crate::errors::WorkspaceError;
use crate::markup::ExtractOptions;

/// Translated text per unit index
pub type ResultMap = BTreeMap<usize, String>;

/// One piece of text queued for translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    /// Position in the queue, contiguous from 0
    pub index: usize,
    /// Content document the text came from; `None` for the title
    pub source_file: Option<PathBuf>,
    /// Byte range of the element in the unmodified document
    pub span: Range<usize>,
    pub source_text: String,
    /// Paragraphs merged into this unit (1 unless batched)
    pub batch_size: usize,
}

impl TextUnit {
    /// Unit holding the book title
    pub fn title(text: String) -> Self {
        Self {
            index: 0,
            source_file: None,
            span: 0..0,
            source_text: text,
            batch_size: 1,
        }
    }

    pub fn is_metadata(&self) -> bool {
        self.source_file.is_none()
    }
}

/// Lifecycle of a book session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Preparing,
    Ready,
    Translating,
    Paused,
    /// Finished and written to the output archive
    Completed { output: PathBuf },
    Failed(String),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Translating => "translating",
            Self::Paused => "paused",
            Self::Completed { .. } => "completed",
            Self::Failed(_) => "failed",
        }
    }
}

/// Unit counters and the running mean of per-unit translation time
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressStats {
    pub total: usize,
    pub completed: usize,
    /// Mean duration of the units that went through the translator
    pub running_average_secs: f64,
    /// Units folded into the mean
    pub timed: usize,
}

impl ProgressStats {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Count one more unit, folding its duration into the mean
    pub fn record(&mut self, elapsed: Duration) {
        let n = self.timed as f64;
        self.running_average_secs = (self.running_average_secs * n + elapsed.as_secs_f64()) / (n + 1.0);
        self.timed += 1;
        self.completed += 1;
    }

    /// Count a unit that never reached the translator; the mean is unchanged
    pub fn record_skipped(&mut self) {
        self.completed += 1;
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }

    pub fn eta(&self) -> Option<String> {
        format_eta(self.completed, self.total, self.running_average_secs)
    }
}

/// Human-readable time left, `"{m}m {s}s"` or `"{s}s"`.
///
/// Returns `None` when the estimate is not finite or not positive.
pub fn format_eta(completed: usize, total: usize, average_secs: f64) -> Option<String> {
    let remaining = total.saturating_sub(completed) as f64;
    let seconds_left = remaining * average_secs.max(0.0);
    if !seconds_left.is_finite() || seconds_left <= 0.0 {
        return None;
    }

    let whole = seconds_left as u64;
    let minutes = whole / 60;
    let seconds = whole % 60;

    if minutes > 0 {
        Some(format!("{}m {}s", minutes, seconds))
    } else {
        Some(format!("{}s", seconds))
    }
}

/// Point-in-time view of a session, published after every state change and unit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressSnapshot {
    pub state: SessionState,
    pub completed: usize,
    pub total: usize,
    pub eta: Option<String>,
    /// Text of the next unit to translate
    pub current_source: Option<String>,
    /// Most recently stored result
    pub last_result: Option<String>,
}

/// Cloneable stop switch shared between a session and its observers.
///
/// A control made with [`SessionControl::child`] also reports a stop once its
/// parent has one. Clearing the child leaves the parent set.
#[derive(Debug, Clone, Default)]
pub struct SessionControl {
    stop: Arc<AtomicBool>,
    parent: Option<Arc<AtomicBool>>,
}

impl SessionControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
            parent: Some(Arc::clone(&self.stop)),
        }
    }

    /// Ask the running session to pause at the next unit boundary
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst) || self.parent.as_ref().is_some_and(|parent| parent.load(Ordering::SeqCst))
    }

    pub fn clear(&self) {
        self.stop.store(false, Ordering::SeqCst);
    }
}

/// Units recorded for one content document during preparation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPlan {
    pub path: PathBuf,
    pub first_index: usize,
    pub unit_count: usize,
}

/// Everything a session needs to know besides the book itself
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub source_language: String,
    pub target_language: String,
    pub extract: ExtractOptions,
    /// Where the rewritten archive is written on completion
    pub output_path: PathBuf,
    /// Parent of the workspace directory; system temp dir when `None`
    pub workspace_root: Option<PathBuf>,
}

impl SessionSettings {
    pub fn new(
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_language: source_language.into(),
            target_language: target_language.into(),
            extract: ExtractOptions::default(),
            output_path: output_path.into(),
            workspace_root: None,
        }
    }

    pub fn with_extract_options(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }

    pub fn with_workspace_root(mut self, root: Option<PathBuf>) -> Self {
        self.workspace_root = root;
        self
    }
}

/// Directory holding an unpacked book, removed when dropped
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Allocate a fresh workspace directory for `session_id`
    pub fn create(root: Option<&Path>, session_id: &Uuid) -> Result<Self, WorkspaceError> {
        let prefix = format!("epubtr-{}-", session_id);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root).map_err(|source| WorkspaceError::Io {
                    path: root.to_path_buf(),
                    source,
                })?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .map_err(|source| WorkspaceError::Io {
            path: root.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir),
            source,
        })?;

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
