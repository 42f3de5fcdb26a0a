/*!
 * Book session: the translation state machine for one archive.
 *
 * This module handles:
 * - Unpacking a book and building its unit queue
 * - Draining the queue through a translator, one unit at a time
 * - Pausing at unit boundaries and resuming
 * - Writing results back, patching metadata and repacking on completion
 */

use log::{debug, error, info, warn};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::watch;
use uuid::Uuid;

use crate::epub::metadata::{self, MetadataField};
use crate::epub::{locate_package_document, read_field, repack, unpack};
use crate::errors::{MetadataError, SessionError, WorkspaceError};
use crate::file_utils::FileManager;
use crate::language_utils::minimal_tag;
use crate::markup::{escape_text, extract, replace_spans};
use crate::translation::{PairStatus, Translator};

use super::models::{
    DocumentPlan, ProgressSnapshot, ProgressStats, ResultMap, SessionControl, SessionSettings, SessionState,
    TextUnit, Workspace,
};

/// Translation session for a single book
pub struct BookSession {
    id: Uuid,
    settings: SessionSettings,
    state: SessionState,
    workspace: Option<Workspace>,
    package_document: Option<PathBuf>,
    has_title_unit: bool,
    queue: VecDeque<TextUnit>,
    results: ResultMap,
    plans: Vec<DocumentPlan>,
    stats: ProgressStats,
    last_result: Option<String>,
    control: SessionControl,
    progress: watch::Sender<ProgressSnapshot>,
}

impl BookSession {
    /// Create an idle session
    pub fn new(settings: SessionSettings) -> Self {
        let (progress, _) = watch::channel(ProgressSnapshot::default());
        Self {
            id: Uuid::new_v4(),
            settings,
            state: SessionState::Idle,
            workspace: None,
            package_document: None,
            has_title_unit: false,
            queue: VecDeque::new(),
            results: ResultMap::new(),
            plans: Vec::new(),
            stats: ProgressStats::default(),
            last_result: None,
            control: SessionControl::new(),
            progress,
        }
    }

    /// Use `control` as the stop switch, typically a child of an
    /// application-wide one
    pub fn with_control(mut self, control: SessionControl) -> Self {
        self.control = control;
        self
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Handle for requesting a stop from another task
    pub fn control(&self) -> SessionControl {
        self.control.clone()
    }

    /// Receive a snapshot after every state change and every translated unit
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.progress.subscribe()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            state: self.state.clone(),
            completed: self.stats.completed,
            total: self.stats.total,
            eta: self.stats.eta(),
            current_source: self.queue.front().map(|unit| unit.source_text.clone()),
            last_result: self.last_result.clone(),
        }
    }

    pub fn stats(&self) -> &ProgressStats {
        &self.stats
    }

    pub fn results(&self) -> &ResultMap {
        &self.results
    }

    /// Units still waiting, head first
    pub fn pending_units(&self) -> impl Iterator<Item = &TextUnit> {
        self.queue.iter()
    }

    pub fn document_plans(&self) -> &[DocumentPlan] {
        &self.plans
    }

    pub fn has_title_unit(&self) -> bool {
        self.has_title_unit
    }

    pub fn workspace_path(&self) -> Option<&Path> {
        self.workspace.as_ref().map(Workspace::path)
    }

    pub fn package_document(&self) -> Option<&Path> {
        self.package_document.as_deref()
    }

    fn publish(&self) {
        self.progress.send_replace(self.snapshot());
    }

    fn set_state(&mut self, state: SessionState) {
        debug!("Session {} {} -> {}", short_id(&self.id), self.state.name(), state.name());
        self.state = state;
        self.publish();
    }

    fn fail(&mut self, message: String) -> SessionError {
        error!("Session {} failed: {}", short_id(&self.id), message);
        self.set_state(SessionState::Failed(message.clone()));
        SessionError::Fatal(message)
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    // =========================================================================
    // Preparation
    // =========================================================================

    /// Unpack `archive` and queue every text unit it contains.
    ///
    /// Resets any previous run of this session. Ends in `Ready`, or in `Failed`
    /// when the archive cannot be unpacked.
    pub fn prepare(&mut self, archive: &Path) -> Result<(), SessionError> {
        if self.state == SessionState::Translating {
            return Err(self.invalid("prepare"));
        }

        self.reset();
        self.set_state(SessionState::Preparing);
        info!("Preparing {:?} (session {})", archive, short_id(&self.id));

        let workspace = match Workspace::create(self.settings.workspace_root.as_deref(), &self.id) {
            Ok(workspace) => workspace,
            Err(e) => return Err(self.fail(e.to_string())),
        };

        if let Err(e) = unpack(archive, workspace.path()) {
            self.fail(e.to_string());
            return Err(SessionError::Archive(e));
        }

        let root = workspace.path().to_path_buf();
        self.workspace = Some(workspace);

        self.queue_title(&root);

        let documents = match FileManager::find_markup_files(&root) {
            Ok(documents) => documents,
            Err(e) => return Err(self.fail(format!("Cannot list content documents: {:#}", e))),
        };
        for path in documents {
            self.queue_document(path);
        }

        self.stats = ProgressStats::new(self.queue.len());
        info!(
            "Queued {} units from {} documents{}",
            self.stats.total,
            self.plans.len(),
            if self.has_title_unit { " plus title" } else { "" }
        );

        self.set_state(SessionState::Ready);
        Ok(())
    }

    fn reset(&mut self) {
        self.id = Uuid::new_v4();
        self.workspace = None;
        self.package_document = None;
        self.has_title_unit = false;
        self.queue.clear();
        self.results.clear();
        self.plans.clear();
        self.stats = ProgressStats::default();
        self.last_result = None;
        self.control.clear();
    }

    fn queue_title(&mut self, root: &Path) {
        let Some(package) = locate_package_document(root) else {
            warn!("{}", MetadataError::NotFound(root.to_path_buf()));
            return;
        };

        match fs::read_to_string(&package) {
            Ok(content) => {
                if let Some(title) = read_field(&content, MetadataField::Title).filter(|t| !t.is_empty()) {
                    debug!("Title unit: {}", title);
                    self.queue.push_back(TextUnit::title(title));
                    self.has_title_unit = true;
                }
            }
            Err(e) => warn!("Cannot read package document {:?}: {}", package, e),
        }

        self.package_document = Some(package);
    }

    fn queue_document(&mut self, path: PathBuf) {
        let content = match read_document(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping document: {}", e);
                return;
            }
        };

        let spans = extract(&content, &self.settings.extract);
        if spans.is_empty() {
            return;
        }

        let first_index = self.queue.len();
        for span in &spans {
            self.queue.push_back(TextUnit {
                index: self.queue.len(),
                source_file: Some(path.clone()),
                span: span.range.clone(),
                source_text: span.text.clone(),
                batch_size: span.members,
            });
        }

        self.plans.push(DocumentPlan {
            path,
            first_index,
            unit_count: spans.len(),
        });
    }

    // =========================================================================
    // Translation
    // =========================================================================

    /// Begin translating, gated on the language pair being supported
    pub fn start(&mut self, status: PairStatus) -> Result<(), SessionError> {
        if self.state != SessionState::Ready {
            return Err(self.invalid("start"));
        }

        if !status.is_supported() {
            warn!(
                "Language pair {} -> {} reported as {:?}",
                self.settings.source_language, self.settings.target_language, status
            );
            return Err(SessionError::LanguagePairUnavailable {
                source_language: self.settings.source_language.clone(),
                target_language: self.settings.target_language.clone(),
            });
        }

        self.control.clear();
        self.set_state(SessionState::Translating);
        Ok(())
    }

    /// Continue a paused session
    pub fn resume(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Paused {
            return Err(self.invalid("resume"));
        }

        self.control.clear();
        self.set_state(SessionState::Translating);
        Ok(())
    }

    /// Translate queued units until the queue is empty or a stop is requested.
    ///
    /// Returns the resulting state: `Paused`, or `Completed` once the output
    /// archive has been written.
    pub async fn run(&mut self, translator: &dyn Translator) -> Result<SessionState, SessionError> {
        if self.state != SessionState::Translating {
            return Err(self.invalid("run"));
        }

        loop {
            if self.control.is_stop_requested() {
                info!("Pausing after {}/{} units", self.stats.completed, self.stats.total);
                self.set_state(SessionState::Paused);
                return Ok(self.state.clone());
            }

            let Some(unit) = self.queue.pop_front() else {
                break;
            };

            let translated = if unit.source_text.is_empty() {
                self.stats.record_skipped();
                String::new()
            } else {
                let started = Instant::now();
                let translated = self.translate_unit(translator, &unit).await;
                let elapsed = started.elapsed();

                debug!("Unit {} done in {:?}", unit.index, elapsed);
                self.stats.record(elapsed);
                translated
            };

            self.results.insert(unit.index, translated.clone());
            self.last_result = Some(translated);
            self.publish();
        }

        if self.stats.completed != self.stats.total {
            return Err(self.fail(format!(
                "Queue drained with {} of {} units translated",
                self.stats.completed, self.stats.total
            )));
        }

        self.finish()
    }

    async fn translate_unit(&self, translator: &dyn Translator, unit: &TextUnit) -> String {
        match translator
            .translate(
                &unit.source_text,
                &self.settings.source_language,
                &self.settings.target_language,
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Unit {} kept in source language: {}", unit.index, e);
                unit.source_text.clone()
            }
        }
    }

    // =========================================================================
    // Completion
    // =========================================================================

    fn finish(&mut self) -> Result<SessionState, SessionError> {
        let Some(root) = self.workspace_path().map(Path::to_path_buf) else {
            return Err(self.fail("Workspace is gone".to_string()));
        };
        if !root.is_dir() {
            return Err(self.fail(format!("Workspace {:?} no longer exists", root)));
        }

        self.reinject();

        if let Err(e) = self.patch_metadata() {
            return Err(self.fail(format!("Cannot update book metadata: {}", e)));
        }

        let output = self.settings.output_path.clone();
        match repack(&root, &output) {
            Ok(entries) => info!("Wrote {:?} ({} entries)", output, entries),
            Err(e) => return Err(self.fail(e.to_string())),
        }

        self.set_state(SessionState::Completed { output });
        Ok(self.state.clone())
    }

    /// Write every document's results back in place. Per-document failures are
    /// logged and leave that document untouched.
    fn reinject(&self) {
        for plan in &self.plans {
            if let Err(e) = self.reinject_document(plan) {
                warn!("Document left untranslated: {}", e);
            }
        }
    }

    fn reinject_document(&self, plan: &DocumentPlan) -> Result<(), WorkspaceError> {
        let content = read_document(&plan.path)?;
        let spans = extract(&content, &self.settings.extract);

        if spans.len() != plan.unit_count {
            return Err(WorkspaceError::UnitCountMismatch {
                path: plan.path.clone(),
                expected: plan.unit_count,
                found: spans.len(),
            });
        }

        let substitutions = spans
            .into_iter()
            .enumerate()
            .filter(|(_, span)| !span.text.is_empty())
            .filter_map(|(offset, span)| {
                self.results
                    .get(&(plan.first_index + offset))
                    .map(|text| (span.range, escape_text(text).into_owned()))
            })
            .collect();

        let rebuilt = replace_spans(&content, substitutions);
        fs::write(&plan.path, rebuilt).map_err(|source| WorkspaceError::Io {
            path: plan.path.clone(),
            source,
        })
    }

    fn patch_metadata(&self) -> Result<(), WorkspaceError> {
        if !self.has_title_unit {
            return Ok(());
        }
        let (Some(package), Some(title)) = (&self.package_document, self.results.get(&0)) else {
            return Ok(());
        };

        metadata::write_field_to_file(package, MetadataField::Title, &escape_text(title))?;

        let language = minimal_tag(&self.settings.target_language)
            .unwrap_or_else(|_| self.settings.target_language.clone());
        metadata::write_field_to_file(package, MetadataField::Language, &language)
    }
}

/// Read a content document as UTF-8 text
fn read_document(path: &Path) -> Result<String, WorkspaceError> {
    let bytes = fs::read(path).map_err(|source| WorkspaceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| WorkspaceError::NotUtf8(path.to_path_buf()))
}

fn short_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}
