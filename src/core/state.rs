//! Single state container for one viewer session.
//!
//! Every user or transport event maps to one method on [`AppState`]; each
//! method applies the whole transition at once, so derived values (filtered
//! rows, page count, current slice) are always computed from the fields they
//! depend on and never lag behind.

use serde::Serialize;
use std::sync::Arc;

use crate::core::intake::{check_file, Intake};
use crate::core::pagination::PaginationControl;
use crate::core::view::{self, ViewOptions};
use crate::domain::model::{Dataset, Generation, Row, SelectedFile, UploadStatus};

pub const FILE_TYPE_ERROR: &str = "Only CSV file is allowed.";

/// Identifies one submit: the selection it belongs to and which attempt it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadId {
    pub generation: Generation,
    pub attempt: u64,
}

/// What a file selection asks the caller to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectTransition {
    Cleared,
    Rejected,
    Parse {
        generation: Generation,
        file: SelectedFile,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableView {
    /// Nothing parsed yet, upload not finished, or an empty file.
    NoRecords,
    /// Rows exist but none match the current search term.
    NoMatches { term: String },
    Page {
        headers: Vec<String>,
        rows: Vec<Row>,
        page: usize,
        page_count: usize,
    },
}

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub file_error: Option<&'static str>,
    pub status: UploadStatus,
    pub progress: u8,
    pub show_search: bool,
    pub search_term: String,
    pub table: TableView,
    pub pagination: Option<PaginationControl>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    options: ViewOptions,
    generation: Generation,
    stored_file: Option<SelectedFile>,
    file_error: bool,
    dataset: Option<Arc<Dataset>>,
    search_term: String,
    filtered: Vec<usize>,
    page: usize,
    status: UploadStatus,
    progress: u8,
    upload_attempt: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ViewOptions::default())
    }
}

impl AppState {
    pub fn new(options: ViewOptions) -> Self {
        Self {
            options,
            generation: Generation::default(),
            stored_file: None,
            file_error: false,
            dataset: None,
            search_term: String::new(),
            filtered: Vec::new(),
            page: 0,
            status: UploadStatus::Select,
            progress: 0,
            upload_attempt: 0,
        }
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn stored_file(&self) -> Option<&SelectedFile> {
        self.stored_file.as_ref()
    }

    pub fn file_error(&self) -> bool {
        self.file_error
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_deref()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn page_count(&self) -> usize {
        view::page_count(
            self.filtered.len(),
            self.options.page_size,
            self.options.page_count_mode,
        )
    }

    /// Rows of the active page, in dataset order.
    pub fn current_rows(&self) -> Vec<&Row> {
        let Some(dataset) = self.dataset.as_deref() else {
            return Vec::new();
        };
        view::page_slice(&self.filtered, self.options.page_size, self.page)
            .iter()
            .filter_map(|&idx| dataset.rows().get(idx))
            .collect()
    }

    /// New picker event. Progress, upload status and the stored file are reset
    /// no matter what was picked; the parsed dataset stays until a new parse
    /// replaces it.
    pub fn select_file(&mut self, file: Option<SelectedFile>) -> SelectTransition {
        self.generation = self.generation.next();
        self.progress = 0;
        self.status = UploadStatus::Select;
        self.stored_file = None;

        match check_file(file) {
            Intake::Cleared => {
                self.file_error = false;
                SelectTransition::Cleared
            }
            Intake::Rejected { name, media_type } => {
                tracing::warn!("Rejected '{}': media type '{}' is not text/csv", name, media_type);
                self.file_error = true;
                SelectTransition::Rejected
            }
            Intake::Accepted(file) => {
                self.file_error = false;
                self.stored_file = Some(file.clone());
                SelectTransition::Parse {
                    generation: self.generation,
                    file,
                }
            }
        }
    }

    /// Installs a parsed dataset. Returns `false` when the parse belongs to a
    /// superseded selection and was dropped.
    pub fn parse_completed(&mut self, generation: Generation, dataset: Dataset) -> bool {
        if generation != self.generation {
            tracing::debug!(
                "Dropping parse result of generation {} (current {})",
                generation.0,
                self.generation.0
            );
            return false;
        }

        self.search_term.clear();
        self.filtered = (0..dataset.len()).collect();
        self.dataset = Some(Arc::new(dataset));
        self.page = 0;
        true
    }

    /// Filters the dataset by `term` and jumps back to the first page.
    /// Ignored until a dataset exists.
    pub fn search(&mut self, term: &str) {
        let Some(dataset) = self.dataset.as_deref() else {
            return;
        };

        self.filtered = view::filter_indices(dataset, term, &self.options.search_fields);
        self.search_term = term.to_string();
        self.page = 0;
        tracing::debug!("Search '{}' matched {} rows", term, self.filtered.len());
    }

    pub fn change_page(&mut self, page: usize) {
        self.page = page.min(view::last_page_index(
            self.filtered.len(),
            self.options.page_size,
        ));
    }

    pub fn next_page(&mut self) {
        self.change_page(self.page + 1);
    }

    pub fn previous_page(&mut self) {
        self.change_page(self.page.saturating_sub(1));
    }

    /// Submit. Returns the file to send, or `None` when there is nothing to
    /// upload or the upload already finished. A submit while uploading
    /// supersedes the attempt in flight.
    pub fn begin_upload(&mut self) -> Option<(UploadId, SelectedFile)> {
        if self.status == UploadStatus::Done {
            return None;
        }
        let file = self.stored_file.clone()?;

        self.upload_attempt += 1;
        self.status = UploadStatus::Uploading;
        self.page = 0;
        Some((self.current_upload(), file))
    }

    fn current_upload(&self) -> UploadId {
        UploadId {
            generation: self.generation,
            attempt: self.upload_attempt,
        }
    }

    pub fn upload_progress(&mut self, id: UploadId, sent: u64, total: u64) -> bool {
        if id != self.current_upload() || self.status != UploadStatus::Uploading {
            return false;
        }
        self.progress = self.progress.max(progress_percent(sent, total));
        true
    }

    /// Success moves to `Done`; failure goes back to `Select` and keeps the
    /// last progress value.
    pub fn upload_finished(&mut self, id: UploadId, succeeded: bool) -> bool {
        if id != self.current_upload() || self.status != UploadStatus::Uploading {
            tracing::debug!(
                "Dropping upload result of generation {} attempt {} (current {} attempt {})",
                id.generation.0,
                id.attempt,
                self.generation.0,
                self.upload_attempt
            );
            return false;
        }

        self.status = if succeeded {
            UploadStatus::Done
        } else {
            UploadStatus::Select
        };
        true
    }

    pub fn view(&self) -> ViewModel {
        let done = self.status == UploadStatus::Done;
        let has_rows = self.dataset.as_ref().is_some_and(|d| !d.is_empty());
        let rows: Vec<Row> = self.current_rows().into_iter().cloned().collect();

        let (table, pagination) = match self.dataset.as_deref() {
            Some(dataset) if done && !rows.is_empty() => {
                let page_count = self.page_count();
                (
                    TableView::Page {
                        headers: dataset.schema().columns().to_vec(),
                        rows,
                        page: self.page,
                        page_count,
                    },
                    Some(PaginationControl::new(page_count, self.page)),
                )
            }
            _ if done && has_rows && !self.search_term.is_empty() => (
                TableView::NoMatches {
                    term: self.search_term.clone(),
                },
                None,
            ),
            _ => (TableView::NoRecords, None),
        };

        ViewModel {
            file_error: self.file_error.then_some(FILE_TYPE_ERROR),
            status: self.status,
            progress: self.progress,
            show_search: done && has_rows,
            search_term: self.search_term.clone(),
            table,
            pagination,
        }
    }
}

/// `round(sent * 100 / total)`, capped at 100. An empty body counts as done.
pub fn progress_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (sent as f64 * 100.0 / total as f64).round();
    percent.clamp(0.0, 100.0) as u8
}
