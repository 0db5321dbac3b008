use std::sync::{Arc, Mutex};

use crate::core::state::{AppState, SelectTransition, ViewModel};
use crate::core::view::ViewOptions;
use crate::domain::model::SelectedFile;
use crate::domain::ports::{TabularParser, Uploader};
use crate::utils::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Cleared,
    Rejected,
    Loaded { rows: usize },
    /// A newer selection arrived while this file was being parsed.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Nothing stored, or the upload already finished.
    Skipped,
    Completed,
    Failed { reason: String },
    /// A newer selection or submit replaced this upload while it was in flight.
    Superseded,
}

/// Drives one viewer session: runs parses and uploads in the background and
/// feeds their completions back into the shared [`AppState`].
pub struct Session<P: TabularParser, U: Uploader> {
    state: Arc<Mutex<AppState>>,
    parser: Arc<P>,
    uploader: U,
}

impl<P: TabularParser, U: Uploader> Session<P, U> {
    pub fn new(parser: P, uploader: U, options: ViewOptions) -> Self {
        Self {
            state: Arc::new(Mutex::new(AppState::new(options))),
            parser: Arc::new(parser),
            uploader,
        }
    }

    /// Runs `f` against the state under the lock. Never held across an await.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state)
    }

    pub fn view(&self) -> ViewModel {
        self.with_state(|s| s.view())
    }

    pub fn search(&self, term: &str) {
        self.with_state(|s| s.search(term));
    }

    pub fn change_page(&self, page: usize) {
        self.with_state(|s| s.change_page(page));
    }

    pub fn next_page(&self) {
        self.with_state(|s| s.next_page());
    }

    pub fn previous_page(&self) {
        self.with_state(|s| s.previous_page());
    }

    /// File picker event. Parse failures are returned after being logged; the
    /// previously displayed dataset stays in place.
    pub async fn select(&self, file: Option<SelectedFile>) -> Result<SelectOutcome> {
        let (generation, file) = match self.with_state(|s| s.select_file(file)) {
            SelectTransition::Cleared => return Ok(SelectOutcome::Cleared),
            SelectTransition::Rejected => return Ok(SelectOutcome::Rejected),
            SelectTransition::Parse { generation, file } => (generation, file),
        };

        tracing::debug!("Parsing '{}' ({} bytes)", file.name, file.len());
        let parser = Arc::clone(&self.parser);
        let bytes = Arc::clone(&file.bytes);
        let parsed = tokio::task::spawn_blocking(move || parser.parse(&bytes, true))
            .await
            .map_err(|e| AppError::TaskError {
                message: e.to_string(),
            })?;

        let dataset = match parsed {
            Ok(dataset) => dataset,
            Err(e) => {
                tracing::error!("Failed to parse '{}': {}", file.name, e);
                return Err(e);
            }
        };

        let rows = dataset.len();
        if self.with_state(|s| s.parse_completed(generation, dataset)) {
            tracing::info!("Loaded {} rows from '{}'", rows, file.name);
            Ok(SelectOutcome::Loaded { rows })
        } else {
            Ok(SelectOutcome::Superseded)
        }
    }

    /// Submit. Upload failures are logged and reported in the outcome; they
    /// never surface as errors.
    pub async fn upload(&self) -> UploadOutcome {
        let Some((upload, file)) = self.with_state(|s| s.begin_upload()) else {
            tracing::debug!("Upload skipped: no stored file or already done");
            return UploadOutcome::Skipped;
        };

        tracing::info!("Uploading '{}' ({} bytes)", file.name, file.len());
        let state = Arc::clone(&self.state);
        let on_progress = move |sent: u64, total: u64| {
            let mut state = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if state.upload_progress(upload, sent, total) {
                tracing::trace!("Upload progress {}%", state.progress());
            }
        };

        let result = self.uploader.upload(&file, &on_progress).await;
        let applied = self.with_state(|s| s.upload_finished(upload, result.is_ok()));

        match result {
            _ if !applied => UploadOutcome::Superseded,
            Ok(()) => {
                tracing::info!("Upload of '{}' completed", file.name);
                UploadOutcome::Completed
            }
            Err(e) => {
                tracing::warn!("Upload of '{}' failed: {:?}", file.name, e);
                UploadOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::csv_parser::CsvParser;
    use crate::core::state::TableView;
    use crate::domain::model::UploadStatus;
    use crate::domain::ports::ProgressFn;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    const PEOPLE: &str = "id,name\n1,Alice\n2,Bob\n3,Carol\n4,Dan\n5,Eve\n6,Frank\n";

    struct MockUploader {
        fail: bool,
    }

    #[async_trait]
    impl Uploader for MockUploader {
        async fn upload(&self, file: &SelectedFile, on_progress: &ProgressFn<'_>) -> Result<()> {
            on_progress(1, 2);
            if self.fail {
                return Err(AppError::UploadStatusError { status: 503 });
            }
            on_progress(file.len() as u64, file.len() as u64);
            Ok(())
        }
    }

    /// Waits for `release` before finishing, so a test can act mid-upload.
    struct GatedUploader {
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl Uploader for GatedUploader {
        async fn upload(&self, file: &SelectedFile, on_progress: &ProgressFn<'_>) -> Result<()> {
            self.started.notify_one();
            self.release.notified().await;
            on_progress(file.len() as u64, file.len() as u64);
            Ok(())
        }
    }

    fn csv(name: &str, content: &str) -> SelectedFile {
        SelectedFile::new(name, "text/csv", content.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_select_upload_and_page() {
        let session = Session::new(
            CsvParser::default(),
            MockUploader { fail: false },
            ViewOptions::default(),
        );

        let outcome = session.select(Some(csv("people.csv", PEOPLE))).await.unwrap();
        assert_eq!(outcome, SelectOutcome::Loaded { rows: 6 });
        assert_eq!(session.view().table, TableView::NoRecords);

        assert_eq!(session.upload().await, UploadOutcome::Completed);
        let view = session.view();
        assert_eq!(view.status, UploadStatus::Done);
        assert_eq!(view.progress, 100);
        assert!(view.show_search);

        session.next_page();
        let TableView::Page { rows, page, .. } = session.view().table else {
            panic!("expected a table page");
        };
        assert_eq!(page, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some("Frank"));
    }

    #[tokio::test]
    async fn test_failed_upload_reverts_to_select() {
        let session = Session::new(
            CsvParser::default(),
            MockUploader { fail: true },
            ViewOptions::default(),
        );
        session.select(Some(csv("people.csv", PEOPLE))).await.unwrap();

        let outcome = session.upload().await;
        assert!(matches!(outcome, UploadOutcome::Failed { .. }));

        let view = session.view();
        assert_eq!(view.status, UploadStatus::Select);
        assert_eq!(view.progress, 50);
        assert_eq!(view.table, TableView::NoRecords);
    }

    #[tokio::test]
    async fn test_upload_without_file_is_skipped() {
        let session = Session::new(
            CsvParser::default(),
            MockUploader { fail: false },
            ViewOptions::default(),
        );
        assert_eq!(session.upload().await, UploadOutcome::Skipped);

        session
            .select(Some(SelectedFile::new("a.png", "image/png", vec![0x89])))
            .await
            .unwrap();
        assert_eq!(session.upload().await, UploadOutcome::Skipped);
        assert_eq!(session.view().file_error, Some(crate::core::state::FILE_TYPE_ERROR));
    }

    #[tokio::test]
    async fn test_parse_error_keeps_previous_dataset() {
        let session = Session::new(
            CsvParser::default(),
            MockUploader { fail: false },
            ViewOptions::default(),
        );
        session.select(Some(csv("people.csv", PEOPLE))).await.unwrap();

        let broken = SelectedFile::new("broken.csv", "text/csv", vec![0xff, 0xfe, b'\n', b'1']);
        assert!(session.select(Some(broken)).await.is_err());

        let rows = session.with_state(|s| s.dataset().map(|d| d.len()));
        assert_eq!(rows, Some(6));
    }

    #[tokio::test]
    async fn test_upload_superseded_by_new_selection() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let session = Arc::new(Session::new(
            CsvParser::default(),
            GatedUploader {
                started: started.clone(),
                release: release.clone(),
            },
            ViewOptions::default(),
        ));
        session.select(Some(csv("old.csv", PEOPLE))).await.unwrap();

        let uploading = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.upload().await })
        };
        started.notified().await;
        assert_eq!(session.view().status, UploadStatus::Uploading);

        session
            .select(Some(csv("new.csv", "id,name\n9,Zoe\n")))
            .await
            .unwrap();
        release.notify_one();

        assert_eq!(uploading.await.unwrap(), UploadOutcome::Superseded);
        let view = session.view();
        assert_eq!(view.status, UploadStatus::Select);
        assert_eq!(view.progress, 0);
        assert_eq!(session.with_state(|s| s.dataset().map(|d| d.len())), Some(1));
    }
}
