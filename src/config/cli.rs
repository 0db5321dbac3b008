use crate::core::{FileSource, SelectedFile};
use crate::utils::error::Result;
use std::path::Path;

/// Reads picked files from local disk. The declared media type comes from the
/// file extension unless a fixed one is configured.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSource {
    base_path: Option<String>,
    media_type_override: Option<String>,
}

impl LocalFileSource {
    pub fn new(base_path: Option<String>) -> Self {
        Self {
            base_path,
            media_type_override: None,
        }
    }

    pub fn with_media_type(mut self, media_type: Option<String>) -> Self {
        self.media_type_override = media_type;
        self
    }
}

/// `text/csv` for `.csv`, `application/octet-stream` when unknown.
pub fn guess_media_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

impl FileSource for LocalFileSource {
    async fn open(&self, path: &str) -> Result<SelectedFile> {
        let full_path = match &self.base_path {
            Some(base) => Path::new(base).join(path),
            None => Path::new(path).to_path_buf(),
        };

        let bytes = tokio::fs::read(&full_path).await?;
        let media_type = self
            .media_type_override
            .clone()
            .unwrap_or_else(|| guess_media_type(&full_path));
        let name = full_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());

        tracing::debug!("Opened '{}' as {} ({} bytes)", name, media_type, bytes.len());
        Ok(SelectedFile::new(name, media_type, bytes))
    }
}
