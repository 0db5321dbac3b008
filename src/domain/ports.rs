use crate::domain::model::{Dataset, SelectedFile};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where selected files come from (local disk for the CLI, memory in tests).
pub trait FileSource: Send + Sync {
    fn open(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<SelectedFile>> + Send;
}

/// Turns raw CSV bytes into a [`Dataset`]. Runs on a blocking thread.
pub trait TabularParser: Send + Sync + 'static {
    fn parse(&self, bytes: &[u8], has_headers: bool) -> Result<Dataset>;
}

/// Called with `(bytes_sent, total_bytes)` each time the transport pulls a chunk.
pub type ProgressFn<'a> = dyn Fn(u64, u64) + Send + Sync + 'a;

#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file: &SelectedFile, on_progress: &ProgressFn<'_>) -> Result<()>;
}

#[async_trait]
impl<U: Uploader + ?Sized> Uploader for Box<U> {
    async fn upload(&self, file: &SelectedFile, on_progress: &ProgressFn<'_>) -> Result<()> {
        (**self).upload(file, on_progress).await
    }
}
