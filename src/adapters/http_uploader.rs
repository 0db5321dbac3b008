use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use tokio::sync::mpsc;

use crate::domain::model::SelectedFile;
use crate::domain::ports::{ProgressFn, Uploader};
use crate::utils::error::{AppError, Result};

pub const DEFAULT_UPLOAD_ENDPOINT: &str = "http://httpbin.org/post";
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;
pub const UPLOAD_FIELD: &str = "file";

/// Posts the selected file as a single multipart field and reports progress
/// as the request body is pulled chunk by chunk. The response body is ignored.
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: Client,
    endpoint: String,
    chunk_size: usize,
}

impl HttpUploader {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(&self, file: &SelectedFile, progress: mpsc::UnboundedSender<u64>) -> Result<Form> {
        let chunks: Vec<Bytes> = file
            .bytes
            .chunks(self.chunk_size)
            .map(Bytes::copy_from_slice)
            .collect();

        let mut sent = 0u64;
        let body = stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            // receiver gone means the request was dropped; nothing to report
            let _ = progress.send(sent);
            Ok::<_, std::io::Error>(chunk)
        }));

        let part = Part::stream_with_length(Body::wrap_stream(body), file.len() as u64)
            .file_name(file.name.clone())
            .mime_str(&file.media_type)?;

        Ok(Form::new().part(UPLOAD_FIELD, part))
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(&self, file: &SelectedFile, on_progress: &ProgressFn<'_>) -> Result<()> {
        let total = file.len() as u64;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let form = self.build_form(file, tx)?;

        tracing::debug!("POST {} ({} bytes, field '{}')", self.endpoint, total, UPLOAD_FIELD);
        let request = self.client.post(&self.endpoint).multipart(form).send();
        tokio::pin!(request);

        let response = loop {
            tokio::select! {
                biased;
                Some(sent) = rx.recv() => on_progress(sent, total),
                response = &mut request => break response,
            }
        };
        while let Ok(sent) = rx.try_recv() {
            on_progress(sent, total);
        }

        let response = response?;
        let status = response.status();
        tracing::debug!("Upload response status: {}", status);
        if !status.is_success() {
            return Err(AppError::UploadStatusError {
                status: status.as_u16(),
            });
        }

        if total == 0 {
            on_progress(0, 0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::sync::Mutex;

    fn people() -> SelectedFile {
        SelectedFile::new(
            "people.csv",
            "text/csv",
            b"id,name\n1,Alice\n2,Bob\n3,Carol\n".to_vec(),
        )
    }

    #[tokio::test]
    async fn test_upload_posts_multipart_file_field() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/post")
                .body_contains("name=\"file\"")
                .body_contains("filename=\"people.csv\"")
                .body_contains("3,Carol");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"files": {}}));
        });

        let uploader = HttpUploader::new(server.url("/post")).chunk_size(8);
        let seen = Mutex::new(Vec::new());
        let on_progress = |sent: u64, total: u64| seen.lock().unwrap().push((sent, total));

        uploader.upload(&people(), &on_progress).await.unwrap();

        api_mock.assert();
        let seen = seen.lock().unwrap().clone();
        let total = people().len() as u64;
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|&(_, t)| t == total));
        assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(seen.last().unwrap().0, total);
    }

    #[tokio::test]
    async fn test_upload_error_status_is_reported() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/post");
            then.status(500);
        });

        let uploader = HttpUploader::new(server.url("/post"));
        let result = uploader.upload(&people(), &|_, _| {}).await;

        api_mock.assert();
        assert!(matches!(
            result,
            Err(AppError::UploadStatusError { status: 500 })
        ));
    }

    #[tokio::test]
    async fn test_upload_connection_failure() {
        let uploader = HttpUploader::with_timeout("http://127.0.0.1:9/post", Duration::from_secs(2))
            .unwrap();
        let result = uploader.upload(&people(), &|_, _| {}).await;
        assert!(matches!(result, Err(AppError::HttpError(_))));
    }

    #[tokio::test]
    async fn test_empty_file_reports_completion() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/post");
            then.status(200);
        });

        let uploader = HttpUploader::new(server.url("/post"));
        let seen = Mutex::new(Vec::new());
        let on_progress = |sent: u64, total: u64| seen.lock().unwrap().push((sent, total));
        let empty = SelectedFile::new("empty.csv", "text/csv", Vec::new());

        uploader.upload(&empty, &on_progress).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![(0, 0)]);
    }
}
