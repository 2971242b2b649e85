//! Streaming archive download.

use crate::client::HttpClient;
use crate::error::{DownloadError, Result};
use futures_util::StreamExt;
use odsrc_core::{NullObserver, ProgressEvent, ProgressObserver};
use reqwest::header::CONTENT_TYPE;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use url::Url;

/// File name of the diagnostic saved when the server answers with HTML.
pub const ERROR_RESPONSE_FILE: &str = "error_response.html";

/// Streams a resolved archive URL to a local file.
#[derive(Clone)]
pub struct ArchiveFetcher {
    client: HttpClient,
    observer: Arc<dyn ProgressObserver>,
}

impl std::fmt::Debug for ArchiveFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveFetcher")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl ArchiveFetcher {
    /// Create a fetcher that reports no progress.
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self::with_observer(client, Arc::new(NullObserver))
    }

    /// Create a fetcher reporting byte progress to `observer`.
    #[must_use]
    pub fn with_observer(client: HttpClient, observer: Arc<dyn ProgressObserver>) -> Self {
        Self { client, observer }
    }

    /// Download `url` to `dest_file`.
    ///
    /// The response's declared content type is inspected before any archive
    /// byte is written: an HTML answer is the service's own error/login page,
    /// so its body is saved to [`ERROR_RESPONSE_FILE`] under
    /// `diagnostics_dir` and the fetch fails with
    /// [`DownloadError::UnexpectedContentType`]. `dest_file` is untouched in
    /// that case.
    ///
    /// The body is streamed in bounded chunks; archives run to hundreds of
    /// megabytes and are never buffered whole.
    ///
    /// # Errors
    /// Returns a typed error on transport failure, bad status, or unexpected
    /// content type. No retry is attempted here.
    pub async fn fetch(
        &self,
        url: &Url,
        dest_file: &Path,
        diagnostics_dir: &Path,
    ) -> Result<FetchedArchive> {
        debug!(url = %url, dest = %dest_file.display(), "download starting");

        let response = self.client.get(url).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if content_type.contains("text/html") {
            return Err(self
                .save_html_diagnostic(response, content_type, diagnostics_dir)
                .await);
        }

        let total_bytes = response.content_length();
        self.observer
            .on_event(&ProgressEvent::DownloadStarted { total_bytes });

        let mut file = tokio::fs::File::create(dest_file)
            .await
            .map_err(|e| DownloadError::io(dest_file, e))?;

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(DownloadError::from_reqwest)?;
            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::io(dest_file, e))?;
            downloaded += chunk.len() as u64;
            self.observer
                .on_event(&ProgressEvent::DownloadProgress { bytes: downloaded });
        }

        file.flush()
            .await
            .map_err(|e| DownloadError::io(dest_file, e))?;
        drop(file);

        self.observer
            .on_event(&ProgressEvent::DownloadFinished { bytes: downloaded });
        debug!(bytes = downloaded, "download complete");

        Ok(FetchedArchive {
            path: dest_file.to_path_buf(),
            bytes: downloaded,
        })
    }

    /// Persist an HTML answer for inspection and build the typed error.
    async fn save_html_diagnostic(
        &self,
        response: reqwest::Response,
        content_type: String,
        diagnostics_dir: &Path,
    ) -> DownloadError {
        warn!(content_type = %content_type, "server answered with HTML instead of an archive");

        let diagnostic = diagnostics_dir.join(ERROR_RESPONSE_FILE);
        let body = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return DownloadError::from_reqwest(e),
        };
        if let Err(e) = std::fs::create_dir_all(diagnostics_dir) {
            return DownloadError::io(diagnostics_dir, e);
        }
        if let Err(e) = std::fs::write(&diagnostic, &body) {
            return DownloadError::io(&diagnostic, e);
        }

        DownloadError::UnexpectedContentType {
            content_type,
            diagnostic,
        }
    }
}

/// Result of a completed archive download.
#[derive(Debug, Clone)]
pub struct FetchedArchive {
    /// Path the archive was written to.
    pub path: PathBuf,
    /// Size in bytes.
    pub bytes: u64,
}
