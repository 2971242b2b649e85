//! Error types for the downloader.

use std::path::PathBuf;
use thiserror::Error;

/// Downloader-specific error types.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Network/HTTP error.
    #[error("network error: {message}")]
    Network {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status_code: Option<u16>,
    },

    /// Connection error.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Timeout error.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Resource not found.
    #[error("not found: {url}")]
    NotFound {
        /// URL that was not found.
        url: String,
    },

    /// Server returned an error status.
    #[error("server error {status}: {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Server answered with HTML where archive bytes were expected.
    #[error("server returned {content_type} instead of an archive")]
    UnexpectedContentType {
        /// Declared content type.
        content_type: String,
        /// Where the HTML body was saved.
        diagnostic: PathBuf,
    },

    /// Neither the direct-URL nor the payload pattern matched the page.
    #[error("no download link found on the page for Odoo {version}")]
    NoDownloadLink {
        /// Version whose page was scraped.
        version: String,
    },

    /// I/O error with path context.
    #[error("I/O error at {path}: {message}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Invalid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl DownloadError {
    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status_code: None,
        }
    }

    /// Create an I/O error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Convert from reqwest error.
    #[must_use]
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout(err.to_string());
        }
        if err.is_connect() {
            return Self::Connection(err.to_string());
        }
        if let Some(status) = err.status() {
            let code = status.as_u16();
            if code == 404 {
                return Self::NotFound {
                    url: err.url().map(|u| u.to_string()).unwrap_or_default(),
                };
            }
            return Self::Network {
                message: err.to_string(),
                status_code: Some(code),
            };
        }
        Self::network(err.to_string())
    }
}

/// Result type for download operations.
pub type Result<T> = std::result::Result<T, DownloadError>;

impl From<reqwest::Error> for DownloadError {
    fn from(err: reqwest::Error) -> Self {
        Self::from_reqwest(err)
    }
}

impl From<url::ParseError> for DownloadError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<DownloadError> for odsrc_core::Error {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::NoDownloadLink { version } => {
                odsrc_core::Error::resolution("neither a direct link nor a payload was present", version)
            }
            DownloadError::UnexpectedContentType {
                content_type,
                diagnostic,
            } => odsrc_core::Error::unexpected_content_type(content_type, diagnostic),
            DownloadError::Io { path, message } => {
                odsrc_core::Error::io(path, std::io::Error::other(message))
            }
            DownloadError::ServerError { status, message } => odsrc_core::Error::network(
                format!("server responded with status {status}: {message}"),
                None,
            ),
            DownloadError::NotFound { url } => {
                odsrc_core::Error::network("resource not found (status 404)", Some(url))
            }
            other => odsrc_core::Error::network(other.to_string(), None),
        }
    }
}
