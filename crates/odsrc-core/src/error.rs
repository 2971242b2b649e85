//! Error types for odsrc operations.
//!
//! Each error has:
//! - A unique error code (e.g. E0101) for easy reference and searching
//! - A clear error message explaining what went wrong
//! - Suggestions for how to fix the issue

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for odsrc errors.
///
/// These codes make it easy to search for solutions and reference specific
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Resolution errors (E01xx)
    /// No download link found in the remote page
    E0101,

    // Network errors (E02xx)
    /// Network request failed
    E0201,
    /// Server returned HTML instead of an archive
    E0202,
    /// Server returned an error status
    E0203,

    // Archive errors (E03xx)
    /// Archive corrupted (gzip/tar parse failure)
    E0301,
    /// Archive extraction failed
    E0302,

    // IO errors (E04xx)
    /// File not found
    E0401,
    /// Permission denied
    E0402,
    /// Other filesystem failure
    E0403,

    // Cache errors (E05xx)
    /// Cache corrupted
    E0501,
    /// Cache directory not writable
    E0502,

    // Configuration errors (E06xx)
    /// Missing or invalid configuration
    E0601,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0301 => "E0301",
            Self::E0302 => "E0302",
            Self::E0401 => "E0401",
            Self::E0402 => "E0402",
            Self::E0403 => "E0403",
            Self::E0501 => "E0501",
            Self::E0502 => "E0502",
            Self::E0601 => "E0601",
        }
    }

    /// Get a brief title for this error code.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::E0101 => "Download link not found",
            Self::E0201 => "Network error",
            Self::E0202 => "Unexpected content type",
            Self::E0203 => "Server error",
            Self::E0301 => "Archive corrupted",
            Self::E0302 => "Extraction failed",
            Self::E0401 => "File not found",
            Self::E0402 => "Permission denied",
            Self::E0403 => "Filesystem error",
            Self::E0501 => "Cache corrupted",
            Self::E0502 => "Cache not writable",
            Self::E0601 => "Invalid configuration",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for odsrc.
#[derive(Error, Debug)]
pub enum Error {
    /// Neither URL pattern matched the download page.
    #[error("[{code}] no download link found: {message}")]
    Resolution {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// Error message.
        message: String,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// Network error.
    #[error("[{code}] network error: {message}")]
    Network {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// Error message.
        message: String,
        /// URL that failed (if applicable).
        url: Option<String>,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// Server answered with an HTML document instead of archive bytes.
    #[error("[E0202] server returned {content_type} instead of an archive")]
    UnexpectedContentType {
        /// Declared content type of the response.
        content_type: String,
        /// Where the offending HTML body was saved for inspection.
        diagnostic: PathBuf,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// Archive error.
    #[error("[{code}] archive error: {message}")]
    Archive {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// Error message.
        message: String,
        /// Archive path.
        path: Option<PathBuf>,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// IO error.
    #[error("[{code}] io error at {path}: {message}")]
    Io {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// Cache error.
    #[error("[{code}] cache error: {message}")]
    Cache {
        /// Error code.
        #[source]
        code: ErrorCodeSource,
        /// Error message.
        message: String,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },

    /// Configuration error.
    #[error("[E0601] configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
        /// Suggestions for fixing.
        suggestions: Vec<String>,
    },
}

/// Wrapper to make `ErrorCode` usable as a source.
#[derive(Debug)]
pub struct ErrorCodeSource(pub ErrorCode);

impl fmt::Display for ErrorCodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_str())
    }
}

impl std::error::Error for ErrorCodeSource {}

impl Error {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Resolution { code, .. }
            | Self::Network { code, .. }
            | Self::Archive { code, .. }
            | Self::Io { code, .. }
            | Self::Cache { code, .. } => code.0,
            Self::UnexpectedContentType { .. } => ErrorCode::E0202,
            Self::Config { .. } => ErrorCode::E0601,
        }
    }

    /// Get suggestions for fixing this error.
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::Resolution { suggestions, .. }
            | Self::Network { suggestions, .. }
            | Self::UnexpectedContentType { suggestions, .. }
            | Self::Archive { suggestions, .. }
            | Self::Io { suggestions, .. }
            | Self::Cache { suggestions, .. }
            | Self::Config { suggestions, .. } => suggestions,
        }
    }

    /// Create a resolution failure with manual-download guidance.
    #[must_use]
    pub fn resolution(message: impl Into<String>, version: impl fmt::Display) -> Self {
        Self::Resolution {
            code: ErrorCodeSource(ErrorCode::E0101),
            message: message.into(),
            suggestions: manual_download_suggestions(&version.to_string()),
        }
    }

    /// Create a network error with suggestions.
    #[must_use]
    pub fn network(message: impl Into<String>, url: Option<String>) -> Self {
        let message = message.into();
        let mut suggestions = vec![
            "Check your internet connection".to_string(),
            "Verify proxy settings if behind a corporate firewall".to_string(),
        ];
        if let Some(ref u) = url {
            suggestions.push(format!("Try accessing {u} in a browser"));
        }
        Self::Network {
            code: ErrorCodeSource(if message.contains("status") {
                ErrorCode::E0203
            } else {
                ErrorCode::E0201
            }),
            message,
            url,
            suggestions,
        }
    }

    /// Create an unexpected-content-type error pointing at the saved body.
    #[must_use]
    pub fn unexpected_content_type(
        content_type: impl Into<String>,
        diagnostic: impl Into<PathBuf>,
    ) -> Self {
        let diagnostic = diagnostic.into();
        Self::UnexpectedContentType {
            content_type: content_type.into(),
            suggestions: vec![
                format!("Inspect the saved response: {}", diagnostic.display()),
                "The access token may be invalid or expired - check it on odoo.com".to_string(),
            ],
            diagnostic,
        }
    }

    /// Create a corrupt-archive error.
    #[must_use]
    pub fn corrupt_archive(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Archive {
            code: ErrorCodeSource(ErrorCode::E0301),
            message: message.into(),
            path: Some(path.into()),
            suggestions: vec![
                "The archive may be truncated or corrupted. Try downloading again.".to_string(),
                "Clear the cache and retry: odsrc cache clear".to_string(),
            ],
        }
    }

    /// Create a generic archive/extraction error.
    #[must_use]
    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            code: ErrorCodeSource(ErrorCode::E0302),
            message: message.into(),
            path: None,
            suggestions: vec![
                "Clear the destination directory before retrying the extraction".to_string(),
            ],
        }
    }

    /// Create an IO error with path context.
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let (code, suggestions) = match err.kind() {
            std::io::ErrorKind::NotFound => (
                ErrorCode::E0401,
                vec![format!("Check if the path exists: {}", path.display())],
            ),
            std::io::ErrorKind::PermissionDenied => (
                ErrorCode::E0402,
                vec![
                    format!("Check permissions on: {}", path.display()),
                    "On Unix, check file ownership with 'ls -la'".to_string(),
                ],
            ),
            _ => (
                ErrorCode::E0403,
                vec![
                    format!("Check the file: {}", path.display()),
                    "Verify disk space is available".to_string(),
                ],
            ),
        };
        Self::Io {
            code: ErrorCodeSource(code),
            path,
            message: err.to_string(),
            suggestions,
        }
    }

    /// Create a cache error.
    #[must_use]
    pub fn cache(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Cache {
            code: ErrorCodeSource(if message.contains("permission") {
                ErrorCode::E0502
            } else {
                ErrorCode::E0501
            }),
            message,
            suggestions: vec![
                "Try clearing the cache: odsrc cache clear".to_string(),
                "Check cache directory permissions".to_string(),
            ],
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            suggestions: vec!["Run 'odsrc fetch --help' for the expected arguments".to_string()],
        }
    }

    /// Format the error with suggestions for display.
    #[must_use]
    pub fn display_with_suggestions(&self) -> String {
        let mut output = format!("{self}");
        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\n\nSuggestions:");
            for suggestion in suggestions {
                output.push_str(&format!("\n  - {suggestion}"));
            }
        }
        output
    }
}

/// Result type for odsrc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Standard guidance when automatic acquisition fails for good.
fn manual_download_suggestions(version: &str) -> Vec<String> {
    vec![
        format!("Download Odoo Enterprise {version} manually from https://www.odoo.com/page/download"),
        "Point --addons-path at the manually downloaded source tree".to_string(),
        "Verify the access token is still valid for your subscription".to_string(),
    ]
}
