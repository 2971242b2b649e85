//! Progress events emitted by the acquisition pipeline.
//!
//! The pipeline reports plain data; rendering (bars, spinners, log lines) is
//! owned by whichever presentation layer the caller injects.

use std::fmt;

/// High-level stage transitions of an acquisition run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// A cached archive was found for the requested version.
    CacheHit,
    /// No usable cache entry exists; the slow path will run.
    CacheMiss,
    /// Scraping the download page for a direct archive URL.
    Resolving,
    /// Streaming the archive from the CDN.
    Downloading,
    /// Unpacking the archive into the destination directory.
    Extracting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::CacheHit => "cache hit",
            Self::CacheMiss => "cache miss",
            Self::Resolving => "resolving",
            Self::Downloading => "downloading",
            Self::Extracting => "extracting",
        };
        write!(f, "{label}")
    }
}

/// A single progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The pipeline entered a new stage.
    Stage(Stage),
    /// A download began; total size is known when the server declared one.
    DownloadStarted {
        /// `Content-Length` if the server sent it.
        total_bytes: Option<u64>,
    },
    /// Cumulative bytes written so far for the current download.
    DownloadProgress {
        /// Bytes written to disk.
        bytes: u64,
    },
    /// The download finished.
    DownloadFinished {
        /// Final size in bytes.
        bytes: u64,
    },
    /// Extraction began; the member count is known up front.
    ExtractionStarted {
        /// Number of archive members that will be processed.
        members: usize,
    },
    /// One archive member was processed.
    ExtractionProgress {
        /// Members processed so far.
        current: usize,
        /// Total members.
        total: usize,
    },
    /// Extraction finished.
    ExtractionFinished {
        /// Files placed on disk.
        files: usize,
    },
}

/// Observer interface for progress events.
///
/// Implementations must tolerate being called from any stage in any order a
/// run can produce; events are informational only and never require a reply.
pub trait ProgressObserver: Send + Sync {
    /// Handle a single event.
    fn on_event(&self, event: &ProgressEvent);
}

/// Observer that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn on_event(&self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<ProgressEvent>>);

    impl ProgressObserver for Recorder {
        fn on_event(&self, event: &ProgressEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn stage_labels() {
        assert_eq!(Stage::CacheHit.to_string(), "cache hit");
        assert_eq!(Stage::Downloading.to_string(), "downloading");
    }

    #[test]
    fn observer_receives_events_in_order() {
        let recorder = Recorder::default();
        recorder.on_event(&ProgressEvent::Stage(Stage::CacheMiss));
        recorder.on_event(&ProgressEvent::DownloadStarted {
            total_bytes: Some(1024),
        });
        recorder.on_event(&ProgressEvent::DownloadProgress { bytes: 512 });

        let events = recorder.0.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], ProgressEvent::Stage(Stage::CacheMiss));
    }

    #[test]
    fn null_observer_is_a_no_op() {
        NullObserver.on_event(&ProgressEvent::DownloadFinished { bytes: 0 });
    }
}
