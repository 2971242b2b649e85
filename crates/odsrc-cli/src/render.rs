//! Terminal rendering of pipeline progress events.
//!
//! The acquisition crates emit plain data; this is the only place that knows
//! about progress bars.

use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use odsrc_core::{ProgressEvent, ProgressObserver, Stage};
use std::sync::Mutex;

/// Renders progress events as indicatif bars and status lines.
pub struct ProgressRenderer {
    bar: Mutex<Option<ProgressBar>>,
    enabled: bool,
}

impl std::fmt::Debug for ProgressRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressRenderer")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl ProgressRenderer {
    /// Create a renderer; a disabled one swallows everything.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            enabled,
        }
    }

    /// Remove any bar still on screen.
    pub fn clear(&self) {
        if let Ok(mut slot) = self.bar.lock()
            && let Some(bar) = slot.take()
        {
            bar.finish_and_clear();
        }
    }

    fn stage_line(&self, stage: Stage) {
        if !self.enabled {
            return;
        }
        let line = match stage {
            Stage::CacheHit => format!("{} archive found in cache", style("✓").green()),
            Stage::CacheMiss => format!("{} no cached archive", style("·").dim()),
            Stage::Resolving => format!("{} resolving download link...", style("→").cyan()),
            Stage::Downloading => format!("{} downloading archive...", style("↓").cyan()),
            Stage::Extracting => format!("{} extracting archive...", style("⇲").cyan()),
        };
        match self.bar.lock().ok().as_deref() {
            Some(Some(bar)) => bar.println(line),
            _ => println!("{line}"),
        }
    }

    fn start_bytes_bar(&self, total: Option<u64>) {
        let bar = self.new_bar(total.unwrap_or(0));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.dim} [{bar:25.green/dim}] {bytes:>10}/{total_bytes:<10} {bytes_per_sec:>12}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("━╸─"),
        );
        self.set_bar(bar);
    }

    fn start_members_bar(&self, total: usize) {
        let bar = self.new_bar(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.dim} [{bar:25.cyan/dim}] {pos}/{len} files")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("━╸─"),
        );
        self.set_bar(bar);
    }

    fn set_bar(&self, bar: ProgressBar) {
        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn new_bar(&self, len: u64) -> ProgressBar {
        let bar = ProgressBar::new(len);
        if !self.enabled {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar
    }

    fn set_position(&self, position: u64) {
        if let Ok(slot) = self.bar.lock()
            && let Some(bar) = slot.as_ref()
        {
            bar.set_position(position);
        }
    }
}

impl ProgressObserver for ProgressRenderer {
    fn on_event(&self, event: &ProgressEvent) {
        match *event {
            ProgressEvent::Stage(stage) => self.stage_line(stage),
            ProgressEvent::DownloadStarted { total_bytes } => self.start_bytes_bar(total_bytes),
            ProgressEvent::DownloadProgress { bytes } => self.set_position(bytes),
            ProgressEvent::DownloadFinished { .. } | ProgressEvent::ExtractionFinished { .. } => {
                self.clear();
            }
            ProgressEvent::ExtractionStarted { members } => self.start_members_bar(members),
            ProgressEvent::ExtractionProgress { current, .. } => {
                self.set_position(current as u64);
            }
        }
    }
}

/// Format bytes as a human-readable string.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{size:.0} {}", UNITS[unit_idx])
    } else {
        format!("{size:.1} {}", UNITS[unit_idx])
    }
}
