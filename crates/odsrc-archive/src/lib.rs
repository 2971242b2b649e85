//! Archive extraction for odsrc.
//!
//! Unpacks gzip-compressed tarballs into a destination directory. Odoo
//! releases wrap their payload in a version-named top directory
//! (`odoo-18.0/...`) whose name changes between releases, so the extractor
//! first enumerates the archive, and when every member shares a single
//! top-level directory it strips that directory: the payload always lands
//! directly under the destination.
//!
//! Extraction is not atomic; a failed run can leave a partial tree behind.
//! Callers that retry should clear the destination first.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

use flate2::read::GzDecoder;
use odsrc_core::{Error, NullObserver, ProgressEvent, ProgressObserver, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Tar.gz extractor with common-root stripping.
#[derive(Clone)]
pub struct Extractor {
    observer: Arc<dyn ProgressObserver>,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor").finish_non_exhaustive()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Create an extractor that reports no progress.
    #[must_use]
    pub fn new() -> Self {
        Self {
            observer: Arc::new(NullObserver),
        }
    }

    /// Create an extractor reporting per-member progress to `observer`.
    #[must_use]
    pub fn with_observer(observer: Arc<dyn ProgressObserver>) -> Self {
        Self { observer }
    }

    /// Extract `archive` into `dest`.
    ///
    /// # Errors
    /// Returns a corrupt-archive error when the gzip/tar stream cannot be
    /// parsed, and an IO error for local filesystem failures.
    pub fn extract(&self, archive: &Path, dest: &Path) -> Result<ExtractionReport> {
        let survey = self.survey(archive)?;
        debug!(
            archive = %archive.display(),
            members = survey.members,
            common_root = ?survey.common_root,
            "archive surveyed"
        );

        std::fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;

        self.observer.on_event(&ProgressEvent::ExtractionStarted {
            members: survey.members,
        });

        let mut tar = open_tar(archive)?;
        let mut files_extracted = 0usize;
        let mut processed = 0usize;

        let entries = tar
            .entries()
            .map_err(|e| Error::corrupt_archive(e.to_string(), archive))?;

        for entry in entries {
            let mut entry = entry.map_err(|e| Error::corrupt_archive(e.to_string(), archive))?;
            let member_path = entry
                .path()
                .map_err(|e| Error::corrupt_archive(e.to_string(), archive))?
                .into_owned();

            processed += 1;
            self.observer.on_event(&ProgressEvent::ExtractionProgress {
                current: processed,
                total: survey.members,
            });

            let Some(out_path) =
                target_path(&member_path, survey.common_root.as_deref(), dest)
            else {
                continue;
            };

            let entry_type = entry.header().entry_type();
            if entry_type.is_dir() {
                std::fs::create_dir_all(&out_path).map_err(|e| Error::io(&out_path, e))?;
            } else if entry_type.is_file() {
                if let Some(parent) = out_path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
                }

                let mut out_file =
                    File::create(&out_path).map_err(|e| Error::io(&out_path, e))?;
                copy_member(&mut entry, &mut out_file, archive, &out_path)?;
                files_extracted += 1;

                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    if let Ok(mode) = entry.header().mode() {
                        std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode))
                            .ok();
                    }
                }
            }
        }

        self.observer.on_event(&ProgressEvent::ExtractionFinished {
            files: files_extracted,
        });
        info!(
            files = files_extracted,
            dest = %dest.display(),
            "extraction complete"
        );

        Ok(ExtractionReport {
            members: survey.members,
            files_extracted,
            stripped_root: survey.common_root,
        })
    }

    /// Enumerate all members before extracting anything.
    ///
    /// The full pass is what makes the common-root decision reliable: the root
    /// can only be stripped when every member agrees on it.
    fn survey(&self, archive: &Path) -> Result<ArchiveSurvey> {
        let mut tar = open_tar(archive)?;
        let mut members = 0usize;
        let mut roots: BTreeSet<String> = BTreeSet::new();

        let entries = tar
            .entries()
            .map_err(|e| Error::corrupt_archive(e.to_string(), archive))?;

        for entry in entries {
            let entry = entry.map_err(|e| Error::corrupt_archive(e.to_string(), archive))?;
            let path = entry
                .path()
                .map_err(|e| Error::corrupt_archive(e.to_string(), archive))?;
            members += 1;
            if let Some(first) = first_segment(&path) {
                roots.insert(first);
            }
        }

        let common_root = if roots.len() == 1 {
            roots.into_iter().next()
        } else {
            None
        };

        Ok(ArchiveSurvey {
            members,
            common_root,
        })
    }
}

/// Result of an extraction run.
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    /// Archive members seen.
    pub members: usize,
    /// Regular files placed on disk.
    pub files_extracted: usize,
    /// The enclosing directory that was stripped, when there was one.
    pub stripped_root: Option<String>,
}

struct ArchiveSurvey {
    members: usize,
    common_root: Option<String>,
}

fn open_tar(archive: &Path) -> Result<tar::Archive<GzDecoder<File>>> {
    let file = File::open(archive).map_err(|e| Error::io(archive, e))?;
    Ok(tar::Archive::new(GzDecoder::new(file)))
}

/// First normal path segment of a member, if any.
fn first_segment(path: &Path) -> Option<String> {
    path.components().find_map(|c| match c {
        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
        _ => None,
    })
}

/// Where a member lands on disk, or `None` when it should be skipped.
///
/// Skipped members are the stripped root entry itself, members with no normal
/// component, and members trying to escape the destination with `..`.
fn target_path(member: &Path, common_root: Option<&str>, dest: &Path) -> Option<PathBuf> {
    if member
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return None;
    }

    let mut parts = member
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(PathBuf::from(part)),
            _ => None,
        })
        .peekable();

    if common_root.is_some() {
        parts.next()?;
    }

    parts.peek()?;
    Some(dest.join(parts.collect::<PathBuf>()))
}

fn copy_member<R: Read>(
    entry: &mut tar::Entry<'_, R>,
    out_file: &mut File,
    archive: &Path,
    out_path: &Path,
) -> Result<u64> {
    std::io::copy(entry, out_file).map_err(|e| match e.kind() {
        // Read-side failures here mean the compressed stream is bad.
        std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof => {
            Error::corrupt_archive(e.to_string(), archive)
        }
        _ => Error::io(out_path, e),
    })
}
