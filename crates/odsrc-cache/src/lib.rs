//! On-disk archive cache for odsrc.
//!
//! One compressed archive per Odoo version, stored at a deterministic path
//! (`<root>/odoo-enterprise-<version>.tar.gz`). Entries are written atomically
//! through a temp file in the same directory, so an interrupted download can
//! never leave a half-written file that later passes [`ArchiveCache::contains`].
//!
//! Entries are never expired automatically; invalidation is a caller decision
//! (`odsrc cache clear`).

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

use odsrc_core::{Error, OdooVersion, Result};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

const FILE_PREFIX: &str = "odoo-enterprise-";
const FILE_SUFFIX: &str = ".tar.gz";

/// Directory-backed cache mapping an Odoo version to its source archive.
#[derive(Debug, Clone)]
pub struct ArchiveCache {
    root: PathBuf,
}

impl ArchiveCache {
    /// Create a cache rooted at the given directory.
    ///
    /// The directory is created lazily on first write, not here.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a cache at the platform default location.
    #[must_use]
    pub fn at_default_root() -> Self {
        Self::new(Self::default_root())
    }

    /// Platform default cache root (`~/.cache/odsrc/enterprise_cache` on Linux).
    #[must_use]
    pub fn default_root() -> PathBuf {
        directories::BaseDirs::new().map_or_else(
            || PathBuf::from(".odsrc/enterprise_cache"),
            |d| d.cache_dir().join("odsrc").join("enterprise_cache"),
        )
    }

    /// Cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File name of the cache entry for a version.
    #[must_use]
    pub fn file_name(version: &OdooVersion) -> String {
        format!("{FILE_PREFIX}{version}{FILE_SUFFIX}")
    }

    /// Deterministic entry path for a version. Does not touch disk.
    #[must_use]
    pub fn entry_path(&self, version: &OdooVersion) -> PathBuf {
        self.root.join(Self::file_name(version))
    }

    /// Whether a usable entry exists for the version.
    ///
    /// An empty file does not count: a write that died before the atomic
    /// promote leaves nothing, but an operator-truncated file must not be
    /// mistaken for an archive either.
    #[must_use]
    pub fn contains(&self, version: &OdooVersion) -> bool {
        fs::metadata(self.entry_path(version)).is_ok_and(|m| m.is_file() && m.len() > 0)
    }

    /// Open a staging file inside the cache root.
    ///
    /// The caller streams the archive into it, then either promotes it with
    /// [`ArchiveCache::commit`] or drops it (the temp file is removed on drop).
    pub fn stage(&self) -> Result<NamedTempFile> {
        fs::create_dir_all(&self.root).map_err(|e| Error::io(&self.root, e))?;
        NamedTempFile::new_in(&self.root).map_err(|e| Error::io(&self.root, e))
    }

    /// Atomically promote a staged file to the entry for `version`.
    pub fn commit(&self, version: &OdooVersion, staged: NamedTempFile) -> Result<PathBuf> {
        let dest = self.entry_path(version);
        staged
            .persist(&dest)
            .map_err(|e| Error::io(&dest, e.error))?;
        info!(version = %version, path = %dest.display(), "archive cached");
        Ok(dest)
    }

    /// Stream `reader` into the entry for `version`.
    ///
    /// Goes through the same stage/commit pair, so a failed copy leaves the
    /// cache untouched.
    pub fn write(&self, version: &OdooVersion, reader: &mut dyn Read) -> Result<PathBuf> {
        let mut staged = self.stage()?;
        std::io::copy(reader, &mut staged).map_err(|e| Error::io(staged.path(), e))?;
        self.commit(version, staged)
    }

    /// Remove the entry for a version. Returns whether a file was deleted.
    pub fn remove(&self, version: &OdooVersion) -> Result<bool> {
        let path = self.entry_path(version);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(version = %version, "cache entry removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::io(&path, e)),
        }
    }

    /// List all cached archives.
    pub fn entries(&self) -> Result<Vec<CachedArchive>> {
        let mut entries = Vec::new();
        let dir = match fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
            Err(e) => return Err(Error::io(&self.root, e)),
        };
        for item in dir {
            let item = item.map_err(|e| Error::io(&self.root, e))?;
            let name = item.file_name().to_string_lossy().into_owned();
            let Some(version) = name
                .strip_prefix(FILE_PREFIX)
                .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
            else {
                continue;
            };
            let meta = item.metadata().map_err(|e| Error::io(item.path(), e))?;
            if !meta.is_file() {
                continue;
            }
            entries.push(CachedArchive {
                version: version.to_string(),
                path: item.path(),
                size: meta.len(),
            });
        }
        entries.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(entries)
    }

    /// Remove every cached archive. Returns the number of entries deleted.
    pub fn clear(&self) -> Result<usize> {
        let entries = self.entries()?;
        for entry in &entries {
            fs::remove_file(&entry.path).map_err(|e| Error::io(&entry.path, e))?;
        }
        if !entries.is_empty() {
            info!(removed = entries.len(), "cache cleared");
        }
        Ok(entries.len())
    }
}

/// A cached archive on disk.
#[derive(Debug, Clone)]
pub struct CachedArchive {
    /// Version string parsed from the file name.
    pub version: String,
    /// Full path to the archive.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn cache() -> (tempfile::TempDir, ArchiveCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = ArchiveCache::new(dir.path().join("enterprise_cache"));
        (dir, cache)
    }

    #[test]
    fn entry_path_is_deterministic() {
        let cache = ArchiveCache::new("/var/cache/odsrc");
        let v = OdooVersion::parse("18");
        assert_eq!(
            cache.entry_path(&v),
            PathBuf::from("/var/cache/odsrc/odoo-enterprise-18.0.tar.gz")
        );
    }

    #[test]
    fn contains_is_false_for_missing_and_empty_entries() {
        let (_dir, cache) = cache();
        let v = OdooVersion::parse("18.0");
        assert!(!cache.contains(&v));

        fs::create_dir_all(cache.root()).unwrap();
        fs::write(cache.entry_path(&v), b"").unwrap();
        assert!(!cache.contains(&v));

        fs::write(cache.entry_path(&v), b"bytes").unwrap();
        assert!(cache.contains(&v));
    }

    #[test]
    fn write_round_trips_bytes() {
        let (_dir, cache) = cache();
        let v = OdooVersion::parse("16.0");
        let payload = b"pretend this is a tarball".to_vec();

        let path = cache.write(&v, &mut payload.as_slice()).unwrap();
        assert!(cache.contains(&v));
        assert_eq!(fs::read(path).unwrap(), payload);
    }

    #[test]
    fn dropped_stage_leaves_no_entry() {
        let (_dir, cache) = cache();
        let v = OdooVersion::parse("18.0");
        {
            let mut staged = cache.stage().unwrap();
            staged.write_all(b"partial download").unwrap();
            // dropped without commit
        }
        assert!(!cache.contains(&v));
        assert!(cache.entries().unwrap().is_empty());
    }

    #[test]
    fn remove_reports_whether_entry_existed() {
        let (_dir, cache) = cache();
        let v = OdooVersion::parse("18.0");
        assert!(!cache.remove(&v).unwrap());

        cache.write(&v, &mut &b"x"[..]).unwrap();
        assert!(cache.remove(&v).unwrap());
        assert!(!cache.contains(&v));
    }

    #[test]
    fn entries_lists_only_archive_files() {
        let (_dir, cache) = cache();
        cache.write(&OdooVersion::parse("17.0"), &mut &b"a"[..]).unwrap();
        cache.write(&OdooVersion::parse("18.0"), &mut &b"bb"[..]).unwrap();
        fs::write(cache.root().join("notes.txt"), b"unrelated").unwrap();

        let entries = cache.entries().unwrap();
        let versions: Vec<_> = entries.iter().map(|e| e.version.as_str()).collect();
        assert_eq!(versions, vec!["17.0", "18.0"]);
        assert_eq!(entries[1].size, 2);
    }

    #[test]
    fn clear_removes_everything() {
        let (_dir, cache) = cache();
        cache.write(&OdooVersion::parse("17.0"), &mut &b"a"[..]).unwrap();
        cache.write(&OdooVersion::parse("18.0"), &mut &b"b"[..]).unwrap();

        assert_eq!(cache.clear().unwrap(), 2);
        assert!(cache.entries().unwrap().is_empty());
        // Clearing an already-empty cache is fine.
        assert_eq!(cache.clear().unwrap(), 0);
    }
}
