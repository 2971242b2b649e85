//! Addons layout detection over an extracted source tree.
//!
//! Archive layouts have varied across releases: some ship `odoo/addons`,
//! some put the modules at the top level, some bury an `addons` directory
//! deeper. The mount point for containers depends on which shape was
//! delivered, so the tree is probed after extraction.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Where the addons live inside an extracted Enterprise tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddonsLayout {
    /// Standard `odoo/addons` subdirectory.
    OdooAddons,
    /// Module directories (each with a `__manifest__.py`) directly at the root.
    FlatModules,
    /// An `addons` directory somewhere deeper; the path is relative to the
    /// extraction root.
    NestedAddons(PathBuf),
    /// No recognizable addons directory.
    Unknown,
}

impl AddonsLayout {
    /// Probe an extracted tree for its addons layout.
    #[must_use]
    pub fn probe(root: &Path) -> Self {
        if root.join("odoo").join("addons").is_dir() {
            debug!("odoo/addons layout detected");
            return Self::OdooAddons;
        }

        if has_top_level_manifest(root) {
            debug!("flat module layout detected");
            return Self::FlatModules;
        }

        if let Some(nested) = find_nested_addons(root) {
            debug!(path = %nested.display(), "nested addons layout detected");
            return Self::NestedAddons(nested);
        }

        Self::Unknown
    }

    /// The directory to mount as the addons path, relative to the extraction
    /// root. `None` when no addons directory was recognized.
    #[must_use]
    pub fn addons_dir(&self) -> Option<PathBuf> {
        match self {
            Self::OdooAddons => Some(PathBuf::from("odoo/addons")),
            Self::FlatModules => Some(PathBuf::from(".")),
            Self::NestedAddons(path) => Some(path.clone()),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for AddonsLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OdooAddons => write!(f, "odoo/addons"),
            Self::FlatModules => write!(f, "modules at the root"),
            Self::NestedAddons(path) => write!(f, "addons at {}", path.display()),
            Self::Unknown => write!(f, "no addons directory found"),
        }
    }
}

/// Any `<root>/*/__manifest__.py`?
fn has_top_level_manifest(root: &Path) -> bool {
    let Ok(dir) = std::fs::read_dir(root) else {
        return false;
    };
    dir.filter_map(std::result::Result::ok)
        .any(|entry| entry.path().join("__manifest__.py").is_file())
}

/// First `addons` directory anywhere below the root, in sorted order.
fn find_nested_addons(root: &Path) -> Option<PathBuf> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .find(|entry| entry.file_type().is_dir() && entry.file_name() == "addons")
        .and_then(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .ok()
                .map(Path::to_path_buf)
        })
}
