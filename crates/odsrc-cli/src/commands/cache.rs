//! `odsrc cache` - inspect or invalidate the archive cache.

use crate::render::format_bytes;
use clap::{Args, Subcommand};
use odsrc_cache::ArchiveCache;
use odsrc_core::OdooVersion;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Subcommand)]
pub enum CacheCommand {
    /// List cached archives.
    List(CacheArgs),
    /// Remove cached archives.
    Clear(CacheClearArgs),
}

#[derive(Debug, Clone, Args)]
pub struct CacheArgs {
    /// Override the archive cache directory.
    #[arg(long, env = "ODSRC_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct CacheClearArgs {
    /// Override the archive cache directory.
    #[arg(long, env = "ODSRC_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Only remove the archive for this version.
    #[arg(long)]
    pub version: Option<String>,
}

pub fn run(command: CacheCommand) -> anyhow::Result<ExitCode> {
    match command {
        CacheCommand::List(args) => list(&open(args.cache_dir)),
        CacheCommand::Clear(args) => clear(&open(args.cache_dir), args.version.as_deref()),
    }
}

fn open(cache_dir: Option<PathBuf>) -> ArchiveCache {
    cache_dir.map_or_else(ArchiveCache::at_default_root, ArchiveCache::new)
}

fn list(cache: &ArchiveCache) -> anyhow::Result<ExitCode> {
    let entries = cache.entries()?;
    if entries.is_empty() {
        println!("Cache is empty ({})", cache.root().display());
        return Ok(ExitCode::SUCCESS);
    }

    println!("Cached archives in {}:", cache.root().display());
    for entry in entries {
        println!("  {:<10} {:>10}", entry.version, format_bytes(entry.size));
    }
    Ok(ExitCode::SUCCESS)
}

fn clear(cache: &ArchiveCache, version: Option<&str>) -> anyhow::Result<ExitCode> {
    match version {
        Some(version) => {
            let version = OdooVersion::parse(version);
            if cache.remove(&version)? {
                println!("Removed cached archive for Odoo {version}");
            } else {
                println!("No cached archive for Odoo {version}");
            }
        }
        None => {
            let removed = cache.clear()?;
            println!("Removed {removed} cached archive(s)");
        }
    }
    Ok(ExitCode::SUCCESS)
}
