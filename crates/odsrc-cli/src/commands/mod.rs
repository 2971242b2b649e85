//! Command definitions for the odsrc CLI.

pub mod cache;
pub mod fetch;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Provision disposable Odoo instances: download, cache and extract
/// Enterprise source trees.
#[derive(Debug, Parser)]
#[command(name = "odsrc", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase output verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Acquire an Odoo source tree into a destination directory.
    Fetch(FetchArgs),

    /// Inspect or invalidate the archive cache.
    #[command(subcommand)]
    Cache(cache::CacheCommand),
}

/// Odoo distribution variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Edition {
    /// Open source edition; ships with the official Docker image.
    Community,
    /// Proprietary edition; requires an access token to download.
    Enterprise,
}

#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// Odoo version (e.g. 18 or 18.0).
    #[arg(long)]
    pub version: String,

    /// Odoo edition.
    #[arg(long, value_enum, default_value_t = Edition::Community)]
    pub edition: Edition,

    /// Enterprise access token from your odoo.com subscription.
    #[arg(long, env = "ODOO_ENTERPRISE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Directory to extract the source tree into.
    #[arg(long, default_value = "enterprise")]
    pub dest: PathBuf,

    /// Override the archive cache directory.
    #[arg(long, env = "ODSRC_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Use an already-downloaded source tree instead of fetching one.
    #[arg(long)]
    pub addons_path: Option<PathBuf>,
}
