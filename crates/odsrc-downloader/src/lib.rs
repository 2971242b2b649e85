//! Enterprise archive resolution and download for odsrc.
//!
//! odoo.com has no documented download API. Getting an archive takes the same
//! two steps a browser would:
//!
//! 1. **Resolve** - fetch the "thanks" page for a token/version pair and
//!    scrape the direct CDN link out of the HTML ([`ArchiveResolver`]).
//! 2. **Fetch** - stream the CDN URL to disk, guarding against the service
//!    answering with its own HTML error page instead of archive bytes
//!    ([`ArchiveFetcher`]).
//!
//! Both steps surface typed [`DownloadError`]s; retrying is the caller's
//! decision, never done here.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod client;
mod config;
mod error;
mod fetch;
mod resolver;

pub use client::HttpClient;
pub use config::{DownloadConfig, DownloadConfigBuilder};
pub use error::{DownloadError, Result};
pub use fetch::{ArchiveFetcher, FetchedArchive, ERROR_RESPONSE_FILE};
pub use resolver::{find_archive_url, ArchiveResolver, ODOO_BASE_URL};
