//! The acquisition pipeline orchestrator.

use crate::layout::AddonsLayout;
use odsrc_archive::Extractor;
use odsrc_cache::ArchiveCache;
use odsrc_core::{
    Error, ErrorCode, NullObserver, OdooVersion, ProgressEvent, ProgressObserver, Result, Stage,
};
use odsrc_downloader::{
    ArchiveFetcher, ArchiveResolver, DownloadConfig, HttpClient, ODOO_BASE_URL,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// What to acquire and where to put it.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    /// Target version; any user-supplied string is accepted and normalized.
    pub version: OdooVersion,
    /// Enterprise access token. Only needed when the archive is not cached.
    pub token: Option<String>,
    /// Directory the source tree is extracted into.
    pub dest: PathBuf,
}

impl ProvisionRequest {
    /// Create a request for a version and destination.
    #[must_use]
    pub fn new(version: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            version: OdooVersion::parse(version),
            token: None,
            dest: dest.into(),
        }
    }

    /// Attach an access token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Outcome of a successful acquisition.
#[derive(Debug, Clone)]
pub struct Provisioned {
    /// Canonical version that was provisioned.
    pub version: OdooVersion,
    /// Extraction root.
    pub dest: PathBuf,
    /// Whether the archive came from the cache.
    pub from_cache: bool,
    /// Files placed on disk.
    pub files_extracted: usize,
    /// Detected addons layout of the extracted tree.
    pub layout: AddonsLayout,
}

/// Orchestrates cache, resolver, fetcher and extractor.
///
/// Reusable across sequential calls; concurrent calls against the same cache
/// root are not supported.
pub struct EnterpriseManager {
    cache: ArchiveCache,
    resolver: ArchiveResolver,
    fetcher: ArchiveFetcher,
    extractor: Extractor,
    observer: Arc<dyn ProgressObserver>,
}

impl std::fmt::Debug for EnterpriseManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnterpriseManager")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl EnterpriseManager {
    /// Start building a manager.
    #[must_use]
    pub fn builder() -> EnterpriseManagerBuilder {
        EnterpriseManagerBuilder::default()
    }

    /// Create a manager with default configuration and no progress reporting.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(cache: ArchiveCache) -> Result<Self> {
        Self::builder().cache(cache).build()
    }

    /// Acquire the requested version into `request.dest`.
    ///
    /// Fast path: a cached archive is extracted directly. Slow path: the
    /// download page is scraped, the archive streamed into the cache, then
    /// extracted. A cached archive that turns out to be corrupt is discarded
    /// and the slow path runs once in its place.
    ///
    /// # Errors
    /// Every failure is returned as a typed error with guidance; nothing
    /// panics past this boundary.
    pub async fn provision(&self, request: &ProvisionRequest) -> Result<Provisioned> {
        let version = &request.version;
        std::fs::create_dir_all(&request.dest).map_err(|e| Error::io(&request.dest, e))?;

        if self.cache.contains(version) {
            self.emit(Stage::CacheHit);
            info!(version = %version, "archive found in cache");

            match self.extract(&self.cache.entry_path(version), &request.dest) {
                Ok(report) => return Ok(self.finished(request, true, report)),
                Err(e) if e.code() == ErrorCode::E0301 => {
                    warn!(version = %version, "cached archive is corrupt, discarding it");
                    self.cache.remove(version)?;
                }
                Err(e) => return Err(e),
            }
        } else {
            self.emit(Stage::CacheMiss);
            info!(version = %version, "no cached archive");
        }

        let token = request.token.as_deref().ok_or_else(|| {
            Error::config("an access token is required to download Odoo Enterprise")
        })?;

        self.emit(Stage::Resolving);
        let url = self.resolver.resolve(version, token).await?;

        let archive_path = self
            .download_into_cache(&url, version, &request.dest)
            .await?;

        match self.extract(&archive_path, &request.dest) {
            Ok(report) => Ok(self.finished(request, false, report)),
            Err(e) => {
                if e.code() == ErrorCode::E0301 {
                    // Never keep an archive that failed to parse.
                    self.cache.remove(version)?;
                }
                Err(e)
            }
        }
    }

    /// Stream a resolved archive URL into the cache entry for `version`.
    ///
    /// The download goes through a staging file, so an interrupted transfer
    /// leaves the cache untouched. Returns the committed cache path. An HTML
    /// answer is saved to `error_response.html` under `diagnostics_dir`.
    ///
    /// # Errors
    /// Returns typed network, content-type, and IO errors.
    pub async fn download_into_cache(
        &self,
        url: &Url,
        version: &OdooVersion,
        diagnostics_dir: &Path,
    ) -> Result<PathBuf> {
        self.emit(Stage::Downloading);
        let staged = self.cache.stage()?;
        self.fetcher
            .fetch(url, staged.path(), diagnostics_dir)
            .await?;
        self.cache.commit(version, staged)
    }

    fn extract(&self, archive: &Path, dest: &Path) -> Result<odsrc_archive::ExtractionReport> {
        self.emit(Stage::Extracting);
        self.extractor.extract(archive, dest)
    }

    fn finished(
        &self,
        request: &ProvisionRequest,
        from_cache: bool,
        report: odsrc_archive::ExtractionReport,
    ) -> Provisioned {
        let layout = AddonsLayout::probe(&request.dest);
        info!(
            version = %request.version,
            from_cache,
            files = report.files_extracted,
            layout = %layout,
            "enterprise source ready"
        );
        Provisioned {
            version: request.version.clone(),
            dest: request.dest.clone(),
            from_cache,
            files_extracted: report.files_extracted,
            layout,
        }
    }

    fn emit(&self, stage: Stage) {
        self.observer.on_event(&ProgressEvent::Stage(stage));
    }
}

/// Builder for [`EnterpriseManager`].
pub struct EnterpriseManagerBuilder {
    cache: Option<ArchiveCache>,
    config: DownloadConfig,
    observer: Arc<dyn ProgressObserver>,
    base_url: String,
}

impl std::fmt::Debug for EnterpriseManagerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnterpriseManagerBuilder")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Default for EnterpriseManagerBuilder {
    fn default() -> Self {
        Self {
            cache: None,
            config: DownloadConfig::default(),
            observer: Arc::new(NullObserver),
            base_url: ODOO_BASE_URL.to_string(),
        }
    }
}

impl EnterpriseManagerBuilder {
    /// Use the given cache store.
    #[must_use]
    pub fn cache(mut self, cache: ArchiveCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Override the download configuration.
    #[must_use]
    pub fn config(mut self, config: DownloadConfig) -> Self {
        self.config = config;
        self
    }

    /// Report progress to the given observer.
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Point the resolver at an alternate download service (used by tests).
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the manager.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn build(self) -> Result<EnterpriseManager> {
        let cache = self.cache.unwrap_or_else(ArchiveCache::at_default_root);
        let client = HttpClient::new(self.config).map_err(Error::from)?;

        Ok(EnterpriseManager {
            cache,
            resolver: ArchiveResolver::with_base_url(client.clone(), self.base_url),
            fetcher: ArchiveFetcher::with_observer(client, self.observer.clone()),
            extractor: Extractor::with_observer(self.observer.clone()),
            observer: self.observer,
        })
    }
}
