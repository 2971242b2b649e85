//! Resolution of a direct archive URL from the odoo.com download flow.
//!
//! The service expects a browser: requesting the "thanks" page for a
//! token/version pair returns HTML that embeds the real CDN link. The page
//! layout has drifted before, so two patterns are tried in order:
//!
//! 1. a complete `https://download.odoocdn.com/download/...` URL;
//! 2. a bare `payload=...` token, from which the URL is synthesized.
//!
//! Matching neither is an expected outcome (invalid token, page redesign),
//! reported as [`DownloadError::NoDownloadLink`].

use crate::client::HttpClient;
use crate::error::{DownloadError, Result};
use odsrc_core::OdooVersion;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};
use url::Url;

/// Production base URL of the download service.
pub const ODOO_BASE_URL: &str = "https://www.odoo.com";

static DIRECT_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https://download\.odoocdn\.com/download/[^"'&\s]+"#).expect("valid regex")
});

static PAYLOAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"payload=([^"'&\s]+)"#).expect("valid regex"));

/// Scrapes the download page for a direct CDN archive URL.
#[derive(Debug, Clone)]
pub struct ArchiveResolver {
    client: HttpClient,
    base_url: String,
}

impl ArchiveResolver {
    /// Create a resolver against the production service.
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, ODOO_BASE_URL)
    }

    /// Create a resolver against an alternate base URL (used by tests).
    #[must_use]
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    /// The "thanks" page URL for a token/version pair.
    ///
    /// The trailing `e` on the platform version encodes the Enterprise
    /// edition.
    #[must_use]
    pub fn thanks_url(&self, version: &OdooVersion, token: &str) -> String {
        format!(
            "{}/fr_FR/thanks/download?code={token}&platform_version=src_{}e",
            self.base_url,
            version.short()
        )
    }

    /// Resolve the direct archive URL for a version.
    ///
    /// # Errors
    /// Returns [`DownloadError::NoDownloadLink`] when the page matches neither
    /// pattern, or a network error when the page cannot be fetched at all.
    pub async fn resolve(&self, version: &OdooVersion, token: &str) -> Result<Url> {
        let thanks_url = Url::parse(&self.thanks_url(version, token))?;
        debug!(url = %thanks_url, "fetching download page");

        let html = self.client.get_text(&thanks_url).await?;

        let Some(direct) = find_archive_url(&html, &version.short()) else {
            return Err(DownloadError::NoDownloadLink {
                version: version.to_string(),
            });
        };

        info!(version = %version, "download link resolved");
        Ok(Url::parse(&direct)?)
    }
}

/// Find the archive URL in a download page body.
///
/// A complete CDN URL always wins over the payload fallback.
#[must_use]
pub fn find_archive_url(html: &str, short_version: &str) -> Option<String> {
    if let Some(m) = DIRECT_URL_RE.find(html) {
        debug!("direct download URL found");
        return Some(m.as_str().to_string());
    }

    if let Some(captures) = PAYLOAD_RE.captures(html) {
        let payload = captures.get(1)?.as_str();
        debug!("payload token found, synthesizing download URL");
        return Some(format!(
            "https://download.odoocdn.com/download/{short_version}e/src?payload={payload}"
        ));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver_for(server_uri: &str) -> ArchiveResolver {
        ArchiveResolver::with_base_url(HttpClient::with_defaults().unwrap(), server_uri)
    }

    #[test]
    fn thanks_url_format() {
        let resolver = resolver_for(ODOO_BASE_URL);
        let url = resolver.thanks_url(&OdooVersion::parse("18"), "TOK123");
        assert_eq!(
            url,
            "https://www.odoo.com/fr_FR/thanks/download?code=TOK123&platform_version=src_18e"
        );
    }

    #[test]
    fn direct_url_is_extracted() {
        let html = r#"<a href="https://download.odoocdn.com/download/abc123">Download</a>"#;
        assert_eq!(
            find_archive_url(html, "18"),
            Some("https://download.odoocdn.com/download/abc123".to_string())
        );
    }

    #[test]
    fn direct_url_stops_at_quote_and_ampersand() {
        let html = r#"url = "https://download.odoocdn.com/download/xyz?a=1&b=2""#;
        assert_eq!(
            find_archive_url(html, "18"),
            Some("https://download.odoocdn.com/download/xyz?a=1".to_string())
        );
    }

    #[test]
    fn payload_fallback_synthesizes_url() {
        let html = r#"<form action="/download?payload=SECRET123">"#;
        assert_eq!(
            find_archive_url(html, "17"),
            Some("https://download.odoocdn.com/download/17e/src?payload=SECRET123".to_string())
        );
    }

    #[test]
    fn direct_url_wins_over_payload() {
        let html = r#"
            <a href="https://download.odoocdn.com/download/direct-one">x</a>
            <form action="/download?payload=SECRET">
        "#;
        assert_eq!(
            find_archive_url(html, "18"),
            Some("https://download.odoocdn.com/download/direct-one".to_string())
        );
    }

    #[test]
    fn no_pattern_means_no_url() {
        assert_eq!(find_archive_url("<html><body>Sorry</body></html>", "18"), None);
    }

    #[tokio::test]
    async fn resolve_scrapes_the_thanks_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fr_FR/thanks/download"))
            .and(query_param("code", "TOK123"))
            .and(query_param("platform_version", "src_18e"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="https://download.odoocdn.com/download/abc123">here</a>"#,
            ))
            .mount(&server)
            .await;

        let resolver = resolver_for(&server.uri());
        let url = resolver
            .resolve(&OdooVersion::parse("18"), "TOK123")
            .await
            .unwrap();
        assert_eq!(url.as_str(), "https://download.odoocdn.com/download/abc123");
    }

    #[tokio::test]
    async fn resolve_fails_typed_when_nothing_matches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let resolver = resolver_for(&server.uri());
        let err = resolver
            .resolve(&OdooVersion::parse("18"), "BAD")
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::NoDownloadLink { version } if version == "18.0"));
    }

    #[tokio::test]
    async fn resolve_raises_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let resolver = resolver_for(&server.uri());
        let err = resolver
            .resolve(&OdooVersion::parse("18"), "TOK")
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::ServerError { status: 500, .. }));
    }
}
