//! End-to-end acquisition tests against a mock download service.

use flate2::Compression;
use flate2::write::GzEncoder;
use odsrc_cache::ArchiveCache;
use odsrc_core::{ErrorCode, OdooVersion};
use odsrc_enterprise::{AddonsLayout, EnterpriseManager, ProvisionRequest};
use std::path::Path;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build a tar.gz in memory from (path, contents) pairs.
fn archive_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, contents.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

fn enterprise_archive() -> Vec<u8> {
    archive_bytes(&[
        ("odoo-18.0/addons/base/x.py", "print('x')"),
        ("odoo-18.0/addons/base/__manifest__.py", "{'name': 'base'}"),
    ])
}

fn manager_for(cache_root: &Path, base_url: &str) -> EnterpriseManager {
    EnterpriseManager::builder()
        .cache(ArchiveCache::new(cache_root))
        .base_url(base_url)
        .build()
        .unwrap()
}

#[tokio::test]
async fn cache_hit_skips_the_network_entirely() {
    let workspace = TempDir::new().unwrap();
    let cache = ArchiveCache::new(workspace.path().join("cache"));
    let version = OdooVersion::parse("18");
    cache
        .write(&version, &mut enterprise_archive().as_slice())
        .unwrap();

    // Unroutable base URL: any network attempt would fail loudly.
    let manager = manager_for(cache.root(), "http://127.0.0.1:1");
    let dest = workspace.path().join("enterprise");
    let outcome = manager
        .provision(&ProvisionRequest::new("18", &dest))
        .await
        .unwrap();

    assert!(outcome.from_cache);
    assert_eq!(outcome.version.as_str(), "18.0");
    assert!(dest.join("addons/base/x.py").is_file());
    assert!(dest.join("addons/base/__manifest__.py").is_file());
    assert!(!dest.join("odoo-18.0").exists());
}

#[tokio::test]
async fn download_into_cache_then_cached_runs_reuse_it() {
    let server = MockServer::start().await;
    let body = enterprise_archive();
    Mock::given(method("GET"))
        .and(path("/download/abc123"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/octet-stream")
                .set_body_bytes(body.clone()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let workspace = TempDir::new().unwrap();
    let cache_root = workspace.path().join("cache");
    let manager = manager_for(&cache_root, &server.uri());
    let version = OdooVersion::parse("18");
    let dest = workspace.path().join("enterprise");

    let url = Url::parse(&format!("{}/download/abc123", server.uri())).unwrap();
    let cached = manager
        .download_into_cache(&url, &version, &dest)
        .await
        .unwrap();

    assert_eq!(
        cached,
        cache_root.join("odoo-enterprise-18.0.tar.gz")
    );
    assert_eq!(std::fs::read(&cached).unwrap(), body);

    // The archive is now cached: provisioning must not hit the server again
    // (the mock's expect(1) enforces it).
    let outcome = manager
        .provision(&ProvisionRequest::new("18", &dest))
        .await
        .unwrap();
    assert!(outcome.from_cache);
    assert_eq!(outcome.files_extracted, 2);
    assert!(dest.join("addons/base/x.py").is_file());
}

#[tokio::test]
async fn corrupt_cache_entry_is_discarded_before_the_slow_path() {
    let server = MockServer::start().await;
    // The slow path will run and find no usable page.
    Mock::given(method("GET"))
        .and(path("/fr_FR/thanks/download"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>sorry</html>"))
        .mount(&server)
        .await;

    let workspace = TempDir::new().unwrap();
    let cache = ArchiveCache::new(workspace.path().join("cache"));
    let version = OdooVersion::parse("18");
    cache
        .write(&version, &mut &b"definitely not a tarball"[..])
        .unwrap();

    let manager = manager_for(cache.root(), &server.uri());
    let err = manager
        .provision(
            &ProvisionRequest::new("18", workspace.path().join("enterprise")).with_token("TOK123"),
        )
        .await
        .unwrap_err();

    // The run still fails (resolution found nothing), but the poisoned entry
    // is gone so the next attempt goes straight to the network.
    assert_eq!(err.code(), ErrorCode::E0101);
    assert!(!cache.contains(&version));
}

#[tokio::test]
async fn resolution_uses_the_exact_thanks_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fr_FR/thanks/download"))
        .and(query_param("code", "TOK123"))
        .and(query_param("platform_version", "src_18e"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>no link here</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let workspace = TempDir::new().unwrap();
    let manager = manager_for(&workspace.path().join("cache"), &server.uri());

    let err = manager
        .provision(
            &ProvisionRequest::new("18", workspace.path().join("enterprise")).with_token("TOK123"),
        )
        .await
        .unwrap_err();

    // The page was fetched with the right token and platform_version (the
    // mock's expectations verify on drop), and the miss is a typed failure.
    assert_eq!(err.code(), ErrorCode::E0101);
}

#[tokio::test]
async fn missing_token_on_a_cache_miss_is_a_config_error() {
    let workspace = TempDir::new().unwrap();
    let manager = manager_for(&workspace.path().join("cache"), "http://127.0.0.1:1");

    let err = manager
        .provision(&ProvisionRequest::new("18", workspace.path().join("enterprise")))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::E0601);
    assert!(err.to_string().contains("token"));
}

#[tokio::test]
async fn provisioned_tree_reports_its_addons_layout() {
    let workspace = TempDir::new().unwrap();
    let cache = ArchiveCache::new(workspace.path().join("cache"));
    let version = OdooVersion::parse("17");
    let body = archive_bytes(&[
        ("enterprise/account_reports/__manifest__.py", "{}"),
        ("enterprise/account_reports/models.py", "pass"),
    ]);
    cache.write(&version, &mut body.as_slice()).unwrap();

    let manager = manager_for(cache.root(), "http://127.0.0.1:1");
    let dest = workspace.path().join("enterprise");
    let outcome = manager
        .provision(&ProvisionRequest::new("17", &dest))
        .await
        .unwrap();

    assert_eq!(outcome.layout, AddonsLayout::FlatModules);
    assert!(dest.join("account_reports/__manifest__.py").is_file());
}

#[tokio::test]
async fn fresh_download_that_fails_to_parse_is_not_kept_in_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/broken"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/octet-stream")
                .set_body_bytes(b"truncated garbage".to_vec()),
        )
        .mount(&server)
        .await;

    let workspace = TempDir::new().unwrap();
    let cache = ArchiveCache::new(workspace.path().join("cache"));
    let manager = manager_for(cache.root(), &server.uri());
    let version = OdooVersion::parse("18");
    let dest = workspace.path().join("enterprise");

    let url = Url::parse(&format!("{}/download/broken", server.uri())).unwrap();
    manager
        .download_into_cache(&url, &version, &dest)
        .await
        .unwrap();
    assert!(cache.contains(&version));

    // The cached garbage fails extraction; the corrupt-entry rule applies to
    // it just like to a stale entry, and the slow path runs against the mock
    // (whose thanks page does not exist, so resolution fails with a 404).
    let err = manager
        .provision(&ProvisionRequest::new("18", &dest).with_token("TOK"))
        .await
        .unwrap_err();
    assert!(!cache.contains(&version));
    let _ = err;
}
