//! `odsrc fetch` - acquire an Odoo source tree.

use super::{Edition, FetchArgs};
use crate::render::ProgressRenderer;
use odsrc_cache::ArchiveCache;
use odsrc_enterprise::{AddonsLayout, EnterpriseManager, ProvisionRequest};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

pub async fn run(args: FetchArgs, quiet: bool) -> anyhow::Result<ExitCode> {
    // A pre-downloaded tree skips acquisition entirely; only the layout is
    // probed so the caller knows what to mount.
    if let Some(ref addons_path) = args.addons_path {
        if !addons_path.is_dir() {
            eprintln!(
                "addons path '{}' does not exist or is not a directory",
                addons_path.display()
            );
            return Ok(ExitCode::FAILURE);
        }
        let layout = AddonsLayout::probe(addons_path);
        println!(
            "Using existing source tree at {} ({layout})",
            addons_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    if args.edition == Edition::Community {
        println!(
            "Community edition needs no source download; the official odoo:{} image ships it.",
            odsrc_core::OdooVersion::parse(args.version)
        );
        return Ok(ExitCode::SUCCESS);
    }

    let cache = args
        .cache_dir
        .map_or_else(ArchiveCache::at_default_root, ArchiveCache::new);
    info!(cache_root = %cache.root().display(), "using archive cache");

    let renderer = Arc::new(ProgressRenderer::new(!quiet));
    let manager = match EnterpriseManager::builder()
        .cache(cache)
        .observer(renderer.clone())
        .build()
    {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("{}", e.display_with_suggestions());
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut request = ProvisionRequest::new(args.version, args.dest);
    if let Some(token) = args.token {
        request = request.with_token(token);
    }

    match manager.provision(&request).await {
        Ok(outcome) => {
            renderer.clear();
            let source = if outcome.from_cache {
                "from cache"
            } else {
                "downloaded"
            };
            println!(
                "Odoo Enterprise {} ready in {} ({source}, {} files)",
                outcome.version,
                outcome.dest.display(),
                outcome.files_extracted
            );
            match outcome.layout.addons_dir() {
                Some(dir) => println!("Addons directory: {}", outcome.dest.join(dir).display()),
                None => println!("Warning: no addons directory found in the extracted tree"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            renderer.clear();
            eprintln!("{}", e.display_with_suggestions());
            Ok(ExitCode::FAILURE)
        }
    }
}
