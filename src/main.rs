//! indexcfg - resolve a partial index request and print the result as JSON.
//!
//! ```text
//! indexcfg [CONFIG.yaml] [--refresh] [--json-logs]
//! ```
//!
//! Without a path, `INDEXCFG_CONFIG` is consulted; without either, an empty
//! request is resolved. Logs go to stderr, filtered by `RUST_LOG` (default
//! `info`).

use std::env;

use anyhow::Context;
use indexcfg::{HttpModelCatalog, IndexcfgConfig, ModelCache, prepare_index};
use tracing_subscriber::EnvFilter;

const ENV_CONFIG_PATH: &str = "INDEXCFG_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut path = None;
    let mut refresh = false;
    let mut json_logs = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--refresh" => refresh = true,
            "--json-logs" => json_logs = true,
            flag if flag.starts_with("--") => anyhow::bail!("unknown flag: {flag}"),
            other => path = Some(other.to_string()),
        }
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let file = match path.or_else(|| env::var(ENV_CONFIG_PATH).ok()) {
        Some(path) => IndexcfgConfig::from_file(&path)
            .with_context(|| format!("loading config from {path}"))?,
        None => IndexcfgConfig::default(),
    };

    let catalog_cfg = file.catalog_config();
    let catalog = HttpModelCatalog::new(&catalog_cfg).context("building model catalog client")?;
    let cache = ModelCache::new(&catalog_cfg.cache_dir, catalog_cfg.cache_ttl());
    let use_cache = catalog_cfg.use_cache && !refresh;

    let prepared = prepare_index(file.index, &catalog, &cache, use_cache).await?;

    for warning in &prepared.warnings {
        tracing::warn!("{warning}");
    }
    for note in prepared.inference_notes() {
        tracing::info!("{note}");
    }

    println!("{}", serde_json::to_string_pretty(&prepared)?);
    Ok(())
}
