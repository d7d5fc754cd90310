//! Lists the hosted embedding models, honouring the on-disk cache.
//!
//! ```text
//! INDEXCFG_API_KEY=pcsk_... cargo run -p indexcfg-catalog --example list_models [--refresh]
//! ```

use catalog::{fetch_models, CatalogConfig, HttpModelCatalog, ModelCache};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let refresh = std::env::args().any(|arg| arg == "--refresh");

    let cfg = CatalogConfig::from_env();
    let http = HttpModelCatalog::new(&cfg)?;
    let cache = ModelCache::new(&cfg.cache_dir, cfg.cache_ttl());

    let models = fetch_models(&http, &cache, cfg.use_cache && !refresh).await?;
    for model in &models {
        println!(
            "{:<32} {:<7} dim={:<6} metrics={}",
            model.model,
            model.vector_type.as_deref().unwrap_or("-"),
            model
                .default_dimension
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".into()),
            model.supported_metrics.join(",")
        );
    }
    println!("{} models (cache: {})", models.len(), cache.dir().display());
    Ok(())
}
