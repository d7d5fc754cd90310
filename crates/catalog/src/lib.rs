//! indexcfg Model Catalog
//!
//! This crate answers one question for the resolver: which embedding models
//! exist, and what can they do? The answer comes from the control plane's
//! "list models" endpoint and is kept on disk for a day so repeated runs don't
//! pay for the round trip.
//!
//! ```text
//! fetch_models(catalog, cache, use_cache)
//!     │
//!     ├─ use_cache && fresh entry ──▶ cached Vec<ModelDescriptor>
//!     │
//!     └─ otherwise ──▶ catalog.list_models() ──▶ cache.put() ──▶ Vec<ModelDescriptor>
//! ```
//!
//! - [`ModelCatalog`] is the seam: [`HttpModelCatalog`] talks to the real
//!   service, tests plug in a canned list.
//! - [`ModelCache`] is a JSON-file TTL cache. Expired entries are deleted on
//!   read. Writes are atomic.
//! - Failures to *write* the cache are logged and swallowed. Failures to
//!   *fetch* are returned; callers decide whether to carry on with an empty
//!   catalog.
//!
//! ## Example
//!
//! ```no_run
//! use catalog::{fetch_models, CatalogConfig, HttpModelCatalog, ModelCache};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), catalog::CatalogError> {
//!     let cfg = CatalogConfig::from_env();
//!     let http = HttpModelCatalog::new(&cfg)?;
//!     let cache = ModelCache::new(&cfg.cache_dir, cfg.cache_ttl());
//!
//!     let models = fetch_models(&http, &cache, cfg.use_cache).await?;
//!     println!("{} embedding models", models.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Env vars to know
//!
//! - `INDEXCFG_API_URL` - Override the control-plane endpoint
//! - `INDEXCFG_API_KEY` - API key sent as `Api-Key`
//! - `INDEXCFG_CACHE_DIR` - Where the cache file lives
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{info, warn, Instrument, Level};

use resolve::ModelDescriptor;

pub mod config;
pub mod error;

mod api;
mod cache;
mod serde_secs;

pub use crate::api::HttpModelCatalog;
pub use crate::cache::{Clock, ModelCache};
pub use crate::config::CatalogConfig;
pub use crate::error::CatalogError;

/// Cache key under which the embedding-model listing is stored.
pub const MODELS_CACHE_KEY: &str = "embedding_models";

/// Default lifetime of a cached model listing.
pub const MODELS_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Something that can list the available embedding models.
#[async_trait]
pub trait ModelCatalog: Send + Sync {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, CatalogError>;
}

/// Returns the embedding-model listing, consulting the cache first.
///
/// With `use_cache` set, a fresh cache entry is returned without touching the
/// network. Otherwise (or on a miss) the catalog is queried and the result is
/// written back, so a forced refresh also refreshes the cache.
pub async fn fetch_models<C>(
    catalog: &C,
    cache: &ModelCache,
    use_cache: bool,
) -> Result<Vec<ModelDescriptor>, CatalogError>
where
    C: ModelCatalog + ?Sized,
{
    let start = Instant::now();
    let span = tracing::span!(Level::INFO, "catalog.fetch_models", use_cache);

    async move {
        if use_cache {
            if let Some(models) = cache.get::<Vec<ModelDescriptor>>(MODELS_CACHE_KEY) {
                info!(
                    source = "cache",
                    count = models.len(),
                    elapsed_micros = start.elapsed().as_micros() as u64,
                    "catalog_success"
                );
                return Ok(models);
            }
        }

        let models = match catalog.list_models().await {
            Ok(models) => models,
            Err(err) => {
                warn!(
                    error = %err,
                    elapsed_micros = start.elapsed().as_micros() as u64,
                    "catalog_failure"
                );
                return Err(err);
            }
        };

        if let Err(err) = cache.put(MODELS_CACHE_KEY, &models) {
            warn!(error = %err, dir = %cache.dir().display(), "catalog_cache_write_failed");
        }

        info!(
            source = "remote",
            count = models.len(),
            elapsed_micros = start.elapsed().as_micros() as u64,
            "catalog_success"
        );
        Ok(models)
    }
    .instrument(span)
    .await
}
