//! Workspace umbrella crate for indexcfg.
//!
//! This crate stitches the model catalog and the resolver together so callers
//! can go from a half-specified index request to a validated, fully populated
//! configuration with a single call:
//!
//! ```text
//! PartialConfig ──▶ fetch_models (cache / remote) ──▶ resolve ──▶ require_topology ──▶ PreparedIndex
//!                        │ failure
//!                        └──▶ warn + empty catalog (generic defaults only)
//! ```
//!
//! The building blocks stay available individually through the re-exports.

pub mod config;

pub use catalog::{
    CatalogConfig, CatalogError, Clock, HttpModelCatalog, MODELS_CACHE_KEY, MODELS_CACHE_TTL,
    ModelCache, ModelCatalog, fetch_models,
};
pub use config::{ConfigLoadError, IndexcfgConfig};
pub use resolve::{
    DeletionProtection, Field, Metric, ModelDescriptor, PartialConfig, ResolveError,
    ResolvedConfig, Topology, VectorKind, classify, default_region_for, resolve,
};

use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{Instrument, Level, info, warn};

/// Errors that stop [`prepare_index`] from producing a configuration.
///
/// A failed catalog fetch is not one of them; it degrades to generic defaults
/// and is reported through [`PreparedIndex::warnings`].
#[derive(Debug, Error)]
pub enum PrepareError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Config(#[from] ConfigLoadError),
}

/// Outcome of [`prepare_index`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedIndex {
    /// Resolved fields with provenance.
    pub config: ResolvedConfig,
    /// Determined topology; never [`Topology::Undetermined`].
    pub topology: Topology,
    /// `false` when the catalog could not be listed and defaults were generic.
    pub models_available: bool,
    /// Human-readable notes about degraded inputs.
    pub warnings: Vec<String>,
}

impl PreparedIndex {
    /// One line per inferred field, e.g. `region inferred as us-east-1`.
    pub fn inference_notes(&self) -> Vec<String> {
        self.config
            .inferred_fields()
            .into_iter()
            .map(|(name, value)| format!("{name} inferred as {value}"))
            .collect()
    }
}

/// Fetches the model catalog, resolves `partial` against it and checks that
/// the topology is determined.
///
/// A catalog failure is logged and resolution continues with an empty model
/// list. Conflicting `serverless`/`pod` flags are returned as
/// [`ResolveError::AmbiguousTopology`].
pub async fn prepare_index<C>(
    partial: PartialConfig,
    catalog: &C,
    cache: &ModelCache,
    use_cache: bool,
) -> Result<PreparedIndex, PrepareError>
where
    C: ModelCatalog + ?Sized,
{
    let start = Instant::now();
    let span = tracing::span!(Level::INFO, "indexcfg.prepare_index", use_cache);

    async move {
        let mut warnings = Vec::new();
        let (models, models_available) = match fetch_models(catalog, cache, use_cache).await {
            Ok(models) => (models, true),
            Err(err) => {
                warn!(error = %err, "catalog_unavailable_using_generic_defaults");
                warnings.push(format!(
                    "embedding model catalog unavailable ({err}); using generic defaults"
                ));
                (Vec::new(), false)
            }
        };

        let config = resolve(partial, &models);
        let topology = match config.require_topology() {
            Ok(topology) => topology,
            Err(err) => {
                warn!(
                    error = %err,
                    elapsed_micros = start.elapsed().as_micros() as u64,
                    "prepare_failure"
                );
                return Err(err.into());
            }
        };

        info!(
            %topology,
            models_available,
            elapsed_micros = start.elapsed().as_micros() as u64,
            "prepare_success"
        );
        Ok(PreparedIndex {
            config,
            topology,
            models_available,
            warnings,
        })
    }
    .instrument(span)
    .await
}

/// Loads an [`IndexcfgConfig`] file and runs [`prepare_index`] on its `index`
/// section with a catalog built from its `catalog` section.
pub async fn prepare_from_file(
    path: impl AsRef<std::path::Path>,
) -> Result<PreparedIndex, PrepareError> {
    let file = IndexcfgConfig::from_file(path)?;
    let catalog_cfg = file.catalog_config();
    let http = HttpModelCatalog::new(&catalog_cfg)
        .map_err(|err| ConfigLoadError::Validation(format!("catalog: {err}")))?;
    let cache = ModelCache::new(&catalog_cfg.cache_dir, catalog_cfg.cache_ttl());
    prepare_index(file.index, &http, &cache, catalog_cfg.use_cache).await
}
