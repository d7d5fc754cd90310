//! indexcfg Resolve Layer
//!
//! This is where a half-specified index request becomes a complete one. We take
//! whatever subset of settings the user supplied, plus the embedding-model
//! catalog, and fill every gap with a default, remembering which values were
//! chosen by the user and which were filled in.
//!
//! ## What we do here
//!
//! - **Track provenance** - Every setting is a [`Field`]: absent, explicit, or
//!   inferred. User values are never overwritten.
//! - **Apply model capabilities** - A recognised embedding model drives vector
//!   type, dimension, metric and the integrated-embedding wiring.
//! - **Apply generic defaults** - Topology, cloud, region, pod sizing,
//!   dimension, metric, deletion protection.
//! - **Classify topology** - Serverless, pod, or integrated, always derived from
//!   the fields and never cached.
//! - **Log every inference** - Structured logs via tracing.
//!
//! The engine does no I/O and cannot fail. Fetching the catalog is the caller's
//! job; pass an empty slice when it is unavailable and resolution degrades to
//! capability-independent defaults.
//!
//! ## Main entry point
//!
//! Call [`resolve`] with a [`PartialConfig`] and the catalog, get back a
//! [`ResolvedConfig`].
//!
//! ## Example
//!
//! ```
//! use resolve::{resolve, Field, Metric, PartialConfig, Topology, VectorKind};
//!
//! let partial = PartialConfig {
//!     name: Field::Explicit("docs".into()),
//!     cloud: Field::Explicit("gcp".into()),
//!     ..Default::default()
//! };
//!
//! let resolved = resolve(partial, &[]);
//!
//! assert_eq!(resolved.topology(), Topology::Serverless);
//! assert_eq!(resolved.fields().region.value().map(String::as_str), Some("us-central1"));
//! assert!(resolved.fields().region.is_inferred());
//! assert_eq!(resolved.fields().vector_type.value(), Some(&VectorKind::Dense));
//! assert_eq!(resolved.fields().metric.value(), Some(&Metric::Cosine));
//! ```
use std::time::Instant;

use serde::Serialize;
use tracing::{info, Level};

mod error;
mod field;
mod rules;
mod topology;
mod types;

use crate::rules::CASCADE;

pub use crate::error::ResolveError;
pub use crate::field::Field;
pub use crate::rules::{
    default_region_for, DEFAULT_CLOUD, DEFAULT_DENSE_MODEL, DEFAULT_DIMENSION,
    DEFAULT_POD_ENVIRONMENT, DEFAULT_POD_TYPE, DEFAULT_REPLICAS, DEFAULT_SHARDS,
    DEFAULT_SPARSE_MODEL,
};
pub use crate::topology::{classify, Topology};
pub use crate::types::{DeletionProtection, Metric, ModelDescriptor, PartialConfig, VectorKind};

/// A fully resolved configuration.
///
/// Only [`resolve`] constructs one. The wrapped fields keep their provenance;
/// the topology is recomputed on every call to [`ResolvedConfig::topology`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedConfig {
    fields: PartialConfig,
}

impl ResolvedConfig {
    /// Read access to the resolved fields.
    pub fn fields(&self) -> &PartialConfig {
        &self.fields
    }

    pub fn into_fields(self) -> PartialConfig {
        self.fields
    }

    /// Derived topology. Never stored.
    pub fn topology(&self) -> Topology {
        classify(&self.fields)
    }

    /// The topology, or an error naming the conflicting flags.
    ///
    /// ```rust
    /// use resolve::{resolve, Field, PartialConfig, ResolveError};
    ///
    /// let both = PartialConfig {
    ///     serverless: Field::Explicit(true),
    ///     pod: Field::Explicit(true),
    ///     ..Default::default()
    /// };
    /// let err = resolve(both, &[]).require_topology().unwrap_err();
    /// assert!(matches!(err, ResolveError::AmbiguousTopology { serverless: true, pod: true }));
    /// ```
    pub fn require_topology(&self) -> Result<Topology, ResolveError> {
        match self.topology() {
            Topology::Undetermined => Err(ResolveError::AmbiguousTopology {
                serverless: self.fields.serverless.is_true(),
                pod: self.fields.pod.is_true(),
            }),
            topology => Ok(topology),
        }
    }

    /// The same values with every set field tagged explicit.
    ///
    /// `resolve(r.as_partial(), m) == r` for any `r = resolve(p, m)`.
    pub fn as_partial(&self) -> PartialConfig {
        self.fields.clone().into_explicit()
    }

    /// Name/value pairs of the fields the engine filled in.
    pub fn inferred_fields(&self) -> Vec<(&'static str, String)> {
        self.fields.inferred_fields()
    }
}

/// Resolves a partial configuration against the embedding-model catalog.
///
/// Applies the cascade in order. Pure and deterministic: no I/O, and the order
/// of `models` only matters through exact name matches.
pub fn resolve(partial: PartialConfig, models: &[ModelDescriptor]) -> ResolvedConfig {
    let start = Instant::now();
    let span = tracing::span!(
        Level::INFO,
        "resolve.resolve",
        model = ?partial.model.value(),
        catalog_size = models.len()
    );
    let _guard = span.enter();

    let fields = CASCADE
        .iter()
        .fold(partial, |cfg, rule| {
            tracing::trace!(rule = rule.name, "applying rule");
            (rule.apply)(cfg, models)
        });

    let resolved = ResolvedConfig { fields };
    let elapsed_micros = start.elapsed().as_micros();
    info!(
        topology = %resolved.topology(),
        inferred = resolved.inferred_fields().len(),
        elapsed_micros,
        "resolve_success"
    );
    resolved
}
