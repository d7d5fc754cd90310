//! The ordered defaulting cascade.
//!
//! Resolution is a fixed, ordered table of pure rules. Each rule takes the
//! configuration produced by the previous one and returns a new configuration;
//! none of them perform I/O.
//!
//! # Cascade
//!
//! ```text
//! PartialConfig (user input)
//!        │
//!        ▼
//! ┌──────────────────────────────────────┐
//! │ 1. normalize_model_alias             │  "default" → llama-text-embed-v2
//! │ 2. apply_model_capabilities          │  model data (infer)
//! ├──────────────────────────────────────┤
//! │ 3. default_topology                  │  generic defaults (fill)
//! │ 4. default_vector_type               │
//! │ 5. default_cloud                     │
//! │ 6. default_region                    │
//! │ 7. default_pod_sizing                │
//! │ 8. default_dimension                 │
//! │ 9. default_sparse_metric             │
//! │ 10. default_metric                   │
//! │ 11. default_deletion_protection      │
//! └──────────────────────────────────────┘
//!        │
//!        ▼
//! ResolvedConfig
//! ```
//!
//! # Precedence
//!
//! Rules never write a field the user supplied. Beyond that, precedence between
//! model data and generic defaults is carried by the write primitive, not by
//! table position: model-driven rules use [`Field::infer`], which may replace an
//! inferred value, while every generic default uses [`Field::fill`], which only
//! writes absent fields. A generic rule placed anywhere in the table can
//! therefore never undo a value a matched model supplied.
//!
//! The one ordering dependency left is deliberate: `default_topology` checks
//! whether a topology flag is *currently* true, so a serverless flag forced by
//! an embedding model counts as already chosen.
use std::collections::BTreeMap;

use tracing::debug;

use crate::field::Field;
use crate::topology::{classify, Topology};
use crate::types::{DeletionProtection, Metric, ModelDescriptor, PartialConfig, VectorKind};

/// Canonical model behind the `default` / `dense` aliases.
pub const DEFAULT_DENSE_MODEL: &str = "llama-text-embed-v2";
/// Canonical model behind the `sparse` aliases.
pub const DEFAULT_SPARSE_MODEL: &str = "pinecone-sparse-english-v0";

pub const DEFAULT_CLOUD: &str = "aws";
pub const DEFAULT_POD_TYPE: &str = "p1.x1";
pub const DEFAULT_POD_ENVIRONMENT: &str = "us-east-1-aws";
pub const DEFAULT_SHARDS: u32 = 1;
pub const DEFAULT_REPLICAS: u32 = 1;
pub const DEFAULT_DIMENSION: u32 = 1024;

/// Field map wired into every integrated-embedding index.
pub const INTEGRATED_TEXT_FIELD: &str = "text";
pub const READ_INPUT_TYPE: &str = "query";
pub const WRITE_INPUT_TYPE: &str = "passage";
pub const TRUNCATE_MODE: &str = "END";

const DENSE_ALIASES: &[&str] = &["default", "dense", "default-dense"];
const SPARSE_ALIASES: &[&str] = &["sparse", "default-sparse"];

/// A pure cascade step.
pub(crate) type RuleFn = fn(PartialConfig, &[ModelDescriptor]) -> PartialConfig;

/// A named cascade step. The name is surfaced in trace output.
pub(crate) struct Rule {
    pub(crate) name: &'static str,
    pub(crate) apply: RuleFn,
}

/// The cascade, in application order.
pub(crate) const CASCADE: &[Rule] = &[
    Rule {
        name: "normalize_model_alias",
        apply: normalize_model_alias,
    },
    Rule {
        name: "apply_model_capabilities",
        apply: apply_model_capabilities,
    },
    Rule {
        name: "default_topology",
        apply: default_topology,
    },
    Rule {
        name: "default_vector_type",
        apply: default_vector_type,
    },
    Rule {
        name: "default_cloud",
        apply: default_cloud,
    },
    Rule {
        name: "default_region",
        apply: default_region,
    },
    Rule {
        name: "default_pod_sizing",
        apply: default_pod_sizing,
    },
    Rule {
        name: "default_dimension",
        apply: default_dimension,
    },
    Rule {
        name: "default_sparse_metric",
        apply: default_sparse_metric,
    },
    Rule {
        name: "default_metric",
        apply: default_metric,
    },
    Rule {
        name: "default_deletion_protection",
        apply: default_deletion_protection,
    },
];

/// Maps a cloud provider to its default serverless region.
///
/// Returns `None` for clouds outside the fixed set; no region is inferred for them.
///
/// ```rust
/// use resolve::default_region_for;
///
/// assert_eq!(default_region_for("gcp"), Some("us-central1"));
/// assert_eq!(default_region_for("oracle"), None);
/// ```
pub fn default_region_for(cloud: &str) -> Option<&'static str> {
    match cloud {
        "aws" => Some("us-east-1"),
        "gcp" => Some("us-central1"),
        "azure" => Some("eastus2"),
        _ => None,
    }
}

/// Looks a model up by exact name. Catalog order does not matter.
pub(crate) fn find_model<'m>(
    models: &'m [ModelDescriptor],
    name: &str,
) -> Option<&'m ModelDescriptor> {
    models.iter().find(|m| m.model == name)
}

/// Step 1. Precondition: `model` is set to a recognised alias.
///
/// Rewrites the alias to its canonical model name, keeping the field's
/// provenance, but only when the canonical model is present in the catalog.
/// Without catalog data the alias is left alone and simply matches nothing in
/// step 2.
fn normalize_model_alias(mut cfg: PartialConfig, models: &[ModelDescriptor]) -> PartialConfig {
    let canonical = match cfg.model.value().map(String::as_str) {
        Some(alias) if DENSE_ALIASES.contains(&alias) => DEFAULT_DENSE_MODEL,
        Some(alias) if SPARSE_ALIASES.contains(&alias) => DEFAULT_SPARSE_MODEL,
        _ => return cfg,
    };

    if find_model(models, canonical).is_some() {
        debug!(
            rule = "normalize_model_alias",
            model = canonical,
            "model alias rewritten"
        );
        cfg.model.rewrite(canonical.to_string());
    }
    cfg
}

/// Step 2. Precondition: `model` names a catalog entry.
///
/// Copies capability data from the matched descriptor. Writes use
/// [`Field::infer`], so they replace absent or inferred values and leave
/// user-supplied ones untouched.
///
/// - embedding models force `serverless = true`
/// - `vector_type` from the descriptor
/// - `dimension` from the descriptor's default, when positive
/// - `metric` follows the vector type (dense → cosine, sparse → dotproduct),
///   or the first supported metric when the descriptor excludes that one
/// - embedding models wire `field_map` and the read/write parameters
fn apply_model_capabilities(mut cfg: PartialConfig, models: &[ModelDescriptor]) -> PartialConfig {
    let Some(descriptor) = cfg.model.value().and_then(|name| find_model(models, name)) else {
        return cfg;
    };
    let embedding = descriptor.is_embedding();

    if embedding {
        cfg.serverless.infer(true);
    }

    let kind = descriptor.vector_kind();
    if let Some(kind) = kind {
        cfg.vector_type.infer(kind);
    }

    if let Some(dimension) = descriptor.default_dimension.filter(|d| *d > 0) {
        cfg.dimension.infer(dimension);
    }

    if let Some(kind) = kind {
        cfg.metric
            .infer(metric_for_model(kind, &descriptor.supported_metrics()));
    }

    if embedding {
        cfg.field_map.infer(BTreeMap::from([(
            INTEGRATED_TEXT_FIELD.to_string(),
            INTEGRATED_TEXT_FIELD.to_string(),
        )]));
        cfg.read_parameters.infer(input_parameters(READ_INPUT_TYPE));
        cfg.write_parameters.infer(input_parameters(WRITE_INPUT_TYPE));
    }

    debug!(
        rule = "apply_model_capabilities",
        model = %descriptor.model,
        embedding,
        vector_type = ?kind,
        default_dimension = ?descriptor.default_dimension,
        "model capabilities applied"
    );
    cfg
}

fn metric_for_model(kind: VectorKind, supported: &[Metric]) -> Metric {
    let preferred = match kind {
        VectorKind::Dense => Metric::Cosine,
        VectorKind::Sparse => Metric::Dotproduct,
    };
    match supported.first() {
        Some(first) if !supported.contains(&preferred) => *first,
        _ => preferred,
    }
}

fn input_parameters(input_type: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("input_type".to_string(), input_type.to_string()),
        ("truncate".to_string(), TRUNCATE_MODE.to_string()),
    ])
}

/// Step 3. Precondition: neither topology flag is currently true.
///
/// Checks presence after step 2, so a model-forced serverless flag counts as a
/// choice. An explicit `serverless = false` is never flipped; that request
/// stays undetermined and is rejected by the caller.
fn default_topology(mut cfg: PartialConfig, _: &[ModelDescriptor]) -> PartialConfig {
    if !cfg.serverless.is_true() && !cfg.pod.is_true() && cfg.serverless.fill(true) {
        debug!(rule = "default_topology", "serverless inferred");
    }
    cfg
}

/// Step 4. Precondition: `vector_type` absent.
fn default_vector_type(mut cfg: PartialConfig, _: &[ModelDescriptor]) -> PartialConfig {
    if cfg.vector_type.fill(VectorKind::Dense) {
        debug!(rule = "default_vector_type", vector_type = "dense", "field inferred");
    }
    cfg
}

/// Step 5. Precondition: serverless topology and `cloud` absent.
fn default_cloud(mut cfg: PartialConfig, _: &[ModelDescriptor]) -> PartialConfig {
    if classify(&cfg).is_serverless() && cfg.cloud.fill(DEFAULT_CLOUD.to_string()) {
        debug!(rule = "default_cloud", cloud = DEFAULT_CLOUD, "field inferred");
    }
    cfg
}

/// Step 6. Precondition: `cloud` set to a known provider and `region` absent.
fn default_region(mut cfg: PartialConfig, _: &[ModelDescriptor]) -> PartialConfig {
    let region = cfg
        .cloud
        .value()
        .and_then(|cloud| default_region_for(cloud));
    if let Some(region) = region {
        if cfg.region.fill(region.to_string()) {
            debug!(rule = "default_region", region, "field inferred");
        }
    }
    cfg
}

/// Step 7. Precondition: pod topology.
///
/// Fills pod type, legacy environment, shards and replicas. An explicit zero
/// shard or replica count is a user value and stays as given.
fn default_pod_sizing(mut cfg: PartialConfig, _: &[ModelDescriptor]) -> PartialConfig {
    if classify(&cfg) != Topology::Pod {
        return cfg;
    }
    let pod_type = cfg.pod_type.fill(DEFAULT_POD_TYPE.to_string());
    let environment = cfg.environment.fill(DEFAULT_POD_ENVIRONMENT.to_string());
    let shards = cfg.shards.fill(DEFAULT_SHARDS);
    let replicas = cfg.replicas.fill(DEFAULT_REPLICAS);
    debug!(
        rule = "default_pod_sizing",
        pod_type,
        environment,
        shards,
        replicas,
        "pod sizing defaults applied"
    );
    cfg
}

/// Step 8. Precondition: dense vectors and `dimension` absent.
fn default_dimension(mut cfg: PartialConfig, _: &[ModelDescriptor]) -> PartialConfig {
    if cfg.vector_type.value() == Some(&VectorKind::Dense)
        && cfg.dimension.fill(DEFAULT_DIMENSION)
    {
        debug!(
            rule = "default_dimension",
            dimension = DEFAULT_DIMENSION,
            "field inferred"
        );
    }
    cfg
}

/// Step 9. Precondition: sparse vectors and `metric` absent.
fn default_sparse_metric(mut cfg: PartialConfig, _: &[ModelDescriptor]) -> PartialConfig {
    if cfg.vector_type.value() == Some(&VectorKind::Sparse) && cfg.metric.fill(Metric::Dotproduct)
    {
        debug!(rule = "default_sparse_metric", metric = "dotproduct", "field inferred");
    }
    cfg
}

/// Step 10. Precondition: `metric` still absent.
fn default_metric(mut cfg: PartialConfig, _: &[ModelDescriptor]) -> PartialConfig {
    if cfg.metric.fill(Metric::Cosine) {
        debug!(rule = "default_metric", metric = "cosine", "field inferred");
    }
    cfg
}

/// Step 11. Precondition: `deletion_protection` absent.
fn default_deletion_protection(mut cfg: PartialConfig, _: &[ModelDescriptor]) -> PartialConfig {
    if cfg.deletion_protection.fill(DeletionProtection::Disabled) {
        debug!(
            rule = "default_deletion_protection",
            deletion_protection = "disabled",
            "field inferred"
        );
    }
    cfg
}
