//! Core data model types for the resolve crate.
//!
//! # Type Hierarchy
//!
//! ```text
//! PartialConfig                         (user input, every field a Field<T>)
//! ├── name, serverless, pod
//! ├── vector_type: Field<VectorKind>
//! ├── cloud, region, source_collection
//! ├── environment, pod_type, shards, replicas, metadata_indexed
//! ├── model, field_map, read_parameters, write_parameters
//! ├── dimension, metric: Field<Metric>
//! ├── deletion_protection: Field<DeletionProtection>
//! └── tags
//!
//! ModelDescriptor                       (capability data, fetched remotely)
//!
//!         ↓ resolve()
//!
//! ResolvedConfig                        (same shape, provenance preserved)
//! ```
//!
//! Closed value sets ([`VectorKind`], [`Metric`], [`DeletionProtection`]) are
//! enums that serialize to their lower-case API spelling. Cloud and region stay
//! strings: an unrecognised cloud is preserved verbatim and simply gets no
//! region default.
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::field::Field;

/// Shape of the vectors stored in an index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VectorKind {
    Dense,
    Sparse,
}

impl VectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorKind::Dense => "dense",
            VectorKind::Sparse => "sparse",
        }
    }
}

impl fmt::Display for VectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VectorKind {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dense" => Ok(VectorKind::Dense),
            "sparse" => Ok(VectorKind::Sparse),
            _ => Err(ResolveError::InvalidValue {
                field: "vector_type",
                value: s.to_string(),
                expected: "dense, sparse",
            }),
        }
    }
}

/// Similarity metric used by the index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cosine,
    Euclidean,
    Dotproduct,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Cosine => "cosine",
            Metric::Euclidean => "euclidean",
            Metric::Dotproduct => "dotproduct",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = ResolveError;

    /// Case-insensitive; `_` and `-` separators are ignored so the catalog's
    /// `"DotProduct"` / `"dot_product"` spellings parse too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "cosine" => Ok(Metric::Cosine),
            "euclidean" => Ok(Metric::Euclidean),
            "dotproduct" => Ok(Metric::Dotproduct),
            _ => Err(ResolveError::InvalidValue {
                field: "metric",
                value: s.to_string(),
                expected: "cosine, euclidean, dotproduct",
            }),
        }
    }
}

/// Whether the index may be deleted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DeletionProtection {
    Enabled,
    Disabled,
}

impl DeletionProtection {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionProtection::Enabled => "enabled",
            DeletionProtection::Disabled => "disabled",
        }
    }
}

impl fmt::Display for DeletionProtection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeletionProtection {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enabled" => Ok(DeletionProtection::Enabled),
            "disabled" => Ok(DeletionProtection::Disabled),
            _ => Err(ResolveError::InvalidValue {
                field: "deletion_protection",
                value: s.to_string(),
                expected: "enabled, disabled",
            }),
        }
    }
}

/// Every resolvable index-creation setting, each tagged with its provenance.
///
/// Built once per invocation from user input. Fields the user did not supply
/// are [`Field::Absent`]; an explicit zero (e.g. `replicas: 0`) is
/// [`Field::Explicit`] and is preserved by resolution.
///
/// # Deserialization
///
/// Plain values become explicit fields and missing keys stay absent:
///
/// ```rust
/// use resolve::{PartialConfig, VectorKind};
///
/// let partial: PartialConfig = serde_json::from_str(
///     r#"{ "name": "docs", "cloud": "gcp", "vector_type": "sparse" }"#,
/// ).unwrap();
///
/// assert!(partial.cloud.is_explicit());
/// assert_eq!(partial.vector_type.value(), Some(&VectorKind::Sparse));
/// assert!(partial.region.is_absent());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PartialConfig {
    /// Index name. Never inferred.
    pub name: Field<String>,
    /// Serverless topology flag.
    pub serverless: Field<bool>,
    /// Pod (fixed-capacity) topology flag.
    pub pod: Field<bool>,
    pub vector_type: Field<VectorKind>,
    pub cloud: Field<String>,
    pub region: Field<String>,
    /// Collection to seed a pod index from.
    pub source_collection: Field<String>,
    /// Legacy region-qualified environment string for pod indexes.
    pub environment: Field<String>,
    pub pod_type: Field<String>,
    pub shards: Field<u32>,
    pub replicas: Field<u32>,
    /// Metadata fields to index on a pod index.
    pub metadata_indexed: Field<Vec<String>>,
    /// Embedding model name or alias (`"default"`, `"sparse"`, ...).
    pub model: Field<String>,
    /// Record field → model input mapping for integrated indexes.
    pub field_map: Field<BTreeMap<String, String>>,
    pub read_parameters: Field<BTreeMap<String, String>>,
    pub write_parameters: Field<BTreeMap<String, String>>,
    pub dimension: Field<u32>,
    pub metric: Field<Metric>,
    pub deletion_protection: Field<DeletionProtection>,
    pub tags: Field<BTreeMap<String, String>>,
}

impl PartialConfig {
    /// Re-tags every set field as explicit.
    ///
    /// Resolving the result again yields the same values, which is what makes
    /// resolution idempotent.
    pub fn into_explicit(self) -> Self {
        Self {
            name: self.name.into_explicit(),
            serverless: self.serverless.into_explicit(),
            pod: self.pod.into_explicit(),
            vector_type: self.vector_type.into_explicit(),
            cloud: self.cloud.into_explicit(),
            region: self.region.into_explicit(),
            source_collection: self.source_collection.into_explicit(),
            environment: self.environment.into_explicit(),
            pod_type: self.pod_type.into_explicit(),
            shards: self.shards.into_explicit(),
            replicas: self.replicas.into_explicit(),
            metadata_indexed: self.metadata_indexed.into_explicit(),
            model: self.model.into_explicit(),
            field_map: self.field_map.into_explicit(),
            read_parameters: self.read_parameters.into_explicit(),
            write_parameters: self.write_parameters.into_explicit(),
            dimension: self.dimension.into_explicit(),
            metric: self.metric.into_explicit(),
            deletion_protection: self.deletion_protection.into_explicit(),
            tags: self.tags.into_explicit(),
        }
    }

    /// Name/value pairs for every field the engine inferred, in declaration order.
    ///
    /// Values are rendered as compact JSON text (`"us-east-1"` → `us-east-1`,
    /// maps as JSON objects) for use in provenance messages.
    pub fn inferred_fields(&self) -> Vec<(&'static str, String)> {
        fn push<T: Serialize>(
            out: &mut Vec<(&'static str, String)>,
            name: &'static str,
            field: &Field<T>,
        ) {
            if let Field::Inferred(value) = field {
                let rendered = match serde_json::to_value(value) {
                    Ok(serde_json::Value::String(s)) => s,
                    Ok(other) => other.to_string(),
                    Err(_) => String::new(),
                };
                out.push((name, rendered));
            }
        }

        let mut out = Vec::new();
        push(&mut out, "name", &self.name);
        push(&mut out, "serverless", &self.serverless);
        push(&mut out, "pod", &self.pod);
        push(&mut out, "vector_type", &self.vector_type);
        push(&mut out, "cloud", &self.cloud);
        push(&mut out, "region", &self.region);
        push(&mut out, "source_collection", &self.source_collection);
        push(&mut out, "environment", &self.environment);
        push(&mut out, "pod_type", &self.pod_type);
        push(&mut out, "shards", &self.shards);
        push(&mut out, "replicas", &self.replicas);
        push(&mut out, "metadata_indexed", &self.metadata_indexed);
        push(&mut out, "model", &self.model);
        push(&mut out, "field_map", &self.field_map);
        push(&mut out, "read_parameters", &self.read_parameters);
        push(&mut out, "write_parameters", &self.write_parameters);
        push(&mut out, "dimension", &self.dimension);
        push(&mut out, "metric", &self.metric);
        push(&mut out, "deletion_protection", &self.deletion_protection);
        push(&mut out, "tags", &self.tags);
        out
    }
}

/// Capability metadata for one hosted embedding model.
///
/// Mirrors the entries of the remote "list models" response. Only `model` and
/// `type` are required; everything else is optional so a sparse catalog entry
/// still deserializes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Canonical model name, e.g. `llama-text-embed-v2`.
    pub model: String,
    /// Model type; `"embed"` for embedding models.
    #[serde(rename = "type")]
    pub kind: String,
    /// `"dense"` or `"sparse"` when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_dimension: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_dimensions: Vec<u32>,
    /// Metric names as reported by the catalog (spelling varies).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_metrics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sequence_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_batch_size: Option<u32>,
}

impl ModelDescriptor {
    pub fn is_embedding(&self) -> bool {
        self.kind.eq_ignore_ascii_case("embed")
    }

    /// The reported vector type, if it parses.
    pub fn vector_kind(&self) -> Option<VectorKind> {
        self.vector_type.as_deref().and_then(|v| v.parse().ok())
    }

    /// Supported metrics that parse, in catalog order. Unknown names are skipped.
    pub fn supported_metrics(&self) -> Vec<Metric> {
        self.supported_metrics
            .iter()
            .filter_map(|m| m.parse().ok())
            .collect()
    }
}
