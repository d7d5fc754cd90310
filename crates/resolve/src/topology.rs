//! Topology classification.
//!
//! The topology is always derived from the current field values and never
//! stored, so it cannot drift out of sync with the configuration it describes.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::PartialConfig;

/// High-level shape of the index to create.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// Serverless index without a hosted embedding model.
    Serverless,
    /// Fixed-capacity pod index.
    Pod,
    /// Serverless index wired to a hosted embedding model.
    Integrated,
    /// Both topology flags or neither; the caller must reject the request.
    Undetermined,
}

impl Topology {
    /// `true` for plain serverless and integrated indexes.
    pub fn is_serverless(&self) -> bool {
        matches!(self, Topology::Serverless | Topology::Integrated)
    }

    pub fn is_determined(&self) -> bool {
        !matches!(self, Topology::Undetermined)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Topology::Serverless => "serverless",
            Topology::Pod => "pod",
            Topology::Integrated => "integrated",
            Topology::Undetermined => "undetermined",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a configuration from its topology flags and model name.
pub fn classify(cfg: &PartialConfig) -> Topology {
    match (cfg.serverless.is_true(), cfg.pod.is_true()) {
        (true, false) if cfg.model.is_set() => Topology::Integrated,
        (true, false) => Topology::Serverless,
        (false, true) => Topology::Pod,
        _ => Topology::Undetermined,
    }
}
