//! Error types produced by the resolve crate.
//!
//! Resolution itself is total: [`resolve`](crate::resolve) never fails. Errors
//! only arise at the edges, when a caller parses user-supplied strings into the
//! closed value sets, or when it validates the derived topology before building
//! a create request.
//!
//! | Error | Raised by | Description |
//! |-------|-----------|-------------|
//! | [`InvalidValue`](ResolveError::InvalidValue) | `FromStr` impls | String outside a closed value set |
//! | [`AmbiguousTopology`](ResolveError::AmbiguousTopology) | [`ResolvedConfig::require_topology`](crate::ResolvedConfig::require_topology) | Both or neither of serverless/pod selected |
//!
//! # Examples
//!
//! ```rust
//! use resolve::{Metric, ResolveError};
//!
//! let err = "manhattan".parse::<Metric>().unwrap_err();
//! assert!(matches!(err, ResolveError::InvalidValue { field: "metric", .. }));
//! ```
use thiserror::Error;

/// Errors surfaced while parsing or validating index configuration.
///
/// The enum is `#[non_exhaustive]`; include a catch-all arm when matching.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolveError {
    /// A string did not name a member of a closed value set.
    #[error("invalid {field} value '{value}' (expected one of: {expected})")]
    InvalidValue {
        /// Name of the field being parsed.
        field: &'static str,
        /// The rejected input.
        value: String,
        /// Comma-separated accepted spellings.
        expected: &'static str,
    },

    /// The resolved flags select both topologies, or neither.
    ///
    /// The engine never guesses; the caller must reject the request.
    #[error("{}", ambiguous_topology_message(*serverless, *pod))]
    AmbiguousTopology {
        /// Resolved value of the serverless flag.
        serverless: bool,
        /// Resolved value of the pod flag.
        pod: bool,
    },
}

fn ambiguous_topology_message(serverless: bool, pod: bool) -> String {
    if serverless && pod {
        "conflicting topology: both --serverless and --pod are set; choose exactly one".to_string()
    } else {
        "undetermined topology: neither --serverless nor --pod is set; choose exactly one"
            .to_string()
    }
}
