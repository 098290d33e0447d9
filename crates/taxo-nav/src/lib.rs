//! Resolvers over a taxonomy edge index.
//!
//! Provides depth resolution (maximum distance from a root), exhaustive upward
//! path enumeration, label-based path rendering, acyclicity checks, and the
//! summary statistics reported after a run.

pub mod cycles;
pub mod depth;
pub mod format;
pub mod paths;
pub mod stats;

/// Which resolver observed a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleSource {
    Depth,
    Paths,
}

/// A cycle encountered and contained during resolution.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CycleDiagnostic {
    /// Node that was reached again while already on the active path.
    pub node: String,
    /// Child whose parent edge closed the cycle.
    pub via: String,
    /// Top-level node being resolved when the cycle was found.
    pub query: String,
    pub source: CycleSource,
}
