//! Core types for taxonomy hierarchies.
//!
//! Provides the child → parents edge index ([`graph::EdgeIndex`]), label tables
//! with raw-id fallback ([`labels::LabelTable`]), configuration loading, and the
//! CSV/tab-delimited table layer that feeds the resolvers in `taxo-nav`.

pub mod config;
pub mod graph;
pub mod labels;
pub mod tables;
