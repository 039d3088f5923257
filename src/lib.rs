//! Structural source analysis core.
//!
//! `archlens` extracts declarations (classes, interfaces, structs and their
//! members) from C#-style source text, assembles them into a dependency
//! graph, computes code metrics, heuristically classifies design patterns
//! and synthesizes prioritized insights and recommendations. Downstream
//! consumers (prompt builders, exporters, editor UI) receive one immutable
//! [`AnalysisResult`] and never participate in parsing or graph work.
//!
//! Extraction is deliberately pattern-based, not a full grammar: declaration
//! headers are matched lexically and bodies carved out with balanced-brace
//! scanning. That recognizes common coding styles reliably without a
//! compiler front-end; everything downstream depends only on the
//! [`Declaration`](analysis::Declaration) model, so a real parser could be
//! swapped in without touching graph, metric or pattern code.

/// Source analysis stages and the declaration model
pub mod analysis;

/// Outward-facing analyzer façade and result snapshot
pub mod analyzer;

/// Thresholds and lookup tables, with env/JSON overrides
pub mod config;

/// Fatal error taxonomy
pub mod error;

// Re-export the surface most consumers need
pub use analysis::{
    CodeMetrics, Cycle, Declaration, DeclarationKind, DependencyGraph, EdgeKind, Insight, Issue,
    PatternKind, PatternMatch, Recommendation, Severity,
};
pub use analyzer::{
    AnalysisPhase, AnalysisResult, Analyzer, CancelFlag, PhaseTiming, ProgressUpdate,
};
pub use config::{load_config, AnalysisConfig};
pub use error::AnalysisError;
