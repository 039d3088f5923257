/// Source analysis stages: extraction, graph, cycles, metrics, patterns,
/// insight generation
pub mod cycles;
pub mod declarations;
pub mod extractor;
pub mod graph;
pub mod insights;
pub mod metrics;
pub mod patterns;

// Re-export commonly used types
pub use cycles::{detect_cycles, Cycle};
pub use declarations::{Declaration, DeclarationKind, FileStats, Issue, Severity, Visibility};
pub use extractor::{extract_from_source, FileExtraction};
pub use graph::{build_graph, DependencyEdge, DependencyGraph, DependencyNode, EdgeKind};
pub use insights::{EffortEstimate, Insight, Recommendation};
pub use metrics::{calculate_metrics, CodeMetrics};
pub use patterns::{PatternDetector, PatternKind, PatternMatch, PatternRegistry};
