//! Outward-facing analysis entry points.
//!
//! One `Analyzer` holds immutable configuration; every invocation recomputes
//! its result from scratch and hands back an immutable snapshot. There is no
//! cross-invocation state and no persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::analysis::cycles::{detect_cycles, Cycle};
use crate::analysis::declarations::{Declaration, FileStats, Issue};
use crate::analysis::extractor::{
    collect_source_files, dedupe_declarations, extract_files, extract_from_source,
};
use crate::analysis::graph::{build_graph, DependencyGraph};
use crate::analysis::insights::{generate, Insight, Recommendation};
use crate::analysis::metrics::{calculate_metrics, CodeMetrics};
use crate::analysis::patterns::{PatternMatch, PatternRegistry};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

/// Discrete progress milestones of one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisPhase {
    Structure,
    Scripts,
    Assets,
    Architecture,
    Insights,
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisPhase::Structure => write!(f, "structure"),
            AnalysisPhase::Scripts => write!(f, "scripts"),
            AnalysisPhase::Assets => write!(f, "assets"),
            AnalysisPhase::Architecture => write!(f, "architecture"),
            AnalysisPhase::Insights => write!(f, "insights"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub phase: AnalysisPhase,
    pub detail: String,
}

/// Cooperative cancellation handle shared between the caller and a running
/// analysis. Raising it abandons remaining file scans; stages already
/// finished keep their results and the run returns with `incomplete = true`.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn inner(&self) -> Arc<AtomicBool> {
        self.0.clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTiming {
    pub phase: AnalysisPhase,
    pub millis: u64,
}

/// Immutable snapshot handed to downstream consumers.
///
/// Serialization of this snapshot (JSON, Markdown, ...) is entirely a
/// downstream concern; the core owns no persisted format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub declarations: Vec<Declaration>,
    pub graph: DependencyGraph,
    pub cycles: Vec<Cycle>,
    pub metrics: CodeMetrics,
    pub patterns: Vec<PatternMatch>,
    pub issues: Vec<Issue>,
    pub insights: Vec<Insight>,
    pub recommendations: Vec<Recommendation>,
    pub file_stats: Vec<FileStats>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub phase_timings: Vec<PhaseTiming>,
    pub success: bool,
    /// True when cancellation abandoned part of the file set
    pub incomplete: bool,
}

/// Analysis engine façade. Construct once with configuration, call per run.
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(AnalysisConfig::default())
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze every recognized source file under `root` (or `root` itself
    /// when it is a single file).
    ///
    /// Asynchronous and cancellable: the pipeline runs on the blocking pool,
    /// milestones are reported through `progress` (a dropped receiver is
    /// tolerated), and `cancel` abandons remaining file scans while still
    /// returning partial results. Only a nonexistent root is fatal.
    pub async fn analyze_root(
        &self,
        root: impl AsRef<Path>,
        progress: Option<UnboundedSender<ProgressUpdate>>,
        cancel: CancelFlag,
    ) -> Result<AnalysisResult, AnalysisError> {
        let root = root.as_ref().to_path_buf();
        if !root.exists() {
            return Err(AnalysisError::RootNotFound(root.display().to_string()));
        }
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || run_pipeline(&config, &root, progress, cancel))
            .await
            .map_err(|e| AnalysisError::TaskFailed(e.to_string()))
    }

    /// Analyze a single in-memory source unit. Synchronous; used by embedding
    /// hosts and tests that have no file system involvement.
    pub fn analyze_source(&self, file_id: &str, text: &str) -> AnalysisResult {
        let out = extract_from_source(file_id, text);
        let mut issues = out.issues;
        let declarations = dedupe_declarations(out.declarations, &mut issues);
        assemble(
            &self.config,
            declarations,
            vec![out.stats],
            issues,
            Utc::now(),
            Instant::now(),
            Vec::new(),
            false,
            &None,
        )
    }
}

fn send_progress(
    progress: &Option<UnboundedSender<ProgressUpdate>>,
    phase: AnalysisPhase,
    detail: impl Into<String>,
) {
    if let Some(tx) = progress {
        // A consumer that went away must never fail the analysis
        let _ = tx.send(ProgressUpdate {
            phase,
            detail: detail.into(),
        });
    }
}

fn run_pipeline(
    config: &AnalysisConfig,
    root: &Path,
    progress: Option<UnboundedSender<ProgressUpdate>>,
    cancel: CancelFlag,
) -> AnalysisResult {
    let started_at = Utc::now();
    let started = Instant::now();
    let mut phase_timings = Vec::new();
    let mut issues: Vec<Issue> = Vec::new();

    // Structure: enumerate the source tree
    send_progress(&progress, AnalysisPhase::Structure, "enumerating sources");
    let phase_start = Instant::now();
    let files = match collect_source_files(root, config) {
        Ok(files) => files,
        Err(e) => {
            warn!(root = %root.display(), error = %e, "source enumeration failed");
            issues.push(Issue::new(
                crate::analysis::declarations::Severity::Critical,
                "io",
                format!("source enumeration failed: {}", e),
                root.display().to_string(),
            ));
            Vec::new()
        }
    };
    phase_timings.push(PhaseTiming {
        phase: AnalysisPhase::Structure,
        millis: phase_start.elapsed().as_millis() as u64,
    });
    info!(files = files.len(), root = %root.display(), "source tree enumerated");

    // Scripts: per-file extraction, parallel, cancellable
    send_progress(
        &progress,
        AnalysisPhase::Scripts,
        format!("extracting {} files", files.len()),
    );
    let phase_start = Instant::now();
    let (extractions, skipped) = extract_files(&files, &cancel.inner());
    let incomplete = skipped > 0 || cancel.is_cancelled();
    if incomplete {
        warn!(skipped, "analysis cancelled; returning partial results");
    }
    let mut declarations = Vec::new();
    let mut file_stats = Vec::new();
    for extraction in extractions {
        declarations.extend(extraction.declarations);
        issues.extend(extraction.issues);
        file_stats.push(extraction.stats);
    }
    let declarations = dedupe_declarations(declarations, &mut issues);
    phase_timings.push(PhaseTiming {
        phase: AnalysisPhase::Scripts,
        millis: phase_start.elapsed().as_millis() as u64,
    });

    assemble(
        config,
        declarations,
        file_stats,
        issues,
        started_at,
        started,
        phase_timings,
        incomplete,
        &progress,
    )
}

/// Run the sequential downstream stages on the merged declaration snapshot
#[allow(clippy::too_many_arguments)]
fn assemble(
    config: &AnalysisConfig,
    declarations: Vec<Declaration>,
    file_stats: Vec<FileStats>,
    issues: Vec<Issue>,
    started_at: DateTime<Utc>,
    started: Instant,
    mut phase_timings: Vec<PhaseTiming>,
    incomplete: bool,
    progress: &Option<UnboundedSender<ProgressUpdate>>,
) -> AnalysisResult {
    // Assets: categorical aggregation over declarations and file stats
    send_progress(
        progress,
        AnalysisPhase::Assets,
        format!("aggregating {} declarations", declarations.len()),
    );
    let phase_start = Instant::now();
    let metrics = calculate_metrics(&declarations, &file_stats, config);
    phase_timings.push(PhaseTiming {
        phase: AnalysisPhase::Assets,
        millis: phase_start.elapsed().as_millis() as u64,
    });

    // Architecture: graph, cycles, pattern classification
    send_progress(progress, AnalysisPhase::Architecture, "building dependency graph");
    let phase_start = Instant::now();
    let graph = build_graph(&declarations, config);
    let cycles = detect_cycles(&graph);
    let patterns = PatternRegistry::standard().detect_all(&declarations);
    phase_timings.push(PhaseTiming {
        phase: AnalysisPhase::Architecture,
        millis: phase_start.elapsed().as_millis() as u64,
    });

    // Insights: rule-based synthesis over everything gathered so far
    send_progress(progress, AnalysisPhase::Insights, "generating insights");
    let phase_start = Instant::now();
    let (insights, recommendations) = generate(
        &declarations,
        &graph,
        &cycles,
        &metrics,
        &patterns,
        &file_stats,
        config,
    );
    phase_timings.push(PhaseTiming {
        phase: AnalysisPhase::Insights,
        millis: phase_start.elapsed().as_millis() as u64,
    });

    AnalysisResult {
        declarations,
        graph,
        cycles,
        metrics,
        patterns,
        issues,
        insights,
        recommendations,
        file_stats,
        started_at,
        duration_ms: started.elapsed().as_millis() as u64,
        phase_timings,
        success: true,
        incomplete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_source_produces_complete_snapshot() {
        let analyzer = Analyzer::with_defaults();
        let result = analyzer.analyze_source(
            "Game.cs",
            r#"
namespace Game
{
    public class Foo : IBar { public void Run() { } }
    public interface IBar { void Run(); }
}
"#,
        );
        assert!(result.success);
        assert!(!result.incomplete);
        assert_eq!(result.declarations.len(), 2);
        assert_eq!(result.graph.node_count(), 2);
        assert_eq!(result.graph.edge_count(), 1);
        assert!(result.cycles.is_empty());
        assert!(result.recommendations.is_empty());
        assert_eq!(result.phase_timings.len(), 3);
    }

    #[test]
    fn empty_source_set_is_all_zeros() {
        let analyzer = Analyzer::with_defaults();
        let result = analyzer.analyze_source("Empty.cs", "");
        assert!(result.declarations.is_empty());
        assert_eq!(result.graph.edge_count(), 0);
        assert!(result.cycles.is_empty());
        assert_eq!(result.metrics.comment_ratio, 0.0);
        assert_eq!(result.metrics.methods_per_class, 0.0);
    }
}
