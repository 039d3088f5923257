//! Rule-based synthesis of findings and prioritized action items.
//!
//! Consumes the outputs of every other stage and emits [`Insight`] and
//! [`Recommendation`] records. All thresholds come from
//! [`AnalysisConfig`](crate::config::AnalysisConfig); effort estimates use a
//! three-point weighted average.

use serde::{Deserialize, Serialize};

use crate::analysis::cycles::Cycle;
use crate::analysis::declarations::{Declaration, FileStats, Severity};
use crate::analysis::graph::DependencyGraph;
use crate::analysis::metrics::CodeMetrics;
use crate::analysis::patterns::PatternMatch;
use crate::config::AnalysisConfig;

/// A derived, severity-classified observation about the analyzed source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub category: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    /// In [0, 1]
    pub confidence: f64,
    pub evidence: Vec<String>,
}

/// Three-point effort estimate in hours
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EffortEstimate {
    pub min_hours: f64,
    pub likely_hours: f64,
    pub max_hours: f64,
    /// 1 (trivial) to 10 (architectural)
    pub complexity_score: u8,
}

impl EffortEstimate {
    pub fn new(min_hours: f64, likely_hours: f64, max_hours: f64, complexity_score: u8) -> Self {
        Self {
            min_hours,
            likely_hours,
            max_hours,
            complexity_score,
        }
    }

    /// PERT weighted average: (min + 4*likely + max) / 6
    pub fn weighted_hours(&self) -> f64 {
        (self.min_hours + 4.0 * self.likely_hours + self.max_hours) / 6.0
    }
}

/// Prioritized, actionable suggestion derived from one or more insights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    /// 1 is most urgent
    pub priority: u8,
    pub title: String,
    pub rationale: String,
    pub steps: Vec<String>,
    pub effort: EffortEstimate,
    pub benefits: Vec<String>,
    pub risks: Vec<String>,
}

fn priority_for(severity: Severity) -> u8 {
    match severity {
        Severity::Critical => 1,
        Severity::Major => 2,
        Severity::Warning => 3,
        Severity::Info => 4,
    }
}

/// Generate insights and recommendations from the assembled analysis state
pub fn generate(
    declarations: &[Declaration],
    graph: &DependencyGraph,
    cycles: &[Cycle],
    metrics: &CodeMetrics,
    patterns: &[PatternMatch],
    file_stats: &[FileStats],
    config: &AnalysisConfig,
) -> (Vec<Insight>, Vec<Recommendation>) {
    let mut insights = Vec::new();
    let mut recommendations = Vec::new();

    god_classes(declarations, config, &mut insights, &mut recommendations);
    complex_methods(declarations, config, &mut insights, &mut recommendations);
    circular_dependencies(graph, cycles, &mut insights, &mut recommendations);
    oversized_files(file_stats, config, &mut insights, &mut recommendations);
    pattern_sightings(patterns, &mut insights);
    comment_coverage(metrics, &mut insights);

    recommendations.sort_by_key(|r| r.priority);
    (insights, recommendations)
}

fn god_classes(
    declarations: &[Declaration],
    config: &AnalysisConfig,
    insights: &mut Vec<Insight>,
    recommendations: &mut Vec<Recommendation>,
) {
    for decl in declarations {
        let method_count = decl.methods.iter().filter(|m| !m.is_constructor).count();
        if method_count <= config.max_methods_per_class {
            continue;
        }
        // Twice over the limit is no longer a warning
        let severity = if method_count > config.max_methods_per_class * 2 {
            Severity::Major
        } else {
            Severity::Warning
        };
        insights.push(Insight {
            category: "architecture".into(),
            severity,
            title: format!("God class: {}", decl.name),
            description: format!(
                "{} declares {} methods (threshold {}), which concentrates too many responsibilities in one type",
                decl.full_name, method_count, config.max_methods_per_class
            ),
            confidence: 0.8,
            evidence: vec![format!("{}:{}", decl.file, decl.line_start)],
        });
        recommendations.push(Recommendation {
            category: "architecture".into(),
            priority: priority_for(severity),
            title: format!("Split {} into focused components", decl.name),
            rationale: format!(
                "{} methods in one class make the type hard to test and change safely",
                method_count
            ),
            steps: vec![
                "group the methods by the data they touch".into(),
                format!("extract each group from {} into its own class", decl.name),
                "route existing callers through the extracted types".into(),
            ],
            effort: EffortEstimate::new(4.0, 8.0, 16.0, 6),
            benefits: vec![
                "smaller, testable units".into(),
                "clearer ownership of state".into(),
            ],
            risks: vec!["behavior changes if hidden coupling is missed".into()],
        });
    }
}

fn complex_methods(
    declarations: &[Declaration],
    config: &AnalysisConfig,
    insights: &mut Vec<Insight>,
    recommendations: &mut Vec<Recommendation>,
) {
    for decl in declarations {
        for method in &decl.methods {
            if method.cyclomatic_complexity <= config.max_method_complexity {
                continue;
            }
            let severity = if method.cyclomatic_complexity > config.max_method_complexity * 2 {
                Severity::Major
            } else {
                Severity::Warning
            };
            insights.push(Insight {
                category: "complexity".into(),
                severity,
                title: format!("Excessive complexity: {}.{}", decl.name, method.name),
                description: format!(
                    "cyclomatic complexity {} exceeds the configured limit of {}",
                    method.cyclomatic_complexity, config.max_method_complexity
                ),
                confidence: 0.9,
                evidence: vec![format!("{}:{}", decl.file, method.line_start)],
            });
            recommendations.push(Recommendation {
                category: "complexity".into(),
                priority: priority_for(severity),
                title: format!("Simplify {}.{}", decl.name, method.name),
                rationale: "deeply branched methods hide defects and resist unit testing".into(),
                steps: vec![
                    "extract each branch arm into a named helper".into(),
                    "replace flag arguments with separate entry points".into(),
                    "add tests for the extracted helpers".into(),
                ],
                effort: EffortEstimate::new(1.0, 3.0, 6.0, 4),
                benefits: vec!["lower defect risk".into(), "testable units".into()],
                risks: vec!["refactoring without tests can change behavior".into()],
            });
        }
    }
}

fn circular_dependencies(
    graph: &DependencyGraph,
    cycles: &[Cycle],
    insights: &mut Vec<Insight>,
    recommendations: &mut Vec<Recommendation>,
) {
    for cycle in cycles {
        insights.push(Insight {
            category: "dependencies".into(),
            severity: Severity::Major,
            title: "Circular dependency".into(),
            description: format!("dependency cycle detected: {}", cycle.display),
            confidence: 1.0,
            evidence: cycle
                .path
                .iter()
                .filter_map(|id| graph.nodes.get(id).map(|n| n.file.clone()))
                .collect(),
        });
        recommendations.push(Recommendation {
            category: "dependencies".into(),
            priority: priority_for(Severity::Major),
            title: format!(
                "Break the cycle involving {}",
                cycle.path.first().map(String::as_str).unwrap_or("?")
            ),
            rationale: "types in a cycle cannot be understood, tested or reused in isolation"
                .into(),
            steps: vec![
                "pick the weakest edge in the cycle".into(),
                "introduce an interface the dependent side owns".into(),
                "invert the edge through that interface".into(),
            ],
            effort: EffortEstimate::new(2.0, 5.0, 10.0, 7),
            benefits: vec!["independent compilation and testing".into()],
            risks: vec!["interface extraction may ripple through callers".into()],
        });
    }
}

fn oversized_files(
    file_stats: &[FileStats],
    config: &AnalysisConfig,
    insights: &mut Vec<Insight>,
    recommendations: &mut Vec<Recommendation>,
) {
    for stats in file_stats {
        if stats.total_lines <= config.max_file_lines {
            continue;
        }
        insights.push(Insight {
            category: "structure".into(),
            severity: Severity::Warning,
            title: "Oversized file".into(),
            description: format!(
                "{} spans {} lines (threshold {})",
                stats.file, stats.total_lines, config.max_file_lines
            ),
            confidence: 1.0,
            evidence: vec![stats.file.clone()],
        });
        recommendations.push(Recommendation {
            category: "structure".into(),
            priority: priority_for(Severity::Warning),
            title: format!("Split {}", stats.file),
            rationale: "long files bundle unrelated declarations and slow navigation".into(),
            steps: vec![
                "move each top-level declaration into its own file".into(),
                "keep one public type per file".into(),
            ],
            effort: EffortEstimate::new(0.5, 1.0, 2.0, 2),
            benefits: vec!["faster navigation and smaller diffs".into()],
            risks: vec![],
        });
    }
}

fn pattern_sightings(patterns: &[PatternMatch], insights: &mut Vec<Insight>) {
    for m in patterns {
        insights.push(Insight {
            category: "patterns".into(),
            severity: Severity::Info,
            title: format!("{} pattern: {}", m.kind, m.declarations.join(", ")),
            description: m.evidence.clone(),
            confidence: m.confidence,
            evidence: m.declarations.clone(),
        });
    }
}

fn comment_coverage(metrics: &CodeMetrics, insights: &mut Vec<Insight>) {
    // Only meaningful once there is a real body of code
    if metrics.code_lines >= 200 && metrics.comment_ratio < 0.02 {
        insights.push(Insight {
            category: "documentation".into(),
            severity: Severity::Info,
            title: "Sparse comments".into(),
            description: format!(
                "comment-to-code ratio is {:.3} across {} code lines",
                metrics.comment_ratio, metrics.code_lines
            ),
            confidence: 0.6,
            evidence: vec![],
        });
    }
}
