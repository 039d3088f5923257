use serde::{Deserialize, Serialize};

use crate::analysis::declarations::{Declaration, DeclarationKind, FileStats};
use crate::config::AnalysisConfig;

/// Project-level code metrics aggregated over one analysis run.
///
/// Every ratio guards against division by zero: an empty source set yields
/// zeros, never an error.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeMetrics {
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    /// comment lines / code lines
    pub comment_ratio: f64,
    pub class_count: usize,
    pub interface_count: usize,
    pub struct_count: usize,
    /// Classes extending a configured behaviour base type (MonoBehaviour-like)
    pub behaviour_count: usize,
    /// Classes extending a configured asset base type (ScriptableObject-like)
    pub scriptable_asset_count: usize,
    pub method_count: usize,
    pub average_complexity: f64,
    pub max_complexity: u32,
    pub methods_per_class: f64,
}

/// Aggregate per-declaration and per-method scores into project metrics
pub fn calculate_metrics(
    declarations: &[Declaration],
    file_stats: &[FileStats],
    config: &AnalysisConfig,
) -> CodeMetrics {
    let mut metrics = CodeMetrics::default();

    for stats in file_stats {
        metrics.total_lines += stats.total_lines;
        metrics.code_lines += stats.code_lines;
        metrics.comment_lines += stats.comment_lines;
    }
    if metrics.code_lines > 0 {
        metrics.comment_ratio = metrics.comment_lines as f64 / metrics.code_lines as f64;
    }

    let mut complexity_sum: u64 = 0;
    for decl in declarations {
        match decl.kind {
            DeclarationKind::Class => metrics.class_count += 1,
            DeclarationKind::Interface => metrics.interface_count += 1,
            DeclarationKind::Struct => metrics.struct_count += 1,
        }
        if decl.extends_any_of(&config.behaviour_base_types) {
            metrics.behaviour_count += 1;
        }
        if decl.extends_any_of(&config.asset_base_types) {
            metrics.scriptable_asset_count += 1;
        }
        for method in &decl.methods {
            metrics.method_count += 1;
            complexity_sum += method.cyclomatic_complexity as u64;
            metrics.max_complexity = metrics.max_complexity.max(method.cyclomatic_complexity);
        }
    }

    if metrics.method_count > 0 {
        metrics.average_complexity = complexity_sum as f64 / metrics.method_count as f64;
    }
    // Interfaces do not dilute the methods-per-class ratio
    let class_like = metrics.class_count + metrics.struct_count;
    if class_like > 0 {
        metrics.methods_per_class = declarations
            .iter()
            .filter(|d| d.kind != DeclarationKind::Interface)
            .map(|d| d.methods.len())
            .sum::<usize>() as f64
            / class_like as f64;
    }

    metrics
}
