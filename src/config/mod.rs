use globset::{Glob, GlobSet, GlobSetBuilder};

/// Tunable thresholds and lookup tables for an analysis run.
///
/// Injected at construction time; the engine never reads mutable globals.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Extensions the walker recognizes as source units
    pub script_extensions: Vec<String>,
    /// Type names never recorded as dependency targets
    pub primitive_types: Vec<String>,
    /// Base types counted as engine behaviours (MonoBehaviour-like)
    pub behaviour_base_types: Vec<String>,
    /// Base types counted as data assets (ScriptableObject-like)
    pub asset_base_types: Vec<String>,
    /// Method count above which a class is flagged as a god class
    pub max_methods_per_class: usize,
    /// Cyclomatic complexity above which a method is flagged
    pub max_method_complexity: u32,
    /// Line count above which a file is flagged as oversized
    pub max_file_lines: usize,
    /// Walker depth limit
    pub max_scan_depth: usize,
    /// Extra walker exclusions on top of the built-in junk directories
    pub ignore_globs: Option<GlobSet>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            script_extensions: vec!["cs".to_string()],
            primitive_types: [
                "int", "uint", "long", "ulong", "short", "ushort", "byte", "sbyte", "float",
                "double", "decimal", "bool", "char", "string", "object", "void", "var", "dynamic",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            behaviour_base_types: vec![
                "MonoBehaviour".to_string(),
                "NetworkBehaviour".to_string(),
                "StateMachineBehaviour".to_string(),
            ],
            asset_base_types: vec!["ScriptableObject".to_string()],
            max_methods_per_class: 15,
            max_method_complexity: 10,
            max_file_lines: 500,
            max_scan_depth: 16,
            ignore_globs: None,
        }
    }
}

impl AnalysisConfig {
    pub fn is_primitive(&self, type_name: &str) -> bool {
        self.primitive_types.iter().any(|p| p == type_name)
    }

    pub fn is_script_file(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.script_extensions.iter().any(|e| *e == ext)
            })
            .unwrap_or(false)
    }

    pub fn should_ignore_path(&self, path: &std::path::Path) -> bool {
        self.ignore_globs
            .as_ref()
            .map(|set| set.is_match(path))
            .unwrap_or(false)
    }
}

/// Load configuration: defaults, then `ARCHLENS_*` environment overrides,
/// then an optional JSON file (`ARCHLENS_CONFIG_FILE` or `.archlens.json`
/// in the working directory). The JSON file wins where both are present.
pub fn load_config() -> AnalysisConfig {
    let mut cfg = AnalysisConfig::default();

    if let Ok(val) = std::env::var("ARCHLENS_MAX_METHODS") {
        if let Ok(n) = val.parse::<usize>() {
            cfg.max_methods_per_class = n.clamp(1, 500);
        }
    }
    if let Ok(val) = std::env::var("ARCHLENS_MAX_COMPLEXITY") {
        if let Ok(n) = val.parse::<u32>() {
            cfg.max_method_complexity = n.clamp(1, 1000);
        }
    }
    if let Ok(val) = std::env::var("ARCHLENS_MAX_FILE_LINES") {
        if let Ok(n) = val.parse::<usize>() {
            cfg.max_file_lines = n.clamp(50, 100_000);
        }
    }
    if let Ok(val) = std::env::var("ARCHLENS_EXTENSIONS") {
        let list = val
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        if !list.is_empty() {
            cfg.script_extensions = list;
        }
    }
    if let Ok(val) = std::env::var("ARCHLENS_IGNORE_GLOBS") {
        let mut builder = GlobSetBuilder::new();
        for pat in val.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if let Ok(glob) = Glob::new(pat) {
                builder.add(glob);
            }
        }
        if let Ok(set) = builder.build() {
            cfg.ignore_globs = Some(set);
        }
    }

    let cfg_path = std::env::var("ARCHLENS_CONFIG_FILE")
        .ok()
        .unwrap_or_else(|| ".archlens.json".to_string());
    if let Ok(text) = std::fs::read_to_string(&cfg_path) {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&text) {
            apply_json_config(&mut cfg, &json);
        }
    }

    cfg
}

fn apply_json_config(cfg: &mut AnalysisConfig, json: &serde_json::Value) {
    if let Some(n) = json.get("max_methods_per_class").and_then(|v| v.as_u64()) {
        cfg.max_methods_per_class = (n as usize).clamp(1, 500);
    }
    if let Some(n) = json.get("max_method_complexity").and_then(|v| v.as_u64()) {
        cfg.max_method_complexity = (n as u32).clamp(1, 1000);
    }
    if let Some(n) = json.get("max_file_lines").and_then(|v| v.as_u64()) {
        cfg.max_file_lines = (n as usize).clamp(50, 100_000);
    }
    if let Some(list) = json.get("script_extensions").and_then(|v| v.as_array()) {
        let exts: Vec<String> = list
            .iter()
            .filter_map(|it| it.as_str())
            .map(|s| s.trim_start_matches('.').to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !exts.is_empty() {
            cfg.script_extensions = exts;
        }
    }
    if let Some(list) = json.get("behaviour_base_types").and_then(|v| v.as_array()) {
        let types: Vec<String> = list
            .iter()
            .filter_map(|it| it.as_str().map(|s| s.to_string()))
            .collect();
        if !types.is_empty() {
            cfg.behaviour_base_types = types;
        }
    }
    if let Some(list) = json.get("ignore_globs").and_then(|v| v.as_array()) {
        let mut builder = GlobSetBuilder::new();
        for it in list {
            if let Some(pat) = it.as_str() {
                if let Ok(glob) = Glob::new(pat) {
                    builder.add(glob);
                }
            }
        }
        if let Ok(set) = builder.build() {
            cfg.ignore_globs = Some(set);
        }
    }
}
