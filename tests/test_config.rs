use archlens::config::{self, AnalysisConfig};

fn with_env<K: AsRef<str>, V: AsRef<str>, F: FnOnce()>(pairs: &[(K, V)], f: F) {
    let saved: Vec<(String, Option<String>)> = pairs
        .iter()
        .map(|(k, _)| (k.as_ref().to_string(), std::env::var(k.as_ref()).ok()))
        .collect();
    for (k, v) in pairs.iter() {
        std::env::set_var(k.as_ref(), v.as_ref());
    }
    f();
    for (k, v) in saved {
        match v {
            Some(val) => std::env::set_var(k, val),
            None => std::env::remove_var(k),
        }
    }
}

#[test]
fn defaults_are_sane() {
    let cfg = AnalysisConfig::default();
    assert!(cfg.max_methods_per_class > 0);
    assert!(cfg.max_method_complexity > 0);
    assert!(cfg.script_extensions.contains(&"cs".to_string()));
    assert!(cfg.is_primitive("string"));
    assert!(cfg.behaviour_base_types.contains(&"MonoBehaviour".to_string()));
}

#[test]
fn config_loads_from_env_and_json() {
    let td = tempfile::tempdir().unwrap();
    let cfg_file = td.path().join(".archlens.json");
    let cfg_text = r#"{
      "max_methods_per_class": 30,
      "max_method_complexity": 12,
      "script_extensions": [".cs", ".csx"],
      "ignore_globs": ["**/Generated/**"]
    }"#;
    std::fs::write(&cfg_file, cfg_text).unwrap();

    with_env(
        &[
            ("ARCHLENS_MAX_METHODS", "5"),
            ("ARCHLENS_MAX_FILE_LINES", "250"),
            ("ARCHLENS_CONFIG_FILE", cfg_file.to_string_lossy().as_ref()),
        ],
        || {
            let cfg = config::load_config();
            // JSON overrides env where both are present
            assert_eq!(cfg.max_methods_per_class, 30);
            assert_eq!(cfg.max_method_complexity, 12);
            // Env-only value survives
            assert_eq!(cfg.max_file_lines, 250);
            assert_eq!(
                cfg.script_extensions,
                vec!["cs".to_string(), "csx".to_string()]
            );
            assert!(cfg.should_ignore_path(std::path::Path::new(
                "Assets/Generated/Bindings.cs"
            )));
        },
    );
}

#[test]
fn env_values_are_clamped() {
    let td = tempfile::tempdir().unwrap();
    // Point the file lookup at a path that does not exist so only env applies
    let missing = td.path().join("no-config.json");
    with_env(
        &[
            ("ARCHLENS_MAX_METHODS", "0"),
            ("ARCHLENS_MAX_COMPLEXITY", "100000"),
            ("ARCHLENS_CONFIG_FILE", missing.to_string_lossy().as_ref()),
        ],
        || {
            let cfg = config::load_config();
            assert_eq!(cfg.max_methods_per_class, 1);
            assert_eq!(cfg.max_method_complexity, 1000);
        },
    );
}

#[test]
fn malformed_values_fall_back_to_defaults() {
    let td = tempfile::tempdir().unwrap();
    let missing = td.path().join("no-config.json");
    with_env(
        &[
            ("ARCHLENS_MAX_METHODS", "not-a-number"),
            ("ARCHLENS_EXTENSIONS", " , ,"),
            ("ARCHLENS_CONFIG_FILE", missing.to_string_lossy().as_ref()),
        ],
        || {
            let defaults = AnalysisConfig::default();
            let cfg = config::load_config();
            assert_eq!(cfg.max_methods_per_class, defaults.max_methods_per_class);
            assert_eq!(cfg.script_extensions, defaults.script_extensions);
        },
    );
}
