//! Heuristic design-pattern classification.
//!
//! Each detector is an independent, declarative predicate over a single
//! [`Declaration`]; confidence values are fixed constants per predicate, not
//! learned. False positives and negatives are expected; consumers (and the
//! test suite) threshold on confidence instead of asserting exact sets.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::declarations::{Declaration, DeclarationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternKind {
    Singleton,
    Factory,
    Observer,
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternKind::Singleton => write!(f, "Singleton"),
            PatternKind::Factory => write!(f, "Factory"),
            PatternKind::Observer => write!(f, "Observer"),
        }
    }
}

/// A confidence-scored classification of a declaration as an instance of a
/// known design pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternMatch {
    pub kind: PatternKind,
    /// In [0, 1]; a fixed constant per predicate
    pub confidence: f64,
    pub declarations: Vec<String>,
    pub evidence: String,
}

/// One structural predicate. Detectors are independent: they observe the
/// declaration and either produce a match or nothing, with no side effects
/// and no ordering requirements between detectors.
pub trait PatternDetector: Send + Sync {
    fn name(&self) -> &'static str;
    fn detect(&self, declaration: &Declaration) -> Option<PatternMatch>;
}

const SINGLETON_CONFIDENCE: f64 = 0.9;
const FACTORY_CONFIDENCE: f64 = 0.8;
const OBSERVER_CONFIDENCE: f64 = 0.7;

/// Static field of the declaring type plus a non-public constructor named
/// after the class
pub struct SingletonDetector;

impl PatternDetector for SingletonDetector {
    fn name(&self) -> &'static str {
        "singleton"
    }

    fn detect(&self, declaration: &Declaration) -> Option<PatternMatch> {
        if declaration.kind != DeclarationKind::Class {
            return None;
        }
        let instance_field = declaration
            .fields
            .iter()
            .find(|f| f.is_static && f.type_name == declaration.name)?;
        let hidden_ctor = declaration
            .methods
            .iter()
            .find(|m| m.is_constructor && !m.visibility.is_public())?;
        Some(PatternMatch {
            kind: PatternKind::Singleton,
            confidence: SINGLETON_CONFIDENCE,
            declarations: vec![declaration.name.clone()],
            evidence: format!(
                "static field '{}' of type {} and non-public constructor at line {}",
                instance_field.name, declaration.name, hidden_ctor.line_start
            ),
        })
    }
}

/// Name contains "Factory" and at least one method name contains "Create"
pub struct FactoryDetector;

impl PatternDetector for FactoryDetector {
    fn name(&self) -> &'static str {
        "factory"
    }

    fn detect(&self, declaration: &Declaration) -> Option<PatternMatch> {
        if !declaration.name.contains("Factory") {
            return None;
        }
        let create = declaration
            .methods
            .iter()
            .find(|m| !m.is_constructor && m.name.contains("Create"))?;
        Some(PatternMatch {
            kind: PatternKind::Factory,
            confidence: FACTORY_CONFIDENCE,
            declarations: vec![declaration.name.clone()],
            evidence: format!(
                "factory-named type with creation method '{}'",
                create.name
            ),
        })
    }
}

/// At least one event/delegate-like field plus a Notify*/Update* method
pub struct ObserverDetector;

const DELEGATE_TYPE_HEADS: &[&str] = &["Action", "Func", "EventHandler", "UnityEvent", "Delegate"];

impl PatternDetector for ObserverDetector {
    fn name(&self) -> &'static str {
        "observer"
    }

    fn detect(&self, declaration: &Declaration) -> Option<PatternMatch> {
        let event_field = declaration.fields.iter().find(|f| {
            f.is_event
                || DELEGATE_TYPE_HEADS
                    .iter()
                    .any(|head| f.type_name.starts_with(head))
        })?;
        let notifier = declaration
            .methods
            .iter()
            .find(|m| m.name.starts_with("Notify") || m.name.starts_with("Update"))?;
        Some(PatternMatch {
            kind: PatternKind::Observer,
            confidence: OBSERVER_CONFIDENCE,
            declarations: vec![declaration.name.clone()],
            evidence: format!(
                "event-like field '{}' with notifier method '{}'",
                event_field.name, notifier.name
            ),
        })
    }
}

/// Registered list of independent detectors. New heuristics are added here
/// without modifying existing ones.
pub struct PatternRegistry {
    detectors: Vec<Box<dyn PatternDetector>>,
}

impl PatternRegistry {
    pub fn standard() -> Self {
        Self {
            detectors: vec![
                Box::new(SingletonDetector),
                Box::new(FactoryDetector),
                Box::new(ObserverDetector),
            ],
        }
    }

    pub fn with_detector(mut self, detector: Box<dyn PatternDetector>) -> Self {
        self.detectors.push(detector);
        self
    }

    /// Run every detector over every declaration
    pub fn detect_all(&self, declarations: &[Declaration]) -> Vec<PatternMatch> {
        let mut matches = Vec::new();
        for decl in declarations {
            for detector in &self.detectors {
                if let Some(m) = detector.detect(decl) {
                    debug!(
                        detector = detector.name(),
                        declaration = %decl.full_name,
                        confidence = m.confidence,
                        "pattern matched"
                    );
                    matches.push(m);
                }
            }
        }
        matches
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::extractor::extract_from_source;

    fn declarations_of(source: &str) -> Vec<Declaration> {
        extract_from_source("test.cs", source).declarations
    }

    #[test]
    fn singleton_private_ctor_and_static_self_field() {
        let decls = declarations_of(
            r#"
public class GameManager
{
    private static GameManager instance;

    private GameManager() { }

    public static GameManager GetInstance() { return instance; }
}
"#,
        );
        let matches = PatternRegistry::standard().detect_all(&decls);
        let singleton = matches
            .iter()
            .find(|m| m.kind == PatternKind::Singleton)
            .expect("singleton not detected");
        assert!(singleton.confidence >= 0.9);
        assert_eq!(singleton.declarations, vec!["GameManager".to_string()]);
    }

    #[test]
    fn public_ctor_is_not_a_singleton() {
        let decls = declarations_of(
            r#"
public class GameManager
{
    private static GameManager instance;
    public GameManager() { }
}
"#,
        );
        let matches = PatternRegistry::standard().detect_all(&decls);
        assert!(!matches.iter().any(|m| m.kind == PatternKind::Singleton));
    }

    #[test]
    fn factory_by_name_and_create_method() {
        let decls = declarations_of(
            r#"
public class EnemyFactory
{
    public Enemy CreateEnemy(int level) { return null; }
}
"#,
        );
        let matches = PatternRegistry::standard().detect_all(&decls);
        let factory = matches
            .iter()
            .find(|m| m.kind == PatternKind::Factory)
            .expect("factory not detected");
        assert!(factory.confidence >= 0.8);
    }

    #[test]
    fn factory_name_without_create_method_is_ignored() {
        let decls = declarations_of(
            "public class EnemyFactory { public void Reset() { } }",
        );
        let matches = PatternRegistry::standard().detect_all(&decls);
        assert!(matches.is_empty());
    }

    #[test]
    fn observer_event_field_and_notify_method() {
        let decls = declarations_of(
            r#"
public class HealthSystem
{
    public event Action OnHealthChanged;

    public void NotifyListeners() { }
}
"#,
        );
        let matches = PatternRegistry::standard().detect_all(&decls);
        let observer = matches
            .iter()
            .find(|m| m.kind == PatternKind::Observer)
            .expect("observer not detected");
        assert!(observer.confidence >= 0.7);
        assert!(observer.evidence.contains("OnHealthChanged"));
    }

    #[test]
    fn registry_accepts_custom_detectors() {
        struct AlwaysMatch;
        impl PatternDetector for AlwaysMatch {
            fn name(&self) -> &'static str {
                "always"
            }
            fn detect(&self, declaration: &Declaration) -> Option<PatternMatch> {
                Some(PatternMatch {
                    kind: PatternKind::Factory,
                    confidence: 0.5,
                    declarations: vec![declaration.name.clone()],
                    evidence: "test".into(),
                })
            }
        }
        let decls = declarations_of("public class Plain { }");
        let matches = PatternRegistry::standard()
            .with_detector(Box::new(AlwaysMatch))
            .detect_all(&decls);
        assert_eq!(matches.len(), 1);
    }
}
