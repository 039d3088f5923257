use serde::{Deserialize, Serialize};

/// Kind of a top-level type declaration recognized by the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclarationKind {
    Class,
    Interface,
    Struct,
}

impl std::fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeclarationKind::Class => write!(f, "class"),
            DeclarationKind::Interface => write!(f, "interface"),
            DeclarationKind::Struct => write!(f, "struct"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Internal,
    Protected,
    Private,
}

impl Visibility {
    /// Parse the first access modifier found in a modifier run.
    /// C#-style sources default to private members and internal types,
    /// so callers pass the appropriate fallback.
    pub fn from_modifiers(modifiers: &str, default: Visibility) -> Visibility {
        for word in modifiers.split_whitespace() {
            match word {
                "public" => return Visibility::Public,
                "internal" => return Visibility::Internal,
                "protected" => return Visibility::Protected,
                "private" => return Visibility::Private,
                _ => {}
            }
        }
        default
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// A single parameter of a method signature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
    /// `ref`/`out`/`in`/`params` when present
    pub modifier: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodModifiers {
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_abstract: bool,
    pub is_async: bool,
}

/// Method (or constructor) extracted from a declaration body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub name: String,
    /// Empty for constructors
    pub return_type: String,
    pub visibility: Visibility,
    pub modifiers: MethodModifiers,
    pub parameters: Vec<Parameter>,
    pub is_constructor: bool,
    pub line_start: usize,
    pub line_end: usize,
    pub cyclomatic_complexity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDeclaration {
    pub name: String,
    pub type_name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub has_getter: bool,
    pub has_setter: bool,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    pub type_name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_readonly: bool,
    pub is_const: bool,
    /// `event Action Foo;` style members; observer detection keys on this
    pub is_event: bool,
    pub line: usize,
}

/// One recognized class/interface/struct with its members.
///
/// `full_name` (namespace-qualified) is unique within a single analysis run
/// and serves as the dependency-graph node key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub full_name: String,
    pub namespace: String,
    pub file: String,
    pub kind: DeclarationKind,
    pub visibility: Visibility,
    /// Base types that do not look like interfaces (naming heuristic)
    pub base_types: Vec<String>,
    /// Base-list entries matching the `I` + capital naming convention.
    /// This is a heuristic, not a semantic check: a class named `IOManager`
    /// in a base list would be misclassified. Callers must treat the split
    /// as advisory.
    pub interfaces: Vec<String>,
    pub methods: Vec<MethodDeclaration>,
    pub properties: Vec<PropertyDeclaration>,
    pub fields: Vec<FieldDeclaration>,
    /// Attribute tags (`[Serializable]` → "Serializable") preceding the header
    pub attributes: Vec<String>,
    pub line_start: usize,
    pub line_end: usize,
    pub line_count: usize,
    /// Structural complexity of the whole body (same counting rule as methods)
    pub complexity: u32,
}

impl Declaration {
    /// All entries of the base list, interfaces included
    pub fn base_list(&self) -> impl Iterator<Item = &String> {
        self.base_types.iter().chain(self.interfaces.iter())
    }

    pub fn extends_any_of(&self, names: &[String]) -> bool {
        self.base_list().any(|b| names.iter().any(|n| n == b))
    }
}

/// Per-file line statistics gathered during extraction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileStats {
    pub file: String,
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Major,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Major => write!(f, "major"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Non-fatal problem recorded during analysis.
///
/// Extraction failures become issues instead of aborting the batch; only a
/// missing root path fails an entire run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: String,
    pub message: String,
    /// File path, optionally suffixed with `:line`
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl Issue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            location: location.into(),
            remediation: None,
        }
    }

    pub fn with_remediation(mut self, text: impl Into<String>) -> Self {
        self.remediation = Some(text.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_from_modifiers_picks_first_access_keyword() {
        assert_eq!(
            Visibility::from_modifiers("public static", Visibility::Private),
            Visibility::Public
        );
        assert_eq!(
            Visibility::from_modifiers("static readonly", Visibility::Private),
            Visibility::Private
        );
        assert_eq!(
            Visibility::from_modifiers("protected override", Visibility::Private),
            Visibility::Protected
        );
    }

    #[test]
    fn base_list_chains_bases_and_interfaces() {
        let decl = Declaration {
            name: "Player".into(),
            full_name: "Game.Player".into(),
            namespace: "Game".into(),
            file: "Player.cs".into(),
            kind: DeclarationKind::Class,
            visibility: Visibility::Public,
            base_types: vec!["MonoBehaviour".into()],
            interfaces: vec!["IDamageable".into()],
            methods: vec![],
            properties: vec![],
            fields: vec![],
            attributes: vec![],
            line_start: 1,
            line_end: 10,
            line_count: 10,
            complexity: 1,
        };
        let all: Vec<_> = decl.base_list().cloned().collect();
        assert_eq!(all, vec!["MonoBehaviour".to_string(), "IDamageable".to_string()]);
        assert!(decl.extends_any_of(&["MonoBehaviour".to_string()]));
        assert!(!decl.extends_any_of(&["ScriptableObject".to_string()]));
    }
}
