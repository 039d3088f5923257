//! Hand-written source corpus with known expected declarations.
//!
//! The extractor is the biggest correctness risk of the crate (lexical
//! matching instead of a grammar), so each snippet here pins down one
//! recognition behavior.

use archlens::analysis::extractor::{cyclomatic_complexity, extract_from_source};
use archlens::analysis::{DeclarationKind, Visibility};

#[test]
fn corpus_generic_class_with_base_interface() {
    let out = extract_from_source(
        "Pool.cs",
        "public class ObjectPool<T> : IPool { private int size; }\n",
    );
    assert_eq!(out.declarations.len(), 1);
    let decl = &out.declarations[0];
    assert_eq!(decl.name, "ObjectPool");
    assert_eq!(decl.interfaces, vec!["IPool".to_string()]);
}

#[test]
fn corpus_struct_declaration() {
    let out = extract_from_source(
        "Point.cs",
        "public struct Point { public float x; public float y; }\n",
    );
    assert_eq!(out.declarations.len(), 1);
    assert_eq!(out.declarations[0].kind, DeclarationKind::Struct);
    assert_eq!(out.declarations[0].fields.len(), 2);
}

#[test]
fn corpus_first_namespace_wins() {
    let out = extract_from_source(
        "Two.cs",
        r#"
namespace First { public class A { } }
namespace Second { public class B { } }
"#,
    );
    // One namespace context per unit, first-found: both map into it
    assert_eq!(out.declarations[0].full_name, "First.A");
    assert_eq!(out.declarations[1].full_name, "First.B");
}

#[test]
fn corpus_base_list_splits_classes_from_interfaces() {
    let out = extract_from_source(
        "Boss.cs",
        "public class Boss : Enemy, IDamageable, IBossPhase, Spawnable { }\n",
    );
    let decl = &out.declarations[0];
    assert_eq!(decl.base_types, vec!["Enemy".to_string(), "Spawnable".to_string()]);
    assert_eq!(
        decl.interfaces,
        vec!["IDamageable".to_string(), "IBossPhase".to_string()]
    );
}

#[test]
fn corpus_member_visibility_defaults() {
    let out = extract_from_source(
        "Mixed.cs",
        r#"
public class Mixed
{
    int hidden;
    public int shown;
}
public interface IThing
{
    void Act();
}
"#,
    );
    let mixed = &out.declarations[0];
    assert_eq!(
        mixed.fields.iter().find(|f| f.name == "hidden").unwrap().visibility,
        Visibility::Private
    );
    assert_eq!(
        mixed.fields.iter().find(|f| f.name == "shown").unwrap().visibility,
        Visibility::Public
    );
    // Interface members are public by default
    let thing = &out.declarations[1];
    assert_eq!(thing.methods[0].visibility, Visibility::Public);
}

#[test]
fn corpus_method_modifiers_and_parameters() {
    let out = extract_from_source(
        "Svc.cs",
        r#"
public class Service
{
    public static async Task Fetch(string url, int retries) { }
    protected override void OnEnable() { }
    public void Send(ref Buffer buffer, out int written) { written = 0; }
}
"#,
    );
    let svc = &out.declarations[0];
    let fetch = svc.methods.iter().find(|m| m.name == "Fetch").unwrap();
    assert!(fetch.modifiers.is_static);
    assert!(fetch.modifiers.is_async);
    assert_eq!(fetch.parameters.len(), 2);
    assert_eq!(fetch.parameters[0].type_name, "string");
    assert_eq!(fetch.parameters[1].name, "retries");

    let on_enable = svc.methods.iter().find(|m| m.name == "OnEnable").unwrap();
    assert!(on_enable.modifiers.is_override);
    assert_eq!(on_enable.visibility, Visibility::Protected);

    let send = svc.methods.iter().find(|m| m.name == "Send").unwrap();
    assert_eq!(send.parameters[0].modifier.as_deref(), Some("ref"));
    assert_eq!(send.parameters[1].modifier.as_deref(), Some("out"));
}

#[test]
fn corpus_nested_braces_in_method_bodies() {
    let out = extract_from_source(
        "Deep.cs",
        r#"
public class Deep
{
    public void Nested(int x)
    {
        if (x > 0)
        {
            while (x > 0)
            {
                x--;
            }
        }
    }

    public void After() { }
}
"#,
    );
    let deep = &out.declarations[0];
    // The brace scanner must not let Nested swallow After
    assert!(deep.methods.iter().any(|m| m.name == "Nested"));
    assert!(deep.methods.iter().any(|m| m.name == "After"));
}

#[test]
fn corpus_line_spans() {
    let source = "public class Spanned\n{\n    public void M() { }\n}\n";
    let out = extract_from_source("Spanned.cs", source);
    let decl = &out.declarations[0];
    assert_eq!(decl.line_start, 1);
    assert_eq!(decl.line_end, 4);
    assert_eq!(decl.line_count, 4);
    assert_eq!(decl.methods[0].line_start, 3);
}

#[test]
fn corpus_attributes_collected_in_order() {
    let out = extract_from_source(
        "Attr.cs",
        r#"
[Serializable]
[RequireComponent(typeof(Rigidbody))]
public class Tagged { }
"#,
    );
    assert_eq!(
        out.declarations[0].attributes,
        vec!["Serializable".to_string(), "RequireComponent".to_string()]
    );
}

#[test]
fn corpus_complexity_property_holds_for_generated_bodies() {
    // 1 + n for any arrangement of n branching tokens
    for n in 0..25 {
        let body: String = std::iter::repeat("if (x) { } ").take(n).collect();
        assert_eq!(cyclomatic_complexity(&body), 1 + n as u32);
    }
    for n in 0..10 {
        let body: String = std::iter::repeat("a && b; ").take(n).collect();
        assert_eq!(cyclomatic_complexity(&body), 1 + n as u32);
    }
}

#[test]
fn corpus_no_match_inputs_contribute_nothing() {
    for text in [
        "",
        "// only a comment",
        "using System;\nusing System.IO;\n",
        "x y z { } ) ( ;;",
        "classy Name { }",
    ] {
        let out = extract_from_source("junk.cs", text);
        assert!(
            out.declarations.is_empty(),
            "expected no declarations for {:?}",
            text
        );
    }
}

#[test]
fn corpus_const_and_readonly_fields() {
    let out = extract_from_source(
        "Consts.cs",
        r#"
public class Config
{
    public const int MaxPlayers = 4;
    private readonly string label = "x";
    private static readonly Config shared = null;
}
"#,
    );
    let cfg = &out.declarations[0];
    assert!(cfg.fields.iter().find(|f| f.name == "MaxPlayers").unwrap().is_const);
    assert!(cfg.fields.iter().find(|f| f.name == "label").unwrap().is_readonly);
    let shared = cfg.fields.iter().find(|f| f.name == "shared").unwrap();
    assert!(shared.is_static && shared.is_readonly);
}
