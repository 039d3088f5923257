//! Pattern-based declaration extraction.
//!
//! This is intentionally not a full grammar: declaration headers are found
//! with compiled regex patterns and their bodies are carved out with a
//! balanced-brace scan that tracks string and comment state. The trade-off
//! (documented in the crate docs) is reliable recognition of common coding
//! styles without a compiler front-end; everything downstream only sees the
//! stable [`Declaration`] model, so a real parser could be substituted later.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::analysis::declarations::{
    Declaration, DeclarationKind, FieldDeclaration, FileStats, Issue, MethodDeclaration,
    MethodModifiers, Parameter, PropertyDeclaration, Severity, Visibility,
};
use crate::config::AnalysisConfig;

static NAMESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*namespace\s+([A-Za-z_][A-Za-z0-9_.]*)").unwrap());

// Member patterns anchor on a line start or a preceding `{`/`}`/`;` so that
// single-line bodies (`interface IBar { void Run(); }`) extract too. Line
// numbers are therefore taken from capture group 1, never from the match
// start, which may sit on the anchor character.
static TYPE_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)(?:^|[{};])[ \t]*((?:(?:public|private|protected|internal|static|abstract|sealed|partial)\s+)*)(class|struct|interface)\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s*<[^>{]*>)?\s*(?::\s*([^{]+?))?\s*\{",
    )
    .unwrap()
});

static METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)(?:^|[{};])[ \t]*((?:(?:public|private|protected|internal|static|virtual|override|abstract|async|sealed|new|extern|unsafe|partial)\s+)*)([A-Za-z_][A-Za-z0-9_<>\[\],\. ]*?)\s+([A-Za-z_][A-Za-z0-9_]*)\s*(?:<[^>()]*>)?\s*\(([^)]*)\)\s*(\{|;|=>)",
    )
    .unwrap()
});

static PROPERTY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)(?:^|[{};])[ \t]*((?:(?:public|private|protected|internal|static|virtual|override|abstract|new)\s+)*)([A-Za-z_][A-Za-z0-9_<>\[\],\. ]*?)\s+([A-Za-z_][A-Za-z0-9_]*)\s*\{",
    )
    .unwrap()
});

static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)(?:^|[{};])[ \t]*((?:(?:public|private|protected|internal|static|readonly|const|volatile|event)\s+)*)([A-Za-z_][A-Za-z0-9_<>\[\],\. ]*?)\s+([A-Za-z_][A-Za-z0-9_]*)\s*(?:=[^;]*)?;",
    )
    .unwrap()
});

static BRANCH_KEYWORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:if|else|while|for|foreach|switch|case|catch)\b").unwrap());

static ATTRIBUTE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\[([A-Za-z_][A-Za-z0-9_]*)[^\]]*\]\s*$").unwrap());

static GETTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bget\b").unwrap());
static SETTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bset\b").unwrap());

/// Statement keywords that the member patterns must never mistake for a
/// type or member name
const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "else", "while", "for", "foreach", "switch", "case", "catch", "try", "finally", "do",
    "return", "throw", "using", "lock", "yield", "break", "continue", "new", "namespace", "class",
    "struct", "interface", "enum", "delegate", "get", "set", "base", "this", "in", "out", "ref",
];

fn is_statement_keyword(word: &str) -> bool {
    STATEMENT_KEYWORDS.contains(&word)
}

/// A "return type" that is really a modifier run means the pattern landed on
/// a constructor or malformed header; those are handled elsewhere
fn is_modifier_word(word: &str) -> bool {
    matches!(
        word,
        "public"
            | "private"
            | "protected"
            | "internal"
            | "static"
            | "virtual"
            | "override"
            | "abstract"
            | "async"
            | "sealed"
            | "extern"
            | "unsafe"
            | "partial"
            | "readonly"
            | "const"
            | "event"
    )
}

/// Sequential capture scan that rewinds one byte after every match.
///
/// The member patterns consume their anchor character (`{`, `}` or `;`), so
/// a plain `captures_iter` would skip a member that starts right after the
/// previous one's terminator (`public float x; public float y;`). Rewinding
/// lets the consumed terminator anchor the next match. All patterns end in
/// ASCII, so the minus-one offset stays on a char boundary.
fn captures_seq<'t>(re: &Regex, text: &'t str) -> Vec<regex::Captures<'t>> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < text.len() {
        let Some(caps) = re.captures_at(text, pos) else {
            break;
        };
        let end = caps.get(0).unwrap().end();
        pos = end.saturating_sub(1).max(pos + 1);
        out.push(caps);
    }
    out
}

/// Everything extracted from a single source unit
#[derive(Debug, Default)]
pub struct FileExtraction {
    pub declarations: Vec<Declaration>,
    pub stats: FileStats,
    pub issues: Vec<Issue>,
}

/// Cyclomatic complexity of a body text: 1 + branching keywords + boolean
/// short-circuit operators. Word-boundary matching, so `ifdef` or `elsewhere`
/// do not count. Deterministic and order-independent.
pub fn cyclomatic_complexity(body: &str) -> u32 {
    let keywords = BRANCH_KEYWORD_RE.find_iter(body).count();
    let short_circuits = body.matches("&&").count() + body.matches("||").count();
    1 + (keywords + short_circuits) as u32
}

/// Find the byte index of the `}` matching the `{` at `open_idx`.
///
/// Tracks line/block comments, string and char literals so braces inside
/// them do not unbalance the scan. Returns `None` when the body never
/// closes, which the caller reports as an extraction-ambiguity issue.
pub fn find_matching_brace(text: &str, open_idx: usize) -> Option<usize> {
    debug_assert_eq!(text.as_bytes().get(open_idx), Some(&b'{'));
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = open_idx;
    let mut in_line_comment = false;
    let mut in_block_comment = false;
    let mut in_string = false;
    let mut in_char = false;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();

        if in_line_comment {
            if b == b'\n' {
                in_line_comment = false;
            }
        } else if in_block_comment {
            if b == b'*' && next == Some(b'/') {
                in_block_comment = false;
                i += 1;
            }
        } else if in_string {
            if b == b'\\' {
                i += 1;
            } else if b == b'"' {
                in_string = false;
            }
        } else if in_char {
            if b == b'\\' {
                i += 1;
            } else if b == b'\'' {
                in_char = false;
            }
        } else {
            match b {
                b'/' if next == Some(b'/') => {
                    in_line_comment = true;
                    i += 1;
                }
                b'/' if next == Some(b'*') => {
                    in_block_comment = true;
                    i += 1;
                }
                b'"' => in_string = true,
                b'\'' => in_char = true,
                b'{' => depth += 1,
                b'}' => {
                    if depth == 0 {
                        return None;
                    }
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    None
}

fn line_of_offset(text: &str, offset: usize) -> usize {
    text[..offset].bytes().filter(|b| *b == b'\n').count() + 1
}

/// Blank a byte range, preserving newlines so later line numbers stay valid
fn mask_range(buf: &mut [u8], start: usize, end: usize) {
    for b in buf[start..end].iter_mut() {
        if *b != b'\n' {
            *b = b' ';
        }
    }
}

/// Interface naming convention: `I` followed by another capital.
/// Heuristic only: `IOManager` in a base list would be misclassified.
pub fn looks_like_interface(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some('I') && chars.next().map(|c| c.is_ascii_uppercase()).unwrap_or(false)
}

/// Strip generic arguments and array suffixes down to the outer identifier:
/// `List<Enemy>[]` → `List`. Dependency targets stay symbolic.
pub fn normalize_type_name(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches("[]").trim();
    let no_generics = match trimmed.find('<') {
        Some(idx) => &trimmed[..idx],
        None => trimmed,
    };
    // First token only: trailing constraint text never names a type
    let first = no_generics.split_whitespace().next().unwrap_or("");
    // Qualified references keep only the final segment
    first.rsplit('.').next().unwrap_or(first).to_string()
}

fn parse_parameters(raw: &str) -> Vec<Parameter> {
    let mut params = Vec::new();
    if raw.trim().is_empty() {
        return params;
    }
    // Split on commas outside generic argument lists
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in raw.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&raw[start..]);

    for part in parts {
        // Drop default values
        let part = part.split('=').next().unwrap_or(part).trim();
        if part.is_empty() {
            continue;
        }
        let mut words: Vec<&str> = part.split_whitespace().collect();
        let modifier = match words.first() {
            Some(&m @ ("ref" | "out" | "in" | "params")) => {
                words.remove(0);
                Some(m.to_string())
            }
            _ => None,
        };
        if words.len() < 2 {
            continue;
        }
        let name = words.pop().unwrap().to_string();
        let type_name = words.join(" ");
        params.push(Parameter {
            name,
            type_name,
            modifier,
        });
    }
    params
}

fn parse_method_modifiers(modifiers: &str) -> MethodModifiers {
    let mut m = MethodModifiers::default();
    for word in modifiers.split_whitespace() {
        match word {
            "static" => m.is_static = true,
            "virtual" => m.is_virtual = true,
            "override" => m.is_override = true,
            "abstract" => m.is_abstract = true,
            "async" => m.is_async = true,
            _ => {}
        }
    }
    m
}

/// Attribute tags on the lines immediately preceding `header_start`
fn collect_attributes(text: &str, header_start: usize) -> Vec<String> {
    let mut attributes = Vec::new();
    let before = &text[..header_start];
    for line in before.lines().rev() {
        match ATTRIBUTE_LINE_RE.captures(line) {
            Some(caps) => attributes.push(caps[1].to_string()),
            None => {
                if line.trim().is_empty() {
                    continue;
                }
                break;
            }
        }
    }
    attributes.reverse();
    attributes
}

fn scan_methods(
    body: &str,
    body_offset: usize,
    full_text: &str,
    type_name: &str,
    default_visibility: Visibility,
    issues: &mut Vec<Issue>,
    file: &str,
) -> (Vec<MethodDeclaration>, Vec<(usize, usize)>) {
    let mut methods = Vec::new();
    // Absolute byte spans of method bodies, masked before field/property scans
    let mut body_spans = Vec::new();

    for caps in captures_seq(&METHOD_RE, body) {
        let modifiers = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let return_type = caps[2].trim().to_string();
        let name = caps[3].to_string();
        let terminator = caps.get(5).unwrap();

        let return_head = return_type.split_whitespace().next().unwrap_or("");
        if is_statement_keyword(&name)
            || is_statement_keyword(return_head)
            || is_modifier_word(return_head)
        {
            continue;
        }

        let header_start = caps.get(1).unwrap().start();
        let line_start = line_of_offset(full_text, body_offset + header_start);
        let (complexity, line_end, span) = match terminator.as_str() {
            "{" => {
                let open_abs = body_offset + terminator.start();
                match find_matching_brace(full_text, open_abs) {
                    Some(close_abs) => {
                        let method_body = &full_text[open_abs..=close_abs];
                        (
                            cyclomatic_complexity(method_body),
                            line_of_offset(full_text, close_abs),
                            Some((open_abs, close_abs + 1)),
                        )
                    }
                    None => {
                        issues.push(Issue::new(
                            Severity::Warning,
                            "extraction",
                            format!("unbalanced braces in method '{}.{}'", type_name, name),
                            format!("{}:{}", file, line_start),
                        ));
                        continue;
                    }
                }
            }
            "=>" => {
                let expr_start = terminator.end();
                let expr = body[expr_start..]
                    .split(';')
                    .next()
                    .unwrap_or("");
                (
                    cyclomatic_complexity(expr),
                    line_of_offset(full_text, body_offset + expr_start + expr.len()),
                    None,
                )
            }
            // Abstract or interface member: declaration only
            _ => (1, line_start, None),
        };

        if let Some(span) = span {
            body_spans.push(span);
        }
        methods.push(MethodDeclaration {
            name,
            return_type,
            visibility: Visibility::from_modifiers(modifiers, default_visibility),
            modifiers: parse_method_modifiers(modifiers),
            parameters: parse_parameters(&caps[4]),
            is_constructor: false,
            line_start,
            line_end,
            cyclomatic_complexity: complexity,
        });
    }

    // Constructors carry no return type, so they need their own pattern
    let ctor_re = Regex::new(&format!(
        r"(?m)(?:^|[{{}};])[ \t]*((?:(?:public|private|protected|internal|static)\s+)*){}\s*\(([^)]*)\)\s*(?::\s*(?:base|this)\s*\([^)]*\)\s*)?\{{",
        regex::escape(type_name)
    ))
    .expect("constructor pattern");
    for caps in captures_seq(&ctor_re, body) {
        let modifiers = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let header_start = caps.get(1).unwrap().start();
        let open_abs = body_offset + caps.get(0).unwrap().end() - 1;
        let line_start = line_of_offset(full_text, body_offset + header_start);
        let Some(close_abs) = find_matching_brace(full_text, open_abs) else {
            issues.push(Issue::new(
                Severity::Warning,
                "extraction",
                format!("unbalanced braces in constructor of '{}'", type_name),
                format!("{}:{}", file, line_start),
            ));
            continue;
        };
        body_spans.push((open_abs, close_abs + 1));
        methods.push(MethodDeclaration {
            name: type_name.to_string(),
            return_type: String::new(),
            visibility: Visibility::from_modifiers(modifiers, Visibility::Private),
            modifiers: parse_method_modifiers(modifiers),
            parameters: parse_parameters(&caps[2]),
            is_constructor: true,
            line_start,
            line_end: line_of_offset(full_text, close_abs),
            cyclomatic_complexity: cyclomatic_complexity(&full_text[open_abs..=close_abs]),
        });
    }

    methods.sort_by_key(|m| m.line_start);
    (methods, body_spans)
}

fn scan_properties(
    masked_body: &str,
    body_offset: usize,
    full_text: &str,
    masked_full: &str,
    default_visibility: Visibility,
) -> (Vec<PropertyDeclaration>, Vec<(usize, usize)>) {
    let mut properties = Vec::new();
    let mut spans = Vec::new();

    for caps in captures_seq(&PROPERTY_RE, masked_body) {
        let modifiers = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let type_name = caps[2].trim().to_string();
        let name = caps[3].to_string();
        let type_head = type_name.split_whitespace().next().unwrap_or("");
        if is_statement_keyword(&name) || is_statement_keyword(type_head) {
            continue;
        }
        let open_abs = body_offset + caps.get(0).unwrap().end() - 1;
        let Some(close_abs) = find_matching_brace(masked_full, open_abs) else {
            continue;
        };
        let accessor_body = &masked_full[open_abs..=close_abs];
        let has_getter = GETTER_RE.is_match(accessor_body);
        let has_setter = SETTER_RE.is_match(accessor_body);
        if !has_getter && !has_setter {
            continue;
        }
        spans.push((open_abs, close_abs + 1));
        properties.push(PropertyDeclaration {
            name,
            type_name,
            visibility: Visibility::from_modifiers(modifiers, default_visibility),
            is_static: modifiers.split_whitespace().any(|w| w == "static"),
            has_getter,
            has_setter,
            line: line_of_offset(full_text, body_offset + caps.get(1).unwrap().start()),
        });
    }
    (properties, spans)
}

fn scan_fields(
    masked_body: &str,
    body_offset: usize,
    full_text: &str,
    default_visibility: Visibility,
) -> Vec<FieldDeclaration> {
    let mut fields = Vec::new();
    for caps in captures_seq(&FIELD_RE, masked_body) {
        let modifiers = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let type_name = caps[2].trim().to_string();
        let name = caps[3].to_string();
        let type_head = type_name.split_whitespace().next().unwrap_or("");
        if is_statement_keyword(&name) || is_statement_keyword(type_head) {
            continue;
        }
        let words: Vec<&str> = modifiers.split_whitespace().collect();
        fields.push(FieldDeclaration {
            name,
            type_name,
            visibility: Visibility::from_modifiers(modifiers, default_visibility),
            is_static: words.contains(&"static"),
            is_readonly: words.contains(&"readonly"),
            is_const: words.contains(&"const"),
            is_event: words.contains(&"event"),
            line: line_of_offset(full_text, body_offset + caps.get(1).unwrap().start()),
        });
    }
    fields
}

fn compute_file_stats(file: &str, text: &str) -> FileStats {
    let mut stats = FileStats {
        file: file.to_string(),
        ..Default::default()
    };
    let mut in_block_comment = false;
    for line in text.lines() {
        stats.total_lines += 1;
        let trimmed = line.trim();
        if in_block_comment {
            stats.comment_lines += 1;
            if trimmed.contains("*/") {
                in_block_comment = false;
            }
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with("//") {
            stats.comment_lines += 1;
        } else if trimmed.starts_with("/*") {
            stats.comment_lines += 1;
            if !trimmed.contains("*/") {
                in_block_comment = true;
            }
        } else {
            stats.code_lines += 1;
        }
    }
    stats
}

/// Extract all declarations from one in-memory source unit.
///
/// A unit that matches no declaration contributes zero declarations; that is
/// not an error. Ambiguous bodies are skipped with a Warning issue.
pub fn extract_from_source(file: &str, text: &str) -> FileExtraction {
    let mut out = FileExtraction {
        stats: compute_file_stats(file, text),
        ..Default::default()
    };

    // At most one namespace context, first match wins
    let namespace = NAMESPACE_RE
        .captures(text)
        .map(|c| c[1].to_string())
        .unwrap_or_default();

    for caps in captures_seq(&TYPE_HEADER_RE, text) {
        let kind = match &caps[2] {
            "class" => DeclarationKind::Class,
            "struct" => DeclarationKind::Struct,
            _ => DeclarationKind::Interface,
        };
        let name = caps[3].to_string();
        let header_start = caps.get(1).unwrap().start();
        let open_idx = caps.get(0).unwrap().end() - 1;
        let line_start = line_of_offset(text, header_start);

        let Some(close_idx) = find_matching_brace(text, open_idx) else {
            out.issues.push(
                Issue::new(
                    Severity::Warning,
                    "extraction",
                    format!("declaration '{}' could not be brace-matched", name),
                    format!("{}:{}", file, line_start),
                )
                .with_remediation("check for unbalanced braces or unterminated literals"),
            );
            continue;
        };

        let mut base_types = Vec::new();
        let mut interfaces = Vec::new();
        if let Some(base_list) = caps.get(4) {
            // Generic constraint clauses are not base types
            let list_text = base_list.as_str();
            let list_text = list_text.split(" where ").next().unwrap_or(list_text);
            for entry in list_text.split(',') {
                let target = normalize_type_name(entry);
                if target.is_empty() {
                    continue;
                }
                if looks_like_interface(&target) {
                    interfaces.push(target);
                } else {
                    base_types.push(target);
                }
            }
        }

        let body_offset = open_idx + 1;
        let body = &text[body_offset..close_idx];
        let default_member_visibility = if kind == DeclarationKind::Interface {
            Visibility::Public
        } else {
            Visibility::Private
        };

        let (methods, method_spans) = scan_methods(
            body,
            body_offset,
            text,
            &name,
            default_member_visibility,
            &mut out.issues,
            file,
        );

        // Mask method bodies so locals are not mistaken for fields/properties
        let mut masked = text.as_bytes().to_vec();
        for (start, end) in &method_spans {
            mask_range(&mut masked, *start, *end);
        }
        let masked_full = String::from_utf8_lossy(&masked).into_owned();
        let masked_body = masked_full[body_offset..close_idx].to_string();

        let (properties, property_spans) = scan_properties(
            &masked_body,
            body_offset,
            text,
            &masked_full,
            default_member_visibility,
        );
        let mut masked2 = masked_full.as_bytes().to_vec();
        for (start, end) in &property_spans {
            mask_range(&mut masked2, *start, *end);
        }
        let masked2_full = String::from_utf8_lossy(&masked2).into_owned();
        let fields = scan_fields(
            &masked2_full[body_offset..close_idx],
            body_offset,
            text,
            default_member_visibility,
        );

        let line_end = line_of_offset(text, close_idx);
        let full_name = if namespace.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", namespace, name)
        };
        out.declarations.push(Declaration {
            visibility: Visibility::from_modifiers(
                caps.get(1).map(|m| m.as_str()).unwrap_or(""),
                Visibility::Internal,
            ),
            attributes: collect_attributes(text, header_start),
            complexity: cyclomatic_complexity(body),
            line_count: line_end.saturating_sub(line_start) + 1,
            name,
            full_name,
            namespace: namespace.clone(),
            file: file.to_string(),
            kind,
            base_types,
            interfaces,
            methods,
            properties,
            fields,
            line_start,
            line_end,
        });
    }

    debug!(
        file,
        declarations = out.declarations.len(),
        "extraction finished"
    );
    out
}

/// Built-in walker exclusions; config globs come on top of these
const EXCLUDED_DIRS: &[&str] = &[
    "Library", "Temp", "Obj", "obj", "bin", "Build", "Builds", "Logs", ".git", ".svn", ".idea",
    ".vs", "node_modules", "target",
];

/// Enumerate source files under `root`, depth-limited, deterministic order
pub fn collect_source_files(root: &Path, config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if root.is_file() {
        if config.is_script_file(root) {
            files.push(root.to_path_buf());
        }
        return Ok(files);
    }
    walk_directory(root, config, &mut files, 0)?;
    files.sort();
    Ok(files)
}

fn walk_directory(
    dir: &Path,
    config: &AnalysisConfig,
    files: &mut Vec<PathBuf>,
    depth: usize,
) -> Result<()> {
    if depth > config.max_scan_depth {
        return Ok(());
    }
    let entries = fs::read_dir(dir).with_context(|| format!("read_dir {}", dir.display()))?;
    for entry in entries.flatten() {
        let path = entry.path();
        if config.should_ignore_path(&path) {
            continue;
        }
        if path.is_dir() {
            let dir_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if EXCLUDED_DIRS.iter().any(|d| *d == dir_name) || dir_name.starts_with('.') {
                continue;
            }
            // A subdirectory we cannot read is skipped, not fatal
            if let Err(e) = walk_directory(&path, config, files, depth + 1) {
                warn!(path = %path.display(), error = %e, "skipping unreadable directory");
            }
        } else if config.is_script_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Extract declarations from every file in the list, fanning out per file.
///
/// Each file is parsed independently and the per-file results are merged by
/// concatenation; an unreadable file contributes an issue instead of
/// aborting the batch. Files left unprocessed after `cancel` is raised are
/// counted so the caller can flag the run as incomplete.
pub fn extract_files(
    files: &[PathBuf],
    cancel: &Arc<AtomicBool>,
) -> (Vec<FileExtraction>, usize) {
    let results: Vec<Option<FileExtraction>> = files
        .par_iter()
        .map(|path| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            let file_id = path.to_string_lossy().to_string();
            match fs::read_to_string(path) {
                Ok(text) => Some(extract_from_source(&file_id, &text)),
                Err(e) => {
                    warn!(file = %file_id, error = %e, "unreadable source file");
                    Some(FileExtraction {
                        issues: vec![Issue::new(
                            Severity::Warning,
                            "io",
                            format!("file could not be read: {}", e),
                            file_id.clone(),
                        )],
                        stats: FileStats {
                            file: file_id,
                            ..Default::default()
                        },
                        declarations: Vec::new(),
                    })
                }
            }
        })
        .collect();

    let skipped = results.iter().filter(|r| r.is_none()).count();
    (results.into_iter().flatten().collect(), skipped)
}

/// Enforce the unique fully-qualified-name invariant: duplicates raise a
/// Critical issue and the first-seen declaration wins.
pub fn dedupe_declarations(
    declarations: Vec<Declaration>,
    issues: &mut Vec<Issue>,
) -> Vec<Declaration> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(declarations.len());
    for decl in declarations {
        if seen.insert(decl.full_name.clone()) {
            unique.push(decl);
        } else {
            issues.push(
                Issue::new(
                    Severity::Critical,
                    "invariant",
                    format!("duplicate fully-qualified name '{}'", decl.full_name),
                    format!("{}:{}", decl.file, decl.line_start),
                )
                .with_remediation("rename one of the declarations or move it to another namespace"),
            );
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER_SOURCE: &str = r#"
using System;

namespace Game.Core
{
    [Serializable]
    public class PlayerController : MonoBehaviour, IDamageable
    {
        public static PlayerController Instance;
        private int health = 100;
        public event Action OnDeath;

        public int Health { get; set; }

        private PlayerController() { }

        public void TakeDamage(int amount)
        {
            if (amount > 0 && health > 0)
            {
                health -= amount;
                if (health <= 0)
                {
                    OnDeath();
                }
            }
        }

        public bool IsAlive() => health > 0;
    }

    public interface IDamageable
    {
        void TakeDamage(int amount);
    }
}
"#;

    #[test]
    fn extracts_declarations_with_namespace() {
        let out = extract_from_source("PlayerController.cs", PLAYER_SOURCE);
        assert!(out.issues.is_empty(), "unexpected issues: {:?}", out.issues);
        assert_eq!(out.declarations.len(), 2);

        let player = &out.declarations[0];
        assert_eq!(player.name, "PlayerController");
        assert_eq!(player.full_name, "Game.Core.PlayerController");
        assert_eq!(player.namespace, "Game.Core");
        assert_eq!(player.kind, DeclarationKind::Class);
        assert_eq!(player.base_types, vec!["MonoBehaviour".to_string()]);
        assert_eq!(player.interfaces, vec!["IDamageable".to_string()]);
        assert_eq!(player.attributes, vec!["Serializable".to_string()]);

        let iface = &out.declarations[1];
        assert_eq!(iface.kind, DeclarationKind::Interface);
        assert_eq!(iface.full_name, "Game.Core.IDamageable");
    }

    #[test]
    fn extracts_members() {
        let out = extract_from_source("PlayerController.cs", PLAYER_SOURCE);
        let player = &out.declarations[0];

        let names: Vec<&str> = player.methods.iter().map(|m| m.name.as_str()).collect();
        assert!(names.contains(&"TakeDamage"));
        assert!(names.contains(&"IsAlive"));
        assert!(names.contains(&"PlayerController"));

        let ctor = player.methods.iter().find(|m| m.is_constructor).unwrap();
        assert_eq!(ctor.visibility, Visibility::Private);

        let instance = player.fields.iter().find(|f| f.name == "Instance").unwrap();
        assert!(instance.is_static);
        assert_eq!(instance.type_name, "PlayerController");
        let on_death = player.fields.iter().find(|f| f.name == "OnDeath").unwrap();
        assert!(on_death.is_event);
        // Locals inside TakeDamage must not leak into the field list
        assert!(!player.fields.iter().any(|f| f.name == "amount"));

        let health = player.properties.iter().find(|p| p.name == "Health").unwrap();
        assert!(health.has_getter && health.has_setter);
    }

    #[test]
    fn complexity_is_one_plus_branch_count() {
        // 2x if, 1x while, 1x &&: 1 + 4 = 5
        let body = "if (a && b) { while (x) { if (y) { } } }";
        assert_eq!(cyclomatic_complexity(body), 5);
        assert_eq!(cyclomatic_complexity(""), 1);
        // Word boundaries: no branching here
        assert_eq!(cyclomatic_complexity("int ifdef = elsewhere;"), 1);
    }

    #[test]
    fn take_damage_complexity_counts_nested_ifs() {
        let out = extract_from_source("PlayerController.cs", PLAYER_SOURCE);
        let player = &out.declarations[0];
        let td = player.methods.iter().find(|m| m.name == "TakeDamage").unwrap();
        // 2x if + 1x && = 1 + 3
        assert_eq!(td.cyclomatic_complexity, 4);
    }

    #[test]
    fn braces_in_strings_and_comments_do_not_unbalance() {
        let source = r#"
public class Quoter
{
    // a stray { in a comment
    private string brace = "{";
    /* and another } here */
    public string Get() { return brace; }
}
"#;
        let out = extract_from_source("Quoter.cs", source);
        assert_eq!(out.declarations.len(), 1);
        assert!(out.issues.is_empty());
        assert!(out.declarations[0].methods.iter().any(|m| m.name == "Get"));
    }

    #[test]
    fn unbalanced_declaration_is_skipped_with_issue() {
        let source = "public class Broken {\n public void M() {\n";
        let out = extract_from_source("Broken.cs", source);
        assert!(out.declarations.is_empty());
        assert_eq!(out.issues.len(), 1);
        assert_eq!(out.issues[0].severity, Severity::Warning);
        assert_eq!(out.issues[0].category, "extraction");
    }

    #[test]
    fn no_declarations_is_not_an_error() {
        let out = extract_from_source("Empty.cs", "// nothing to see\n");
        assert!(out.declarations.is_empty());
        assert!(out.issues.is_empty());
        assert_eq!(out.stats.comment_lines, 1);
    }

    #[test]
    fn interface_name_heuristic() {
        assert!(looks_like_interface("IDamageable"));
        assert!(looks_like_interface("IO"));
        assert!(!looks_like_interface("Item"));
        assert!(!looks_like_interface("Manager"));
        assert!(!looks_like_interface("I"));
    }

    #[test]
    fn type_normalization_strips_generics_and_arrays() {
        assert_eq!(normalize_type_name("List<Enemy>"), "List");
        assert_eq!(normalize_type_name("Enemy[]"), "Enemy");
        assert_eq!(normalize_type_name("System.Collections.IEnumerator"), "IEnumerator");
        assert_eq!(normalize_type_name(" Dictionary<string, Enemy> "), "Dictionary");
    }

    #[test]
    fn duplicate_full_names_keep_first_and_flag_critical() {
        let a = extract_from_source("A.cs", "public class Foo { public void One() { } }");
        let b = extract_from_source("B.cs", "public class Foo { }");
        let mut issues = Vec::new();
        let merged: Vec<Declaration> = a
            .declarations
            .into_iter()
            .chain(b.declarations)
            .collect();
        let unique = dedupe_declarations(merged, &mut issues);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].file, "A.cs");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Critical);
    }

    #[test]
    fn file_stats_count_comment_and_code_lines() {
        let text = "// header\n/* block\n   still block */\npublic class A { }\n";
        let stats = compute_file_stats("A.cs", text);
        assert_eq!(stats.total_lines, 4);
        assert_eq!(stats.comment_lines, 3);
        assert_eq!(stats.code_lines, 1);
    }
}
