//! A scoped parser and printer for Go file headers.
//!
//! Only the part of a Go file that vendoring cares about is understood:
//! build constraint comments before the package clause, the package name and
//! its import comment, and the import declarations. Everything after the last
//! import declaration is never looked at.
//!
//! Every import path and the import comment are recorded with their byte
//! span, so [`rewrite_source`] can replace them in place and leave every
//! other byte of the file untouched.

mod scanner;

use anyhow::{Context, Result, bail};
use scanner::Scanner;
use std::ops::Range;
use std::path::Path;

/// One import declaration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Local name: an identifier, `.` or `_`.
    pub name: Option<String>,
    /// Decoded import path.
    pub path: String,
    /// Span of the string literal, quotes included.
    pub span: Range<usize>,
}

/// The `// import "path"` annotation after a package clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportComment {
    pub path: String,
    /// Span of the whole comment, including leading blanks on its line.
    pub span: Range<usize>,
}

/// Parsed header of a Go source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoHeader {
    pub package_name: String,
    /// Bodies of `// +build` lines, in order.
    pub build_lines: Vec<String>,
    /// Body of the `//go:build` line.
    pub go_build: Option<String>,
    pub import_comment: Option<ImportComment>,
    pub imports: Vec<ImportSpec>,
}

impl GoHeader {
    /// Import paths in declaration order.
    pub fn import_paths(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(|i| i.path.as_str())
    }
}

/// Read and parse the header of a Go file.
pub fn parse_file(path: &Path) -> Result<GoHeader> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read Go file: {}", path.display()))?;
    parse_header(&source).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse the header of Go source text.
pub fn parse_header(source: &str) -> Result<GoHeader> {
    let mut sc = Scanner::new(source);
    let mut header = GoHeader::default();

    // Leading comments carry build constraints.
    loop {
        sc.skip_space();
        if sc.starts_with("//") {
            let (text, _) = sc.line_comment();
            let body = text.trim_start_matches("//");
            if let Some(rest) = body.trim_start().strip_prefix("+build") {
                if rest.is_empty() || rest.starts_with([' ', '\t']) {
                    header.build_lines.push(rest.trim().to_string());
                }
            } else if let Some(rest) = body.strip_prefix("go:build") {
                header.go_build = Some(rest.trim().to_string());
            }
        } else if sc.starts_with("/*") {
            sc.block_comment()?;
        } else {
            break;
        }
    }

    if sc.ident().as_deref() != Some("package") {
        bail!("expected package clause");
    }
    sc.skip_blanks();
    header.package_name = match sc.ident() {
        Some(name) => name,
        None => bail!("expected package name"),
    };

    let line_start = sc.pos();
    sc.skip_blanks();
    let comment_start = sc.pos();
    let comment = if sc.starts_with("//") {
        Some(sc.line_comment())
    } else if sc.starts_with("/*") {
        Some(sc.block_comment()?)
    } else {
        None
    };
    if let Some((text, span)) = comment {
        if let Some(path) = import_comment_path(text) {
            let start = if comment_start > line_start { line_start } else { span.start };
            header.import_comment = Some(ImportComment {
                path,
                span: start..span.end,
            });
        }
    }

    loop {
        sc.skip_space_and_comments()?;
        if sc.eat(';') {
            continue;
        }
        let save = sc.pos();
        if sc.ident().as_deref() != Some("import") {
            sc.reset(save);
            break;
        }
        sc.skip_space_and_comments()?;
        if sc.eat('(') {
            loop {
                sc.skip_space_and_comments()?;
                if sc.eat(';') {
                    continue;
                }
                if sc.eat(')') {
                    break;
                }
                if sc.at_end() {
                    bail!("unterminated import group");
                }
                header.imports.push(import_spec(&mut sc)?);
            }
        } else {
            header.imports.push(import_spec(&mut sc)?);
        }
    }

    Ok(header)
}

fn import_spec(sc: &mut Scanner<'_>) -> Result<ImportSpec> {
    let name = if sc.eat('.') {
        Some(".".to_string())
    } else {
        sc.ident()
    };
    sc.skip_blanks();
    let Some((path, span)) = sc.string_lit()? else {
        bail!("expected import path at byte {}", sc.pos());
    };
    Ok(ImportSpec { name, path, span })
}

fn import_comment_path(comment: &str) -> Option<String> {
    let body = comment
        .strip_prefix("//")
        .or_else(|| comment.strip_prefix("/*").and_then(|c| c.strip_suffix("*/")))?;
    let rest = body.trim().strip_prefix("import")?;
    let quoted = rest.trim();
    let inner = quoted.strip_prefix('"')?.strip_suffix('"')?;
    if inner.is_empty() { None } else { Some(inner.to_string()) }
}

/// Rewrite import paths, and optionally drop the import comment.
///
/// `rename` maps an import path to its replacement. Returns `None` when the
/// text would not change.
pub fn rewrite_source<F>(
    source: &str,
    header: &GoHeader,
    rename: F,
    strip_import_comment: bool,
) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();
    for spec in &header.imports {
        if let Some(new_path) = rename(&spec.path) {
            if new_path != spec.path {
                edits.push((spec.span.clone(), format!("\"{new_path}\"")));
            }
        }
    }
    if strip_import_comment {
        if let Some(comment) = &header.import_comment {
            edits.push((comment.span.clone(), String::new()));
        }
    }
    if edits.is_empty() {
        return None;
    }

    edits.sort_by_key(|(span, _)| std::cmp::Reverse(span.start));
    let mut out = source.to_string();
    for (span, text) in edits {
        out.replace_range(span, &text);
    }
    Some(out)
}
