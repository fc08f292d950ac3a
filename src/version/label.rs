//! Picking the best branch or tag for a version prefix.
//!
//! A label matches prefix `p` when it starts with `p` and either equals it or
//! continues with `.` or `-`. Matching labels are split into segments at
//! digit/non-digit boundaries and at every `.` and `-`; each segment remembers
//! the separator in front of it. Segments then compare pairwise: numbers
//! numerically, text lexically, and a `-` separator marks a pre-release that
//! sorts below its release.

use super::VersionRequest;
use std::cmp::Ordering;

/// Where a label came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LabelSource {
    Tag,
    Branch,
}

/// A branch or tag name offered by a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub text: String,
    pub source: LabelSource,
}

impl Label {
    pub fn tag(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: LabelSource::Tag,
        }
    }

    pub fn branch(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: LabelSource::Branch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment<'a> {
    text: &'a str,
    number: i64,
    brk: Option<char>,
}

fn push_segment<'a>(out: &mut Vec<Segment<'a>>, piece: &'a str, brk: Option<char>) {
    if piece.is_empty() {
        return;
    }
    let number = if piece.bytes().all(|b| b.is_ascii_digit()) {
        piece.parse().unwrap_or(i64::MAX)
    } else {
        -1
    };
    out.push(Segment {
        text: piece,
        number,
        brk,
    });
}

fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut brk = None;
    let mut prev_digit: Option<bool> = None;

    for (i, c) in text.char_indices() {
        if c == '.' || c == '-' {
            push_segment(&mut out, &text[start..i], brk);
            start = i + c.len_utf8();
            brk = Some(c);
            prev_digit = None;
            continue;
        }
        let digit = c.is_ascii_digit();
        if prev_digit.is_some_and(|p| p != digit) {
            push_segment(&mut out, &text[start..i], brk);
            start = i;
            brk = None;
        }
        prev_digit = Some(digit);
    }
    push_segment(&mut out, &text[start..], brk);
    out
}

fn matches_prefix(text: &str, prefix: &str) -> bool {
    match text.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with('-'),
        None => false,
    }
}

/// Order two labels matching `prefix`; `Greater` means `a` is preferred.
#[must_use]
pub fn compare_labels(prefix: &str, a: &Label, b: &Label) -> Ordering {
    let pre_a = a.text.get(prefix.len()..).is_some_and(|rest| rest.contains('-'));
    let pre_b = b.text.get(prefix.len()..).is_some_and(|rest| rest.contains('-'));
    if pre_a != pre_b {
        return if pre_a { Ordering::Less } else { Ordering::Greater };
    }

    let sa = segments(&a.text);
    let sb = segments(&b.text);

    for (x, y) in sa.iter().zip(sb.iter()) {
        if x.brk != y.brk {
            if x.brk == Some('-') {
                return Ordering::Less;
            }
            if y.brk == Some('-') {
                return Ordering::Greater;
            }
        }
        match x.number.cmp(&y.number).then_with(|| x.text.cmp(y.text)) {
            Ordering::Equal => {}
            other => return other,
        }
    }

    match sa.len().cmp(&sb.len()) {
        Ordering::Equal => a.source.cmp(&b.source),
        Ordering::Greater => {
            if sa[sb.len()].brk == Some('-') {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        Ordering::Less => {
            if sb[sa.len()].brk == Some('-') {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
    }
}

/// Pick the best label for a version, or `None` when nothing matches.
///
/// `version` is the text after `@`; an `=` prefix requests an exact name
/// (a branch wins over a tag of the same name). A bare version never matches
/// a label.
#[must_use]
pub fn find_label<'a>(version: &str, labels: &'a [Label]) -> Option<&'a Label> {
    match VersionRequest::parse(version) {
        VersionRequest::Latest => None,
        VersionRequest::Exact(name) => labels
            .iter()
            .filter(|l| l.text == name)
            .max_by(|a, b| a.source.cmp(&b.source)),
        VersionRequest::Prefix(prefix) => {
            let best = labels
                .iter()
                .filter(|l| matches_prefix(&l.text, &prefix))
                .max_by(|a, b| compare_labels(&prefix, a, b));
            if let Some(label) = best {
                tracing::debug!("Version {version} matched {:?} {}", label.source, label.text);
            }
            best
        }
    }
}
