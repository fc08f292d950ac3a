//! Build tag evaluation.
//!
//! Each Go file carries a constraint built from two sources: tags implied by
//! its file name (`_test.go`, `_linux.go`, `_windows_amd64.go`) and the build
//! constraint lines in its header. A [`TagSet`] combines them as an AND of the
//! file tags with one group per constraint line, and answers a single
//! question: given the tags the project ignores, should this file be left out?
//!
//! Matching is conservative. A literal matches the ignore list only when it is
//! not negated and its name is listed, so `!windows` is never excluded because
//! `windows` is ignored.

mod build_expr;

pub use build_expr::parse_go_build;

use std::fmt;

/// Operating systems recognised as file name suffixes.
pub const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

/// Architectures recognised as file name suffixes.
pub const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

/// Name of the tag that unconditionally excludes a file.
pub const IGNORE_TAG: &str = "ignore";

/// Name of the file tag carried by `_test.go` files.
pub const TEST_TAG: &str = "test";

/// A single, possibly negated, tag literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub negated: bool,
}

impl Tag {
    #[must_use]
    pub fn new(name: &str) -> Self {
        match name.strip_prefix('!') {
            Some(rest) => Self {
                name: rest.to_string(),
                negated: true,
            },
            None => Self {
                name: name.to_string(),
                negated: false,
            },
        }
    }

    fn matches(&self, ignore: &[String]) -> bool {
        !self.negated && ignore.iter().any(|i| *i == self.name)
    }

    fn contradicts(&self, other: &Tag) -> bool {
        self.name == other.name && self.negated != other.negated
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "!{}", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// How the members of a [`TagGroup`] combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    And,
    Or,
}

/// A node in the constraint tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagGroup {
    pub mode: Mode,
    pub tags: Vec<Tag>,
    pub groups: Vec<TagGroup>,
}

impl TagGroup {
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            tags: Vec::new(),
            groups: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.groups.is_empty()
    }

    fn walk<'a>(&'a self, out: &mut Vec<&'a Tag>) {
        out.extend(self.tags.iter());
        for group in &self.groups {
            group.walk(out);
        }
    }

    fn excluded(&self, ignore: &[String]) -> bool {
        match self.mode {
            Mode::And => {
                self.is_empty()
                    || self.tags.iter().any(|t| t.matches(ignore))
                    || self.groups.iter().any(|g| g.excluded(ignore))
            }
            Mode::Or => {
                !self.is_empty()
                    && self.tags.iter().all(|t| t.matches(ignore))
                    && self.groups.iter().all(|g| g.excluded(ignore))
            }
        }
    }
}

/// The full constraint of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    file_tags: Vec<Tag>,
    root: TagGroup,
}

impl Default for TagSet {
    fn default() -> Self {
        Self {
            file_tags: Vec::new(),
            root: TagGroup::new(Mode::And),
        }
    }
}

impl TagSet {
    /// Constraint for a file named `file_name` with the given header lines.
    ///
    /// `build_lines` are the bodies of `// +build` comments; `go_build` the
    /// body of a `//go:build` line. When both are present the `//go:build`
    /// expression takes precedence. An unparsable expression is logged and
    /// treated as absent.
    #[must_use]
    pub fn for_file(file_name: &str, build_lines: &[String], go_build: Option<&str>) -> Self {
        let mut set = Self::default();
        for tag in file_tags(file_name) {
            set.add_file_tag(tag);
        }

        let expr = go_build.and_then(|expr| match parse_go_build(expr) {
            Ok(group) => Some(group),
            Err(e) => {
                tracing::debug!("Ignoring malformed //go:build in {file_name}: {e}");
                None
            }
        });

        match expr {
            Some(group) => set.root.groups.push(group),
            None => {
                for line in build_lines {
                    set.add_build_line(line);
                }
            }
        }
        set
    }

    /// Add a tag implied by the file name.
    pub fn add_file_tag(&mut self, tag: Tag) {
        self.root.tags.push(tag.clone());
        self.file_tags.push(tag);
    }

    /// Add one `// +build` line: whitespace separates OR terms, commas AND
    /// literals within a term. Separate lines are ANDed.
    pub fn add_build_line(&mut self, line: &str) {
        let mut or = TagGroup::new(Mode::Or);
        for term in line.split_whitespace() {
            let mut and = TagGroup::new(Mode::And);
            for literal in term.split(',').filter(|l| !l.is_empty()) {
                and.tags.push(Tag::new(literal));
            }
            if !and.is_empty() {
                or.groups.push(and);
            }
        }
        if !or.is_empty() {
            self.root.groups.push(or);
        }
    }

    /// Decide whether the file is excluded under `ignore`.
    #[must_use]
    pub fn excluded(&self, ignore: &[String]) -> bool {
        let mut all = Vec::new();
        self.root.walk(&mut all);

        if all.iter().any(|t| t.name == IGNORE_TAG && !t.negated) {
            return true;
        }

        let mut build = Vec::new();
        for group in &self.root.groups {
            group.walk(&mut build);
        }
        if self.file_tags.iter().any(|f| build.iter().any(|b| f.contradicts(b))) {
            return true;
        }

        if self.root.is_empty() {
            return false;
        }
        self.root.excluded(ignore)
    }

    /// True if the file name marks this as a test file.
    #[must_use]
    pub fn is_test(&self) -> bool {
        self.file_tags.iter().any(|t| t.name == TEST_TAG)
    }
}

/// Tags implied by a Go file name.
///
/// The part before the first `_` never carries a tag, so `linux.go` is
/// unconstrained while `x_linux.go` is not.
#[must_use]
pub fn file_tags(file_name: &str) -> Vec<Tag> {
    let stem = match file_name.find('.') {
        Some(dot) => &file_name[..dot],
        None => file_name,
    };
    let Some(first) = stem.find('_') else {
        return Vec::new();
    };
    let mut parts: Vec<&str> = stem[first + 1..].split('_').collect();

    let mut tags = Vec::new();
    if parts.last() == Some(&TEST_TAG) {
        parts.pop();
        tags.push(Tag::new(TEST_TAG));
    }

    let n = parts.len();
    if n >= 2 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
        tags.push(Tag::new(parts[n - 2]));
        tags.push(Tag::new(parts[n - 1]));
    } else if n >= 1 && (KNOWN_OS.contains(&parts[n - 1]) || KNOWN_ARCH.contains(&parts[n - 1])) {
        tags.push(Tag::new(parts[n - 1]));
    }
    tags
}
