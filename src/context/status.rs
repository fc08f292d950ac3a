//! Package status: where a package lives, whether it is used, what it is.

use std::fmt;

/// Where a package was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Location {
    /// Not classified yet.
    #[default]
    Unknown,
    /// Under GOROOT, or a reserved standard path.
    Standard,
    /// Part of the project itself.
    Local,
    /// In a GOPATH, outside the project.
    External,
    /// Under the project's vendor folder.
    Vendor,
    /// Not found in any search path.
    NotFound,
}

/// Whether a classified package is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Presence {
    #[default]
    Normal,
    /// Referenced but not locatable.
    Missing,
    /// Vendored but no longer referenced.
    Unused,
    /// Matched an excluded prefix of the manifest.
    Excluded,
}

/// What kind of package this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum PkgType {
    #[default]
    Normal,
    /// A `main` package.
    Program,
}

/// The three independent status axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Status {
    pub location: Location,
    pub presence: Presence,
    pub kind: PkgType,
}

impl Status {
    #[must_use]
    pub fn new(location: Location) -> Self {
        Self {
            location,
            ..Self::default()
        }
    }

    /// Missing from every search path.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            location: Location::NotFound,
            presence: Presence::Missing,
            kind: PkgType::Normal,
        }
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.location == Location::NotFound || self.presence == Presence::Missing
    }

    /// Three letter code: location, presence, type.
    #[must_use]
    pub fn letters(&self) -> String {
        let location = match self.location {
            Location::Standard => 's',
            Location::Local => 'l',
            Location::External => 'e',
            Location::Vendor => 'v',
            Location::Unknown | Location::NotFound => ' ',
        };
        let presence = match self.presence {
            Presence::Normal => ' ',
            Presence::Missing => 'm',
            Presence::Unused => 'u',
            Presence::Excluded => 'x',
        };
        let kind = match self.kind {
            PkgType::Normal => ' ',
            PkgType::Program => 'p',
        };
        [location, presence, kind].iter().collect()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters())
    }
}

/// One `+selector` of a status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGroup {
    Local,
    External,
    Vendor,
    Std,
    Excluded,
    Unused,
    Missing,
    Program,
    /// External or missing.
    Outside,
    All,
}

impl StatusGroup {
    /// Parse a selector name without its `+`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "local" | "l" => Self::Local,
            "external" | "ext" | "e" => Self::External,
            "vendor" | "v" => Self::Vendor,
            "std" | "s" => Self::Std,
            "excluded" | "x" => Self::Excluded,
            "unused" | "u" => Self::Unused,
            "missing" | "m" => Self::Missing,
            "program" | "p" => Self::Program,
            "outside" | "o" => Self::Outside,
            "all" | "a" => Self::All,
            _ => return None,
        })
    }

    #[must_use]
    pub fn matches(self, status: &Status) -> bool {
        match self {
            Self::Local => status.location == Location::Local,
            Self::External => status.location == Location::External,
            Self::Vendor => status.location == Location::Vendor,
            Self::Std => status.location == Location::Standard,
            Self::Excluded => status.presence == Presence::Excluded,
            Self::Unused => status.presence == Presence::Unused,
            Self::Missing => status.is_missing(),
            Self::Program => status.kind == PkgType::Program,
            Self::Outside => status.location == Location::External || status.is_missing(),
            Self::All => true,
        }
    }
}

/// An OR of AND groups of selectors: `+vendor,+unused +missing`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFilter {
    pub groups: Vec<Vec<StatusGroup>>,
}

impl StatusFilter {
    /// Add one argument such as `+vendor,+unused`. Returns false if the
    /// argument is not a status selector at all.
    pub fn add_arg(&mut self, arg: &str) -> Result<bool, String> {
        if !arg.starts_with('+') {
            return Ok(false);
        }
        let mut and = Vec::new();
        for part in arg.split(',') {
            let name = part.trim().trim_start_matches('+');
            match StatusGroup::parse(name) {
                Some(group) => and.push(group),
                None => return Err(format!("unknown status selector '{part}'")),
            }
        }
        self.groups.push(and);
        Ok(true)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[must_use]
    pub fn matches(&self, status: &Status) -> bool {
        self.groups.iter().any(|and| and.iter().all(|g| g.matches(status)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters() {
        let mut status = Status::new(Location::Vendor);
        assert_eq!(status.letters(), "v  ");
        status.presence = Presence::Unused;
        status.kind = PkgType::Program;
        assert_eq!(status.to_string(), "vup");
        assert_eq!(Status::not_found().letters(), " m ");
        assert_eq!(Status::new(Location::Standard).letters(), "s  ");
    }

    #[test]
    fn test_filter_and_or() {
        let mut filter = StatusFilter::default();
        assert!(filter.add_arg("+vendor,+unused").unwrap());
        assert!(filter.add_arg("+missing").unwrap());
        assert!(!filter.add_arg("co1/pk1").unwrap());
        assert!(filter.add_arg("+bogus").is_err());

        let mut unused = Status::new(Location::Vendor);
        unused.presence = Presence::Unused;
        assert!(filter.matches(&unused));
        assert!(!filter.matches(&Status::new(Location::Vendor)));
        assert!(filter.matches(&Status::not_found()));
    }

    #[test]
    fn test_outside() {
        assert!(StatusGroup::Outside.matches(&Status::new(Location::External)));
        assert!(StatusGroup::Outside.matches(&Status::not_found()));
        assert!(!StatusGroup::Outside.matches(&Status::new(Location::Local)));
    }
}
