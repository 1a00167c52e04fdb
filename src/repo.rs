use std::fmt::{self, Display, Formatter};

use crate::errors::InvalidRepoName;

/// Whether a repository can be seen by everyone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
    /// Anything the platform reported that isn't exactly `"public"` or
    /// `"private"` (e.g. GitHub's `"internal"`).
    Unknown,
}

impl Visibility {
    pub fn is_private(self) -> bool {
        self == Visibility::Private
    }
}

impl<'a> From<&'a str> for Visibility {
    fn from(other: &'a str) -> Visibility {
        match other {
            "public" => Visibility::Public,
            "private" => Visibility::Private,
            _ => Visibility::Unknown,
        }
    }
}

impl Display for Visibility {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let s = match *self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Unknown => "unknown",
        };

        f.write_str(s)
    }
}

/// A repository as seen on one platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    full_name: String,
    separator: usize,
    visibility: Visibility,
}

impl Repository {
    /// Create a new `Repository`, making sure `full_name` looks like
    /// `namespace/name`.
    pub fn new<S: Into<String>>(
        full_name: S,
        visibility: Visibility,
    ) -> Result<Repository, InvalidRepoName> {
        let full_name = full_name.into();

        let separator = match full_name.find('/') {
            Some(ix) if ix > 0 && ix + 1 < full_name.len() => ix,
            _ => return Err(InvalidRepoName { name: full_name }),
        };

        if full_name[separator + 1..].contains('/') {
            return Err(InvalidRepoName { name: full_name });
        }

        Ok(Repository {
            full_name,
            separator,
            visibility,
        })
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The user or organisation owning this repository.
    pub fn namespace(&self) -> &str {
        &self.full_name[..self.separator]
    }

    /// The repository's bare name, without its namespace.
    pub fn name(&self) -> &str {
        &self.full_name[self.separator + 1..]
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }
}

impl Display for Repository {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

/// How many repositories of each visibility there are.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub public: usize,
    pub private: usize,
    pub unknown: usize,
}

impl Stats {
    pub fn from_repositories<'a, I>(repos: I) -> Stats
    where
        I: IntoIterator<Item = &'a Repository>,
    {
        let mut stats = Stats::default();

        for repo in repos {
            match repo.visibility() {
                Visibility::Public => stats.public += 1,
                Visibility::Private => stats.private += 1,
                Visibility::Unknown => stats.unknown += 1,
            }
        }

        stats
    }

    pub fn total(&self) -> usize {
        self.public + self.private + self.unknown
    }
}
