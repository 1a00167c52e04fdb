//! The errors encountered in this crate.

use reqwest::StatusCode;

/// The server responded with a non-successful status code.
#[derive(Debug, Clone, PartialEq, Fail)]
#[fail(display = "Request to {} failed with {}", url, status)]
pub struct FailedRequest {
    pub status: StatusCode,
    pub url: String,
}

/// The destination refused to start mirroring a repository.
#[derive(Debug, Clone, PartialEq, Fail)]
#[fail(display = "Migrating {} failed with {}", repo, status)]
pub struct MigrationFailed {
    /// The full name (`namespace/name`) of the repository.
    pub repo: String,
    pub status: StatusCode,
}

/// A repository was asked for by name, but the source doesn't have it.
#[derive(Debug, Clone, PartialEq, Fail)]
#[fail(display = "Repository {} does not exist on {}", name, platform)]
pub struct RepoNotFound {
    pub name: String,
    pub platform: String,
}

/// A repository name which isn't of the form `namespace/name`.
#[derive(Debug, Clone, PartialEq, Fail)]
#[fail(display = "\"{}\" is not a valid repository name, expected \"namespace/name\"", name)]
pub struct InvalidRepoName {
    pub name: String,
}

#[derive(Debug, Fail)]
pub enum ConfigError {
    #[fail(display = "Unable to read the config file at {}", path)]
    Unreadable {
        path: String,
        #[fail(cause)]
        cause: ::std::io::Error,
    },
    #[fail(display = "Invalid config file at {}: {}", path, reason)]
    Invalid { path: String, reason: String },
}
