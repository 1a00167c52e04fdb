//! Mirror the GitHub repositories you own into a Gitea instance.
//!
//! Both platforms are listed, the GitHub repositories whose bare name doesn't
//! exist on Gitea are worked out, and Gitea is asked to create a pull mirror
//! of each one using its own migration feature.

extern crate failure;
#[macro_use]
extern crate failure_derive;
#[macro_use]
extern crate log;
extern crate reqwest;
extern crate sec;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate toml;

#[cfg(test)]
extern crate tempfile;

pub mod config;
pub mod driver;
pub mod errors;
pub mod gitea;
pub mod github;
pub mod migration;
pub mod report;
mod repo;
#[cfg(test)]
mod test_server;
mod utils;

pub use crate::config::Config;
pub use crate::driver::Driver;
pub use crate::errors::{ConfigError, FailedRequest, InvalidRepoName, MigrationFailed, RepoNotFound};
pub use crate::gitea::Gitea;
pub use crate::github::GitHub;
pub use crate::repo::{Repository, Stats, Visibility};
pub use crate::utils::{next_link, Page, Paginated};

use failure::Error;

/// The platform repositories are read from.
pub trait Source {
    fn name(&self) -> &str;

    /// Every repository visible to whoever owns `token`.
    fn repositories(&self, token: &str) -> Result<Vec<Repository>, Error>;
}

/// The platform repositories are mirrored into.
pub trait Destination {
    fn name(&self) -> &str;

    fn repositories(&self) -> Result<Vec<Repository>, Error>;

    /// Ask the destination to start mirroring `repo`, authenticating against
    /// the source platform with `source_token`.
    ///
    /// This returns as soon as the request is accepted. The clone itself
    /// happens asynchronously on the destination.
    fn migrate(&self, repo: &Repository, source_token: &str) -> Result<(), Error>;
}
