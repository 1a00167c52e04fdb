use std::io::Write;

use failure::Error;
use sec::Secret;

use crate::config::Config;
use crate::errors::RepoNotFound;
use crate::gitea::Gitea;
use crate::github::GitHub;
use crate::migration;
use crate::repo::Repository;
use crate::{Destination, Source};

/// Drives the whole process of mirroring repositories from a `Source` into a
/// `Destination`.
#[derive(Debug)]
pub struct Driver<S, D> {
    source: S,
    destination: D,
    source_token: Secret<String>,
}

impl Driver<GitHub, Gitea> {
    /// Mirror from GitHub into Gitea, as described by the config.
    pub fn with_config(cfg: Config) -> Result<Driver<GitHub, Gitea>, Error> {
        let Config { github, gitea } = cfg;

        let source = GitHub::with_config(&github);
        let destination = Gitea::with_config(gitea, &github.web_url)?;

        Ok(Driver::new(source, destination, github.token))
    }
}

impl<S: Source, D: Destination> Driver<S, D> {
    pub fn new(source: S, destination: D, source_token: Secret<String>) -> Driver<S, D> {
        Driver {
            source,
            destination,
            source_token,
        }
    }

    pub fn source_repositories(&self) -> Result<Vec<Repository>, Error> {
        info!("Fetching repositories from {}", self.source.name());
        let repos = self.source.repositories(self.source_token.reveal())?;
        info!("Found {} repos on {}", repos.len(), self.source.name());

        Ok(repos)
    }

    pub fn destination_repositories(&self) -> Result<Vec<Repository>, Error> {
        info!("Fetching repositories from {}", self.destination.name());
        let repos = self.destination.repositories()?;
        info!("Found {} repos on {}", repos.len(), self.destination.name());

        Ok(repos)
    }

    /// The repositories on the source which don't exist on the destination,
    /// in the order the source listed them.
    pub fn missing(&self) -> Result<Vec<Repository>, Error> {
        let existing = self.destination_repositories()?;
        let available = self.source_repositories()?;

        let missing = migration::find_missing(&available, &existing);
        debug!("{} repos are missing from {}", missing.len(), self.destination.name());

        Ok(missing)
    }

    /// Mirror every missing repository, writing progress to `out`.
    ///
    /// The first failed migration aborts the run. On success, the number of
    /// repositories migrated is returned.
    pub fn sync<W: Write>(&self, out: &mut W) -> Result<usize, Error> {
        let missing = self.missing()?;

        writeln!(out, "Starting migration for {} repos", missing.len())?;

        for repo in &missing {
            writeln!(out, "Migrating {}", repo)?;
            self.migrate(repo)?;
        }

        writeln!(out, "Migrated {} repos successfully", missing.len())?;
        Ok(missing.len())
    }

    /// Mirror a single repository, looking it up on the source by its full
    /// name.
    pub fn migrate_one(&self, full_name: &str) -> Result<Repository, Error> {
        let repos = self.source_repositories()?;

        let repo = repos
            .into_iter()
            .find(|repo| repo.full_name() == full_name)
            .ok_or_else(|| RepoNotFound {
                name: full_name.to_string(),
                platform: self.source.name().to_string(),
            })?;

        self.migrate(&repo)?;
        Ok(repo)
    }

    fn migrate(&self, repo: &Repository) -> Result<(), Error> {
        info!("Migrating {} into {}", repo, self.destination.name());
        self.destination.migrate(repo, self.source_token.reveal())
    }
}

/// Print the chain of causes behind an error.
pub fn display_error<W: Write>(writer: &mut W, err: &Error) -> Result<(), Error> {
    writeln!(writer, "Error: {}", err)?;

    for cause in err.iter_chain().skip(1) {
        writeln!(writer, "\tCaused By: {}", cause)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{FailedRequest, MigrationFailed};
    use crate::repo::Visibility;
    use reqwest::StatusCode;
    use failure::ResultExt;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    type Events = Rc<RefCell<Vec<String>>>;

    struct FakeSource {
        repos: Vec<Repository>,
        fail: bool,
        events: Events,
    }

    impl Source for FakeSource {
        fn name(&self) -> &str {
            "FakeSource"
        }

        fn repositories(&self, token: &str) -> Result<Vec<Repository>, Error> {
            self.events.borrow_mut().push(format!("list source ({})", token));

            if self.fail {
                let err = FailedRequest {
                    status: StatusCode::UNAUTHORIZED,
                    url: String::from("/user/repos"),
                };
                Err(err.into())
            } else {
                Ok(self.repos.clone())
            }
        }
    }

    struct FakeDestination {
        repos: Vec<Repository>,
        reject: Option<&'static str>,
        events: Events,
    }

    impl Destination for FakeDestination {
        fn name(&self) -> &str {
            "FakeDestination"
        }

        fn repositories(&self) -> Result<Vec<Repository>, Error> {
            self.events.borrow_mut().push(String::from("list destination"));
            Ok(self.repos.clone())
        }

        fn migrate(&self, repo: &Repository, source_token: &str) -> Result<(), Error> {
            self.events
                .borrow_mut()
                .push(format!("migrate {} ({})", repo, source_token));

            if self.reject == Some(repo.full_name()) {
                let err = MigrationFailed {
                    repo: repo.full_name().to_string(),
                    status: StatusCode::CONFLICT,
                };
                Err(err.into())
            } else {
                Ok(())
            }
        }
    }

    fn repo(name: &str, visibility: Visibility) -> Repository {
        Repository::new(name, visibility).unwrap()
    }

    fn driver(
        source: Vec<Repository>,
        destination: Vec<Repository>,
    ) -> (Driver<FakeSource, FakeDestination>, Events) {
        let events = Events::default();

        let source = FakeSource {
            repos: source,
            fail: false,
            events: Rc::clone(&events),
        };
        let destination = FakeDestination {
            repos: destination,
            reject: None,
            events: Rc::clone(&events),
        };
        let driver = Driver::new(source, destination, Secret::new(String::from("gh-token")));

        (driver, events)
    }

    fn migrations(events: &Events) -> Vec<String> {
        events
            .borrow()
            .iter()
            .filter(|e| e.starts_with("migrate"))
            .cloned()
            .collect()
    }

    #[test]
    fn sync_the_missing_repo() {
        let (driver, events) = driver(
            vec![
                repo("team-a/a-repo", Visibility::Public),
                repo("team-a/b-repo", Visibility::Private),
            ],
            vec![repo("team-b/a-repo", Visibility::Public)],
        );
        let mut out = Vec::new();

        let got = driver.sync(&mut out).unwrap();

        assert_eq!(got, 1);
        assert_eq!(
            *events.borrow(),
            vec![
                "list destination",
                "list source (gh-token)",
                "migrate team-a/b-repo (gh-token)",
            ]
        );
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Starting migration for 1 repos\nMigrating team-a/b-repo\nMigrated 1 repos successfully\n"
        );
    }

    #[test]
    fn sync_when_nothing_is_missing() {
        let (driver, events) = driver(
            vec![repo("team-a/a-repo", Visibility::Public)],
            vec![repo("team-a/a-repo", Visibility::Public)],
        );
        let mut out = Vec::new();

        let got = driver.sync(&mut out).unwrap();

        assert_eq!(got, 0);
        assert!(migrations(&events).is_empty());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Starting migration for 0 repos\nMigrated 0 repos successfully\n"
        );
    }

    #[test]
    fn migrations_happen_in_source_order() {
        let (driver, events) = driver(
            vec![
                repo("me/z-repo", Visibility::Public),
                repo("me/a-repo", Visibility::Unknown),
                repo("me/m-repo", Visibility::Private),
            ],
            Vec::new(),
        );

        let got = driver.sync(&mut io::sink()).unwrap();

        assert_eq!(got, 3);
        assert_eq!(
            migrations(&events),
            vec![
                "migrate me/z-repo (gh-token)",
                "migrate me/a-repo (gh-token)",
                "migrate me/m-repo (gh-token)",
            ]
        );
    }

    #[test]
    fn the_first_failed_migration_aborts_the_sync() {
        let (mut driver, events) = driver(
            vec![
                repo("team-a/x", Visibility::Public),
                repo("team-a/y", Visibility::Public),
                repo("team-a/z", Visibility::Public),
            ],
            Vec::new(),
        );
        driver.destination.reject = Some("team-a/y");
        let mut out = Vec::new();

        let err = driver.sync(&mut out).unwrap_err();

        let failed = err.downcast_ref::<MigrationFailed>().unwrap();
        assert_eq!(failed.repo, "team-a/y");
        assert_eq!(failed.status, StatusCode::CONFLICT);
        assert_eq!(
            migrations(&events),
            vec!["migrate team-a/x (gh-token)", "migrate team-a/y (gh-token)"]
        );
        assert!(!String::from_utf8(out).unwrap().contains("successfully"));
    }

    #[test]
    fn listing_failures_abort_before_migrating() {
        let (mut driver, events) = driver(vec![repo("team-a/x", Visibility::Public)], Vec::new());
        driver.source.fail = true;

        let err = driver.sync(&mut io::sink()).unwrap_err();

        assert!(err.downcast_ref::<FailedRequest>().is_some());
        assert!(migrations(&events).is_empty());
    }

    #[test]
    fn migrate_a_single_repo() {
        let (driver, events) = driver(
            vec![
                repo("some-team/a-repo", Visibility::Public),
                repo("Muscaw/gitea-github-sync", Visibility::Private),
            ],
            Vec::new(),
        );

        let got = driver.migrate_one("Muscaw/gitea-github-sync").unwrap();

        assert_eq!(got, repo("Muscaw/gitea-github-sync", Visibility::Private));
        assert_eq!(
            *events.borrow(),
            vec![
                "list source (gh-token)",
                "migrate Muscaw/gitea-github-sync (gh-token)",
            ]
        );
    }

    #[test]
    fn migrating_an_unknown_repo_is_an_error() {
        let (driver, events) = driver(vec![repo("team-a/a-repo", Visibility::Public)], Vec::new());

        let err = driver.migrate_one("team-b/a-repo").unwrap_err();

        let not_found = err.downcast_ref::<RepoNotFound>().unwrap();
        assert_eq!(not_found.name, "team-b/a-repo");
        assert_eq!(
            err.to_string(),
            "Repository team-b/a-repo does not exist on FakeSource"
        );
        assert!(migrations(&events).is_empty());
    }

    #[test]
    fn display_the_cause_chain() {
        let inner: Error = FailedRequest {
            status: StatusCode::NOT_FOUND,
            url: String::from("https://example.com/user/repos"),
        }
        .into();
        let err: Error = Err::<(), Error>(inner)
            .context("Unable to list the repositories on Gitea")
            .unwrap_err()
            .into();
        let mut out = Vec::new();

        display_error(&mut out, &err).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Error: Unable to list the repositories on Gitea\n\tCaused By: Request to https://example.com/user/repos failed with 404 Not Found\n"
        );
    }
}
