use std::fmt::{self, Debug, Formatter};

use failure::{Error, ResultExt};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use sec::Secret;

use crate::config::GiteaConfig;
use crate::errors::MigrationFailed;
use crate::github;
use crate::repo::{Repository, Visibility};
use crate::utils::{self, HttpPages, Page, Paginated};
use crate::Destination;

const ACCEPT: &str = "application/json";

/// A Gitea instance which repositories get mirrored into.
pub struct Gitea {
    api_url: String,
    token: Secret<String>,
    source_web_url: String,
    unknown_as_private: bool,
    client: Client,
}

impl Gitea {
    /// Create a new `Gitea` talking to the API at `api_url` (e.g.
    /// `https://gitea.example.com/api/v1`).
    pub fn new<S: Into<String>>(api_url: S, token: Secret<String>) -> Result<Gitea, Error> {
        let api_url = api_url.into().trim_end_matches('/').to_string();

        Ok(Gitea {
            api_url,
            token,
            source_web_url: github::DEFAULT_WEB_URL.to_string(),
            unknown_as_private: false,
            client: utils::http_client()?,
        })
    }

    /// Mirror into the instance described by `cfg`, cloning from
    /// `source_web_url`.
    pub fn with_config(cfg: GiteaConfig, source_web_url: &str) -> Result<Gitea, Error> {
        let GiteaConfig {
            url,
            token,
            unknown_as_private,
        } = cfg;

        let gitea = Gitea::new(url, token)?
            .source_web_url(source_web_url)
            .unknown_as_private(unknown_as_private);

        Ok(gitea)
    }

    /// Where repositories are cloned from (`https://github.com` by default).
    pub fn source_web_url<S: Into<String>>(mut self, url: S) -> Gitea {
        self.source_web_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create mirrors of repositories with an unknown visibility as private
    /// instead of public.
    pub fn unknown_as_private(mut self, private: bool) -> Gitea {
        self.unknown_as_private = private;
        self
    }

    fn migration_request<'a>(&self, repo: &'a Repository, source_token: &'a str) -> MigrateRequest<'a> {
        let private = match repo.visibility() {
            Visibility::Private => true,
            Visibility::Public => false,
            Visibility::Unknown => {
                warn!(
                    "The visibility of {} is unknown, it will be mirrored as {}",
                    repo,
                    if self.unknown_as_private { "private" } else { "public" }
                );
                self.unknown_as_private
            }
        };

        MigrateRequest {
            auth_token: source_token,
            clone_addr: format!("{}/{}", self.source_web_url, repo.full_name()),
            repo_name: repo.name(),
            service: "github",
            mirror: true,
            private,
        }
    }
}

impl Destination for Gitea {
    fn name(&self) -> &str {
        "Gitea"
    }

    fn repositories(&self) -> Result<Vec<Repository>, Error> {
        debug!("Fetching repositories from Gitea");

        let headers = utils::token_headers(self.token.reveal(), ACCEPT)?;
        let pages = HttpPages::new(self.client.clone(), headers);
        let endpoint = format!("{}/user/repos", self.api_url);

        let repos = list_repositories(&endpoint, |url| pages.fetch(url))
            .context("Unable to fetch repositories from Gitea")?;

        debug!("{} repos on Gitea", repos.len());
        Ok(repos)
    }

    fn migrate(&self, repo: &Repository, source_token: &str) -> Result<(), Error> {
        let endpoint = format!("{}/repos/migrate", self.api_url);
        let body = self.migration_request(repo, source_token);
        debug!(
            "Requesting a mirror of {} from {} (private: {})",
            repo, body.clone_addr, body.private
        );

        let response = self
            .client
            .post(&endpoint)
            .headers(utils::token_headers(self.token.reveal(), ACCEPT)?)
            .json(&body)
            .send()
            .with_context(|_| format!("Unable to send the migration request for {}", repo))?;

        debug!("Received response ({})", response.status());
        utils::trace_response_headers(&response);

        check_migration_response(repo, response.status())
    }
}

impl Debug for Gitea {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Gitea")
            .field("api_url", &self.api_url)
            .field("source_web_url", &self.source_web_url)
            .field("unknown_as_private", &self.unknown_as_private)
            .finish()
    }
}

/// The body of a `POST /repos/migrate` request.
#[derive(Serialize)]
struct MigrateRequest<'a> {
    /// Lets Gitea authenticate against the source when cloning.
    auth_token: &'a str,
    clone_addr: String,
    repo_name: &'a str,
    service: &'static str,
    mirror: bool,
    private: bool,
}

fn check_migration_response(repo: &Repository, status: StatusCode) -> Result<(), Error> {
    if status.is_success() {
        info!("Gitea accepted the migration of {}", repo);
        Ok(())
    } else {
        warn!("Migrating {} failed with {}", repo, status);

        let err = MigrationFailed {
            repo: repo.full_name().to_string(),
            status,
        };
        Err(err.into())
    }
}

fn list_repositories<F>(endpoint: &str, fetch: F) -> Result<Vec<Repository>, Error>
where
    F: FnMut(&str) -> Result<Page<RawRepo>, Error>,
{
    let mut repos = Vec::new();

    for raw in Paginated::new(endpoint, fetch) {
        let raw = raw?;
        let visibility = if raw.private {
            Visibility::Private
        } else {
            Visibility::Public
        };

        repos.push(Repository::new(raw.full_name, visibility)?);
    }

    Ok(repos)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawRepo {
    full_name: String,
    private: bool,
}
