use std::fmt::{self, Debug, Formatter};

use failure::{Error, ResultExt};

use crate::config::GitHubConfig;
use crate::repo::{Repository, Visibility};
use crate::utils::{self, HttpPages, Page, Paginated};
use crate::Source;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_WEB_URL: &str = "https://github.com";
const ACCEPT: &str = "application/vnd.github.v3+json";

/// An interface to the repositories stored on GitHub.
#[derive(Clone)]
pub struct GitHub {
    api_url: String,
}

impl GitHub {
    pub fn new<S: Into<String>>(api_url: S) -> GitHub {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        GitHub { api_url }
    }

    /// Create a new `GitHub` with the provided config.
    pub fn with_config(cfg: &GitHubConfig) -> GitHub {
        GitHub::new(cfg.api_url.as_str())
    }

    fn owned_endpoint(&self) -> String {
        format!("{}/user/repos", self.api_url)
    }
}

impl Source for GitHub {
    fn name(&self) -> &str {
        "GitHub"
    }

    fn repositories(&self, token: &str) -> Result<Vec<Repository>, Error> {
        debug!("Fetching owned repositories");

        let pages = HttpPages::new(utils::http_client()?, utils::token_headers(token, ACCEPT)?);
        let owned = list_repositories(&self.owned_endpoint(), |url| pages.fetch(url))
            .context("Unable to fetch repositories from GitHub")?;

        debug!("{} owned repos", owned.len());
        Ok(owned)
    }
}

impl Debug for GitHub {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("GitHub")
            .field("api_url", &self.api_url)
            .finish()
    }
}

fn list_repositories<F>(endpoint: &str, fetch: F) -> Result<Vec<Repository>, Error>
where
    F: FnMut(&str) -> Result<Page<RawRepo>, Error>,
{
    let mut repos = Vec::new();

    for raw in Paginated::new(endpoint, fetch) {
        repos.push(convert_repo(raw?)?);
    }

    Ok(repos)
}

fn convert_repo(raw: RawRepo) -> Result<Repository, Error> {
    let visibility = raw
        .visibility
        .as_ref()
        .map(|v| Visibility::from(v.as_str()))
        .unwrap_or(Visibility::Unknown);

    Repository::new(raw.full_name, visibility).map_err(Error::from)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawRepo {
    full_name: String,
    visibility: Option<String>,
}
