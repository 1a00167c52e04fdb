use std::fs;
use std::path::Path;

use failure::Error;
use reqwest::Url;
use sec::Secret;

use crate::errors::ConfigError;
use crate::github;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub github: GitHubConfig,
    pub gitea: GiteaConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// A personal access token. Gitea also uses it to clone private
    /// repositories.
    pub token: Secret<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Used to derive the URL Gitea clones from.
    #[serde(default = "default_web_url")]
    pub web_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct GiteaConfig {
    /// The base URL for the Gitea API (e.g. `https://gitea.example.com/api/v1`).
    pub url: String,
    pub token: Secret<String>,
    /// Create mirrors of repositories with an unknown visibility as private.
    ///
    /// By default they are created as public.
    #[serde(default)]
    pub unknown_as_private: bool,
}

fn default_api_url() -> String {
    github::DEFAULT_API_URL.to_string()
}

fn default_web_url() -> String {
    github::DEFAULT_WEB_URL.to_string()
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let location = path.display().to_string();
        debug!("Loading config from {}", location);

        let src = fs::read_to_string(path).map_err(|cause| ConfigError::Unreadable {
            path: location.clone(),
            cause,
        })?;

        Config::parse(&src, &location)
    }

    /// Parse and validate the contents of a config file, using `location` in
    /// error messages.
    pub fn parse(src: &str, location: &str) -> Result<Config, ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            path: location.to_string(),
            reason,
        };

        let cfg: Config = toml::from_str(src).map_err(|e| invalid(e.to_string()))?;
        cfg.validate().map_err(invalid)?;

        Ok(cfg)
    }

    fn validate(&self) -> Result<(), String> {
        if self.github.token.reveal().trim().is_empty() {
            return Err(String::from("github.token is empty"));
        }
        if self.gitea.token.reveal().trim().is_empty() {
            return Err(String::from("gitea.token is empty"));
        }

        let urls = [
            ("github.api-url", &self.github.api_url),
            ("github.web-url", &self.github.web_url),
            ("gitea.url", &self.gitea.url),
        ];

        for &(key, url) in &urls {
            if let Err(e) = Url::parse(url) {
                return Err(format!("{} ({:?}) is not a valid URL, {}", key, url, e));
            }
        }

        Ok(())
    }

    pub fn example() -> Config {
        Config {
            github: GitHubConfig {
                token: Secret::new(String::from("your-github-token")),
                api_url: default_api_url(),
                web_url: default_web_url(),
            },
            gitea: GiteaConfig {
                url: String::from("https://gitea.example.com/api/v1"),
                token: Secret::new(String::from("your-gitea-token")),
                unknown_as_private: false,
            },
        }
    }

    pub fn as_toml(&self) -> Result<String, Error> {
        let src = toml::to_string(self)?;
        Ok(src)
    }
}
