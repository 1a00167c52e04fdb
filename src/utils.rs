use std::time::Duration;
use std::vec::IntoIter;

use failure::{Error, ResultExt};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK};
use serde::de::DeserializeOwned;
use serde_json::{self, Value};

use crate::errors::FailedRequest;

pub(crate) const USER_AGENT: &str = "gitea-github-sync";
pub(crate) const TIMEOUT: Duration = Duration::from_secs(30);

/// Create the blocking HTTP client shared by every request to a platform.
pub(crate) fn http_client() -> Result<Client, Error> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(TIMEOUT)
        .build()
        .context("Unable to create the HTTP client")?;

    Ok(client)
}

/// Headers for talking to an API which uses `Authorization: token ...`.
pub(crate) fn token_headers(token: &str, accept: &'static str) -> Result<HeaderMap, Error> {
    let mut auth = HeaderValue::from_str(&format!("token {}", token))
        .context("The API token contains invalid characters")?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static(accept));

    Ok(headers)
}

pub(crate) fn trace_response_headers(response: &Response) {
    if log_enabled!(log::Level::Trace) {
        for line in format!("Response Headers {:#?}", response.headers()).lines() {
            trace!("{}", line);
        }
    }
}

/// One page of results, plus where to find the next one (if there is one).
#[derive(Debug, Clone, PartialEq)]
pub struct Page<I> {
    pub items: Vec<I>,
    pub next: Option<String>,
}

/// Fetches pages from a JSON API which paginates using the `Link` header.
#[derive(Debug, Clone)]
pub(crate) struct HttpPages {
    client: Client,
    headers: HeaderMap,
}

impl HttpPages {
    pub fn new(client: Client, headers: HeaderMap) -> HttpPages {
        HttpPages { client, headers }
    }

    pub fn fetch<I: DeserializeOwned>(&self, endpoint: &str) -> Result<Page<I>, Error> {
        debug!("Sending request to {:?}", endpoint);

        let response = self
            .client
            .get(endpoint)
            .headers(self.headers.clone())
            .send()
            .context("Unable to send request")?;

        let status = response.status();
        debug!("Received response ({})", status);
        trace_response_headers(&response);

        let next = response
            .headers()
            .get(LINK)
            .and_then(|link| link.to_str().ok())
            .and_then(next_link)
            .map(String::from);

        if !status.is_success() {
            warn!("Request failed with {}", status);

            let err = FailedRequest {
                status,
                url: endpoint.to_string(),
            };
            return Err(err.into());
        }

        let raw: Value = response.json().context("Unable to read the response body")?;

        if log_enabled!(log::Level::Trace) {
            trace!("Body:");
            if let Ok(pretty) = serde_json::to_string_pretty(&raw) {
                for line in pretty.lines() {
                    trace!("{}", line);
                }
            }
        }

        let items = serde_json::from_value(raw).context("Unable to deserialize response")?;

        Ok(Page { items, next })
    }
}

/// An iterator which lazily walks every page of a listing, yielding the
/// items in the order the platform returned them.
///
/// Pages are retrieved with `fetch`. Iteration finishes after the first page
/// without a `next` link, or immediately after the first error.
pub struct Paginated<I, F> {
    fetch: F,
    next_endpoint: Option<String>,
    items: IntoIter<I>,
}

impl<I, F> Paginated<I, F>
where
    F: FnMut(&str) -> Result<Page<I>, Error>,
{
    pub fn new(endpoint: &str, fetch: F) -> Self {
        Paginated {
            fetch,
            next_endpoint: Some(String::from(endpoint)),
            items: Vec::new().into_iter(),
        }
    }
}

impl<I, F> Iterator for Paginated<I, F>
where
    F: FnMut(&str) -> Result<Page<I>, Error>,
{
    type Item = Result<I, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(next_item) = self.items.next() {
                return Some(Ok(next_item));
            }

            let endpoint = self.next_endpoint.take()?;

            match (self.fetch)(&endpoint) {
                Ok(Page { items, next }) => {
                    self.items = items.into_iter();
                    self.next_endpoint = next;
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Find the URL with `rel="next"` in a `Link` header.
pub fn next_link(header: &str) -> Option<&str> {
    header
        .split(',')
        .filter_map(|value| {
            let mut parts = value.split(';');
            let target = parts.next()?.trim();

            if !target.starts_with('<') || !target.ends_with('>') {
                return None;
            }

            if parts.any(is_next) {
                Some(&target[1..target.len() - 1])
            } else {
                None
            }
        })
        .next()
}

fn is_next(param: &str) -> bool {
    let mut split = param.splitn(2, '=');
    let key = split.next().unwrap_or_default().trim();
    let value = split.next().unwrap_or_default().trim().trim_matches('"');

    key.eq_ignore_ascii_case("rel")
        && value
            .split_whitespace()
            .any(|rel| rel.eq_ignore_ascii_case("next"))
}
