use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::error::{ContentError, ContentResult};

/// Host token legacy exports use in place of the repository's own address.
pub const LOCAL_SERVER_TOKEN: &str = "local.fedora.server";

/// Replace the local-server host token in `url` with the configured host.
pub fn substitute_local_server(url: &str, local_server: &str) -> String {
    url.replace(LOCAL_SERVER_TOKEN, local_server)
}

/// Retrieves the bytes behind a URL.
pub trait UrlFetcher: Send + Sync + fmt::Debug {
    fn fetch(&self, url: &str) -> ContentResult<Box<dyn Read + Send>>;
}

/// Blocking fetcher for `http`, `https` and `file` URLs.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with a default client.
    pub fn new() -> ContentResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ContentError::Transport {
                url: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    /// Create a fetcher around a preconfigured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn fetch_file(url: &Url) -> ContentResult<Box<dyn Read + Send>> {
        let path = url.to_file_path().map_err(|_| ContentError::InvalidUrl {
            url: url.to_string(),
            reason: "not a local file path".into(),
        })?;
        match File::open(&path) {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ContentError::Unavailable {
                location: url.to_string(),
                reason: "file not found".into(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn fetch_http(&self, url: &Url) -> ContentResult<Box<dyn Read + Send>> {
        debug!(url = %url, "fetching external content");
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| ContentError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(ContentError::Unavailable {
                location: url.to_string(),
                reason: format!("server answered {status}"),
            });
        }
        if !status.is_success() {
            return Err(ContentError::Transport {
                url: url.to_string(),
                reason: format!("server answered {status}"),
            });
        }
        Ok(Box::new(response))
    }
}

impl UrlFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> ContentResult<Box<dyn Read + Send>> {
        let parsed = Url::parse(url).map_err(|e| ContentError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        match parsed.scheme() {
            "file" => Self::fetch_file(&parsed),
            "http" | "https" => self.fetch_http(&parsed),
            other => Err(ContentError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme {other}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_host_token() {
        assert_eq!(
            substitute_local_server(
                "http://local.fedora.server/fedora/get/demo:1/DS1",
                "localhost:8080"
            ),
            "http://localhost:8080/fedora/get/demo:1/DS1"
        );
        assert_eq!(
            substitute_local_server("http://example.org/a", "localhost:8080"),
            "http://example.org/a"
        );
    }

    #[test]
    fn fetches_file_urls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("external.txt");
        std::fs::write(&path, b"external bytes").unwrap();
        let url = Url::from_file_path(&path).unwrap();

        let fetcher = HttpFetcher::new().unwrap();
        let mut out = Vec::new();
        fetcher
            .fetch(url.as_str())
            .unwrap()
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, b"external bytes");
    }

    #[test]
    fn missing_file_url_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::from_file_path(dir.path().join("missing")).unwrap();
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher.fetch(url.as_str()).err().unwrap();
        assert!(err.is_unavailable());
    }

    #[test]
    fn rejects_unparsable_and_unknown_schemes() {
        let fetcher = HttpFetcher::new().unwrap();
        assert!(matches!(
            fetcher.fetch("not a url").err().unwrap(),
            ContentError::InvalidUrl { .. }
        ));
        assert!(matches!(
            fetcher.fetch("ftp://example.org/x").err().unwrap(),
            ContentError::InvalidUrl { .. }
        ));
    }
}
