use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::Client;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::SourceError;

/// Where a page's markup comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Url(Url),
    File(PathBuf),
}

impl Source {
    /// Classify a data source string: an http(s) URL, or else an existing file.
    pub fn resolve(raw: &str) -> Result<Self, SourceError> {
        if let Ok(url) = Url::parse(raw) {
            match url.scheme() {
                "http" | "https" => return Ok(Source::Url(url)),
                "file" => {
                    if let Ok(path) = url.to_file_path() {
                        if path.is_file() {
                            return Ok(Source::File(path));
                        }
                    }
                }
                _ => {}
            }
        }

        let path = Path::new(raw);
        if path.is_file() {
            Ok(Source::File(path.to_path_buf()))
        } else {
            Err(SourceError::Unresolvable {
                source_str: raw.to_string(),
            })
        }
    }

    /// Base for resolving relative item links. Only remote listings have one.
    pub fn base_url(&self) -> Option<&Url> {
        match self {
            Source::Url(url) => Some(url),
            Source::File(_) => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{}", url),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Join `link` onto the listing URL if there is one; otherwise use it verbatim.
pub fn resolve_link(base: Option<&Url>, link: &str) -> String {
    match base.map(|b| b.join(link)) {
        Some(Ok(joined)) => joined.to_string(),
        _ => link.to_string(),
    }
}

/// Fetches page markup over HTTP or from disk.
pub struct SourceLoader {
    client: Client,
}

impl SourceLoader {
    pub fn new(user_agent: &str) -> reqwest::Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    /// Resolve then load in one step.
    pub async fn fetch(&self, raw: &str) -> Result<String, SourceError> {
        let source = Source::resolve(raw)?;
        self.load(&source).await
    }

    #[instrument(skip(self, source), fields(source = %source))]
    pub async fn load(&self, source: &Source) -> Result<String, SourceError> {
        match source {
            Source::Url(url) => {
                let http_err = |err| SourceError::Http {
                    url: url.to_string(),
                    err,
                };
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(http_err)?;

                // Error pages still get parsed; their fields just come out empty.
                let status = response.status();
                if !status.is_success() {
                    warn!("HTTP {} for {}", status, url);
                }
                let body = response.text().await.map_err(http_err)?;
                debug!("Fetched {} bytes", body.len());
                Ok(body)
            }
            Source::File(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|err| SourceError::Io {
                    path: path.display().to_string(),
                    err,
                })?;
                debug!("Read {} bytes", bytes.len());
                // Saved pages are not always UTF-8; bad bytes become U+FFFD.
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_urls_and_files() {
        assert!(matches!(
            Source::resolve("https://itch.io/games/top-rated").unwrap(),
            Source::Url(_)
        ));
        assert!(matches!(
            Source::resolve("tests/fixtures/listing.html").unwrap(),
            Source::File(_)
        ));
    }

    #[test]
    fn unresolvable_source_is_an_error() {
        let err = Source::resolve("no/such/listing.html").unwrap_err();
        assert!(matches!(err, SourceError::Unresolvable { .. }));
        assert!(Source::resolve("ftp://itch.io/x").is_err());
    }

    #[test]
    fn relative_links_join_remote_base() {
        let base = Url::parse("https://itch.io/games/top-rated").unwrap();
        assert_eq!(resolve_link(Some(&base), "/foo"), "https://itch.io/foo");
        assert_eq!(
            resolve_link(Some(&base), "https://someone.itch.io/bar"),
            "https://someone.itch.io/bar"
        );
        assert_eq!(resolve_link(None, "/foo"), "/foo");
    }

    #[tokio::test]
    async fn loads_file_content() {
        let loader = SourceLoader::new("test").unwrap();
        let body = loader.fetch("tests/fixtures/detail_rated.html").await.unwrap();
        assert!(body.contains("rating_count"));
    }

    #[tokio::test]
    async fn non_utf8_file_loads_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.html");
        std::fs::write(&path, b"<a class=\"title\">Caf\xe9 Noir</a>").unwrap();

        let loader = SourceLoader::new("test").unwrap();
        let body = loader.fetch(path.to_str().unwrap()).await.unwrap();
        assert_eq!(body, "<a class=\"title\">Caf\u{FFFD} Noir</a>");
    }

    #[tokio::test]
    async fn missing_file_fails_before_parsing() {
        let loader = SourceLoader::new("test").unwrap();
        assert!(matches!(
            loader.fetch("/foo").await,
            Err(SourceError::Unresolvable { .. })
        ));
    }
}
