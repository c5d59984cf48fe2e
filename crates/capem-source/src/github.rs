//! # GitHub Backend
//!
//! Fetches single files through the Get Repository Content API:
//! `GET {api}/repos/{owner}/{repo}/contents/{path}[?ref={ref}]`.
//!
//! The response must describe a file (`"type": "file"`) with a base64
//! body. Directories come back as JSON arrays and are rejected, as are
//! symlinks and submodules.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use capem_core::GitHubLocator;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Deserialize;
use url::Url;

use crate::error::{BackendError, FetchError};

/// Default API base, overridden by `GITHUB_API_URL` for GitHub Enterprise.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Environment variable holding the bearer token.
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("capem/", env!("CARGO_PKG_VERSION"));

/// Where the bearer token comes from.
#[derive(Clone)]
pub enum TokenSource {
    /// Read the named environment variable on every fetch.
    Env(String),
    /// A fixed token.
    Static(String),
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env(var) => f.debug_tuple("Env").field(var).finish(),
            Self::Static(_) => f.debug_tuple("Static").field(&"[REDACTED]").finish(),
        }
    }
}

impl TokenSource {
    fn resolve(&self, locator: &str) -> Result<String, FetchError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::Env(var) => std::env::var(var)
                .ok()
                .filter(|t| !t.is_empty())
                .ok_or_else(|| FetchError::MissingToken {
                    locator: locator.to_string(),
                    var: var.clone(),
                }),
        }
    }
}

/// Connection settings for the GitHub API.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API base URL.
    pub api_url: Url,
    /// Bearer token source.
    pub token: TokenSource,
}

impl GitHubConfig {
    /// Load from the environment.
    ///
    /// - `GITHUB_API_URL` (default: `https://api.github.com`)
    /// - `GITHUB_TOKEN` is read lazily, at fetch time
    pub fn from_env() -> Result<Self, BackendError> {
        let raw = std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&raw).map_err(|source| BackendError::InvalidUrl {
            var: "GITHUB_API_URL".into(),
            source,
        })?;
        Ok(Self {
            api_url,
            token: TokenSource::Env(TOKEN_VAR.into()),
        })
    }
}

/// Shared GitHub contents client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: Url,
    token: TokenSource,
}

/// The subset of a contents response capem reads.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Listing(Vec<serde_json::Value>),
    Entry(ContentEntry),
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl GitHubClient {
    /// Build a client from configuration.
    pub fn new(config: GitHubConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers({
                let mut headers = HeaderMap::new();
                headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
                headers.insert(
                    "X-GitHub-Api-Version",
                    HeaderValue::from_static(API_VERSION),
                );
                headers
            })
            .build()
            .map_err(BackendError::HttpClient)?;

        Ok(Self {
            http,
            api_url: config.api_url,
            token: config.token,
        })
    }

    /// Fetch and decode one repository file.
    pub async fn get_file(&self, locator: &GitHubLocator) -> Result<Vec<u8>, FetchError> {
        let text = locator.text();
        let token = self.token.resolve(text)?;

        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url.as_str().trim_end_matches('/'),
            locator.owner(),
            locator.repo(),
            locator.repo_path(),
        );
        let mut request = self.http.get(&url).bearer_auth(token);
        if let Some(reference) = locator.reference() {
            request = request.query(&[("ref", reference)]);
        }

        let resp = request.send().await.map_err(|source| FetchError::Http {
            locator: text.to_string(),
            source,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                locator: text.to_string(),
                status,
                body,
            });
        }

        let entry = match resp.json::<ContentsResponse>().await {
            Ok(ContentsResponse::Entry(entry)) => entry,
            Ok(ContentsResponse::Listing(entries)) => {
                tracing::debug!(locator = %text, entries = entries.len(), "path is a directory");
                return Err(FetchError::NotAFile {
                    locator: text.to_string(),
                    kind: "directory".into(),
                })
            }
            Err(source) => {
                return Err(FetchError::Deserialization {
                    locator: text.to_string(),
                    source,
                })
            }
        };

        decode_entry(text, entry)
    }
}

fn decode_entry(locator: &str, entry: ContentEntry) -> Result<Vec<u8>, FetchError> {
    if entry.kind != "file" {
        return Err(FetchError::NotAFile {
            locator: locator.to_string(),
            kind: entry.kind,
        });
    }

    let encoding = entry.encoding.unwrap_or_default();
    if encoding != "base64" {
        return Err(FetchError::UnsupportedEncoding {
            locator: locator.to_string(),
            encoding,
        });
    }

    // The API wraps the body at 60 columns.
    let packed: Vec<u8> = entry
        .content
        .unwrap_or_default()
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    STANDARD.decode(packed).map_err(|source| FetchError::Decode {
        locator: locator.to_string(),
        source,
    })
}
