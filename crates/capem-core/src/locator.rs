//! # Locators
//!
//! Scheme-qualified identifiers for where CA asset bytes come from and
//! where they go. The same type serves sources and destinations; which
//! schemes are acceptable in which role is decided by the resolver.
//!
//! ## Grammar
//!
//! | Scheme   | Form |
//! |----------|------|
//! | `file`   | `file://` `[/]` `seg(/seg)*` — first segment `[-_a-zA-Z0-9]+`, later ones may also contain `.` |
//! | `env`    | `env://NAME` — `[_a-zA-Z0-9]+`, nothing after it |
//! | `github` | `github:///repos/{owner}/{repo}/contents/{path}[?ref={ref}]` — every part `[-_a-zA-Z0-9.]+` |
//! | `s3`     | `s3://{bucket}/{key}` — bucket `[-_a-zA-Z0-9.]+`, key is the non-empty rest |
//!
//! Matching is whole-string. A string with trailing junk is rejected, never
//! truncated to its longest valid prefix.

use std::fmt;
use std::str::FromStr;

use crate::error::LocatorError;

/// The scheme of a [`Locator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Local filesystem path.
    File,
    /// Environment variable, written as a shell `export` line.
    Env,
    /// File in a GitHub repository, via the Get Repository Content API.
    GitHub,
    /// Object in an S3 bucket.
    S3,
}

impl Scheme {
    /// All schemes, in declaration order.
    pub const ALL: [Scheme; 4] = [Scheme::File, Scheme::Env, Scheme::GitHub, Scheme::S3];

    /// The scheme name as it appears before `://`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Env => "env",
            Self::GitHub => "github",
            Self::S3 => "s3",
        }
    }

    fn strip_prefix<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.strip_prefix(self.as_str())?.strip_prefix("://")
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, scheme-typed locator.
///
/// Construct with [`Locator::parse`] or [`Locator::parse_as`]. Every
/// variant reproduces the original text and the matched path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// `file://...`
    File(FileLocator),
    /// `env://...`
    Env(EnvLocator),
    /// `github://...`
    GitHub(GitHubLocator),
    /// `s3://...`
    S3(S3Locator),
}

impl Locator {
    /// Parse a locator, dispatching on its literal `scheme://` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::UnknownScheme`] if the prefix names no known
    /// scheme, or [`LocatorError::Invalid`] if the rest of the text does not
    /// match that scheme's grammar.
    pub fn parse(text: &str) -> Result<Self, LocatorError> {
        let scheme = Scheme::ALL
            .into_iter()
            .find(|s| s.strip_prefix(text).is_some())
            .ok_or_else(|| LocatorError::UnknownScheme {
                text: text.to_string(),
            })?;
        Self::parse_as(scheme, text)
    }

    /// Parse `text` against the grammar of one specific scheme.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::Invalid`] if `text` is not a complete match
    /// for `scheme`'s grammar (including a mismatched prefix).
    pub fn parse_as(scheme: Scheme, text: &str) -> Result<Self, LocatorError> {
        match scheme {
            Scheme::File => FileLocator::parse(text).map(Self::File),
            Scheme::Env => EnvLocator::parse(text).map(Self::Env),
            Scheme::GitHub => GitHubLocator::parse(text).map(Self::GitHub),
            Scheme::S3 => S3Locator::parse(text).map(Self::S3),
        }
    }

    /// The full original locator text.
    pub fn text(&self) -> &str {
        match self {
            Self::File(l) => l.text(),
            Self::Env(l) => l.text(),
            Self::GitHub(l) => l.text(),
            Self::S3(l) => l.text(),
        }
    }

    /// The locator's scheme.
    pub fn scheme(&self) -> Scheme {
        match self {
            Self::File(_) => Scheme::File,
            Self::Env(_) => Scheme::Env,
            Self::GitHub(_) => Scheme::GitHub,
            Self::S3(_) => Scheme::S3,
        }
    }

    /// The scheme-defined path component (everything after `scheme://`).
    pub fn path(&self) -> &str {
        match self {
            Self::File(l) => l.path(),
            Self::Env(l) => l.path(),
            Self::GitHub(l) => l.path(),
            Self::S3(l) => l.path(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl FromStr for Locator {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ---------------------------------------------------------------------------
// Character classes
// ---------------------------------------------------------------------------

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn is_word_or_dot(c: char) -> bool {
    is_word(c) || c == '.'
}

fn is_env_name(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn all_of(s: &str, class: fn(char) -> bool) -> bool {
    !s.is_empty() && s.chars().all(class)
}

// ---------------------------------------------------------------------------
// file://
// ---------------------------------------------------------------------------

/// A local file path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileLocator {
    text: String,
    path: String,
}

impl FileLocator {
    /// Parse a `file://` locator.
    ///
    /// One optional `/` after `file://` is accepted and dropped, so
    /// `file:///certs/ca.pem` and `file://certs/ca.pem` both name
    /// `certs/ca.pem`, relative to the working directory.
    pub fn parse(text: &str) -> Result<Self, LocatorError> {
        let invalid = || LocatorError::Invalid {
            scheme: Scheme::File,
            text: text.to_string(),
        };

        let rest = Scheme::File.strip_prefix(text).ok_or_else(invalid)?;
        let body = rest.strip_prefix('/').unwrap_or(rest);

        let mut segments = body.split('/');
        let first = segments.next().unwrap_or_default();
        if !all_of(first, is_word) {
            return Err(invalid());
        }
        if !segments.all(|seg| all_of(seg, is_word_or_dot)) {
            return Err(invalid());
        }

        Ok(Self {
            text: text.to_string(),
            path: body.to_string(),
        })
    }

    /// The full original locator text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The filesystem path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

// ---------------------------------------------------------------------------
// env://
// ---------------------------------------------------------------------------

/// An environment variable name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvLocator {
    text: String,
    path: String,
}

impl EnvLocator {
    /// Parse an `env://` locator.
    pub fn parse(text: &str) -> Result<Self, LocatorError> {
        match Scheme::Env.strip_prefix(text) {
            Some(name) if all_of(name, is_env_name) => Ok(Self {
                text: text.to_string(),
                path: name.to_string(),
            }),
            _ => Err(LocatorError::Invalid {
                scheme: Scheme::Env,
                text: text.to_string(),
            }),
        }
    }

    /// The full original locator text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The variable name.
    pub fn path(&self) -> &str {
        &self.path
    }
}

// ---------------------------------------------------------------------------
// github://
// ---------------------------------------------------------------------------

/// A file in a GitHub repository, addressed the way the Get Repository
/// Content API addresses it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GitHubLocator {
    text: String,
    path: String,
    owner: String,
    repo: String,
    repo_path: String,
    reference: Option<String>,
}

impl GitHubLocator {
    /// Parse a `github://` locator.
    pub fn parse(text: &str) -> Result<Self, LocatorError> {
        let invalid = || LocatorError::Invalid {
            scheme: Scheme::GitHub,
            text: text.to_string(),
        };

        let rest = Scheme::GitHub.strip_prefix(text).ok_or_else(invalid)?;
        let (resource, query) = match rest.split_once('?') {
            Some((resource, query)) => (resource, Some(query)),
            None => (rest, None),
        };

        let reference = match query {
            None => None,
            Some(q) => match q.strip_prefix("ref=") {
                Some(r) if all_of(r, is_word_or_dot) => Some(r.to_string()),
                _ => return Err(invalid()),
            },
        };

        let tail = resource.strip_prefix("/repos/").ok_or_else(invalid)?;
        let mut parts = tail.splitn(4, '/');
        let owner = parts.next().unwrap_or_default();
        let repo = parts.next().unwrap_or_default();
        let contents = parts.next().unwrap_or_default();
        let repo_path = parts.next().unwrap_or_default();

        if !all_of(owner, is_word_or_dot)
            || !all_of(repo, is_word_or_dot)
            || contents != "contents"
            || !repo_path.split('/').all(|seg| all_of(seg, is_word_or_dot))
        {
            return Err(invalid());
        }

        Ok(Self {
            text: text.to_string(),
            path: rest.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            repo_path: repo_path.to_string(),
            reference,
        })
    }

    /// The full original locator text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The API path, including the `?ref=` query when present.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Repository owner (user or organization).
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Path of the file inside the repository.
    pub fn repo_path(&self) -> &str {
        &self.repo_path
    }

    /// Commit, branch or tag, if the locator named one.
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}

// ---------------------------------------------------------------------------
// s3://
// ---------------------------------------------------------------------------

/// An object in an S3 bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct S3Locator {
    text: String,
    path: String,
    bucket: String,
    key: String,
}

impl S3Locator {
    /// Parse an `s3://` locator.
    pub fn parse(text: &str) -> Result<Self, LocatorError> {
        let invalid = || LocatorError::Invalid {
            scheme: Scheme::S3,
            text: text.to_string(),
        };

        let rest = Scheme::S3.strip_prefix(text).ok_or_else(invalid)?;
        let (bucket, key) = rest.split_once('/').ok_or_else(invalid)?;

        if !all_of(bucket, is_word_or_dot) || key.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            text: text.to_string(),
            path: rest.to_string(),
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    /// The full original locator text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// `bucket/key`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key, which may itself contain `/`.
    pub fn key(&self) -> &str {
        &self.key
    }
}
