//! # Shared Environment Output File
//!
//! All `env://` destinations of a job append to one file of
//! `export 'NAME'='VALUE'` lines. The file is created (truncated) by the
//! first destination that needs it and never reopened for the rest of the
//! job. Lines are written whole under a mutex, so concurrent destinations
//! never interleave.

use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, OnceCell};

use crate::error::EnvFileError;

/// Line terminator for the host platform.
pub const LINE_ENDING: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Lazily created, append-serialized output file.
#[derive(Debug)]
pub struct EnvFile {
    path: PathBuf,
    file: OnceCell<Mutex<File>>,
}

impl EnvFile {
    /// An output file at `path`. Nothing is touched until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: OnceCell::new(),
        }
    }

    /// Where the lines go.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether any destination has opened the file yet.
    pub fn is_open(&self) -> bool {
        self.file.initialized()
    }

    /// Append one `export` line for `name` holding `value`.
    ///
    /// The first call creates or truncates the file. `value` is written
    /// verbatim, without quoting or escaping.
    ///
    /// # Errors
    ///
    /// [`EnvFileError::Open`] if this call had to open the file and could
    /// not, [`EnvFileError::Write`] if the line could not be written.
    pub async fn append_export(&self, name: &str, value: &[u8]) -> Result<(), EnvFileError> {
        let line = export_line(name, value);
        let file = self
            .file
            .get_or_try_init(|| async {
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(&self.path)
                    .await?;
                tracing::debug!(path = %self.path.display(), "opened env output file");
                Ok::<_, std::io::Error>(Mutex::new(file))
            })
            .await
            .map_err(EnvFileError::Open)?;

        let mut file = file.lock().await;
        file.write_all(&line).await.map_err(EnvFileError::Write)?;
        file.flush().await.map_err(EnvFileError::Write)
    }
}

/// `export 'NAME'='VALUE'` plus the platform line ending.
pub fn export_line(name: &str, value: &[u8]) -> Vec<u8> {
    let mut line = Vec::with_capacity(name.len() + value.len() + 16);
    line.extend_from_slice(b"export '");
    line.extend_from_slice(name.as_bytes());
    line.extend_from_slice(b"'='");
    line.extend_from_slice(value);
    line.push(b'\'');
    line.extend_from_slice(LINE_ENDING.as_bytes());
    line
}
