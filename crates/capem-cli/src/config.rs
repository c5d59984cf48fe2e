//! # Job Files
//!
//! A job comes either from one file holding both sections, or from a
//! catalog file and an order file:
//!
//! ```json
//! {"catalogs": [{"alias": "...", "uri": "...", "category": "..."}]}
//! {"orders":   [{"aliases": ["..."], "uri": "..."}]}
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use capem_core::{CatalogEntry, JobSpec, OrderEntry};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Where the job declarations live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobInput {
    /// Separate catalog and order files.
    Split { catalog: PathBuf, order: PathBuf },
    /// One file with both `catalogs` and `orders`.
    Combined(PathBuf),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    catalogs: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct OrderFile {
    #[serde(default)]
    orders: Vec<OrderEntry>,
}

/// Read and decode the job.
pub fn load_job(input: &JobInput) -> Result<JobSpec> {
    let job = match input {
        JobInput::Combined(path) => read_json::<JobSpec>(path)?,
        JobInput::Split { catalog, order } => {
            let CatalogFile { catalogs } = read_json(catalog)?;
            let OrderFile { orders } = read_json(order)?;
            JobSpec::new(catalogs, orders)
        }
    };

    tracing::debug!(
        catalogs = job.catalogs.len(),
        orders = job.orders.len(),
        "loaded job"
    );
    Ok(job)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}
