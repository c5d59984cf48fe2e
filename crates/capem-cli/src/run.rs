//! # Job Execution
//!
//! Loads the job, resolves it, and delivers every order under a deadline.
//! Resolution runs before any I/O, so a structurally broken job never
//! touches a source or a destination.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use capem_order::{Coordinator, ExecutionError, ExecutionReport, Resolver};
use capem_source::SourceBackends;
use clap::{ArgGroup, Args};
use tokio_util::sync::CancellationToken;

use crate::config::{load_job, JobInput};
use crate::logger::TracingLogger;

/// Arguments for a capem run.
#[derive(Args, Debug, Clone)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["catalog", "catalog_order"]),
))]
pub struct RunArgs {
    /// Catalog JSON file (`{"catalogs": [...]}`). Requires --order.
    #[arg(long, value_name = "FILE", requires = "order")]
    pub catalog: Option<PathBuf>,

    /// Order JSON file (`{"orders": [...]}`). Requires --catalog.
    #[arg(long, value_name = "FILE", requires = "catalog")]
    pub order: Option<PathBuf>,

    /// Combined JSON file holding both `catalogs` and `orders`.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["catalog", "order"])]
    pub catalog_order: Option<PathBuf>,

    /// Output file for env:// destinations.
    #[arg(long, value_name = "FILE", default_value = "./capem.env")]
    pub env_out: PathBuf,

    /// Maximum number of destinations delivered concurrently.
    #[arg(long, value_name = "N", default_value = "5")]
    pub con_limit: NonZeroUsize,

    /// Overall deadline for the job, in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,
}

impl RunArgs {
    /// The job input selected by the flags.
    pub fn input(&self) -> Result<JobInput> {
        match (&self.catalog_order, &self.catalog, &self.order) {
            (Some(path), None, None) => Ok(JobInput::Combined(path.clone())),
            (None, Some(catalog), Some(order)) => Ok(JobInput::Split {
                catalog: catalog.clone(),
                order: order.clone(),
            }),
            _ => anyhow::bail!("specify either --catalog-order, or both --catalog and --order"),
        }
    }
}

/// The deadline expired before every destination was delivered.
#[derive(Debug, thiserror::Error)]
#[error("job did not finish within {}s", .0.as_secs())]
pub struct Timeout(pub Duration);

/// Run one job to completion.
///
/// `cancel` lets the caller stop the job early (Ctrl-C). On deadline
/// expiry the job is cancelled, in-flight deliveries are awaited, and
/// [`Timeout`] is returned.
pub async fn run(args: &RunArgs, cancel: CancellationToken) -> Result<ExecutionReport> {
    let job = load_job(&args.input()?)?;

    let backends = SourceBackends::from_env().context("failed to configure source backends")?;
    let plan = Resolver::new(backends)
        .with_source_logger(TracingLogger::fetching())
        .with_destination_logger(TracingLogger::ordering())
        .resolve(&job.catalogs, &job.orders)
        .context("invalid job")?;

    let coordinator = Coordinator::new(args.env_out.clone(), args.con_limit);
    let deadline = Duration::from_secs(args.timeout);

    let execution = coordinator.execute(plan, &cancel);
    tokio::pin!(execution);

    tokio::select! {
        result = &mut execution => return result.context("job failed"),
        _ = tokio::time::sleep(deadline) => {}
    }

    tracing::warn!(timeout_secs = args.timeout, "deadline expired, cancelling");
    cancel.cancel();
    match execution.await {
        Ok(report) => Ok(report),
        Err(ExecutionError::Cancelled { .. }) => Err(Timeout(deadline).into()),
        Err(e) => Err(anyhow::Error::new(e).context(Timeout(deadline))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        args: RunArgs,
    }

    fn parse(argv: &[&str]) -> std::result::Result<RunArgs, clap::Error> {
        let argv = std::iter::once("capem").chain(argv.iter().copied());
        TestCli::try_parse_from(argv).map(|cli| cli.args)
    }

    #[test]
    fn defaults() {
        let args = parse(&["--catalog-order", "job.json"]).unwrap();
        assert_eq!(args.env_out, PathBuf::from("./capem.env"));
        assert_eq!(args.con_limit.get(), 5);
        assert_eq!(args.timeout, 30);
        assert_eq!(args.input().unwrap(), JobInput::Combined("job.json".into()));
    }

    #[test]
    fn split_input() {
        let args = parse(&["--catalog", "c.json", "--order", "o.json"]).unwrap();
        assert_eq!(
            args.input().unwrap(),
            JobInput::Split {
                catalog: "c.json".into(),
                order: "o.json".into()
            }
        );
    }

    #[test]
    fn catalog_requires_order() {
        assert!(parse(&["--catalog", "c.json"]).is_err());
        assert!(parse(&["--order", "o.json"]).is_err());
    }

    #[test]
    fn input_modes_are_exclusive() {
        assert!(parse(&["--catalog-order", "j.json", "--catalog", "c.json", "--order", "o.json"]).is_err());
    }

    #[test]
    fn some_input_is_required() {
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn limits_must_be_positive() {
        assert!(parse(&["--catalog-order", "j.json", "--con-limit", "0"]).is_err());
        assert!(parse(&["--catalog-order", "j.json", "--timeout", "0"]).is_err());
        let args = parse(&["--catalog-order", "j.json", "--con-limit", "2", "--timeout", "5"]).unwrap();
        assert_eq!(args.con_limit.get(), 2);
        assert_eq!(args.timeout, 5);
    }
}
