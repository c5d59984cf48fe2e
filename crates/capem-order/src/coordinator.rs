//! # Execution Coordinator
//!
//! Runs every [`ResolvedOrder`] as its own task. At most `limit` deliveries
//! are in flight at once. The first real failure cancels the job's token,
//! so queued orders never start and running ones stop at their next
//! suspension point; the coordinator still waits for every started task
//! before it returns that failure.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::env_file::EnvFile;
use crate::error::ExecutionError;
use crate::resolve::ResolvedOrder;

/// Default admission limit.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// What a successful run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Destinations delivered.
    pub completed: usize,
    /// Highest number of deliveries observed running at the same time.
    pub peak_in_flight: usize,
}

/// Counts deliveries currently running and the high-water mark.
#[derive(Debug, Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

struct InFlightGuard(Arc<InFlight>);

impl InFlight {
    fn enter(self: &Arc<Self>) -> InFlightGuard {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard(Arc::clone(self))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Executes resolved orders.
///
/// Each [`execute`](Self::execute) call is one job with its own
/// [`EnvFile`] handle, so a second job truncates the env output again
/// instead of appending to the first job's lines.
#[derive(Debug, Clone)]
pub struct Coordinator {
    env_out: PathBuf,
    limit: NonZeroUsize,
}

impl Coordinator {
    /// A coordinator that writes `env://` destinations to `env_out` and
    /// admits at most `limit` concurrent deliveries.
    pub fn new(env_out: impl Into<PathBuf>, limit: NonZeroUsize) -> Self {
        Self {
            env_out: env_out.into(),
            limit,
        }
    }

    /// Path of the environment output file.
    pub fn env_out(&self) -> &Path {
        &self.env_out
    }

    /// Deliver every order.
    ///
    /// `cancel` is the caller's token; the coordinator works on a child of
    /// it, so cancelling from outside stops the job, but a failure inside
    /// the job does not cancel the caller.
    ///
    /// # Errors
    ///
    /// - [`ExecutionError::Delivery`]: the first destination that failed for
    ///   a reason other than cancellation.
    /// - [`ExecutionError::Cancelled`]: `cancel` fired before every
    ///   destination completed.
    /// - [`ExecutionError::Task`]: a delivery task panicked.
    pub async fn execute(
        &self,
        orders: Vec<ResolvedOrder>,
        cancel: &CancellationToken,
    ) -> Result<ExecutionReport, ExecutionError> {
        let total = orders.len();
        let cancel = cancel.child_token();
        let semaphore = Arc::new(Semaphore::new(self.limit.get()));
        let in_flight = Arc::new(InFlight::default());
        let completed = Arc::new(AtomicUsize::new(0));
        let first_error: Arc<Mutex<Option<ExecutionError>>> = Arc::new(Mutex::new(None));
        let env_file = Arc::new(EnvFile::new(&self.env_out));

        tracing::info!(destinations = total, limit = self.limit.get(), "executing orders");

        let mut tasks = JoinSet::new();
        for order in orders {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let env_file = Arc::clone(&env_file);
            let in_flight = Arc::clone(&in_flight);
            let completed = Arc::clone(&completed);
            let first_error = Arc::clone(&first_error);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let _running = in_flight.enter();

                match order.deliver(&env_file, &cancel).await {
                    Ok(()) => {
                        completed.fetch_add(1, Ordering::SeqCst);
                        tracing::debug!(destination = %order.destination(), "delivered");
                    }
                    Err(e) if e.is_cancelled() => {
                        tracing::debug!(destination = %order.destination(), "delivery cancelled");
                    }
                    Err(e) => {
                        tracing::warn!(destination = %order.destination(), error = %e, "delivery failed");
                        first_error.lock().get_or_insert(ExecutionError::Delivery(e));
                        cancel.cancel();
                    }
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "delivery task aborted");
                first_error.lock().get_or_insert(ExecutionError::Task(e.to_string()));
                cancel.cancel();
            }
        }

        if let Some(e) = first_error.lock().take() {
            return Err(e);
        }

        let completed = completed.load(Ordering::SeqCst);
        if completed < total {
            return Err(ExecutionError::Cancelled { completed, total });
        }

        let report = ExecutionReport {
            completed,
            peak_in_flight: in_flight.peak.load(Ordering::SeqCst),
        };
        tracing::info!(completed = report.completed, peak_in_flight = report.peak_in_flight, "all orders delivered");
        Ok(report)
    }
}
