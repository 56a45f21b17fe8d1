//! Parallel analysis scheduler.
//!
//! A fixed pool of worker threads drains a shared action queue; each
//! finished action sends one [`TaskResult`] back over a channel. The
//! dispatcher aggregates results as they arrive and checks the cancel
//! token between receives, so an interrupt takes effect within one poll
//! interval even while analyzers are still running.

use crate::action::{AnalyzerKind, BuildAction};
use crate::cancel::{CancelToken, ProcessRegistry};
use crate::context::RunContext;
use crate::runner::{run_action, TaskResult};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How often the dispatcher wakes up to check for cancellation.
const RESULT_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The run was cancelled before all actions completed. Partial results
    /// were discarded; running analyzers were terminated.
    #[error("analysis interrupted")]
    Interrupted,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Aggregated outcome of a whole run.
///
/// Per-family counters use ordered maps so the summary prints in a stable
/// order regardless of completion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub successful: BTreeMap<AnalyzerKind, usize>,
    pub failed: BTreeMap<AnalyzerKind, usize>,
    pub skipped: usize,
}

impl RunSummary {
    pub fn record(&mut self, result: &TaskResult) {
        self.total += 1;
        // Outcomes are exclusive: an action whose sources were all filtered
        // out ran no analyzer, so it counts as skipped and nothing else.
        if result.skipped {
            self.skipped += 1;
        } else if result.return_code == 0 {
            *self.successful.entry(result.analyzer).or_default() += 1;
        } else {
            *self.failed.entry(result.analyzer).or_default() += 1;
        }
    }

    pub fn successful_total(&self) -> usize {
        self.successful.values().sum()
    }

    pub fn failed_total(&self) -> usize {
        self.failed.values().sum()
    }

    pub fn print(&self) {
        println!("----==== Summary ====----");
        println!("Total actions: {}", self.total);
        for (kind, count) in &self.successful {
            println!("Successfully analyzed ({}): {}", kind, count);
        }
        for (kind, count) in &self.failed {
            println!("Failed to analyze ({}): {}", kind, count);
        }
        if self.skipped > 0 {
            println!("Skipped actions: {}", self.skipped);
        }
    }
}

/// Run every action on `jobs` workers and aggregate the outcomes.
///
/// Returns `Err(RunError::Interrupted)` if the token fires before the queue
/// drains; in that case all registered analyzer processes are killed and
/// the workers are joined before returning.
pub fn run_actions(
    actions: Vec<BuildAction>,
    ctx: Arc<RunContext>,
    jobs: usize,
    cancel: &CancelToken,
) -> Result<RunSummary, RunError> {
    let expected = actions.len();
    let mut summary = RunSummary::default();
    if expected == 0 {
        return Ok(summary);
    }

    let jobs = jobs.max(1).min(expected);
    let queue = Arc::new(Mutex::new(actions.into_iter().collect::<VecDeque<_>>()));
    let registry = ProcessRegistry::new();
    let (tx, rx) = mpsc::channel::<TaskResult>();

    let mut workers = Vec::with_capacity(jobs);
    for _ in 0..jobs {
        let queue = Arc::clone(&queue);
        let ctx = Arc::clone(&ctx);
        let registry = registry.clone();
        let cancel = cancel.clone();
        let tx = tx.clone();
        workers.push(std::thread::spawn(move || loop {
            if cancel.is_cancelled() {
                break;
            }
            let action = { queue.lock().expect("action queue poisoned").pop_front() };
            let Some(action) = action else {
                break;
            };
            let result = run_action(&action, &ctx, &registry, &cancel);
            // Receiver gone means the dispatcher already bailed out.
            if tx.send(result).is_err() {
                break;
            }
        }));
    }
    drop(tx);

    let mut interrupted = false;
    while summary.total < expected {
        if cancel.is_cancelled() {
            interrupted = true;
            break;
        }
        match rx.recv_timeout(RESULT_POLL) {
            Ok(result) => summary.record(&result),
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    if interrupted {
        // Unblock workers stuck on running analyzers, then let them
        // observe the token and exit.
        registry.kill_all();
    }
    for worker in workers {
        let _ = worker.join();
    }

    if interrupted {
        Err(RunError::Interrupted)
    } else {
        Ok(summary)
    }
}

/// Per-run report directory: unique under the workspace, removed on drop
/// unless the run asked to keep it.
pub struct ReportDir {
    path: PathBuf,
    keep: bool,
}

impl ReportDir {
    /// Create `<workspace>/<name>-reports-<random>/`. The workspace is
    /// created first if missing.
    pub fn create(workspace: &Path, name: &str, keep: bool) -> Result<Self> {
        std::fs::create_dir_all(workspace)
            .with_context(|| format!("cannot create workspace {}", workspace.display()))?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("{}-reports-", name))
            .tempdir_in(workspace)
            .with_context(|| {
                format!("cannot create report directory in {}", workspace.display())
            })?;
        // Ownership of the directory moves to this struct; cleanup happens
        // in Drop so it also runs on the error paths.
        Ok(Self {
            path: dir.into_path(),
            keep,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ReportDir {
    fn drop(&mut self) {
        if !self.keep {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}
