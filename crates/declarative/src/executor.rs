//! Execution engine - runs independent reconciliations, optionally in parallel

use crate::context::{NoProgress, ProgressCallback, ResourceClient};
use crate::error::Result;
use crate::outcome::Outcome;
use crate::reconciler::Reconciler;
use crate::request::ReconcileRequest;
use crate::resource::Resource;
use rayon::prelude::*;

/// Options for batch execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Number of parallel jobs
    pub jobs: usize,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self { jobs: 4 }
    }
}

/// One reconciliation of a batch
///
/// Jobs share nothing but the read-only client handle.
pub struct Job<'a> {
    /// Label for progress reporting
    pub label: String,
    pub client: &'a dyn ResourceClient,
    pub resource: &'a dyn Resource,
    pub request: ReconcileRequest,
}

impl Job<'_> {
    fn run(&self) -> Result<Outcome> {
        Reconciler::new(self.client, self.resource).run(&self.request)
    }
}

/// Execute jobs and return one result per job, in input order
///
/// # Arguments
/// * `jobs` - The reconciliations to run
/// * `opts` - Execution options
/// * `progress` - Progress callback
pub fn execute<P: ProgressCallback>(
    jobs: &[Job<'_>],
    opts: &ExecuteOptions,
    progress: &mut P,
) -> Vec<Result<Outcome>> {
    if jobs.is_empty() {
        return Vec::new();
    }

    progress.on_batch_start(jobs.len());
    let results = if opts.jobs <= 1 || jobs.len() == 1 {
        execute_sequential(jobs, progress)
    } else {
        execute_parallel(jobs, opts.jobs, progress)
    };
    progress.on_batch_complete();
    results
}

fn execute_sequential<P: ProgressCallback>(jobs: &[Job<'_>], progress: &mut P) -> Vec<Result<Outcome>> {
    jobs.iter()
        .map(|job| {
            progress.on_job_start(&job.label);
            let result = job.run();
            progress.on_job_complete(&job.label, &result);
            result
        })
        .collect()
}

/// Execute jobs in parallel using rayon
fn execute_parallel<P: ProgressCallback>(
    jobs: &[Job<'_>],
    threads: usize,
    progress: &mut P,
) -> Vec<Result<Outcome>> {
    let pool = match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool,
        Err(e) => {
            log::warn!("Failed to create thread pool, running sequentially: {e}");
            return execute_sequential(jobs, progress);
        }
    };

    // The progress callback is not thread-safe; report after the batch
    let results: Vec<_> = pool.install(|| jobs.par_iter().map(Job::run).collect());

    for (job, result) in jobs.iter().zip(&results) {
        progress.on_job_complete(&job.label, result);
    }
    results
}

/// Simple execution without callbacks
pub fn execute_simple(jobs: &[Job<'_>], opts: &ExecuteOptions) -> Vec<Result<Outcome>> {
    execute(jobs, opts, &mut NoProgress)
}
