// ============================================================================
// vidshift-core/src/scheduler.rs
// ============================================================================
//
// JOB SCHEDULER: Bounded Parallel Execution of Conversion Jobs
//
// KEY COMPONENTS:
// - run_batch: runs every staged record on a dedicated rayon pool
//
// ARCHITECTURE:
// The pool is local to the batch and sized by the configuration, so the
// concurrency bound holds no matter what else uses rayon in the process.
// Jobs are spawned into an in-place scope; the calling thread collects
// results over a channel in completion order and drives the aggregate
// progress. A panicking job is isolated at the job boundary.

use crate::conversion::job::{JobContext, restore_original, run_job};
use crate::error::{CoreError, CoreResult};
use crate::external::FfmpegSpawner;
use crate::reporting::JobResult;
use crate::staging::StagingRecord;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::time::Instant;

/// Runs one conversion job per record with at most
/// [`CoreConfig::effective_workers`](crate::config::CoreConfig::effective_workers)
/// jobs in flight.
///
/// Results are returned in completion order. The only error is failing to
/// build the worker pool; job failures are part of the results.
pub fn run_batch<S: FfmpegSpawner>(
    records: &[StagingRecord],
    ctx: &JobContext<'_, S>,
) -> CoreResult<Vec<JobResult>> {
    let total = records.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let workers = ctx.config.effective_workers().min(total);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("vidshift-job-{i}"))
        .build()
        .map_err(|e| CoreError::ThreadPool(e.to_string()))?;
    log::info!("Converting {total} file(s) with {workers} simultaneous job(s)");

    let mut results = Vec::with_capacity(total);
    let (tx, rx) = mpsc::channel::<JobResult>();

    pool.in_place_scope(|scope| {
        for record in records {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let result = run_isolated(record, ctx);
                // The receiver outlives the scope.
                let _ = tx.send(result);
            });
        }
        drop(tx);

        for result in rx {
            results.push(result);
            ctx.reporter.batch_progress(results.len(), total);
        }
    });

    Ok(results)
}

/// Runs a job, turning a panic into a failed result. The original is
/// restored unless the job had already committed.
fn run_isolated<S: FfmpegSpawner>(record: &StagingRecord, ctx: &JobContext<'_, S>) -> JobResult {
    let start = Instant::now();
    match panic::catch_unwind(AssertUnwindSafe(|| run_job(record, ctx))) {
        Ok(result) => result,
        Err(payload) => {
            let error = CoreError::JobPanicked(panic_message(payload.as_ref()));
            log::error!(
                "Conversion of {} aborted: {error}",
                record.candidate.relative_path.display()
            );
            // A committed output is complete; its staged original stays put.
            if ctx.staging.is_committed(record) {
                log::warn!(
                    "Keeping committed output of {}",
                    record.candidate.relative_path.display()
                );
            } else {
                restore_original(record, ctx.staging);
            }

            let result = JobResult::failure(record.candidate.clone(), error.to_string(), start.elapsed());
            ctx.reporter.job_finished(&result);
            result
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
