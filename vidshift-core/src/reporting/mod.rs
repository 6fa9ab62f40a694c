//! Job outcomes, batch summaries and the progress reporter interface.
//!
//! Conversion jobs run on worker threads and report through a shared
//! [`ProgressReporter`]. Every method has a no-op default, so consumers only
//! implement the events they display.

use crate::discovery::CandidateFile;
use crate::utils::format_elapsed;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Percentage completion of a single job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressUpdate {
    /// Completion in percent, `0..=100`.
    Percent(u8),
    /// The encoder made progress but the input duration is unknown.
    Indeterminate,
}

/// How a conversion job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    Failure(String),
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Result of one conversion job.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub candidate: CandidateFile,
    pub outcome: JobOutcome,
    /// Last percentage reported; `None` if only indeterminate progress was seen.
    pub final_progress: Option<u8>,
    /// Set when the job got far enough to compute an output path.
    pub output_path: Option<PathBuf>,
    pub elapsed: Duration,
}

impl JobResult {
    pub fn failure(candidate: CandidateFile, reason: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            candidate,
            outcome: JobOutcome::Failure(reason.into()),
            final_progress: None,
            output_path: None,
            elapsed,
        }
    }
}

/// Aggregate result of a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Relative path and failure reason of every failed job, sorted by path.
    pub failures: Vec<(PathBuf, String)>,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn from_results(results: &[JobResult], elapsed: Duration) -> Self {
        let mut failures: Vec<(PathBuf, String)> = results
            .iter()
            .filter_map(|r| match &r.outcome {
                JobOutcome::Failure(reason) => {
                    Some((r.candidate.relative_path.clone(), reason.clone()))
                }
                JobOutcome::Success => None,
            })
            .collect();
        failures.sort_by(|a, b| a.0.cmp(&b.0));

        Self {
            total: results.len(),
            succeeded: results.len() - failures.len(),
            failed: failures.len(),
            failures,
            elapsed,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s) processed: {} succeeded, {} failed in {}",
            self.total,
            self.succeeded,
            self.failed,
            format_elapsed(self.elapsed)
        )
    }
}

/// Receives progress events from the batch driver and its workers.
pub trait ProgressReporter: Send + Sync {
    fn batch_started(&self, _total: usize) {}
    /// `determinate` is false when the input duration is unknown.
    fn job_started(&self, _candidate: &CandidateFile, _determinate: bool) {}
    fn job_progress(&self, _candidate: &CandidateFile, _update: ProgressUpdate) {}
    fn job_finished(&self, _result: &JobResult) {}
    fn batch_progress(&self, _completed: usize, _total: usize) {}
    fn batch_finished(&self, _summary: &BatchSummary) {}
}

/// Reporter that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {}
