// ============================================================================
// vidshift-core/src/conversion/job.rs
// ============================================================================
//
// CONVERSION JOB: Encoding of a Single Staged File
//
// KEY COMPONENTS:
// - JobContext: read-only collaborators shared by every job of a batch
// - run_job: probe, build the command, supervise ffmpeg, commit or restore
//
// Every record handed to run_job ends either committed (output present,
// ffmpeg exited 0) or restored (original moved back, partial output
// removed). A file that already exists at the output path is never
// touched.

use super::command::build_command;
use super::params::{ConversionParams, output_path_for};
use super::progress::ProgressTracker;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, command_failed_error};
use crate::external::{FfmpegProcess, FfmpegSpawner, FfprobeExecutor};
use crate::hardware::HardwareProfile;
use crate::reporting::{JobOutcome, JobResult, ProgressReporter, ProgressUpdate};
use crate::staging::{StagingArea, StagingRecord};
use crate::utils::{ensure_directory, format_bytes, get_file_stem_safe};

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Number of trailing diagnostic lines kept for failure messages.
const STDERR_TAIL_LINES: usize = 5;

/// Collaborators shared read-only by every job of a batch.
pub struct JobContext<'a, S: FfmpegSpawner> {
    pub config: &'a CoreConfig,
    pub profile: &'a HardwareProfile,
    pub staging: &'a StagingArea,
    pub spawner: &'a S,
    pub inspector: &'a dyn FfprobeExecutor,
    pub reporter: &'a dyn ProgressReporter,
}

/// Mutable bookkeeping of a running job, needed for cleanup on failure.
#[derive(Debug, Default)]
struct JobState {
    output_path: Option<PathBuf>,
    /// Set once the output path is known not to hold a pre-existing file.
    owns_output: bool,
    final_progress: Option<u8>,
}

/// Converts one staged file.
///
/// Never returns an error: every failure is recorded in the returned
/// [`JobResult`] after the original has been restored.
pub fn run_job<S: FfmpegSpawner>(record: &StagingRecord, ctx: &JobContext<'_, S>) -> JobResult {
    let start = Instant::now();
    let mut state = JobState::default();

    let outcome = match convert(record, ctx, &mut state) {
        Ok(()) => JobOutcome::Success,
        Err(e) => {
            log::error!(
                "Conversion of {} failed: {e}",
                record.candidate.relative_path.display()
            );
            recover(record, ctx.staging, &state);
            JobOutcome::Failure(e.to_string())
        }
    };

    let result = JobResult {
        candidate: record.candidate.clone(),
        outcome,
        final_progress: state.final_progress,
        output_path: state.output_path,
        elapsed: start.elapsed(),
    };
    ctx.reporter.job_finished(&result);
    result
}

fn convert<S: FfmpegSpawner>(
    record: &StagingRecord,
    ctx: &JobContext<'_, S>,
    state: &mut JobState,
) -> CoreResult<()> {
    let config = ctx.config;
    let candidate = &record.candidate;

    let output_path = output_path_for(candidate, config)?;
    state.output_path = Some(output_path.clone());
    if output_path.exists() {
        return Err(CoreError::OutputExists(output_path));
    }
    state.owns_output = true;

    if let Some(parent) = output_path.parent() {
        ensure_directory(parent)?;
    }

    let media = ctx.inspector.get_media_info(&record.staged_path);
    let params =
        ConversionParams::resolve(record, output_path.clone(), config, &media, ctx.profile)?;

    let mut tracker = ProgressTracker::new(media.duration_secs);
    ctx.reporter.job_started(candidate, tracker.is_determinate());
    log::info!(
        "Converting {} ({} {} @ {})",
        candidate.relative_path.display(),
        params.encoder,
        params.preset,
        params.video_bitrate
    );

    let mut debug_log = if config.debug {
        open_debug_log(&output_path)
    } else {
        None
    };

    let cmd = build_command(&params);
    log::debug!("Running command: {cmd:?}");
    let mut process = ctx.spawner.spawn(cmd)?;

    let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
    process.for_each_line(|line| {
        let write_error = match debug_log.as_mut() {
            Some(writer) => writeln!(writer, "{line}").err(),
            None => None,
        };
        if let Some(e) = write_error {
            log::warn!("Disabling conversion log for {}: {e}", output_path.display());
            debug_log = None;
        }

        if let Some(update) = tracker.observe_line(line) {
            ctx.reporter.job_progress(candidate, update);
        } else if !is_progress_line(line) && !line.trim().is_empty() {
            if tail.len() == STDERR_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line.trim().to_string());
        }
    })?;
    if let Some(mut writer) = debug_log {
        let _ = writer.flush();
    }

    if tracker.is_determinate() && tracker.last_percent() > 0 {
        state.final_progress = Some(tracker.last_percent());
    }

    let status = process.wait()?;
    if !status.success() {
        let stderr = Vec::from(tail).join("\n");
        return Err(command_failed_error("ffmpeg", status, stderr));
    }
    if !output_path.exists() {
        return Err(CoreError::OutputMissing(output_path));
    }

    if let Some(update @ ProgressUpdate::Percent(p)) = tracker.finish() {
        state.final_progress = Some(p);
        ctx.reporter.job_progress(candidate, update);
    }

    if let Err(e) = ctx.staging.commit(record, config.delete_originals) {
        log::warn!(
            "Could not remove staged original {}: {e}",
            record.staged_path.display()
        );
    }

    let size = fs::metadata(&output_path).map(|m| m.len()).unwrap_or(0);
    log::info!(
        "Converted {} -> {} ({})",
        candidate.relative_path.display(),
        output_path.display(),
        format_bytes(size)
    );
    Ok(())
}

/// Undoes a failed job: removes partial output, then restores the original.
fn recover(record: &StagingRecord, staging: &StagingArea, state: &JobState) {
    if state.owns_output {
        if let Some(output) = &state.output_path {
            match fs::remove_file(output) {
                Ok(()) => log::debug!("Removed partial output {}", output.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("Could not remove partial output {}: {e}", output.display()),
            }
        }
    }
    restore_original(record, staging);
}

/// Restores the original of a job that ended abnormally, logging any error.
pub fn restore_original(record: &StagingRecord, staging: &StagingArea) {
    if let Err(e) = staging.restore(record) {
        log::error!("{e}; the original remains at {}", record.staged_path.display());
    }
}

/// Opens `<output stem>_conversion.log` next to the output. Failures only warn.
fn open_debug_log(output_path: &Path) -> Option<BufWriter<File>> {
    let stem = get_file_stem_safe(output_path).ok()?;
    let log_path = output_path.with_file_name(format!("{stem}_conversion.log"));
    match File::create(&log_path) {
        Ok(file) => {
            log::debug!("Writing raw ffmpeg output to {}", log_path.display());
            Some(BufWriter::new(file))
        }
        Err(e) => {
            log::warn!("Could not create conversion log {}: {e}", log_path.display());
            None
        }
    }
}

/// ffmpeg `-progress` lines are bare `key=value` pairs with lowercase keys.
fn is_progress_line(line: &str) -> bool {
    line.split_once('=').is_some_and(|(key, _)| {
        !key.is_empty()
            && key
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
    })
}
