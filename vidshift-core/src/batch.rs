//! Batch driver: census, staging, scheduling and summary for one directory.

use crate::config::CoreConfig;
use crate::conversion::JobContext;
use crate::conversion::job::restore_original;
use crate::conversion::params::output_path_for;
use crate::discovery::{CandidateFile, find_candidate_files};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, FfprobeExecutor};
use crate::hardware::{self, HardwareProbe};
use crate::reporting::{BatchSummary, JobResult, ProgressReporter};
use crate::scheduler::run_batch;
use crate::staging::StagingArea;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Converts every eligible file under `config.input_dir`.
///
/// Returns an error only for batch-level failures: an invalid
/// configuration, a failed census, a failed staging barrier (already rolled
/// back) or a worker pool that cannot be built. Individual conversion
/// failures are reported in the summary, as are files left untouched
/// because their output would collide with another file of the batch.
///
/// # Examples
///
/// ```rust,no_run
/// use vidshift_core::{CoreConfig, convert_directory};
/// use vidshift_core::external::{CrateFfprobeExecutor, SidecarSpawner};
/// use vidshift_core::hardware::SystemProbe;
/// use vidshift_core::reporting::NullProgressReporter;
/// use std::path::PathBuf;
///
/// let config = CoreConfig::new(PathBuf::from("/media/recordings"));
/// let summary = convert_directory(
///     &config,
///     &SidecarSpawner,
///     &CrateFfprobeExecutor::new(),
///     &SystemProbe,
///     &NullProgressReporter,
/// )
/// .unwrap();
/// println!("{summary}");
/// ```
pub fn convert_directory<S, I, P>(
    config: &CoreConfig,
    spawner: &S,
    inspector: &I,
    probe: &P,
    reporter: &dyn ProgressReporter,
) -> CoreResult<BatchSummary>
where
    S: FfmpegSpawner,
    I: FfprobeExecutor,
    P: HardwareProbe + ?Sized,
{
    let start = Instant::now();
    config.validate()?;

    let files = find_candidate_files(&config.input_dir, config.input_formats.as_deref())?;
    if files.is_empty() {
        log::info!("No files to convert found.");
        let summary = BatchSummary::from_results(&[], start.elapsed());
        reporter.batch_finished(&summary);
        return Ok(summary);
    }
    log::info!(
        "Found {} file(s) to convert in {}",
        files.len(),
        config.input_dir.display()
    );

    let (files, mut results) = reject_output_collisions(files, config);
    for result in &results {
        reporter.job_finished(result);
    }

    let profile = hardware::resolve_with(probe);
    profile.log_capabilities();

    let staging = StagingArea::new(&config.input_dir);
    let records = staging.stage_all(&files)?;

    if !records.is_empty() {
        reporter.batch_started(records.len());
        let ctx = JobContext {
            config,
            profile: &profile,
            staging: &staging,
            spawner,
            inspector,
            reporter,
        };
        match run_batch(&records, &ctx) {
            Ok(batch) => results.extend(batch),
            Err(e) => {
                for record in &records {
                    restore_original(record, &staging);
                }
                return Err(e);
            }
        }
    }

    let summary = BatchSummary::from_results(&results, start.elapsed());
    if summary.has_failures() {
        log::warn!("{summary}");
        for (path, reason) in &summary.failures {
            log::warn!("  {}: {reason}", path.display());
        }
    } else {
        log::info!("{summary}");
    }
    reporter.batch_finished(&summary);
    Ok(summary)
}

/// Splits off every file whose output would land on another file of the
/// batch: the output of a second file, or a second file's original.
///
/// Rejected files are never staged; they come back as failed results.
fn reject_output_collisions(
    files: Vec<CandidateFile>,
    config: &CoreConfig,
) -> (Vec<CandidateFile>, Vec<JobResult>) {
    // Underivable outputs are left to the job, which fails on them.
    let outputs: Vec<Option<PathBuf>> = files
        .iter()
        .map(|file| output_path_for(file, config).ok())
        .collect();

    let mut claims: HashMap<&PathBuf, Vec<usize>> = HashMap::new();
    for (index, output) in outputs.iter().enumerate() {
        if let Some(output) = output {
            claims.entry(output).or_default().push(index);
        }
    }
    for (index, file) in files.iter().enumerate() {
        if let Some(claimants) = claims.get_mut(&file.source_path) {
            if !claimants.contains(&index) {
                claimants.push(index);
            }
        }
    }

    let mut collisions: HashMap<usize, CoreError> = HashMap::new();
    for (output, claimants) in &claims {
        if claimants.len() < 2 {
            continue;
        }
        for &index in claimants {
            let other = claimants
                .iter()
                .find(|&&i| i != index)
                .map(|&i| files[i].relative_path.clone())
                .unwrap_or_default();
            collisions.entry(index).or_insert_with(|| CoreError::OutputCollision {
                output: (*output).clone(),
                other,
            });
        }
    }

    let mut accepted = Vec::with_capacity(files.len());
    let mut rejected = Vec::new();
    for (index, file) in files.into_iter().enumerate() {
        match collisions.remove(&index) {
            Some(error) => {
                log::error!("Skipping {}: {error}", file.relative_path.display());
                rejected.push(JobResult::failure(file, error.to_string(), Duration::ZERO));
            }
            None => accepted.push(file),
        }
    }
    (accepted, rejected)
}
