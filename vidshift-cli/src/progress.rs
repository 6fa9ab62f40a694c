// ============================================================================
// vidshift-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Terminal progress bars for a conversion batch
//
// KEY COMPONENTS:
// - TerminalReporter: ProgressReporter drawing indicatif bars
// - create_multi_progress: visible on a terminal, hidden otherwise
//
// One bar per running job (a spinner when the input duration is unknown)
// sits above an overall completed/total bar.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use vidshift_core::reporting::{BatchSummary, JobResult, ProgressReporter, ProgressUpdate};
use vidshift_core::CandidateFile;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

const TICK_INTERVAL: Duration = Duration::from_millis(120);

/// Creates the shared bar container. Bars are hidden when `enabled` is false
/// or stderr is not a terminal.
pub fn create_multi_progress(enabled: bool) -> MultiProgress {
    if enabled && console::Term::stderr().features().is_attended() {
        MultiProgress::new()
    } else {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    }
}

fn style(template: &str, fallback: fn() -> ProgressStyle) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| fallback())
}

fn overall_style() -> ProgressStyle {
    style(
        "{prefix:.bold} [{bar:40.green/white}] {pos}/{len} files ({elapsed_precise})",
        ProgressStyle::default_bar,
    )
    .progress_chars("█▓▒░ ")
}

fn job_style() -> ProgressStyle {
    style(
        "{spinner:.green} {msg:40!} [{bar:30.cyan/blue}] {percent:>3}%",
        ProgressStyle::default_bar,
    )
    .progress_chars("█▓▒░ ")
}

fn spinner_style() -> ProgressStyle {
    style(
        "{spinner:.green} {msg:40!} {elapsed_precise}",
        ProgressStyle::default_spinner,
    )
}

/// [`ProgressReporter`] that draws indicatif bars.
pub struct TerminalReporter {
    multi: MultiProgress,
    overall: Mutex<Option<ProgressBar>>,
    jobs: Mutex<HashMap<PathBuf, ProgressBar>>,
}

impl TerminalReporter {
    pub fn new(multi: MultiProgress) -> Self {
        Self {
            multi,
            overall: Mutex::new(None),
            jobs: Mutex::new(HashMap::new()),
        }
    }

    fn add_job_bar(&self, bar: ProgressBar) -> ProgressBar {
        let overall = self.overall.lock().unwrap_or_else(|e| e.into_inner());
        match overall.as_ref() {
            Some(overall) => self.multi.insert_before(overall, bar),
            None => self.multi.add(bar),
        }
    }
}

impl ProgressReporter for TerminalReporter {
    fn batch_started(&self, total: usize) {
        let bar = self.multi.add(ProgressBar::new(total as u64));
        bar.set_style(overall_style());
        bar.set_prefix("Overall");
        *self.overall.lock().unwrap_or_else(|e| e.into_inner()) = Some(bar);
    }

    fn job_started(&self, candidate: &CandidateFile, determinate: bool) {
        let bar = if determinate {
            let bar = ProgressBar::new(100);
            bar.set_style(job_style());
            bar
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(spinner_style());
            bar
        };
        let bar = self.add_job_bar(bar);
        bar.set_message(candidate.relative_path.display().to_string());
        bar.enable_steady_tick(TICK_INTERVAL);

        self.jobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(candidate.relative_path.clone(), bar);
    }

    fn job_progress(&self, candidate: &CandidateFile, update: ProgressUpdate) {
        let jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(bar) = jobs.get(&candidate.relative_path) {
            match update {
                ProgressUpdate::Percent(p) => bar.set_position(u64::from(p)),
                ProgressUpdate::Indeterminate => bar.tick(),
            }
        }
    }

    fn job_finished(&self, result: &JobResult) {
        let bar = self
            .jobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&result.candidate.relative_path);
        if let Some(bar) = bar {
            bar.finish_and_clear();
            self.multi.remove(&bar);
        }
    }

    fn batch_progress(&self, completed: usize, _total: usize) {
        if let Some(bar) = self.overall.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            bar.set_position(completed as u64);
        }
    }

    fn batch_finished(&self, _summary: &BatchSummary) {
        if let Some(bar) = self.overall.lock().unwrap_or_else(|e| e.into_inner()).take() {
            bar.finish_and_clear();
        }
        if let Err(e) = self.multi.clear() {
            log::debug!("Could not clear progress bars: {e}");
        }
    }
}
