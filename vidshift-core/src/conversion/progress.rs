//! Parsing of ffmpeg's `-progress` telemetry into completion percentages.
//!
//! ffmpeg writes `key=value` lines. Only `out_time_us` and `out_time_ms`
//! matter here; despite its name `out_time_ms` is also in microseconds.

use crate::reporting::ProgressUpdate;

/// Highest percentage reported while the encoder is still running.
const MAX_RUNNING_PERCENT: u8 = 99;

/// Turns a stream of ffmpeg output lines into [`ProgressUpdate`]s.
///
/// With a known duration, a percentage is emitted only when it is strictly
/// greater than the previous one (the baseline is 0) and is capped at 99
/// until [`ProgressTracker::finish`] reports 100. Without a duration, every
/// elapsed-time marker yields [`ProgressUpdate::Indeterminate`].
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    duration_us: Option<f64>,
    last_percent: u8,
    finished: bool,
}

impl ProgressTracker {
    pub fn new(duration_secs: Option<f64>) -> Self {
        Self {
            duration_us: duration_secs
                .filter(|d| d.is_finite() && *d > 0.0)
                .map(|d| d * 1_000_000.0),
            last_percent: 0,
            finished: false,
        }
    }

    pub fn is_determinate(&self) -> bool {
        self.duration_us.is_some()
    }

    /// Last emitted percentage.
    pub fn last_percent(&self) -> u8 {
        self.last_percent
    }

    /// Feeds one output line; returns an update if one should be reported.
    pub fn observe_line(&mut self, line: &str) -> Option<ProgressUpdate> {
        let elapsed_us = parse_elapsed_us(line)?;

        let Some(duration_us) = self.duration_us else {
            return Some(ProgressUpdate::Indeterminate);
        };

        let ratio = (elapsed_us as f64 / duration_us * 100.0).floor();
        let percent = ratio.clamp(0.0, f64::from(MAX_RUNNING_PERCENT)) as u8;
        if percent > self.last_percent {
            self.last_percent = percent;
            Some(ProgressUpdate::Percent(percent))
        } else {
            None
        }
    }

    /// Reports completion. Returns `Percent(100)` the first time only.
    pub fn finish(&mut self) -> Option<ProgressUpdate> {
        if self.finished {
            return None;
        }
        self.finished = true;
        self.last_percent = 100;
        Some(ProgressUpdate::Percent(100))
    }
}

/// Extracts the elapsed output time, in microseconds, from a progress line.
pub fn parse_elapsed_us(line: &str) -> Option<u64> {
    let (key, value) = line.trim().split_once('=')?;
    match key.trim() {
        "out_time_us" | "out_time_ms" => value.trim().parse::<u64>().ok(),
        _ => None,
    }
}
