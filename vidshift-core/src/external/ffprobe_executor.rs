//! FFprobe integration for per-file media inspection.
//!
//! The conversion jobs need two facts about each input: the bitrate of its
//! first video stream (to preserve quality when no override is given) and
//! the container duration (to turn elapsed encode time into a percentage).
//! Both are best-effort. A failed probe is logged and yields "unknown", it
//! never fails the job.

use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Media facts used to parameterize a conversion. `None` means unknown.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    /// Bitrate of the first video stream in kbit/s.
    pub bitrate_kbps: Option<u64>,
    /// Container duration in seconds, always positive when known.
    pub duration_secs: Option<f64>,
}

/// Trait for probing media files.
///
/// Shared by every worker of a batch, hence `Sync`.
pub trait FfprobeExecutor: Sync {
    /// Probes `input_path`. Must not fail; unknown facts are `None`.
    fn get_media_info(&self, input_path: &Path) -> MediaInfo;
}

/// [`FfprobeExecutor`] backed by the `ffprobe` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn get_media_info(&self, input_path: &Path) -> MediaInfo {
        log::debug!(
            "Running ffprobe (via crate) for media info on: {}",
            input_path.display()
        );
        match ffprobe(input_path) {
            Ok(metadata) => {
                let bitrate_kbps = metadata
                    .streams
                    .iter()
                    .find(|s| s.codec_type.as_deref() == Some("video"))
                    .and_then(|s| parse_bitrate_kbps(s.bit_rate.as_deref()));
                let duration_secs = parse_duration_secs(metadata.format.duration.as_deref());

                if bitrate_kbps.is_none() {
                    log::warn!(
                        "Could not determine video bitrate for {}",
                        input_path.display()
                    );
                }
                if duration_secs.is_none() {
                    log::warn!(
                        "Could not determine duration for {}, progress will be indeterminate",
                        input_path.display()
                    );
                }

                MediaInfo {
                    bitrate_kbps,
                    duration_secs,
                }
            }
            Err(err) => {
                log::warn!(
                    "ffprobe failed for {}: {}",
                    input_path.display(),
                    describe_ffprobe_error(&err)
                );
                MediaInfo::default()
            }
        }
    }
}

/// Converts an ffprobe `bit_rate` value (bit/s) to kbit/s.
///
/// Missing, `N/A`, unparsable and values below 1 kbit/s are unknown.
pub fn parse_bitrate_kbps(raw: Option<&str>) -> Option<u64> {
    let bits = raw?.trim().parse::<u64>().ok()?;
    let kbps = bits / 1000;
    (kbps > 0).then_some(kbps)
}

/// Parses an ffprobe `duration` value in seconds. Non-positive is unknown.
pub fn parse_duration_secs(raw: Option<&str>) -> Option<f64> {
    let secs = raw?.trim().parse::<f64>().ok()?;
    (secs.is_finite() && secs > 0.0).then_some(secs)
}

fn describe_ffprobe_error(err: &FfProbeError) -> String {
    match err {
        FfProbeError::Io(io_err) => format!("could not run ffprobe: {io_err}"),
        FfProbeError::Status(output) => format!(
            "exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ),
        FfProbeError::Deserialize(e) => format!("unreadable ffprobe output: {e}"),
        other => format!("{other:?}"),
    }
}
