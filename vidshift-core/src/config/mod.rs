//! Configuration structures and constants for the vidshift-core library.
//!
//! A `CoreConfig` is built once by the consumer (usually from command-line
//! flags), validated, and then shared read-only with every conversion job.

mod builder;

use crate::error::{CoreError, CoreResult};

use std::path::PathBuf;

pub use builder::CoreConfigBuilder;

// Default constants

/// Default output extension, including the leading dot.
pub const DEFAULT_OUTPUT_FORMAT: &str = ".mkv";

/// Default audio codec passed to `-c:a`.
pub const DEFAULT_AUDIO_CODEC: &str = "aac";

/// Default audio bitrate passed to `-b:a`.
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";

/// Video bitrate used when neither an override nor a probed bitrate is available.
pub const FALLBACK_VIDEO_BITRATE: &str = "6000k";

/// Default number of conversion jobs running at the same time.
pub const DEFAULT_MAX_SIMULTANEOUS: usize = 5;

/// Hard upper bound on concurrently running conversion jobs.
pub const MAX_SIMULTANEOUS_CAP: usize = 8;

/// Name of the staging subdirectory created inside the scan root.
pub const STAGING_DIR_NAME: &str = "old";

/// Highest CRF accepted by the x265/HEVC encoders.
pub const MAX_CRF: u8 = 51;

/// Main configuration structure for the vidshift-core library.
///
/// Optional fields are per-run overrides. When they are `None` the
/// conversion job falls back to values inferred from the media file or the
/// hardware profile.
///
/// # Examples
///
/// ```rust,no_run
/// use vidshift_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .input_dir(PathBuf::from("/media/recordings"))
///     .input_formats(vec![".mp4".to_string(), ".ts".to_string()])
///     .resolution("1280x720")
///     .max_simultaneous(2)
///     .build();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    // ---- Path Configuration ----
    /// Root directory that is scanned, staged and written to.
    pub input_dir: PathBuf,

    /// Suffix allow-list (e.g. `.mp4`). `None` accepts every file.
    pub input_formats: Option<Vec<String>>,

    /// Output extension, including the leading dot.
    pub output_format: String,

    // ---- Video Settings ----
    /// Video bitrate override (e.g. `2500k`).
    pub bitrate: Option<String>,

    /// Scale target, either `WxH` or ffmpeg's `W:H`.
    pub resolution: Option<String>,

    /// Encoder override; defaults to the hardware profile's encoder.
    pub video_codec: Option<String>,

    /// Encoder preset override; defaults to the hardware profile's preset.
    pub preset: Option<String>,

    pub framerate: Option<String>,

    pub crf: Option<u8>,

    /// Muxer passed to ffmpeg's `-f`.
    pub container_format: Option<String>,

    pub thread_count: Option<usize>,

    // ---- Audio Settings ----
    pub audio_codec: String,

    pub audio_bitrate: String,

    pub audio_filter: Option<String>,

    // ---- Processing Options ----
    /// Drop global metadata from the output (`-map_metadata -1`).
    pub strip_metadata: bool,

    /// Write the raw ffmpeg output of each job next to its output file.
    pub debug: bool,

    /// Requested number of simultaneous jobs, capped at [`MAX_SIMULTANEOUS_CAP`].
    pub max_simultaneous: usize,

    /// Remove the staged original once its conversion succeeded.
    pub delete_originals: bool,
}

impl CoreConfig {
    /// Creates a configuration for `input_dir` with every other field at its default.
    pub fn new(input_dir: PathBuf) -> Self {
        Self {
            input_dir,
            input_formats: None,
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            bitrate: None,
            resolution: None,
            video_codec: None,
            preset: None,
            framerate: None,
            crf: None,
            container_format: None,
            thread_count: None,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            audio_filter: None,
            strip_metadata: false,
            debug: false,
            max_simultaneous: DEFAULT_MAX_SIMULTANEOUS,
            delete_originals: false,
        }
    }

    /// Number of worker threads the scheduler will actually use.
    #[must_use]
    pub fn effective_workers(&self) -> usize {
        self.max_simultaneous.clamp(1, MAX_SIMULTANEOUS_CAP)
    }

    /// Validates the configuration before any file is touched.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.input_dir.is_dir() {
            return Err(CoreError::Config(format!(
                "Directory '{}' does not exist or is not a directory",
                self.input_dir.display()
            )));
        }

        if self.output_format.trim_start_matches('.').is_empty() {
            return Err(CoreError::Config(
                "Output format must not be empty".to_string(),
            ));
        }

        if self.max_simultaneous == 0 {
            return Err(CoreError::Config(
                "max_simultaneous must be at least 1".to_string(),
            ));
        }

        if let Some(crf) = self.crf {
            if crf > MAX_CRF {
                return Err(CoreError::Config(format!(
                    "CRF must be between 0 and {MAX_CRF}, got {crf}"
                )));
            }
        }

        if self.thread_count == Some(0) {
            return Err(CoreError::Config(
                "Thread count must be at least 1".to_string(),
            ));
        }

        if let Some(resolution) = &self.resolution {
            if parse_resolution(resolution).is_none() {
                return Err(CoreError::Config(format!(
                    "Invalid resolution '{resolution}', expected WIDTHxHEIGHT (e.g. 1280x720)"
                )));
            }
        }

        if let Some(formats) = &self.input_formats {
            if formats.iter().any(|f| f.is_empty()) {
                return Err(CoreError::Config(
                    "Input formats must not contain empty suffixes".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Parses `WxH` or `W:H` into a width/height pair of positive integers.
#[must_use]
pub fn parse_resolution(resolution: &str) -> Option<(u32, u32)> {
    let (width, height) = resolution
        .split_once('x')
        .or_else(|| resolution.split_once(':'))?;
    let width = width.trim().parse::<u32>().ok()?;
    let height = height.trim().parse::<u32>().ok()?;
    (width > 0 && height > 0).then_some((width, height))
}

/// Ensures an output format carries its leading dot (`mkv` -> `.mkv`).
#[must_use]
pub fn normalize_output_format(format: &str) -> String {
    if format.starts_with('.') {
        format.to_string()
    } else {
        format!(".{format}")
    }
}
