// ============================================================================
// vidshift-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// This module implements the builder pattern for the CoreConfig structure,
// providing a fluent API for creating CoreConfig instances with the library
// defaults filled in.

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::{CoreConfig, normalize_output_format};

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use vidshift_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .input_dir(PathBuf::from("/media/recordings"))
///     .output_format("mp4")
///     .audio_bitrate("192k")
///     .strip_metadata(true)
///     .build();
///
/// assert_eq!(config.output_format, ".mp4");
/// assert!(config.strip_metadata);
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl Default for CoreConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreConfigBuilder {
    /// Creates a new CoreConfigBuilder with default values and the current directory as root.
    pub fn new() -> Self {
        Self {
            config: CoreConfig::new(PathBuf::from(".")),
        }
    }

    /// Sets the directory that is scanned and converted in place.
    pub fn input_dir(mut self, input_dir: PathBuf) -> Self {
        self.config.input_dir = input_dir;
        self
    }

    /// Restricts the census to files ending with one of `formats`.
    pub fn input_formats(mut self, formats: Vec<String>) -> Self {
        self.config.input_formats = Some(formats);
        self
    }

    /// Sets the output extension; a missing leading dot is added.
    pub fn output_format(mut self, format: &str) -> Self {
        self.config.output_format = normalize_output_format(format);
        self
    }

    pub fn bitrate(mut self, bitrate: &str) -> Self {
        self.config.bitrate = Some(bitrate.to_string());
        self
    }

    pub fn resolution(mut self, resolution: &str) -> Self {
        self.config.resolution = Some(resolution.to_string());
        self
    }

    pub fn video_codec(mut self, codec: &str) -> Self {
        self.config.video_codec = Some(codec.to_string());
        self
    }

    pub fn preset(mut self, preset: &str) -> Self {
        self.config.preset = Some(preset.to_string());
        self
    }

    pub fn framerate(mut self, framerate: &str) -> Self {
        self.config.framerate = Some(framerate.to_string());
        self
    }

    pub fn crf(mut self, crf: u8) -> Self {
        self.config.crf = Some(crf);
        self
    }

    pub fn container_format(mut self, format: &str) -> Self {
        self.config.container_format = Some(format.to_string());
        self
    }

    pub fn thread_count(mut self, threads: usize) -> Self {
        self.config.thread_count = Some(threads);
        self
    }

    pub fn audio_codec(mut self, codec: &str) -> Self {
        self.config.audio_codec = codec.to_string();
        self
    }

    pub fn audio_bitrate(mut self, bitrate: &str) -> Self {
        self.config.audio_bitrate = bitrate.to_string();
        self
    }

    pub fn audio_filter(mut self, filter: &str) -> Self {
        self.config.audio_filter = Some(filter.to_string());
        self
    }

    pub fn strip_metadata(mut self, strip: bool) -> Self {
        self.config.strip_metadata = strip;
        self
    }

    /// Enables per-file raw ffmpeg logs.
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    pub fn max_simultaneous(mut self, jobs: usize) -> Self {
        self.config.max_simultaneous = jobs;
        self
    }

    pub fn delete_originals(mut self, delete: bool) -> Self {
        self.config.delete_originals = delete;
        self
    }

    /// Builds the CoreConfig. Call [`CoreConfig::validate`] before using it.
    pub fn build(self) -> CoreConfig {
        self.config
    }
}
