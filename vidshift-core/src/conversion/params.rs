//! Resolution of the effective encoding parameters of one file.
//!
//! Explicit configuration overrides always win. Otherwise the video bitrate
//! comes from the probed media info and the encoder/preset from the
//! hardware profile.

use crate::config::{CoreConfig, FALLBACK_VIDEO_BITRATE, parse_resolution};
use crate::discovery::CandidateFile;
use crate::error::{CoreError, CoreResult};
use crate::external::MediaInfo;
use crate::hardware::HardwareProfile;
use crate::staging::StagingRecord;
use crate::utils::replace_extension;

use std::path::PathBuf;

/// Fully resolved parameters of one ffmpeg invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionParams {
    /// The staged original.
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub encoder: String,
    pub preset: String,
    pub video_bitrate: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    /// Scale target in ffmpeg's `W:H` form.
    pub scale: Option<String>,
    pub framerate: Option<String>,
    pub crf: Option<u8>,
    pub thread_count: Option<usize>,
    pub audio_filter: Option<String>,
    pub container_format: Option<String>,
    pub strip_metadata: bool,
}

impl ConversionParams {
    /// Resolves the parameters for `record` writing to `output_path`.
    ///
    /// Fails only if the configured resolution is malformed.
    pub fn resolve(
        record: &StagingRecord,
        output_path: PathBuf,
        config: &CoreConfig,
        media: &MediaInfo,
        profile: &HardwareProfile,
    ) -> CoreResult<Self> {
        let video_bitrate = config
            .bitrate
            .clone()
            .or_else(|| media.bitrate_kbps.map(|kbps| format!("{kbps}k")))
            .unwrap_or_else(|| FALLBACK_VIDEO_BITRATE.to_string());

        let scale = config
            .resolution
            .as_deref()
            .map(|res| {
                parse_resolution(res)
                    .map(|(w, h)| format!("{w}:{h}"))
                    .ok_or_else(|| CoreError::Config(format!("Invalid resolution '{res}'")))
            })
            .transpose()?;

        Ok(Self {
            input_path: record.staged_path.clone(),
            output_path,
            encoder: config
                .video_codec
                .clone()
                .unwrap_or_else(|| profile.default_encoder.clone()),
            preset: config
                .preset
                .clone()
                .unwrap_or_else(|| profile.default_preset.clone()),
            video_bitrate,
            audio_codec: config.audio_codec.clone(),
            audio_bitrate: config.audio_bitrate.clone(),
            scale,
            framerate: config.framerate.clone(),
            crf: config.crf,
            thread_count: config.thread_count,
            audio_filter: config.audio_filter.clone(),
            container_format: config.container_format.clone(),
            strip_metadata: config.strip_metadata,
        })
    }
}

/// Output path: the original's location with its extension replaced.
pub fn output_path_for(candidate: &CandidateFile, config: &CoreConfig) -> CoreResult<PathBuf> {
    let relative = replace_extension(&candidate.relative_path, &config.output_format)?;
    Ok(config.input_dir.join(relative))
}
