// vidshift-cli/src/cli.rs
//
// Defines the command-line argument structure using clap.

use clap::builder::TypedValueParser;
use clap::Parser;
use std::path::PathBuf;
use vidshift_core::config::{
    DEFAULT_AUDIO_BITRATE, DEFAULT_AUDIO_CODEC, DEFAULT_MAX_SIMULTANEOUS, DEFAULT_OUTPUT_FORMAT,
    MAX_CRF,
};

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "vidshift: batch video conversion tool",
    long_about = "Converts every video file under a directory in place using ffmpeg. \
                  Originals are moved to an 'old' subdirectory first and restored if \
                  their conversion fails."
)]
pub struct Cli {
    /// Directory to scan recursively for files to convert
    #[arg(short = 'd', long = "directory", required = true, value_name = "DIR")]
    pub directory: PathBuf,

    /// Only convert files whose names end with one of these suffixes (e.g. .mp4 .ts or .mp4,.ts)
    #[arg(
        short = 'i',
        long = "input-formats",
        num_args = 1..,
        value_delimiter = ',',
        value_name = "SUFFIX"
    )]
    pub input_formats: Option<Vec<String>>,

    /// Output file extension; a leading dot is added if missing
    #[arg(short = 'o', long = "output-format", default_value = DEFAULT_OUTPUT_FORMAT, value_name = "EXT")]
    pub output_format: String,

    // --- Video Settings ---
    /// Video bitrate (e.g. 2500k). Defaults to the bitrate of the input
    #[arg(short = 'b', long, value_name = "BITRATE")]
    pub bitrate: Option<String>,

    /// Scale to WIDTHxHEIGHT (e.g. 1280x720) or ffmpeg's W:H
    #[arg(short = 'r', long, value_name = "WxH")]
    pub resolution: Option<String>,

    /// Video encoder. Defaults to hevc_nvenc, hevc_amf or libx265 depending on the hardware
    #[arg(long, value_name = "ENCODER")]
    pub video_codec: Option<String>,

    /// Encoder preset. Defaults to slow (GPU) or veryslow (CPU)
    #[arg(long, value_name = "PRESET")]
    pub preset: Option<String>,

    /// Output frame rate
    #[arg(long, value_name = "FPS")]
    pub framerate: Option<String>,

    /// Constant rate factor
    #[arg(long, value_name = "CRF", value_parser = clap::value_parser!(u8).range(0..=MAX_CRF as i64))]
    pub crf: Option<u8>,

    /// ffmpeg muxer passed to -f (e.g. matroska)
    #[arg(long, value_name = "FORMAT")]
    pub container_format: Option<String>,

    /// Threads used by each ffmpeg process
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub thread_count: Option<u16>,

    // --- Audio Settings ---
    #[arg(long, default_value = DEFAULT_AUDIO_CODEC, value_name = "CODEC")]
    pub audio_codec: String,

    #[arg(long, default_value = DEFAULT_AUDIO_BITRATE, value_name = "BITRATE")]
    pub audio_bitrate: String,

    /// ffmpeg audio filter passed to -af (e.g. loudnorm)
    #[arg(long, value_name = "FILTER")]
    pub audio_filter: Option<String>,

    /// Drop global metadata from the outputs
    #[arg(long, visible_alias = "remove-metadata")]
    pub strip_metadata: bool,

    // --- Processing Options ---
    /// Maximum number of simultaneous conversions (capped at 8)
    #[arg(
        short = 'j',
        long,
        default_value_t = DEFAULT_MAX_SIMULTANEOUS,
        value_parser = clap::value_parser!(u16).range(1..).map(usize::from),
        value_name = "N"
    )]
    pub max_simultaneous: usize,

    /// Delete staged originals after a successful conversion
    #[arg(long)]
    pub delete_originals: bool,

    /// Write the raw ffmpeg output of each file to <name>_conversion.log
    #[arg(long)]
    pub debug: bool,

    /// Exit with status 1 if any conversion failed
    #[arg(long)]
    pub strict: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}
