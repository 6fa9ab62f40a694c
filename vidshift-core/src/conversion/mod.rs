//! Conversion of a single staged file.
//!
//! `params` resolves what to run, `command` turns it into ffmpeg
//! arguments, `progress` interprets ffmpeg's telemetry and `job` ties them
//! together around one subprocess.

pub mod command;
pub mod job;
pub mod params;
pub mod progress;

pub use command::{build_args, build_command};
pub use job::{JobContext, run_job};
pub use params::ConversionParams;
pub use progress::ProgressTracker;
