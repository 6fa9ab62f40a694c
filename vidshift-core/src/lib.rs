//! Core library for batch video conversion driven by ffmpeg.
//!
//! This crate discovers video files under a directory, moves the originals
//! into an `old/` staging area, runs one ffmpeg conversion per file on a
//! bounded worker pool with hardware-aware encoder defaults, and restores
//! the original of every conversion that fails.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use vidshift_core::config::CoreConfigBuilder;
//! use vidshift_core::external::{CrateFfprobeExecutor, SidecarSpawner};
//! use vidshift_core::hardware::SystemProbe;
//! use vidshift_core::reporting::NullProgressReporter;
//! use vidshift_core::convert_directory;
//! use std::path::PathBuf;
//!
//! let config = CoreConfigBuilder::new()
//!     .input_dir(PathBuf::from("/media/recordings"))
//!     .input_formats(vec![".ts".to_string()])
//!     .max_simultaneous(2)
//!     .build();
//!
//! let summary = convert_directory(
//!     &config,
//!     &SidecarSpawner,
//!     &CrateFfprobeExecutor::new(),
//!     &SystemProbe,
//!     &NullProgressReporter,
//! )
//! .unwrap();
//! assert_eq!(summary.total, summary.succeeded + summary.failed);
//! ```

pub mod batch;
pub mod config;
pub mod conversion;
pub mod discovery;
pub mod error;
pub mod external;
pub mod hardware;
pub mod reporting;
pub mod scheduler;
pub mod staging;
pub mod utils;

// Re-exports for public API
pub use batch::convert_directory;
pub use config::{CoreConfig, CoreConfigBuilder};
pub use discovery::{CandidateFile, find_candidate_files};
pub use error::{CoreError, CoreResult};
pub use hardware::{HardwareClass, HardwareProfile};
pub use reporting::{BatchSummary, JobOutcome, JobResult, ProgressReporter, ProgressUpdate};
pub use staging::{StagingArea, StagingRecord};
pub use utils::{format_bytes, format_duration};
