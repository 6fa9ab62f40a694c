// ============================================================================
// vidshift-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for vidshift-core
//
// This module defines the error types used throughout the vidshift-core
// library. It uses thiserror for the Display and source plumbing.
//
// KEY COMPONENTS:
// - CoreError: Enum of all errors the library can produce
// - CoreResult: Type alias for Result<T, CoreError>
// - Helper constructors for subprocess errors
//
// Only errors that abort the whole batch (census, relocation barrier,
// worker pool construction) ever reach the caller. Everything that happens
// inside a single conversion job is turned into a failed JobResult.

// ---- External crate imports ----
use thiserror::Error;

// ---- Standard library imports ----
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Errors that can occur in the vidshift-core library.
#[derive(Error, Debug)]
pub enum CoreError {
    // ---- I/O and File System Errors ----
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Directory traversal error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("Path error: {0}")]
    PathError(String),

    // ---- Staging Errors ----
    /// The staging directory could not be created.
    #[error("Failed to create staging directory '{}': {source}", .path.display())]
    StagingDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A staged copy already exists where an original would be moved.
    #[error("Staging conflict: '{}' already exists", .0.display())]
    StagingConflict(PathBuf),

    /// Moving an original into the staging area failed.
    #[error("Failed to stage '{}' as '{}': {source}", .from.display(), .to.display())]
    Relocation {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Moving a staged original back to its original path failed.
    #[error("Failed to restore '{}' to '{}': {source}", .from.display(), .to.display())]
    Restore {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    // ---- Conversion Errors ----
    #[error("Output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("Expected output file was not produced: {}", .0.display())]
    OutputMissing(PathBuf),

    /// Two files of the batch would write, or overwrite, the same path.
    #[error("Output file {} collides with {}", .output.display(), .other.display())]
    OutputCollision { output: PathBuf, other: PathBuf },

    // ---- External Command Errors ----
    #[error("Failed to execute {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed to wait for {0}: {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("Command {cmd} failed with status {status}: {stderr}")]
    CommandFailed {
        cmd: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    // ---- Configuration and Scheduling Errors ----
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Conversion job panicked: {0}")]
    JobPanicked(String),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}

/// Result type for vidshift-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Creates a [`CoreError::CommandStart`] for a command that could not be launched.
pub fn command_start_error(cmd: impl Into<String>, error: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), error)
}

/// Creates a [`CoreError::CommandWait`] for a command whose exit could not be awaited.
pub fn command_wait_error(cmd: impl Into<String>, error: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), error)
}

/// Creates a [`CoreError::CommandFailed`] for a command that exited unsuccessfully.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        cmd: cmd.into(),
        status,
        stderr: stderr.into(),
    }
}
