//! Utility functions for formatting and path handling.
//!
//! General-purpose helpers used throughout the vidshift-core library and
//! by the CLI when printing summaries.

use crate::error::{CoreError, CoreResult};

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Shorthand for [`format_duration`] on a [`Duration`].
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    format_duration(elapsed.as_secs_f64())
}

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Returns the file stem of `path` or a `PathError` if it has none.
pub fn get_file_stem_safe(path: &Path) -> CoreResult<String> {
    Ok(path
        .file_stem()
        .ok_or_else(|| CoreError::PathError(format!("Failed to get file stem for {}", path.display())))?
        .to_string_lossy()
        .to_string())
}

/// Replaces the extension of `relative` with `output_format` (which carries its dot).
///
/// `clips/a.mp4` with `.mkv` becomes `clips/a.mkv`; a path without an
/// extension simply gets the suffix appended.
pub fn replace_extension(relative: &Path, output_format: &str) -> CoreResult<PathBuf> {
    let stem = get_file_stem_safe(relative)?;
    let file_name = format!("{stem}{output_format}");
    Ok(match relative.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    })
}

/// Creates `dir` and its ancestors, tolerating directories that already exist.
pub fn ensure_directory(dir: &Path) -> std::io::Result<()> {
    match std::fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}
