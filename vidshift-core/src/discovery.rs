//! File discovery module for finding video files to convert.
//!
//! The census walks the whole tree under the scan root and returns every
//! regular file that passes the optional suffix filter. The staging
//! directory at the root is skipped, so running the tool again over the
//! same tree never picks up originals staged by an earlier run.

use crate::config::STAGING_DIR_NAME;
use crate::error::CoreResult;

use walkdir::{DirEntry, WalkDir};

use std::path::{Path, PathBuf};

/// A file selected for conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Absolute location of the file when it was discovered.
    pub source_path: PathBuf,
    /// Location relative to the scan root. Used to mirror the tree under
    /// the staging directory and to derive the output path.
    pub relative_path: PathBuf,
}

/// Finds every file under `root` eligible for conversion.
///
/// A file is included when `input_formats` is `None` or its file name ends
/// with one of the given suffixes (exact, case-sensitive). The result is
/// sorted lexicographically by relative path.
///
/// # Arguments
///
/// * `root` - The directory to search, recursively
/// * `input_formats` - Optional suffix allow-list, e.g. `[".mp4", ".ts"]`
///
/// # Returns
///
/// * `Ok(Vec<CandidateFile>)` - The discovered files, possibly empty
/// * `Err(CoreError::Walkdir)` - If the root or a subdirectory cannot be read
///
/// # Examples
///
/// ```rust,no_run
/// use vidshift_core::find_candidate_files;
/// use std::path::Path;
///
/// let formats = vec![".mp4".to_string()];
/// let files = find_candidate_files(Path::new("/media/recordings"), Some(&formats)).unwrap();
/// for file in files {
///     println!("{}", file.relative_path.display());
/// }
/// ```
pub fn find_candidate_files(
    root: &Path,
    input_formats: Option<&[String]>,
) -> CoreResult<Vec<CandidateFile>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_staging_dir(entry));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if !matches_formats(entry.file_name().to_string_lossy().as_ref(), input_formats) {
            continue;
        }

        let source_path = entry.path().to_path_buf();
        let relative_path = source_path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(entry.file_name()));
        files.push(CandidateFile {
            source_path,
            relative_path,
        });
    }

    files.sort_by(|a, b| a.relative_path.as_os_str().cmp(b.relative_path.as_os_str()));
    log::debug!("Census found {} candidate file(s) under {}", files.len(), root.display());
    Ok(files)
}

/// The staging directory only exists directly under the scan root.
fn is_staging_dir(entry: &DirEntry) -> bool {
    entry.depth() == 1 && entry.file_type().is_dir() && entry.file_name() == STAGING_DIR_NAME
}

fn matches_formats(file_name: &str, input_formats: Option<&[String]>) -> bool {
    match input_formats {
        None => true,
        Some(formats) => formats.iter().any(|suffix| file_name.ends_with(suffix.as_str())),
    }
}
