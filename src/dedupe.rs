//! Removal of workflow files whose content duplicates an earlier file.
//!
//! Files are compared by exact text equality; two files differing only in
//! trailing whitespace are distinct. The first file in name order is kept.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::{info, warn};

use crate::{dataset, error::Error};

/// Outcome of a duplicate removal pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize,)]
pub struct DedupeReport
{
    /// Number of distinct content bodies kept.
    pub kept:    usize,
    /// Files deleted because an earlier file had the same content.
    pub removed: Vec<PathBuf,>,
}

/// Deletes workflow files in `dir` whose content equals an earlier file.
///
/// Unreadable files are logged and left in place.
///
/// # Errors
///
/// Returns an [`Error`] when `dir` cannot be listed.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use wfharvest::remove_duplicate_files;
///
/// let report = remove_duplicate_files(Path::new("github_workflows_dataset",),)?;
/// println!("removed {} duplicates", report.removed.len());
/// # Ok::<(), wfharvest::Error>(())
/// ```
pub fn remove_duplicate_files(dir: &Path,) -> Result<DedupeReport, Error,>
{
    let files = dataset::workflow_files(dir,)?;
    let mut seen: HashMap<String, PathBuf,> = HashMap::with_capacity(files.len(),);
    let mut report = DedupeReport::default();

    for path in files {
        let content = match fs::read_to_string(&path,) {
            Ok(content,) => content,
            Err(error,) => {
                warn!("Failed to read {}: {}", path.display(), error);
                continue;
            }
        };

        if let Some(original,) = seen.get(&content,) {
            match fs::remove_file(&path,) {
                Ok((),) => {
                    info!("Removed {} (duplicate of {})", path.display(), original.display());
                    report.removed.push(path,);
                }
                Err(error,) => warn!("Failed to remove duplicate {}: {}", path.display(), error),
            }
        } else {
            seen.insert(content, path,);
        }
    }

    report.kept = seen.len();
    Ok(report,)
}
