//! Helpers for the flat directory of collected workflow files.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{self, Error};

/// Extensions recognized as workflow files.
pub const WORKFLOW_EXTENSIONS: [&str; 2] = [".yml", ".yaml"];

/// Returns `true` when `name` ends with a workflow extension.
///
/// Matching is case-sensitive, as GitHub only picks up lowercase extensions.
///
/// # Examples
///
/// ```
/// use wfharvest::is_workflow_file_name;
///
/// assert!(is_workflow_file_name("ci.yml"));
/// assert!(is_workflow_file_name("release.yaml"));
/// assert!(!is_workflow_file_name("README.md"));
/// ```
pub fn is_workflow_file_name(name: &str,) -> bool
{
    WORKFLOW_EXTENSIONS.iter().any(|extension| name.ends_with(extension,),)
}

/// Lists the workflow files directly inside `dir`, sorted by file name.
///
/// Sub-directories are not descended into.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) when `dir` is not a
/// directory and [`Error::Io`](Error::Io) when it cannot be read.
pub fn workflow_files(dir: &Path,) -> Result<Vec<PathBuf,>, Error,>
{
    if !dir.is_dir() {
        return Err(Error::validation(format!(
            "{} does not exist or is not a directory",
            dir.display()
        ),),);
    }

    let entries = fs::read_dir(dir,).map_err(|source| error::io_error(dir, source,),)?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| error::io_error(dir, source,),)?;
        let path = entry.path();
        let is_workflow = path.file_name().and_then(|name| name.to_str(),).is_some_and(is_workflow_file_name,);
        if is_workflow && path.is_file() {
            files.push(path,);
        }
    }

    files.sort();
    Ok(files,)
}

/// Counts the workflow files directly inside `dir`.
///
/// # Errors
///
/// Propagates failures from [`workflow_files`].
pub fn count_workflow_files(dir: &Path,) -> Result<usize, Error,>
{
    Ok(workflow_files(dir,)?.len(),)
}
