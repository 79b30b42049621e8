// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Single-repository lookups used to inspect a repository before collecting.
///
/// Both helpers work with an anonymous [`GitHubSource`](crate::GitHubSource)
/// as long as the unauthenticated quota is not exhausted.
use tracing::{debug, info};

use crate::{
    collector::WORKFLOW_DIR,
    dataset::is_workflow_file_name,
    error::Error,
    source::{EntryKind, RepoRef, RepositoryInfo, SourceError, WorkflowSource},
};

/// Fetches basic metadata about `repo`.
///
/// # Errors
///
/// Returns [`Error::Source`](Error::Source) when the repository does not
/// exist or the request fails.
pub async fn fetch_repository_info<S,>(source: &S, repo: &RepoRef,) -> Result<RepositoryInfo, Error,>
where
    S: WorkflowSource,
{
    let info = source.repository_info(repo,).await?;
    debug!("Fetched metadata for {}: {} stars", repo, info.stars);
    Ok(info,)
}

/// Counts workflow files in the workflow directory of `repo`.
///
/// A repository without a workflow directory has zero workflows.
///
/// # Errors
///
/// Returns [`Error::Source`](Error::Source) for failures other than a missing
/// directory.
pub async fn count_repository_workflows<S,>(source: &S, repo: &RepoRef,) -> Result<usize, Error,>
where
    S: WorkflowSource,
{
    let entries = match source.list_directory(repo, WORKFLOW_DIR,).await {
        Ok(entries,) => entries,
        Err(SourceError::NotFound {
            ..
        },) => {
            info!("{} has no {} directory", repo, WORKFLOW_DIR);
            return Ok(0,);
        }
        Err(error,) => return Err(error.into(),),
    };

    Ok(entries
        .iter()
        .filter(|entry| entry.kind == EntryKind::File && is_workflow_file_name(&entry.name,),)
        .count(),)
}
