// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Collection of workflow files from popular repositories.
///
/// Searches repositories above a star threshold, lists their
/// `.github/workflows` directory and persists every YAML workflow into a flat
/// output directory. Files are named after their original file name only, so
/// equally named workflows of different repositories overwrite each other.
use std::{fmt, fs, path::Path, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::{
    config::HarvestConfig,
    dataset::is_workflow_file_name,
    github::{SEARCH_PAGE_SIZE, SEARCH_RESULT_LIMIT},
    source::{EntryKind, RateLimitCategory, RepositorySummary, SourceError, WorkflowSource},
};

/// Repository directory holding GitHub Actions workflows.
pub const WORKFLOW_DIR: &str = ".github/workflows";

/// Workflow file collected from a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct WorkflowRecord
{
    /// Repository in `owner/name` form.
    pub repository_full_name: String,
    /// Path of the file inside the repository.
    pub file_path:            String,
    /// UTF-8 content of the file.
    pub file_content:         String,
}

/// Reason a collection run stopped before reaching `max_repos`.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub enum HaltReason
{
    /// The credential was rejected during the initial check.
    Unauthorized(SourceError,),
    /// The authentication check failed for another reason.
    AuthenticationFailed(SourceError,),
    /// The search quota ran out; the run has to be restarted after `waited`.
    SearchRateLimited
    {
        waited: Duration,
    },
    /// The repository search failed.
    SearchFailed(SourceError,),
    /// The output directory could not be created.
    OutputDirectory(String,),
}

impl fmt::Display for HaltReason
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        match self {
            Self::Unauthorized(error,) => {
                write!(f, "invalid GitHub token, please check your token ({error})")
            }
            Self::AuthenticationFailed(error,) => {
                write!(f, "error initializing GitHub client: {error}")
            }
            Self::SearchRateLimited {
                waited,
            } => write!(
                f,
                "search rate limit exceeded; waited {}s, please rerun the collection",
                waited.as_secs()
            ),
            Self::SearchFailed(error,) => write!(f, "repository search failed: {error}"),
            Self::OutputDirectory(message,) => write!(f, "output directory unavailable: {message}"),
        }
    }
}

/// Result of a collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct CollectionOutcome
{
    /// Collected workflow files, in collection order.
    pub records:                Vec<WorkflowRecord,>,
    /// Repositories processed, including those without workflows.
    pub repositories_processed: usize,
    /// Set when the run stopped early.
    pub halt:                   Option<HaltReason,>,
}

/// Collects workflow files from repositories with more than
/// `config.min_stars` stars.
///
/// The returned outcome always carries whatever was collected before a halt;
/// failures never abort the run with an error. Per-file and per-repository
/// failures are logged and skipped, quota exhaustion is waited out.
///
/// # Example
///
/// ```no_run
/// use wfharvest::{GitHubSource, HarvestConfig, collect_workflows};
///
/// # async fn example() -> Result<(), wfharvest::SourceError> {
/// let source = GitHubSource::new("ghp_token",)?;
/// let config = HarvestConfig {
///     max_repos: 5, ..HarvestConfig::default()
/// };
/// let outcome = collect_workflows(&source, &config,).await;
/// println!("collected {} workflow files", outcome.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn collect_workflows<S,>(source: &S, config: &HarvestConfig,) -> CollectionOutcome
where
    S: WorkflowSource,
{
    let mut outcome = CollectionOutcome::default();

    match source.authenticate().await {
        Ok(login,) => info!("Authenticated as: {}", login),
        Err(error @ SourceError::Unauthorized { .. },) => {
            error!("Invalid GitHub token: {}", error);
            outcome.halt = Some(HaltReason::Unauthorized(error,),);
            return outcome;
        }
        Err(error,) => {
            error!("Error initializing GitHub client: {}", error);
            outcome.halt = Some(HaltReason::AuthenticationFailed(error,),);
            return outcome;
        }
    }

    if let Err(error,) = fs::create_dir_all(&config.output_dir,) {
        error!("Failed to create {}: {}", config.output_dir.display(), error);
        outcome.halt = Some(HaltReason::OutputDirectory(error.to_string(),),);
        return outcome;
    }

    info!("Searching for repositories with more than {} stars...", config.min_stars);
    let query = config.search_query();
    let progress = progress_bar(config.max_repos,);
    let delay = Duration::from_millis(config.request_delay_ms,);
    let mut page = 1u32;

    'pages: while outcome.repositories_processed < config.max_repos {
        let repositories = match source.search_repositories(&query, page,).await {
            Ok(repositories,) => repositories,
            Err(error,) if error.is_rate_limited() => {
                let waited = config.rate_limit.wait_for_reset(source, RateLimitCategory::Search,).await;
                warn!("Search rate limit exhausted. Please rerun the collection after the reset.");
                outcome.halt = Some(HaltReason::SearchRateLimited {
                    waited,
                },);
                break;
            }
            Err(error,) => {
                error!("Repository search failed: {}", error);
                outcome.halt = Some(HaltReason::SearchFailed(error,),);
                break;
            }
        };

        let exhausted = repositories.len() < usize::from(SEARCH_PAGE_SIZE,);
        for repository in repositories {
            if outcome.repositories_processed >= config.max_repos {
                break 'pages;
            }

            progress.set_message(repository.repo.to_string(),);
            let records = process_repository(source, &repository, config,).await;
            outcome.records.extend(records,);
            outcome.repositories_processed += 1;
            progress.inc(1,);

            sleep(delay,).await;
        }

        if exhausted {
            debug!("Search results exhausted after page {}", page);
            break;
        }
        if page.saturating_mul(u32::from(SEARCH_PAGE_SIZE,),) >= SEARCH_RESULT_LIMIT {
            info!("Reached the search API limit of {} results. Stopping.", SEARCH_RESULT_LIMIT);
            break;
        }
        page += 1;
    }

    if outcome.repositories_processed >= config.max_repos {
        info!("Reached maximum repository limit ({}). Stopping.", config.max_repos);
    }
    progress.finish_with_message(format!("{} workflow files collected", outcome.records.len()),);
    info!(
        "Finished. Total workflow files collected: {} (saved to {})",
        outcome.records.len(),
        config.output_dir.display()
    );

    outcome
}

/// Collects one repository, re-attempting it while its quota is exhausted.
async fn process_repository<S,>(
    source: &S,
    repository: &RepositorySummary,
    config: &HarvestConfig,
) -> Vec<WorkflowRecord,>
where
    S: WorkflowSource,
{
    info!("Processing repository: {} (Stars: {})", repository.repo, repository.stars);
    let mut attempt = 0u32;

    loop {
        match fetch_repository_workflows(source, repository, &config.output_dir,).await {
            Ok(records,) => return records,
            Err(SourceError::NotFound {
                ..
            },) => {
                info!("No {} directory found in {}", WORKFLOW_DIR, repository.repo);
                return Vec::new();
            }
            Err(error,) if error.is_rate_limited() && attempt < config.rate_limit.max_retries => {
                attempt += 1;
                warn!(
                    "Rate limit hit while processing {} (retry {}/{})",
                    repository.repo, attempt, config.rate_limit.max_retries
                );
                config.rate_limit.wait_for_reset(source, RateLimitCategory::Core,).await;
            }
            Err(error,) => {
                warn!("Error accessing {}: {}", repository.repo, error);
                return Vec::new();
            }
        }
    }
}

/// Lists the workflow directory of a repository and persists each workflow.
///
/// Per-file failures are logged and skipped; listing failures and quota
/// exhaustion are returned to the caller.
async fn fetch_repository_workflows<S,>(
    source: &S,
    repository: &RepositorySummary,
    output_dir: &Path,
) -> Result<Vec<WorkflowRecord,>, SourceError,>
where
    S: WorkflowSource,
{
    let entries = source.list_directory(&repository.repo, WORKFLOW_DIR,).await?;
    let full_name = repository.repo.to_string();
    let mut records = Vec::new();

    for entry in entries {
        if entry.kind != EntryKind::File || !is_workflow_file_name(&entry.name,) {
            continue;
        }

        let bytes = match source.fetch_file(&repository.repo, &entry.path,).await {
            Ok(bytes,) => bytes,
            Err(error,) if error.is_rate_limited() => return Err(error,),
            Err(error,) => {
                warn!("Error reading file {} in {}: {}", entry.path, full_name, error);
                continue;
            }
        };

        let Ok(file_content,) = String::from_utf8(bytes,) else {
            warn!(
                "Could not decode content of {} in {} (possible binary file). Skipping.",
                entry.path, full_name
            );
            continue;
        };

        let Some(file_name,) = Path::new(&entry.name,).file_name() else {
            warn!("Skipping {} in {}: no usable file name", entry.path, full_name);
            continue;
        };
        let destination = output_dir.join(file_name,);
        if let Err(error,) = fs::write(&destination, &file_content,) {
            warn!("Failed to save {}: {}", destination.display(), error);
            continue;
        }
        info!("Saved: {}", destination.display());

        records.push(WorkflowRecord {
            repository_full_name: full_name.clone(),
            file_path: entry.path,
            file_content,
        },);
    }

    Ok(records,)
}

fn progress_bar(max_repos: usize,) -> ProgressBar
{
    let progress = ProgressBar::new(max_repos as u64,);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:30} {pos}/{len} {msg}",)
            .unwrap_or_else(|_| ProgressStyle::default_bar(),),
    );
    progress
}
