//! Harvesting and analysis of GitHub Actions workflow files.
//!
//! The library searches popular GitHub repositories, downloads the workflow
//! files stored under `.github/workflows` into a flat dataset directory, and
//! analyzes that directory: duplicate removal, language classification of each
//! workflow and trigger statistics. Network access goes through the
//! [`WorkflowSource`] trait so that collection logic can run against any
//! implementation; [`GitHubSource`] is the REST API backed one.

mod classify;
mod collector;
mod config;
mod dataset;
mod dedupe;
mod error;
mod github;
mod repo_info;
mod retry;
mod source;
mod summary;
#[cfg(test)]
mod testing;
mod trigger;
mod workflow;

pub use classify::{Language, classify};
pub use collector::{CollectionOutcome, HaltReason, WORKFLOW_DIR, WorkflowRecord, collect_workflows};
pub use config::{HarvestConfig, load_config, parse_config};
pub use dataset::{WORKFLOW_EXTENSIONS, count_workflow_files, is_workflow_file_name, workflow_files};
pub use dedupe::{DedupeReport, remove_duplicate_files};
pub use error::{Error, io_error};
pub use github::GitHubSource;
pub use repo_info::{count_repository_workflows, fetch_repository_info};
pub use retry::RateLimitPolicy;
pub use source::{
    ContentEntry, EntryKind, RateLimitCategory, RepoRef, RepositoryInfo, RepositorySummary,
    SourceError, WorkflowSource,
};
pub use summary::{
    LanguageCount, LanguageReport, PrunePolicy, TriggerCount, WorkflowSummary, language_pass,
    summarize_workflows, trigger_pass,
};
pub use trigger::{MAJOR_TRIGGERS, has_trigger};
pub use workflow::ParsedWorkflow;
