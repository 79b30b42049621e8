//! Aggregated statistics over a directory of collected workflow files.
//!
//! A summary runs three passes in a fixed order: the language pass classifies
//! every file (pruning those it cannot classify under [`PrunePolicy::Delete`]),
//! the trigger pass counts [`MAJOR_TRIGGERS`] over the files that remain, and a
//! final count reports how many workflow files are left.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    classify::classify,
    dataset,
    error::Error,
    trigger::{MAJOR_TRIGGERS, has_trigger},
    workflow::ParsedWorkflow,
};

/// What the language pass does with files it cannot classify.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq,)]
pub enum PrunePolicy
{
    /// Delete unreadable, unparsable and unclassifiable files.
    #[default]
    Delete,
    /// Report such files but leave them on disk.
    Keep,
}

/// Language occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct LanguageCount
{
    pub language: String,
    pub files:    usize,
}

/// Trigger occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct TriggerCount
{
    pub trigger: String,
    pub files:   usize,
}

/// Result of the language pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize,)]
pub struct LanguageReport
{
    /// Counts sorted by descending frequency, ties broken by name.
    pub languages:    Vec<LanguageCount,>,
    /// Files that could not be read, parsed or classified.
    pub unclassified: Vec<PathBuf,>,
    /// Whether `unclassified` files were deleted.
    pub pruned:       bool,
}

/// Full summary of a workflow directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct WorkflowSummary
{
    pub directory:       PathBuf,
    pub languages:       LanguageReport,
    pub triggers:        Vec<TriggerCount,>,
    /// Workflow files left after the language pass.
    pub remaining_files: usize,
}

impl WorkflowSummary
{
    /// Writes the human readable report.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `writer`.
    pub fn render<W: io::Write,>(&self, writer: &mut W,) -> io::Result<(),>
    {
        writeln!(writer, "=== Workflow files per language ===")?;
        if self.languages.languages.is_empty() {
            writeln!(writer, "No workflow files could be classified.")?;
        }
        for count in &self.languages.languages {
            writeln!(writer, "- {}: {} files", count.language, count.files)?;
        }

        writeln!(writer, "=== Workflow files per trigger ===")?;
        for count in &self.triggers {
            if count.files == 0 {
                writeln!(writer, "No workflow files contain trigger '{}'.", count.trigger)?;
            } else {
                writeln!(writer, "'{}': {} files", count.trigger, count.files)?;
            }
        }

        writeln!(
            writer,
            "{} contains {} workflow files",
            self.directory.display(),
            self.remaining_files
        )
    }
}

/// Classifies every workflow file in `dir` and tallies the languages.
///
/// Files that cannot be read, parsed or classified are collected in
/// [`LanguageReport::unclassified`] and, under [`PrunePolicy::Delete`],
/// removed from disk.
///
/// # Errors
///
/// Returns an [`Error`] when `dir` cannot be listed.
pub fn language_pass(dir: &Path, policy: PrunePolicy,) -> Result<LanguageReport, Error,>
{
    let mut tally: BTreeMap<String, usize,> = BTreeMap::new();
    let mut unclassified = Vec::new();

    for path in dataset::workflow_files(dir,)? {
        match ParsedWorkflow::load(&path,) {
            Ok(workflow,) => match classify(&workflow,) {
                Some(language,) => *tally.entry(language.label().to_owned(),).or_default() += 1,
                None => {
                    debug!("No language detected for {}", path.display());
                    unclassified.push(path,);
                }
            },
            Err(error,) => {
                warn!("Failed to analyze {}: {}", path.display(), error.to_display_string());
                unclassified.push(path,);
            }
        }
    }

    let pruned = policy == PrunePolicy::Delete;
    if pruned {
        for path in &unclassified {
            match fs::remove_file(path,) {
                Ok((),) => info!("Removed unclassifiable workflow {}", path.display()),
                Err(error,) => warn!("Failed to remove {}: {}", path.display(), error),
            }
        }
    }

    let mut languages: Vec<LanguageCount,> = tally
        .into_iter()
        .map(|(language, files,)| LanguageCount {
            language,
            files,
        },)
        .collect();
    languages.sort_by(|a, b| b.files.cmp(&a.files,).then_with(|| a.language.cmp(&b.language,),),);

    Ok(LanguageReport {
        languages,
        unclassified,
        pruned,
    },)
}

/// Counts the workflow files in `dir` that declare each of `triggers`.
///
/// Files that fail to parse are logged and count towards no trigger.
///
/// # Errors
///
/// Returns an [`Error`] when `dir` cannot be listed.
pub fn trigger_pass(dir: &Path, triggers: &[&str],) -> Result<Vec<TriggerCount,>, Error,>
{
    let mut counts: Vec<TriggerCount,> = triggers
        .iter()
        .map(|trigger| TriggerCount {
            trigger: (*trigger).to_owned(),
            files:   0,
        },)
        .collect();

    for path in dataset::workflow_files(dir,)? {
        let workflow = match ParsedWorkflow::load(&path,) {
            Ok(workflow,) => workflow,
            Err(error,) => {
                warn!("Failed to analyze {}: {}", path.display(), error.to_display_string());
                continue;
            }
        };
        for count in &mut counts {
            if has_trigger(&workflow, &count.trigger,) {
                count.files += 1;
            }
        }
    }

    Ok(counts,)
}

/// Runs the language pass, the trigger pass and the final count over `dir`.
///
/// Under [`PrunePolicy::Delete`] this mutates `dir`: the trigger pass and the
/// final count only see files that survived the language pass.
///
/// # Errors
///
/// Returns an [`Error`] when `dir` is missing or cannot be listed.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use wfharvest::{PrunePolicy, summarize_workflows};
///
/// let summary = summarize_workflows(Path::new("github_workflows_dataset",), PrunePolicy::Keep,)?;
/// summary.render(&mut std::io::stdout(),).expect("stdout",);
/// # Ok::<(), wfharvest::Error>(())
/// ```
pub fn summarize_workflows(dir: &Path, policy: PrunePolicy,) -> Result<WorkflowSummary, Error,>
{
    let languages = language_pass(dir, policy,)?;
    let triggers = trigger_pass(dir, &MAJOR_TRIGGERS,)?;
    let remaining_files = dataset::count_workflow_files(dir,)?;

    Ok(WorkflowSummary {
        directory: dir.to_path_buf(),
        languages,
        triggers,
        remaining_files,
    },)
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    const PYTHON_PUSH: &str = r"
on: [push, pull_request]
jobs:
  test:
    steps:
      - uses: actions/setup-python@v5
";

    const NODE_SCHEDULE: &str = r"
on:
  schedule:
    - cron: '0 0 * * *'
  workflow_dispatch: {}
jobs:
  build:
    steps:
      - run: npm ci
";

    const UNKNOWN_PUSH: &str = r"
on: push
jobs:
  lint:
    steps:
      - run: make lint
";

    fn fixture() -> tempfile::TempDir
    {
        let dir = tempdir().expect("failed to create tempdir",);
        fs::write(dir.path().join("python.yml",), PYTHON_PUSH,).expect("write",);
        fs::write(dir.path().join("python-copy.yaml",), PYTHON_PUSH,).expect("write",);
        fs::write(dir.path().join("node.yml",), NODE_SCHEDULE,).expect("write",);
        fs::write(dir.path().join("unknown.yml",), UNKNOWN_PUSH,).expect("write",);
        fs::write(dir.path().join("broken.yml",), "on: [push\n",).expect("write",);
        dir
    }

    #[test]
    fn summary_prunes_before_counting_triggers()
    {
        let dir = fixture();
        let summary = summarize_workflows(dir.path(), PrunePolicy::Delete,).expect("summary failed",);

        assert_eq!(summary.languages.languages, vec![
            LanguageCount {
                language: "Python".to_owned(), files: 2,
            },
            LanguageCount {
                language: "Node.js".to_owned(), files: 1,
            },
        ]);
        assert_eq!(summary.languages.unclassified.len(), 2);
        assert!(summary.languages.pruned);
        assert!(!dir.path().join("unknown.yml").exists());
        assert!(!dir.path().join("broken.yml").exists());

        let push = &summary.triggers[0];
        assert_eq!(push.trigger, "push");
        assert_eq!(push.files, 2, "pruned unknown.yml must not be counted");
        assert_eq!(summary.triggers[1].files, 2);
        assert_eq!(summary.triggers[2].files, 1);
        assert_eq!(summary.triggers[3].files, 1);
        assert_eq!(summary.remaining_files, 3);
    }

    #[test]
    fn keep_policy_leaves_files_on_disk()
    {
        let dir = fixture();
        let summary = summarize_workflows(dir.path(), PrunePolicy::Keep,).expect("summary failed",);

        assert!(!summary.languages.pruned);
        assert!(dir.path().join("unknown.yml").exists());
        assert_eq!(summary.triggers[0].files, 3);
        assert_eq!(summary.remaining_files, 5);
    }

    #[test]
    fn render_lists_languages_and_triggers()
    {
        let dir = fixture();
        let summary = summarize_workflows(dir.path(), PrunePolicy::Keep,).expect("summary failed",);

        let mut buffer = Vec::new();
        summary.render(&mut buffer,).expect("render failed",);
        let output = String::from_utf8(buffer,).expect("invalid UTF-8",);

        assert!(output.contains("- Python: 2 files"));
        assert!(output.contains("'push': 3 files"));
        assert!(output.contains("'workflow_dispatch': 1 files"));
        assert!(output.ends_with("contains 5 workflow files\n"));
    }

    #[test]
    fn render_reports_missing_triggers()
    {
        let dir = tempdir().expect("failed to create tempdir",);
        fs::write(dir.path().join("only.yml",), PYTHON_PUSH,).expect("write",);

        let summary = summarize_workflows(dir.path(), PrunePolicy::Delete,).expect("summary failed",);
        let mut buffer = Vec::new();
        summary.render(&mut buffer,).expect("render failed",);
        let output = String::from_utf8(buffer,).expect("invalid UTF-8",);

        assert!(output.contains("No workflow files contain trigger 'schedule'."));
    }

    #[test]
    fn summary_requires_existing_directory()
    {
        let dir = tempdir().expect("failed to create tempdir",);
        let error = summarize_workflows(&dir.path().join("absent",), PrunePolicy::Delete,)
            .expect_err("expected missing directory error",);
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[test]
    fn summary_serializes_to_json()
    {
        let dir = fixture();
        let summary = summarize_workflows(dir.path(), PrunePolicy::Keep,).expect("summary failed",);
        let json = serde_json::to_string(&summary,).expect("serialization failed",);
        assert!(json.contains("\"remaining_files\":5"));
        assert!(json.contains("\"trigger\":\"schedule\""));
    }
}
