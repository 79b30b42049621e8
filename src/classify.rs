//! Heuristic detection of the primary language a workflow builds.
//!
//! Steps are scanned in job order, then step order. A step using an action is
//! matched against [`ACTION_RULES`]; a step running a shell command is matched
//! against [`COMMAND_RULES`]. Every matching step replaces the tentative
//! language, so the result reflects the last classifying step of the file.

use std::fmt;

use serde::Serialize;
use serde_yaml::Mapping;
use tracing::debug;

use crate::workflow::ParsedWorkflow;

/// Languages recognized by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,)]
pub enum Language
{
    Python,
    NodeJs,
    Java,
    Go,
    Ruby,
    Php,
    CSharp,
    Rust,
    Container,
}

impl Language
{
    /// Human readable label used in reports.
    pub const fn label(self,) -> &'static str
    {
        match self {
            Self::Python => "Python",
            Self::NodeJs => "Node.js",
            Self::Java => "Java",
            Self::Go => "Go",
            Self::Ruby => "Ruby",
            Self::Php => "PHP",
            Self::CSharp => "C#",
            Self::Rust => "Rust",
            Self::Container => "Docker/Container",
        }
    }
}

impl fmt::Display for Language
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.write_str(self.label(),)
    }
}

/// Action reference fragment and the language it implies.
///
/// A `None` language marks actions that are recognized but language-neutral;
/// they end the table scan without changing the tentative result.
pub const ACTION_RULES: &[(&str, Option<Language,>,)] = &[
    ("setup-python", Some(Language::Python,),),
    ("setup-node", Some(Language::NodeJs,),),
    ("setup-java", Some(Language::Java,),),
    ("setup-go", Some(Language::Go,),),
    ("actions/checkout", None,),
    ("docker/build-push-action", Some(Language::Container,),),
    ("ruby/setup-ruby", Some(Language::Ruby,),),
    ("php/setup-php", Some(Language::Php,),),
];

/// How the fragments of a command rule combine.
#[derive(Debug, Clone, Copy,)]
pub enum Fragments
{
    /// Every fragment must occur.
    All(&'static [&'static str],),
    /// At least one fragment must occur.
    Any(&'static [&'static str],),
}

impl Fragments
{
    fn matches(self, haystack: &str,) -> bool
    {
        match self {
            Self::All(needles,) => needles.iter().all(|needle| haystack.contains(needle,),),
            Self::Any(needles,) => needles.iter().any(|needle| haystack.contains(needle,),),
        }
    }
}

/// Shell command fragments and the language they imply, in priority order.
pub const COMMAND_RULES: &[(Fragments, Language,)] = &[
    (Fragments::All(&["python", "pip",],), Language::Python,),
    (Fragments::Any(&["npm", "node",],), Language::NodeJs,),
    (Fragments::Any(&["java", "maven", "gradle",],), Language::Java,),
    // "cargo build" contains "go build"; it has to be checked first.
    (Fragments::Any(&["cargo build",],), Language::Rust,),
    (Fragments::Any(&["go build", "go run",],), Language::Go,),
    (Fragments::Any(&["bundle install", "rake",],), Language::Ruby,),
    (Fragments::Any(&["composer install",],), Language::Php,),
    (Fragments::Any(&["dotnet",],), Language::CSharp,),
];

/// Infers the primary language of a workflow.
///
/// Returns `None` when the document has no `jobs` mapping or no step matches
/// any rule.
///
/// # Examples
///
/// ```
/// use wfharvest::{Language, ParsedWorkflow, classify};
///
/// let workflow = ParsedWorkflow::parse(
///     r"
/// jobs:
///   test:
///     steps:
///       - uses: actions/checkout@v4
///       - uses: actions/setup-python@v5
/// ",
/// )?;
/// assert_eq!(classify(&workflow,), Some(Language::Python));
/// # Ok::<(), wfharvest::Error>(())
/// ```
pub fn classify(workflow: &ParsedWorkflow,) -> Option<Language,>
{
    let jobs = workflow.jobs()?;
    match scan_jobs(jobs,) {
        Ok(detected,) => detected,
        Err(MalformedWorkflow,) => {
            debug!("Workflow jobs have an unexpected shape; leaving it unclassified");
            None
        }
    }
}

/// A job, step list, step or step value of an unexpected YAML type.
#[derive(Debug,)]
struct MalformedWorkflow;

fn scan_jobs(jobs: &Mapping,) -> Result<Option<Language,>, MalformedWorkflow,>
{
    let mut detected = None;

    for job in jobs.values() {
        let job = job.as_mapping().ok_or(MalformedWorkflow,)?;
        let Some(steps,) = job.get("steps",) else {
            continue;
        };
        for step in steps.as_sequence().ok_or(MalformedWorkflow,)? {
            let step = step.as_mapping().ok_or(MalformedWorkflow,)?;
            if let Some(language,) = classify_step(step,)? {
                detected = Some(language,);
            }
        }
    }

    Ok(detected,)
}

fn classify_step(step: &Mapping,) -> Result<Option<Language,>, MalformedWorkflow,>
{
    if let Some(uses,) = step.get("uses",) {
        let reference = uses.as_str().ok_or(MalformedWorkflow,)?;
        return Ok(classify_action(&reference.to_lowercase(),),);
    }
    match step.get("run",) {
        Some(run,) => {
            let command = run.as_str().ok_or(MalformedWorkflow,)?;
            Ok(classify_command(&command.to_lowercase(),),)
        }
        None => Ok(None,),
    }
}

fn classify_action(reference: &str,) -> Option<Language,>
{
    ACTION_RULES
        .iter()
        .find(|(fragment, _,)| reference.contains(fragment,),)
        .and_then(|(_, language,)| *language,)
}

fn classify_command(command: &str,) -> Option<Language,>
{
    COMMAND_RULES
        .iter()
        .find(|(fragments, _,)| fragments.matches(command,),)
        .map(|(_, language,)| *language,)
}

#[cfg(test)]
mod tests
{
    use proptest::prelude::*;

    use super::*;

    const NEUTRAL_STEPS: [&str; 6] = [
        "- run: make lint",
        "- run: echo done",
        "- run: ls -la",
        "- uses: actions/checkout@v4",
        "- uses: actions/cache@v4",
        "- name: no-op",
    ];

    fn neutral_steps(picks: &[usize],) -> String
    {
        picks.iter().map(|index| format!("      {}\n", NEUTRAL_STEPS[*index])).collect()
    }

    fn classify_yaml(yaml: &str,) -> Option<Language,>
    {
        let workflow = ParsedWorkflow::parse(yaml,).expect("valid workflow",);
        classify(&workflow,)
    }

    #[test]
    fn setup_python_action_is_python()
    {
        let yaml = r"
on: push
jobs:
  test:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - uses: actions/setup-python@v5
        with:
          python-version: '3.12'
      - run: pytest
";
        assert_eq!(classify_yaml(yaml), Some(Language::Python));
    }

    #[test]
    fn action_matching_ignores_case()
    {
        let yaml = "jobs:\n  a:\n    steps:\n      - uses: Actions/Setup-Node@v4\n";
        assert_eq!(classify_yaml(yaml), Some(Language::NodeJs));
    }

    #[test]
    fn last_matching_step_wins()
    {
        let yaml = r"
jobs:
  backend:
    steps:
      - uses: actions/setup-go@v5
  frontend:
    steps:
      - uses: actions/setup-node@v4
      - run: cargo build --release
";
        assert_eq!(classify_yaml(yaml), Some(Language::Rust));
    }

    #[test]
    fn checkout_does_not_override_earlier_match()
    {
        let yaml = r"
jobs:
  build:
    steps:
      - uses: actions/setup-java@v4
      - uses: actions/checkout@v4
";
        assert_eq!(classify_yaml(yaml), Some(Language::Java));
    }

    #[test]
    fn uses_takes_precedence_over_run_in_same_step()
    {
        let yaml = r"
jobs:
  build:
    steps:
      - uses: actions/checkout@v4
        run: npm test
";
        assert_eq!(classify_yaml(yaml), None);
    }

    #[test]
    fn command_rules_follow_priority_order()
    {
        assert_eq!(classify_command("python -m pip install ."), Some(Language::Python));
        assert_eq!(classify_command("python setup.py test"), None);
        assert_eq!(classify_command("npm ci && npm test"), Some(Language::NodeJs));
        assert_eq!(classify_command("./gradlew build"), Some(Language::Java));
        assert_eq!(classify_command("go build ./..."), Some(Language::Go));
        assert_eq!(classify_command("bundle install"), Some(Language::Ruby));
        assert_eq!(classify_command("composer install"), Some(Language::Php));
        assert_eq!(classify_command("dotnet test"), Some(Language::CSharp));
        assert_eq!(classify_command("cargo build --locked"), Some(Language::Rust));
        assert_eq!(classify_command("make all"), None);
    }

    #[test]
    fn container_action_is_recognized()
    {
        assert_eq!(
            classify_action("docker/build-push-action@v6"),
            Some(Language::Container)
        );
        assert_eq!(classify_action("ruby/setup-ruby@v1"), Some(Language::Ruby));
        assert_eq!(classify_action("shivammathur/php/setup-php@v2"), Some(Language::Php));
        assert_eq!(classify_action("actions/cache@v4"), None);
    }

    #[test]
    fn documents_without_jobs_are_unclassified()
    {
        assert_eq!(classify_yaml("on: push\n"), None);
        assert_eq!(classify_yaml(""), None);
        assert_eq!(classify_yaml("jobs: [not, a, mapping]\n"), None);
    }

    #[test]
    fn malformed_shapes_leave_workflow_unclassified()
    {
        let null_job = "jobs:\n  a: null\n  b:\n    steps:\n      - uses: actions/setup-python@v5\n";
        assert_eq!(classify_yaml(null_job), None);

        let null_steps = "jobs:\n  a:\n    steps: null\n  b:\n    steps:\n      - run: npm ci\n";
        assert_eq!(classify_yaml(null_steps), None);

        let scalar_step = "jobs:\n  a:\n    steps:\n      - just-a-string\n      - run: npm ci\n";
        assert_eq!(classify_yaml(scalar_step), None);

        let numeric_uses = "jobs:\n  a:\n    steps:\n      - uses: 42\n      - uses: actions/setup-go@v5\n";
        assert_eq!(classify_yaml(numeric_uses), None);

        let list_run = "jobs:\n  a:\n    steps:\n      - uses: actions/setup-go@v5\n      - run: [npm, test]\n";
        assert_eq!(classify_yaml(list_run), None);
    }

    #[test]
    fn jobs_without_steps_are_skipped()
    {
        let yaml = r"
jobs:
  call:
    uses: org/repo/.github/workflows/reusable.yml@main
  build:
    steps:
      - uses: actions/setup-go@v5
";
        assert_eq!(classify_yaml(yaml), Some(Language::Go));
    }

    #[test]
    fn language_labels_match_reports()
    {
        assert_eq!(Language::NodeJs.to_string(), "Node.js");
        assert_eq!(Language::CSharp.label(), "C#");
        assert_eq!(Language::Container.label(), "Docker/Container");
    }

    proptest! {
        #[test]
        fn setup_python_without_later_classifier_is_python(
            before in proptest::collection::vec(0..NEUTRAL_STEPS.len(), 0..8),
            after in proptest::collection::vec(0..NEUTRAL_STEPS.len(), 0..8),
        ) {
            let yaml = format!(
                "on: push\njobs:\n  test:\n    steps:\n{}      - uses: actions/setup-python@v5\n{}",
                neutral_steps(&before),
                neutral_steps(&after),
            );
            prop_assert_eq!(classify_yaml(&yaml), Some(Language::Python));
        }
    }
}
