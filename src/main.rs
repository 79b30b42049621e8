//! Command-line interface for the wfharvest binary.
//!
//! The CLI exposes subcommands for collecting workflow files from popular
//! GitHub repositories and for analyzing a directory of collected files.

use std::{
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
    process,
};

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wfharvest::{
    Error, GitHubSource, HarvestConfig, PrunePolicy, RepoRef, RepositoryInfo, WorkflowRecord,
    WorkflowSource, collect_workflows, count_repository_workflows, fetch_repository_info, io_error, load_config,
    remove_duplicate_files, summarize_workflows,
};

/// Command line interface for harvesting GitHub Actions workflows.
#[derive(Debug, Parser,)]
#[command(name = "wfharvest", version, about = "Collect and analyze GitHub Actions workflows")]
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand,)]
/// Supported commands exposed by the CLI.
enum Command
{
    /// Collect workflow files from popular repositories, then summarize them.
    Collect(CollectArgs,),
    /// Remove workflow files whose content duplicates another file.
    Dedupe(DedupeArgs,),
    /// Print language and trigger statistics for a workflow directory.
    Summary(SummaryArgs,),
    /// Show metadata and the workflow count of a single repository.
    #[command(name = "repo-info")]
    RepoInfo(RepoInfoArgs,),
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `collect` subcommand.
struct CollectArgs
{
    /// YAML settings file; flags below override its values.
    #[arg(long = "settings", value_name = "PATH")]
    settings: Option<PathBuf,>,

    /// Only repositories with more stars than this are searched.
    #[arg(long = "min-stars", value_name = "N")]
    min_stars: Option<u64,>,

    /// Maximum number of repositories to process.
    #[arg(long = "max-repos", value_name = "N")]
    max_repos: Option<usize,>,

    /// Directory receiving the workflow files.
    #[arg(long = "output", value_name = "DIR")]
    output: Option<PathBuf,>,

    /// GitHub personal access token.
    #[arg(long = "token", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String,>,

    /// Remove duplicate files after collecting.
    #[arg(long = "dedupe", action = ArgAction::SetTrue)]
    dedupe: bool,

    /// Do not print the summary after collecting.
    #[arg(long = "skip-summary", action = ArgAction::SetTrue)]
    skip_summary: bool,

    /// Keep files the summary cannot classify instead of deleting them.
    #[arg(long = "keep-unclassified", action = ArgAction::SetTrue)]
    keep_unclassified: bool,

    /// Write the collected records as JSON to this path.
    #[arg(long = "manifest", value_name = "PATH")]
    manifest: Option<PathBuf,>,
}

#[derive(Debug, Args,)]
struct DedupeArgs
{
    /// Directory containing workflow files.
    #[arg(long = "dir", value_name = "DIR")]
    dir: PathBuf,
}

#[derive(Debug, Args,)]
struct SummaryArgs
{
    /// Directory containing workflow files.
    #[arg(long = "dir", value_name = "DIR")]
    dir: PathBuf,

    /// Keep files that cannot be classified instead of deleting them.
    #[arg(long = "keep-unclassified", action = ArgAction::SetTrue)]
    keep_unclassified: bool,

    /// Output the summary as JSON.
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Debug, Args,)]
struct RepoInfoArgs
{
    /// Repository in OWNER/NAME form.
    #[arg(long = "repo", value_name = "OWNER/NAME")]
    repo: String,

    /// GitHub personal access token; anonymous access is used when absent.
    #[arg(long = "token", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String,>,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into(),),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr,),)
        .init();

    if let Err(error,) = run(Cli::parse(),).await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates errors from settings loading, directory analysis and output.
async fn run(cli: Cli,) -> Result<(), Error,>
{
    match cli.command {
        Command::Collect(args,) => run_collect(args,).await,
        Command::Dedupe(args,) => run_dedupe(&args,),
        Command::Summary(args,) => run_summary(&args,),
        Command::RepoInfo(args,) => run_repo_info(args,).await,
    }
}

fn prune_policy(keep_unclassified: bool,) -> PrunePolicy
{
    if keep_unclassified { PrunePolicy::Keep } else { PrunePolicy::Delete }
}

fn non_empty_token(token: Option<&str,>,) -> Option<&str,>
{
    token.map(str::trim,).filter(|value| !value.is_empty(),)
}

/// Builds the run settings from the optional settings file and flags.
fn resolve_config(args: &CollectArgs,) -> Result<HarvestConfig, Error,>
{
    let mut config = match &args.settings {
        Some(path,) => load_config(path,)?,
        None => HarvestConfig::default(),
    };

    if let Some(min_stars,) = args.min_stars {
        config.min_stars = min_stars;
    }
    if let Some(max_repos,) = args.max_repos {
        config.max_repos = max_repos;
    }
    if let Some(output,) = &args.output {
        config.output_dir = output.clone();
    }

    config.validate()?;
    Ok(config,)
}

async fn run_collect(args: CollectArgs,) -> Result<(), Error,>
{
    let config = resolve_config(&args,)?;

    let Some(token,) = non_empty_token(args.token.as_deref(),) else {
        eprintln!("Please set the GITHUB_TOKEN environment variable or pass --token.");
        return Ok((),);
    };

    let source = GitHubSource::new(token,)?;
    let outcome = collect_workflows(&source, &config,).await;
    if let Some(halt,) = &outcome.halt {
        eprintln!("Collection stopped early: {halt}");
    }
    println!(
        "Collected {} workflow files from {} repositories",
        outcome.records.len(),
        outcome.repositories_processed
    );

    if let Some(path,) = &args.manifest {
        write_manifest(path, &outcome.records,)?;
        info!("Wrote manifest to {}", path.display());
    }

    if !config.output_dir.is_dir() {
        return Ok((),);
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if args.dedupe {
        let report = remove_duplicate_files(&config.output_dir,)?;
        writeln!(handle, "Removed {} duplicate workflow files", report.removed.len())
            .map_err(|source| stdout_error(source,),)?;
    }

    if !args.skip_summary {
        let summary =
            summarize_workflows(&config.output_dir, prune_policy(args.keep_unclassified,),)?;
        summary.render(&mut handle,).map_err(|source| stdout_error(source,),)?;
    }

    Ok((),)
}

fn write_manifest(path: &Path, records: &[WorkflowRecord],) -> Result<(), Error,>
{
    let file = File::create(path,).map_err(|source| io_error(path, source,),)?;
    serde_json::to_writer_pretty(file, records,)?;
    Ok((),)
}

fn run_dedupe(args: &DedupeArgs,) -> Result<(), Error,>
{
    let report = remove_duplicate_files(&args.dir,)?;
    println!(
        "Removed {} duplicate workflow files, {} distinct files remain in {}",
        report.removed.len(),
        report.kept,
        args.dir.display()
    );
    Ok((),)
}

fn run_summary(args: &SummaryArgs,) -> Result<(), Error,>
{
    let summary = summarize_workflows(&args.dir, prune_policy(args.keep_unclassified,),)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if args.json {
        serde_json::to_writer_pretty(&mut handle, &summary,)?;
        writeln!(handle).map_err(|source| stdout_error(source,),)?;
    } else {
        summary.render(&mut handle,).map_err(|source| stdout_error(source,),)?;
    }

    Ok((),)
}

async fn run_repo_info(args: RepoInfoArgs,) -> Result<(), Error,>
{
    let repo = RepoRef::parse(&args.repo,).ok_or_else(|| {
        Error::validation(format!("repository '{}' must be in OWNER/NAME form", args.repo),)
    },)?;

    let source = match non_empty_token(args.token.as_deref(),) {
        Some(token,) => GitHubSource::new(token,)?,
        None => GitHubSource::anonymous()?,
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    report_repository(&source, &repo, &mut handle,).await.map_err(|source| stdout_error(source,),)
}

/// Prints repository metadata followed by its workflow count.
///
/// Lookup failures are reported in the output instead of aborting: missing
/// metadata prints a failure line and a failed count reads as zero.
async fn report_repository<S, W,>(source: &S, repo: &RepoRef, writer: &mut W,) -> io::Result<(),>
where
    S: WorkflowSource,
    W: Write,
{
    let info = match fetch_repository_info(source, repo,).await {
        Ok(info,) => Some(info,),
        Err(error,) => {
            warn!("Error fetching repository information: {}", error.to_display_string());
            None
        }
    };
    let workflows = count_repository_workflows(source, repo,).await.unwrap_or_else(|error| {
        warn!("Error fetching workflow files: {}", error.to_display_string());
        0
    },);

    write_repository_info(writer, info.as_ref(), workflows,)
}

fn write_repository_info<W: Write,>(
    writer: &mut W,
    info: Option<&RepositoryInfo,>,
    workflows: usize,
) -> io::Result<(),>
{
    match info {
        Some(info,) => {
            writeln!(writer, "Repository Information:")?;
            writeln!(writer, "Name: {}", info.name)?;
            writeln!(writer, "Description: {}", info.description.as_deref().unwrap_or("-"))?;
            writeln!(writer, "Stars: {}", info.stars)?;
            writeln!(writer, "Forks: {}", info.forks)?;
            writeln!(writer, "Last Updated: {}", info.updated_at.as_deref().unwrap_or("-"))?;
        }
        None => writeln!(writer, "Failed to fetch repository information.")?,
    }
    writeln!(writer, "Number of workflow YAML files: {workflows}")
}

fn stdout_error(source: io::Error,) -> Error
{
    io_error(Path::new("<stdout>",), source,)
}
