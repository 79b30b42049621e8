//! Settings document describing a collection run.
//!
//! The settings mirror the YAML file accepted by the CLI through
//! `--settings`. Every field is optional in the document; missing values fall
//! back to the defaults below, and CLI flags override whatever the file says.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{self, Error},
    retry::RateLimitPolicy,
};

/// Default exclusive star threshold for the repository search.
pub const DEFAULT_MIN_STARS: u64 = 10_000;
/// Default cap on repositories processed per run.
pub const DEFAULT_MAX_REPOS: usize = 100;
/// Default directory receiving the collected workflow files.
pub const DEFAULT_OUTPUT_DIR: &str = "github_workflows_dataset";
/// Default pause between processed repositories.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 500;

/// Settings for a collection run.
///
/// # Examples
///
/// ```
/// use wfharvest::HarvestConfig;
///
/// let yaml = r#"
/// min-stars: 50000
/// max_repos: 10
/// rate_limit:
///   max_retries: 1
/// "#;
/// let config: HarvestConfig = serde_yaml::from_str(yaml,).expect("valid settings",);
/// assert_eq!(config.min_stars, 50_000);
/// assert_eq!(config.output_dir.to_str(), Some("github_workflows_dataset"));
/// assert_eq!(config.rate_limit.safety_margin_secs, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize,)]
#[serde(default)]
pub struct HarvestConfig
{
    /// Repositories must have strictly more stars than this.
    #[serde(alias = "min-stars", alias = "minStars")]
    pub min_stars: u64,

    /// Maximum number of repositories processed, not files found.
    #[serde(alias = "max-repos", alias = "maxRepos")]
    pub max_repos: usize,

    /// Flat directory the workflow files are written to.
    #[serde(alias = "output-dir", alias = "outputDir")]
    pub output_dir: PathBuf,

    /// Pause after each processed repository, in milliseconds.
    #[serde(alias = "request-delay-ms", alias = "requestDelayMs")]
    pub request_delay_ms: u64,

    /// Backoff applied when the request quota is exhausted.
    #[serde(alias = "rate-limit", alias = "rateLimit")]
    pub rate_limit: RateLimitPolicy,
}

impl Default for HarvestConfig
{
    fn default() -> Self
    {
        Self {
            min_stars:        DEFAULT_MIN_STARS,
            max_repos:        DEFAULT_MAX_REPOS,
            output_dir:       PathBuf::from(DEFAULT_OUTPUT_DIR,),
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            rate_limit:       RateLimitPolicy::default(),
        }
    }
}

impl HarvestConfig
{
    /// Search query selecting repositories above the star threshold.
    pub fn search_query(&self,) -> String
    {
        format!("stars:>{}", self.min_stars)
    }

    /// Checks invariants the collector relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](Error::Validation) when the output
    /// directory is empty.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::validation("output directory must not be empty",),);
        }
        Ok((),)
    }
}

/// Loads settings from the provided YAML file path.
///
/// # Errors
///
/// Returns an [`Error`] when the file cannot be read, the YAML cannot be
/// deserialized, or the settings fail validation.
pub fn load_config(path: &Path,) -> Result<HarvestConfig, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    parse_config(&contents,)
}

/// Parses settings from a YAML string; an empty document yields defaults.
///
/// # Errors
///
/// Propagates [`Error::Parse`](Error::Parse) and
/// [`Error::Validation`](Error::Validation).
pub fn parse_config(contents: &str,) -> Result<HarvestConfig, Error,>
{
    let config = if contents.trim().is_empty() {
        HarvestConfig::default()
    } else {
        serde_yaml::from_str(contents,)?
    };
    config.validate()?;
    Ok(config,)
}
