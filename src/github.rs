// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// GitHub REST implementation of [`WorkflowSource`] backed by octocrab.
///
/// Octocrab failures are classified into [`SourceError`] variants from the
/// HTTP status and message so the collector can tell credentials, missing
/// directories and quota exhaustion apart.
use base64::{Engine as _, engine::general_purpose::STANDARD};
use octocrab::Octocrab;
use tracing::debug;

use crate::source::{
    ContentEntry, EntryKind, RateLimitCategory, RepoRef, RepositoryInfo, RepositorySummary,
    SourceError, WorkflowSource,
};

/// Number of repositories requested per search page.
pub const SEARCH_PAGE_SIZE: u8 = 100;

/// Results the search API serves per query; later pages fail with 422.
pub const SEARCH_RESULT_LIMIT: u32 = 1000;

/// Hosting source talking to `api.github.com`.
#[derive(Debug, Clone,)]
pub struct GitHubSource
{
    client: Octocrab,
}

impl GitHubSource
{
    /// Builds a source authenticated with a personal access token.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Unauthorized`] when the client cannot be built.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use wfharvest::GitHubSource;
    ///
    /// # fn example() -> Result<(), wfharvest::SourceError> {
    /// let token = std::env::var("GITHUB_TOKEN",).unwrap_or_default();
    /// let source = GitHubSource::new(&token,)?;
    /// # let _ = source;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(token: &str,) -> Result<Self, SourceError,>
    {
        let client = Octocrab::builder().personal_token(token.to_owned(),).build().map_err(|e| {
            SourceError::unauthorized(format!("failed to initialize GitHub client: {e}"),)
        },)?;
        Ok(Self {
            client,
        },)
    }

    /// Builds an unauthenticated source, subject to the anonymous quota.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Api`] when the client cannot be built.
    pub fn anonymous() -> Result<Self, SourceError,>
    {
        let client = Octocrab::builder()
            .build()
            .map_err(|e| SourceError::api(format!("failed to initialize GitHub client: {e}"),),)?;
        Ok(Self {
            client,
        },)
    }
}

impl WorkflowSource for GitHubSource
{
    async fn authenticate(&self,) -> Result<String, SourceError,>
    {
        let user = self.client.current().user().await.map_err(classify_error,)?;
        Ok(user.login,)
    }

    async fn search_repositories(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<RepositorySummary,>, SourceError,>
    {
        debug!("Searching repositories: query={query} page={page}");
        let result = self
            .client
            .search()
            .repositories(query,)
            .per_page(SEARCH_PAGE_SIZE,)
            .page(page,)
            .send()
            .await
            .map_err(classify_error,)?;

        let mut summaries = Vec::with_capacity(result.items.len(),);
        for repository in result.items {
            let owner = repository.owner.as_ref().map(|author| author.login.clone(),);
            let repo = match owner {
                Some(owner,) => RepoRef::new(owner, repository.name.clone(),),
                None => match repository.full_name.as_deref().and_then(RepoRef::parse,) {
                    Some(parsed,) => parsed,
                    None => continue,
                },
            };
            summaries.push(RepositorySummary {
                repo,
                stars: repository.stargazers_count.unwrap_or_default(),
            },);
        }

        Ok(summaries,)
    }

    async fn list_directory(
        &self,
        repo: &RepoRef,
        path: &str,
    ) -> Result<Vec<ContentEntry,>, SourceError,>
    {
        let contents = self
            .client
            .repos(repo.owner.as_str(), repo.name.as_str(),)
            .get_content()
            .path(path,)
            .send()
            .await
            .map_err(classify_error,)?;

        Ok(contents
            .items
            .into_iter()
            .map(|item| ContentEntry {
                kind: EntryKind::from_api(&item.r#type,),
                name: item.name,
                path: item.path,
            },)
            .collect(),)
    }

    async fn fetch_file(&self, repo: &RepoRef, path: &str,) -> Result<Vec<u8,>, SourceError,>
    {
        let contents = self
            .client
            .repos(repo.owner.as_str(), repo.name.as_str(),)
            .get_content()
            .path(path,)
            .send()
            .await
            .map_err(classify_error,)?;

        let item = contents
            .items
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::not_found(format!("{repo}: {path} returned no content"),),)?;
        decode_payload(item.encoding.as_deref(), item.content.as_deref(),)
    }

    async fn rate_limit_reset(&self, category: RateLimitCategory,) -> Result<u64, SourceError,>
    {
        let limits = self.client.ratelimit().get().await.map_err(classify_error,)?;
        let reset = match category {
            RateLimitCategory::Core => limits.resources.core.reset,
            RateLimitCategory::Search => limits.resources.search.reset,
        };
        Ok(reset,)
    }

    async fn repository_info(&self, repo: &RepoRef,) -> Result<RepositoryInfo, SourceError,>
    {
        let repository = self
            .client
            .repos(repo.owner.as_str(), repo.name.as_str(),)
            .get()
            .await
            .map_err(classify_error,)?;

        Ok(RepositoryInfo {
            name:        repository.name,
            description: repository.description,
            stars:       repository.stargazers_count.unwrap_or_default(),
            forks:       repository.forks_count.unwrap_or_default(),
            updated_at:  repository.updated_at.map(|at| at.to_rfc3339(),),
        },)
    }
}

/// Decodes an inline file payload of the contents API.
///
/// Files above 1 MB are served without inline content and an encoding of
/// `none`; those are rejected instead of read as empty files.
fn decode_payload(encoding: Option<&str,>, content: Option<&str,>,) -> Result<Vec<u8,>, SourceError,>
{
    match (encoding, content,) {
        (Some("base64",), Some(encoded,),) => decode_content(encoded,),
        (Some("base64",), None,) => Err(SourceError::decode("no inline content",),),
        (other, _,) => Err(SourceError::decode(format!(
            "unsupported content encoding {}",
            other.unwrap_or("(missing)")
        ),),),
    }
}

/// Decodes the base64 payload of the contents API.
///
/// GitHub wraps the payload at 60 columns, so whitespace is stripped first.
fn decode_content(encoded: &str,) -> Result<Vec<u8,>, SourceError,>
{
    let compact: String = encoded.split_whitespace().collect();
    STANDARD
        .decode(compact.as_bytes(),)
        .map_err(|e| SourceError::decode(format!("invalid base64 content: {e}"),),)
}

fn classify_error(error: octocrab::Error,) -> SourceError
{
    match &error {
        octocrab::Error::GitHub {
            source, ..
        } => classify_status(source.status_code.as_u16(), &source.message,),
        _ => SourceError::api(error.to_string(),),
    }
}

fn classify_status(status: u16, message: &str,) -> SourceError
{
    let rate_limited = message.to_ascii_lowercase().contains("rate limit",);
    match status {
        401 => SourceError::unauthorized(message,),
        404 => SourceError::not_found(message,),
        429 => SourceError::rate_limited(message,),
        403 if rate_limited => SourceError::rate_limited(message,),
        _ => SourceError::api(format!("{status}: {message}"),),
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn decode_content_strips_line_wrapping()
    {
        let decoded = decode_content("b246IHB1\nc2gK\n",).expect("valid base64",);
        assert_eq!(decoded, b"on: push\n");
    }

    #[test]
    fn decode_content_rejects_garbage()
    {
        let error = decode_content("!!!not base64",).expect_err("expected decode failure",);
        assert!(matches!(error, SourceError::Decode { .. }));
    }

    #[test]
    fn oversized_files_without_inline_content_are_rejected()
    {
        let error = decode_payload(Some("none",), Some("",),).expect_err("expected decode failure",);
        assert!(matches!(error, SourceError::Decode { .. }));
        assert!(error.to_string().contains("none"));

        assert!(decode_payload(None, Some("b246IHB1c2gK",),).is_err());
        assert!(decode_payload(Some("base64",), None,).is_err());
        assert_eq!(
            decode_payload(Some("base64",), Some("b246IHB1c2gK",),).expect("valid payload",),
            b"on: push\n"
        );
    }

    #[test]
    fn classify_status_distinguishes_failures()
    {
        assert!(matches!(classify_status(401, "Bad credentials"), SourceError::Unauthorized { .. }));
        assert!(matches!(classify_status(404, "Not Found"), SourceError::NotFound { .. }));
        assert!(matches!(
            classify_status(403, "API rate limit exceeded for user"),
            SourceError::RateLimited { .. }
        ));
        assert!(matches!(classify_status(429, "slow down"), SourceError::RateLimited { .. }));
        assert!(matches!(classify_status(403, "Resource not accessible"), SourceError::Api { .. }));
    }

    #[tokio::test]
    async fn github_source_builds_without_network()
    {
        assert!(GitHubSource::new("ghp_example",).is_ok());
    }
}
