//! In-memory [`WorkflowSource`] used by unit tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use crate::{
    collector::WORKFLOW_DIR,
    github::SEARCH_PAGE_SIZE,
    retry::unix_now,
    source::{
        ContentEntry, EntryKind, RateLimitCategory, RepoRef, RepositoryInfo, RepositorySummary,
        SourceError, WorkflowSource,
    },
};

#[derive(Debug, Default,)]
pub(crate) struct MockSource
{
    pub auth:         Option<SourceError,>,
    pub repositories: Vec<RepositorySummary,>,
    pub search_error: Option<SourceError,>,
    /// Directory listings keyed by `owner/name`; absent repositories 404.
    pub listings:     HashMap<String, Vec<ContentEntry,>,>,
    /// File bodies keyed by `owner/name:path`.
    pub files:        HashMap<String, Vec<u8,>,>,
    /// Errors returned by `list_directory` before the listing succeeds.
    pub list_errors:  Mutex<HashMap<String, VecDeque<SourceError,>,>,>,
    pub info:         HashMap<String, RepositoryInfo,>,
    pub calls:        Mutex<Vec<String,>,>,
}

impl MockSource
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Registers a repository with workflow files; `None` leaves it without a
    /// workflow directory.
    pub fn with_repository(mut self, full_name: &str, files: Option<&[(&str, &[u8],)],>,) -> Self
    {
        let repo = RepoRef::parse(full_name,).expect("valid repository name",);
        self.repositories.push(RepositorySummary {
            repo,
            stars: 50_000,
        },);
        if let Some(files,) = files {
            let mut entries = Vec::new();
            for (name, body,) in files {
                let path = format!("{WORKFLOW_DIR}/{name}");
                self.files.insert(format!("{full_name}:{path}"), body.to_vec(),);
                entries.push(ContentEntry {
                    name: (*name).to_owned(),
                    path,
                    kind: EntryKind::File,
                },);
            }
            self.listings.insert(full_name.to_owned(), entries,);
        }
        self
    }

    pub fn with_entry(mut self, full_name: &str, entry: ContentEntry,) -> Self
    {
        self.listings.entry(full_name.to_owned(),).or_default().push(entry,);
        self
    }

    pub fn with_list_error(self, full_name: &str, error: SourceError,) -> Self
    {
        self.list_errors
            .lock()
            .expect("lock",)
            .entry(full_name.to_owned(),)
            .or_default()
            .push_back(error,);
        self
    }

    pub fn calls(&self,) -> Vec<String,>
    {
        self.calls.lock().expect("lock",).clone()
    }

    pub fn calls_with_prefix(&self, prefix: &str,) -> usize
    {
        self.calls().iter().filter(|call| call.starts_with(prefix,),).count()
    }

    fn record(&self, call: String,)
    {
        self.calls.lock().expect("lock",).push(call,);
    }
}

impl WorkflowSource for MockSource
{
    async fn authenticate(&self,) -> Result<String, SourceError,>
    {
        self.record("auth".to_owned(),);
        match &self.auth {
            Some(error,) => Err(error.clone(),),
            None => Ok("octocat".to_owned(),),
        }
    }

    async fn search_repositories(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<RepositorySummary,>, SourceError,>
    {
        self.record(format!("search:{query}:{page}"),);
        if let Some(error,) = &self.search_error {
            return Err(error.clone(),);
        }
        let size = usize::from(SEARCH_PAGE_SIZE,);
        let start = (page as usize).saturating_sub(1,) * size;
        Ok(self.repositories.iter().skip(start,).take(size,).cloned().collect(),)
    }

    async fn list_directory(
        &self,
        repo: &RepoRef,
        path: &str,
    ) -> Result<Vec<ContentEntry,>, SourceError,>
    {
        let key = repo.to_string();
        self.record(format!("list:{key}:{path}"),);
        let scripted = self.list_errors.lock().expect("lock",).get_mut(&key,).and_then(VecDeque::pop_front,);
        if let Some(error,) = scripted {
            return Err(error,);
        }
        self.listings.get(&key,).cloned().ok_or_else(|| SourceError::not_found("Not Found",),)
    }

    async fn fetch_file(&self, repo: &RepoRef, path: &str,) -> Result<Vec<u8,>, SourceError,>
    {
        let key = format!("{repo}:{path}");
        self.record(format!("fetch:{key}"),);
        self.files.get(&key,).cloned().ok_or_else(|| SourceError::not_found("Not Found",),)
    }

    async fn rate_limit_reset(&self, category: RateLimitCategory,) -> Result<u64, SourceError,>
    {
        self.record(format!("rate:{category}"),);
        Ok(unix_now(),)
    }

    async fn repository_info(&self, repo: &RepoRef,) -> Result<RepositoryInfo, SourceError,>
    {
        self.record(format!("info:{repo}"),);
        self.info.get(&repo.to_string(),).cloned().ok_or_else(|| SourceError::not_found("Not Found",),)
    }
}
