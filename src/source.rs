#![allow(non_shorthand_field_patterns)]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Abstraction over the hosting platform consumed by the collector.
//!
//! The [`WorkflowSource`] trait captures the handful of REST calls the
//! harvester issues. The production implementation lives in
//! [`crate::github`]; tests drive the collector through an in-memory source.

use std::{fmt, future::Future};

use serde::{Deserialize, Serialize};

/// Repository coordinates in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize,)]
pub struct RepoRef
{
    /// Account that owns the repository.
    pub owner: String,
    /// Repository name.
    pub name:  String,
}

impl RepoRef
{
    /// Creates a reference from owner and name components.
    pub fn new(owner: impl Into<String,>, name: impl Into<String,>,) -> Self
    {
        Self {
            owner: owner.into(), name: name.into(),
        }
    }

    /// Parses an `owner/name` string.
    ///
    /// Returns `None` when either component is empty or more than one
    /// separator is present.
    ///
    /// # Examples
    ///
    /// ```
    /// use wfharvest::RepoRef;
    ///
    /// let repo = RepoRef::parse("octocat/hello-world",).expect("valid reference",);
    /// assert_eq!(repo.owner, "octocat");
    /// assert!(RepoRef::parse("octocat",).is_none());
    /// ```
    pub fn parse(full_name: &str,) -> Option<Self,>
    {
        let (owner, name,) = full_name.trim().split_once('/',)?;
        if owner.is_empty() || name.is_empty() || name.contains('/',) {
            return None;
        }
        Some(Self::new(owner, name,),)
    }
}

impl fmt::Display for RepoRef
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Single hit returned by the repository search.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct RepositorySummary
{
    /// Repository coordinates.
    pub repo:  RepoRef,
    /// Stargazer count reported by the search API.
    pub stars: u32,
}

/// Kind of an entry in a repository directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum EntryKind
{
    /// Regular file.
    File,
    /// Sub-directory.
    Dir,
    /// Symlinks, submodules and anything else.
    Other,
}

impl EntryKind
{
    /// Maps the `type` field of the contents API.
    pub fn from_api(kind: &str,) -> Self
    {
        match kind {
            "file" => Self::File,
            "dir" => Self::Dir,
            _ => Self::Other,
        }
    }
}

/// Entry of a repository directory listing.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ContentEntry
{
    /// File name without directories.
    pub name: String,
    /// Path relative to the repository root.
    pub path: String,
    /// Entry type.
    pub kind: EntryKind,
}

/// Repository metadata returned by the repository lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct RepositoryInfo
{
    pub name:        String,
    pub description: Option<String,>,
    pub stars:       u32,
    pub forks:       u32,
    /// RFC 3339 timestamp of the last update.
    pub updated_at:  Option<String,>,
}

/// Quota bucket consulted when a rate limit is hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum RateLimitCategory
{
    /// Regular REST endpoints.
    Core,
    /// Search endpoints, which carry a separate quota.
    Search,
}

impl fmt::Display for RateLimitCategory
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        match self {
            Self::Core => f.write_str("core",),
            Self::Search => f.write_str("search",),
        }
    }
}

/// Classified failure reported by a [`WorkflowSource`].
#[derive(Debug, Clone, PartialEq, Eq, masterror::Error,)]
pub enum SourceError
{
    /// The credential was rejected.
    #[error("authentication failed: {message}")]
    Unauthorized
    {
        message: String,
    },
    /// The requested resource does not exist.
    #[error("resource not found: {message}")]
    NotFound
    {
        message: String,
    },
    /// The request quota is exhausted until the next reset.
    #[error("rate limit exceeded: {message}")]
    RateLimited
    {
        message: String,
    },
    /// Payload could not be decoded.
    #[error("failed to decode response: {message}")]
    Decode
    {
        message: String,
    },
    /// Any other API failure.
    #[error("API error: {message}")]
    Api
    {
        message: String,
    },
}

impl SourceError
{
    pub fn unauthorized(message: impl Into<String,>,) -> Self
    {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String,>,) -> Self
    {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String,>,) -> Self
    {
        Self::RateLimited {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String,>,) -> Self
    {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn api(message: impl Into<String,>,) -> Self
    {
        Self::Api {
            message: message.into(),
        }
    }

    /// Returns `true` when the failure is a quota exhaustion.
    pub fn is_rate_limited(&self,) -> bool
    {
        matches!(self, Self::RateLimited { .. })
    }
}

/// Hosting platform operations required by the harvester.
///
/// Calls are issued sequentially; implementations do not need to be
/// thread-safe beyond producing `Send` futures.
pub trait WorkflowSource
{
    /// Verifies the credential and returns the authenticated login.
    fn authenticate(&self,) -> impl Future<Output = Result<String, SourceError,>,> + Send;

    /// Returns one page (1-based) of repositories matching `query`.
    fn search_repositories(
        &self,
        query: &str,
        page: u32,
    ) -> impl Future<Output = Result<Vec<RepositorySummary,>, SourceError,>,> + Send;

    /// Lists the entries of `path`. A path naming a single file yields a
    /// one-element listing.
    fn list_directory(
        &self,
        repo: &RepoRef,
        path: &str,
    ) -> impl Future<Output = Result<Vec<ContentEntry,>, SourceError,>,> + Send;

    /// Fetches the raw (base64-decoded) bytes of a file.
    fn fetch_file(
        &self,
        repo: &RepoRef,
        path: &str,
    ) -> impl Future<Output = Result<Vec<u8,>, SourceError,>,> + Send;

    /// Returns the Unix timestamp at which the given quota resets.
    fn rate_limit_reset(
        &self,
        category: RateLimitCategory,
    ) -> impl Future<Output = Result<u64, SourceError,>,> + Send;

    /// Fetches repository metadata.
    fn repository_info(
        &self,
        repo: &RepoRef,
    ) -> impl Future<Output = Result<RepositoryInfo, SourceError,>,> + Send;
}
