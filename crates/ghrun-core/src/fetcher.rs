//! Run fetcher trait.
//!
//! A fetcher returns up to `limit` runs for a repository in a single request.

use async_trait::async_trait;

use crate::{RepoRef, Result, RunsPayload};

#[async_trait]
pub trait RunFetcher: Send + Sync {
    /// Name of this fetcher, used in log output.
    fn name(&self) -> &'static str;

    /// Fetch the most recent runs for `repo`, bounded by `limit`.
    async fn fetch_runs(&self, repo: &RepoRef, limit: u32) -> Result<RunsPayload>;
}
