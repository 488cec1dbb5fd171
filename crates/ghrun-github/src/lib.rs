//! GitHub REST client for ghrun.
//!
//! Implements [`ghrun_core::RunFetcher`] against the Actions runs-listing
//! endpoint.

pub mod client;

pub use client::{DEFAULT_API_URL, GitHubClient, MAX_PER_PAGE};
