//! Core domain types and traits for ghrun.
//!
//! This crate contains:
//! - Workflow run records as returned by the runs-listing endpoint
//! - Repository references
//! - The `RunFetcher` trait implemented by API clients

pub mod error;
pub mod fetcher;
pub mod repo;
pub mod run;

pub use error::{Error, Result};
pub use fetcher::RunFetcher;
pub use repo::RepoRef;
pub use run::{Commit, Conclusion, Run, RunsPayload, Status};
