//! GitHub API integration for repository reporting.
//!
//! This module provides a blocking client for the GitHub REST API that can:
//! - List repositories of an organization or of the authenticated user
//! - List the custom property values an organization attaches to repositories
//! - Shallow-clone repositories into scratch directories that clean up after themselves
//!
//! Every listing goes through [`paginate`], which walks `page = 1, 2, …`
//! until an empty page and keeps whatever it gathered if a request fails.
//!
//! # Example
//!
//! ```rust,no_run
//! use repo_report::github::{GitHubClient, RepoOps};
//!
//! let client = GitHubClient::new("ghp_your_token_here")?;
//!
//! let listing = client.list_org_repos("my-org", 100);
//! for repo in &listing.items {
//!     println!("{}: {}", repo.name, repo.html_url);
//! }
//! # Ok::<(), repo_report::error::ReportError>(())
//! ```

mod client;
mod clone;
mod pagination;
mod properties;
mod repos;

pub use client::GitHubClient;
pub use clone::{Cloner, GitCloner, ScratchClone};
pub use pagination::{MAX_ITEMS, PageFetch, PageRequest, Paged, page_limit, paginate};
pub use properties::{CustomProperty, PropertyMap, PropertyOps, PropertyValue, RepoPropertyValues};
pub use repos::{GitHubRepo, RepoOps};
