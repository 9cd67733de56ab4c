//! # Repo Report
//!
//! Export a GitHub organization's repositories, together with their custom
//! property values, to a spreadsheet.
//!
//! This crate provides:
//! - Paginated listing of organization or user repositories
//! - Custom property enrichment keyed by repository id
//! - Optional filtering on a `.github/custom.json` document read from a
//!   shallow clone that is removed afterwards
//! - Single-sheet `.xlsx` output with a header built from every column seen
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use repo_report::prelude::*;
//! use std::path::Path;
//!
//! let config = Config::from_env(ScopeKind::Organization, &Overrides::default())?;
//! let client = GitHubClient::from_config(&config)?;
//!
//! let summary = RepoReport::from_config(&client, &config)
//!     .execute(Path::new("github_custom_properties.xlsx"))?;
//!
//! println!("{}", summary);
//! # Ok::<(), repo_report::error::ReportError>(())
//! ```
//!
//! ## Filtering on Repository Metadata
//!
//! ```rust,no_run
//! use repo_report::prelude::*;
//! use std::path::Path;
//!
//! let client = GitHubClient::new("ghp_token")?;
//! let filter = MetadataFilter::new(
//!     GitCloner::from_client(&client),
//!     MetadataCriteria::new(true, "changes required"),
//! );
//!
//! RepoReport::new(&client, Scope::User("octocat".into()))
//!     .filter(filter)
//!     .execute(Path::new("octocat_filtered_repos.xlsx"))?;
//! # Ok::<(), repo_report::error::ReportError>(())
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod github;
pub mod pipeline;
pub mod report;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{Config, Overrides, PropertyApi, Scope, ScopeKind};
    pub use crate::error::{ConfigError, ReportError, Result};
    pub use crate::filter::{
        Exclusion, FilterOutcome, FilterResult, MetadataCriteria, MetadataFilter, RepoMetadata,
    };
    pub use crate::github::{
        Cloner, GitCloner, GitHubClient, GitHubRepo, PageFetch, PageRequest, Paged, PropertyMap,
        PropertyOps, RepoOps, ScratchClone,
    };
    pub use crate::pipeline::{RepoReport, ReportSummary, default_output};
    pub use crate::report::{Cell, MergedRow, RepositoryRecord, Sheet};
}

pub use prelude::*;
