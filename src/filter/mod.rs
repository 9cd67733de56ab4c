//! Repository filtering on in-repository metadata.
//!
//! Each candidate is shallow-cloned into a scratch directory, its
//! `.github/custom.json` is read and checked against [`MetadataCriteria`],
//! and the clone is removed before the next repository is looked at.
//!
//! # Example
//!
//! ```rust,no_run
//! use repo_report::filter::{MetadataCriteria, MetadataFilter};
//! use repo_report::github::{GitCloner, GitHubClient, RepoOps};
//!
//! let client = GitHubClient::new("ghp_token")?;
//! let filter = MetadataFilter::new(GitCloner::from_client(&client), MetadataCriteria::default());
//!
//! let repos = client.list_user_repos(100).items;
//! let result = filter.apply(repos);
//! println!("{} repositories matched", result.retained.len());
//! # Ok::<(), repo_report::error::ReportError>(())
//! ```

mod metadata;

pub use metadata::{
    DEFAULT_REQUIRED_EXPORT, DEFAULT_REQUIRED_STATUS, METADATA_PATH, MetadataCriteria, Mismatch,
    RepoMetadata,
};

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::github::{Cloner, GitHubRepo, ScratchClone};

/// Why a repository was dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum Exclusion {
    /// The working copy has no metadata document.
    MissingMetadata,
    /// The document exists but fails the criteria.
    Rejected(Mismatch),
    /// Cloning or reading the document failed.
    Failed(String),
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::MissingMetadata => write!(f, "no {}", METADATA_PATH),
            Exclusion::Rejected(mismatch) => write!(f, "{}", mismatch),
            Exclusion::Failed(message) => f.write_str(message),
        }
    }
}

/// Result of evaluating one repository.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    Included(RepoMetadata),
    Excluded(Exclusion),
}

/// Repositories kept by a filter run, in input order, with their metadata.
#[derive(Debug, Default)]
pub struct FilterResult {
    pub retained: Vec<(GitHubRepo, RepoMetadata)>,
    pub excluded: Vec<(GitHubRepo, Exclusion)>,
}

/// Keeps repositories whose metadata document satisfies the criteria.
pub struct MetadataFilter {
    cloner: Box<dyn Cloner>,
    criteria: MetadataCriteria,
    scratch_root: Option<PathBuf>,
}

impl MetadataFilter {
    pub fn new(cloner: impl Cloner + 'static, criteria: MetadataCriteria) -> Self {
        Self {
            cloner: Box::new(cloner),
            criteria,
            scratch_root: None,
        }
    }

    /// Create scratch clones under `dir` instead of the system temp dir.
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(dir.into());
        self
    }

    /// Clone `repo`, read its metadata and check it.
    ///
    /// Never fails: clone and parse errors are logged and turn into
    /// [`Exclusion::Failed`]. The scratch clone is gone when this returns.
    pub fn evaluate(&self, repo: &GitHubRepo) -> FilterOutcome {
        let clone = match self.acquire(repo) {
            Ok(clone) => clone,
            Err(e) => {
                warn!(repo = %repo.full_name, error = %e, "skipping repository");
                return FilterOutcome::Excluded(Exclusion::Failed(e.to_string()));
            }
        };

        let outcome = match RepoMetadata::load(clone.path()) {
            Ok(None) => FilterOutcome::Excluded(Exclusion::MissingMetadata),
            Ok(Some(metadata)) => match self.criteria.check(&metadata) {
                Ok(()) => FilterOutcome::Included(metadata),
                Err(mismatch) => FilterOutcome::Excluded(Exclusion::Rejected(mismatch)),
            },
            Err(e) => {
                warn!(
                    repo = clone.repo(),
                    path = %clone.path().display(),
                    error = %e,
                    "skipping repository"
                );
                FilterOutcome::Excluded(Exclusion::Failed(e.to_string()))
            }
        };

        if let Err(e) = clone.release() {
            warn!(repo = %repo.full_name, error = %e, "failed to remove scratch clone");
        }
        outcome
    }

    /// Evaluate every repository in order.
    pub fn apply(&self, repos: Vec<GitHubRepo>) -> FilterResult {
        let mut result = FilterResult::default();
        for repo in repos {
            match self.evaluate(&repo) {
                FilterOutcome::Included(metadata) => {
                    debug!(repo = %repo.full_name, "retained");
                    result.retained.push((repo, metadata));
                }
                FilterOutcome::Excluded(reason) => {
                    debug!(repo = %repo.full_name, %reason, "excluded");
                    result.excluded.push((repo, reason));
                }
            }
        }
        info!(
            retained = result.retained.len(),
            excluded = result.excluded.len(),
            export = self.criteria.export,
            status = %self.criteria.status,
            "metadata filter finished"
        );
        result
    }

    fn acquire(&self, repo: &GitHubRepo) -> Result<ScratchClone> {
        match &self.scratch_root {
            Some(root) => ScratchClone::acquire_in(self.cloner.as_ref(), repo, root),
            None => ScratchClone::acquire(self.cloner.as_ref(), repo),
        }
    }
}
