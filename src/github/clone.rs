//! Shallow clones into scratch directories.

use std::path::Path;

use git2::build::RepoBuilder;
use git2::{Cred, FetchOptions, RemoteCallbacks};
use tempfile::TempDir;
use tracing::debug;

use crate::error::{ReportError, Result};
use crate::github::{GitHubClient, GitHubRepo};

/// Something that can materialize a repository into an empty directory.
pub trait Cloner {
    /// Clone `url` into `dest`, checking out `branch` or the remote HEAD.
    fn clone_into(&self, url: &str, branch: Option<&str>, dest: &Path) -> Result<()>;
}

/// git2-backed cloner that fetches only the most recent commit.
#[derive(Clone, Default)]
pub struct GitCloner {
    token: Option<String>,
}

impl GitCloner {
    /// Cloner for public repositories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cloner authenticating HTTPS remotes with a GitHub token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Cloner using the token of an API client.
    pub fn from_client(client: &GitHubClient) -> Self {
        Self::with_token(client.token())
    }
}

impl Cloner for GitCloner {
    fn clone_into(&self, url: &str, branch: Option<&str>, dest: &Path) -> Result<()> {
        let mut callbacks = RemoteCallbacks::new();
        if let Some(token) = self.token.clone() {
            let mut attempts = 0;
            callbacks.credentials(move |_url, _username_from_url, _allowed_types| {
                // libgit2 keeps asking while credentials are rejected
                attempts += 1;
                if attempts > 1 {
                    return Err(git2::Error::from_str("token rejected by remote"));
                }
                Cred::userpass_plaintext("x-access-token", &token)
            });
        }

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);
        fetch_options.depth(1);

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_options);
        if let Some(branch) = branch {
            builder.branch(branch);
        }
        builder.clone(url, dest)?;
        Ok(())
    }
}

/// A repository checked out into a temporary directory.
///
/// The directory is removed when the value is dropped, whichever way the
/// caller leaves the scope. Use [`ScratchClone::release`] to observe removal
/// errors instead of ignoring them.
#[derive(Debug)]
pub struct ScratchClone {
    dir: TempDir,
    repo: String,
}

impl ScratchClone {
    /// Clone `repo` into a fresh directory under the system temp dir.
    pub fn acquire(cloner: &dyn Cloner, repo: &GitHubRepo) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("repo-report-").tempdir()?;
        Self::clone_into_dir(cloner, repo, dir)
    }

    /// Clone `repo` into a fresh directory under `parent`.
    pub fn acquire_in(cloner: &dyn Cloner, repo: &GitHubRepo, parent: &Path) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("repo-report-")
            .tempdir_in(parent)?;
        Self::clone_into_dir(cloner, repo, dir)
    }

    fn clone_into_dir(cloner: &dyn Cloner, repo: &GitHubRepo, dir: TempDir) -> Result<Self> {
        debug!(repo = %repo.full_name, path = %dir.path().display(), "shallow clone");
        // On failure `dir` is dropped here and takes the partial checkout with it.
        cloner
            .clone_into(&repo.clone_url, repo.default_branch.as_deref(), dir.path())
            .map_err(|e| ReportError::CloneError {
                repo: repo.full_name.clone(),
                message: e.to_string(),
            })?;
        Ok(Self {
            dir,
            repo: repo.full_name.clone(),
        })
    }

    /// Root of the working copy.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Full name of the cloned repository.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Remove the working copy now, reporting any removal error.
    pub fn release(self) -> Result<()> {
        self.dir.close()?;
        Ok(())
    }
}
