//! GitHub repository listing.

use serde::Deserialize;
use tracing::info;

use crate::github::{PageFetch, Paged, paginate};

/// Repository information from GitHub API.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub clone_url: String,
    pub default_branch: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub fork: bool,
    #[serde(rename = "private", default)]
    pub is_private: bool,
    pub visibility: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    pub updated_at: Option<String>,
}

impl GitHubRepo {
    /// Visibility as shown in reports: `Public`, `Private` or `Internal`.
    ///
    /// Falls back to the `private` flag when the API omits `visibility`.
    pub fn visibility_label(&self) -> String {
        match self.visibility.as_deref() {
            Some(v) if !v.is_empty() => {
                let mut chars = v.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            _ if self.is_private => "Private".into(),
            _ => "Public".into(),
        }
    }
}

/// Repository listing operations.
pub trait RepoOps {
    /// List all repositories in an organization.
    fn list_org_repos(&self, org: &str, per_page: u32) -> Paged<GitHubRepo>;

    /// List all repositories the authenticated user can see.
    fn list_user_repos(&self, per_page: u32) -> Paged<GitHubRepo>;
}

impl<C: PageFetch> RepoOps for C {
    fn list_org_repos(&self, org: &str, per_page: u32) -> Paged<GitHubRepo> {
        let endpoint = format!("/orgs/{}/repos", urlencoding::encode(org));
        let paged = paginate(self, &endpoint, &[("type", "all".to_string())], per_page);
        info!(org, count = paged.items.len(), "listed organization repositories");
        paged
    }

    fn list_user_repos(&self, per_page: u32) -> Paged<GitHubRepo> {
        let paged = paginate(
            self,
            "/user/repos",
            &[("visibility", "all".to_string())],
            per_page,
        );
        info!(count = paged.items.len(), "listed user repositories");
        paged
    }
}
