//! End-to-end report generation.
//!
//! [`RepoReport`] strings the steps together: list repositories, optionally
//! filter them on in-repository metadata, enrich them with custom properties,
//! then flatten and write the spreadsheet.
//!
//! # Example
//!
//! ```rust,no_run
//! use repo_report::prelude::*;
//! use std::path::Path;
//!
//! let client = GitHubClient::new("ghp_token")?;
//! let summary = RepoReport::new(&client, Scope::Organization("acme".into()))
//!     .per_page(100)
//!     .execute(Path::new("github_custom_properties.xlsx"))?;
//!
//! println!("{}", summary);
//! # Ok::<(), repo_report::error::ReportError>(())
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{Config, DEFAULT_PER_PAGE, PropertyApi, Scope};
use crate::error::{ReportError, Result};
use crate::filter::{MetadataFilter, RepoMetadata};
use crate::github::{GitHubRepo, PropertyMap, PropertyOps, RepoOps};
use crate::report::{RECORD_COLUMNS, RepositoryRecord, Sheet, merge_rows};

/// File name used when none is given on the command line.
pub fn default_output(scope: &Scope, filtered: bool) -> PathBuf {
    match scope {
        Scope::Organization(_) => PathBuf::from("github_custom_properties.xlsx"),
        Scope::User(user) if filtered => PathBuf::from(format!("{}_filtered_repos.xlsx", user)),
        Scope::User(user) => PathBuf::from(format!("{}_repos.xlsx", user)),
    }
}

/// Counts describing a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub output: PathBuf,
    /// Repositories returned by the listing.
    pub listed: usize,
    /// Repositories written to the sheet.
    pub retained: usize,
    /// Repositories dropped by the metadata filter.
    pub excluded: usize,
    /// Repositories with an entry in the custom property listing.
    pub with_properties: usize,
    pub columns: usize,
    /// False when the repository listing stopped on an error.
    pub listing_complete: bool,
    /// `None` when enrichment was skipped.
    pub properties_complete: Option<bool>,
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Report saved as {} ({} of {} repositories, {} columns)",
            self.output.display(),
            self.retained,
            self.listed,
            self.columns
        )?;
        if !self.listing_complete {
            write!(f, "; repository listing incomplete")?;
        }
        if self.properties_complete == Some(false) {
            write!(f, "; custom properties incomplete")?;
        }
        Ok(())
    }
}

/// Builder for one report run.
pub struct RepoReport<'a, C> {
    client: &'a C,
    scope: Scope,
    per_page: u32,
    property_api: PropertyApi,
    filter: Option<MetadataFilter>,
}

impl<'a, C> RepoReport<'a, C>
where
    C: RepoOps + PropertyOps,
{
    /// Start a report for `scope`. Organizations are enriched with custom
    /// properties by default; users are not.
    pub fn new(client: &'a C, scope: Scope) -> Self {
        let property_api = match scope {
            Scope::Organization(_) => PropertyApi::Values,
            Scope::User(_) => PropertyApi::None,
        };
        Self {
            client,
            scope,
            per_page: DEFAULT_PER_PAGE,
            property_api,
            filter: None,
        }
    }

    /// Start a report using the scope, page size and property API of `config`.
    pub fn from_config(client: &'a C, config: &Config) -> Self {
        Self::new(client, config.scope.clone())
            .per_page(config.per_page)
            .properties(config.property_api)
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn properties(mut self, api: PropertyApi) -> Self {
        self.property_api = api;
        self
    }

    /// Keep only repositories whose metadata passes `filter`.
    pub fn filter(mut self, filter: MetadataFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Run every step and write the sheet to `output`.
    ///
    /// Fails with [`ReportError::NoRepositories`] before writing anything when
    /// the listing is empty, whether because there are none or because the
    /// first page failed.
    pub fn execute(self, output: &Path) -> Result<ReportSummary> {
        let listing = match &self.scope {
            Scope::Organization(org) => self.client.list_org_repos(org, self.per_page),
            Scope::User(_) => self.client.list_user_repos(self.per_page),
        };
        let listing_complete = listing.is_complete();
        if listing.items.is_empty() {
            if let Some(e) = &listing.error {
                warn!(error = %e, "repository listing failed");
            }
            return Err(ReportError::NoRepositories {
                scope: self.scope.to_string(),
            });
        }
        let listed = listing.items.len();
        info!(scope = %self.scope, listed, "repositories listed");

        let (kept, excluded): (Vec<(GitHubRepo, Option<RepoMetadata>)>, usize) = match &self.filter
        {
            Some(filter) => {
                let result = filter.apply(listing.items);
                let excluded = result.excluded.len();
                let kept = result
                    .retained
                    .into_iter()
                    .map(|(repo, metadata)| (repo, Some(metadata)))
                    .collect();
                (kept, excluded)
            }
            None => (listing.items.into_iter().map(|r| (r, None)).collect(), 0),
        };

        let (properties, properties_complete) = self.fetch_properties();

        let records: Vec<(RepositoryRecord, Option<RepoMetadata>)> = kept
            .iter()
            .map(|(repo, metadata)| (RepositoryRecord::from(repo), metadata.clone()))
            .collect();
        let rows = merge_rows(
            records.iter().map(|(record, metadata)| (record, metadata.as_ref())),
            &properties,
        );

        let sheet_name = if self.filter.is_some() {
            "Filtered GitHub Repos"
        } else {
            "Repositories"
        };
        let sheet = Sheet::from_rows(sheet_name, RECORD_COLUMNS, &rows);
        sheet.write_xlsx(output)?;

        Ok(ReportSummary {
            output: output.to_path_buf(),
            listed,
            retained: rows.len(),
            excluded,
            with_properties: properties.len(),
            columns: sheet.headers().len(),
            listing_complete,
            properties_complete,
        })
    }

    fn fetch_properties(&self) -> (PropertyMap, Option<bool>) {
        match (&self.scope, self.property_api) {
            (_, PropertyApi::None) => (PropertyMap::default(), None),
            (Scope::Organization(org), PropertyApi::Values) => {
                let (map, paged) = self.client.property_map(org, self.per_page);
                (map, Some(paged.is_complete()))
            }
            (Scope::User(_), PropertyApi::Values) => {
                warn!("custom properties are only available for organizations, skipping");
                (PropertyMap::default(), None)
            }
        }
    }
}
