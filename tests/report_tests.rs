//! Integration tests for report generation against an in-process GitHub stand-in.

use repo_report::prelude::*;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

/// Serves fixed JSON collections per endpoint, sliced into pages.
#[derive(Default)]
struct FakeGitHub {
    collections: HashMap<String, Vec<Value>>,
    fail_at: HashMap<String, u32>,
    requests: RefCell<Vec<(String, u32)>>,
}

impl FakeGitHub {
    fn with(mut self, endpoint: &str, items: Vec<Value>) -> Self {
        self.collections.insert(endpoint.to_string(), items);
        self
    }

    fn failing(mut self, endpoint: &str, page: u32) -> Self {
        self.fail_at.insert(endpoint.to_string(), page);
        self
    }

    fn request_count(&self, endpoint: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|(e, _)| e == endpoint)
            .count()
    }
}

impl PageFetch for FakeGitHub {
    fn fetch_page<T: DeserializeOwned>(&self, request: &PageRequest<'_>) -> Result<Vec<T>> {
        self.requests
            .borrow_mut()
            .push((request.endpoint.to_string(), request.page));
        if self.fail_at.get(request.endpoint) == Some(&request.page) {
            return Err(ReportError::GitHub {
                message: "API request failed (500 Internal Server Error): ".into(),
            });
        }
        let Some(items) = self.collections.get(request.endpoint) else {
            return Err(ReportError::GitHub {
                message: "API request failed (404 Not Found): ".into(),
            });
        };
        let per_page = request.per_page as usize;
        let start = ((request.page - 1) as usize * per_page).min(items.len());
        let end = (start + per_page).min(items.len());
        Ok(serde_json::from_value(Value::Array(items[start..end].to_vec()))?)
    }
}

fn repo(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "full_name": format!("acme/{}", name),
        "html_url": format!("https://github.com/acme/{}", name),
        "clone_url": format!("https://github.com/acme/{}.git", name),
        "default_branch": "main",
        "fork": false,
        "private": id % 2 == 0,
        "description": format!("The {} service", name),
        "stargazers_count": id * 10,
        "forks_count": id,
        "updated_at": "2024-07-01T12:00:00Z"
    })
}

fn repos(count: u64) -> Vec<Value> {
    (1..=count).map(|id| repo(id, &format!("repo-{id}"))).collect()
}

fn props(id: u64, properties: Value) -> Value {
    json!({
        "repository_id": id,
        "repository_name": format!("repo-{id}"),
        "repository_full_name": format!("acme/repo-{id}"),
        "properties": properties
    })
}

const ORG_REPOS: &str = "/orgs/acme/repos";
const ORG_PROPS: &str = "/orgs/acme/properties/values";

fn org() -> Scope {
    Scope::Organization("acme".into())
}

#[test]
fn test_org_report_with_properties() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("report.xlsx");
    let github = FakeGitHub::default().with(ORG_REPOS, repos(5)).with(
        ORG_PROPS,
        vec![
            props(1, json!([{"property_name": "team", "value": "core"}])),
            props(3, json!([
                {"property_name": "team", "value": "web"},
                {"property_name": "tier", "value": "gold"}
            ])),
        ],
    );

    let summary = RepoReport::new(&github, org())
        .per_page(2)
        .execute(&output)
        .unwrap();

    assert!(output.exists());
    assert_eq!(summary.listed, 5);
    assert_eq!(summary.retained, 5);
    assert_eq!(summary.excluded, 0);
    assert_eq!(summary.with_properties, 2);
    assert_eq!(summary.columns, 8 + 2);
    assert!(summary.listing_complete);
    assert_eq!(summary.properties_complete, Some(true));

    // 5 items at 2 per page: 3 full or partial pages plus the empty one
    assert_eq!(github.request_count(ORG_REPOS), 4);
    assert_eq!(github.request_count(ORG_PROPS), 2);
}

#[test]
fn test_rows_without_properties_get_empty_cells() {
    let api = RepositoryRecord::from(&serde_json::from_value::<GitHubRepo>(repo(1, "api")).unwrap());
    let web = RepositoryRecord::from(&serde_json::from_value::<GitHubRepo>(repo(2, "web")).unwrap());
    let map = PropertyMap::from_entries(vec![
        serde_json::from_value(props(1, json!([{"property_name": "team", "value": "core"}])))
            .unwrap(),
    ]);

    let rows = repo_report::report::merge_rows([(&api, None), (&web, None)], &map);
    let sheet = Sheet::from_rows("Repositories", repo_report::report::RECORD_COLUMNS, &rows);

    let team = sheet.headers().iter().position(|h| h == "team").unwrap();
    assert_eq!(sheet.rows()[0][team], Cell::Text("core".into()));
    assert_eq!(sheet.rows()[1][team], Cell::Empty);
    assert_eq!(sheet.rows()[1][0], Cell::Text("web".into()));
}

#[test]
fn test_properties_endpoint_failure_keeps_report() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("report.xlsx");
    let github = FakeGitHub::default()
        .with(ORG_REPOS, repos(3))
        .with(ORG_PROPS, vec![props(1, json!([{"property_name": "team", "value": "core"}]))])
        .failing(ORG_PROPS, 1);

    let summary = RepoReport::new(&github, org()).execute(&output).unwrap();

    assert!(output.exists());
    assert_eq!(summary.retained, 3);
    assert_eq!(summary.with_properties, 0);
    assert_eq!(summary.columns, 8);
    assert_eq!(summary.properties_complete, Some(false));
}

#[test]
fn test_properties_skipped() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("report.xlsx");
    let github = FakeGitHub::default().with(ORG_REPOS, repos(2));

    let summary = RepoReport::new(&github, org())
        .properties(PropertyApi::None)
        .execute(&output)
        .unwrap();

    assert_eq!(summary.properties_complete, None);
    assert_eq!(github.request_count(ORG_PROPS), 0);
}

#[test]
fn test_partial_listing_is_reported() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("report.xlsx");
    let github = FakeGitHub::default()
        .with(ORG_REPOS, repos(10))
        .with(ORG_PROPS, vec![])
        .failing(ORG_REPOS, 2);

    let summary = RepoReport::new(&github, org())
        .per_page(4)
        .execute(&output)
        .unwrap();

    assert_eq!(summary.listed, 4);
    assert!(!summary.listing_complete);
    assert!(output.exists());
}

#[test]
fn test_empty_listing_writes_no_report() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("report.xlsx");
    let github = FakeGitHub::default()
        .with(ORG_REPOS, vec![])
        .with(ORG_PROPS, vec![]);

    let err = RepoReport::new(&github, org()).execute(&output).unwrap_err();

    assert!(matches!(err, ReportError::NoRepositories { .. }));
    assert_eq!(err.to_string(), "No repositories found for organization 'acme'");
    assert!(!output.exists());
    assert_eq!(github.request_count(ORG_PROPS), 0);
}

#[test]
fn test_unreachable_listing_writes_no_report() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("report.xlsx");
    let github = FakeGitHub::default()
        .with(ORG_REPOS, repos(3))
        .failing(ORG_REPOS, 1);

    let err = RepoReport::new(&github, org()).execute(&output).unwrap_err();

    assert!(matches!(err, ReportError::NoRepositories { .. }));
    assert!(!output.exists());
}

/// Clones by writing the metadata registered for a clone URL.
#[derive(Clone, Default)]
struct FakeCloner {
    metadata: HashMap<String, Option<&'static str>>,
    clones: Rc<RefCell<Vec<PathBuf>>>,
}

impl Cloner for FakeCloner {
    fn clone_into(&self, url: &str, _branch: Option<&str>, dest: &Path) -> Result<()> {
        self.clones.borrow_mut().push(dest.to_path_buf());
        match self.metadata.get(url) {
            Some(Some(contents)) => {
                fs::create_dir_all(dest.join(".github"))?;
                fs::write(dest.join(".github/custom.json"), contents)?;
                Ok(())
            }
            Some(None) => Ok(()),
            None => Err(ReportError::GitHub {
                message: "repository not found".into(),
            }),
        }
    }
}

#[test]
fn test_filtered_user_report() {
    let dir = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let output = dir.path().join("octocat_filtered_repos.xlsx");
    let github = FakeGitHub::default().with("/user/repos", repos(4));

    let mut metadata = HashMap::new();
    let url = |id: u64| format!("https://github.com/acme/repo-{id}.git");
    metadata.insert(url(1), Some(r#"{"export": true, "status": "Changes Required"}"#));
    metadata.insert(url(2), Some(r#"{"export": true, "status": "done"}"#));
    metadata.insert(url(3), None);
    metadata.insert(url(4), Some("not json"));
    let cloner = FakeCloner {
        metadata,
        ..Default::default()
    };
    let clones = Rc::clone(&cloner.clones);

    let filter = MetadataFilter::new(cloner, MetadataCriteria::default()).scratch_dir(scratch.path());
    let summary = RepoReport::new(&github, Scope::User("octocat".into()))
        .filter(filter)
        .execute(&output)
        .unwrap();

    assert_eq!(summary.listed, 4);
    assert_eq!(summary.retained, 1);
    assert_eq!(summary.excluded, 3);
    assert_eq!(summary.columns, 8 + 2);
    assert_eq!(summary.properties_complete, None);
    assert!(output.exists());

    assert_eq!(clones.borrow().len(), 4);
    assert!(clones.borrow().iter().all(|p| !p.exists()));
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn test_filter_excluding_everything_still_writes_header() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("report.xlsx");
    let github = FakeGitHub::default()
        .with(ORG_REPOS, repos(2))
        .with(ORG_PROPS, vec![]);
    let filter = MetadataFilter::new(FakeCloner::default(), MetadataCriteria::default());

    let summary = RepoReport::new(&github, org())
        .filter(filter)
        .execute(&output)
        .unwrap();

    assert_eq!(summary.retained, 0);
    assert_eq!(summary.excluded, 2);
    assert_eq!(summary.columns, 8);
    assert!(output.exists());
}

#[test]
fn test_report_from_config() {
    let config = Config::from_lookup(
        ScopeKind::Organization,
        &Overrides {
            per_page: Some(1),
            property_api: Some("none".into()),
            ..Default::default()
        },
        |key| match key {
            "GITHUB_TOKEN" => Some("tok".into()),
            "GITHUB_ORG" => Some("acme".into()),
            _ => None,
        },
    )
    .unwrap();
    let dir = TempDir::new().unwrap();
    let output = dir.path().join(default_output(&config.scope, false));
    let github = FakeGitHub::default().with(ORG_REPOS, repos(3));

    let summary = RepoReport::from_config(&github, &config)
        .execute(&output)
        .unwrap();

    assert_eq!(summary.listed, 3);
    assert_eq!(github.request_count(ORG_REPOS), 4);
    assert_eq!(github.request_count(ORG_PROPS), 0);
    assert!(output.ends_with("github_custom_properties.xlsx"));
}
