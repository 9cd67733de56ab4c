//! Flattening repositories, metadata and custom properties into rows.

use crate::filter::RepoMetadata;
use crate::github::{CustomProperty, GitHubRepo, PropertyMap};

/// Columns every report starts with, in order.
pub const RECORD_COLUMNS: &[&str] = &[
    "Name",
    "Visibility",
    "Fork",
    "URL",
    "Description",
    "Stars",
    "Forks",
    "Last Updated",
];

/// Columns added for repositories that passed the metadata filter.
pub const METADATA_COLUMNS: &[(&str, &str)] = &[("Export", "export"), ("Status", "status")];

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    fn text(value: Option<&str>) -> Self {
        match value {
            Some(s) => Cell::Text(s.to_string()),
            None => Cell::Empty,
        }
    }

    fn from_json(value: Option<&serde_json::Value>) -> Self {
        use serde_json::Value;
        match value {
            None | Some(Value::Null) => Cell::Empty,
            Some(Value::Bool(b)) => Cell::Bool(*b),
            Some(Value::Number(n)) => n.as_f64().map(Cell::Number).unwrap_or_default(),
            Some(Value::String(s)) => Cell::Text(s.clone()),
            Some(other) => Cell::Text(other.to_string()),
        }
    }
}

/// The report-facing view of a repository.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryRecord {
    pub id: u64,
    pub name: String,
    pub visibility: String,
    pub fork: bool,
    pub url: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub last_updated: Option<String>,
}

impl From<&GitHubRepo> for RepositoryRecord {
    fn from(repo: &GitHubRepo) -> Self {
        Self {
            id: repo.id,
            name: repo.name.clone(),
            visibility: repo.visibility_label(),
            fork: repo.fork,
            url: repo.html_url.clone(),
            description: repo.description.clone(),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            last_updated: repo.updated_at.clone(),
        }
    }
}

impl RepositoryRecord {
    fn cells(&self) -> [Cell; 8] {
        [
            Cell::Text(self.name.clone()),
            Cell::Text(self.visibility.clone()),
            Cell::Bool(self.fork),
            Cell::Text(self.url.clone()),
            Cell::text(self.description.as_deref()),
            Cell::Number(self.stars as f64),
            Cell::Number(self.forks as f64),
            Cell::text(self.last_updated.as_deref()),
        ]
    }
}

/// A flattened output row: ordered `(column, cell)` pairs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedRow {
    columns: Vec<(String, Cell)>,
}

impl MergedRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, or replace the cell if the column already exists.
    pub fn set(&mut self, column: impl Into<String>, cell: Cell) {
        let column = column.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = cell,
            None => self.columns.push((column, cell)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cell)| cell)
    }

    pub fn columns(&self) -> &[(String, Cell)] {
        &self.columns
    }

    fn has(&self, column: &str) -> bool {
        self.get(column).is_some()
    }
}

/// Build the row for one repository.
///
/// A property whose name collides with an existing column is written to
/// `"<name> (property)"` so neither value is lost.
pub fn merge_row(
    record: &RepositoryRecord,
    metadata: Option<&RepoMetadata>,
    properties: &[CustomProperty],
) -> MergedRow {
    let mut row = MergedRow::new();
    for (column, cell) in RECORD_COLUMNS.iter().zip(record.cells()) {
        row.set(*column, cell);
    }

    if let Some(metadata) = metadata {
        for (column, key) in METADATA_COLUMNS {
            row.set(*column, Cell::from_json(metadata.get(key)));
        }
    }

    for property in properties {
        let cell = match &property.value {
            Some(value) => Cell::Text(value.to_string()),
            None => Cell::Empty,
        };
        let column = if row.has(&property.property_name) {
            format!("{} (property)", property.property_name)
        } else {
            property.property_name.clone()
        };
        row.set(column, cell);
    }
    row
}

/// Merge every record with its custom properties, keeping input order.
///
/// Records without an entry in `properties` get no property columns of their
/// own; the sheet fills those columns with empty cells.
pub fn merge_rows<'a, I>(entries: I, properties: &PropertyMap) -> Vec<MergedRow>
where
    I: IntoIterator<Item = (&'a RepositoryRecord, Option<&'a RepoMetadata>)>,
{
    entries
        .into_iter()
        .map(|(record, metadata)| merge_row(record, metadata, properties.get(record.id)))
        .collect()
}
