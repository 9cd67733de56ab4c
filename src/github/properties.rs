//! Organization custom property values.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use tracing::{debug, info};

use crate::github::{PageFetch, Paged, paginate};

/// Value of a single custom property.
///
/// Multi-select properties come back as a list of strings and most other
/// property types as a string. Anything else (a bare number or boolean from
/// some Enterprise servers) is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    List(Vec<String>),
    Other(serde_json::Value),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(text) => f.write_str(text),
            PropertyValue::List(items) => f.write_str(&items.join(", ")),
            PropertyValue::Other(value) => write!(f, "{}", value),
        }
    }
}

/// A named property attached to a repository. `None` means unset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomProperty {
    pub property_name: String,
    pub value: Option<PropertyValue>,
}

/// One entry of `GET /orgs/{org}/properties/values`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoPropertyValues {
    pub repository_id: u64,
    pub repository_name: String,
    #[serde(default)]
    pub repository_full_name: Option<String>,
    #[serde(default)]
    pub properties: Vec<CustomProperty>,
}

/// Custom properties keyed by repository id.
#[derive(Debug, Clone, Default)]
pub struct PropertyMap {
    by_repo: HashMap<u64, Vec<CustomProperty>>,
}

impl PropertyMap {
    /// Fold listing entries into a map.
    ///
    /// If a repository appears more than once its first property order is kept;
    /// later entries overwrite values of known names and append new names.
    pub fn from_entries(entries: impl IntoIterator<Item = RepoPropertyValues>) -> Self {
        let mut by_repo: HashMap<u64, Vec<CustomProperty>> = HashMap::new();
        for entry in entries {
            let slot = by_repo.entry(entry.repository_id).or_default();
            if !slot.is_empty() {
                debug!(
                    repo = %entry.repository_name,
                    "repository listed more than once in property values"
                );
            }
            for property in entry.properties {
                match slot
                    .iter_mut()
                    .find(|p| p.property_name == property.property_name)
                {
                    Some(existing) => existing.value = property.value,
                    None => slot.push(property),
                }
            }
        }
        Self { by_repo }
    }

    /// Properties of a repository; empty when the repository has none.
    pub fn get(&self, repository_id: u64) -> &[CustomProperty] {
        self.by_repo
            .get(&repository_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of repositories with an entry.
    pub fn len(&self) -> usize {
        self.by_repo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_repo.is_empty()
    }
}

/// Custom property listing operations.
pub trait PropertyOps {
    /// List custom property values for every repository in an organization.
    fn list_property_values(&self, org: &str, per_page: u32) -> Paged<RepoPropertyValues>;

    /// List property values and fold them into a [`PropertyMap`].
    ///
    /// The map holds whatever was fetched before any error; the returned
    /// `Paged` carries the error and request count with its items drained.
    fn property_map(&self, org: &str, per_page: u32) -> (PropertyMap, Paged<RepoPropertyValues>) {
        let mut paged = self.list_property_values(org, per_page);
        let map = PropertyMap::from_entries(std::mem::take(&mut paged.items));
        (map, paged)
    }
}

impl<C: PageFetch> PropertyOps for C {
    fn list_property_values(&self, org: &str, per_page: u32) -> Paged<RepoPropertyValues> {
        let endpoint = format!("/orgs/{}/properties/values", urlencoding::encode(org));
        let paged = paginate(self, &endpoint, &[], per_page);
        info!(org, count = paged.items.len(), "listed custom property values");
        paged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::github::PageRequest;
    use serde::de::DeserializeOwned;
    use serde_json::{Value, json};

    fn entry(id: u64, name: &str, properties: Value) -> RepoPropertyValues {
        serde_json::from_value(json!({
            "repository_id": id,
            "repository_name": name,
            "repository_full_name": format!("acme/{}", name),
            "properties": properties
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_value_shapes() {
        let e = entry(
            1,
            "api",
            json!([
                {"property_name": "team", "value": "platform"},
                {"property_name": "regions", "value": ["eu", "us"]},
                {"property_name": "tier", "value": null}
            ]),
        );

        assert_eq!(e.properties.len(), 3);
        assert_eq!(
            e.properties[0].value,
            Some(PropertyValue::Text("platform".into()))
        );
        assert_eq!(
            e.properties[1].value,
            Some(PropertyValue::List(vec!["eu".into(), "us".into()]))
        );
        assert_eq!(e.properties[2].value, None);
        assert_eq!(e.properties[1].value.as_ref().unwrap().to_string(), "eu, us");
    }

    #[test]
    fn test_scalar_values_do_not_break_the_page() {
        let e = entry(
            1,
            "api",
            json!([
                {"property_name": "cost_center", "value": 4100},
                {"property_name": "pci", "value": true}
            ]),
        );

        assert_eq!(e.properties[0].value, Some(PropertyValue::Other(json!(4100))));
        assert_eq!(e.properties[0].value.as_ref().unwrap().to_string(), "4100");
        assert_eq!(e.properties[1].value.as_ref().unwrap().to_string(), "true");
    }

    #[test]
    fn test_map_lookup_and_missing_default() {
        let map = PropertyMap::from_entries(vec![
            entry(1, "api", json!([{"property_name": "team", "value": "platform"}])),
            entry(2, "web", json!([])),
        ]);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(1)[0].property_name, "team");
        assert!(map.get(2).is_empty());
        assert!(map.get(42).is_empty());
    }

    #[test]
    fn test_duplicate_entries_merge() {
        let map = PropertyMap::from_entries(vec![
            entry(
                1,
                "api",
                json!([
                    {"property_name": "team", "value": "old"},
                    {"property_name": "tier", "value": "gold"}
                ]),
            ),
            entry(
                1,
                "api",
                json!([
                    {"property_name": "team", "value": "new"},
                    {"property_name": "owner", "value": "sam"}
                ]),
            ),
        ]);

        let names: Vec<_> = map.get(1).iter().map(|p| p.property_name.as_str()).collect();
        assert_eq!(names, ["team", "tier", "owner"]);
        assert_eq!(map.get(1)[0].value, Some(PropertyValue::Text("new".into())));
    }

    struct TwoPages;

    impl PageFetch for TwoPages {
        fn fetch_page<T: DeserializeOwned>(&self, request: &PageRequest<'_>) -> Result<Vec<T>> {
            assert_eq!(request.endpoint, "/orgs/acme/properties/values");
            let page = match request.page {
                1 => json!([{"repository_id": 1, "repository_name": "api", "properties": []}]),
                2 => json!([{"repository_id": 2, "repository_name": "web", "properties": []}]),
                _ => json!([]),
            };
            Ok(serde_json::from_value(page)?)
        }
    }

    #[test]
    fn test_property_map_from_client() {
        let (map, paged) = TwoPages.property_map("acme", 1);

        assert_eq!(map.len(), 2);
        assert_eq!(paged.requests, 3);
        assert!(paged.items.is_empty());
        assert!(paged.is_complete());
    }
}
