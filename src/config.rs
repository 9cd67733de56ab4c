//! Run configuration, resolved once at startup.
//!
//! Everything the pipeline needs is collected into a [`Config`] from the
//! process environment and command-line overrides. Validation happens here so
//! that a missing token or organization fails before any request is sent.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Environment variables holding the bearer token, in lookup order.
pub const TOKEN_VARS: &[&str] = &["GITHUB_TOKEN", "MY_GITHUB_TOKEN"];

/// Environment variables holding the organization name, in lookup order.
pub const ORG_VARS: &[&str] = &["GITHUB_ORG", "MY_GITHUB_ORG"];

/// Environment variables holding the username for user listings.
pub const USER_VARS: &[&str] = &["GITHUB_USERNAME"];

/// Environment variable overriding the API base URL.
pub const API_URL_VAR: &str = "GITHUB_API_URL";

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_PER_PAGE: u32 = 100;
pub const MAX_PER_PAGE: u32 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which repository listing a run reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Organization,
    User,
}

/// The resolved listing target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// All repositories of an organization.
    Organization(String),
    /// All repositories visible to the authenticated user.
    User(String),
}

impl Scope {
    /// The organization or user name.
    pub fn name(&self) -> &str {
        match self {
            Scope::Organization(name) | Scope::User(name) => name,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Organization(org) => write!(f, "organization '{}'", org),
            Scope::User(user) => write!(f, "user '{}'", user),
        }
    }
}

/// Custom-property response shape used for enrichment.
///
/// Only the organization `properties/values` endpoint is supported. Earlier
/// shapes (`custom-property-values`, one property per row keyed by name, and
/// `nested-by-name`) are recognised so they can be rejected with a clear
/// message instead of being silently misread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertyApi {
    /// `GET /orgs/{org}/properties/values`, keyed by repository id.
    #[default]
    Values,
    /// Skip enrichment entirely.
    None,
}

/// Historical property API names that are no longer supported.
pub const HISTORICAL_PROPERTY_APIS: &[&str] = &["custom-property-values", "nested-by-name"];

impl FromStr for PropertyApi {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "values" => Ok(PropertyApi::Values),
            "none" => Ok(PropertyApi::None),
            other if HISTORICAL_PROPERTY_APIS.contains(&other) => {
                Err(ConfigError::UnsupportedPropertyApi(other.to_string()))
            }
            _ => Err(ConfigError::UnknownPropertyApi(s.to_string())),
        }
    }
}

/// Values supplied on the command line; each one wins over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub name: Option<String>,
    pub api_url: Option<String>,
    pub per_page: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub property_api: Option<String>,
}

/// Fully validated run configuration.
#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub scope: Scope,
    pub api_url: String,
    pub per_page: u32,
    pub timeout: Duration,
    pub property_api: PropertyApi,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("scope", &self.scope)
            .field("api_url", &self.api_url)
            .field("per_page", &self.per_page)
            .field("timeout", &self.timeout)
            .field("property_api", &self.property_api)
            .finish()
    }
}

impl Config {
    /// Build a configuration from the process environment.
    pub fn from_env(kind: ScopeKind, overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(kind, overrides, |key| std::env::var(key).ok())
    }

    /// Build a configuration using `lookup` in place of the environment.
    pub fn from_lookup<F>(
        kind: ScopeKind,
        overrides: &Overrides,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first_set = |vars: &[&str]| {
            vars.iter()
                .filter_map(|var| lookup(var))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };
        let non_blank = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        let token = first_set(TOKEN_VARS).ok_or_else(|| ConfigError::MissingToken {
            vars: names(TOKEN_VARS),
        })?;

        let scope = match kind {
            ScopeKind::Organization => {
                let org = non_blank(&overrides.name)
                    .or_else(|| first_set(ORG_VARS))
                    .ok_or_else(|| ConfigError::MissingScope {
                        what: "organization",
                        flag: "org",
                        vars: names(ORG_VARS),
                    })?;
                Scope::Organization(org)
            }
            ScopeKind::User => {
                let user = non_blank(&overrides.name)
                    .or_else(|| first_set(USER_VARS))
                    .ok_or_else(|| ConfigError::MissingScope {
                        what: "username",
                        flag: "user",
                        vars: names(USER_VARS),
                    })?;
                Scope::User(user)
            }
        };

        let mut api_url = non_blank(&overrides.api_url)
            .or_else(|| first_set(std::slice::from_ref(&API_URL_VAR)))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        while api_url.ends_with('/') {
            api_url.pop();
        }
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "api_url",
                message: format!("'{}' is not an http(s) URL", api_url),
            });
        }

        let per_page = overrides.per_page.unwrap_or(DEFAULT_PER_PAGE);
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(ConfigError::InvalidValue {
                field: "per_page",
                message: format!("{} is outside 1..={}", per_page, MAX_PER_PAGE),
            });
        }

        let timeout_secs = overrides.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout",
                message: "must be at least one second".into(),
            });
        }

        let property_api = match (&overrides.property_api, kind) {
            (Some(value), _) => value.parse()?,
            // Custom properties only exist on organizations.
            (None, ScopeKind::User) => PropertyApi::None,
            (None, ScopeKind::Organization) => PropertyApi::Values,
        };
        if property_api == PropertyApi::Values && kind == ScopeKind::User {
            return Err(ConfigError::InvalidValue {
                field: "property_api",
                message: "custom properties are only available for organizations".into(),
            });
        }

        Ok(Self {
            token,
            scope,
            api_url,
            per_page,
            timeout: Duration::from_secs(timeout_secs),
            property_api,
        })
    }
}

fn names(vars: &[&str]) -> Vec<String> {
    vars.iter().map(|v| v.to_string()).collect()
}
