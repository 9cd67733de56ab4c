//! CLI for the repo-report tool.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use repo_report::filter::DEFAULT_REQUIRED_STATUS;
use repo_report::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "repo_report=info";

#[derive(Parser)]
#[command(name = "repo-report")]
#[command(
    author,
    version,
    about = "Export GitHub repositories and their custom properties to a spreadsheet",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report on every repository of an organization
    Org {
        /// Organization name (defaults to GITHUB_ORG or MY_GITHUB_ORG)
        #[arg(long)]
        org: Option<String>,

        /// Custom property API: "values" or "none"
        #[arg(long)]
        property_api: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Report on every repository visible to the authenticated user
    User {
        /// Username used to name the report (defaults to GITHUB_USERNAME)
        #[arg(long)]
        user: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Output spreadsheet path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Items requested per page (1-100)
    #[arg(long)]
    per_page: Option<u32>,

    /// API root, for GitHub Enterprise (defaults to GITHUB_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[command(flatten)]
    filter: FilterArgs,
}

#[derive(Args)]
struct FilterArgs {
    /// Keep only repositories whose .github/custom.json matches
    #[arg(long)]
    filter: bool,

    /// Required value of the "export" field
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    require_export: bool,

    /// Required value of the "status" field (case-insensitive)
    #[arg(long, default_value = DEFAULT_REQUIRED_STATUS)]
    require_status: String,

    /// Directory for temporary clones (defaults to the system temp dir)
    #[arg(long)]
    scratch_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    match cli.command {
        Commands::Org {
            org,
            property_api,
            common,
        } => cmd_report(ScopeKind::Organization, org, property_api, common),
        Commands::User { user, common } => cmd_report(ScopeKind::User, user, None, common),
    }
}

/// Log to stderr; `RUST_LOG` replaces the default filter and `LOG_FORMAT=json`
/// switches to JSON lines.
fn init_tracing() -> Result<()> {
    let filter = log_filter(std::env::var("RUST_LOG").ok().as_deref());
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

/// `RUST_LOG` when set and valid, otherwise `repo_report=info`.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn cmd_report(
    kind: ScopeKind,
    name: Option<String>,
    property_api: Option<String>,
    common: CommonArgs,
) -> Result<()> {
    let overrides = Overrides {
        name,
        api_url: common.api_url,
        per_page: common.per_page,
        timeout_secs: common.timeout,
        property_api,
    };
    let config = Config::from_env(kind, &overrides).context("Invalid configuration")?;
    let client = GitHubClient::from_config(&config).context("Failed to create GitHub client")?;

    let FilterArgs {
        filter,
        require_export,
        require_status,
        scratch_dir,
    } = common.filter;
    let output = common
        .output
        .unwrap_or_else(|| default_output(&config.scope, filter));

    let mut report = RepoReport::from_config(&client, &config);
    if filter {
        let mut metadata_filter = MetadataFilter::new(
            GitCloner::from_client(&client),
            MetadataCriteria::new(require_export, require_status),
        );
        if let Some(dir) = scratch_dir {
            metadata_filter = metadata_filter.scratch_dir(dir);
        }
        report = report.filter(metadata_filter);
    }

    let summary = report
        .execute(&output)
        .with_context(|| format!("Failed to build report for {}", config.scope))?;
    println!("{}", summary);

    Ok(())
}
