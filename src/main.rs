//! Command-line interface for the repository census.
//!
//! The binary resolves settings from flags, an optional YAML document and
//! built-in defaults, reads the GraphQL token from `GH_TOKEN`, and runs the
//! census, printing any error to stderr with a non-zero exit status.

use std::{path::PathBuf, process};

use clap::{ArgAction, Parser};
use repo_census::{Credential, Error, Settings, TOKEN_VARIABLE, retry::RetryConfig, run_census};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Collect GitHub repository metadata and contributors into newline-delimited
/// JSON.
#[derive(Debug, Parser,)]
#[command(name = "repo-census", version, about)]
struct Cli
{
    /// Accepted for compatibility and ignored; use --input to choose the
    /// repository list.
    #[arg(value_name = "LEGACY_INPUT")]
    legacy_input: Option<PathBuf,>,

    /// Repository list with one URL per line [default: repos.txt].
    #[arg(long = "input", value_name = "PATH")]
    input: Option<PathBuf,>,

    /// Output file for newline-delimited JSON [default: output/repos.json].
    #[arg(long = "output", value_name = "PATH")]
    output: Option<PathBuf,>,

    /// YAML settings document; flags take precedence over its values.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf,>,

    /// Base URI of the GitHub API.
    #[arg(long = "api-base-uri", value_name = "URI")]
    api_base_uri: Option<String,>,

    /// Contributors requested per page (1-100).
    #[arg(long = "page-size", value_name = "N")]
    page_size: Option<u8,>,

    /// Maximum contributor pages fetched per repository.
    #[arg(long = "max-pages", value_name = "N", conflicts_with = "unbounded")]
    max_pages: Option<u32,>,

    /// Follow contributor pages without a limit.
    #[arg(long = "unbounded", action = ArgAction::SetTrue)]
    unbounded: bool,

    /// Perform every remote call exactly once.
    #[arg(long = "no-retry", action = ArgAction::SetTrue)]
    no_retry: bool,

    /// Bearer token for the GraphQL API.
    #[arg(long = "token", env = TOKEN_VARIABLE, hide_env_values = true)]
    token: Option<String,>,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr,),)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info",),),)
        .init();

    if let Err(error,) = run().await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

/// Executes the census using parsed arguments.
///
/// # Errors
///
/// Propagates settings, credential and census errors.
async fn run() -> Result<(), Error,>
{
    let cli = Cli::parse();

    if let Some(ignored,) = cli.legacy_input.as_deref() {
        warn!(
            "positional argument {} is ignored; pass --input {} to read it",
            ignored.display(),
            ignored.display()
        );
    }

    let settings = resolve_settings(&cli,)?;
    let credential = Credential::new(cli.token.clone(),)?;

    let summary = run_census(&settings, &credential,).await?;
    info!("{}", summary);

    Ok((),)
}

/// Layers command-line overrides over the settings document and defaults.
fn resolve_settings(cli: &Cli,) -> Result<Settings, Error,>
{
    let mut settings = match cli.config.as_deref() {
        Some(path,) => Settings::load(path,)?,
        None => Settings::default(),
    };

    if let Some(input,) = &cli.input {
        settings.input = input.clone();
    }
    if let Some(output,) = &cli.output {
        settings.output = output.clone();
    }
    if let Some(uri,) = &cli.api_base_uri {
        settings.api_base_uri = uri.clone();
    }
    if let Some(page_size,) = cli.page_size {
        settings.page_size = page_size;
    }
    if cli.unbounded {
        settings.max_pages = None;
    } else if let Some(max_pages,) = cli.max_pages {
        settings.max_pages = Some(max_pages,);
    }
    if cli.no_retry {
        settings.retry = RetryConfig::disabled();
    }

    settings.validate()?;
    Ok(settings,)
}
