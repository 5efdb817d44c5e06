//! bbdeploy CLI entrypoint.
//!
//! This is the main entrypoint for the bbdeploy command-line tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bitbucket_deployments::bitbucket::{BitbucketClient, EnvironmentLister};
use bitbucket_deployments::cli::{Cli, Commands, OutputFormatter, RepositoryArgs};
use bitbucket_deployments::config::{
    locate_config_file, AppConfig, ConfigParser, ConfigValidator,
};
use bitbucket_deployments::error::Result;
use bitbucket_deployments::resolver::{DeploymentResolver, ResolutionInput};
use bitbucket_deployments::schema::{required_fields, DEPLOYMENT_FIELDS};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Get {
            identifier,
            repo,
            fail_on_unmatched,
        } => cmd_get(cli.config.as_ref(), identifier, repo, fail_on_unmatched, &formatter).await,
        Commands::List { repo } => cmd_list(cli.config.as_ref(), &repo, &formatter).await,
        Commands::Schema => {
            println!("{}", formatter.format_schema(DEPLOYMENT_FIELDS));
            Ok(())
        }
        Commands::Validate { warnings } => cmd_validate(cli.config.as_ref(), warnings),
    }
}

/// Resolve one deployment environment.
async fn cmd_get(
    config_path: Option<&PathBuf>,
    identifier: String,
    repo: RepositoryArgs,
    fail_on_unmatched: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let config = load_config(config_path)?;
    let client = create_client(&config)?;

    let resolver = DeploymentResolver::new(&client, &client)
        .with_fail_on_unmatched(fail_on_unmatched || config.resolver.fail_on_unmatched);
    let input = ResolutionInput::new(repo.workspace, repo.repository, identifier);

    let record = resolver.resolve(&input).await?;

    println!("{}", formatter.format_record(&record));
    Ok(())
}

/// List the environments of a repository.
async fn cmd_list(
    config_path: Option<&PathBuf>,
    repo: &RepositoryArgs,
    formatter: &OutputFormatter,
) -> Result<()> {
    let config = load_config(config_path)?;
    let client = create_client(&config)?;

    info!("Listing environments for {}/{}", repo.workspace, repo.repository);
    let environments = client
        .list_environments(&repo.workspace, &repo.repository)
        .await?;

    println!("{}", formatter.format_environments(&environments));
    Ok(())
}

/// Validate configuration.
fn cmd_validate(config_path: Option<&PathBuf>, show_warnings: bool) -> Result<()> {
    let config_file = resolve_config_path(config_path);
    let config = read_config(config_file.as_deref())?;

    let result = ConfigValidator::new().validate(&config)?;

    eprintln!("Configuration is valid!");
    if show_warnings && !result.warnings.is_empty() {
        eprintln!("\nWarnings:");
        for warning in &result.warnings {
            eprintln!("  - {warning}");
        }
    }

    let credentials = ConfigParser::credentials()?;
    let required: Vec<&str> = required_fields().map(|field| field.name).collect();

    eprintln!("\nConfiguration summary:");
    eprintln!(
        "  File: {}",
        config_file.map_or_else(|| String::from("(defaults)"), |p| p.display().to_string())
    );
    eprintln!("  API: {}", config.api.base_url);
    eprintln!("  Timeout: {}s", config.api.timeout_secs);
    eprintln!("  Auth: {}", credentials.scheme());
    eprintln!("  Fail on unmatched: {}", config.resolver.fail_on_unmatched);
    eprintln!("  Required lookup inputs: {}", required.join(", "));

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the configuration file path, if any.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Option<PathBuf> {
    config_path.cloned().or_else(|| locate_config_file("."))
}

/// Loads `.env`, the configuration file and environment overrides.
fn read_config(config_file: Option<&Path>) -> Result<AppConfig> {
    debug!("Configuration file: {config_file:?}");

    let parser = ConfigParser::new()
        .with_base_path(config_file.and_then(Path::parent).unwrap_or_else(|| Path::new(".")));
    parser.load_dotenv()?;

    parser.load_with_env(config_file)
}

/// Loads the configuration, then validates it.
fn load_config(config_path: Option<&PathBuf>) -> Result<AppConfig> {
    let config = read_config(resolve_config_path(config_path).as_deref())?;

    ConfigValidator::new().validate(&config)?;

    Ok(config)
}

/// Creates a Bitbucket API client.
fn create_client(config: &AppConfig) -> Result<BitbucketClient> {
    let credentials = ConfigParser::credentials()?;
    BitbucketClient::with_options(&config.api.base_url, config.api.timeout_secs, credentials)
}
