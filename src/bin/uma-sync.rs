//! UMA resource synchronization CLI.
//!
//! Loads the application's entity manifest and registers every entity type as
//! a resource set for the configured client.
//!
//! ## Usage
//!
//! ```bash
//! UMA_SERVER_URL=https://sso.example.com UMA_REALM=acme \
//! UMA_CLIENT_ID=my-app UMA_CLIENT_SECRET=... \
//!   uma-sync --manifest uma-resources.json
//! ```
//!
//! Set `MODELS_FOR_SYNCHRONIZE_RESOURCES` to restrict which apps are
//! synchronized.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Configuration or general error
//! - 2: Resource registration error
//! - 3: Authentication error

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::process;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use uma_sync::{
    config::Config,
    errors::SyncError,
    registry::ManifestRegistry,
    sync::{ResourceSynchronizer, SyncReport},
    uma::{Client, ClientCredentialsTokenProvider, UmaApiClient, UmaConfiguration},
};

#[derive(Parser)]
#[command(
    name = "uma-sync",
    about = "Register application entity types as UMA resources",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// Path to the entity manifest (defaults to MANIFEST_PATH)
    #[arg(long)]
    manifest: Option<String>,

    /// Client to synchronize (defaults to UMA_CLIENT_ID)
    #[arg(long)]
    client_id: Option<String>,

    /// Secret of the client given with --client-id
    #[arg(long, requires = "client_id")]
    client_secret: Option<String>,

    /// Output format for the synchronization report
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// JSON formatted output
    Json,
    /// Human-readable summary
    Table,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "uma_sync=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(()) => process::exit(0),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let code = match err.downcast_ref::<SyncError>() {
                Some(SyncError::Resource(_)) => 2,
                Some(SyncError::Token(_)) => 3,
                None => 1,
            };
            process::exit(code);
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = Config::new()?;
    tracing::info!(version = %config.version, issuer = %config.issuer(), "Starting uma-sync");

    let mut client_builder = reqwest::Client::builder();
    for ca_certificate in config.certificate_bundles.as_ref() {
        tracing::info!("Loading CA certificate: {:?}", ca_certificate);
        let cert = tokio::fs::read(ca_certificate).await?;
        let cert = reqwest::Certificate::from_pem(&cert)?;
        client_builder = client_builder.add_root_certificate(cert);
    }
    let http_client = client_builder
        .user_agent(config.user_agent.clone())
        .timeout(*config.http_client_timeout.as_ref())
        .build()?;

    let uma_configuration = UmaConfiguration::discover(&http_client, &config.issuer()).await?;

    let manifest_path = cli.manifest.as_ref().unwrap_or(&config.manifest_path);
    let registry = ManifestRegistry::from_path(manifest_path).await?;

    let (client_id, client_secret) =
        client_credentials(cli, &config.client_id, config.client_secret.as_deref());
    let client = Client::new(
        client_id,
        client_secret,
        Arc::new(UmaApiClient::new(
            http_client.clone(),
            uma_configuration.resource_registration_endpoint.clone(),
        )),
    );

    let synchronizer = ResourceSynchronizer::new(
        Arc::new(registry),
        Arc::new(ClientCredentialsTokenProvider::new(
            http_client,
            uma_configuration.token_endpoint.clone(),
        )),
        config.allow_list.clone(),
    );

    let report = synchronizer.synchronize_client(&client).await?;
    output_report(&cli.format, &report)
}

/// Credentials of the client to synchronize.
///
/// UMA_CLIENT_SECRET belongs to UMA_CLIENT_ID and is never paired with a
/// `--client-id` override.
fn client_credentials(
    cli: &Cli,
    configured_id: &str,
    configured_secret: Option<&str>,
) -> (String, Option<String>) {
    match &cli.client_id {
        Some(client_id) => (client_id.clone(), cli.client_secret.clone()),
        None => (
            configured_id.to_string(),
            configured_secret.map(|s| s.to_string()),
        ),
    }
}

fn output_report(format: &OutputFormat, report: &SyncReport) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Table => {
            for label in &report.created {
                println!("created   {}", label);
            }
            for label in &report.existing {
                println!("existing  {}", label);
            }
            for app in &report.skipped_apps {
                println!("skipped   {} (app)", app);
            }
            println!(
                "{} created, {} existing, {} apps skipped",
                report.created.len(),
                report.existing.len(),
                report.skipped_apps.len()
            );
        }
    }
    Ok(())
}
