//! Submit the Drive agent for managed deployment.

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use drive_agent_tools::agent::AgentDefinition;
use owo_colors::OwoColorize as _;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod error;
mod package;
mod requirements;

use crate::api::{ApiClient, deployment_id};
use crate::config::DeployArgs;
use crate::error::DeployError;

const RULE_WIDTH: usize = 60;

/// Package the Drive agent and submit a create-deployment request.
#[derive(Debug, Parser)]
#[command(name = "drive-agent-deploy", version, about)]
struct Cli {
    #[command(flatten)]
    deploy: DeployArgs,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Plain,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Values from `.env` never override the real environment.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);

    match run(cli.deploy).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(deploy) = e.downcast_ref::<DeployError>() {
                println!("Error: {deploy}");
            } else {
                eprintln!("error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Plain => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(args: DeployArgs) -> anyhow::Result<()> {
    let cfg = args.resolve()?;

    let agent = AgentDefinition::google_drive_agent();
    agent.validate().map_err(DeployError::from)?;
    println!("Loaded agent definition '{}'", agent.name);

    let requirements = requirements::read_requirements(&cfg.requirements)?;
    println!("Found requirements: {requirements:?}");

    println!(
        "Preparing deployment for project '{}' in '{}' with staging bucket '{}'...",
        cfg.project, cfg.location, cfg.staging_bucket
    );
    println!("Packaging extra files: {:?}", package::EXTRA_PACKAGES);
    let request = package::build_request(&cfg, agent, requirements);

    if args.dry_run {
        let body = serde_json::to_string_pretty(&request).context("serialize deployment request")?;
        println!("{body}");
        return Ok(());
    }

    let token = args
        .access_token
        .filter(|t| !t.is_empty())
        .context("missing deployment API token (set GOOGLE_CLOUD_ACCESS_TOKEN or --access-token)")?;

    println!(
        "Deploying Agent Engine with display name: '{}'",
        cfg.display_name
    );
    info!(api_base = %cfg.api_base, project = %cfg.project, location = %cfg.location, "submitting deployment");
    let client = ApiClient::new(cfg.api_base.clone(), token);
    let op = client
        .create_reasoning_engine(&cfg.project, &cfg.location, &request)
        .await?;
    debug!(operation = %op.name, done = op.done, "create operation accepted");

    let resource_name = op.resource_name();
    let rule = "=".repeat(RULE_WIDTH);
    println!("\n{rule}");
    println!("{}", "Deployment submitted successfully!".green());
    println!("Please wait a few minutes for the deployment to complete.");
    println!("The Reasoning Engine resource name is: {resource_name}");
    println!("You will need the ID part of this name for the final registration step.");
    println!("{rule}\n");

    match deployment_id(resource_name) {
        Some(id) => println!("Extracted ADK_DEPLOYMENT_ID: {id}"),
        None => println!(
            "Could not automatically extract deployment ID. Please copy it from the resource name above."
        ),
    }
    Ok(())
}
