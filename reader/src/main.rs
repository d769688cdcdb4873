/*
reader - main.rs
Reads a list of URLs, extracts the readable article of each page and writes url/text rows to CSV.
*/

use anyhow::{Context, Result};
use clap::Parser;
use common::{Config, FailurePolicy};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use reader::Pipeline;

#[derive(Parser, Debug)]
#[command(name = "reader", about = "Extract readable article text from a list of URLs into CSV")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// URL list, one per line (overrides paths.input_path)
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// CSV destination (overrides paths.output_path)
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Fetch timeout in seconds (overrides fetch.timeout_seconds)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Failure policy: abort or record (overrides pipeline.on_error)
    #[arg(long, value_name = "POLICY")]
    on_error: Option<FailurePolicy>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI args
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = load_config(&args).await?;
    info!(
        input = %config.paths.input_path,
        output = %config.paths.output_path,
        timeout = ?config.fetch.timeout_seconds,
        policy = %config.pipeline.on_error,
        "configuration loaded"
    );

    let pipeline = Pipeline::from_config(&config).context("failed to set up pipeline")?;

    match pipeline
        .run(Path::new(&config.paths.input_path), Path::new(&config.paths.output_path))
        .await
    {
        Ok(summary) => {
            info!(
                rows = summary.rows_written,
                failures = summary.failures,
                output = %summary.output_path.display(),
                "run complete"
            );
            Ok(())
        }
        Err(e) => {
            error!(kind = e.kind(), %e, "run aborted, no results written");
            Err(e.into())
        }
    }
}

/// Merge `config.default.toml`, then `--config` (or `config.toml`), then CLI flags.
async fn load_config(args: &Args) -> Result<Config> {
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = args.config.clone() {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() { Some(p) } else { None }
    };

    let mut config = Config::load_with_defaults(
        if default_path.exists() { Some(&default_path) } else { None },
        override_path.as_deref(),
    )
    .await?;

    apply_overrides(args, &mut config);
    Ok(config)
}

/// CLI flags win over whatever the config files said.
fn apply_overrides(args: &Args, config: &mut Config) {
    if let Some(input) = &args.input {
        config.paths.input_path = input.to_string_lossy().into_owned();
    }
    if let Some(output) = &args.output {
        config.paths.output_path = output.to_string_lossy().into_owned();
    }
    if let Some(timeout) = args.timeout {
        config.fetch.timeout_seconds = Some(timeout);
    }
    if let Some(policy) = args.on_error {
        config.pipeline.on_error = policy;
    }
}
