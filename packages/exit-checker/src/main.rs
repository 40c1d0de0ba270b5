//! Checkpoint Bridge Exit Checker
//!
//! Command line front end for [`exit_checker::checker`].
//!
//! # Commands
//!
//! - `check`: verify a hex-encoded exit proof against exported checkpoint
//!   headers and validate the proven log as a burn by `--withdrawer`
//! - `decode`: print the fields of a hex-encoded exit proof as JSON

use std::path::PathBuf;

use alloy_primitives::Address;
use bridge::AssetTypeTag;
use clap::{Parser, Subcommand};
use eyre::{eyre, Result};
use tracing::{debug, info};

use exit_checker::checker;
use exit_checker::config::{Config, LogFormat};

#[derive(Parser)]
#[command(name = "exit-checker")]
#[command(about = "Offline verifier for checkpoint bridge exit proofs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read variables from this file instead of searching for `.env`
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify an exit proof and validate its burn log
    Check {
        /// Wire-encoded exit proof as hex
        #[arg(short, long)]
        proof: String,

        /// Account expected to have burned on child
        #[arg(short, long)]
        withdrawer: Address,

        /// Asset class of the burned token (e.g. fungible, erc721)
        #[arg(short, long)]
        asset_type: AssetTypeTag,

        /// JSON array of checkpoint headers (falls back to CHECKPOINTS_FILE)
        #[arg(short, long)]
        checkpoints: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode an exit proof without verifying it
    Decode {
        /// Wire-encoded exit proof as hex
        #[arg(short, long)]
        proof: String,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = match &cli.env_file {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    init_logging(config.log_format, cli.verbose);
    if let Some(path) = &config.env_file {
        debug!("Loaded .env from {:?}", path);
    }

    match cli.command {
        Commands::Check {
            proof,
            withdrawer,
            asset_type,
            checkpoints,
            json,
        } => {
            let path = checkpoints
                .or(config.checkpoints_file)
                .ok_or_else(|| eyre!("--checkpoints or CHECKPOINTS_FILE required"))?;
            let store = checker::load_checkpoints(&path)?;
            info!(path = %path.display(), count = store.len(), "Checkpoints loaded");

            let proof = checker::parse_proof(&proof)?;
            let report = checker::check_exit(&store, &proof, withdrawer, asset_type);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.to_text());
            }

            if !report.valid {
                std::process::exit(1);
            }
        }

        Commands::Decode { proof } => {
            let proof = checker::parse_proof(&proof)?;
            let summary = serde_json::json!({
                "exit_id": proof.exit_id(),
                "block_leaf": proof.block_leaf(),
                "proof": proof,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn init_logging(format: LogFormat, verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose {
        "debug"
    } else {
        "info,exit_checker=debug"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Reports go to stdout; keep logs on stderr
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
    }
}
