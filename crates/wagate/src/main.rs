// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wagate - a multi-tenant WhatsApp messaging gateway.
//!
//! This is the binary entry point.

mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wagate_config::{ConfigError, WagateConfig};

/// Wagate - a multi-tenant WhatsApp messaging gateway.
#[derive(Parser, Debug)]
#[command(name = "wagate", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gateway server.
    Serve,
    /// Validate the configuration and exit.
    CheckConfig,
}

fn load_config(path: Option<&PathBuf>) -> Result<WagateConfig, Vec<ConfigError>> {
    match path {
        Some(path) => wagate_config::load_and_validate_path(path),
        None => wagate_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            wagate_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("wagate: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::CheckConfig) => {
            println!(
                "wagate: config ok ({} instance(s), listening on {}:{})",
                config.instances.len(),
                config.server.host,
                config.server.port
            );
        }
        None => {
            println!("wagate: use --help for available commands");
        }
    }
}
