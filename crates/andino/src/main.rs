// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Andino - tour-package sales backend.
//!
//! Binary entry point: loads configuration, then dispatches to the
//! requested subcommand.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use andino_core::types::Role;
use clap::{Parser, Subcommand};

mod serve;

/// Andino - tour-package sales backend.
#[derive(Parser, Debug)]
#[command(name = "andino", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server.
    Serve,
    /// Print the resolved configuration as TOML.
    Config,
    /// Create an account directly in the database. The API only registers
    /// clients; staff accounts are provisioned here.
    AddUser {
        email: String,
        full_name: String,
        /// client, sales_staff, or admin.
        #[arg(long, default_value = "client")]
        role: Role,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match andino_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            andino_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Config) => {
            match toml_of(&config) {
                Ok(rendered) => {
                    println!("{rendered}");
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Some(Commands::AddUser {
            email,
            full_name,
            role,
        }) => serve::run_add_user(config, &email, &full_name, role).await,
        None => {
            println!("andino: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("andino: {e}");
        std::process::exit(1);
    }
}

fn toml_of(config: &andino_config::AndinoConfig) -> Result<String, andino_core::AndinoError> {
    toml::to_string_pretty(config)
        .map_err(|e| andino_core::AndinoError::Config(format!("render config: {e}")))
}
