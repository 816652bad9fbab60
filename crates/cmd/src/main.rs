// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::{Parser, Subcommand};
use snafu::{ResultExt, Whatever};
use tracing::{Level, info};

mod command_funnel;
mod command_query;
mod common;

#[derive(Debug, Parser)]
#[command(
    name = "keen",
    about = "Build and run Keen analysis queries",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log level
    #[arg(short, long, global = true, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build or run a funnel analysis
    Funnel(command_funnel::FunnelArgs),
    /// Build or run a single analysis
    Query(command_query::QueryArgs),
}

#[tokio::main]
async fn main() -> Result<(), Whatever> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    // Start configuring a `fmt` subscriber
    let subscriber = tracing_subscriber::fmt()
    // Use a more compact, abbreviated log format
    .compact()
    // Display source code file paths
    .with_file(true)
    // Display source code line numbers
    .with_line_number(true)
    // Don't display the event's target (module path)
    .with_target(false)
    // Keep stdout for the request or result
    .with_writer(std::io::stderr)
    .with_max_level(cli.log_level)
    // Build the subscriber
    .finish();
    tracing::subscriber::set_global_default(subscriber)
        .whatever_context("Failed to set global default subscriber")?;

    info!("Starting keen version {}", env!("CARGO_PKG_VERSION"));

    // Execute the selected command
    match cli.command {
        Commands::Funnel(args) => {
            command_funnel::run(args).await?;
        }
        Commands::Query(args) => {
            command_query::run(args).await?;
        }
    }
    Ok(())
}
