//! Attune CLI Application
//!
//! Command-line interface for the Attune plan progression engine.

mod args;
mod cli;
mod mcp;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use attune_core::{params::ListPlans, ProgressionBuilder};
use clap::Parser;
use cli::Cli;
use log::info;
use mcp::{run_stdio_server, AttuneMcpServer};
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        command,
    } = Args::parse();

    let engine = ProgressionBuilder::new()
        .with_database_path(database_file)
        .build()
        .await
        .context("Failed to initialize progression engine")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("Attune started");

    match command {
        Some(Plan { command }) => Cli::new(engine, renderer).handle_plan_command(command).await,
        Some(Stage { command }) => {
            Cli::new(engine, renderer)
                .handle_stage_command(command)
                .await
        }
        Some(Serve) => {
            info!("Starting Attune MCP server");
            run_stdio_server(AttuneMcpServer::new(engine))
                .await
                .context("MCP server failed")
        }
        None => {
            Cli::new(engine, renderer)
                .list_plans(&ListPlans { completed: false })
                .await
        }
    }
}
