//! Entry point: parse CLI and dispatch to command handlers.

use anyhow::Context;
use clap::Parser;
use fantasy_rooms::{
    cli::{Cli, Commands, SyncCmd},
    commands::{
        admin::handle_diagnostics,
        common::CommandContext,
        settle::{handle_recalculate_totals, handle_settle},
        sync::{handle_sync_bootstrap, handle_sync_fixtures, handle_sync_player_stats},
    },
    server, telemetry, AppConfig,
};

/// Run the CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing();

    let config = AppConfig::from_env()
        .context("failed to load configuration")?
        .with_db_path(cli.db);

    match cli.command {
        Commands::Serve => server::run(config).await.context("HTTP server failed")?,
        command => {
            let mut ctx = CommandContext::new(config, cli.verbose)
                .context("failed to open database or build HTTP client")?;
            run_command(&mut ctx, command, cli.verbose).await?
        }
    }

    Ok(())
}

async fn run_command(ctx: &mut CommandContext, command: Commands, verbose: bool) -> anyhow::Result<()> {
    match command {
        Commands::Sync { cmd } => match cmd {
            SyncCmd::Bootstrap { refresh } => handle_sync_bootstrap(ctx, refresh, verbose).await?,
            SyncCmd::Fixtures { gameweek, source } => {
                handle_sync_fixtures(ctx, gameweek, source, verbose).await?
            }
            SyncCmd::PlayerStats { gameweek } => {
                handle_sync_player_stats(ctx, gameweek, verbose).await?
            }
        },

        Commands::Settle { gameweek, force } => handle_settle(ctx, gameweek, force, verbose)?,

        Commands::RecalculateTotals => handle_recalculate_totals(ctx)?,

        Commands::Diagnostics { json } => handle_diagnostics(ctx, json)?,

        // served by the caller before a command context is opened
        Commands::Serve => {}
    }

    Ok(())
}
