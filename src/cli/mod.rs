//! CLI argument definitions and parsing.

pub mod types;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::sync::FixtureSource;
use types::Gameweek;

#[derive(Debug, Subcommand)]
pub enum SyncCmd {
    /// Upsert teams and players from the FPL bootstrap feed.
    ///
    /// The raw feed is cached on disk and reused unless `--refresh` is given.
    Bootstrap {
        /// Force a fresh download, overwriting the cache.
        #[clap(long)]
        refresh: bool,
    },

    /// Upsert fixtures and results for one gameweek
    Fixtures {
        /// Gameweek (1-38).
        #[clap(long, short)]
        gameweek: Gameweek,

        /// Provider to read fixtures from: `fpl` or `football-data`.
        #[clap(long, default_value_t = FixtureSource::default())]
        source: FixtureSource,
    },

    /// Fetch per-player stats in rate-limited batches and store scoring events
    PlayerStats {
        /// Gameweek (1-38).
        #[clap(long, short)]
        gameweek: Gameweek,
    },
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve,

    /// Pull external football data into the database
    Sync {
        #[clap(subcommand)]
        cmd: SyncCmd,
    },

    /// Score submitted lineups.
    ///
    /// Without `--gameweek`, every finished gameweek with unsettled lineups
    /// is settled.
    Settle {
        #[clap(long, short)]
        gameweek: Option<Gameweek>,

        /// Settle even if some fixtures are unfinished.
        #[clap(long)]
        force: bool,
    },

    /// Rebuild running totals from settled lineup scores
    RecalculateTotals,

    /// Print data-health counters
    Diagnostics {
        /// Output as JSON instead of text lines.
        #[clap(long)]
        json: bool,
    },
}

#[derive(Debug, Parser)]
#[clap(name = "fantasy-rooms", about = "Fantasy football rooms backend")]
pub struct Cli {
    /// Database path (or set `FANTASY_DB_PATH` env var).
    #[clap(long, global = true)]
    pub db: Option<PathBuf>,

    /// Print progress while commands run.
    #[clap(long, short, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Commands,
}
