//! # Tierline CLI Module
//!
//! This module implements the CLI interface for Tierline.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `progress` - Show graduation progress of a creator
//! - `stats` - Show the dashboard stats of a creator
//! - `bonuses` - Show the bonus summary of a creator
//! - `contests` - List contests open to a creator
//! - `battles` - List upcoming battles of a creator
//! - `learning` - Show challenge and education progress
//! - `quiz` - Grade a quiz attempt (nothing is stored)
//! - `calc` - Compute progress from raw numbers
//! - `check` - Validate every creator in the snapshot (default)

mod commands;

use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tierline_core::{CreatorHandle, TierlineError};

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Tierline - Creator Progress Server
///
/// Graduation tiers, earnings and learning progress for creator dashboards.
#[derive(Parser, Debug)]
#[command(name = "tierline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the JSON snapshot (overrides [source] snapshot)
    #[arg(short, long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides [server] host)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides [server] port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show graduation progress
    Progress {
        /// Creator handle, with or without '@'
        handle: CreatorHandle,
    },

    /// Show dashboard stats
    Stats {
        /// Creator handle, with or without '@'
        handle: CreatorHandle,
    },

    /// Show bonus summary
    Bonuses {
        /// Creator handle, with or without '@'
        handle: CreatorHandle,
    },

    /// List open contests in the creator's region
    Contests {
        /// Creator handle, with or without '@'
        handle: CreatorHandle,
    },

    /// List upcoming battles
    Battles {
        /// Creator handle, with or without '@'
        handle: CreatorHandle,
    },

    /// Show challenge and education progress
    Learning {
        /// Creator handle, with or without '@'
        handle: CreatorHandle,
    },

    /// Grade a quiz attempt
    Quiz {
        /// Creator handle, with or without '@'
        handle: CreatorHandle,

        /// Video number
        #[arg(long)]
        video: u32,

        /// Chosen option per question (comma-separated, zero-based)
        #[arg(long, value_delimiter = ',')]
        answers: Vec<usize>,

        /// Record this watch percentage before grading
        #[arg(long)]
        watched: Option<u8>,
    },

    /// Compute progress from raw numbers
    Calc {
        /// Lifetime diamonds (omitted or negative counts as 0)
        #[arg(long, allow_negative_numbers = true)]
        total: Option<i64>,

        /// Silver target (0 or omitted uses the default)
        #[arg(long, allow_negative_numbers = true)]
        silver: Option<i64>,

        /// Gold target (0 or omitted uses the default)
        #[arg(long, allow_negative_numbers = true)]
        gold: Option<i64>,

        /// Display label override
        #[arg(long)]
        label: Option<String>,
    },

    /// Validate every creator in the snapshot
    Check,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), TierlineError> {
    let config = AppConfig::load_or_default(cli.config.as_deref())?;
    let ctx = CommandContext {
        config,
        snapshot: cli.snapshot,
        json_mode: cli.json_mode,
        verbose: cli.verbose,
    };

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(&ctx, host, port).await,
        Some(Commands::Progress { handle }) => cmd_progress(&ctx, handle),
        Some(Commands::Stats { handle }) => cmd_stats(&ctx, handle),
        Some(Commands::Bonuses { handle }) => cmd_bonuses(&ctx, handle),
        Some(Commands::Contests { handle }) => cmd_contests(&ctx, handle),
        Some(Commands::Battles { handle }) => cmd_battles(&ctx, handle),
        Some(Commands::Learning { handle }) => cmd_learning(&ctx, handle),
        Some(Commands::Quiz {
            handle,
            video,
            answers,
            watched,
        }) => cmd_quiz(&ctx, handle, video, &answers, watched),
        Some(Commands::Calc {
            total,
            silver,
            gold,
            label,
        }) => cmd_calc(&ctx, total, silver, gold, label),
        Some(Commands::Check) | None => cmd_check(&ctx),
    }
}

// =============================================================================
// TESTS
// =============================================================================
