//! Binary entry point for meetingbaas-mcp.
//!
//! Runs the MCP server on stdio, or the analysis tools directly from the
//! command line.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use meetingbaas_mcp::MeetingBaasConfig;
use meetingbaas_mcp::observability::{self, InitOptions};
use std::path::PathBuf;
use std::process::ExitCode;

/// meetingbaas-mcp - MeetingBaaS recordings for AI assistants.
#[derive(Parser)]
#[command(name = "meetingbaas-mcp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server on stdio.
    Serve {
        /// Maximum requests per rate limit window.
        #[arg(long)]
        rate_limit_max: Option<usize>,

        /// Rate limit window in seconds.
        #[arg(long)]
        rate_limit_window: Option<u64>,
    },

    /// Find key moments in a recorded meeting.
    Moments {
        /// Bot ID of the recording.
        bot_id: String,

        /// Topic to look for (repeatable).
        #[arg(short, long = "topic")]
        topics: Vec<String>,

        /// Maximum number of moments.
        #[arg(short, long, default_value = "5")]
        max: usize,

        /// Level of detail: low, medium, or high.
        #[arg(short, long, default_value = "medium")]
        granularity: String,

        /// Detect topics in addition to the supplied ones.
        #[arg(long)]
        auto_detect: bool,
    },

    /// Search meetings with a natural-language query.
    Search {
        /// The search query.
        query: String,

        /// Restrict to one recording.
        #[arg(long)]
        bot_id: Option<String>,

        /// Restrict to a meeting type.
        #[arg(long)]
        meeting_type: Option<String>,

        /// Restrict to a speaker.
        #[arg(long)]
        speaker: Option<String>,

        /// Search the recordings of a calendar.
        #[arg(long)]
        calendar_id: Option<String>,

        /// Maximum number of results.
        #[arg(short, long)]
        max: Option<usize>,

        /// Result ordering: relevance, date, or speaker.
        #[arg(short, long, default_value = "relevance")]
        sort: String,

        /// Omit neighboring segments around matches.
        #[arg(long)]
        no_context: bool,
    },

    /// Show configuration.
    Config {
        /// Show current configuration.
        #[arg(long)]
        show: bool,
    },
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match MeetingBaasConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let expose_metrics = matches!(cli.command, Commands::Serve { .. });
    let _observability = match observability::init_from_config(
        &config,
        InitOptions {
            verbose: cli.verbose,
            metrics_expose: expose_metrics,
        },
    ) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to initialize observability: {e}");
            return ExitCode::FAILURE;
        },
    };

    match run_command(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
async fn run_command(command: Commands, config: MeetingBaasConfig) -> anyhow::Result<()> {
    match command {
        Commands::Serve {
            rate_limit_max,
            rate_limit_window,
        } => commands::cmd_serve(&config, rate_limit_max, rate_limit_window).await,

        Commands::Moments {
            bot_id,
            topics,
            max,
            granularity,
            auto_detect,
        } => {
            commands::cmd_moments(
                &config,
                commands::MomentsArgs {
                    bot_id,
                    topics,
                    max,
                    granularity,
                    auto_detect,
                },
            )
            .await
        },

        Commands::Search {
            query,
            bot_id,
            meeting_type,
            speaker,
            calendar_id,
            max,
            sort,
            no_context,
        } => {
            commands::cmd_search(
                &config,
                commands::SearchArgs {
                    query,
                    bot_id,
                    meeting_type,
                    speaker,
                    calendar_id,
                    max,
                    sort,
                    include_context: !no_context,
                },
            )
            .await
        },

        Commands::Config { show } => commands::cmd_config(&config, show),
    }
}
