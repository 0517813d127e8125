//! Headless Netline match runner.
//!
//! Plays a scenario bot-vs-bot without a client and streams the broadcast
//! channel to stdout as JSON lines.
//!
//! # Usage
//!
//! ```bash
//! # Play the built-in test ground for up to 200 turns
//! cargo run -p netline_headless -- run
//!
//! # Play a scenario, drawing the map on stderr after every turn
//! cargo run -p netline_headless -- run --scenario scenarios/crossfire.txt --turns 80 --ascii
//!
//! # Validate a scenario and print its summary
//! cargo run -p netline_headless -- validate --scenario scenarios/test_ground.ron
//! ```

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use netline_headless::runner::{DEFAULT_MAX_TURNS, DEFAULT_SESSION_ID};
use netline_headless::{
    load_scenario, render_ascii, summarize, AsciiConfig, HeadlessConfig, HeadlessError,
    HeadlessRunner, JsonLinesSink,
};

#[derive(Parser)]
#[command(name = "netline-headless")]
#[command(about = "Headless match runner for Netline")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scenario bot-vs-bot
    Run {
        /// Scenario file (RON, or ASCII rows in a .txt/.map file)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Stop after this many turns
        #[arg(short, long, default_value_t = DEFAULT_MAX_TURNS)]
        turns: u32,

        /// Draw the map on stderr after every turn
        #[arg(long)]
        ascii: bool,

        /// Disable ANSI colours in ASCII frames
        #[arg(long)]
        no_color: bool,

        /// Route through the local channel instead of broadcasting
        #[arg(long)]
        local: bool,

        /// Session id
        #[arg(long, default_value = DEFAULT_SESSION_ID)]
        session_id: String,
    },

    /// Check a scenario file and print its summary
    Validate {
        /// Scenario file
        #[arg(short, long)]
        scenario: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries JSON
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(true),
        )
        .init();

    let result = match cli.command {
        Commands::Run {
            scenario,
            turns,
            ascii,
            no_color,
            local,
            session_id,
        } => cmd_run(
            HeadlessConfig {
                scenario_path: scenario,
                max_turns: turns,
                session_id,
                local,
            },
            ascii.then_some(AsciiConfig {
                use_color: !no_color,
                ..AsciiConfig::default()
            }),
        ),
        Commands::Validate { scenario } => cmd_validate(&scenario),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

/// Play one match, streaming broadcasts and finishing with the report.
fn cmd_run(config: HeadlessConfig, ascii: Option<AsciiConfig>) -> Result<(), HeadlessError> {
    tracing::info!(
        scenario = ?config.scenario_path,
        turns = config.max_turns,
        local = config.local,
        "Starting headless run"
    );

    let runner = HeadlessRunner::with_config(config);
    let mut sink = JsonLinesSink::new(io::stdout().lock());
    let report = runner.run(&mut sink, |session| {
        if let Some(ascii) = &ascii {
            eprintln!("{}", render_ascii(session, ascii));
        }
    })?;
    drop(sink);

    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

/// Load a scenario and print its summary.
fn cmd_validate(path: &std::path::Path) -> Result<(), HeadlessError> {
    let template = load_scenario(path)?;
    let summary = summarize(&template);
    tracing::info!(scenario = %summary.name, teams = summary.teams.len(), "Scenario is valid");
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
