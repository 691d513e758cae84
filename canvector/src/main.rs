/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use canvector::config::AppConfig;
use canvector::console;
use canvector::simulation::{Simulation, SimulationControl};
use canvector::store::{MessageEdit, StoreError};

// ── CLI argument definition ───────────────────────────────────────────────────

/// CAN message generator.
///
/// Messages are kept in a CSV database and can be sent on trigger or
/// periodically on every scheduler tick.
///
/// Example:
///   canvector add --name Heartbeat --id 0x100 --payload "0x01 0x02"
///   canvector modify 0 --periodic true
///   canvector run
#[derive(Debug, Parser)]
#[command(
    name = "canvector",
    version,
    about = "CAN message generator – send frames on trigger or periodically",
    long_about = None,
)]
struct Cli {
    /// Path to the message database CSV file (overrides the config file).
    #[arg(short = 'd', long = "db", global = true)]
    db: Option<PathBuf>,

    /// Path to the YAML runtime configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the message table.
    List,

    /// Add a message.
    Add {
        #[arg(long, default_value = "")]
        name: String,
        /// Identifier, e.g. 0x567.
        #[arg(long)]
        id: String,
        /// Space separated bytes, e.g. "0x50 0x40 0x30".
        #[arg(long)]
        payload: String,
    },

    /// Delete the message at INDEX.
    Delete { index: usize },

    /// Change the message at INDEX.  Omitted fields keep their value.
    Modify {
        index: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        payload: Option<String>,
        /// Send this message on every scheduler tick.
        #[arg(long)]
        periodic: Option<bool>,
    },

    /// Open the CAN channel and send the message at INDEX once.
    Send { index: usize },

    /// Open the CAN channel, run the scheduler, and read commands from stdin.
    Run,
}

/// Exit code for input the store refused.
const EXIT_REJECTED: u8 = 2;

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    // Initialise structured logging.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<ExitCode> {
    // ── Load configuration ────────────────────────────────────────────────────
    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::default(),
    }
    .with_database(cli.db.clone());

    info!(
        database  = %config.database.display(),
        tick_ms   = config.tick.as_millis() as u64,
        interface = %config.transport.interface,
        channel   = config.transport.channel,
        bitrate   = config.transport.bitrate,
        "Configuration"
    );

    let sim = Simulation::from_config(&config)?;

    match cli.command {
        Command::List => {
            console::render_table(&sim.get_all(), &mut std::io::stdout().lock())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Add { name, id, payload } => {
            let outcome = sim.add(&name, &id, &payload).map(|index| {
                println!("added message {index}");
            });
            store_outcome(outcome)
        }
        Command::Delete { index } => {
            let outcome = sim.delete(index).map(|removed| {
                println!("deleted message {index} ({})", removed.id);
            });
            store_outcome(outcome)
        }
        Command::Modify {
            index,
            name,
            id,
            payload,
            periodic,
        } => {
            let edit = MessageEdit {
                name,
                id,
                payload,
                periodic_enabled: periodic,
            };
            let outcome = console::apply_edit(&sim, index, &edit)
                .map(|()| println!("modified message {index}"));
            store_outcome(outcome)
        }
        Command::Send { index } => {
            sim.set_enabled(true);
            match sim.trigger(index) {
                Ok(true) => {
                    println!("sent message {index}");
                    Ok(ExitCode::SUCCESS)
                }
                Ok(false) => Ok(ExitCode::FAILURE),
                Err(e) => {
                    eprintln!("{e}");
                    Ok(ExitCode::from(EXIT_REJECTED))
                }
            }
        }
        Command::Run => run_console(sim).await,
    }
}

/// Map a store result onto an exit code; storage failures propagate.
fn store_outcome(outcome: Result<(), StoreError>) -> Result<ExitCode> {
    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => match rejection_code(&e) {
            Some(code) => {
                eprintln!("{e}");
                Ok(ExitCode::from(code))
            }
            None => Err(e.into()),
        },
    }
}

/// Exit code for an error caused by the user's input; `None` for storage
/// failures.
fn rejection_code(e: &StoreError) -> Option<u8> {
    match e {
        StoreError::Invalid(_) | StoreError::IndexOutOfRange { .. } => Some(EXIT_REJECTED),
        _ => None,
    }
}

// ── Interactive console ───────────────────────────────────────────────────────

async fn run_console(mut sim: Simulation) -> Result<ExitCode> {
    sim.start();

    println!("canvector {}", canvector::VERSION);
    println!("{}", console::HELP);

    // Stdin is read on a plain thread: a read blocked at Ctrl-C must not keep
    // the runtime from shutting down.
    let mut lines = console::spawn_line_reader(std::io::BufReader::new(std::io::stdin()))?;
    let outcome = console::drive(&sim, &mut lines, interrupted(), &mut std::io::stdout()).await;

    sim.shutdown().await;
    outcome?;
    info!("Bye");
    Ok(ExitCode::SUCCESS)
}

/// Resolves on Ctrl-C.  Never resolves if the signal cannot be watched.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
