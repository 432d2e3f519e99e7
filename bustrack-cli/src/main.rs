//! BusTrack CLI
//!
//! Command-line front end to the BusTrack engine: distances, one-shot ETAs,
//! replaying location records through a monitoring session and replaying
//! scanner events through the conductor pairing flow.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use bustrack::config::ConfigFile;
use bustrack::geo::Coordinate;
use bustrack::logging::init_logging;
use bustrack::proximity::AlertRadius;
use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::eta::EtaArgs;
use commands::monitor::MonitorArgs;
use commands::pair::PairArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "bustrack", version, about = "Bus proximity alerts, ETAs and conductor pairing")]
struct Cli {
    /// Log at debug level (overrides logging.level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Great-circle distance between two points
    Distance {
        /// First point as lat,lng
        #[arg(allow_hyphen_values = true)]
        from: Coordinate,
        /// Second point as lat,lng
        #[arg(allow_hyphen_values = true)]
        to: Coordinate,
    },

    /// Estimate when a bus reaches the rider
    Eta {
        /// Rider position as lat,lng
        #[arg(long, allow_hyphen_values = true)]
        rider: Coordinate,
        /// Bus position as lat,lng
        #[arg(long, allow_hyphen_values = true)]
        bus: Coordinate,
        /// Bus speed in km/h
        #[arg(long)]
        speed: f64,
        /// The bus has an active emergency
        #[arg(long)]
        emergency: bool,
        /// Use straight-line distance instead of the routing API
        #[arg(long)]
        offline: bool,
    },

    /// Replay location records (JSON Lines) through a monitoring session
    Monitor {
        /// File of location records, one JSON object per line
        records: PathBuf,
        /// Bus the records belong to
        #[arg(long)]
        bus: String,
        /// Rider position as lat,lng
        #[arg(long, allow_hyphen_values = true)]
        rider: Coordinate,
        /// Alert radius in meters (1000, 3000 or 5000); remembered
        #[arg(long)]
        radius: Option<AlertRadius>,
        /// Use straight-line distance instead of the routing API
        #[arg(long)]
        offline: bool,
        /// Acknowledge each alert as soon as it fires
        #[arg(long)]
        auto_ack: bool,
    },

    /// Replay scanner events (JSON Lines) through the pairing flow
    Pair {
        /// File of scan events, one JSON object per line
        scans: PathBuf,
        /// Bus to pair
        #[arg(long)]
        bus: String,
        /// JSON array of conductors: [{"id": "...", "name": "..."}]
        #[arg(long)]
        conductors: PathBuf,
        /// Accept the first verified conductor
        #[arg(long)]
        confirm: bool,
        /// Display size in pixels as WIDTHxHEIGHT
        #[arg(long, default_value = "1080x1920", value_parser = parse_display)]
        display: (f64, f64),
    },

    /// View or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn parse_display(s: &str) -> Result<(f64, f64), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w: f64 = w.trim().parse().map_err(|_| format!("invalid width '{}'", w))?;
    let h: f64 = h.trim().parse().map_err(|_| format!("invalid height '{}'", h))?;
    if w <= 0.0 || h <= 0.0 {
        return Err("display size must be positive".to_string());
    }
    Ok((w, h))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = ConfigFile::load()?;

    let logging = if cli.verbose {
        config.logging.clone().with_level("debug")
    } else {
        config.logging.clone()
    };
    let _guard = match init_logging(&logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        }
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    match cli.command {
        Commands::Distance { from, to } => commands::distance::run(from, to),
        Commands::Eta {
            rider,
            bus,
            speed,
            emergency,
            offline,
        } => runtime.block_on(commands::eta::run(
            &config,
            EtaArgs {
                rider,
                bus,
                speed_kmh: speed,
                emergency,
                offline,
            },
        )),
        Commands::Monitor {
            records,
            bus,
            rider,
            radius,
            offline,
            auto_ack,
        } => runtime.block_on(commands::monitor::run(
            &config,
            MonitorArgs {
                records,
                bus_id: bus,
                rider,
                radius,
                offline,
                auto_acknowledge: auto_ack,
            },
        )),
        Commands::Pair {
            scans,
            bus,
            conductors,
            confirm,
            display,
        } => runtime.block_on(commands::pair::run(
            &config,
            PairArgs {
                scans,
                bus_id: bus,
                conductors,
                confirm,
                display,
            },
        )),
        Commands::Config { command } => commands::config::run(command),
    }
}
