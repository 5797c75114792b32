mod config;
mod logging;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use vet_dosage_core::units::{convert_dose, convert_weight};
use vet_dosage_core::{DosageCalculationInput, DosageCalculator, DosageError, Unit};

use crate::config::Config;

/// Exit status for a calculation the engine refused.
const CALCULATION_ERROR_EXIT: u8 = 2;

#[derive(Parser)]
#[command(name = "vet-dosage")]
#[command(about = "Veterinary dosage calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate a dose from a JSON input document
    Calculate {
        /// Input JSON file, or "-" for stdin
        #[arg(short, long)]
        input: PathBuf,

        /// Override the display unit (mg, ml, tablets)
        #[arg(long)]
        unit: Option<String>,

        /// Override the administration route
        #[arg(long)]
        route: Option<String>,

        /// Print compact JSON instead of pretty JSON
        #[arg(long)]
        compact: bool,
    },

    /// Convert a weight between kg, lbs, g and oz
    ConvertWeight { value: f64, from: String, to: String },

    /// Convert a dose between mg, mcg, g and ml
    ConvertDose {
        value: f64,
        from: String,
        to: String,

        /// Concentration in mg/mL, required for ml conversions
        #[arg(long)]
        concentration: Option<f64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_with_level(logging::default_level(cli.verbose));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<DosageError>() {
            Some(calc_err) => {
                eprintln!("error: {}", calc_err);
                ExitCode::from(CALCULATION_ERROR_EXIT)
            }
            None => {
                eprintln!("error: {:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Calculate {
            input,
            unit,
            route,
            compact,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            let mut request = read_input(&input)?;
            if unit.is_some() {
                request.target_unit = unit;
            }
            if route.is_some() {
                request.route = route;
            }

            info!(medication = %request.medication.id, "calculating dose");
            let calculator = DosageCalculator::with_policy(config.safety);
            let result = calculator.calculate(&request)?;

            let output = if compact {
                serde_json::to_string(&result)?
            } else {
                serde_json::to_string_pretty(&result)?
            };
            println!("{}", output);
        }

        Commands::ConvertWeight { value, from, to } => {
            let from: Unit = from.parse()?;
            let to: Unit = to.parse()?;
            let converted = convert_weight(value, from, to)?;
            println!("{} {}", converted, to);
        }

        Commands::ConvertDose {
            value,
            from,
            to,
            concentration,
        } => {
            let from: Unit = from.parse()?;
            let to: Unit = to.parse()?;
            let converted = convert_dose(value, from, to, concentration)?;
            println!("{} {}", converted, to);
        }
    }

    Ok(())
}

/// Read a calculation input from a file or stdin.
fn read_input(path: &Path) -> Result<DosageCalculationInput> {
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading input from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading input file {}", path.display()))?
    };

    serde_json::from_str(&contents)
        .with_context(|| format!("parsing input JSON from {}", path.display()))
}
