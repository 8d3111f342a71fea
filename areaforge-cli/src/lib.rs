//! Command-line interface for areaforge's offline area assembly.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod assemble;
mod error;
mod geojson;
mod logging;

pub use error::CliError;

use assemble::{AssembleArgs, AssembleConfig};

const ARG_OSM_PBF: &str = "osm-pbf";
const ARG_OUTPUT: &str = "output";
const ARG_WORKERS: &str = "workers";
const ARG_MAX_SEGMENTS: &str = "max-segments";
const ARG_LOG_LEVEL: &str = "log-level";
const ENV_OSM_PBF: &str = "AREAFORGE_CMDS_ASSEMBLE_OSM_PBF";

/// Run the areaforge CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, the
/// input cannot be read or the output cannot be written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Assemble(args) => {
            let config = resolve_assemble_config(args)?;
            logging::init(config.log_level);
            assemble::run_assemble(&config)?;
        }
    }
    Ok(())
}

fn resolve_assemble_config(args: AssembleArgs) -> Result<AssembleConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

#[derive(Debug, Parser)]
#[command(
    name = "areaforge",
    about = "Assemble polygon areas from OpenStreetMap extracts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build areas from an OSM PBF file and write them as GeoJSON.
    Assemble(AssembleArgs),
}

#[cfg(test)]
mod tests;
