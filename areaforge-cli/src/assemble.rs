//! Assemble command implementation for the areaforge CLI.

use std::io::{BufWriter, Write};

use areaforge_data::{AreaBuildSummary, AreaOptions, build_areas_from_pbf};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::{LevelFilter, info};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::geojson::write_feature_collection;
use crate::{
    ARG_LOG_LEVEL, ARG_MAX_SEGMENTS, ARG_OSM_PBF, ARG_OUTPUT, ARG_WORKERS, CliError, ENV_OSM_PBF,
};

/// Output path used when none is configured.
pub(crate) const DEFAULT_OUTPUT: &str = "areas.geojson";

/// CLI arguments for the `assemble` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Read an OpenStreetMap PBF extract twice, assemble every \
                 multipolygon and boundary relation and every closed area \
                 way into polygons, and write them as a GeoJSON feature \
                 collection. Options can come from CLI flags, configuration \
                 files, or environment variables.",
    about = "Assemble areas from an OSM PBF extract"
)]
#[ortho_config(prefix = "AREAFORGE")]
pub(crate) struct AssembleArgs {
    /// Path to the OpenStreetMap PBF file.
    #[arg(long = ARG_OSM_PBF, value_name = "path")]
    #[serde(default)]
    pub(crate) osm_pbf: Option<Utf8PathBuf>,
    /// Where to write the GeoJSON output (default `areas.geojson`).
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Worker threads used for assembly (default: available parallelism).
    #[arg(long = ARG_WORKERS, value_name = "count")]
    #[serde(default)]
    pub(crate) workers: Option<usize>,
    /// Skip areas with more segments than this.
    #[arg(long = ARG_MAX_SEGMENTS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_segments: Option<usize>,
    /// Log level filter (`off`, `error`, `warn`, `info`, `debug`, `trace`).
    #[arg(long = ARG_LOG_LEVEL, value_name = "level")]
    #[serde(default)]
    pub(crate) log_level: Option<String>,
}

impl AssembleArgs {
    pub(crate) fn into_config(self) -> Result<AssembleConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        AssembleConfig::try_from(merged)
    }
}

/// Resolved `assemble` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AssembleConfig {
    /// Path to the PBF extract.
    pub(crate) osm_pbf: Utf8PathBuf,
    /// Path of the GeoJSON output.
    pub(crate) output: Utf8PathBuf,
    /// Assembly options handed to the area builder.
    pub(crate) options: AreaOptions,
    /// Log level for the run.
    pub(crate) log_level: LevelFilter,
}

impl AssembleConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.osm_pbf, ARG_OSM_PBF)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match areaforge_fs::is_regular_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<AssembleArgs> for AssembleConfig {
    type Error = CliError;

    fn try_from(args: AssembleArgs) -> Result<Self, Self::Error> {
        let osm_pbf = args.osm_pbf.ok_or(CliError::MissingArgument {
            field: ARG_OSM_PBF,
            env: ENV_OSM_PBF,
        })?;
        let output = args
            .output
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT));

        let defaults = AreaOptions::default();
        let workers = match args.workers {
            Some(0) => {
                return Err(CliError::InvalidArgument {
                    field: ARG_WORKERS,
                    value: "0".to_owned(),
                    reason: "at least one worker is required",
                });
            }
            Some(count) => count,
            None => defaults.workers,
        };
        let max_segments = match args.max_segments {
            Some(0) => {
                return Err(CliError::InvalidArgument {
                    field: ARG_MAX_SEGMENTS,
                    value: "0".to_owned(),
                    reason: "the segment ceiling must be positive",
                });
            }
            other => other,
        };

        let log_level = match args.log_level {
            Some(level) => level
                .parse::<LevelFilter>()
                .map_err(|_| CliError::InvalidArgument {
                    field: ARG_LOG_LEVEL,
                    value: level.clone(),
                    reason: "expected off, error, warn, info, debug or trace",
                })?,
            None => LevelFilter::Info,
        };

        Ok(Self {
            osm_pbf,
            output,
            options: AreaOptions {
                workers,
                max_segments,
            },
            log_level,
        })
    }
}

/// Build areas for `config` and write them to its output path.
pub(crate) fn run_assemble(config: &AssembleConfig) -> Result<AreaBuildSummary, CliError> {
    info!("Assembling areas from {}", config.osm_pbf);
    let report = build_areas_from_pbf(&config.osm_pbf, &config.options)?;

    let file = areaforge_fs::create_output(&config.output).map_err(|source| {
        CliError::CreateOutput {
            path: config.output.clone(),
            source,
        }
    })?;
    let mut writer = BufWriter::new(file.into_std());
    write_feature_collection(&report.areas, &mut writer)
        .and_then(|()| writer.flush().map_err(serde_json::Error::io))
        .map_err(|source| CliError::WriteOutput {
            path: config.output.clone(),
            source,
        })?;

    info!("Wrote {} areas to {}", report.summary.built, config.output);
    Ok(report.summary)
}
