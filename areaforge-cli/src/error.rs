//! Error types emitted by the areaforge CLI.
//!
//! Many helpers return `Result<_, CliError>` and the workspace enables
//! `clippy::result_large_err`, so variants box or reference large payloads.

use std::sync::Arc;

use areaforge_data::AreaBuildError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors emitted by the areaforge CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name of the missing option.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// An option holds a value outside its accepted range.
    #[error("invalid {field} value {value:?}: {reason}")]
    InvalidArgument {
        /// Flag name of the offending option.
        field: &'static str,
        /// Value as supplied.
        value: String,
        /// What the option accepts.
        reason: &'static str,
    },
    /// A referenced input path does not exist.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag name of the input.
        field: &'static str,
        /// Path as configured.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Flag name of the input.
        field: &'static str,
        /// Path as configured.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag name of the input.
        field: &'static str,
        /// Path as configured.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Building areas from the input failed.
    #[error("failed to build areas: {0}")]
    BuildAreas(#[from] AreaBuildError),
    /// The output file could not be created.
    #[error("failed to create output {path:?}: {source}")]
    CreateOutput {
        /// Output path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Writing GeoJSON to the output failed.
    #[error("failed to write GeoJSON to {path:?}: {source}")]
    WriteOutput {
        /// Output path.
        path: Utf8PathBuf,
        /// Underlying serialisation or IO failure.
        #[source]
        source: serde_json::Error,
    },
}
