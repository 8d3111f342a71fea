//! Test helpers for preparing assemble inputs and layered overrides.

use super::*;
use crate::assemble::AssembleArgs;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Clone, Default)]
pub(super) struct LayerOverrides {
    pub(super) output: Option<Utf8PathBuf>,
    pub(super) workers: Option<usize>,
}

#[derive(Debug)]
pub(super) struct ExtractFiles {
    _dir: TempDir,
    root: Utf8PathBuf,
    extract: Utf8PathBuf,
}

impl ExtractFiles {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let extract = root.join("empty.osm.pbf");
        Self {
            _dir: dir,
            root,
            extract,
        }
    }

    /// Write a zero-length extract, which decodes to no entities.
    pub(super) fn write_empty_extract(&self) {
        fs::write(&self.extract, b"").expect("write extract");
    }

    pub(super) fn extract(&self) -> &Utf8Path {
        &self.extract
    }

    pub(super) fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path, contents).expect("write fixture file");
}

/// Resolve `cli_args` with file and environment layers applied beneath it.
pub(super) fn merge_layers(
    mut cli_args: AssembleArgs,
    file_layer: Option<LayerOverrides>,
    env_layer: Option<LayerOverrides>,
) -> Result<AssembleConfig, CliError> {
    merge_field(
        &mut cli_args.output,
        extract_field(env_layer.as_ref(), |layer| &layer.output),
        extract_field(file_layer.as_ref(), |layer| &layer.output),
    );
    merge_field(
        &mut cli_args.workers,
        extract_field(env_layer.as_ref(), |layer| &layer.workers),
        extract_field(file_layer.as_ref(), |layer| &layer.workers),
    );
    resolve_assemble_config(cli_args)
}

fn merge_field<T>(target: &mut Option<T>, env_value: Option<T>, file_value: Option<T>) {
    if target.is_none()
        && let Some(value) = env_value.or(file_value)
    {
        *target = Some(value);
    }
}

fn extract_field<T: Clone>(
    layer: Option<&LayerOverrides>,
    accessor: fn(&LayerOverrides) -> &Option<T>,
) -> Option<T> {
    layer.and_then(|entry| accessor(entry).clone())
}
