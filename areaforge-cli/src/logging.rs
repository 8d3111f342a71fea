//! Structured JSON logging on stderr.

use std::io;

use log::LevelFilter;
use structured_logger::Builder;
use structured_logger::json::new_writer;

/// Install the JSON logger at `level`.
///
/// Only the first call in a process installs a logger; later calls keep it.
pub(crate) fn init(level: LevelFilter) {
    let installed = Builder::with_level(level.as_str())
        .with_target_writer("*", new_writer(io::stderr()))
        .try_init();
    if installed.is_err() {
        log::debug!("Logger already installed; keeping it");
    }
}
