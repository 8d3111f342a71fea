//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use areaforge_cli::CliError;

#[expect(
    clippy::print_stderr,
    reason = "fatal errors are reported before or without a logger"
)]
fn main() {
    match areaforge_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("areaforge: {err}");
            std::process::exit(1);
        }
    }
}
