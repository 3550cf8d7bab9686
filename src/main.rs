//! items-api CLI entry point
//!
//! Parses arguments and dispatches to the CLI module; errors go to stderr
//! with a non-zero exit status.

use items_api::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
