//! stashdb CLI entry point
//!
//! Installs logging, then delegates everything to `cli::run`. Errors go to
//! stderr with a non-zero exit.

use stashdb::{cli, observability};

fn main() {
    observability::init_logging();

    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
