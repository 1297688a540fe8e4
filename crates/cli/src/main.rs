// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use gurusync::Cli;

fn main() {
    let cli = Cli::parse();
    gurusync::init_logging(cli.verbose);
    if let Err(e) = gurusync::run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}
