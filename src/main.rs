// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use charityledger::{cli, commands, config::Config, ledger::Ledger, logging, store};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let config = Config::load()?.with_overrides(&matches)?;
    logging::init_tracing(&config.log_level);

    let ledger = Ledger::new(store::open(&config)?);

    if let Some(("init", _)) = matches.subcommand() {
        println!(
            "{} store initialized in {}",
            config.backend,
            config.data_dir()?.display()
        );
        return Ok(());
    }
    if !commands::dispatch(&ledger, &matches)? {
        cli::build_cli().print_help()?;
        println!();
    }
    Ok(())
}
