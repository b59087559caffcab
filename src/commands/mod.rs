// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod products;
pub mod sales;
pub mod expenses;
pub mod consumption;
pub mod bank;
pub mod family;
pub mod reports;
pub mod exporter;
pub mod doctor;

use crate::ledger::Ledger;
use anyhow::Result;

/// Routes a parsed command line to its handler. Returns `false` when no
/// known subcommand was given.
pub fn dispatch(ledger: &Ledger, matches: &clap::ArgMatches) -> Result<bool> {
    match matches.subcommand() {
        Some(("product", sub)) => products::handle(ledger, sub)?,
        Some(("custom-product", sub)) => products::handle_custom(ledger, sub)?,
        Some(("sale", sub)) => sales::handle(ledger, sub)?,
        Some(("expense", sub)) => expenses::handle(ledger, sub)?,
        Some(("misc", sub)) => expenses::handle_misc(ledger, sub)?,
        Some(("item", sub)) => consumption::handle_items(ledger, sub)?,
        Some(("consume", sub)) => consumption::handle(ledger, sub)?,
        Some(("bank", sub)) => bank::handle(ledger, sub)?,
        Some(("family", sub)) => family::handle(ledger, sub)?,
        Some(("report", sub)) => reports::handle(ledger, sub)?,
        Some(("export", sub)) => exporter::handle(ledger, sub)?,
        Some(("doctor", sub)) => doctor::handle(ledger, sub)?,
        _ => return Ok(false),
    }
    Ok(true)
}
