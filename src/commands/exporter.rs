// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::Collection;
use crate::utils::arg_required;
use anyhow::{Result, bail};
use serde_json::Value;
use std::collections::BTreeSet;

const LEADING: [&str; 4] = ["id", "seq", "createdAt", "updatedAt"];

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    let collection: Collection = arg_required(m, "collection")?.parse()?;
    let fmt = arg_required(m, "format")?.to_lowercase();
    let out = arg_required(m, "out")?;

    let items = ledger.snapshot(collection)?;
    match fmt.as_str() {
        "csv" => write_csv(&items, out)?,
        "json" => std::fs::write(out, serde_json::to_string_pretty(&items)?)?,
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    tracing::info!(%collection, count = items.len(), out, "exported");
    println!("Exported {} {} to {}", items.len(), collection, out);
    Ok(())
}

/// One column per field seen in any record, store fields first.
fn write_csv(items: &[Value], out: &str) -> Result<()> {
    let mut fields = BTreeSet::new();
    for item in items {
        if let Some(obj) = item.as_object() {
            fields.extend(
                obj.keys()
                    .filter(|k| !LEADING.contains(&k.as_str()))
                    .cloned(),
            );
        }
    }
    let header: Vec<String> = LEADING
        .iter()
        .map(|s| s.to_string())
        .chain(fields)
        .collect();

    let mut wtr = csv::Writer::from_path(out)?;
    wtr.write_record(&header)?;
    for item in items {
        wtr.write_record(header.iter().map(|h| cell(item.get(h))))?;
    }
    wtr.flush()?;
    Ok(())
}

fn cell(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
