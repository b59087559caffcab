// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::{GeneralExpense, MiscExpense, Record};
use crate::utils::{
    arg_date, arg_decimal, arg_parse, arg_required, arg_string, fmt_money, fmt_opt,
    maybe_print_json, output_flags, pretty_table, today,
};
use anyhow::Result;

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let e = ledger.create(GeneralExpense {
                name: arg_required(sub, "name")?.to_string(),
                unit: arg_required(sub, "unit")?.parse()?,
                price: arg_decimal(sub, "price")?.unwrap_or_default(),
                quantity: arg_decimal(sub, "quantity")?.unwrap_or_default(),
                weight: arg_decimal(sub, "weight")?,
                expense_date: arg_date(sub, "date")?.unwrap_or_else(today),
                notes: arg_string(sub, "notes"),
            })?;
            println!(
                "Added expense '{}' ({}) total {}",
                e.data.name,
                e.id,
                fmt_money(&e.data.total_cost())
            );
        }
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let data: Vec<Record<GeneralExpense>> = ledger.list()?;
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let rows = data
                    .iter()
                    .map(|r| {
                        let e = &r.data;
                        vec![
                            r.id.clone(),
                            e.expense_date.to_string(),
                            e.name.clone(),
                            e.unit.to_string(),
                            e.quantity.to_string(),
                            fmt_opt(e.weight),
                            fmt_money(&e.price),
                            fmt_money(&e.total_cost()),
                            e.notes.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Id", "Date", "Name", "Unit", "Qty", "Kg", "Price", "Total", "Notes"],
                        rows,
                    )
                );
            }
        }
        Some(("edit", sub)) => {
            let id = arg_required(sub, "id")?;
            let mut e = ledger.get::<GeneralExpense>(id)?.data;
            if let Some(v) = arg_string(sub, "name") {
                e.name = v;
            }
            if let Some(v) = arg_parse(sub, "unit")? {
                e.unit = v;
            }
            if let Some(v) = arg_decimal(sub, "price")? {
                e.price = v;
            }
            if let Some(v) = arg_decimal(sub, "quantity")? {
                e.quantity = v;
            }
            if let Some(v) = arg_decimal(sub, "weight")? {
                e.weight = Some(v);
            }
            if let Some(v) = arg_date(sub, "date")? {
                e.expense_date = v;
            }
            if let Some(v) = arg_string(sub, "notes") {
                e.notes = Some(v);
            }
            ledger.update(id, e)?;
            println!("Updated expense {}", id);
        }
        Some(("rm", sub)) => {
            let id = arg_required(sub, "id")?;
            ledger.delete::<GeneralExpense>(id)?;
            println!("Removed expense {}", id);
        }
        _ => {}
    }
    Ok(())
}

pub fn handle_misc(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let e = ledger.create(MiscExpense {
                name: arg_required(sub, "name")?.to_string(),
                price: arg_decimal(sub, "price")?.unwrap_or_default(),
                quantity: arg_decimal(sub, "quantity")?.unwrap_or_default(),
                expense_date: arg_date(sub, "date")?.unwrap_or_else(today),
                notes: arg_string(sub, "notes"),
            })?;
            println!(
                "Added misc expense '{}' ({}) total {}",
                e.data.name,
                e.id,
                fmt_money(&e.data.total_cost())
            );
        }
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let data: Vec<Record<MiscExpense>> = ledger.list()?;
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let rows = data
                    .iter()
                    .map(|r| {
                        let e = &r.data;
                        vec![
                            r.id.clone(),
                            e.expense_date.to_string(),
                            e.name.clone(),
                            e.quantity.to_string(),
                            fmt_money(&e.price),
                            fmt_money(&e.total_cost()),
                            e.notes.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Id", "Date", "Name", "Qty", "Price", "Total", "Notes"], rows)
                );
            }
        }
        Some(("edit", sub)) => {
            let id = arg_required(sub, "id")?;
            let mut e = ledger.get::<MiscExpense>(id)?.data;
            if let Some(v) = arg_string(sub, "name") {
                e.name = v;
            }
            if let Some(v) = arg_decimal(sub, "price")? {
                e.price = v;
            }
            if let Some(v) = arg_decimal(sub, "quantity")? {
                e.quantity = v;
            }
            if let Some(v) = arg_date(sub, "date")? {
                e.expense_date = v;
            }
            if let Some(v) = arg_string(sub, "notes") {
                e.notes = Some(v);
            }
            ledger.update(id, e)?;
            println!("Updated misc expense {}", id);
        }
        Some(("rm", sub)) => {
            let id = arg_required(sub, "id")?;
            ledger.delete::<MiscExpense>(id)?;
            println!("Removed misc expense {}", id);
        }
        _ => {}
    }
    Ok(())
}
