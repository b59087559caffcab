// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::{ConsumptionInput, CustomItem, ItemConsumed, Record, SourceType};
use crate::utils::{
    arg_date, arg_decimal, arg_parse, arg_required, arg_string, fmt_money, fmt_opt,
    maybe_print_json, output_flags, pretty_table, today,
};
use anyhow::Result;

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let input = ConsumptionInput {
                item_name: arg_required(sub, "item")?.to_string(),
                unit: arg_parse(sub, "unit")?,
                quantity: arg_decimal(sub, "quantity")?.unwrap_or_default(),
                weight: arg_decimal(sub, "weight")?,
                price: arg_decimal(sub, "price")?,
                consumption_date: arg_date(sub, "date")?.unwrap_or_else(today),
                notes: arg_string(sub, "notes"),
                source_type: arg_parse(sub, "source-type")?.unwrap_or(SourceType::CustomItem),
                source_id: arg_string(sub, "source-id"),
            };
            let c = ledger.create_consumed_item(input)?;
            println!(
                "Recorded consumption of {} {} {} ({}) cost {}",
                c.data.quantity,
                c.data.unit,
                c.data.item_name,
                c.id,
                fmt_money(&c.data.cost())
            );
        }
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let data: Vec<Record<ItemConsumed>> = ledger.list()?;
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let rows = data
                    .iter()
                    .map(|r| {
                        let c = &r.data;
                        vec![
                            r.id.clone(),
                            c.consumption_date.to_string(),
                            c.item_name.clone(),
                            c.unit.to_string(),
                            c.quantity.to_string(),
                            fmt_opt(c.weight),
                            c.price.map(|p| fmt_money(&p)).unwrap_or_default(),
                            fmt_money(&c.cost()),
                            c.source_type.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Id", "Date", "Item", "Unit", "Qty", "Kg", "Price", "Cost", "Source"],
                        rows,
                    )
                );
            }
        }
        Some(("edit", sub)) => {
            let id = arg_required(sub, "id")?;
            let mut c = ledger.get::<ItemConsumed>(id)?.data;
            if let Some(v) = arg_string(sub, "item") {
                c.item_name = v;
            }
            if let Some(v) = arg_parse(sub, "unit")? {
                c.unit = v;
            }
            if let Some(v) = arg_decimal(sub, "quantity")? {
                c.quantity = v;
            }
            if let Some(v) = arg_decimal(sub, "weight")? {
                c.weight = Some(v);
            }
            if let Some(v) = arg_decimal(sub, "price")? {
                c.price = Some(v);
            }
            if let Some(v) = arg_date(sub, "date")? {
                c.consumption_date = v;
            }
            if let Some(v) = arg_string(sub, "notes") {
                c.notes = Some(v);
            }
            if let Some(v) = arg_parse(sub, "source-type")? {
                c.source_type = v;
            }
            if let Some(v) = arg_string(sub, "source-id") {
                c.source_id = Some(v);
            }
            ledger.update(id, c)?;
            println!("Updated consumption {}", id);
        }
        Some(("rm", sub)) => {
            let id = arg_required(sub, "id")?;
            ledger.delete::<ItemConsumed>(id)?;
            println!("Removed consumption {}", id);
        }
        _ => {}
    }
    Ok(())
}

pub fn handle_items(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let item = ledger.create(CustomItem {
                name: arg_required(sub, "name")?.to_string(),
                unit: arg_required(sub, "unit")?.parse()?,
            })?;
            println!("Added item '{}' ({})", item.data.name, item.id);
        }
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let data: Vec<Record<CustomItem>> = ledger.list()?;
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let rows = data
                    .iter()
                    .map(|r| vec![r.id.clone(), r.data.name.clone(), r.data.unit.to_string()])
                    .collect();
                println!("{}", pretty_table(&["Id", "Name", "Unit"], rows));
            }
        }
        Some(("edit", sub)) => {
            let id = arg_required(sub, "id")?;
            let mut item = ledger.get::<CustomItem>(id)?.data;
            if let Some(v) = arg_string(sub, "name") {
                item.name = v;
            }
            if let Some(v) = arg_parse(sub, "unit")? {
                item.unit = v;
            }
            ledger.update(id, item)?;
            println!("Updated item {}", id);
        }
        Some(("rm", sub)) => {
            let id = arg_required(sub, "id")?;
            ledger.delete::<CustomItem>(id)?;
            println!("Removed item {}", id);
        }
        _ => {}
    }
    Ok(())
}
