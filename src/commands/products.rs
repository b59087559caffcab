// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::{CustomProduct, Product, Record};
use crate::utils::{
    arg_date, arg_decimal, arg_parse, arg_required, arg_string, fmt_money, maybe_print_json,
    output_flags, pretty_table, today,
};
use anyhow::Result;
use rust_decimal::Decimal;

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let p = ledger.create(Product {
                name: arg_required(sub, "name")?.to_string(),
                unit: arg_required(sub, "unit")?.parse()?,
                sale_price: arg_decimal(sub, "sale-price")?.unwrap_or(Decimal::ZERO),
                quantity: arg_decimal(sub, "quantity")?.unwrap_or(Decimal::ZERO),
                buying_date: arg_date(sub, "date")?.unwrap_or_else(today),
            })?;
            println!("Added product '{}' ({})", p.data.name, p.id);
        }
        Some(("list", sub)) => list(ledger, sub)?,
        Some(("edit", sub)) => {
            let id = arg_required(sub, "id")?;
            let mut p = ledger.get::<Product>(id)?.data;
            if let Some(v) = arg_string(sub, "name") {
                p.name = v;
            }
            if let Some(v) = arg_parse(sub, "unit")? {
                p.unit = v;
            }
            if let Some(v) = arg_decimal(sub, "sale-price")? {
                p.sale_price = v;
            }
            if let Some(v) = arg_decimal(sub, "quantity")? {
                p.quantity = v;
            }
            if let Some(v) = arg_date(sub, "date")? {
                p.buying_date = v;
            }
            ledger.update(id, p)?;
            println!("Updated product {}", id);
        }
        Some(("rm", sub)) => {
            let id = arg_required(sub, "id")?;
            ledger.delete::<Product>(id)?;
            println!("Removed product {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn list(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let data: Vec<Record<Product>> = ledger.list()?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|r| {
                let p = &r.data;
                vec![
                    r.id.clone(),
                    p.buying_date.to_string(),
                    p.name.clone(),
                    p.unit.to_string(),
                    p.quantity.to_string(),
                    if p.sale_price.is_zero() {
                        "No sale price".to_string()
                    } else {
                        fmt_money(&p.sale_price)
                    },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Bought", "Name", "Unit", "Qty", "Sale price"], rows)
        );
    }
    Ok(())
}

pub fn handle_custom(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let p = ledger.create(CustomProduct {
                name: arg_required(sub, "name")?.to_string(),
                unit: arg_required(sub, "unit")?.parse()?,
            })?;
            println!("Added custom product '{}' ({})", p.data.name, p.id);
        }
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let data: Vec<Record<CustomProduct>> = ledger.list()?;
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
            let mut p = ledger.get::<CustomProduct>(id)?.data;
            if let Some(v) = arg_string(sub, "name") {
                p.name = v;
            }
            if let Some(v) = arg_parse(sub, "unit")? {
                p.unit = v;
            }
            ledger.update(id, p)?;
            println!("Updated custom product {}", id);
        }
        Some(("rm", sub)) => {
            let id = arg_required(sub, "id")?;
            ledger.delete::<CustomProduct>(id)?;
            println!("Removed custom product {}", id);
        }
        _ => {}
    }
    Ok(())
}
