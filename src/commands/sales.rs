// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::{Product, Record, Sale, SaleInput};
use crate::utils::{
    arg_date, arg_decimal, arg_required, arg_string, fmt_money, maybe_print_json, output_flags,
    pretty_table, today,
};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ledger, sub)?,
        Some(("list", sub)) => list(ledger, sub)?,
        Some(("edit", sub)) => edit(ledger, sub)?,
        Some(("rm", sub)) => {
            let id = arg_required(sub, "id")?;
            ledger.delete_sale(id)?;
            println!("Removed sale {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let product_id = arg_required(sub, "product")?.to_string();
    let price_per_kg = match arg_decimal(sub, "price")? {
        Some(p) => p,
        None => ledger
            .sale_price_hint(&product_id)?
            .with_context(|| format!("Product {} has no sale price; pass --price", product_id))?,
    };
    let input = SaleInput {
        weight_before_sale: arg_decimal(sub, "before")?.unwrap_or_default(),
        weight_after_sale: arg_decimal(sub, "after")?.unwrap_or_default(),
        price_per_kg,
        expected_cash: arg_decimal(sub, "expected")?,
        received_cash: arg_decimal(sub, "received")?.unwrap_or_default(),
        topup: arg_decimal(sub, "topup")?.unwrap_or_default(),
        charity: arg_decimal(sub, "charity")?.unwrap_or_default(),
        credit: arg_decimal(sub, "credit")?.unwrap_or_default(),
        sale_date: arg_date(sub, "date")?.unwrap_or_else(today),
        product_id,
        arrears: None,
    };
    let sale = ledger.create_sale(input)?;
    println!(
        "Recorded sale {} of {} kg: expected {}, arrears {}",
        sale.id,
        sale.data.weight,
        fmt_money(&sale.data.expected_cash),
        fmt_money(&sale.data.arrears)
    );
    Ok(())
}

/// Starts from the stored sale and overrides what was passed. Expected cash
/// is only kept when explicitly given, otherwise it follows weight x price.
fn edit(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg_required(sub, "id")?;
    let cur = ledger.get::<Sale>(id)?.data;
    let input = SaleInput {
        product_id: arg_string(sub, "product").unwrap_or(cur.product_id),
        weight_before_sale: arg_decimal(sub, "before")?.unwrap_or(cur.weight_before_sale),
        weight_after_sale: arg_decimal(sub, "after")?.unwrap_or(cur.weight_after_sale),
        price_per_kg: arg_decimal(sub, "price")?.unwrap_or(cur.price_per_kg),
        expected_cash: arg_decimal(sub, "expected")?,
        received_cash: arg_decimal(sub, "received")?.unwrap_or(cur.received_cash),
        topup: arg_decimal(sub, "topup")?.unwrap_or(cur.topup),
        charity: arg_decimal(sub, "charity")?.unwrap_or(cur.charity),
        credit: arg_decimal(sub, "credit")?.unwrap_or(cur.credit),
        sale_date: arg_date(sub, "date")?.unwrap_or(cur.sale_date),
        arrears: None,
    };
    let sale = ledger.update_sale(id, input)?;
    println!(
        "Updated sale {}: arrears {}",
        id,
        fmt_money(&sale.data.arrears)
    );
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRow {
    pub id: String,
    pub date: String,
    pub product: String,
    pub weight: Decimal,
    pub price_per_kg: Decimal,
    pub expected_cash: Decimal,
    pub total_received: Decimal,
    pub arrears: Decimal,
}

/// Sales joined with product names. A dangling product id shows as "Unknown".
pub fn query_rows(ledger: &Ledger) -> Result<Vec<SaleRow>> {
    let products: Vec<Record<Product>> = ledger.list()?;
    let names: HashMap<&str, &str> = products
        .iter()
        .map(|p| (p.id.as_str(), p.data.name.as_str()))
        .collect();
    let mut sales: Vec<Record<Sale>> = ledger.list()?;
    sales.sort_by(|a, b| b.data.sale_date.cmp(&a.data.sale_date).then(b.seq.cmp(&a.seq)));
    Ok(sales
        .into_iter()
        .map(|s| SaleRow {
            product: names
                .get(s.data.product_id.as_str())
                .copied()
                .unwrap_or("Unknown")
                .to_string(),
            date: s.data.sale_date.to_string(),
            weight: s.data.weight,
            price_per_kg: s.data.price_per_kg,
            expected_cash: s.data.expected_cash,
            total_received: s.data.total_received(),
            arrears: s.data.arrears,
            id: s.id,
        })
        .collect())
}

fn list(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let data = query_rows(ledger)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.date.clone(),
                    r.product.clone(),
                    r.weight.to_string(),
                    fmt_money(&r.price_per_kg),
                    fmt_money(&r.expected_cash),
                    fmt_money(&r.total_received),
                    fmt_money(&r.arrears),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Product", "Kg", "Price/kg", "Expected", "Received", "Arrears"],
                rows,
            )
        );
    }
    Ok(())
}
