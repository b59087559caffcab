// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::{compute_arrears, compute_running_balances};
use crate::ledger::Ledger;
use crate::models::{
    BankTransaction, CustomItem, GeneralExpense, ItemConsumed, Product, Record, Sale, SourceType,
};
use crate::utils::pretty_table;
use anyhow::Result;
use std::collections::HashSet;

/// Every problem found, as `(issue, detail)` pairs.
pub fn diagnose(ledger: &Ledger) -> Result<Vec<(String, String)>> {
    let mut issues = Vec::new();

    // 1) Sales pointing at products that no longer exist
    let products: Vec<Record<Product>> = ledger.list()?;
    let known: HashSet<&str> = products.iter().map(|p| p.id.as_str()).collect();
    let sales: Vec<Record<Sale>> = ledger.list()?;
    for s in &sales {
        if !known.contains(s.data.product_id.as_str()) {
            issues.push((
                "sale_unknown_product".into(),
                format!("{} -> {}", s.id, s.data.product_id),
            ));
        }
    }

    // 2) Stored arrears that no longer match the sale's amounts
    for s in &sales {
        let d = &s.data;
        let arrears =
            compute_arrears(d.expected_cash, d.received_cash, d.topup, d.charity, d.credit)?;
        if arrears != d.arrears {
            issues.push((
                "arrears_drift".into(),
                format!("{} stored {} computed {}", s.id, d.arrears, arrears),
            ));
        }
    }

    // 3) Running balances out of step with the chronological sum
    let txns = ledger.bank_transactions()?;
    let plain: Vec<BankTransaction> = txns.iter().map(|t| t.data.clone()).collect();
    for (t, balance) in txns.iter().zip(compute_running_balances(&plain)?) {
        if t.data.running_balance != balance {
            issues.push((
                "balance_drift".into(),
                format!("{} stored {} computed {}", t.id, t.data.running_balance, balance),
            ));
        }
    }

    // 4) Consumption whose source record is gone
    let expenses: Vec<Record<GeneralExpense>> = ledger.list()?;
    let items: Vec<Record<CustomItem>> = ledger.list()?;
    let expense_ids: HashSet<&str> = expenses.iter().map(|e| e.id.as_str()).collect();
    let item_ids: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();
    let consumed: Vec<Record<ItemConsumed>> = ledger.list()?;
    for c in &consumed {
        let Some(source) = c.data.source_id.as_deref() else {
            continue;
        };
        let present = match c.data.source_type {
            SourceType::GeneralExpense => expense_ids.contains(source),
            SourceType::CustomItem => item_ids.contains(source),
        };
        if !present {
            issues.push((
                "consumption_missing_source".into(),
                format!("{} -> {} {}", c.id, c.data.source_type, source),
            ));
        }
    }

    Ok(issues)
}

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    let issues = diagnose(ledger)?;
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues.into_iter().map(|(i, d)| vec![i, d]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    if m.get_flag("fix") {
        let fixed = ledger.reconcile()?;
        println!(
            "Recomputed {} sale(s) and {} bank transaction(s)",
            fixed.sales, fixed.bank_transactions
        );
    }
    Ok(())
}
