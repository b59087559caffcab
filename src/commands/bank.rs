// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::{BankTransaction, BankTransactionInput};
use crate::reports::account_summary;
use crate::utils::{
    arg_date, arg_decimal, arg_parse, arg_required, arg_string, fmt_money, fmt_opt,
    maybe_print_json, output_flags, pretty_table, today,
};
use anyhow::Result;

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let t = ledger.create_bank_transaction(BankTransactionInput {
                kind: arg_required(sub, "type")?.parse()?,
                amount: arg_decimal(sub, "amount")?.unwrap_or_default(),
                transaction_date: arg_date(sub, "date")?.unwrap_or_else(today),
                description: arg_string(sub, "description").unwrap_or_default(),
                notes: arg_string(sub, "notes"),
                reference: arg_string(sub, "reference"),
            })?;
            println!(
                "Recorded {} of {} ({}); balance {}",
                t.data.kind,
                fmt_money(&t.data.amount),
                t.id,
                fmt_money(&t.data.running_balance)
            );
        }
        Some(("list", sub)) => list(ledger, sub)?,
        Some(("edit", sub)) => {
            let id = arg_required(sub, "id")?;
            let cur: BankTransaction = ledger.get::<BankTransaction>(id)?.data;
            let input = BankTransactionInput {
                kind: arg_parse(sub, "type")?.unwrap_or(cur.kind),
                amount: arg_decimal(sub, "amount")?.unwrap_or(cur.amount),
                transaction_date: arg_date(sub, "date")?.unwrap_or(cur.transaction_date),
                description: arg_string(sub, "description").unwrap_or(cur.description),
                notes: arg_string(sub, "notes").or(cur.notes),
                reference: arg_string(sub, "reference").or(cur.reference),
            };
            let t = ledger.update_bank_transaction(id, input)?;
            println!(
                "Updated bank transaction {}; balance {}",
                id,
                fmt_money(&t.data.running_balance)
            );
        }
        Some(("rm", sub)) => {
            let id = arg_required(sub, "id")?;
            ledger.delete_bank_transaction(id)?;
            println!("Removed bank transaction {}", id);
        }
        Some(("summary", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let s = account_summary(&ledger.bank_transactions()?)?;
            if !maybe_print_json(json_flag, jsonl_flag, &s)? {
                let rows = vec![
                    vec!["Cash received".into(), fmt_money(&s.total_cash_received)],
                    vec!["Cash withdrawn".into(), fmt_money(&s.total_cash_withdrawn)],
                    vec!["Current balance".into(), fmt_money(&s.current_balance)],
                    vec!["Last transaction".into(), fmt_opt(s.last_transaction_date)],
                    vec!["Transactions".into(), s.transaction_count.to_string()],
                ];
                println!("{}", pretty_table(&["", "Value"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

/// Chronological, so the balance column reads top to bottom.
fn list(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let data = ledger.bank_transactions()?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|r| {
                let t = &r.data;
                vec![
                    r.id.clone(),
                    t.transaction_date.to_string(),
                    t.kind.to_string(),
                    fmt_money(&t.signed_amount()),
                    fmt_money(&t.running_balance),
                    t.description.clone(),
                    t.reference.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Type", "Amount", "Balance", "Description", "Reference"],
                rows,
            )
        );
    }
    Ok(())
}
