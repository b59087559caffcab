// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::{GeneralExpense, ItemConsumed, MiscExpense, Record, Sale};
use crate::reports::{Books, DailySummary, PeriodTotals, daily_summaries, totals};
use crate::utils::{
    arg, fmt_money, maybe_print_json, output_flags, parse_month, pretty_table, today,
};
use anyhow::Result;
use chrono::Datelike;

/// Owned copies of the collections behind a [`Books`] view.
struct Loaded {
    sales: Vec<Record<Sale>>,
    consumed: Vec<Record<ItemConsumed>>,
    expenses: Vec<Record<GeneralExpense>>,
    misc_expenses: Vec<Record<MiscExpense>>,
}

impl Loaded {
    fn from(ledger: &Ledger) -> Result<Self> {
        Ok(Loaded {
            sales: ledger.list()?,
            consumed: ledger.list()?,
            expenses: ledger.list()?,
            misc_expenses: ledger.list()?,
        })
    }

    fn books(&self) -> Books<'_> {
        Books {
            sales: &self.sales,
            consumed: &self.consumed,
            expenses: &self.expenses,
            misc_expenses: &self.misc_expenses,
        }
    }
}

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("daily", sub)) => {
            let limit = sub.get_one::<usize>("limit").copied();
            print_daily(&daily(ledger, limit)?, sub)?;
        }
        Some(("monthly", sub)) => {
            let month = match arg(sub, "month") {
                Some(s) => parse_month(s)?,
                None => {
                    let t = today();
                    (t.year(), t.month())
                }
            };
            let loaded = Loaded::from(ledger)?;
            print_totals(&totals(&loaded.books(), Some(month))?, sub)?;
        }
        Some(("totals", sub)) => {
            let loaded = Loaded::from(ledger)?;
            print_totals(&totals(&loaded.books(), None)?, sub)?;
        }
        _ => {}
    }
    Ok(())
}

/// Daily summaries, newest first, optionally cut to the most recent days.
pub fn daily(ledger: &Ledger, limit: Option<usize>) -> Result<Vec<DailySummary>> {
    let loaded = Loaded::from(ledger)?;
    let mut rows = daily_summaries(&loaded.books())?;
    if let Some(n) = limit {
        rows.truncate(n);
    }
    Ok(rows)
}

fn print_daily(data: &[DailySummary], sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|d| {
                vec![
                    d.date.to_string(),
                    fmt_money(&d.sales_revenue),
                    fmt_money(&d.consumption_cost),
                    fmt_money(&d.expense_cost),
                    fmt_money(&d.profit),
                    d.sales_count.to_string(),
                    d.consumption_count.to_string(),
                    d.expense_count.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Date", "Revenue", "Consumed", "Expenses", "Profit", "Sales", "Items",
                    "Expense rows",
                ],
                rows,
            )
        );
    }
    Ok(())
}

fn print_totals(t: &PeriodTotals, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    if !maybe_print_json(json_flag, jsonl_flag, t)? {
        let rows = vec![
            vec!["Sales revenue".into(), fmt_money(&t.sales_revenue)],
            vec!["Consumption cost".into(), fmt_money(&t.consumption_cost)],
            vec!["General expenses".into(), fmt_money(&t.expense_cost)],
            vec!["Misc expenses".into(), fmt_money(&t.misc_expense_cost)],
            vec!["Total cost".into(), fmt_money(&t.total_cost)],
            vec!["Profit".into(), fmt_money(&t.profit)],
            vec!["Sales".into(), t.sales_count.to_string()],
            vec!["Consumptions".into(), t.consumption_count.to_string()],
            vec!["Expenses".into(), t.expense_count.to_string()],
        ];
        println!("{}", pretty_table(&["", "Value"], rows));
    }
    Ok(())
}
