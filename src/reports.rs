// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only summaries folded over whole collections.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    BankTransaction, FamilyMember, FamilyPayment, GeneralExpense, ItemConsumed, MiscExpense,
    Record, Sale, TransactionType,
};

/// One day of activity. `expense_cost` holds general and misc expenses
/// together; [`PeriodTotals`] reports misc expenses separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub sales_revenue: Decimal,
    pub consumption_cost: Decimal,
    pub expense_cost: Decimal,
    pub total_cost: Decimal,
    pub profit: Decimal,
    pub sales_count: usize,
    pub consumption_count: usize,
    pub expense_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotals {
    pub sales_revenue: Decimal,
    pub consumption_cost: Decimal,
    pub expense_cost: Decimal,
    pub misc_expense_cost: Decimal,
    pub total_cost: Decimal,
    pub profit: Decimal,
    pub sales_count: usize,
    pub consumption_count: usize,
    pub expense_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountSummary {
    pub total_cash_received: Decimal,
    pub total_cash_withdrawn: Decimal,
    pub current_balance: Decimal,
    pub last_transaction_date: Option<NaiveDate>,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyPaymentSummary {
    pub total_paid_this_month: Decimal,
    pub total_paid_this_year: Decimal,
    pub active_family_members: usize,
    pub upcoming_payments: usize,
    pub last_payment_date: Option<NaiveDate>,
    pub payment_count: usize,
}

/// Borrowed view over the collections the daily report reads.
pub struct Books<'a> {
    pub sales: &'a [Record<Sale>],
    pub consumed: &'a [Record<ItemConsumed>],
    pub expenses: &'a [Record<GeneralExpense>],
    pub misc_expenses: &'a [Record<MiscExpense>],
}

/// Checked `+=` for report sums.
fn add(acc: &mut Decimal, v: Decimal) -> LedgerResult<()> {
    *acc = acc
        .checked_add(v)
        .ok_or_else(|| LedgerError::invalid("report total is out of range"))?;
    Ok(())
}

fn sub(a: Decimal, b: Decimal) -> LedgerResult<Decimal> {
    a.checked_sub(b)
        .ok_or_else(|| LedgerError::invalid("report total is out of range"))
}

/// One row per day with any activity, newest first.
pub fn daily_summaries(books: &Books<'_>) -> LedgerResult<Vec<DailySummary>> {
    let mut map: BTreeMap<NaiveDate, DailySummary> = BTreeMap::new();

    for s in books.sales {
        let d = day(&mut map, s.data.sale_date);
        add(&mut d.sales_revenue, s.data.total_received())?;
        d.sales_count += 1;
    }
    for c in books.consumed {
        let d = day(&mut map, c.data.consumption_date);
        add(&mut d.consumption_cost, c.data.cost())?;
        d.consumption_count += 1;
    }
    for e in books.expenses {
        let d = day(&mut map, e.data.expense_date);
        add(&mut d.expense_cost, e.data.total_cost())?;
        d.expense_count += 1;
    }
    for e in books.misc_expenses {
        let d = day(&mut map, e.data.expense_date);
        add(&mut d.expense_cost, e.data.total_cost())?;
        d.expense_count += 1;
    }

    map.into_values()
        .rev()
        .map(|mut d| -> LedgerResult<DailySummary> {
            d.total_cost = d.consumption_cost;
            add(&mut d.total_cost, d.expense_cost)?;
            d.profit = sub(d.sales_revenue, d.total_cost)?;
            Ok(d)
        })
        .collect()
}

fn day(map: &mut BTreeMap<NaiveDate, DailySummary>, date: NaiveDate) -> &mut DailySummary {
    map.entry(date).or_insert_with(|| DailySummary {
        date,
        ..Default::default()
    })
}

/// Totals over everything, or over one month when `month` is `(year, month)`.
pub fn totals(books: &Books<'_>, month: Option<(i32, u32)>) -> LedgerResult<PeriodTotals> {
    let within = |d: NaiveDate| month.is_none_or(|(y, m)| d.year() == y && d.month() == m);
    let mut t = PeriodTotals::default();

    for s in books.sales.iter().filter(|s| within(s.data.sale_date)) {
        add(&mut t.sales_revenue, s.data.total_received())?;
        t.sales_count += 1;
    }
    for c in books.consumed.iter().filter(|c| within(c.data.consumption_date)) {
        add(&mut t.consumption_cost, c.data.cost())?;
        t.consumption_count += 1;
    }
    for e in books.expenses.iter().filter(|e| within(e.data.expense_date)) {
        add(&mut t.expense_cost, e.data.total_cost())?;
        t.expense_count += 1;
    }
    for e in books.misc_expenses.iter().filter(|e| within(e.data.expense_date)) {
        add(&mut t.misc_expense_cost, e.data.total_cost())?;
        t.expense_count += 1;
    }
    t.total_cost = t.consumption_cost;
    add(&mut t.total_cost, t.expense_cost)?;
    add(&mut t.total_cost, t.misc_expense_cost)?;
    t.profit = sub(t.sales_revenue, t.total_cost)?;
    Ok(t)
}

pub fn account_summary(
    transactions: &[Record<BankTransaction>],
) -> LedgerResult<BankAccountSummary> {
    let mut s = BankAccountSummary {
        transaction_count: transactions.len(),
        ..Default::default()
    };
    for t in transactions {
        match t.data.kind {
            TransactionType::CashReceived => add(&mut s.total_cash_received, t.data.amount)?,
            TransactionType::CashWithdrawn => add(&mut s.total_cash_withdrawn, t.data.amount)?,
        }
    }
    s.current_balance = sub(s.total_cash_received, s.total_cash_withdrawn)?;
    s.last_transaction_date = transactions.iter().map(|t| t.data.transaction_date).max();
    Ok(s)
}

pub fn family_summary(
    payments: &[Record<FamilyPayment>],
    members: &[Record<FamilyMember>],
    today: NaiveDate,
) -> LedgerResult<FamilyPaymentSummary> {
    let this_year = payments
        .iter()
        .filter(|p| p.data.payment_date.year() == today.year());
    let mut s = FamilyPaymentSummary {
        payment_count: payments.len(),
        ..Default::default()
    };
    for p in this_year {
        add(&mut s.total_paid_this_year, p.data.amount)?;
        if p.data.payment_date.month() == today.month() {
            add(&mut s.total_paid_this_month, p.data.amount)?;
        }
    }
    let active = members.iter().filter(|m| m.data.is_active);
    s.active_family_members = active.clone().count();
    s.upcoming_payments = active
        .filter(|m| m.data.monthly_amount.is_some_and(|a| !a.is_zero()))
        .filter(|m| m.data.payment_day.is_some_and(|d| d > today.day()))
        .count();
    s.last_payment_date = payments.iter().map(|p| p.data.payment_date).max();
    Ok(s)
}
