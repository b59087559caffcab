// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Derived values. Everything here is pure; input validation lives in the
//! ledger. Arithmetic is checked, and a result outside the decimal range is
//! reported as a validation error.

use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{BankTransaction, Record};

fn overflow(what: &str) -> LedgerError {
    LedgerError::invalid(format!("{} is out of range", what))
}

/// Shortfall (positive) or overpayment (negative) of a sale. Not clamped.
pub fn compute_arrears(
    expected_cash: Decimal,
    received_cash: Decimal,
    topup: Decimal,
    charity: Decimal,
    credit: Decimal,
) -> LedgerResult<Decimal> {
    let received = [topup, charity, credit]
        .into_iter()
        .try_fold(received_cash, |acc, v| acc.checked_add(v))
        .ok_or_else(|| overflow("total received"))?;
    expected_cash
        .checked_sub(received)
        .ok_or_else(|| overflow("arrears"))
}

/// Weight that left the container. Negative means the readings were swapped.
pub fn compute_weight_sold(
    weight_before_sale: Decimal,
    weight_after_sale: Decimal,
) -> LedgerResult<Decimal> {
    weight_before_sale
        .checked_sub(weight_after_sale)
        .ok_or_else(|| overflow("weight"))
}

pub fn compute_expected_cash(weight: Decimal, price_per_kg: Decimal) -> LedgerResult<Decimal> {
    weight
        .checked_mul(price_per_kg)
        .ok_or_else(|| overflow("expectedCash"))
}

/// Cumulative signed totals for transactions already in chronological order.
pub fn compute_running_balances(transactions: &[BankTransaction]) -> LedgerResult<Vec<Decimal>> {
    let mut total = Decimal::ZERO;
    transactions
        .iter()
        .map(|t| -> LedgerResult<Decimal> {
            total = total
                .checked_add(t.signed_amount())
                .ok_or_else(|| overflow("runningBalance"))?;
            Ok(total)
        })
        .collect()
}

/// Canonical ledger order: transaction date, then creation order.
pub fn chronological_order(records: &mut [Record<BankTransaction>]) {
    records.sort_by(|a, b| {
        a.data
            .transaction_date
            .cmp(&b.data.transaction_date)
            .then(a.seq.cmp(&b.seq))
    });
}
