// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use charityledger::error::{LedgerError, LedgerResult};
use charityledger::ledger::Ledger;
use charityledger::models::{BankTransaction, BankTransactionInput, Collection, TransactionType};
use charityledger::store::{
    AtomicWork, Body, JsonFileStore, RawRecord, RecordStore, SqliteStore,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::ops::DerefMut;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn stores() -> Vec<Box<dyn RecordStore>> {
    vec![
        Box::new(SqliteStore::open_in_memory().unwrap()),
        Box::new(JsonFileStore::in_memory()),
    ]
}

fn backends() -> Vec<Ledger> {
    stores().into_iter().map(Ledger::new).collect()
}

/// Passes everything through to `inner`, except that `rewrite` fails while
/// `fail` is set.
struct FailingRewrite<S> {
    inner: S,
    fail: Arc<AtomicBool>,
}

impl<S> RecordStore for FailingRewrite<S>
where
    S: DerefMut + Send,
    S::Target: RecordStore,
{
    fn list(&self, collection: Collection) -> LedgerResult<Vec<RawRecord>> {
        self.inner.list(collection)
    }

    fn create(&mut self, collection: Collection, body: Body) -> LedgerResult<RawRecord> {
        self.inner.create(collection, body)
    }

    fn update(&mut self, collection: Collection, id: &str, body: Body) -> LedgerResult<RawRecord> {
        self.inner.update(collection, id, body)
    }

    fn delete(&mut self, collection: Collection, id: &str) -> LedgerResult<()> {
        self.inner.delete(collection, id)
    }

    fn rewrite(&mut self, collection: Collection, records: &[RawRecord]) -> LedgerResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("disk full").into());
        }
        self.inner.rewrite(collection, records)
    }

    fn atomic(&mut self, work: &mut AtomicWork<'_>) -> LedgerResult<()> {
        let fail = self.fail.clone();
        self.inner.atomic(&mut |s: &mut dyn RecordStore| {
            work(&mut FailingRewrite {
                inner: s,
                fail: fail.clone(),
            })
        })
    }
}

fn snapshot(l: &Ledger) -> Vec<(String, Decimal, Decimal)> {
    l.bank_transactions()
        .unwrap()
        .into_iter()
        .map(|t| (t.id, t.data.amount, t.data.running_balance))
        .collect()
}

fn input(kind: TransactionType, amount: &str, day: u32) -> BankTransactionInput {
    BankTransactionInput {
        kind,
        amount: d(amount),
        transaction_date: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
        description: format!("day {}", day),
        notes: None,
        reference: None,
    }
}

fn balances(l: &Ledger) -> Vec<Decimal> {
    l.bank_transactions()
        .unwrap()
        .iter()
        .map(|t| t.data.running_balance)
        .collect()
}

#[test]
fn edits_and_deletes_rebalance_everything_after() {
    for l in backends() {
        let a = l
            .create_bank_transaction(input(TransactionType::CashReceived, "100", 1))
            .unwrap();
        let b = l
            .create_bank_transaction(input(TransactionType::CashWithdrawn, "30", 2))
            .unwrap();
        l.create_bank_transaction(input(TransactionType::CashReceived, "50", 3))
            .unwrap();
        assert_eq!(balances(&l), vec![d("100"), d("70"), d("120")]);

        let edited = l
            .update_bank_transaction(&b.id, input(TransactionType::CashWithdrawn, "10", 2))
            .unwrap();
        assert_eq!(edited.data.running_balance, d("90"));
        assert_eq!(balances(&l), vec![d("100"), d("90"), d("140")]);

        l.delete_bank_transaction(&a.id).unwrap();
        assert_eq!(balances(&l), vec![d("-10"), d("40")]);
    }
}

#[test]
fn backdated_transaction_shifts_later_balances() {
    for l in backends() {
        l.create_bank_transaction(input(TransactionType::CashReceived, "20", 10))
            .unwrap();
        l.create_bank_transaction(input(TransactionType::CashWithdrawn, "5", 12))
            .unwrap();
        let early = l
            .create_bank_transaction(input(TransactionType::CashReceived, "100", 1))
            .unwrap();
        assert_eq!(early.data.running_balance, d("100"));

        let txns = l.bank_transactions().unwrap();
        assert_eq!(txns[0].id, early.id);
        assert_eq!(balances(&l), vec![d("100"), d("120"), d("115")]);
    }
}

#[test]
fn moving_a_transaction_by_date_reorders_it() {
    for l in backends() {
        let first = l
            .create_bank_transaction(input(TransactionType::CashReceived, "10", 1))
            .unwrap();
        l.create_bank_transaction(input(TransactionType::CashWithdrawn, "4", 5))
            .unwrap();
        l.update_bank_transaction(&first.id, input(TransactionType::CashReceived, "10", 9))
            .unwrap();
        assert_eq!(balances(&l), vec![d("-4"), d("6")]);
    }
}

#[test]
fn same_day_transactions_keep_entry_order() {
    for l in backends() {
        l.create_bank_transaction(input(TransactionType::CashReceived, "10", 7))
            .unwrap();
        l.create_bank_transaction(input(TransactionType::CashWithdrawn, "15", 7))
            .unwrap();
        l.create_bank_transaction(input(TransactionType::CashReceived, "1", 7))
            .unwrap();
        assert_eq!(balances(&l), vec![d("10"), d("-5"), d("-4")]);
    }
}

#[test]
fn last_balance_equals_signed_sum() {
    for l in backends() {
        let amounts = [("12.5", true), ("3.25", false), ("40", true), ("60", false)];
        for (i, (amt, received)) in amounts.iter().enumerate() {
            let kind = if *received {
                TransactionType::CashReceived
            } else {
                TransactionType::CashWithdrawn
            };
            l.create_bank_transaction(input(kind, amt, 20 - i as u32))
                .unwrap();
        }
        let txns = l.bank_transactions().unwrap();
        let sum: Decimal = txns.iter().map(|t| t.data.signed_amount()).sum();
        assert_eq!(txns.last().unwrap().data.running_balance, sum);
        assert_eq!(sum, d("-10.75"));
    }
}

#[test]
fn negative_amount_is_rejected() {
    for l in backends() {
        let err = l
            .create_bank_transaction(input(TransactionType::CashReceived, "-1", 1))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(l.bank_transactions().unwrap().is_empty());
    }
}

#[test]
fn missing_transaction_leaves_balances_untouched() {
    for l in backends() {
        l.create_bank_transaction(input(TransactionType::CashReceived, "10", 1))
            .unwrap();
        assert!(matches!(
            l.update_bank_transaction("nope", input(TransactionType::CashReceived, "1", 2)),
            Err(LedgerError::NotFound { .. })
        ));
        assert!(matches!(
            l.delete_bank_transaction("nope"),
            Err(LedgerError::NotFound { .. })
        ));
        assert_eq!(balances(&l), vec![d("10")]);
    }
}

#[test]
fn listed_records_are_bank_transactions() {
    for l in backends() {
        l.create_bank_transaction(input(TransactionType::CashReceived, "5", 1))
            .unwrap();
        let listed: Vec<BankTransaction> = l
            .list::<BankTransaction>()
            .unwrap()
            .into_iter()
            .map(|r| r.data)
            .collect();
        assert_eq!(listed[0].running_balance, d("5"));
        assert_eq!(listed[0].description, "day 1");
    }
}

#[test]
fn deleting_interior_transactions_shifts_only_later_balances() {
    for l in backends() {
        l.create_bank_transaction(input(TransactionType::CashReceived, "100", 1))
            .unwrap();
        let withdrawal = l
            .create_bank_transaction(input(TransactionType::CashWithdrawn, "30", 2))
            .unwrap();
        let receipt = l
            .create_bank_transaction(input(TransactionType::CashReceived, "50", 3))
            .unwrap();
        l.create_bank_transaction(input(TransactionType::CashWithdrawn, "20", 4))
            .unwrap();
        l.create_bank_transaction(input(TransactionType::CashReceived, "10", 5))
            .unwrap();
        assert_eq!(
            balances(&l),
            vec![d("100"), d("70"), d("120"), d("100"), d("110")]
        );

        for id in [withdrawal.id, receipt.id] {
            let before = l.bank_transactions().unwrap();
            let pos = before.iter().position(|t| t.id == id).unwrap();
            assert!(pos > 0 && pos < before.len() - 1);
            let removed = before[pos].data.signed_amount();

            l.delete_bank_transaction(&id).unwrap();

            let after = l.bank_transactions().unwrap();
            assert_eq!(after.len(), before.len() - 1);
            for (i, t) in after.iter().enumerate() {
                let old = before.iter().find(|b| b.id == t.id).unwrap();
                let expected = if i < pos {
                    old.data.running_balance
                } else {
                    old.data.running_balance - removed
                };
                assert_eq!(t.data.running_balance, expected, "position {}", i);
            }
        }
        assert_eq!(balances(&l), vec![d("100"), d("80"), d("90")]);
    }
}

#[test]
fn failed_balance_rewrite_leaves_the_ledger_unchanged() {
    for store in stores() {
        let fail = Arc::new(AtomicBool::new(false));
        let l = Ledger::new(Box::new(FailingRewrite {
            inner: store,
            fail: fail.clone(),
        }));
        let first = l
            .create_bank_transaction(input(TransactionType::CashReceived, "100", 5))
            .unwrap();
        l.create_bank_transaction(input(TransactionType::CashWithdrawn, "30", 8))
            .unwrap();
        let before = snapshot(&l);

        fail.store(true, Ordering::SeqCst);
        assert!(matches!(
            l.create_bank_transaction(input(TransactionType::CashReceived, "10", 1)),
            Err(LedgerError::Storage(_))
        ));
        assert_eq!(snapshot(&l), before);
        assert!(matches!(
            l.update_bank_transaction(&first.id, input(TransactionType::CashReceived, "60", 5)),
            Err(LedgerError::Storage(_))
        ));
        assert_eq!(snapshot(&l), before);
        assert!(matches!(
            l.delete_bank_transaction(&first.id),
            Err(LedgerError::Storage(_))
        ));
        assert_eq!(snapshot(&l), before);

        fail.store(false, Ordering::SeqCst);
        l.create_bank_transaction(input(TransactionType::CashReceived, "10", 1))
            .unwrap();
        assert_eq!(balances(&l), vec![d("10"), d("110"), d("80")]);
    }
}

#[test]
fn balance_beyond_decimal_range_is_rejected() {
    for l in backends() {
        let huge = BankTransactionInput {
            amount: Decimal::MAX,
            ..input(TransactionType::CashReceived, "1", 1)
        };
        l.create_bank_transaction(huge.clone()).unwrap();
        let again = BankTransactionInput {
            transaction_date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            ..huge
        };
        assert!(matches!(
            l.create_bank_transaction(again),
            Err(LedgerError::Validation(_))
        ));
        assert_eq!(balances(&l), vec![Decimal::MAX]);

        l.create_bank_transaction(input(TransactionType::CashWithdrawn, "1", 3))
            .unwrap();
        assert_eq!(balances(&l), vec![Decimal::MAX, Decimal::MAX - d("1")]);
    }
}
