// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use charityledger::error::LedgerError;
use charityledger::ledger::Ledger;
use charityledger::models::{
    BankTransactionInput, ConsumptionInput, FamilyMember, FamilyPayment, GeneralExpense,
    ItemConsumed, ItemUnit, MiscExpense, PaymentType, Record, Sale, SaleInput, SourceType,
    TransactionType,
};
use charityledger::reports::{Books, account_summary, daily_summaries, family_summary, totals};
use charityledger::store::SqliteStore;
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, day).unwrap()
}

struct Fixture {
    sales: Vec<Record<Sale>>,
    consumed: Vec<Record<ItemConsumed>>,
    expenses: Vec<Record<GeneralExpense>>,
    misc: Vec<Record<MiscExpense>>,
}

impl Fixture {
    fn books(&self) -> Books<'_> {
        Books {
            sales: &self.sales,
            consumed: &self.consumed,
            expenses: &self.expenses,
            misc_expenses: &self.misc,
        }
    }
}

fn fixture() -> Fixture {
    let l = Ledger::new(Box::new(SqliteStore::open_in_memory().unwrap()));
    for (day, received) in [(1, "10"), (1, "5"), (3, "20")] {
        l.create_sale(SaleInput {
            product_id: "p".into(),
            weight_before_sale: d("10"),
            weight_after_sale: d("5"),
            price_per_kg: d("4"),
            received_cash: d(received),
            topup: d("1"),
            sale_date: date(6, day),
            ..Default::default()
        })
        .unwrap();
    }
    l.create_consumed_item(ConsumptionInput {
        item_name: "Flour".into(),
        unit: Some(ItemUnit::Kg),
        quantity: d("2"),
        weight: None,
        price: Some(d("1.5")),
        consumption_date: date(6, 3),
        notes: None,
        source_type: SourceType::CustomItem,
        source_id: None,
    })
    .unwrap();
    l.create(GeneralExpense {
        name: "Gas".into(),
        unit: ItemUnit::Bottle,
        price: d("7"),
        quantity: d("1"),
        weight: None,
        expense_date: date(6, 2),
        notes: None,
    })
    .unwrap();
    l.create(MiscExpense {
        name: "Bags".into(),
        price: d("0.5"),
        quantity: d("4"),
        expense_date: date(7, 1),
        notes: None,
    })
    .unwrap();
    Fixture {
        sales: l.list().unwrap(),
        consumed: l.list().unwrap(),
        expenses: l.list().unwrap(),
        misc: l.list().unwrap(),
    }
}

#[test]
fn daily_rows_are_newest_first_with_profit() {
    let f = fixture();
    let rows = daily_summaries(&f.books()).unwrap();
    let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![date(7, 1), date(6, 3), date(6, 2), date(6, 1)]);

    let first = &rows[3];
    assert_eq!(first.sales_count, 2);
    assert_eq!(first.sales_revenue, d("17"));
    assert_eq!(first.profit, d("17"));

    let third = &rows[1];
    assert_eq!(third.sales_revenue, d("21"));
    assert_eq!(third.consumption_cost, d("3"));
    assert_eq!(third.profit, d("18"));

    assert_eq!(rows[2].expense_cost, d("7"));
    assert_eq!(rows[2].profit, d("-7"));
    assert_eq!(rows[0].expense_cost, d("2"));
}

#[test]
fn totals_cover_everything_or_one_month() {
    let f = fixture();
    let all = totals(&f.books(), None).unwrap();
    assert_eq!(all.sales_revenue, d("38"));
    assert_eq!(all.consumption_cost, d("3"));
    assert_eq!(all.expense_cost, d("7"));
    assert_eq!(all.misc_expense_cost, d("2"));
    assert_eq!(all.total_cost, d("12"));
    assert_eq!(all.profit, d("26"));
    assert_eq!(all.expense_count, 2);

    let july = totals(&f.books(), Some((2025, 7))).unwrap();
    assert_eq!(july.sales_count, 0);
    assert_eq!(july.misc_expense_cost, d("2"));
    assert_eq!(july.profit, d("-2"));
}

#[test]
fn account_summary_matches_last_running_balance() {
    let l = Ledger::new(Box::new(SqliteStore::open_in_memory().unwrap()));
    for (kind, amount, day) in [
        (TransactionType::CashReceived, "80", 4),
        (TransactionType::CashWithdrawn, "25", 9),
        (TransactionType::CashReceived, "5", 2),
    ] {
        l.create_bank_transaction(BankTransactionInput {
            kind,
            amount: d(amount),
            transaction_date: date(8, day),
            description: String::new(),
            notes: None,
            reference: None,
        })
        .unwrap();
    }
    let txns = l.bank_transactions().unwrap();
    let s = account_summary(&txns).unwrap();
    assert_eq!(s.total_cash_received, d("85"));
    assert_eq!(s.total_cash_withdrawn, d("25"));
    assert_eq!(s.current_balance, d("60"));
    assert_eq!(s.current_balance, txns.last().unwrap().data.running_balance);
    assert_eq!(s.last_transaction_date, Some(date(8, 9)));
    assert_eq!(s.transaction_count, 3);
}

#[test]
fn family_summary_counts_month_year_and_upcoming() {
    let l = Ledger::new(Box::new(SqliteStore::open_in_memory().unwrap()));
    let member = |name: &str, day: u32, active: bool| FamilyMember {
        name: name.into(),
        relationship: String::new(),
        monthly_amount: Some(d("30")),
        payment_day: Some(day),
        is_active: active,
        notes: None,
    };
    l.create(member("A", 20, true)).unwrap();
    l.create(member("B", 5, true)).unwrap();
    l.create(member("C", 25, false)).unwrap();
    for (on, amount) in [
        (date(9, 3), "30"),
        (date(2, 1), "10"),
        (NaiveDate::from_ymd_opt(2024, 9, 3).unwrap(), "99"),
    ] {
        l.create(FamilyPayment {
            family_member_name: "A".into(),
            amount: d(amount),
            payment_date: on,
            payment_type: PaymentType::Other,
            description: String::new(),
            notes: None,
            is_recurring: false,
            next_payment_due: None,
        })
        .unwrap();
    }
    let payments: Vec<Record<FamilyPayment>> = l.list().unwrap();
    let members: Vec<Record<FamilyMember>> = l.list().unwrap();
    let s = family_summary(&payments, &members, date(9, 10)).unwrap();
    assert_eq!(s.total_paid_this_month, d("30"));
    assert_eq!(s.total_paid_this_year, d("40"));
    assert_eq!(s.active_family_members, 2);
    assert_eq!(s.upcoming_payments, 1);
    assert_eq!(s.last_payment_date, Some(date(9, 3)));
    assert_eq!(s.payment_count, 3);
}

#[test]
fn report_total_beyond_decimal_range_is_an_error() {
    let l = Ledger::new(Box::new(SqliteStore::open_in_memory().unwrap()));
    for day in [1, 2] {
        l.create(FamilyPayment {
            family_member_name: "A".into(),
            amount: Decimal::MAX,
            payment_date: date(3, day),
            payment_type: PaymentType::Other,
            description: String::new(),
            notes: None,
            is_recurring: false,
            next_payment_due: None,
        })
        .unwrap();
    }
    let payments: Vec<Record<FamilyPayment>> = l.list().unwrap();
    assert!(matches!(
        family_summary(&payments, &[], date(3, 10)),
        Err(LedgerError::Validation(_))
    ));
}
