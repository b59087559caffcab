// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use charityledger::error::LedgerError;
use charityledger::ledger::Ledger;
use charityledger::models::{
    ConsumptionInput, CustomItem, GeneralExpense, ItemConsumed, ItemUnit, SourceType,
};
use charityledger::store::SqliteStore;
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
}

fn ledger() -> Ledger {
    Ledger::new(Box::new(SqliteStore::open_in_memory().unwrap()))
}

fn oil() -> GeneralExpense {
    GeneralExpense {
        name: "Cooking oil".into(),
        unit: ItemUnit::Liter,
        price: d("4"),
        quantity: d("10"),
        weight: None,
        expense_date: day(),
        notes: None,
    }
}

fn consume(source_type: SourceType, source_id: Option<String>) -> ConsumptionInput {
    ConsumptionInput {
        item_name: "Cooking oil".into(),
        unit: None,
        quantity: d("2"),
        weight: None,
        price: None,
        consumption_date: day(),
        notes: None,
        source_type,
        source_id,
    }
}

#[test]
fn unit_and_price_are_copied_from_expense_and_frozen() {
    let l = ledger();
    let expense = l.create(oil()).unwrap();
    let c = l
        .create_consumed_item(consume(SourceType::GeneralExpense, Some(expense.id.clone())))
        .unwrap();
    assert_eq!(c.data.unit, ItemUnit::Liter);
    assert_eq!(c.data.price, Some(d("4")));
    assert_eq!(c.data.cost(), d("8"));

    l.update(
        &expense.id,
        GeneralExpense {
            price: d("6"),
            unit: ItemUnit::Bottle,
            ..oil()
        },
    )
    .unwrap();
    let again = l.get::<ItemConsumed>(&c.id).unwrap();
    assert_eq!(again.data.price, Some(d("4")));
    assert_eq!(again.data.unit, ItemUnit::Liter);
}

#[test]
fn explicit_values_override_the_source() {
    let l = ledger();
    let expense = l.create(oil()).unwrap();
    let c = l
        .create_consumed_item(ConsumptionInput {
            unit: Some(ItemUnit::Bottle),
            price: Some(d("3")),
            ..consume(SourceType::GeneralExpense, Some(expense.id))
        })
        .unwrap();
    assert_eq!(c.data.unit, ItemUnit::Bottle);
    assert_eq!(c.data.price, Some(d("3")));
}

#[test]
fn custom_item_supplies_unit_but_no_price() {
    let l = ledger();
    let item = l
        .create(CustomItem {
            name: "Eggs".into(),
            unit: ItemUnit::Dozen,
        })
        .unwrap();
    let c = l
        .create_consumed_item(consume(SourceType::CustomItem, Some(item.id)))
        .unwrap();
    assert_eq!(c.data.unit, ItemUnit::Dozen);
    assert_eq!(c.data.price, None);
    assert_eq!(c.data.cost(), Decimal::ZERO);
}

#[test]
fn unit_is_required_without_a_source() {
    let l = ledger();
    let err = l
        .create_consumed_item(consume(SourceType::CustomItem, None))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    let c = l
        .create_consumed_item(ConsumptionInput {
            unit: Some(ItemUnit::Piece),
            ..consume(SourceType::CustomItem, None)
        })
        .unwrap();
    assert_eq!(c.data.source_id, None);
}

#[test]
fn unknown_source_is_not_found() {
    let l = ledger();
    let err = l
        .create_consumed_item(consume(SourceType::GeneralExpense, Some("gone".into())))
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));
    assert!(l.list::<ItemConsumed>().unwrap().is_empty());
}

#[test]
fn zero_quantity_is_rejected() {
    let l = ledger();
    let err = l
        .create_consumed_item(ConsumptionInput {
            unit: Some(ItemUnit::Kg),
            quantity: Decimal::ZERO,
            ..consume(SourceType::CustomItem, None)
        })
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[test]
fn expense_total_beyond_decimal_range_is_rejected() {
    let l = ledger();
    let err = l
        .create(GeneralExpense {
            price: Decimal::MAX,
            quantity: d("2"),
            ..oil()
        })
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert!(l.list::<GeneralExpense>().unwrap().is_empty());
}
