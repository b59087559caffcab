// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use charityledger::commands::doctor;
use charityledger::ledger::{Ledger, Reconciled};
use charityledger::models::Sale;
use charityledger::store::JsonFileStore;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;

fn drifted_ledger(dir: &std::path::Path) -> Ledger {
    let path = dir.join("ledger.json");
    let doc = json!({
        "charity.products.v4": [
            {"id": "p1", "seq": 1, "createdAt": "2025-01-01T00:00:00Z", "updatedAt": "2025-01-01T00:00:00Z",
             "name": "Rice", "unit": "kg", "salePrice": "3", "quantity": "10", "buyingDate": "2025-01-01"}
        ],
        "charity.sales.v2": [
            {"id": "s2", "seq": 2, "createdAt": "2025-01-03T00:00:00Z", "updatedAt": "2025-01-03T00:00:00Z",
             "productId": "gone", "weightBeforeSale": "5", "weightAfterSale": "3", "weight": "2",
             "pricePerKg": "3", "expectedCash": "6", "receivedCash": "6", "saleDate": "2025-01-03", "arrears": "0"},
            {"id": "s1", "seq": 1, "createdAt": "2025-01-02T00:00:00Z", "updatedAt": "2025-01-02T00:00:00Z",
             "productId": "p1", "weightBeforeSale": "10", "weightAfterSale": "6", "weight": "4",
             "pricePerKg": "3", "expectedCash": "12", "receivedCash": "10", "topup": "1",
             "saleDate": "2025-01-02", "arrears": "5"}
        ],
        "charity.bank_transactions.v1": [
            {"id": "b2", "seq": 2, "createdAt": "2025-01-02T00:00:00Z", "updatedAt": "2025-01-02T00:00:00Z",
             "type": "cash_withdrawn", "amount": "20", "transactionDate": "2025-01-02", "runningBalance": "0"},
            {"id": "b1", "seq": 1, "createdAt": "2025-01-01T00:00:00Z", "updatedAt": "2025-01-01T00:00:00Z",
             "type": "cash_received", "amount": "50", "transactionDate": "2025-01-01", "runningBalance": "50"}
        ],
        "charity.consumed_items.v1": [
            {"id": "c1", "seq": 1, "createdAt": "2025-01-02T00:00:00Z", "updatedAt": "2025-01-02T00:00:00Z",
             "itemName": "Oil", "unit": "liter", "quantity": "1", "consumptionDate": "2025-01-02",
             "sourceType": "general_expense", "sourceId": "missing"}
        ]
    });
    std::fs::write(&path, doc.to_string()).unwrap();
    Ledger::new(Box::new(JsonFileStore::open(&path).unwrap()))
}

#[test]
fn doctor_reports_every_kind_of_problem() {
    let dir = tempdir().unwrap();
    let l = drifted_ledger(dir.path());
    let issues = doctor::diagnose(&l).unwrap();
    let kinds: Vec<&str> = issues.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        kinds,
        vec![
            "sale_unknown_product",
            "arrears_drift",
            "balance_drift",
            "consumption_missing_source"
        ]
    );
    assert_eq!(issues[1].1, "s1 stored 5 computed 1");
    assert_eq!(issues[2].1, "b2 stored 0 computed 30");
}

#[test]
fn reconcile_rewrites_only_drifted_records() {
    let dir = tempdir().unwrap();
    let l = drifted_ledger(dir.path());
    let before = l.get::<Sale>("s2").unwrap();

    let fixed = l.reconcile().unwrap();
    assert_eq!(
        fixed,
        Reconciled {
            sales: 1,
            bank_transactions: 1
        }
    );
    assert_eq!(l.get::<Sale>("s1").unwrap().data.arrears, Decimal::ONE);
    assert_eq!(l.get::<Sale>("s2").unwrap().updated_at, before.updated_at);
    let balances: Vec<Decimal> = l
        .bank_transactions()
        .unwrap()
        .iter()
        .map(|t| t.data.running_balance)
        .collect();
    assert_eq!(balances, vec![Decimal::from(50), Decimal::from(30)]);

    assert_eq!(l.reconcile().unwrap(), Reconciled::default());
    let remaining = doctor::diagnose(&l).unwrap();
    assert_eq!(remaining.len(), 2);
}

#[test]
fn reconciled_values_persist() {
    let dir = tempdir().unwrap();
    drifted_ledger(dir.path()).reconcile().unwrap();
    let l = Ledger::new(Box::new(
        JsonFileStore::open(&dir.path().join("ledger.json")).unwrap(),
    ));
    assert_eq!(l.get::<Sale>("s1").unwrap().data.arrears, Decimal::ONE);
}
