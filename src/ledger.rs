// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The ledger service: every write goes through here so derived fields stay
//! consistent with the raw inputs held by the store.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};

use crate::calc::{
    chronological_order, compute_arrears, compute_expected_cash, compute_running_balances,
    compute_weight_sold,
};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    BankTransaction, BankTransactionInput, Collection, ConsumptionInput, CustomItem, Entity,
    FamilyMember, FamilyPayment, GeneralExpense, ItemConsumed, PaymentType, Product, Record, Sale,
    SaleInput, SourceType, Validate, non_negative, positive, required,
};
use crate::store::{RawRecord, RecordStore, encode};

/// Counts of records whose derived fields were refreshed by [`Ledger::reconcile`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    pub sales: usize,
    pub bank_transactions: usize,
}

/// Owns the record store. All operations serialize on one lock, so a
/// multi-record rebalance is never observed half done.
pub struct Ledger {
    store: Mutex<Box<dyn RecordStore>>,
}

impl Ledger {
    pub fn new(store: Box<dyn RecordStore>) -> Self {
        Ledger {
            store: Mutex::new(store),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn RecordStore>> {
        self.store.lock().unwrap_or_else(|p| p.into_inner())
    }

    // ---- generic collections -------------------------------------------

    /// Records in store order (newest first).
    pub fn list<T: Entity>(&self) -> LedgerResult<Vec<Record<T>>> {
        let store = self.lock();
        decode_all(&**store)
    }

    pub fn get<T: Entity>(&self, id: &str) -> LedgerResult<Record<T>> {
        let store = self.lock();
        fetch(&**store, id)
    }

    pub fn create<T: Entity + Validate>(&self, data: T) -> LedgerResult<Record<T>> {
        data.validate()?;
        let body = encode(T::COLLECTION, &data)?;
        let mut store = self.lock();
        let raw = store.create(T::COLLECTION, body)?;
        tracing::info!(collection = %T::COLLECTION, id = %raw.id, "created");
        raw.decode(T::COLLECTION)
    }

    pub fn update<T: Entity + Validate>(&self, id: &str, data: T) -> LedgerResult<Record<T>> {
        data.validate()?;
        let body = encode(T::COLLECTION, &data)?;
        let mut store = self.lock();
        let raw = store.update(T::COLLECTION, id, body)?;
        tracing::info!(collection = %T::COLLECTION, %id, "updated");
        raw.decode(T::COLLECTION)
    }

    pub fn delete<T: Entity + Validate>(&self, id: &str) -> LedgerResult<()> {
        let mut store = self.lock();
        store.delete(T::COLLECTION, id)?;
        tracing::info!(collection = %T::COLLECTION, %id, "deleted");
        Ok(())
    }

    /// Raw JSON view of a collection, for export.
    pub fn snapshot(&self, collection: Collection) -> LedgerResult<Vec<Value>> {
        let store = self.lock();
        store
            .list(collection)?
            .iter()
            .map(|r| serde_json::to_value(r).map_err(LedgerError::from))
            .collect()
    }

    // ---- sales -----------------------------------------------------------

    pub fn create_sale(&self, input: SaleInput) -> LedgerResult<Record<Sale>> {
        let sale = derive_sale(input)?;
        let body = encode(Collection::Sales, &sale)?;
        let mut store = self.lock();
        let raw = store.create(Collection::Sales, body)?;
        tracing::info!(id = %raw.id, arrears = %sale.arrears, "sale recorded");
        raw.decode(Collection::Sales)
    }

    pub fn update_sale(&self, id: &str, input: SaleInput) -> LedgerResult<Record<Sale>> {
        let sale = derive_sale(input)?;
        let body = encode(Collection::Sales, &sale)?;
        let mut store = self.lock();
        let raw = store.update(Collection::Sales, id, body)?;
        tracing::info!(%id, arrears = %sale.arrears, "sale updated");
        raw.decode(Collection::Sales)
    }

    pub fn delete_sale(&self, id: &str) -> LedgerResult<()> {
        let mut store = self.lock();
        store.delete(Collection::Sales, id)?;
        tracing::info!(%id, "sale deleted");
        Ok(())
    }

    /// The product's sale price when one is set, for pre-filling a sale.
    pub fn sale_price_hint(&self, product_id: &str) -> LedgerResult<Option<Decimal>> {
        let product: Record<Product> = self.get(product_id)?;
        Ok(Some(product.data.sale_price).filter(|p| *p > Decimal::ZERO))
    }

    // ---- bank ------------------------------------------------------------

    /// Bank transactions in chronological order with their running balances.
    pub fn bank_transactions(&self) -> LedgerResult<Vec<Record<BankTransaction>>> {
        let store = self.lock();
        let mut records = decode_all(&**store)?;
        chronological_order(&mut records);
        Ok(records)
    }

    pub fn create_bank_transaction(
        &self,
        input: BankTransactionInput,
    ) -> LedgerResult<Record<BankTransaction>> {
        let body = encode(Collection::BankTransactions, &bank_body(input)?)?;
        let mut store = self.lock();
        let mut new_id = String::new();
        let mut ordered = Vec::new();
        store.atomic(&mut |s: &mut dyn RecordStore| {
            new_id = s.create(Collection::BankTransactions, body.clone())?.id;
            ordered = rebalance(s)?;
            Ok(())
        })?;
        tracing::info!(id = %new_id, "bank transaction recorded");
        take(ordered, &new_id)
    }

    pub fn update_bank_transaction(
        &self,
        id: &str,
        input: BankTransactionInput,
    ) -> LedgerResult<Record<BankTransaction>> {
        let body = encode(Collection::BankTransactions, &bank_body(input)?)?;
        let mut store = self.lock();
        let mut ordered = Vec::new();
        store.atomic(&mut |s: &mut dyn RecordStore| {
            s.update(Collection::BankTransactions, id, body.clone())?;
            ordered = rebalance(s)?;
            Ok(())
        })?;
        tracing::info!(%id, "bank transaction updated");
        take(ordered, id)
    }

    pub fn delete_bank_transaction(&self, id: &str) -> LedgerResult<()> {
        let mut store = self.lock();
        store.atomic(&mut |s: &mut dyn RecordStore| {
            s.delete(Collection::BankTransactions, id)?;
            rebalance(s)?;
            Ok(())
        })?;
        tracing::info!(%id, "bank transaction deleted");
        Ok(())
    }

    // ---- consumption -----------------------------------------------------

    /// Records a consumption, filling unit and price from the source record
    /// when they were left out. The copy is a snapshot: later edits to the
    /// source are not propagated.
    pub fn create_consumed_item(&self, input: ConsumptionInput) -> LedgerResult<Record<ItemConsumed>> {
        let (mut unit, mut price) = (input.unit, input.price);
        if let Some(source_id) = input.source_id.as_deref() {
            match input.source_type {
                SourceType::GeneralExpense => {
                    let source: Record<GeneralExpense> = self.get(source_id)?;
                    unit = unit.or(Some(source.data.unit));
                    price = price.or(Some(source.data.price));
                }
                SourceType::CustomItem => {
                    let source: Record<CustomItem> = self.get(source_id)?;
                    unit = unit.or(Some(source.data.unit));
                }
            }
        }
        let unit = unit.ok_or_else(|| LedgerError::invalid("unit is required"))?;
        self.create(ItemConsumed {
            item_name: input.item_name,
            unit,
            quantity: input.quantity,
            weight: input.weight,
            price,
            consumption_date: input.consumption_date,
            notes: input.notes,
            source_type: input.source_type,
            source_id: input.source_id,
        })
    }

    // ---- family ----------------------------------------------------------

    /// A monthly-support payment pre-filled from an active member's record.
    pub fn quick_payment(&self, member_name: &str, today: NaiveDate) -> LedgerResult<FamilyPayment> {
        let members: Vec<Record<FamilyMember>> = self.list()?;
        let member = members
            .into_iter()
            .find(|m| m.data.is_active && m.data.name.eq_ignore_ascii_case(member_name.trim()))
            .ok_or_else(|| LedgerError::not_found(Collection::FamilyMembers.table(), member_name))?
            .data;
        Ok(FamilyPayment {
            description: format!("Monthly support for {}", member.name),
            family_member_name: member.name,
            amount: member.monthly_amount.unwrap_or(Decimal::ZERO),
            payment_date: today,
            payment_type: PaymentType::MonthlySupport,
            notes: None,
            is_recurring: true,
            next_payment_due: member.payment_day.and_then(|d| next_due(today, d)),
        })
    }

    // ---- maintenance -----------------------------------------------------

    /// Recomputes every sale's arrears and every running balance, rewriting
    /// only records that drifted.
    pub fn reconcile(&self) -> LedgerResult<Reconciled> {
        let mut store = self.lock();
        let mut counts = Reconciled::default();
        store.atomic(&mut |s: &mut dyn RecordStore| {
            let mut drifted = Vec::new();
            for raw in s.list(Collection::Sales)? {
                let mut sale: Record<Sale> = raw.decode(Collection::Sales)?;
                let arrears = arrears_of(&sale.data)?;
                if sale.data.arrears != arrears {
                    tracing::warn!(id = %sale.id, stored = %sale.data.arrears, %arrears, "arrears drift");
                    sale.data.arrears = arrears;
                    drifted.push(to_raw(Collection::Sales, &sale)?);
                }
            }
            s.rewrite(Collection::Sales, &drifted)?;
            counts.sales = drifted.len();
            counts.bank_transactions = rebalance_counted(s)?.1;
            Ok(())
        })?;
        Ok(counts)
    }
}

fn decode_all<T: Entity>(store: &dyn RecordStore) -> LedgerResult<Vec<Record<T>>> {
    store
        .list(T::COLLECTION)?
        .iter()
        .map(|r| r.decode(T::COLLECTION))
        .collect()
}

fn fetch<T: Entity>(store: &dyn RecordStore, id: &str) -> LedgerResult<Record<T>> {
    store
        .get(T::COLLECTION, id)?
        .ok_or_else(|| LedgerError::not_found(T::COLLECTION.table(), id))?
        .decode(T::COLLECTION)
}

fn to_raw<T: Entity>(collection: Collection, r: &Record<T>) -> LedgerResult<RawRecord> {
    Ok(RawRecord {
        id: r.id.clone(),
        seq: r.seq,
        created_at: r.created_at,
        updated_at: r.updated_at,
        body: encode(collection, &r.data)?,
    })
}

fn arrears_of(s: &Sale) -> LedgerResult<Decimal> {
    compute_arrears(s.expected_cash, s.received_cash, s.topup, s.charity, s.credit)
}

/// Validates a sale input and computes its derived fields. Any arrears the
/// caller supplied is discarded.
fn derive_sale(input: SaleInput) -> LedgerResult<Sale> {
    required("productId", &input.product_id)?;
    non_negative("weightBeforeSale", input.weight_before_sale)?;
    non_negative("weightAfterSale", input.weight_after_sale)?;
    let weight = compute_weight_sold(input.weight_before_sale, input.weight_after_sale)?;
    positive("weight", weight)?;
    non_negative("pricePerKg", input.price_per_kg)?;
    let expected_cash = match input.expected_cash {
        Some(v) => v,
        None => compute_expected_cash(weight, input.price_per_kg)?,
    };
    non_negative("expectedCash", expected_cash)?;
    non_negative("receivedCash", input.received_cash)?;
    non_negative("topup", input.topup)?;
    non_negative("charity", input.charity)?;
    non_negative("credit", input.credit)?;

    let mut sale = Sale {
        product_id: input.product_id.trim().to_string(),
        weight_before_sale: input.weight_before_sale,
        weight_after_sale: input.weight_after_sale,
        weight,
        price_per_kg: input.price_per_kg,
        expected_cash,
        received_cash: input.received_cash,
        topup: input.topup,
        charity: input.charity,
        credit: input.credit,
        sale_date: input.sale_date,
        arrears: Decimal::ZERO,
    };
    sale.arrears = arrears_of(&sale)?;
    Ok(sale)
}

fn bank_body(input: BankTransactionInput) -> LedgerResult<BankTransaction> {
    non_negative("amount", input.amount)?;
    Ok(BankTransaction {
        kind: input.kind,
        amount: input.amount,
        transaction_date: input.transaction_date,
        description: input.description,
        notes: input.notes,
        reference: input.reference,
        running_balance: Decimal::ZERO,
    })
}

/// Recomputes the running balance of the whole collection in chronological
/// order and persists the records whose balance changed.
fn rebalance(store: &mut dyn RecordStore) -> LedgerResult<Vec<Record<BankTransaction>>> {
    Ok(rebalance_counted(store)?.0)
}

fn rebalance_counted(
    store: &mut dyn RecordStore,
) -> LedgerResult<(Vec<Record<BankTransaction>>, usize)> {
    let mut records: Vec<Record<BankTransaction>> = decode_all(&*store)?;
    chronological_order(&mut records);
    let plain: Vec<BankTransaction> = records.iter().map(|r| r.data.clone()).collect();
    let balances = compute_running_balances(&plain)?;

    let mut changed = Vec::new();
    for (record, balance) in records.iter_mut().zip(balances) {
        if record.data.running_balance != balance {
            record.data.running_balance = balance;
            changed.push(to_raw(Collection::BankTransactions, record)?);
        }
    }
    if !changed.is_empty() {
        store.rewrite(Collection::BankTransactions, &changed)?;
        tracing::debug!(count = changed.len(), "running balances rewritten");
    }
    Ok((records, changed.len()))
}

fn take(
    records: Vec<Record<BankTransaction>>,
    id: &str,
) -> LedgerResult<Record<BankTransaction>> {
    records
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(|| LedgerError::not_found(Collection::BankTransactions.table(), id))
}

/// `day` of next month, pulled back to the month's last day when needed.
fn next_due(today: NaiveDate, day: u32) -> Option<NaiveDate> {
    let first = today.with_day(1)?.checked_add_months(Months::new(1))?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?.day();
    first.with_day(day.min(last))
}
