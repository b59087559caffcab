// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, LedgerResult};

/// Every persisted collection, with its SQLite table and its versioned
/// document key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Products,
    Sales,
    Expenses,
    MiscExpenses,
    CustomItems,
    CustomProducts,
    ConsumedItems,
    BankTransactions,
    FamilyPayments,
    FamilyMembers,
}

impl Collection {
    pub const ALL: [Collection; 10] = [
        Collection::Products,
        Collection::Sales,
        Collection::Expenses,
        Collection::MiscExpenses,
        Collection::CustomItems,
        Collection::CustomProducts,
        Collection::ConsumedItems,
        Collection::BankTransactions,
        Collection::FamilyPayments,
        Collection::FamilyMembers,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Sales => "sales",
            Collection::Expenses => "expenses",
            Collection::MiscExpenses => "misc_expenses",
            Collection::CustomItems => "custom_items",
            Collection::CustomProducts => "custom_products",
            Collection::ConsumedItems => "consumed_items",
            Collection::BankTransactions => "bank_transactions",
            Collection::FamilyPayments => "family_payments",
            Collection::FamilyMembers => "family_members",
        }
    }

    pub fn storage_key(self) -> &'static str {
        match self {
            Collection::Products => "charity.products.v4",
            Collection::Sales => "charity.sales.v2",
            Collection::Expenses => "charity.expenses.v1",
            Collection::MiscExpenses => "charity.misc_expenses.v1",
            Collection::CustomItems => "charity.custom_items.v1",
            Collection::CustomProducts => "charity.custom_products.v1",
            Collection::ConsumedItems => "charity.consumed_items.v1",
            Collection::BankTransactions => "charity.bank_transactions.v1",
            Collection::FamilyPayments => "charity.family_payments.v1",
            Collection::FamilyMembers => "charity.family_members.v1",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

impl FromStr for Collection {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_lowercase();
        Collection::ALL
            .into_iter()
            .find(|c| c.table() == wanted)
            .ok_or_else(|| LedgerError::invalid(format!("unknown collection '{}'", s)))
    }
}

macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(LedgerError::invalid(format!(
                        "invalid {} '{}', expected one of: {}",
                        stringify!($name),
                        other,
                        [$($text),+].join("|")
                    ))),
                }
            }
        }
    };
}

string_enum!(ProductUnit {
    Kg => "kg",
    Pack => "pack",
});

string_enum!(ItemUnit {
    Kg => "kg",
    Pack => "pack",
    Piece => "piece",
    Liter => "liter",
    Dozen => "dozen",
    Gram => "gram",
    Bottle => "bottle",
    Packet => "packet",
});

string_enum!(TransactionType {
    CashReceived => "cash_received",
    CashWithdrawn => "cash_withdrawn",
});

string_enum!(SourceType {
    GeneralExpense => "general_expense",
    CustomItem => "custom_item",
});

string_enum!(PaymentType {
    MonthlySupport => "monthly_support",
    Emergency => "emergency",
    SpecialOccasion => "special_occasion",
    Education => "education",
    Medical => "medical",
    Other => "other",
});

impl TransactionType {
    /// Contribution of `amount` to the running balance.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            TransactionType::CashReceived => amount,
            TransactionType::CashWithdrawn => -amount,
        }
    }
}

impl From<ProductUnit> for ItemUnit {
    fn from(u: ProductUnit) -> Self {
        match u {
            ProductUnit::Kg => ItemUnit::Kg,
            ProductUnit::Pack => ItemUnit::Pack,
        }
    }
}

/// A stored entity: store-assigned identity around the entity's fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub id: String,
    pub seq: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: T,
}

/// Marks a field struct as the body of a stored collection.
pub trait Entity: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;
}

/// Input checks for collections whose records carry no derived fields.
///
/// Sales and bank transactions deliberately do not implement this, so the
/// generic CRUD paths in [`crate::ledger::Ledger`] cannot bypass their
/// derivations.
pub trait Validate {
    fn validate(&self) -> LedgerResult<()>;
}

pub(crate) fn non_negative(field: &str, v: Decimal) -> LedgerResult<()> {
    if v < Decimal::ZERO {
        return Err(LedgerError::invalid(format!(
            "{} must not be negative (got {})",
            field, v
        )));
    }
    Ok(())
}

pub(crate) fn positive(field: &str, v: Decimal) -> LedgerResult<()> {
    if v <= Decimal::ZERO {
        return Err(LedgerError::invalid(format!(
            "{} must be greater than zero (got {})",
            field, v
        )));
    }
    Ok(())
}

/// Rejects a price x quantity that does not fit in a decimal.
pub(crate) fn representable_total(
    field: &str,
    price: Decimal,
    quantity: Decimal,
) -> LedgerResult<()> {
    if price.checked_mul(quantity).is_none() {
        return Err(LedgerError::invalid(format!("{} is out of range", field)));
    }
    Ok(())
}

pub(crate) fn required(field: &str, v: &str) -> LedgerResult<()> {
    if v.trim().is_empty() {
        return Err(LedgerError::invalid(format!("{} is required", field)));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub unit: ProductUnit,
    #[serde(default)]
    pub sale_price: Decimal,
    pub quantity: Decimal,
    pub buying_date: NaiveDate,
}

impl Entity for Product {
    const COLLECTION: Collection = Collection::Products;
}

impl Validate for Product {
    fn validate(&self) -> LedgerResult<()> {
        required("name", &self.name)?;
        non_negative("salePrice", self.sale_price)?;
        non_negative("quantity", self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomProduct {
    pub name: String,
    pub unit: ProductUnit,
}

impl Entity for CustomProduct {
    const COLLECTION: Collection = Collection::CustomProducts;
}

impl Validate for CustomProduct {
    fn validate(&self) -> LedgerResult<()> {
        required("name", &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomItem {
    pub name: String,
    pub unit: ItemUnit,
}

impl Entity for CustomItem {
    const COLLECTION: Collection = Collection::CustomItems;
}

impl Validate for CustomItem {
    fn validate(&self) -> LedgerResult<()> {
        required("name", &self.name)
    }
}

/// What a caller submits for a sale. `weight` and `arrears` are always
/// derived; `expected_cash` falls back to weight x price when omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleInput {
    pub product_id: String,
    pub weight_before_sale: Decimal,
    pub weight_after_sale: Decimal,
    pub price_per_kg: Decimal,
    #[serde(default)]
    pub expected_cash: Option<Decimal>,
    pub received_cash: Decimal,
    #[serde(default)]
    pub topup: Decimal,
    #[serde(default)]
    pub charity: Decimal,
    #[serde(default)]
    pub credit: Decimal,
    pub sale_date: NaiveDate,
    /// Accepted for compatibility with exported data and ignored.
    #[serde(default, skip_serializing)]
    pub arrears: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub product_id: String,
    pub weight_before_sale: Decimal,
    pub weight_after_sale: Decimal,
    pub weight: Decimal,
    pub price_per_kg: Decimal,
    pub expected_cash: Decimal,
    pub received_cash: Decimal,
    #[serde(default)]
    pub topup: Decimal,
    #[serde(default)]
    pub charity: Decimal,
    #[serde(default)]
    pub credit: Decimal,
    pub sale_date: NaiveDate,
    #[serde(default)]
    pub arrears: Decimal,
}

impl Entity for Sale {
    const COLLECTION: Collection = Collection::Sales;
}

impl Sale {
    /// Everything counted toward the sale's proceeds. Exact for any sale
    /// written through the ledger; saturates on out-of-range legacy data.
    pub fn total_received(&self) -> Decimal {
        self.received_cash
            .saturating_add(self.topup)
            .saturating_add(self.charity)
            .saturating_add(self.credit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankTransactionInput {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default)]
    pub running_balance: Decimal,
}

impl Entity for BankTransaction {
    const COLLECTION: Collection = Collection::BankTransactions;
}

impl BankTransaction {
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralExpense {
    pub name: String,
    pub unit: ItemUnit,
    pub price: Decimal,
    pub quantity: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Decimal>,
    pub expense_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for GeneralExpense {
    const COLLECTION: Collection = Collection::Expenses;
}

impl Validate for GeneralExpense {
    fn validate(&self) -> LedgerResult<()> {
        required("name", &self.name)?;
        non_negative("price", self.price)?;
        positive("quantity", self.quantity)?;
        representable_total("totalCost", self.price, self.quantity)?;
        if let Some(w) = self.weight {
            non_negative("weight", w)?;
        }
        Ok(())
    }
}

impl GeneralExpense {
    pub fn total_cost(&self) -> Decimal {
        self.price.saturating_mul(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiscExpense {
    pub name: String,
    pub price: Decimal,
    pub quantity: Decimal,
    pub expense_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for MiscExpense {
    const COLLECTION: Collection = Collection::MiscExpenses;
}

impl Validate for MiscExpense {
    fn validate(&self) -> LedgerResult<()> {
        required("name", &self.name)?;
        non_negative("price", self.price)?;
        positive("quantity", self.quantity)?;
        representable_total("totalCost", self.price, self.quantity)
    }
}

impl MiscExpense {
    pub fn total_cost(&self) -> Decimal {
        self.price.saturating_mul(self.quantity)
    }
}

/// Consumption entry as submitted. `unit` and `price` may be left empty and
/// are then copied from the source record at entry time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionInput {
    pub item_name: String,
    #[serde(default)]
    pub unit: Option<ItemUnit>,
    pub quantity: Decimal,
    #[serde(default)]
    pub weight: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
    pub consumption_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    pub source_type: SourceType,
    #[serde(default)]
    pub source_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemConsumed {
    pub item_name: String,
    pub unit: ItemUnit,
    pub quantity: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    pub consumption_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub source_type: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

impl Entity for ItemConsumed {
    const COLLECTION: Collection = Collection::ConsumedItems;
}

impl Validate for ItemConsumed {
    fn validate(&self) -> LedgerResult<()> {
        required("itemName", &self.item_name)?;
        positive("quantity", self.quantity)?;
        if let Some(w) = self.weight {
            non_negative("weight", w)?;
        }
        if let Some(p) = self.price {
            non_negative("price", p)?;
            representable_total("cost", p, self.quantity)?;
        }
        Ok(())
    }
}

impl ItemConsumed {
    /// Missing prices count as free.
    pub fn cost(&self) -> Decimal {
        self.price
            .unwrap_or(Decimal::ZERO)
            .saturating_mul(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub name: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_day: Option<u32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Entity for FamilyMember {
    const COLLECTION: Collection = Collection::FamilyMembers;
}

impl Validate for FamilyMember {
    fn validate(&self) -> LedgerResult<()> {
        required("name", &self.name)?;
        if let Some(a) = self.monthly_amount {
            non_negative("monthlyAmount", a)?;
        }
        if let Some(d) = self.payment_day {
            if !(1..=31).contains(&d) {
                return Err(LedgerError::invalid(format!(
                    "paymentDay must be between 1 and 31 (got {})",
                    d
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyPayment {
    pub family_member_name: String,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_type: PaymentType,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_payment_due: Option<NaiveDate>,
}

impl Entity for FamilyPayment {
    const COLLECTION: Collection = Collection::FamilyPayments;
}

impl Validate for FamilyPayment {
    fn validate(&self) -> LedgerResult<()> {
        required("familyMemberName", &self.family_member_name)?;
        non_negative("amount", self.amount)
    }
}
