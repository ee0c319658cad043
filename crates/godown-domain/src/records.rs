//! Source records consumed by the accrual engine.
//!
//! Dates and amounts are optional: rows coming from the bookkeeping layer are
//! not validated, and incomplete rows are skipped downstream.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

/// Stock received into a warehouse on behalf of a stockist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockEntry {
    pub id: Uuid,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub warehouse: Option<String>,
    pub stockist_name: String,
    #[serde(default)]
    pub commodity: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    pub quantity_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_quantity_kg: Option<f64>,
    /// Total purchase cost of the lot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl StockEntry {
    pub fn new(
        date: NaiveDate,
        stockist_name: impl Into<String>,
        warehouse: impl Into<String>,
        commodity: impl Into<String>,
        quantity_kg: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Some(date),
            warehouse: Some(warehouse.into()),
            stockist_name: stockist_name.into(),
            commodity: Some(commodity.into()),
            quality: None,
            quantity_kg: Some(quantity_kg),
            net_quantity_kg: None,
            cost: None,
        }
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }
}

/// Stock leaving a warehouse, optionally sold at `rate_per_kg`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockExit {
    pub id: Uuid,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub warehouse: Option<String>,
    pub stockist_name: String,
    #[serde(default)]
    pub commodity: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    pub quantity_kg: Option<f64>,
    /// Quantity after the commodity reduction, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_quantity_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_per_kg: Option<f64>,
}

impl StockExit {
    pub fn new(
        date: NaiveDate,
        stockist_name: impl Into<String>,
        warehouse: impl Into<String>,
        commodity: impl Into<String>,
        quantity_kg: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Some(date),
            warehouse: Some(warehouse.into()),
            stockist_name: stockist_name.into(),
            commodity: Some(commodity.into()),
            quality: None,
            quantity_kg: Some(quantity_kg),
            net_quantity_kg: None,
            rate_per_kg: None,
        }
    }

    pub fn with_net_quantity(mut self, net_quantity_kg: f64) -> Self {
        self.net_quantity_kg = Some(net_quantity_kg);
        self
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    pub fn with_rate(mut self, rate_per_kg: f64) -> Self {
        self.rate_per_kg = Some(rate_per_kg);
        self
    }

    /// Quantity that actually left the warehouse: net after reduction when known.
    pub fn effective_quantity_kg(&self) -> Option<f64> {
        self.net_quantity_kg.or(self.quantity_kg)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// Distinguishes loans paid out in cash from loans raised against margin.
pub enum LoanKind {
    Cash,
    Margin,
}

impl fmt::Display for LoanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoanKind::Cash => "Cash",
            LoanKind::Margin => "Margin",
        };
        f.write_str(label)
    }
}

/// Loan disbursed to a stockist against stored stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockistLoan {
    pub id: Uuid,
    pub date: Option<NaiveDate>,
    pub stockist_name: String,
    #[serde(default)]
    pub warehouse: Option<String>,
    #[serde(default)]
    pub commodity: Option<String>,
    pub kind: LoanKind,
    pub amount: Option<f64>,
}

impl StockistLoan {
    pub fn new(
        date: NaiveDate,
        stockist_name: impl Into<String>,
        kind: LoanKind,
        amount: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Some(date),
            stockist_name: stockist_name.into(),
            warehouse: None,
            commodity: None,
            kind,
            amount: Some(amount),
        }
    }

    pub fn at(mut self, warehouse: impl Into<String>, commodity: impl Into<String>) -> Self {
        self.warehouse = Some(warehouse.into());
        self.commodity = Some(commodity.into());
        self
    }
}

/// Margin paid in by a stockist, reducing the loan outstanding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarginPayment {
    pub id: Uuid,
    pub date: Option<NaiveDate>,
    pub stockist_name: String,
    #[serde(default)]
    pub warehouse: Option<String>,
    #[serde(default)]
    pub commodity: Option<String>,
    pub amount: Option<f64>,
}

impl MarginPayment {
    pub fn new(date: NaiveDate, stockist_name: impl Into<String>, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Some(date),
            stockist_name: stockist_name.into(),
            warehouse: None,
            commodity: None,
            amount: Some(amount),
        }
    }

    pub fn at(mut self, warehouse: impl Into<String>, commodity: impl Into<String>) -> Self {
        self.warehouse = Some(warehouse.into());
        self.commodity = Some(commodity.into());
        self
    }
}

/// Explicit loan repayment made by a stockist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockistRepayment {
    pub id: Uuid,
    pub date: Option<NaiveDate>,
    pub stockist_name: String,
    #[serde(default)]
    pub warehouse: Option<String>,
    #[serde(default)]
    pub commodity: Option<String>,
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_reference: Option<String>,
}

impl StockistRepayment {
    pub fn new(date: NaiveDate, stockist_name: impl Into<String>, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Some(date),
            stockist_name: stockist_name.into(),
            warehouse: None,
            commodity: None,
            amount: Some(amount),
            bank_reference: None,
        }
    }
}

/// Borrowing taken by the company itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyLoan {
    pub id: Uuid,
    pub date: Option<NaiveDate>,
    pub loan_amount: Option<f64>,
    #[serde(default)]
    pub total_processing_fee: f64,
}

impl CompanyLoan {
    pub fn new(date: NaiveDate, loan_amount: f64, total_processing_fee: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Some(date),
            loan_amount: Some(loan_amount),
            total_processing_fee,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyRepayment {
    pub id: Uuid,
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
}

impl CompanyRepayment {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Some(date),
            amount: Some(amount),
        }
    }
}

macro_rules! impl_identifiable_dated {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identifiable for $ty {
                fn id(&self) -> Uuid {
                    self.id
                }
            }

            impl Dated for $ty {
                fn date(&self) -> Option<NaiveDate> {
                    self.date
                }
            }
        )*
    };
}

impl_identifiable_dated!(
    StockEntry,
    StockExit,
    StockistLoan,
    MarginPayment,
    StockistRepayment,
    CompanyLoan,
    CompanyRepayment,
);

macro_rules! impl_owned_by_entity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl OwnedByEntity for $ty {
                fn entity_name(&self) -> &str {
                    &self.stockist_name
                }
            }
        )*
    };
}

impl_owned_by_entity!(
    StockEntry,
    StockExit,
    StockistLoan,
    MarginPayment,
    StockistRepayment
);

impl Positioned for StockEntry {
    fn warehouse(&self) -> Option<&str> {
        self.warehouse.as_deref()
    }

    fn commodity(&self) -> Option<&str> {
        self.commodity.as_deref()
    }

    fn quality(&self) -> Option<&str> {
        self.quality.as_deref()
    }
}

impl Positioned for StockExit {
    fn warehouse(&self) -> Option<&str> {
        self.warehouse.as_deref()
    }

    fn commodity(&self) -> Option<&str> {
        self.commodity.as_deref()
    }

    fn quality(&self) -> Option<&str> {
        self.quality.as_deref()
    }
}

impl Positioned for StockistLoan {
    fn warehouse(&self) -> Option<&str> {
        self.warehouse.as_deref()
    }

    fn commodity(&self) -> Option<&str> {
        self.commodity.as_deref()
    }
}

impl Positioned for MarginPayment {
    fn warehouse(&self) -> Option<&str> {
        self.warehouse.as_deref()
    }

    fn commodity(&self) -> Option<&str> {
        self.commodity.as_deref()
    }
}

impl Positioned for StockistRepayment {
    fn warehouse(&self) -> Option<&str> {
        self.warehouse.as_deref()
    }

    fn commodity(&self) -> Option<&str> {
        self.commodity.as_deref()
    }
}
