//! Derived ledger events, delta maps, filters and accrual results.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::Positioned;

/// Net signed change of an outstanding level per calendar day, ordered by date.
pub type DeltaMap = BTreeMap<NaiveDate, f64>;

/// A dated signed change to one entity's outstanding level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub entity_key: String,
    pub event_date: NaiveDate,
    pub signed_amount: f64,
}

impl LedgerEvent {
    pub fn new(entity_key: impl Into<String>, event_date: NaiveDate, signed_amount: f64) -> Self {
        Self {
            entity_key: entity_key.into(),
            event_date,
            signed_amount,
        }
    }
}

/// Sums events into a per-day delta map. Order within a day is irrelevant.
pub fn fold_events<'a, I>(events: I) -> DeltaMap
where
    I: IntoIterator<Item = &'a LedgerEvent>,
{
    let mut deltas = DeltaMap::new();
    for event in events {
        *deltas.entry(event.event_date).or_insert(0.0) += event.signed_amount;
    }
    deltas
}

/// Output of one accrual run for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualResult {
    pub entity_key: String,
    pub total_accrued: f64,
    pub as_of_date: NaiveDate,
}

/// Optional equality predicates applied to source records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commodity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
}

impl EventFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn commodity(mut self, commodity: impl Into<String>) -> Self {
        self.commodity = non_blank(commodity.into());
        self
    }

    pub fn warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = non_blank(warehouse.into());
        self
    }

    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = non_blank(quality.into());
        self
    }

    pub fn is_unfiltered(&self) -> bool {
        self.commodity.is_none() && self.warehouse.is_none() && self.quality.is_none()
    }

    /// A set predicate never matches a record whose field is absent.
    pub fn matches<R: Positioned + ?Sized>(&self, record: &R) -> bool {
        field_matches(self.commodity.as_deref(), record.commodity())
            && field_matches(self.warehouse.as_deref(), record.warehouse())
            && field_matches(self.quality.as_deref(), record.quality())
    }

    /// Drops the quality predicate, for sources that carry no quality.
    pub fn without_quality(&self) -> Self {
        Self {
            quality: None,
            ..self.clone()
        }
    }
}

fn field_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match (wanted, actual) {
        (None, _) => true,
        (Some(wanted), Some(actual)) => wanted == actual,
        (Some(_), None) => false,
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
