//! Turns raw records into dated signed events and per-day delta maps.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use godown_domain::{
    entity_key, fold_events, kg_to_tons, Dated, DeltaMap, EventFilter, LedgerEvent,
    OwnedByEntity, Positioned,
};

use crate::source::RecordSource;

/// Entity key used for the company's own borrowing.
pub const COMPANY_ENTITY: &str = "COMPANY";

/// Which stockist records reduce the interest-bearing balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestBasis {
    /// Loans raise the balance; margin payments lower it.
    LoansAndMargins,
    /// As `LoansAndMargins`, with explicit repayments also lowering it.
    WithRepayments,
}

/// A distinct stockist holding stock of one commodity in one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RentalPosition {
    pub stockist: String,
    pub warehouse: String,
    pub commodity: String,
}

pub struct EventExtractor;

impl EventExtractor {
    pub fn interest_events<S: RecordSource + ?Sized>(
        source: &S,
        entity: &str,
        as_of: NaiveDate,
        filter: &EventFilter,
        basis: InterestBasis,
    ) -> Vec<LedgerEvent> {
        // Money rows carry no quality.
        let filter = filter.without_quality();
        let mut events: Vec<LedgerEvent> = source
            .loans()
            .iter()
            .filter_map(|loan| stockist_event(loan, entity, as_of, &filter, loan.amount, 1.0))
            .collect();
        events.extend(source.margins().iter().filter_map(|margin| {
            stockist_event(margin, entity, as_of, &filter, margin.amount, -1.0)
        }));
        if basis == InterestBasis::WithRepayments {
            events.extend(source.repayments().iter().filter_map(|repayment| {
                stockist_event(repayment, entity, as_of, &filter, repayment.amount, -1.0)
            }));
        }
        events
    }

    pub fn interest_deltas<S: RecordSource + ?Sized>(
        source: &S,
        entity: &str,
        as_of: NaiveDate,
        filter: &EventFilter,
        basis: InterestBasis,
    ) -> DeltaMap {
        fold_events(&Self::interest_events(source, entity, as_of, filter, basis))
    }

    /// Inflows and outflows in metric tons. Outflows use the net quantity when recorded.
    pub fn rental_events<S: RecordSource + ?Sized>(
        source: &S,
        entity: &str,
        as_of: NaiveDate,
        filter: &EventFilter,
    ) -> Vec<LedgerEvent> {
        let mut events: Vec<LedgerEvent> = source
            .stock_entries()
            .iter()
            .filter_map(|entry| {
                stockist_event(entry, entity, as_of, filter, entry.quantity_kg.map(kg_to_tons), 1.0)
            })
            .collect();
        events.extend(source.stock_exits().iter().filter_map(|exit| {
            let tons = exit.effective_quantity_kg().map(kg_to_tons);
            stockist_event(exit, entity, as_of, filter, tons, -1.0)
        }));
        events
    }

    pub fn rental_deltas<S: RecordSource + ?Sized>(
        source: &S,
        entity: &str,
        as_of: NaiveDate,
        filter: &EventFilter,
    ) -> DeltaMap {
        fold_events(&Self::rental_events(source, entity, as_of, filter))
    }

    pub fn company_events<S: RecordSource + ?Sized>(source: &S, as_of: NaiveDate) -> Vec<LedgerEvent> {
        let mut events: Vec<LedgerEvent> = source
            .company_loans()
            .iter()
            .filter_map(|loan| company_event(loan, as_of, loan.loan_amount, 1.0))
            .collect();
        events.extend(
            source
                .company_repayments()
                .iter()
                .filter_map(|repayment| company_event(repayment, as_of, repayment.amount, -1.0)),
        );
        events
    }

    pub fn company_deltas<S: RecordSource + ?Sized>(source: &S, as_of: NaiveDate) -> DeltaMap {
        fold_events(&Self::company_events(source, as_of))
    }

    /// Point-in-time net stock in tons, floored at zero. Ignores holding time.
    pub fn net_stock_tons<S: RecordSource + ?Sized>(
        source: &S,
        entity: &str,
        as_of: NaiveDate,
        filter: &EventFilter,
    ) -> f64 {
        let net: f64 = Self::rental_events(source, entity, as_of, filter)
            .iter()
            .map(|event| event.signed_amount)
            .sum();
        net.max(0.0)
    }

    /// Stockists with any loan, margin or repayment on or before `as_of`, by display name.
    pub fn interest_entities<S: RecordSource + ?Sized>(source: &S, as_of: NaiveDate) -> Vec<String> {
        let mut names = BTreeMap::new();
        let rows = source
            .loans()
            .iter()
            .map(|r| (r.entity_name(), r.date()))
            .chain(source.margins().iter().map(|r| (r.entity_name(), r.date())))
            .chain(source.repayments().iter().map(|r| (r.entity_name(), r.date())));
        for (name, date) in rows {
            if matches!(date, Some(date) if date <= as_of) && !name.trim().is_empty() {
                names
                    .entry(entity_key(name))
                    .or_insert_with(|| name.trim().to_string());
            }
        }
        names.into_values().collect()
    }

    /// Distinct `(stockist, warehouse, commodity)` triples with stock movement on or before `as_of`.
    pub fn rental_positions<S: RecordSource + ?Sized>(
        source: &S,
        as_of: NaiveDate,
        filter: &EventFilter,
    ) -> Vec<RentalPosition> {
        let mut positions = BTreeMap::new();
        let rows = source
            .stock_entries()
            .iter()
            .map(|r| position_of(r, as_of, filter))
            .chain(source.stock_exits().iter().map(|r| position_of(r, as_of, filter)));
        for position in rows.flatten() {
            let key = (
                entity_key(&position.stockist),
                position.warehouse.clone(),
                position.commodity.clone(),
            );
            positions.entry(key).or_insert(position);
        }
        positions.into_values().collect()
    }

    /// Every stockist that ever moved stock on or before `as_of`, by display name.
    pub fn stock_entities<S: RecordSource + ?Sized>(source: &S, as_of: NaiveDate) -> Vec<String> {
        let mut names = BTreeMap::new();
        let rows = source
            .stock_entries()
            .iter()
            .map(|r| (r.entity_name(), r.date()))
            .chain(source.stock_exits().iter().map(|r| (r.entity_name(), r.date())));
        for (name, date) in rows {
            if matches!(date, Some(date) if date <= as_of) && !name.trim().is_empty() {
                names
                    .entry(entity_key(name))
                    .or_insert_with(|| name.trim().to_string());
            }
        }
        names.into_values().collect()
    }
}

fn usable_amount(amount: Option<f64>) -> Option<f64> {
    amount.filter(|value| value.is_finite() && *value != 0.0)
}

fn stockist_event<R>(
    record: &R,
    entity: &str,
    as_of: NaiveDate,
    filter: &EventFilter,
    amount: Option<f64>,
    sign: f64,
) -> Option<LedgerEvent>
where
    R: Dated + OwnedByEntity + Positioned,
{
    if !record.belongs_to(entity) || !filter.matches(record) {
        return None;
    }
    let date = record.date().filter(|date| *date <= as_of)?;
    let Some(amount) = usable_amount(amount) else {
        tracing::trace!(entity = %entity, %date, "skipping record without a usable amount");
        return None;
    };
    Some(LedgerEvent::new(entity_key(entity), date, sign * amount))
}

fn company_event<R: Dated>(
    record: &R,
    as_of: NaiveDate,
    amount: Option<f64>,
    sign: f64,
) -> Option<LedgerEvent> {
    let date = record.date().filter(|date| *date <= as_of)?;
    let amount = usable_amount(amount)?;
    Some(LedgerEvent::new(COMPANY_ENTITY, date, sign * amount))
}

fn position_of<R>(record: &R, as_of: NaiveDate, filter: &EventFilter) -> Option<RentalPosition>
where
    R: Dated + OwnedByEntity + Positioned,
{
    if !record.on_or_before(as_of) || !filter.matches(record) {
        return None;
    }
    let stockist = record.entity_name().trim();
    if stockist.is_empty() {
        return None;
    }
    Some(RentalPosition {
        stockist: stockist.to_string(),
        warehouse: record.warehouse()?.to_string(),
        commodity: record.commodity()?.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use godown_domain::{
        Book, CompanyLoan, CompanyRepayment, LoanKind, MarginPayment, StockEntry, StockExit,
        StockistLoan, StockistRepayment,
    };

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample_book() -> Book {
        let mut book = Book::new("extract");
        book.add_loan(StockistLoan::new(day(1), "Ravi", LoanKind::Cash, 1000.0).at("WH-1", "Wheat"))
            .add_loan(StockistLoan::new(day(2), "ravi ", LoanKind::Margin, 500.0).at("WH-2", "Maize"))
            .add_margin(MarginPayment::new(day(3), "Ravi", 200.0).at("WH-1", "Wheat"))
            .add_repayment(StockistRepayment::new(day(4), "Ravi", 100.0))
            .add_loan(StockistLoan::new(day(20), "Ravi", LoanKind::Cash, 9999.0))
            .add_stock_entry(StockEntry::new(day(1), "Ravi", "WH-1", "Wheat", 20_000.0))
            .add_stock_exit(
                StockExit::new(day(5), "Ravi", "WH-1", "Wheat", 5_000.0).with_net_quantity(4_900.0),
            )
            .add_company_loan(CompanyLoan::new(day(1), 50_000.0, 250.0))
            .add_company_repayment(CompanyRepayment::new(day(6), 10_000.0));
        let mut undated = StockistLoan::new(day(1), "Ravi", LoanKind::Cash, 777.0);
        undated.date = None;
        book.add_loan(undated);
        book
    }

    #[test]
    fn interest_basis_controls_repayments() {
        let book = sample_book();
        let with = EventExtractor::interest_deltas(
            &book,
            "RAVI",
            day(10),
            &EventFilter::all(),
            InterestBasis::WithRepayments,
        );
        let without = EventExtractor::interest_deltas(
            &book,
            "RAVI",
            day(10),
            &EventFilter::all(),
            InterestBasis::LoansAndMargins,
        );
        assert_eq!(with.get(&day(4)), Some(&-100.0));
        assert!(without.get(&day(4)).is_none());
        assert_eq!(without.len(), 3);
        assert!(without.get(&day(20)).is_none());
    }

    #[test]
    fn interest_filter_ignores_quality_and_requires_position() {
        let book = sample_book();
        let filter = EventFilter::all().warehouse("WH-1").quality("Good");
        let deltas = EventExtractor::interest_deltas(
            &book,
            "Ravi",
            day(10),
            &filter,
            InterestBasis::LoansAndMargins,
        );
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[&day(1)], 1000.0);
        assert_eq!(deltas[&day(3)], -200.0);
    }

    #[test]
    fn rental_outflow_prefers_net_quantity() {
        let book = sample_book();
        let deltas = EventExtractor::rental_deltas(&book, "Ravi", day(10), &EventFilter::all());
        assert_eq!(deltas[&day(1)], 20.0);
        assert!((deltas[&day(5)] + 4.9).abs() < 1e-12);
        let net = EventExtractor::net_stock_tons(&book, "Ravi", day(10), &EventFilter::all());
        assert!((net - 15.1).abs() < 1e-9);
    }

    #[test]
    fn company_events_use_their_own_entity() {
        let book = sample_book();
        let events = EventExtractor::company_events(&book, day(31));
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.entity_key == COMPANY_ENTITY));
        let deltas = EventExtractor::company_deltas(&book, day(5));
        assert_eq!(deltas.len(), 1);
    }

    #[test]
    fn entity_discovery_dedups_by_key() {
        let book = sample_book();
        assert_eq!(EventExtractor::interest_entities(&book, day(31)), vec!["Ravi"]);
        let positions = EventExtractor::rental_positions(&book, day(31), &EventFilter::all());
        assert_eq!(
            positions,
            vec![RentalPosition {
                stockist: "Ravi".into(),
                warehouse: "WH-1".into(),
                commodity: "Wheat".into(),
            }]
        );
        assert!(EventExtractor::stock_entities(&book, day(1)).contains(&"Ravi".to_string()));
    }
}
