//! Per-stockist statement: stock held, loans, margins, and rental and interest due.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use godown_domain::{
    kg_to_tons, round2, round3, same_entity, Dated, EventFilter, LoanKind, OwnedByEntity,
    Positioned,
};

use crate::{
    accrual::AccrualEngine,
    extract::{EventExtractor, InterestBasis},
    rates::RatePolicy,
    rental_service::RentalService,
    source::RecordSource,
    CoreError,
};

/// Group label for rows recorded without a warehouse.
pub const UNASSIGNED_WAREHOUSE: &str = "(unassigned)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialLine {
    pub warehouse: String,
    pub commodity: String,
    pub stored_tons: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanLine {
    pub warehouse: String,
    pub cash: f64,
    pub margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginLine {
    pub warehouse: String,
    pub paid: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentalLine {
    pub warehouse: String,
    pub commodity: String,
    pub rental: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterestLine {
    pub warehouse: String,
    pub interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockistStatement {
    pub stockist: String,
    pub as_of: NaiveDate,
    pub rental_rate_per_ton_per_day: f64,
    pub interest_annual_rate: f64,
    pub materials: Vec<MaterialLine>,
    pub loans: Vec<LoanLine>,
    pub margins: Vec<MarginLine>,
    pub rental_due: Vec<RentalLine>,
    pub interest_due: Vec<InterestLine>,
    pub total_rental: f64,
    pub total_interest: f64,
}

pub struct StatementService;

impl StatementService {
    pub fn stockist_statement<S: RecordSource + ?Sized>(
        source: &S,
        policy: &RatePolicy,
        stockist: &str,
        as_of: NaiveDate,
    ) -> Result<StockistStatement, CoreError> {
        let stockist = stockist.trim();
        if stockist.is_empty() {
            return Err(CoreError::Validation("stockist is required".into()));
        }

        let mut materials: BTreeMap<(String, String), f64> = BTreeMap::new();
        for entry in source.stock_entries() {
            if !entry.belongs_to(stockist) || !entry.on_or_before(as_of) {
                continue;
            }
            let qty = entry
                .net_quantity_kg
                .or(entry.quantity_kg)
                .filter(|q| q.is_finite())
                .unwrap_or(0.0);
            let key = (
                warehouse_label(entry.warehouse()),
                entry.commodity().unwrap_or_default().to_string(),
            );
            *materials.entry(key).or_insert(0.0) += kg_to_tons(qty);
        }

        let mut loans: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        let own_loans = source
            .loans()
            .iter()
            .filter(|loan| loan.belongs_to(stockist) && loan.on_or_before(as_of));
        for loan in own_loans {
            let amount = loan.amount.filter(|a| a.is_finite()).unwrap_or(0.0);
            let line = loans.entry(warehouse_label(loan.warehouse())).or_insert((0.0, 0.0));
            match loan.kind {
                LoanKind::Cash => line.0 += amount,
                LoanKind::Margin => line.1 += amount,
            }
        }

        let mut margins: BTreeMap<String, f64> = BTreeMap::new();
        let own_margins = source
            .margins()
            .iter()
            .filter(|margin| margin.belongs_to(stockist) && margin.on_or_before(as_of));
        for margin in own_margins {
            let amount = margin.amount.filter(|a| a.is_finite()).unwrap_or(0.0);
            *margins.entry(warehouse_label(margin.warehouse())).or_insert(0.0) += amount;
        }

        let positions_filter = EventFilter::all();
        let rental_due: Vec<RentalLine> =
            EventExtractor::rental_positions(source, as_of, &positions_filter)
                .into_iter()
                .filter(|position| same_entity(&position.stockist, stockist))
                .map(|position| {
                    let scoped = EventFilter::all()
                        .warehouse(position.warehouse.clone())
                        .commodity(position.commodity.clone());
                    let charge = RentalService::rental_due(source, policy, stockist, as_of, &scoped);
                    RentalLine {
                        warehouse: position.warehouse,
                        commodity: position.commodity,
                        rental: charge.amount,
                    }
                })
                .collect();

        let interest_warehouses: BTreeSet<&str> = source
            .loans()
            .iter()
            .filter(|loan| loan.belongs_to(stockist) && loan.on_or_before(as_of))
            .filter_map(|loan| loan.warehouse())
            .chain(
                source
                    .margins()
                    .iter()
                    .filter(|margin| margin.belongs_to(stockist) && margin.on_or_before(as_of))
                    .filter_map(|margin| margin.warehouse()),
            )
            .filter(|wh| !wh.trim().is_empty())
            .collect();
        let daily_rate = policy.interest.daily_rate();
        let interest_due: Vec<InterestLine> = interest_warehouses
            .into_iter()
            .map(|warehouse| {
                let deltas = EventExtractor::interest_deltas(
                    source,
                    stockist,
                    as_of,
                    &EventFilter::all().warehouse(warehouse),
                    InterestBasis::LoansAndMargins,
                );
                InterestLine {
                    warehouse: warehouse.to_string(),
                    interest: AccrualEngine::accrue(&deltas, as_of, daily_rate),
                }
            })
            .collect();

        let total_rental = round2(rental_due.iter().map(|line| line.rental).sum());
        let total_interest = round2(interest_due.iter().map(|line| line.interest).sum());
        tracing::info!(stockist = %stockist, %as_of, total_rental, total_interest, "stockist statement assembled");

        Ok(StockistStatement {
            stockist: stockist.to_string(),
            as_of,
            rental_rate_per_ton_per_day: policy.rental.per_ton_per_day,
            interest_annual_rate: policy.interest.annual_rate,
            materials: materials
                .into_iter()
                .map(|((warehouse, commodity), tons)| MaterialLine {
                    warehouse,
                    commodity,
                    stored_tons: round3(tons),
                })
                .collect(),
            loans: loans
                .into_iter()
                .map(|(warehouse, (cash, margin))| LoanLine {
                    warehouse,
                    cash: round2(cash),
                    margin: round2(margin),
                })
                .collect(),
            margins: margins
                .into_iter()
                .map(|(warehouse, paid)| MarginLine {
                    warehouse,
                    paid: round2(paid),
                })
                .collect(),
            rental_due,
            interest_due,
            total_rental,
            total_interest,
        })
    }
}

fn warehouse_label(warehouse: Option<&str>) -> String {
    match warehouse.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => UNASSIGNED_WAREHOUSE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use godown_domain::{Book, MarginPayment, StockEntry, StockExit, StockistLoan};

    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn statement_groups_by_warehouse() {
        let mut book = Book::new("statement");
        book.add_stock_entry(StockEntry::new(date(1, 1), "Ravi", "WH-1", "Wheat", 2_000.0))
            .add_stock_entry(StockEntry::new(date(1, 1), "Ravi", "WH-2", "Wheat", 1_000.0))
            .add_stock_exit(StockExit::new(date(1, 3), "Ravi", "WH-1", "Wheat", 1_000.0))
            .add_loan(StockistLoan::new(date(1, 1), "Ravi", LoanKind::Cash, 10_000.0).at("WH-1", "Wheat"))
            .add_loan(StockistLoan::new(date(1, 1), "Ravi", LoanKind::Margin, 5_000.0))
            .add_margin(MarginPayment::new(date(1, 1), "Ravi", 4_000.0).at("WH-1", "Wheat"))
            .add_stock_entry(StockEntry::new(date(1, 1), "Mohan", "WH-1", "Wheat", 9_000.0));

        let policy = RatePolicy::default();
        let statement = StatementService::stockist_statement(&book, &policy, "ravi", date(1, 5))
            .expect("statement");

        assert_eq!(statement.materials.len(), 2);
        assert_eq!(statement.materials[0].stored_tons, 2.0);
        assert_eq!(statement.loans.len(), 2);
        assert_eq!(statement.loans[0].warehouse, UNASSIGNED_WAREHOUSE);
        assert_eq!(statement.loans[0].margin, 5_000.0);
        assert_eq!(statement.margins[0].paid, 4_000.0);

        // WH-1: 2 t for two days, then 1 t for three days. WH-2: 1 t for five days.
        assert_eq!(statement.rental_due.len(), 2);
        assert_eq!(statement.rental_due[0].rental, round2(7.0 * 3.334));
        assert_eq!(statement.rental_due[1].rental, round2(5.0 * 3.334));

        // Only WH-1 carries positioned loans; the unassigned margin loan is not split out.
        assert_eq!(statement.interest_due.len(), 1);
        let expected = round2(6_000.0 * policy.interest.daily_rate() * 5.0);
        assert_eq!(statement.interest_due[0].interest, expected);
    }

    #[test]
    fn rows_after_the_as_of_date_are_left_out() {
        let mut book = Book::new("later rows");
        book.add_stock_entry(StockEntry::new(date(1, 1), "Ravi", "WH-1", "Wheat", 1_000.0))
            .add_stock_entry(StockEntry::new(date(2, 1), "Ravi", "WH-1", "Wheat", 5_000.0))
            .add_loan(StockistLoan::new(date(1, 1), "Ravi", LoanKind::Cash, 1_000.0).at("WH-1", "Wheat"))
            .add_loan(StockistLoan::new(date(2, 1), "Ravi", LoanKind::Cash, 9_000.0).at("WH-2", "Wheat"))
            .add_margin(MarginPayment::new(date(2, 1), "Ravi", 500.0).at("WH-2", "Wheat"));

        let statement =
            StatementService::stockist_statement(&book, &RatePolicy::default(), "Ravi", date(1, 10))
                .expect("statement");

        assert_eq!(statement.materials.len(), 1);
        assert_eq!(statement.materials[0].stored_tons, 1.0);
        assert_eq!(statement.loans.len(), 1);
        assert_eq!(statement.loans[0].cash, 1_000.0);
        assert!(statement.margins.is_empty());
        assert_eq!(statement.interest_due.len(), 1);
        assert_eq!(statement.interest_due[0].warehouse, "WH-1");
    }

    #[test]
    fn blank_stockist_is_rejected() {
        let book = Book::new("empty");
        let result =
            StatementService::stockist_statement(&book, &RatePolicy::default(), " ", date(1, 1));
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }
}
