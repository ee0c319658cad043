//! Warehouse rental: flat yearly charge for flat-plan entities, daily accrual otherwise.

use chrono::NaiveDate;
use serde::Serialize;

use godown_domain::{round2, round3, EventFilter};

use crate::{
    accrual::AccrualEngine, extract::EventExtractor, rates::RatePolicy, rates::RentalPlan,
    source::RecordSource,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentalCharge {
    pub entity: String,
    pub as_of: NaiveDate,
    #[serde(flatten)]
    pub plan: RentalPlan,
    /// Stock still held at `as_of`, in tons.
    pub net_stock_tons: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentalDueLine {
    pub stockist: String,
    pub warehouse: String,
    pub commodity: String,
    pub rate_type: &'static str,
    pub net_stock_tons: f64,
    pub rental: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentalDueReport {
    pub as_of: NaiveDate,
    pub filter: EventFilter,
    pub lines: Vec<RentalDueLine>,
    pub total_net_stock_tons: f64,
    pub total_rental: f64,
}

pub struct RentalService;

impl RentalService {
    pub fn rental_due<S: RecordSource + ?Sized>(
        source: &S,
        policy: &RatePolicy,
        entity: &str,
        as_of: NaiveDate,
        filter: &EventFilter,
    ) -> RentalCharge {
        let plan = policy.rental.plan_for(entity);
        let (net_stock_tons, amount) = match plan {
            RentalPlan::FlatYearly { per_ton } => {
                let tons = EventExtractor::net_stock_tons(source, entity, as_of, filter);
                (tons, round2(tons * per_ton))
            }
            RentalPlan::Daily { per_ton_per_day } => {
                let deltas = EventExtractor::rental_deltas(source, entity, as_of, filter);
                let amount = AccrualEngine::accrue_with_boundary(&deltas, as_of, per_ton_per_day);
                (AccrualEngine::outstanding_at(&deltas, as_of), amount)
            }
        };
        tracing::debug!(entity = %entity, %as_of, amount, flat = plan.is_flat(), "rental due");
        RentalCharge {
            entity: entity.trim().to_string(),
            as_of,
            plan,
            net_stock_tons: round3(net_stock_tons),
            amount,
        }
    }

    /// One line per stockist position matching `filter`.
    pub fn rental_due_report<S: RecordSource + ?Sized>(
        source: &S,
        policy: &RatePolicy,
        as_of: NaiveDate,
        filter: &EventFilter,
    ) -> RentalDueReport {
        let mut lines = Vec::new();
        for position in EventExtractor::rental_positions(source, as_of, filter) {
            let scoped = EventFilter {
                warehouse: Some(position.warehouse.clone()),
                commodity: Some(position.commodity.clone()),
                quality: filter.quality.clone(),
            };
            let charge = Self::rental_due(source, policy, &position.stockist, as_of, &scoped);
            lines.push(RentalDueLine {
                rate_type: if charge.plan.is_flat() { "flat" } else { "daily" },
                net_stock_tons: charge.net_stock_tons,
                rental: charge.amount,
                stockist: position.stockist,
                warehouse: position.warehouse,
                commodity: position.commodity,
            });
        }
        let total_rental = round2(lines.iter().map(|line| line.rental).sum());
        let total_net_stock_tons = round3(lines.iter().map(|line| line.net_stock_tons).sum());
        tracing::info!(%as_of, positions = lines.len(), total_rental, "rental due report assembled");
        RentalDueReport {
            as_of,
            filter: filter.clone(),
            lines,
            total_net_stock_tons,
            total_rental,
        }
    }
}

#[cfg(test)]
mod tests {
    use godown_domain::{Book, StockEntry, StockExit};

    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn daily_plan_accrues_per_ton_per_day() {
        let mut book = Book::new("rental");
        book.add_stock_entry(StockEntry::new(date(1, 1), "Ravi", "WH-1", "Wheat", 10_000.0))
            .add_stock_exit(StockExit::new(date(1, 11), "Ravi", "WH-1", "Wheat", 4_000.0));
        let charge =
            RentalService::rental_due(&book, &RatePolicy::default(), "Ravi", date(1, 20), &EventFilter::all());
        // 10 t for 10 days, then 6 t for 10 days (11th..20th).
        assert_eq!(charge.amount, round2(160.0 * 3.334));
        assert_eq!(charge.net_stock_tons, 6.0);
        assert!(!charge.plan.is_flat());
    }

    #[test]
    fn flat_plan_ignores_holding_time() {
        let mut book = Book::new("flat");
        book.add_stock_entry(StockEntry::new(date(1, 1), "Anunay Agro", "WH-1", "Maize", 25_000.0));
        let policy = RatePolicy::default();
        let early = RentalService::rental_due(&book, &policy, "ANUNAY AGRO", date(1, 2), &EventFilter::all());
        let late = RentalService::rental_due(&book, &policy, "ANUNAY AGRO", date(12, 31), &EventFilter::all());
        assert_eq!(early.amount, 20_000.0);
        assert_eq!(early.amount, late.amount);
    }

    #[test]
    fn report_has_one_line_per_position() {
        let mut book = Book::new("report");
        book.add_stock_entry(StockEntry::new(date(1, 1), "Ravi", "WH-1", "Wheat", 1_000.0))
            .add_stock_entry(StockEntry::new(date(1, 1), "Ravi", "WH-2", "Wheat", 2_000.0))
            .add_stock_entry(StockEntry::new(date(1, 1), "Anunay Agro", "WH-1", "Maize", 3_000.0));
        let report = RentalService::rental_due_report(
            &book,
            &RatePolicy::default(),
            date(1, 1),
            &EventFilter::all(),
        );
        assert_eq!(report.lines.len(), 3);
        let flat: Vec<_> = report.lines.iter().filter(|l| l.rate_type == "flat").collect();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].rental, 2_400.0);
        assert_eq!(report.total_net_stock_tons, 6.0);
        assert_eq!(report.total_rental, round2(2_400.0 + 3.0 * 3.334));
    }

    #[test]
    fn charge_json_carries_the_plan_inline() {
        let mut book = Book::new("json");
        book.add_stock_entry(StockEntry::new(date(1, 1), "Anunay Agro", "WH-1", "Maize", 25_000.0));
        let policy = RatePolicy::default();
        let flat = RentalService::rental_due(&book, &policy, "Anunay Agro", date(1, 2), &EventFilter::all());
        let value = serde_json::to_value(&flat).expect("serialize flat charge");
        assert_eq!(value["plan"], "flat_yearly");
        assert_eq!(value["per_ton"], 800.0);
        assert_eq!(value["amount"], 20_000.0);
        assert!(value.get("per_ton_per_day").is_none());

        let daily = RentalService::rental_due(&book, &policy, "Ravi", date(1, 2), &EventFilter::all());
        let value = serde_json::to_value(&daily).expect("serialize daily charge");
        assert_eq!(value["plan"], "daily");
        assert_eq!(value["per_ton_per_day"], 3.334);
    }

    #[test]
    fn empty_report_totals_are_plain_zero() {
        let report = RentalService::rental_due_report(
            &Book::new("empty"),
            &RatePolicy::default(),
            date(1, 31),
            &EventFilter::all(),
        );
        assert!(report.lines.is_empty());
        let json = serde_json::to_string(&report).expect("serialize report");
        assert!(json.contains("\"total_rental\":0.0"), "{json}");
        assert!(json.contains("\"total_net_stock_tons\":0.0"), "{json}");
    }
}
