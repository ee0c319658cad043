//! Profit and loss across the three business lines: warehousing, financing and trading.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::Serialize;

use godown_domain::{
    entity_key, round2, round3, same_entity, Dated, DeltaMap, EventFilter, OwnedByEntity,
    KG_PER_TON,
};

use crate::{
    accrual::AccrualEngine,
    breakeven_service::BreakevenService,
    extract::EventExtractor,
    interest_service::InterestService,
    rates::{RatePolicy, RentalPlan},
    source::RecordSource,
    time::Clock,
};

/// Quality assumed for exits recorded without one.
pub const DEFAULT_TRADING_QUALITY: &str = "Good";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRental {
    pub entity: String,
    pub net_stock_tons: f64,
    pub rental: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRental {
    pub month: String,
    pub rental: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarehousingIncome {
    pub as_of: NaiveDate,
    pub flat_rate_rental: Vec<FlatRental>,
    pub flat_rate_total: f64,
    pub others_rental_by_month: Vec<MonthlyRental>,
    pub others_total: f64,
    pub total_rental: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancingIncome {
    pub as_of: NaiveDate,
    pub receivable: f64,
    pub payable: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradingRow {
    pub date: NaiveDate,
    pub entity: String,
    pub commodity: String,
    pub quality: String,
    pub quantity_kg: f64,
    pub rate_per_kg: f64,
    pub breakeven_per_kg: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradingSummary {
    pub commodity: String,
    pub quality: String,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradingIncome {
    pub as_of: NaiveDate,
    pub total_trading_profit: f64,
    pub summary_by_combo: Vec<TradingSummary>,
    pub rows: Vec<TradingRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitLossStatement {
    pub as_of: NaiveDate,
    pub warehousing: WarehousingIncome,
    pub financing: FinancingIncome,
    pub trading: TradingIncome,
    pub net_profit: f64,
}

pub struct ProfitLossService;

impl ProfitLossService {
    /// Rental earned: flat charges for flat-plan entities, month-by-month
    /// accruals for every other stockist position.
    pub fn warehousing<S: RecordSource + ?Sized>(
        source: &S,
        policy: &RatePolicy,
        as_of: NaiveDate,
    ) -> WarehousingIncome {
        let mut flat_rate_rental = Vec::new();
        let mut monthly: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let all = EventFilter::all();

        for entity in EventExtractor::stock_entities(source, as_of) {
            if let RentalPlan::FlatYearly { per_ton } = policy.rental.plan_for(&entity) {
                let tons = EventExtractor::net_stock_tons(source, &entity, as_of, &all);
                flat_rate_rental.push(FlatRental {
                    rental: round2(tons * per_ton),
                    net_stock_tons: round3(tons),
                    entity,
                });
            }
        }
        // Daily rent accrues per position so stock in one warehouse is never
        // offset by an exit from another.
        for position in EventExtractor::rental_positions(source, as_of, &all) {
            let RentalPlan::Daily { per_ton_per_day } = policy.rental.plan_for(&position.stockist)
            else {
                continue;
            };
            let scoped = EventFilter {
                warehouse: Some(position.warehouse.clone()),
                commodity: Some(position.commodity.clone()),
                quality: None,
            };
            let deltas = EventExtractor::rental_deltas(source, &position.stockist, as_of, &scoped);
            for (month, rental) in monthly_accruals(&deltas, as_of, per_ton_per_day) {
                *monthly.entry(month).or_insert(0.0) += rental;
            }
        }
        // Entities on the flat plan that never moved stock still get a zero line.
        for name in policy.rental.flat_rate_entities() {
            if !flat_rate_rental.iter().any(|f| same_entity(&f.entity, name)) {
                flat_rate_rental.push(FlatRental {
                    entity: name.to_string(),
                    net_stock_tons: 0.0,
                    rental: 0.0,
                });
            }
        }

        let others_rental_by_month: Vec<MonthlyRental> = monthly
            .into_iter()
            .filter(|(_, rental)| *rental != 0.0)
            .map(|(month, rental)| MonthlyRental {
                month: month_label(month, as_of),
                rental: round2(rental),
            })
            .collect();
        let flat_rate_total = round2(flat_rate_rental.iter().map(|f| f.rental).sum());
        let others_total = round2(others_rental_by_month.iter().map(|m| m.rental).sum());
        let total_rental = round2(flat_rate_total + others_total);
        tracing::info!(%as_of, total_rental, "warehousing income assembled");
        WarehousingIncome {
            as_of,
            flat_rate_rental,
            flat_rate_total,
            others_rental_by_month,
            others_total,
            total_rental,
        }
    }

    /// Interest receivable from stockists less interest payable by the company.
    pub fn financing<S: RecordSource + ?Sized>(
        source: &S,
        policy: &RatePolicy,
        as_of: NaiveDate,
    ) -> FinancingIncome {
        let receivable = InterestService::receivable(source, policy, as_of).total_receivable;
        let payable = InterestService::payable(source, policy, as_of).total_payable;
        FinancingIncome {
            as_of,
            receivable,
            payable,
            net: round2(receivable - payable),
        }
    }

    /// Trading margin on stock sold by flat-plan entities, each exit priced
    /// against the breakeven on its own date.
    pub fn trading<S: RecordSource + ?Sized>(
        source: &S,
        policy: &RatePolicy,
        as_of: NaiveDate,
    ) -> TradingIncome {
        let traders: Vec<&str> = policy.rental.flat_rate_entities().collect();
        let mut exits: Vec<_> = source
            .stock_exits()
            .iter()
            .filter(|exit| traders.iter().any(|name| exit.belongs_to(name)))
            .filter_map(|exit| exit.date().filter(|d| *d <= as_of).map(|d| (d, exit)))
            .collect();
        exits.sort_by(|(a_date, a), (b_date, b)| {
            a_date
                .cmp(b_date)
                .then_with(|| a.commodity.cmp(&b.commodity))
                .then_with(|| a.quality.cmp(&b.quality))
        });

        let mut cache: HashMap<(String, NaiveDate, String, String), f64> = HashMap::new();
        let mut rows = Vec::new();
        let mut total = 0.0;
        let mut by_combo: BTreeMap<(String, String), f64> = BTreeMap::new();

        for (date, exit) in exits {
            let commodity = exit.commodity.as_deref().unwrap_or("").trim();
            let quality = match exit.quality.as_deref().map(str::trim) {
                Some(q) if !q.is_empty() => q,
                _ => DEFAULT_TRADING_QUALITY,
            };
            let qty_kg = exit.quantity_kg.filter(|q| q.is_finite()).unwrap_or(0.0);
            if qty_kg <= 0.0 || commodity.is_empty() {
                continue;
            }
            let rate_per_kg = exit.rate_per_kg.filter(|r| r.is_finite()).unwrap_or(0.0);
            let entity = exit.stockist_name.trim();

            let key = (
                entity_key(entity),
                date,
                commodity.to_string(),
                quality.to_string(),
            );
            let per_ton = *cache.entry(key).or_insert_with(|| {
                BreakevenService::breakeven(source, policy, entity, commodity, quality, date)
                    .breakeven_per_ton
            });
            let breakeven_per_kg = if per_ton > 0.0 { per_ton / KG_PER_TON } else { 0.0 };
            let profit = qty_kg * (rate_per_kg - breakeven_per_kg);
            total += profit;

            let row = TradingRow {
                date,
                entity: entity.to_string(),
                commodity: commodity.to_string(),
                quality: quality.to_string(),
                quantity_kg: round3(qty_kg),
                rate_per_kg: round2(rate_per_kg),
                breakeven_per_kg: round2(breakeven_per_kg),
                profit: round2(profit),
            };
            *by_combo
                .entry((row.commodity.clone(), row.quality.clone()))
                .or_insert(0.0) += row.profit;
            rows.push(row);
        }

        let summary_by_combo = by_combo
            .into_iter()
            .map(|((commodity, quality), profit)| TradingSummary {
                commodity,
                quality,
                profit: round2(profit),
            })
            .collect();
        let total_trading_profit = round2(total);
        tracing::info!(%as_of, exits = rows.len(), total_trading_profit, "trading income assembled");
        TradingIncome {
            as_of,
            total_trading_profit,
            summary_by_combo,
            rows,
        }
    }

    pub fn statement<S: RecordSource + ?Sized>(
        source: &S,
        policy: &RatePolicy,
        as_of: NaiveDate,
    ) -> ProfitLossStatement {
        let warehousing = Self::warehousing(source, policy, as_of);
        let financing = Self::financing(source, policy, as_of);
        let trading = Self::trading(source, policy, as_of);
        let net_profit =
            round2(warehousing.total_rental + financing.net + trading.total_trading_profit);
        ProfitLossStatement {
            as_of,
            warehousing,
            financing,
            trading,
            net_profit,
        }
    }

    pub fn statement_upto_today<S: RecordSource + ?Sized>(
        source: &S,
        policy: &RatePolicy,
        clock: &dyn Clock,
    ) -> ProfitLossStatement {
        Self::statement(source, policy, clock.today())
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// Rental per calendar month from the first event up to `as_of`, each month
/// taken as the difference of cumulative accruals at consecutive month ends.
fn monthly_accruals(deltas: &DeltaMap, as_of: NaiveDate, rate: f64) -> Vec<(NaiveDate, f64)> {
    let Some(first) = deltas.range(..=as_of).next().map(|(day, _)| *day) else {
        return Vec::new();
    };
    let mut months = Vec::new();
    let mut start = month_start(first);
    let mut previous = 0.0;
    loop {
        let next = start.checked_add_months(Months::new(1));
        let period_end = next
            .and_then(|n| n.pred_opt())
            .map_or(as_of, |end| end.min(as_of));
        let cumulative = AccrualEngine::accrue(deltas, period_end, rate);
        months.push((start, cumulative - previous));
        previous = cumulative;
        match next {
            Some(n) if period_end < as_of => start = n,
            _ => break,
        }
    }
    months
}

fn month_label(month: NaiveDate, as_of: NaiveDate) -> String {
    if month == month_start(as_of) {
        format!("{} (Upto {})", month.format("%b %Y"), as_of.format("%d/%m/%y"))
    } else {
        month.format("%b %Y").to_string()
    }
}
