//! Breakeven sale price per ton for stock held by one entity.

use chrono::NaiveDate;
use serde::Serialize;

use godown_domain::{round2, round3, Dated, EventFilter, OwnedByEntity, KG_PER_TON};

use crate::{rates::RatePolicy, rates::RentalPlan, source::RecordSource};

/// Quality grades reported when none are requested explicitly.
pub const DEFAULT_QUALITIES: [&str; 2] = ["Good", "BD"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakeven {
    pub entity: String,
    pub commodity: String,
    pub quality: String,
    pub as_of: NaiveDate,
    pub stock_kg: f64,
    pub avg_days_held: f64,
    pub avg_price_per_ton: f64,
    pub rental_per_ton: f64,
    pub interest_per_ton: f64,
    pub breakeven_per_ton: f64,
}

pub struct BreakevenService;

impl BreakevenService {
    /// Average purchase price per ton plus rental and interest carried per ton.
    ///
    /// Days held are weighted by lot quantity; exits are not netted out. With no
    /// qualifying lots every figure is zero.
    pub fn breakeven<S: RecordSource + ?Sized>(
        source: &S,
        policy: &RatePolicy,
        entity: &str,
        commodity: &str,
        quality: &str,
        as_of: NaiveDate,
    ) -> Breakeven {
        let filter = EventFilter::all().commodity(commodity).quality(quality);
        let mut total_qty = 0.0;
        let mut total_cost = 0.0;
        let mut weighted_days = 0.0;
        for lot in source.stock_entries() {
            if !lot.belongs_to(entity) || !filter.matches(lot) {
                continue;
            }
            let Some(date) = lot.date().filter(|date| *date <= as_of) else {
                continue;
            };
            let qty = lot.quantity_kg.unwrap_or(0.0);
            if !qty.is_finite() || qty <= 0.0 {
                continue;
            }
            let age_days = (as_of - date).num_days().max(0) as f64;
            total_qty += qty;
            total_cost += lot.cost.filter(|c| c.is_finite()).unwrap_or(0.0);
            weighted_days += qty * age_days;
        }

        let mut result = Breakeven {
            entity: entity.trim().to_string(),
            commodity: commodity.to_string(),
            quality: quality.to_string(),
            as_of,
            stock_kg: 0.0,
            avg_days_held: 0.0,
            avg_price_per_ton: 0.0,
            rental_per_ton: 0.0,
            interest_per_ton: 0.0,
            breakeven_per_ton: 0.0,
        };
        if total_qty <= 0.0 {
            return result;
        }

        let avg_days = weighted_days / total_qty;
        let avg_price = total_cost / total_qty * KG_PER_TON;
        let interest = avg_price * policy.interest.daily_rate() * avg_days;
        let rental = match policy.rental.plan_for(entity) {
            RentalPlan::FlatYearly { per_ton } => per_ton,
            RentalPlan::Daily { per_ton_per_day } => per_ton_per_day * avg_days,
        };
        result.stock_kg = round3(total_qty);
        result.avg_days_held = round2(avg_days);
        result.avg_price_per_ton = round2(avg_price);
        result.rental_per_ton = round2(rental);
        result.interest_per_ton = round2(interest);
        result.breakeven_per_ton = round2(avg_price + rental + interest);
        tracing::debug!(
            entity = %entity,
            commodity = %commodity,
            quality = %quality,
            breakeven = result.breakeven_per_ton,
            "breakeven computed"
        );
        result
    }

    pub fn breakeven_by_quality<S: RecordSource + ?Sized>(
        source: &S,
        policy: &RatePolicy,
        entity: &str,
        commodity: &str,
        qualities: &[&str],
        as_of: NaiveDate,
    ) -> Vec<Breakeven> {
        qualities
            .iter()
            .map(|quality| Self::breakeven(source, policy, entity, commodity, quality, as_of))
            .collect()
    }
}
