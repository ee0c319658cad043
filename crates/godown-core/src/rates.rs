//! Rate and policy table: interest, warehouse rental and quantity reduction.
//!
//! Every service reads its numbers from a [`RatePolicy`] instead of embedding
//! them, so the same assemblers serve any tariff.

use std::collections::BTreeMap;

use serde::Serialize;

use godown_domain::entity_key;

pub const DAYS_PER_YEAR: f64 = 365.0;
pub const DEFAULT_INTEREST_ANNUAL_RATE: f64 = 0.1375;
pub const DEFAULT_RENTAL_PER_TON_PER_DAY: f64 = 3.334;
pub const DEFAULT_FLAT_RATE_ENTITY: &str = "ANUNAY AGRO";
pub const DEFAULT_FLAT_RATE_PER_TON: f64 = 800.0;
pub const DEFAULT_REDUCTION_RATE: f64 = 0.015;
pub const DEFAULT_REDUCTION_COMMODITY: &str = "Maize";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InterestPolicy {
    pub annual_rate: f64,
}

impl InterestPolicy {
    pub fn new(annual_rate: f64) -> Self {
        Self { annual_rate }
    }

    /// Simple interest per currency unit per day (365-day year).
    pub fn daily_rate(&self) -> f64 {
        self.annual_rate / DAYS_PER_YEAR
    }
}

/// How rental is charged to one entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "plan", rename_all = "snake_case")]
pub enum RentalPlan {
    /// Accrued per ton per day on the running stock level.
    Daily { per_ton_per_day: f64 },
    /// A one-off charge per ton on net stock, independent of holding time.
    FlatYearly { per_ton: f64 },
}

impl RentalPlan {
    pub fn is_flat(&self) -> bool {
        matches!(self, RentalPlan::FlatYearly { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RentalPolicy {
    pub per_ton_per_day: f64,
    flat_rates: BTreeMap<String, (String, f64)>,
}

impl RentalPolicy {
    pub fn new(per_ton_per_day: f64) -> Self {
        Self {
            per_ton_per_day,
            flat_rates: BTreeMap::new(),
        }
    }

    /// Puts `entity` on the flat yearly plan at `per_ton`.
    pub fn with_flat_rate(mut self, entity: impl Into<String>, per_ton: f64) -> Self {
        let name = entity.into();
        self.flat_rates
            .insert(entity_key(&name), (name.trim().to_string(), per_ton));
        self
    }

    pub fn plan_for(&self, entity: &str) -> RentalPlan {
        match self.flat_rates.get(&entity_key(entity)) {
            Some((_, per_ton)) => RentalPlan::FlatYearly { per_ton: *per_ton },
            None => RentalPlan::Daily {
                per_ton_per_day: self.per_ton_per_day,
            },
        }
    }

    /// Display names of the entities on the flat plan.
    pub fn flat_rate_entities(&self) -> impl Iterator<Item = &str> {
        self.flat_rates.values().map(|(name, _)| name.as_str())
    }
}

/// Handling-loss deduction applied to inflow quantity for some commodities.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityReduction {
    pub rate: f64,
    commodities: Vec<String>,
}

impl QuantityReduction {
    pub fn new<I, S>(rate: f64, commodities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            rate,
            commodities: commodities
                .into_iter()
                .map(|c| c.as_ref().trim().to_uppercase())
                .collect(),
        }
    }

    pub fn none() -> Self {
        Self::new(0.0, Vec::<String>::new())
    }

    pub fn applies_to(&self, commodity: Option<&str>) -> bool {
        match commodity {
            Some(name) => {
                let key = name.trim().to_uppercase();
                self.commodities.iter().any(|c| *c == key)
            }
            None => false,
        }
    }

    pub fn reduction_for(&self, commodity: Option<&str>, quantity_kg: f64) -> f64 {
        if self.applies_to(commodity) {
            quantity_kg * self.rate
        } else {
            0.0
        }
    }
}

/// The full tariff the report assemblers read from.
#[derive(Debug, Clone, PartialEq)]
pub struct RatePolicy {
    pub interest: InterestPolicy,
    pub rental: RentalPolicy,
    pub reduction: QuantityReduction,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            interest: InterestPolicy::new(DEFAULT_INTEREST_ANNUAL_RATE),
            rental: RentalPolicy::new(DEFAULT_RENTAL_PER_TON_PER_DAY)
                .with_flat_rate(DEFAULT_FLAT_RATE_ENTITY, DEFAULT_FLAT_RATE_PER_TON),
            reduction: QuantityReduction::new(
                DEFAULT_REDUCTION_RATE,
                [DEFAULT_REDUCTION_COMMODITY],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_plan_is_selected_by_entity_identity() {
        let policy = RatePolicy::default();
        assert_eq!(
            policy.rental.plan_for(" anunay agro"),
            RentalPlan::FlatYearly { per_ton: 800.0 }
        );
        assert_eq!(
            policy.rental.plan_for("Ravi Traders"),
            RentalPlan::Daily {
                per_ton_per_day: 3.334
            }
        );
        assert_eq!(
            policy.rental.flat_rate_entities().collect::<Vec<_>>(),
            vec!["ANUNAY AGRO"]
        );
    }

    #[test]
    fn daily_interest_rate_uses_365_day_year() {
        let interest = InterestPolicy::new(0.1375);
        assert!((interest.daily_rate() - 0.1375 / 365.0).abs() < 1e-15);
    }

    #[test]
    fn reduction_only_applies_to_listed_commodities() {
        let reduction = QuantityReduction::new(0.015, ["Maize"]);
        assert!((reduction.reduction_for(Some("maize"), 1000.0) - 15.0).abs() < 1e-9);
        assert_eq!(reduction.reduction_for(Some("Wheat"), 1000.0), 0.0);
        assert_eq!(reduction.reduction_for(None, 1000.0), 0.0);
        assert_eq!(QuantityReduction::none().reduction_for(Some("Maize"), 10.0), 0.0);
    }
}
