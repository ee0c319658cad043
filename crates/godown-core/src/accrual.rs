//! Piecewise-constant daily accrual over a delta map.
//!
//! The outstanding level starts at zero on the first event date, changes only
//! on event dates, and is floored at zero after every day's delta. Each day
//! the level is positive accrues `level * rate`. The interval starting on the
//! last event date is closed at `as_of`, inclusive.

use chrono::NaiveDate;

use godown_domain::{entity_key, round2, AccrualResult, DeltaMap};

pub struct AccrualEngine;

impl AccrualEngine {
    /// Accrues `deltas` up to and including `as_of` at `per_unit_per_day`.
    ///
    /// Deltas dated after `as_of` are ignored; an empty map accrues zero.
    pub fn accrue(deltas: &DeltaMap, as_of: NaiveDate, per_unit_per_day: f64) -> f64 {
        let Some(first) = deltas.range(..=as_of).next().map(|(day, _)| *day) else {
            return 0.0;
        };

        let mut outstanding = 0.0_f64;
        let mut total = 0.0_f64;
        let mut cursor = first;
        for (&day, &delta) in deltas.range(..=as_of) {
            if day > cursor && outstanding > 0.0 {
                total += outstanding * per_unit_per_day * days_between(cursor, day);
            }
            outstanding = (outstanding + delta).max(0.0);
            cursor = day;
        }
        if outstanding > 0.0 {
            total += outstanding * per_unit_per_day * (days_between(cursor, as_of) + 1.0);
        }
        round2(total)
    }

    /// Same result as [`AccrualEngine::accrue`], computed by appending `as_of + 1`
    /// as an exclusive boundary and charging every interval between consecutive
    /// keys at the level reached on its opening day.
    pub fn accrue_with_boundary(deltas: &DeltaMap, as_of: NaiveDate, per_unit_per_day: f64) -> f64 {
        let Some(boundary) = as_of.succ_opt() else {
            return Self::accrue(deltas, as_of, per_unit_per_day);
        };
        let mut keys: Vec<(NaiveDate, f64)> =
            deltas.range(..=as_of).map(|(day, delta)| (*day, *delta)).collect();
        if keys.is_empty() {
            return 0.0;
        }
        keys.push((boundary, 0.0));

        let mut running = 0.0_f64;
        let mut total = 0.0_f64;
        for window in keys.windows(2) {
            let (day, delta) = window[0];
            let (next, _) = window[1];
            running = (running + delta).max(0.0);
            if running > 0.0 {
                total += running * per_unit_per_day * days_between(day, next);
            }
        }
        round2(total)
    }

    /// Runs [`AccrualEngine::accrue`] and tags the figure with its entity and date.
    pub fn accrue_for(
        entity: &str,
        deltas: &DeltaMap,
        as_of: NaiveDate,
        per_unit_per_day: f64,
    ) -> AccrualResult {
        let total_accrued = Self::accrue(deltas, as_of, per_unit_per_day);
        tracing::debug!(entity = %entity, %as_of, total_accrued, "accrued");
        AccrualResult {
            entity_key: entity_key(entity),
            total_accrued,
            as_of_date: as_of,
        }
    }

    /// Floored running level at the end of `as_of`.
    pub fn outstanding_at(deltas: &DeltaMap, as_of: NaiveDate) -> f64 {
        deltas
            .range(..=as_of)
            .fold(0.0_f64, |level, (_, delta)| (level + delta).max(0.0))
    }
}

fn days_between(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64
}
