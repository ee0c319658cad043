//! Final settlement for one stockist: what the stockist's stock is worth at an
//! agreed rate, net of rental, interest and outstanding loans.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use godown_domain::{
    round2, round3, Dated, EventFilter, LoanKind, OwnedByEntity, Positioned,
};

use crate::{
    accrual::AccrualEngine,
    extract::{EventExtractor, InterestBasis},
    rates::RatePolicy,
    rental_service::RentalService,
    source::RecordSource,
    CoreError,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRequest {
    pub stockist: String,
    pub as_of: NaiveDate,
    pub rate_per_kg: f64,
    #[serde(default)]
    pub filter: EventFilter,
}

impl SettlementRequest {
    pub fn new(stockist: impl Into<String>, as_of: NaiveDate, rate_per_kg: f64) -> Self {
        Self {
            stockist: stockist.into(),
            as_of,
            rate_per_kg,
            filter: EventFilter::all(),
        }
    }

    pub fn with_filter(mut self, filter: EventFilter) -> Self {
        self.filter = filter;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalSettlement {
    pub stockist: String,
    pub as_of: NaiveDate,
    pub filter: EventFilter,
    pub total_qty_kg: f64,
    pub reduction_kg: f64,
    pub net_qty_kg: f64,
    pub rate_per_kg: f64,
    pub total_cost: f64,
    pub rental: f64,
    pub interest: f64,
    pub cash_loan: f64,
    pub margin_loan: f64,
    pub margin_paid: f64,
    pub net_payable: f64,
}

pub struct SettlementService;

impl SettlementService {
    pub fn final_settlement<S: RecordSource + ?Sized>(
        source: &S,
        policy: &RatePolicy,
        request: &SettlementRequest,
    ) -> Result<FinalSettlement, CoreError> {
        let stockist = request.stockist.trim();
        if stockist.is_empty() {
            return Err(CoreError::Validation("stockist is required".into()));
        }
        if !request.rate_per_kg.is_finite() || request.rate_per_kg < 0.0 {
            return Err(CoreError::Validation(format!(
                "rate per kg must be a non-negative number, got {}",
                request.rate_per_kg
            )));
        }
        let as_of = request.as_of;
        let filter = &request.filter;

        let mut total_qty_kg = 0.0;
        let mut reduction_kg = 0.0;
        for entry in source.stock_entries() {
            if !in_scope(entry, stockist, as_of, filter) {
                continue;
            }
            let Some(qty) = entry.quantity_kg.filter(|q| q.is_finite()) else {
                continue;
            };
            total_qty_kg += qty;
            reduction_kg += policy.reduction.reduction_for(entry.commodity(), qty);
        }
        let reduction_kg = round3(reduction_kg);
        let net_qty_kg = (total_qty_kg - reduction_kg).max(0.0);
        let total_cost = net_qty_kg * request.rate_per_kg;

        let rental = RentalService::rental_due(source, policy, stockist, as_of, filter).amount;
        let interest_deltas = EventExtractor::interest_deltas(
            source,
            stockist,
            as_of,
            filter,
            InterestBasis::LoansAndMargins,
        );
        let interest =
            AccrualEngine::accrue(&interest_deltas, as_of, policy.interest.daily_rate());

        let money_filter = filter.without_quality();
        let loan_total = |kind: LoanKind| -> f64 {
            source
                .loans()
                .iter()
                .filter(|loan| loan.kind == kind && in_scope(*loan, stockist, as_of, &money_filter))
                .filter_map(|loan| loan.amount)
                .filter(|amount| amount.is_finite())
                .sum()
        };
        let cash_loan = loan_total(LoanKind::Cash);
        let margin_loan = loan_total(LoanKind::Margin);
        let margin_paid: f64 = source
            .margins()
            .iter()
            .filter(|margin| in_scope(*margin, stockist, as_of, &money_filter))
            .filter_map(|margin| margin.amount)
            .filter(|amount| amount.is_finite())
            .sum();

        let net_payable = total_cost - rental - interest - cash_loan - margin_loan + margin_paid;
        tracing::info!(stockist = %stockist, %as_of, net_payable, "final settlement assembled");

        Ok(FinalSettlement {
            stockist: stockist.to_string(),
            as_of,
            filter: filter.clone(),
            total_qty_kg: round2(total_qty_kg),
            reduction_kg: round2(reduction_kg),
            net_qty_kg: round2(net_qty_kg),
            rate_per_kg: round2(request.rate_per_kg),
            total_cost: round2(total_cost),
            rental: round2(rental),
            interest: round2(interest),
            cash_loan: round2(cash_loan),
            margin_loan: round2(margin_loan),
            margin_paid: round2(margin_paid),
            net_payable: round2(net_payable),
        })
    }
}

fn in_scope<R>(record: &R, stockist: &str, as_of: NaiveDate, filter: &EventFilter) -> bool
where
    R: Dated + OwnedByEntity + Positioned,
{
    record.belongs_to(stockist) && record.on_or_before(as_of) && filter.matches(record)
}
