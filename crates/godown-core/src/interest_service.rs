//! Interest receivable from stockists and payable on company borrowing.

use chrono::NaiveDate;
use serde::Serialize;

use godown_domain::{round2, AccrualResult, Dated, EventFilter};

use crate::{
    accrual::AccrualEngine,
    extract::{EventExtractor, InterestBasis, COMPANY_ENTITY},
    rates::RatePolicy,
    source::RecordSource,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterestReceivableReport {
    pub as_of: NaiveDate,
    pub annual_rate: f64,
    pub per_stockist: Vec<AccrualResult>,
    pub total_receivable: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterestPayableReport {
    pub as_of: NaiveDate,
    pub annual_rate: f64,
    pub accrued_interest: f64,
    pub processing_fees: f64,
    pub total_payable: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanDue {
    pub total_borrowed: f64,
    pub total_repaid: f64,
    pub loan_due: f64,
}

pub struct InterestService;

impl InterestService {
    /// Interest owed by every stockist, accrued per stockist on loans less
    /// margins and repayments, then summed.
    pub fn receivable<S: RecordSource + ?Sized>(
        source: &S,
        policy: &RatePolicy,
        as_of: NaiveDate,
    ) -> InterestReceivableReport {
        let rate = policy.interest.daily_rate();
        let per_stockist: Vec<AccrualResult> = EventExtractor::interest_entities(source, as_of)
            .iter()
            .map(|name| {
                let deltas = EventExtractor::interest_deltas(
                    source,
                    name,
                    as_of,
                    &EventFilter::all(),
                    InterestBasis::WithRepayments,
                );
                AccrualEngine::accrue_for(name, &deltas, as_of, rate)
            })
            .collect();
        let total_receivable = round2(per_stockist.iter().map(|r| r.total_accrued).sum());
        tracing::info!(%as_of, stockists = per_stockist.len(), total_receivable, "interest receivable");
        InterestReceivableReport {
            as_of,
            annual_rate: policy.interest.annual_rate,
            per_stockist,
            total_receivable,
        }
    }

    /// Interest the company owes on its own loans, plus processing fees on loans taken by `as_of`.
    pub fn payable<S: RecordSource + ?Sized>(
        source: &S,
        policy: &RatePolicy,
        as_of: NaiveDate,
    ) -> InterestPayableReport {
        let deltas = EventExtractor::company_deltas(source, as_of);
        let accrued =
            AccrualEngine::accrue_for(COMPANY_ENTITY, &deltas, as_of, policy.interest.daily_rate());
        let processing_fees = round2(
            source
                .company_loans()
                .iter()
                .filter(|loan| loan.on_or_before(as_of) && loan.total_processing_fee.is_finite())
                .map(|loan| loan.total_processing_fee)
                .sum(),
        );
        let total_payable = round2(accrued.total_accrued + processing_fees);
        tracing::info!(%as_of, total_payable, "interest payable");
        InterestPayableReport {
            as_of,
            annual_rate: policy.interest.annual_rate,
            accrued_interest: accrued.total_accrued,
            processing_fees,
            total_payable,
        }
    }

    /// Principal still owed on company borrowing, across all dates.
    pub fn loan_due<S: RecordSource + ?Sized>(source: &S) -> LoanDue {
        let total_borrowed: f64 = source
            .company_loans()
            .iter()
            .filter_map(|loan| loan.loan_amount)
            .filter(|amount| amount.is_finite())
            .sum();
        let total_repaid: f64 = source
            .company_repayments()
            .iter()
            .filter_map(|repayment| repayment.amount)
            .filter(|amount| amount.is_finite())
            .sum();
        LoanDue {
            total_borrowed: round2(total_borrowed),
            total_repaid: round2(total_repaid),
            loan_due: round2(total_borrowed - total_repaid),
        }
    }
}

#[cfg(test)]
mod tests {
    use godown_domain::{Book, CompanyLoan, CompanyRepayment, LoanKind, StockistLoan, StockistRepayment};

    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn receivable_sums_separate_stockist_accruals() {
        let mut book = Book::new("receivable");
        book.add_loan(StockistLoan::new(date(1, 1), "Ravi", LoanKind::Cash, 36_500.0))
            .add_repayment(StockistRepayment::new(date(1, 1), "Ravi", 36_500.0))
            .add_loan(StockistLoan::new(date(1, 1), "Mohan", LoanKind::Cash, 36_500.0));
        let policy = RatePolicy::default();
        let rate = policy.interest.daily_rate();
        let report = InterestService::receivable(&book, &policy, date(1, 10));
        assert_eq!(report.per_stockist.len(), 2);
        let mohan = &report.per_stockist[0];
        assert_eq!(mohan.entity_key, "MOHAN");
        assert_eq!(mohan.total_accrued, round2(36_500.0 * rate * 10.0));
        assert_eq!(report.per_stockist[1].total_accrued, 0.0);
        assert_eq!(report.total_receivable, mohan.total_accrued);
    }

    #[test]
    fn payable_adds_processing_fees() {
        let mut book = Book::new("payable");
        book.add_company_loan(CompanyLoan::new(date(1, 1), 100_000.0, 1_500.0))
            .add_company_repayment(CompanyRepayment::new(date(1, 11), 40_000.0))
            .add_company_loan(CompanyLoan::new(date(3, 1), 5_000.0, 99.0));
        let policy = RatePolicy::default();
        let rate = policy.interest.daily_rate();
        let report = InterestService::payable(&book, &policy, date(1, 31));
        let expected = round2(100_000.0 * rate * 10.0 + 60_000.0 * rate * 21.0);
        assert_eq!(report.accrued_interest, expected);
        assert_eq!(report.processing_fees, 1_500.0);
        assert_eq!(report.total_payable, round2(expected + 1_500.0));

        let due = InterestService::loan_due(&book);
        assert_eq!(due.loan_due, 65_000.0);
    }
}
