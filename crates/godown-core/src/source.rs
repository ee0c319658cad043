use godown_domain::{
    Book, CompanyLoan, CompanyRepayment, MarginPayment, StockEntry, StockExit, StockistLoan,
    StockistRepayment,
};

/// Read-only access to the tables the reports consume.
///
/// The bookkeeping layer is external; anything that can hand out these slices
/// can be reported on.
pub trait RecordSource: Send + Sync {
    fn stock_entries(&self) -> &[StockEntry];
    fn stock_exits(&self) -> &[StockExit];
    fn loans(&self) -> &[StockistLoan];
    fn margins(&self) -> &[MarginPayment];
    fn repayments(&self) -> &[StockistRepayment];
    fn company_loans(&self) -> &[CompanyLoan];
    fn company_repayments(&self) -> &[CompanyRepayment];
}

impl RecordSource for Book {
    fn stock_entries(&self) -> &[StockEntry] {
        &self.stock_entries
    }

    fn stock_exits(&self) -> &[StockExit] {
        &self.stock_exits
    }

    fn loans(&self) -> &[StockistLoan] {
        &self.loans
    }

    fn margins(&self) -> &[MarginPayment] {
        &self.margins
    }

    fn repayments(&self) -> &[StockistRepayment] {
        &self.repayments
    }

    fn company_loans(&self) -> &[CompanyLoan] {
        &self.company_loans
    }

    fn company_repayments(&self) -> &[CompanyRepayment] {
        &self.company_repayments
    }
}
