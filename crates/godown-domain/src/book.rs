//! The `Book`: a named snapshot of every table the accrual reports read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::*;

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub name: String,
    #[serde(default = "Book::default_schema_version")]
    pub schema_version: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub stock_entries: Vec<StockEntry>,
    #[serde(default)]
    pub stock_exits: Vec<StockExit>,
    #[serde(default)]
    pub loans: Vec<StockistLoan>,
    #[serde(default)]
    pub margins: Vec<MarginPayment>,
    #[serde(default)]
    pub repayments: Vec<StockistRepayment>,
    #[serde(default)]
    pub company_loans: Vec<CompanyLoan>,
    #[serde(default)]
    pub company_repayments: Vec<CompanyRepayment>,
}

impl Book {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            schema_version: CURRENT_SCHEMA_VERSION,
            created_at: now,
            updated_at: now,
            stock_entries: Vec::new(),
            stock_exits: Vec::new(),
            loans: Vec::new(),
            margins: Vec::new(),
            repayments: Vec::new(),
            company_loans: Vec::new(),
            company_repayments: Vec::new(),
        }
    }

    fn default_schema_version() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn add_stock_entry(&mut self, entry: StockEntry) -> &mut Self {
        self.stock_entries.push(entry);
        self.touch();
        self
    }

    pub fn add_stock_exit(&mut self, exit: StockExit) -> &mut Self {
        self.stock_exits.push(exit);
        self.touch();
        self
    }

    pub fn add_loan(&mut self, loan: StockistLoan) -> &mut Self {
        self.loans.push(loan);
        self.touch();
        self
    }

    pub fn add_margin(&mut self, margin: MarginPayment) -> &mut Self {
        self.margins.push(margin);
        self.touch();
        self
    }

    pub fn add_repayment(&mut self, repayment: StockistRepayment) -> &mut Self {
        self.repayments.push(repayment);
        self.touch();
        self
    }

    pub fn add_company_loan(&mut self, loan: CompanyLoan) -> &mut Self {
        self.company_loans.push(loan);
        self.touch();
        self
    }

    pub fn add_company_repayment(&mut self, repayment: CompanyRepayment) -> &mut Self {
        self.company_repayments.push(repayment);
        self.touch();
        self
    }

    /// Total number of records across all tables.
    pub fn record_count(&self) -> usize {
        self.stock_entries.len()
            + self.stock_exits.len()
            + self.loans.len()
            + self.margins.len()
            + self.repayments.len()
            + self.company_loans.len()
            + self.company_repayments.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn book_round_trips_through_json_with_defaults() {
        let mut book = Book::new("Season 2024");
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        book.add_loan(StockistLoan::new(date, "Ravi", LoanKind::Cash, 1000.0))
            .add_margin(MarginPayment::new(date, "Ravi", 200.0));
        assert_eq!(book.record_count(), 2);

        let legacy = r#"{
            "name": "Legacy",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let parsed: Book = serde_json::from_str(legacy).expect("legacy book");
        assert_eq!(parsed.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(parsed.stock_entries.is_empty());
    }
}
