//! Wires configuration, book storage and the report services together.

use std::path::PathBuf;

use chrono::NaiveDate;
use godown_config::Config;
use godown_core::{
    book_warnings, BookStorage, Breakeven, BreakevenService, FinalSettlement, InterestPayableReport,
    InterestReceivableReport, InterestService, InterestPolicy, LoanDue, ProfitLossService,
    ProfitLossStatement, QuantityReduction, RatePolicy, RentalDueReport, RentalPolicy,
    RentalService, SettlementRequest, SettlementService, StatementService, StockistStatement,
};
use godown_domain::{Book, EventFilter};
use godown_storage_json::{load_book_from_path, save_book_to_path, JsonBookStorage};

use crate::{GodownError, Result};

/// Where a book comes from: a file on disk or a name in the book store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookRef {
    File(PathBuf),
    Named(String),
}

/// Builds the tariff the report services read from configuration.
pub fn policy_from_config(config: &Config) -> RatePolicy {
    let rental = config
        .flat_rate_entities
        .iter()
        .fold(RentalPolicy::new(config.rental_per_ton_per_day), |policy, (entity, per_ton)| {
            policy.with_flat_rate(entity.as_str(), *per_ton)
        });
    RatePolicy {
        interest: InterestPolicy::new(config.interest_annual_rate),
        rental,
        reduction: QuantityReduction::new(config.reduction_rate, &config.reduction_commodities),
    }
}

/// Front desk for reports: opens books and runs every report against one tariff.
pub struct ReportDesk {
    policy: RatePolicy,
    storage: Option<Box<dyn BookStorage>>,
}

impl ReportDesk {
    pub fn new(policy: RatePolicy) -> Self {
        Self {
            policy,
            storage: None,
        }
    }

    pub fn with_storage(mut self, storage: Box<dyn BookStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// A desk using the configured tariff and the JSON book store under the data root.
    pub fn from_config(config: &Config) -> Result<Self> {
        let books_dir = config.resolve_data_root().join("books");
        let storage = JsonBookStorage::new(books_dir)?;
        Ok(Self::new(policy_from_config(config)).with_storage(Box::new(storage)))
    }

    pub fn policy(&self) -> &RatePolicy {
        &self.policy
    }

    fn storage(&self) -> Result<&dyn BookStorage> {
        self.storage
            .as_deref()
            .ok_or_else(|| GodownError::StorageError("no book store configured".into()))
    }

    pub fn open_book(&self, book: &BookRef) -> Result<Book> {
        let loaded = match book {
            BookRef::File(path) => load_book_from_path(path)?,
            BookRef::Named(name) => self.storage()?.load_book(name)?,
        };
        tracing::info!(book = %loaded.name, records = loaded.record_count(), "book loaded");
        for warning in book_warnings(&loaded) {
            tracing::warn!(book = %loaded.name, "{warning}");
        }
        Ok(loaded)
    }

    pub fn save_book(&self, target: &BookRef, book: &Book) -> Result<()> {
        match target {
            BookRef::File(path) => save_book_to_path(book, path)?,
            BookRef::Named(name) => self.storage()?.save_book(name, book)?,
        }
        tracing::info!(book = %book.name, "book saved");
        Ok(())
    }

    pub fn list_books(&self) -> Result<Vec<String>> {
        Ok(self.storage()?.list_books()?)
    }

    pub fn rental_due(&self, book: &Book, as_of: NaiveDate, filter: &EventFilter) -> RentalDueReport {
        RentalService::rental_due_report(book, &self.policy, as_of, filter)
    }

    pub fn interest_receivable(&self, book: &Book, as_of: NaiveDate) -> InterestReceivableReport {
        InterestService::receivable(book, &self.policy, as_of)
    }

    pub fn interest_payable(&self, book: &Book, as_of: NaiveDate) -> InterestPayableReport {
        InterestService::payable(book, &self.policy, as_of)
    }

    pub fn loan_due(&self, book: &Book) -> LoanDue {
        InterestService::loan_due(book)
    }

    pub fn final_settlement(&self, book: &Book, request: &SettlementRequest) -> Result<FinalSettlement> {
        Ok(SettlementService::final_settlement(book, &self.policy, request)?)
    }

    pub fn breakeven(
        &self,
        book: &Book,
        entity: &str,
        commodity: &str,
        qualities: &[&str],
        as_of: NaiveDate,
    ) -> Result<Vec<Breakeven>> {
        if commodity.trim().is_empty() {
            return Err(GodownError::InvalidInput("commodity is required".into()));
        }
        Ok(BreakevenService::breakeven_by_quality(
            book,
            &self.policy,
            entity,
            commodity.trim(),
            qualities,
            as_of,
        ))
    }

    pub fn profit_loss(&self, book: &Book, as_of: NaiveDate) -> ProfitLossStatement {
        ProfitLossService::statement(book, &self.policy, as_of)
    }

    pub fn stockist_statement(
        &self,
        book: &Book,
        stockist: &str,
        as_of: NaiveDate,
    ) -> Result<StockistStatement> {
        Ok(StatementService::stockist_statement(book, &self.policy, stockist, as_of)?)
    }
}
