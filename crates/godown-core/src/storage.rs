use godown_domain::{Book, Dated, Identifiable};

use crate::CoreError;

/// Abstraction over persistence backends capable of storing books.
pub trait BookStorage: Send + Sync {
    fn save_book(&self, name: &str, book: &Book) -> Result<(), CoreError>;
    fn load_book(&self, name: &str) -> Result<Book, CoreError>;
    fn list_books(&self) -> Result<Vec<String>, CoreError>;
    fn delete_book(&self, name: &str) -> Result<(), CoreError>;
}

/// Lists rows that the reports will silently skip: missing dates, missing or
/// non-finite amounts, and negative quantities.
pub fn book_warnings(book: &Book) -> Vec<String> {
    let mut warnings = Vec::new();

    for entry in &book.stock_entries {
        check_row(&mut warnings, "stock entry", entry, entry.quantity_kg);
    }
    for exit in &book.stock_exits {
        check_row(&mut warnings, "stock exit", exit, exit.effective_quantity_kg());
    }
    for loan in &book.loans {
        check_row(&mut warnings, "loan", loan, loan.amount);
    }
    for margin in &book.margins {
        check_row(&mut warnings, "margin", margin, margin.amount);
    }
    for repayment in &book.repayments {
        check_row(&mut warnings, "repayment", repayment, repayment.amount);
    }
    for loan in &book.company_loans {
        check_row(&mut warnings, "company loan", loan, loan.loan_amount);
    }
    for repayment in &book.company_repayments {
        check_row(&mut warnings, "company repayment", repayment, repayment.amount);
    }
    warnings
}

fn check_row<R>(warnings: &mut Vec<String>, label: &str, row: &R, amount: Option<f64>)
where
    R: Identifiable + Dated,
{
    if row.date().is_none() {
        warnings.push(format!("{label} {} has no date", row.id()));
    }
    match amount {
        None => warnings.push(format!("{label} {} has no amount", row.id())),
        Some(value) if !value.is_finite() => {
            warnings.push(format!("{label} {} has a non-numeric amount", row.id()))
        }
        Some(value) if value < 0.0 => {
            warnings.push(format!("{label} {} has a negative amount {value}", row.id()))
        }
        Some(_) => {}
    }
}
