#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use chrono::NaiveDate;
use godown::{policy_from_config, ReportDesk};
use godown_config::{Config, ConfigManager};
use godown_domain::{
    Book, CompanyLoan, CompanyRepayment, LoanKind, MarginPayment, StockEntry, StockExit,
    StockistLoan, StockistRepayment,
};
use godown_storage_json::JsonBookStorage;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub struct TestEnv {
    pub base: PathBuf,
    pub config_path: PathBuf,
    pub desk: ReportDesk,
}

/// Creates a desk and a saved config backed by a unique directory for each test.
pub fn setup_test_env() -> TestEnv {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    let config = Config {
        data_root: Some(base.clone()),
        ..Config::default()
    };
    config_manager.save(&config).expect("save config");

    let storage = JsonBookStorage::new(base.join("books")).expect("create json book storage");
    let desk = ReportDesk::new(policy_from_config(&config)).with_storage(Box::new(storage));

    TestEnv {
        config_path: config_manager.config_path().to_path_buf(),
        base,
        desk,
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// A small season: one daily-plan stockist, one flat-plan stockist and company borrowing.
pub fn sample_book() -> Book {
    let mut book = Book::new("Season 2024");
    book.add_stock_entry(
        StockEntry::new(date(2024, 1, 1), "Ravi Traders", "WH-1", "Maize", 10_000.0)
            .with_quality("Good"),
    )
    .add_stock_exit(StockExit::new(date(2024, 1, 21), "Ravi Traders", "WH-1", "Maize", 4_000.0))
    .add_loan(
        StockistLoan::new(date(2024, 1, 5), "Ravi Traders", LoanKind::Cash, 50_000.0)
            .at("WH-1", "Maize"),
    )
    .add_margin(MarginPayment::new(date(2024, 1, 5), "Ravi Traders", 5_000.0).at("WH-1", "Maize"))
    .add_repayment(StockistRepayment::new(date(2024, 1, 20), "Ravi Traders", 10_000.0))
    .add_stock_entry(
        StockEntry::new(date(2024, 1, 2), "Anunay Agro", "WH-2", "Maize", 20_000.0)
            .with_quality("Good")
            .with_cost(400_000.0),
    )
    .add_stock_exit(
        StockExit::new(date(2024, 1, 25), "Anunay Agro", "WH-2", "Maize", 5_000.0)
            .with_quality("Good")
            .with_rate(24.0),
    )
    .add_company_loan(CompanyLoan::new(date(2024, 1, 1), 100_000.0, 1_000.0))
    .add_company_repayment(CompanyRepayment::new(date(2024, 1, 15), 40_000.0));
    book
}
