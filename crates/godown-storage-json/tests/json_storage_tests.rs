use std::fs;

use chrono::NaiveDate;
use godown_core::{BookStorage, CoreError};
use godown_domain::{Book, LoanKind, StockEntry, StockistLoan};
use godown_storage_json::{load_book_from_path, JsonBookStorage};
use tempfile::tempdir;

fn sample_book(name: &str) -> Book {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut book = Book::new(name);
    book.add_stock_entry(StockEntry::new(date, "Ravi", "WH-1", "Wheat", 1_000.0))
        .add_loan(StockistLoan::new(date, "Ravi", LoanKind::Cash, 5_000.0));
    book
}

#[test]
fn json_storage_can_save_and_load_book() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBookStorage::new(dir.path().join("books")).expect("create storage");

    let book = sample_book("Season 2024");
    storage.save_book("Season 2024", &book).expect("save book");
    let loaded = storage.load_book("Season 2024").expect("load book");

    assert_eq!(loaded.name, "Season 2024");
    assert_eq!(loaded.record_count(), 2);
    assert_eq!(loaded.stock_entries[0], book.stock_entries[0]);

    let path = storage.book_path("Season 2024");
    assert!(path.ends_with("season_2024.json"));
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn missing_book_is_reported_by_name() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBookStorage::new(dir.path().to_path_buf()).expect("create storage");

    let err = storage.load_book("nope").expect_err("missing book");
    assert!(matches!(err, CoreError::BookNotFound(name) if name == "nope"));
}

#[test]
fn list_and_delete_books() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBookStorage::new(dir.path().to_path_buf()).expect("create storage");
    storage.save_book("beta", &sample_book("Beta")).expect("save beta");
    storage.save_book("alpha", &sample_book("Alpha")).expect("save alpha");
    fs::write(dir.path().join("notes.txt"), "ignored").expect("write stray file");

    assert_eq!(storage.list_books().expect("list"), vec!["alpha", "beta"]);
    let metadata = storage.list_book_metadata().expect("metadata");
    assert_eq!(metadata[0].name, "Alpha");
    assert_eq!(metadata[0].record_count, 2);

    storage.delete_book("alpha").expect("delete");
    storage.delete_book("alpha").expect("delete twice");
    assert_eq!(storage.list_books().expect("list"), vec!["beta"]);
}

#[test]
fn corrupt_file_surfaces_serde_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").expect("write");

    assert!(matches!(load_book_from_path(&path), Err(CoreError::Serde(_))));
}
