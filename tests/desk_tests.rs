mod common;

use common::{date, sample_book, setup_test_env};
use godown::{policy_from_config, BookRef, GodownError, ReportDesk};
use godown_config::Config;
use godown_core::{RentalPlan, SettlementRequest};
use godown_domain::EventFilter;

#[test]
fn named_books_round_trip_through_the_store() {
    let env = setup_test_env();
    let book = sample_book();
    let target = BookRef::Named("Season 2024".into());

    env.desk.save_book(&target, &book).expect("save book");
    let listed = env.desk.list_books().expect("list books");
    assert_eq!(listed.len(), 1);

    let loaded = env.desk.open_book(&target).expect("open book");
    assert_eq!(loaded.name, "Season 2024");
    assert_eq!(loaded.record_count(), book.record_count());
}

#[test]
fn file_books_open_without_a_store() {
    let env = setup_test_env();
    let path = env.base.join("loose.json");
    let desk = ReportDesk::new(Default::default());

    desk.save_book(&BookRef::File(path.clone()), &sample_book())
        .expect("save to file");
    let loaded = desk.open_book(&BookRef::File(path)).expect("open file");
    assert_eq!(loaded.stock_entries.len(), 2);

    let err = desk
        .open_book(&BookRef::Named("Season 2024".into()))
        .expect_err("no store configured");
    assert!(matches!(err, GodownError::StorageError(_)));
}

#[test]
fn missing_named_book_is_reported() {
    let env = setup_test_env();
    let err = env
        .desk
        .open_book(&BookRef::Named("nowhere".into()))
        .expect_err("missing book");
    assert!(matches!(err, GodownError::BookNotFound(name) if name == "nowhere"));
}

#[test]
fn policy_follows_configured_tariff() {
    let mut config = Config::default();
    config.interest_annual_rate = 0.12;
    config.rental_per_ton_per_day = 2.0;
    config.flat_rate_entities.clear();
    config.flat_rate_entities.insert("Kisan Co".into(), 500.0);
    config.reduction_commodities = vec!["Wheat".into()];

    let policy = policy_from_config(&config);
    assert_eq!(policy.interest.annual_rate, 0.12);
    assert_eq!(policy.rental.plan_for(" kisan co "), RentalPlan::FlatYearly { per_ton: 500.0 });
    assert_eq!(
        policy.rental.plan_for("Anunay Agro"),
        RentalPlan::Daily { per_ton_per_day: 2.0 }
    );
    assert!(policy.reduction.applies_to(Some("Wheat")));
    assert!(!policy.reduction.applies_to(Some("Maize")));
}

#[test]
fn desk_reports_agree_with_each_other() {
    let env = setup_test_env();
    let book = sample_book();
    let as_of = date(2024, 1, 31);

    let receivable = env.desk.interest_receivable(&book, as_of);
    let payable = env.desk.interest_payable(&book, as_of);
    let statement = env.desk.profit_loss(&book, as_of);
    let net = statement.financing.net;
    assert!((net - (receivable.total_receivable - payable.total_payable)).abs() < 0.011);

    let rental = env.desk.rental_due(&book, as_of, &EventFilter::all());
    assert_eq!(rental.lines.len(), 2);

    let settlement = env
        .desk
        .final_settlement(&book, &SettlementRequest::new("Ravi Traders", as_of, 20.0))
        .expect("settlement");
    assert_eq!(settlement.cash_loan, 50_000.0);
    assert_eq!(settlement.margin_paid, 5_000.0);
}

#[test]
fn breakeven_requires_a_commodity() {
    let env = setup_test_env();
    let err = env
        .desk
        .breakeven(&sample_book(), "Anunay Agro", " ", &["Good"], date(2024, 1, 31))
        .expect_err("blank commodity");
    assert!(matches!(err, GodownError::InvalidInput(_)));

    let rows = env
        .desk
        .breakeven(&sample_book(), "Anunay Agro", "Maize", &["Good", "BD"], date(2024, 1, 31))
        .expect("breakeven");
    assert_eq!(rows.len(), 2);
    assert!(rows[0].breakeven_per_ton > 0.0);
    assert_eq!(rows[1].stock_kg, 0.0);
}
