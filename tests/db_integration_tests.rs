//! End-to-end repository tests against a real on-disk SQLite database.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use nestfolio_core::accounts::{AccountRepository, AccountRepositoryTrait, AccountType, NewAccount};
use nestfolio_core::db::{self, DbPool};
use nestfolio_core::institutions::{
    InstitutionRepository, InstitutionRepositoryTrait, NewInstitution,
};
use nestfolio_core::products::{
    LiquidityRule, NewProduct, ProductRepository, ProductRepositoryTrait, ProductType,
};
use nestfolio_core::snapshots::{NewSnapshot, SnapshotRepository, SnapshotRepositoryTrait};
use nestfolio_core::transactions::{
    NewTransaction, TransactionCategory, TransactionFilter, TransactionRepository,
    TransactionRepositoryTrait,
};
use nestfolio_core::valuations::{
    NewValuationPoint, ValuationRepository, ValuationRepositoryTrait,
};

fn setup_db() -> (TempDir, Arc<DbPool>) {
    let dir = TempDir::new().expect("create temp dir");
    let db_path = dir.path().join("holdings.db");
    let pool = db::create_pool(db_path.to_str().unwrap()).expect("create pool");
    db::run_migrations(&pool).expect("run migrations");
    (dir, pool)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Inserts an institution, an account and a product and returns their ids.
fn seed_holdings(pool: &Arc<DbPool>) -> (String, String, String) {
    let institution = InstitutionRepository::new(pool.clone())
        .create(NewInstitution {
            id: None,
            name: "Test Bank".to_string(),
        })
        .expect("create institution");

    let account = AccountRepository::new(pool.clone())
        .create(NewAccount {
            id: None,
            name: "Everyday".to_string(),
            institution_id: institution.id.clone(),
            account_type: AccountType::Debit,
            is_liquid: true,
        })
        .expect("create account");

    let product = ProductRepository::new(pool.clone())
        .create(NewProduct {
            id: None,
            name: "Stable Income 90d".to_string(),
            institution_id: Some(institution.id.clone()),
            product_code: Some("SI-090".to_string()),
            product_type: ProductType::BankWmp,
            risk_level: None,
            term_days: Some(90),
            liquidity_rule: LiquidityRule::Closed,
            settle_days: Some(2),
            note: None,
        })
        .expect("create product");

    (institution.id, account.id, product.id)
}

#[test]
fn test_institution_account_product_round_trip() {
    let (_dir, pool) = setup_db();
    let (institution_id, account_id, product_id) = seed_holdings(&pool);

    let fetched = InstitutionRepository::new(pool.clone())
        .get_by_id(&institution_id)
        .unwrap();
    assert_eq!(fetched.name, "Test Bank");

    let account = AccountRepository::new(pool.clone())
        .get_by_id(&account_id)
        .unwrap();
    assert_eq!(account.account_type, AccountType::Debit);
    assert!(account.is_liquid);

    let product = ProductRepository::new(pool.clone())
        .get_by_id(&product_id)
        .unwrap();
    assert_eq!(product.product_type, ProductType::BankWmp);
    assert_eq!(product.term_days, Some(90));
    assert_eq!(product.settle_days, 2);
}

#[test]
fn test_missing_account_is_not_found() {
    let (_dir, pool) = setup_db();
    let result = AccountRepository::new(pool).get_by_id("no-such-account");
    assert!(result.is_err());
}

#[test]
fn test_transaction_filtering_and_pagination() {
    let (_dir, pool) = setup_db();
    let (_, account_id, product_id) = seed_holdings(&pool);
    let repo = TransactionRepository::new(pool.clone());

    for (day, category, amount) in [
        (1, TransactionCategory::Buy, dec!(10000)),
        (5, TransactionCategory::Fee, dec!(12.50)),
        (9, TransactionCategory::RedeemRequest, dec!(3000)),
    ] {
        repo.create(NewTransaction {
            id: None,
            product_id: product_id.clone(),
            account_id: account_id.clone(),
            category,
            trade_date: date(2024, 3, day),
            settle_date: None,
            amount,
            note: None,
        })
        .unwrap();
    }

    let filter = TransactionFilter {
        product_id: Some(product_id.clone()),
        account_id: None,
        category: None,
        start_date: None,
        end_date: None,
    };
    let page = repo.list(&filter, 1, 2).unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 2);
    // newest first
    assert_eq!(page.items[0].trade_date, date(2024, 3, 9));

    let buys = repo
        .list_by_category(TransactionCategory::Buy, Some(&product_id))
        .unwrap();
    assert_eq!(buys.len(), 1);
    assert_eq!(buys[0].amount, dec!(10000));

    let windowed = repo
        .list_for_product(&product_id, Some(date(2024, 3, 2)), Some(date(2024, 3, 9)))
        .unwrap();
    assert_eq!(windowed.len(), 2);
    // ascending within the window
    assert_eq!(windowed[0].trade_date, date(2024, 3, 5));
}

#[test]
fn test_valuation_upsert_counts_and_boundary_lookups() {
    let (_dir, pool) = setup_db();
    let (_, _, product_id) = seed_holdings(&pool);
    let repo = ValuationRepository::new(pool.clone());

    let report = repo
        .upsert_points(vec![
            NewValuationPoint {
                product_id: product_id.clone(),
                date: date(2024, 1, 1),
                market_value: dec!(100),
            },
            NewValuationPoint {
                product_id: product_id.clone(),
                date: date(2024, 1, 11),
                market_value: dec!(110),
            },
        ])
        .unwrap();
    assert_eq!(report.inserted, 2);
    assert_eq!(report.updated, 0);

    // Same date again overwrites in place.
    let report = repo
        .upsert_points(vec![NewValuationPoint {
            product_id: product_id.clone(),
            date: date(2024, 1, 11),
            market_value: dec!(111),
        }])
        .unwrap();
    assert_eq!(report.inserted, 0);
    assert_eq!(report.updated, 1);

    let points = repo.list_points(&product_id, None, None).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[1].market_value, dec!(111));

    let before = repo.point_before(&product_id, date(2024, 1, 11)).unwrap();
    assert_eq!(before.unwrap().date, date(2024, 1, 1));

    let after = repo.point_after(&product_id, date(2024, 1, 1)).unwrap();
    assert_eq!(after.unwrap().date, date(2024, 1, 11));

    let latest = repo.latest_point(&product_id).unwrap().unwrap();
    assert_eq!(latest.market_value, dec!(111));
}

#[test]
fn test_snapshot_upsert_and_latest_through() {
    let (_dir, pool) = setup_db();
    let (_, account_id, _) = seed_holdings(&pool);
    let repo = SnapshotRepository::new(pool.clone());

    let inserted = repo
        .upsert(NewSnapshot {
            date: date(2024, 2, 1),
            account_id: account_id.clone(),
            balance: dec!(5000),
        })
        .unwrap();
    assert!(inserted);

    let inserted = repo
        .upsert(NewSnapshot {
            date: date(2024, 2, 1),
            account_id: account_id.clone(),
            balance: dec!(5200),
        })
        .unwrap();
    assert!(!inserted, "same (date, account) updates the existing row");

    repo.upsert(NewSnapshot {
        date: date(2024, 2, 8),
        account_id: account_id.clone(),
        balance: dec!(4800),
    })
    .unwrap();

    let latest = repo.list_latest_through(date(2024, 2, 5)).unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].balance, dec!(5200));

    assert_eq!(repo.latest_date().unwrap(), Some(date(2024, 2, 8)));
    assert_eq!(
        repo.available_dates().unwrap(),
        vec![date(2024, 2, 8), date(2024, 2, 1)]
    );
}
