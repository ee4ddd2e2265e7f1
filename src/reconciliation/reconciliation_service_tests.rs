#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    use crate::accounts::{Account, AccountRepositoryTrait, AccountType, AccountUpdate, NewAccount};
    use crate::errors::{Error, Result};
    use crate::products::{
        LiquidityRule, NewProduct, Product, ProductRepositoryTrait, ProductType, ProductUpdate,
    };
    use crate::reconciliation::{
        ReconciliationService, RedeemStatus, Severity, WarningRecord, WarningRepositoryTrait,
        WarningStatus, WarningType,
    };
    use crate::snapshots::{NewSnapshot, Snapshot, SnapshotRepositoryTrait};
    use crate::transactions::{
        NewTransaction, Paginated, Transaction, TransactionCategory, TransactionFilter,
        TransactionRepositoryTrait,
    };
    use crate::valuations::{
        NewValuationPoint, UpsertReport, ValuationPoint, ValuationRepositoryTrait,
    };

    struct MockAccountRepository {
        accounts: Vec<Account>,
    }

    impl AccountRepositoryTrait for MockAccountRepository {
        fn create(&self, _new_account: NewAccount) -> Result<Account> {
            unimplemented!()
        }
        fn update(&self, _account_update: AccountUpdate) -> Result<Account> {
            unimplemented!()
        }
        fn get_by_id(&self, account_id: &str) -> Result<Account> {
            self.accounts
                .iter()
                .find(|a| a.id == account_id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("Account {} not found", account_id)))
        }
        fn list(&self, liquid_filter: Option<bool>) -> Result<Vec<Account>> {
            Ok(self
                .accounts
                .iter()
                .filter(|a| liquid_filter.is_none_or(|liquid| a.is_liquid == liquid))
                .cloned()
                .collect())
        }
        fn delete(&self, _account_id: &str) -> Result<usize> {
            unimplemented!()
        }
    }

    struct MockProductRepository {
        products: Vec<Product>,
    }

    impl ProductRepositoryTrait for MockProductRepository {
        fn create(&self, _new_product: NewProduct) -> Result<Product> {
            unimplemented!()
        }
        fn patch(&self, _product_id: &str, _update: ProductUpdate) -> Result<Product> {
            unimplemented!()
        }
        fn get_by_id(&self, product_id: &str) -> Result<Product> {
            self.products
                .iter()
                .find(|p| p.id == product_id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("Product {} not found", product_id)))
        }
        fn list(&self) -> Result<Vec<Product>> {
            Ok(self.products.clone())
        }
        fn delete(&self, _product_id: &str) -> Result<usize> {
            unimplemented!()
        }
    }

    struct MockTransactionRepository {
        transactions: Vec<Transaction>,
    }

    impl TransactionRepositoryTrait for MockTransactionRepository {
        fn create(&self, _new_transaction: NewTransaction) -> Result<Transaction> {
            unimplemented!()
        }
        fn list(
            &self,
            _filter: &TransactionFilter,
            _page: i64,
            _page_size: i64,
        ) -> Result<Paginated<Transaction>> {
            unimplemented!()
        }
        fn list_for_product(
            &self,
            product_id: &str,
            start_date: Option<NaiveDate>,
            end_date: Option<NaiveDate>,
        ) -> Result<Vec<Transaction>> {
            Ok(self
                .transactions
                .iter()
                .filter(|tx| tx.product_id == product_id)
                .filter(|tx| start_date.is_none_or(|s| tx.trade_date >= s))
                .filter(|tx| end_date.is_none_or(|e| tx.trade_date <= e))
                .cloned()
                .collect())
        }
        fn list_by_category(
            &self,
            category: TransactionCategory,
            product_id: Option<&str>,
        ) -> Result<Vec<Transaction>> {
            Ok(self
                .transactions
                .iter()
                .filter(|tx| tx.category == category)
                .filter(|tx| product_id.is_none_or(|pid| tx.product_id == pid))
                .cloned()
                .collect())
        }
        fn list_settled_for_account(
            &self,
            account_id: &str,
            after: NaiveDate,
            through: NaiveDate,
        ) -> Result<Vec<Transaction>> {
            Ok(self
                .transactions
                .iter()
                .filter(|tx| tx.account_id == account_id)
                .filter(|tx| {
                    tx.settle_date
                        .is_some_and(|settle| settle > after && settle <= through)
                })
                .cloned()
                .collect())
        }
        fn delete(&self, _transaction_id: &str) -> Result<usize> {
            unimplemented!()
        }
    }

    struct MockSnapshotRepository {
        snapshots: Vec<Snapshot>,
    }

    impl SnapshotRepositoryTrait for MockSnapshotRepository {
        fn upsert(&self, _snapshot: NewSnapshot) -> Result<bool> {
            unimplemented!()
        }
        fn list_on_date(&self, on_date: NaiveDate) -> Result<Vec<Snapshot>> {
            Ok(self
                .snapshots
                .iter()
                .filter(|s| s.date == on_date)
                .cloned()
                .collect())
        }
        fn list_latest_through(&self, _through: NaiveDate) -> Result<Vec<Snapshot>> {
            unimplemented!()
        }
        fn latest_for_account(
            &self,
            account_id: &str,
            through: NaiveDate,
        ) -> Result<Option<Snapshot>> {
            Ok(self
                .snapshots
                .iter()
                .filter(|s| s.account_id == account_id && s.date <= through)
                .max_by_key(|s| s.date)
                .cloned())
        }
        fn latest_date(&self) -> Result<Option<NaiveDate>> {
            Ok(self.snapshots.iter().map(|s| s.date).max())
        }
        fn available_dates(&self) -> Result<Vec<NaiveDate>> {
            unimplemented!()
        }
        fn delete(&self, _snapshot_id: &str) -> Result<usize> {
            unimplemented!()
        }
    }

    struct MockValuationRepository {
        points: Vec<ValuationPoint>,
    }

    impl ValuationRepositoryTrait for MockValuationRepository {
        fn upsert_points(&self, _points: Vec<NewValuationPoint>) -> Result<UpsertReport> {
            unimplemented!()
        }
        fn list_points(
            &self,
            _product_id: &str,
            _start: Option<NaiveDate>,
            _end: Option<NaiveDate>,
        ) -> Result<Vec<ValuationPoint>> {
            unimplemented!()
        }
        fn point_before(
            &self,
            _product_id: &str,
            _before: NaiveDate,
        ) -> Result<Option<ValuationPoint>> {
            unimplemented!()
        }
        fn point_after(
            &self,
            _product_id: &str,
            _after: NaiveDate,
        ) -> Result<Option<ValuationPoint>> {
            unimplemented!()
        }
        fn latest_point(&self, product_id: &str) -> Result<Option<ValuationPoint>> {
            Ok(self
                .points
                .iter()
                .filter(|p| p.product_id == product_id)
                .max_by_key(|p| p.date)
                .cloned())
        }
        fn delete_point(&self, _point_id: &str) -> Result<usize> {
            unimplemented!()
        }
    }

    #[derive(Default)]
    struct MockWarningRepository;

    impl WarningRepositoryTrait for MockWarningRepository {
        fn get_by_warning_id(&self, _warning_id: &str) -> Result<Option<WarningRecord>> {
            Ok(None)
        }
        fn list_by_warning_ids(&self, _warning_ids: &[String]) -> Result<Vec<WarningRecord>> {
            Ok(Vec::new())
        }
        fn upsert_status(
            &self,
            warning_id: &str,
            warning_type: WarningType,
            object_type: &str,
            object_id: &str,
            status: WarningStatus,
            mute_reason: Option<String>,
        ) -> Result<WarningRecord> {
            let now = chrono::Utc::now().naive_utc();
            Ok(WarningRecord {
                id: uuid::Uuid::new_v4().to_string(),
                warning_id: warning_id.to_string(),
                warning_type,
                object_type: object_type.to_string(),
                object_id: object_id.to_string(),
                status,
                mute_reason,
                created_at: now,
                updated_at: now,
            })
        }
    }

    fn account(id: &str) -> Account {
        let now = chrono::Utc::now().naive_utc();
        Account {
            id: id.to_string(),
            name: format!("Account {}", id),
            institution_id: "i1".to_string(),
            account_type: AccountType::Debit,
            is_liquid: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn product(id: &str) -> Product {
        let now = chrono::Utc::now().naive_utc();
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            institution_id: None,
            product_code: None,
            product_type: ProductType::BankWmp,
            risk_level: None,
            term_days: None,
            liquidity_rule: LiquidityRule::Open,
            settle_days: 2,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn snapshot(account_id: &str, date: NaiveDate, balance: Decimal) -> Snapshot {
        let now = chrono::Utc::now().naive_utc();
        Snapshot {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            account_id: account_id.to_string(),
            balance,
            created_at: now,
            updated_at: now,
        }
    }

    fn transaction(
        product_id: &str,
        account_id: &str,
        category: TransactionCategory,
        trade_date: NaiveDate,
        settle_date: Option<NaiveDate>,
        amount: Decimal,
    ) -> Transaction {
        let now = chrono::Utc::now().naive_utc();
        Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            account_id: account_id.to_string(),
            category,
            trade_date,
            settle_date,
            amount,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn valuation(product_id: &str, date: NaiveDate, value: Decimal) -> ValuationPoint {
        let now = chrono::Utc::now().naive_utc();
        ValuationPoint {
            id: uuid::Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            date,
            market_value: value,
            created_at: now,
            updated_at: now,
        }
    }

    struct Fixture {
        accounts: Vec<Account>,
        products: Vec<Product>,
        transactions: Vec<Transaction>,
        snapshots: Vec<Snapshot>,
        valuations: Vec<ValuationPoint>,
    }

    impl Fixture {
        fn empty() -> Self {
            Self {
                accounts: Vec::new(),
                products: Vec::new(),
                transactions: Vec::new(),
                snapshots: Vec::new(),
                valuations: Vec::new(),
            }
        }

        fn service(self) -> ReconciliationService {
            ReconciliationService::new(
                Arc::new(MockAccountRepository {
                    accounts: self.accounts,
                }),
                Arc::new(MockProductRepository {
                    products: self.products,
                }),
                Arc::new(MockTransactionRepository {
                    transactions: self.transactions,
                }),
                Arc::new(MockSnapshotRepository {
                    snapshots: self.snapshots,
                }),
                Arc::new(MockValuationRepository {
                    points: self.valuations,
                }),
                Arc::new(MockWarningRepository),
            )
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    #[test]
    fn test_derived_balance_applies_signed_flows() {
        let mut fixture = Fixture::empty();
        fixture.accounts = vec![account("a1")];
        fixture.snapshots = vec![snapshot("a1", day(2024, 1, 1), dec!(1000))];
        fixture.transactions = vec![
            transaction(
                "p1",
                "a1",
                TransactionCategory::Income,
                day(2024, 1, 3),
                Some(day(2024, 1, 3)),
                dec!(200),
            ),
            transaction(
                "p1",
                "a1",
                TransactionCategory::Buy,
                day(2024, 1, 4),
                Some(day(2024, 1, 5)),
                dec!(300),
            ),
            // A bare request moves nothing on the account.
            transaction(
                "p1",
                "a1",
                TransactionCategory::RedeemRequest,
                day(2024, 1, 6),
                Some(day(2024, 1, 6)),
                dec!(500),
            ),
        ];

        let service = fixture.service();
        let derived = service.derived_balance("a1", day(2024, 1, 10)).unwrap();

        assert_eq!(derived, Some(dec!(900)));
    }

    #[test]
    fn test_derived_balance_needs_an_opening_snapshot() {
        let mut fixture = Fixture::empty();
        fixture.accounts = vec![account("a1")];

        let service = fixture.service();
        let derived = service.derived_balance("a1", day(2024, 1, 10)).unwrap();

        assert_eq!(derived, None);
    }

    #[test]
    fn test_account_diff_severity_depends_on_threshold() {
        let mut fixture = Fixture::empty();
        fixture.accounts = vec![account("a1"), account("a2")];
        fixture.snapshots = vec![
            snapshot("a1", day(2024, 1, 1), dec!(1000)),
            // Snapshot claims 1100 but no ledger flow explains the extra 100.
            snapshot("a1", day(2024, 1, 10), dec!(1100)),
            snapshot("a2", day(2024, 1, 1), dec!(500)),
            snapshot("a2", day(2024, 1, 10), dec!(500.5)),
        ];

        let service = fixture.service();
        let diffs = service
            .check_account_diffs(Some(day(2024, 1, 10)), None)
            .unwrap();

        assert_eq!(diffs.len(), 2);
        let a1 = diffs.iter().find(|d| d.account_id == "a1").unwrap();
        assert_eq!(a1.severity, Severity::Warn);
        assert_eq!(a1.diff, dec!(100));
        let a2 = diffs.iter().find(|d| d.account_id == "a2").unwrap();
        assert_eq!(a2.severity, Severity::Info);
    }

    #[test]
    fn test_accounts_without_snapshot_on_date_are_skipped() {
        let mut fixture = Fixture::empty();
        fixture.accounts = vec![account("a1")];
        fixture.snapshots = vec![snapshot("a1", day(2024, 1, 1), dec!(1000))];

        let service = fixture.service();
        let diffs = service
            .check_account_diffs(Some(day(2024, 1, 10)), None)
            .unwrap();

        assert!(diffs.is_empty());
    }

    #[test]
    fn test_over_settled_redemption_is_negative() {
        let d = today();
        let mut fixture = Fixture::empty();
        fixture.products = vec![product("p1")];
        fixture.transactions = vec![
            transaction("p1", "a1", TransactionCategory::RedeemRequest, d, None, dec!(1000)),
            transaction("p1", "a1", TransactionCategory::RedeemSettle, d, Some(d), dec!(1500)),
        ];

        let service = fixture.service();
        let checks = service.check_redeem_consistency(None).unwrap();

        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].status, RedeemStatus::Negative);
    }

    #[test]
    fn test_stale_request_is_overdue() {
        let request_date = today() - Days::new(30);
        let mut fixture = Fixture::empty();
        fixture.products = vec![product("p1")];
        fixture.transactions = vec![transaction(
            "p1",
            "a1",
            TransactionCategory::RedeemRequest,
            request_date,
            None,
            dec!(1000),
        )];

        let service = fixture.service();
        let checks = service.check_redeem_consistency(None).unwrap();

        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].status, RedeemStatus::Overdue);
        assert_eq!(checks[0].days_pending, Some(30));
    }

    #[test]
    fn test_fresh_request_is_normal() {
        let request_date = today() - Days::new(1);
        let mut fixture = Fixture::empty();
        fixture.products = vec![product("p1")];
        fixture.transactions = vec![transaction(
            "p1",
            "a1",
            TransactionCategory::RedeemRequest,
            request_date,
            None,
            dec!(1000),
        )];

        let service = fixture.service();
        let checks = service.check_redeem_consistency(None).unwrap();

        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].status, RedeemStatus::Normal);
    }

    #[test]
    fn test_settled_products_are_skipped() {
        let d = today();
        let mut fixture = Fixture::empty();
        fixture.products = vec![product("p1")];
        fixture.transactions = vec![
            transaction("p1", "a1", TransactionCategory::RedeemRequest, d, None, dec!(1000)),
            transaction("p1", "a1", TransactionCategory::RedeemSettle, d, Some(d), dec!(1000)),
        ];

        let service = fixture.service();
        let checks = service.check_redeem_consistency(None).unwrap();

        assert!(checks.is_empty());
    }

    #[test]
    fn test_never_valued_product_warns() {
        let mut fixture = Fixture::empty();
        fixture.products = vec![product("p1")];

        let service = fixture.service();
        let gaps = service.check_valuation_gaps(None).unwrap();

        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].severity, Severity::Warn);
        assert_eq!(gaps[0].last_valuation_date, None);
    }

    #[test]
    fn test_recent_valuation_is_silent() {
        let mut fixture = Fixture::empty();
        fixture.products = vec![product("p1")];
        fixture.valuations = vec![valuation("p1", today() - Days::new(2), dec!(1000))];

        let service = fixture.service();
        let gaps = service.check_valuation_gaps(None).unwrap();

        assert!(gaps.is_empty());
    }

    #[test]
    fn test_stale_gap_with_trades_escalates() {
        let last_valued = today() - Days::new(30);
        let mut fixture = Fixture::empty();
        fixture.products = vec![product("p1")];
        fixture.valuations = vec![valuation("p1", last_valued, dec!(1000))];
        fixture.transactions = vec![transaction(
            "p1",
            "a1",
            TransactionCategory::Buy,
            today() - Days::new(10),
            None,
            dec!(500),
        )];

        let service = fixture.service();
        let gaps = service.check_valuation_gaps(None).unwrap();

        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].severity, Severity::Warn);
        assert!(gaps[0].has_recent_trade);
        assert_eq!(gaps[0].days_since, 30);
    }

    #[test]
    fn test_stale_gap_without_trades_is_info() {
        let last_valued = today() - Days::new(30);
        let mut fixture = Fixture::empty();
        fixture.products = vec![product("p1")];
        fixture.valuations = vec![valuation("p1", last_valued, dec!(1000))];

        let service = fixture.service();
        let gaps = service.check_valuation_gaps(None).unwrap();

        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].severity, Severity::Info);
        assert!(!gaps[0].has_recent_trade);
    }

    #[test]
    fn test_all_warnings_merges_and_sorts() {
        let mut fixture = Fixture::empty();
        fixture.accounts = vec![account("a1")];
        fixture.snapshots = vec![
            snapshot("a1", today() - Days::new(10), dec!(1000)),
            snapshot("a1", today(), dec!(2000)),
        ];
        fixture.products = vec![product("p1")];
        fixture.valuations = vec![valuation("p1", today() - Days::new(30), dec!(1000))];

        let service = fixture.service();
        let warnings = service.all_warnings(Some(today())).unwrap();

        // One warn-level account diff, one info-level valuation gap.
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].level, Severity::Warn);
        assert_eq!(warnings[1].level, Severity::Info);
        assert!(warnings[0].warning_id.starts_with("account_diff_a1_"));
        assert_eq!(warnings[1].warning_id, "valuation_gap_p1");
    }

    #[test]
    fn test_muting_requires_a_reason() {
        let service = Fixture::empty().service();

        let result = service.update_warning_status("valuation_gap_p1", WarningStatus::Muted, None);
        assert!(matches!(result, Err(Error::Validation(_))));

        let record = service
            .update_warning_status(
                "valuation_gap_p1",
                WarningStatus::Muted,
                Some("known stale product".to_string()),
            )
            .unwrap();
        assert_eq!(record.status, WarningStatus::Muted);
    }
}
