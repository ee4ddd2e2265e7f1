use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;

use crate::accounts::AccountRepositoryTrait;
use crate::errors::{Error, Result, ValidationError};
use crate::products::ProductRepositoryTrait;
use crate::snapshots::SnapshotRepositoryTrait;
use crate::transactions::{TransactionCategory, TransactionRepositoryTrait};
use crate::valuations::ValuationRepositoryTrait;

use super::reconciliation_model::{
    AccountDiffItem, ReconciliationWarning, RedeemCheckItem, RedeemStatus, Severity,
    ValuationGapItem, WarningRecord, WarningStatus, WarningType,
};
use super::reconciliation_repository::WarningRepositoryTrait;

const DEFAULT_DIFF_THRESHOLD: Decimal = dec!(1);
const DEFAULT_REDEEM_BUFFER_DAYS: i64 = 3;
const DEFAULT_VALUATION_GAP_DAYS: i64 = 14;
/// Rounding slack when comparing ledger sums.
const AMOUNT_EPSILON: Decimal = dec!(0.01);
/// Sentinel staleness for products that never got a valuation.
const NEVER_VALUED_DAYS: i64 = 9999;

/// Cross-checks the manually recorded state (snapshots, valuations) against
/// the transaction ledger and surfaces the mismatches as warnings.
pub struct ReconciliationService {
    account_repo: Arc<dyn AccountRepositoryTrait>,
    product_repo: Arc<dyn ProductRepositoryTrait>,
    transaction_repo: Arc<dyn TransactionRepositoryTrait>,
    snapshot_repo: Arc<dyn SnapshotRepositoryTrait>,
    valuation_repo: Arc<dyn ValuationRepositoryTrait>,
    warning_repo: Arc<dyn WarningRepositoryTrait>,
}

impl ReconciliationService {
    pub fn new(
        account_repo: Arc<dyn AccountRepositoryTrait>,
        product_repo: Arc<dyn ProductRepositoryTrait>,
        transaction_repo: Arc<dyn TransactionRepositoryTrait>,
        snapshot_repo: Arc<dyn SnapshotRepositoryTrait>,
        valuation_repo: Arc<dyn ValuationRepositoryTrait>,
        warning_repo: Arc<dyn WarningRepositoryTrait>,
    ) -> Self {
        Self {
            account_repo,
            product_repo,
            transaction_repo,
            snapshot_repo,
            valuation_repo,
            warning_repo,
        }
    }

    /// Balance the ledger implies for an account on `target_date`: the latest
    /// snapshot strictly before that date plus the signed cash flows settling
    /// in between. `None` when there is no earlier snapshot to anchor on.
    pub fn derived_balance(
        &self,
        account_id: &str,
        target_date: NaiveDate,
    ) -> Result<Option<Decimal>> {
        let Some(day_before) = target_date.pred_opt() else {
            return Ok(None);
        };

        let Some(opening) = self.snapshot_repo.latest_for_account(account_id, day_before)? else {
            return Ok(None);
        };

        let mut balance = opening.balance;
        for tx in self
            .transaction_repo
            .list_settled_for_account(account_id, opening.date, target_date)?
        {
            if let Some(sign) = tx.category.account_balance_sign() {
                balance += Decimal::from(sign) * tx.amount.abs();
            }
        }

        Ok(Some(balance))
    }

    /// Compares each account's snapshot on `target_date` with the
    /// ledger-derived balance. Accounts without a snapshot on that date, or
    /// without an earlier snapshot to derive from, are skipped.
    pub fn check_account_diffs(
        &self,
        target_date: Option<NaiveDate>,
        threshold: Option<Decimal>,
    ) -> Result<Vec<AccountDiffItem>> {
        let target_date = target_date.unwrap_or_else(|| chrono::Local::now().date_naive());
        let threshold = threshold.unwrap_or(DEFAULT_DIFF_THRESHOLD);

        let snapshots: HashMap<String, Decimal> = self
            .snapshot_repo
            .list_on_date(target_date)?
            .into_iter()
            .map(|snapshot| (snapshot.account_id, snapshot.balance))
            .collect();

        let mut items: Vec<AccountDiffItem> = Vec::new();

        for account in self.account_repo.list(None)? {
            let Some(snapshot_balance) = snapshots.get(&account.id).copied() else {
                continue;
            };
            let Some(derived) = self.derived_balance(&account.id, target_date)? else {
                continue;
            };

            let diff = snapshot_balance - derived;
            let (severity, hint) = if diff.abs() > threshold {
                (Severity::Warn, account_diff_hint(diff))
            } else {
                (Severity::Info, "Balances agree".to_string())
            };

            items.push(AccountDiffItem {
                account_id: account.id,
                account_name: account.name,
                check_date: target_date,
                snapshot_balance,
                derived_balance: derived,
                diff,
                severity,
                hint,
            });
        }

        Ok(items)
    }

    /// Flags products whose redemption ledger is inconsistent: more settled
    /// than requested, or money outstanding past the product's T+N window
    /// plus `buffer_days`. Products with nothing in flight are skipped.
    pub fn check_redeem_consistency(
        &self,
        buffer_days: Option<i64>,
    ) -> Result<Vec<RedeemCheckItem>> {
        let buffer_days = buffer_days.unwrap_or(DEFAULT_REDEEM_BUFFER_DAYS);
        let today = chrono::Local::now().date_naive();

        let mut items: Vec<RedeemCheckItem> = Vec::new();

        for product in self.product_repo.list()? {
            let requests = self
                .transaction_repo
                .list_by_category(TransactionCategory::RedeemRequest, Some(&product.id))?;
            let settles = self
                .transaction_repo
                .list_by_category(TransactionCategory::RedeemSettle, Some(&product.id))?;

            let requested: Decimal = requests.iter().map(|tx| tx.amount.abs()).sum();
            let settled: Decimal = settles.iter().map(|tx| tx.amount.abs()).sum();
            let pending = requested - settled;

            let latest_request = requests.iter().map(|tx| tx.trade_date).max();

            let item = if pending < -AMOUNT_EPSILON {
                RedeemCheckItem {
                    product_id: product.id,
                    product_name: product.name,
                    pending_amount: pending,
                    status: RedeemStatus::Negative,
                    latest_request_date: latest_request,
                    expected_settle_date: None,
                    days_pending: None,
                    hint: format!(
                        "Settled amount ({}) exceeds requested amount ({}); check the redeem_settle entries",
                        settled, requested
                    ),
                }
            } else if pending > AMOUNT_EPSILON {
                match latest_request {
                    Some(latest_request) => {
                        let expected_settle =
                            latest_request + Days::new(product.settle_days.max(0) as u64);
                        let days_pending = (today - latest_request).num_days();

                        let (status, hint) =
                            if days_pending > product.settle_days as i64 + buffer_days {
                                (
                                    RedeemStatus::Overdue,
                                    format!(
                                        "Redemption outstanding for {} days, past the T+{} window; a settle entry may be missing",
                                        days_pending, product.settle_days
                                    ),
                                )
                            } else {
                                (
                                    RedeemStatus::Normal,
                                    format!("On track, expected by {}", expected_settle),
                                )
                            };

                        RedeemCheckItem {
                            product_id: product.id,
                            product_name: product.name,
                            pending_amount: pending,
                            status,
                            latest_request_date: Some(latest_request),
                            expected_settle_date: Some(expected_settle),
                            days_pending: Some(days_pending),
                            hint,
                        }
                    }
                    None => RedeemCheckItem {
                        product_id: product.id,
                        product_name: product.name,
                        pending_amount: pending,
                        status: RedeemStatus::Normal,
                        latest_request_date: None,
                        expected_settle_date: None,
                        days_pending: None,
                        hint: "In-flight redemption looks normal".to_string(),
                    },
                }
            } else {
                continue;
            };

            items.push(item);
        }

        Ok(items)
    }

    /// Flags products whose last manual valuation is older than
    /// `gap_threshold_days` (never-valued products always flag). A gap that
    /// spans trades is escalated, since the series hides real movement there.
    pub fn check_valuation_gaps(
        &self,
        gap_threshold_days: Option<i64>,
    ) -> Result<Vec<ValuationGapItem>> {
        let gap_threshold_days = gap_threshold_days.unwrap_or(DEFAULT_VALUATION_GAP_DAYS);
        let today = chrono::Local::now().date_naive();

        let mut items: Vec<ValuationGapItem> = Vec::new();

        for product in self.product_repo.list()? {
            let trades: Vec<_> = self
                .transaction_repo
                .list_for_product(&product.id, None, None)?
                .into_iter()
                .filter(|tx| {
                    matches!(
                        tx.category,
                        TransactionCategory::Buy
                            | TransactionCategory::RedeemRequest
                            | TransactionCategory::RedeemSettle
                    )
                })
                .collect();

            let last_trade_date = trades.iter().map(|tx| tx.trade_date).max();
            let days_since_trade = last_trade_date.map(|d| (today - d).num_days());

            let item = match self.valuation_repo.latest_point(&product.id)? {
                None => ValuationGapItem {
                    product_id: product.id,
                    product_name: product.name,
                    last_valuation_date: None,
                    days_since: NEVER_VALUED_DAYS,
                    has_recent_trade: false,
                    severity: Severity::Warn,
                    hint: match days_since_trade {
                        Some(days) => format!(
                            "Never valued, but traded {} days ago; record a valuation",
                            days
                        ),
                        None => "Never valued; record a valuation".to_string(),
                    },
                    last_trade_date,
                    days_since_trade,
                },
                Some(latest) => {
                    let days_since = (today - latest.date).num_days();
                    if days_since <= gap_threshold_days {
                        continue;
                    }

                    let has_recent_trade = trades
                        .iter()
                        .any(|tx| tx.trade_date > latest.date && tx.trade_date <= today);

                    let (severity, hint) = if has_recent_trade {
                        (
                            Severity::Warn,
                            format!(
                                "No valuation for {} days with trades in between; record one to keep the series honest",
                                days_since
                            ),
                        )
                    } else {
                        (
                            Severity::Info,
                            format!("No valuation for {} days, no trades in between", days_since),
                        )
                    };

                    ValuationGapItem {
                        product_id: product.id,
                        product_name: product.name,
                        last_valuation_date: Some(latest.date),
                        days_since,
                        has_recent_trade,
                        severity,
                        hint,
                        last_trade_date,
                        days_since_trade,
                    }
                }
            };

            items.push(item);
        }

        Ok(items)
    }

    /// Runs all three checks and merges the findings into uniform warning
    /// rows, joined with any persisted review status. Warn-level first.
    pub fn all_warnings(
        &self,
        target_date: Option<NaiveDate>,
    ) -> Result<Vec<ReconciliationWarning>> {
        let mut warnings: Vec<ReconciliationWarning> = Vec::new();

        for diff in self.check_account_diffs(target_date, None)? {
            if diff.severity != Severity::Warn {
                continue;
            }
            warnings.push(ReconciliationWarning {
                warning_id: format!("account_diff_{}_{}", diff.account_id, diff.check_date),
                level: Severity::Warn,
                warning_type: WarningType::AccountDiff,
                title: format!("Account [{}] balance mismatch", diff.account_name),
                description: diff.hint,
                object_type: "account".to_string(),
                object_id: diff.account_id,
                object_name: diff.account_name,
                date: Some(diff.check_date),
                diff_value: Some(diff.diff),
                suggested_action: "Compare the snapshot against the ledger".to_string(),
                status: WarningStatus::Open,
                mute_reason: None,
            });
        }

        for check in self.check_redeem_consistency(None)? {
            if !matches!(check.status, RedeemStatus::Negative | RedeemStatus::Overdue) {
                continue;
            }
            warnings.push(ReconciliationWarning {
                warning_id: format!("redeem_{}_{}", check.product_id, check.status.as_str()),
                level: Severity::Warn,
                warning_type: WarningType::RedeemAnomaly,
                title: format!("Product [{}] redemption anomaly", check.product_name),
                description: check.hint,
                object_type: "product".to_string(),
                object_id: check.product_id,
                object_name: check.product_name,
                date: check.latest_request_date,
                diff_value: Some(check.pending_amount),
                suggested_action: "Compare redemption requests against settlements".to_string(),
                status: WarningStatus::Open,
                mute_reason: None,
            });
        }

        for gap in self.check_valuation_gaps(None)? {
            warnings.push(ReconciliationWarning {
                warning_id: format!("valuation_gap_{}", gap.product_id),
                level: gap.severity,
                warning_type: WarningType::ValuationGap,
                title: format!("Product [{}] valuation gap", gap.product_name),
                description: gap.hint,
                object_type: "product".to_string(),
                object_id: gap.product_id,
                object_name: gap.product_name,
                date: gap.last_valuation_date,
                diff_value: None,
                suggested_action: "Record a product valuation".to_string(),
                status: WarningStatus::Open,
                mute_reason: None,
            });
        }

        let warning_ids: Vec<String> = warnings.iter().map(|w| w.warning_id.clone()).collect();
        let statuses: HashMap<String, WarningRecord> = self
            .warning_repo
            .list_by_warning_ids(&warning_ids)?
            .into_iter()
            .map(|record| (record.warning_id.clone(), record))
            .collect();

        for warning in &mut warnings {
            if let Some(record) = statuses.get(&warning.warning_id) {
                warning.status = record.status;
                warning.mute_reason = record.mute_reason.clone();
            }
        }

        warnings.sort_by(|a, b| {
            let rank = |level: Severity| match level {
                Severity::Warn => 0,
                Severity::Info => 1,
            };
            rank(a.level)
                .cmp(&rank(b.level))
                .then_with(|| a.object_name.cmp(&b.object_name))
        });

        Ok(warnings)
    }

    /// Records a review status for one warning. Muting requires a reason;
    /// leaving the muted state clears it.
    pub fn update_warning_status(
        &self,
        warning_id: &str,
        status: WarningStatus,
        mute_reason: Option<String>,
    ) -> Result<WarningRecord> {
        let mute_reason = match status {
            WarningStatus::Muted => match mute_reason.filter(|r| !r.trim().is_empty()) {
                Some(reason) => Some(reason),
                None => {
                    return Err(Error::Validation(ValidationError::MissingField(
                        "mute_reason".to_string(),
                    )))
                }
            },
            _ => None,
        };

        let warning_type = warning_type_of(warning_id)?;
        let object_type = match warning_type {
            WarningType::AccountDiff => "account",
            WarningType::RedeemAnomaly | WarningType::ValuationGap => "product",
        };

        self.warning_repo.upsert_status(
            warning_id,
            warning_type,
            object_type,
            "",
            status,
            mute_reason,
        )
    }

    pub fn warning_status(&self, warning_id: &str) -> Result<Option<WarningRecord>> {
        self.warning_repo.get_by_warning_id(warning_id)
    }

    /// Reopens a previously acknowledged or muted warning.
    pub fn restore_warning_to_open(&self, warning_id: &str) -> Result<Option<WarningRecord>> {
        let Some(record) = self.warning_repo.get_by_warning_id(warning_id)? else {
            return Ok(None);
        };

        let updated = self.warning_repo.upsert_status(
            &record.warning_id,
            record.warning_type,
            &record.object_type,
            &record.object_id,
            WarningStatus::Open,
            None,
        )?;

        Ok(Some(updated))
    }
}

fn account_diff_hint(diff: Decimal) -> String {
    if diff > Decimal::ZERO {
        format!(
            "Snapshot exceeds the derived balance by {}; an outflow or buy may be unrecorded, or a settle date mistyped",
            diff.round_dp(crate::constants::DISPLAY_DECIMAL_PRECISION)
        )
    } else {
        format!(
            "Snapshot trails the derived balance by {}; an income or settled redemption may be unrecorded, or a settle date mistyped",
            diff.abs().round_dp(crate::constants::DISPLAY_DECIMAL_PRECISION)
        )
    }
}

fn warning_type_of(warning_id: &str) -> Result<WarningType> {
    if warning_id.starts_with("account_diff_") {
        Ok(WarningType::AccountDiff)
    } else if warning_id.starts_with("redeem_") {
        Ok(WarningType::RedeemAnomaly)
    } else if warning_id.starts_with("valuation_gap_") {
        Ok(WarningType::ValuationGap)
    } else {
        Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Unrecognized warning id '{}'",
            warning_id
        ))))
    }
}
