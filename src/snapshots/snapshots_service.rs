use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::accounts::{Account, AccountRepositoryTrait, AccountType};
use crate::errors::Result;

use super::snapshots_model::{
    DashboardSummary, NewSnapshot, Snapshot, SnapshotBatchReport, TypeTotal,
};
use super::snapshots_repository::SnapshotRepositoryTrait;

/// Service for manual balance snapshots and the dashboard totals built on them.
pub struct SnapshotService {
    snapshot_repo: Arc<dyn SnapshotRepositoryTrait>,
    account_repo: Arc<dyn AccountRepositoryTrait>,
}

impl SnapshotService {
    pub fn new(
        snapshot_repo: Arc<dyn SnapshotRepositoryTrait>,
        account_repo: Arc<dyn AccountRepositoryTrait>,
    ) -> Self {
        Self {
            snapshot_repo,
            account_repo,
        }
    }

    /// Upserts a batch of snapshots keyed on (date, account). Rows naming an
    /// unknown account are skipped with a warning instead of failing the
    /// whole batch, so one stale row cannot block an import.
    pub fn batch_upsert(&self, snapshots: Vec<NewSnapshot>) -> Result<SnapshotBatchReport> {
        let known: HashMap<String, Account> = self
            .account_repo
            .list(None)?
            .into_iter()
            .map(|account| (account.id.clone(), account))
            .collect();

        let mut report = SnapshotBatchReport::default();

        for snapshot in snapshots {
            if !known.contains_key(&snapshot.account_id) {
                log::warn!("Skipping snapshot for unknown account {}", snapshot.account_id);
                report
                    .warnings
                    .push(format!("Account {} not found", snapshot.account_id));
                continue;
            }

            if self.snapshot_repo.upsert(snapshot)? {
                report.inserted += 1;
            } else {
                report.updated += 1;
            }
        }

        Ok(report)
    }

    /// Snapshots for one date. With `fill_previous` each account instead
    /// contributes its latest snapshot on or before that date, so accounts
    /// updated less often still appear.
    pub fn list_snapshots(&self, date: NaiveDate, fill_previous: bool) -> Result<Vec<Snapshot>> {
        if fill_previous {
            self.snapshot_repo.list_latest_through(date)
        } else {
            self.snapshot_repo.list_on_date(date)
        }
    }

    pub fn latest_date(&self) -> Result<Option<NaiveDate>> {
        self.snapshot_repo.latest_date()
    }

    pub fn available_dates(&self) -> Result<Vec<NaiveDate>> {
        self.snapshot_repo.available_dates()
    }

    pub fn delete_snapshot(&self, snapshot_id: &str) -> Result<usize> {
        self.snapshot_repo.delete(snapshot_id)
    }

    /// Asset totals over the snapshots of `date`, grouped by account type.
    /// Credit balances are carried as recorded (negative when owed), so
    /// available cash is simply liquid assets plus liabilities.
    pub fn dashboard_summary(&self, date: NaiveDate) -> Result<DashboardSummary> {
        let accounts: HashMap<String, Account> = self
            .account_repo
            .list(None)?
            .into_iter()
            .map(|account| (account.id.clone(), account))
            .collect();

        let mut total_assets = Decimal::ZERO;
        let mut liquid_assets = Decimal::ZERO;
        let mut liabilities = Decimal::ZERO;
        let mut by_type: HashMap<&'static str, Decimal> = HashMap::new();

        for snapshot in self.snapshot_repo.list_on_date(date)? {
            total_assets += snapshot.balance;

            let Some(account) = accounts.get(&snapshot.account_id) else {
                continue;
            };

            *by_type.entry(account.account_type.as_str()).or_default() += snapshot.balance;

            if account.is_liquid {
                liquid_assets += snapshot.balance;
            }
            if account.account_type == AccountType::Credit {
                liabilities += snapshot.balance;
            }
        }

        let mut by_type: Vec<TypeTotal> = by_type
            .into_iter()
            .map(|(account_type, total)| TypeTotal {
                account_type: account_type.to_string(),
                total,
            })
            .collect();
        by_type.sort_by(|a, b| a.account_type.cmp(&b.account_type));

        Ok(DashboardSummary {
            date,
            total_assets,
            liquid_assets,
            liabilities,
            available_cash: liquid_assets + liabilities,
            by_type,
        })
    }
}
