use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::accounts::{Account, AccountRepositoryTrait};
use crate::errors::Result;
use crate::redemptions::RedemptionService;
use crate::snapshots::SnapshotRepositoryTrait;

use super::cash_model::{AvailableCash, CashSummary, LiquidAccountItem};

/// Service answering "how much money could I actually move today".
pub struct CashService {
    snapshot_repo: Arc<dyn SnapshotRepositoryTrait>,
    account_repo: Arc<dyn AccountRepositoryTrait>,
    redemption_service: Arc<RedemptionService>,
}

impl CashService {
    pub fn new(
        snapshot_repo: Arc<dyn SnapshotRepositoryTrait>,
        account_repo: Arc<dyn AccountRepositoryTrait>,
        redemption_service: Arc<RedemptionService>,
    ) -> Self {
        Self {
            snapshot_repo,
            account_repo,
            redemption_service,
        }
    }

    /// Liquid-account balances on `target_date` (default: the latest snapshot
    /// date) minus redemption money still in flight. Snapshots stay the
    /// authority on balances; income not yet landed is simply absent.
    pub fn available_cash(&self, target_date: Option<NaiveDate>) -> Result<AvailableCash> {
        let date = match target_date {
            Some(date) => date,
            None => self
                .snapshot_repo
                .latest_date()?
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
        };

        let liquid: HashMap<String, Account> = self
            .account_repo
            .list(Some(true))?
            .into_iter()
            .map(|account| (account.id.clone(), account))
            .collect();

        let mut base_available = Decimal::ZERO;
        let mut liquid_accounts: Vec<LiquidAccountItem> = Vec::new();

        for snapshot in self.snapshot_repo.list_on_date(date)? {
            let Some(account) = liquid.get(&snapshot.account_id) else {
                continue;
            };

            base_available += snapshot.balance;
            liquid_accounts.push(LiquidAccountItem {
                account_id: account.id.clone(),
                account_name: account.name.clone(),
                account_type: account.account_type.as_str().to_string(),
                balance: snapshot.balance,
            });
        }

        let pending = self.redemption_service.pending_redeems(None)?;

        Ok(AvailableCash {
            date,
            base_available,
            pending_redeems: pending.total_pending,
            real_available: base_available - pending.total_pending,
            liquid_accounts,
        })
    }

    pub fn cash_summary(&self, target_date: Option<NaiveDate>) -> Result<CashSummary> {
        let available = self.available_cash(target_date)?;
        let forecast = self.redemption_service.summarize_future_cash_flow()?;

        Ok(CashSummary {
            date: available.date,
            base_available: available.base_available,
            pending_redeems: available.pending_redeems,
            real_available: available.real_available,
            future_7d: forecast.total_7d,
            future_30d: forecast.total_30d,
        })
    }
}
