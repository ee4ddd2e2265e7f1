use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One liquid account contributing to available cash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidAccountItem {
    pub account_id: String,
    pub account_name: String,
    pub account_type: String,
    pub balance: Decimal,
}

/// Cash actually spendable on a date: liquid balances less in-flight redemptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableCash {
    pub date: NaiveDate,
    /// Sum of liquid-account snapshot balances.
    pub base_available: Decimal,
    /// Redemption money still in flight; not spendable yet.
    pub pending_redeems: Decimal,
    pub real_available: Decimal,
    pub liquid_accounts: Vec<LiquidAccountItem>,
}

/// Available cash plus the near-term inflow outlook, for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashSummary {
    pub date: NaiveDate,
    pub base_available: Decimal,
    pub pending_redeems: Decimal,
    pub real_available: Decimal,
    pub future_7d: Decimal,
    pub future_30d: Decimal,
}
