use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
        }
    }
}

/// Snapshot balance versus the balance derived from the ledger, per account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDiffItem {
    pub account_id: String,
    pub account_name: String,
    pub check_date: NaiveDate,
    pub snapshot_balance: Decimal,
    pub derived_balance: Decimal,
    /// Snapshot minus derived. Positive means the snapshot claims more money
    /// than the ledger explains.
    pub diff: Decimal,
    pub severity: Severity,
    pub hint: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedeemStatus {
    Normal,
    /// More settled than was ever requested.
    Negative,
    /// Outstanding past the product's T+N window plus buffer.
    Overdue,
}

impl RedeemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedeemStatus::Normal => "normal",
            RedeemStatus::Negative => "negative",
            RedeemStatus::Overdue => "overdue",
        }
    }
}

/// Consistency verdict on one product's in-flight redemptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemCheckItem {
    pub product_id: String,
    pub product_name: String,
    pub pending_amount: Decimal,
    pub status: RedeemStatus,
    pub latest_request_date: Option<NaiveDate>,
    pub expected_settle_date: Option<NaiveDate>,
    pub days_pending: Option<i64>,
    pub hint: String,
}

/// A product whose manual valuations have gone stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationGapItem {
    pub product_id: String,
    pub product_name: String,
    pub last_valuation_date: Option<NaiveDate>,
    pub days_since: i64,
    /// Trades happened after the last valuation, so the gap hides real movement.
    pub has_recent_trade: bool,
    pub severity: Severity,
    pub hint: String,
    pub last_trade_date: Option<NaiveDate>,
    pub days_since_trade: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningType {
    AccountDiff,
    RedeemAnomaly,
    ValuationGap,
}

impl WarningType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::AccountDiff => "account_diff",
            WarningType::RedeemAnomaly => "redeem_anomaly",
            WarningType::ValuationGap => "valuation_gap",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "account_diff" => Ok(WarningType::AccountDiff),
            "redeem_anomaly" => Ok(WarningType::RedeemAnomaly),
            "valuation_gap" => Ok(WarningType::ValuationGap),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown warning type '{}'",
                other
            )))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WarningStatus {
    #[default]
    Open,
    Acknowledged,
    Muted,
}

impl WarningStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningStatus::Open => "open",
            WarningStatus::Acknowledged => "acknowledged",
            WarningStatus::Muted => "muted",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "open" => Ok(WarningStatus::Open),
            "acknowledged" => Ok(WarningStatus::Acknowledged),
            "muted" => Ok(WarningStatus::Muted),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown warning status '{}'",
                other
            )))),
        }
    }
}

/// One uniform warning row, ready for a review surface.
///
/// `warning_id` is deterministic per finding, so recomputing the checks maps
/// straight back onto any status recorded earlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationWarning {
    pub warning_id: String,
    pub level: Severity,
    pub warning_type: WarningType,
    pub title: String,
    pub description: String,
    pub object_type: String,
    pub object_id: String,
    pub object_name: String,
    pub date: Option<NaiveDate>,
    pub diff_value: Option<Decimal>,
    pub suggested_action: String,
    pub status: WarningStatus,
    pub mute_reason: Option<String>,
}

/// Persisted status for one warning id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningRecord {
    pub id: String,
    pub warning_id: String,
    pub warning_type: WarningType,
    pub object_type: String,
    pub object_id: String,
    pub status: WarningStatus,
    pub mute_reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for warning status records
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::reconciliation_warnings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WarningRecordDb {
    pub id: String,
    pub warning_id: String,
    pub warning_type: String,
    pub object_type: String,
    pub object_id: String,
    pub status: String,
    pub mute_reason: Option<String>,
    #[diesel(skip_insertion)]
    pub created_at: NaiveDateTime,
    #[diesel(skip_insertion)]
    pub updated_at: NaiveDateTime,
}

impl From<WarningRecordDb> for WarningRecord {
    fn from(db: WarningRecordDb) -> Self {
        Self {
            id: db.id,
            warning_type: WarningType::parse(&db.warning_type)
                .unwrap_or(WarningType::ValuationGap),
            warning_id: db.warning_id,
            object_type: db.object_type,
            object_id: db.object_id,
            status: WarningStatus::parse(&db.status).unwrap_or_default(),
            mute_reason: db.mute_reason,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
