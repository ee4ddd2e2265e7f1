use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::DECIMAL_PRECISION;
use crate::errors::{Error, Result, ValidationError};

/// An account balance recorded by hand for one date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub date: NaiveDate,
    pub account_id: String,
    pub balance: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for recording or overwriting a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSnapshot {
    pub date: NaiveDate,
    pub account_id: String,
    pub balance: Decimal,
}

impl NewSnapshot {
    pub fn validate(&self) -> Result<()> {
        if self.account_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "account_id".to_string(),
            )));
        }
        Ok(())
    }
}

/// Outcome of a batch snapshot upsert. Rows that reference unknown accounts
/// are skipped and reported here rather than failing the whole batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotBatchReport {
    pub inserted: usize,
    pub updated: usize,
    pub warnings: Vec<String>,
}

/// Asset totals over the snapshots of one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub date: NaiveDate,
    pub total_assets: Decimal,
    /// Balances of accounts flagged liquid.
    pub liquid_assets: Decimal,
    /// Credit-account balances; negative when money is owed.
    pub liabilities: Decimal,
    /// Liquid assets net of liabilities.
    pub available_cash: Decimal,
    pub by_type: Vec<TypeTotal>,
}

/// One account-type bucket of the dashboard summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeTotal {
    pub account_type: String,
    pub total: Decimal,
}

/// Database model for snapshots
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
#[diesel(table_name = crate::schema::snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SnapshotDb {
    pub id: String,
    pub date: NaiveDate,
    pub account_id: String,
    pub balance: String,
    #[diesel(skip_insertion)]
    pub created_at: NaiveDateTime,
    #[diesel(skip_insertion)]
    pub updated_at: NaiveDateTime,
}

impl From<SnapshotDb> for Snapshot {
    fn from(db: SnapshotDb) -> Self {
        Self {
            id: db.id,
            date: db.date,
            account_id: db.account_id,
            balance: Decimal::from_str(&db.balance).unwrap_or_default(),
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewSnapshot> for SnapshotDb {
    fn from(domain: NewSnapshot) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date: domain.date,
            account_id: domain.account_id,
            balance: domain.balance.round_dp(DECIMAL_PRECISION).to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
