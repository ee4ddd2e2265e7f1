use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::DECIMAL_PRECISION;
use crate::errors::{Error, Result, ValidationError};

/// Kind of ledger event recorded against a product/account pair.
///
/// `buy`/`redeem_request`/`redeem_settle`/`fee` drive the product-side views
/// (pending redemptions, cash-flow projection); the transfer/income/expense
/// categories exist for plain account bookkeeping and reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionCategory {
    Buy,
    RedeemRequest,
    RedeemSettle,
    Fee,
    TransferIn,
    TransferOut,
    Income,
    Expense,
}

impl TransactionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionCategory::Buy => "buy",
            TransactionCategory::RedeemRequest => "redeem_request",
            TransactionCategory::RedeemSettle => "redeem_settle",
            TransactionCategory::Fee => "fee",
            TransactionCategory::TransferIn => "transfer_in",
            TransactionCategory::TransferOut => "transfer_out",
            TransactionCategory::Income => "income",
            TransactionCategory::Expense => "expense",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "buy" => Ok(TransactionCategory::Buy),
            "redeem_request" => Ok(TransactionCategory::RedeemRequest),
            "redeem_settle" => Ok(TransactionCategory::RedeemSettle),
            "fee" => Ok(TransactionCategory::Fee),
            "transfer_in" => Ok(TransactionCategory::TransferIn),
            "transfer_out" => Ok(TransactionCategory::TransferOut),
            "income" => Ok(TransactionCategory::Income),
            "expense" => Ok(TransactionCategory::Expense),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown transaction category '{}'",
                other
            )))),
        }
    }

    /// Whether this category moves external capital in or out of a product,
    /// which invalidates pure time-weighted return semantics over a window
    /// containing it.
    pub fn is_external_flow(&self) -> bool {
        matches!(
            self,
            TransactionCategory::Buy
                | TransactionCategory::RedeemRequest
                | TransactionCategory::RedeemSettle
                | TransactionCategory::TransferIn
                | TransactionCategory::TransferOut
        )
    }

    /// Signed effect on an account balance once the transaction settles.
    /// `redeem_request` is a declaration only and returns `None`.
    pub fn account_balance_sign(&self) -> Option<i8> {
        match self {
            TransactionCategory::TransferIn
            | TransactionCategory::Income
            | TransactionCategory::RedeemSettle => Some(1),
            TransactionCategory::TransferOut
            | TransactionCategory::Expense
            | TransactionCategory::Buy
            | TransactionCategory::Fee => Some(-1),
            TransactionCategory::RedeemRequest => None,
        }
    }
}

/// Domain model for a single ledger row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub product_id: String,
    pub account_id: String,
    pub category: TransactionCategory,
    pub trade_date: NaiveDate,
    pub settle_date: Option<NaiveDate>,
    pub amount: Decimal,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for recording a new transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub product_id: String,
    pub account_id: String,
    pub category: TransactionCategory,
    pub trade_date: NaiveDate,
    pub settle_date: Option<NaiveDate>,
    pub amount: Decimal,
    pub note: Option<String>,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<()> {
        if self.product_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "product_id".to_string(),
            )));
        }
        if self.account_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "account_id".to_string(),
            )));
        }
        if let Some(settle) = self.settle_date {
            if settle < self.trade_date {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "settle_date cannot precede trade_date".to_string(),
                )));
            }
        }
        Ok(())
    }
}

/// Query filter for listing transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub product_id: Option<String>,
    pub account_id: Option<String>,
    pub category: Option<TransactionCategory>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// One page of results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Database model for transactions
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
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDb {
    pub id: String,
    pub product_id: String,
    pub account_id: String,
    pub category: String,
    pub trade_date: NaiveDate,
    pub settle_date: Option<NaiveDate>,
    pub amount: String,
    pub note: Option<String>,
    #[diesel(skip_insertion)]
    pub created_at: NaiveDateTime,
    #[diesel(skip_insertion)]
    pub updated_at: NaiveDateTime,
}

impl TryFrom<TransactionDb> for Transaction {
    type Error = Error;

    // Stored categories are always `as_str` values; anything else is
    // corruption, not a fee.
    fn try_from(db: TransactionDb) -> Result<Self> {
        Ok(Self {
            id: db.id,
            product_id: db.product_id,
            account_id: db.account_id,
            category: TransactionCategory::parse(&db.category)?,
            trade_date: db.trade_date,
            settle_date: db.settle_date,
            amount: Decimal::from_str(&db.amount).unwrap_or_default(),
            note: db.note,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<NewTransaction> for TransactionDb {
    fn from(domain: NewTransaction) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            product_id: domain.product_id,
            account_id: domain.account_id,
            category: domain.category.as_str().to_string(),
            trade_date: domain.trade_date,
            settle_date: domain.settle_date,
            amount: domain.amount.round_dp(DECIMAL_PRECISION).to_string(),
            note: domain.note,
            created_at: now,
            updated_at: now,
        }
    }
}
