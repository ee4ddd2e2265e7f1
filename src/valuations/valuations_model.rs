use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::DECIMAL_PRECISION;
use crate::errors::{Error, Result, ValidationError};

/// A manually recorded market value for a product on one date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValuationPoint {
    pub id: String,
    pub product_id: String,
    pub date: NaiveDate,
    pub market_value: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for recording or overwriting a valuation point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewValuationPoint {
    pub product_id: String,
    pub date: NaiveDate,
    pub market_value: Decimal,
}

impl NewValuationPoint {
    pub fn validate(&self) -> Result<()> {
        if self.product_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "product_id".to_string(),
            )));
        }
        if self.market_value < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "market_value cannot be negative".to_string(),
            )));
        }
        Ok(())
    }
}

/// Counts reported back from a batch upsert of valuation points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertReport {
    pub inserted: usize,
    pub updated: usize,
}

/// How a daily series value was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    /// The value was recorded by hand on exactly this date.
    Manual,
    /// The value sits between two manual points and was linearly interpolated.
    Interpolated,
    /// The value lies after the last manual point and carries it forward flat.
    Extrapolated,
}

impl ValueSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueSource::Manual => "manual",
            ValueSource::Interpolated => "interpolated",
            ValueSource::Extrapolated => "extrapolated",
        }
    }
}

/// One day of a gap-free valuation series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Decimal,
    pub source: ValueSource,
}

/// Database model for valuation points
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
#[diesel(table_name = crate::schema::valuation_points)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ValuationPointDb {
    pub id: String,
    pub product_id: String,
    pub date: NaiveDate,
    pub market_value: String,
    #[diesel(skip_insertion)]
    pub created_at: NaiveDateTime,
    #[diesel(skip_insertion)]
    pub updated_at: NaiveDateTime,
}

impl From<ValuationPointDb> for ValuationPoint {
    fn from(db: ValuationPointDb) -> Self {
        Self {
            id: db.id,
            product_id: db.product_id,
            date: db.date,
            market_value: Decimal::from_str(&db.market_value).unwrap_or_default(),
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewValuationPoint> for ValuationPointDb {
    fn from(domain: NewValuationPoint) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            product_id: domain.product_id,
            date: domain.date,
            market_value: domain.market_value.round_dp(DECIMAL_PRECISION).to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
