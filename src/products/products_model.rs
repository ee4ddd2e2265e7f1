use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SETTLE_DAYS;
use crate::errors::{Error, Result, ValidationError};

/// Category of investment product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    BankWmp,
    MoneyMarket,
    TermDeposit,
    Fund,
    Stock,
    Insurance,
    #[default]
    Other,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::BankWmp => "bank_wmp",
            ProductType::MoneyMarket => "money_market",
            ProductType::TermDeposit => "term_deposit",
            ProductType::Fund => "fund",
            ProductType::Stock => "stock",
            ProductType::Insurance => "insurance",
            ProductType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "bank_wmp" => Ok(ProductType::BankWmp),
            "money_market" => Ok(ProductType::MoneyMarket),
            "term_deposit" => Ok(ProductType::TermDeposit),
            "fund" => Ok(ProductType::Fund),
            "stock" => Ok(ProductType::Stock),
            "insurance" => Ok(ProductType::Insurance),
            "other" => Ok(ProductType::Other),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown product type '{}'",
                other
            )))),
        }
    }
}

/// Issuer-assigned risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    R1,
    R2,
    R3,
    R4,
    R5,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::R1 => "R1",
            RiskLevel::R2 => "R2",
            RiskLevel::R3 => "R3",
            RiskLevel::R4 => "R4",
            RiskLevel::R5 => "R5",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "R1" => Ok(RiskLevel::R1),
            "R2" => Ok(RiskLevel::R2),
            "R3" => Ok(RiskLevel::R3),
            "R4" => Ok(RiskLevel::R4),
            "R5" => Ok(RiskLevel::R5),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown risk level '{}'",
                other
            )))),
        }
    }
}

/// When money can leave the product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LiquidityRule {
    #[default]
    Open,
    Closed,
    PeriodicOpen,
}

impl LiquidityRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiquidityRule::Open => "open",
            LiquidityRule::Closed => "closed",
            LiquidityRule::PeriodicOpen => "periodic_open",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "open" => Ok(LiquidityRule::Open),
            "closed" => Ok(LiquidityRule::Closed),
            "periodic_open" => Ok(LiquidityRule::PeriodicOpen),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown liquidity rule '{}'",
                other
            )))),
        }
    }
}

/// Domain model for an investment product (wealth-management product, fund, deposit...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub institution_id: Option<String>,
    pub product_code: Option<String>,
    pub product_type: ProductType,
    pub risk_level: Option<RiskLevel>,
    /// Term length in days for fixed-term products
    pub term_days: Option<i32>,
    pub liquidity_rule: LiquidityRule,
    /// T+N settle delay for redemptions
    pub settle_days: i32,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub institution_id: Option<String>,
    pub product_code: Option<String>,
    pub product_type: ProductType,
    pub risk_level: Option<RiskLevel>,
    pub term_days: Option<i32>,
    pub liquidity_rule: LiquidityRule,
    #[serde(default)]
    pub settle_days: Option<i32>,
    pub note: Option<String>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Product name cannot be empty".to_string(),
            )));
        }
        if let Some(days) = self.term_days {
            if days < 0 {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "term_days cannot be negative".to_string(),
                )));
            }
        }
        if let Some(days) = self.settle_days {
            if days < 0 {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "settle_days cannot be negative".to_string(),
                )));
            }
        }
        Ok(())
    }
}

/// Patch-style input model for updating a product; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub institution_id: Option<Option<String>>,
    pub product_code: Option<Option<String>>,
    pub product_type: Option<ProductType>,
    pub risk_level: Option<Option<RiskLevel>>,
    pub term_days: Option<Option<i32>>,
    pub liquidity_rule: Option<LiquidityRule>,
    pub settle_days: Option<i32>,
    pub note: Option<Option<String>>,
}

/// Database model for products
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
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProductDb {
    pub id: String,
    pub name: String,
    pub institution_id: Option<String>,
    pub product_code: Option<String>,
    pub product_type: String,
    pub risk_level: Option<String>,
    pub term_days: Option<i32>,
    pub liquidity_rule: String,
    pub settle_days: i32,
    pub note: Option<String>,
    #[diesel(skip_insertion)]
    pub created_at: NaiveDateTime,
    #[diesel(skip_insertion)]
    pub updated_at: NaiveDateTime,
}

impl From<ProductDb> for Product {
    fn from(db: ProductDb) -> Self {
        Self {
            id: db.id,
            name: db.name,
            institution_id: db.institution_id,
            product_code: db.product_code,
            product_type: ProductType::parse(&db.product_type).unwrap_or_default(),
            risk_level: db.risk_level.as_deref().and_then(|r| RiskLevel::parse(r).ok()),
            term_days: db.term_days,
            liquidity_rule: LiquidityRule::parse(&db.liquidity_rule).unwrap_or_default(),
            settle_days: db.settle_days,
            note: db.note,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewProduct> for ProductDb {
    fn from(domain: NewProduct) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            name: domain.name,
            institution_id: domain.institution_id,
            product_code: domain.product_code,
            product_type: domain.product_type.as_str().to_string(),
            risk_level: domain.risk_level.map(|r| r.as_str().to_string()),
            term_days: domain.term_days,
            liquidity_rule: domain.liquidity_rule.as_str().to_string(),
            settle_days: domain.settle_days.unwrap_or(DEFAULT_SETTLE_DAYS),
            note: domain.note,
            created_at: now,
            updated_at: now,
        }
    }
}
