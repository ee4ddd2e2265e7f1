use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Kind of cash-holding account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Cash,
    #[default]
    Debit,
    Credit,
    Investment,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Cash => "cash",
            AccountType::Debit => "debit",
            AccountType::Credit => "credit",
            AccountType::Investment => "investment",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "cash" => Ok(AccountType::Cash),
            "debit" => Ok(AccountType::Debit),
            "credit" => Ok(AccountType::Credit),
            "investment" => Ok(AccountType::Investment),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown account type '{}'",
                other
            )))),
        }
    }
}

/// Domain model representing a cash account at an institution.
/// `is_liquid` marks whether the account's balance counts towards available cash.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub institution_id: String,
    pub account_type: AccountType,
    pub is_liquid: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub institution_id: String,
    pub account_type: AccountType,
    pub is_liquid: bool,
}

impl NewAccount {
    /// Validates the new account data
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account name cannot be empty".to_string(),
            )));
        }
        if self.institution_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "institution_id".to_string(),
            )));
        }
        Ok(())
    }
}

/// Input model for updating an existing account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub id: Option<String>,
    pub name: String,
    pub account_type: AccountType,
    pub is_liquid: bool,
}

impl AccountUpdate {
    /// Validates the account update data
    pub fn validate(&self) -> Result<()> {
        if self.id.is_none() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account ID is required for updates".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account name cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}

/// Database model for accounts
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
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountDb {
    pub id: String,
    pub name: String,
    pub institution_id: String,
    pub account_type: String,
    pub is_liquid: bool,
    #[diesel(skip_insertion)]
    pub created_at: NaiveDateTime,
    #[diesel(skip_insertion)]
    pub updated_at: NaiveDateTime,
}

// Conversion implementations
impl From<AccountDb> for Account {
    fn from(db: AccountDb) -> Self {
        Self {
            id: db.id,
            name: db.name,
            institution_id: db.institution_id,
            account_type: AccountType::parse(&db.account_type).unwrap_or_default(),
            is_liquid: db.is_liquid,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewAccount> for AccountDb {
    fn from(domain: NewAccount) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            name: domain.name,
            institution_id: domain.institution_id,
            account_type: domain.account_type.as_str().to_string(),
            is_liquid: domain.is_liquid,
            created_at: now,
            updated_at: now,
        }
    }
}
