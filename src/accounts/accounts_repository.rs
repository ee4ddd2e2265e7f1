use diesel::prelude::*;
use std::sync::Arc;

use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::accounts;
use crate::schema::accounts::dsl::*;
use crate::Error;

use super::accounts_model::{Account, AccountDb, AccountUpdate, NewAccount};

pub trait AccountRepositoryTrait: Send + Sync {
    fn create(&self, new_account: NewAccount) -> Result<Account>;
    fn update(&self, account_update: AccountUpdate) -> Result<Account>;
    fn get_by_id(&self, account_id: &str) -> Result<Account>;
    fn list(&self, liquid_filter: Option<bool>) -> Result<Vec<Account>>;
    fn delete(&self, account_id: &str) -> Result<usize>;
}

/// Repository for managing account data in the database
pub struct AccountRepository {
    pool: Arc<DbPool>,
}

impl AccountRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl AccountRepositoryTrait for AccountRepository {
    fn create(&self, new_account: NewAccount) -> Result<Account> {
        new_account.validate()?;

        let mut account_db: AccountDb = new_account.into();
        if account_db.id.is_empty() {
            account_db.id = uuid::Uuid::new_v4().to_string();
        }

        let mut conn = get_connection(&self.pool)?;

        diesel::insert_into(accounts::table)
            .values(&account_db)
            .execute(&mut conn)?;

        Ok(account_db.into())
    }

    fn update(&self, account_update: AccountUpdate) -> Result<Account> {
        account_update.validate()?;

        let mut conn = get_connection(&self.pool)?;

        let update_id = account_update.id.clone().unwrap_or_default();
        let existing = accounts
            .find(&update_id)
            .first::<AccountDb>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    Error::NotFound(format!("Account with id {} not found", update_id))
                }
                _ => e.into(),
            })?;

        let mut account_db = existing;
        account_db.name = account_update.name;
        account_db.account_type = account_update.account_type.as_str().to_string();
        account_db.is_liquid = account_update.is_liquid;
        account_db.updated_at = chrono::Utc::now().naive_utc();

        diesel::update(accounts.find(&account_db.id))
            .set(&account_db)
            .execute(&mut conn)?;

        Ok(account_db.into())
    }

    fn get_by_id(&self, account_id: &str) -> Result<Account> {
        let mut conn = get_connection(&self.pool)?;

        let account = accounts
            .find(account_id)
            .first::<AccountDb>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    Error::NotFound(format!("Account with id {} not found", account_id))
                }
                _ => e.into(),
            })?;

        Ok(account.into())
    }

    fn list(&self, liquid_filter: Option<bool>) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = accounts::table.into_boxed();

        if let Some(liquid) = liquid_filter {
            query = query.filter(is_liquid.eq(liquid));
        }

        let results = query.order(name.asc()).load::<AccountDb>(&mut conn)?;

        Ok(results.into_iter().map(Account::from).collect())
    }

    fn delete(&self, account_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        let affected = diesel::delete(accounts.find(account_id)).execute(&mut conn)?;

        if affected == 0 {
            return Err(Error::NotFound(format!(
                "Account with id {} not found",
                account_id
            )));
        }

        Ok(affected)
    }
}
