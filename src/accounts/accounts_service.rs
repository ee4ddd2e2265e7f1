use std::sync::Arc;

use log::debug;

use crate::errors::Result;
use crate::institutions::InstitutionRepositoryTrait;

use super::accounts_model::{Account, AccountUpdate, NewAccount};
use super::accounts_repository::AccountRepositoryTrait;

/// Service for managing accounts
pub struct AccountService {
    repository: Arc<dyn AccountRepositoryTrait>,
    institution_repository: Arc<dyn InstitutionRepositoryTrait>,
}

impl AccountService {
    pub fn new(
        repository: Arc<dyn AccountRepositoryTrait>,
        institution_repository: Arc<dyn InstitutionRepositoryTrait>,
    ) -> Self {
        Self {
            repository,
            institution_repository,
        }
    }

    /// Creates a new account after verifying its institution exists
    pub fn create_account(&self, new_account: NewAccount) -> Result<Account> {
        debug!("Creating account '{}'", new_account.name);
        new_account.validate()?;
        self.institution_repository
            .get_by_id(&new_account.institution_id)?;
        self.repository.create(new_account)
    }

    pub fn update_account(&self, account_update: AccountUpdate) -> Result<Account> {
        self.repository.update(account_update)
    }

    pub fn get_account(&self, account_id: &str) -> Result<Account> {
        self.repository.get_by_id(account_id)
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        self.repository.list(None)
    }

    /// Lists only accounts whose balance counts towards available cash
    pub fn get_liquid_accounts(&self) -> Result<Vec<Account>> {
        self.repository.list(Some(true))
    }

    pub fn delete_account(&self, account_id: &str) -> Result<()> {
        self.repository.delete(account_id)?;
        Ok(())
    }
}
