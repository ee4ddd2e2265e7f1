use chrono::NaiveDate;
use std::sync::Arc;

use crate::accounts::AccountRepositoryTrait;
use crate::errors::Result;
use crate::products::ProductRepositoryTrait;

use super::transactions_model::{
    NewTransaction, Paginated, Transaction, TransactionCategory, TransactionFilter,
};
use super::transactions_repository::TransactionRepositoryTrait;

/// Service to handle the transaction ledger
pub struct TransactionService {
    transaction_repo: Arc<dyn TransactionRepositoryTrait>,
    product_repo: Arc<dyn ProductRepositoryTrait>,
    account_repo: Arc<dyn AccountRepositoryTrait>,
}

impl TransactionService {
    pub fn new(
        transaction_repo: Arc<dyn TransactionRepositoryTrait>,
        product_repo: Arc<dyn ProductRepositoryTrait>,
        account_repo: Arc<dyn AccountRepositoryTrait>,
    ) -> Self {
        Self {
            transaction_repo,
            product_repo,
            account_repo,
        }
    }

    /// Records a new transaction after checking that the referenced
    /// product and account both exist.
    pub fn record_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        self.product_repo.get_by_id(&new_transaction.product_id)?;
        self.account_repo.get_by_id(&new_transaction.account_id)?;
        self.transaction_repo.create(new_transaction)
    }

    pub fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: i64,
        page_size: i64,
    ) -> Result<Paginated<Transaction>> {
        self.transaction_repo.list(filter, page, page_size)
    }

    pub fn list_for_product(
        &self,
        product_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        self.transaction_repo
            .list_for_product(product_id, start_date, end_date)
    }

    pub fn list_by_category(
        &self,
        category: TransactionCategory,
        product_id: Option<&str>,
    ) -> Result<Vec<Transaction>> {
        self.transaction_repo.list_by_category(category, product_id)
    }

    pub fn delete_transaction(&self, transaction_id: &str) -> Result<usize> {
        self.transaction_repo.delete(transaction_id)
    }
}
