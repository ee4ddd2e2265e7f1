use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;

use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::transactions;
use crate::schema::transactions::dsl::*;
use crate::Error;

use super::transactions_model::{
    NewTransaction, Paginated, Transaction, TransactionCategory, TransactionDb, TransactionFilter,
};

pub trait TransactionRepositoryTrait: Send + Sync {
    fn create(&self, new_transaction: NewTransaction) -> Result<Transaction>;
    fn list(&self, filter: &TransactionFilter, page: i64, page_size: i64)
        -> Result<Paginated<Transaction>>;
    /// All transactions for one product, trade-date ascending
    fn list_for_product(
        &self,
        input_product_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>>;
    /// All rows of a category, optionally restricted to one product
    fn list_by_category(
        &self,
        input_category: TransactionCategory,
        input_product_id: Option<&str>,
    ) -> Result<Vec<Transaction>>;
    /// Transactions of one account whose settle_date lies in `(after, through]`
    fn list_settled_for_account(
        &self,
        input_account_id: &str,
        after: NaiveDate,
        through: NaiveDate,
    ) -> Result<Vec<Transaction>>;
    fn delete(&self, transaction_id: &str) -> Result<usize>;
}

/// Repository for the transaction ledger
pub struct TransactionRepository {
    pool: Arc<DbPool>,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn filtered(filter: &TransactionFilter) -> transactions::BoxedQuery<'_, diesel::sqlite::Sqlite> {
        let mut query = transactions::table.into_boxed();

        if let Some(ref pid) = filter.product_id {
            query = query.filter(product_id.eq(pid.clone()));
        }
        if let Some(ref aid) = filter.account_id {
            query = query.filter(account_id.eq(aid.clone()));
        }
        if let Some(cat) = filter.category {
            query = query.filter(category.eq(cat.as_str()));
        }
        if let Some(start) = filter.start_date {
            query = query.filter(trade_date.ge(start));
        }
        if let Some(end) = filter.end_date {
            query = query.filter(trade_date.le(end));
        }

        query
    }
}

impl TransactionRepositoryTrait for TransactionRepository {
    fn create(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        new_transaction.validate()?;

        let mut transaction_db: TransactionDb = new_transaction.into();
        if transaction_db.id.is_empty() {
            transaction_db.id = uuid::Uuid::new_v4().to_string();
        }

        let mut conn = get_connection(&self.pool)?;

        diesel::insert_into(transactions::table)
            .values(&transaction_db)
            .execute(&mut conn)?;

        transaction_db.try_into()
    }

    fn list(
        &self,
        filter: &TransactionFilter,
        page: i64,
        page_size: i64,
    ) -> Result<Paginated<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        let total: i64 = Self::filtered(filter).count().get_result(&mut conn)?;

        let page = page.max(1);
        let page_size = page_size.max(1);
        let offset = (page - 1) * page_size;

        let rows = Self::filtered(filter)
            .order(trade_date.desc())
            .offset(offset)
            .limit(page_size)
            .load::<TransactionDb>(&mut conn)?;

        Ok(Paginated {
            items: rows
                .into_iter()
                .map(Transaction::try_from)
                .collect::<Result<Vec<_>>>()?,
            page,
            page_size,
            total,
            total_pages: (total + page_size - 1) / page_size,
        })
    }

    fn list_for_product(
        &self,
        input_product_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = transactions::table
            .filter(product_id.eq(input_product_id))
            .order(trade_date.asc())
            .into_boxed();

        if let Some(start) = start_date {
            query = query.filter(trade_date.ge(start));
        }
        if let Some(end) = end_date {
            query = query.filter(trade_date.le(end));
        }

        let rows = query.load::<TransactionDb>(&mut conn)?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    fn list_by_category(
        &self,
        input_category: TransactionCategory,
        input_product_id: Option<&str>,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = transactions::table
            .filter(category.eq(input_category.as_str()))
            .order(trade_date.asc())
            .into_boxed();

        if let Some(pid) = input_product_id {
            query = query.filter(product_id.eq(pid.to_string()));
        }

        let rows = query.load::<TransactionDb>(&mut conn)?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    fn list_settled_for_account(
        &self,
        input_account_id: &str,
        after: NaiveDate,
        through: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = transactions::table
            .filter(account_id.eq(input_account_id))
            .filter(settle_date.gt(after))
            .filter(settle_date.le(through))
            .order(settle_date.asc())
            .load::<TransactionDb>(&mut conn)?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    fn delete(&self, transaction_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        let affected = diesel::delete(transactions.find(transaction_id)).execute(&mut conn)?;

        if affected == 0 {
            return Err(Error::NotFound(format!(
                "Transaction with id {} not found",
                transaction_id
            )));
        }

        Ok(affected)
    }
}
