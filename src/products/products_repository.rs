use diesel::prelude::*;
use std::sync::Arc;

use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::products;
use crate::schema::products::dsl::*;
use crate::Error;

use super::products_model::{NewProduct, Product, ProductDb, ProductUpdate};

pub trait ProductRepositoryTrait: Send + Sync {
    fn create(&self, new_product: NewProduct) -> Result<Product>;
    fn patch(&self, product_id: &str, update: ProductUpdate) -> Result<Product>;
    fn get_by_id(&self, product_id: &str) -> Result<Product>;
    fn list(&self) -> Result<Vec<Product>>;
    fn delete(&self, product_id: &str) -> Result<usize>;
}

/// Repository for managing product records
pub struct ProductRepository {
    pool: Arc<DbPool>,
}

impl ProductRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl ProductRepositoryTrait for ProductRepository {
    fn create(&self, new_product: NewProduct) -> Result<Product> {
        new_product.validate()?;

        let mut product_db: ProductDb = new_product.into();
        if product_db.id.is_empty() {
            product_db.id = uuid::Uuid::new_v4().to_string();
        }

        let mut conn = get_connection(&self.pool)?;

        diesel::insert_into(products::table)
            .values(&product_db)
            .execute(&mut conn)?;

        Ok(product_db.into())
    }

    fn patch(&self, product_id: &str, update: ProductUpdate) -> Result<Product> {
        let mut conn = get_connection(&self.pool)?;

        let mut existing = products
            .find(product_id)
            .first::<ProductDb>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    Error::NotFound(format!("Product with id {} not found", product_id))
                }
                _ => e.into(),
            })?;

        if let Some(new_name) = update.name {
            existing.name = new_name;
        }
        if let Some(inst) = update.institution_id {
            existing.institution_id = inst;
        }
        if let Some(code) = update.product_code {
            existing.product_code = code;
        }
        if let Some(ptype) = update.product_type {
            existing.product_type = ptype.as_str().to_string();
        }
        if let Some(risk) = update.risk_level {
            existing.risk_level = risk.map(|r| r.as_str().to_string());
        }
        if let Some(term) = update.term_days {
            existing.term_days = term;
        }
        if let Some(rule) = update.liquidity_rule {
            existing.liquidity_rule = rule.as_str().to_string();
        }
        if let Some(settle) = update.settle_days {
            existing.settle_days = settle;
        }
        if let Some(new_note) = update.note {
            existing.note = new_note;
        }
        existing.updated_at = chrono::Utc::now().naive_utc();

        diesel::update(products.find(product_id))
            .set(&existing)
            .execute(&mut conn)?;

        Ok(existing.into())
    }

    fn get_by_id(&self, product_id: &str) -> Result<Product> {
        let mut conn = get_connection(&self.pool)?;

        let product = products
            .find(product_id)
            .first::<ProductDb>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    Error::NotFound(format!("Product with id {} not found", product_id))
                }
                _ => e.into(),
            })?;

        Ok(product.into())
    }

    fn list(&self) -> Result<Vec<Product>> {
        let mut conn = get_connection(&self.pool)?;

        let results = products.order(name.asc()).load::<ProductDb>(&mut conn)?;

        Ok(results.into_iter().map(Product::from).collect())
    }

    fn delete(&self, product_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        let affected = diesel::delete(products.find(product_id)).execute(&mut conn)?;

        if affected == 0 {
            return Err(Error::NotFound(format!(
                "Product with id {} not found",
                product_id
            )));
        }

        Ok(affected)
    }
}
