use std::sync::Arc;

use log::debug;

use crate::errors::Result;
use crate::institutions::InstitutionRepositoryTrait;

use super::products_model::{NewProduct, Product, ProductUpdate};
use super::products_repository::ProductRepositoryTrait;

/// Service for managing investment products
pub struct ProductService {
    repository: Arc<dyn ProductRepositoryTrait>,
    institution_repository: Arc<dyn InstitutionRepositoryTrait>,
}

impl ProductService {
    pub fn new(
        repository: Arc<dyn ProductRepositoryTrait>,
        institution_repository: Arc<dyn InstitutionRepositoryTrait>,
    ) -> Self {
        Self {
            repository,
            institution_repository,
        }
    }

    /// Creates a new product, verifying the referenced institution when one is given
    pub fn create_product(&self, new_product: NewProduct) -> Result<Product> {
        debug!("Creating product '{}'", new_product.name);
        new_product.validate()?;
        if let Some(ref inst_id) = new_product.institution_id {
            self.institution_repository.get_by_id(inst_id)?;
        }
        self.repository.create(new_product)
    }

    pub fn patch_product(&self, product_id: &str, update: ProductUpdate) -> Result<Product> {
        if let Some(Some(ref inst_id)) = update.institution_id {
            self.institution_repository.get_by_id(inst_id)?;
        }
        self.repository.patch(product_id, update)
    }

    pub fn get_product(&self, product_id: &str) -> Result<Product> {
        self.repository.get_by_id(product_id)
    }

    pub fn list_products(&self) -> Result<Vec<Product>> {
        self.repository.list()
    }

    pub fn delete_product(&self, product_id: &str) -> Result<()> {
        self.repository.delete(product_id)?;
        Ok(())
    }
}
