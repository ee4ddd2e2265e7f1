use std::sync::Arc;

use crate::errors::Result;

use super::institutions_model::{Institution, NewInstitution};
use super::institutions_repository::InstitutionRepositoryTrait;

/// Service for managing institutions
pub struct InstitutionService {
    repository: Arc<dyn InstitutionRepositoryTrait>,
}

impl InstitutionService {
    pub fn new(repository: Arc<dyn InstitutionRepositoryTrait>) -> Self {
        Self { repository }
    }

    pub fn create_institution(&self, new_institution: NewInstitution) -> Result<Institution> {
        self.repository.create(new_institution)
    }

    pub fn get_institution(&self, institution_id: &str) -> Result<Institution> {
        self.repository.get_by_id(institution_id)
    }

    pub fn list_institutions(&self) -> Result<Vec<Institution>> {
        self.repository.list()
    }

    pub fn delete_institution(&self, institution_id: &str) -> Result<()> {
        self.repository.delete(institution_id)?;
        Ok(())
    }
}
