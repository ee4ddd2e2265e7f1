use diesel::prelude::*;
use std::sync::Arc;

use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::institutions;
use crate::schema::institutions::dsl::*;
use crate::Error;

use super::institutions_model::{Institution, InstitutionDb, NewInstitution};

pub trait InstitutionRepositoryTrait: Send + Sync {
    fn create(&self, new_institution: NewInstitution) -> Result<Institution>;
    fn get_by_id(&self, institution_id: &str) -> Result<Institution>;
    fn list(&self) -> Result<Vec<Institution>>;
    fn delete(&self, institution_id: &str) -> Result<usize>;
}

/// Repository for managing institution records
pub struct InstitutionRepository {
    pool: Arc<DbPool>,
}

impl InstitutionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl InstitutionRepositoryTrait for InstitutionRepository {
    fn create(&self, new_institution: NewInstitution) -> Result<Institution> {
        new_institution.validate()?;

        let mut institution_db: InstitutionDb = new_institution.into();
        if institution_db.id.is_empty() {
            institution_db.id = uuid::Uuid::new_v4().to_string();
        }

        let mut conn = get_connection(&self.pool)?;
        diesel::insert_into(institutions::table)
            .values(&institution_db)
            .execute(&mut conn)?;

        Ok(institution_db.into())
    }

    fn get_by_id(&self, institution_id: &str) -> Result<Institution> {
        let mut conn = get_connection(&self.pool)?;

        let institution = institutions
            .find(institution_id)
            .first::<InstitutionDb>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    Error::NotFound(format!("Institution with id {} not found", institution_id))
                }
                _ => e.into(),
            })?;

        Ok(institution.into())
    }

    fn list(&self) -> Result<Vec<Institution>> {
        let mut conn = get_connection(&self.pool)?;

        let results = institutions
            .order(name.asc())
            .load::<InstitutionDb>(&mut conn)?;

        Ok(results.into_iter().map(Institution::from).collect())
    }

    fn delete(&self, institution_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        let affected = diesel::delete(institutions.find(institution_id)).execute(&mut conn)?;

        if affected == 0 {
            return Err(Error::NotFound(format!(
                "Institution with id {} not found",
                institution_id
            )));
        }

        Ok(affected)
    }
}
