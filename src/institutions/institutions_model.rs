use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Domain model representing a bank or platform holding accounts and products
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Institution {
    pub id: String,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new institution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInstitution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

impl NewInstitution {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Institution name cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}

/// Database model for institutions
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::institutions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstitutionDb {
    pub id: String,
    pub name: String,
    #[diesel(skip_insertion)]
    pub created_at: NaiveDateTime,
    #[diesel(skip_insertion)]
    pub updated_at: NaiveDateTime,
}

impl From<InstitutionDb> for Institution {
    fn from(db: InstitutionDb) -> Self {
        Self {
            id: db.id,
            name: db.name,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewInstitution> for InstitutionDb {
    fn from(domain: NewInstitution) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            name: domain.name,
            created_at: now,
            updated_at: now,
        }
    }
}
