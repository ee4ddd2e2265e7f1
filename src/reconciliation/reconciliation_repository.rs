use diesel::prelude::*;
use std::sync::Arc;

use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::reconciliation_warnings;
use crate::schema::reconciliation_warnings::dsl::*;

use super::reconciliation_model::{WarningRecord, WarningRecordDb, WarningStatus, WarningType};

pub trait WarningRepositoryTrait: Send + Sync {
    fn get_by_warning_id(&self, input_warning_id: &str) -> Result<Option<WarningRecord>>;
    fn list_by_warning_ids(&self, warning_ids: &[String]) -> Result<Vec<WarningRecord>>;
    /// Creates or updates the status record for one warning id.
    fn upsert_status(
        &self,
        input_warning_id: &str,
        input_warning_type: WarningType,
        input_object_type: &str,
        input_object_id: &str,
        input_status: WarningStatus,
        input_mute_reason: Option<String>,
    ) -> Result<WarningRecord>;
}

/// Repository persisting the review status of reconciliation warnings
pub struct WarningRepository {
    pool: Arc<DbPool>,
}

impl WarningRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl WarningRepositoryTrait for WarningRepository {
    fn get_by_warning_id(&self, input_warning_id: &str) -> Result<Option<WarningRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let row = reconciliation_warnings::table
            .filter(warning_id.eq(input_warning_id))
            .first::<WarningRecordDb>(&mut conn)
            .optional()?;

        Ok(row.map(WarningRecord::from))
    }

    fn list_by_warning_ids(&self, warning_ids: &[String]) -> Result<Vec<WarningRecord>> {
        if warning_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = get_connection(&self.pool)?;

        let rows = reconciliation_warnings::table
            .filter(warning_id.eq_any(warning_ids))
            .load::<WarningRecordDb>(&mut conn)?;

        Ok(rows.into_iter().map(WarningRecord::from).collect())
    }

    fn upsert_status(
        &self,
        input_warning_id: &str,
        input_warning_type: WarningType,
        input_object_type: &str,
        input_object_id: &str,
        input_status: WarningStatus,
        input_mute_reason: Option<String>,
    ) -> Result<WarningRecord> {
        let mut conn = get_connection(&self.pool)?;

        let existing_id: Option<String> = reconciliation_warnings::table
            .filter(warning_id.eq(input_warning_id))
            .select(id)
            .first::<String>(&mut conn)
            .optional()?;

        let record_id = match existing_id {
            Some(record_id) => {
                diesel::update(reconciliation_warnings.find(&record_id))
                    .set((
                        status.eq(input_status.as_str()),
                        mute_reason.eq(&input_mute_reason),
                        updated_at.eq(chrono::Utc::now().naive_utc()),
                    ))
                    .execute(&mut conn)?;
                record_id
            }
            None => {
                let now = chrono::Utc::now().naive_utc();
                let record = WarningRecordDb {
                    id: uuid::Uuid::new_v4().to_string(),
                    warning_id: input_warning_id.to_string(),
                    warning_type: input_warning_type.as_str().to_string(),
                    object_type: input_object_type.to_string(),
                    object_id: input_object_id.to_string(),
                    status: input_status.as_str().to_string(),
                    mute_reason: input_mute_reason,
                    created_at: now,
                    updated_at: now,
                };
                diesel::insert_into(reconciliation_warnings::table)
                    .values(&record)
                    .execute(&mut conn)?;
                record.id
            }
        };

        let row = reconciliation_warnings
            .find(record_id)
            .first::<WarningRecordDb>(&mut conn)?;

        Ok(row.into())
    }
}
