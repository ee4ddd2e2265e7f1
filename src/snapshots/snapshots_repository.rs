use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;

use crate::constants::DECIMAL_PRECISION;
use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::snapshots;
use crate::schema::snapshots::dsl::*;
use crate::Error;

use super::snapshots_model::{NewSnapshot, Snapshot, SnapshotDb};

pub trait SnapshotRepositoryTrait: Send + Sync {
    /// Inserts the snapshot, or overwrites the balance when the account
    /// already has one on that date. Returns true when a row was inserted.
    fn upsert(&self, snapshot: NewSnapshot) -> Result<bool>;
    /// All snapshots recorded on exactly `on_date`.
    fn list_on_date(&self, on_date: NaiveDate) -> Result<Vec<Snapshot>>;
    /// Per-account latest snapshot with `date <= through`.
    fn list_latest_through(&self, through: NaiveDate) -> Result<Vec<Snapshot>>;
    /// Latest snapshot of one account with `date <= through`, if any.
    fn latest_for_account(
        &self,
        input_account_id: &str,
        through: NaiveDate,
    ) -> Result<Option<Snapshot>>;
    /// Most recent date carrying any snapshot.
    fn latest_date(&self) -> Result<Option<NaiveDate>>;
    /// All distinct snapshot dates, newest first.
    fn available_dates(&self) -> Result<Vec<NaiveDate>>;
    fn delete(&self, snapshot_id: &str) -> Result<usize>;
}

/// Repository for manual balance snapshots
pub struct SnapshotRepository {
    pool: Arc<DbPool>,
}

impl SnapshotRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl SnapshotRepositoryTrait for SnapshotRepository {
    fn upsert(&self, snapshot: NewSnapshot) -> Result<bool> {
        snapshot.validate()?;

        let mut conn = get_connection(&self.pool)?;

        let existing_id: Option<String> = snapshots::table
            .filter(date.eq(snapshot.date))
            .filter(account_id.eq(&snapshot.account_id))
            .select(id)
            .first::<String>(&mut conn)
            .optional()?;

        match existing_id {
            Some(snapshot_id) => {
                diesel::update(snapshots.find(snapshot_id))
                    .set((
                        balance.eq(snapshot.balance.round_dp(DECIMAL_PRECISION).to_string()),
                        updated_at.eq(chrono::Utc::now().naive_utc()),
                    ))
                    .execute(&mut conn)?;
                Ok(false)
            }
            None => {
                let snapshot_db: SnapshotDb = snapshot.into();
                diesel::insert_into(snapshots::table)
                    .values(&snapshot_db)
                    .execute(&mut conn)?;
                Ok(true)
            }
        }
    }

    fn list_on_date(&self, on_date: NaiveDate) -> Result<Vec<Snapshot>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = snapshots::table
            .filter(date.eq(on_date))
            .order(account_id.asc())
            .load::<SnapshotDb>(&mut conn)?;

        Ok(rows.into_iter().map(Snapshot::from).collect())
    }

    fn list_latest_through(&self, through: NaiveDate) -> Result<Vec<Snapshot>> {
        let mut conn = get_connection(&self.pool)?;

        // One pass over the window, newest first, keeping the first row seen
        // per account. Sqlite lacks DISTINCT ON, and row counts here are
        // small enough that this beats a correlated subquery.
        let rows = snapshots::table
            .filter(date.le(through))
            .order((account_id.asc(), date.desc()))
            .load::<SnapshotDb>(&mut conn)?;

        let mut latest: Vec<Snapshot> = Vec::new();
        for row in rows {
            if latest.last().map(|s| s.account_id.as_str()) != Some(row.account_id.as_str()) {
                latest.push(row.into());
            }
        }

        Ok(latest)
    }

    fn latest_for_account(
        &self,
        input_account_id: &str,
        through: NaiveDate,
    ) -> Result<Option<Snapshot>> {
        let mut conn = get_connection(&self.pool)?;

        let row = snapshots::table
            .filter(account_id.eq(input_account_id))
            .filter(date.le(through))
            .order(date.desc())
            .first::<SnapshotDb>(&mut conn)
            .optional()?;

        Ok(row.map(Snapshot::from))
    }

    fn latest_date(&self) -> Result<Option<NaiveDate>> {
        let mut conn = get_connection(&self.pool)?;

        let latest = snapshots::table
            .select(date)
            .order(date.desc())
            .first::<NaiveDate>(&mut conn)
            .optional()?;

        Ok(latest)
    }

    fn available_dates(&self) -> Result<Vec<NaiveDate>> {
        let mut conn = get_connection(&self.pool)?;

        let dates = snapshots::table
            .select(date)
            .distinct()
            .order(date.desc())
            .load::<NaiveDate>(&mut conn)?;

        Ok(dates)
    }

    fn delete(&self, snapshot_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        let affected = diesel::delete(snapshots.find(snapshot_id)).execute(&mut conn)?;

        if affected == 0 {
            return Err(Error::NotFound(format!(
                "Snapshot with id {} not found",
                snapshot_id
            )));
        }

        Ok(affected)
    }
}
