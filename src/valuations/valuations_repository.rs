use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;

use crate::constants::DECIMAL_PRECISION;
use crate::db::{get_connection, DbPool, DbTransactionExecutor};
use crate::errors::Result;
use crate::schema::valuation_points;
use crate::schema::valuation_points::dsl::*;
use crate::Error;

use super::valuations_model::{NewValuationPoint, UpsertReport, ValuationPoint, ValuationPointDb};

pub trait ValuationRepositoryTrait: Send + Sync {
    /// Inserts each point, or overwrites the value when the product already
    /// has a point on that date. Returns how many rows went each way.
    fn upsert_points(&self, points: Vec<NewValuationPoint>) -> Result<UpsertReport>;
    /// Points for one product with `start <= date <= end`, ascending.
    fn list_points(
        &self,
        input_product_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<ValuationPoint>>;
    /// Closest point strictly before `before`, if any.
    fn point_before(&self, input_product_id: &str, before: NaiveDate)
        -> Result<Option<ValuationPoint>>;
    /// Closest point strictly after `after`, if any.
    fn point_after(&self, input_product_id: &str, after: NaiveDate)
        -> Result<Option<ValuationPoint>>;
    /// Most recent point for the product, if any.
    fn latest_point(&self, input_product_id: &str) -> Result<Option<ValuationPoint>>;
    fn delete_point(&self, point_id: &str) -> Result<usize>;
}

/// Repository for manual valuation points
pub struct ValuationRepository {
    pool: Arc<DbPool>,
}

impl ValuationRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl ValuationRepositoryTrait for ValuationRepository {
    fn upsert_points(&self, points: Vec<NewValuationPoint>) -> Result<UpsertReport> {
        for point in &points {
            point.validate()?;
        }

        self.pool.execute(|conn| -> std::result::Result<UpsertReport, diesel::result::Error> {
            let mut report = UpsertReport::default();

            for point in points {
                let existing_id: Option<String> = valuation_points::table
                    .filter(product_id.eq(&point.product_id))
                    .filter(date.eq(point.date))
                    .select(id)
                    .first::<String>(conn)
                    .optional()?;

                match existing_id {
                    Some(point_id) => {
                        diesel::update(valuation_points.find(point_id))
                            .set((
                                market_value.eq(point
                                    .market_value
                                    .round_dp(DECIMAL_PRECISION)
                                    .to_string()),
                                updated_at.eq(chrono::Utc::now().naive_utc()),
                            ))
                            .execute(conn)?;
                        report.updated += 1;
                    }
                    None => {
                        let point_db: ValuationPointDb = point.into();
                        diesel::insert_into(valuation_points::table)
                            .values(&point_db)
                            .execute(conn)?;
                        report.inserted += 1;
                    }
                }
            }

            Ok(report)
        })
    }

    fn list_points(
        &self,
        input_product_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<ValuationPoint>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = valuation_points::table
            .filter(product_id.eq(input_product_id))
            .order(date.asc())
            .into_boxed();

        if let Some(start) = start {
            query = query.filter(date.ge(start));
        }
        if let Some(end) = end {
            query = query.filter(date.le(end));
        }

        let rows = query.load::<ValuationPointDb>(&mut conn)?;

        Ok(rows.into_iter().map(ValuationPoint::from).collect())
    }

    fn point_before(
        &self,
        input_product_id: &str,
        before: NaiveDate,
    ) -> Result<Option<ValuationPoint>> {
        let mut conn = get_connection(&self.pool)?;

        let row = valuation_points::table
            .filter(product_id.eq(input_product_id))
            .filter(date.lt(before))
            .order(date.desc())
            .first::<ValuationPointDb>(&mut conn)
            .optional()?;

        Ok(row.map(ValuationPoint::from))
    }

    fn point_after(
        &self,
        input_product_id: &str,
        after: NaiveDate,
    ) -> Result<Option<ValuationPoint>> {
        let mut conn = get_connection(&self.pool)?;

        let row = valuation_points::table
            .filter(product_id.eq(input_product_id))
            .filter(date.gt(after))
            .order(date.asc())
            .first::<ValuationPointDb>(&mut conn)
            .optional()?;

        Ok(row.map(ValuationPoint::from))
    }

    fn latest_point(&self, input_product_id: &str) -> Result<Option<ValuationPoint>> {
        let mut conn = get_connection(&self.pool)?;

        let row = valuation_points::table
            .filter(product_id.eq(input_product_id))
            .order(date.desc())
            .first::<ValuationPointDb>(&mut conn)
            .optional()?;

        Ok(row.map(ValuationPoint::from))
    }

    fn delete_point(&self, point_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        let affected = diesel::delete(valuation_points.find(point_id)).execute(&mut conn)?;

        if affected == 0 {
            return Err(Error::NotFound(format!(
                "Valuation point with id {} not found",
                point_id
            )));
        }

        Ok(affected)
    }
}
