use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::errors::Result;
use crate::products::ProductRepositoryTrait;

use super::series::build_daily_series;
use super::valuations_model::{NewValuationPoint, SeriesPoint, UpsertReport, ValuationPoint};
use super::valuations_repository::ValuationRepositoryTrait;

/// Service exposing manual valuation points and the derived daily series.
pub struct ValuationService {
    valuation_repo: Arc<dyn ValuationRepositoryTrait>,
    product_repo: Arc<dyn ProductRepositoryTrait>,
}

impl ValuationService {
    pub fn new(
        valuation_repo: Arc<dyn ValuationRepositoryTrait>,
        product_repo: Arc<dyn ProductRepositoryTrait>,
    ) -> Self {
        Self {
            valuation_repo,
            product_repo,
        }
    }

    /// Records a batch of valuation points, overwriting same-date entries.
    pub fn record_points(&self, points: Vec<NewValuationPoint>) -> Result<UpsertReport> {
        for point in &points {
            self.product_repo.get_by_id(&point.product_id)?;
        }
        self.valuation_repo.upsert_points(points)
    }

    pub fn list_points(
        &self,
        product_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<ValuationPoint>> {
        self.valuation_repo.list_points(product_id, start, end)
    }

    pub fn latest_point(&self, product_id: &str) -> Result<Option<ValuationPoint>> {
        self.valuation_repo.latest_point(product_id)
    }

    pub fn delete_point(&self, point_id: &str) -> Result<usize> {
        self.valuation_repo.delete_point(point_id)
    }

    /// Gap-free daily valuation series for one product over `[start, end]`.
    ///
    /// The nearest manual points just outside the window are pulled in as
    /// interpolation anchors so the series does not flatten artificially at
    /// the window edges.
    pub fn get_daily_series(
        &self,
        product_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SeriesPoint>> {
        self.product_repo.get_by_id(product_id)?;

        let mut anchors: Vec<(NaiveDate, Decimal)> = Vec::new();

        if let Some(prev) = self.valuation_repo.point_before(product_id, start)? {
            anchors.push((prev.date, prev.market_value));
        }

        for point in self
            .valuation_repo
            .list_points(product_id, Some(start), Some(end))?
        {
            anchors.push((point.date, point.market_value));
        }

        if let Some(next) = self.valuation_repo.point_after(product_id, end)? {
            anchors.push((next.date, next.market_value));
        }

        build_daily_series(&anchors, start, end)
    }
}
