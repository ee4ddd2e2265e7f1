use chrono::NaiveDate;
use std::sync::Arc;

use crate::constants::MIN_METRIC_POINTS;
use crate::errors::Result;
use crate::transactions::TransactionRepositoryTrait;
use crate::valuations::ValuationService;

use super::analytics_model::ProductMetrics;
use super::metrics::compute_metrics;

/// Service computing per-product performance metrics.
pub struct AnalyticsService {
    valuation_service: Arc<ValuationService>,
    transaction_repo: Arc<dyn TransactionRepositoryTrait>,
}

impl AnalyticsService {
    pub fn new(
        valuation_service: Arc<ValuationService>,
        transaction_repo: Arc<dyn TransactionRepositoryTrait>,
    ) -> Self {
        Self {
            valuation_service,
            transaction_repo,
        }
    }

    /// Metrics for one product over `[start, end]`.
    ///
    /// Series shorter than `min_points` (default 14 days) produce no metrics
    /// bundle; the caller still gets the series length so it can explain why.
    /// External cash flows inside the window do not suppress the numbers but
    /// are flagged, since they distort pure return readings.
    pub fn product_metrics(
        &self,
        product_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        min_points: Option<usize>,
    ) -> Result<ProductMetrics> {
        let min_points = min_points.unwrap_or(MIN_METRIC_POINTS);

        let series = self
            .valuation_service
            .get_daily_series(product_id, start, end)?;

        let metrics = if series.len() >= min_points {
            compute_metrics(&series)
        } else {
            log::debug!(
                "Series for product {} has {} points, below the {}-point minimum",
                product_id,
                series.len(),
                min_points
            );
            None
        };

        let cash_flow_in_window = self
            .transaction_repo
            .list_for_product(product_id, Some(start), Some(end))?
            .iter()
            .any(|tx| tx.category.is_external_flow());

        Ok(ProductMetrics {
            product_id: product_id.to_string(),
            metrics,
            cash_flow_in_window,
            series_len: series.len(),
        })
    }
}
