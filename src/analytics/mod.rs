pub(crate) mod analytics_model;
pub(crate) mod analytics_service;
pub(crate) mod metrics;

pub use analytics_model::{MetricsBundle, ProductMetrics};
pub use analytics_service::AnalyticsService;
pub use metrics::compute_metrics;
