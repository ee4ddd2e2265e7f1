use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Return and risk figures over one valuation series, percent-scaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsBundle {
    /// Cumulative time-weighted return over the window.
    pub twr: Decimal,
    /// Return annualized over a 365-day year.
    pub annualized: Decimal,
    /// Annualized sample standard deviation of daily returns.
    pub volatility: Decimal,
    /// Deepest peak-to-trough decline observed.
    pub max_drawdown: Decimal,
    /// Days from the drawdown peak until the value regained it. When the
    /// series ends below the peak this is the elapsed days so far.
    pub drawdown_recovery_days: i64,
    /// Whether the worst drawdown was actually recovered within the window.
    pub drawdown_recovered: bool,
}

/// Metrics for one product, with the context needed to read them honestly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMetrics {
    pub product_id: String,
    /// `None` when the series is too short to say anything meaningful.
    pub metrics: Option<MetricsBundle>,
    /// External capital moved during the window, so the return figures mix
    /// contributions with performance.
    pub cash_flow_in_window: bool,
    pub series_len: usize,
}
