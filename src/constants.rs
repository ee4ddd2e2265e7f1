/// Decimal precision for stored monetary values
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Minimum number of daily series points before metrics are considered meaningful
pub const MIN_METRIC_POINTS: usize = 14;

/// Default settle delay (T+N) when a product does not specify one
pub const DEFAULT_SETTLE_DAYS: i32 = 1;
