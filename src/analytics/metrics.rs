use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::constants::DECIMAL_PRECISION;
use crate::valuations::SeriesPoint;

use super::analytics_model::MetricsBundle;

const DAYS_PER_YEAR: Decimal = dec!(365);
const HUNDRED: Decimal = dec!(100);

/// Computes return and risk metrics over a daily valuation series.
///
/// Returns `None` when the series has fewer than two points or starts at
/// zero, since every ratio below would be undefined. The input is expected
/// to be date-ascending, as produced by the series builder.
pub fn compute_metrics(series: &[SeriesPoint]) -> Option<MetricsBundle> {
    if series.len() < 2 {
        return None;
    }

    let start_value = series[0].value;
    let end_value = series[series.len() - 1].value;
    if start_value.is_zero() {
        return None;
    }

    let twr = (end_value / start_value - Decimal::ONE) * HUNDRED;

    let days_total = (series[series.len() - 1].date - series[0].date).num_days();
    let annualized = if days_total > 0 {
        annualized_return(end_value / start_value, days_total)
    } else {
        Decimal::ZERO
    };

    let volatility = annualized_volatility(series);
    let (max_drawdown, recovery_days, recovered) = max_drawdown_and_recovery(series);

    Some(MetricsBundle {
        twr: twr.round_dp(DECIMAL_PRECISION),
        annualized: annualized.round_dp(DECIMAL_PRECISION),
        volatility: volatility.round_dp(DECIMAL_PRECISION),
        max_drawdown: max_drawdown.round_dp(DECIMAL_PRECISION),
        drawdown_recovery_days: recovery_days,
        drawdown_recovered: recovered,
    })
}

/// Annualized growth rate in percent for a total-return ratio over
/// `days_total` days. Non-positive ratios cap at -100%.
///
/// A steep move over a short window can push `ratio^(365/days)` past the
/// Decimal range, so the exact path uses checked arithmetic and falls back
/// to f64, saturating at `Decimal::MAX` rather than overflowing.
fn annualized_return(ratio: Decimal, days_total: i64) -> Decimal {
    if ratio <= Decimal::ZERO {
        return -HUNDRED;
    }

    let exponent = DAYS_PER_YEAR / Decimal::from(days_total);
    if let Some(grown) = ratio.checked_powd(exponent) {
        if let Some(pct) = (grown - Decimal::ONE).checked_mul(HUNDRED) {
            return pct;
        }
    }

    let grown = ratio
        .to_f64()
        .unwrap_or(f64::MAX)
        .powf(365.0 / days_total as f64);
    Decimal::from_f64((grown - 1.0) * 100.0).unwrap_or(Decimal::MAX)
}

/// Sample standard deviation of day-over-day simple returns, scaled to a
/// 365-day year. Days following a non-positive value contribute a zero
/// return rather than poisoning the whole figure.
fn annualized_volatility(series: &[SeriesPoint]) -> Decimal {
    let mut returns: Vec<Decimal> = Vec::with_capacity(series.len() - 1);
    for pair in series.windows(2) {
        let prev = pair[0].value;
        let curr = pair[1].value;
        if prev > Decimal::ZERO {
            returns.push(curr / prev - Decimal::ONE);
        } else {
            returns.push(Decimal::ZERO);
        }
    }

    if returns.len() < 2 {
        return Decimal::ZERO;
    }

    let count = Decimal::from(returns.len());
    let mean: Decimal = returns.iter().sum::<Decimal>() / count;
    let variance: Decimal = returns
        .iter()
        .map(|r| (*r - mean) * (*r - mean))
        .sum::<Decimal>()
        / (count - Decimal::ONE);

    let std_dev = variance.sqrt().unwrap_or_default();
    let annualization = DAYS_PER_YEAR.sqrt().unwrap_or_default();

    std_dev * annualization * HUNDRED
}

/// Worst peak-to-trough decline plus how long it took to climb back.
///
/// Recovery is measured from the peak that preceded the worst trough to the
/// first later day whose value regains that peak. An unrecovered drawdown
/// reports the elapsed days to the series end with `recovered = false`.
fn max_drawdown_and_recovery(series: &[SeriesPoint]) -> (Decimal, i64, bool) {
    let mut max_dd = Decimal::ZERO;
    let mut peak_value = series[0].value;
    let mut peak_index = 0usize;
    let mut worst_peak_index = 0usize;

    for (i, point) in series.iter().enumerate() {
        if point.value > peak_value {
            peak_value = point.value;
            peak_index = i;
        } else if peak_value > Decimal::ZERO {
            let dd = Decimal::ONE - point.value / peak_value;
            if dd > max_dd {
                max_dd = dd;
                worst_peak_index = peak_index;
            }
        }
    }

    if max_dd.is_zero() {
        return (Decimal::ZERO, 0, true);
    }

    let worst_peak = &series[worst_peak_index];
    for point in &series[worst_peak_index + 1..] {
        if point.value >= worst_peak.value {
            let days = (point.date - worst_peak.date).num_days();
            return (max_dd * HUNDRED, days, true);
        }
    }

    let days = (series[series.len() - 1].date - worst_peak.date).num_days();
    (max_dd * HUNDRED, days, false)
}
