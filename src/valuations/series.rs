use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::constants::DECIMAL_PRECISION;
use crate::errors::{Error, Result, ValidationError};

use super::valuations_model::{SeriesPoint, ValueSource};

/// Expands sparse manual valuation points into a gap-free daily series over
/// `[start, end]`.
///
/// Between two consecutive manual points the value moves linearly; after the
/// last manual point it is carried forward flat. Days before the first manual
/// point are not emitted at all, so the returned series may begin later than
/// `start` (or be empty) but never contains a gap or a duplicate date.
pub fn build_daily_series(
    points: &[(NaiveDate, Decimal)],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<SeriesPoint>> {
    if start > end {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Invalid range: start {} is after end {}",
            start, end
        ))));
    }

    let mut sorted: Vec<(NaiveDate, Decimal)> = points.to_vec();
    sorted.sort_by_key(|(date, _)| *date);

    for pair in sorted.windows(2) {
        if pair[0].0 == pair[1].0 {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Duplicate valuation point on {}",
                pair[0].0
            ))));
        }
    }

    if sorted.is_empty() {
        return Ok(Vec::new());
    }

    let mut series: Vec<SeriesPoint> = Vec::new();
    let mut last_emitted: Option<NaiveDate> = None;

    for pair in sorted.windows(2) {
        let (left_date, left_value) = pair[0];
        let (right_date, right_value) = pair[1];

        let lo = left_date.max(start);
        let hi = right_date.min(end);
        if lo > hi {
            continue;
        }

        let span = Decimal::from((right_date - left_date).num_days());

        for date in lo.iter_days() {
            if date > hi {
                break;
            }
            if last_emitted.is_some_and(|prev| prev >= date) {
                continue;
            }

            let point = if date == left_date {
                SeriesPoint {
                    date,
                    value: left_value,
                    source: ValueSource::Manual,
                }
            } else if date == right_date {
                SeriesPoint {
                    date,
                    value: right_value,
                    source: ValueSource::Manual,
                }
            } else {
                let elapsed = Decimal::from((date - left_date).num_days());
                let value = left_value + (right_value - left_value) * elapsed / span;
                SeriesPoint {
                    date,
                    value: value.round_dp(DECIMAL_PRECISION),
                    source: ValueSource::Interpolated,
                }
            };

            series.push(point);
            last_emitted = Some(date);
        }
    }

    // Single-point case: the point itself, when it falls inside the range.
    let (last_date, last_value) = sorted[sorted.len() - 1];
    if sorted.len() == 1 && last_date >= start && last_date <= end {
        series.push(SeriesPoint {
            date: last_date,
            value: last_value,
            source: ValueSource::Manual,
        });
        last_emitted = Some(last_date);
    }

    // Carry the last manual value forward flat through the end of the range.
    let carry_from = last_date.succ_opt().unwrap_or(last_date).max(start);
    if carry_from <= end {
        for date in carry_from.iter_days() {
            if date > end {
                break;
            }
            if last_emitted.is_some_and(|prev| prev >= date) {
                continue;
            }
            series.push(SeriesPoint {
                date,
                value: last_value,
                source: ValueSource::Extrapolated,
            });
            last_emitted = Some(date);
        }
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_points_yield_empty_series() {
        let series = build_daily_series(&[], day(2024, 1, 1), day(2024, 1, 31)).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_start_after_end_is_rejected() {
        let points = vec![(day(2024, 1, 5), dec!(100))];
        let result = build_daily_series(&points, day(2024, 1, 10), day(2024, 1, 1));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_duplicate_dates_are_rejected() {
        let points = vec![
            (day(2024, 1, 5), dec!(100)),
            (day(2024, 1, 5), dec!(110)),
        ];
        let result = build_daily_series(&points, day(2024, 1, 1), day(2024, 1, 31));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_linear_interpolation_between_two_points() {
        let points = vec![
            (day(2024, 1, 1), dec!(100)),
            (day(2024, 1, 11), dec!(110)),
        ];
        let series = build_daily_series(&points, day(2024, 1, 1), day(2024, 1, 11)).unwrap();

        assert_eq!(series.len(), 11);
        assert_eq!(series[0].date, day(2024, 1, 1));
        assert_eq!(series[0].value, dec!(100));
        assert_eq!(series[0].source, ValueSource::Manual);

        assert_eq!(series[5].date, day(2024, 1, 6));
        assert_eq!(series[5].value, dec!(105));
        assert_eq!(series[5].source, ValueSource::Interpolated);

        assert_eq!(series[10].date, day(2024, 1, 11));
        assert_eq!(series[10].value, dec!(110));
        assert_eq!(series[10].source, ValueSource::Manual);
    }

    #[test]
    fn test_flat_extrapolation_after_last_point() {
        let points = vec![
            (day(2024, 1, 1), dec!(100)),
            (day(2024, 1, 3), dec!(104)),
        ];
        let series = build_daily_series(&points, day(2024, 1, 1), day(2024, 1, 6)).unwrap();

        assert_eq!(series.len(), 6);
        assert_eq!(series[2].value, dec!(104));
        assert_eq!(series[2].source, ValueSource::Manual);
        for point in &series[3..] {
            assert_eq!(point.value, dec!(104));
            assert_eq!(point.source, ValueSource::Extrapolated);
        }
        assert_eq!(series[5].date, day(2024, 1, 6));
    }

    #[test]
    fn test_no_backfill_before_first_point() {
        let points = vec![
            (day(2024, 1, 5), dec!(100)),
            (day(2024, 1, 7), dec!(102)),
        ];
        let series = build_daily_series(&points, day(2024, 1, 1), day(2024, 1, 7)).unwrap();

        assert_eq!(series.first().map(|p| p.date), Some(day(2024, 1, 5)));
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_single_point_inside_range() {
        let points = vec![(day(2024, 1, 3), dec!(50))];
        let series = build_daily_series(&points, day(2024, 1, 1), day(2024, 1, 5)).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].date, day(2024, 1, 3));
        assert_eq!(series[0].source, ValueSource::Manual);
        assert_eq!(series[1].source, ValueSource::Extrapolated);
        assert_eq!(series[2].value, dec!(50));
    }

    #[test]
    fn test_single_point_before_range_extrapolates_flat() {
        let points = vec![(day(2023, 12, 1), dec!(80))];
        let series = build_daily_series(&points, day(2024, 1, 1), day(2024, 1, 3)).unwrap();

        assert_eq!(series.len(), 3);
        for point in &series {
            assert_eq!(point.value, dec!(80));
            assert_eq!(point.source, ValueSource::Extrapolated);
        }
    }

    #[test]
    fn test_single_point_after_range_yields_nothing() {
        let points = vec![(day(2024, 2, 1), dec!(80))];
        let series = build_daily_series(&points, day(2024, 1, 1), day(2024, 1, 10)).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_range_clips_into_middle_of_segment() {
        let points = vec![
            (day(2024, 1, 1), dec!(100)),
            (day(2024, 1, 11), dec!(110)),
        ];
        let series = build_daily_series(&points, day(2024, 1, 4), day(2024, 1, 8)).unwrap();

        assert_eq!(series.len(), 5);
        assert_eq!(series[0].date, day(2024, 1, 4));
        assert_eq!(series[0].value, dec!(103));
        assert_eq!(series[0].source, ValueSource::Interpolated);
        assert_eq!(series[4].date, day(2024, 1, 8));
        assert_eq!(series[4].value, dec!(107));
    }

    #[test]
    fn test_boundary_points_outside_range_still_anchor_interpolation() {
        // Interpolation anchors may lie outside the requested window.
        let points = vec![
            (day(2023, 12, 30), dec!(100)),
            (day(2024, 1, 9), dec!(110)),
        ];
        let series = build_daily_series(&points, day(2024, 1, 1), day(2024, 1, 5)).unwrap();

        assert_eq!(series.len(), 5);
        assert_eq!(series[0].value, dec!(102));
        assert!(series.iter().all(|p| p.source == ValueSource::Interpolated));
    }

    #[test]
    fn test_consecutive_segments_share_no_duplicate_dates() {
        let points = vec![
            (day(2024, 1, 1), dec!(100)),
            (day(2024, 1, 3), dec!(110)),
            (day(2024, 1, 5), dec!(90)),
        ];
        let series = build_daily_series(&points, day(2024, 1, 1), day(2024, 1, 5)).unwrap();

        assert_eq!(series.len(), 5);
        let mut prev = None;
        for point in &series {
            if let Some(prev) = prev {
                assert_eq!(point.date, prev + chrono::Days::new(1));
            }
            prev = Some(point.date);
        }
        assert_eq!(series[2].value, dec!(110));
        assert_eq!(series[2].source, ValueSource::Manual);
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let points = vec![
            (day(2024, 1, 11), dec!(110)),
            (day(2024, 1, 1), dec!(100)),
        ];
        let series = build_daily_series(&points, day(2024, 1, 1), day(2024, 1, 11)).unwrap();
        assert_eq!(series.len(), 11);
        assert_eq!(series[5].value, dec!(105));
    }

    #[test]
    fn test_fractional_interpolation_rounds_to_precision() {
        let points = vec![
            (day(2024, 1, 1), dec!(100)),
            (day(2024, 1, 4), dec!(101)),
        ];
        let series = build_daily_series(&points, day(2024, 1, 1), day(2024, 1, 4)).unwrap();

        assert_eq!(series[1].value, dec!(100.333333));
        assert_eq!(series[2].value, dec!(100.666667));
    }
}
