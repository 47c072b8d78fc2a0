//! Aligns two price histories for side-by-side comparison.

use crate::core::convert::parse_price;
use crate::core::error::QuoteError;
use crate::core::price::PricePoint;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartMode {
    #[default]
    Absolute,
    /// Percent change of each series from its own first value.
    Percentage,
}

/// Two series ready to be plotted against shared labels, oldest first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignedSeries {
    pub labels: Vec<i64>,
    pub series_a: Vec<f64>,
    pub series_b: Vec<f64>,
}

impl AlignedSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn point_value(point: &PricePoint) -> Result<f64, QuoteError> {
    match point.price.as_deref() {
        Some(raw) => parse_price(raw),
        None => Ok(f64::NAN),
    }
}

/// Rescales `series` to percent change from its first value.
///
/// A first value of zero or a gap has no meaningful baseline and yields all `NaN`.
pub fn percentage_returns(series: &[f64]) -> Vec<f64> {
    let Some(&start) = series.first() else {
        return Vec::new();
    };
    if start == 0.0 || start.is_nan() {
        warn!(start, "Series has no usable baseline, percentage returns are undefined");
        return vec![f64::NAN; series.len()];
    }
    series.iter().map(|p| (p - start) / start * 100.0).collect()
}

/// Pairs two newest-first histories by position and returns them oldest first.
///
/// Labels come from `history_a`. Histories of different lengths are truncated
/// to the shorter one, keeping the most recent points paired. Positions whose
/// timestamps disagree are reported but still paired.
pub fn align(
    history_a: &[PricePoint],
    history_b: &[PricePoint],
    mode: ChartMode,
) -> Result<AlignedSeries, QuoteError> {
    let len = history_a.len().min(history_b.len());
    if history_a.len() != history_b.len() {
        warn!(
            len_a = history_a.len(),
            len_b = history_b.len(),
            "Histories differ in length, truncating to {}",
            len
        );
    }

    let a = &history_a[..len];
    let b = &history_b[..len];

    let mismatched = a
        .iter()
        .zip(b)
        .filter(|(pa, pb)| pa.timestamp != pb.timestamp)
        .count();
    if mismatched > 0 {
        warn!(mismatched, "Histories are paired by position but timestamps differ");
    }

    let labels: Vec<i64> = a.iter().rev().map(|p| p.timestamp).collect();
    let series_a = a.iter().rev().map(point_value).collect::<Result<Vec<_>, _>>()?;
    let series_b = b.iter().rev().map(point_value).collect::<Result<Vec<_>, _>>()?;
    debug!(points = len, ?mode, "Aligned price histories");

    let (series_a, series_b) = match mode {
        ChartMode::Absolute => (series_a, series_b),
        ChartMode::Percentage => (percentage_returns(&series_a), percentage_returns(&series_b)),
    };

    Ok(AlignedSeries {
        labels,
        series_a,
        series_b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(points: &[(i64, &str)]) -> Vec<PricePoint> {
        points.iter().map(|(t, p)| PricePoint::new(*t, p)).collect()
    }

    #[test]
    fn test_align_reverses_to_oldest_first() {
        let h1 = history(&[(3, "300"), (2, "200"), (1, "100")]);
        let h2 = history(&[(3, "30"), (2, "20"), (1, "10")]);

        let aligned = align(&h1, &h2, ChartMode::Absolute).unwrap();
        assert_eq!(aligned.labels, vec![1, 2, 3]);
        assert_eq!(aligned.series_a, vec![100.0, 200.0, 300.0]);
        assert_eq!(aligned.series_b, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_percentage_mode_normalizes_each_series_independently() {
        let h1 = history(&[(3, "300"), (2, "200"), (1, "100")]);
        let h2 = history(&[(3, "5"), (2, "2"), (1, "4")]);

        let aligned = align(&h1, &h2, ChartMode::Percentage).unwrap();
        assert_eq!(aligned.series_a, vec![0.0, 100.0, 200.0]);
        assert_eq!(aligned.series_b, vec![0.0, -50.0, 25.0]);
    }

    #[test]
    fn test_percentage_mode_starts_at_zero() {
        let h1 = history(&[(4, "0.31"), (3, "0.29"), (2, "0.35"), (1, "0.3")]);
        let h2 = history(&[(4, "61000"), (3, "60500"), (2, "59000"), (1, "60000")]);

        let aligned = align(&h1, &h2, ChartMode::Percentage).unwrap();
        assert_eq!(aligned.series_a[0], 0.0);
        assert_eq!(aligned.series_b[0], 0.0);
        assert_eq!(aligned.len(), 4);
    }

    #[test]
    fn test_absolute_mode_preserves_parsed_values() {
        let h1 = history(&[(20, "1.2345"), (10, "0.5")]);
        let h2 = history(&[(20, " 42 "), (10, "41.99")]);

        let aligned = align(&h1, &h2, ChartMode::Absolute).unwrap();
        assert_eq!(aligned.series_a, vec![0.5, 1.2345]);
        assert_eq!(aligned.series_b, vec![41.99, 42.0]);
    }

    #[test]
    fn test_different_lengths_truncate_keeping_recent_points() {
        let h1 = history(&[(4, "4"), (3, "3"), (2, "2"), (1, "1")]);
        let h2 = history(&[(4, "40"), (3, "30")]);

        let aligned = align(&h1, &h2, ChartMode::Absolute).unwrap();
        assert_eq!(aligned.labels, vec![3, 4]);
        assert_eq!(aligned.series_a, vec![3.0, 4.0]);
        assert_eq!(aligned.series_b, vec![30.0, 40.0]);
    }

    #[test]
    fn test_labels_come_from_first_history() {
        let h1 = history(&[(200, "2"), (100, "1")]);
        let h2 = history(&[(201, "20"), (101, "10")]);

        let aligned = align(&h1, &h2, ChartMode::Absolute).unwrap();
        assert_eq!(aligned.labels, vec![100, 200]);
        assert_eq!(aligned.series_b, vec![10.0, 20.0]);
    }

    #[test]
    fn test_missing_prices_become_gaps() {
        let mut h1 = history(&[(3, "3"), (2, "2"), (1, "1")]);
        h1[1].price = None;
        let h2 = history(&[(3, "3"), (2, "2"), (1, "1")]);

        let aligned = align(&h1, &h2, ChartMode::Absolute).unwrap();
        assert!(aligned.series_a[1].is_nan());
        assert_eq!(aligned.series_a[2], 3.0);
    }

    #[test]
    fn test_unparsable_price_is_an_error() {
        let h1 = history(&[(1, "abc")]);
        let h2 = history(&[(1, "1")]);

        let result = align(&h1, &h2, ChartMode::Absolute);
        assert_eq!(result, Err(QuoteError::InvalidPrice("abc".to_string())));
    }

    #[test]
    fn test_zero_first_value_yields_nan_series() {
        let returns = percentage_returns(&[0.0, 1.0, 2.0]);
        assert_eq!(returns.len(), 3);
        assert!(returns.iter().all(|r| r.is_nan()));
    }

    #[test]
    fn test_gap_as_first_value_yields_nan_series() {
        let returns = percentage_returns(&[f64::NAN, 1.0]);
        assert!(returns.iter().all(|r| r.is_nan()));
    }

    #[test]
    fn test_empty_histories() {
        let aligned = align(&[], &[], ChartMode::Percentage).unwrap();
        assert!(aligned.is_empty());
    }
}
