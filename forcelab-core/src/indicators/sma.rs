//! Simple Moving Average (SMA).
//!
//! Rolling mean of one price field over a trailing window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::PriceSource;
use crate::components::indicator::Indicator;
use crate::domain::CandleSeries;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    source: PriceSource,
    name: String,
}

impl Sma {
    pub fn new(period: usize, source: PriceSource) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            source,
            name: format!("sma_{period}_{}", source.as_str()),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, series: &CandleSeries) -> Vec<f64> {
        let values: Vec<f64> = series
            .candles()
            .iter()
            .map(|c| self.source.extract(c))
            .collect();
        let n = values.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        // Initial window sum
        let mut sum: f64 = values[..self.period].iter().sum();
        let mut nan_in_window = sum.is_nan();
        if !nan_in_window {
            result[self.period - 1] = sum / self.period as f64;
        }

        // Roll the window forward
        for i in self.period..n {
            let leaving = values[i - self.period];
            let entering = values[i];

            if entering.is_nan() || leaving.is_nan() || nan_in_window {
                // A NaN poisons the running sum, so rescan the window.
                let window = &values[(i + 1 - self.period)..=i];
                sum = window.iter().sum();
                nan_in_window = sum.is_nan();
                if nan_in_window {
                    continue;
                }
            } else {
                sum = sum - leaving + entering;
            }

            result[i] = sum / self.period as f64;
        }

        result
    }
}

/// Trailing mean of an arbitrary series, summed window by window.
///
/// Used for the stochastic smoothing passes, where windows are short and the
/// input has a leading undefined prefix. Any NaN in a window makes that
/// output undefined. Summing each window directly keeps the mean of values
/// inside [0, 100] inside [0, 100].
pub fn sma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        result[i] = window.iter().sum::<f64>() / period as f64;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let series = make_series(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        let result = Sma::new(5, PriceSource::Close).compute(&series);

        assert_eq!(result.len(), 7);
        for (i, v) in result.iter().enumerate().take(4) {
            assert!(v.is_nan(), "expected NaN at index {i}");
        }
        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_on_open_uses_open_prices() {
        // make_series: open = previous close
        let series = make_series(&[10.0, 11.0, 12.0, 13.0]);
        let result = Sma::new(2, PriceSource::Open).compute(&series);
        // opens: 10, 10, 11, 12
        assert!(result[0].is_nan());
        assert_approx(result[1], 10.0, DEFAULT_EPSILON);
        assert_approx(result[2], 10.5, DEFAULT_EPSILON);
        assert_approx(result[3], 11.5, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_close() {
        let series = make_series(&[100.0, 200.0, 300.0]);
        let result = Sma::new(1, PriceSource::Close).compute(&series);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_nan_propagation() {
        let series = make_series(&[10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0]);
        let result = Sma::new(3, PriceSource::Close).compute(&series);
        // Windows touching index 2 are undefined
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        // Index 5 window [13,14,15] → 14.0
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_name_and_lookback() {
        let sma = Sma::new(30, PriceSource::Close);
        assert_eq!(sma.name(), "sma_30_close");
        assert_eq!(sma.lookback(), 29);
        assert_eq!(Sma::new(30, PriceSource::Open).name(), "sma_30_open");
        assert_eq!(Sma::new(1, PriceSource::Close).lookback(), 0);
    }

    #[test]
    fn sma_too_few_candles() {
        let series = make_series(&[10.0, 11.0]);
        let result = Sma::new(5, PriceSource::Close).compute(&series);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn sma_of_series_skips_leading_nan() {
        let values = [f64::NAN, f64::NAN, 3.0, 6.0, 9.0];
        let result = sma_of_series(&values, 2);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_approx(result[3], 4.5, DEFAULT_EPSILON);
        assert_approx(result[4], 7.5, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_of_series_matches_indicator() {
        let series = make_series(&[10.0, 11.5, 12.0, 9.0, 14.0, 15.0]);
        let indicator = Sma::new(3, PriceSource::Close).compute(&series);
        let direct = sma_of_series(&series.closes(), 3);
        for (a, b) in indicator.iter().zip(&direct) {
            if a.is_nan() {
                assert!(b.is_nan());
            } else {
                assert_approx(*a, *b, 1e-9);
            }
        }
    }

    #[test]
    #[should_panic(expected = "SMA period must be >= 1")]
    fn sma_rejects_zero_period() {
        Sma::new(0, PriceSource::Close);
    }
}
