use serde::Serialize;

use super::AnalyticsError;

const MIN_TREND_POINTS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Least-squares fit of value against index position.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub direction: TrendDirection,
}

/// Fit `value = slope * index + intercept` over the series.
///
/// Returns `Ok(None)` when the index variance is zero, which cannot happen
/// with three or more points. `r_squared` is 0 for a constant series.
pub fn trend(values: &[f64]) -> Result<Option<TrendAnalysis>, AnalyticsError> {
    let n = values.len();
    if n < MIN_TREND_POINTS {
        return Err(AnalyticsError::InsufficientData {
            operation: "trend",
            required: MIN_TREND_POINTS,
            actual: n,
        });
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = values.iter().sum::<f64>() / n as f64;

    let (numerator, denominator) = values.iter().enumerate().fold((0.0, 0.0), |(num, den), (i, y)| {
        let dx = i as f64 - x_mean;
        (num + dx * (y - y_mean), den + dx * dx)
    });
    if denominator == 0.0 {
        return Ok(None);
    }

    let slope = numerator / denominator;
    let intercept = y_mean - slope * x_mean;

    let ss_tot: f64 = values.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = values
        .iter()
        .enumerate()
        .map(|(i, y)| (y - (slope * i as f64 + intercept)).powi(2))
        .sum();
    let r_squared = if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot };

    let direction = if slope > 0.0 {
        TrendDirection::Increasing
    } else if slope < 0.0 {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    Ok(Some(TrendAnalysis {
        slope,
        intercept,
        r_squared,
        direction,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_line() {
        let fit = trend(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap().unwrap();

        assert!((fit.slope - 1.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(fit.direction, TrendDirection::Increasing);
    }

    #[test]
    fn test_decreasing_noisy_series() {
        let fit = trend(&[10.0, 8.5, 9.0, 6.0, 5.5]).unwrap().unwrap();

        assert!(fit.slope < 0.0);
        assert!(fit.r_squared > 0.0 && fit.r_squared < 1.0);
        assert_eq!(fit.direction, TrendDirection::Decreasing);
    }

    #[test]
    fn test_constant_series_is_stable() {
        let fit = trend(&[3.0, 3.0, 3.0]).unwrap().unwrap();

        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 3.0);
        assert_eq!(fit.r_squared, 0.0);
        assert_eq!(fit.direction, TrendDirection::Stable);
    }

    #[test]
    fn test_needs_three_points() {
        assert_eq!(
            trend(&[1.0, 2.0]),
            Err(AnalyticsError::InsufficientData {
                operation: "trend",
                required: 3,
                actual: 2,
            })
        );
    }
}
