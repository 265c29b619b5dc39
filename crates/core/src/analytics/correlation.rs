use std::collections::BTreeMap;

use chrono::NaiveDate;
use econdata_providers::DataPoint;
use serde::Serialize;

use super::AnalyticsError;

const MIN_OVERLAP: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CorrelationStrength {
    #[serde(rename = "strong")]
    Strong,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "weak")]
    Weak,
    #[serde(rename = "very weak")]
    VeryWeak,
}

impl CorrelationStrength {
    fn from_coefficient(r: f64) -> Self {
        match r.abs() {
            a if a >= 0.7 => Self::Strong,
            a if a >= 0.4 => Self::Moderate,
            a if a >= 0.2 => Self::Weak,
            _ => Self::VeryWeak,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Weak => "weak",
            Self::VeryWeak => "very weak",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationDirection {
    Positive,
    Negative,
    None,
}

impl CorrelationDirection {
    fn from_coefficient(r: f64) -> Self {
        if r > 0.0 {
            Self::Positive
        } else if r < 0.0 {
            Self::Negative
        } else {
            Self::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::None => "none",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Correlation {
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
    /// Number of shared dates the coefficient was computed over
    pub data_points: usize,
}

impl Correlation {
    /// e.g. "Strong negative correlation"
    pub fn description(&self) -> String {
        let strength = self.strength.as_str();
        let mut chars = strength.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!("{} {} correlation", capitalized, self.direction.as_str())
    }
}

/// Pearson correlation of two series over the dates they share.
///
/// Points are joined on exact date. The coefficient is 0 when either side
/// has no variance over the shared dates.
pub fn correlate(a: &[DataPoint], b: &[DataPoint]) -> Result<Correlation, AnalyticsError> {
    let left: BTreeMap<NaiveDate, f64> = a.iter().map(|p| (p.date, p.value)).collect();
    let right: BTreeMap<NaiveDate, f64> = b.iter().map(|p| (p.date, p.value)).collect();
    let pairs: Vec<(f64, f64)> = left
        .iter()
        .filter_map(|(date, x)| right.get(date).map(|y| (*x, *y)))
        .collect();

    let n = pairs.len();
    if n < MIN_OVERLAP {
        return Err(AnalyticsError::InsufficientData {
            operation: "correlation",
            required: MIN_OVERLAP,
            actual: n,
        });
    }

    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n as f64;

    let (mut covariance, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = var_x.sqrt() * var_y.sqrt();
    let coefficient = if denominator == 0.0 {
        0.0
    } else {
        (covariance / denominator).clamp(-1.0, 1.0)
    };

    Ok(Correlation {
        coefficient,
        strength: CorrelationStrength::from_coefficient(coefficient),
        direction: CorrelationDirection::from_coefficient(coefficient),
        data_points: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(values: &[(i32, f64)]) -> Vec<DataPoint> {
        values
            .iter()
            .map(|(year, v)| DataPoint::new(NaiveDate::from_ymd_opt(*year, 1, 1).unwrap(), *v))
            .collect()
    }

    #[test]
    fn test_perfect_negative_correlation() {
        let a = points(&[(2020, 1.0), (2021, 2.0), (2022, 3.0)]);
        let b = points(&[(2020, 6.0), (2021, 4.0), (2022, 2.0)]);

        let result = correlate(&a, &b).unwrap();

        assert!((result.coefficient + 1.0).abs() < 1e-12);
        assert_eq!(result.strength, CorrelationStrength::Strong);
        assert_eq!(result.direction, CorrelationDirection::Negative);
        assert_eq!(result.description(), "Strong negative correlation");
    }

    #[test]
    fn test_joins_on_exact_date() {
        let a = points(&[(2019, 100.0), (2020, 1.0), (2021, 2.0), (2022, 3.0)]);
        let b = points(&[(2020, 2.0), (2021, 4.0), (2022, 6.0), (2023, -50.0)]);

        let result = correlate(&a, &b).unwrap();

        assert_eq!(result.data_points, 3);
        assert!((result.coefficient - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_variance_gives_zero() {
        let a = points(&[(2020, 5.0), (2021, 5.0), (2022, 5.0)]);
        let b = points(&[(2020, 1.0), (2021, 2.0), (2022, 3.0)]);

        let result = correlate(&a, &b).unwrap();

        assert_eq!(result.coefficient, 0.0);
        assert_eq!(result.strength, CorrelationStrength::VeryWeak);
        assert_eq!(result.direction, CorrelationDirection::None);
        assert_eq!(result.description(), "Very weak none correlation");
    }

    #[test]
    fn test_needs_two_shared_dates() {
        let a = points(&[(2020, 1.0), (2021, 2.0)]);
        let b = points(&[(2021, 1.0), (2022, 2.0)]);

        assert!(matches!(
            correlate(&a, &b),
            Err(AnalyticsError::InsufficientData { actual: 1, .. })
        ));
    }

    #[test]
    fn test_strength_buckets() {
        assert_eq!(CorrelationStrength::from_coefficient(0.7), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::from_coefficient(-0.5), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::from_coefficient(0.2), CorrelationStrength::Weak);
        assert_eq!(CorrelationStrength::from_coefficient(0.19), CorrelationStrength::VeryWeak);
    }
}
