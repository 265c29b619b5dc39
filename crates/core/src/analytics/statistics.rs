use std::collections::BTreeMap;
use std::str::FromStr;

/// Statistic name -> value, in name order.
pub type Statistics = BTreeMap<String, f64>;

/// A calculation a caller can request by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Calculation {
    Mean,
    Median,
    Std,
    Min,
    Max,
    Range,
    Volatility,
    Trend,
}

impl Calculation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Calculation::Mean => "mean",
            Calculation::Median => "median",
            Calculation::Std => "std",
            Calculation::Min => "min",
            Calculation::Max => "max",
            Calculation::Range => "range",
            Calculation::Volatility => "volatility",
            Calculation::Trend => "trend",
        }
    }

    /// Parse a list of names, dropping the ones that are not calculations.
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Vec<Calculation> {
        let mut calculations: Vec<Calculation> = Vec::new();
        for name in names {
            if let Ok(calculation) = name.as_ref().parse::<Calculation>() {
                if !calculations.contains(&calculation) {
                    calculations.push(calculation);
                }
            }
        }
        calculations
    }
}

impl FromStr for Calculation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Calculation::Mean),
            "median" => Ok(Calculation::Median),
            "std" => Ok(Calculation::Std),
            "min" => Ok(Calculation::Min),
            "max" => Ok(Calculation::Max),
            "range" => Ok(Calculation::Range),
            "volatility" => Ok(Calculation::Volatility),
            "trend" => Ok(Calculation::Trend),
            other => Err(format!("Unknown calculation: {}", other)),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Population standard deviation.
fn population_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Compute the requested statistics.
///
/// `trend` is not a statistic and is ignored here, as are unknown names.
/// An empty input yields an empty map; `volatility` needs two points.
pub fn summarize(values: &[f64], calculations: &[Calculation]) -> Statistics {
    let mut statistics = Statistics::new();
    if values.is_empty() {
        return statistics;
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    for calculation in calculations {
        let value = match calculation {
            Calculation::Mean => mean(values),
            Calculation::Median => median(values),
            Calculation::Std => population_std(values),
            Calculation::Min => min,
            Calculation::Max => max,
            Calculation::Range => max - min,
            Calculation::Volatility => {
                if values.len() < 2 {
                    continue;
                }
                let changes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
                population_std(&changes)
            }
            Calculation::Trend => continue,
        };
        statistics.insert(calculation.as_str().to_string(), value);
    }

    statistics
}
