//! Summary statistics over present observations

/// Central tendency used for a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Center {
    Mean,
    Median,
}

/// Center and population standard deviation of a set of observations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub center: f64,
    pub std: f64,
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median; an even count averages the two middle values
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Population standard deviation (divides by n), taken about the mean
pub fn population_std(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Summarize observations; `None` when there are none
pub fn summarize(values: &[f64], center: Center) -> Option<Summary> {
    let center = match center {
        Center::Mean => mean(values)?,
        Center::Median => median(values)?,
    };
    Some(Summary {
        center,
        std: population_std(values)?,
    })
}
