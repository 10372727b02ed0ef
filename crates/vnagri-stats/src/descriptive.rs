//! Descriptive statistics over price sequences.

use std::collections::HashMap;

use vnagri_model::StatSummary;

use crate::error::{Result, StatsError};

pub(crate) fn check_values(values: &[f64], context: &str) -> Result<()> {
    if values.is_empty() {
        return Err(StatsError::empty(context));
    }
    if let Some(bad) = values.iter().find(|value| !value.is_finite()) {
        return Err(StatsError::invalid(format!(
            "{context} contains a non-finite value ({bad})"
        )));
    }
    Ok(())
}

pub(crate) fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Quantile of already-sorted values, interpolating linearly between the
/// closest ranks: position `(n - 1) * q`.
pub(crate) fn sorted_quantile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let position = (sorted.len() - 1) as f64 * q;
    let below = position.floor() as usize;
    let above = position.ceil() as usize;
    let fraction = position - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * fraction
}

/// `q`-th quantile (0.0..=1.0) with linear interpolation.
pub fn quantile(values: &[f64], q: f64) -> Result<f64> {
    check_values(values, "quantile input")?;
    if !(0.0..=1.0).contains(&q) {
        return Err(StatsError::invalid(format!(
            "quantile must be within 0..=1, got {q}"
        )));
    }
    Ok(sorted_quantile(&sorted(values), q))
}

/// Every value sharing the highest frequency, in order of first appearance.
pub fn multimode(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<(f64, usize)> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();
    for &value in values {
        // Fold -0.0 into 0.0 so both count as one value.
        let value = if value == 0.0 { 0.0 } else { value };
        match index.get(&value.to_bits()) {
            Some(&slot) => order[slot].1 += 1,
            None => {
                index.insert(value.to_bits(), order.len());
                order.push((value, 1));
            }
        }
    }
    let best = order.iter().map(|(_, count)| *count).max().unwrap_or(0);
    order
        .into_iter()
        .filter(|(_, count)| *count == best)
        .map(|(value, _)| value)
        .collect()
}

/// Summarize a non-empty sequence of finite values.
///
/// Mean, variance and standard deviation are population statistics
/// (denominator N); the median averages the two middle values for even N.
pub fn compute_stats(values: &[f64]) -> Result<StatSummary> {
    check_values(values, "statistics input")?;
    let sorted = sorted(values);
    let count = values.len();
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|value| {
            let delta = value - mean;
            delta * delta
        })
        .sum::<f64>()
        / n;

    Ok(StatSummary {
        count,
        min: sorted[0],
        max: sorted[count - 1],
        mean,
        median: sorted_quantile(&sorted, 0.5),
        mode: multimode(values),
        std_dev: variance.sqrt(),
        variance,
    })
}
