//! Per-item IQR outlier detection, removal and substitution.
//!
//! Fences are always computed from one item's own prices. Commodity prices
//! span several orders of magnitude, so a fence over the pooled distribution
//! would flag every cheap staple and every expensive specialty item.
//!
//! A row is an outlier when its price is below the configured floor, below
//! `q1 - k * iqr`, or above `q3 + k * iqr`.

use std::collections::HashMap;

use tracing::{debug, info, warn};
use vnagri_model::{ItemOutlierInfo, OutlierPolicy, OutlierThresholds, PriceRecord, PriceTable};

use crate::descriptive::{check_values, sorted, sorted_quantile};
use crate::error::{Result, StatsError};

/// Quartiles and fence of `values`, with `multiplier` times the IQR on each side.
pub fn compute_outlier_thresholds(values: &[f64], multiplier: f64) -> Result<OutlierThresholds> {
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(StatsError::invalid(format!(
            "iqr multiplier must be a non-negative finite number, got {multiplier}"
        )));
    }
    check_values(values, "fence input")?;
    let sorted = sorted(values);
    let q1 = sorted_quantile(&sorted, 0.25);
    let q3 = sorted_quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    Ok(OutlierThresholds {
        q1,
        q3,
        iqr,
        lower: q1 - multiplier * iqr,
        upper: q3 + multiplier * iqr,
    })
}

/// Outlier diagnostics of one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOutliers {
    /// Position of the item in first-appearance order.
    pub id: usize,
    pub name: String,
    pub info: ItemOutlierInfo,
}

/// Result of [`detect_outliers`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutlierDetection {
    /// One entry per distinct item, in first-appearance order.
    pub items: Vec<ItemOutliers>,
    /// Every row flagged by its own item's predicate, in table order.
    pub rows: Vec<PriceRecord>,
}

impl OutlierDetection {
    pub fn get(&self, item: &str) -> Option<&ItemOutlierInfo> {
        self.items
            .iter()
            .find(|entry| entry.name == item)
            .map(|entry| &entry.info)
    }

    pub fn flagged_items(&self) -> impl Iterator<Item = &ItemOutliers> {
        self.items.iter().filter(|entry| entry.info.has_outliers)
    }

    pub fn outlier_count(&self) -> usize {
        self.rows.len()
    }
}

/// Compute per-item fences and flag the rows that fall outside them.
pub fn detect_outliers(table: &PriceTable, policy: &OutlierPolicy) -> Result<OutlierDetection> {
    let total = table.len();
    let mut items = Vec::new();
    let mut fences: HashMap<&str, OutlierThresholds> = HashMap::new();

    for (id, name) in table.items().into_iter().enumerate() {
        let prices = table.item_prices(name);
        let thresholds = compute_outlier_thresholds(&prices, policy.iqr_multiplier)?;
        let outlier_count = prices
            .iter()
            .filter(|price| thresholds.is_outlier(**price, policy.price_floor))
            .count();
        fences.insert(name, thresholds);
        items.push(ItemOutliers {
            id,
            name: name.to_string(),
            info: ItemOutlierInfo {
                q1: thresholds.q1,
                q3: thresholds.q3,
                iqr: thresholds.iqr,
                min_threshold: thresholds.lower,
                max_threshold: thresholds.upper,
                has_outliers: outlier_count > 0,
                outlier_count,
                outlier_fraction: outlier_count as f64 / total as f64,
                item_outlier_fraction: outlier_count as f64 / prices.len() as f64,
            },
        });
    }

    let rows: Vec<PriceRecord> = table
        .records
        .iter()
        .filter(|record| {
            fences
                .get(record.item_name.as_str())
                .is_some_and(|fence| fence.is_outlier(record.price, policy.price_floor))
        })
        .cloned()
        .collect();

    debug!(
        items = items.len(),
        flagged_items = items.iter().filter(|entry| entry.info.has_outliers).count(),
        outlier_rows = rows.len(),
        "detected outliers"
    );
    Ok(OutlierDetection { items, rows })
}

/// Rows of `item` matching the outlier predicate for the given fence.
pub fn outlier_rows<'a>(
    table: &'a PriceTable,
    item: &'a str,
    lower: f64,
    upper: f64,
    price_floor: f64,
) -> impl Iterator<Item = &'a PriceRecord> {
    table
        .item_records(item)
        .filter(move |record| is_outside(record.price, lower, upper, price_floor))
}

fn is_outside(price: f64, lower: f64, upper: f64, price_floor: f64) -> bool {
    price < price_floor || price < lower || price > upper
}

/// One removal pass: recompute fences, then drop every row of a flagged item
/// priced below `max(floor, lower)` or above `upper`.
pub fn remove_outliers_once(table: &PriceTable, policy: &OutlierPolicy) -> Result<PriceTable> {
    let detection = detect_outliers(table, policy)?;
    let bounds: HashMap<&str, (f64, f64)> = detection
        .flagged_items()
        .map(|entry| {
            let fence = entry.info.thresholds();
            (
                entry.name.as_str(),
                (fence.removal_floor(policy.price_floor), fence.upper),
            )
        })
        .collect();

    let kept: Vec<PriceRecord> = table
        .records
        .iter()
        .filter(|record| match bounds.get(record.item_name.as_str()) {
            Some(&(low, high)) => !(record.price < low || record.price > high),
            None => true,
        })
        .cloned()
        .collect();
    Ok(table.with_records(kept))
}

/// Remove outliers until no item has any left.
///
/// Fences are recomputed from the remaining rows after each pass, which can
/// flag rows the previous fence accepted; passes repeat until one removes
/// nothing, so applying this to its own output is a no-op. The input table is
/// left untouched.
pub fn remove_outliers(table: &PriceTable, policy: &OutlierPolicy) -> Result<PriceTable> {
    let mut current = remove_outliers_once(table, policy)?;
    let mut passes = 1usize;
    loop {
        let next = remove_outliers_once(&current, policy)?;
        if next.len() == current.len() {
            break;
        }
        current = next;
        passes += 1;
    }
    info!(
        before = table.len(),
        after = current.len(),
        removed = table.len() - current.len(),
        passes,
        "removed outliers"
    );
    Ok(current)
}

/// How flagged prices are rewritten.
pub enum Replacement<'a> {
    /// Every flagged price becomes this value.
    Constant(f64),
    /// Every flagged price is mapped through this function.
    Mapping(&'a dyn Fn(f64) -> f64),
}

impl std::fmt::Debug for Replacement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Mapping(_) => f.debug_tuple("Mapping").field(&"<fn>").finish(),
        }
    }
}

impl<'a> Replacement<'a> {
    /// Build a replacement from optional parts; exactly one must be given.
    pub fn from_parts(
        constant: Option<f64>,
        mapping: Option<&'a dyn Fn(f64) -> f64>,
    ) -> Result<Self> {
        match (constant, mapping) {
            (Some(value), None) => Ok(Self::Constant(value)),
            (None, Some(mapping)) => Ok(Self::Mapping(mapping)),
            (Some(_), Some(_)) => Err(StatsError::invalid(
                "replacement takes either a constant or a mapping, not both",
            )),
            (None, None) => Err(StatsError::invalid(
                "replacement needs a constant or a mapping",
            )),
        }
    }

    fn apply(&self, price: f64) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Mapping(mapping) => mapping(price),
        }
    }
}

fn substitute(
    table: &PriceTable,
    item: &str,
    lower: f64,
    upper: f64,
    replacement: &Replacement<'_>,
    price_floor: f64,
) -> Result<(PriceTable, usize)> {
    if !lower.is_finite() || !upper.is_finite() || lower > upper {
        return Err(StatsError::invalid(format!(
            "fence [{lower}, {upper}] is not a finite, ordered range"
        )));
    }
    if let Replacement::Constant(value) = replacement
        && !value.is_finite()
    {
        return Err(StatsError::invalid(format!(
            "replacement value must be finite, got {value}"
        )));
    }

    let mut changed = 0usize;
    let records = table
        .records
        .iter()
        .map(|record| {
            let mut record = record.clone();
            if record.item_name == item && is_outside(record.price, lower, upper, price_floor) {
                let replaced = replacement.apply(record.price);
                if !replaced.is_finite() {
                    return Err(StatsError::invalid(format!(
                        "replacement for price {} of {item} is not finite: {replaced}",
                        record.price
                    )));
                }
                record.price = replaced;
                changed += 1;
            }
            Ok(record)
        })
        .collect::<Result<Vec<_>>>()?;
    if changed == 0 {
        warn!(item, "no outlier rows to substitute");
    }
    Ok((table.with_records(records), changed))
}

/// Rewrite the flagged prices of one item and return the new table.
///
/// Only rows of `item` matching the outlier predicate (floor included) are
/// touched; the input table is not modified.
///
/// Fails with [`StatsError::InvalidArgument`] when the fence is not a finite
/// ordered range, or when the replacement yields a non-finite price.
pub fn substitute_outliers(
    table: &PriceTable,
    item: &str,
    lower: f64,
    upper: f64,
    replacement: &Replacement<'_>,
    price_floor: f64,
) -> Result<PriceTable> {
    substitute(table, item, lower, upper, replacement, price_floor).map(|(table, _)| table)
}

/// In-place form of [`substitute_outliers`]: replaces `table` with the
/// rewritten one and returns how many rows changed.
pub fn adopt_substitution(
    table: &mut PriceTable,
    item: &str,
    lower: f64,
    upper: f64,
    replacement: &Replacement<'_>,
    price_floor: f64,
) -> Result<usize> {
    let (updated, changed) = substitute(table, item, lower, upper, replacement, price_floor)?;
    *table = updated;
    debug!(item, changed, "adopted substituted table");
    Ok(changed)
}
