//! Descriptive statistics shown alongside each chart.

use crate::buckets::Distribution;
use crate::models::MagnitudeDepth;

use ndarray::ArrayView1;
use ndarray_stats::QuantileExt;
use serde::Serialize;

/// A labelled, display-formatted statistic.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatItem {
    pub label: &'static str,
    pub value: String,
}

impl StatItem {
    fn new(label: &'static str, value: impl ToString) -> Self {
        Self {
            label,
            value: value.to_string(),
        }
    }
}

/// Summary of a [Distribution].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DistributionSummary {
    /// Sum of all counts
    pub total: u64,
    /// Number of ranges
    pub categories: usize,
    /// Label of the first range holding the highest count
    pub most_common: &'static str,
    /// Highest count of any range
    pub highest_count: u64,
}

impl From<&Distribution> for DistributionSummary {
    fn from(distribution: &Distribution) -> Self {
        let mut ranges = distribution.iter();
        // Range tables are never empty.
        let (mut most_common, mut highest_count) = ranges.next().unwrap_or(("", 0));
        for (label, count) in ranges {
            if count > highest_count {
                most_common = label;
                highest_count = count;
            }
        }
        Self {
            total: distribution.total(),
            categories: distribution.table().num_ranges(),
            most_common,
            highest_count,
        }
    }
}

impl DistributionSummary {
    /// Returns the summary as display items.
    pub fn items(&self) -> Vec<StatItem> {
        vec![
            StatItem::new("Total Earthquakes", self.total),
            StatItem::new("Categories", self.categories),
            StatItem::new("Most Common", self.most_common),
            StatItem::new("Highest Count", self.highest_count),
        ]
    }
}

/// Summary of a set of magnitude vs depth points.
///
/// NaN values are skipped. The averages and maxima of a column are absent when it has no other
/// values, so only when there are no points for data read from the store.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScatterSummary {
    pub points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_magnitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_magnitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_depth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<f64>,
}

impl ScatterSummary {
    /// Compute the summary of `points`.
    pub fn from_points(points: &[MagnitudeDepth]) -> Self {
        let magnitudes = skip_nan(points.iter().map(|p| p.magnitude));
        let depths = skip_nan(points.iter().map(|p| p.depth));
        let magnitudes = ArrayView1::from(&magnitudes[..]);
        let depths = ArrayView1::from(&depths[..]);
        Self {
            points: points.len(),
            avg_magnitude: magnitudes.mean(),
            max_magnitude: magnitudes.max().ok().copied(),
            avg_depth: depths.mean(),
            max_depth: depths.max().ok().copied(),
        }
    }

    /// Returns the summary as display items.
    pub fn items(&self) -> Vec<StatItem> {
        vec![
            StatItem::new("Data Points", self.points),
            StatItem::new("Avg Magnitude", format_value(self.avg_magnitude, "")),
            StatItem::new("Max Magnitude", format_value(self.max_magnitude, "")),
            StatItem::new("Avg Depth", format_value(self.avg_depth, " km")),
            StatItem::new("Max Depth", format_value(self.max_depth, " km")),
        ]
    }
}

fn skip_nan(values: impl Iterator<Item = f64>) -> Vec<f64> {
    values.filter(|value| !value.is_nan()).collect()
}

/// Format to two decimal places.
fn format_value(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(value) => format!("{:.2}{}", value, unit),
        None => "n/a".to_string(),
    }
}
