//! Chart descriptions combining a dataset, a title and summary statistics.
//!
//! Each [ChartKind] selects the store query that feeds it. Drawing is left to the charting library
//! in the browser.

use crate::buckets::Distribution;
use crate::error::QuakeVizError;
use crate::models::MagnitudeDepth;
use crate::stats::{DistributionSummary, ScatterSummary, StatItem};
use crate::store::QuakeStore;

use serde::Serialize;
use std::str::FromStr;
use strum_macros::Display;

/// Supported charts
#[derive(Clone, Copy, Debug, Display, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ChartKind {
    /// Pie chart of the magnitude distribution
    Pie,
    /// Bar chart of the magnitude distribution
    Bar,
    /// Scatter plot of magnitude against depth
    Scatter,
    /// Bar chart of the depth distribution
    DepthBar,
}

impl ChartKind {
    /// Every chart kind, in menu order.
    pub const ALL: [ChartKind; 4] = [Self::Pie, Self::Bar, Self::Scatter, Self::DepthBar];

    /// Returns the chart title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Pie | Self::Bar => "Earthquake Magnitude Distribution",
            Self::Scatter => "Earthquake Magnitude vs Depth",
            Self::DepthBar => "Earthquake Depth Distribution",
        }
    }
}

impl FromStr for ChartKind {
    type Err = QuakeVizError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.to_string() == name)
            .ok_or_else(|| QuakeVizError::UnsupportedChart {
                kind: name.to_string(),
            })
    }
}

/// Data plotted by a chart.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChartData {
    /// Counts per range, for pie and bar charts
    Distribution(Distribution),
    /// Points, for scatter plots
    Points(Vec<MagnitudeDepth>),
}

/// A chart ready to be drawn.
#[derive(Debug, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: &'static str,
    pub data: ChartData,
    pub stats: Vec<StatItem>,
}

/// Fetch the data for a chart and summarise it.
///
/// # Arguments
///
/// * `store`: Store to query
/// * `kind`: Chart to build
/// * `limit`: Maximum number of points. Only used by scatter plots.
pub async fn build_chart(
    store: &dyn QuakeStore,
    kind: ChartKind,
    limit: u32,
) -> Result<Chart, QuakeVizError> {
    let (data, stats) = match kind {
        ChartKind::Pie | ChartKind::Bar => {
            let distribution = store.magnitude_distribution().await?;
            let stats = DistributionSummary::from(&distribution).items();
            (ChartData::Distribution(distribution), stats)
        }
        ChartKind::DepthBar => {
            let distribution = store.depth_distribution().await?;
            let stats = DistributionSummary::from(&distribution).items();
            (ChartData::Distribution(distribution), stats)
        }
        ChartKind::Scatter => {
            let points = store.magnitude_vs_depth(limit).await?;
            let stats = ScatterSummary::from_points(&points).items();
            (ChartData::Points(points), stats)
        }
    };
    Ok(Chart {
        kind,
        title: kind.title(),
        data,
        stats,
    })
}
