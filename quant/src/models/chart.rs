use serde::{Deserialize, Serialize};

/// One numeric series aligned by index with the owning chart's labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<f64>,
}

/// Category labels plus one or more series of values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartSeries {
    pub fn new(labels: Vec<String>, series: Vec<Series>) -> Self {
        Self { labels, series }
    }

    /// A chart with no labels or no data points renders as the empty state.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.series.iter().all(|s| s.data.is_empty())
    }

    /// The first series, which single-series projections draw from.
    pub fn primary(&self) -> Option<&Series> {
        self.series.first()
    }

    /// Pairs of (label, value) for the given series, truncated to the shorter
    /// of the two sequences.
    pub fn points<'a>(&'a self, series: &'a Series) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(series.data.iter().copied())
    }
}
