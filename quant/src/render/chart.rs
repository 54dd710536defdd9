use super::sanitize::strip_controls;
use crate::models::{ChartSeries, Series};

const BAR_WIDTH: usize = 32;
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
    Doughnut,
}

impl ChartKind {
    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Bar => "Engagement Distribution",
            ChartKind::Pie => "Content Distribution",
            ChartKind::Line => "Trend Analysis",
            ChartKind::Doughnut => "Content Share",
        }
    }
}

/// One chart form derived from a [`ChartSeries`]. The bar chart keeps every
/// series; the other forms draw only the first one.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartProjection {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartProjection {
    fn new(kind: ChartKind, source: &ChartSeries) -> Self {
        let series = match kind {
            ChartKind::Bar => source.series.clone(),
            _ => source.primary().cloned().into_iter().collect(),
        };
        Self {
            kind,
            labels: source.labels.iter().map(|l| strip_controls(l)).collect(),
            series: series
                .into_iter()
                .map(|s| Series {
                    label: s.label.as_deref().map(strip_controls),
                    data: s.data,
                })
                .collect(),
        }
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    /// (label, value) pairs of the first series.
    pub fn points(&self) -> Vec<(String, f64)> {
        match self.series.first() {
            Some(series) => self
                .labels
                .iter()
                .cloned()
                .zip(series.data.iter().copied())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Percentage share of each point in the first series. Negative and
    /// non-finite values count as zero.
    pub fn shares(&self) -> Vec<f64> {
        let values: Vec<f64> = self.points().into_iter().map(|(_, v)| drawable(v)).collect();
        let total: f64 = values.iter().sum();
        if total <= 0.0 {
            return vec![0.0; values.len()];
        }
        values.iter().map(|v| v / total * 100.0).collect()
    }

    /// Plain text drawing, one entry per line.
    pub fn draw(&self) -> Vec<String> {
        let points = self.points();
        if points.is_empty() {
            return vec!["(no data)".to_string()];
        }
        let label_width = points.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);

        match self.kind {
            ChartKind::Bar => self.draw_bars(label_width),
            ChartKind::Line => {
                let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
                let first = points.first().map(|(l, _)| l.as_str()).unwrap_or_default();
                let last = points.last().map(|(l, _)| l.as_str()).unwrap_or_default();
                vec![sparkline(&values), format!("{first} → {last}")]
            }
            ChartKind::Pie | ChartKind::Doughnut => {
                let glyph = if self.kind == ChartKind::Pie { '●' } else { '○' };
                points
                    .iter()
                    .zip(self.shares())
                    .map(|((label, value), share)| {
                        let cells = (share / 100.0 * BAR_WIDTH as f64).round() as usize;
                        format!(
                            "{label:<label_width$} {} {share:.1}% ({})",
                            glyph.to_string().repeat(cells.max(1)),
                            format_value(*value)
                        )
                    })
                    .collect()
            }
        }
    }

    fn draw_bars(&self, label_width: usize) -> Vec<String> {
        let max = self
            .series
            .iter()
            .flat_map(|s| s.data.iter().copied())
            .map(drawable)
            .fold(0.0_f64, f64::max);

        let mut lines = Vec::new();
        for (index, series) in self.series.iter().enumerate() {
            if self.series.len() > 1 {
                let name = series
                    .label
                    .clone()
                    .unwrap_or_else(|| format!("Series {}", index + 1));
                lines.push(format!("[{name}]"));
            }
            for (label, value) in self.labels.iter().zip(series.data.iter().copied()) {
                let cells = if max > 0.0 {
                    (drawable(value) / max * BAR_WIDTH as f64).round() as usize
                } else {
                    0
                };
                lines.push(format!(
                    "{label:<label_width$} │{} {}",
                    "█".repeat(cells),
                    format_value(value)
                ));
            }
        }
        lines
    }
}

/// The four chart forms for one visualization, all taken from the same
/// labels and series.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    pub bar: ChartProjection,
    pub pie: ChartProjection,
    pub line: ChartProjection,
    pub doughnut: ChartProjection,
}

impl ChartSet {
    /// `None` for an empty chart.
    pub fn project(source: &ChartSeries) -> Option<Self> {
        if source.is_empty() {
            return None;
        }
        Some(Self {
            bar: ChartProjection::new(ChartKind::Bar, source),
            pie: ChartProjection::new(ChartKind::Pie, source),
            line: ChartProjection::new(ChartKind::Line, source),
            doughnut: ChartProjection::new(ChartKind::Doughnut, source),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChartProjection> {
        [&self.bar, &self.pie, &self.line, &self.doughnut].into_iter()
    }

    /// Uncoloured drawing of every form, titles included.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        for chart in self.iter() {
            lines.push(chart.title().to_string());
            lines.extend(chart.draw().into_iter().map(|line| format!("  {line}")));
        }
        lines.join("\n")
    }
}

fn drawable(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn sparkline(values: &[f64]) -> String {
    let values: Vec<f64> = values.iter().copied().map(drawable).collect();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let top = SPARK_LEVELS.len() - 1;

    values
        .iter()
        .map(|v| {
            if span <= 0.0 {
                SPARK_LEVELS[top / 2]
            } else {
                SPARK_LEVELS[((v - min) / span * top as f64).round() as usize]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chart(labels: &[&str], series: &[&[f64]]) -> ChartSeries {
        ChartSeries::new(
            labels.iter().map(|l| l.to_string()).collect(),
            series
                .iter()
                .map(|data| Series {
                    label: None,
                    data: data.to_vec(),
                })
                .collect(),
        )
    }

    #[test]
    fn all_projections_share_one_source() {
        let set = ChartSet::project(&chart(&["A", "B"], &[&[10.0, 30.0]])).expect("chart set");
        let expected = vec![("A".to_string(), 10.0), ("B".to_string(), 30.0)];

        for projection in set.iter() {
            assert_eq!(projection.points(), expected, "{}", projection.title());
        }
        assert_eq!(set.pie.shares(), vec![25.0, 75.0]);
        assert_eq!(set.doughnut.shares(), set.pie.shares());
    }

    #[test]
    fn titles_per_form() {
        let set = ChartSet::project(&chart(&["A"], &[&[1.0]])).expect("chart set");
        let titles: Vec<_> = set.iter().map(ChartProjection::title).collect();
        assert_eq!(
            titles,
            vec![
                "Engagement Distribution",
                "Content Distribution",
                "Trend Analysis",
                "Content Share"
            ]
        );
    }

    #[test]
    fn bar_keeps_every_series_others_use_first() {
        let set =
            ChartSet::project(&chart(&["A", "B"], &[&[1.0, 2.0], &[3.0, 4.0]])).expect("chart set");
        assert_eq!(set.bar.series.len(), 2);
        assert_eq!(set.line.series.len(), 1);
        assert_eq!(set.pie.series[0].data, vec![1.0, 2.0]);
    }

    #[test]
    fn empty_source_has_no_projection() {
        assert!(ChartSet::project(&ChartSeries::default()).is_none());
        assert!(ChartSet::project(&chart(&["A"], &[&[]])).is_none());
    }

    #[test]
    fn zero_total_shares_are_zero() {
        let set = ChartSet::project(&chart(&["A", "B"], &[&[0.0, 0.0]])).expect("chart set");
        assert_eq!(set.pie.shares(), vec![0.0, 0.0]);
    }

    #[test]
    fn bar_drawing_scales_to_max() {
        let set = ChartSet::project(&chart(&["A", "B"], &[&[16.0, 32.0]])).expect("chart set");
        let lines = set.bar.draw();
        assert_eq!(lines[0], format!("A │{} 16", "█".repeat(16)));
        assert_eq!(lines[1], format!("B │{} 32", "█".repeat(32)));
    }

    #[test]
    fn plain_text_lists_every_form() {
        let set = ChartSet::project(&chart(&["A", "B"], &[&[16.0, 32.0]])).expect("chart set");
        let text = set.plain_text();

        let titles: Vec<_> = text.lines().filter(|l| !l.starts_with(' ')).collect();
        assert_eq!(
            titles,
            vec![
                "Engagement Distribution",
                "Content Distribution",
                "Trend Analysis",
                "Content Share"
            ]
        );
        assert!(text.contains(&format!("  B │{} 32", "█".repeat(32))));
    }

    #[test]
    fn sparkline_spans_levels() {
        assert_eq!(sparkline(&[0.0, 7.0]), "▁█");
        assert_eq!(sparkline(&[5.0, 5.0]), "▄▄");
    }
}
