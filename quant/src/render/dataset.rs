use super::chart::sparkline;
use super::sanitize::strip_controls;
use super::theme::Theme;
use crate::models::ProfileDataset;

/// Number of most recent posts shown in the comments chart.
const RECENT_POSTS: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelChart {
    pub title: &'static str,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl PanelChart {
    pub fn draw(&self) -> String {
        if self.values.is_empty() {
            "(no posts)".to_string()
        } else {
            sparkline(&self.values)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePanel {
    pub display_name: String,
    pub handle: String,
    pub is_verified: bool,
    pub biography: Option<String>,
    pub external_url: Option<String>,
    pub primary: Vec<Metric>,
    pub details: Vec<Metric>,
    pub charts: Vec<PanelChart>,
    pub theme: Theme,
}

/// Compact count: `1.2K`, `3.4M`, or the plain number below a thousand.
pub fn format_number(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

pub fn render_profile(dataset: &ProfileDataset, theme: Theme) -> ProfilePanel {
    let profile = &dataset.profile;
    let metrics = dataset.metrics();
    let per_post = dataset.post_metrics();

    let display_name = if profile.display_name.trim().is_empty() {
        strip_controls(&profile.handle)
    } else {
        strip_controls(&profile.display_name)
    };

    let primary = vec![
        Metric {
            label: "Total Followers",
            value: format_number(profile.followers_count as f64),
        },
        Metric {
            label: "Average Likes",
            value: format_number(metrics.avg_likes),
        },
        Metric {
            label: "Average Comments",
            value: format_number(metrics.avg_comments),
        },
        Metric {
            label: "Engagement Rate",
            value: metrics
                .engagement_rate
                .map(|rate| format!("{rate:.2}%"))
                .unwrap_or_else(|| "N/A".to_string()),
        },
    ];

    let details = vec![
        Metric {
            label: "Total Posts",
            value: format_number(profile.post_count as f64),
        },
        Metric {
            label: "Following",
            value: format_number(profile.following_count as f64),
        },
    ];

    let recent = &per_post[per_post.len().saturating_sub(RECENT_POSTS)..];
    let charts = vec![
        PanelChart {
            title: "Likes Trend",
            labels: per_post.iter().map(|p| p.date_label.clone()).collect(),
            values: per_post.iter().map(|p| p.likes as f64).collect(),
        },
        PanelChart {
            title: "Comments per Post",
            labels: recent.iter().map(|p| p.date_label.clone()).collect(),
            values: recent.iter().map(|p| p.comments as f64).collect(),
        },
        PanelChart {
            title: "Engagement Rate per Post",
            labels: per_post.iter().map(|p| p.date_label.clone()).collect(),
            values: per_post.iter().map(|p| p.engagement.unwrap_or(0.0)).collect(),
        },
    ];

    ProfilePanel {
        display_name,
        handle: strip_controls(&profile.handle),
        is_verified: profile.is_verified,
        biography: Some(strip_controls(profile.biography.trim())).filter(|b| !b.is_empty()),
        external_url: profile.external_url.as_deref().map(strip_controls),
        primary,
        details,
        charts,
        theme,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Post, Profile};

    fn dataset(posts: usize) -> ProfileDataset {
        ProfileDataset::new(
            Profile {
                handle: "nasa".to_string(),
                display_name: String::new(),
                is_verified: true,
                biography: "  Exploring the universe  ".to_string(),
                followers_count: 1_000,
                following_count: 77,
                post_count: 4_321,
                profile_url: None,
                external_url: None,
                business_category: None,
            },
            (0..posts)
                .map(|i| Post {
                    id: format!("p{i}"),
                    timestamp: None,
                    likes: 80,
                    comments: i as u64,
                    post_type: None,
                    shares: 0,
                    caption: None,
                    url: None,
                })
                .collect(),
        )
    }

    #[test]
    fn format_number_compacts() {
        assert_eq!(format_number(950.0), "950");
        assert_eq!(format_number(1_240.0), "1.2K");
        assert_eq!(format_number(1_500_000.0), "1.5M");
        assert_eq!(format_number(20.5), "20.5");
    }

    #[test]
    fn panel_header_and_metrics() {
        let panel = render_profile(&dataset(1), Theme::Dark);

        assert_eq!(panel.display_name, "nasa");
        assert_eq!(panel.biography.as_deref(), Some("Exploring the universe"));
        let labels: Vec<_> = panel.primary.iter().map(|m| m.label).collect();
        assert_eq!(
            labels,
            vec![
                "Total Followers",
                "Average Likes",
                "Average Comments",
                "Engagement Rate"
            ]
        );
        assert_eq!(panel.primary[0].value, "1.0K");
        assert_eq!(panel.primary[3].value, "8.00%");
        assert_eq!(panel.details[0].value, "4.3K");
    }

    #[test]
    fn comments_chart_keeps_last_seven_posts() {
        let panel = render_profile(&dataset(10), Theme::Light);
        let comments = &panel.charts[1];

        assert_eq!(comments.values, vec![3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(panel.charts[0].values.len(), 10);
    }

    #[test]
    fn profile_text_is_stripped_of_controls() {
        let mut data = dataset(1);
        data.profile.display_name = "Nasa\x1b[2J".to_string();
        data.profile.handle = "nasa\x07".to_string();
        data.profile.biography = "Space\x1b]52;c;aGk=\x07".to_string();
        data.profile.external_url = Some("https://nasa.gov\x1b[8m".to_string());

        let panel = render_profile(&data, Theme::Dark);

        assert_eq!(panel.display_name, "Nasa[2J");
        assert_eq!(panel.handle, "nasa");
        assert_eq!(panel.biography.as_deref(), Some("Space]52;c;aGk="));
        assert_eq!(panel.external_url.as_deref(), Some("https://nasa.gov[8m"));
    }

    #[test]
    fn empty_dataset_has_na_rate() {
        let panel = render_profile(&dataset(0), Theme::Dark);
        assert_eq!(panel.primary[3].value, "N/A");
        assert_eq!(panel.charts[0].draw(), "(no posts)");
    }
}
