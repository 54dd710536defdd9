use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public profile summary for an analysed account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub handle: String,
    pub display_name: String,
    pub is_verified: bool,
    pub biography: String,
    pub followers_count: u64,
    pub following_count: u64,
    pub post_count: u64,
    pub profile_url: Option<String>,
    pub external_url: Option<String>,
    pub business_category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    /// `None` when the gateway sent a timestamp that could not be parsed.
    pub timestamp: Option<DateTime<Utc>>,
    pub likes: u64,
    pub comments: u64,
    pub post_type: Option<String>,
    pub shares: u64,
    pub caption: Option<String>,
    pub url: Option<String>,
}

/// Profile plus its most recent posts, as returned by the scrape job.
///
/// Only raw values live here. Everything derived from them is computed by
/// [`ProfileDataset::metrics`] and [`ProfileDataset::post_metrics`] on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDataset {
    pub profile: Profile,
    pub posts: Vec<Post>,
}

/// Aggregates across every post in a dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetMetrics {
    pub avg_likes: f64,
    pub avg_comments: f64,
    /// `(likes + comments) / (posts * followers) * 100`; `None` when either
    /// denominator is zero.
    pub engagement_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostMetrics {
    pub id: String,
    pub date_label: String,
    pub likes: u64,
    pub comments: u64,
    /// `(likes + comments) / followers * 100`; `None` without followers.
    pub engagement: Option<f64>,
}

impl ProfileDataset {
    pub fn new(profile: Profile, posts: Vec<Post>) -> Self {
        Self { profile, posts }
    }

    /// Saturates at `u64::MAX` rather than wrapping.
    pub fn total_likes(&self) -> u64 {
        self.posts.iter().map(|p| p.likes).fold(0, u64::saturating_add)
    }

    pub fn total_comments(&self) -> u64 {
        self.posts.iter().map(|p| p.comments).fold(0, u64::saturating_add)
    }

    pub fn metrics(&self) -> DatasetMetrics {
        let post_count = self.posts.len() as f64;
        let likes = self.total_likes() as f64;
        let comments = self.total_comments() as f64;
        let followers = self.profile.followers_count as f64;

        if self.posts.is_empty() {
            return DatasetMetrics {
                avg_likes: 0.0,
                avg_comments: 0.0,
                engagement_rate: None,
            };
        }

        let engagement_rate = if self.profile.followers_count == 0 {
            None
        } else {
            Some((likes + comments) / (post_count * followers) * 100.0)
        };

        DatasetMetrics {
            avg_likes: likes / post_count,
            avg_comments: comments / post_count,
            engagement_rate,
        }
    }

    pub fn post_metrics(&self) -> Vec<PostMetrics> {
        let followers = self.profile.followers_count;

        self.posts
            .iter()
            .map(|post| PostMetrics {
                id: post.id.clone(),
                date_label: post
                    .timestamp
                    .map(|ts| ts.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                likes: post.likes,
                comments: post.comments,
                engagement: (followers > 0).then(|| {
                    post.likes.saturating_add(post.comments) as f64 / followers as f64 * 100.0
                }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn profile(followers: u64) -> Profile {
        Profile {
            handle: "testaccount".to_string(),
            display_name: "Test Account".to_string(),
            is_verified: false,
            biography: String::new(),
            followers_count: followers,
            following_count: 10,
            post_count: 1,
            profile_url: None,
            external_url: None,
            business_category: None,
        }
    }

    fn post(id: &str, likes: u64, comments: u64) -> Post {
        Post {
            id: id.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 11, 20, 10, 0, 0).single(),
            likes,
            comments,
            post_type: None,
            shares: 0,
            caption: None,
            url: None,
        }
    }

    #[test]
    fn engagement_rate_for_single_post() {
        let dataset = ProfileDataset::new(profile(1000), vec![post("p1", 80, 20)]);
        let metrics = dataset.metrics();

        let rate = metrics.engagement_rate.expect("rate");
        assert!((rate - 10.0).abs() < 1e-9);
        assert_eq!(format!("{rate:.2}"), "10.00");
        assert_eq!(metrics.avg_likes, 80.0);
        assert_eq!(metrics.avg_comments, 20.0);
    }

    #[test]
    fn engagement_rate_averages_over_posts() {
        let dataset = ProfileDataset::new(
            profile(2000),
            vec![post("p1", 100, 0), post("p2", 200, 100)],
        );
        // (300 + 100) / (2 * 2000) * 100
        let rate = dataset.metrics().engagement_rate.expect("rate");
        assert!((rate - 10.0).abs() < 1e-9);
    }

    #[test]
    fn metrics_follow_the_current_posts() {
        let mut dataset = ProfileDataset::new(profile(1000), vec![post("p1", 80, 20)]);
        let before = dataset.metrics();

        dataset.posts.push(post("p2", 0, 0));
        let after = dataset.metrics();

        assert_ne!(before, after);
        assert!((after.engagement_rate.expect("rate") - 5.0).abs() < 1e-9);
    }

    #[test]
    fn zero_denominators_yield_no_rate() {
        let empty = ProfileDataset::new(profile(1000), Vec::new());
        assert_eq!(empty.metrics().engagement_rate, None);
        assert_eq!(empty.metrics().avg_likes, 0.0);

        let no_followers = ProfileDataset::new(profile(0), vec![post("p1", 5, 5)]);
        assert_eq!(no_followers.metrics().engagement_rate, None);
        assert_eq!(no_followers.post_metrics()[0].engagement, None);
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let max = i64::MAX as u64;
        let dataset = ProfileDataset::new(
            profile(1000),
            vec![post("p1", max, max), post("p2", max, 1), post("p3", max, 0)],
        );

        assert_eq!(dataset.total_likes(), u64::MAX);
        let metrics = dataset.metrics();
        assert!(metrics.avg_likes.is_finite());
        assert!(metrics.engagement_rate.expect("rate").is_finite());

        let per_post = dataset.post_metrics();
        assert_eq!(per_post.len(), 3);
        assert!(per_post[0].engagement.expect("engagement") > 0.0);
    }

    #[test]
    fn post_metrics_keep_post_order() {
        let dataset = ProfileDataset::new(
            profile(100),
            vec![post("first", 1, 1), post("second", 9, 1)],
        );
        let metrics = dataset.post_metrics();

        assert_eq!(metrics[0].id, "first");
        assert_eq!(metrics[1].id, "second");
        assert_eq!(metrics[0].date_label, "2024-11-20");
        assert!((metrics[1].engagement.expect("engagement") - 10.0).abs() < 1e-9);
    }
}
