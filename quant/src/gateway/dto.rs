//! Wire shapes for the analysis gateway.
//!
//! Request bodies serialize exactly as the gateway expects. Response bodies
//! are deserialized leniently (missing optional fields default) and then
//! converted into the domain types in [`crate::models`].

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{QuantError, Result};
use crate::models::{
    AnalyticalReply, ChartSeries, ConversationalReply, Post, Profile, ProfileDataset, Series,
};

/// Body for `POST /scrape-instagram`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeRequest {
    pub username: String,
    pub results_limit: u32,
}

/// Body for `POST /run-flow`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowRequest {
    pub message: String,
    pub clear_context: bool,
}

/// Body for `POST /analysis`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScrapeResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    profile_data: Option<ProfileDto>,
    #[serde(default)]
    posts_data: Vec<PostEnvelopeDto>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileDto {
    username: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    biography: String,
    #[serde(default)]
    followers_count: i64,
    #[serde(default)]
    following_count: i64,
    #[serde(default)]
    is_verified: bool,
    #[serde(default)]
    total_posts: i64,
    #[serde(default)]
    profile_url: Option<String>,
    #[serde(default)]
    external_url: Option<String>,
    #[serde(default)]
    business_category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostEnvelopeDto {
    post_id: String,
    post_data: PostDataDto,
}

#[derive(Debug, Deserialize)]
struct PostDataDto {
    // Hidden like counts come back as -1.
    #[serde(default)]
    likes: i64,
    #[serde(default)]
    comments: i64,
    #[serde(default)]
    shares: i64,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    post_type: Option<String>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    profile_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FlowResponse {
    message: FlowMessageDto,
}

#[derive(Debug, Deserialize)]
struct FlowMessageDto {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalysisResponse {
    #[serde(default)]
    analysis: Option<String>,
    #[serde(default)]
    visualization: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct VisualizationDto {
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    datasets: Vec<VisualizationDatasetDto>,
}

#[derive(Debug, Deserialize)]
struct VisualizationDatasetDto {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    data: Vec<f64>,
}

fn non_negative(value: i64) -> u64 {
    value.max(0) as u64
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse the timestamp formats the gateway has been seen to emit: RFC 3339,
/// or a naive `YYYY-MM-DD HH:MM:SS` (optionally suffixed with `UTC`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = raw.trim_end_matches("UTC").trim_end();
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .map(|dt| dt.and_utc())
}

impl ScrapeResponse {
    pub(crate) fn into_dataset(self) -> Result<ProfileDataset> {
        if self.success == Some(false) {
            return Err(QuantError::Gateway(
                self.error
                    .unwrap_or_else(|| "scrape job reported failure".to_string()),
            ));
        }

        let profile = self
            .profile_data
            .ok_or_else(|| QuantError::Shape("scrape response has no profile_data".to_string()))?;

        let posts = self
            .posts_data
            .into_iter()
            .map(|envelope| {
                let data = envelope.post_data;
                Post {
                    id: envelope.post_id,
                    timestamp: data.timestamp.as_deref().and_then(parse_timestamp),
                    likes: non_negative(data.likes),
                    comments: non_negative(data.comments),
                    post_type: non_empty(data.post_type),
                    shares: non_negative(data.shares),
                    caption: non_empty(data.caption),
                    url: non_empty(data.profile_url),
                }
            })
            .collect();

        Ok(ProfileDataset::new(
            Profile {
                handle: profile.username,
                display_name: profile.full_name,
                is_verified: profile.is_verified,
                biography: profile.biography,
                followers_count: non_negative(profile.followers_count),
                following_count: non_negative(profile.following_count),
                post_count: non_negative(profile.total_posts),
                profile_url: non_empty(profile.profile_url),
                external_url: non_empty(profile.external_url),
                business_category: non_empty(profile.business_category),
            },
            posts,
        ))
    }
}

impl From<FlowResponse> for ConversationalReply {
    fn from(response: FlowResponse) -> Self {
        let message = response.message;
        if message.text.is_none() {
            tracing::warn!("run-flow reply has no text field");
        }

        Self {
            text: message.text.unwrap_or_default(),
            timestamp: message.timestamp.as_deref().and_then(parse_timestamp),
        }
    }
}

impl From<AnalysisResponse> for AnalyticalReply {
    fn from(response: AnalysisResponse) -> Self {
        if response.analysis.is_none() {
            tracing::warn!("analysis reply has no analysis field");
        }

        Self {
            analysis: response.analysis.unwrap_or_default(),
            visualization: response.visualization.and_then(parse_visualization),
        }
    }
}

/// Convert a raw `visualization` payload into a chart. Anything that does not
/// match the expected shape is treated as "no chart".
fn parse_visualization(raw: Value) -> Option<ChartSeries> {
    if raw.is_null() {
        return None;
    }

    match serde_json::from_value::<VisualizationDto>(raw) {
        Ok(dto) => {
            let chart = ChartSeries::new(
                dto.labels,
                dto.datasets
                    .into_iter()
                    .map(|d| Series {
                        label: d.label,
                        data: d.data,
                    })
                    .collect(),
            );
            (!chart.is_empty()).then_some(chart)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed visualization payload");
            None
        }
    }
}
