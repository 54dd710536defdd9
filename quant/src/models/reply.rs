use chrono::{DateTime, Utc};

use super::chart::ChartSeries;
use super::dataset::ProfileDataset;

/// Reply to a conversational (`/run-flow`) turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationalReply {
    pub text: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Reply to an analytical (`/analysis`) turn, optionally with chart data.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticalReply {
    pub analysis: String,
    pub visualization: Option<ChartSeries>,
}

/// A gateway reply, tagged by the request path that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Conversational(ConversationalReply),
    Analytical(AnalyticalReply),
    Dataset(ProfileDataset),
}

impl Reply {
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Conversational(_) => "conversational",
            Reply::Analytical(_) => "analytical",
            Reply::Dataset(_) => "dataset",
        }
    }
}
