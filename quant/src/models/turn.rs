use chrono::{DateTime, Utc};
use nanoid::nanoid;
use serde::{Deserialize, Serialize};

use super::chart::ChartSeries;
use super::reply::Reply;
use crate::error::{QuantError, Result};

/// Shown in place of an assistant reply whenever a turn's request fails.
pub const FALLBACK_MESSAGE: &str = "Sorry, I encountered an error processing your request.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    User,
    Assistant,
}

impl std::fmt::Display for TurnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One transcript entry. Fields are private so a turn cannot change after it
/// has been appended to a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    id: String,
    kind: TurnKind,
    content: String,
    created_at: DateTime<Utc>,
    visualization: Option<ChartSeries>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: nanoid!(10),
            kind: TurnKind::User,
            content: content.into(),
            created_at: Utc::now(),
            visualization: None,
        }
    }

    /// Build an assistant turn. The server timestamp wins when present, and
    /// an empty chart is dropped rather than attached.
    pub fn assistant(
        content: impl Into<String>,
        server_timestamp: Option<DateTime<Utc>>,
        visualization: Option<ChartSeries>,
    ) -> Self {
        Self {
            id: nanoid!(10),
            kind: TurnKind::Assistant,
            content: content.into(),
            created_at: server_timestamp.unwrap_or_else(Utc::now),
            visualization: visualization.filter(|chart| !chart.is_empty()),
        }
    }

    pub fn fallback() -> Self {
        Self::assistant(FALLBACK_MESSAGE, None, None)
    }

    /// Map a chat reply into an assistant turn. Dataset replies belong to the
    /// profile view and never become transcript entries.
    pub fn from_reply(reply: Reply) -> Result<Self> {
        match reply {
            Reply::Conversational(reply) => Ok(Self::assistant(reply.text, reply.timestamp, None)),
            Reply::Analytical(reply) => {
                Ok(Self::assistant(reply.analysis, None, reply.visualization))
            }
            Reply::Dataset(_) => Err(QuantError::Shape(
                "dataset replies cannot be appended to a transcript".to_string(),
            )),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> TurnKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn visualization(&self) -> Option<&ChartSeries> {
        self.visualization.as_ref()
    }

    pub fn is_user(&self) -> bool {
        self.kind == TurnKind::User
    }
}
