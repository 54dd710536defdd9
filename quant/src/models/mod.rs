mod chart;
mod dataset;
mod reply;
mod turn;

pub use chart::{ChartSeries, Series};
pub use dataset::{DatasetMetrics, Post, PostMetrics, Profile, ProfileDataset};
pub use reply::{AnalyticalReply, ConversationalReply, Reply};
pub use turn::{Turn, TurnKind, FALLBACK_MESSAGE};
