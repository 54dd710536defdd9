mod api;
mod dto;

use async_trait::async_trait;

pub use api::HttpGateway;
pub use dto::{parse_timestamp, AnalysisRequest, FlowRequest, ScrapeRequest};

use crate::error::Result;
use crate::models::{AnalyticalReply, ConversationalReply, ProfileDataset, Reply};

/// One request to the gateway, tagged by endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayRequest {
    Scrape(ScrapeRequest),
    RunFlow(FlowRequest),
    Analysis(AnalysisRequest),
}

impl GatewayRequest {
    pub fn endpoint(&self) -> &'static str {
        match self {
            GatewayRequest::Scrape(_) => api::SCRAPE_PATH,
            GatewayRequest::RunFlow(_) => api::RUN_FLOW_PATH,
            GatewayRequest::Analysis(_) => api::ANALYSIS_PATH,
        }
    }
}

/// The remote analysis service. Each call is a single attempt with no retry.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    async fn scrape_profile(&self, request: &ScrapeRequest) -> Result<ProfileDataset>;

    async fn run_flow(&self, request: &FlowRequest) -> Result<ConversationalReply>;

    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalyticalReply>;

    /// Issue a request and tag the reply with the path that produced it.
    async fn send(&self, request: &GatewayRequest) -> Result<Reply> {
        match request {
            GatewayRequest::Scrape(r) => self.scrape_profile(r).await.map(Reply::Dataset),
            GatewayRequest::RunFlow(r) => self.run_flow(r).await.map(Reply::Conversational),
            GatewayRequest::Analysis(r) => self.analyze(r).await.map(Reply::Analytical),
        }
    }
}
