#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use quant::error::{QuantError, Result};
use quant::gateway::{AnalysisGateway, AnalysisRequest, FlowRequest, GatewayRequest, ScrapeRequest};
use quant::models::{
    AnalyticalReply, ChartSeries, ConversationalReply, Post, Profile, ProfileDataset, Reply,
    Series,
};

/// What the scripted gateway does for one call.
pub enum Step {
    Reply(Reply),
    Fail(QuantError),
    /// Wait for the test to release the reply.
    Gate(oneshot::Receiver<Result<Reply>>),
    Panic,
}

/// In-process gateway that answers calls from a fixed script and records
/// every request it sees.
#[derive(Default)]
pub struct ScriptedGateway {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<GatewayRequest>>,
}

impl ScriptedGateway {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<GatewayRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// A gated step plus the sender that releases it.
pub fn gate() -> (Step, oneshot::Sender<Result<Reply>>) {
    let (tx, rx) = oneshot::channel();
    (Step::Gate(rx), tx)
}

#[async_trait]
impl AnalysisGateway for ScriptedGateway {
    async fn scrape_profile(&self, request: &ScrapeRequest) -> Result<ProfileDataset> {
        match self.send(&GatewayRequest::Scrape(request.clone())).await? {
            Reply::Dataset(dataset) => Ok(dataset),
            other => Err(QuantError::Shape(format!("unexpected {}", other.kind()))),
        }
    }

    async fn run_flow(&self, request: &FlowRequest) -> Result<ConversationalReply> {
        match self.send(&GatewayRequest::RunFlow(request.clone())).await? {
            Reply::Conversational(reply) => Ok(reply),
            other => Err(QuantError::Shape(format!("unexpected {}", other.kind()))),
        }
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalyticalReply> {
        match self.send(&GatewayRequest::Analysis(request.clone())).await? {
            Reply::Analytical(reply) => Ok(reply),
            other => Err(QuantError::Shape(format!("unexpected {}", other.kind()))),
        }
    }

    async fn send(&self, request: &GatewayRequest) -> Result<Reply> {
        self.requests.lock().unwrap().push(request.clone());
        let step = self.steps.lock().unwrap().pop_front();

        match step {
            Some(Step::Reply(reply)) => Ok(reply),
            Some(Step::Fail(error)) => Err(error),
            Some(Step::Gate(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(QuantError::Internal("gate dropped".to_string()))),
            Some(Step::Panic) => panic!("scripted gateway panicked"),
            None => Err(QuantError::Internal("script exhausted".to_string())),
        }
    }
}

pub fn text_reply(text: &str) -> Reply {
    Reply::Conversational(ConversationalReply {
        text: text.to_string(),
        timestamp: None,
    })
}

pub fn chart(labels: &[&str], data: &[f64]) -> ChartSeries {
    ChartSeries::new(
        labels.iter().map(|l| l.to_string()).collect(),
        vec![Series {
            label: Some("Average Engagement".to_string()),
            data: data.to_vec(),
        }],
    )
}

pub fn analysis_reply(text: &str, visualization: Option<ChartSeries>) -> Reply {
    Reply::Analytical(AnalyticalReply {
        analysis: text.to_string(),
        visualization,
    })
}

pub fn sample_dataset() -> ProfileDataset {
    ProfileDataset::new(
        Profile {
            handle: "natgeo".to_string(),
            display_name: "National Geographic".to_string(),
            is_verified: true,
            biography: "Experience the world through the eyes of our photographers".to_string(),
            followers_count: 1_000,
            following_count: 150,
            post_count: 30_000,
            profile_url: None,
            external_url: None,
            business_category: None,
        },
        vec![Post {
            id: "p1".to_string(),
            timestamp: None,
            likes: 80,
            comments: 20,
            post_type: Some("Image".to_string()),
            shares: 0,
            caption: None,
            url: None,
        }],
    )
}
