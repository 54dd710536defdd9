use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use super::dto::{
    AnalysisRequest, AnalysisResponse, FlowRequest, FlowResponse, ScrapeRequest, ScrapeResponse,
};
use super::AnalysisGateway;
use crate::config::GatewayConfig;
use crate::error::{QuantError, Result};
use crate::models::{AnalyticalReply, ConversationalReply, ProfileDataset};

pub(crate) const SCRAPE_PATH: &str = "scrape-instagram";
pub(crate) const RUN_FLOW_PATH: &str = "run-flow";
pub(crate) const ANALYSIS_PATH: &str = "analysis";
const HEALTH_PATH: &str = "health";

const ERROR_BODY_PREVIEW: usize = 200;

#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    scrape_timeout: Duration,
    chat_timeout: Duration,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let mut base_url = Url::parse(config.base_url.trim())?;
        // Url::join replaces the last segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .build()
            .map_err(|e| QuantError::Gateway(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            scrape_timeout: Duration::from_secs(config.scrape_timeout_secs),
            chat_timeout: Duration::from_secs(config.chat_timeout_secs),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B, timeout: Duration) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        tracing::debug!(endpoint = %url, timeout_secs = timeout.as_secs(), "Sending gateway request");

        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
            return Err(QuantError::GatewayStatus {
                status: status.as_u16(),
                body: preview,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!(
                endpoint = path,
                response_len = bytes.len(),
                error = %e,
                "Failed to parse gateway response"
            );
            QuantError::Json(e)
        })
    }

    /// `GET /health`; true when the gateway answers with a 2xx status.
    pub async fn health(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.endpoint(HEALTH_PATH)?)
            .timeout(self.chat_timeout)
            .send()
            .await?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl AnalysisGateway for HttpGateway {
    async fn scrape_profile(&self, request: &ScrapeRequest) -> Result<ProfileDataset> {
        let response: ScrapeResponse = self
            .post_json(SCRAPE_PATH, request, self.scrape_timeout)
            .await?;
        response.into_dataset()
    }

    async fn run_flow(&self, request: &FlowRequest) -> Result<ConversationalReply> {
        let response: FlowResponse = self
            .post_json(RUN_FLOW_PATH, request, self.chat_timeout)
            .await?;
        Ok(response.into())
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalyticalReply> {
        let response: AnalysisResponse = self
            .post_json(ANALYSIS_PATH, request, self.chat_timeout)
            .await?;
        Ok(response.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway_config(base_url: &str) -> GatewayConfig {
        GatewayConfig {
            base_url: base_url.to_string(),
            scrape_timeout_secs: 150,
            chat_timeout_secs: 120,
        }
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let gateway = HttpGateway::new(&gateway_config("https://gw.example.com/api")).expect("gw");
        assert_eq!(gateway.base_url(), "https://gw.example.com/api/");
        assert_eq!(
            gateway.endpoint(RUN_FLOW_PATH).expect("url").as_str(),
            "https://gw.example.com/api/run-flow"
        );
    }

    #[test]
    fn test_endpoint_on_bare_host() {
        let gateway = HttpGateway::new(&gateway_config("http://localhost:10000")).expect("gw");
        assert_eq!(
            gateway.endpoint(SCRAPE_PATH).expect("url").as_str(),
            "http://localhost:10000/scrape-instagram"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = HttpGateway::new(&gateway_config("not a url"));
        assert!(matches!(result, Err(QuantError::UrlParse(_))));
    }
}
