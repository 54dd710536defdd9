mod common;

use std::sync::Arc;

use serde_json::json;
use tokio_test::{assert_pending, assert_ready, task};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{gate, sample_dataset, ScriptedGateway, Step};
use quant::config::GatewayConfig;
use quant::gateway::{GatewayRequest, HttpGateway, ScrapeRequest};
use quant::models::Reply;
use quant::session::{FetchOutcome, FetchState, ProfileFetch};

fn http_gateway(server: &MockServer) -> Arc<HttpGateway> {
    Arc::new(
        HttpGateway::new(&GatewayConfig {
            base_url: server.uri(),
            scrape_timeout_secs: 5,
            chat_timeout_secs: 5,
        })
        .expect("gateway"),
    )
}

fn scrape_body() -> serde_json::Value {
    json!({
        "success": true,
        "profile_data": {
            "username": "natgeo",
            "full_name": "National Geographic",
            "followers_count": 1000,
            "following_count": 150,
            "is_verified": true,
            "total_posts": 30000
        },
        "posts_data": [
            {"post_id": "p1", "post_data": {"likes": 80, "comments": 20}}
        ]
    })
}

#[tokio::test]
async fn test_exactly_one_scrape_per_view() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scrape-instagram"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scrape_body()))
        .expect(1)
        .mount(&server)
        .await;

    let fetch = ProfileFetch::new(http_gateway(&server), "natgeo", 25);

    let (first, second) = tokio::join!(fetch.ensure_fetched(), fetch.ensure_fetched());
    let third = fetch.ensure_fetched().await;

    let mut outcomes = vec![first, second];
    outcomes.sort_by_key(|o| *o != FetchOutcome::Loaded);
    assert_eq!(outcomes, vec![FetchOutcome::Loaded, FetchOutcome::Skipped]);
    assert_eq!(third, FetchOutcome::Skipped);
    assert!(fetch.is_latched());

    let rate = fetch
        .with_dataset(|d| d.metrics().engagement_rate)
        .flatten()
        .expect("rate");
    assert_eq!(format!("{rate:.2}"), "10.00");
}

#[tokio::test]
async fn test_failed_fetch_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scrape-instagram"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let fetch = ProfileFetch::new(http_gateway(&server), "natgeo", 25);

    assert_eq!(fetch.ensure_fetched().await, FetchOutcome::Failed);
    assert_eq!(fetch.ensure_fetched().await, FetchOutcome::Skipped);

    assert!(fetch.dataset().is_none());
    let error = fetch.last_error().expect("error text");
    assert!(error.contains("502"), "{error}");
}

#[tokio::test]
async fn test_empty_identifier_sends_nothing() {
    let gateway = ScriptedGateway::new(vec![]);
    let fetch = ProfileFetch::new(gateway.clone(), "   ", 25);

    assert_eq!(fetch.ensure_fetched().await, FetchOutcome::Skipped);
    assert_eq!(fetch.state(), FetchState::Idle);
    assert!(gateway.requests().is_empty());
}

#[tokio::test]
async fn test_request_carries_results_limit() {
    let gateway = ScriptedGateway::new(vec![Step::Reply(Reply::Dataset(sample_dataset()))]);
    let fetch = ProfileFetch::new(gateway.clone(), "natgeo", 12);

    assert_eq!(fetch.ensure_fetched().await, FetchOutcome::Loaded);
    assert_eq!(
        gateway.requests(),
        vec![GatewayRequest::Scrape(ScrapeRequest {
            username: "natgeo".to_string(),
            results_limit: 12,
        })]
    );
}

#[tokio::test]
async fn test_pending_state_while_in_flight() {
    let (step, release) = gate();
    let gateway = ScriptedGateway::new(vec![step]);
    let fetch = ProfileFetch::new(gateway, "natgeo", 25);

    let mut pending = task::spawn(fetch.ensure_fetched());
    assert_pending!(pending.poll());
    assert!(fetch.is_pending());
    assert!(!fetch.is_latched());

    release
        .send(Ok(Reply::Dataset(sample_dataset())))
        .expect("release");
    assert_eq!(assert_ready!(pending.poll()), FetchOutcome::Loaded);
    assert!(!fetch.is_pending());
}

#[tokio::test]
async fn test_unmount_discards_late_response() {
    let (step, release) = gate();
    let gateway = ScriptedGateway::new(vec![step]);
    let fetch = ProfileFetch::new(gateway, "natgeo", 25);

    let mut pending = task::spawn(fetch.ensure_fetched());
    assert_pending!(pending.poll());

    fetch.unmount();
    release
        .send(Ok(Reply::Dataset(sample_dataset())))
        .expect("release");

    assert_eq!(assert_ready!(pending.poll()), FetchOutcome::Discarded);
    assert!(fetch.dataset().is_none());
    assert!(!fetch.is_latched());
    assert_eq!(fetch.ensure_fetched().await, FetchOutcome::Skipped);
}
