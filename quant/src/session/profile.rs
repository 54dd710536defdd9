use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::gateway::{AnalysisGateway, GatewayRequest, ScrapeRequest};
use crate::models::{ProfileDataset, Reply};

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Idle,
    Pending,
    Loaded(ProfileDataset),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded,
    Failed,
    /// Nothing was sent: no identifier, already in flight, already latched,
    /// or the view is gone.
    Skipped,
    /// The response arrived after the view was unmounted.
    Discarded,
}

#[derive(Debug)]
struct FetchInner {
    state: FetchState,
    latched: bool,
}

/// Loads a profile dataset at most once per view.
///
/// The latch is set after the first response of either outcome and never
/// reset, so a failed fetch is not retried for the lifetime of the view.
#[derive(Clone)]
pub struct ProfileFetch {
    gateway: Arc<dyn AnalysisGateway>,
    identifier: String,
    results_limit: u32,
    inner: Arc<Mutex<FetchInner>>,
    mounted: CancellationToken,
}

impl ProfileFetch {
    pub fn new(gateway: Arc<dyn AnalysisGateway>, identifier: impl Into<String>, results_limit: u32) -> Self {
        Self {
            gateway,
            identifier: identifier.into(),
            results_limit,
            inner: Arc::new(Mutex::new(FetchInner {
                state: FetchState::Idle,
                latched: false,
            })),
            mounted: CancellationToken::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FetchInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn state(&self) -> FetchState {
        self.lock().state.clone()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.lock().state, FetchState::Pending)
    }

    pub fn is_latched(&self) -> bool {
        self.lock().latched
    }

    pub fn last_error(&self) -> Option<String> {
        match &self.lock().state {
            FetchState::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// Borrow the loaded dataset, if any.
    pub fn with_dataset<R>(&self, f: impl FnOnce(&ProfileDataset) -> R) -> Option<R> {
        match &self.lock().state {
            FetchState::Loaded(dataset) => Some(f(dataset)),
            _ => None,
        }
    }

    pub fn dataset(&self) -> Option<ProfileDataset> {
        self.with_dataset(ProfileDataset::clone)
    }

    /// Tear the view down. A response that arrives afterwards is dropped.
    pub fn unmount(&self) {
        self.mounted.cancel();
    }

    pub fn is_mounted(&self) -> bool {
        !self.mounted.is_cancelled()
    }

    pub async fn ensure_fetched(&self) -> FetchOutcome {
        let identifier = self.identifier.trim();
        if identifier.is_empty() {
            return FetchOutcome::Skipped;
        }

        {
            let mut inner = self.lock();
            if inner.latched || inner.state == FetchState::Pending || !self.is_mounted() {
                return FetchOutcome::Skipped;
            }
            inner.state = FetchState::Pending;
        }

        info!(username = identifier, limit = self.results_limit, "Fetching profile dataset");
        let request = GatewayRequest::Scrape(ScrapeRequest {
            username: identifier.to_string(),
            results_limit: self.results_limit,
        });
        let result = self.gateway.send(&request).await;

        if !self.is_mounted() {
            info!(username = identifier, "Profile response arrived after unmount");
            return FetchOutcome::Discarded;
        }

        let mut inner = self.lock();
        inner.latched = true;
        match result {
            Ok(Reply::Dataset(dataset)) => {
                info!(
                    username = identifier,
                    posts = dataset.posts.len(),
                    "Profile dataset loaded"
                );
                inner.state = FetchState::Loaded(dataset);
                FetchOutcome::Loaded
            }
            Ok(other) => {
                warn!(kind = other.kind(), "Scrape returned a non-dataset reply");
                inner.state = FetchState::Failed(format!("unexpected {} reply", other.kind()));
                FetchOutcome::Failed
            }
            Err(e) => {
                warn!(username = identifier, error = %e, "Profile fetch failed");
                inner.state = FetchState::Failed(e.to_string());
                FetchOutcome::Failed
            }
        }
    }
}
