//! Time-based progress feedback for the profile fetch.
//!
//! The indicator reflects elapsed time only. It never learns about the
//! request it decorates and does not dismiss itself; the owner unmounts it
//! when the fetch settles.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::ProgressConfig;

pub const TITLE: &str = "Loading Your Profile";

pub const PHRASES: [&str; 4] = [
    "Analyzing profile data...",
    "Gathering metrics...",
    "Calculating insights...",
    "Preparing results...",
];

pub const STEPS: [&str; 3] = [
    "Analyzing engagement patterns",
    "Calculating performance metrics",
    "Processing activity data",
];

const MAX_DOTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressFrame {
    dots: usize,
    phrase_index: usize,
    remaining_secs: u64,
}

impl ProgressFrame {
    pub fn new(budget_secs: u64) -> Self {
        Self {
            dots: 1,
            phrase_index: 0,
            remaining_secs: budget_secs,
        }
    }

    pub fn ellipsis(&self) -> String {
        ".".repeat(self.dots)
    }

    pub fn phrase(&self) -> &'static str {
        PHRASES[self.phrase_index % PHRASES.len()]
    }

    pub fn phrase_index(&self) -> usize {
        self.phrase_index
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Remaining budget as `m:ss`.
    pub fn countdown(&self) -> String {
        format!("{}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }

    /// Status line, e.g. `Gathering metrics..... | Processing 1:42`.
    pub fn status_line(&self) -> String {
        format!(
            "{}{} | Processing {}",
            self.phrase(),
            self.ellipsis(),
            self.countdown()
        )
    }

    pub fn tick_dots(&mut self) {
        self.dots = if self.dots >= MAX_DOTS { 1 } else { self.dots + 1 };
    }

    pub fn tick_phrase(&mut self) {
        self.phrase_index = (self.phrase_index + 1) % PHRASES.len();
    }

    pub fn tick_countdown(&mut self) {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
    }
}

/// Three independent tickers publishing into one [`ProgressFrame`].
pub struct ProgressIndicator {
    frames: watch::Receiver<ProgressFrame>,
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

fn spawn_ticker(
    name: &'static str,
    period: Duration,
    tx: Arc<watch::Sender<ProgressFrame>>,
    token: CancellationToken,
    tick: fn(&mut ProgressFrame),
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // First tick one period after mount, then on a fixed cadence.
        let period = period.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::trace!(ticker = name, "Progress ticker stopped");
                    break;
                }
                _ = ticker.tick() => {
                    tx.send_modify(tick);
                }
            }
        }
    })
}

impl ProgressIndicator {
    /// Start ticking. Must be called inside a tokio runtime.
    pub fn mount(config: &ProgressConfig) -> Self {
        let (tx, frames) = watch::channel(ProgressFrame::new(config.budget_secs));
        let tx = Arc::new(tx);
        let token = CancellationToken::new();

        let tasks = vec![
            spawn_ticker(
                "dots",
                Duration::from_millis(config.dots_interval_ms),
                tx.clone(),
                token.child_token(),
                ProgressFrame::tick_dots,
            ),
            spawn_ticker(
                "phrase",
                Duration::from_millis(config.phrase_interval_ms),
                tx.clone(),
                token.child_token(),
                ProgressFrame::tick_phrase,
            ),
            spawn_ticker(
                "countdown",
                Duration::from_millis(config.countdown_interval_ms),
                tx,
                token.child_token(),
                ProgressFrame::tick_countdown,
            ),
        ];

        tracing::debug!(budget_secs = config.budget_secs, "Progress indicator mounted");
        Self {
            frames,
            token,
            tasks,
        }
    }

    pub fn frame(&self) -> ProgressFrame {
        self.frames.borrow().clone()
    }

    /// A receiver that wakes on every tick.
    pub fn subscribe(&self) -> watch::Receiver<ProgressFrame> {
        self.frames.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Stop all tickers and wait for them to exit.
    pub async fn unmount(mut self) {
        self.token.cancel();
        join_all(self.tasks.drain(..)).await;
        tracing::debug!("Progress indicator unmounted");
    }
}

impl Drop for ProgressIndicator {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
