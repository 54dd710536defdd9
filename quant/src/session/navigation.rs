//! Leave-confirmation for pages that hold unsaved analysis state.
//!
//! Navigation is modelled as a simple history stack. While the guard is
//! armed, every attempt to leave asks a [`Confirm`] implementation first; a
//! declined back-navigation pushes the current location again so the user
//! stays where they were.

use async_trait::async_trait;
use tracing::debug;

pub const LEAVE_PROMPT: &str =
    "Are you sure you want to leave? Your analysis progress will be lost.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Analysis { username: String },
    Demo,
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Analysis { username } => write!(f, "/analysis/{username}"),
            Route::Demo => write!(f, "/demo"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveRequest {
    Back,
    Reload,
    Navigate(Route),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveDecision {
    Stay,
    Leave(Route),
}

#[async_trait]
pub trait Confirm: Send {
    async fn confirm(&mut self, message: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Route>,
}

impl History {
    pub fn new(start: Route) -> Self {
        Self {
            entries: vec![start],
        }
    }

    pub fn current(&self) -> &Route {
        // `entries` is never emptied below one element.
        &self.entries[self.entries.len() - 1]
    }

    pub fn push(&mut self, route: Route) {
        self.entries.push(route);
    }

    /// Pop the current entry and return the one now on top. The root entry is
    /// never popped.
    pub fn back(&mut self) -> &Route {
        if self.entries.len() > 1 {
            self.entries.pop();
        }
        self.current()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug)]
pub struct NavigationGuard {
    armed: bool,
}

impl NavigationGuard {
    /// Arm the guard on the current page. A duplicate history entry is pushed
    /// so the first back-navigation lands on this page again.
    pub fn arm(history: &mut History) -> Self {
        let here = history.current().clone();
        history.push(here);
        Self { armed: true }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub async fn request_leave(
        &mut self,
        request: LeaveRequest,
        history: &mut History,
        confirm: &mut dyn Confirm,
    ) -> LeaveDecision {
        let here = history.current().clone();

        if !self.armed {
            return Self::leave_unguarded(request, history, here);
        }

        match request {
            LeaveRequest::Back => {
                history.back();
                if confirm.confirm(LEAVE_PROMPT).await {
                    self.armed = false;
                    history.push(Route::Home);
                    LeaveDecision::Leave(Route::Home)
                } else {
                    debug!(route = %here, "Back navigation declined, restoring location");
                    history.push(here);
                    LeaveDecision::Stay
                }
            }
            LeaveRequest::Reload => {
                if confirm.confirm(LEAVE_PROMPT).await {
                    self.armed = false;
                    LeaveDecision::Leave(here)
                } else {
                    LeaveDecision::Stay
                }
            }
            LeaveRequest::Navigate(route) => {
                if confirm.confirm(LEAVE_PROMPT).await {
                    self.armed = false;
                    history.push(route.clone());
                    LeaveDecision::Leave(route)
                } else {
                    LeaveDecision::Stay
                }
            }
        }
    }

    fn leave_unguarded(request: LeaveRequest, history: &mut History, here: Route) -> LeaveDecision {
        match request {
            LeaveRequest::Back => LeaveDecision::Leave(history.back().clone()),
            LeaveRequest::Reload => LeaveDecision::Leave(here),
            LeaveRequest::Navigate(route) => {
                history.push(route.clone());
                LeaveDecision::Leave(route)
            }
        }
    }
}
