//! Interactive terminal views: the profile analysis page and the demo chat.

mod interrupt;
mod painter;
mod prompt;

use std::future::Future;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast::{self, error::TryRecvError};

pub use interrupt::Interrupts;
pub use painter::{
    paint_empty_state, paint_profile, paint_turn, DEMO_DISCLAIMER, EMPTY_SUBTITLE, EMPTY_TITLE,
    PENDING_LINE, USER_LABEL,
};
pub use prompt::{LineInput, TerminalConfirm};

use crate::config::Config;
use crate::error::Result;
use crate::gateway::AnalysisGateway;
use crate::progress::ProgressIndicator;
use crate::render::{copy_quietly, render_profile, render_turn, ChartSet, Clipboard, Theme};
use crate::session::{
    Confirm, DispatchMode, FetchOutcome, History, LeaveDecision, LeaveRequest, NavigationGuard,
    ProfileFetch, Route, Session, SessionEvent, SessionHandle, TurnDispatcher,
};

/// Chat commands recognised in the input line, plus Ctrl-C.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Copy,
    CopyChart,
    Back,
    Quit,
    Theme,
    Interrupt,
    Message(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "/copy" => Command::Copy,
            "/copy chart" => Command::CopyChart,
            "/back" => Command::Back,
            "/quit" | "/exit" => Command::Quit,
            "/theme" => Command::Theme,
            _ => Command::Message(line.to_string()),
        }
    }
}

/// How a view ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewExit {
    Left(Route),
    EndOfInput,
}

enum Loading {
    Settled(FetchOutcome),
    Left(Route),
}

/// Ask to leave while `work` keeps running. If `work` finishes before the
/// answer comes in, its output is parked in `settled`.
async fn leave_while<F>(
    guard: &mut NavigationGuard,
    history: &mut History,
    confirm: &mut dyn Confirm,
    work: &mut F,
    settled: &mut Option<F::Output>,
) -> LeaveDecision
where
    F: Future + Unpin,
{
    let leave = guard.request_leave(LeaveRequest::Reload, history, confirm);
    tokio::pin!(leave);
    loop {
        tokio::select! {
            decision = &mut leave => return decision,
            output = &mut *work, if settled.is_none() => *settled = Some(output),
        }
    }
}

/// One interactive page bound to an input stream and an output sink.
pub struct Terminal<R, W> {
    input: LineInput<R>,
    out: W,
    theme: Theme,
    clipboard: Box<dyn Clipboard + Send>,
    gateway: Arc<dyn AnalysisGateway>,
    interrupts: Interrupts,
    config: Config,
}

impl<R, W> Terminal<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(
        reader: R,
        out: W,
        gateway: Arc<dyn AnalysisGateway>,
        clipboard: Box<dyn Clipboard + Send>,
        config: Config,
    ) -> Self {
        Self {
            input: LineInput::new(reader),
            out,
            theme: config.display.theme,
            clipboard,
            gateway,
            interrupts: Interrupts::none(),
            config,
        }
    }

    /// Route interrupts through the leave confirmation.
    pub fn with_interrupts(mut self, interrupts: Interrupts) -> Self {
        self.interrupts = interrupts;
        self
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn into_output(self) -> W {
        self.out
    }

    async fn write(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }

    /// Fetch the profile behind the progress indicator, then chat about it.
    pub async fn run_analysis(&mut self, username: &str) -> Result<ViewExit> {
        let mut history = History::new(Route::Home);
        history.push(Route::Analysis {
            username: username.to_string(),
        });
        let mut guard = NavigationGuard::arm(&mut history);

        let fetch = ProfileFetch::new(
            self.gateway.clone(),
            username,
            self.config.profile.results_limit,
        );
        let outcome = match self
            .fetch_with_progress(&fetch, &mut history, &mut guard)
            .await?
        {
            Loading::Settled(outcome) => outcome,
            Loading::Left(route) => {
                fetch.unmount();
                return Ok(ViewExit::Left(route));
            }
        };

        match outcome {
            FetchOutcome::Loaded => {
                if let Some(panel) = fetch.with_dataset(|dataset| render_profile(dataset, self.theme)) {
                    self.write(&paint_profile(&panel)).await?;
                }
            }
            FetchOutcome::Failed => {
                tracing::warn!(
                    username,
                    error = fetch.last_error().as_deref().unwrap_or("unknown"),
                    "Continuing without profile panel"
                );
            }
            FetchOutcome::Skipped | FetchOutcome::Discarded => {}
        }

        let exit = self
            .chat(DispatchMode::Conversational, &mut history, &mut guard)
            .await;
        fetch.unmount();
        exit
    }

    /// The demo page: analytical chat with charts.
    pub async fn run_demo(&mut self) -> Result<ViewExit> {
        let mut history = History::new(Route::Home);
        history.push(Route::Demo);
        let mut guard = NavigationGuard::arm(&mut history);

        self.chat(DispatchMode::Analytical, &mut history, &mut guard)
            .await
    }

    async fn fetch_with_progress(
        &mut self,
        fetch: &ProfileFetch,
        history: &mut History,
        guard: &mut NavigationGuard,
    ) -> Result<Loading> {
        let indicator = ProgressIndicator::mount(&self.config.progress);
        let mut frames = indicator.subscribe();
        let theme = self.theme;

        self.write(&painter::paint_progress_header(theme)).await?;
        let first = painter::paint_progress(&indicator.frame(), theme);
        self.write(&first).await?;

        let request = fetch.ensure_fetched();
        tokio::pin!(request);

        let loading = loop {
            tokio::select! {
                outcome = &mut request => break Loading::Settled(outcome),
                changed = frames.changed() => {
                    if changed.is_err() {
                        break Loading::Settled((&mut request).await);
                    }
                    let line = painter::paint_progress(&frames.borrow_and_update(), theme);
                    self.write(&line).await?;
                }
                _ = self.interrupts.recv() => {
                    tracing::info!("Interrupted while loading profile");
                    self.write("\n").await?;
                    let mut settled = None;
                    let mut confirm = TerminalConfirm::new(&mut self.input, &mut self.out);
                    let decision =
                        leave_while(guard, history, &mut confirm, &mut request, &mut settled)
                            .await;
                    match decision {
                        LeaveDecision::Leave(route) => break Loading::Left(route),
                        LeaveDecision::Stay => {
                            if let Some(outcome) = settled {
                                break Loading::Settled(outcome);
                            }
                        }
                    }
                }
            }
        };

        indicator.unmount().await;
        self.write("\r\x1b[2K\n").await?;
        Ok(loading)
    }

    async fn chat(
        &mut self,
        mode: DispatchMode,
        history: &mut History,
        guard: &mut NavigationGuard,
    ) -> Result<ViewExit> {
        let session = SessionHandle::new(Session::new());
        let mut events = session.subscribe();
        let dispatcher = TurnDispatcher::new(self.gateway.clone(), session.clone(), mode);
        tracing::info!(session_id = session.lock().id(), ?mode, "Chat session started");

        self.write(&paint_empty_state(
            self.theme,
            mode == DispatchMode::Analytical,
        ))
        .await?;

        let exit = 'chat: loop {
            let command = tokio::select! {
                biased;
                _ = self.interrupts.recv() => Command::Interrupt,
                line = self.input.next_line() => match line? {
                    Some(line) => Command::parse(&line),
                    None => break ViewExit::EndOfInput,
                },
            };

            let request = match command {
                Command::Copy => {
                    self.copy_last_reply(&session).await?;
                    continue;
                }
                Command::CopyChart => {
                    self.copy_last_chart(&session).await?;
                    continue;
                }
                Command::Theme => {
                    self.theme = self.theme.toggle();
                    self.write(&format!("Theme: {}\n", self.theme)).await?;
                    continue;
                }
                Command::Back => LeaveRequest::Back,
                Command::Quit => LeaveRequest::Reload,
                Command::Interrupt => {
                    self.write("\n").await?;
                    LeaveRequest::Reload
                }
                Command::Message(message) => {
                    session.lock().set_input(message.clone());
                    let submit = dispatcher.submit(&message);
                    tokio::pin!(submit);

                    let outcome = loop {
                        tokio::select! {
                            outcome = &mut submit => break outcome,
                            event = events.recv() => {
                                if let Ok(event) = event {
                                    self.paint_event(&session, event, mode).await?;
                                }
                            }
                            _ = self.interrupts.recv() => {
                                self.write("\n").await?;
                                let mut settled = None;
                                let mut confirm =
                                    TerminalConfirm::new(&mut self.input, &mut self.out);
                                let decision = leave_while(
                                    guard,
                                    history,
                                    &mut confirm,
                                    &mut submit,
                                    &mut settled,
                                )
                                .await;
                                match decision {
                                    LeaveDecision::Leave(route) => {
                                        break 'chat ViewExit::Left(route)
                                    }
                                    LeaveDecision::Stay => {
                                        if let Some(outcome) = settled {
                                            break outcome;
                                        }
                                    }
                                }
                            }
                        }
                    };
                    tracing::debug!(?outcome, "Turn settled");
                    self.drain_events(&session, &mut events, mode).await?;
                    continue;
                }
            };

            let mut confirm = TerminalConfirm::new(&mut self.input, &mut self.out);
            match guard.request_leave(request, history, &mut confirm).await {
                LeaveDecision::Leave(route) => break ViewExit::Left(route),
                LeaveDecision::Stay => {
                    tracing::debug!(route = %history.current(), "Stayed on page");
                }
            }
        };

        session.detach();
        tracing::info!(turns = session.lock().len(), "Chat session closed");
        Ok(exit)
    }

    async fn paint_event(
        &mut self,
        session: &SessionHandle,
        event: SessionEvent,
        mode: DispatchMode,
    ) -> Result<()> {
        match event {
            SessionEvent::TurnAppended { index, .. } => {
                let rendered = session
                    .lock()
                    .turns()
                    .get(index)
                    .map(|turn| render_turn(turn, self.theme));
                if let Some(rendered) = rendered {
                    self.write(&paint_turn(&rendered, mode.assistant_label()))
                        .await?;
                }
            }
            SessionEvent::AwaitingChanged(true) => {
                self.write(&painter::paint_pending(self.theme)).await?;
            }
            SessionEvent::AwaitingChanged(false) | SessionEvent::Detached => {}
        }
        Ok(())
    }

    async fn drain_events(
        &mut self,
        session: &SessionHandle,
        events: &mut broadcast::Receiver<SessionEvent>,
        mode: DispatchMode,
    ) -> Result<()> {
        loop {
            match events.try_recv() {
                Ok(event) => self.paint_event(session, event, mode).await?,
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Session events lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
            }
        }
    }

    async fn copy_last_reply(&mut self, session: &SessionHandle) -> Result<()> {
        let text = session.lock().last_assistant().map(|t| t.content().to_string());
        let notice = match text {
            Some(text) if copy_quietly(self.clipboard.as_mut(), &text) => "Copied to clipboard\n",
            Some(_) => return Ok(()),
            None => "Nothing to copy yet\n",
        };
        self.write(notice).await
    }

    async fn copy_last_chart(&mut self, session: &SessionHandle) -> Result<()> {
        let text = session
            .lock()
            .last_assistant()
            .and_then(|turn| turn.visualization())
            .and_then(ChartSet::project)
            .map(|charts| charts.plain_text());
        let notice = match text {
            Some(text) if copy_quietly(self.clipboard.as_mut(), &text) => "Chart copied to clipboard\n",
            Some(_) => return Ok(()),
            None => "No chart to copy yet\n",
        };
        self.write(notice).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse() {
        assert_eq!(Command::parse(" /copy "), Command::Copy);
        assert_eq!(Command::parse("/exit"), Command::Quit);
        assert_eq!(Command::parse("/copy chart"), Command::CopyChart);
        assert_eq!(
            Command::parse("/copy that"),
            Command::Message("/copy that".to_string())
        );
    }
}
