use tokio::sync::mpsc;

/// Stream of user interrupts (Ctrl-C) delivered to the interactive views.
///
/// Once [`Interrupts::ctrl_c`] installs the handler, SIGINT no longer ends the
/// process; the view decides whether to leave.
pub struct Interrupts {
    rx: Option<mpsc::Receiver<()>>,
}

impl Interrupts {
    /// A source that never fires.
    pub fn none() -> Self {
        Self { rx: None }
    }

    /// A source fed by the returned sender.
    pub fn channel() -> (mpsc::Sender<()>, Self) {
        let (tx, rx) = mpsc::channel(4);
        (tx, Self { rx: Some(rx) })
    }

    /// Forward Ctrl-C presses. Must be called inside a tokio runtime.
    pub fn ctrl_c() -> Self {
        let (tx, interrupts) = Self::channel();
        tokio::spawn(async move {
            loop {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "Could not listen for Ctrl-C");
                    break;
                }
                tracing::debug!("Ctrl-C received");
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        interrupts
    }

    /// Resolves on the next interrupt. Pending forever once the source is
    /// closed.
    pub async fn recv(&mut self) {
        if let Some(rx) = self.rx.as_mut() {
            if rx.recv().await.is_some() {
                return;
            }
            self.rx = None;
        }
        std::future::pending::<()>().await
    }
}

impl Default for Interrupts {
    fn default() -> Self {
        Self::none()
    }
}
