use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};

use crate::error::Result;
use crate::session::Confirm;

/// Line-oriented input shared by the chat loop and confirmation prompts.
pub struct LineInput<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: AsyncRead + Unpin> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }

    /// Next line, or `None` at end of input.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.next_line().await?)
    }
}

/// Asks a yes/no question on the terminal. Anything other than `y`/`yes`
/// (including end of input) counts as "no".
pub struct TerminalConfirm<'a, R, W> {
    input: &'a mut LineInput<R>,
    out: &'a mut W,
}

impl<'a, R, W> TerminalConfirm<'a, R, W> {
    pub fn new(input: &'a mut LineInput<R>, out: &'a mut W) -> Self {
        Self { input, out }
    }
}

#[async_trait]
impl<'a, R, W> Confirm for TerminalConfirm<'a, R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn confirm(&mut self, message: &str) -> bool {
        let question = format!("{message} [y/N] ");
        if let Err(e) = self.out.write_all(question.as_bytes()).await {
            tracing::debug!(error = %e, "Could not write confirmation prompt");
        }
        let _ = self.out.flush().await;

        match self.input.next_line().await {
            Ok(Some(answer)) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read confirmation answer");
                false
            }
        }
    }
}
