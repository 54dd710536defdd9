use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{QuantError, Result};

pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// Escape sequence asking the terminal to place `text` on the system
/// clipboard.
pub fn osc52_sequence(text: &str) -> String {
    let encoded = STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x1b\\")
}

/// Clipboard backed by the OSC 52 terminal escape.
pub struct Osc52Clipboard<W: Write> {
    out: W,
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl Osc52Clipboard<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> Clipboard for Osc52Clipboard<W> {
    fn copy(&mut self, text: &str) -> Result<()> {
        self.out
            .write_all(osc52_sequence(text).as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|e| QuantError::Clipboard(e.to_string()))
    }
}

/// Copy and swallow any failure. Returns whether the copy went through.
pub fn copy_quietly(clipboard: &mut dyn Clipboard, text: &str) -> bool {
    match clipboard.copy(text) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "Copy to clipboard failed");
            false
        }
    }
}
