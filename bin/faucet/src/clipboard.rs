//! Terminal clipboard via the OSC 52 escape sequence.

use base64::Engine;
use claim::{Clipboard, PlatformError};
use std::{
    io::{IsTerminal, Write},
    sync::{Mutex, PoisonError},
};

/// Writes `ESC ] 52 ; c ; <base64> BEL` so the terminal emulator sets its clipboard.
pub struct Osc52Clipboard<W> {
    out: Mutex<W>,
    is_terminal: bool,
}

impl Osc52Clipboard<std::io::Stdout> {
    /// Clipboard bound to this process's stdout.
    pub fn stdout() -> Self {
        let out = std::io::stdout();
        let is_terminal = out.is_terminal();
        Self::new(out, is_terminal)
    }
}

impl<W> Osc52Clipboard<W>
where
    W: Write + Send,
{
    pub const fn new(out: W, is_terminal: bool) -> Self {
        Self {
            out: Mutex::new(out),
            is_terminal,
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The escape sequence carrying `text`.
pub fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}

impl<W> Clipboard for Osc52Clipboard<W>
where
    W: Write + Send,
{
    async fn write_text(&self, text: &str) -> Result<(), PlatformError> {
        if !self.is_terminal {
            return Err(PlatformError::Unavailable(
                "output is not a terminal".to_string(),
            ));
        }

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(osc52_sequence(text).as_bytes())
            .and_then(|()| out.flush())
            .map_err(|e| PlatformError::Write(e.to_string()))
    }
}
