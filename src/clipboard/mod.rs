// Clipboard sinks - Gateway
use arboard::Clipboard;
use std::time::{Duration, Instant};

use crate::app::ClipboardConfig;
use crate::utils::{PixupError, Result};

/// Where the finalized gallery URL is copied to
pub trait ClipboardSink: Send + Sync {
    fn copy_text(&self, text: &str) -> Result<()>;
}

/// The desktop clipboard; a fresh handle is opened per copy.
///
/// On X11 and Wayland the text lives only as long as the process that set
/// it, so the copy blocks until a clipboard manager takes the selection
/// over or `hand_off` elapses. Other platforms return straight away.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard {
    hand_off: Duration,
}

impl SystemClipboard {
    pub fn new(hand_off: Duration) -> Self {
        Self { hand_off }
    }

    /// When to stop serving the selection; `None` means don't wait
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    fn hand_off_deadline(&self, now: Instant) -> Option<Instant> {
        if self.hand_off.is_zero() {
            None
        } else {
            now.checked_add(self.hand_off)
        }
    }

    #[cfg(target_os = "linux")]
    fn set(&self, clipboard: &mut Clipboard, text: &str) -> std::result::Result<(), arboard::Error> {
        use arboard::SetExtLinux;

        match self.hand_off_deadline(Instant::now()) {
            Some(deadline) => {
                crate::utils::log_info(
                    "📋",
                    format!(
                        "Holding the clipboard for up to {}s so the URL can be pasted",
                        self.hand_off.as_secs()
                    ),
                );
                clipboard.set().wait_until(deadline).text(text)
            }
            None => clipboard.set_text(text),
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn set(&self, clipboard: &mut Clipboard, text: &str) -> std::result::Result<(), arboard::Error> {
        clipboard.set_text(text)
    }
}

impl ClipboardSink for SystemClipboard {
    fn copy_text(&self, text: &str) -> Result<()> {
        let mut clipboard =
            Clipboard::new().map_err(|e| PixupError::ClipboardError(e.to_string()))?;
        self.set(&mut clipboard, text)
            .map_err(|e| PixupError::ClipboardError(e.to_string()))
    }
}

/// Used with `--no-clipboard` and on headless machines
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClipboard;

impl ClipboardSink for NoClipboard {
    fn copy_text(&self, _text: &str) -> Result<()> {
        Ok(())
    }
}

/// Pick the sink for this run
pub fn clipboard_for(config: &ClipboardConfig, no_clipboard: bool) -> Box<dyn ClipboardSink> {
    if config.enabled && !no_clipboard {
        Box::new(SystemClipboard::new(config.hand_off()))
    } else {
        Box::new(NoClipboard)
    }
}
