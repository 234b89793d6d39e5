//! System clipboard access.

use arboard::Clipboard;
use tracing::{debug, error};

/// Lazily opened handle to the system clipboard.
///
/// The handle is kept for the lifetime of the app: on X11 and Wayland the
/// copied text is served by the process that owns the clipboard, so dropping
/// it right after a copy can lose the contents.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copy(&mut self, text: &str) -> Result<(), arboard::Error> {
        let opened = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => Clipboard::new().inspect_err(|e| error!("Failed to access clipboard: {}", e))?,
        };
        let clipboard = self.inner.insert(opened);

        clipboard
            .set_text(text)
            .inspect_err(|e| error!("Failed to copy to clipboard: {}", e))?;
        debug!("Copied {} bytes to clipboard", text.len());
        Ok(())
    }
}
