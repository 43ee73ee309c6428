use std::cell::RefCell;

use anyhow::{Context, Result};
use arboard::Clipboard;

/// Destination for the "copy" action in the result viewer.
pub trait ClipboardSink {
    fn copy(&self, text: &str) -> Result<()>;
}

/// The platform clipboard. Opened on first copy and kept for the life of the
/// viewer, since some platforms drop the contents with the handle.
#[derive(Default)]
pub struct SystemClipboard {
    handle: RefCell<Option<Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        let mut handle = self.handle.borrow_mut();
        let clipboard = match handle.take() {
            Some(clipboard) => clipboard,
            None => Clipboard::new().context("Failed to open system clipboard")?,
        };
        let clipboard = handle.insert(clipboard);
        clipboard.set_text(text).context("Failed to copy to system clipboard")
    }
}
