use log::trace;
use std::cell::RefCell;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ClipboardError {
    #[error("System clipboard failed: {0}")]
    System(String),
}

/// Where `tweet::CopyLink` writes permalinks.
pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Keeps the last written text in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: RefCell<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> Option<String> {
        self.text.borrow().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        trace!("Copied {} to memory clipboard", text);
        *self.text.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

#[cfg(feature = "system-clipboard")]
#[derive(Debug, Default)]
pub struct SystemClipboard;

#[cfg(feature = "system-clipboard")]
impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::System(e.to_string()))?;

        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::System(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard() {
        let clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.text(), None);
        clipboard.write_text("https://twitter.com/EiffelFly/status/1").unwrap();
        clipboard.write_text("https://twitter.com/EiffelFly/status/2").unwrap();
        assert_eq!(
            clipboard.text().as_deref(),
            Some("https://twitter.com/EiffelFly/status/2")
        );
    }
}
