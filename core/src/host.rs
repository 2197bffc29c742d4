//! Interfaces to the host editing surface and UI.
//!
//! The core never owns the text buffer or any UI. Hosts implement these two
//! traits; the engine reads through them and writes back only for explicit
//! user actions (translating a selection, translated paste).

use std::ops::Range;

/// The host text-editing surface. Offsets are byte offsets into the document.
pub trait HostEditor {
    /// Current caret offset.
    fn caret(&self) -> usize;

    /// Full document length.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn line_count(&self) -> usize;

    /// Text of line `index`, without its line terminator.
    fn line(&self, index: usize) -> Option<&str>;

    /// Document offset where line `index` starts.
    fn line_start(&self, index: usize) -> Option<usize>;

    /// Index of the line containing `offset`.
    fn line_at(&self, offset: usize) -> usize;

    /// Lines currently on screen. Defaults to the whole document.
    fn visible_lines(&self) -> Range<usize> {
        0..self.line_count()
    }

    /// Selected text, if the selection is non-empty.
    fn selection(&self) -> Option<&str>;

    /// Replace the selection (or insert at the caret) with `text`.
    fn replace_selection(&mut self, text: &str);
}

/// Transient user-visible notices.
pub trait HostUi {
    fn notify(&mut self, message: &str);
}

/// A [`HostUi`] that keeps every notice, for tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct NoticeLog {
    pub messages: Vec<String>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }
}

impl HostUi for NoticeLog {
    fn notify(&mut self, message: &str) {
        tracing::debug!(message, "notice");
        self.messages.push(message.to_string());
    }
}
