//! In-memory text buffer implementing [`HostEditor`].
//!
//! Tracks the document text, a caret (byte offset), an optional selection
//! and a line index. Used by the terminal host and throughout the tests.

use crate::host::HostEditor;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextBuffer {
    text: String,
    caret: usize, // Byte offset, always on a char boundary
    selection: Option<Range<usize>>,
    line_starts: Vec<usize>,
    viewport: Option<Range<usize>>,
}

impl TextBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Create a buffer holding `text` with the caret at the end.
    pub fn from_text(text: &str) -> Self {
        let mut buffer = Self {
            text: text.to_string(),
            caret: text.len(),
            selection: None,
            line_starts: Vec::new(),
            viewport: None,
        };
        buffer.reindex();
        buffer
    }

    fn reindex(&mut self) {
        self.line_starts.clear();
        self.line_starts.push(0);
        self.line_starts
            .extend(self.text.match_indices('\n').map(|(i, _)| i + 1));
    }

    /// The whole document.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set the caret (must be at a character boundary).
    pub fn set_caret(&mut self, pos: usize) -> bool {
        if pos <= self.text.len() && self.text.is_char_boundary(pos) {
            self.caret = pos;
            self.selection = None;
            true
        } else {
            false
        }
    }

    /// Move the caret to the end of the text and clear the selection.
    pub fn move_to_end(&mut self) {
        self.caret = self.text.len();
        self.selection = None;
    }

    /// Select `range`; the caret moves to its end. Returns false if the
    /// range is not on character boundaries.
    pub fn select(&mut self, range: Range<usize>) -> bool {
        if range.start > range.end || self.text.get(range.clone()).is_none() {
            return false;
        }
        self.caret = range.end;
        self.selection = if range.is_empty() { None } else { Some(range) };
        true
    }

    pub fn select_all(&mut self) {
        let len = self.text.len();
        self.select(0..len);
    }

    pub fn selection_range(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    /// Restrict [`HostEditor::visible_lines`] to a line range.
    pub fn set_viewport(&mut self, lines: Option<Range<usize>>) {
        self.viewport = lines;
    }

    /// Insert a character at the caret, replacing any selection.
    pub fn insert_char(&mut self, ch: char) {
        let mut tmp = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut tmp));
    }

    /// Insert a string at the caret, replacing any selection.
    pub fn insert_str(&mut self, s: &str) {
        let range = self.selection.take().unwrap_or(self.caret..self.caret);
        self.text.replace_range(range.clone(), s);
        self.caret = range.start + s.len();
        self.reindex();
    }

    /// Delete the character before the caret (backspace), or the selection.
    /// Returns true if anything was deleted.
    pub fn delete_before(&mut self) -> bool {
        if let Some(range) = self.selection.take() {
            self.text.replace_range(range.clone(), "");
            self.caret = range.start;
            self.reindex();
            return true;
        }
        let Some((prev, _)) = self.text[..self.caret].char_indices().next_back() else {
            return false;
        };
        self.text.replace_range(prev..self.caret, "");
        self.caret = prev;
        self.reindex();
        true
    }
}

impl HostEditor for TextBuffer {
    fn caret(&self) -> usize {
        self.caret
    }

    fn len(&self) -> usize {
        self.text.len()
    }

    fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn line(&self, index: usize) -> Option<&str> {
        let start = *self.line_starts.get(index)?;
        let end = self
            .line_starts
            .get(index + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let line = &self.text[start..end];
        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    fn line_start(&self, index: usize) -> Option<usize> {
        self.line_starts.get(index).copied()
    }

    fn line_at(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        }
    }

    fn visible_lines(&self) -> Range<usize> {
        let all = 0..self.line_count();
        match &self.viewport {
            Some(v) => v.start.min(all.end)..v.end.min(all.end),
            None => all,
        }
    }

    fn selection(&self) -> Option<&str> {
        self.selection.as_ref().map(|r| &self.text[r.clone()])
    }

    fn replace_selection(&mut self, text: &str) {
        self.insert_str(text);
    }
}
