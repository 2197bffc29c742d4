//! Shavian script detection and tokenization.
//!
//! Shavian letters occupy the Unicode block U+10450..=U+1047F. A proper name
//! is written with a leading namer dot (U+00B7), which the decoration layer
//! turns into a capital letter on the rendered translation.
//!
//! Two tokenizers live here:
//! - [`find_script_tokens`] extracts maximal Shavian words (with an optional
//!   namer dot) from a line of mixed text.
//! - [`tokenize_mixed`] splits conventional text into alternating word and
//!   non-word segments that cover the input exactly.

use once_cell::sync::Lazy;
use regex::Regex;

/// First codepoint of the Shavian block.
pub const SCRIPT_START: char = '\u{10450}';
/// Last codepoint of the Shavian block.
pub const SCRIPT_END: char = '\u{1047F}';
/// Namer dot marking the following word as a proper name.
pub const NAME_MARKER: char = '\u{00B7}';

static SCRIPT_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x{00B7}?[\x{10450}-\x{1047F}]+").expect("static script token pattern")
});

static WORD_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+").expect("static word run pattern"));

/// Check whether a single character is a Shavian letter.
pub fn is_script_char(ch: char) -> bool {
    (SCRIPT_START..=SCRIPT_END).contains(&ch)
}

/// True iff `s` contains at least one Shavian codepoint.
pub fn is_script_text(s: &str) -> bool {
    s.chars().any(is_script_char)
}

/// True iff `s` is non-empty and made only of Shavian letters.
pub fn is_script_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_script_char)
}

/// The dictionary key for `s`: the word without a leading namer dot, or
/// `None` when anything else in it is not a Shavian letter.
pub fn script_key(s: &str) -> Option<&str> {
    let word = s.strip_prefix(NAME_MARKER).unwrap_or(s);
    is_script_word(word).then_some(word)
}

/// A Shavian word found in a line, with byte offsets relative to that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptToken<'a> {
    /// Matched text, including a leading namer dot when present
    pub text: &'a str,
    /// Byte offset of the first character (the namer dot, if any)
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    /// Whether the word is marked as a proper name
    pub is_name: bool,
}

impl<'a> ScriptToken<'a> {
    /// The word used for dictionary lookup: the match without its namer dot.
    pub fn base_word(&self) -> &'a str {
        self.text.strip_prefix(NAME_MARKER).unwrap_or(self.text)
    }
}

/// Iterator over the Shavian words of a line, in ascending offset order.
///
/// Restartable: cloning the iterator (or calling [`find_script_tokens`]
/// again) scans from the same position.
#[derive(Debug, Clone)]
pub struct ScriptTokens<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Iterator for ScriptTokens<'a> {
    type Item = ScriptToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos > self.line.len() {
            return None;
        }
        let m = SCRIPT_TOKEN.find_at(self.line, self.pos)?;
        self.pos = m.end();

        let text = m.as_str();
        let marked = text.starts_with(NAME_MARKER);
        let preceded = self.line[..m.start()].chars().next_back() == Some(NAME_MARKER);

        Some(ScriptToken {
            text,
            start: m.start(),
            end: m.end(),
            is_name: marked || preceded,
        })
    }
}

/// Scan `line` left to right for maximal Shavian words.
pub fn find_script_tokens(line: &str) -> ScriptTokens<'_> {
    ScriptTokens { line, pos: 0 }
}

/// Return the first Shavian word in `text` with its namer dot stripped.
pub fn first_script_word(text: &str) -> Option<&str> {
    find_script_tokens(text).next().map(|t| t.base_word())
}

/// One piece of mixed text: either a run of word characters or the
/// punctuation and whitespace between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Word(&'a str),
    Other(&'a str),
}

impl<'a> Segment<'a> {
    /// The segment's text.
    pub fn as_str(&self) -> &'a str {
        match self {
            Segment::Word(s) | Segment::Other(s) => s,
        }
    }

    /// Whether this is a run of word characters.
    pub fn is_word(&self) -> bool {
        matches!(self, Segment::Word(_))
    }
}

/// Iterator produced by [`tokenize_mixed`].
#[derive(Debug, Clone)]
pub struct MixedSegments<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for MixedSegments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.text.len() {
            return None;
        }
        let from = self.pos;
        match WORD_RUN.find_at(self.text, from) {
            Some(m) if m.start() == from => {
                self.pos = m.end();
                Some(Segment::Word(m.as_str()))
            }
            Some(m) => {
                self.pos = m.start();
                Some(Segment::Other(&self.text[from..m.start()]))
            }
            None => {
                self.pos = self.text.len();
                Some(Segment::Other(&self.text[from..]))
            }
        }
    }
}

/// Split `text` into word and non-word segments.
///
/// Segments are never empty and concatenate back to `text` exactly.
pub fn tokenize_mixed(text: &str) -> MixedSegments<'_> {
    MixedSegments { text, pos: 0 }
}
