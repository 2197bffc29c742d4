//! Live decoration engine.
//!
//! Given the visible lines of a document, the caret offset, the dictionary
//! and the display settings, [`DecorationBuilder`] computes the replacement
//! spans a host overlays on the text. The buffer itself is never modified.
//!
//! Per line the builder:
//! 1. replaces each angle-quote marker with its typographic quote,
//! 2. replaces each learned Shavian word with its translation,
//!
//! skipping anything the caret touches so the word being typed stays raw.
//! Offsets are byte offsets into the whole document.

use crate::dictionary::Dictionary;
use crate::host::HostEditor;
use crate::script::find_script_tokens;
use crate::{utils, Settings};

/// Angle-quote markers and the quote each one is displayed as.
pub const QUOTE_MARKERS: [(char, &str); 2] = [('\u{00AB}', "\u{201C}"), ('\u{00BB}', "\u{201D}")];

fn quote_for(ch: char) -> Option<&'static str> {
    QUOTE_MARKERS
        .iter()
        .find(|(marker, _)| *marker == ch)
        .map(|(_, quote)| *quote)
}

/// Whether a span `[start, end)` touches `caret`, boundaries included.
fn touches_caret(start: usize, end: usize, caret: usize) -> bool {
    start <= caret && caret <= end
}

/// Visual styling for a replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationStyle {
    pub italic: bool,
    /// CSS colour; `None` inherits the surrounding text colour
    pub colour: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationKind {
    /// A learned word shown as its translation
    Translation,
    /// An angle-quote marker shown as a typographic quote
    Quote,
}

/// A half-open range of the document to display as `rendered_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub start: usize,
    pub end: usize,
    pub rendered_text: String,
    pub kind: DecorationKind,
    pub style: DecorationStyle,
}

/// A line of the visible text and the document offset it starts at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub start: usize,
    pub text: &'a str,
}

/// The visible portion of a document as ordered lines.
#[derive(Debug, Clone, Default)]
pub struct DocumentView<'a> {
    lines: Vec<Line<'a>>,
}

impl<'a> DocumentView<'a> {
    pub fn from_lines(lines: Vec<Line<'a>>) -> Self {
        Self { lines }
    }

    /// Split a whole text on `\n`; a trailing `\r` is left out of the line.
    pub fn from_text(text: &'a str) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        for raw in text.split('\n') {
            lines.push(Line {
                start,
                text: raw.strip_suffix('\r').unwrap_or(raw),
            });
            start += raw.len() + 1;
        }
        Self { lines }
    }

    /// The host's visible lines.
    pub fn visible(editor: &'a dyn HostEditor) -> Self {
        let lines = editor
            .visible_lines()
            .filter_map(|i| {
                Some(Line {
                    start: editor.line_start(i)?,
                    text: editor.line(i)?,
                })
            })
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[Line<'a>] {
        &self.lines
    }
}

/// Computes decorations from explicitly injected state.
#[derive(Debug, Clone, Copy)]
pub struct DecorationBuilder<'a> {
    dictionary: &'a Dictionary,
    settings: &'a Settings,
}

impl<'a> DecorationBuilder<'a> {
    pub fn new(dictionary: &'a Dictionary, settings: &'a Settings) -> Self {
        Self {
            dictionary,
            settings,
        }
    }

    /// Decorations for every line of `view`, sorted by start and
    /// non-overlapping.
    pub fn build(&self, view: &DocumentView<'_>, caret: usize) -> Vec<Decoration> {
        let mut out = Vec::new();
        for line in view.lines() {
            self.decorate_line(*line, caret, &mut out);
        }
        out.sort_by_key(|d| d.start);
        out
    }

    fn decorate_line(&self, line: Line<'_>, caret: usize, out: &mut Vec<Decoration>) {
        let first = out.len();

        for (idx, ch) in line.text.char_indices() {
            let Some(quote) = quote_for(ch) else { continue };
            let start = line.start + idx;
            let end = start + ch.len_utf8();
            if touches_caret(start, end, caret) {
                continue;
            }
            out.push(Decoration {
                start,
                end,
                rendered_text: quote.to_string(),
                kind: DecorationKind::Quote,
                style: DecorationStyle::default(),
            });
        }

        if self.settings.auto_translate_enabled {
            let style = self.translation_style();
            for token in find_script_tokens(line.text) {
                let start = line.start + token.start;
                let end = line.start + token.end;
                if touches_caret(start, end, caret) {
                    continue;
                }
                // Unknown words stay raw so the user can see they are undefined
                let Some(translation) = self.dictionary.translation(token.base_word()) else {
                    continue;
                };
                let rendered_text = if token.is_name {
                    utils::capitalize_first(translation)
                } else {
                    translation.to_string()
                };
                out.push(Decoration {
                    start,
                    end,
                    rendered_text,
                    kind: DecorationKind::Translation,
                    style: style.clone(),
                });
            }
        }

        out[first..].sort_by_key(|d| d.start);
    }

    fn translation_style(&self) -> DecorationStyle {
        DecorationStyle {
            italic: self.settings.italicise_translations,
            colour: self.settings.colour().map(str::to_string),
        }
    }
}

/// Apply a sorted, non-overlapping decoration set to `text`.
///
/// Used by hosts without a native overlay. Spans that overlap an earlier
/// span or fall outside `text` are ignored.
pub fn render(text: &str, decorations: &[Decoration]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    for d in decorations {
        if d.start < pos || d.end > text.len() || d.start > d.end {
            continue;
        }
        let (Some(before), Some(_)) = (text.get(pos..d.start), text.get(d.start..d.end)) else {
            continue;
        };
        out.push_str(before);
        out.push_str(&d.rendered_text);
        pos = d.end;
    }
    out.push_str(&text[pos..]);
    out
}

/// Why a decoration pass was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    DocumentChanged,
    ViewportChanged,
    SelectionChanged,
    /// Settings that affect rendering changed
    ForceRefresh,
}

/// The current decoration set, recomputed in full on every trigger.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    decorations: Vec<Decoration>,
    passes: u64,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh(
        &mut self,
        trigger: RefreshTrigger,
        builder: &DecorationBuilder<'_>,
        view: &DocumentView<'_>,
        caret: usize,
    ) -> &[Decoration] {
        self.decorations = builder.build(view, caret);
        self.passes += 1;
        tracing::trace!(
            ?trigger,
            caret,
            spans = self.decorations.len(),
            "decorations refreshed"
        );
        &self.decorations
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    /// Number of passes computed so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }
}
