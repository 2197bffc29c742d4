//! Terminal implementations of the host collaborators.

use shavian_core::{
    Decoration, DecorationKind, DefinitionRequest, HostUi, PromptResponse, WordMapping,
};
use std::io::{self, BufRead, Write};

const ITALIC: &str = "\x1b[3m";
const ACCENT: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Notices go to stderr so rendered text on stdout stays clean.
#[derive(Debug, Default)]
pub struct TerminalUi;

impl HostUi for TerminalUi {
    fn notify(&mut self, message: &str) {
        eprintln!("ℹ {}", message);
    }
}

/// Show a definition prompt and read one line of input.
///
/// A blank line or end of input cancels.
pub fn prompt<R: BufRead, W: Write>(
    request: &DefinitionRequest,
    input: &mut R,
    output: &mut W,
) -> io::Result<PromptResponse> {
    write!(output, "{} ", request.prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(PromptResponse::Cancelled);
    }
    let answer = line.trim();
    if answer.is_empty() {
        Ok(PromptResponse::Cancelled)
    } else {
        Ok(PromptResponse::Confirmed(answer.to_string()))
    }
}

/// Apply decorations to `text`, optionally styling translations with ANSI
/// escapes (italic, accent colour).
pub fn styled(text: &str, decorations: &[Decoration], ansi: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    for d in decorations {
        let (Some(before), true) = (text.get(pos..d.start), d.end <= text.len()) else {
            continue;
        };
        out.push_str(before);
        let styled_word = ansi && d.kind == DecorationKind::Translation;
        if styled_word && d.style.italic {
            out.push_str(ITALIC);
        }
        if styled_word && d.style.colour.is_some() {
            out.push_str(ACCENT);
        }
        out.push_str(&d.rendered_text);
        if styled_word && (d.style.italic || d.style.colour.is_some()) {
            out.push_str(RESET);
        }
        pos = d.end;
    }
    out.push_str(text.get(pos..).unwrap_or_default());
    out
}

/// Format the dictionary listing, one entry per line.
pub fn format_listing(entries: &[WordMapping]) -> String {
    let width = entries
        .iter()
        .map(|m| m.translation.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for m in entries {
        out.push_str(&format!(
            "{:<width$}  {}  ({})\n",
            m.translation,
            m.script,
            m.created_at.format("%Y-%m-%d"),
            width = width
        ));
    }
    out
}
