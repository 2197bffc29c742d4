//! Unknown-word capture.
//!
//! When the user finishes a Shavian word the dictionary does not know yet,
//! the flow asks the host to prompt for its translation. While a prompt is
//! open, further word boundaries are ignored so rapid typing (or the
//! prompt's own keystrokes) cannot stack a second request.

use crate::dictionary::{Definition, Dictionary};
use crate::error::UsageError;
use crate::script::{find_script_tokens, first_script_word};

/// Capture state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    /// A prompt for `word` is open
    AwaitingDefinition { word: String },
}

/// What the host should show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionRequest {
    pub word: String,
    pub prompt: String,
}

/// The user's answer to a [`DefinitionRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    Confirmed(String),
    Cancelled,
}

/// How a prompt was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Defined {
        word: String,
        translation: String,
        definition: Definition,
    },
    Cancelled,
    /// Confirmed with blank input; nothing stored
    Empty,
    /// No prompt was open
    NotAwaiting,
}

/// The Shavian word ending at `caret` in `line`, without its namer dot.
///
/// Only the whitespace-delimited chunk directly before the caret is
/// considered. The word must end that chunk apart from trailing
/// punctuation; a chunk ending in other letters or digits has no word.
pub fn word_before_caret(line: &str, caret: usize) -> Option<&str> {
    let head = line.get(..caret)?;
    let chunk = head.rsplit(char::is_whitespace).next()?;
    let token = find_script_tokens(chunk).last()?;
    if chunk[token.end..].chars().any(char::is_alphanumeric) {
        return None;
    }
    Some(token.base_word())
}

/// Prompts for unknown words, one at a time.
#[derive(Debug, Clone, Default)]
pub struct CaptureFlow {
    state: CaptureState,
}

impl CaptureFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == CaptureState::Idle
    }

    fn await_word(&mut self, word: &str, dictionary: &Dictionary) -> DefinitionRequest {
        let prompt = match dictionary.translation(word) {
            Some(current) => format!("Translation for {word} (currently \"{current}\"):"),
            None => format!("Translation for {word}:"),
        };
        self.state = CaptureState::AwaitingDefinition {
            word: word.to_string(),
        };
        tracing::debug!(word, "awaiting definition");
        DefinitionRequest {
            word: word.to_string(),
            prompt,
        }
    }

    /// Handle a word-boundary keystroke with the caret at `caret` in `line`.
    ///
    /// Returns a request when the preceding word is Shavian and undefined.
    pub fn on_word_boundary(
        &mut self,
        line: &str,
        caret: usize,
        dictionary: &Dictionary,
    ) -> Option<DefinitionRequest> {
        if !self.is_idle() {
            tracing::trace!("word boundary ignored while a definition is pending");
            return None;
        }
        let word = word_before_caret(line, caret)?;
        if dictionary.contains(word) {
            return None;
        }
        Some(self.await_word(word, dictionary))
    }

    /// Start a definition for the first Shavian word of a selection.
    pub fn request_for_selection(
        &mut self,
        selection: &str,
        dictionary: &Dictionary,
    ) -> Result<DefinitionRequest, UsageError> {
        if !self.is_idle() {
            return Err(UsageError::DefinitionPending);
        }
        let word = first_script_word(selection).ok_or(UsageError::NoScriptWord)?;
        Ok(self.await_word(word, dictionary))
    }

    /// Apply the user's answer. Always returns to `Idle`.
    pub fn resolve(&mut self, response: PromptResponse, dictionary: &mut Dictionary) -> CaptureOutcome {
        let word = match std::mem::take(&mut self.state) {
            CaptureState::Idle => return CaptureOutcome::NotAwaiting,
            CaptureState::AwaitingDefinition { word } => word,
        };
        let input = match response {
            PromptResponse::Cancelled => return CaptureOutcome::Cancelled,
            PromptResponse::Confirmed(input) => input,
        };
        match dictionary.define(&word, &input) {
            Ok(definition) => CaptureOutcome::Defined {
                translation: dictionary.translation(&word).unwrap_or_default().to_string(),
                word,
                definition,
            },
            Err(UsageError::EmptyDefinition) => CaptureOutcome::Empty,
            Err(e) => {
                // words reach here only through the script tokenizer
                tracing::warn!(word = %word, error = %e, "definition rejected");
                CaptureOutcome::Empty
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRIEND: &str = "𐑓𐑮𐑧𐑯𐑛";
    const HELLO: &str = "𐑣𐑧𐑤𐑴";

    #[test]
    fn word_before_caret_extraction() {
        let line = format!("say ·{FRIEND}, ok");
        let caret = line.find(',').unwrap() + 1;
        assert_eq!(word_before_caret(&line, caret), Some(FRIEND));
        assert_eq!(word_before_caret(&line, line.len()), None);
        assert_eq!(word_before_caret(&line, 4), None);
        assert_eq!(word_before_caret(&line, 1000), None);
    }

    #[test]
    fn word_before_caret_must_end_the_chunk() {
        let latin_after = format!("{FRIEND},abc");
        assert_eq!(word_before_caret(&latin_after, latin_after.len()), None);
        let digits_after = format!("{FRIEND}42");
        assert_eq!(word_before_caret(&digits_after, digits_after.len()), None);

        let punctuated = format!("x {FRIEND}?!\"");
        assert_eq!(word_before_caret(&punctuated, punctuated.len()), Some(FRIEND));
        let mixed = format!("abc{FRIEND}");
        assert_eq!(word_before_caret(&mixed, mixed.len()), Some(FRIEND));
    }

    #[test]
    fn unknown_word_prompts_then_defines() {
        let mut dict = Dictionary::in_memory();
        let mut flow = CaptureFlow::new();

        let req = flow.on_word_boundary(FRIEND, FRIEND.len(), &dict).unwrap();
        assert_eq!(req.word, FRIEND);
        assert!(req.prompt.contains(FRIEND));
        assert!(matches!(flow.state(), CaptureState::AwaitingDefinition { word } if word == FRIEND));

        let outcome = flow.resolve(PromptResponse::Confirmed(" friend ".into()), &mut dict);
        assert_eq!(
            outcome,
            CaptureOutcome::Defined {
                word: FRIEND.into(),
                translation: "friend".into(),
                definition: Definition::Added,
            }
        );
        assert!(flow.is_idle());
        assert_eq!(dict.translation(FRIEND), Some("friend"));
    }

    #[test]
    fn known_or_latin_words_do_not_prompt() {
        let mut dict = Dictionary::in_memory();
        dict.define(HELLO, "hello").unwrap();
        let mut flow = CaptureFlow::new();
        assert!(flow.on_word_boundary(HELLO, HELLO.len(), &dict).is_none());
        assert!(flow.on_word_boundary("plain", 5, &dict).is_none());
        assert!(flow.is_idle());
    }

    #[test]
    fn pending_prompt_suppresses_new_requests() {
        let mut dict = Dictionary::in_memory();
        let mut flow = CaptureFlow::new();
        let line = format!("{FRIEND} {HELLO}");

        assert!(flow.on_word_boundary(&line, FRIEND.len(), &dict).is_some());
        assert!(flow.on_word_boundary(&line, line.len(), &dict).is_none());
        assert_eq!(
            flow.request_for_selection(&line, &dict),
            Err(UsageError::DefinitionPending)
        );

        assert_eq!(flow.resolve(PromptResponse::Cancelled, &mut dict), CaptureOutcome::Cancelled);
        assert!(flow.is_idle());
        assert!(dict.is_empty());
        assert_eq!(flow.resolve(PromptResponse::Cancelled, &mut dict), CaptureOutcome::NotAwaiting);
    }

    #[test]
    fn blank_confirmation_returns_to_idle() {
        let mut dict = Dictionary::in_memory();
        let mut flow = CaptureFlow::new();
        flow.on_word_boundary(FRIEND, FRIEND.len(), &dict);
        assert_eq!(
            flow.resolve(PromptResponse::Confirmed("   ".into()), &mut dict),
            CaptureOutcome::Empty
        );
        assert!(flow.is_idle());
        assert!(dict.is_empty());
    }

    #[test]
    fn selection_uses_first_script_word() {
        let dict = Dictionary::in_memory();
        let mut flow = CaptureFlow::new();
        let req = flow
            .request_for_selection(&format!("the ·{HELLO} {FRIEND}"), &dict)
            .unwrap();
        assert_eq!(req.word, HELLO);

        let mut flow = CaptureFlow::new();
        assert_eq!(
            flow.request_for_selection("latin only", &dict),
            Err(UsageError::NoScriptWord)
        );
        assert!(flow.is_idle());
    }
}
