//! Batch translation of Latin text into Shavian.
//!
//! Best effort only: every word found in the dictionary's reverse index is
//! replaced by its Shavian spelling, everything else passes through
//! verbatim. Capitalised words are written with the namer dot.

use crate::dictionary::Dictionary;
use crate::error::UsageError;
use crate::script::{is_script_text, tokenize_mixed, Segment, NAME_MARKER};
use std::collections::HashMap;

/// Output of a batch translation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Translation {
    pub output: String,
    /// At least one word had no dictionary entry
    pub has_untranslated: bool,
    /// Number of words replaced
    pub translated_words: usize,
}

/// Translator over a snapshot of the dictionary's reverse index.
#[derive(Debug, Clone)]
pub struct Translator {
    index: HashMap<String, String>,
}

impl Translator {
    /// Build a fresh reverse index from `dictionary`.
    pub fn new(dictionary: &Dictionary) -> Self {
        Self {
            index: dictionary.reverse_index(),
        }
    }

    /// Translate Latin `text`. Shavian input is a usage error.
    pub fn translate(&self, text: &str) -> Result<Translation, UsageError> {
        if is_script_text(text) {
            return Err(UsageError::AlreadyScript);
        }

        let mut result = Translation {
            output: String::with_capacity(text.len() * 2),
            ..Translation::default()
        };
        for segment in tokenize_mixed(text) {
            let word = match segment {
                Segment::Other(s) => {
                    result.output.push_str(s);
                    continue;
                }
                Segment::Word(w) => w,
            };
            match self.index.get(&word.to_lowercase()) {
                Some(script) => {
                    if word.chars().next().is_some_and(char::is_uppercase) {
                        result.output.push(NAME_MARKER);
                    }
                    result.output.push_str(script);
                    result.translated_words += 1;
                }
                None => {
                    result.output.push_str(word);
                    result.has_untranslated = true;
                }
            }
        }
        Ok(result)
    }
}

/// One-shot translation with a freshly built reverse index.
pub fn translate(dictionary: &Dictionary, text: &str) -> Result<Translation, UsageError> {
    Translator::new(dictionary).translate(text)
}
