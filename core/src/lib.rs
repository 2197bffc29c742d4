//! shavian-core
//!
//! A personal Shavian ↔ Latin dictionary and the live rendering layer built
//! on it. Words the user has defined are displayed as their Latin
//! translation while they write in Shavian, and Latin text can be
//! translated back into Shavian on demand.
//!
//! Public API:
//! - `Dictionary` - Keyed word store with load/migrate/save semantics
//! - `DecorationBuilder` - Replacement spans for the visible text
//! - `Translator` - Best-effort Latin → Shavian batch translation
//! - `CaptureFlow` - Prompting for unknown words as they are completed
//! - `Engine` - Controller wiring the above to a host editor and UI
//! - `Settings` - Display and behaviour options

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result, UsageError};

pub mod script;
pub use script::{
    find_script_tokens, is_script_text, is_script_word, script_key, tokenize_mixed, ScriptToken,
    Segment,
};

pub mod storage;
pub use storage::{BackgroundStorage, FileStorage, MemoryStorage, Storage};

pub mod dictionary;
pub use dictionary::{Definition, Dictionary, LoadOrigin, WordMapping};

pub mod host;
pub use host::{HostEditor, HostUi, NoticeLog};

pub mod buffer;
pub use buffer::TextBuffer;

pub mod decoration;
pub use decoration::{
    render, Decoration, DecorationBuilder, DecorationKind, DecorationStyle, DocumentView, Line,
    Overlay, RefreshTrigger,
};

pub mod translator;
pub use translator::{Translation, Translator};

pub mod capture;
pub use capture::{CaptureFlow, CaptureOutcome, CaptureState, DefinitionRequest, PromptResponse};

pub mod engine;
pub use engine::{Command, CommandResult, Engine, KeyEvent, KeyResult, PasteResult};

/// Dictionary location relative to the document collection root.
pub const DICTIONARY_FILE: &str = ".shavian/dictionary.json";

/// Default colour for rendered translations.
pub const DEFAULT_TRANSLATION_COLOUR: &str = "var(--text-accent)";

/// Display and behaviour settings.
///
/// Owned and persisted by the host; the core reads them on every
/// decoration pass. Field names also accept the camelCase spelling used by
/// host settings blobs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Render learned words as their translation
    #[serde(alias = "autoTranslateEnabled")]
    pub auto_translate_enabled: bool,

    /// Render translations in italics
    #[serde(alias = "italiciseTranslations")]
    pub italicise_translations: bool,

    /// CSS colour for translations; empty inherits the text colour
    #[serde(alias = "translationColour")]
    pub translation_colour: String,

    /// Translate pasted Latin text into Shavian
    #[serde(alias = "autoTranslateOnPaste")]
    pub auto_translate_on_paste: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_translate_enabled: true,
            italicise_translations: true,
            translation_colour: DEFAULT_TRANSLATION_COLOUR.to_string(),
            auto_translate_on_paste: true,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load settings from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load_toml_or_default<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Save settings to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn toggle_auto_translate(&mut self) {
        self.auto_translate_enabled = !self.auto_translate_enabled;
    }

    /// The translation colour, or `None` to inherit.
    pub fn colour(&self) -> Option<&str> {
        let colour = self.translation_colour.trim();
        (!colour.is_empty()).then_some(colour)
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }

    /// Uppercase the first character, leaving the rest untouched.
    pub fn capitalize_first(s: &str) -> String {
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
