//! Error types for shavian-core.

use thiserror::Error;

/// Failures of the persistence and configuration layers.
///
/// None of these are fatal: the dictionary logs them and keeps its in-memory
/// state as the source of truth.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing a storage backend failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The dictionary document is not valid JSON or could not be encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON parsed but matches none of the accepted dictionary shapes
    #[error("unrecognized dictionary shape: {0}")]
    UnrecognizedShape(&'static str),

    /// Settings file could not be parsed
    #[error("settings parse error: {0}")]
    SettingsDecode(#[from] toml::de::Error),

    /// Settings could not be serialized
    #[error("settings encode error: {0}")]
    SettingsEncode(#[from] toml::ser::Error),
}

/// User-facing usage errors. Each aborts the operation without mutating
/// state and is reported through a transient notice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("Select some text first")]
    NoSelection,

    #[error("The selection is already in Shavian")]
    AlreadyScript,

    #[error("No words in the selection are in your dictionary")]
    NothingTranslated,

    #[error("No Shavian word found in the selection")]
    NoScriptWord,

    #[error("A translation cannot be empty")]
    EmptyDefinition,

    #[error("\"{0}\" is not a Shavian word")]
    NotScript(String),

    #[error("Finish the current definition first")]
    DefinitionPending,
}

pub type Result<T> = std::result::Result<T, Error>;
