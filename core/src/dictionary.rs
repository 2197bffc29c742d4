//! The personal Shavian → Latin dictionary.
//!
//! Entries are keyed by the Shavian spelling. Redefining a key replaces its
//! translation and keeps the original creation time. Every mutation is
//! persisted immediately through the injected [`Storage`]; persistence
//! failures are logged and never roll back the in-memory state.
//!
//! On disk the dictionary is a JSON document. Writers always emit the
//! canonical shape:
//!
//! ```json
//! {"version": "1.0", "exportDate": "...", "wordCount": 1,
//!  "dictionary": [["𐑓𐑮𐑧𐑯𐑛", {"latin": "friend", "dateAdded": "..."}]]}
//! ```
//!
//! Readers also accept a bare array of `[key, value]` pairs and a bare
//! `{key: value}` object, where `value` is either a record or a plain
//! translation string.

use crate::error::{Error, Result, UsageError};
use crate::script::script_key;
use crate::storage::{MemoryStorage, Storage};
use crate::utils;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Version string written to the canonical document.
pub const FORMAT_VERSION: &str = "1.0";

/// One learned word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordMapping {
    pub script: String,
    pub translation: String,
    pub created_at: DateTime<Utc>,
}

/// Which on-disk shape the dictionary was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// `{version, exportDate, wordCount, dictionary: [[k, v], ...]}`
    Canonical,
    /// `[[k, v], ...]`
    PairArray,
    /// `{k: v, ...}`
    LegacyObject,
    /// Nothing usable was found; the store started empty
    Fresh,
}

/// Result of [`Dictionary::define`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Definition {
    Added,
    Updated,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalFile<'a> {
    version: &'static str,
    export_date: String,
    word_count: usize,
    dictionary: Vec<(&'a str, StoredRecord<'a>)>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord<'a> {
    latin: &'a str,
    date_added: String,
}

/// A value as found on disk: a record or a legacy plain translation.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredValue {
    Plain(String),
    Record {
        #[serde(alias = "translation")]
        latin: String,
        #[serde(default, rename = "dateAdded")]
        date_added: Option<Value>,
    },
}

/// The recognized top-level shapes, tried in order.
enum FileShape {
    Canonical(Vec<Value>),
    Pairs(Vec<Value>),
    Legacy(Map<String, Value>),
}

impl FileShape {
    fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::canonical(&value)
            .or_else(|| Self::pairs(&value))
            .or_else(|| Self::legacy(&value))
            .ok_or(Error::UnrecognizedShape("expected an object or an array"))
    }

    fn canonical(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let entries = object.get("dictionary")?.as_array()?;
        if let Some(version) = object.get("version").and_then(Value::as_str) {
            tracing::debug!(version, "reading canonical dictionary document");
        }
        Some(FileShape::Canonical(entries.clone()))
    }

    fn pairs(value: &Value) -> Option<Self> {
        value.as_array().map(|a| FileShape::Pairs(a.clone()))
    }

    fn legacy(value: &Value) -> Option<Self> {
        value.as_object().map(|o| FileShape::Legacy(o.clone()))
    }

    fn origin(&self) -> LoadOrigin {
        match self {
            FileShape::Canonical(_) => LoadOrigin::Canonical,
            FileShape::Pairs(_) => LoadOrigin::PairArray,
            FileShape::Legacy(_) => LoadOrigin::LegacyObject,
        }
    }

    /// Decode every usable entry, skipping the corrupt ones.
    fn into_mappings(self, loaded_at: DateTime<Utc>) -> Vec<WordMapping> {
        let raw: Vec<(String, Value)> = match self {
            FileShape::Canonical(items) | FileShape::Pairs(items) => items
                .into_iter()
                .filter_map(|item| match serde_json::from_value::<(String, Value)>(item) {
                    Ok(pair) => Some(pair),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping malformed dictionary pair");
                        None
                    }
                })
                .collect(),
            FileShape::Legacy(map) => map.into_iter().collect(),
        };

        raw.into_iter()
            .filter_map(|(script, value)| decode_entry(script, value, loaded_at))
            .collect()
    }
}

fn decode_entry(key: String, value: Value, loaded_at: DateTime<Utc>) -> Option<WordMapping> {
    let Some(script) = script_key(&key).map(str::to_string) else {
        tracing::warn!(word = %key, "skipping dictionary key that is not a Shavian word");
        return None;
    };
    let (translation, date_added) = match serde_json::from_value::<StoredValue>(value) {
        Ok(StoredValue::Plain(t)) => (t, None),
        Ok(StoredValue::Record { latin, date_added }) => (latin, date_added),
        Err(e) => {
            tracing::warn!(word = %script, error = %e, "skipping unreadable dictionary entry");
            return None;
        }
    };
    let translation = utils::normalize(&translation);
    if translation.is_empty() {
        tracing::warn!(word = %script, "skipping dictionary entry with empty translation");
        return None;
    }
    let created_at = date_added
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or(loaded_at);

    Some(WordMapping {
        script,
        translation,
        created_at,
    })
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Keyed store of [`WordMapping`]s with write-through persistence.
pub struct Dictionary {
    words: HashMap<String, WordMapping>,
    storage: Box<dyn Storage>,
    origin: LoadOrigin,
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("words", &self.words.len())
            .field("origin", &self.origin)
            .finish()
    }
}

impl Dictionary {
    /// Create an empty dictionary that persists to `storage`.
    pub fn new<S: Storage + 'static>(storage: S) -> Self {
        Self {
            words: HashMap::new(),
            storage: Box::new(storage),
            origin: LoadOrigin::Fresh,
        }
    }

    /// Create an empty dictionary backed by a private in-memory document.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Load the dictionary from `storage`.
    ///
    /// Never fails: a missing or unreadable document yields an empty store.
    pub fn load<S: Storage + 'static>(storage: S) -> Self {
        let mut dict = Self::new(storage);
        let text = match dict.storage.read() {
            Ok(text) => text,
            Err(e) => {
                tracing::info!(reason = %e, "dictionary not found, starting fresh");
                return dict;
            }
        };
        match FileShape::parse(&text) {
            Ok(shape) => {
                dict.origin = shape.origin();
                for mapping in shape.into_mappings(Utc::now()) {
                    dict.words.insert(mapping.script.clone(), mapping);
                }
                tracing::info!(words = dict.words.len(), origin = ?dict.origin, "dictionary loaded");
            }
            Err(e) => {
                tracing::info!(reason = %e, "dictionary not found, starting fresh");
            }
        }
        dict
    }

    /// The shape the current contents were loaded from.
    pub fn load_origin(&self) -> LoadOrigin {
        self.origin
    }

    /// Number of stored words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether no words are stored.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whether `script` has an entry.
    pub fn contains(&self, script: &str) -> bool {
        self.words.contains_key(script)
    }

    /// The full entry for `script`.
    pub fn get(&self, script: &str) -> Option<&WordMapping> {
        self.words.get(script)
    }

    /// Translation for a Shavian word, if learned.
    pub fn translation(&self, script: &str) -> Option<&str> {
        self.words.get(script).map(|m| m.translation.as_str())
    }

    /// All entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &WordMapping> {
        self.words.values()
    }

    /// Insert or update a word, then persist.
    ///
    /// The key must be a Shavian word; a leading namer dot is dropped so
    /// names share the entry of their base word. The translation is
    /// NFC-normalized and trimmed. Updating keeps the entry's creation time.
    pub fn define(
        &mut self,
        script: &str,
        translation: &str,
    ) -> std::result::Result<Definition, UsageError> {
        let outcome = self.define_in_memory(script, translation)?;
        tracing::debug!(word = %script, ?outcome, "word defined");
        self.persist();
        Ok(outcome)
    }

    fn define_in_memory(
        &mut self,
        script: &str,
        translation: &str,
    ) -> std::result::Result<Definition, UsageError> {
        let script = script_key(script).ok_or_else(|| UsageError::NotScript(script.to_string()))?;
        let translation = utils::normalize(translation);
        if translation.is_empty() {
            return Err(UsageError::EmptyDefinition);
        }

        if let Some(existing) = self.words.get_mut(script) {
            existing.translation = translation;
            return Ok(Definition::Updated);
        }
        self.words.insert(
            script.to_string(),
            WordMapping {
                script: script.to_string(),
                translation,
                created_at: Utc::now(),
            },
        );
        Ok(Definition::Added)
    }

    /// Delete a word if present, then persist.
    pub fn remove(&mut self, script: &str) -> Option<WordMapping> {
        let removed = self.words.remove(script);
        tracing::debug!(word = %script, found = removed.is_some(), "word removed");
        self.persist();
        removed
    }

    /// Entries sorted by translation (case-insensitive), then by script.
    pub fn entries_sorted(&self) -> Vec<&WordMapping> {
        let mut entries: Vec<&WordMapping> = self.words.values().collect();
        entries.sort_by(|a, b| {
            a.translation
                .to_lowercase()
                .cmp(&b.translation.to_lowercase())
                .then_with(|| a.script.cmp(&b.script))
        });
        entries
    }

    /// Entries in creation order, ties broken by script.
    fn entries_by_age(&self) -> Vec<&WordMapping> {
        let mut entries: Vec<&WordMapping> = self.words.values().collect();
        entries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.script.cmp(&b.script))
        });
        entries
    }

    /// Build the lowercase translation → script lookup.
    ///
    /// Translations are not unique; entries are folded oldest first, so the
    /// most recently created word wins a collision.
    pub fn reverse_index(&self) -> HashMap<String, String> {
        self.entries_by_age()
            .into_iter()
            .map(|m| (m.translation.to_lowercase(), m.script.clone()))
            .collect()
    }

    /// Serialize the whole store in the canonical shape.
    pub fn to_json(&self) -> Result<String> {
        let entries = self.entries_by_age();
        let file = CanonicalFile {
            version: FORMAT_VERSION,
            export_date: format_timestamp(&Utc::now()),
            word_count: entries.len(),
            dictionary: entries
                .into_iter()
                .map(|m| {
                    (
                        m.script.as_str(),
                        StoredRecord {
                            latin: &m.translation,
                            date_added: format_timestamp(&m.created_at),
                        },
                    )
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Write the canonical document to storage.
    pub fn save(&self) -> Result<()> {
        let json = self.to_json()?;
        self.storage.write(&json)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, "failed to save dictionary; keeping in-memory state");
        }
    }

    /// Merge a document in any accepted shape into the store, then save
    /// once. Returns the number of entries applied.
    ///
    /// A failed save is returned; the merged entries stay in memory.
    pub fn merge_json(&mut self, text: &str) -> Result<usize> {
        let shape = FileShape::parse(text)?;
        let mut applied = 0;
        for mapping in shape.into_mappings(Utc::now()) {
            if self
                .define_in_memory(&mapping.script, &mapping.translation)
                .is_ok()
            {
                applied += 1;
            }
        }
        if applied > 0 {
            self.save()?;
        }
        Ok(applied)
    }

    /// Save and wait for queued writes; called on deactivation.
    pub fn flush(&self) {
        self.persist();
        self.storage.flush();
    }
}
