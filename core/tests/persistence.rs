//! Save/load round trips across storage backends.

use shavian_core::{BackgroundStorage, Dictionary, FileStorage, LoadOrigin, MemoryStorage, Storage};
use std::collections::BTreeMap;

const HELLO: &str = "𐑣𐑧𐑤𐑴";
const FRIEND: &str = "𐑓𐑮𐑧𐑯𐑛";

fn forward_map(dict: &Dictionary) -> BTreeMap<String, String> {
    dict.iter()
        .map(|m| (m.script.clone(), m.translation.clone()))
        .collect()
}

#[test]
fn file_round_trip_preserves_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let mut dict = Dictionary::new(FileStorage::in_root(dir.path()));
    dict.define(HELLO, "hello").unwrap();
    dict.define(FRIEND, "friend").unwrap();
    dict.save().unwrap();

    let loaded = Dictionary::load(FileStorage::in_root(dir.path()));
    assert_eq!(loaded.load_origin(), LoadOrigin::Canonical);
    assert_eq!(forward_map(&loaded), forward_map(&dict));
    for m in loaded.iter() {
        let original = dict.get(&m.script).unwrap();
        assert_eq!(
            m.created_at.timestamp_millis(),
            original.created_at.timestamp_millis()
        );
    }
}

#[test]
fn legacy_file_is_rewritten_canonically() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::in_root(dir.path());
    storage
        .write(&format!(r#"[["{HELLO}", "hello"]]"#))
        .unwrap();

    let mut dict = Dictionary::load(storage.clone());
    assert_eq!(dict.load_origin(), LoadOrigin::PairArray);
    dict.define(FRIEND, "friend").unwrap();

    let json: serde_json::Value = serde_json::from_str(&storage.read().unwrap()).unwrap();
    assert_eq!(json["version"], "1.0");
    assert_eq!(json["wordCount"], 2);
}

#[test]
fn background_writes_land_after_flush() {
    let memory = MemoryStorage::new();
    let mut dict = Dictionary::new(BackgroundStorage::new(memory.clone()));
    for (i, word) in ["𐑨", "𐑩", "𐑪"].iter().enumerate() {
        dict.define(word, &format!("w{i}")).unwrap();
    }
    dict.flush();

    let reloaded = Dictionary::load(memory);
    assert_eq!(forward_map(&reloaded), forward_map(&dict));
}

#[test]
fn failed_save_keeps_memory_state() {
    let dir = tempfile::tempdir().unwrap();
    // a directory where the file should be makes every write fail
    let target = dir.path().join("dictionary.json");
    std::fs::create_dir_all(&target).unwrap();

    let mut dict = Dictionary::new(FileStorage::new(&target));
    dict.define(HELLO, "hello").unwrap();
    assert!(dict.save().is_err());
    assert_eq!(dict.translation(HELLO), Some("hello"));
}
