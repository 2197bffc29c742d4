//! End-to-end scenarios for the dictionary, decoration and translation paths.

use shavian_core::{
    render, tokenize_mixed, translator, DecorationBuilder, Dictionary, DocumentView, FileStorage,
    LoadOrigin, MemoryStorage, Settings,
};

const HELLO: &str = "𐑣𐑧𐑤𐑴";
const FRIEND: &str = "𐑓𐑮𐑧𐑯𐑛";

#[test]
fn scenario_a_missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let dict = Dictionary::load(FileStorage::in_root(dir.path()));
    assert_eq!(dict.len(), 0);
    assert_eq!(dict.load_origin(), LoadOrigin::Fresh);
}

#[test]
fn scenario_b_defined_word_renders_unless_caret_inside() {
    let mut dict = Dictionary::in_memory();
    dict.define(FRIEND, "friend").unwrap();
    let settings = Settings::default();
    let builder = DecorationBuilder::new(&dict, &settings);

    let line = format!("my {FRIEND} is here");
    let view = DocumentView::from_text(&line);

    let decorations = builder.build(&view, line.len());
    assert_eq!(decorations.len(), 1);
    assert_eq!(decorations[0].rendered_text, "friend");
    assert!(decorations[0].style.italic);
    assert!(decorations[0].style.colour.is_some());
    assert_eq!(render(&line, &decorations), "my friend is here");

    let inside = 3 + "𐑓𐑮".len();
    let decorations = builder.build(&view, inside);
    assert!(decorations.is_empty());
    assert_eq!(render(&line, &decorations), line);
}

#[test]
fn scenario_c_legacy_object_loads() {
    let storage = MemoryStorage::with_contents(format!(r#"{{"{HELLO}": "hello"}}"#));
    let dict = Dictionary::load(storage);
    assert_eq!(dict.load_origin(), LoadOrigin::LegacyObject);
    assert_eq!(dict.len(), 1);
    assert_eq!(dict.translation(HELLO), Some("hello"));
}

#[test]
fn scenario_d_full_translation() {
    let mut dict = Dictionary::in_memory();
    dict.define(HELLO, "hello").unwrap();
    dict.define(FRIEND, "friend").unwrap();

    let t = translator::translate(&dict, "Hello friend.").unwrap();
    assert_eq!(t.output, format!("·{HELLO} {FRIEND}."));
    assert!(!t.has_untranslated);

    // and the result renders back with the name capitalised
    let settings = Settings::default();
    let view = DocumentView::from_text(&t.output);
    let decorations = DecorationBuilder::new(&dict, &settings).build(&view, t.output.len());
    assert_eq!(render(&t.output, &decorations), "Hello friend.");
}

#[test]
fn scenario_e_partial_translation() {
    let mut dict = Dictionary::in_memory();
    dict.define(HELLO, "hello").unwrap();

    let t = translator::translate(&dict, "hello there").unwrap();
    assert!(t.has_untranslated);
    assert_eq!(t.output, format!("{HELLO} there"));
}

#[test]
fn redefining_with_same_translation_is_idempotent() {
    let mut dict = Dictionary::in_memory();
    dict.define(HELLO, "hello").unwrap();
    dict.define(FRIEND, "friend").unwrap();
    let before: Vec<_> = dict.entries_sorted().into_iter().cloned().collect();

    dict.define(FRIEND, "friend").unwrap();
    let after: Vec<_> = dict.entries_sorted().into_iter().cloned().collect();
    assert_eq!(before, after);
}

#[test]
fn caret_adjacency_token_at_five() {
    let mut dict = Dictionary::in_memory();
    dict.define("𐑨", "a").unwrap();
    let settings = Settings::default();
    let builder = DecorationBuilder::new(&dict, &settings);

    // "abcde" then one 4-byte letter: token spans [5, 9)
    let line = "abcde𐑨 tail";
    let view = DocumentView::from_text(line);
    for caret in 5..=9 {
        assert!(builder.build(&view, caret).is_empty(), "caret {caret}");
    }
    assert_eq!(builder.build(&view, 4).len(), 1);
    assert_eq!(builder.build(&view, 10).len(), 1);
}

#[test]
fn mixed_tokenization_reassembles() {
    let text = "It's 9 o'clock -- «quoted» text!\n";
    let joined: String = tokenize_mixed(text).map(|s| s.as_str()).collect();
    assert_eq!(joined, text);
}
