use std::sync::Arc;

use serde_json::json;

use crate::dictionary_database::MemoryDictionaryDatabase;
use crate::translation::{
    FindKanjiDictionary, FindKanjiOptions, FindTermDictionary, FindTermsOptions,
    KanjiEnabledDictionaryMap, TermEnabledDictionaryMap,
};
use crate::translator::Translator;

pub fn term_enabled_map(names: &[&str]) -> TermEnabledDictionaryMap {
    names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            (
                name.to_string(),
                FindTermDictionary {
                    index,
                    priority: 0,
                    alias: name.to_string(),
                    allow_secondary_searches: false,
                },
            )
        })
        .collect()
}

pub fn kanji_enabled_map(names: &[&str]) -> KanjiEnabledDictionaryMap {
    names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            (
                name.to_string(),
                FindKanjiDictionary {
                    index,
                    priority: 0,
                    alias: name.to_string(),
                },
            )
        })
        .collect()
}

pub fn japanese_options(dictionaries: &[&str]) -> FindTermsOptions {
    FindTermsOptions {
        enabled_dictionary_map: term_enabled_map(dictionaries),
        ..FindTermsOptions::default()
    }
}

pub fn kanji_options(dictionaries: &[&str]) -> FindKanjiOptions {
    FindKanjiOptions {
        enabled_dictionary_map: kanji_enabled_map(dictionaries),
        remove_non_japanese_characters: false,
    }
}

/// A small fixture database covering the verbal paradigm, sequences,
/// frequency/pitch metadata and tags.
pub fn fixture_database() -> MemoryDictionaryDatabase {
    let mut db = MemoryDictionaryDatabase::new();
    db.import_term_bank(
        "jmdict",
        &[
            json!(["食べる", "たべる", "vt", "v1", 10, ["to eat"], 101, ""]),
            json!(["走る", "はしる", "vi", "v5", 5, ["to run"], 102, ""]),
            json!(["読む", "よむ", "vt", "v5", 5, ["to read"], 103, ""]),
            json!(["高い", "たかい", "adj", "adj-i", 3, ["tall", "expensive"], 104, ""]),
            json!(["会う", "あう", "vi", "v5", 8, ["to meet"], 42, ""]),
            json!(["逢う", "あう", "vi", "v5", 2, ["to meet (a person)"], 42, ""]),
            json!(["箸", "はし", "n", "", 4, ["chopsticks"], 105, ""]),
            json!(["橋", "はし", "n", "", 4, ["bridge"], 106, ""]),
            json!(["すごい", "すごい", "adj", "adj-i", 7, ["amazing"], 107, ""]),
        ],
    )
    .unwrap();
    db.import_term_bank(
        "jmdict2",
        &[json!(["食べる", "たべる", "vt", "v1", 6, ["to eat; to consume"], -1, ""])],
    )
    .unwrap();
    db.import_tag_bank(
        "jmdict",
        &[
            json!(["vt", "partOfSpeech", 3, "transitive verb", 0]),
            json!(["vi", "partOfSpeech", 3, "intransitive verb", 0]),
            json!(["adj", "partOfSpeech", 3, "i-adjective", 0]),
            json!(["n", "partOfSpeech", 3, "noun", 0]),
        ],
    )
    .unwrap();
    db.import_term_bank(
        "forms",
        &[json!([
            "食べた", "たべた", "non-lemma", "", 0, ["past form"], -1, "",
            "食べる", [["past"]]
        ])],
    )
    .unwrap();
    db.import_term_bank(
        "endict",
        &[json!(["read", "", "v", "", 1, ["to look at and comprehend"], -1, ""])],
    )
    .unwrap();
    db.import_term_meta_bank(
        "freqdict",
        &[
            json!(["箸", "freq", {"reading": "はし", "frequency": 100}]),
            json!(["橋", "freq", {"reading": "はし", "frequency": 50}]),
            json!(["食べる", "freq", 12]),
        ],
    )
    .unwrap();
    db.import_term_meta_bank(
        "accents",
        &[json!([
            "食べる", "pitch",
            {"reading": "たべる", "pitches": [{"position": 2}]}
        ])],
    )
    .unwrap();
    db.import_kanji_bank(
        "kanjidic",
        &[json!([
            "食", "ショク ジキ", "く.う た.べる", "jouyou", ["eat", "food"],
            {"grade": "2"}
        ])],
    )
    .unwrap();
    db.import_kanji_meta_bank("kanjidic", &[json!(["食", "freq", 33])])
        .unwrap();
    db.import_tag_bank(
        "kanjidic",
        &[
            json!(["jouyou", "frequent", 2, "approved for common use", 0]),
            json!(["grade", "misc", 0, "school grade", 0]),
        ],
    )
    .unwrap();
    db
}

pub fn fixture_translator() -> Translator<MemoryDictionaryDatabase> {
    Translator::new(Arc::new(fixture_database()))
}
