use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dictionary::{TermSourceMatchSource, TermSourceMatchType};
use crate::dictionary_data::{
    GenericFrequencyData, KanjiBankEntry, KanjiMetaBankEntry, TagBankEntry, TermBankEntry,
    TermGlossary, TermMetaBankEntry, TermMetaData, TermMetaMode,
};
use crate::errors::{DictionaryDatabaseError, SchemaError};
use crate::translation::{KanjiEnabledDictionaryMap, TermEnabledDictionaryMap};

/// A term row as returned by the bulk queries. `index` is the 0-based
/// position of the input query this row answers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermEntry {
    pub index: usize,
    pub id: u64,
    pub term: String,
    pub reading: String,
    pub definition_tags: Vec<String>,
    pub term_tags: Vec<String>,
    /// Rule identifiers for the word classes of the term.
    pub rules: Vec<String>,
    pub definitions: Vec<TermGlossary>,
    pub score: i64,
    pub dictionary: String,
    /// `-1` when the row carried no sequence.
    pub sequence: i64,
    pub match_type: TermSourceMatchType,
    pub match_source: TermSourceMatchSource,
    pub form_of: Option<String>,
    pub inflection_hypotheses: Option<Vec<Vec<String>>>,
}

/// A tag record as returned by `find_tag_meta_bulk`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatabaseTag {
    pub name: String,
    pub category: String,
    pub order: i64,
    pub notes: String,
    pub score: i64,
    pub dictionary: String,
}

/// A term meta row (frequency, pitch or IPA) for one queried term.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermMetaEntry {
    pub index: usize,
    pub term: String,
    pub mode: TermMetaMode,
    pub data: TermMetaData,
    pub dictionary: String,
}

/// A kanji row for one queried character.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KanjiEntry {
    pub index: usize,
    pub character: String,
    pub onyomi: Vec<String>,
    pub kunyomi: Vec<String>,
    pub tags: Vec<String>,
    pub definitions: Vec<String>,
    pub stats: IndexMap<String, String>,
    pub dictionary: String,
}

/// A kanji meta row (frequency only) for one queried character.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KanjiMetaEntry {
    pub index: usize,
    pub character: String,
    pub data: GenericFrequencyData,
    pub dictionary: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermExactQueryRequest {
    pub term: String,
    pub reading: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceQueryRequest {
    pub query: i64,
    pub dictionary: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagQueryRequest {
    pub query: String,
    pub dictionary: String,
}

/// The narrow query interface the engine consumes. Implementations answer
/// bulk queries; every result carries the index of the input query it
/// answers. The engine issues queries in a fixed order within one lookup
/// and never retries failures.
pub trait DictionaryDatabase {
    fn find_terms_bulk(
        &self,
        terms: &[String],
        enabled: &TermEnabledDictionaryMap,
        match_type: TermSourceMatchType,
    ) -> Result<Vec<TermEntry>, DictionaryDatabaseError>;

    fn find_terms_exact_bulk(
        &self,
        queries: &[TermExactQueryRequest],
        enabled: &TermEnabledDictionaryMap,
    ) -> Result<Vec<TermEntry>, DictionaryDatabaseError>;

    fn find_terms_by_sequence_bulk(
        &self,
        queries: &[SequenceQueryRequest],
    ) -> Result<Vec<TermEntry>, DictionaryDatabaseError>;

    fn find_term_meta_bulk(
        &self,
        terms: &[String],
        enabled: &TermEnabledDictionaryMap,
    ) -> Result<Vec<TermMetaEntry>, DictionaryDatabaseError>;

    fn find_kanji_bulk(
        &self,
        characters: &[String],
        enabled: &KanjiEnabledDictionaryMap,
    ) -> Result<Vec<KanjiEntry>, DictionaryDatabaseError>;

    fn find_kanji_meta_bulk(
        &self,
        characters: &[String],
        enabled: &KanjiEnabledDictionaryMap,
    ) -> Result<Vec<KanjiMetaEntry>, DictionaryDatabaseError>;

    /// Index-parallel: the result has one element per query, `None` for
    /// misses.
    fn find_tag_meta_bulk(
        &self,
        queries: &[TagQueryRequest],
    ) -> Result<Vec<Option<DatabaseTag>>, DictionaryDatabaseError>;
}

#[derive(Clone, Debug)]
struct StoredTerm {
    id: u64,
    dictionary: String,
    entry: TermBankEntry,
}

#[derive(Clone, Debug)]
struct StoredTermMeta {
    dictionary: String,
    entry: TermMetaBankEntry,
}

#[derive(Clone, Debug)]
struct StoredKanji {
    dictionary: String,
    entry: KanjiBankEntry,
}

#[derive(Clone, Debug)]
struct StoredKanjiMeta {
    dictionary: String,
    entry: KanjiMetaBankEntry,
}

/// An in-memory [`DictionaryDatabase`] built from schema-validated bank
/// rows. This is the reference implementation the test suite drives; it is
/// not a storage layer.
#[derive(Clone, Debug, Default)]
pub struct MemoryDictionaryDatabase {
    terms: Vec<StoredTerm>,
    term_index: IndexMap<String, Vec<usize>>,
    reading_index: IndexMap<String, Vec<usize>>,
    sequence_index: IndexMap<(String, i64), Vec<usize>>,
    term_meta: IndexMap<String, Vec<StoredTermMeta>>,
    kanji: IndexMap<String, Vec<StoredKanji>>,
    kanji_meta: IndexMap<String, Vec<StoredKanjiMeta>>,
    tags: IndexMap<(String, String), DatabaseTag>,
}

impl MemoryDictionaryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn import_term_bank(
        &mut self,
        dictionary: &str,
        rows: &[Value],
    ) -> Result<(), SchemaError> {
        for row in rows {
            let entry = TermBankEntry::from_value(row)?;
            let id = self.terms.len() as u64;
            let index = self.terms.len();
            self.term_index
                .entry(entry.term.clone())
                .or_default()
                .push(index);
            if !entry.reading.is_empty() && entry.reading != entry.term {
                self.reading_index
                    .entry(entry.reading.clone())
                    .or_default()
                    .push(index);
            }
            if entry.sequence >= 0 {
                self.sequence_index
                    .entry((dictionary.to_string(), entry.sequence))
                    .or_default()
                    .push(index);
            }
            self.terms.push(StoredTerm {
                id,
                dictionary: dictionary.to_string(),
                entry,
            });
        }
        Ok(())
    }

    pub fn import_term_meta_bank(
        &mut self,
        dictionary: &str,
        rows: &[Value],
    ) -> Result<(), SchemaError> {
        for row in rows {
            let entry = TermMetaBankEntry::from_value(row)?;
            self.term_meta
                .entry(entry.expression.clone())
                .or_default()
                .push(StoredTermMeta {
                    dictionary: dictionary.to_string(),
                    entry,
                });
        }
        Ok(())
    }

    pub fn import_kanji_bank(
        &mut self,
        dictionary: &str,
        rows: &[Value],
    ) -> Result<(), SchemaError> {
        for row in rows {
            let entry = KanjiBankEntry::from_value(row)?;
            self.kanji
                .entry(entry.character.clone())
                .or_default()
                .push(StoredKanji {
                    dictionary: dictionary.to_string(),
                    entry,
                });
        }
        Ok(())
    }

    pub fn import_kanji_meta_bank(
        &mut self,
        dictionary: &str,
        rows: &[Value],
    ) -> Result<(), SchemaError> {
        for row in rows {
            let entry = KanjiMetaBankEntry::from_value(row)?;
            self.kanji_meta
                .entry(entry.character.clone())
                .or_default()
                .push(StoredKanjiMeta {
                    dictionary: dictionary.to_string(),
                    entry,
                });
        }
        Ok(())
    }

    pub fn import_tag_bank(&mut self, dictionary: &str, rows: &[Value]) -> Result<(), SchemaError> {
        for row in rows {
            let entry = TagBankEntry::from_value(row)?;
            self.tags.insert(
                (dictionary.to_string(), entry.name.clone()),
                DatabaseTag {
                    name: entry.name,
                    category: entry.category,
                    order: entry.order,
                    notes: entry.notes,
                    score: entry.score,
                    dictionary: dictionary.to_string(),
                },
            );
        }
        Ok(())
    }

    fn term_entry(
        &self,
        stored: &StoredTerm,
        index: usize,
        match_type: TermSourceMatchType,
        match_source: TermSourceMatchSource,
    ) -> TermEntry {
        let entry = &stored.entry;
        TermEntry {
            index,
            id: stored.id,
            term: entry.term.clone(),
            reading: entry.reading.clone(),
            definition_tags: entry.definition_tags.clone(),
            term_tags: entry.term_tags.clone(),
            rules: entry.rules.clone(),
            definitions: entry.glossary.clone(),
            score: entry.score,
            dictionary: stored.dictionary.clone(),
            sequence: entry.sequence,
            match_type,
            match_source,
            form_of: entry.form_of.clone(),
            inflection_hypotheses: entry.inflection_hypotheses.clone(),
        }
    }

    fn matches(stored: &str, query: &str, match_type: TermSourceMatchType) -> bool {
        match match_type {
            TermSourceMatchType::Exact => stored == query,
            TermSourceMatchType::Prefix => stored.starts_with(query),
            TermSourceMatchType::Suffix => stored.ends_with(query),
        }
    }
}

impl DictionaryDatabase for MemoryDictionaryDatabase {
    fn find_terms_bulk(
        &self,
        terms: &[String],
        enabled: &TermEnabledDictionaryMap,
        match_type: TermSourceMatchType,
    ) -> Result<Vec<TermEntry>, DictionaryDatabaseError> {
        let mut results = Vec::new();
        for (index, query) in terms.iter().enumerate() {
            let mut seen: Vec<u64> = Vec::new();
            for stored in &self.terms {
                if !enabled.contains_key(&stored.dictionary) {
                    continue;
                }
                let (matched, match_source) =
                    if Self::matches(&stored.entry.term, query, match_type) {
                        (true, TermSourceMatchSource::Term)
                    } else if Self::matches(&stored.entry.reading, query, match_type) {
                        (true, TermSourceMatchSource::Reading)
                    } else {
                        (false, TermSourceMatchSource::Term)
                    };
                if !matched || seen.contains(&stored.id) {
                    continue;
                }
                seen.push(stored.id);
                let matched_text = match match_source {
                    TermSourceMatchSource::Term => &stored.entry.term,
                    TermSourceMatchSource::Reading => &stored.entry.reading,
                };
                let actual_match_type = if matched_text == query {
                    TermSourceMatchType::Exact
                } else {
                    match_type
                };
                results.push(self.term_entry(stored, index, actual_match_type, match_source));
            }
        }
        Ok(results)
    }

    fn find_terms_exact_bulk(
        &self,
        queries: &[TermExactQueryRequest],
        enabled: &TermEnabledDictionaryMap,
    ) -> Result<Vec<TermEntry>, DictionaryDatabaseError> {
        let mut results = Vec::new();
        for (index, query) in queries.iter().enumerate() {
            let Some(stored_indices) = self.term_index.get(&query.term) else {
                continue;
            };
            for &stored_index in stored_indices {
                let stored = &self.terms[stored_index];
                if !enabled.contains_key(&stored.dictionary) {
                    continue;
                }
                let reading = if stored.entry.reading.is_empty() {
                    &stored.entry.term
                } else {
                    &stored.entry.reading
                };
                if *reading != query.reading {
                    continue;
                }
                results.push(self.term_entry(
                    stored,
                    index,
                    TermSourceMatchType::Exact,
                    TermSourceMatchSource::Term,
                ));
            }
        }
        Ok(results)
    }

    fn find_terms_by_sequence_bulk(
        &self,
        queries: &[SequenceQueryRequest],
    ) -> Result<Vec<TermEntry>, DictionaryDatabaseError> {
        let mut results = Vec::new();
        for (index, query) in queries.iter().enumerate() {
            let key = (query.dictionary.clone(), query.query);
            let Some(stored_indices) = self.sequence_index.get(&key) else {
                continue;
            };
            for &stored_index in stored_indices {
                let stored = &self.terms[stored_index];
                results.push(self.term_entry(
                    stored,
                    index,
                    TermSourceMatchType::Exact,
                    TermSourceMatchSource::Term,
                ));
            }
        }
        Ok(results)
    }

    fn find_term_meta_bulk(
        &self,
        terms: &[String],
        enabled: &TermEnabledDictionaryMap,
    ) -> Result<Vec<TermMetaEntry>, DictionaryDatabaseError> {
        let mut results = Vec::new();
        for (index, term) in terms.iter().enumerate() {
            let Some(stored_metas) = self.term_meta.get(term) else {
                continue;
            };
            for stored in stored_metas {
                if !enabled.contains_key(&stored.dictionary) {
                    continue;
                }
                results.push(TermMetaEntry {
                    index,
                    term: stored.entry.expression.clone(),
                    mode: stored.entry.mode,
                    data: stored.entry.data.clone(),
                    dictionary: stored.dictionary.clone(),
                });
            }
        }
        Ok(results)
    }

    fn find_kanji_bulk(
        &self,
        characters: &[String],
        enabled: &KanjiEnabledDictionaryMap,
    ) -> Result<Vec<KanjiEntry>, DictionaryDatabaseError> {
        let mut results = Vec::new();
        for (index, character) in characters.iter().enumerate() {
            let Some(stored_entries) = self.kanji.get(character) else {
                continue;
            };
            for stored in stored_entries {
                if !enabled.contains_key(&stored.dictionary) {
                    continue;
                }
                results.push(KanjiEntry {
                    index,
                    character: stored.entry.character.clone(),
                    onyomi: stored.entry.onyomi.clone(),
                    kunyomi: stored.entry.kunyomi.clone(),
                    tags: stored.entry.tags.clone(),
                    definitions: stored.entry.meanings.clone(),
                    stats: stored.entry.stats.clone(),
                    dictionary: stored.dictionary.clone(),
                });
            }
        }
        Ok(results)
    }

    fn find_kanji_meta_bulk(
        &self,
        characters: &[String],
        enabled: &KanjiEnabledDictionaryMap,
    ) -> Result<Vec<KanjiMetaEntry>, DictionaryDatabaseError> {
        let mut results = Vec::new();
        for (index, character) in characters.iter().enumerate() {
            let Some(stored_metas) = self.kanji_meta.get(character) else {
                continue;
            };
            for stored in stored_metas {
                if !enabled.contains_key(&stored.dictionary) {
                    continue;
                }
                results.push(KanjiMetaEntry {
                    index,
                    character: stored.entry.character.clone(),
                    data: stored.entry.data.clone(),
                    dictionary: stored.dictionary.clone(),
                });
            }
        }
        Ok(results)
    }

    fn find_tag_meta_bulk(
        &self,
        queries: &[TagQueryRequest],
    ) -> Result<Vec<Option<DatabaseTag>>, DictionaryDatabaseError> {
        Ok(queries
            .iter()
            .map(|query| {
                self.tags
                    .get(&(query.dictionary.clone(), query.query.clone()))
                    .cloned()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn enabled(names: &[&str]) -> TermEnabledDictionaryMap {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                (
                    name.to_string(),
                    crate::translation::FindTermDictionary {
                        index,
                        priority: 0,
                        alias: name.to_string(),
                        allow_secondary_searches: false,
                    },
                )
            })
            .collect()
    }

    fn database() -> MemoryDictionaryDatabase {
        let mut db = MemoryDictionaryDatabase::new();
        db.import_term_bank(
            "jmdict",
            &[
                json!(["食べる", "たべる", "vt", "v1", 10, ["to eat"], 101, ""]),
                json!(["読む", "よむ", "vt", "v5", 5, ["to read"], 102, ""]),
            ],
        )
        .unwrap();
        db
    }

    #[test]
    fn exact_term_match() {
        let db = database();
        let results = db
            .find_terms_bulk(
                &["食べる".into()],
                &enabled(&["jmdict"]),
                TermSourceMatchType::Exact,
            )
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].index, 0);
        assert_eq!(results[0].match_source, TermSourceMatchSource::Term);
    }

    #[test]
    fn reading_match() {
        let db = database();
        let results = db
            .find_terms_bulk(
                &["よむ".into()],
                &enabled(&["jmdict"]),
                TermSourceMatchType::Exact,
            )
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].match_source, TermSourceMatchSource::Reading);
    }

    #[test]
    fn disabled_dictionaries_are_invisible() {
        let db = database();
        let results = db
            .find_terms_bulk(
                &["食べる".into()],
                &enabled(&["other"]),
                TermSourceMatchType::Exact,
            )
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn prefix_match() {
        let db = database();
        let results = db
            .find_terms_bulk(
                &["食べ".into()],
                &enabled(&["jmdict"]),
                TermSourceMatchType::Prefix,
            )
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].match_type, TermSourceMatchType::Prefix);
    }

    #[test]
    fn sequence_lookup() {
        let db = database();
        let results = db
            .find_terms_by_sequence_bulk(&[SequenceQueryRequest {
                query: 102,
                dictionary: "jmdict".into(),
            }])
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].term, "読む");
    }

    #[test]
    fn tag_meta_is_index_parallel() {
        let mut db = database();
        db.import_tag_bank("jmdict", &[json!(["vt", "partOfSpeech", 1, "transitive verb", 0])])
            .unwrap();
        let results = db
            .find_tag_meta_bulk(&[
                TagQueryRequest {
                    query: "missing".into(),
                    dictionary: "jmdict".into(),
                },
                TagQueryRequest {
                    query: "vt".into(),
                    dictionary: "jmdict".into(),
                },
            ])
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_none());
        assert_eq!(results[1].as_ref().unwrap().notes, "transitive verb");
    }
}
