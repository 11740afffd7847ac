use derive_more::From;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dictionary_data::TermGlossary;

/// How a looked-up string was matched against a database term.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TermSourceMatchType {
    #[default]
    Exact,
    Prefix,
    Suffix,
}

/// Which field of a database term the match was made against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TermSourceMatchSource {
    #[default]
    Term,
    Reading,
}

/// Where an inflection hypothesis came from. The three values form a small
/// join lattice: conflicting observations promote to `Both`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InflectionSource {
    Algorithm,
    Dictionary,
    Both,
}

/// One way the looked-up text might be an inflected form of a headword: the
/// chain of inflection names, in application order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InflectionHypothesis {
    pub source: InflectionSource,
    pub inflections: Vec<String>,
}

/// Source information for a headword: the scanned text and what it turned
/// into on its way to the dictionary.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermSource {
    /// The original out-of-page text that was scanned.
    pub original_text: String,
    /// The original text after the text transformations.
    pub transformed_text: String,
    /// The transformed text after deinflection.
    pub deinflected_text: String,
    pub match_type: TermSourceMatchType,
    pub match_source: TermSourceMatchSource,
    /// Whether the source is an exact result of the scan, as opposed to a
    /// related or secondary lookup.
    pub is_primary: bool,
}

/// An expanded tag attached to headwords, definitions or pronunciations.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DictionaryTag {
    pub name: String,
    pub category: String,
    pub order: i64,
    pub score: i64,
    /// The descriptive notes of the tag, one chunk per contributing
    /// dictionary.
    pub content: Vec<String>,
    /// Dictionaries the tag information came from.
    pub dictionaries: Vec<String>,
    /// Whether the tag repeats information given by the preceding
    /// definition and can be hidden.
    pub redundant: bool,
}

impl DictionaryTag {
    /// The fallback shape used when a tag lookup misses.
    pub fn new_default(name: String, dictionary: String) -> Self {
        Self {
            name,
            category: "default".to_string(),
            order: 0,
            score: 0,
            content: Vec::new(),
            dictionaries: vec![dictionary],
            redundant: false,
        }
    }
}

/// A term/reading pair together with everything that was scanned to find it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermHeadword {
    /// Position of this headword in the containing entry's headword list.
    pub index: usize,
    pub term: String,
    pub reading: String,
    pub sources: Vec<TermSource>,
    pub tags: Vec<DictionaryTag>,
    /// Database rule identifiers for the word classes of this headword.
    pub word_classes: Vec<String>,
}

/// A single definition belonging to a term dictionary entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermDefinition {
    /// Position of this definition in the containing entry's definition
    /// list.
    pub index: usize,
    /// Indices into the entry's headword list, sorted and unique.
    pub headword_indices: Vec<usize>,
    pub dictionary: String,
    pub dictionary_index: usize,
    pub dictionary_alias: String,
    pub dictionary_priority: i64,
    /// Database id of the row this definition came from.
    pub id: u64,
    pub score: i64,
    /// The sorting value based on the determined term frequency.
    pub frequency_order: i64,
    /// Database sequence numbers; `-1` when the row carried none.
    pub sequences: Vec<i64>,
    pub is_primary: bool,
    pub tags: Vec<DictionaryTag>,
    /// The definition content, opaque to the engine.
    pub entries: Vec<TermGlossary>,
}

/// A pitch accent representation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PitchAccent {
    /// Mora position of the downstep.
    pub position: i64,
    pub nasal_positions: Vec<u8>,
    pub devoice_positions: Vec<u8>,
    pub tags: Vec<DictionaryTag>,
}

/// A phonetic transcription of a reading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhoneticTranscription {
    pub ipa: String,
    pub tags: Vec<DictionaryTag>,
}

/// One pronunciation datum attached to a headword.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, From)]
#[serde(rename_all = "kebab-case")]
pub enum Pronunciation {
    PitchAccent(PitchAccent),
    PhoneticTranscription(PhoneticTranscription),
}

/// Pronunciation information for a specific headword.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermPronunciation {
    /// Position of this element in the containing entry's pronunciation
    /// list.
    pub index: usize,
    pub headword_index: usize,
    pub dictionary: String,
    pub dictionary_index: usize,
    pub dictionary_alias: String,
    pub dictionary_priority: i64,
    pub pronunciations: Vec<Pronunciation>,
}

/// Frequency information for a specific headword.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermFrequency {
    /// Position of this element in the containing entry's frequency list.
    pub index: usize,
    pub headword_index: usize,
    pub dictionary: String,
    pub dictionary_index: usize,
    pub dictionary_alias: String,
    pub dictionary_priority: i64,
    /// Whether the frequency datum named the reading it applies to.
    pub has_reading: bool,
    pub frequency: i64,
    pub display_value: Option<String>,
    /// Whether `frequency` was parsed out of `display_value`.
    pub display_value_parsed: bool,
}

/// A dictionary entry for a term or group of terms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermDictionaryEntry {
    /// Whether or not any of the sources is a primary source. Primary
    /// sources are derived from the scanned text, while non-primary sources
    /// originate from related or secondary lookups.
    pub is_primary: bool,
    /// Ways that the looked-up text might be an inflected form of this
    /// entry's headwords.
    pub inflection_hypotheses: Vec<InflectionHypothesis>,
    pub score: i64,
    /// The sorting value based on the determined term frequency.
    pub frequency_order: i64,
    pub dictionary_index: usize,
    pub dictionary_alias: String,
    pub dictionary_priority: i64,
    /// The number of headwords with a primary source that matched on the
    /// term field.
    pub source_term_exact_match_count: usize,
    /// The maximum transformed-text length over all primary sources.
    pub max_transformed_text_length: usize,
    pub headwords: Vec<TermHeadword>,
    pub definitions: Vec<TermDefinition>,
    pub pronunciations: Vec<TermPronunciation>,
    pub frequencies: Vec<TermFrequency>,
}

// Kanji

/// A stat expanded from kanji stat identifiers via tag metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KanjiStat {
    pub name: String,
    pub category: String,
    /// Notes from the tag record.
    pub content: String,
    pub order: i64,
    pub score: i64,
    pub dictionary: String,
    /// The raw stat value from the kanji bank.
    pub value: String,
}

/// Stats grouped by tag category.
pub type KanjiStatGroups = IndexMap<String, Vec<KanjiStat>>;

/// Frequency information for a kanji character.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KanjiFrequency {
    /// Position of this element in the containing entry's frequency list.
    pub index: usize,
    pub dictionary: String,
    pub dictionary_index: usize,
    pub dictionary_alias: String,
    pub dictionary_priority: i64,
    pub character: String,
    pub frequency: i64,
    pub display_value: Option<String>,
    pub display_value_parsed: bool,
}

/// A dictionary entry for a single kanji character.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KanjiDictionaryEntry {
    pub character: String,
    pub dictionary: String,
    pub dictionary_index: usize,
    pub dictionary_alias: String,
    pub dictionary_priority: i64,
    pub onyomi: Vec<String>,
    pub kunyomi: Vec<String>,
    pub tags: Vec<DictionaryTag>,
    pub stats: KanjiStatGroups,
    pub definitions: Vec<String>,
    pub frequencies: Vec<KanjiFrequency>,
}

/// One row of a [`crate::Translator::get_term_frequencies`] result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermFrequencySimple {
    pub term: String,
    pub reading: Option<String>,
    pub dictionary: String,
    pub has_reading: bool,
    pub frequency: i64,
}
