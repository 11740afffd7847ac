use fancy_regex::Regex;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::dictionary::TermSourceMatchType;

// Kanji

/// An options object for use with [`crate::Translator::find_kanji`].
#[derive(Debug, Clone, Default)]
pub struct FindKanjiOptions {
    /// The mapping of dictionaries to search for kanji in, keyed by
    /// dictionary name.
    pub enabled_dictionary_map: KanjiEnabledDictionaryMap,
    /// Whether or not non-Japanese characters should be searched.
    pub remove_non_japanese_characters: bool,
}

/// Details about a single enabled kanji dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct FindKanjiDictionary {
    /// The index of the dictionary in the original list used for the lookup.
    pub index: usize,
    /// The priority of the dictionary.
    pub priority: i64,
    /// The alias of the dictionary.
    pub alias: String,
}

// Terms

/// An options object for use with [`crate::Translator::find_terms`].
#[derive(Debug, Clone)]
pub struct FindTermsOptions {
    /// The matching type for looking up terms.
    pub match_type: FindTermsMatchType,
    /// Whether or not deinflection should be performed at all.
    pub deinflect: bool,
    /// Which sources of deinflection are used.
    pub deinflection_source: DeinflectionSource,
    /// Whether candidates are checked for morphological compatibility with
    /// an entry's word classes before the entry is attached.
    pub deinflection_pos_filter: bool,
    /// The name of the primary dictionary whose sequence numbers drive
    /// `merge` grouping. Only consulted in merge mode.
    pub main_dictionary: Option<String>,
    /// The name of the frequency dictionary used for sorting.
    pub sort_frequency_dictionary: Option<String>,
    /// The order used when a sorting dictionary is nominated.
    pub sort_frequency_dictionary_order: FindTermsSortOrder,
    /// Whether the input is truncated at the first non-Japanese code point.
    pub remove_non_japanese_characters: bool,
    /// Text replacement variants applied during the lookup; `None` entries
    /// mean "search the original text".
    pub text_replacements: FindTermsTextReplacements,
    /// Setting for the language's emphatic-sequence normalization.
    pub collapse_emphatic_sequences: EmphaticSequenceCollapse,
    /// Per-transformation settings, keyed by transformation id.
    pub text_transformations: IndexMap<String, TextTransformationSetting>,
    /// The mapping of dictionaries to search for terms in, keyed by
    /// dictionary name.
    pub enabled_dictionary_map: TermEnabledDictionaryMap,
    /// A set of dictionary names which should have definitions removed.
    pub exclude_dictionary_definitions: Option<IndexSet<String>>,
    /// Whether every substring should be searched for, or only whole words.
    pub search_resolution: SearchResolution,
    /// ISO-639 code of the language.
    pub language: String,
}

impl Default for FindTermsOptions {
    fn default() -> Self {
        Self {
            match_type: FindTermsMatchType::Exact,
            deinflect: true,
            deinflection_source: DeinflectionSource::Both,
            deinflection_pos_filter: true,
            main_dictionary: None,
            sort_frequency_dictionary: None,
            sort_frequency_dictionary_order: FindTermsSortOrder::Descending,
            remove_non_japanese_characters: false,
            text_replacements: vec![None],
            collapse_emphatic_sequences: EmphaticSequenceCollapse::Off,
            text_transformations: IndexMap::new(),
            enabled_dictionary_map: IndexMap::new(),
            exclude_dictionary_definitions: None,
            search_resolution: SearchResolution::Letter,
            language: "ja".to_string(),
        }
    }
}

/// The matching type for looking up terms.
pub type FindTermsMatchType = TermSourceMatchType;

/// A sorting order to use when finding terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindTermsSortOrder {
    Ascending,
    Descending,
}

/// Which deinflection machinery feeds candidate lemmas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeinflectionSource {
    Algorithm,
    Dictionary,
    Both,
}

/// Setting for the language-specific emphatic-sequence normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmphaticSequenceCollapse {
    Off,
    On,
    Full,
}

/// Tri-state setting of one text transformation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransformationSetting {
    Off,
    On,
    Both,
}

/// Whether lookups scan backwards one letter at a time or jump to word
/// boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchResolution {
    Letter,
    Word,
}

/// A single user text replacement.
#[derive(Debug, Clone)]
pub struct FindTermsTextReplacement {
    pub pattern: Regex,
    pub replacement: String,
    pub is_global: bool,
}

/// The text replacement variants applied during a lookup. Each element is
/// one variant: `None` searches the unmodified text, `Some` applies the
/// contained replacements in order.
pub type FindTermsTextReplacements = Vec<Option<Vec<FindTermsTextReplacement>>>;

/// Details about a single enabled term dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct FindTermDictionary {
    /// The index of the dictionary in the original list used for the lookup.
    pub index: usize,
    /// The priority of the dictionary.
    pub priority: i64,
    /// The alias of the dictionary.
    pub alias: String,
    /// Whether or not secondary term searches are allowed for this
    /// dictionary.
    pub allow_secondary_searches: bool,
}

pub type TermEnabledDictionaryMap = IndexMap<String, FindTermDictionary>;
pub type KanjiEnabledDictionaryMap = IndexMap<String, FindKanjiDictionary>;
