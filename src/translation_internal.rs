use indexmap::IndexSet;

use crate::dictionary::{InflectionHypothesis, TermDictionaryEntry};
use crate::dictionary_database::TermEntry;

/// One candidate produced by the deinflection stage, carrying the database
/// rows that answered it.
#[derive(Clone, Debug)]
pub struct DatabaseDeinflection {
    /// The slice of the original input that produced this candidate.
    pub original_text: String,
    /// The transformed-variant prefix that was searched.
    pub transformed_text: String,
    /// The candidate lemma the transformed text was unwound to.
    pub deinflected_text: String,
    /// Rule mask of the deinflected form, used for the pos-filter fit test.
    pub conditions: u32,
    /// Whether this candidate was synthesized from a dictionary-declared
    /// inflection rather than the scanned text. Such candidates do not
    /// contribute to `original_text_length`.
    pub is_dictionary_deinflection: bool,
    pub inflection_hypotheses: Vec<InflectionHypothesis>,
    pub database_entries: Vec<TermEntry>,
}

/// Entries sharing one main-dictionary sequence during merge grouping.
#[derive(Clone, Debug, Default)]
pub struct DictionaryEntryGroup {
    pub ids: IndexSet<u64>,
    pub dictionary_entries: Vec<TermDictionaryEntry>,
}

/// Raw result of the term-finding stage, before grouping and enrichment.
#[derive(Clone, Debug, Default)]
pub struct FindInternalTermsResult {
    pub dictionary_entries: Vec<TermDictionaryEntry>,
    pub original_text_length: usize,
}
