use std::cmp::Ordering;
use std::sync::{Arc, LazyLock};

use fancy_regex::Regex;
use icu::{
    collator::{options::CollatorOptions, Collator, CollatorBorrowed},
    locale::locale,
};
use indexmap::{IndexMap, IndexSet};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::json;
use unicode_segmentation::UnicodeSegmentation;

use crate::dictionary::{
    DictionaryTag, InflectionHypothesis, InflectionSource, KanjiDictionaryEntry, KanjiFrequency,
    KanjiStat, KanjiStatGroups, PhoneticTranscription, PitchAccent, Pronunciation,
    TermDefinition, TermDictionaryEntry, TermFrequency, TermFrequencySimple, TermHeadword,
    TermPronunciation, TermSource, TermSourceMatchSource,
};
use crate::dictionary_data::{TermMetaData, TermMetaFrequency, TermMetaMode};
use crate::dictionary_database::{
    DatabaseTag, DictionaryDatabase, SequenceQueryRequest, TagQueryRequest, TermEntry,
    TermExactQueryRequest,
};
use crate::errors::TranslatorError;
use crate::language::deinflector::{rule_flags_from_word_classes, rules_fit, Deinflector};
use crate::language::ja::japanese::is_code_point_japanese;
use crate::language::text_source_map::TextSourceMap;
use crate::language::{get_language_descriptor, LanguageDescriptor};
use crate::regex_util::apply_text_replacement;
use crate::translation::{
    DeinflectionSource, EmphaticSequenceCollapse, FindKanjiOptions, FindTermsOptions,
    FindTermsSortOrder, KanjiEnabledDictionaryMap, SearchResolution, TermEnabledDictionaryMap,
    TextTransformationSetting,
};
use crate::translation_internal::{
    DatabaseDeinflection, DictionaryEntryGroup, FindInternalTermsResult,
};

/// The format of the entry list produced by [`Translator::find_terms`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FindTermsMode {
    #[default]
    Simple,
    Group,
    Merge,
    Split,
}

#[derive(Clone, Debug, Default)]
pub struct FindTermsResult {
    pub dictionary_entries: Vec<TermDictionaryEntry>,
    /// Length, in scalar values, of the longest original-text slice that
    /// produced a hit.
    pub original_text_length: usize,
}

/// A term/optional-reading pair for [`Translator::get_term_frequencies`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TermReadingItem {
    pub term: String,
    pub reading: Option<String>,
}

type TagCache = IndexMap<String, Option<DatabaseTag>>;

static WORD_BOUNDARY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}][\p{L}\p{N}]*$").unwrap());

/// Finds term and kanji dictionary entries for text.
///
/// Each lookup is an independent request-scoped computation; the only state
/// shared between calls is the tag cache, which
/// [`Translator::clear_database_caches`] drops when the database changes.
pub struct Translator<D> {
    db: Arc<D>,
    tag_cache: IndexMap<String, TagCache>,
    string_comparer: CollatorBorrowed<'static>,
}

impl<D: DictionaryDatabase> Translator<D> {
    pub fn new(db: Arc<D>) -> Self {
        Self {
            db,
            tag_cache: IndexMap::new(),
            string_comparer: Collator::try_new(locale!("en-US").into(), CollatorOptions::default())
                .expect("en-US collation data is compiled in"),
        }
    }

    /// Clears the database tag cache. This should be called if the database
    /// is mutated.
    pub fn clear_database_caches(&mut self) {
        self.tag_cache.clear();
    }

    /// Finds term dictionary entries for the longest prefixes of `text`.
    ///
    /// `mode` controls the shape of the result list: `Split` returns one
    /// entry per database row, `Group` folds entries sharing a headword,
    /// `Merge` joins entries related through the main dictionary's sequence
    /// numbers, and `Simple` skips metadata enrichment entirely.
    pub fn find_terms(
        &mut self,
        mode: FindTermsMode,
        text: &str,
        options: &FindTermsOptions,
    ) -> Result<FindTermsResult, TranslatorError> {
        if mode == FindTermsMode::Merge && options.main_dictionary.is_none() {
            return Err(TranslatorError::MissingMainDictionary);
        }

        let FindInternalTermsResult {
            mut dictionary_entries,
            original_text_length,
        } = self.find_terms_internal(text, options)?;

        match mode {
            FindTermsMode::Group => {
                dictionary_entries = self.group_dictionary_entries_by_headword(&dictionary_entries);
            }
            FindTermsMode::Merge => {
                dictionary_entries = self.get_related_dictionary_entries(&dictionary_entries, options)?;
            }
            FindTermsMode::Simple | FindTermsMode::Split => {}
        }

        if let Some(excluded) = &options.exclude_dictionary_definitions {
            Self::remove_excluded_definitions(&mut dictionary_entries, excluded);
        }

        if mode != FindTermsMode::Simple {
            self.add_term_meta(&mut dictionary_entries, &options.enabled_dictionary_map)?;
            self.expand_term_tags(&mut dictionary_entries)?;
        } else if let Some(sort_dictionary) = &options.sort_frequency_dictionary {
            // simple mode only needs the frequencies that drive sorting
            let mut sort_dictionary_map: TermEnabledDictionaryMap = IndexMap::new();
            if let Some(details) = options.enabled_dictionary_map.get(sort_dictionary) {
                sort_dictionary_map.insert(sort_dictionary.clone(), details.clone());
            }
            self.add_term_meta(&mut dictionary_entries, &sort_dictionary_map)?;
        }

        if let Some(sort_dictionary) = &options.sort_frequency_dictionary {
            Self::update_sort_frequencies(
                &mut dictionary_entries,
                sort_dictionary,
                options.sort_frequency_dictionary_order == FindTermsSortOrder::Ascending,
            );
        }

        if dictionary_entries.len() > 1 {
            self.sort_term_dictionary_entries(&mut dictionary_entries);
        }
        for entry in &mut dictionary_entries {
            Self::flag_redundant_definition_tags(&mut entry.definitions);
            if entry.definitions.len() > 1 {
                Self::sort_term_dictionary_entry_definitions(&mut entry.definitions);
            }
            if entry.frequencies.len() > 1 {
                entry.frequencies.sort_by(|v1, v2| {
                    v2.dictionary_priority
                        .cmp(&v1.dictionary_priority)
                        .then_with(|| v1.headword_index.cmp(&v2.headword_index))
                        .then_with(|| v1.dictionary_index.cmp(&v2.dictionary_index))
                        .then_with(|| v1.index.cmp(&v2.index))
                });
            }
            if entry.pronunciations.len() > 1 {
                entry.pronunciations.sort_by(|v1, v2| {
                    v2.dictionary_priority
                        .cmp(&v1.dictionary_priority)
                        .then_with(|| v1.headword_index.cmp(&v2.headword_index))
                        .then_with(|| v1.dictionary_index.cmp(&v2.dictionary_index))
                        .then_with(|| v1.index.cmp(&v2.index))
                });
            }
        }

        Ok(FindTermsResult {
            dictionary_entries,
            original_text_length,
        })
    }

    /// Finds kanji dictionary entries for every unique character of `text`.
    pub fn find_kanji(
        &mut self,
        text: &str,
        options: &FindKanjiOptions,
    ) -> Result<Vec<KanjiDictionaryEntry>, TranslatorError> {
        let text = if options.remove_non_japanese_characters {
            japanese_only_text(text)
        } else {
            text.to_string()
        };
        let unique: IndexSet<String> = text.graphemes(true).map(str::to_string).collect();
        let characters: Vec<String> = unique.into_iter().collect();
        if characters.is_empty() {
            return Ok(Vec::new());
        }
        let enabled = &options.enabled_dictionary_map;
        let mut database_entries = self.db.find_kanji_bulk(&characters, enabled)?;
        database_entries.sort_by_key(|entry| entry.index);

        let mut dictionary_entries = Vec::with_capacity(database_entries.len());
        for database_entry in database_entries {
            let (dictionary_index, dictionary_alias, dictionary_priority) =
                kanji_dictionary_details(&database_entry.dictionary, enabled);
            let stats = self.expand_kanji_stats(&database_entry.stats, &database_entry.dictionary)?;
            let tags = placeholder_tags(&database_entry.tags, &database_entry.dictionary);
            dictionary_entries.push(KanjiDictionaryEntry {
                character: database_entry.character,
                dictionary: database_entry.dictionary,
                dictionary_index,
                dictionary_alias,
                dictionary_priority,
                onyomi: database_entry.onyomi,
                kunyomi: database_entry.kunyomi,
                tags,
                stats,
                definitions: database_entry.definitions,
                frequencies: Vec::new(),
            });
        }

        self.add_kanji_meta(&mut dictionary_entries, enabled)?;

        let mut keys: IndexSet<(String, String)> = IndexSet::new();
        for entry in &dictionary_entries {
            collect_tag_keys(&entry.tags, &mut keys);
        }
        let resolved = self.resolve_tags(keys)?;
        for entry in &mut dictionary_entries {
            self.expand_tag_list(&mut entry.tags, &resolved);
            entry.frequencies.sort_by(|v1, v2| {
                v2.dictionary_priority
                    .cmp(&v1.dictionary_priority)
                    .then_with(|| v1.dictionary_index.cmp(&v2.dictionary_index))
                    .then_with(|| v1.index.cmp(&v2.index))
            });
        }
        dictionary_entries.sort_by_key(|entry| entry.dictionary_index);
        Ok(dictionary_entries)
    }

    /// Looks up the raw `freq`-mode metadata for explicit term/reading
    /// pairs.
    pub fn get_term_frequencies(
        &self,
        term_reading_list: &[TermReadingItem],
        enabled_dictionary_map: &TermEnabledDictionaryMap,
    ) -> Result<Vec<TermFrequencySimple>, TranslatorError> {
        let mut terms: Vec<String> = Vec::new();
        let mut readings_per_term: Vec<Vec<&TermReadingItem>> = Vec::new();
        for item in term_reading_list {
            match terms.iter().position(|term| *term == item.term) {
                Some(position) => readings_per_term[position].push(item),
                None => {
                    terms.push(item.term.clone());
                    readings_per_term.push(vec![item]);
                }
            }
        }
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let metas = self.db.find_term_meta_bulk(&terms, enabled_dictionary_map)?;
        let mut results = Vec::new();
        for meta in metas {
            if meta.mode != TermMetaMode::Freq {
                continue;
            }
            let TermMetaData::Frequency(frequency_data) = &meta.data else {
                continue;
            };
            let Some(items) = readings_per_term.get(meta.index) else {
                warn!("term meta index {} out of range", meta.index);
                continue;
            };
            for item in items {
                let (has_reading, reading, data) = match frequency_data {
                    TermMetaFrequency::WithReading { reading, frequency } => {
                        if item.reading.as_ref().is_some_and(|r| r != reading) {
                            continue;
                        }
                        (true, Some(reading.clone()), frequency)
                    }
                    TermMetaFrequency::Generic(data) => (false, item.reading.clone(), data),
                };
                let info = data.to_frequency_info();
                results.push(TermFrequencySimple {
                    term: item.term.clone(),
                    reading,
                    dictionary: meta.dictionary.clone(),
                    has_reading,
                    frequency: info.frequency,
                });
            }
        }
        Ok(results)
    }

    // Term finding

    fn find_terms_internal(
        &self,
        text: &str,
        options: &FindTermsOptions,
    ) -> Result<FindInternalTermsResult, TranslatorError> {
        let mut text = text.to_string();
        if options.remove_non_japanese_characters && options.language == "ja" {
            text = japanese_only_text(&text);
        }
        if text.is_empty() {
            return Ok(FindInternalTermsResult::default());
        }
        let deinflections = self.get_deinflections(&text, options)?;
        Ok(Self::get_dictionary_entries(
            &deinflections,
            &options.enabled_dictionary_map,
        ))
    }

    fn get_deinflections(
        &self,
        text: &str,
        options: &FindTermsOptions,
    ) -> Result<Vec<DatabaseDeinflection>, TranslatorError> {
        let descriptor = get_language_descriptor(&options.language)
            .ok_or_else(|| TranslatorError::UnsupportedLanguage(options.language.clone()))?;
        let mut deinflections = self.get_algorithm_deinflections(text, descriptor, options);
        self.add_entries_to_deinflections(&mut deinflections, options)?;
        if options.deinflection_source != DeinflectionSource::Algorithm {
            let mut dictionary_deinflections = Self::get_dictionary_deinflections(&deinflections);
            self.add_entries_to_deinflections(&mut dictionary_deinflections, options)?;
            deinflections.extend(dictionary_deinflections);
        }
        // rows that only describe an inflection never become entries
        for deinflection in &mut deinflections {
            deinflection
                .database_entries
                .retain(|entry| !entry.definition_tags.iter().any(|tag| tag == "non-lemma"));
        }
        deinflections.retain(|deinflection| !deinflection.database_entries.is_empty());
        Ok(deinflections)
    }

    /// The variant/prefix scan of the term finder: every transformed
    /// variant is walked from its full length down to one scalar, and every
    /// untried prefix becomes one or more deinflection candidates.
    fn get_algorithm_deinflections(
        &self,
        text: &str,
        descriptor: &LanguageDescriptor,
        options: &FindTermsOptions,
    ) -> Vec<DatabaseDeinflection> {
        let deinflector = Deinflector::new(descriptor.deinflection_rules);
        let use_algorithm =
            options.deinflect && options.deinflection_source != DeinflectionSource::Dictionary;
        let mut tried_sources: IndexSet<String> = IndexSet::new();
        let mut deinflections: Vec<DatabaseDeinflection> = Vec::new();

        for (variant, source_map) in TextVariants::new(text, descriptor, options) {
            let variant_chars: Vec<char> = variant.chars().collect();
            let mut i = variant_chars.len();
            while i > 0 {
                let source: String = variant_chars[..i].iter().collect();
                if tried_sources.insert(source.clone()) {
                    let original_length = source_map.original_length(i);
                    let raw_source: String = text.chars().take(original_length).collect();
                    if use_algorithm {
                        for deinflection in deinflector.deinflect(&source) {
                            deinflections.push(DatabaseDeinflection {
                                original_text: raw_source.clone(),
                                transformed_text: source.clone(),
                                deinflected_text: deinflection.term,
                                conditions: deinflection.rules,
                                is_dictionary_deinflection: false,
                                inflection_hypotheses: vec![InflectionHypothesis {
                                    source: InflectionSource::Algorithm,
                                    inflections: deinflection
                                        .reasons
                                        .iter()
                                        .map(|reason| reason.to_string())
                                        .collect(),
                                }],
                                database_entries: Vec::new(),
                            });
                        }
                    } else {
                        deinflections.push(DatabaseDeinflection {
                            original_text: raw_source,
                            transformed_text: source.clone(),
                            deinflected_text: source.clone(),
                            conditions: 0,
                            is_dictionary_deinflection: false,
                            inflection_hypotheses: Vec::new(),
                            database_entries: Vec::new(),
                        });
                    }
                }
                i = next_substring_length(options.search_resolution, &source);
            }
        }
        deinflections
    }

    /// Synthesizes candidates from hits whose rows declare themselves an
    /// inflection of another headword, crossing the dictionary-declared
    /// inflection chains with the algorithm's hypotheses.
    fn get_dictionary_deinflections(
        deinflections: &[DatabaseDeinflection],
    ) -> Vec<DatabaseDeinflection> {
        let mut dictionary_deinflections: Vec<DatabaseDeinflection> = Vec::new();
        for deinflection in deinflections {
            for entry in &deinflection.database_entries {
                if !entry.definition_tags.iter().any(|tag| tag == "non-lemma") {
                    continue;
                }
                let Some(form_of) = &entry.form_of else {
                    continue;
                };
                let dictionary_chains: Vec<Vec<String>> = entry
                    .inflection_hypotheses
                    .clone()
                    .unwrap_or_else(|| vec![Vec::new()]);
                let algorithm_hypotheses: Vec<InflectionHypothesis> =
                    if deinflection.inflection_hypotheses.is_empty() {
                        vec![InflectionHypothesis {
                            source: InflectionSource::Algorithm,
                            inflections: Vec::new(),
                        }]
                    } else {
                        deinflection.inflection_hypotheses.clone()
                    };
                let mut inflection_hypotheses = Vec::new();
                for algorithm_hypothesis in &algorithm_hypotheses {
                    for dictionary_chain in &dictionary_chains {
                        let source = if algorithm_hypothesis.inflections.is_empty() {
                            InflectionSource::Dictionary
                        } else {
                            InflectionSource::Both
                        };
                        let inflections: Vec<String> = algorithm_hypothesis
                            .inflections
                            .iter()
                            .cloned()
                            .chain(dictionary_chain.iter().cloned())
                            .collect();
                        inflection_hypotheses.push(InflectionHypothesis {
                            source,
                            inflections,
                        });
                    }
                }
                dictionary_deinflections.push(DatabaseDeinflection {
                    original_text: deinflection.original_text.clone(),
                    transformed_text: deinflection.transformed_text.clone(),
                    deinflected_text: form_of.clone(),
                    conditions: 0,
                    is_dictionary_deinflection: true,
                    inflection_hypotheses,
                    database_entries: Vec::new(),
                });
            }
        }
        dictionary_deinflections
    }

    /// Groups candidates by their deinflected term, runs one bulk query for
    /// the unique terms, and attaches each returned row to every candidate
    /// whose rule mask fits it.
    fn add_entries_to_deinflections(
        &self,
        deinflections: &mut [DatabaseDeinflection],
        options: &FindTermsOptions,
    ) -> Result<(), TranslatorError> {
        if deinflections.is_empty() {
            return Ok(());
        }
        let mut unique_terms: Vec<String> = Vec::new();
        let mut term_groups: Vec<Vec<usize>> = Vec::new();
        for (index, deinflection) in deinflections.iter().enumerate() {
            if deinflection.deinflected_text.is_empty() {
                continue;
            }
            match unique_terms
                .iter()
                .position(|term| *term == deinflection.deinflected_text)
            {
                Some(position) => term_groups[position].push(index),
                None => {
                    unique_terms.push(deinflection.deinflected_text.clone());
                    term_groups.push(vec![index]);
                }
            }
        }
        if unique_terms.is_empty() {
            return Ok(());
        }
        let database_entries = self.db.find_terms_bulk(
            &unique_terms,
            &options.enabled_dictionary_map,
            options.match_type,
        )?;
        for entry in database_entries {
            let Some(group) = term_groups.get(entry.index) else {
                warn!("find_terms_bulk returned out-of-range index {}", entry.index);
                continue;
            };
            let entry_rules = rule_flags_from_word_classes(&entry.rules);
            for &deinflection_index in group {
                let deinflection = &mut deinflections[deinflection_index];
                if !options.deinflection_pos_filter
                    || rules_fit(deinflection.conditions, entry_rules)
                {
                    deinflection.database_entries.push(entry.clone());
                }
            }
        }
        Ok(())
    }

    // Entry assembly

    fn get_dictionary_entries(
        deinflections: &[DatabaseDeinflection],
        enabled_dictionary_map: &TermEnabledDictionaryMap,
    ) -> FindInternalTermsResult {
        let mut original_text_length = 0;
        let mut dictionary_entries: Vec<TermDictionaryEntry> = Vec::new();
        let mut ids: IndexMap<u64, usize> = IndexMap::new();
        for deinflection in deinflections {
            if deinflection.database_entries.is_empty() {
                continue;
            }
            if !deinflection.is_dictionary_deinflection {
                original_text_length =
                    original_text_length.max(deinflection.original_text.chars().count());
            }
            for database_entry in &deinflection.database_entries {
                match ids.get(&database_entry.id) {
                    None => {
                        let entry = Self::create_term_dictionary_entry_from_database_entry(
                            database_entry,
                            &deinflection.original_text,
                            &deinflection.transformed_text,
                            &deinflection.deinflected_text,
                            deinflection.inflection_hypotheses.clone(),
                            true,
                            enabled_dictionary_map,
                        );
                        ids.insert(database_entry.id, dictionary_entries.len());
                        dictionary_entries.push(entry);
                    }
                    Some(&existing_index) => {
                        let existing = &mut dictionary_entries[existing_index];
                        let transformed_length =
                            deinflection.transformed_text.chars().count();
                        if transformed_length < existing.max_transformed_text_length {
                            continue;
                        }
                        Self::merge_inflection_hypotheses(
                            &mut existing.inflection_hypotheses,
                            &deinflection.inflection_hypotheses,
                        );
                    }
                }
            }
        }
        FindInternalTermsResult {
            dictionary_entries,
            original_text_length,
        }
    }

    /// Adds hypotheses not already present; a duplicate chain (set equality
    /// over inflection names) with a different source promotes to `Both`.
    fn merge_inflection_hypotheses(
        existing: &mut Vec<InflectionHypothesis>,
        incoming: &[InflectionHypothesis],
    ) {
        for hypothesis in incoming {
            match existing.iter_mut().find(|candidate| {
                chains_equal_ignore_order(&candidate.inflections, &hypothesis.inflections)
            }) {
                Some(duplicate) => {
                    if duplicate.source != hypothesis.source {
                        duplicate.source = InflectionSource::Both;
                    }
                }
                None => existing.push(hypothesis.clone()),
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn create_term_dictionary_entry_from_database_entry(
        database_entry: &TermEntry,
        original_text: &str,
        transformed_text: &str,
        deinflected_text: &str,
        inflection_hypotheses: Vec<InflectionHypothesis>,
        is_primary: bool,
        enabled_dictionary_map: &TermEnabledDictionaryMap,
    ) -> TermDictionaryEntry {
        let reading = if database_entry.reading.is_empty() {
            database_entry.term.clone()
        } else {
            database_entry.reading.clone()
        };
        let (dictionary_index, dictionary_alias, dictionary_priority) =
            term_dictionary_details(&database_entry.dictionary, enabled_dictionary_map);
        let source_term_exact_match_count =
            usize::from(is_primary && deinflected_text == database_entry.term);
        let max_transformed_text_length = if is_primary {
            transformed_text.chars().count()
        } else {
            0
        };
        let source = TermSource {
            original_text: original_text.to_string(),
            transformed_text: transformed_text.to_string(),
            deinflected_text: deinflected_text.to_string(),
            match_type: database_entry.match_type,
            match_source: database_entry.match_source,
            is_primary,
        };
        let headword = TermHeadword {
            index: 0,
            term: database_entry.term.clone(),
            reading,
            sources: vec![source],
            tags: placeholder_tags(&database_entry.term_tags, &database_entry.dictionary),
            word_classes: database_entry.rules.clone(),
        };
        let sequence = if database_entry.sequence >= 0 {
            database_entry.sequence
        } else {
            -1
        };
        let definition = TermDefinition {
            index: 0,
            headword_indices: vec![0],
            dictionary: database_entry.dictionary.clone(),
            dictionary_index,
            dictionary_alias: dictionary_alias.clone(),
            dictionary_priority,
            id: database_entry.id,
            score: database_entry.score,
            frequency_order: 0,
            sequences: vec![sequence],
            is_primary,
            tags: placeholder_tags(&database_entry.definition_tags, &database_entry.dictionary),
            entries: database_entry.definitions.clone(),
        };
        TermDictionaryEntry {
            is_primary,
            inflection_hypotheses,
            score: database_entry.score,
            frequency_order: 0,
            dictionary_index,
            dictionary_alias,
            dictionary_priority,
            source_term_exact_match_count,
            max_transformed_text_length,
            headwords: vec![headword],
            definitions: vec![definition],
            pronunciations: Vec::new(),
            frequencies: Vec::new(),
        }
    }

    // Grouping and merging

    fn group_dictionary_entries_by_headword(
        &self,
        dictionary_entries: &[TermDictionaryEntry],
    ) -> Vec<TermDictionaryEntry> {
        let mut groups: IndexMap<String, Vec<TermDictionaryEntry>> = IndexMap::new();
        for entry in dictionary_entries {
            let Some(headword) = entry.headwords.first() else {
                continue;
            };
            let key = map_key(&json!([
                headword.term,
                headword.reading,
                normalized_hypotheses(&entry.inflection_hypotheses),
            ]));
            groups.entry(key).or_default().push(entry.clone());
        }
        groups
            .values()
            .map(|group| self.create_grouped_dictionary_entry(group, false))
            .collect()
    }

    fn get_related_dictionary_entries(
        &self,
        dictionary_entries: &[TermDictionaryEntry],
        options: &FindTermsOptions,
    ) -> Result<Vec<TermDictionaryEntry>, TranslatorError> {
        let main_dictionary = options
            .main_dictionary
            .as_ref()
            .ok_or(TranslatorError::MissingMainDictionary)?;
        let enabled_dictionary_map = &options.enabled_dictionary_map;

        let mut sequence_list: Vec<SequenceQueryRequest> = Vec::new();
        let mut groups: Vec<DictionaryEntryGroup> = Vec::new();
        let mut group_indices_by_sequence: IndexMap<i64, usize> = IndexMap::new();
        let mut ungrouped: IndexMap<u64, TermDictionaryEntry> = IndexMap::new();
        for entry in dictionary_entries {
            let Some(definition) = entry.definitions.first() else {
                continue;
            };
            let sequence = definition.sequences.first().copied().unwrap_or(-1);
            if definition.dictionary == *main_dictionary && sequence >= 0 {
                let group_index = *group_indices_by_sequence.entry(sequence).or_insert_with(|| {
                    groups.push(DictionaryEntryGroup::default());
                    sequence_list.push(SequenceQueryRequest {
                        query: sequence,
                        dictionary: definition.dictionary.clone(),
                    });
                    groups.len() - 1
                });
                groups[group_index].ids.insert(definition.id);
                groups[group_index].dictionary_entries.push(entry.clone());
            } else {
                ungrouped.insert(definition.id, entry.clone());
            }
        }

        if !sequence_list.is_empty() {
            self.add_related_dictionary_entries(
                &mut groups,
                &mut ungrouped,
                &sequence_list,
                enabled_dictionary_map,
            )?;

            // absorb unsequenced entries whose headword matches a group
            let mut term_list: Vec<TermExactQueryRequest> = Vec::new();
            let mut target_groups: Vec<Vec<usize>> = Vec::new();
            let mut key_to_term_index: IndexMap<String, usize> = IndexMap::new();
            for (group_index, group) in groups.iter().enumerate() {
                for entry in &group.dictionary_entries {
                    let Some(headword) = entry.headwords.first() else {
                        continue;
                    };
                    let key = map_key(&json!([headword.term, headword.reading]));
                    match key_to_term_index.get(&key) {
                        Some(&term_index) => {
                            if !target_groups[term_index].contains(&group_index) {
                                target_groups[term_index].push(group_index);
                            }
                        }
                        None => {
                            key_to_term_index.insert(key, term_list.len());
                            term_list.push(TermExactQueryRequest {
                                term: headword.term.clone(),
                                reading: headword.reading.clone(),
                            });
                            target_groups.push(vec![group_index]);
                        }
                    }
                }
            }
            let mut absorbed: Vec<u64> = Vec::new();
            for (&id, entry) in &ungrouped {
                let Some(headword) = entry.headwords.first() else {
                    continue;
                };
                let key = map_key(&json!([headword.term, headword.reading]));
                let Some(&term_index) = key_to_term_index.get(&key) else {
                    continue;
                };
                let mut moved = false;
                for &group_index in &target_groups[term_index] {
                    let group = &mut groups[group_index];
                    if group.ids.insert(id) {
                        group.dictionary_entries.push(entry.clone());
                        moved = true;
                    }
                }
                if moved {
                    absorbed.push(id);
                }
            }
            for id in absorbed {
                ungrouped.shift_remove(&id);
            }

            let secondary_search_dictionary_map: TermEnabledDictionaryMap = enabled_dictionary_map
                .iter()
                .filter(|(_, details)| details.allow_secondary_searches)
                .map(|(name, details)| (name.clone(), details.clone()))
                .collect();
            if !ungrouped.is_empty()
                && !secondary_search_dictionary_map.is_empty()
                && !term_list.is_empty()
            {
                self.add_secondary_related_dictionary_entries(
                    &mut groups,
                    &mut ungrouped,
                    &term_list,
                    &target_groups,
                    enabled_dictionary_map,
                    &secondary_search_dictionary_map,
                )?;
            }

            for group in &mut groups {
                group
                    .dictionary_entries
                    .sort_by_key(|entry| entry.definitions.first().map(|d| d.id));
            }
        }

        let mut new_dictionary_entries: Vec<TermDictionaryEntry> = groups
            .iter()
            .map(|group| self.create_grouped_dictionary_entry(&group.dictionary_entries, true))
            .collect();
        let ungrouped_entries: Vec<TermDictionaryEntry> = ungrouped.into_values().collect();
        new_dictionary_entries
            .extend(self.group_dictionary_entries_by_headword(&ungrouped_entries));
        Ok(new_dictionary_entries)
    }

    fn add_related_dictionary_entries(
        &self,
        groups: &mut [DictionaryEntryGroup],
        ungrouped: &mut IndexMap<u64, TermDictionaryEntry>,
        sequence_list: &[SequenceQueryRequest],
        enabled_dictionary_map: &TermEnabledDictionaryMap,
    ) -> Result<(), TranslatorError> {
        let database_entries = self.db.find_terms_by_sequence_bulk(sequence_list)?;
        for database_entry in database_entries {
            let Some(group) = groups.get_mut(database_entry.index) else {
                warn!(
                    "find_terms_by_sequence_bulk returned out-of-range index {}",
                    database_entry.index
                );
                continue;
            };
            if !group.ids.insert(database_entry.id) {
                continue;
            }
            let term = database_entry.term.clone();
            group
                .dictionary_entries
                .push(Self::create_term_dictionary_entry_from_database_entry(
                    &database_entry,
                    &term,
                    &term,
                    &term,
                    Vec::new(),
                    false,
                    enabled_dictionary_map,
                ));
            ungrouped.shift_remove(&database_entry.id);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn add_secondary_related_dictionary_entries(
        &self,
        groups: &mut [DictionaryEntryGroup],
        ungrouped: &mut IndexMap<u64, TermDictionaryEntry>,
        term_list: &[TermExactQueryRequest],
        target_groups: &[Vec<usize>],
        enabled_dictionary_map: &TermEnabledDictionaryMap,
        secondary_search_dictionary_map: &TermEnabledDictionaryMap,
    ) -> Result<(), TranslatorError> {
        let mut database_entries = self
            .db
            .find_terms_exact_bulk(term_list, secondary_search_dictionary_map)?;
        database_entries.sort_by_key(|entry| entry.index);
        for database_entry in database_entries {
            let Some(group_indices) = target_groups.get(database_entry.index) else {
                warn!(
                    "find_terms_exact_bulk returned out-of-range index {}",
                    database_entry.index
                );
                continue;
            };
            let source_text = &term_list[database_entry.index].term;
            for &group_index in group_indices {
                let group = &mut groups[group_index];
                if !group.ids.insert(database_entry.id) {
                    continue;
                }
                group
                    .dictionary_entries
                    .push(Self::create_term_dictionary_entry_from_database_entry(
                        &database_entry,
                        source_text,
                        source_text,
                        source_text,
                        Vec::new(),
                        false,
                        enabled_dictionary_map,
                    ));
                ungrouped.shift_remove(&database_entry.id);
            }
        }
        Ok(())
    }

    /// Folds a group of entries into one, sharing headwords keyed by
    /// `(term, reading)` and remapping definition headword indices.
    fn create_grouped_dictionary_entry(
        &self,
        dictionary_entries: &[TermDictionaryEntry],
        mut check_duplicate_definitions: bool,
    ) -> TermDictionaryEntry {
        // headwords are built before anything else so definition indices can
        // be remapped while entry order is preserved
        let mut headwords: IndexMap<String, TermHeadword> = IndexMap::new();
        let headword_index_maps: Vec<Vec<usize>> = dictionary_entries
            .iter()
            .map(|entry| Self::add_term_headwords(&mut headwords, &entry.headwords))
            .collect();
        if dictionary_entries.len() <= 1 {
            check_duplicate_definitions = false;
        }

        let mut score = i64::MIN;
        let mut dictionary_index = usize::MAX;
        let mut dictionary_alias = String::new();
        let mut dictionary_priority = i64::MIN;
        let mut max_transformed_text_length = 0;
        let mut is_primary = false;
        let mut definitions: Vec<TermDefinition> = Vec::new();
        let mut definitions_map: IndexMap<String, usize> = IndexMap::new();
        let mut inflection_hypotheses: Option<Vec<InflectionHypothesis>> = None;

        for (entry, headword_index_map) in dictionary_entries.iter().zip(&headword_index_maps) {
            score = score.max(entry.score);
            if entry.dictionary_index < dictionary_index {
                dictionary_index = entry.dictionary_index;
                dictionary_alias = entry.dictionary_alias.clone();
            }
            dictionary_priority = dictionary_priority.max(entry.dictionary_priority);
            if entry.is_primary {
                is_primary = true;
                max_transformed_text_length =
                    max_transformed_text_length.max(entry.max_transformed_text_length);
                let replace = match &inflection_hypotheses {
                    Some(current) => entry.inflection_hypotheses.len() < current.len(),
                    None => true,
                };
                if replace {
                    inflection_hypotheses = Some(entry.inflection_hypotheses.clone());
                }
            }
            if check_duplicate_definitions {
                Self::add_term_definitions(
                    &mut definitions,
                    &mut definitions_map,
                    &entry.definitions,
                    headword_index_map,
                );
            } else {
                Self::add_term_definitions_fast(
                    &mut definitions,
                    &entry.definitions,
                    headword_index_map,
                );
            }
        }

        let headwords: Vec<TermHeadword> = headwords.into_values().collect();
        let mut source_term_exact_match_count = 0;
        for headword in &headwords {
            if headword
                .sources
                .iter()
                .any(|source| source.is_primary && source.match_source == TermSourceMatchSource::Term)
            {
                source_term_exact_match_count += 1;
            }
        }

        TermDictionaryEntry {
            is_primary,
            inflection_hypotheses: inflection_hypotheses.unwrap_or_default(),
            score,
            frequency_order: 0,
            dictionary_index,
            dictionary_alias,
            dictionary_priority,
            source_term_exact_match_count,
            max_transformed_text_length,
            headwords,
            definitions,
            pronunciations: Vec::new(),
            frequencies: Vec::new(),
        }
    }

    fn add_term_headwords(
        headwords_map: &mut IndexMap<String, TermHeadword>,
        headwords: &[TermHeadword],
    ) -> Vec<usize> {
        headwords
            .iter()
            .map(|headword| {
                let key = map_key(&json!([headword.term, headword.reading]));
                let next_index = headwords_map.len();
                let shared = headwords_map.entry(key).or_insert_with(|| TermHeadword {
                    index: next_index,
                    term: headword.term.clone(),
                    reading: headword.reading.clone(),
                    sources: Vec::new(),
                    tags: Vec::new(),
                    word_classes: Vec::new(),
                });
                Self::add_unique_sources(&mut shared.sources, &headword.sources);
                add_unique(&mut shared.word_classes, &headword.word_classes);
                add_unique_tags(&mut shared.tags, &headword.tags);
                shared.index
            })
            .collect()
    }

    fn add_unique_sources(sources: &mut Vec<TermSource>, new_sources: &[TermSource]) {
        for new_source in new_sources {
            let existing = sources.iter_mut().find(|source| {
                source.original_text == new_source.original_text
                    && source.transformed_text == new_source.transformed_text
                    && source.deinflected_text == new_source.deinflected_text
                    && source.match_type == new_source.match_type
                    && source.match_source == new_source.match_source
            });
            match existing {
                Some(source) => {
                    if new_source.is_primary {
                        source.is_primary = true;
                    }
                }
                None => sources.push(new_source.clone()),
            }
        }
    }

    fn add_term_definitions(
        definitions: &mut Vec<TermDefinition>,
        definitions_map: &mut IndexMap<String, usize>,
        new_definitions: &[TermDefinition],
        headword_index_map: &[usize],
    ) {
        for new_definition in new_definitions {
            let key = map_key(&json!([new_definition.dictionary, new_definition.entries]));
            match definitions_map.get(&key) {
                Some(&existing_index) => {
                    let definition = &mut definitions[existing_index];
                    if new_definition.is_primary {
                        definition.is_primary = true;
                    }
                    add_unique(&mut definition.sequences, &new_definition.sequences);
                    add_unique_tags(&mut definition.tags, &new_definition.tags);
                    for &headword_index in &new_definition.headword_indices {
                        insert_sorted_unique(
                            &mut definition.headword_indices,
                            headword_index_map[headword_index],
                        );
                    }
                }
                None => {
                    let mut definition = new_definition.clone();
                    definition.index = definitions.len();
                    definition.headword_indices = Vec::new();
                    for &headword_index in &new_definition.headword_indices {
                        insert_sorted_unique(
                            &mut definition.headword_indices,
                            headword_index_map[headword_index],
                        );
                    }
                    definitions_map.insert(key, definitions.len());
                    definitions.push(definition);
                }
            }
        }
    }

    fn add_term_definitions_fast(
        definitions: &mut Vec<TermDefinition>,
        new_definitions: &[TermDefinition],
        headword_index_map: &[usize],
    ) {
        for new_definition in new_definitions {
            let mut definition = new_definition.clone();
            definition.index = definitions.len();
            definition.headword_indices = Vec::new();
            for &headword_index in &new_definition.headword_indices {
                insert_sorted_unique(
                    &mut definition.headword_indices,
                    headword_index_map[headword_index],
                );
            }
            definitions.push(definition);
        }
    }

    // Definition exclusion

    fn remove_excluded_definitions(
        dictionary_entries: &mut Vec<TermDictionaryEntry>,
        excluded: &IndexSet<String>,
    ) {
        dictionary_entries.retain_mut(|entry| {
            let definition_count = entry.definitions.len();
            entry
                .definitions
                .retain(|definition| !excluded.contains(&definition.dictionary));
            let definitions_removed = entry.definitions.len() != definition_count;
            entry
                .pronunciations
                .retain(|pronunciation| !excluded.contains(&pronunciation.dictionary));
            entry
                .frequencies
                .retain(|frequency| !excluded.contains(&frequency.dictionary));
            for definition in &mut entry.definitions {
                remove_tags_with_dictionary(&mut definition.tags, excluded);
            }
            for headword in &mut entry.headwords {
                remove_tags_with_dictionary(&mut headword.tags, excluded);
            }
            if entry.definitions.is_empty() {
                return false;
            }
            if definitions_removed {
                Self::remove_unused_headwords(entry);
            }
            true
        });
    }

    fn remove_unused_headwords(entry: &mut TermDictionaryEntry) {
        let mut used: IndexSet<usize> = IndexSet::new();
        for definition in &entry.definitions {
            used.extend(definition.headword_indices.iter().copied());
        }
        if used.len() == entry.headwords.len() {
            return;
        }
        let mut index_remap: IndexMap<usize, usize> = IndexMap::new();
        let mut headwords = Vec::with_capacity(used.len());
        for (old_index, mut headword) in entry.headwords.drain(..).enumerate() {
            if used.contains(&old_index) {
                headword.index = headwords.len();
                index_remap.insert(old_index, headwords.len());
                headwords.push(headword);
            }
        }
        entry.headwords = headwords;
        for definition in &mut entry.definitions {
            let mut headword_indices = Vec::with_capacity(definition.headword_indices.len());
            for old_index in &definition.headword_indices {
                if let Some(&new_index) = index_remap.get(old_index) {
                    insert_sorted_unique(&mut headword_indices, new_index);
                }
            }
            definition.headword_indices = headword_indices;
        }
        entry.pronunciations.retain_mut(|pronunciation| {
            match index_remap.get(&pronunciation.headword_index) {
                Some(&new_index) => {
                    pronunciation.headword_index = new_index;
                    true
                }
                None => false,
            }
        });
        entry.frequencies.retain_mut(|frequency| {
            match index_remap.get(&frequency.headword_index) {
                Some(&new_index) => {
                    frequency.headword_index = new_index;
                    true
                }
                None => false,
            }
        });
        for (index, pronunciation) in entry.pronunciations.iter_mut().enumerate() {
            pronunciation.index = index;
        }
        for (index, frequency) in entry.frequencies.iter_mut().enumerate() {
            frequency.index = index;
        }
    }

    // Metadata enrichment

    fn add_term_meta(
        &self,
        dictionary_entries: &mut [TermDictionaryEntry],
        enabled_dictionary_map: &TermEnabledDictionaryMap,
    ) -> Result<(), TranslatorError> {
        let mut terms: Vec<String> = Vec::new();
        let mut targets_per_term: Vec<IndexMap<String, Vec<(usize, usize)>>> = Vec::new();
        for (entry_index, entry) in dictionary_entries.iter().enumerate() {
            for (headword_index, headword) in entry.headwords.iter().enumerate() {
                let term_position = match terms.iter().position(|term| *term == headword.term) {
                    Some(position) => position,
                    None => {
                        terms.push(headword.term.clone());
                        targets_per_term.push(IndexMap::new());
                        terms.len() - 1
                    }
                };
                targets_per_term[term_position]
                    .entry(headword.reading.clone())
                    .or_default()
                    .push((entry_index, headword_index));
            }
        }
        if terms.is_empty() {
            return Ok(());
        }
        let metas = self.db.find_term_meta_bulk(&terms, enabled_dictionary_map)?;
        for meta in metas {
            let Some(reading_map) = targets_per_term.get(meta.index) else {
                warn!("find_term_meta_bulk returned out-of-range index {}", meta.index);
                continue;
            };
            let (dictionary_index, dictionary_alias, dictionary_priority) =
                term_dictionary_details(&meta.dictionary, enabled_dictionary_map);
            for (reading, targets) in reading_map {
                match (&meta.mode, &meta.data) {
                    (TermMetaMode::Freq, TermMetaData::Frequency(frequency_data)) => {
                        let (has_reading, data) = match frequency_data {
                            TermMetaFrequency::WithReading {
                                reading: meta_reading,
                                frequency,
                            } => {
                                if meta_reading != reading {
                                    continue;
                                }
                                (true, frequency)
                            }
                            TermMetaFrequency::Generic(data) => (false, data),
                        };
                        let info = data.to_frequency_info();
                        for &(entry_index, headword_index) in targets {
                            let entry = &mut dictionary_entries[entry_index];
                            entry.frequencies.push(TermFrequency {
                                index: entry.frequencies.len(),
                                headword_index,
                                dictionary: meta.dictionary.clone(),
                                dictionary_index,
                                dictionary_alias: dictionary_alias.clone(),
                                dictionary_priority,
                                has_reading,
                                frequency: info.frequency,
                                display_value: info.display_value.clone(),
                                display_value_parsed: info.display_value_parsed,
                            });
                        }
                    }
                    (TermMetaMode::Pitch, TermMetaData::Pitch(pitch_data)) => {
                        if &pitch_data.reading != reading {
                            continue;
                        }
                        let pitches: Vec<Pronunciation> = pitch_data
                            .pitches
                            .iter()
                            .map(|pitch| {
                                Pronunciation::PitchAccent(PitchAccent {
                                    position: pitch.position,
                                    nasal_positions: pitch
                                        .nasal
                                        .as_ref()
                                        .map(|v| v.to_vec())
                                        .unwrap_or_default(),
                                    devoice_positions: pitch
                                        .devoice
                                        .as_ref()
                                        .map(|v| v.to_vec())
                                        .unwrap_or_default(),
                                    tags: placeholder_tags(
                                        pitch.tags.as_deref().unwrap_or_default(),
                                        &meta.dictionary,
                                    ),
                                })
                            })
                            .collect();
                        if pitches.is_empty() {
                            continue;
                        }
                        for &(entry_index, headword_index) in targets {
                            let entry = &mut dictionary_entries[entry_index];
                            entry.pronunciations.push(TermPronunciation {
                                index: entry.pronunciations.len(),
                                headword_index,
                                dictionary: meta.dictionary.clone(),
                                dictionary_index,
                                dictionary_alias: dictionary_alias.clone(),
                                dictionary_priority,
                                pronunciations: pitches.clone(),
                            });
                        }
                    }
                    (TermMetaMode::Ipa, TermMetaData::Phonetic(phonetic_data)) => {
                        if &phonetic_data.reading != reading {
                            continue;
                        }
                        let transcriptions: Vec<Pronunciation> = phonetic_data
                            .transcriptions
                            .iter()
                            .map(|transcription| {
                                Pronunciation::PhoneticTranscription(PhoneticTranscription {
                                    ipa: transcription.ipa.clone(),
                                    tags: placeholder_tags(
                                        transcription.tags.as_deref().unwrap_or_default(),
                                        &meta.dictionary,
                                    ),
                                })
                            })
                            .collect();
                        if transcriptions.is_empty() {
                            continue;
                        }
                        for &(entry_index, headword_index) in targets {
                            let entry = &mut dictionary_entries[entry_index];
                            entry.pronunciations.push(TermPronunciation {
                                index: entry.pronunciations.len(),
                                headword_index,
                                dictionary: meta.dictionary.clone(),
                                dictionary_index,
                                dictionary_alias: dictionary_alias.clone(),
                                dictionary_priority,
                                pronunciations: transcriptions.clone(),
                            });
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn add_kanji_meta(
        &self,
        dictionary_entries: &mut [KanjiDictionaryEntry],
        enabled_dictionary_map: &KanjiEnabledDictionaryMap,
    ) -> Result<(), TranslatorError> {
        let mut characters: Vec<String> = Vec::new();
        let mut targets_per_character: Vec<Vec<usize>> = Vec::new();
        for (entry_index, entry) in dictionary_entries.iter().enumerate() {
            match characters
                .iter()
                .position(|character| *character == entry.character)
            {
                Some(position) => targets_per_character[position].push(entry_index),
                None => {
                    characters.push(entry.character.clone());
                    targets_per_character.push(vec![entry_index]);
                }
            }
        }
        if characters.is_empty() {
            return Ok(());
        }
        let metas = self
            .db
            .find_kanji_meta_bulk(&characters, enabled_dictionary_map)?;
        for meta in metas {
            let Some(targets) = targets_per_character.get(meta.index) else {
                warn!("find_kanji_meta_bulk returned out-of-range index {}", meta.index);
                continue;
            };
            let (dictionary_index, dictionary_alias, dictionary_priority) =
                kanji_dictionary_details(&meta.dictionary, enabled_dictionary_map);
            let info = meta.data.to_frequency_info();
            for &entry_index in targets {
                let entry = &mut dictionary_entries[entry_index];
                entry.frequencies.push(KanjiFrequency {
                    index: entry.frequencies.len(),
                    dictionary: meta.dictionary.clone(),
                    dictionary_index,
                    dictionary_alias: dictionary_alias.clone(),
                    dictionary_priority,
                    character: meta.character.clone(),
                    frequency: info.frequency,
                    display_value: info.display_value.clone(),
                    display_value_parsed: info.display_value_parsed,
                });
            }
        }
        Ok(())
    }

    // Tag expansion

    fn expand_term_tags(
        &mut self,
        dictionary_entries: &mut [TermDictionaryEntry],
    ) -> Result<(), TranslatorError> {
        let mut keys: IndexSet<(String, String)> = IndexSet::new();
        for entry in dictionary_entries.iter() {
            for headword in &entry.headwords {
                collect_tag_keys(&headword.tags, &mut keys);
            }
            for definition in &entry.definitions {
                collect_tag_keys(&definition.tags, &mut keys);
            }
            for pronunciation in &entry.pronunciations {
                for datum in &pronunciation.pronunciations {
                    collect_tag_keys(pronunciation_tags(datum), &mut keys);
                }
            }
        }
        let resolved = self.resolve_tags(keys)?;
        for entry in dictionary_entries.iter_mut() {
            for headword in &mut entry.headwords {
                self.expand_tag_list(&mut headword.tags, &resolved);
            }
            for definition in &mut entry.definitions {
                self.expand_tag_list(&mut definition.tags, &resolved);
            }
            for pronunciation in &mut entry.pronunciations {
                for datum in &mut pronunciation.pronunciations {
                    self.expand_tag_list(pronunciation_tags_mut(datum), &resolved);
                }
            }
        }
        Ok(())
    }

    /// Resolves `(dictionary, tag_name)` pairs through the two-level tag
    /// cache, batching all misses into a single bulk query. The cache key
    /// is the tag name truncated at the first `:`.
    fn resolve_tags(
        &mut self,
        keys: IndexSet<(String, String)>,
    ) -> Result<IndexMap<(String, String), Option<DatabaseTag>>, TranslatorError> {
        let mut resolved: IndexMap<(String, String), Option<DatabaseTag>> = IndexMap::new();
        let mut miss_queries: Vec<TagQueryRequest> = Vec::new();
        let mut miss_keys: Vec<(String, String)> = Vec::new();
        for (dictionary, name) in keys {
            let query = base_name(&name).to_string();
            let cache = self.tag_cache.entry(dictionary.clone()).or_default();
            match cache.get(&query) {
                Some(cached) => {
                    resolved.insert((dictionary, name), cached.clone());
                }
                None => {
                    if !miss_queries
                        .iter()
                        .any(|m| m.dictionary == dictionary && m.query == query)
                    {
                        miss_queries.push(TagQueryRequest {
                            query,
                            dictionary: dictionary.clone(),
                        });
                    }
                    miss_keys.push((dictionary, name));
                }
            }
        }
        if !miss_queries.is_empty() {
            let database_tags = self.db.find_tag_meta_bulk(&miss_queries)?;
            for (request, database_tag) in miss_queries.iter().zip(database_tags) {
                self.tag_cache
                    .entry(request.dictionary.clone())
                    .or_default()
                    .insert(request.query.clone(), database_tag);
            }
            for (dictionary, name) in miss_keys {
                let query = base_name(&name).to_string();
                let cached = self
                    .tag_cache
                    .get(&dictionary)
                    .and_then(|cache| cache.get(&query))
                    .cloned()
                    .flatten();
                resolved.insert((dictionary, name), cached);
            }
        }
        Ok(resolved)
    }

    /// Replaces placeholder tags with their expanded records, merges
    /// duplicates and sorts.
    fn expand_tag_list(
        &self,
        tags: &mut Vec<DictionaryTag>,
        resolved: &IndexMap<(String, String), Option<DatabaseTag>>,
    ) {
        let placeholders = std::mem::take(tags);
        for placeholder in placeholders {
            let dictionary = placeholder
                .dictionaries
                .first()
                .cloned()
                .unwrap_or_default();
            let key = (dictionary.clone(), placeholder.name.clone());
            let expanded = match resolved.get(&key).cloned().flatten() {
                Some(database_tag) => expand_database_tag(&database_tag, placeholder.name, dictionary),
                None => DictionaryTag::new_default(placeholder.name, dictionary),
            };
            tags.push(expanded);
        }
        Self::merge_similar_tags(tags);
        tags.sort_by(|v1, v2| match v1.order.cmp(&v2.order) {
            Ordering::Equal => self.string_comparer.compare(&v1.name, &v2.name),
            other => other,
        });
    }

    /// Tags with the same name and category merge: minimum order, maximum
    /// score, dictionaries and content appended uniquely.
    fn merge_similar_tags(tags: &mut Vec<DictionaryTag>) {
        let mut i = 0;
        while i < tags.len() {
            let mut j = i + 1;
            while j < tags.len() {
                if tags[j].name == tags[i].name && tags[j].category == tags[i].category {
                    let removed = tags.remove(j);
                    tags[i].order = tags[i].order.min(removed.order);
                    tags[i].score = tags[i].score.max(removed.score);
                    add_unique(&mut tags[i].dictionaries, &removed.dictionaries);
                    add_unique(&mut tags[i].content, &removed.content);
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
    }

    fn expand_kanji_stats(
        &mut self,
        stats: &IndexMap<String, String>,
        dictionary: &str,
    ) -> Result<KanjiStatGroups, TranslatorError> {
        let keys: IndexSet<(String, String)> = stats
            .keys()
            .map(|name| (dictionary.to_string(), name.clone()))
            .collect();
        let resolved = self.resolve_tags(keys)?;
        let mut groups: KanjiStatGroups = IndexMap::new();
        for (name, value) in stats {
            let database_tag = resolved
                .get(&(dictionary.to_string(), name.clone()))
                .cloned()
                .flatten();
            let stat = match database_tag {
                Some(tag) => KanjiStat {
                    name: name.clone(),
                    category: if tag.category.is_empty() {
                        "default".to_string()
                    } else {
                        tag.category
                    },
                    content: tag.notes,
                    order: tag.order,
                    score: tag.score,
                    dictionary: dictionary.to_string(),
                    value: value.clone(),
                },
                None => KanjiStat {
                    name: name.clone(),
                    category: "default".to_string(),
                    content: String::new(),
                    order: 0,
                    score: 0,
                    dictionary: dictionary.to_string(),
                    value: value.clone(),
                },
            };
            groups.entry(stat.category.clone()).or_default().push(stat);
        }
        for group in groups.values_mut() {
            group.sort_by(|v1, v2| match v1.order.cmp(&v2.order) {
                Ordering::Equal => self.string_comparer.compare(&v1.name, &v2.name),
                other => other,
            });
        }
        Ok(groups)
    }

    // Sorting

    fn sort_term_dictionary_entries(&self, dictionary_entries: &mut [TermDictionaryEntry]) {
        let string_comparer = &self.string_comparer;
        dictionary_entries.sort_by(|v1, v2| {
            // longest source text first
            let cmp = v2
                .max_transformed_text_length
                .cmp(&v1.max_transformed_text_length);
            if cmp != Ordering::Equal {
                return cmp;
            }
            let cmp = shortest_hypothesis_length(&v1.inflection_hypotheses)
                .cmp(&shortest_hypothesis_length(&v2.inflection_hypotheses));
            if cmp != Ordering::Equal {
                return cmp;
            }
            let cmp = v2
                .source_term_exact_match_count
                .cmp(&v1.source_term_exact_match_count);
            if cmp != Ordering::Equal {
                return cmp;
            }
            let cmp = v1.frequency_order.cmp(&v2.frequency_order);
            if cmp != Ordering::Equal {
                return cmp;
            }
            let cmp = v2.dictionary_priority.cmp(&v1.dictionary_priority);
            if cmp != Ordering::Equal {
                return cmp;
            }
            let cmp = v2.score.cmp(&v1.score);
            if cmp != Ordering::Equal {
                return cmp;
            }
            let headword_count = v1.headwords.len().min(v2.headwords.len());
            for i in 0..headword_count {
                let term1 = &v1.headwords[i].term;
                let term2 = &v2.headwords[i].term;
                let cmp = term2.chars().count().cmp(&term1.chars().count());
                if cmp != Ordering::Equal {
                    return cmp;
                }
                let cmp = string_comparer.compare(term1, term2);
                if cmp != Ordering::Equal {
                    return cmp;
                }
            }
            let cmp = v2.definitions.len().cmp(&v1.definitions.len());
            if cmp != Ordering::Equal {
                return cmp;
            }
            v1.dictionary_index.cmp(&v2.dictionary_index)
        });
    }

    fn sort_term_dictionary_entry_definitions(definitions: &mut [TermDefinition]) {
        definitions.sort_by(|v1, v2| {
            v1.frequency_order
                .cmp(&v2.frequency_order)
                .then_with(|| v2.dictionary_priority.cmp(&v1.dictionary_priority))
                .then_with(|| v2.score.cmp(&v1.score))
                .then_with(|| v1.headword_indices.cmp(&v2.headword_indices))
                .then_with(|| v1.dictionary_index.cmp(&v2.dictionary_index))
                .then_with(|| {
                    let score1: i64 = v1.tags.iter().map(|tag| tag.score).sum();
                    let score2: i64 = v2.tags.iter().map(|tag| tag.score).sum();
                    score2.cmp(&score1)
                })
                .then_with(|| v1.index.cmp(&v2.index))
        });
    }

    /// Walking one entry's definitions in order per dictionary: a
    /// definition whose part-of-speech tag names repeat the previous
    /// definition's gets those tags flagged redundant.
    fn flag_redundant_definition_tags(definitions: &mut [TermDefinition]) {
        let mut last_dictionary: Option<String> = None;
        let mut last_part_of_speech = String::new();
        for definition in definitions {
            let mut tag_names: Vec<&str> = definition
                .tags
                .iter()
                .filter(|tag| tag.category == "partOfSpeech")
                .map(|tag| tag.name.as_str())
                .collect();
            tag_names.sort_unstable();
            let part_of_speech = tag_names.join(",");

            if last_dictionary.as_deref() != Some(definition.dictionary.as_str()) {
                last_dictionary = Some(definition.dictionary.clone());
                last_part_of_speech.clear();
            }
            if !part_of_speech.is_empty() && last_part_of_speech == part_of_speech {
                for tag in &mut definition.tags {
                    if tag.category == "partOfSpeech" {
                        tag.redundant = true;
                    }
                }
            } else {
                last_part_of_speech = part_of_speech;
            }
        }
    }

    /// Computes `frequency_order` for entries and definitions from the
    /// nominated sorting dictionary.
    fn update_sort_frequencies(
        dictionary_entries: &mut [TermDictionaryEntry],
        dictionary: &str,
        ascending: bool,
    ) {
        let mut frequency_map: IndexMap<usize, i64> = IndexMap::new();
        for entry in dictionary_entries {
            let mut frequency_min = i64::MAX;
            let mut frequency_max = i64::MIN;
            for frequency in &entry.frequencies {
                if frequency.dictionary != dictionary {
                    continue;
                }
                frequency_map.insert(frequency.headword_index, frequency.frequency);
                frequency_min = frequency_min.min(frequency.frequency);
                frequency_max = frequency_max.max(frequency.frequency);
            }
            entry.frequency_order = if frequency_min <= frequency_max {
                if ascending {
                    frequency_min
                } else {
                    -frequency_max
                }
            } else if ascending {
                i64::MAX
            } else {
                0
            };
            for definition in &mut entry.definitions {
                frequency_min = i64::MAX;
                frequency_max = i64::MIN;
                for headword_index in &definition.headword_indices {
                    if let Some(&frequency) = frequency_map.get(headword_index) {
                        frequency_min = frequency_min.min(frequency);
                        frequency_max = frequency_max.max(frequency);
                    }
                }
                definition.frequency_order = if frequency_min <= frequency_max {
                    if ascending {
                        frequency_min
                    } else {
                        -frequency_max
                    }
                } else if ascending {
                    i64::MAX
                } else {
                    0
                };
            }
            frequency_map.clear();
        }
    }
}

// Text variants

enum AxisValue<'a> {
    Replacements(Option<&'a [crate::translation::FindTermsTextReplacement]>),
    Emphatic(bool),
    Transformation(&'a crate::language::TextTransformation, bool),
}

/// Lazily enumerates the Cartesian product of the configured text
/// transformation axes as `(transformed_text, source_map)` pairs. The axes
/// form a mixed-radix counter with the last axis changing fastest.
struct TextVariants<'a> {
    text: &'a str,
    emphatic_collapser: Option<crate::language::EmphaticCollapser>,
    axes: Vec<Vec<AxisValue<'a>>>,
    counter: Vec<usize>,
    done: bool,
}

impl<'a> TextVariants<'a> {
    fn new(text: &'a str, descriptor: &'a LanguageDescriptor, options: &'a FindTermsOptions) -> Self {
        let mut axes: Vec<Vec<AxisValue<'a>>> = Vec::new();
        let replacement_axis: Vec<AxisValue<'a>> = if options.text_replacements.is_empty() {
            vec![AxisValue::Replacements(None)]
        } else {
            options
                .text_replacements
                .iter()
                .map(|variant| AxisValue::Replacements(variant.as_deref()))
                .collect()
        };
        axes.push(replacement_axis);
        if descriptor.emphatic_collapser.is_some() {
            match options.collapse_emphatic_sequences {
                EmphaticSequenceCollapse::Off => {}
                EmphaticSequenceCollapse::On => axes.push(vec![AxisValue::Emphatic(false)]),
                EmphaticSequenceCollapse::Full => axes.push(vec![AxisValue::Emphatic(true)]),
            }
        }
        for transformation in descriptor.text_transformations {
            let setting = options
                .text_transformations
                .get(transformation.id)
                .copied()
                .unwrap_or(TextTransformationSetting::Off);
            let values = match setting {
                TextTransformationSetting::Off => {
                    vec![AxisValue::Transformation(transformation, false)]
                }
                TextTransformationSetting::On => {
                    vec![AxisValue::Transformation(transformation, true)]
                }
                TextTransformationSetting::Both => vec![
                    AxisValue::Transformation(transformation, false),
                    AxisValue::Transformation(transformation, true),
                ],
            };
            axes.push(values);
        }
        let counter = vec![0; axes.len()];
        Self {
            text,
            emphatic_collapser: descriptor.emphatic_collapser,
            axes,
            counter,
            done: text.is_empty(),
        }
    }
}

impl Iterator for TextVariants<'_> {
    type Item = (String, TextSourceMap);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut text = self.text.to_string();
        let mut source_map = TextSourceMap::new(self.text);
        for (axis, &choice) in self.axes.iter().zip(&self.counter) {
            match &axis[choice] {
                AxisValue::Replacements(None) => {}
                AxisValue::Replacements(Some(replacements)) => {
                    for replacement in *replacements {
                        text = apply_text_replacement(
                            &text,
                            &mut source_map,
                            &replacement.pattern,
                            &replacement.replacement,
                            replacement.is_global,
                        );
                    }
                }
                AxisValue::Emphatic(full) => {
                    if let Some(collapser) = self.emphatic_collapser {
                        text = collapser(&text, *full, &mut source_map);
                    }
                }
                AxisValue::Transformation(transformation, true) => {
                    text = (transformation.apply)(&text, &mut source_map);
                }
                AxisValue::Transformation(_, false) => {}
            }
        }
        // mixed-radix increment, last axis fastest
        let mut position = self.axes.len();
        loop {
            if position == 0 {
                self.done = true;
                break;
            }
            position -= 1;
            self.counter[position] += 1;
            if self.counter[position] < self.axes[position].len() {
                break;
            }
            self.counter[position] = 0;
        }
        Some((text, source_map))
    }
}

// Helpers

fn shortest_hypothesis_length(hypotheses: &[InflectionHypothesis]) -> usize {
    hypotheses
        .iter()
        .map(|hypothesis| hypothesis.inflections.len())
        .min()
        .unwrap_or(0)
}

fn chains_equal_ignore_order(x: &[String], y: &[String]) -> bool {
    if x.len() != y.len() {
        return false;
    }
    let mut counts: IndexMap<&str, i64> = IndexMap::new();
    for name in x {
        *counts.entry(name.as_str()).or_insert(0) += 1;
    }
    for name in y {
        let count = counts.entry(name.as_str()).or_insert(0);
        if *count == 0 {
            return false;
        }
        *count -= 1;
    }
    true
}

/// Normalizes a hypothesis list for use in a grouping key: chains compare as
/// sets of names, and list order is irrelevant.
fn normalized_hypotheses(hypotheses: &[InflectionHypothesis]) -> Vec<(String, Vec<String>)> {
    let mut normalized: Vec<(String, Vec<String>)> = hypotheses
        .iter()
        .map(|hypothesis| {
            let mut inflections = hypothesis.inflections.clone();
            inflections.sort_unstable();
            (format!("{:?}", hypothesis.source), inflections)
        })
        .collect();
    normalized.sort();
    normalized
}

fn map_key(value: &impl Serialize) -> String {
    serde_json::to_string(value).expect("grouping keys are plain data")
}

fn base_name(name: &str) -> &str {
    match name.find(':') {
        Some(position) => &name[..position],
        None => name,
    }
}

fn placeholder_tags(names: &[impl AsRef<str>], dictionary: &str) -> Vec<DictionaryTag> {
    names
        .iter()
        .map(|name| DictionaryTag::new_default(name.as_ref().to_string(), dictionary.to_string()))
        .collect()
}

fn collect_tag_keys(tags: &[DictionaryTag], keys: &mut IndexSet<(String, String)>) {
    for tag in tags {
        if let Some(dictionary) = tag.dictionaries.first() {
            keys.insert((dictionary.clone(), tag.name.clone()));
        }
    }
}

fn expand_database_tag(
    database_tag: &DatabaseTag,
    name: String,
    dictionary: String,
) -> DictionaryTag {
    DictionaryTag {
        name,
        category: if database_tag.category.is_empty() {
            "default".to_string()
        } else {
            database_tag.category.clone()
        },
        order: database_tag.order,
        score: database_tag.score,
        content: if database_tag.notes.is_empty() {
            Vec::new()
        } else {
            vec![database_tag.notes.clone()]
        },
        dictionaries: vec![dictionary],
        redundant: false,
    }
}

fn pronunciation_tags(datum: &Pronunciation) -> &[DictionaryTag] {
    match datum {
        Pronunciation::PitchAccent(pitch) => &pitch.tags,
        Pronunciation::PhoneticTranscription(transcription) => &transcription.tags,
    }
}

fn pronunciation_tags_mut(datum: &mut Pronunciation) -> &mut Vec<DictionaryTag> {
    match datum {
        Pronunciation::PitchAccent(pitch) => &mut pitch.tags,
        Pronunciation::PhoneticTranscription(transcription) => &mut transcription.tags,
    }
}

fn term_dictionary_details(
    dictionary: &str,
    enabled_dictionary_map: &TermEnabledDictionaryMap,
) -> (usize, String, i64) {
    match enabled_dictionary_map.get(dictionary) {
        Some(details) => (details.index, details.alias.clone(), details.priority),
        None => (enabled_dictionary_map.len(), dictionary.to_string(), 0),
    }
}

fn kanji_dictionary_details(
    dictionary: &str,
    enabled_dictionary_map: &KanjiEnabledDictionaryMap,
) -> (usize, String, i64) {
    match enabled_dictionary_map.get(dictionary) {
        Some(details) => (details.index, details.alias.clone(), details.priority),
        None => (enabled_dictionary_map.len(), dictionary.to_string(), 0),
    }
}

fn add_unique<T: PartialEq + Clone>(list: &mut Vec<T>, new_items: &[T]) {
    for item in new_items {
        if !list.contains(item) {
            list.push(item.clone());
        }
    }
}

fn add_unique_tags(tags: &mut Vec<DictionaryTag>, new_tags: &[DictionaryTag]) {
    for tag in new_tags {
        let exists = tags
            .iter()
            .any(|existing| existing.name == tag.name && existing.dictionaries == tag.dictionaries);
        if !exists {
            tags.push(tag.clone());
        }
    }
}

fn insert_sorted_unique(values: &mut Vec<usize>, value: usize) {
    if let Err(position) = values.binary_search(&value) {
        values.insert(position, value);
    }
}

fn remove_tags_with_dictionary(tags: &mut Vec<DictionaryTag>, excluded: &IndexSet<String>) {
    tags.retain(|tag| {
        !tag.dictionaries
            .iter()
            .any(|dictionary| excluded.contains(dictionary))
    });
}

/// The prefix of `text` containing only Japanese code points.
fn japanese_only_text(text: &str) -> String {
    for (byte_index, c) in text.char_indices() {
        if !is_code_point_japanese(c as u32) {
            return text[..byte_index].to_string();
        }
    }
    text.to_string()
}

/// The next prefix length to search, in scalar values. Word resolution
/// jumps past the trailing letter run and its preceding non-letter;
/// letter resolution steps back one scalar.
fn next_substring_length(search_resolution: SearchResolution, current: &str) -> usize {
    match search_resolution {
        SearchResolution::Word => WORD_BOUNDARY_REGEX
            .find(current)
            .ok()
            .flatten()
            .map(|found| current[..found.start()].chars().count())
            .unwrap_or(0),
        SearchResolution::Letter => current.chars().count().saturating_sub(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        fixture_translator, japanese_options, kanji_options, term_enabled_map,
    };
    use indexmap::IndexSet;
    use pretty_assertions::assert_eq;

    fn assert_entry_invariants(entry: &TermDictionaryEntry) {
        for (index, headword) in entry.headwords.iter().enumerate() {
            assert_eq!(headword.index, index);
        }
        for definition in &entry.definitions {
            assert!(!definition.headword_indices.is_empty());
            let mut sorted = definition.headword_indices.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(definition.headword_indices, sorted);
            for &headword_index in &definition.headword_indices {
                assert!(headword_index < entry.headwords.len());
            }
        }
        for pronunciation in &entry.pronunciations {
            assert!(pronunciation.headword_index < entry.headwords.len());
        }
        for frequency in &entry.frequencies {
            assert!(frequency.headword_index < entry.headwords.len());
        }
    }

    #[test]
    fn deinflected_lookup_returns_the_lemma() {
        let mut translator = fixture_translator();
        let options = japanese_options(&["jmdict"]);
        let result = translator
            .find_terms(FindTermsMode::Group, "食べた", &options)
            .unwrap();
        assert_eq!(result.original_text_length, 3);
        assert_eq!(result.dictionary_entries.len(), 1);
        let entry = &result.dictionary_entries[0];
        assert_eq!(entry.headwords[0].term, "食べる");
        assert_eq!(entry.headwords[0].reading, "たべる");
        assert_eq!(
            entry.inflection_hypotheses,
            vec![InflectionHypothesis {
                source: InflectionSource::Algorithm,
                inflections: vec!["past".to_string()],
            }]
        );
        let source = &entry.headwords[0].sources[0];
        assert_eq!(source.original_text, "食べた");
        assert_eq!(source.transformed_text, "食べた");
        assert_eq!(source.deinflected_text, "食べる");
        assert!(source.is_primary);
        assert_entry_invariants(entry);
    }

    #[test]
    fn decapitalize_transformation_reaches_the_dictionary() {
        let mut translator = fixture_translator();
        let mut options = japanese_options(&["endict"]);
        options.language = "en".to_string();
        options.text_transformations.insert(
            "decapitalize".to_string(),
            TextTransformationSetting::On,
        );
        let result = translator
            .find_terms(FindTermsMode::Group, "Read", &options)
            .unwrap();
        assert_eq!(result.dictionary_entries.len(), 1);
        let entry = &result.dictionary_entries[0];
        assert_eq!(entry.headwords[0].term, "read");
        let source = &entry.headwords[0].sources[0];
        assert_eq!(source.original_text, "Read");
        assert_eq!(source.transformed_text, "read");
        assert_eq!(entry.source_term_exact_match_count, 1);
    }

    #[test]
    fn repeated_word_deduplicates_on_id() {
        let mut translator = fixture_translator();
        let options = japanese_options(&["jmdict"]);
        let result = translator
            .find_terms(FindTermsMode::Group, "走って走って", &options)
            .unwrap();
        assert_eq!(result.dictionary_entries.len(), 1);
        assert_eq!(result.dictionary_entries[0].headwords[0].term, "走る");
        assert_eq!(result.original_text_length, 3);
    }

    #[test]
    fn word_resolution_jumps_to_word_boundaries() {
        let mut translator = fixture_translator();
        let mut options = japanese_options(&["jmdict"]);
        options.search_resolution = SearchResolution::Word;
        let result = translator
            .find_terms(FindTermsMode::Group, "走って 走って", &options)
            .unwrap();
        assert_eq!(result.dictionary_entries.len(), 1);
        assert_eq!(result.dictionary_entries[0].headwords[0].term, "走る");
        assert_eq!(result.original_text_length, 3);
    }

    #[test]
    fn merge_mode_joins_entries_sharing_a_sequence() {
        let mut translator = fixture_translator();
        let mut options = japanese_options(&["jmdict"]);
        options.main_dictionary = Some("jmdict".to_string());
        let result = translator
            .find_terms(FindTermsMode::Merge, "会った", &options)
            .unwrap();
        assert_eq!(result.dictionary_entries.len(), 1);
        let entry = &result.dictionary_entries[0];
        assert!(entry.is_primary);
        let terms: IndexSet<&str> = entry
            .headwords
            .iter()
            .map(|headword| headword.term.as_str())
            .collect();
        assert_eq!(terms, IndexSet::from(["会う", "逢う"]));
        assert_eq!(entry.definitions.len(), 2);
        assert_eq!(entry.source_term_exact_match_count, 1);
        assert_entry_invariants(entry);
    }

    #[test]
    fn merge_mode_without_main_dictionary_is_a_programming_error() {
        let mut translator = fixture_translator();
        let options = japanese_options(&["jmdict"]);
        let result = translator.find_terms(FindTermsMode::Merge, "会った", &options);
        assert!(matches!(result, Err(TranslatorError::MissingMainDictionary)));
    }

    #[test]
    fn fully_excluded_entries_are_dropped() {
        let mut translator = fixture_translator();
        let mut options = japanese_options(&["jmdict"]);
        options.exclude_dictionary_definitions =
            Some(IndexSet::from(["jmdict".to_string()]));
        let result = translator
            .find_terms(FindTermsMode::Group, "食べた", &options)
            .unwrap();
        assert!(result.dictionary_entries.is_empty());
    }

    #[test]
    fn partially_excluded_entries_lose_only_the_excluded_definitions() {
        let mut translator = fixture_translator();
        let options = japanese_options(&["jmdict", "jmdict2"]);
        let result = translator
            .find_terms(FindTermsMode::Group, "食べた", &options)
            .unwrap();
        assert_eq!(result.dictionary_entries.len(), 1);
        assert_eq!(result.dictionary_entries[0].definitions.len(), 2);

        let mut options = japanese_options(&["jmdict", "jmdict2"]);
        options.exclude_dictionary_definitions =
            Some(IndexSet::from(["jmdict2".to_string()]));
        let result = translator
            .find_terms(FindTermsMode::Group, "食べた", &options)
            .unwrap();
        assert_eq!(result.dictionary_entries.len(), 1);
        let entry = &result.dictionary_entries[0];
        assert_eq!(entry.definitions.len(), 1);
        assert!(entry
            .definitions
            .iter()
            .all(|definition| definition.dictionary == "jmdict"));
        assert_entry_invariants(entry);
    }

    #[test]
    fn frequency_dictionary_orders_tied_entries() {
        let mut translator = fixture_translator();
        let mut options = japanese_options(&["jmdict", "freqdict"]);
        options.sort_frequency_dictionary = Some("freqdict".to_string());
        options.sort_frequency_dictionary_order = FindTermsSortOrder::Ascending;
        let result = translator
            .find_terms(FindTermsMode::Group, "はし", &options)
            .unwrap();
        assert_eq!(result.dictionary_entries.len(), 2);
        assert_eq!(result.dictionary_entries[0].headwords[0].term, "橋");
        assert_eq!(result.dictionary_entries[1].headwords[0].term, "箸");

        options.sort_frequency_dictionary_order = FindTermsSortOrder::Descending;
        let result = translator
            .find_terms(FindTermsMode::Group, "はし", &options)
            .unwrap();
        assert_eq!(result.dictionary_entries[0].headwords[0].term, "箸");
    }

    #[test]
    fn pitch_meta_and_tags_are_attached() {
        let mut translator = fixture_translator();
        let options = japanese_options(&["jmdict", "accents"]);
        let result = translator
            .find_terms(FindTermsMode::Group, "食べた", &options)
            .unwrap();
        let entry = &result.dictionary_entries[0];
        assert_eq!(entry.pronunciations.len(), 1);
        match &entry.pronunciations[0].pronunciations[0] {
            Pronunciation::PitchAccent(pitch) => assert_eq!(pitch.position, 2),
            other => panic!("expected a pitch accent, got {other:?}"),
        }
        let tag = &entry.definitions[0].tags[0];
        assert_eq!(tag.name, "vt");
        assert_eq!(tag.category, "partOfSpeech");
        assert_eq!(tag.content, vec!["transitive verb".to_string()]);
        assert_eq!(tag.dictionaries, vec!["jmdict".to_string()]);
    }

    #[test]
    fn dictionary_deinflection_merges_with_the_algorithm_hypothesis() {
        let mut translator = fixture_translator();
        let options = japanese_options(&["jmdict", "forms"]);
        let result = translator
            .find_terms(FindTermsMode::Group, "食べた", &options)
            .unwrap();
        assert_eq!(result.dictionary_entries.len(), 1);
        let entry = &result.dictionary_entries[0];
        assert_eq!(entry.headwords[0].term, "食べる");
        assert_eq!(
            entry.inflection_hypotheses,
            vec![InflectionHypothesis {
                source: InflectionSource::Both,
                inflections: vec!["past".to_string()],
            }]
        );
    }

    #[test]
    fn dictionary_only_deinflection_skips_the_algorithm() {
        let mut translator = fixture_translator();
        let mut options = japanese_options(&["jmdict", "forms"]);
        options.deinflection_source = DeinflectionSource::Dictionary;
        let result = translator
            .find_terms(FindTermsMode::Group, "食べた", &options)
            .unwrap();
        assert_eq!(result.dictionary_entries.len(), 1);
        let entry = &result.dictionary_entries[0];
        assert_eq!(entry.headwords[0].term, "食べる");
        assert_eq!(
            entry.inflection_hypotheses,
            vec![InflectionHypothesis {
                source: InflectionSource::Dictionary,
                inflections: vec!["past".to_string()],
            }]
        );
    }

    #[test]
    fn text_variant_axes_count_in_mixed_radix_order() {
        let descriptor = get_language_descriptor("en").unwrap();
        let mut options = FindTermsOptions {
            language: "en".to_string(),
            ..FindTermsOptions::default()
        };
        options.text_transformations.insert(
            "decapitalize".to_string(),
            TextTransformationSetting::Both,
        );
        options.text_transformations.insert(
            "capitalize_first_letter".to_string(),
            TextTransformationSetting::Both,
        );
        let variants: Vec<String> = TextVariants::new("rEAD", descriptor, &options)
            .map(|(text, _)| text)
            .collect();
        assert_eq!(variants, vec!["rEAD", "READ", "read", "Read"]);
    }

    #[test]
    fn emphatic_collapse_recovers_the_original_slice() {
        let mut translator = fixture_translator();
        let mut options = japanese_options(&["jmdict"]);
        options.collapse_emphatic_sequences = EmphaticSequenceCollapse::Full;
        let result = translator
            .find_terms(FindTermsMode::Group, "すっっごーーい", &options)
            .unwrap();
        assert_eq!(result.dictionary_entries.len(), 1);
        let entry = &result.dictionary_entries[0];
        assert_eq!(entry.headwords[0].term, "すごい");
        assert_eq!(entry.headwords[0].sources[0].original_text, "すっっごーーい");
        assert_eq!(result.original_text_length, 7);
    }

    #[test]
    fn katakana_variant_matches_on_reading() {
        let mut translator = fixture_translator();
        let mut options = japanese_options(&["jmdict"]);
        options.text_transformations.insert(
            "katakana_to_hiragana".to_string(),
            TextTransformationSetting::Both,
        );
        let result = translator
            .find_terms(FindTermsMode::Group, "タベタ", &options)
            .unwrap();
        assert_eq!(result.dictionary_entries.len(), 1);
        let entry = &result.dictionary_entries[0];
        assert_eq!(entry.headwords[0].term, "食べる");
        let source = &entry.headwords[0].sources[0];
        assert_eq!(source.original_text, "タベタ");
        assert_eq!(source.transformed_text, "たべた");
        assert_eq!(source.match_source, TermSourceMatchSource::Reading);
    }

    #[test]
    fn empty_and_filtered_input_yield_empty_results() {
        let mut translator = fixture_translator();
        let options = japanese_options(&["jmdict"]);
        let result = translator
            .find_terms(FindTermsMode::Group, "", &options)
            .unwrap();
        assert!(result.dictionary_entries.is_empty());
        assert_eq!(result.original_text_length, 0);

        let mut options = japanese_options(&["jmdict"]);
        options.remove_non_japanese_characters = true;
        let result = translator
            .find_terms(FindTermsMode::Group, "abc", &options)
            .unwrap();
        assert!(result.dictionary_entries.is_empty());
    }

    #[test]
    fn grouping_a_single_entry_is_identity() {
        let mut translator = fixture_translator();
        let options = japanese_options(&["jmdict"]);
        let result = translator
            .find_terms(FindTermsMode::Split, "食べた", &options)
            .unwrap();
        let entry = &result.dictionary_entries[0];
        let grouped = translator.create_grouped_dictionary_entry(&[entry.clone()], false);
        assert_eq!(grouped.headwords, entry.headwords);
        assert_eq!(grouped.definitions, entry.definitions);
        assert_eq!(grouped.inflection_hypotheses, entry.inflection_hypotheses);
        assert_eq!(grouped.score, entry.score);
        assert_eq!(
            grouped.source_term_exact_match_count,
            entry.source_term_exact_match_count
        );
    }

    #[test]
    fn get_term_frequencies_matches_readings() {
        let translator = fixture_translator();
        let results = translator
            .get_term_frequencies(
                &[
                    TermReadingItem {
                        term: "箸".to_string(),
                        reading: Some("はし".to_string()),
                    },
                    TermReadingItem {
                        term: "食べる".to_string(),
                        reading: None,
                    },
                ],
                &term_enabled_map(&["freqdict"]),
            )
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].term, "箸");
        assert!(results[0].has_reading);
        assert_eq!(results[0].frequency, 100);
        assert_eq!(results[1].term, "食べる");
        assert!(!results[1].has_reading);
        assert_eq!(results[1].frequency, 12);
    }

    #[test]
    fn kanji_lookup_builds_expanded_entries() {
        let mut translator = fixture_translator();
        let results = translator
            .find_kanji("食べる", &kanji_options(&["kanjidic"]))
            .unwrap();
        assert_eq!(results.len(), 1);
        let entry = &results[0];
        assert_eq!(entry.character, "食");
        assert_eq!(entry.onyomi, vec!["ショク", "ジキ"]);
        assert_eq!(entry.kunyomi, vec!["く.う", "た.べる"]);
        assert_eq!(entry.definitions, vec!["eat", "food"]);
        assert_eq!(entry.tags[0].name, "jouyou");
        assert_eq!(entry.tags[0].category, "frequent");
        let misc = entry.stats.get("misc").unwrap();
        assert_eq!(misc[0].name, "grade");
        assert_eq!(misc[0].value, "2");
        assert_eq!(misc[0].content, "school grade");
        assert_eq!(entry.frequencies.len(), 1);
        assert_eq!(entry.frequencies[0].frequency, 33);
    }

    #[test]
    fn tag_cache_survives_until_cleared() {
        let mut translator = fixture_translator();
        let options = japanese_options(&["jmdict"]);
        translator
            .find_terms(FindTermsMode::Group, "食べた", &options)
            .unwrap();
        assert!(!translator.tag_cache.is_empty());
        translator.clear_database_caches();
        assert!(translator.tag_cache.is_empty());
    }
}
