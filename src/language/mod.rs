pub mod deinflector;
pub mod ja;
pub mod text_processors;
pub mod text_source_map;

use std::sync::LazyLock;

use indexmap::IndexMap;

use crate::language::deinflector::DeinflectionRule;
use crate::language::ja::text_preprocessors;
use crate::language::text_source_map::TextSourceMap;

/// A text transformation produces an alternate spelling of the input text to
/// search for, recording every length change in the source map so results
/// can report the exact original slice.
#[derive(Clone, Copy)]
pub struct TextTransformation {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub apply: fn(&str, &mut TextSourceMap) -> String,
}

impl std::fmt::Debug for TextTransformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextTransformation")
            .field("id", &self.id)
            .finish()
    }
}

/// Language-specific normalization which shortens repeated emphatic
/// character runs; the flag requests the aggressive variant.
pub type EmphaticCollapser = fn(&str, bool, &mut TextSourceMap) -> String;

/// Everything the engine needs to know about one language.
pub struct LanguageDescriptor {
    pub iso: &'static str,
    pub name: &'static str,
    pub example_text: &'static str,
    /// Registered transformations, in the order their variant axes nest.
    pub text_transformations: &'static [TextTransformation],
    pub emphatic_collapser: Option<EmphaticCollapser>,
    pub deinflection_rules: &'static [DeinflectionRule],
}

const JA_TEXT_TRANSFORMATIONS: &[TextTransformation] = &[
    text_preprocessors::CONVERT_HALF_WIDTH_CHARACTERS,
    text_preprocessors::ALPHABETIC_TO_HIRAGANA,
    text_preprocessors::NORMALIZE_COMBINING_CHARACTERS,
    text_preprocessors::CONVERT_FULLWIDTH_CHARACTERS,
    text_preprocessors::CONVERT_HIRAGANA_TO_KATAKANA,
    text_preprocessors::CONVERT_KATAKANA_TO_HIRAGANA,
];

const EN_TEXT_TRANSFORMATIONS: &[TextTransformation] = &[
    text_processors::DECAPITALIZE,
    text_processors::CAPITALIZE_FIRST_LETTER,
];

const ES_TEXT_TRANSFORMATIONS: &[TextTransformation] = &[
    text_processors::DECAPITALIZE,
    text_processors::CAPITALIZE_FIRST_LETTER,
    text_processors::REMOVE_ALPHABETIC_DIACRITICS,
];

static LANGUAGE_DESCRIPTORS: LazyLock<IndexMap<&'static str, LanguageDescriptor>> =
    LazyLock::new(|| {
        let descriptors = [
            LanguageDescriptor {
                iso: "ja",
                name: "Japanese",
                example_text: "読め",
                text_transformations: JA_TEXT_TRANSFORMATIONS,
                emphatic_collapser: Some(ja::japanese::collapse_emphatic_sequences),
                deinflection_rules: ja::deinflect::JAPANESE_DEINFLECTION_RULES.as_slice(),
            },
            LanguageDescriptor {
                iso: "en",
                name: "English",
                example_text: "read",
                text_transformations: EN_TEXT_TRANSFORMATIONS,
                emphatic_collapser: None,
                deinflection_rules: &[],
            },
            LanguageDescriptor {
                iso: "es",
                name: "Spanish",
                example_text: "acabar de",
                text_transformations: ES_TEXT_TRANSFORMATIONS,
                emphatic_collapser: None,
                deinflection_rules: &[],
            },
        ];
        descriptors.into_iter().map(|d| (d.iso, d)).collect()
    });

pub fn get_language_descriptor(iso: &str) -> Option<&'static LanguageDescriptor> {
    LANGUAGE_DESCRIPTORS.get(iso)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_languages() {
        assert!(get_language_descriptor("ja").is_some());
        assert!(get_language_descriptor("en").is_some());
        assert!(get_language_descriptor("es").is_some());
        assert!(get_language_descriptor("xx").is_none());
    }

    #[test]
    fn transformation_ids_are_unique_per_language() {
        for descriptor in super::LANGUAGE_DESCRIPTORS.values() {
            let mut ids: Vec<_> = descriptor
                .text_transformations
                .iter()
                .map(|t| t.id)
                .collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), descriptor.text_transformations.len());
        }
    }
}
