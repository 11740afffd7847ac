use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::SchemaError;

/// One glossary element of a term bank row. Plain strings are by far the
/// most common shape; everything else is typed content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermGlossary {
    Text(String),
    Content(TermGlossaryContent),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TermGlossaryContent {
    Text { text: String },
    Image(TermGlossaryImage),
    StructuredContent { content: Value },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermGlossaryImage {
    pub path: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A frequency datum as it appears in meta banks: a bare number, a display
/// string, or a value with an explicit display form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenericFrequencyData {
    Number(i64),
    String(String),
    Object {
        value: i64,
        #[serde(rename = "displayValue", default)]
        display_value: Option<String>,
    },
}

/// A frequency value normalized for display and sorting.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyInfo {
    pub frequency: i64,
    pub display_value: Option<String>,
    pub display_value_parsed: bool,
}

impl GenericFrequencyData {
    /// Normalizes the union shape. Strings are parsed to numbers where
    /// possible and kept as display values; unparseable strings sort last.
    pub fn to_frequency_info(&self) -> FrequencyInfo {
        match self {
            Self::Number(value) => FrequencyInfo {
                frequency: *value,
                display_value: None,
                display_value_parsed: false,
            },
            Self::String(text) => FrequencyInfo {
                frequency: text.parse::<i64>().unwrap_or(i64::MAX),
                display_value: Some(text.clone()),
                display_value_parsed: true,
            },
            Self::Object {
                value,
                display_value,
            } => FrequencyInfo {
                frequency: *value,
                display_value: display_value.clone(),
                display_value_parsed: false,
            },
        }
    }
}

/// A term meta frequency datum, optionally scoped to one reading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermMetaFrequency {
    WithReading {
        reading: String,
        frequency: GenericFrequencyData,
    },
    Generic(GenericFrequencyData),
}

/// Positions in pitch data may be a single number or a list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VecNumOrNum {
    Vec(Vec<u8>),
    Num(u8),
}

impl VecNumOrNum {
    pub fn to_vec(&self) -> Vec<u8> {
        match self {
            Self::Vec(values) => values.clone(),
            Self::Num(value) => vec![*value],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pitch {
    /// Mora position of the downstep.
    pub position: i64,
    #[serde(default)]
    pub nasal: Option<VecNumOrNum>,
    #[serde(default)]
    pub devoice: Option<VecNumOrNum>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermMetaPitchData {
    pub reading: String,
    pub pitches: Vec<Pitch>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermMetaTranscription {
    pub ipa: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermMetaPhoneticData {
    pub reading: String,
    pub transcriptions: Vec<TermMetaTranscription>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermMetaMode {
    Freq,
    Pitch,
    Ipa,
}

/// The data payload of a term meta row, discriminated by its mode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermMetaData {
    Pitch(TermMetaPitchData),
    Phonetic(TermMetaPhoneticData),
    Frequency(TermMetaFrequency),
}

// Bank rows. Every `from_value` below is the schema gate: rows that fail
// here never reach the engine.

/// A parsed term bank row:
/// `[term, reading, definition_tags, rules, score, glossary, sequence,
///   term_tags, form_of?, inflection_hypotheses?]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermBankEntry {
    pub term: String,
    pub reading: String,
    pub definition_tags: Vec<String>,
    /// Rule identifiers for the word classes of the term.
    pub rules: Vec<String>,
    pub score: i64,
    pub glossary: Vec<TermGlossary>,
    pub sequence: i64,
    pub term_tags: Vec<String>,
    /// The lemma this row is a dictionary-declared inflection of.
    pub form_of: Option<String>,
    /// Dictionary-declared inflection chains leading from `form_of` to this
    /// surface form.
    pub inflection_hypotheses: Option<Vec<Vec<String>>>,
}

impl TermBankEntry {
    pub fn from_value(row: &Value) -> Result<Self, SchemaError> {
        let elements = row.as_array().ok_or(SchemaError::ElementType {
            index: 0,
            expected: "array row",
        })?;
        if elements.len() < 8 {
            return Err(SchemaError::TermRowArity(elements.len()));
        }
        let term = string_at(elements, 0)?;
        let reading = string_at(elements, 1)?;
        let definition_tags = tag_list_at(elements, 2)?;
        let rules = tag_list_at(elements, 3)?;
        let score = integer_at(elements, 4)?;
        let glossary: Vec<TermGlossary> = serde_json::from_value(elements[5].clone())?;
        let sequence = integer_at(elements, 6)?;
        let term_tags = tag_list_at(elements, 7)?;
        let form_of = match elements.get(8) {
            None | Some(Value::Null) => None,
            Some(Value::String(lemma)) => Some(lemma.clone()),
            Some(_) => {
                return Err(SchemaError::ElementType {
                    index: 8,
                    expected: "string or null",
                })
            }
        };
        let inflection_hypotheses = match elements.get(9) {
            None | Some(Value::Null) => None,
            Some(value) => Some(serde_json::from_value(value.clone())?),
        };
        Ok(Self {
            term,
            reading,
            definition_tags,
            rules,
            score,
            glossary,
            sequence,
            term_tags,
            form_of,
            inflection_hypotheses,
        })
    }
}

/// A parsed term meta bank row: `[expression, mode, data]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermMetaBankEntry {
    pub expression: String,
    pub mode: TermMetaMode,
    pub data: TermMetaData,
}

impl TermMetaBankEntry {
    pub fn from_value(row: &Value) -> Result<Self, SchemaError> {
        let elements = row.as_array().ok_or(SchemaError::ElementType {
            index: 0,
            expected: "array row",
        })?;
        if elements.len() < 3 {
            return Err(SchemaError::MetaRow(format!(
                "expected 3 elements, got {}",
                elements.len()
            )));
        }
        let expression = string_at(elements, 0)?;
        let mode_name = string_at(elements, 1)?;
        let mode = match mode_name.as_str() {
            "freq" => TermMetaMode::Freq,
            "pitch" => TermMetaMode::Pitch,
            "ipa" => TermMetaMode::Ipa,
            other => return Err(SchemaError::UnknownMetaMode(other.to_string())),
        };
        let data = match mode {
            TermMetaMode::Freq => {
                TermMetaData::Frequency(serde_json::from_value(elements[2].clone())?)
            }
            TermMetaMode::Pitch => {
                TermMetaData::Pitch(serde_json::from_value(elements[2].clone())?)
            }
            TermMetaMode::Ipa => {
                TermMetaData::Phonetic(serde_json::from_value(elements[2].clone())?)
            }
        };
        Ok(Self {
            expression,
            mode,
            data,
        })
    }
}

/// A parsed kanji bank row:
/// `[character, onyomi, kunyomi, tags, meanings, stats?]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KanjiBankEntry {
    pub character: String,
    pub onyomi: Vec<String>,
    pub kunyomi: Vec<String>,
    pub tags: Vec<String>,
    pub meanings: Vec<String>,
    pub stats: IndexMap<String, String>,
}

impl KanjiBankEntry {
    pub fn from_value(row: &Value) -> Result<Self, SchemaError> {
        let elements = row.as_array().ok_or(SchemaError::ElementType {
            index: 0,
            expected: "array row",
        })?;
        if elements.len() < 5 {
            return Err(SchemaError::KanjiRowArity(elements.len()));
        }
        let character = string_at(elements, 0)?;
        let onyomi = tag_list_at(elements, 1)?;
        let kunyomi = tag_list_at(elements, 2)?;
        let tags = tag_list_at(elements, 3)?;
        let meanings: Vec<String> = serde_json::from_value(elements[4].clone())?;
        let stats = match elements.get(5) {
            None | Some(Value::Null) => IndexMap::new(),
            Some(value) => {
                let raw: IndexMap<String, Value> = serde_json::from_value(value.clone())?;
                raw.into_iter()
                    .map(|(name, value)| {
                        let text = match value {
                            Value::String(text) => text,
                            other => other.to_string(),
                        };
                        (name, text)
                    })
                    .collect()
            }
        };
        Ok(Self {
            character,
            onyomi,
            kunyomi,
            tags,
            meanings,
            stats,
        })
    }
}

/// A parsed kanji meta bank row: `[character, "freq", data]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KanjiMetaBankEntry {
    pub character: String,
    pub data: GenericFrequencyData,
}

impl KanjiMetaBankEntry {
    pub fn from_value(row: &Value) -> Result<Self, SchemaError> {
        let elements = row.as_array().ok_or(SchemaError::ElementType {
            index: 0,
            expected: "array row",
        })?;
        if elements.len() < 3 {
            return Err(SchemaError::MetaRow(format!(
                "expected 3 elements, got {}",
                elements.len()
            )));
        }
        let character = string_at(elements, 0)?;
        let mode = string_at(elements, 1)?;
        if mode != "freq" {
            return Err(SchemaError::UnknownMetaMode(mode));
        }
        let data = serde_json::from_value(elements[2].clone())?;
        Ok(Self { character, data })
    }
}

/// A parsed tag bank row: `[name, category, order, notes, score]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagBankEntry {
    pub name: String,
    pub category: String,
    pub order: i64,
    pub notes: String,
    pub score: i64,
}

impl TagBankEntry {
    pub fn from_value(row: &Value) -> Result<Self, SchemaError> {
        let elements = row.as_array().ok_or(SchemaError::ElementType {
            index: 0,
            expected: "array row",
        })?;
        if elements.len() < 5 {
            return Err(SchemaError::MetaRow(format!(
                "tag bank row expected 5 elements, got {}",
                elements.len()
            )));
        }
        Ok(Self {
            name: string_at(elements, 0)?,
            category: string_at(elements, 1)?,
            order: integer_at(elements, 2)?,
            notes: string_at(elements, 3)?,
            score: integer_at(elements, 4)?,
        })
    }
}

fn string_at(elements: &[Value], index: usize) -> Result<String, SchemaError> {
    elements
        .get(index)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(SchemaError::ElementType {
            index,
            expected: "string",
        })
}

fn integer_at(elements: &[Value], index: usize) -> Result<i64, SchemaError> {
    elements
        .get(index)
        .and_then(Value::as_i64)
        .ok_or(SchemaError::ElementType {
            index,
            expected: "integer",
        })
}

/// Space-separated tag identifiers; `null` and `""` both mean "no tags".
fn tag_list_at(elements: &[Value], index: usize) -> Result<Vec<String>, SchemaError> {
    match elements.get(index) {
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(Value::String(text)) => Ok(text.split_whitespace().map(str::to_string).collect()),
        Some(_) => Err(SchemaError::ElementType {
            index,
            expected: "space-separated string or null",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn term_row_parses() {
        let row = json!(["食べる", "たべる", "vt", "v1", 10, ["to eat"], 101, "common"]);
        let entry = TermBankEntry::from_value(&row).unwrap();
        assert_eq!(entry.term, "食べる");
        assert_eq!(entry.rules, vec!["v1"]);
        assert_eq!(entry.definition_tags, vec!["vt"]);
        assert_eq!(entry.glossary, vec![TermGlossary::Text("to eat".into())]);
        assert_eq!(entry.sequence, 101);
        assert!(entry.form_of.is_none());
    }

    #[test]
    fn term_row_with_form_of() {
        let row = json!([
            "食べた", "たべた", "non-lemma", "", 0, ["past of 食べる"], -1, "",
            "食べる", [["past"]]
        ]);
        let entry = TermBankEntry::from_value(&row).unwrap();
        assert_eq!(entry.form_of.as_deref(), Some("食べる"));
        assert_eq!(
            entry.inflection_hypotheses,
            Some(vec![vec!["past".to_string()]])
        );
    }

    #[test]
    fn short_term_row_is_rejected() {
        let row = json!(["a", "b", null, null, 0, []]);
        assert!(matches!(
            TermBankEntry::from_value(&row),
            Err(SchemaError::TermRowArity(6))
        ));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let row = json!(["a", "b", null, null, "zero", [], 0, null]);
        assert!(matches!(
            TermBankEntry::from_value(&row),
            Err(SchemaError::ElementType { index: 4, .. })
        ));
    }

    #[test]
    fn meta_freq_row_parses() {
        let row = json!(["政治", "freq", {"reading": "せいじ", "frequency": 531}]);
        let entry = TermMetaBankEntry::from_value(&row).unwrap();
        assert_eq!(entry.mode, TermMetaMode::Freq);
        match entry.data {
            TermMetaData::Frequency(TermMetaFrequency::WithReading { reading, frequency }) => {
                assert_eq!(reading, "せいじ");
                assert_eq!(frequency.to_frequency_info().frequency, 531);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn meta_pitch_row_parses() {
        let row = json!([
            "語彙", "pitch",
            {"reading": "ごい", "pitches": [{"position": 1, "nasal": 3, "tags": ["n"]}]}
        ]);
        let entry = TermMetaBankEntry::from_value(&row).unwrap();
        match entry.data {
            TermMetaData::Pitch(pitch) => {
                assert_eq!(pitch.pitches[0].position, 1);
                assert_eq!(pitch.pitches[0].nasal.as_ref().unwrap().to_vec(), vec![3]);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn frequency_string_parsing() {
        let info = GenericFrequencyData::String("1000".into()).to_frequency_info();
        assert_eq!(info.frequency, 1000);
        assert!(info.display_value_parsed);
        let info = GenericFrequencyData::String("very common".into()).to_frequency_info();
        assert_eq!(info.frequency, i64::MAX);
        assert_eq!(info.display_value.as_deref(), Some("very common"));
    }

    #[test]
    fn unknown_meta_mode_is_rejected() {
        let row = json!(["語彙", "accent", {}]);
        assert!(matches!(
            TermMetaBankEntry::from_value(&row),
            Err(SchemaError::UnknownMetaMode(_))
        ));
    }
}
