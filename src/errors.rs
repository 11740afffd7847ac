use thiserror::Error;

/// Failures surfaced by a [`crate::dictionary_database::DictionaryDatabase`]
/// implementation. The engine never retries; a failed bulk query aborts the
/// whole lookup request.
#[derive(Error, Debug)]
pub enum DictionaryDatabaseError {
    #[error("storage err: {0}")]
    Storage(String),
    #[error("query err: {0}")]
    Query(String),
}

/// A malformed dictionary bank row, rejected before it enters the engine.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("term bank row must have at least 8 elements, got {0}")]
    TermRowArity(usize),
    #[error("kanji bank row must have at least 6 elements, got {0}")]
    KanjiRowArity(usize),
    #[error("expected {expected} at element {index}")]
    ElementType {
        index: usize,
        expected: &'static str,
    },
    #[error("unknown meta mode: {0}")]
    UnknownMetaMode(String),
    #[error("meta row: {0}")]
    MetaRow(String),
    #[error("json err: {0}")]
    Json(#[from] serde_json::Error),
}

/// All `jiten_rs` lookup error paths.
///
/// `MissingMainDictionary` and `UnsupportedLanguage` are programming errors:
/// the engine assumes the caller validated its options.
#[derive(Error, Debug)]
pub enum TranslatorError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("merge mode requires options.main_dictionary")]
    MissingMainDictionary,
    #[error("db err: {0}")]
    Database(#[from] DictionaryDatabaseError),
}
