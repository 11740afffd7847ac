//! `jiten_rs` is a multilingual pop-up dictionary lookup engine.
//!
//! Given a span of text scanned from a page, it finds the longest prefix
//! corresponding to a known headword, unwinding surface inflection back to
//! a lemma along the way, and assembles structured dictionary entries by
//! consulting every enabled dictionary at once.
//!
//! # Examples
//! ```no_run
//! use std::sync::Arc;
//! use jiten_rs::{
//!     FindTermsMode, FindTermsOptions, MemoryDictionaryDatabase, Translator,
//! };
//!
//! let db = Arc::new(MemoryDictionaryDatabase::new());
//! let mut translator = Translator::new(db);
//! let options = FindTermsOptions::default();
//! let result = translator.find_terms(FindTermsMode::Group, "食べた", &options)?;
//! for entry in &result.dictionary_entries {
//!     println!("{}", entry.headwords[0].term);
//! }
//! # Ok::<(), jiten_rs::errors::TranslatorError>(())
//! ```
//!
//! The database boundary is the [`DictionaryDatabase`] trait; dictionaries
//! are consumed in the term/kanji/meta/tag bank row format validated by
//! [`dictionary_data`].

pub mod dictionary;
pub mod dictionary_data;
pub mod dictionary_database;
pub mod errors;
pub mod language;
mod regex_util;
#[cfg(test)]
mod test_utils;
pub mod translation;
mod translation_internal;
mod translator;

pub use crate::dictionary::{
    KanjiDictionaryEntry, TermDefinition, TermDictionaryEntry, TermFrequency, TermHeadword,
    TermPronunciation,
};
pub use crate::dictionary_database::{DictionaryDatabase, MemoryDictionaryDatabase};
pub use crate::errors::TranslatorError;
pub use crate::translation::{FindKanjiOptions, FindTermsOptions};
pub use crate::translator::{FindTermsMode, FindTermsResult, TermReadingItem, Translator};
