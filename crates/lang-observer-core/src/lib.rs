#![doc = include_str!("../README.md")]

pub mod dictionary;
pub mod store;

pub use dictionary::{Dictionary, DictionaryError, Language, TranslationValue};
pub use store::TranslationStore;
