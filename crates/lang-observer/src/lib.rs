#![doc = include_str!("../README.md")]

mod apply;
mod config;
mod observer;

pub use config::ObserverConfig;
pub use observer::{InitOptions, LanguageObserver};

pub use lang_observer_core::{
    Dictionary, DictionaryError, Language, TranslationStore, TranslationValue,
};

/// The document contract the engine runs against.
pub use lang_observer_dom as dom;
