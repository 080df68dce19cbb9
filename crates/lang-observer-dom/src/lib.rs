#![doc = include_str!("../README.md")]

pub mod document;
pub mod memory;

pub use document::{
    AttributeMutation, ChangeCallback, ChangeRecord, DomDocument, DomElement, WatchId,
};
pub use memory::{MemoryDocument, MemoryElement};
