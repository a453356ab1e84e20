//! Core data structures for the pPEG parsing engine.
//!
//! This crate has no behavior of its own beyond construction and simple
//! accessors: the instruction model (`instr`), the parse-tree model
//! (`ptree`), the compiled grammar program (`program`), the rule-name
//! interner, the escape decoder, and the shared `GrammarError` type.
//! `ppeg-compiler` builds `Program`s; `ppeg-vm` interprets them.

pub mod error;
pub mod escape;
pub mod instr;
pub mod interner;
pub mod program;
pub mod ptree;

pub use error::GrammarError;
pub use escape::decode_escapes;
pub use instr::{CharRange, Guard, Instr, Sign};
pub use interner::{Interner, Symbol};
pub use program::Program;
pub use ptree::Node;
