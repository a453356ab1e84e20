//! The parser VM for the pPEG parsing engine: a recursive interpreter over
//! `ppeg_core::Instr`, the extension registry and built-in extensions,
//! diagnostics, and the top-level `parse` entry point and its return
//! semantics.

pub mod diagnostics;
pub mod env;
pub mod error;
pub mod eval;
pub mod extensions;
pub mod infix;
pub mod parse;

pub use diagnostics::{Fault, TraceEvent, Tracer, format_fault_report, format_fell_short};
pub use env::Env;
pub use error::RuntimeError;
pub use eval::eval;
pub use extensions::{Extension, ExtensionRegistry};
pub use parse::{Options, ParseError, ParseFailure, TraceSetting, parse, parse_traced};
