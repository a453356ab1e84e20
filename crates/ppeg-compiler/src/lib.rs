//! Grammar compiler and bootstrap program for the pPEG parsing engine.
//!
//! [`bootstrap::bootstrap_program`] is the hard-coded `Program` that parses
//! pPEG grammar source text into a grammar ptree; [`compile::compile`] turns
//! that ptree into a fresh `Program` for the grammar it describes.
//! [`pretty`] renders instructions and whole programs back to surface
//! syntax, used both for fault reports and for grammar inspection.

pub mod bootstrap;
pub mod compile;
pub mod pretty;

pub use bootstrap::bootstrap_program;
pub use compile::compile;
