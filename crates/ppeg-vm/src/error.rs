//! Hard abort conditions raised while running a compiled program.
//! Distinct from an ordinary parse failure: these never reach the
//! `["$error", report]` wire shape, they come back as `Err` from
//! `Parser::parse`.

use ppeg_core::GrammarError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    #[error("missing extension: {0}")]
    MissingExtension(String),
    #[error(transparent)]
    Grammar(#[from] GrammarError),
}
