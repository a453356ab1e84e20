//! Grammar-level errors: raised to the caller, never recovered
//! from inside a parse. Distinct from `ParseFailure`, which is returned as
//! a plain `["$error", report]` value rather than an `Err`.

/// Structural error in a grammar: something the compiler or the running VM
/// cannot recover from locally.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GrammarError {
    #[error("Undefined rule: {0}")]
    UndefinedRule(String),

    #[error("Duplicate rule name: {0}")]
    DuplicateRule(String),

    #[error("Missing extension: {0}")]
    MissingExtension(String),

    #[error("Recursion depth exceeded in rule {rule} (last frames: {frames:?})")]
    RecursionDepthExceeded { rule: String, frames: Vec<String> },

    #[error("Malformed grammar ptree: {0}")]
    MalformedPtree(String),

    #[error("_space_ rule is unconditionally recursive")]
    RecursiveSpaceRule,
}
