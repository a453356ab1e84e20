//! The compiled instruction model: a tagged-variant tree of machine
//! instructions that the VM (`ppeg-vm`) interprets recursively.
//!
//! Each instruction owns its children directly (`Box`/`Vec`) — a recursive
//! interpreter over instruction code rather than a flat, address-addressed
//! bytecode, so there is no jump table to maintain and Rust's own call
//! stack is the control stack.

use crate::interner::Symbol;

/// Prefix-operator sign for lookahead (`PRE`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
    /// `&x` — positive lookahead.
    And,
    /// `!x` — negative lookahead.
    Not,
    /// `~x` — "not one of, but consume one codepoint".
    Tilde,
}

/// A single element of a character set: a singleton codepoint or an
/// inclusive `a-b` range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharRange {
    Single(char),
    Range(char, char),
}

impl CharRange {
    pub fn contains(&self, c: char) -> bool {
        match self {
            CharRange::Single(s) => *s == c,
            CharRange::Range(lo, hi) => *lo <= c && c <= *hi,
        }
    }
}

/// A first-codepoint predicate attached to an `ALT` alternative, used to
/// cheaply skip alternatives that cannot possibly match the current input.
pub type Guard = Option<char>;

/// A compiled grammar expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Instr {
    /// Invoke rule `idx` (in the owning `Program`), labelling the product
    /// with `name`.
    Id { idx: usize, name: Symbol },
    /// Ordered choice. `guards[i]` (if present) gates `children[i]`.
    Alt {
        children: Vec<Instr>,
        guards: Vec<Guard>,
    },
    /// Match `children` in sequence, `min..max` times (`max == 0` means
    /// unbounded).
    Seq {
        min: u32,
        max: u32,
        children: Vec<Instr>,
    },
    /// Repeat a single expression `min..max` times (`max == 0` unbounded).
    Rep {
        min: u32,
        max: u32,
        child: Box<Instr>,
    },
    /// Lookahead prefix.
    Pre { sign: Sign, child: Box<Instr> },
    /// Exact literal match; no implicit whitespace.
    Sq { icase: bool, literal: String },
    /// Literal match with implicit whitespace at each space codepoint.
    Dq { icase: bool, literal: String },
    /// Character-set match, `min..max` codepoints, `neg` flips membership.
    Chs {
        neg: bool,
        min: u32,
        max: u32,
        ranges: Vec<CharRange>,
    },
    /// Host extension invocation; `spec` is the raw `<...>` payload.
    Extn { spec: String },
}

impl Instr {
    /// `true` if this is a rule call — used by the ALT-guard computation to
    /// decide whether a guard can be derived at all.
    pub fn is_id(&self) -> bool {
        matches!(self, Instr::Id { .. })
    }
}

#[cfg(test)]
mod instr_tests {
    use super::*;

    #[test]
    fn char_range_contains() {
        assert!(CharRange::Range('0', '9').contains('5'));
        assert!(!CharRange::Range('0', '9').contains('a'));
        assert!(CharRange::Single('x').contains('x'));
        assert!(!CharRange::Single('x').contains('y'));
    }
}
