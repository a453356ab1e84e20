//! The compiled grammar program: an ordered list of rules, a
//! name→index table, a designated start rule, and an optional `_space_`
//! override.

use indexmap::IndexMap;

use crate::instr::Instr;
use crate::interner::{Interner, Symbol};

/// A compiled grammar, ready to drive the VM against any number of inputs.
///
/// Immutable after construction and safe to share read-only across
/// concurrently running parses.
#[derive(Debug, Clone)]
pub struct Program {
    interner: Interner,
    rules: Vec<(Symbol, Instr)>,
    names: IndexMap<Symbol, usize>,
    start: usize,
    space: Option<usize>,
}

impl Program {
    /// Build a program from an ordered rule list. `rules[0]` becomes the
    /// default start rule; a `_space_` rule, if present among them, is
    /// detected automatically and wired up as `space()`.
    pub fn new(interner: Interner, rules: Vec<(Symbol, Instr)>) -> Self {
        let mut names = IndexMap::new();
        for (i, (sym, _)) in rules.iter().enumerate() {
            names.insert(*sym, i);
        }
        let space = interner
            .get("_space_")
            .and_then(|sym| names.get(&sym).copied());

        Program {
            interner,
            rules,
            names,
            start: 0,
            space,
        }
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn rules(&self) -> &[(Symbol, Instr)] {
        &self.rules
    }

    pub fn rule_instr(&self, idx: usize) -> &Instr {
        &self.rules[idx].1
    }

    pub fn rule_name(&self, idx: usize) -> &str {
        self.interner.resolve(self.rules[idx].0)
    }

    pub fn names(&self) -> &IndexMap<Symbol, usize> {
        &self.names
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.interner.get(name).and_then(|sym| self.names.get(&sym).copied())
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Override the start rule with a different rule's index.
    pub fn set_start(&mut self, idx: usize) {
        self.start = idx;
    }

    /// The `_space_` rule index, if the grammar defines one.
    pub fn space(&self) -> Option<usize> {
        self.space
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
