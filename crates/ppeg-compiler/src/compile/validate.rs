//! Grammar-level structural validation beyond "undefined rule" and
//! "duplicate rule name": reject a `_space_` rule that can only ever call
//! itself.

use ppeg_core::instr::Instr;

/// `true` if `instr` cannot possibly match without first re-entering rule
/// `self_idx` — i.e. every path through it is a bare self-call.
pub fn is_bare_self_reference(instr: &Instr, self_idx: usize) -> bool {
    match instr {
        Instr::Id { idx, .. } => *idx == self_idx,
        Instr::Alt { children, .. } => {
            !children.is_empty() && children.iter().all(|c| is_bare_self_reference(c, self_idx))
        }
        Instr::Seq { children, .. } if children.len() == 1 => {
            is_bare_self_reference(&children[0], self_idx)
        }
        Instr::Rep { child, .. } => is_bare_self_reference(child, self_idx),
        Instr::Pre { child, .. } => is_bare_self_reference(child, self_idx),
        _ => false,
    }
}

#[cfg(test)]
mod validate_tests {
    use super::*;

    #[test]
    fn direct_self_call_is_recursive() {
        let instr = Instr::Id { idx: 3, name: dummy_symbol() };
        assert!(is_bare_self_reference(&instr, 3));
    }

    #[test]
    fn call_to_other_rule_is_not_recursive() {
        let instr = Instr::Id { idx: 1, name: dummy_symbol() };
        assert!(!is_bare_self_reference(&instr, 3));
    }

    #[test]
    fn alt_with_an_escape_hatch_is_not_recursive() {
        let instr = Instr::Alt {
            children: vec![
                Instr::Id { idx: 3, name: dummy_symbol() },
                Instr::Sq { icase: false, literal: " ".into() },
            ],
            guards: vec![None, None],
        };
        assert!(!is_bare_self_reference(&instr, 3));
    }

    fn dummy_symbol() -> ppeg_core::Symbol {
        let mut interner = ppeg_core::Interner::new();
        interner.intern("_space_")
    }
}
