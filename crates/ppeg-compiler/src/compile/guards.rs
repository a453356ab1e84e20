//! ALT first-codepoint guard computation.
//!
//! A guard lets the VM skip an alternative without attempting it when the
//! current input codepoint cannot possibly match. Only computed when an
//! alternative's first mandatory codepoint is statically knowable; `None`
//! is always a safe fallback, never a correctness bug, just a missed
//! optimization.

use ppeg_core::instr::{CharRange, Instr, Sign};
use ppeg_core::Symbol;

/// Guard resolution descends through at most this many `Id` hops before
/// giving up — a cyclic rule reference (`a = b`, `b = a`) would otherwise
/// recurse forever; `None` past the bound is always a safe fallback since
/// a guard is an optimization hint, never a correctness requirement.
const GUARD_RESOLVE_DEPTH: usize = 8;

pub fn first_char_guard(instr: &Instr) -> Option<char> {
    match instr {
        Instr::Sq { icase: false, literal } => literal.chars().next(),
        Instr::Dq { icase: false, literal } => match literal.chars().next() {
            Some(' ') | None => None,
            first => first,
        },
        Instr::Chs { neg: false, ranges, .. } => match ranges.as_slice() {
            [CharRange::Single(c)] => Some(*c),
            _ => None,
        },
        Instr::Seq { children, .. } => children.first().and_then(first_char_guard),
        Instr::Pre { sign: Sign::And, child } => first_char_guard(child),
        _ => None,
    }
}

/// Walk every `ALT` in `instr`, recomputing its guards with access to the
/// full rule list so `ID(idx, ...)` alternatives can be guarded by
/// descending into the referenced rule's own first-character shape. Called
/// once per top-level rule body after every rule in the grammar has been
/// emitted, against an immutable
/// snapshot of the rule list (mutating one rule's guards while reading
/// another's body needs the split).
pub fn refine_guards(instr: &mut Instr, rules: &[(Symbol, Instr)]) {
    match instr {
        Instr::Alt { children, guards } => {
            for (child, guard) in children.iter_mut().zip(guards.iter_mut()) {
                *guard = resolved_guard(child, rules, GUARD_RESOLVE_DEPTH);
                refine_guards(child, rules);
            }
        }
        Instr::Seq { children, .. } => {
            for child in children.iter_mut() {
                refine_guards(child, rules);
            }
        }
        Instr::Rep { child, .. } | Instr::Pre { child, .. } => refine_guards(child, rules),
        _ => {}
    }
}

fn resolved_guard(instr: &Instr, rules: &[(Symbol, Instr)], depth: usize) -> Option<char> {
    match instr {
        Instr::Id { idx, .. } => {
            if depth == 0 {
                return None;
            }
            rules
                .get(*idx)
                .and_then(|(_, inner)| resolved_guard(inner, rules, depth - 1))
        }
        Instr::Seq { children, .. } => children.first().and_then(|c| resolved_guard(c, rules, depth)),
        Instr::Pre { sign: Sign::And, child } => resolved_guard(child, rules, depth),
        other => first_char_guard(other),
    }
}

#[cfg(test)]
mod guard_tests {
    use super::*;

    #[test]
    fn literal_guard_is_first_char() {
        let instr = Instr::Sq {
            icase: false,
            literal: "abc".into(),
        };
        assert_eq!(first_char_guard(&instr), Some('a'));
    }

    #[test]
    fn icase_literal_has_no_guard() {
        let instr = Instr::Sq {
            icase: true,
            literal: "ABC".into(),
        };
        assert_eq!(first_char_guard(&instr), None);
    }

    #[test]
    fn single_char_class_is_guarded() {
        let instr = Instr::Chs {
            neg: false,
            min: 1,
            max: 1,
            ranges: vec![CharRange::Single('x')],
        };
        assert_eq!(first_char_guard(&instr), Some('x'));
    }

    #[test]
    fn multi_range_char_class_has_no_guard() {
        let instr = Instr::Chs {
            neg: false,
            min: 1,
            max: 1,
            ranges: vec![CharRange::Range('0', '9'), CharRange::Single('_')],
        };
        assert_eq!(first_char_guard(&instr), None);
    }

    #[test]
    fn dq_literal_guard_is_first_char() {
        let instr = Instr::Dq {
            icase: false,
            literal: "abc".into(),
        };
        assert_eq!(first_char_guard(&instr), Some('a'));
    }

    #[test]
    fn dq_literal_starting_with_space_has_no_guard() {
        let instr = Instr::Dq {
            icase: false,
            literal: " abc".into(),
        };
        assert_eq!(first_char_guard(&instr), None);
    }

    #[test]
    fn rule_call_has_no_guard() {
        let mut interner = ppeg_core::Interner::new();
        let instr = Instr::Id {
            idx: 0,
            name: interner.intern("x"),
        };
        assert_eq!(first_char_guard(&instr), None);
    }

    #[test]
    fn refine_guards_resolves_through_id_reference() {
        let mut interner = ppeg_core::Interner::new();
        let digit_sym = interner.intern("digit");
        let word_sym = interner.intern("word");
        let digit_rule = Instr::Chs {
            neg: false,
            min: 1,
            max: 1,
            ranges: vec![CharRange::Single('5')],
        };
        let mut alt = Instr::Alt {
            children: vec![
                Instr::Id { idx: 0, name: digit_sym },
                Instr::Sq { icase: false, literal: "hi".into() },
            ],
            guards: vec![None, None],
        };
        let rules = vec![(digit_sym, digit_rule), (word_sym, alt.clone())];
        refine_guards(&mut alt, &rules);
        match alt {
            Instr::Alt { guards, .. } => {
                assert_eq!(guards, vec![Some('5'), Some('h')]);
            }
            other => panic!("expected Alt, got {other:?}"),
        }
    }

    #[test]
    fn refine_guards_gives_up_past_the_depth_bound_on_a_cycle() {
        let mut interner = ppeg_core::Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let a_body = Instr::Id { idx: 1, name: b };
        let b_body = Instr::Id { idx: 0, name: a };
        let rules = vec![(a, a_body), (b, b_body)];
        // A cyclic pair of rule calls must never infinite-loop; the bounded
        // resolver just gives up with `None`.
        assert_eq!(resolved_guard(&rules[0].1, &rules, GUARD_RESOLVE_DEPTH), None);
    }
}
