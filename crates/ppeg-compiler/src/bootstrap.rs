//! The hard-coded instruction program for the pPEG grammar itself.
//!
//! This is the one part of the engine that is *not* produced by the
//! compiler: compiling a grammar requires parsing its text, and parsing
//! requires a compiled program, so the grammar-of-grammars has to be
//! written directly as an `Instr` tree rather than bootstrapped from its
//! own surface syntax. `ppeg::compile` runs user grammar text through this
//! program to get a grammar ptree, then hands that ptree to the ordinary
//! compiler (`crate::compile`) to get a fresh `Program`.
//!
//! Ptree shape produced by this grammar, which `crate::compile` pattern
//! matches on by rule name:
//!   - `Peg`  — top-level branch, one `rule` child per rule definition
//!   - `rule` — branch `[id, <expr>]`
//!   - `id`   — leaf, a bare rule reference or rule name
//!   - `alt`  — branch of 2+ `seq`-shaped children (ordered choice); elided
//!     to its single child when there is only one alternative
//!   - `seq`  — branch of 2+ sequenced children; elided likewise
//!   - `rep`  — branch `[<expr>, sfx]`; elided (no quantifier) when absent
//!   - `pre`  — branch `[pfx, <expr>]`; elided (no prefix) when absent
//!   - `sq` / `dq` — leaf, raw `'...'`/`"..."` text including quotes and an
//!     optional trailing `i`
//!   - `chs`  — leaf, raw `[...]` text including brackets
//!   - `extn` — leaf, raw `<...>` text including angle brackets
//!
//! A handful of helper rules exist purely to parse tokens or skip
//! whitespace (`pfx`, `sfx`, `call`, `group`, `term`, `_`); `term` and
//! `group` always elide down to one of the shapes above, and `_` is
//! underscore-prefixed so it never appears in output.

use ppeg_core::instr::{CharRange, Instr, Sign};
use ppeg_core::{Interner, Program, Symbol};

const RULE_NAMES: &[&str] = &[
    "Peg", "rule", "alt", "seq", "rep", "pre", "term", "call", "id", "pfx", "sfx", "sq", "dq",
    "chs", "group", "extn", "_",
];

const PEG: usize = 0;
const RULE: usize = 1;
const ALT: usize = 2;
const SEQ: usize = 3;
const REP: usize = 4;
const PRE: usize = 5;
const TERM: usize = 6;
const CALL: usize = 7;
const ID: usize = 8;
const PFX: usize = 9;
const SFX: usize = 10;
const SQ: usize = 11;
const DQ: usize = 12;
const CHS: usize = 13;
const GROUP: usize = 14;
const EXTN: usize = 15;
const WS: usize = 16;

fn id_ref(idx: usize) -> Instr {
    Instr::Id {
        idx,
        name: Symbol::from_raw(idx as u32),
    }
}

fn sq(literal: &str) -> Instr {
    Instr::Sq {
        icase: false,
        literal: literal.to_string(),
    }
}

fn seq(children: Vec<Instr>) -> Instr {
    Instr::Seq {
        min: 1,
        max: 1,
        children,
    }
}

fn rep(min: u32, max: u32, child: Instr) -> Instr {
    Instr::Rep {
        min,
        max,
        child: Box::new(child),
    }
}

fn alt(children: Vec<Instr>) -> Instr {
    let guards = vec![None; children.len()];
    Instr::Alt { children, guards }
}

fn chs(neg: bool, min: u32, max: u32, ranges: Vec<CharRange>) -> Instr {
    Instr::Chs {
        neg,
        min,
        max,
        ranges,
    }
}

fn any_char() -> CharRange {
    CharRange::Range('\u{0}', char::MAX)
}

/// One "escape pair, or any char but the delimiter" unit, used to build the
/// body of `sq`/`dq`/`chs` without a dedicated named sub-rule: `Rep`'s
/// child need not be an `Id`.
fn quoted_body(delim: char) -> Instr {
    rep(
        0,
        0,
        alt(vec![
            seq(vec![sq("\\"), chs(false, 1, 1, vec![any_char()])]),
            chs(true, 1, 1, vec![CharRange::Single(delim)]),
        ]),
    )
}

/// Build the bootstrap grammar program for the pPEG grammar language.
pub fn bootstrap_program() -> Program {
    let mut interner = Interner::new();
    let symbols: Vec<Symbol> = RULE_NAMES.iter().map(|n| interner.intern(n)).collect();

    let ws_chars = chs(
        false,
        1,
        1,
        vec![
            CharRange::Single(' '),
            CharRange::Single('\t'),
            CharRange::Single('\n'),
            CharRange::Single('\r'),
        ],
    );
    let comment = seq(vec![sq("#"), chs(true, 0, 0, vec![CharRange::Single('\n')])]);
    let ws_body = rep(0, 0, alt(vec![ws_chars, comment]));

    let id_body = seq(vec![
        chs(
            false,
            1,
            1,
            vec![
                CharRange::Range('a', 'z'),
                CharRange::Range('A', 'Z'),
                CharRange::Single('_'),
            ],
        ),
        chs(
            false,
            0,
            0,
            vec![
                CharRange::Range('a', 'z'),
                CharRange::Range('A', 'Z'),
                CharRange::Range('0', '9'),
                CharRange::Single('_'),
            ],
        ),
    ]);

    let pfx_body = chs(
        false,
        1,
        1,
        vec![
            CharRange::Single('&'),
            CharRange::Single('!'),
            CharRange::Single('~'),
        ],
    );

    let digit = CharRange::Range('0', '9');
    let sfx_body = alt(vec![
        chs(false, 1, 1, vec![CharRange::Single('+'), CharRange::Single('?')]),
        seq(vec![
            sq("*"),
            chs(false, 0, 0, vec![digit]),
            rep(
                0,
                1,
                seq(vec![sq(".."), chs(false, 0, 0, vec![digit])]),
            ),
        ]),
    ]);

    let sq_body = seq(vec![
        sq("'"),
        quoted_body('\''),
        sq("'"),
        rep(0, 1, sq("i")),
    ]);

    let dq_body = seq(vec![
        sq("\""),
        quoted_body('"'),
        sq("\""),
        rep(0, 1, sq("i")),
    ]);

    let chs_body = seq(vec![sq("["), quoted_body(']'), sq("]")]);

    let extn_body = seq(vec![
        sq("<"),
        chs(true, 0, 0, vec![CharRange::Single('>')]),
        sq(">"),
    ]);

    let call_body = seq(vec![
        id_ref(ID),
        Instr::Pre {
            sign: Sign::Not,
            child: Box::new(sq("=")),
        },
    ]);

    let term_body = alt(vec![
        id_ref(CALL),
        id_ref(SQ),
        id_ref(DQ),
        id_ref(CHS),
        id_ref(GROUP),
        id_ref(EXTN),
    ]);

    let group_body = seq(vec![sq("("), id_ref(WS), id_ref(ALT), sq(")")]);

    let pre_body = seq(vec![
        rep(0, 1, id_ref(PFX)),
        id_ref(WS),
        id_ref(TERM),
    ]);

    let rep_body = seq(vec![
        id_ref(PRE),
        rep(0, 1, id_ref(SFX)),
        id_ref(WS),
    ]);

    let seq_body = rep(1, 0, id_ref(REP));

    let alt_body = seq(vec![
        id_ref(SEQ),
        rep(
            0,
            0,
            seq(vec![sq("/"), id_ref(WS), id_ref(SEQ)]),
        ),
    ]);

    let rule_body = seq(vec![
        id_ref(ID),
        id_ref(WS),
        sq("="),
        id_ref(WS),
        id_ref(ALT),
        id_ref(WS),
    ]);

    let peg_body = seq(vec![id_ref(WS), rep(1, 0, id_ref(RULE))]);

    let bodies = vec![
        peg_body, rule_body, alt_body, seq_body, rep_body, pre_body, term_body, call_body,
        id_body, pfx_body, sfx_body, sq_body, dq_body, chs_body, group_body, extn_body, ws_body,
    ];

    let rules: Vec<(Symbol, Instr)> = symbols.into_iter().zip(bodies).collect();
    Program::new(interner, rules)
}

#[cfg(test)]
mod bootstrap_tests {
    use super::*;

    #[test]
    fn builds_seventeen_rules_with_peg_first() {
        let program = bootstrap_program();
        assert_eq!(program.len(), RULE_NAMES.len());
        assert_eq!(program.start(), 0);
        assert_eq!(program.rule_name(program.start()), "Peg");
    }

    #[test]
    fn every_rule_name_is_registered() {
        let program = bootstrap_program();
        for name in RULE_NAMES {
            assert!(program.index_of(name).is_some(), "missing rule {name}");
        }
    }
}
