//! Expected-expression rendering and whole-program dumping.
//!
//! `render` turns a single `Instr` back into pPEG surface syntax for fault
//! reports ("expected: [0-9]*2"); `dump` renders every rule of a `Program`,
//! one `name = body` line each, for inspecting a compiled grammar. A plain
//! function rather than a `Display` impl: `Program` lives in `ppeg-core`,
//! which can't depend back on this crate's renderer, and `ppeg-compiler`
//! can't implement a foreign trait for a foreign type.

use ppeg_core::instr::{CharRange, Sign};
use ppeg_core::{Instr, Program};

pub fn dump(program: &Program) -> String {
    let mut out = String::new();
    for (i, _) in program.rules().iter().enumerate() {
        out.push_str(program.rule_name(i));
        out.push_str(" = ");
        out.push_str(&render(program.rule_instr(i), program));
        out.push('\n');
    }
    out
}

pub fn render(instr: &Instr, program: &Program) -> String {
    match instr {
        Instr::Id { idx, .. } => program.rule_name(*idx).to_string(),
        Instr::Sq { icase, literal } => format!(
            "'{}'{}",
            display_str(literal),
            if *icase { "i" } else { "" }
        ),
        Instr::Dq { icase, literal } => format!(
            "\"{}\"{}",
            display_str(literal),
            if *icase { "i" } else { "" }
        ),
        Instr::Chs { neg, min, max, ranges } => {
            let body = format!(
                "[{}{}]",
                if *neg { "^" } else { "" },
                ranges.iter().map(render_range).collect::<String>()
            );
            if *min == 1 && *max == 1 {
                body
            } else {
                format!("{body}{}", suffix_str(*min, *max))
            }
        }
        Instr::Extn { spec } => format!("<{spec}>"),
        Instr::Pre { sign, child } => format!("{}{}", sign_char(*sign), render_atom(child, program)),
        Instr::Rep { min, max, child } => format!("{}{}", render_atom(child, program), suffix_str(*min, *max)),
        Instr::Seq { children, .. } => children
            .iter()
            .map(|c| render_atom(c, program))
            .collect::<Vec<_>>()
            .join(" "),
        Instr::Alt { children, .. } => format!(
            "( {} )",
            children.iter().map(|c| render(c, program)).collect::<Vec<_>>().join(" / ")
        ),
    }
}

fn render_atom(instr: &Instr, program: &Program) -> String {
    match instr {
        Instr::Alt { .. } => format!("({})", render(instr, program)),
        Instr::Seq { children, .. } if children.len() > 1 => format!("({})", render(instr, program)),
        _ => render(instr, program),
    }
}

fn suffix_str(min: u32, max: u32) -> String {
    match (min, max) {
        (0, 0) => "*".to_string(),
        (1, 0) => "+".to_string(),
        (0, 1) => "?".to_string(),
        (n, m) if n == m => format!("*{n}"),
        (n, 0) => format!("*{n}.."),
        (n, m) => format!("*{n}..{m}"),
    }
}

fn sign_char(sign: Sign) -> char {
    match sign {
        Sign::And => '&',
        Sign::Not => '!',
        Sign::Tilde => '~',
    }
}

fn render_range(range: &CharRange) -> String {
    match range {
        CharRange::Single(c) => display_char(*c),
        CharRange::Range(lo, hi) => format!("{}-{}", display_char(*lo), display_char(*hi)),
    }
}

fn display_char(c: char) -> String {
    match c {
        '\n' => "\\n".to_string(),
        '\t' => "\\t".to_string(),
        '\r' => "\\r".to_string(),
        other => other.to_string(),
    }
}

fn display_str(s: &str) -> String {
    s.chars().map(display_char).collect()
}

#[cfg(test)]
mod pretty_tests {
    use super::*;
    use ppeg_core::{Interner, Symbol};

    fn tiny_program() -> Program {
        let mut interner = Interner::new();
        let digit: Symbol = interner.intern("digit");
        let rules = vec![(
            digit,
            Instr::Rep {
                min: 2,
                max: 2,
                child: Box::new(Instr::Chs {
                    neg: false,
                    min: 1,
                    max: 1,
                    ranges: vec![CharRange::Range('0', '9')],
                }),
            },
        )];
        Program::new(interner, rules)
    }

    #[test]
    fn renders_bounded_repetition_of_char_class() {
        let program = tiny_program();
        assert_eq!(render(program.rule_instr(0), &program), "[0-9]*2");
    }

    #[test]
    fn dump_lists_rule_name_and_body() {
        let program = tiny_program();
        assert_eq!(dump(&program), "digit = [0-9]*2\n");
    }

    #[test]
    fn renders_ordered_choice_grouped() {
        let mut interner = Interner::new();
        let sym = interner.intern("x");
        let rules = vec![(
            sym,
            Instr::Alt {
                children: vec![
                    Instr::Sq {
                        icase: false,
                        literal: "a".into(),
                    },
                    Instr::Sq {
                        icase: false,
                        literal: "b".into(),
                    },
                ],
                guards: vec![Some('a'), Some('b')],
            },
        )];
        let program = Program::new(interner, rules);
        assert_eq!(render(program.rule_instr(0), &program), "( 'a' / 'b' )");
    }

    #[test]
    fn renders_negated_class_with_unbounded_suffix() {
        let mut interner = Interner::new();
        let sym = interner.intern("nl");
        let rules = vec![(
            sym,
            Instr::Chs {
                neg: true,
                min: 0,
                max: 0,
                ranges: vec![CharRange::Single(',')],
            },
        )];
        let program = Program::new(interner, rules);
        assert_eq!(render(program.rule_instr(0), &program), "[^,]*");
    }

    #[test]
    fn renders_plain_class_without_cardinality_suffix() {
        let mut interner = Interner::new();
        let sym = interner.intern("digit");
        let rules = vec![(
            sym,
            Instr::Chs {
                neg: false,
                min: 1,
                max: 1,
                ranges: vec![CharRange::Range('0', '9')],
            },
        )];
        let program = Program::new(interner, rules);
        assert_eq!(render(program.rule_instr(0), &program), "[0-9]");
    }

    #[test]
    fn renders_collapsed_bounded_class_with_suffix() {
        let mut interner = Interner::new();
        let sym = interner.intern("month");
        let rules = vec![(
            sym,
            Instr::Chs {
                neg: false,
                min: 2,
                max: 2,
                ranges: vec![CharRange::Range('0', '9')],
            },
        )];
        let program = Program::new(interner, rules);
        assert_eq!(render(program.rule_instr(0), &program), "[0-9]*2");
    }
}
