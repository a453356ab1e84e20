//! Top-level parse entry point and return semantics.
//!
//! This is the only place that turns the VM's internal `bool` success/
//! failure signal into the public contract: a ptree root, or a
//! `["$error", report]`-shaped [`ParseFailure`].

use ppeg_core::{GrammarError, Node, Program, Symbol};

use crate::diagnostics::{format_fault_report, format_fell_short, TraceEvent, Tracer};
use crate::env::Env;
use crate::error::RuntimeError;
use crate::eval::invoke_rule;
use crate::extensions::ExtensionRegistry;

/// Which rule(s), if any, should emit step-trace events (`options.trace`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceSetting {
    All,
    Rule(String),
}

/// Parse options.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub trace: Option<TraceSetting>,
    /// Return the root on partial consumption instead of a "fell short" error.
    pub short: bool,
}

/// A recoverable parse failure, returned to the caller as `["$error", ...]`
/// rather than raised — distinct from [`GrammarError`] and
/// [`RuntimeError`], which abort the parse entirely.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ParseFailure(pub String);

#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Failure(#[from] ParseFailure),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Run `program` against `input`, starting at rule `start`.
pub fn parse(
    program: &Program,
    extensions: &ExtensionRegistry,
    start: usize,
    input: &str,
    options: &Options,
) -> Result<Node, ParseError> {
    parse_traced(program, extensions, start, input, options).0
}

/// Like [`parse`], but also returns whatever step-trace events were recorded.
pub fn parse_traced(
    program: &Program,
    extensions: &ExtensionRegistry,
    start: usize,
    input: &str,
    options: &Options,
) -> (Result<Node, ParseError>, Vec<TraceEvent>) {
    let mut env = Env::new(program, extensions, input);
    if let Some(setting) = &options.trace {
        let filter = match setting {
            TraceSetting::All => None,
            TraceSetting::Rule(name) => Some(name.clone()),
        };
        env.tracer = Some(Tracer::new(filter));
    }

    let start_name: Symbol = program.rules()[start].0;
    let result = invoke_rule(&mut env, start, start_name);
    let events = env.tracer.as_ref().map(|t| t.events().to_vec()).unwrap_or_default();

    let outcome = (|| -> Result<Node, ParseError> {
        if input.is_empty() {
            return match result {
                Ok(true) if env.stack.len() == 1 => Ok(env.stack.remove(0)),
                Ok(_) => Err(ParseFailure("empty input string".to_string()).into()),
                Err(err) => Err(err.into()),
            };
        }

        match result? {
            true if env.pos == env.input.len() => {
                if env.stack.len() == 1 {
                    Ok(env.stack.remove(0))
                } else {
                    Err(RuntimeError::Grammar(GrammarError::MalformedPtree(format!(
                        "parse produced {} roots, expected exactly 1",
                        env.stack.len()
                    )))
                    .into())
                }
            }
            true => {
                if options.short {
                    if env.stack.len() == 1 {
                        Ok(env.stack.remove(0))
                    } else {
                        Err(RuntimeError::Grammar(GrammarError::MalformedPtree(format!(
                            "parse produced {} roots, expected exactly 1",
                            env.stack.len()
                        )))
                        .into())
                    }
                } else {
                    Err(ParseFailure(format_fell_short(&env.input, env.peak)).into())
                }
            }
            false => {
                let report = format_fault_report(&env.input, &env.fault, program.interner());
                Err(ParseFailure(report).into())
            }
        }
    })();

    (outcome, events)
}

#[cfg(test)]
mod parse_tests {
    use super::*;
    use ppeg_core::instr::CharRange;
    use ppeg_core::{Instr, Interner};

    fn date_program() -> Program {
        let mut interner = Interner::new();
        let date = interner.intern("Date");
        let year = interner.intern("year");
        let month = interner.intern("month");
        let day = interner.intern("day");
        let digits = |n: u32| Instr::Chs {
            neg: false,
            min: n,
            max: n,
            ranges: vec![CharRange::Range('0', '9')],
        };
        let rules = vec![
            (
                date,
                Instr::Seq {
                    min: 1,
                    max: 1,
                    children: vec![
                        Instr::Id { idx: 1, name: year },
                        Instr::Sq { icase: false, literal: "-".into() },
                        Instr::Id { idx: 2, name: month },
                        Instr::Sq { icase: false, literal: "-".into() },
                        Instr::Id { idx: 3, name: day },
                    ],
                },
            ),
            (year, digits(4)),
            (month, digits(2)),
            (day, digits(2)),
        ];
        Program::new(interner, rules)
    }

    #[test]
    fn full_consumption_returns_single_root() {
        let program = date_program();
        let registry = ExtensionRegistry::new();
        let options = Options::default();
        let node = parse(&program, &registry, 0, "2021-04-05", &options).unwrap();
        match node {
            Node::Branch { name, children } => {
                assert_eq!(name, "Date");
                assert_eq!(children.len(), 3);
                assert_eq!(children[0], Node::leaf("year", "2021"));
                assert_eq!(children[1], Node::leaf("month", "04"));
                assert_eq!(children[2], Node::leaf("day", "05"));
            }
            other => panic!("expected branch, got {other:?}"),
        }
    }

    #[test]
    fn partial_consumption_without_short_reports_fell_short() {
        let program = date_program();
        let registry = ExtensionRegistry::new();
        let options = Options::default();
        let err = parse(&program, &registry, 0, "2021-04-05 xxx", &options).unwrap_err();
        match err {
            ParseError::Failure(ParseFailure(msg)) => assert!(msg.starts_with("Fell short")),
            other => panic!("expected ParseFailure, got {other:?}"),
        }
    }

    #[test]
    fn short_option_returns_root_on_partial_consumption() {
        let program = date_program();
        let registry = ExtensionRegistry::new();
        let options = Options { trace: None, short: true };
        let node = parse(&program, &registry, 0, "2021-04-05 xxx", &options).unwrap();
        assert!(matches!(node, Node::Branch { .. }));
    }

    #[test]
    fn total_failure_reports_fault_rule_and_expected() {
        let program = date_program();
        let registry = ExtensionRegistry::new();
        let options = Options::default();
        let err = parse(&program, &registry, 0, "2021-4-05 xxx", &options).unwrap_err();
        match err {
            ParseError::Failure(ParseFailure(msg)) => {
                assert!(msg.contains("In rule: month"));
                assert!(msg.contains("expected: [0-9]*2"));
            }
            other => panic!("expected ParseFailure, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_with_no_match_is_reported() {
        let program = date_program();
        let registry = ExtensionRegistry::new();
        let options = Options::default();
        let err = parse(&program, &registry, 0, "", &options).unwrap_err();
        match err {
            ParseError::Failure(ParseFailure(msg)) => assert_eq!(msg, "empty input string"),
            other => panic!("expected ParseFailure, got {other:?}"),
        }
    }

    #[test]
    fn trace_records_rule_entry_events() {
        let program = date_program();
        let registry = ExtensionRegistry::new();
        let options = Options {
            trace: Some(TraceSetting::All),
            short: false,
        };
        let (result, events) = parse_traced(&program, &registry, 0, "2021-04-05", &options);
        assert!(result.is_ok());
        assert!(events.iter().any(|e| e.rule == "Date"));
        assert!(events.iter().any(|e| e.rule == "year"));
    }
}
