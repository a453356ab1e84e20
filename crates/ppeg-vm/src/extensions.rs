//! Host extension registry and built-in extensions.
//!
//! An `<name args...>` expression dispatches to the registered extension
//! named `name`, which behaves like any other primitive: it either
//! succeeds (optionally consuming input and/or pushing ptree nodes) or
//! fails, and failure backtracks exactly the way a literal or char-class
//! mismatch would. `mark` is the stack length at the enclosing rule's
//! entry, so an extension can see (and, for `infix`, rewrite) the sibling
//! nodes that rule has accumulated so far.

use std::collections::HashMap;

use crate::diagnostics::Tracer;
use crate::env::Env;
use crate::error::RuntimeError;
use crate::infix::InfixExtension;

pub trait Extension: Send + Sync {
    fn run(&self, env: &mut Env, args: &str, mark: usize) -> Result<bool, RuntimeError>;
}

pub struct ExtensionRegistry {
    extensions: HashMap<String, Box<dyn Extension>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        ExtensionRegistry {
            extensions: HashMap::new(),
        }
    }

    pub fn with_builtins(mut self) -> Self {
        self.register("?", Box::new(DebugExtension));
        self.register("same", Box::new(SameExtension));
        self.register("infix", Box::new(InfixExtension));
        self
    }

    pub fn register(&mut self, name: impl Into<String>, extension: Box<dyn Extension>) -> &mut Self {
        self.extensions.insert(name.into(), extension);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Extension> {
        self.extensions.get(name).map(|b| b.as_ref())
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        ExtensionRegistry::new().with_builtins()
    }
}

/// `<?>` — toggles step tracing on for the enclosing rule invocation: if the
/// parse isn't already being traced, starts tracing scoped to whichever rule
/// is currently active; if it already is, this is a no-op (idempotent).
/// Always succeeds, consumes and pushes nothing.
struct DebugExtension;

impl Extension for DebugExtension {
    fn run(&self, env: &mut Env, _args: &str, _mark: usize) -> Result<bool, RuntimeError> {
        let rule_name = env
            .active_rule()
            .and_then(|s| env.program.interner().try_resolve(s))
            .unwrap_or("?")
            .to_string();
        if env.tracer.is_none() {
            // Scope the newly-started tracer to this rule so later plain
            // rule-entry events from `invoke_rule` pass the same filter.
            env.tracer = Some(Tracer::new(Some(rule_name.clone())));
        }
        if let Some(tracer) = env.tracer.as_mut() {
            tracer.record(&rule_name, env.pos);
        }
        Ok(true)
    }
}

/// `<same NAME>` — matches the upcoming input against the text of the
/// sibling named `NAME` already captured earlier in the current rule: the
/// context-sensitive piece that makes matched fences and XML-style closing
/// tags expressible (`Tag = '<' name '>' ... '</' <same name> '>'`).
struct SameExtension;

impl Extension for SameExtension {
    fn run(&self, env: &mut Env, args: &str, mark: usize) -> Result<bool, RuntimeError> {
        let wanted_name = args.trim();
        let Some(prior) = env.stack[mark..].iter().rev().find(|n| n.name() == wanted_name) else {
            return Ok(false);
        };
        let Some(text) = prior.text() else {
            return Ok(false);
        };
        let wanted: Vec<char> = text.chars().collect();
        let len = wanted.len();
        if env.pos + len > env.input.len() {
            return Ok(false);
        }
        if env.input[env.pos..env.pos + len] == wanted[..] {
            env.pos += len;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod extensions_tests {
    use super::*;
    use crate::eval::invoke_rule;
    use ppeg_core::instr::CharRange;
    use ppeg_core::{Instr, Interner, Program};

    #[test]
    fn debug_extension_starts_tracing_when_not_already_tracing() {
        let mut interner = Interner::new();
        let sym = interner.intern("x");
        let program = Program::new(interner, vec![(sym, Instr::Extn { spec: "?".into() })]);
        let registry = ExtensionRegistry::new().with_builtins();
        let mut env = Env::new(&program, &registry, "");
        assert!(env.tracer.is_none());
        let name = program.rules()[0].0;
        assert!(invoke_rule(&mut env, 0, name).unwrap());
        assert!(env.tracer.is_some());
        assert_eq!(env.tracer.unwrap().events().len(), 1);
    }

    #[test]
    fn debug_extension_is_idempotent_once_tracing() {
        let mut interner = Interner::new();
        let sym = interner.intern("x");
        let double = Instr::Seq {
            min: 1,
            max: 1,
            children: vec![Instr::Extn { spec: "?".into() }, Instr::Extn { spec: "?".into() }],
        };
        let program = Program::new(interner, vec![(sym, double)]);
        let registry = ExtensionRegistry::new().with_builtins();
        let mut env = Env::new(&program, &registry, "");
        let name = program.rules()[0].0;
        assert!(invoke_rule(&mut env, 0, name).unwrap());
        // Tracing starts once; the second `<?>` just appends another event
        // to the same tracer rather than resetting it.
        assert_eq!(env.tracer.unwrap().events().len(), 2);
    }

    #[test]
    fn same_extension_matches_previously_captured_sibling_text() {
        let mut interner = Interner::new();
        let tag = interner.intern("Tag");
        let name_rule = interner.intern("name");
        let id_chars = Instr::Chs {
            neg: false,
            min: 1,
            max: 0,
            ranges: vec![CharRange::Range('a', 'z')],
        };
        let body = Instr::Seq {
            min: 1,
            max: 1,
            children: vec![
                Instr::Id { idx: 1, name: name_rule },
                Instr::Sq { icase: false, literal: ">".into() },
                Instr::Extn { spec: "same name".into() },
            ],
        };
        let program = Program::new(interner, vec![(tag, body), (name_rule, id_chars)]);
        let registry = ExtensionRegistry::new().with_builtins();

        let mut env = Env::new(&program, &registry, "div>div");
        let name = program.rules()[0].0;
        assert!(invoke_rule(&mut env, 0, name).unwrap());
        assert_eq!(env.pos, 7);

        let mut env = Env::new(&program, &registry, "div>span");
        assert!(!invoke_rule(&mut env, 0, name).unwrap());
    }

    #[test]
    fn same_extension_fails_when_sibling_name_was_never_captured() {
        let mut interner = Interner::new();
        let sym = interner.intern("x");
        let body = Instr::Extn { spec: "same missing".into() };
        let program = Program::new(interner, vec![(sym, body)]);
        let registry = ExtensionRegistry::new().with_builtins();
        let mut env = Env::new(&program, &registry, "anything");
        let name = program.rules()[0].0;
        assert!(!invoke_rule(&mut env, 0, name).unwrap());
    }
}
