//! Public API for the pPEG parsing engine: compile a grammar, get back a
//! `Parser`, run it against input text, get a ptree or an error report.
//!
//! This crate is pure wiring: `ppeg-compiler`'s bootstrap program parses
//! grammar source into a grammar ptree, `ppeg-compiler::compile` lowers
//! that ptree into a fresh `Program`, and `ppeg-vm::parse` evaluates that
//! program against an input string.

pub use ppeg_core::{CharRange, GrammarError, Guard, Instr, Node, Program, Sign, Symbol};
pub use ppeg_vm::{
    Extension, ExtensionRegistry, Options, ParseError, ParseFailure, RuntimeError, TraceSetting,
};

use ppeg_compiler::bootstrap::bootstrap_program;
use ppeg_compiler::compile as compile_ptree;
use ppeg_compiler::pretty;

/// Builds a `Parser` from grammar source, with optional extensions and a
/// start-rule override.
pub struct Builder {
    extensions: ExtensionRegistry,
    start_rule: Option<String>,
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            extensions: ExtensionRegistry::default(),
            start_rule: None,
        }
    }

    /// Register a host extension callable as `<name args...>` in the grammar.
    pub fn with_extension(mut self, name: impl Into<String>, extension: Box<dyn Extension>) -> Self {
        self.extensions.register(name, extension);
        self
    }

    /// Compile against a start rule other than the grammar's first rule.
    pub fn start_rule(mut self, name: impl Into<String>) -> Self {
        self.start_rule = Some(name.into());
        self
    }

    pub fn compile(self, grammar: &str) -> Result<Parser, GrammarError> {
        let ptree = run_bootstrap(grammar)?;
        let mut program = compile_ptree(&ptree)?;

        if let Some(name) = &self.start_rule {
            let idx = program
                .index_of(name)
                .ok_or_else(|| GrammarError::UndefinedRule(name.clone()))?;
            program.set_start(idx);
        }

        Ok(Parser {
            program,
            extensions: self.extensions,
        })
    }
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

/// Compile `grammar` with the default (built-in-only) extension set and the
/// grammar's first rule as the start rule.
pub fn compile(grammar: &str) -> Result<Parser, GrammarError> {
    Builder::new().compile(grammar)
}

/// Run the bootstrap (grammar-of-grammars) program over `grammar`, producing
/// the grammar ptree the compiler expects.
fn run_bootstrap(grammar: &str) -> Result<Node, GrammarError> {
    let bootstrap = bootstrap_program();
    let registry = ExtensionRegistry::default();
    let options = Options::default();
    ppeg_vm::parse(&bootstrap, &registry, bootstrap.start(), grammar, &options).map_err(|err| {
        GrammarError::MalformedPtree(format!("failed to parse grammar source: {err}"))
    })
}

/// A compiled grammar, ready to parse any number of inputs.
pub struct Parser {
    program: Program,
    extensions: ExtensionRegistry,
}

impl Parser {
    /// Parse `input` with default options.
    pub fn parse(&self, input: &str) -> Result<Node, ParseError> {
        self.parse_with(input, &Options::default())
    }

    /// Parse `input` with explicit options (`{ trace, short }`).
    pub fn parse_with(&self, input: &str, options: &Options) -> Result<Node, ParseError> {
        ppeg_vm::parse(&self.program, &self.extensions, self.program.start(), input, options)
    }

    /// Re-enter the compiled program at an arbitrary named rule instead of
    /// the grammar's start rule.
    pub fn run_from(&self, rule_name: &str, input: &str) -> Result<Node, ParseError> {
        let idx = self
            .program
            .index_of(rule_name)
            .ok_or_else(|| ParseError::Runtime(RuntimeError::Grammar(GrammarError::UndefinedRule(rule_name.to_string()))))?;
        ppeg_vm::parse(&self.program, &self.extensions, idx, input, &Options::default())
    }

    /// Render the compiled grammar back to surface syntax, one `name = body`
    /// line per rule.
    pub fn dump(&self) -> String {
        pretty::dump(&self.program)
    }

    pub fn program(&self) -> &Program {
        &self.program
    }
}
