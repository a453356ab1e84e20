//! Peak-position fault tracking and report formatting, and the optional
//! step tracer (`options.trace`).

use ppeg_core::{Interner, Symbol};

/// The deepest point the parse made progress to before ultimately failing,
/// plus enough context (active rule, expected expression) to explain why.
#[derive(Debug, Clone, Default)]
pub struct Fault {
    pub pos: usize,
    pub rule: Option<Symbol>,
    pub expected: Option<String>,
}

impl Fault {
    /// Record a failure at `pos` if it is at least as deep as anything seen
    /// so far — later (deeper) failures are more informative than earlier
    /// ones, since they represent the parser having gotten further before
    /// giving up.
    pub fn note(&mut self, pos: usize, rule: Option<Symbol>, expected: String) {
        if pos >= self.pos {
            self.pos = pos;
            self.rule = rule;
            self.expected = Some(expected);
        }
    }
}

/// Render a fault as a human-readable, multi-line report with a source
/// excerpt and a caret under the failing column.
pub fn format_fault_report(input: &[char], fault: &Fault, interner: &Interner) -> String {
    let pos = fault.pos.min(input.len());
    let mut line = 1;
    let mut line_start = 0;
    for (i, &c) in input.iter().enumerate().take(pos) {
        if c == '\n' {
            line += 1;
            line_start = i + 1;
        }
    }
    let line_end = input[line_start..]
        .iter()
        .position(|&c| c == '\n')
        .map(|i| line_start + i)
        .unwrap_or(input.len());
    let source_line: String = input[line_start..line_end].iter().collect();
    let col = pos - line_start + 1;

    let rule_name = fault
        .rule
        .and_then(|s| interner.try_resolve(s))
        .unwrap_or("?");
    let expected = fault.expected.as_deref().unwrap_or("?");
    let caret = " ".repeat(pos - line_start);

    format!(
        "In rule: {rule_name}, expected: {expected}, failed at line: {line}.{col}\n{source_line}\n{caret}^"
    )
}

/// Render the "fell short" report for a parse that consumed some input but
/// not all of it, without a hard failure to pin the blame on — points at
/// `peak`, the furthest the cursor ever got, rather than at a fault.
pub fn format_fell_short(input: &[char], peak: usize) -> String {
    let pos = peak.min(input.len());
    let mut line = 1;
    let mut line_start = 0;
    for (i, &c) in input.iter().enumerate().take(pos) {
        if c == '\n' {
            line += 1;
            line_start = i + 1;
        }
    }
    let line_end = input[line_start..]
        .iter()
        .position(|&c| c == '\n')
        .map(|i| line_start + i)
        .unwrap_or(input.len());
    let source_line: String = input[line_start..line_end].iter().collect();
    let col = pos - line_start + 1;
    let caret = " ".repeat(pos - line_start);

    format!("Fell short at line: {line}.{col}\n{source_line}\n{caret}^")
}

/// One rule entered during a traced parse.
#[derive(Debug, Clone)]
pub struct TraceEvent {
    pub rule: String,
    pub pos: usize,
}

/// Accumulates `TraceEvent`s, optionally filtered to a single rule name.
#[derive(Debug, Clone, Default)]
pub struct Tracer {
    filter: Option<String>,
    events: Vec<TraceEvent>,
}

impl Tracer {
    pub fn new(filter: Option<String>) -> Self {
        Tracer {
            filter,
            events: Vec::new(),
        }
    }

    pub fn record(&mut self, rule: &str, pos: usize) {
        if self.filter.as_deref().is_none_or(|f| f == rule) {
            self.events.push(TraceEvent {
                rule: rule.to_string(),
                pos,
            });
        }
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }
}
