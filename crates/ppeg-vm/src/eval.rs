//! The recursive evaluator: one function per `Instr` variant,
//! each returning `Ok(true)`/`Ok(false)` for ordinary parse success/failure
//! and `Err` only for the grammar-structural aborts (undefined extension,
//! recursion bound) that no enclosing `ALT`/`SEQ`/`REP`/`PRE` may recover
//! from.
//!
//! Every function honours the same contract on failure: `env.pos` and
//! `env.stack` are restored to exactly what they were on entry. Callers
//! that need to try an alternative (`ALT`) or retry a bound (`SEQ`/`REP`)
//! rely on this to backtrack correctly.

use ppeg_core::instr::{CharRange, Sign};
use ppeg_core::{Instr, Node, Symbol};

use crate::env::Env;
use crate::error::RuntimeError;

/// Evaluate `instr` against `env`, starting from the current cursor.
pub fn eval(env: &mut Env, instr: &Instr) -> Result<bool, RuntimeError> {
    match instr {
        Instr::Id { idx, name } => invoke_rule(env, *idx, *name),
        Instr::Alt { children, guards } => eval_alt(env, children, guards),
        Instr::Seq { min, max, children } => eval_seq(env, *min, *max, children),
        Instr::Rep { min, max, child } => eval_rep(env, *min, *max, child),
        Instr::Pre { sign, child } => eval_pre(env, *sign, child),
        Instr::Sq { icase, literal } => Ok(eval_sq(env, *icase, literal)),
        Instr::Dq { icase, literal } => Ok(eval_dq(env, *icase, literal)),
        Instr::Chs { neg, min, max, ranges } => Ok(eval_chs(env, *neg, *min, *max, ranges)),
        Instr::Extn { spec } => eval_extn(env, spec),
    }
}

/// `ID(idx, name)` — the only place rule names enter or leave
/// the rule-name stack, and the only place depth is checked and ptree
/// shaping happens.
pub(crate) fn invoke_rule(env: &mut Env, idx: usize, name: Symbol) -> Result<bool, RuntimeError> {
    if env.rule_stack.len() >= env.depth_limit {
        let frames = env
            .rule_stack
            .iter()
            .rev()
            .take(6)
            .filter_map(|s| env.program.interner().try_resolve(*s))
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        let rule = env
            .program
            .interner()
            .try_resolve(name)
            .unwrap_or("?")
            .to_string();
        return Err(RuntimeError::Grammar(
            ppeg_core::GrammarError::RecursionDepthExceeded { rule, frames },
        ));
    }

    let entry_pos = env.pos;
    let entry_stack = env.stack.len();
    env.rule_stack.push(name);
    env.rule_marks.push(entry_stack);

    if let Some(tracer) = env.tracer.as_mut() {
        let rule_name = env.program.interner().try_resolve(name).unwrap_or("?");
        tracer.record(rule_name, entry_pos);
    }

    let instr = env.program.rule_instr(idx);
    let result = eval(env, instr);

    env.rule_stack.pop();
    env.rule_marks.pop();

    match result {
        Ok(true) => {
            let rule_name = env.program.interner().try_resolve(name).unwrap_or("");
            if rule_name.starts_with('_') {
                env.stack.truncate(entry_stack);
            } else if env.stack.len() == entry_stack {
                let text: String = env.input[entry_pos..env.pos].iter().collect();
                env.stack.push(Node::leaf(rule_name, text));
            } else {
                let children = env.stack.split_off(entry_stack);
                let capitalized = rule_name.chars().next().is_some_and(|c| c.is_uppercase());
                if children.len() > 1 || capitalized {
                    env.stack.push(Node::branch(rule_name, children));
                } else {
                    env.stack.extend(children);
                }
            }
            Ok(true)
        }
        Ok(false) => {
            env.pos = entry_pos;
            env.stack.truncate(entry_stack);
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

fn eval_alt(env: &mut Env, children: &[Instr], guards: &[Option<char>]) -> Result<bool, RuntimeError> {
    let entry_pos = env.pos;
    let entry_stack = env.stack.len();
    for (i, child) in children.iter().enumerate() {
        if let Some(Some(guard)) = guards.get(i) {
            if env.remaining().first() != Some(guard) {
                continue;
            }
        }
        if eval(env, child)? {
            return Ok(true);
        }
        env.pos = entry_pos;
        env.stack.truncate(entry_stack);
    }
    Ok(false)
}

fn eval_seq(env: &mut Env, min: u32, max: u32, children: &[Instr]) -> Result<bool, RuntimeError> {
    let mut count = 0u32;
    loop {
        if max != 0 && count >= max {
            break;
        }
        let iter_pos = env.pos;
        let iter_stack = env.stack.len();
        let mut failed_at = None;
        for (i, child) in children.iter().enumerate() {
            if !eval(env, child)? {
                failed_at = Some(i);
                break;
            }
        }
        match failed_at {
            None => {
                count += 1;
                if env.pos == iter_pos {
                    // progress guard: a zero-length iteration can't repeat usefully.
                    break;
                }
            }
            Some(i) => {
                if env.pos > iter_pos && env.pos >= env.fault.pos {
                    let rendered = ppeg_compiler::pretty::render(&children[i], env.program);
                    env.note_fault(env.pos, rendered);
                }
                env.pos = iter_pos;
                env.stack.truncate(iter_stack);
                break;
            }
        }
    }
    Ok(count >= min)
}

fn eval_rep(env: &mut Env, min: u32, max: u32, child: &Instr) -> Result<bool, RuntimeError> {
    let entry_pos = env.pos;
    let entry_stack = env.stack.len();
    let mut count = 0u32;
    loop {
        if max != 0 && count >= max {
            break;
        }
        let iter_pos = env.pos;
        if !eval(env, child)? {
            break;
        }
        count += 1;
        if env.pos == iter_pos {
            break;
        }
    }
    if count < min {
        if env.pos >= env.fault.pos {
            let rendered = ppeg_compiler::pretty::render(
                &Instr::Rep { min, max, child: Box::new(child.clone()) },
                env.program,
            );
            env.note_fault(env.pos, rendered);
        }
        env.pos = entry_pos;
        env.stack.truncate(entry_stack);
        Ok(false)
    } else {
        Ok(true)
    }
}

fn eval_pre(env: &mut Env, sign: Sign, child: &Instr) -> Result<bool, RuntimeError> {
    let entry_pos = env.pos;
    let entry_stack = env.stack.len();
    let entry_peak = env.peak;

    let tracer = env.tracer.take();
    let inner = eval(env, child);
    env.tracer = tracer;

    env.pos = entry_pos;
    env.stack.truncate(entry_stack);
    env.peak = entry_peak;

    let inner_ok = inner?;
    match sign {
        Sign::And => Ok(inner_ok),
        Sign::Not => Ok(!inner_ok),
        Sign::Tilde => {
            if !inner_ok && entry_pos < env.input.len() {
                env.pos = entry_pos + 1;
                env.note_peak(env.pos);
                Ok(true)
            } else {
                Ok(false)
            }
        }
    }
}

fn eval_sq(env: &mut Env, icase: bool, literal: &str) -> bool {
    let wanted: Vec<char> = literal.chars().collect();
    let entry_pos = env.pos;
    for c in wanted {
        match env.input.get(env.pos) {
            Some(&input_c) if chars_match(input_c, c, icase) => {
                env.pos += 1;
            }
            _ => {
                if env.pos >= env.fault.pos {
                    let rendered = ppeg_compiler::pretty::render(
                        &Instr::Sq { icase, literal: literal.to_string() },
                        env.program,
                    );
                    env.note_fault(env.pos, rendered);
                }
                env.pos = entry_pos;
                return false;
            }
        }
    }
    env.note_peak(env.pos);
    true
}

fn eval_dq(env: &mut Env, icase: bool, literal: &str) -> bool {
    for c in literal.chars() {
        if c == ' ' {
            skip_space(env);
            continue;
        }
        match env.input.get(env.pos) {
            Some(&input_c) if chars_match(input_c, c, icase) => {
                env.pos += 1;
            }
            _ => {
                if env.pos >= env.fault.pos {
                    let rendered = ppeg_compiler::pretty::render(
                        &Instr::Dq { icase, literal: literal.to_string() },
                        env.program,
                    );
                    env.note_fault(env.pos, rendered);
                }
                // DQ does not roll back the cursor on failure: whitespace
                // already skipped stays skipped.
                return false;
            }
        }
    }
    env.note_peak(env.pos);
    true
}

/// Consume zero or more whitespace codepoints, via the grammar's `_space_`
/// rule if defined, else the ASCII set `{space, tab, CR, LF}`.
fn skip_space(env: &mut Env) {
    if let Some(space_idx) = env.program.space() {
        let name = env.program.rules()[space_idx].0;
        loop {
            let before = env.pos;
            match invoke_rule(env, space_idx, name) {
                Ok(true) if env.pos > before => continue,
                _ => {
                    env.pos = before;
                    break;
                }
            }
        }
    } else {
        while matches!(env.input.get(env.pos), Some(' ' | '\t' | '\n' | '\r')) {
            env.pos += 1;
        }
    }
}

fn chars_match(input_c: char, literal_c: char, icase: bool) -> bool {
    if icase {
        input_c.to_ascii_uppercase() == literal_c.to_ascii_uppercase()
    } else {
        input_c == literal_c
    }
}

fn eval_chs(env: &mut Env, neg: bool, min: u32, max: u32, ranges: &[CharRange]) -> bool {
    let entry_pos = env.pos;
    let mut count = 0u32;
    loop {
        if max != 0 && count >= max {
            break;
        }
        let Some(&c) = env.input.get(env.pos) else {
            break;
        };
        let member = ranges.iter().any(|r| r.contains(c));
        if member == neg {
            break;
        }
        env.pos += 1;
        count += 1;
    }
    if count < min {
        if env.pos >= env.fault.pos {
            let rendered = ppeg_compiler::pretty::render(
                &Instr::Chs { neg, min, max, ranges: ranges.to_vec() },
                env.program,
            );
            env.note_fault(env.pos, rendered);
        }
        env.pos = entry_pos;
        false
    } else {
        env.note_peak(env.pos);
        true
    }
}

fn eval_extn(env: &mut Env, spec: &str) -> Result<bool, RuntimeError> {
    let spec = spec.trim();
    let (name, args) = match spec.split_once(' ') {
        Some((name, rest)) => (name, rest),
        None => (spec, ""),
    };
    let mark = *env.rule_marks.last().unwrap_or(&0);
    let extension = env
        .extensions
        .get(name)
        .ok_or_else(|| RuntimeError::MissingExtension(name.to_string()))?;
    extension.run(env, args, mark)
}
