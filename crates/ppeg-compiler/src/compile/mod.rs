//! Grammar ptree → `Program` compiler.
//!
//! Input is the grammar ptree the bootstrap program (`crate::bootstrap`)
//! produces when it parses grammar source text. Each `rule` branch becomes
//! one compiled rule; expression nodes are matched on by rule name (`id`,
//! `alt`, `seq`, `rep`, `pre`, `sq`, `dq`, `chs`, `extn`) and recursively
//! lowered into `Instr`.

mod guards;
mod literals;
mod validate;

use std::collections::HashSet;

use indexmap::IndexMap;
use ppeg_core::instr::Sign;
use ppeg_core::{GrammarError, Instr, Interner, Node, Program, Symbol};

/// Compile a grammar ptree (as produced by the bootstrap parser) into a
/// `Program`. The first rule becomes the default start rule; callers that
/// want a different start should call `Program::set_start` afterwards
/// with the index of the rule they want.
pub fn compile(ptree: &Node) -> Result<Program, GrammarError> {
    if ptree.name() != "Peg" {
        return Err(GrammarError::MalformedPtree(format!(
            "expected a Peg root node, got {}",
            ptree.name()
        )));
    }

    let mut interner = Interner::new();
    let mut seen = HashSet::new();
    let mut order: Vec<Symbol> = Vec::new();
    let mut rule_exprs: Vec<(Symbol, &Node)> = Vec::new();

    for rule_node in ptree.children() {
        if rule_node.name() != "rule" {
            return Err(GrammarError::MalformedPtree(format!(
                "expected a rule node, got {}",
                rule_node.name()
            )));
        }
        let children = rule_node.children();
        let [id_node, expr_node] = children else {
            return Err(GrammarError::MalformedPtree(
                "rule node must have exactly two children".into(),
            ));
        };
        let name = id_node
            .text()
            .ok_or_else(|| GrammarError::MalformedPtree("rule name must be a leaf".into()))?;
        let sym = interner.intern(name);
        if !seen.insert(sym) {
            return Err(GrammarError::DuplicateRule(name.to_string()));
        }
        order.push(sym);
        rule_exprs.push((sym, expr_node));
    }

    let names: IndexMap<Symbol, usize> = order.iter().enumerate().map(|(i, s)| (*s, i)).collect();

    let mut rules = Vec::with_capacity(rule_exprs.len());
    for (sym, expr_node) in &rule_exprs {
        let instr = emit(expr_node, &interner, &names)?;
        rules.push((*sym, instr));
    }

    // Re-derive ALT guards now that every rule body exists, so an `ID`
    // alternative can be guarded by descending into the rule it calls
    // rather than only the alternatives emitted in the same pass.
    let snapshot = rules.clone();
    for (_, instr) in rules.iter_mut() {
        guards::refine_guards(instr, &snapshot);
    }

    let program = Program::new(interner, rules);

    if let Some(space_idx) = program.space() {
        if validate::is_bare_self_reference(program.rule_instr(space_idx), space_idx) {
            return Err(GrammarError::RecursiveSpaceRule);
        }
    }

    Ok(program)
}

fn emit(node: &Node, interner: &Interner, names: &IndexMap<Symbol, usize>) -> Result<Instr, GrammarError> {
    match node.name() {
        "id" => {
            let text = node
                .text()
                .ok_or_else(|| GrammarError::MalformedPtree("id node must be a leaf".into()))?;
            let sym = interner
                .get(text)
                .ok_or_else(|| GrammarError::UndefinedRule(text.to_string()))?;
            let idx = *names
                .get(&sym)
                .ok_or_else(|| GrammarError::UndefinedRule(text.to_string()))?;
            Ok(Instr::Id { idx, name: sym })
        }
        "alt" => {
            let children = node
                .children()
                .iter()
                .map(|c| emit(c, interner, names))
                .collect::<Result<Vec<_>, _>>()?;
            let guards = children.iter().map(guards::first_char_guard).collect();
            Ok(Instr::Alt { children, guards })
        }
        "seq" => {
            let children = node
                .children()
                .iter()
                .map(|c| emit(c, interner, names))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Instr::Seq {
                min: 1,
                max: 1,
                children,
            })
        }
        "rep" => {
            let children = node.children();
            let [expr_node, sfx_node] = children else {
                return Err(GrammarError::MalformedPtree(
                    "rep node must have exactly two children".into(),
                ));
            };
            let sfx_text = sfx_node
                .text()
                .ok_or_else(|| GrammarError::MalformedPtree("sfx node must be a leaf".into()))?;
            let (min, max) = decode_suffix(sfx_text)?;
            let child = emit(expr_node, interner, names)?;
            Ok(collapse_rep(min, max, child))
        }
        "pre" => {
            let children = node.children();
            let [pfx_node, expr_node] = children else {
                return Err(GrammarError::MalformedPtree(
                    "pre node must have exactly two children".into(),
                ));
            };
            let pfx_text = pfx_node
                .text()
                .ok_or_else(|| GrammarError::MalformedPtree("pfx node must be a leaf".into()))?;
            let sign = decode_sign(pfx_text)?;
            let child = emit(expr_node, interner, names)?;
            if sign == Sign::Tilde {
                match &child {
                    Instr::Sq { icase: false, literal } if literal.chars().count() == 1 => {
                        let c = literal.chars().next().unwrap();
                        return Ok(Instr::Chs {
                            neg: true,
                            min: 1,
                            max: 1,
                            ranges: vec![ppeg_core::instr::CharRange::Single(c)],
                        });
                    }
                    Instr::Chs { neg: false, min, max, ranges } => {
                        return Ok(Instr::Chs {
                            neg: true,
                            min: *min,
                            max: *max,
                            ranges: ranges.clone(),
                        });
                    }
                    _ => {}
                }
            }
            Ok(Instr::Pre {
                sign,
                child: Box::new(child),
            })
        }
        "sq" => {
            let text = node
                .text()
                .ok_or_else(|| GrammarError::MalformedPtree("sq node must be a leaf".into()))?;
            let (icase, literal) = literals::decode_literal(text, '\'');
            Ok(Instr::Sq { icase, literal })
        }
        "dq" => {
            let text = node
                .text()
                .ok_or_else(|| GrammarError::MalformedPtree("dq node must be a leaf".into()))?;
            let (icase, literal) = literals::decode_literal(text, '"');
            Ok(Instr::Dq { icase, literal })
        }
        "chs" => {
            let text = node
                .text()
                .ok_or_else(|| GrammarError::MalformedPtree("chs node must be a leaf".into()))?;
            let ranges = literals::decode_char_class(text)?;
            Ok(Instr::Chs {
                neg: false,
                min: 1,
                max: 1,
                ranges,
            })
        }
        "extn" => {
            let text = node
                .text()
                .ok_or_else(|| GrammarError::MalformedPtree("extn node must be a leaf".into()))?;
            Ok(Instr::Extn {
                spec: literals::decode_extension(text),
            })
        }
        other => Err(GrammarError::MalformedPtree(format!(
            "unexpected expression node: {other}"
        ))),
    }
}

/// Fold a repetition's bound into its child instruction where possible:
/// a `seq`-shaped child absorbs the bound directly into its own
/// `min..max`, as does a single-codepoint char class or literal — there is
/// no need for a separate `Rep` node wrapping something that already carries
/// a repetition count. Anything else (a rule call, an alternation, a
/// multi-codepoint literal) keeps the explicit `Rep` wrapper.
fn collapse_rep(min: u32, max: u32, child: Instr) -> Instr {
    match child {
        Instr::Seq { min: 1, max: 1, children } => Instr::Seq { min, max, children },
        Instr::Chs { neg, min: 1, max: 1, ranges } => Instr::Chs { neg, min, max, ranges },
        Instr::Sq { icase: false, literal } if literal.chars().count() == 1 => {
            let c = literal.chars().next().unwrap();
            Instr::Chs {
                neg: false,
                min,
                max,
                ranges: vec![ppeg_core::instr::CharRange::Single(c)],
            }
        }
        other => Instr::Rep {
            min,
            max,
            child: Box::new(other),
        },
    }
}

fn decode_sign(text: &str) -> Result<Sign, GrammarError> {
    match text {
        "&" => Ok(Sign::And),
        "!" => Ok(Sign::Not),
        "~" => Ok(Sign::Tilde),
        other => Err(GrammarError::MalformedPtree(format!("unknown prefix sign: {other}"))),
    }
}

/// Decode a `sfx` leaf's text into `(min, max)`: `+`→(1,0), `?`→(0,1),
/// `*`→(0,0), `*N`→(N,N), `*N..`→(N,0), `*N..M`→(N,M).
fn decode_suffix(text: &str) -> Result<(u32, u32), GrammarError> {
    match text {
        "+" => return Ok((1, 0)),
        "?" => return Ok((0, 1)),
        _ => {}
    }
    let rest = text
        .strip_prefix('*')
        .ok_or_else(|| GrammarError::MalformedPtree(format!("unknown suffix: {text}")))?;
    if rest.is_empty() {
        return Ok((0, 0));
    }
    if let Some(dots) = rest.find("..") {
        let lo = parse_digits(&rest[..dots])?;
        let hi = parse_digits(&rest[dots + 2..])?;
        Ok((lo, hi))
    } else {
        let n = parse_digits(rest)?;
        Ok((n, n))
    }
}

fn parse_digits(s: &str) -> Result<u32, GrammarError> {
    if s.is_empty() {
        return Ok(0);
    }
    s.parse()
        .map_err(|_| GrammarError::MalformedPtree(format!("invalid repetition count: {s}")))
}
