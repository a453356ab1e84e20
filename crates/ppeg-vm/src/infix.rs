//! `<infix>` — rewrites a flat `operand (operator operand)*` sequence
//! already accumulated by the enclosing rule into a precedence tree, using
//! precedence-climbing.
//!
//! An operator's binding power is read off the last four characters of its
//! own rule name: `_d__` (digit in the second slot) is left-associative at
//! level `d` (binds `2d-1` on the left, `2d` on the right); `__d_` (digit
//! in the third slot) is right-associative at level `d` (binds `2d` on the
//! left, `2d-1` on the right). An operator node whose name doesn't match
//! either pattern can't be climbed past, which ends the rewrite at that
//! point rather than aborting it.

use ppeg_core::Node;

use crate::env::Env;
use crate::error::RuntimeError;
use crate::extensions::Extension;

pub struct InfixExtension;

impl Extension for InfixExtension {
    fn run(&self, env: &mut Env, _args: &str, mark: usize) -> Result<bool, RuntimeError> {
        let nodes: Vec<Node> = env.stack.split_off(mark);
        match rewrite(&nodes) {
            Some(tree) => {
                env.stack.push(tree);
                Ok(true)
            }
            None => {
                let was_empty = nodes.is_empty();
                env.stack.extend(nodes);
                Ok(was_empty)
            }
        }
    }
}

/// `_d__` → left-assoc level `d`; `__d_` → right-assoc level `d`.
fn binding_power(name: &str) -> Option<(u32, u32)> {
    if name.chars().count() < 4 {
        return None;
    }
    let suffix: Vec<char> = name.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    match suffix.as_slice() {
        [a, d, b, c] if *a == '_' && *b == '_' && *c == '_' && d.is_ascii_digit() => {
            let level = d.to_digit(10).unwrap();
            Some((level.saturating_mul(2).saturating_sub(1), level * 2))
        }
        [a, b, d, c] if *a == '_' && *b == '_' && *c == '_' && d.is_ascii_digit() => {
            let level = d.to_digit(10).unwrap();
            Some((level * 2, level.saturating_mul(2).saturating_sub(1)))
        }
        _ => None,
    }
}

fn rewrite(nodes: &[Node]) -> Option<Node> {
    if nodes.is_empty() {
        return None;
    }
    if nodes.len() % 2 == 0 {
        return None;
    }
    if nodes.len() == 1 {
        return Some(nodes[0].clone());
    }
    let mut pos = 0;
    Some(climb(nodes, 0, &mut pos))
}

fn climb(nodes: &[Node], min_bp: u32, pos: &mut usize) -> Node {
    let mut lhs = nodes[*pos].clone();
    *pos += 1;
    while *pos < nodes.len() {
        let op = &nodes[*pos];
        let Some((lbp, rbp)) = binding_power(op.name()) else {
            break;
        };
        if lbp < min_bp {
            break;
        }
        *pos += 1;
        let rhs = climb(nodes, rbp, pos);
        // The rewritten node is labelled with the operator's captured text
        // ("+"), not the rule name that matched it ("_1__").
        let label = op.text().unwrap_or_else(|| op.name());
        lhs = Node::branch(label, vec![lhs, rhs]);
    }
    lhs
}
