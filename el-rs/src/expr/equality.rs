//! Structural equality.
//!
//! Two trees are equal when they have the same shape, with three
//! relaxations:
//!
//! - parentheses are ignored;
//! - operands of a commutative operator (`==`, `!=`, `+`, `*`) may be
//!   swapped;
//! - chains of an associative operator (`+`, `*`) compare as multisets of
//!   their operands, so `a+b+c` equals `c+(a+b)`.
//!
//! Variables compare by name.  [`Hash`] agrees with this equality: operand
//! hashes of commutative and associative operators are combined with an
//! order-independent sum.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::{BinaryOp, Node};
use crate::value::Value;

impl PartialEq for Node {
    fn eq(&self, other: &Node) -> bool {
        let (a, b) = (self.ungrouped(), other.ungrouped());
        match (a, b) {
            (Node::Constant(x), Node::Constant(y)) => same_constant(x, y),
            (Node::Variable(x), Node::Variable(y)) => x.name() == y.name(),
            (Node::Unary(o1, x), Node::Unary(o2, y)) => o1 == o2 && x == y,
            (Node::Binary(o1, l1, r1), Node::Binary(o2, l2, r2)) => {
                if o1 != o2 {
                    return false;
                }
                if l1 == l2 && r1 == r2 {
                    return true;
                }
                if o1.is_commutative() && l1 == r2 && r1 == l2 {
                    return true;
                }
                o1.is_associative() && same_operands(&flatten(a, *o1), flatten(b, *o1))
            }
            (Node::Index(b1, k1), Node::Index(b2, k2))
            | (Node::Conditional(b1, k1), Node::Conditional(b2, k2))
            | (Node::Else(b1, k1), Node::Else(b2, k2)) => b1 == b2 && k1 == k2,
            (Node::Concat(p1), Node::Concat(p2)) => p1 == p2,
            (Node::Call(c1), Node::Call(c2)) => {
                c1.namespace.uri == c2.namespace.uri && c1.name == c2.name && c1.args == c2.args
            }
            _ => false,
        }
    }
}

// Equality is reflexive even for NaN constants, so `Node` can be `Eq`.
impl Eq for Node {}

/// Like `Value` equality, except floats compare by bit pattern with the
/// two zeros identified, matching [`hash_value`].
fn same_constant(x: &Value, y: &Value) -> bool {
    match (x, y) {
        (Value::Float(a), Value::Float(b)) => {
            (*a == 0.0 && *b == 0.0) || a.to_bits() == b.to_bits()
        }
        _ => x == y,
    }
}

/// Operands of the maximal `op`-chain rooted at `node`.
fn flatten(node: &Node, op: BinaryOp) -> Vec<&Node> {
    let mut out = Vec::new();
    collect(node, op, &mut out);
    out
}

fn collect<'a>(node: &'a Node, op: BinaryOp, out: &mut Vec<&'a Node>) {
    match node.ungrouped() {
        Node::Binary(o, l, r) if *o == op => {
            collect(l, op, out);
            collect(r, op, out);
        }
        other => out.push(other),
    }
}

/// Multiset equality: each left operand removes one equal right operand.
fn same_operands(left: &[&Node], mut right: Vec<&Node>) -> bool {
    if left.len() != right.len() {
        return false;
    }
    for l in left {
        match right.iter().position(|r| *l == *r) {
            Some(i) => {
                right.swap_remove(i);
            }
            None => return false,
        }
    }
    right.is_empty()
}

// ── Hashing ───────────────────────────────────────────────────────────────────

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(structural_hash(self));
    }
}

fn structural_hash(node: &Node) -> u64 {
    let node = node.ungrouped();
    let mut h = DefaultHasher::new();
    std::mem::discriminant(node).hash(&mut h);
    match node {
        Node::Constant(v) => hash_value(v, &mut h),
        Node::Variable(var) => var.name().hash(&mut h),
        Node::Unary(op, x) => {
            op.hash(&mut h);
            structural_hash(x).hash(&mut h);
        }
        Node::Binary(op, l, r) => {
            op.hash(&mut h);
            if op.is_associative() {
                flatten(node, *op)
                    .into_iter()
                    .map(structural_hash)
                    .fold(0u64, u64::wrapping_add)
                    .hash(&mut h);
            } else if op.is_commutative() {
                structural_hash(l)
                    .wrapping_add(structural_hash(r))
                    .hash(&mut h);
            } else {
                structural_hash(l).hash(&mut h);
                structural_hash(r).hash(&mut h);
            }
        }
        Node::Index(a, b) | Node::Conditional(a, b) | Node::Else(a, b) => {
            structural_hash(a).hash(&mut h);
            structural_hash(b).hash(&mut h);
        }
        Node::Concat(parts) => {
            for p in parts {
                structural_hash(p).hash(&mut h);
            }
        }
        Node::Call(call) => {
            call.namespace.uri.hash(&mut h);
            call.name.hash(&mut h);
            for a in &call.args {
                structural_hash(a).hash(&mut h);
            }
        }
    }
    h.finish()
}

fn hash_value(v: &Value, h: &mut DefaultHasher) {
    std::mem::discriminant(v).hash(h);
    match v {
        Value::Null => {}
        Value::Bool(b) => b.hash(h),
        Value::Int(n) => n.hash(h),
        // 0.0 and -0.0 are equal, so they must hash alike.
        Value::Float(x) if *x == 0.0 => 0u64.hash(h),
        Value::Float(x) => x.to_bits().hash(h),
        Value::Str(s) => s.hash(h),
        Value::Host(r) => r.addr().hash(h),
    }
}
