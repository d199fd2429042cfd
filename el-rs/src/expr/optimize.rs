//! Constant folding and algebraic simplification.
//!
//! [`Node::optimize`] rebuilds the tree bottom-up.  A node whose children
//! all became constants is evaluated and replaced by the result; if that
//! evaluation fails the node is kept as-is, so optimizing never fails.
//! Identities such as `x + 0 → x` are applied afterwards.
//!
//! Never folded: `length`, `sum`, function calls, assignment targets, and
//! anything touching a host object (its contents may change between
//! evaluations).

use super::{BinaryOp, FunctionCall, Node, UnaryOp};
use crate::value::Value;

impl Node {
    /// Return an equivalent, simplified tree.
    pub fn optimize(&self) -> Node {
        match self {
            Node::Constant(_) | Node::Variable(_) => self.clone(),
            Node::Unary(UnaryOp::Group, x) => x.optimize(),
            Node::Unary(op @ (UnaryOp::Length | UnaryOp::Sum), x) => Node::unary(*op, x.optimize()),
            Node::Unary(UnaryOp::Not, x) => {
                let x = x.optimize();
                if x.is_constant() {
                    return fold(Node::unary(UnaryOp::Not, x));
                }
                invert(&x).unwrap_or_else(|| Node::unary(UnaryOp::Not, x))
            }
            Node::Unary(op, x) => fold(Node::unary(*op, x.optimize())),
            Node::Binary(BinaryOp::Assign, target, value) => {
                Node::binary(BinaryOp::Assign, optimize_target(target), value.optimize())
            }
            Node::Binary(op, l, r) => optimize_binary(*op, l.optimize(), r.optimize()),
            Node::Index(base, key) => fold(Node::index(base.optimize(), key.optimize())),
            Node::Conditional(cond, branches) => {
                let cond = cond.optimize();
                if let (Some(v), Node::Else(then, otherwise)) = (cond.as_constant(), branches.as_ref()) {
                    if let Ok(taken) = v.as_boolean() {
                        return if taken { then.optimize() } else { otherwise.optimize() };
                    }
                }
                Node::Conditional(Box::new(cond), Box::new(branches.optimize()))
            }
            Node::Else(then, otherwise) => {
                Node::Else(Box::new(then.optimize()), Box::new(otherwise.optimize()))
            }
            Node::Concat(parts) => optimize_concat(parts),
            Node::Call(call) => Node::Call(FunctionCall {
                prefix: call.prefix.clone(),
                namespace: call.namespace.clone(),
                name: call.name.clone(),
                args: call.args.iter().map(Node::optimize).collect(),
            }),
        }
    }

    /// The logical negation of this node as a different operator, when it
    /// has one: `a > b` ↦ `a <= b`, `a && b` ↦ `!a || !b`, …
    pub fn inverse(&self) -> Option<Node> {
        invert(self)
    }
}

/// Evaluate `node` if every child is a plain constant; keep it on failure.
fn fold(node: Node) -> Node {
    let foldable = node.children().iter().all(|c| match c.as_constant() {
        Some(Value::Host(_)) | None => false,
        Some(_) => true,
    });
    if !foldable {
        return node;
    }
    match node.evaluate() {
        Ok(v) => Node::Constant(v),
        Err(_) => node,
    }
}

fn optimize_target(target: &Node) -> Node {
    match target {
        Node::Unary(UnaryOp::Group, x) => optimize_target(x),
        Node::Index(base, key) => Node::index(base.optimize(), key.optimize()),
        other => other.optimize(),
    }
}

fn invert(node: &Node) -> Option<Node> {
    match node {
        Node::Binary(BinaryOp::And, l, r) => Some(Node::binary(BinaryOp::Or, negated(l), negated(r))),
        Node::Binary(BinaryOp::Or, l, r) => Some(Node::binary(BinaryOp::And, negated(l), negated(r))),
        Node::Binary(op, l, r) => op
            .inverse()
            .map(|inv| Node::Binary(inv, l.clone(), r.clone())),
        _ => None,
    }
}

fn negated(node: &Node) -> Node {
    invert(node).unwrap_or_else(|| Node::unary(UnaryOp::Not, node.clone()))
}

fn optimize_binary(op: BinaryOp, l: Node, r: Node) -> Node {
    let node = fold(Node::binary(op, l, r));
    let Node::Binary(op, l, r) = node else {
        return node;
    };
    let (l, r) = (*l, *r);

    match op {
        BinaryOp::Add if is_int(&r, 0) => l,
        BinaryOp::Add if is_int(&l, 0) => r,
        BinaryOp::Sub if is_int(&r, 0) => l,
        BinaryOp::Sub if is_int(&l, 0) => Node::unary(UnaryOp::Negate, r),
        BinaryOp::Mul if is_int(&l, 0) || is_int(&r, 0) => Node::constant(0i64),
        BinaryOp::Mul if is_int(&r, 1) => l,
        BinaryOp::Mul if is_int(&l, 1) => r,
        BinaryOp::Div if is_int(&r, 1) => l,
        BinaryOp::Div if is_int(&l, 0) => Node::constant(0i64),
        BinaryOp::Join if is_blank(&r) => l,
        BinaryOp::Join if is_blank(&l) => r,
        BinaryOp::And => match (constant_bool(&l), constant_bool(&r)) {
            (_, Some(true)) => l,
            (Some(true), _) => r,
            (Some(false), _) | (_, Some(false)) => Node::constant(false),
            _ => Node::binary(op, l, r),
        },
        BinaryOp::Or => match (constant_bool(&l), constant_bool(&r)) {
            (_, Some(false)) => l,
            (Some(false), _) => r,
            (Some(true), _) | (_, Some(true)) => Node::constant(true),
            _ => Node::binary(op, l, r),
        },
        _ => Node::binary(op, l, r),
    }
}

fn is_int(node: &Node, n: i64) -> bool {
    matches!(node.as_constant(), Some(Value::Int(v)) if *v == n)
}

fn is_blank(node: &Node) -> bool {
    match node.as_constant() {
        Some(Value::Null) => true,
        Some(Value::Str(s)) => s.is_empty(),
        _ => false,
    }
}

fn constant_bool(node: &Node) -> Option<bool> {
    node.as_constant().and_then(|v| v.as_boolean().ok())
}

/// Merge adjacent constant fragments and drop empty ones.
fn optimize_concat(parts: &[Node]) -> Node {
    let mut out: Vec<Node> = Vec::with_capacity(parts.len());
    for part in parts.iter().map(Node::optimize) {
        let text = match part.as_constant() {
            Some(Value::Host(_)) | None => None,
            Some(v) => v.as_string().ok(),
        };
        match text {
            Some(s) if s.is_empty() => {}
            Some(s) => match out.last_mut() {
                Some(Node::Constant(Value::Str(prev))) => prev.push_str(&s),
                _ => out.push(Node::Constant(Value::Str(s))),
            },
            None => out.push(part),
        }
    }
    if out.is_empty() {
        return Node::constant("");
    }
    if out.len() == 1 && matches!(out[0], Node::Constant(Value::Str(_))) {
        return out.remove(0);
    }
    Node::Concat(out)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
