//! Expression trees.
//!
//! A [`Node`] is built once by the parser, optionally rewritten once by
//! [`Node::optimize`] (which returns a new tree), and then evaluated any
//! number of times with [`Node::evaluate`].  Nodes are never mutated after
//! construction, so a finished tree can be shared between threads as long
//! as its variables and host objects allow it.
//!
//! Operator table (loosest → tightest):
//!
//! | Priority | Operators                                   | Assoc. |
//! |----------|---------------------------------------------|--------|
//! | −1       | `=`                                         | right  |
//! | 0        | `?` `:`                                     | right  |
//! | 1        | `\|\|` `or`                                 | left   |
//! | 2        | `&&` `and`                                  | left   |
//! | 3        | `==` `eq` `!=` `ne` `~=`                    | left   |
//! | 4        | `<` `lt` `<=` `le` `>` `gt` `>=` `ge`       | left   |
//! | 5        | `+` `-` `#`                                 | left   |
//! | 6        | `*` `/` `div` `%` `mod`                     | left   |
//! | 7        | prefix `-` `!` `not` `empty` `toupper` `tolower` `length` `sum` | — |
//! | 8        | `( … )`                                     | —      |
//! | 9        | `.name` `[key]`                             | left   |

pub mod equality;
pub mod eval;
pub mod optimize;

use std::fmt;

use crate::resolve::{Namespace, VariableRef};
use crate::scanner::is_identifier;
use crate::value::{format_double, Value};

// ── Operators ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
    Not,
    Empty,
    ToUpper,
    ToLower,
    Length,
    Sum,
    /// Parentheses.  Kept in the parsed tree so it prints as written;
    /// the optimizer removes it.
    Group,
}

impl UnaryOp {
    pub fn priority(self) -> i32 {
        match self {
            UnaryOp::Group => 8,
            _ => 7,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
            UnaryOp::Empty => "empty",
            UnaryOp::ToUpper => "toupper",
            UnaryOp::ToLower => "tolower",
            UnaryOp::Length => "length",
            UnaryOp::Sum => "sum",
            UnaryOp::Group => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Assign,
    Or,
    And,
    Eq,
    Ne,
    Match,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Join,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn priority(self) -> i32 {
        match self {
            BinaryOp::Assign => -1,
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Match => 3,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 4,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Join => 5,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 6,
        }
    }

    pub fn is_right_assoc(self) -> bool {
        self == BinaryOp::Assign
    }

    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Add | BinaryOp::Mul
        )
    }

    pub fn is_associative(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Mul)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Assign => "=",
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Match => "~=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Join => "#",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }

    /// The operator computing the logical negation, for comparisons and
    /// equality.
    pub fn inverse(self) -> Option<BinaryOp> {
        Some(match self {
            BinaryOp::Eq => BinaryOp::Ne,
            BinaryOp::Ne => BinaryOp::Eq,
            BinaryOp::Lt => BinaryOp::Ge,
            BinaryOp::Ge => BinaryOp::Lt,
            BinaryOp::Gt => BinaryOp::Le,
            BinaryOp::Le => BinaryOp::Gt,
            _ => return None,
        })
    }
}

// ── Nodes ─────────────────────────────────────────────────────────────────────

/// A resolved function call.
#[derive(Debug, Clone)]
pub struct FunctionCall {
    /// Prefix as written (`""` for unqualified calls).
    pub prefix: String,
    pub namespace: Namespace,
    pub name: String,
    pub args: Vec<Node>,
}

#[derive(Debug, Clone)]
pub enum Node {
    Constant(Value),
    Variable(VariableRef),
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    /// `base.key` or `base[key]`.
    Index(Box<Node>, Box<Node>),
    /// `cond ? …`; the right child is always an [`Node::Else`].
    Conditional(Box<Node>, Box<Node>),
    /// `then : otherwise`, only meaningful under a conditional.
    Else(Box<Node>, Box<Node>),
    /// String concatenation of every child, produced by substitution.
    Concat(Vec<Node>),
    Call(FunctionCall),
}

impl Node {
    pub fn constant(v: impl Into<Value>) -> Node {
        Node::Constant(v.into())
    }

    pub fn unary(op: UnaryOp, operand: Node) -> Node {
        Node::Unary(op, Box::new(operand))
    }

    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
        Node::Binary(op, Box::new(left), Box::new(right))
    }

    pub fn index(base: Node, key: Node) -> Node {
        Node::Index(Box::new(base), Box::new(key))
    }

    pub fn conditional(cond: Node, then: Node, otherwise: Node) -> Node {
        Node::Conditional(
            Box::new(cond),
            Box::new(Node::Else(Box::new(then), Box::new(otherwise))),
        )
    }

    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Node::Constant(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Node::Constant(_))
    }

    /// This node with any enclosing parentheses removed.
    pub fn ungrouped(&self) -> &Node {
        let mut node = self;
        while let Node::Unary(UnaryOp::Group, inner) = node {
            node = inner;
        }
        node
    }

    /// Immediate children, left to right.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Constant(_) | Node::Variable(_) => Vec::new(),
            Node::Unary(_, x) => vec![x],
            Node::Binary(_, l, r)
            | Node::Index(l, r)
            | Node::Conditional(l, r)
            | Node::Else(l, r) => vec![l, r],
            Node::Concat(parts) => parts.iter().collect(),
            Node::Call(call) => call.args.iter().collect(),
        }
    }
}

// ── Printing ──────────────────────────────────────────────────────────────────

/// Re-parseable text under the default parser configuration.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Constant(v) => write_constant(f, v),
            Node::Variable(var) => f.write_str(var.name()),
            Node::Unary(UnaryOp::Group, x) => write!(f, "({x})"),
            Node::Unary(UnaryOp::Negate, x) => write!(f, "(-{x})"),
            Node::Unary(UnaryOp::Not, x) => write!(f, "(!{x})"),
            Node::Unary(op, x) => write!(f, "({} {x})", op.symbol()),
            Node::Binary(op, l, r) => write!(f, "({l} {} {r})", op.symbol()),
            Node::Index(base, key) => match key.as_constant() {
                Some(Value::Str(name)) if is_identifier(name) => write!(f, "{base}.{name}"),
                _ => write!(f, "{base}[{key}]"),
            },
            Node::Conditional(c, branches) => match branches.as_ref() {
                Node::Else(t, e) => write!(f, "({c} ? {t} : {e})"),
                other => write!(f, "({c} ? {other})"),
            },
            Node::Else(t, e) => write!(f, "({t} : {e})"),
            Node::Concat(parts) => {
                f.write_str("(''")?;
                for p in parts {
                    write!(f, " # {p}")?;
                }
                f.write_str(")")
            }
            Node::Call(call) => {
                if call.prefix.is_empty() {
                    write!(f, "{}(", call.name)?;
                } else {
                    write!(f, "{}:{}(", call.prefix, call.name)?;
                }
                for (i, a) in call.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{a}")?;
                }
                f.write_str(")")
            }
        }
    }
}

fn write_constant(f: &mut fmt::Formatter<'_>, v: &Value) -> fmt::Result {
    match v {
        Value::Str(s) => {
            f.write_str("'")?;
            for c in s.chars() {
                if c == '\'' || c == '\\' {
                    f.write_str("\\")?;
                }
                write!(f, "{c}")?;
            }
            f.write_str("'")
        }
        Value::Int(i64::MIN) => f.write_str("(-9223372036854775807 - 1)"),
        Value::Int(n) if *n < 0 => write!(f, "(-{})", n.unsigned_abs()),
        Value::Float(x) if x.is_nan() => f.write_str("(0.0 / 0.0)"),
        Value::Float(x) if x.is_infinite() => {
            f.write_str(if *x > 0.0 { "(1.0 / 0.0)" } else { "(-1.0 / 0.0)" })
        }
        Value::Float(x) if x.is_sign_negative() => write!(f, "(-{})", format_double(-x)),
        other => write!(f, "{other}"),
    }
}
