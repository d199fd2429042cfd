//! Tree evaluation.
//!
//! Evaluation is a single recursive walk.  Operators coerce their operands
//! through [`Value`]'s `as_*` methods; the first failure aborts the walk.
//! `&&`, `||` and `? :` evaluate only what they need.

use std::cmp::Ordering;

use super::{BinaryOp, FunctionCall, Node, UnaryOp};
use crate::error::EvalError;
use crate::host::{getter_names, setter_name, HostRef};
use crate::value::Value;
use crate::wildcard::wildcard_match;

impl Node {
    /// Evaluate against the variables bound at parse time.
    pub fn evaluate(&self) -> Result<Value, EvalError> {
        match self {
            Node::Constant(v) => Ok(v.clone()),
            Node::Variable(var) => var.get(),
            Node::Unary(op, x) => eval_unary(*op, x),
            Node::Binary(op, l, r) => eval_binary(*op, l, r),
            Node::Index(base, key) => {
                let base = base.evaluate()?;
                let key = key.evaluate()?;
                index_get(&base, &key)
            }
            Node::Conditional(cond, branches) => {
                let taken = cond.evaluate()?.as_boolean()?;
                match branches.as_ref() {
                    Node::Else(then, _) if taken => then.evaluate(),
                    Node::Else(_, otherwise) => otherwise.evaluate(),
                    _ => Err(EvalError::DanglingElse),
                }
            }
            Node::Else(..) => Err(EvalError::DanglingElse),
            Node::Concat(parts) => {
                let mut out = String::new();
                for p in parts {
                    out.push_str(&p.evaluate()?.as_string()?);
                }
                Ok(Value::Str(out))
            }
            Node::Call(call) => eval_call(call),
        }
    }
}

// ── Unary ─────────────────────────────────────────────────────────────────────

fn eval_unary(op: UnaryOp, operand: &Node) -> Result<Value, EvalError> {
    let v = operand.evaluate()?;
    match op {
        UnaryOp::Group => Ok(v),
        UnaryOp::Negate => negate(&v),
        UnaryOp::Not => Ok(Value::Bool(!v.as_boolean()?)),
        UnaryOp::Empty => Ok(Value::Bool(is_empty(&v))),
        UnaryOp::ToUpper => Ok(Value::Str(v.as_string()?.to_uppercase())),
        UnaryOp::ToLower => Ok(Value::Str(v.as_string()?.to_lowercase())),
        UnaryOp::Length => match &v {
            Value::Host(h) => h
                .len()
                .map(|n| Value::Int(n as i64))
                .ok_or_else(|| EvalError::Length { value: v.describe() }),
            _ => Err(EvalError::Length { value: v.describe() }),
        },
        UnaryOp::Sum => sum(&v),
    }
}

pub fn negate(v: &Value) -> Result<Value, EvalError> {
    match v {
        Value::Null => Ok(Value::Int(0)),
        Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
        Value::Float(x) => Ok(Value::Float(-x)),
        Value::Str(_) if v.is_float_operand() => Ok(Value::Float(-v.as_double()?)),
        Value::Str(_) => Ok(Value::Int(v.as_long()?.wrapping_neg())),
        other => Err(EvalError::Negate {
            value: other.describe(),
        }),
    }
}

fn is_empty(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Str(s) => s.is_empty(),
        Value::Host(h) => h.len() == Some(0),
        _ => false,
    }
}

/// Integer total until the first non-integral element; float from then on.
fn sum(v: &Value) -> Result<Value, EvalError> {
    let elements = match v {
        Value::Host(h) => h.elements(),
        _ => None,
    }
    .ok_or_else(|| EvalError::Sum { value: v.describe() })?;

    let mut int_total: i64 = 0;
    let mut float_total: Option<f64> = None;
    for e in elements.iter().filter(|e| !e.is_null()) {
        match float_total.as_mut() {
            Some(total) => *total += e.as_double()?,
            None => match integral(e) {
                Some(n) => int_total = int_total.wrapping_add(n),
                None => float_total = Some(int_total as f64 + e.as_double()?),
            },
        }
    }
    Ok(match float_total {
        Some(x) => Value::Float(x),
        None => Value::Int(int_total),
    })
}

fn integral(v: &Value) -> Option<i64> {
    match v {
        Value::Int(n) => Some(*n),
        Value::Str(s) => s.parse().ok(),
        _ => None,
    }
}

// ── Binary ────────────────────────────────────────────────────────────────────

fn eval_binary(op: BinaryOp, l: &Node, r: &Node) -> Result<Value, EvalError> {
    match op {
        BinaryOp::And => {
            if !l.evaluate()?.as_boolean()? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(r.evaluate()?.as_boolean()?))
        }
        BinaryOp::Or => {
            if l.evaluate()?.as_boolean()? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(r.evaluate()?.as_boolean()?))
        }
        BinaryOp::Assign => {
            let value = r.evaluate()?;
            assign(l, value.clone())?;
            Ok(value)
        }
        _ => {
            let lv = l.evaluate()?;
            let rv = r.evaluate()?;
            apply_binary(op, &lv, &rv)
        }
    }
}

/// Apply a strict (non-short-circuit, non-assigning) operator to two values.
pub fn apply_binary(op: BinaryOp, l: &Value, r: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Mod => arithmetic(op, l, r),
        BinaryOp::Div => {
            if l.is_null() && r.is_null() {
                return Ok(Value::Int(0));
            }
            Ok(Value::Float(l.as_double()? / r.as_double()?))
        }
        BinaryOp::Eq => Ok(Value::Bool(equals(l, r)?)),
        BinaryOp::Ne => Ok(Value::Bool(!equals(l, r)?)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            Ok(Value::Bool(relational(op, l, r)?))
        }
        BinaryOp::Match => Ok(Value::Bool(matches(l, r)?)),
        BinaryOp::Join => {
            let mut s = l.as_string()?;
            s.push_str(&r.as_string()?);
            Ok(Value::Str(s))
        }
        BinaryOp::And => Ok(Value::Bool(l.as_boolean()? && r.as_boolean()?)),
        BinaryOp::Or => Ok(Value::Bool(l.as_boolean()? || r.as_boolean()?)),
        BinaryOp::Assign => Err(EvalError::Assign {
            target: l.describe(),
        }),
    }
}

fn arithmetic(op: BinaryOp, l: &Value, r: &Value) -> Result<Value, EvalError> {
    if l.is_null() && r.is_null() {
        return Ok(Value::Int(0));
    }
    if l.is_float_operand() || r.is_float_operand() {
        let (a, b) = (l.as_double()?, r.as_double()?);
        return Ok(Value::Float(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            _ => a % b,
        }));
    }
    let (a, b) = (l.as_long()?, r.as_long()?);
    Ok(Value::Int(match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        _ => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            a.wrapping_rem(b)
        }
    }))
}

// ── Comparison ────────────────────────────────────────────────────────────────

/// Three-way comparison shared by relational and equality operators.
///
/// `Ok(None)` means at least one side is null (and the two are not equal),
/// or the comparison is unordered (NaN).
pub fn compare(l: &Value, r: &Value) -> Result<Option<Ordering>, EvalError> {
    if l == r {
        return Ok(Some(Ordering::Equal));
    }
    if l.is_null() || r.is_null() {
        return Ok(None);
    }
    if matches!(l, Value::Float(_)) || matches!(r, Value::Float(_)) {
        return Ok(l.as_double()?.partial_cmp(&r.as_double()?));
    }
    if l.is_long_operand() || r.is_long_operand() {
        return Ok(Some(l.as_long()?.cmp(&r.as_long()?)));
    }
    if matches!(l, Value::Str(_)) || matches!(r, Value::Str(_)) {
        return Ok(Some(l.as_string()?.cmp(&r.as_string()?)));
    }
    if let Value::Host(h) = l {
        if let Some(ord) = h.object().compare_to(r) {
            return Ok(Some(ord));
        }
    }
    if let Value::Host(h) = r {
        if let Some(ord) = h.object().compare_to(l) {
            return Ok(Some(ord.reverse()));
        }
    }
    Err(EvalError::Compare {
        left: l.describe(),
        right: r.describe(),
    })
}

fn relational(op: BinaryOp, l: &Value, r: &Value) -> Result<bool, EvalError> {
    let Some(ord) = compare(l, r)? else {
        return Ok(false);
    };
    // (less, equal, greater)
    let (lt, eq, gt) = match op {
        BinaryOp::Gt => (false, false, true),
        BinaryOp::Lt => (true, false, false),
        BinaryOp::Ge => (false, true, true),
        _ => (true, true, false),
    };
    Ok(match ord {
        Ordering::Less => lt,
        Ordering::Equal => eq,
        Ordering::Greater => gt,
    })
}

pub fn equals(l: &Value, r: &Value) -> Result<bool, EvalError> {
    match (l, r) {
        (Value::Null, Value::Null) => Ok(true),
        (Value::Null, _) | (_, Value::Null) => Ok(false),
        _ => match compare(l, r) {
            Ok(ord) => Ok(ord == Some(Ordering::Equal)),
            // Objects with no ordering are simply unequal.
            Err(EvalError::Compare { .. }) => Ok(false),
            Err(e) => Err(e),
        },
    }
}

fn matches(l: &Value, r: &Value) -> Result<bool, EvalError> {
    for v in [l, r] {
        if !matches!(v, Value::Null | Value::Str(_)) {
            return Err(EvalError::Match { value: v.describe() });
        }
    }
    match (l, r) {
        (Value::Str(text), Value::Str(pattern)) => Ok(wildcard_match(text, pattern)),
        _ => Ok(false),
    }
}

// ── Indexing ──────────────────────────────────────────────────────────────────

/// `base[key]`.  Missing entries and out-of-range positions read as null.
pub fn index_get(base: &Value, key: &Value) -> Result<Value, EvalError> {
    if base.is_null() || key.is_null() {
        return Ok(Value::Null);
    }
    let Value::Host(host) = base else {
        return bean_get(base, None, key);
    };
    let obj = host.object();
    if let Some(map) = obj.as_map() {
        return Ok(map.get(&key.as_string()?).unwrap_or_default());
    }
    if let Some(seq) = obj.as_sequence() {
        let i = key.as_long()?;
        return Ok(usize::try_from(i)
            .ok()
            .and_then(|i| seq.get(i))
            .unwrap_or_default());
    }
    bean_get(base, Some(host), key)
}

fn bean_get(base: &Value, host: Option<&HostRef>, key: &Value) -> Result<Value, EvalError> {
    let name = key.as_string()?;
    if let Some(host) = host {
        for accessor in getter_names(&name) {
            if let Some(v) = host.object().property(&accessor) {
                return Ok(v);
            }
        }
    }
    Err(EvalError::Index {
        base: base.describe(),
        key: name,
        reason: "no such property".into(),
    })
}

/// `base[key] = value`.  Unlike reads, writes that cannot land are errors.
pub fn index_set(base: &Value, key: &Value, value: Value) -> Result<(), EvalError> {
    let Value::Host(host) = base else {
        return Err(EvalError::Assign {
            target: format!("{}[{}]", base.describe(), key),
        });
    };
    let obj = host.object();
    if let Some(map) = obj.as_map() {
        map.set(&key.as_string()?, value);
        return Ok(());
    }
    if let Some(seq) = obj.as_sequence() {
        let i = key.as_long()?;
        let in_range = usize::try_from(i).is_ok_and(|i| seq.set(i, value));
        return if in_range {
            Ok(())
        } else {
            Err(EvalError::Index {
                base: base.describe(),
                key: i.to_string(),
                reason: format!("out of range for length {}", seq.len()),
            })
        };
    }
    let name = key.as_string()?;
    obj.set_property(&setter_name(&name), value)
        .unwrap_or_else(|| {
            Err(EvalError::Assign {
                target: format!("{}.{name}", base.describe()),
            })
        })
}

fn assign(target: &Node, value: Value) -> Result<(), EvalError> {
    match target.ungrouped() {
        Node::Variable(var) => var.set(value),
        Node::Index(base, key) => {
            let base = base.evaluate()?;
            let key = key.evaluate()?;
            index_set(&base, &key, value)
        }
        other => Err(EvalError::Assign {
            target: other.to_string(),
        }),
    }
}

// ── Calls ─────────────────────────────────────────────────────────────────────

fn eval_call(call: &FunctionCall) -> Result<Value, EvalError> {
    let args = call
        .args
        .iter()
        .map(Node::evaluate)
        .collect::<Result<Vec<_>, _>>()?;
    call.namespace
        .functions
        .invoke(&call.namespace.provider, &call.name, &args)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostBean, HostList, HostMap};

    fn bin(op: BinaryOp, l: impl Into<Value>, r: impl Into<Value>) -> Result<Value, EvalError> {
        apply_binary(op, &l.into(), &r.into())
    }

    #[test]
    fn arithmetic_kinds() {
        assert_eq!(bin(BinaryOp::Add, 2i64, 3i64), Ok(Value::Int(5)));
        assert_eq!(bin(BinaryOp::Add, 2i64, 0.5), Ok(Value::Float(2.5)));
        assert_eq!(bin(BinaryOp::Mul, "1.5", 2i64), Ok(Value::Float(3.0)));
        assert_eq!(bin(BinaryOp::Sub, "10", 4i64), Ok(Value::Int(6)));
        assert_eq!(bin(BinaryOp::Add, Value::Null, Value::Null), Ok(Value::Int(0)));
        assert_eq!(bin(BinaryOp::Add, Value::Null, 4i64), Ok(Value::Int(4)));
        assert!(matches!(
            bin(BinaryOp::Add, "abc", 1i64),
            Err(EvalError::LongCoercion { .. })
        ));
    }

    #[test]
    fn remainder_truncates() {
        assert_eq!(bin(BinaryOp::Mod, -7i64, 3i64), Ok(Value::Int(-1)));
        assert_eq!(bin(BinaryOp::Mod, 7.5, 2i64), Ok(Value::Float(1.5)));
        assert_eq!(bin(BinaryOp::Mod, 1i64, 0i64), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn division_is_always_float() {
        assert_eq!(bin(BinaryOp::Div, 4i64, 2i64), Ok(Value::Float(2.0)));
        assert_eq!(bin(BinaryOp::Div, Value::Null, Value::Null), Ok(Value::Int(0)));
        assert_eq!(bin(BinaryOp::Div, 1i64, 0i64), Ok(Value::Float(f64::INFINITY)));
    }

    #[test]
    fn negation() {
        assert_eq!(negate(&Value::Null), Ok(Value::Int(0)));
        assert_eq!(negate(&"2.5".into()), Ok(Value::Float(-2.5)));
        assert_eq!(negate(&"3".into()), Ok(Value::Int(-3)));
        assert_eq!(negate(&Value::Int(4)), Ok(Value::Int(-4)));
        assert!(matches!(negate(&Value::Bool(true)), Err(EvalError::Negate { .. })));
    }

    #[test]
    fn relational_truth_table() {
        let t = |op, l: i64, r: i64| bin(op, l, r).unwrap();
        assert_eq!(t(BinaryOp::Gt, 3, 2), Value::Bool(true));
        assert_eq!(t(BinaryOp::Gt, 2, 2), Value::Bool(false));
        assert_eq!(t(BinaryOp::Ge, 2, 2), Value::Bool(true));
        assert_eq!(t(BinaryOp::Lt, 1, 2), Value::Bool(true));
        assert_eq!(t(BinaryOp::Le, 3, 2), Value::Bool(false));
    }

    #[test]
    fn null_is_never_ordered() {
        for op in [BinaryOp::Lt, BinaryOp::Le, BinaryOp::Gt, BinaryOp::Ge] {
            assert_eq!(bin(op, Value::Null, 1i64), Ok(Value::Bool(false)));
            assert_eq!(bin(op, 1i64, Value::Null), Ok(Value::Bool(false)));
        }
        assert_eq!(bin(BinaryOp::Le, Value::Null, Value::Null), Ok(Value::Bool(true)));
    }

    #[test]
    fn string_and_mixed_comparison() {
        assert_eq!(bin(BinaryOp::Gt, "b", "a"), Ok(Value::Bool(true)));
        assert_eq!(bin(BinaryOp::Lt, "10", 9i64), Ok(Value::Bool(false)));
        assert_eq!(bin(BinaryOp::Lt, 1i64, 1.5), Ok(Value::Bool(true)));
        assert!(matches!(
            bin(BinaryOp::Lt, "x", 1i64),
            Err(EvalError::LongCoercion { .. })
        ));
        let a = HostList::new().into_value();
        let b = HostList::new().into_value();
        assert!(matches!(bin(BinaryOp::Lt, a, b), Err(EvalError::Compare { .. })));
    }

    #[test]
    fn equality() {
        assert_eq!(bin(BinaryOp::Eq, Value::Null, Value::Null), Ok(Value::Bool(true)));
        assert_eq!(bin(BinaryOp::Eq, Value::Null, 0i64), Ok(Value::Bool(false)));
        assert_eq!(bin(BinaryOp::Eq, 1i64, 1.0), Ok(Value::Bool(true)));
        assert_eq!(bin(BinaryOp::Eq, "1", 1i64), Ok(Value::Bool(true)));
        assert_eq!(bin(BinaryOp::Ne, "a", "b"), Ok(Value::Bool(true)));
        let a = HostList::new().into_value();
        assert_eq!(bin(BinaryOp::Eq, a.clone(), a), Ok(Value::Bool(true)));
        let (a, b) = (HostList::new().into_value(), HostList::new().into_value());
        assert_eq!(bin(BinaryOp::Eq, a, b), Ok(Value::Bool(false)));
    }

    #[test]
    fn wildcard_operands() {
        assert_eq!(bin(BinaryOp::Match, "abc", "a?c"), Ok(Value::Bool(true)));
        assert_eq!(bin(BinaryOp::Match, Value::Null, "*"), Ok(Value::Bool(false)));
        assert!(matches!(bin(BinaryOp::Match, 1i64, "*"), Err(EvalError::Match { .. })));
    }

    #[test]
    fn join_drops_null() {
        assert_eq!(bin(BinaryOp::Join, Value::Null, "x"), Ok(Value::from("x")));
        assert_eq!(bin(BinaryOp::Join, 1i64, true), Ok(Value::from("1true")));
    }

    #[test]
    fn index_reads() {
        let list = HostList::from_values([10i64, 20]).into_value();
        assert_eq!(index_get(&list, &Value::Int(1)), Ok(Value::Int(20)));
        assert_eq!(index_get(&list, &Value::Int(5)), Ok(Value::Null));
        assert_eq!(index_get(&list, &Value::Int(-1)), Ok(Value::Null));
        assert_eq!(index_get(&list, &Value::Int(1 << 32)), Ok(Value::Null));
        assert_eq!(index_get(&list, &Value::Int(i64::MIN)), Ok(Value::Null));
        assert_eq!(index_get(&list, &"0".into()), Ok(Value::Int(10)));

        let map = HostMap::new().with("k", "v").into_value();
        assert_eq!(index_get(&map, &"k".into()), Ok(Value::from("v")));
        assert_eq!(index_get(&map, &"nope".into()), Ok(Value::Null));

        assert_eq!(index_get(&Value::Null, &"k".into()), Ok(Value::Null));
        assert_eq!(index_get(&map, &Value::Null), Ok(Value::Null));
    }

    #[test]
    fn bean_reads_getter_then_is_getter() {
        let bean = HostBean::new()
            .with("getName", "duke")
            .with("isActive", true)
            .into_value();
        assert_eq!(index_get(&bean, &"name".into()), Ok(Value::from("duke")));
        assert_eq!(index_get(&bean, &"active".into()), Ok(Value::Bool(true)));
        assert!(matches!(
            index_get(&bean, &"missing".into()),
            Err(EvalError::Index { .. })
        ));
        assert!(matches!(
            index_get(&Value::Int(3), &"x".into()),
            Err(EvalError::Index { .. })
        ));
    }

    #[test]
    fn index_writes() {
        let list = HostList::from_values([1i64, 2]).into_value();
        index_set(&list, &Value::Int(0), Value::Int(9)).unwrap();
        assert_eq!(index_get(&list, &Value::Int(0)), Ok(Value::Int(9)));
        assert!(matches!(
            index_set(&list, &Value::Int(2), Value::Int(9)),
            Err(EvalError::Index { .. })
        ));
        // Indices past i32 must not wrap onto a real slot.
        assert!(matches!(
            index_set(&list, &Value::Int(1 << 32), Value::Int(7)),
            Err(EvalError::Index { .. })
        ));
        assert_eq!(index_get(&list, &Value::Int(0)), Ok(Value::Int(9)));

        let bean = HostBean::new().with("getName", "a").into_value();
        index_set(&bean, &"name".into(), "b".into()).unwrap();
        assert_eq!(index_get(&bean, &"name".into()), Ok(Value::from("b")));
        assert!(matches!(
            index_set(&bean, &"other".into(), "b".into()),
            Err(EvalError::Assign { .. })
        ));
        assert!(matches!(
            index_set(&Value::Null, &"k".into(), Value::Null),
            Err(EvalError::Assign { .. })
        ));
    }

    #[test]
    fn sum_and_length() {
        let ints = HostList::from_values([Value::Int(1), Value::Null, Value::from("2")]).into_value();
        assert_eq!(sum(&ints), Ok(Value::Int(3)));
        let mixed = HostList::from_values([Value::Int(1), Value::Float(0.5), Value::Int(2)]).into_value();
        assert_eq!(sum(&mixed), Ok(Value::Float(3.5)));
        let strs = HostList::from_values(["1", "1.5"]).into_value();
        assert_eq!(sum(&strs), Ok(Value::Float(2.5)));
        assert_eq!(sum(&HostList::new().into_value()), Ok(Value::Int(0)));
        assert!(matches!(sum(&Value::Int(1)), Err(EvalError::Sum { .. })));

        let map = HostMap::new().with("a", 1i64).with("b", 2i64).into_value();
        assert_eq!(sum(&map), Ok(Value::Int(3)));
        assert_eq!(
            eval_unary(UnaryOp::Length, &Node::Constant(map)),
            Ok(Value::Int(2))
        );
        assert!(matches!(
            eval_unary(UnaryOp::Length, &Node::constant("abc")),
            Err(EvalError::Length { .. })
        ));
    }

    #[test]
    fn empty_operator() {
        assert!(is_empty(&Value::Null));
        assert!(is_empty(&"".into()));
        assert!(is_empty(&HostList::new().into_value()));
        assert!(!is_empty(&HostList::from_values([1i64]).into_value()));
        assert!(!is_empty(&Value::Int(0)));
    }

    #[test]
    fn conditional_only_evaluates_taken_branch() {
        let failing = Node::binary(BinaryOp::Mod, Node::constant(1i64), Node::constant(0i64));
        let n = Node::conditional(Node::constant(true), Node::constant(1i64), failing.clone());
        assert_eq!(n.evaluate(), Ok(Value::Int(1)));
        let n = Node::conditional(Node::constant(false), failing, Node::constant(2i64));
        assert_eq!(n.evaluate(), Ok(Value::Int(2)));
    }

    #[test]
    fn short_circuit() {
        let failing = Node::binary(BinaryOp::Mod, Node::constant(1i64), Node::constant(0i64));
        let and = Node::binary(BinaryOp::And, Node::constant(false), failing.clone());
        assert_eq!(and.evaluate(), Ok(Value::Bool(false)));
        let or = Node::binary(BinaryOp::Or, Node::constant("TRUE"), failing);
        assert_eq!(or.evaluate(), Ok(Value::Bool(true)));
    }

    #[test]
    fn dangling_else() {
        let e = Node::Else(Box::new(Node::constant(1i64)), Box::new(Node::constant(2i64)));
        assert_eq!(e.evaluate(), Err(EvalError::DanglingElse));
    }

    #[test]
    fn concat_stringifies_parts() {
        let n = Node::Concat(vec![
            Node::constant("n="),
            Node::constant(3i64),
            Node::constant(Value::Null),
            Node::constant(true),
        ]);
        assert_eq!(n.evaluate(), Ok(Value::from("n=3true")));
    }
}
