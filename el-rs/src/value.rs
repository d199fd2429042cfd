//! Runtime value type and coercion rules.
//!
//! Values are dynamically typed.  Operators decide how to treat their
//! operands by coercing through the `as_*` methods below, each of which is a
//! pure function of the value and fails with a target-specific
//! [`EvalError`] when no conversion exists.
//!
//! | From \ To | boolean            | long / int        | double           | string        |
//! |-----------|--------------------|-------------------|------------------|---------------|
//! | `Null`    | `false`            | `0`               | `0.0`            | `""`          |
//! | `Bool`    | itself             | error             | error            | `true`/`false`|
//! | `Int`     | error              | itself            | widened          | decimal       |
//! | `Float`   | error              | error             | itself           | canonical     |
//! | `Str`     | `"true"` (any case)| parsed, `""`→0    | parsed, `""`→0   | itself        |
//! | `Host`    | error              | error             | error            | host text     |

use std::fmt;

use crate::error::EvalError;
use crate::host::HostRef;

/// A runtime value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Host(HostRef),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Host(a), Value::Host(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => f.write_str(&format_double(*x)),
            Value::Str(s) => write!(f, "{s}"),
            Value::Host(h) => match h.object().to_text() {
                Some(text) => f.write_str(&text),
                None => write!(f, "{h:?}"),
            },
        }
    }
}

impl Value {
    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Value::Str(s) => format!("string '{s}'"),
            Value::Host(h) => format!("host object {h:?}"),
            other => format!("{} {other}", other.type_name()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "long",
            Value::Float(_) => "double",
            Value::Str(_) => "string",
            Value::Host(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Fixed-width integer operand (never a float or a string).
    pub fn is_long_operand(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    /// A float, or a string that would coerce to one.
    pub fn is_float_operand(&self) -> bool {
        match self {
            Value::Float(_) => true,
            Value::Str(s) => is_float_like(s),
            _ => false,
        }
    }

    // ── Coercions ─────────────────────────────────────────────────────────────

    /// Coerce to boolean.
    ///
    /// A non-empty string that is not `"true"` (ignoring case) is `false`
    /// rather than an error.
    pub fn as_boolean(&self) -> Result<bool, EvalError> {
        match self {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(*b),
            Value::Str(s) => Ok(!s.is_empty() && s.eq_ignore_ascii_case("true")),
            other => Err(EvalError::BooleanCoercion {
                value: other.describe(),
            }),
        }
    }

    /// Coerce to `i64`.
    pub fn as_long(&self) -> Result<i64, EvalError> {
        match self {
            Value::Null => Ok(0),
            Value::Int(n) => Ok(*n),
            Value::Str(s) if s.is_empty() => Ok(0),
            Value::Str(s) => s.parse().map_err(|_| EvalError::LongCoercion {
                value: self.describe(),
            }),
            other => Err(EvalError::LongCoercion {
                value: other.describe(),
            }),
        }
    }

    /// Coerce to `i32`, truncating wider integers.
    pub fn as_int(&self) -> Result<i32, EvalError> {
        match self {
            Value::Null => Ok(0),
            Value::Int(n) => Ok(*n as i32),
            Value::Str(s) if s.is_empty() => Ok(0),
            Value::Str(s) => s.parse().map_err(|_| EvalError::IntCoercion {
                value: self.describe(),
            }),
            other => Err(EvalError::IntCoercion {
                value: other.describe(),
            }),
        }
    }

    /// Coerce to `f64`.
    pub fn as_double(&self) -> Result<f64, EvalError> {
        match self {
            Value::Null => Ok(0.0),
            Value::Int(n) => Ok(*n as f64),
            Value::Float(x) => Ok(*x),
            Value::Str(s) if s.is_empty() => Ok(0.0),
            Value::Str(s) => {
                // Only decimal notation; `inf` and `nan` spellings are rejected.
                let t = s.trim();
                let decimal = t
                    .bytes()
                    .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
                match t.parse() {
                    Ok(x) if decimal => Ok(x),
                    _ => Err(EvalError::DoubleCoercion {
                        value: self.describe(),
                    }),
                }
            }
            other => Err(EvalError::DoubleCoercion {
                value: other.describe(),
            }),
        }
    }

    /// Coerce to a string; `Null` becomes `""`.
    pub fn as_string(&self) -> Result<String, EvalError> {
        match self {
            Value::Null => Ok(String::new()),
            Value::Str(s) => Ok(s.clone()),
            Value::Host(h) => h.object().to_text().ok_or_else(|| EvalError::StringCoercion {
                value: self.describe(),
            }),
            other => Ok(other.to_string()),
        }
    }
}

/// Whether a string operand forces floating-point arithmetic.
pub fn is_float_like(s: &str) -> bool {
    s.contains(['.', 'e', 'E'])
}

/// Canonical text for a double: at least one fractional digit, scientific
/// notation outside `[1e-3, 1e7)`.
pub fn format_double(x: f64) -> String {
    if x.is_nan() {
        return "NaN".into();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity".into() } else { "-Infinity".into() };
    }
    let abs = x.abs();
    if x == 0.0 || (1e-3..1e7).contains(&abs) {
        let s = x.to_string();
        if s.contains('.') {
            s
        } else {
            format!("{s}.0")
        }
    } else {
        // `{:E}` renders `1E10` / `1.5E-7`; ensure a fractional digit.
        let s = format!("{x:E}");
        match s.split_once('E') {
            Some((mantissa, exp)) if !mantissa.contains('.') => format!("{mantissa}.0E{exp}"),
            _ => s,
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<HostRef> for Value {
    fn from(h: HostRef) -> Self {
        Value::Host(h)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostList;

    #[test]
    fn display_double() {
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(3.25).to_string(), "3.25");
        assert_eq!(Value::Float(1e10).to_string(), "1.0E10");
        assert_eq!(Value::Float(1.5e-7).to_string(), "1.5E-7");
        assert_eq!(Value::Float(-0.5).to_string(), "-0.5");
        assert_eq!(Value::Float(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Float(f64::NEG_INFINITY).to_string(), "-Infinity");
    }

    #[test]
    fn as_boolean() {
        assert_eq!(Value::Null.as_boolean(), Ok(false));
        assert_eq!(Value::Bool(true).as_boolean(), Ok(true));
        assert_eq!(Value::from("TRUE").as_boolean(), Ok(true));
        assert_eq!(Value::from("").as_boolean(), Ok(false));
        assert!(Value::Int(1).as_boolean().is_err());
    }

    #[test]
    fn as_boolean_unrecognised_string_is_false() {
        // "yes" is not an error, just false.
        assert_eq!(Value::from("yes").as_boolean(), Ok(false));
    }

    #[test]
    fn as_long() {
        assert_eq!(Value::Null.as_long(), Ok(0));
        assert_eq!(Value::from("").as_long(), Ok(0));
        assert_eq!(Value::from("-42").as_long(), Ok(-42));
        assert!(matches!(
            Value::from("4x").as_long(),
            Err(EvalError::LongCoercion { .. })
        ));
        assert!(Value::Float(1.0).as_long().is_err());
        assert!(Value::Bool(true).as_long().is_err());
    }

    #[test]
    fn as_int_truncates() {
        assert_eq!(Value::Int(1 << 33 | 5).as_int(), Ok(5));
        assert!(matches!(
            Value::from("x").as_int(),
            Err(EvalError::IntCoercion { .. })
        ));
    }

    #[test]
    fn as_double() {
        assert_eq!(Value::Int(3).as_double(), Ok(3.0));
        assert_eq!(Value::from("2.5").as_double(), Ok(2.5));
        assert_eq!(Value::from("").as_double(), Ok(0.0));
        assert!(matches!(
            Value::from("abc").as_double(),
            Err(EvalError::DoubleCoercion { .. })
        ));
        assert_eq!(Value::from(" 1e3 ").as_double(), Ok(1000.0));
        for word in ["inf", "-Infinity", "NaN", "nan"] {
            assert!(
                matches!(Value::from(word).as_double(), Err(EvalError::DoubleCoercion { .. })),
                "{word} should not coerce"
            );
        }
    }

    #[test]
    fn as_string() {
        assert_eq!(Value::Null.as_string(), Ok(String::new()));
        assert_eq!(Value::Bool(false).as_string(), Ok("false".into()));
        assert_eq!(Value::Int(-7).as_string(), Ok("-7".into()));
        assert!(matches!(
            HostList::new().into_value().as_string(),
            Err(EvalError::StringCoercion { .. })
        ));
    }

    #[test]
    fn float_like() {
        assert!(is_float_like("1.5"));
        assert!(is_float_like("1e3"));
        assert!(!is_float_like("15"));
        assert!(Value::from("2E1").is_float_operand());
        assert!(!Value::Int(2).is_float_operand());
        assert!(Value::Int(2).is_long_operand());
    }

    #[test]
    fn equality_is_by_variant() {
        assert_eq!(Value::Int(1), Value::Int(1));
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Null, Value::from(""));
    }
}
