//! Error types for parsing and evaluation.
//!
//! Parsing and evaluation fail independently: a [`ParseError`] means the
//! text never became a tree, an [`EvalError`] means a tree could not
//! produce a value for the current bindings.  [`Error`] joins the two for
//! entry points (such as [`substitute`](crate::substitute)) that do both.

/// Why a piece of text could not be parsed.
///
/// Every variant carries the character offset into the parsed text at which
/// the problem was detected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected end of expression at {pos}")]
    UnexpectedEnd { pos: usize },

    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unmatched '{open}' opened at {pos}")]
    Unmatched { open: char, pos: usize },

    #[error("unresolved identifier '{name}' at {pos}")]
    UnresolvedIdentifier { name: String, pos: usize },

    #[error("reserved word '{word}' used out of position at {pos}")]
    ReservedWord { word: String, pos: usize },

    #[error("malformed number '{text}' at {pos}")]
    MalformedNumber { text: String, pos: usize },

    #[error("unterminated string literal starting at {pos}")]
    UnterminatedString { pos: usize },

    #[error("unexpected trailing input at {pos}: '{rest}'")]
    TrailingInput { rest: String, pos: usize },

    #[error("'?' without matching ':'")]
    MissingElse,

    #[error("':' without matching '?'")]
    DanglingElse,

    #[error("malformed function call at {pos}: {message}")]
    MalformedCall { message: String, pos: usize },

    #[error("namespace '{uri}' has no function provider (at {pos})")]
    UnknownNamespace { uri: String, pos: usize },
}

/// Why a parsed tree failed to produce a value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("cannot convert {value} to boolean")]
    BooleanCoercion { value: String },

    #[error("cannot convert {value} to int")]
    IntCoercion { value: String },

    #[error("cannot convert {value} to long")]
    LongCoercion { value: String },

    #[error("cannot convert {value} to double")]
    DoubleCoercion { value: String },

    #[error("cannot convert {value} to string")]
    StringCoercion { value: String },

    #[error("cannot negate {value}")]
    Negate { value: String },

    #[error("cannot compare {left} with {right}")]
    Compare { left: String, right: String },

    #[error("cannot index {base} with '{key}': {reason}")]
    Index {
        base: String,
        key: String,
        reason: String,
    },

    #[error("cannot assign to {target}")]
    Assign { target: String },

    #[error("length requires a map or sequence, got {value}")]
    Length { value: String },

    #[error("sum requires a map or sequence, got {value}")]
    Sum { value: String },

    #[error("match operands must be strings, got {value}")]
    Match { value: String },

    #[error("function {name}: {message}")]
    Function { name: String, message: String },

    #[error("integer remainder by zero")]
    DivisionByZero,

    #[error("':' evaluated outside of a conditional")]
    DanglingElse,
}

/// Either half of the pipeline failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}
