//! An embeddable expression language.
//!
//! Text such as `user.age >= 18 ? 'adult' : 'minor'` is parsed once into a
//! [`Node`] tree, optionally simplified with [`optimize`], and evaluated any
//! number of times.  Free identifiers are bound at parse time through a
//! [`Resolver`]; [`Bindings`] is a ready-made one.
//!
//! ```
//! use el::{parse, substitute, Bindings, Value};
//!
//! let vars = Bindings::new().with("text", "Hello").with("number", 3i64);
//! let tree = parse("number * 2 + 1", &vars).unwrap();
//! assert_eq!(tree.evaluate(), Ok(Value::Int(7)));
//!
//! let out = substitute("text=${text}, number=${number*2}.", &vars).unwrap();
//! assert_eq!(out, "text=Hello, number=6.");
//! ```
//!
//! Which grammar extensions are recognised is controlled by
//! [`ParserConfig`]; the plain entry points use [`ParserConfig::default`],
//! which enables all of them.

pub mod builtins;
pub mod config;
pub mod error;
pub mod expr;
pub mod function;
pub mod host;
pub mod parser;
pub mod resolve;
pub mod scanner;
pub mod substitute;
pub mod value;
pub mod wildcard;

pub use builtins::StringFunctions;
pub use config::{ConfigError, ParserConfig};
pub use error::{Error, EvalError, ParseError};
pub use expr::{BinaryOp, FunctionCall, Node, UnaryOp};
pub use function::{Function, FunctionCache, FunctionProvider, StaticProvider};
pub use host::{HostBean, HostList, HostMap, HostObject, HostRef, MapAccess, SequenceAccess};
pub use parser::parse_with;
pub use resolve::{Bindings, Namespace, NoVariables, Resolver, Variable, VariableRef};
pub use substitute::{parse_substitution_with, substitute_with};
pub use value::Value;

/// Parse `text` with every grammar extension enabled.
pub fn parse<R: Resolver + ?Sized>(text: &str, resolver: &R) -> Result<Node, ParseError> {
    parse_with(text, resolver, &ParserConfig::default())
}

/// Evaluate a parsed tree against the variables bound when it was parsed.
pub fn evaluate(tree: &Node) -> Result<Value, EvalError> {
    tree.evaluate()
}

/// Return a simplified copy of `tree` that evaluates to the same value.
pub fn optimize(tree: &Node) -> Node {
    let optimized = tree.optimize();
    tracing::debug!(before = %tree, after = %optimized, "optimized expression");
    optimized
}

/// Replace every `${expr}` in `text` with the string form of its value.
pub fn substitute<R: Resolver + ?Sized>(text: &str, resolver: &R) -> Result<String, Error> {
    substitute_with(text, resolver, &ParserConfig::default())
}

/// Parse `text` into a tree that performs `${…}` substitution when
/// evaluated.
pub fn parse_substitution<R: Resolver + ?Sized>(
    text: &str,
    resolver: &R,
) -> Result<Node, ParseError> {
    parse_substitution_with(text, resolver, &ParserConfig::default())
}
