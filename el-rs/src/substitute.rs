//! `${…}` substitution in literal text.
//!
//! | Text                     | Meaning                                        |
//! |--------------------------|------------------------------------------------|
//! | anything outside `${ }`  | copied literally                               |
//! | `${expr}`                | `expr` parsed as a full expression             |
//!
//! [`substitute_with`] evaluates each expression immediately and splices its
//! string form into the output.  [`parse_substitution_with`] instead builds
//! a tree that does the same work every time it is evaluated.

use crate::config::ParserConfig;
use crate::error::{Error, ParseError};
use crate::expr::Node;
use crate::parser::parse_embedded;
use crate::resolve::Resolver;
use crate::value::Value;

/// One piece of substituted text.
enum Fragment<'t> {
    Literal(&'t str),
    Expr(Node),
}

/// Split `text` into literal fragments and parsed expressions, in order.
/// Empty literals are omitted.
fn fragments<'t, R: Resolver + ?Sized>(
    text: &'t str,
    resolver: &R,
    config: &ParserConfig,
) -> Result<Vec<Fragment<'t>>, ParseError> {
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(offset) = text[pos..].find("${") {
        let open = pos + offset;
        if open > pos {
            out.push(Fragment::Literal(&text[pos..open]));
        }
        let (node, end) = parse_embedded(text, open + 2, resolver, config)?;
        if !text[end..].starts_with('}') {
            return Err(ParseError::Unmatched {
                open: '{',
                pos: text[..open].chars().count() + 1,
            });
        }
        out.push(Fragment::Expr(node));
        pos = end + 1;
    }
    if pos < text.len() {
        out.push(Fragment::Literal(&text[pos..]));
    }
    Ok(out)
}

/// Replace every `${expr}` in `text` with the string form of its value.
pub fn substitute_with<R: Resolver + ?Sized>(
    text: &str,
    resolver: &R,
    config: &ParserConfig,
) -> Result<String, Error> {
    let mut out = String::with_capacity(text.len());
    for fragment in fragments(text, resolver, config)? {
        match fragment {
            Fragment::Literal(s) => out.push_str(s),
            Fragment::Expr(node) => out.push_str(&node.evaluate()?.as_string()?),
        }
    }
    Ok(out)
}

/// Parse `text` into a tree that performs the substitution when evaluated.
///
/// Text without any `${` becomes a string constant; a text that is exactly
/// one `${expr}` becomes that expression, keeping its value's type.
pub fn parse_substitution_with<R: Resolver + ?Sized>(
    text: &str,
    resolver: &R,
    config: &ParserConfig,
) -> Result<Node, ParseError> {
    let mut parts: Vec<Node> = fragments(text, resolver, config)?
        .into_iter()
        .map(|f| match f {
            Fragment::Literal(s) => Node::Constant(Value::Str(s.to_owned())),
            Fragment::Expr(node) => node,
        })
        .collect();
    Ok(match parts.len() {
        0 => Node::constant(""),
        1 => parts.remove(0),
        _ => Node::Concat(parts),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;
    use crate::resolve::{Bindings, NoVariables};

    fn bindings() -> Bindings {
        Bindings::new().with("text", "Hello").with("number", 3i64)
    }

    #[test]
    fn eager() {
        let b = bindings();
        let out = substitute_with("text=${text}, number=${number*2}.", &b, &ParserConfig::default());
        assert_eq!(out, Ok("text=Hello, number=6.".to_string()));
    }

    #[test]
    fn no_substitution() {
        let cfg = ParserConfig::default();
        assert_eq!(substitute_with("plain $ {x}", &NoVariables, &cfg), Ok("plain $ {x}".into()));
        assert_eq!(substitute_with("", &NoVariables, &cfg), Ok(String::new()));
    }

    #[test]
    fn null_substitutes_as_empty() {
        assert_eq!(
            substitute_with("[${null}]", &NoVariables, &ParserConfig::default()),
            Ok("[]".into())
        );
    }

    #[test]
    fn nested_braces_in_strings() {
        assert_eq!(
            substitute_with("${'}' # 'x'}!", &NoVariables, &ParserConfig::default()),
            Ok("}x!".into())
        );
    }

    #[test]
    fn unterminated() {
        let err = substitute_with("ab${1 + 2", &NoVariables, &ParserConfig::default());
        assert_eq!(err, Err(Error::Parse(ParseError::Unmatched { open: '{', pos: 3 })));
        let err = parse_substitution_with("${", &NoVariables, &ParserConfig::default());
        assert_eq!(err.unwrap_err(), ParseError::UnexpectedEnd { pos: 2 });
    }

    #[test]
    fn eval_errors_surface() {
        let err = substitute_with("${-true}", &NoVariables, &ParserConfig::default());
        assert!(matches!(err, Err(Error::Eval(EvalError::Negate { .. }))));
    }

    #[test]
    fn lazy_tree_shapes() {
        let b = bindings();
        let cfg = ParserConfig::default();
        let n = parse_substitution_with("just text", &b, &cfg).unwrap();
        assert_eq!(n.as_constant(), Some(&Value::from("just text")));

        let n = parse_substitution_with("", &b, &cfg).unwrap();
        assert_eq!(n.as_constant(), Some(&Value::from("")));

        let n = parse_substitution_with("${number}", &b, &cfg).unwrap();
        assert_eq!(n.evaluate(), Ok(Value::Int(3)));

        let n = parse_substitution_with("${text}, ${text}", &b, &cfg).unwrap();
        assert!(matches!(&n, Node::Concat(parts) if parts.len() == 3));
        assert_eq!(n.evaluate(), Ok(Value::from("Hello, Hello")));
    }

    #[test]
    fn lazy_tree_sees_later_bindings() {
        let b = bindings();
        let n = parse_substitution_with("n=${number}", &b, &ParserConfig::default()).unwrap();
        b.set("number", 4i64);
        assert_eq!(n.evaluate(), Ok(Value::from("n=4")));
    }
}
