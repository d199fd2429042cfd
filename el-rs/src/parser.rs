//! Expression parser.
//!
//! One left-to-right pass over the text, driving the [`Scanner`] directly.
//! Operands are parsed as prefix operators, then a primary, then any number
//! of `.name` / `[key]` postfixes.  Binary operators use two stacks, one of
//! operands and one of pending operators.  A new operator first pops every
//! pending operator that binds at least as tightly, combining the top two
//! operands each time, and is then pushed.  Right-associative operators
//! (`=`, `?`, `:`) do not pop an equal-priority neighbour.
//!
//! `-` directly followed by `9223372036854775808` reads as the single
//! literal `i64::MIN`, whose magnitude has no positive `i64` form.
//!
//! Identifiers are resolved while parsing; an unknown name is a parse error.
//!
//! `?` and `:` are parsed as independent operators and then checked: every
//! `?` must have a `:` as its right operand, and a `:` may appear nowhere
//! else.  A conditional nested in a then-branch therefore needs parentheses.

use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::expr::{BinaryOp, FunctionCall, Node, UnaryOp};
use crate::resolve::Resolver;
use crate::scanner::Scanner;
use crate::value::Value;

/// Parse `text` as a single expression.
pub fn parse_with<R: Resolver + ?Sized>(
    text: &str,
    resolver: &R,
    config: &ParserConfig,
) -> Result<Node, ParseError> {
    let mut parser = Parser::new(Scanner::new(text), resolver, *config);
    let node = parser.parse_expression()?;
    parser.sc.skip_ws();
    if !parser.sc.at_end() {
        return Err(ParseError::TrailingInput {
            rest: parser.sc.rest().to_owned(),
            pos: parser.sc.char_pos(),
        });
    }
    parser.check(&node)?;
    tracing::trace!(len = text.len(), ?config, "parsed expression");
    Ok(node)
}

/// Parse one expression starting at byte offset `start`, stopping at the
/// first token that cannot continue it.
///
/// Returns the tree and the byte offset after it (and any trailing
/// whitespace).
pub fn parse_embedded<R: Resolver + ?Sized>(
    text: &str,
    start: usize,
    resolver: &R,
    config: &ParserConfig,
) -> Result<(Node, usize), ParseError> {
    let mut parser = Parser::new(Scanner::at(text, start), resolver, *config);
    let node = parser.parse_expression()?;
    parser.check(&node)?;
    parser.sc.skip_ws();
    Ok((node, parser.sc.byte_pos()))
}

// ── Operators ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Infix {
    Binary(BinaryOp),
    Question,
    Colon,
}

impl Infix {
    fn priority(self) -> i32 {
        match self {
            Infix::Binary(op) => op.priority(),
            Infix::Question | Infix::Colon => 0,
        }
    }

    fn is_right_assoc(self) -> bool {
        match self {
            Infix::Binary(op) => op.is_right_assoc(),
            Infix::Question | Infix::Colon => true,
        }
    }

    /// Whether a pending `self` must be closed before `next` is pushed.
    fn closes_before(self, next: Infix) -> bool {
        let (p, q) = (self.priority(), next.priority());
        p > q || (p == q && !self.is_right_assoc())
    }

    fn build(self, left: Node, right: Node) -> Node {
        match self {
            Infix::Binary(op) => Node::binary(op, left, right),
            Infix::Question => Node::Conditional(Box::new(left), Box::new(right)),
            Infix::Colon => Node::Else(Box::new(left), Box::new(right)),
        }
    }
}

/// Infix tokens recognised under `config`.  Longer symbols come first so
/// `<=` is not read as `<`.
fn infix_table(config: &ParserConfig) -> Vec<(&'static str, Infix)> {
    use BinaryOp::*;

    let mut t = vec![
        ("==", Infix::Binary(Eq)),
        ("!=", Infix::Binary(Ne)),
        ("<=", Infix::Binary(Le)),
        (">=", Infix::Binary(Ge)),
        ("||", Infix::Binary(Or)),
        ("&&", Infix::Binary(And)),
    ];
    if config.matching {
        t.push(("~=", Infix::Binary(Match)));
    }
    if config.assign {
        t.push(("=", Infix::Binary(Assign)));
    }
    t.extend([
        ("<", Infix::Binary(Lt)),
        (">", Infix::Binary(Gt)),
        ("+", Infix::Binary(Add)),
        ("-", Infix::Binary(Sub)),
        ("*", Infix::Binary(Mul)),
        ("/", Infix::Binary(Div)),
        ("%", Infix::Binary(Mod)),
    ]);
    if config.join {
        t.push(("#", Infix::Binary(Join)));
    }
    if config.conditional {
        t.push(("?", Infix::Question));
        t.push((":", Infix::Colon));
    }
    t.extend([
        ("or", Infix::Binary(Or)),
        ("and", Infix::Binary(And)),
        ("eq", Infix::Binary(Eq)),
        ("ne", Infix::Binary(Ne)),
        ("lt", Infix::Binary(Lt)),
        ("le", Infix::Binary(Le)),
        ("gt", Infix::Binary(Gt)),
        ("ge", Infix::Binary(Ge)),
        ("div", Infix::Binary(Div)),
        ("mod", Infix::Binary(Mod)),
    ]);
    t
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser<'a, R: ?Sized> {
    sc: Scanner<'a>,
    resolver: &'a R,
    config: ParserConfig,
    infix: Vec<(&'static str, Infix)>,
}

impl<'a, R: Resolver + ?Sized> Parser<'a, R> {
    fn new(sc: Scanner<'a>, resolver: &'a R, config: ParserConfig) -> Self {
        Parser {
            sc,
            resolver,
            infix: infix_table(&config),
            config,
        }
    }

    fn unexpected(&self) -> ParseError {
        let pos = self.sc.char_pos();
        match self.sc.peek() {
            None => ParseError::UnexpectedEnd { pos },
            Some(ch) => ParseError::UnexpectedChar { ch, pos },
        }
    }

    fn is_reserved(&self, word: &str) -> bool {
        matches!(
            word,
            "and" | "or" | "not" | "eq" | "ne" | "lt" | "le" | "gt" | "ge" | "div" | "mod"
                | "empty" | "instanceof" | "true" | "false" | "null"
        ) || (self.config.case_convert && matches!(word, "toupper" | "tolower"))
            || (self.config.array_ops && matches!(word, "length" | "sum"))
    }

    // ── Grammar ───────────────────────────────────────────────────────────────

    fn parse_expression(&mut self) -> Result<Node, ParseError> {
        // Invariant: operands.len() == pending.len() + 1.
        let mut operands = vec![self.parse_operand()?];
        let mut pending: Vec<Infix> = Vec::new();

        while let Some(op) = self.try_infix() {
            while let Some(&top) = pending.last() {
                if !top.closes_before(op) {
                    break;
                }
                pending.pop();
                reduce(&mut operands, top);
            }
            pending.push(op);
            operands.push(self.parse_operand()?);
        }
        while let Some(top) = pending.pop() {
            reduce(&mut operands, top);
        }
        operands.pop().ok_or_else(|| self.unexpected())
    }

    fn try_infix(&mut self) -> Option<Infix> {
        let mark = self.sc.mark();
        self.sc.skip_ws();
        for &(token, op) in &self.infix {
            if self.sc.try_literal(token) {
                return Some(op);
            }
        }
        self.sc.reset(mark);
        None
    }

    fn parse_operand(&mut self) -> Result<Node, ParseError> {
        self.sc.skip_ws();
        if let Some(op) = self.try_prefix() {
            if op == UnaryOp::Negate {
                if let Some(min) = self.try_min_magnitude() {
                    return self.parse_postfix(min);
                }
            }
            let operand = self.parse_operand()?;
            return Ok(Node::unary(op, operand));
        }
        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    /// After a `-`: the digits of `i64::MIN` with nothing numeric following.
    fn try_min_magnitude(&mut self) -> Option<Node> {
        let mark = self.sc.mark();
        if self.sc.try_literal("9223372036854775808")
            && !self
                .sc
                .peek()
                .is_some_and(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E'))
        {
            return Some(Node::Constant(Value::Int(i64::MIN)));
        }
        self.sc.reset(mark);
        None
    }

    fn try_prefix(&mut self) -> Option<UnaryOp> {
        let sc = &mut self.sc;
        if sc.looking_at("!=") {
            return None;
        }
        if sc.try_char('-') {
            return Some(UnaryOp::Negate);
        }
        if sc.try_char('!') || sc.try_literal("not") {
            return Some(UnaryOp::Not);
        }
        if sc.try_literal("empty") {
            return Some(UnaryOp::Empty);
        }
        if self.config.case_convert {
            if sc.try_literal("toupper") {
                return Some(UnaryOp::ToUpper);
            }
            if sc.try_literal("tolower") {
                return Some(UnaryOp::ToLower);
            }
        }
        if self.config.array_ops {
            if sc.try_literal("length") {
                return Some(UnaryOp::Length);
            }
            if sc.try_literal("sum") {
                return Some(UnaryOp::Sum);
            }
        }
        None
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let start = self.sc.char_pos();

        if self.sc.try_char('(') {
            let inner = self.parse_expression()?;
            self.sc.skip_ws();
            if !self.sc.try_char(')') {
                return Err(ParseError::Unmatched { open: '(', pos: start });
            }
            return Ok(Node::unary(UnaryOp::Group, inner));
        }
        if let Some(n) = self.sc.try_number()? {
            return Ok(Node::Constant(n));
        }
        if let Some(s) = self.sc.try_string()? {
            return Ok(Node::Constant(Value::Str(s)));
        }

        let Some(word) = self.sc.try_identifier() else {
            return Err(self.unexpected());
        };
        match word {
            "true" => return Ok(Node::constant(true)),
            "false" => return Ok(Node::constant(false)),
            "null" => return Ok(Node::Constant(Value::Null)),
            _ => {}
        }
        if self.is_reserved(word) {
            return Err(ParseError::ReservedWord {
                word: word.to_owned(),
                pos: start,
            });
        }
        if self.config.functions {
            if let Some(call) = self.try_call(word, start)? {
                return Ok(call);
            }
        }
        match self.resolver.resolve(word) {
            Some(var) => Ok(Node::Variable(var)),
            None => Err(ParseError::UnresolvedIdentifier {
                name: word.to_owned(),
                pos: start,
            }),
        }
    }

    /// `first(args)` or `first:name(args)`, with `first` already consumed.
    ///
    /// A prefix that does not resolve leaves the cursor after `first`, since
    /// the `:` may belong to a conditional.
    fn try_call(&mut self, first: &str, start: usize) -> Result<Option<Node>, ParseError> {
        let after_first = self.sc.mark();

        if self.sc.peek() == Some('(') {
            let uri = self.resolver.resolve_prefix("").ok_or_else(|| ParseError::MalformedCall {
                message: format!("no default function namespace for '{first}'"),
                pos: start,
            })?;
            return self.finish_call(String::new(), uri, first, start).map(Some);
        }

        if self.sc.try_char(':') {
            if let Some(name) = self.sc.try_identifier() {
                if self.sc.peek() == Some('(') {
                    if let Some(uri) = self.resolver.resolve_prefix(first) {
                        return self.finish_call(first.to_owned(), uri, name, start).map(Some);
                    }
                }
            }
        }
        self.sc.reset(after_first);
        Ok(None)
    }

    fn finish_call(
        &mut self,
        prefix: String,
        uri: String,
        name: &str,
        start: usize,
    ) -> Result<Node, ParseError> {
        let Some(namespace) = self.resolver.resolve_namespace(&uri) else {
            return Err(ParseError::UnknownNamespace { uri, pos: start });
        };
        let open = self.sc.char_pos();
        self.sc.try_char('(');
        let args = self.parse_arguments(open)?;
        Ok(Node::Call(FunctionCall {
            prefix,
            namespace,
            name: name.to_owned(),
            args,
        }))
    }

    fn parse_arguments(&mut self, open: usize) -> Result<Vec<Node>, ParseError> {
        let mut args = Vec::new();
        self.sc.skip_ws();
        if self.sc.try_char(')') {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            self.sc.skip_ws();
            if self.sc.try_char(',') {
                continue;
            }
            if self.sc.try_char(')') {
                return Ok(args);
            }
            return Err(match self.sc.peek() {
                None => ParseError::Unmatched { open: '(', pos: open },
                Some(ch) => ParseError::MalformedCall {
                    message: format!("expected ',' or ')' but found '{ch}'"),
                    pos: self.sc.char_pos(),
                },
            });
        }
    }

    fn parse_postfix(&mut self, mut node: Node) -> Result<Node, ParseError> {
        loop {
            let mark = self.sc.mark();
            self.sc.skip_ws();
            let at = self.sc.char_pos();
            if self.sc.try_char('.') {
                self.sc.skip_ws();
                // Any identifier is a valid property name, reserved or not.
                let Some(name) = self.sc.try_identifier() else {
                    return Err(self.unexpected());
                };
                node = Node::index(node, Node::constant(name));
            } else if self.sc.try_char('[') {
                let key = self.parse_expression()?;
                self.sc.skip_ws();
                if !self.sc.try_char(']') {
                    return Err(ParseError::Unmatched { open: '[', pos: at });
                }
                node = Node::index(node, key);
            } else {
                self.sc.reset(mark);
                return Ok(node);
            }
        }
    }

    // ── Validation ────────────────────────────────────────────────────────────

    fn check(&self, node: &Node) -> Result<(), ParseError> {
        if self.config.conditional {
            check_conditionals(node)
        } else {
            Ok(())
        }
    }
}

fn reduce(operands: &mut Vec<Node>, op: Infix) {
    if let (Some(right), Some(left)) = (operands.pop(), operands.pop()) {
        operands.push(op.build(left, right));
    }
}

fn check_conditionals(node: &Node) -> Result<(), ParseError> {
    match node {
        Node::Conditional(cond, branches) => {
            check_conditionals(cond)?;
            match branches.as_ref() {
                Node::Else(then, otherwise) => {
                    check_conditionals(then)?;
                    check_conditionals(otherwise)
                }
                _ => Err(ParseError::MissingElse),
            }
        }
        Node::Else(..) => Err(ParseError::DanglingElse),
        other => other.children().into_iter().try_for_each(check_conditionals),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::StaticProvider;
    use crate::resolve::{Bindings, NoVariables};

    fn parse(src: &str) -> Result<Node, ParseError> {
        parse_with(src, &NoVariables, &ParserConfig::default())
    }

    fn eval(src: &str) -> Value {
        parse(src).unwrap().evaluate().unwrap()
    }

    fn eval_in(b: &Bindings, src: &str) -> Value {
        parse_with(src, b, &ParserConfig::default())
            .unwrap()
            .evaluate()
            .unwrap()
    }

    #[test]
    fn precedence_and_grouping() {
        assert_eq!(eval("4+3*2"), Value::Int(10));
        assert_eq!(eval("(4+3)*2"), Value::Int(14));
        assert_eq!(eval("10-4-3"), Value::Int(3));
        assert_eq!(eval("2*3+4*5"), Value::Int(26));
        assert_eq!(eval("1+2 == 3 && 2 < 3"), Value::Bool(true));
        assert_eq!(eval("17 mod 5 * 2"), Value::Int(4));
    }

    #[test]
    fn tree_shape() {
        assert_eq!(parse("1+2*3").unwrap().to_string(), "(1 + (2 * 3))");
        assert_eq!(parse("1*2+3").unwrap().to_string(), "((1 * 2) + 3)");
        assert_eq!(parse("1-2-3").unwrap().to_string(), "((1 - 2) - 3)");
        assert_eq!(parse("-1+2").unwrap().to_string(), "((-1) + 2)");
    }

    #[test]
    fn word_operators() {
        assert_eq!(eval("'b' gt 'a'"), Value::Bool(true));
        assert_eq!(eval("2 lt 3"), Value::Bool(true));
        assert_eq!(eval("1 eq 1 and 2 ne 3"), Value::Bool(true));
        assert_eq!(eval("not true or false"), Value::Bool(false));
        assert_eq!(eval("7 div 2"), Value::Float(3.5));
    }

    #[test]
    fn prefixes_bind_to_postfixed_operand() {
        let b = Bindings::new().with("s", "abc");
        assert_eq!(eval_in(&b, "toupper s"), Value::from("ABC"));
        assert_eq!(eval_in(&b, "!empty s"), Value::Bool(true));
        assert_eq!(eval("- -3"), Value::Int(3));
        assert_eq!(eval("!true == false"), Value::Bool(true));
    }

    #[test]
    fn smallest_integer_literal() {
        assert_eq!(parse("-9223372036854775808").unwrap(), Node::Constant(Value::Int(i64::MIN)));
        assert_eq!(eval("1 - -9223372036854775808 * 1"), Value::Int(i64::MIN + 1));
        assert_eq!(eval("-9223372036854775808.5"), Value::Float(-9223372036854775808.5));
        assert!(matches!(
            parse("- 9223372036854775808"),
            Err(ParseError::MalformedNumber { pos: 2, .. })
        ));
        assert!(matches!(
            parse("-92233720368547758080"),
            Err(ParseError::MalformedNumber { .. })
        ));
    }

    #[test]
    fn conditional_and_assignment() {
        let b = Bindings::new().with("x", 0i64).with("c", true);
        assert_eq!(eval_in(&b, "c ? 1 : 2"), Value::Int(1));
        assert_eq!(eval_in(&b, "!c ? 1 : c ? 2 : 3"), Value::Int(2));
        assert_eq!(eval_in(&b, "x = c ? 5 : 6"), Value::Int(5));
        assert_eq!(b.get("x"), Some(Value::Int(5)));
        assert_eq!(eval_in(&b, "c ? (c ? 1 : 2) : 3"), Value::Int(1));
    }

    #[test]
    fn conditional_pairing() {
        assert_eq!(parse("true ? 1").unwrap_err(), ParseError::MissingElse);
        assert_eq!(parse("1 : 2").unwrap_err(), ParseError::DanglingElse);
        assert_eq!(parse("true ? true ? 1 : 2 : 3").unwrap_err(), ParseError::MissingElse);
        assert_eq!(parse("(true ? 1) : 2").unwrap_err(), ParseError::DanglingElse);
        assert_eq!(parse("(true ? 1) + 2").unwrap_err(), ParseError::MissingElse);
        assert_eq!(parse("true ? 1 : 2 : 3").unwrap_err(), ParseError::DanglingElse);
    }

    #[test]
    fn indexing() {
        let list = crate::host::HostList::from_values([10i64, 20]).into_value();
        let map = crate::host::HostMap::new().with("key", "v").into_value();
        let b = Bindings::new().with("l", list).with("m", map);
        assert_eq!(eval_in(&b, "l[1]"), Value::Int(20));
        assert_eq!(eval_in(&b, "l[5]"), Value::Null);
        assert_eq!(eval_in(&b, "m.key"), Value::from("v"));
        assert_eq!(eval_in(&b, "m['key'] # 'x'"), Value::from("vx"));
        assert_eq!(eval_in(&b, "length l"), Value::Int(2));
    }

    #[test]
    fn errors_carry_positions() {
        assert_eq!(parse("1 +"), Err(ParseError::UnexpectedEnd { pos: 3 }));
        assert_eq!(parse("(1 + 2"), Err(ParseError::Unmatched { open: '(', pos: 0 }));
        assert_eq!(
            parse("foo + 1"),
            Err(ParseError::UnresolvedIdentifier { name: "foo".into(), pos: 0 })
        );
        assert_eq!(
            parse("1 + and"),
            Err(ParseError::ReservedWord { word: "and".into(), pos: 4 })
        );
        assert_eq!(
            parse("1 2"),
            Err(ParseError::TrailingInput { rest: "2".into(), pos: 2 })
        );
        assert_eq!(parse("1 + )"), Err(ParseError::UnexpectedChar { ch: ')', pos: 4 }));
    }

    #[test]
    fn disabled_extensions_are_identifiers() {
        let b = Bindings::new().with("length", 3i64).with("x", 1i64);
        let restricted = ParserConfig::restricted();
        let n = parse_with("length + 1", &b, &restricted).unwrap();
        assert_eq!(n.evaluate(), Ok(Value::Int(4)));
        assert!(matches!(
            parse_with("x = 2", &b, &restricted),
            Err(ParseError::TrailingInput { .. })
        ));
        assert!(matches!(
            parse_with("x ? 1 : 2", &b, &restricted),
            Err(ParseError::TrailingInput { .. })
        ));
    }

    #[test]
    fn function_calls() {
        let provider = StaticProvider::new().with("twice", |args: &[Value]| {
            Ok(Value::Int(args[0].as_long()? * 2))
        });
        let b = Bindings::new()
            .with("c", true)
            .with_namespace("m", "urn:math", provider);
        assert_eq!(eval_in(&b, "m:twice(4) + 1"), Value::Int(9));
        // `m2` is not followed by `(`, so the colon belongs to the conditional.
        let b = b.with("m2", 7i64);
        assert_eq!(eval_in(&b, "c ? m2:m2"), Value::Int(7));
        assert!(matches!(
            parse_with("twice(1)", &b, &ParserConfig::default()),
            Err(ParseError::MalformedCall { .. })
        ));
        assert!(matches!(
            parse_with("m:twice(1 2)", &b, &ParserConfig::default()),
            Err(ParseError::MalformedCall { .. })
        ));
        assert!(matches!(
            parse_with("m:twice(1", &b, &ParserConfig::default()),
            Err(ParseError::Unmatched { open: '(', .. })
        ));
    }

    #[test]
    fn embedded_stops_at_foreign_token() {
        let text = "${ 1 + 2 } tail";
        let (node, end) = parse_embedded(text, 2, &NoVariables, &ParserConfig::default()).unwrap();
        assert_eq!(node.evaluate(), Ok(Value::Int(3)));
        assert_eq!(&text[end..], "} tail");
    }
}
