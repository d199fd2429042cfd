//! Built-in string functions.
//!
//! [`StringFunctions`] is a ready-made [`FunctionProvider`]; bind it to a
//! prefix with [`Bindings::with_namespace`](crate::Bindings::with_namespace)
//! and call e.g. `fn:toUpperCase(name)`.  Arguments coerce like any other
//! operand, so `null` reads as `""` and numeric strings read as numbers.
//!
//! | Function                          | Result                                        |
//! |-----------------------------------|-----------------------------------------------|
//! | `length(x)`                       | characters in a string, elements in a map or sequence |
//! | `toUpperCase(s)` / `toLowerCase(s)` | case-converted `s`                          |
//! | `trim(s)`                         | `s` without surrounding whitespace            |
//! | `contains(s, t)`                  | whether `t` occurs in `s`                     |
//! | `containsIgnoreCase(s, t)`        | same, ignoring case                           |
//! | `startsWith(s, t)` / `endsWith(s, t)` | prefix / suffix test                      |
//! | `indexOf(s, t)`                   | character index of `t` in `s`, or `-1`        |
//! | `substring(s, begin, end)`        | characters `begin..end`, clamped              |
//! | `substringBefore(s, t)`           | text before the first `t`, or `""`            |
//! | `substringAfter(s, t)`            | text after the first `t`, or `""`             |
//! | `replace(s, before, after)`       | every `before` replaced with `after`          |
//! | `escapeXml(s)`                    | `& < > " '` as character entities             |
//! | `join(seq, sep)`                  | elements of `seq` joined with `sep`           |
//! | `split(s, delims)`                | non-empty tokens between any of `delims`      |
//! | `matches(s, re)`                  | whether the regex matches all of `s`          |
//! | `replaceAll(s, re, with)`         | every regex match replaced (`$1` expands)     |

use std::sync::Arc;

use aho_corasick::AhoCorasickBuilder;
use regex::Regex;

use crate::error::EvalError;
use crate::function::{Function, FunctionProvider};
use crate::host::HostList;
use crate::value::Value;

const NAMES: &[&str] = &[
    "length",
    "toUpperCase",
    "toLowerCase",
    "trim",
    "contains",
    "containsIgnoreCase",
    "startsWith",
    "endsWith",
    "indexOf",
    "substring",
    "substringBefore",
    "substringAfter",
    "replace",
    "escapeXml",
    "join",
    "split",
    "matches",
    "replaceAll",
];

/// Provider for the functions listed in the module table.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringFunctions;

impl FunctionProvider for StringFunctions {
    fn function(&self, name: &str) -> Option<Function> {
        let name = *NAMES.iter().find(|&&n| n == name)?;
        let f: Function = Arc::new(move |args: &[Value]| call_builtin(name, args));
        Some(f)
    }
}

/// Run built-in `name` on already-evaluated arguments.
pub fn call_builtin(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    Ok(match name {
        // ── Inspection ───────────────────────────────────────────────────────
        "length" => match args.first() {
            None | Some(Value::Null) => Value::Int(0),
            Some(Value::Host(h)) => match h.len() {
                Some(n) => Value::Int(n as i64),
                None => return Err(fail(name, "argument is not a map or sequence")),
            },
            Some(v) => Value::Int(v.as_string()?.chars().count() as i64),
        },
        "contains" => {
            let s = get_str(args, 0, name)?;
            Value::Bool(s.contains(get_str(args, 1, name)?.as_str()))
        }
        "containsIgnoreCase" => {
            let s = get_str(args, 0, name)?;
            let t = get_str(args, 1, name)?;
            Value::Bool(contains_ignore_case(&s, &t))
        }
        "startsWith" => {
            let s = get_str(args, 0, name)?;
            Value::Bool(s.starts_with(get_str(args, 1, name)?.as_str()))
        }
        "endsWith" => {
            let s = get_str(args, 0, name)?;
            Value::Bool(s.ends_with(get_str(args, 1, name)?.as_str()))
        }
        "indexOf" => {
            let s = get_str(args, 0, name)?;
            let t = get_str(args, 1, name)?;
            Value::Int(match s.find(&t) {
                Some(byte) => s[..byte].chars().count() as i64,
                None => -1,
            })
        }
        "matches" => {
            let s = get_str(args, 0, name)?;
            let re = compile(name, &format!("^(?:{})$", get_str(args, 1, name)?))?;
            Value::Bool(re.is_match(&s))
        }

        // ── Transformation ───────────────────────────────────────────────────
        "toUpperCase" => Value::Str(get_str(args, 0, name)?.to_uppercase()),
        "toLowerCase" => Value::Str(get_str(args, 0, name)?.to_lowercase()),
        "trim" => Value::Str(get_str(args, 0, name)?.trim().to_owned()),
        "substring" => {
            let chars: Vec<char> = get_str(args, 0, name)?.chars().collect();
            let len = chars.len() as i64;
            let begin = get_int(args, 1, name)?.clamp(0, len);
            let end = match get_int(args, 2, name)? {
                e if e < 0 || e > len => len,
                e => e,
            };
            if begin >= end {
                Value::Str(String::new())
            } else {
                Value::Str(chars[begin as usize..end as usize].iter().collect())
            }
        }
        "substringBefore" => {
            let s = get_str(args, 0, name)?;
            let t = get_str(args, 1, name)?;
            match s.find(&t) {
                Some(i) if !t.is_empty() => Value::Str(s[..i].to_owned()),
                _ => Value::Str(String::new()),
            }
        }
        "substringAfter" => {
            let s = get_str(args, 0, name)?;
            let t = get_str(args, 1, name)?;
            match s.find(&t) {
                Some(i) => Value::Str(s[i + t.len()..].to_owned()),
                None => Value::Str(String::new()),
            }
        }
        "replace" => {
            let s = get_str(args, 0, name)?;
            let before = get_str(args, 1, name)?;
            let after = get_str(args, 2, name)?;
            if before.is_empty() {
                Value::Str(s)
            } else {
                Value::Str(s.replace(&before, &after))
            }
        }
        "replaceAll" => {
            let s = get_str(args, 0, name)?;
            let re = compile(name, &get_str(args, 1, name)?)?;
            let with = get_str(args, 2, name)?;
            Value::Str(re.replace_all(&s, with.as_str()).into_owned())
        }
        "escapeXml" => Value::Str(escape_xml(&get_str(args, 0, name)?)),

        // ── Sequences ────────────────────────────────────────────────────────
        "join" => {
            let sep = get_str(args, 1, name)?;
            let elements = match args.first() {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Host(h)) => h
                    .elements()
                    .ok_or_else(|| fail(name, "argument is not a map or sequence"))?,
                Some(_) => return Err(fail(name, "argument is not a sequence")),
            };
            let parts = elements
                .iter()
                .map(Value::as_string)
                .collect::<Result<Vec<_>, _>>()?;
            Value::Str(parts.join(&sep))
        }
        "split" => {
            let s = get_str(args, 0, name)?;
            let delims = get_str(args, 1, name)?;
            let list = if s.is_empty() {
                HostList::from_values([""])
            } else {
                HostList::from_values(
                    s.split(|c| delims.contains(c)).filter(|t| !t.is_empty()),
                )
            };
            list.into_value()
        }

        other => return Err(fail(other, "no such function")),
    })
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn fail(name: &str, message: &str) -> EvalError {
    EvalError::Function {
        name: name.to_owned(),
        message: message.to_owned(),
    }
}

fn get_str(args: &[Value], idx: usize, name: &str) -> Result<String, EvalError> {
    args.get(idx)
        .ok_or_else(|| fail(name, &format!("argument {idx} missing")))?
        .as_string()
}

fn get_int(args: &[Value], idx: usize, name: &str) -> Result<i64, EvalError> {
    args.get(idx)
        .ok_or_else(|| fail(name, &format!("argument {idx} missing")))?
        .as_long()
}

fn compile(name: &str, pattern: &str) -> Result<Regex, EvalError> {
    Regex::new(pattern).map_err(|e| fail(name, &e.to_string()))
}

fn contains_ignore_case(s: &str, t: &str) -> bool {
    if s.is_ascii() && t.is_ascii() {
        AhoCorasickBuilder::new()
            .ascii_case_insensitive(true)
            .build([t])
            .is_match(s)
    } else {
        s.to_uppercase().contains(&t.to_uppercase())
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#034;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
