//! Parser configuration.
//!
//! The base grammar (arithmetic, comparison, logical, indexing) is always
//! available.  Each extension is switched on individually:
//!
//! | Flag           | Grammar enabled                                   |
//! |----------------|---------------------------------------------------|
//! | `assign`       | `target = value`                                  |
//! | `conditional`  | `cond ? then : else`                              |
//! | `case_convert` | `toupper x`, `tolower x`                          |
//! | `matching`     | `text ~= pattern` (wildcards `*`, `?`, `\`)       |
//! | `join`         | `a # b` string join                               |
//! | `array_ops`    | `length x`, `sum x`                               |
//! | `functions`    | `prefix:name(args)`, `name(args)`                 |
//!
//! When an extension is off its keywords are ordinary identifiers.
//!
//! A configuration can also be read from text: `"default"`, `"restricted"`,
//! or a comma list such as `"conditional, +join, -assign"`.  Items apply on
//! top of the restricted profile unless the list starts with `default`.

use std::str::FromStr;

/// Which grammar extensions the parser recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    pub assign: bool,
    pub conditional: bool,
    pub case_convert: bool,
    pub matching: bool,
    pub join: bool,
    pub array_ops: bool,
    pub functions: bool,
}

impl Default for ParserConfig {
    /// Every extension enabled.
    fn default() -> Self {
        ParserConfig {
            assign: true,
            conditional: true,
            case_convert: true,
            matching: true,
            join: true,
            array_ops: true,
            functions: true,
        }
    }
}

impl ParserConfig {
    /// No extensions: the base grammar only.
    pub fn restricted() -> Self {
        ParserConfig {
            assign: false,
            conditional: false,
            case_convert: false,
            matching: false,
            join: false,
            array_ops: false,
            functions: false,
        }
    }

    pub fn with_assign(mut self, on: bool) -> Self {
        self.assign = on;
        self
    }

    pub fn with_conditional(mut self, on: bool) -> Self {
        self.conditional = on;
        self
    }

    pub fn with_case_convert(mut self, on: bool) -> Self {
        self.case_convert = on;
        self
    }

    pub fn with_matching(mut self, on: bool) -> Self {
        self.matching = on;
        self
    }

    pub fn with_join(mut self, on: bool) -> Self {
        self.join = on;
        self
    }

    pub fn with_array_ops(mut self, on: bool) -> Self {
        self.array_ops = on;
        self
    }

    pub fn with_functions(mut self, on: bool) -> Self {
        self.functions = on;
        self
    }

    fn flag_mut(&mut self, name: &str) -> Option<&mut bool> {
        Some(match name {
            "assign" => &mut self.assign,
            "conditional" => &mut self.conditional,
            "case_convert" => &mut self.case_convert,
            "match" | "matching" => &mut self.matching,
            "join" => &mut self.join,
            "array_ops" => &mut self.array_ops,
            "functions" => &mut self.functions,
            _ => return None,
        })
    }
}

// ── Text form ─────────────────────────────────────────────────────────────────

/// An unrecognised item in a textual configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown parser option '{item}'")]
pub struct ConfigError {
    pub item: String,
}

impl FromStr for ParserConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut items = s.split(',').map(str::trim).filter(|i| !i.is_empty()).peekable();

        let mut config = match items.peek().copied() {
            Some("default") => {
                items.next();
                ParserConfig::default()
            }
            Some("restricted") => {
                items.next();
                ParserConfig::restricted()
            }
            _ => ParserConfig::restricted(),
        };

        for item in items {
            let (on, name) = match item.strip_prefix('-') {
                Some(rest) => (false, rest),
                None => (true, item.strip_prefix('+').unwrap_or(item)),
            };
            let flag = config.flag_mut(name).ok_or_else(|| ConfigError {
                item: item.to_owned(),
            })?;
            *flag = on;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles() {
        let d = ParserConfig::default();
        assert!(d.assign && d.conditional && d.matching && d.functions);
        let r = ParserConfig::restricted();
        assert!(!r.assign && !r.join && !r.array_ops);
    }

    #[test]
    fn parse_profile_names() {
        assert_eq!("default".parse::<ParserConfig>(), Ok(ParserConfig::default()));
        assert_eq!("restricted".parse::<ParserConfig>(), Ok(ParserConfig::restricted()));
        assert_eq!("".parse::<ParserConfig>(), Ok(ParserConfig::restricted()));
    }

    #[test]
    fn parse_item_list() {
        let c: ParserConfig = "conditional, +join".parse().unwrap();
        assert_eq!(
            c,
            ParserConfig::restricted().with_conditional(true).with_join(true)
        );
        let c: ParserConfig = "default,-assign,-match".parse().unwrap();
        assert_eq!(
            c,
            ParserConfig::default().with_assign(false).with_matching(false)
        );
    }

    #[test]
    fn parse_unknown_item() {
        let err = "join,loops".parse::<ParserConfig>().unwrap_err();
        assert_eq!(err.item, "loops");
        assert_eq!(err.to_string(), "unknown parser option 'loops'");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }
}
