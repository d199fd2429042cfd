//! Wildcard matching for `~=`.
//!
//! `*` matches any run of characters (including none), `?` exactly one,
//! `\` makes the next pattern character literal.  The whole text must match.

#[derive(Clone, Copy, PartialEq)]
enum Token {
    Star,
    Any,
    Char(char),
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        let tok = match c {
            '*' if out.last() == Some(&Token::Star) => continue,
            '*' => Token::Star,
            '?' => Token::Any,
            // A lone trailing backslash matches itself.
            '\\' => Token::Char(chars.next().unwrap_or('\\')),
            c => Token::Char(c),
        };
        out.push(tok);
    }
    out
}

/// Greedy match that backtracks only to the most recent `*`, so the cost
/// is at most `text.len() * pattern.len()` steps.
pub fn wildcard_match(text: &str, pattern: &str) -> bool {
    let t: Vec<char> = text.chars().collect();
    let p = tokenize(pattern);
    let (mut ti, mut pi) = (0, 0);
    // Pattern index after the last star, and the text index it resumes at.
    let mut resume: Option<(usize, usize)> = None;

    while ti < t.len() {
        match p.get(pi) {
            Some(Token::Star) => {
                pi += 1;
                resume = Some((pi, ti));
                continue;
            }
            Some(Token::Any) => {
                ti += 1;
                pi += 1;
                continue;
            }
            Some(Token::Char(c)) if *c == t[ti] => {
                ti += 1;
                pi += 1;
                continue;
            }
            _ => {}
        }
        match resume {
            Some((star_pi, star_ti)) => {
                pi = star_pi;
                ti = star_ti + 1;
                resume = Some((star_pi, ti));
            }
            None => return false,
        }
    }
    p[pi..].iter().all(|tok| *tok == Token::Star)
}
