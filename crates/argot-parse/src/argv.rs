//! Lexical classification of argv tokens.
//!
//! Rules:
//! - `--name` is a long option (at least one non-space char after `--`)
//! - `-x` is a short option unless `x` is a digit or `-`
//! - `--name=value` is option-equals notation
//! - `-abc` is a cluster of short options, expanded into `-a -b -c`
//! - everything else is a value, including `-`, `--` and `-5`

use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    Long(&'a str),
    Short(char),
    Equals { name: &'a str, value: &'a str },
    Value(&'a str),
}

/// A classified token plus the text it came from.
#[derive(Debug, Clone)]
pub(crate) struct ArgvToken<'a> {
    pub(crate) token: Token<'a>,
    /// The token as seen by the resolver (`-b` for the second letter of `-abc`).
    pub(crate) arg: Cow<'a, str>,
}

fn is_short_letter(c: char) -> bool {
    !c.is_ascii_digit() && c != '-'
}

fn classify(arg: &str) -> Token<'_> {
    if let Some(rest) = arg.strip_prefix("--") {
        if let Some((name, value)) = split_equals(rest) {
            return Token::Equals { name, value };
        }
        if rest.chars().next().is_some_and(|c| !c.is_whitespace()) {
            return Token::Long(rest);
        }
        return Token::Value(arg);
    }

    if let Some(rest) = arg.strip_prefix('-') {
        let mut chars = rest.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if is_short_letter(c) {
                return Token::Short(c);
            }
        }
    }

    Token::Value(arg)
}

/// `name=value` where `name` is non-empty and contains no whitespace.
fn split_equals(rest: &str) -> Option<(&str, &str)> {
    let first = rest.chars().next()?;
    let search_from = first.len_utf8();
    let pos = rest[search_from..].find('=')? + search_from;
    let name = &rest[..pos];
    if name.chars().any(char::is_whitespace) {
        return None;
    }
    Some((name, &rest[pos + 1..]))
}

fn is_cluster(arg: &str) -> bool {
    let Some(rest) = arg.strip_prefix('-') else {
        return false;
    };
    rest.chars().count() >= 2 && rest.chars().all(is_short_letter)
}

/// Classify `argv`, expanding short-option clusters.
pub(crate) fn tokenize(argv: &[String]) -> Vec<ArgvToken<'_>> {
    let mut out = Vec::with_capacity(argv.len());
    for arg in argv {
        let arg = arg.as_str();
        if is_cluster(arg) {
            for c in arg.chars().skip(1) {
                out.push(ArgvToken {
                    token: Token::Short(c),
                    arg: Cow::Owned(format!("-{c}")),
                });
            }
            continue;
        }
        out.push(ArgvToken {
            token: classify(arg),
            arg: Cow::Borrowed(arg),
        });
    }
    out
}
