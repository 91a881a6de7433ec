// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Reader for Fisp filter text.
//!
//! Grammar: `expr := atom | '(' expr* ')'`. Every step takes the byte position
//! it starts at and hands back the position just past what it consumed, so
//! no cursor state outlives a call.

use crate::errors::ParseError;
use crate::fisp::expr::{Atom, Expr};

/// Parses a filter document.
///
/// A single top-level expression is returned as is; several top-level
/// expressions are wrapped in one array, so `either (a) (b)` reads the same as
/// `(either (a) (b))`. Empty input is the empty array.
///
/// ```
/// use feedsift::fisp::{parse, Expr};
///
/// let expr = parse("(not (is_retweet))").unwrap();
/// assert_eq!(expr, Expr::call("not", [Expr::call("is_retweet", [])]));
/// ```
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let mut items = Vec::new();
    let mut pos = 0;
    loop {
        pos = skip_whitespace(input, pos);
        match peek(input, pos) {
            None => break,
            Some(')') => return Err(ParseError::UnmatchedClose { position: pos }),
            Some(_) => {
                let (expr, next) = parse_expr(input, pos)?;
                items.push(expr);
                pos = next;
            }
        }
    }

    if items.len() == 1 {
        if let Some(only) = items.pop() {
            return Ok(only);
        }
    }
    Ok(Expr::Array(items))
}

fn peek(input: &str, pos: usize) -> Option<char> {
    input[pos..].chars().next()
}

fn skip_whitespace(input: &str, pos: usize) -> usize {
    input[pos..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(offset, _)| pos + offset)
        .unwrap_or(input.len())
}

fn parse_expr(input: &str, pos: usize) -> Result<(Expr, usize), ParseError> {
    match peek(input, pos) {
        Some('(') => parse_list(input, pos),
        Some('"') => parse_quoted(input, pos),
        _ => Ok(parse_bare(input, pos)),
    }
}

fn parse_list(input: &str, open: usize) -> Result<(Expr, usize), ParseError> {
    let mut items = Vec::new();
    let mut pos = open + 1;
    loop {
        pos = skip_whitespace(input, pos);
        match peek(input, pos) {
            None => return Err(ParseError::UnclosedOpen { position: open }),
            Some(')') => return Ok((Expr::Array(items), pos + 1)),
            Some(_) => {
                let (expr, next) = parse_expr(input, pos)?;
                items.push(expr);
                pos = next;
            }
        }
    }
}

fn is_bare_terminator(c: char) -> bool {
    c.is_whitespace() || c == '(' || c == ')' || c == '"'
}

fn parse_bare(input: &str, pos: usize) -> (Expr, usize) {
    let end = input[pos..]
        .char_indices()
        .find(|(_, c)| is_bare_terminator(*c))
        .map(|(offset, _)| pos + offset)
        .unwrap_or(input.len());

    let atom = match &input[pos..end] {
        "true" => Atom::Bool(true),
        "false" => Atom::Bool(false),
        token => Atom::Text(token.to_string()),
    };
    (Expr::Atom(atom), end)
}

fn parse_quoted(input: &str, start: usize) -> Result<(Expr, usize), ParseError> {
    let mut text = String::new();
    let mut pos = start + 1;
    loop {
        let c = peek(input, pos).ok_or(ParseError::UnterminatedQuote { position: start })?;
        pos += c.len_utf8();
        match c {
            '"' => return Ok((Expr::text(text), pos)),
            '\\' => {
                let escaped =
                    peek(input, pos).ok_or(ParseError::UnterminatedQuote { position: start })?;
                pos += escaped.len_utf8();
                match escaped {
                    'u' => {
                        let (decoded, next) = parse_unicode_escape(input, pos)?;
                        text.push(decoded);
                        pos = next;
                    }
                    'b' => text.push('\u{8}'),
                    'f' => text.push('\u{c}'),
                    'n' => text.push('\n'),
                    'r' => text.push('\r'),
                    't' => text.push('\t'),
                    other => text.push(other),
                }
            }
            other => text.push(other),
        }
    }
}

fn read_hex4(input: &str, pos: usize) -> Result<u32, ParseError> {
    let invalid = || ParseError::InvalidUnicodeEscape {
        position: pos,
        text: input[pos..].chars().take(4).collect(),
    };
    let digits = input.get(pos..pos + 4).ok_or_else(invalid)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    u32::from_str_radix(digits, 16).map_err(|_| invalid())
}

/// Decodes the four hex digits after `\u`, pairing UTF-16 surrogates.
fn parse_unicode_escape(input: &str, pos: usize) -> Result<(char, usize), ParseError> {
    let first = read_hex4(input, pos)?;
    let mut next = pos + 4;
    let code = if (0xD800..0xDC00).contains(&first) && input[next..].starts_with("\\u") {
        let second = read_hex4(input, next + 2)?;
        if (0xDC00..0xE000).contains(&second) {
            next += 6;
            0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00)
        } else {
            first
        }
    } else {
        first
    };

    char::from_u32(code)
        .map(|c| (c, next))
        .ok_or_else(|| ParseError::InvalidUnicodeEscape {
            position: pos,
            text: input[pos..next].to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_call() {
        let expr = parse("(any_of (has_embed) (not (is_retweet)))").unwrap();
        assert_eq!(
            expr,
            Expr::call(
                "any_of",
                [
                    Expr::call("has_embed", []),
                    Expr::call("not", [Expr::call("is_retweet", [])]),
                ]
            )
        );
    }

    #[test]
    fn test_multiple_top_level_exprs_form_one_array() {
        let expr = parse("either (not x) (y)").unwrap();
        assert_eq!(
            expr,
            Expr::array([
                Expr::text("either"),
                Expr::call("not", [Expr::text("x")]),
                Expr::call("y", []),
            ])
        );
    }

    #[test]
    fn test_empty_input_is_empty_array() {
        assert_eq!(parse("").unwrap(), Expr::empty());
        assert_eq!(parse("  \n ").unwrap(), Expr::empty());
        assert_eq!(parse("()").unwrap(), Expr::empty());
    }

    #[test]
    fn test_bare_booleans_and_quoted_text() {
        assert_eq!(parse("true").unwrap(), Expr::bool(true));
        assert_eq!(parse("\"true\"").unwrap(), Expr::text("true"));
        assert_eq!(parse("false").unwrap(), Expr::bool(false));
    }

    #[test]
    fn test_bare_atom_stops_at_quote_and_parens() {
        let expr = parse("(a\"b c\"d)").unwrap();
        assert_eq!(
            expr,
            Expr::array([Expr::text("a"), Expr::text("b c"), Expr::text("d")])
        );
    }

    #[test]
    fn test_escapes() {
        let expr = parse(r#""q\" b\\ \b\f\n\r\t \u0041 \x \ud83d\ude00""#).unwrap();
        assert_eq!(expr, Expr::text("q\" b\\ \u{8}\u{c}\n\r\t A x \u{1F600}"));
    }

    #[test]
    fn test_error_positions() {
        assert_eq!(
            parse("(a \"unterminated"),
            Err(ParseError::UnterminatedQuote { position: 3 })
        );
        assert_eq!(parse("(a b))"), Err(ParseError::UnmatchedClose { position: 5 }));
        assert_eq!(parse("(a (b c)"), Err(ParseError::UnclosedOpen { position: 0 }));
        assert_eq!(
            parse("\"\\u00zz\"").unwrap_err().position(),
            3
        );
    }

    #[test]
    fn test_positions_are_byte_offsets() {
        let err = parse("(héllo \"x").unwrap_err();
        assert_eq!(err.position(), 8);
    }
}
