// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Renders expression trees back to Fisp text that parses to the same tree.

use std::fmt::{self, Display, Formatter, Write};

use crate::fisp::expr::{Atom, Expr};

fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || text == "true"
        || text == "false"
        || text
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '(' | ')' | '"' | '\\'))
}

fn write_quoted(text: &str, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_char('"')?;
    for c in text.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\u{8}' => f.write_str("\\b")?,
            '\u{c}' => f.write_str("\\f")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04X}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

impl Display for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Bool(value) => write!(f, "{}", value),
            Atom::Text(text) if needs_quotes(text) => write_quoted(text, f),
            Atom::Text(text) => f.write_str(text),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Atom(atom) => atom.fmt(f),
            Expr::Array(values) => {
                f.write_char('(')?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    value.fmt(f)?;
                }
                f.write_char(')')
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fisp::parse;

    #[test]
    fn test_print_shapes() {
        assert_eq!(Expr::empty().to_string(), "()");
        assert_eq!(Expr::array([Expr::text("x")]).to_string(), "(x)");
        assert_eq!(
            Expr::call("not", [Expr::call("is_retweet", [])]).to_string(),
            "(not (is_retweet))"
        );
    }

    #[test]
    fn test_quoting_rules() {
        assert_eq!(Expr::bool(true).to_string(), "true");
        assert_eq!(Expr::text("true").to_string(), "\"true\"");
        assert_eq!(Expr::text("").to_string(), "\"\"");
        assert_eq!(Expr::text("a b").to_string(), "\"a b\"");
        assert_eq!(Expr::text("say \"hi\"\n").to_string(), r#""say \"hi\"\n""#);
        assert_eq!(Expr::text("\u{1}").to_string(), "\"\\u0001\"");
        assert_eq!(Expr::text("app.bsky.feed.defs#reasonRepost").to_string(), "app.bsky.feed.defs#reasonRepost");
    }

    #[test]
    fn test_round_trip_preserves_tree() {
        let trees = vec![
            Expr::empty(),
            Expr::text("solo"),
            Expr::array([Expr::text("x")]),
            Expr::array([Expr::empty(), Expr::array([Expr::empty()])]),
            Expr::call(
                "all_of",
                [
                    Expr::bool(false),
                    Expr::text("false"),
                    Expr::text("0"),
                    Expr::text("(paren)"),
                    Expr::text("tab\there \\ \u{7f}"),
                    Expr::call("contains_regex", [Expr::text("^\\d+ cats?$")]),
                ],
            ),
        ];

        for tree in trees {
            let printed = tree.to_string();
            assert_eq!(parse(&printed).unwrap(), tree, "printed as {}", printed);
        }
    }
}
