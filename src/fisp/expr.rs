// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The Fisp expression tree.
//!
//! An [`Expr`] is either an [`Atom`] or an ordered array of expressions. Atoms
//! keep their raw text and derive boolean/numeric readings on demand, so the
//! same token always coerces the same way no matter which builtin asks.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static NUMERIC_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?$").expect("numeric literal pattern")
});

/// An indivisible token.
///
/// Bare `true`/`false` tokens parse to [`Atom::Bool`]; everything else,
/// including quoted `"true"`, is [`Atom::Text`].
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Bool(bool),
    Text(String),
}

impl Atom {
    /// Text reading of the atom. Booleans read as `"true"`/`"false"`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Atom::Bool(value) => Cow::Owned(value.to_string()),
            Atom::Text(text) => Cow::Borrowed(text),
        }
    }

    /// Numeric reading, if the text matches the numeric-literal grammar.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Atom::Bool(_) => None,
            Atom::Text(text) if NUMERIC_LITERAL.is_match(text) => text.parse().ok(),
            Atom::Text(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Atom::Bool(value) => Some(*value),
            Atom::Text(_) => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Atom::Bool(value) => *value,
            Atom::Text(text) => match self.as_number() {
                Some(number) => number != 0.0,
                None => !text.trim().is_empty(),
            },
        }
    }
}

/// A parsed Fisp expression. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Atom(Atom),
    Array(Vec<Expr>),
}

impl Expr {
    pub fn text(value: impl Into<String>) -> Self {
        Expr::Atom(Atom::Text(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        Expr::Atom(Atom::Bool(value))
    }

    pub fn array(values: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Array(values.into_iter().collect())
    }

    pub fn empty() -> Self {
        Expr::Array(Vec::new())
    }

    /// Builds a call form `(name args...)`.
    pub fn call(name: &str, args: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Array(std::iter::once(Expr::text(name)).chain(args).collect())
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Expr::Atom(atom) => Some(atom),
            Expr::Array(_) => None,
        }
    }

    /// Head atom's text when this is a non-empty array starting with an atom.
    pub fn head_name(&self) -> Option<Cow<'_, str>> {
        match self {
            Expr::Array(values) => values.first().and_then(Expr::as_atom).map(Atom::as_text),
            Expr::Atom(_) => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Expr::Atom(atom) => atom.is_truthy(),
            Expr::Array(values) => match values.as_slice() {
                [] => false,
                [only] => only.is_truthy(),
                _ => true,
            },
        }
    }

    /// Converts a JSON document into an expression tree.
    ///
    /// Objects become arrays of `(key value)` pairs in document order, `null`
    /// becomes empty text, numbers keep their JSON spelling.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Expr::text(""),
            Value::Bool(b) => Expr::bool(*b),
            Value::Number(n) => Expr::text(n.to_string()),
            Value::String(s) => Expr::text(s.as_str()),
            Value::Array(values) => Expr::array(values.iter().map(Expr::from_json)),
            Value::Object(map) => Expr::array(
                map.iter()
                    .map(|(key, value)| Expr::array([Expr::text(key.as_str()), Expr::from_json(value)])),
            ),
        }
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::text(value)
    }
}
