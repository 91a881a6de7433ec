// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! `extract`: JSON path queries over the item's raw API payload.
//!
//! Arguments are path tokens: an optional leading `$`, then pairs of a segment
//! marker (`.` for child, `..` for descendant) and a selector token. Selector
//! tokens read as:
//!
//! | token | selector |
//! |---|---|
//! | `*` | wildcard |
//! | `3`, `-1` | index |
//! | `1:3`, `::-1`, `:2:` | slice |
//! | `(name X)` | member `X`, even when `X` looks like one of the above |
//! | `(a 0 *)` | union of each element's selectors |
//! | anything else | member name |
//!
//! A malformed token sequence selects nothing rather than failing.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::EvalError;
use crate::fisp::context::FilterContext;
use crate::fisp::evaluator::Evaluator;
use crate::fisp::expr::{Atom, Expr};
use crate::jsonpath::{JsonPath, Segment, Selector};

static INDEX_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+$").expect("index token pattern"));

static SLICE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?[0-9]+)?:(-?[0-9]+)?(?::(-?[0-9]+)?)?$").expect("slice token pattern")
});

pub(super) fn extract(
    args: &[Expr],
    evaluator: &Evaluator<'_>,
    ctx: &FilterContext<'_>,
) -> Result<Expr, EvalError> {
    let matches = match build_path(args, evaluator, ctx) {
        Some(path) => path.select(&ctx.item.raw).map(Expr::from_json).collect(),
        None => Vec::new(),
    };
    Ok(Expr::Array(matches))
}

/// Call forms among the arguments are evaluated first; a failing one makes
/// the whole path malformed.
fn build_path(args: &[Expr], evaluator: &Evaluator<'_>, ctx: &FilterContext<'_>) -> Option<JsonPath> {
    let tokens = args
        .iter()
        .map(|arg| {
            if evaluator.is_call(arg) {
                evaluator.evaluate(arg, ctx).ok()
            } else {
                Some(arg.clone())
            }
        })
        .collect::<Option<Vec<_>>>()?;

    let mut tokens = tokens.iter().peekable();
    if tokens.peek().and_then(|t| atom_text(t)).as_deref() == Some("$") {
        tokens.next();
    }

    let mut segments = Vec::new();
    while let Some(marker) = tokens.next() {
        let descendant = match atom_text(marker).as_deref() {
            Some(".") => false,
            Some("..") => true,
            _ => return None,
        };
        let selectors = selectors_for_token(tokens.next()?)?;
        segments.push(if descendant {
            Segment::Descendant(selectors)
        } else {
            Segment::Child(selectors)
        });
    }
    Some(JsonPath::new(segments))
}

fn atom_text(expr: &Expr) -> Option<String> {
    expr.as_atom().map(|atom| atom.as_text().into_owned())
}

/// Reads one selector token. `None` when the token is malformed.
pub fn selectors_for_token(token: &Expr) -> Option<Vec<Selector>> {
    match token {
        Expr::Atom(atom) => Some(vec![selector_for_atom(atom)]),
        Expr::Array(values) => match values.as_slice() {
            [Expr::Atom(Atom::Text(keyword)), Expr::Atom(name)] if keyword == "name" => {
                Some(vec![Selector::name(name.as_text())])
            }
            [Expr::Atom(Atom::Text(keyword)), _] if keyword == "name" => None,
            _ => {
                let mut union = Vec::new();
                for value in values {
                    union.extend(selectors_for_token(value)?);
                }
                Some(union)
            }
        },
    }
}

fn selector_for_atom(atom: &Atom) -> Selector {
    let text = atom.as_text();
    if text == "*" {
        return Selector::Wildcard;
    }
    if INDEX_TOKEN.is_match(&text) {
        if let Ok(index) = text.parse() {
            return Selector::Index(index);
        }
    }
    if let Some(captures) = SLICE_TOKEN.captures(&text) {
        let bound = |i| captures.get(i).and_then(|m| m.as_str().parse().ok());
        return Selector::slice(bound(1), bound(2), bound(3));
    }
    Selector::name(text)
}
