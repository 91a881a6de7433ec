// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Predicates over the item in the filter context.

use std::collections::HashMap;
use std::sync::Mutex;

use regex::Regex;

use crate::errors::EvalError;
use crate::feed::REPOST_REASON;
use crate::fisp::context::FilterContext;
use crate::fisp::evaluator::Evaluator;
use crate::fisp::expr::Expr;
use crate::fisp::registry::FispFunction;

/// True when any argument evaluates to `candidate`.
fn any_argument_equals(
    args: &[Expr],
    candidate: &str,
    evaluator: &Evaluator<'_>,
    ctx: &FilterContext<'_>,
) -> Result<bool, EvalError> {
    for arg in args {
        if evaluator.evaluate_text(arg, ctx)? == candidate {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(super) fn has_embed(
    _args: &[Expr],
    _evaluator: &Evaluator<'_>,
    ctx: &FilterContext<'_>,
) -> Result<Expr, EvalError> {
    Ok(Expr::bool(ctx.item.has_embed))
}

pub(super) fn reason_is(
    args: &[Expr],
    evaluator: &Evaluator<'_>,
    ctx: &FilterContext<'_>,
) -> Result<Expr, EvalError> {
    let matched = match ctx.item.reason.as_deref() {
        Some(reason) => any_argument_equals(args, reason, evaluator, ctx)?,
        None => false,
    };
    Ok(Expr::bool(matched))
}

pub(super) fn is_retweet(
    _args: &[Expr],
    evaluator: &Evaluator<'_>,
    ctx: &FilterContext<'_>,
) -> Result<Expr, EvalError> {
    evaluator.evaluate(&Expr::call("reason_is", [Expr::text(REPOST_REASON)]), ctx)
}

pub(super) fn author_is(
    args: &[Expr],
    evaluator: &Evaluator<'_>,
    ctx: &FilterContext<'_>,
) -> Result<Expr, EvalError> {
    Ok(Expr::bool(any_argument_equals(
        args,
        &ctx.item.author,
        evaluator,
        ctx,
    )?))
}

pub(super) fn is_authored_by_self(
    _args: &[Expr],
    evaluator: &Evaluator<'_>,
    ctx: &FilterContext<'_>,
) -> Result<Expr, EvalError> {
    let owner = Expr::text(ctx.owner.unwrap_or_default());
    evaluator.evaluate(&Expr::call("author_is", [owner]), ctx)
}

/// Passes everything except reposts of other accounts' posts.
pub(super) fn is_self_retweet(
    _args: &[Expr],
    evaluator: &Evaluator<'_>,
    ctx: &FilterContext<'_>,
) -> Result<Expr, EvalError> {
    let expansion = Expr::call(
        "either",
        [
            Expr::call("not", [Expr::call("is_retweet", [])]),
            Expr::call("is_authored_by_self", []),
        ],
    );
    evaluator.evaluate(&expansion, ctx)
}

pub(super) fn labels_contains(
    args: &[Expr],
    evaluator: &Evaluator<'_>,
    ctx: &FilterContext<'_>,
) -> Result<Expr, EvalError> {
    for label in &ctx.item.labels {
        if any_argument_equals(args, label, evaluator, ctx)? {
            return Ok(Expr::bool(true));
        }
    }
    Ok(Expr::bool(false))
}

/// Most patterns a [`ContainsRegex`] keeps compiled; later ones are compiled
/// on every call.
const PATTERN_CACHE_CAPACITY: usize = 256;

/// `contains_regex`: searches the item text for the first argument as a
/// regular expression. Compiled patterns are kept for reuse across items.
#[derive(Default)]
pub(super) struct ContainsRegex {
    compiled: Mutex<HashMap<String, Regex>>,
}

impl ContainsRegex {
    fn regex(&self, pattern: &str) -> Result<Regex, EvalError> {
        if let Some(regex) = self.cached(pattern) {
            return Ok(regex);
        }
        let regex = Regex::new(pattern).map_err(|e| EvalError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        if let Ok(mut compiled) = self.compiled.lock() {
            if compiled.len() < PATTERN_CACHE_CAPACITY {
                compiled.insert(pattern.to_string(), regex.clone());
            }
        }
        Ok(regex)
    }

    fn cached(&self, pattern: &str) -> Option<Regex> {
        self.compiled.lock().ok()?.get(pattern).cloned()
    }

    #[cfg(test)]
    fn cached_count(&self) -> usize {
        self.compiled.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl FispFunction for ContainsRegex {
    fn call(
        &self,
        args: &[Expr],
        evaluator: &Evaluator<'_>,
        ctx: &FilterContext<'_>,
    ) -> Result<Expr, EvalError> {
        let pattern = evaluator.evaluate_text(args.first().unwrap_or(&Expr::empty()), ctx)?;
        let regex = self.regex(&pattern)?;
        Ok(Expr::bool(regex.is_match(&ctx.item.text)))
    }
}

#[cfg(test)]
mod tests {
    use super::ContainsRegex;
    use crate::errors::EvalError;
    use crate::fisp::context::FilterContext;
    use crate::fisp::expr::Expr;
    use crate::fisp::registry::{FispFunction, FunctionRegistry};
    use crate::feed::REPOST_REASON;
    use crate::fisp::test_support::{check, check_item, item};

    #[test]
    fn test_has_embed() {
        let mut post = item();
        assert!(!check_item("(has_embed)", &post, None).unwrap());
        post.has_embed = true;
        assert!(check_item("(has_embed)", &post, None).unwrap());
    }

    #[test]
    fn test_is_retweet_matches_repost_reason() {
        let mut post = item();
        assert!(check_item("(not (is_retweet))", &post, None).unwrap());

        post.reason = Some(REPOST_REASON.to_string());
        assert!(check_item("(is_retweet)", &post, None).unwrap());
        assert!(!check_item("(not (is_retweet))", &post, None).unwrap());
        assert!(check_item("(reason_is other app.bsky.feed.defs#reasonRepost)", &post, None).unwrap());
    }

    #[test]
    fn test_author_checks() {
        let post = item();
        assert!(check_item("(author_is did:plc:nobody did:plc:author)", &post, None).unwrap());
        assert!(check_item("(is_authored_by_self)", &post, Some("did:plc:author")).unwrap());
        assert!(!check_item("(is_authored_by_self)", &post, Some("did:plc:other")).unwrap());
        assert!(!check_item("(is_authored_by_self)", &post, None).unwrap());
    }

    #[test]
    fn test_is_self_retweet() {
        let mut post = item();
        // plain posts always pass
        assert!(check_item("(is_self_retweet)", &post, Some("did:plc:owner")).unwrap());

        post.reason = Some(REPOST_REASON.to_string());
        assert!(!check_item("(is_self_retweet)", &post, Some("did:plc:owner")).unwrap());
        assert!(check_item("(is_self_retweet)", &post, Some("did:plc:author")).unwrap());
    }

    #[test]
    fn test_labels_contains() {
        let mut post = item();
        assert!(!check_item("(labels_contains nsfw)", &post, None).unwrap());
        post.labels = vec!["spoiler".into(), "nsfw".into()];
        assert!(check_item("(labels_contains porn nsfw)", &post, None).unwrap());
        assert!(!check_item("(labels_contains)", &post, None).unwrap());
    }

    #[test]
    fn test_contains_regex() {
        assert!(check("(contains_regex \"h[aeiou]llo\")"));
        assert!(!check("(contains_regex ^world)"));
        assert!(matches!(
            check_item("(contains_regex \"(\")", &item(), None),
            Err(EvalError::InvalidPattern { .. })
        ));
        assert!(matches!(
            check_item("(contains_regex)", &item(), None),
            Err(EvalError::NotText { .. })
        ));
    }

    #[test]
    fn test_contains_regex_compiles_each_pattern_once() {
        let function = ContainsRegex::default();
        let registry = FunctionRegistry::new();
        let evaluator = registry.evaluator();
        let mut post = item();

        for text in ["hello there", "goodbye", "hello again"] {
            post.text = text.into();
            let ctx = FilterContext::new(&post);
            let matched = function
                .call(&[Expr::text("^hello")], &evaluator, &ctx)
                .unwrap();
            assert_eq!(matched, Expr::bool(text.starts_with("hello")));
        }
        assert_eq!(function.cached_count(), 1);

        let ctx = FilterContext::new(&post);
        assert!(function.call(&[Expr::text("(")], &evaluator, &ctx).is_err());
        assert_eq!(function.cached_count(), 1);
    }
}
