// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::EvalError;
use crate::fisp::context::FilterContext;
use crate::fisp::expr::Expr;
use crate::fisp::registry::FunctionRegistry;

/// Reduces expressions against a [`FilterContext`] using a borrowed registry.
///
/// Evaluation rules:
///
/// - an atom evaluates to itself
/// - a non-empty array whose head atom names a registered function is a call;
///   the handler receives the remaining elements unevaluated
/// - any other one-element array evaluates its element
/// - the empty array evaluates to itself
/// - anything else fails with [`EvalError::UnresolvableHead`]
///
/// ```
/// use feedsift::fisp::{parse, FunctionRegistry};
/// # use feedsift::fisp::FilterContext;
/// # use feedsift::feed::FeedItem;
/// # let item = FeedItem {
/// #     uri: "at://did:plc:a/app.bsky.feed.post/1".into(),
/// #     author: "did:plc:a".into(),
/// #     text: String::new(),
/// #     created_at: chrono::Utc::now(),
/// #     reason: None,
/// #     has_embed: false,
/// #     labels: vec![],
/// #     raw: serde_json::Value::Null,
/// # };
///
/// let registry = FunctionRegistry::with_builtins();
/// let ctx = FilterContext::new(&item);
/// let evaluator = registry.evaluator();
/// assert!(evaluator.evaluate_truthy(&parse("(all_of)").unwrap(), &ctx).unwrap());
/// assert!(!evaluator.evaluate_truthy(&parse("(any_of)").unwrap(), &ctx).unwrap());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'r> {
    registry: &'r FunctionRegistry,
}

impl<'r> Evaluator<'r> {
    pub fn new(registry: &'r FunctionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r FunctionRegistry {
        self.registry
    }

    /// True when `expr` is a call form this evaluator would dispatch.
    pub fn is_call(&self, expr: &Expr) -> bool {
        expr.head_name()
            .is_some_and(|name| self.registry.contains(&name))
    }

    pub fn evaluate(&self, expr: &Expr, ctx: &FilterContext<'_>) -> Result<Expr, EvalError> {
        let values = match expr {
            Expr::Atom(_) => return Ok(expr.clone()),
            Expr::Array(values) => values,
        };

        if let Some(name) = expr.head_name() {
            if self.registry.contains(&name) {
                let function = self.registry.get(&name)?;
                return function.call(&values[1..], self, ctx);
            }
        }

        match values.as_slice() {
            [] => Ok(expr.clone()),
            [only] => self.evaluate(only, ctx),
            [head, ..] => Err(EvalError::UnresolvableHead {
                head: head.to_string(),
            }),
        }
    }

    pub fn evaluate_truthy(&self, expr: &Expr, ctx: &FilterContext<'_>) -> Result<bool, EvalError> {
        Ok(self.evaluate(expr, ctx)?.is_truthy())
    }

    /// Evaluates `expr` and reduces the result to the text of a single atom.
    pub fn evaluate_text(&self, expr: &Expr, ctx: &FilterContext<'_>) -> Result<String, EvalError> {
        let value = self.evaluate(expr, ctx)?;
        reduce_to_text(&value)
    }
}

fn reduce_to_text(value: &Expr) -> Result<String, EvalError> {
    match value {
        Expr::Atom(atom) => Ok(atom.as_text().into_owned()),
        Expr::Array(values) => match values.as_slice() {
            [only] => reduce_to_text(only),
            _ => Err(EvalError::NotText {
                found: value.to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fisp::parse;
    use crate::fisp::test_support::item;

    fn eval(source: &str) -> Result<Expr, EvalError> {
        let registry = FunctionRegistry::with_builtins();
        let item = item();
        registry
            .evaluator()
            .evaluate(&parse(source).unwrap(), &FilterContext::new(&item))
    }

    #[test]
    fn test_atoms_and_empty_array_evaluate_to_themselves() {
        assert_eq!(eval("hello").unwrap(), Expr::text("hello"));
        assert_eq!(eval("false").unwrap(), Expr::bool(false));
        assert_eq!(eval("()").unwrap(), Expr::empty());
    }

    #[test]
    fn test_single_element_array_unwraps() {
        assert_eq!(eval("(hello)").unwrap(), Expr::text("hello"));
        assert_eq!(eval("(((true)))").unwrap(), Expr::bool(true));
    }

    #[test]
    fn test_one_element_call_forms_invoke_the_function() {
        assert_eq!(eval("(all_of)").unwrap(), Expr::bool(true));
        assert_eq!(eval("(any_of)").unwrap(), Expr::bool(false));
    }

    #[test]
    fn test_unresolvable_head() {
        assert_eq!(
            eval("(nonsense a b)"),
            Err(EvalError::UnresolvableHead {
                head: "nonsense".into()
            })
        );
        assert!(matches!(
            eval("((a b) c)"),
            Err(EvalError::UnresolvableHead { .. })
        ));
    }

    #[test]
    fn test_evaluate_text() {
        let registry = FunctionRegistry::with_builtins();
        let item = item();
        let ctx = FilterContext::new(&item);
        let evaluator = registry.evaluator();

        assert_eq!(evaluator.evaluate_text(&parse("((x))").unwrap(), &ctx).unwrap(), "x");
        assert_eq!(evaluator.evaluate_text(&parse("true").unwrap(), &ctx).unwrap(), "true");
        assert_eq!(
            evaluator.evaluate_text(&parse("()").unwrap(), &ctx),
            Err(EvalError::NotText { found: "()".into() })
        );
    }
}
