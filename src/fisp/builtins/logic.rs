// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::EvalError;
use crate::fisp::context::FilterContext;
use crate::fisp::evaluator::Evaluator;
use crate::fisp::expr::Expr;

/// True unless some argument is falsy. Stops at the first falsy argument.
pub(super) fn all_of(
    args: &[Expr],
    evaluator: &Evaluator<'_>,
    ctx: &FilterContext<'_>,
) -> Result<Expr, EvalError> {
    for arg in args {
        if !evaluator.evaluate_truthy(arg, ctx)? {
            return Ok(Expr::bool(false));
        }
    }
    Ok(Expr::bool(true))
}

/// True once some argument is truthy. Stops at the first truthy argument.
pub(super) fn any_of(
    args: &[Expr],
    evaluator: &Evaluator<'_>,
    ctx: &FilterContext<'_>,
) -> Result<Expr, EvalError> {
    for arg in args {
        if evaluator.evaluate_truthy(arg, ctx)? {
            return Ok(Expr::bool(true));
        }
    }
    Ok(Expr::bool(false))
}

/// Negates the first argument. A missing argument counts as falsy.
pub(super) fn not(
    args: &[Expr],
    evaluator: &Evaluator<'_>,
    ctx: &FilterContext<'_>,
) -> Result<Expr, EvalError> {
    let value = match args.first() {
        Some(arg) => evaluator.evaluate_truthy(arg, ctx)?,
        None => false,
    };
    Ok(Expr::bool(!value))
}

#[cfg(test)]
mod tests {
    use crate::fisp::test_support::check;

    #[test]
    fn test_empty_forms() {
        assert!(check("(all_of)"));
        assert!(!check("(any_of)"));
        assert!(check("(not)"));
    }

    #[test]
    fn test_aliases() {
        assert!(check("(and true 1)"));
        assert!(!check("(all true 0)"));
        assert!(check("(or false yes)"));
        assert!(check("(either () x)"));
        assert!(!check("(any false \" \")"));
        assert!(check("(! ())"));
    }

    #[test]
    fn test_short_circuit_skips_failing_arguments() {
        // the second argument would fail with an unresolvable head
        assert!(!check("(all_of false (bad form))"));
        assert!(check("(any_of true (bad form))"));
    }

    #[test]
    fn test_top_level_sequence_is_a_call() {
        assert!(check("either (not x) (y)"));
        assert!(!check("all_of (not x) (y)"));
    }
}
